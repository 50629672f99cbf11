use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use validator::Validate;

use crate::{
    auth::require_author,
    errors::{AppError, AppResult},
    models::{
        domain::{forum::FORUM_CATEGORIES, ForumReply, ForumThread, ThreadQuery, User},
        dto::{
            request::{CreateReplyRequest, CreateThreadRequest},
            response::{
                CreatedReplyResponse, CreatedThreadResponse, MessageResponse, ReplyDto,
                ThreadDetailDto, ThreadPageDto, ThreadSummaryDto,
            },
        },
    },
    repositories::{ForumRepository, UserRepository},
    services::gamification::{GamificationService, Reward},
};

const UNKNOWN_AUTHOR: &str = "Unknown";

/// Display data for reply and thread authors, keyed by user id.
#[derive(Debug, Default)]
pub struct Authors(HashMap<String, (String, Option<String>)>);

impl Authors {
    pub fn from_users(users: Vec<User>) -> Self {
        Authors(
            users
                .into_iter()
                .map(|u| (u.id, (u.username, u.avatar_url)))
                .collect(),
        )
    }

    fn name(&self, user_id: &str) -> String {
        self.0
            .get(user_id)
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
    }

    fn avatar(&self, user_id: &str) -> Option<String> {
        self.0.get(user_id).and_then(|(_, avatar)| avatar.clone())
    }
}

fn summarize(thread: ForumThread, authors: &Authors, reply_count: u64) -> ThreadSummaryDto {
    ThreadSummaryDto {
        author_name: authors.name(&thread.user_id),
        author_avatar: authors.avatar(&thread.user_id),
        author_id: thread.user_id,
        id: thread.id,
        title: thread.title,
        content: thread.content,
        category: thread.category,
        is_resolved: thread.is_resolved,
        created_at: thread.created_at,
        reply_count,
    }
}

/// Nests replies under their parents. Siblings stay in the order given, so
/// callers pass replies oldest first. A reply whose parent is missing is
/// shown at the top level.
pub fn build_reply_tree(replies: Vec<ForumReply>, authors: &Authors) -> Vec<ReplyDto> {
    let known: HashSet<String> = replies.iter().map(|r| r.id.clone()).collect();

    let mut children: HashMap<String, Vec<ForumReply>> = HashMap::new();
    let mut roots = Vec::new();
    for reply in replies {
        match reply.parent_reply_id.clone() {
            Some(parent) if known.contains(&parent) && parent != reply.id => {
                children.entry(parent).or_default().push(reply)
            }
            _ => roots.push(reply),
        }
    }

    fn attach(
        reply: ForumReply,
        children: &mut HashMap<String, Vec<ForumReply>>,
        authors: &Authors,
    ) -> ReplyDto {
        let nested = children
            .remove(&reply.id)
            .unwrap_or_default()
            .into_iter()
            .map(|child| attach(child, children, authors))
            .collect();

        ReplyDto {
            author_name: authors.name(&reply.user_id),
            author_avatar: authors.avatar(&reply.user_id),
            author_id: reply.user_id,
            id: reply.id,
            content: reply.content,
            parent_reply_id: reply.parent_reply_id,
            created_at: reply.created_at,
            replies: nested,
        }
    }

    roots
        .into_iter()
        .map(|root| attach(root, &mut children, authors))
        .collect()
}

pub struct ForumService {
    forum: Arc<dyn ForumRepository>,
    users: Arc<dyn UserRepository>,
    gamification: Arc<GamificationService>,
}

impl ForumService {
    pub fn new(
        forum: Arc<dyn ForumRepository>,
        users: Arc<dyn UserRepository>,
        gamification: Arc<GamificationService>,
    ) -> Self {
        Self {
            forum,
            users,
            gamification,
        }
    }

    pub fn categories(&self) -> Vec<String> {
        FORUM_CATEGORIES.iter().map(|c| c.to_string()).collect()
    }

    async fn authors(&self, user_ids: Vec<String>) -> AppResult<Authors> {
        let mut ids = user_ids;
        ids.sort();
        ids.dedup();
        if ids.is_empty() {
            return Ok(Authors::default());
        }
        Ok(Authors::from_users(self.users.find_by_ids(&ids).await?))
    }

    async fn live_thread(&self, thread_id: &str, missing: &str) -> AppResult<ForumThread> {
        self.forum
            .find_thread(thread_id)
            .await?
            .filter(|t| !t.is_deleted)
            .ok_or_else(|| AppError::NotFound(missing.to_string()))
    }

    pub async fn list_threads(&self, query: ThreadQuery) -> AppResult<ThreadPageDto> {
        let (threads, total) = self.forum.list_threads(&query).await?;

        let thread_ids: Vec<String> = threads.iter().map(|t| t.id.clone()).collect();
        let counts = self.forum.count_replies(&thread_ids).await?;
        let authors = self
            .authors(threads.iter().map(|t| t.user_id.clone()).collect())
            .await?;

        let threads = threads
            .into_iter()
            .map(|thread| {
                let count = counts.get(&thread.id).copied().unwrap_or(0);
                summarize(thread, &authors, count)
            })
            .collect();

        Ok(ThreadPageDto {
            threads,
            page: query.page,
            page_size: query.page_size,
            total,
        })
    }

    pub async fn get_thread(&self, thread_id: &str) -> AppResult<ThreadDetailDto> {
        let thread = self
            .live_thread(thread_id, "Thread not found or deleted.")
            .await?;
        let replies = self.forum.replies_for_thread(thread_id).await?;

        let mut user_ids: Vec<String> = replies.iter().map(|r| r.user_id.clone()).collect();
        user_ids.push(thread.user_id.clone());
        let authors = self.authors(user_ids).await?;

        let reply_count = replies.len() as u64;
        Ok(ThreadDetailDto {
            thread: summarize(thread, &authors, reply_count),
            replies: build_reply_tree(replies, &authors),
        })
    }

    pub async fn create_thread(
        &self,
        user_id: &str,
        request: CreateThreadRequest,
    ) -> AppResult<CreatedThreadResponse> {
        request.validate()?;

        let thread = ForumThread::new(user_id, &request.title, &request.content, &request.category);
        let thread = self.forum.create_thread(thread).await?;
        self.gamification
            .reward(user_id, Reward::ThreadCreated)
            .await?;

        log::info!("User {} created forum thread {}", user_id, thread.id);

        Ok(CreatedThreadResponse {
            thread_id: thread.id,
        })
    }

    pub async fn create_reply(
        &self,
        user_id: &str,
        thread_id: &str,
        request: CreateReplyRequest,
    ) -> AppResult<CreatedReplyResponse> {
        request.validate()?;
        self.live_thread(thread_id, "Thread not found or deleted.")
            .await?;

        let parent = request
            .parent_reply_id
            .filter(|id| !id.trim().is_empty());
        if let Some(parent_id) = &parent {
            let in_thread = self
                .forum
                .find_reply(parent_id)
                .await?
                .is_some_and(|p| p.thread_id == thread_id);
            if !in_thread {
                return Err(AppError::BadRequest(
                    "Parent reply does not belong to this thread.".to_string(),
                ));
            }
        }

        let reply = ForumReply::new(thread_id, user_id, &request.content, parent);
        let reply = self.forum.create_reply(reply).await?;
        self.gamification.reward(user_id, Reward::ReplyPosted).await?;

        Ok(CreatedReplyResponse { reply_id: reply.id })
    }

    pub async fn delete_thread(&self, user_id: &str, thread_id: &str) -> AppResult<MessageResponse> {
        let mut thread = self
            .live_thread(thread_id, "Thread not found or already deleted.")
            .await?;
        require_author(user_id, &thread.user_id, "delete")?;

        thread.is_deleted = true;
        self.forum.update_thread(thread).await?;

        log::info!("User {} deleted forum thread {}", user_id, thread_id);
        Ok(MessageResponse::new("Thread deleted successfully."))
    }

    pub async fn resolve_thread(
        &self,
        user_id: &str,
        thread_id: &str,
    ) -> AppResult<MessageResponse> {
        let mut thread = self
            .live_thread(thread_id, "Thread not found or deleted.")
            .await?;
        require_author(user_id, &thread.user_id, "resolve")?;

        thread.is_resolved = true;
        self.forum.update_thread(thread).await?;

        Ok(MessageResponse::new("Thread marked as resolved."))
    }
}
