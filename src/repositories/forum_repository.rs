use std::collections::HashMap;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{FindOptions, IndexOptions},
    Collection, IndexModel,
};

use crate::{
    db::{self, Database},
    errors::{AppError, AppResult},
    models::domain::{ForumReply, ForumThread, ThreadQuery},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForumRepository: Send + Sync {
    async fn create_thread(&self, thread: ForumThread) -> AppResult<ForumThread>;
    /// Includes soft-deleted threads; callers decide visibility.
    async fn find_thread(&self, thread_id: &str) -> AppResult<Option<ForumThread>>;
    /// Non-deleted threads matching the query, newest first, plus the total match count.
    async fn list_threads(&self, query: &ThreadQuery) -> AppResult<(Vec<ForumThread>, u64)>;
    async fn update_thread(&self, thread: ForumThread) -> AppResult<ForumThread>;
    async fn create_reply(&self, reply: ForumReply) -> AppResult<ForumReply>;
    async fn find_reply(&self, reply_id: &str) -> AppResult<Option<ForumReply>>;
    /// Replies of a thread, oldest first.
    async fn replies_for_thread(&self, thread_id: &str) -> AppResult<Vec<ForumReply>>;
    async fn count_replies(&self, thread_ids: &[String]) -> AppResult<HashMap<String, u64>>;
}

pub struct MongoForumRepository {
    threads: Collection<ForumThread>,
    replies: Collection<ForumReply>,
}

fn thread_filter(query: &ThreadQuery) -> Document {
    let mut filter = doc! { "is_deleted": false };

    if let Some(category) = &query.category {
        filter.insert("category", category.as_str());
    }

    if let Some(search) = &query.search {
        let pattern = regex::escape(search);
        filter.insert(
            "$or",
            vec![
                doc! { "title": { "$regex": &pattern, "$options": "i" } },
                doc! { "content": { "$regex": &pattern, "$options": "i" } },
            ],
        );
    }

    filter
}

impl MongoForumRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            threads: db.get_collection(db::FORUM_THREADS),
            replies: db.get_collection(db::FORUM_REPLIES),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for forum collections");

        let thread_id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();
        let thread_listing_index = IndexModel::builder()
            .keys(doc! { "is_deleted": 1, "category": 1, "created_at": -1 })
            .build();
        self.threads
            .create_indexes(vec![thread_id_index, thread_listing_index])
            .await?;

        let reply_id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();
        let reply_thread_index = IndexModel::builder()
            .keys(doc! { "thread_id": 1, "created_at": 1 })
            .build();
        self.replies
            .create_indexes(vec![reply_id_index, reply_thread_index])
            .await?;

        log::info!("Successfully created indexes for forum collections");
        Ok(())
    }
}

#[async_trait]
impl ForumRepository for MongoForumRepository {
    async fn create_thread(&self, thread: ForumThread) -> AppResult<ForumThread> {
        self.threads.insert_one(&thread).await?;
        Ok(thread)
    }

    async fn find_thread(&self, thread_id: &str) -> AppResult<Option<ForumThread>> {
        let thread = self.threads.find_one(doc! { "id": thread_id }).await?;
        Ok(thread)
    }

    async fn list_threads(&self, query: &ThreadQuery) -> AppResult<(Vec<ForumThread>, u64)> {
        let filter = thread_filter(query);

        let total = self.threads.count_documents(filter.clone()).await?;

        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .skip(Some(query.offset()))
            .limit(Some(query.page_size as i64))
            .build();

        let cursor = self.threads.find(filter).with_options(options).await?;
        let threads: Vec<ForumThread> = cursor.try_collect().await?;

        Ok((threads, total))
    }

    async fn update_thread(&self, thread: ForumThread) -> AppResult<ForumThread> {
        let result = self
            .threads
            .replace_one(doc! { "id": &thread.id }, &thread)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Thread with id '{}' not found",
                thread.id
            )));
        }

        Ok(thread)
    }

    async fn create_reply(&self, reply: ForumReply) -> AppResult<ForumReply> {
        self.replies.insert_one(&reply).await?;
        Ok(reply)
    }

    async fn find_reply(&self, reply_id: &str) -> AppResult<Option<ForumReply>> {
        let reply = self.replies.find_one(doc! { "id": reply_id }).await?;
        Ok(reply)
    }

    async fn replies_for_thread(&self, thread_id: &str) -> AppResult<Vec<ForumReply>> {
        let options = FindOptions::builder().sort(doc! { "created_at": 1 }).build();
        let cursor = self
            .replies
            .find(doc! { "thread_id": thread_id })
            .with_options(options)
            .await?;
        let replies: Vec<ForumReply> = cursor.try_collect().await?;
        Ok(replies)
    }

    async fn count_replies(&self, thread_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if thread_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let cursor = self
            .replies
            .find(doc! { "thread_id": { "$in": thread_ids.to_vec() } })
            .await?;
        let replies: Vec<ForumReply> = cursor.try_collect().await?;

        let mut counts = HashMap::new();
        for reply in replies {
            *counts.entry(reply.thread_id).or_insert(0) += 1;
        }

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_filter_defaults_to_live_threads() {
        let filter = thread_filter(&ThreadQuery::default());
        assert_eq!(filter, doc! { "is_deleted": false });
    }

    #[test]
    fn test_thread_filter_escapes_search() {
        let filter = thread_filter(&ThreadQuery {
            category: Some("C#".to_string()),
            search: Some("a+b".to_string()),
            page: 1,
            page_size: 10,
        });

        assert_eq!(filter.get_str("category").unwrap(), "C#");
        let or = filter.get_array("$or").unwrap();
        assert_eq!(or.len(), 2);
        let title = or[0].as_document().unwrap().get_document("title").unwrap();
        assert_eq!(title.get_str("$regex").unwrap(), r"a\+b");
    }
}
