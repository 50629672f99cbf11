#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::RwLock;

use nexium_server::{
    app_state::{AppState, Repositories},
    config::Config,
    errors::{AppError, AppResult},
    models::{
        catalog::Catalog,
        domain::{Certificate, ForumReply, ForumThread, Progress, ThreadQuery, User},
    },
    repositories::{
        CertificateRepository, ForumRepository, JsonCourseRepository, ProgressRepository,
        UserRepository,
    },
    services::grader::{CodeRunner, RunFailure},
};

pub const CATALOG_JSON: &str = include_str!("../../data/csharp_course.json");

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::AlreadyExists("Email already exists.".to_string()));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.to_lowercase();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn save(&self, mut user: User) -> AppResult<Option<User>> {
        let mut users = self.users.write().await;
        match users.get(&user.id) {
            Some(stored) if stored.version == user.version => {
                user.version += 1;
                users.insert(user.id.clone(), user.clone());
                Ok(Some(user))
            }
            _ => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct InMemoryProgressRepository {
    records: Arc<RwLock<HashMap<(String, String), Progress>>>,
}

impl InMemoryProgressRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressRepository for InMemoryProgressRepository {
    async fn find(&self, user_id: &str, course_id: &str) -> AppResult<Option<Progress>> {
        let key = (user_id.to_string(), course_id.to_string());
        Ok(self.records.read().await.get(&key).cloned())
    }

    async fn upsert(&self, progress: Progress) -> AppResult<Progress> {
        let key = (progress.user_id.clone(), progress.course_id.clone());
        self.records.write().await.insert(key, progress.clone());
        Ok(progress)
    }
}

#[derive(Default)]
pub struct InMemoryForumRepository {
    threads: Arc<RwLock<HashMap<String, ForumThread>>>,
    replies: Arc<RwLock<Vec<ForumReply>>>,
}

impl InMemoryForumRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ForumRepository for InMemoryForumRepository {
    async fn create_thread(&self, thread: ForumThread) -> AppResult<ForumThread> {
        self.threads
            .write()
            .await
            .insert(thread.id.clone(), thread.clone());
        Ok(thread)
    }

    async fn find_thread(&self, thread_id: &str) -> AppResult<Option<ForumThread>> {
        Ok(self.threads.read().await.get(thread_id).cloned())
    }

    async fn list_threads(&self, query: &ThreadQuery) -> AppResult<(Vec<ForumThread>, u64)> {
        let threads = self.threads.read().await;
        let mut items: Vec<_> = threads
            .values()
            .filter(|t| query.matches(t))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = items.len() as u64;
        let page = items
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size as usize)
            .collect();
        Ok((page, total))
    }

    async fn update_thread(&self, thread: ForumThread) -> AppResult<ForumThread> {
        let mut threads = self.threads.write().await;
        if !threads.contains_key(&thread.id) {
            return Err(AppError::NotFound("Thread not found.".to_string()));
        }
        threads.insert(thread.id.clone(), thread.clone());
        Ok(thread)
    }

    async fn create_reply(&self, reply: ForumReply) -> AppResult<ForumReply> {
        self.replies.write().await.push(reply.clone());
        Ok(reply)
    }

    async fn find_reply(&self, reply_id: &str) -> AppResult<Option<ForumReply>> {
        Ok(self
            .replies
            .read()
            .await
            .iter()
            .find(|r| r.id == reply_id)
            .cloned())
    }

    async fn replies_for_thread(&self, thread_id: &str) -> AppResult<Vec<ForumReply>> {
        Ok(self
            .replies
            .read()
            .await
            .iter()
            .filter(|r| r.thread_id == thread_id)
            .cloned()
            .collect())
    }

    async fn count_replies(&self, thread_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        let replies = self.replies.read().await;
        let mut counts = HashMap::new();
        for reply in replies.iter().filter(|r| thread_ids.contains(&r.thread_id)) {
            *counts.entry(reply.thread_id.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[derive(Default)]
pub struct InMemoryCertificateRepository {
    certificates: Arc<RwLock<Vec<Certificate>>>,
}

impl InMemoryCertificateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CertificateRepository for InMemoryCertificateRepository {
    async fn create(&self, certificate: Certificate) -> AppResult<Certificate> {
        let mut certificates = self.certificates.write().await;
        if certificates
            .iter()
            .any(|c| c.user_id == certificate.user_id && c.course_id == certificate.course_id)
        {
            return Err(AppError::AlreadyExists(
                "Certificate already issued.".to_string(),
            ));
        }
        certificates.push(certificate.clone());
        Ok(certificate)
    }

    async fn find(&self, user_id: &str, course_id: &str) -> AppResult<Option<Certificate>> {
        Ok(self
            .certificates
            .read()
            .await
            .iter()
            .find(|c| c.user_id == user_id && c.course_id == course_id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Certificate>> {
        let mut items: Vec<_> = self
            .certificates
            .read()
            .await
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.issue_date.cmp(&a.issue_date));
        Ok(items)
    }
}

static WRITE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"Console\.WriteLine\("?([^")]*)"?\)"#).expect("WRITE_LINE is a valid regex pattern")
});

/// Stands in for the C# toolchain: prints the argument of every
/// `Console.WriteLine` call, and fails to compile anything containing `#error`.
pub struct EchoRunner;

#[async_trait]
impl CodeRunner for EchoRunner {
    async fn compile_and_run(&self, source: &str) -> Result<String, RunFailure> {
        if source.contains("#error") {
            return Err(RunFailure::Compile("CS1029: #error".to_string()));
        }
        Ok(WRITE_LINE
            .captures_iter(source)
            .map(|c| format!("{}\n", &c[1]))
            .collect())
    }
}

pub fn catalog_courses() -> JsonCourseRepository {
    JsonCourseRepository::from_catalog(Catalog::from_json(CATALOG_JSON).unwrap())
}

pub fn in_memory_repositories() -> Repositories {
    Repositories {
        users: Arc::new(InMemoryUserRepository::new()),
        courses: Arc::new(catalog_courses()),
        progress: Arc::new(InMemoryProgressRepository::new()),
        forum: Arc::new(InMemoryForumRepository::new()),
        certificates: Arc::new(InMemoryCertificateRepository::new()),
    }
}

pub fn test_app_state() -> AppState {
    AppState::from_repositories(
        Config::test_config(),
        in_memory_repositories(),
        Arc::new(EchoRunner),
        None,
    )
}
