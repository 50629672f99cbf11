use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const FORUM_CATEGORIES: [&str; 5] = ["Python", "Theory", "Practice", "C#", "Off-topic"];
pub const ALL_CATEGORIES: &str = "all";

pub fn is_known_category(category: &str) -> bool {
    FORUM_CATEGORIES.iter().any(|c| *c == category)
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ForumThread {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub is_resolved: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl ForumThread {
    pub fn new(user_id: &str, title: &str, content: &str, category: &str) -> Self {
        ForumThread {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            category: category.to_string(),
            is_resolved: false,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ForumReply {
    pub id: String,
    pub thread_id: String,
    pub user_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_reply_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ForumReply {
    pub fn new(thread_id: &str, user_id: &str, content: &str, parent: Option<String>) -> Self {
        ForumReply {
            id: Uuid::new_v4().to_string(),
            thread_id: thread_id.to_string(),
            user_id: user_id.to_string(),
            content: content.to_string(),
            parent_reply_id: parent,
            created_at: Utc::now(),
        }
    }
}

/// Filter and page for the thread listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThreadQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: u64,
    pub page_size: u64,
}

impl ThreadQuery {
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// In-memory form of the store query; used where no store is involved.
    pub fn matches(&self, thread: &ForumThread) -> bool {
        if thread.is_deleted {
            return false;
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if thread.category != category {
                return false;
            }
        }
        match self.search.as_deref().filter(|s| !s.is_empty()) {
            Some(search) => {
                let needle = search.to_lowercase();
                thread.title.to_lowercase().contains(&needle)
                    || thread.content.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_categories() {
        assert!(is_known_category("C#"));
        assert!(is_known_category("HTML/CSS"));
        assert!(!is_known_category("javascript"));
        assert!(!is_known_category(ALL_CATEGORIES));
        assert!(!is_known_category("Random"));
    }

    #[test]
    fn test_thread_query_offset() {
        let query = ThreadQuery {
            page: 3,
            page_size: 10,
            ..Default::default()
        };
        assert_eq!(query.offset(), 20);

        let first = ThreadQuery {
            page: 0,
            page_size: 10,
            ..Default::default()
        };
        assert_eq!(first.offset(), 0);

        let huge = ThreadQuery {
            page: u64::MAX,
            page_size: 20,
            ..Default::default()
        };
        assert_eq!(huge.offset(), u64::MAX);
    }

    #[test]
    fn test_thread_query_matches_category_and_search() {
        let thread = ForumThread::new("u-1", "Null reference in loop", "Help me", "C#");

        let by_category = ThreadQuery {
            category: Some("C#".to_string()),
            ..Default::default()
        };
        assert!(by_category.matches(&thread));

        let wrong_category = ThreadQuery {
            category: Some("JavaScript".to_string()),
            ..Default::default()
        };
        assert!(!wrong_category.matches(&thread));

        let by_search = ThreadQuery {
            search: Some("NULL".to_string()),
            ..Default::default()
        };
        assert!(by_search.matches(&thread));

        let mut deleted = thread.clone();
        deleted.is_deleted = true;
        assert!(!ThreadQuery::default().matches(&deleted));
    }
}
