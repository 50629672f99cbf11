use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Lesson {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub content: String,
    pub is_theory: bool,
    pub order: i32,
}

impl Lesson {
    /// Practice lessons open only once the course theory is fully complete.
    pub fn is_accessible(&self, theory_progress: i32) -> bool {
        self.is_theory || theory_progress >= 100
    }
}
