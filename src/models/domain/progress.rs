use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const COMPLETE: i32 = 100;

pub fn clamp_percent(value: i32) -> i32 {
    value.clamp(0, COMPLETE)
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LessonProgress {
    pub lesson_id: String,
    pub progress: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Progress {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub theory_progress: i32,
    pub practice_progress: i32,
    #[serde(default)]
    pub lessons: Vec<LessonProgress>,
    pub last_updated: DateTime<Utc>,
}

impl Progress {
    pub fn new(user_id: &str, course_id: &str) -> Self {
        Progress {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            course_id: course_id.to_string(),
            theory_progress: 0,
            practice_progress: 0,
            lessons: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    pub fn is_theory_complete(&self) -> bool {
        self.theory_progress >= COMPLETE
    }

    pub fn is_complete(&self) -> bool {
        self.theory_progress >= COMPLETE && self.practice_progress >= COMPLETE
    }

    pub fn set_theory(&mut self, value: i32) {
        self.theory_progress = clamp_percent(value);
        self.last_updated = Utc::now();
    }

    pub fn set_practice(&mut self, value: i32) {
        self.practice_progress = clamp_percent(value);
        self.last_updated = Utc::now();
    }

    pub fn set_lesson(&mut self, lesson_id: &str, value: i32) {
        let value = clamp_percent(value);
        match self.lessons.iter_mut().find(|l| l.lesson_id == lesson_id) {
            Some(row) => row.progress = value,
            None => self.lessons.push(LessonProgress {
                lesson_id: lesson_id.to_string(),
                progress: value,
            }),
        }
        self.last_updated = Utc::now();
    }
}
