use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{
    Certificate, Course, Lesson, LessonProgress, PracticeTask, Progress, QuizQuestion, SkillTrack,
    SkillTree, User,
};
use crate::services::gamification::{rank_name, xp_for_next_level};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        MessageResponse {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct SkillTrackDto {
    pub progress: i32,
    pub rank: i32,
}

impl From<SkillTrack> for SkillTrackDto {
    fn from(track: SkillTrack) -> Self {
        SkillTrackDto {
            progress: track.progress,
            rank: track.rank,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct SkillTreeDto {
    pub theory_master: SkillTrackDto,
    pub practice_pro: SkillTrackDto,
    pub quiz_champion: SkillTrackDto,
    pub community_star: SkillTrackDto,
}

impl From<SkillTree> for SkillTreeDto {
    fn from(tree: SkillTree) -> Self {
        SkillTreeDto {
            theory_master: tree.theory_master.into(),
            practice_pro: tree.practice_pro.into(),
            quiz_champion: tree.quiz_champion.into(),
            community_star: tree.community_star.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDto {
    pub id: String,
    pub course_id: String,
    pub course_name: String,
    pub issue_date: DateTime<Utc>,
    pub certificate_url: String,
}

impl CertificateDto {
    pub fn new(certificate: Certificate, course_name: String) -> Self {
        CertificateDto {
            id: certificate.id,
            course_id: certificate.course_id,
            course_name,
            issue_date: certificate.issue_date,
            certificate_url: certificate.certificate_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub id: String,
    pub username: String,
    pub email: String,
    pub rating: i32,
    pub rank_name: String,
    pub level: i32,
    pub current_xp: i64,
    pub xp_to_next_level: i64,
    pub total_xp: i64,
    pub current_streak: i32,
    pub skills: SkillTreeDto,
    pub achievements: Vec<String>,
    pub avatar_url: Option<String>,
    pub certificates: Vec<CertificateDto>,
    #[graphql(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProfileDto {
    pub fn new(user: User, certificates: Vec<CertificateDto>) -> Self {
        ProfileDto {
            rank_name: rank_name(user.rating).to_string(),
            xp_to_next_level: xp_for_next_level(user.level),
            id: user.id,
            username: user.username,
            email: user.email,
            rating: user.rating,
            level: user.level,
            current_xp: user.current_xp,
            total_xp: user.total_xp,
            current_streak: user.current_streak,
            skills: user.skills.into(),
            achievements: user.achievements,
            avatar_url: user.avatar_url,
            certificates,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummaryDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub lesson_count: u64,
}

impl CourseSummaryDto {
    pub fn new(course: Course, lesson_count: usize) -> Self {
        CourseSummaryDto {
            id: course.id,
            name: course.name,
            description: course.description,
            lesson_count: lesson_count as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSummaryDto {
    pub id: String,
    pub title: String,
    pub is_theory: bool,
    pub order: i32,
    pub is_accessible: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetailDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub theory_progress: i32,
    pub is_practice_unlocked: bool,
    pub lessons: Vec<LessonSummaryDto>,
}

impl CourseDetailDto {
    pub fn new(course: Course, lessons: Vec<Lesson>, theory_progress: i32) -> Self {
        let lessons = lessons
            .into_iter()
            .map(|lesson| LessonSummaryDto {
                is_accessible: lesson.is_accessible(theory_progress),
                id: lesson.id,
                title: lesson.title,
                is_theory: lesson.is_theory,
                order: lesson.order,
            })
            .collect();

        CourseDetailDto {
            id: course.id,
            name: course.name,
            description: course.description,
            theory_progress,
            is_practice_unlocked: theory_progress >= 100,
            lessons,
        }
    }
}

/// Quiz question with the answer withheld.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestionDto {
    pub id: String,
    pub question_text: String,
    pub options: Vec<String>,
}

impl From<QuizQuestion> for QuizQuestionDto {
    fn from(question: QuizQuestion) -> Self {
        QuizQuestionDto {
            id: question.id,
            question_text: question.question_text,
            options: question.options,
        }
    }
}

/// Practice task with the test-case source withheld.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeTaskDto {
    pub id: String,
    pub lesson_id: String,
    pub task_description: String,
    pub starter_code: String,
    pub average_time_seconds: i32,
}

impl From<PracticeTask> for PracticeTaskDto {
    fn from(task: PracticeTask) -> Self {
        PracticeTaskDto {
            id: task.id,
            lesson_id: task.lesson_id,
            task_description: task.task_description,
            starter_code: task.starter_code,
            average_time_seconds: task.average_time_seconds,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDetailDto {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub content: String,
    pub is_theory: bool,
    pub order: i32,
    pub quiz_questions: Vec<QuizQuestionDto>,
    pub practice_tasks: Vec<PracticeTaskDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgressDto {
    pub lesson_id: String,
    pub progress: i32,
}

impl From<LessonProgress> for LessonProgressDto {
    fn from(row: LessonProgress) -> Self {
        LessonProgressDto {
            lesson_id: row.lesson_id,
            progress: row.progress,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDto {
    pub course_id: String,
    pub theory_progress: i32,
    pub practice_progress: i32,
    pub lessons: Vec<LessonProgressDto>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl ProgressDto {
    pub fn empty(course_id: &str) -> Self {
        ProgressDto {
            course_id: course_id.to_string(),
            theory_progress: 0,
            practice_progress: 0,
            lessons: Vec::new(),
            last_updated: None,
        }
    }
}

impl From<Progress> for ProgressDto {
    fn from(progress: Progress) -> Self {
        ProgressDto {
            course_id: progress.course_id,
            theory_progress: progress.theory_progress,
            practice_progress: progress.practice_progress,
            lessons: progress.lessons.into_iter().map(Into::into).collect(),
            last_updated: Some(progress.last_updated),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdateResponse {
    pub message: String,
    pub theory_progress: i32,
    pub practice_progress: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    pub is_correct: bool,
    pub correct_answer: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPassedResponse {
    pub message: String,
    pub output: String,
    pub practice_progress: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionFailedResponse {
    pub message: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSummaryDto {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub is_resolved: bool,
    pub created_at: DateTime<Utc>,
    pub author_id: String,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub reply_count: u64,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPageDto {
    pub threads: Vec<ThreadSummaryDto>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyDto {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub content: String,
    pub parent_reply_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<ReplyDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadDetailDto {
    #[serde(flatten)]
    pub thread: ThreadSummaryDto,
    pub replies: Vec<ReplyDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedThreadResponse {
    pub thread_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedReplyResponse {
    pub reply_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateIssuedResponse {
    pub message: String,
    pub certificate_id: String,
    pub certificate_url: String,
}
