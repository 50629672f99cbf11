use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{progress::COMPLETE, Course, Lesson, Progress},
        dto::{
            request::ProgressUpdateRequest,
            response::{CourseDetailDto, CourseSummaryDto, LessonDetailDto, MessageResponse},
        },
    },
    repositories::{CourseRepository, ProgressRepository},
};

pub const PRACTICE_LOCKED: &str = "Practice is locked until theory is 100% complete.";

/// Fails with 403 unless theory is complete.
pub fn ensure_practice_unlocked(theory_progress: i32) -> AppResult<()> {
    if theory_progress < COMPLETE {
        return Err(AppError::Forbidden(PRACTICE_LOCKED.to_string()));
    }
    Ok(())
}

pub struct CourseService {
    courses: Arc<dyn CourseRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl CourseService {
    pub fn new(courses: Arc<dyn CourseRepository>, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { courses, progress }
    }

    pub async fn list_courses(&self) -> AppResult<Vec<CourseSummaryDto>> {
        let courses = self.courses.list_courses().await?;

        let mut summaries = Vec::with_capacity(courses.len());
        for course in courses {
            let lesson_count = self.courses.lessons_for_course(&course.id).await?.len();
            summaries.push(CourseSummaryDto::new(course, lesson_count));
        }

        Ok(summaries)
    }

    pub async fn get_course(&self, course_id: &str) -> AppResult<Course> {
        self.courses
            .find_course(course_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found.".to_string()))
    }

    /// Theory percentage for a signed-in user; anonymous visitors count as 0.
    pub async fn theory_progress(&self, user_id: Option<&str>, course_id: &str) -> AppResult<i32> {
        let Some(user_id) = user_id else {
            return Ok(0);
        };
        Ok(self
            .progress
            .find(user_id, course_id)
            .await?
            .map(|p| p.theory_progress)
            .unwrap_or(0))
    }

    pub async fn get_course_detail(
        &self,
        user_id: Option<&str>,
        course_id: &str,
    ) -> AppResult<CourseDetailDto> {
        let course = self.get_course(course_id).await?;
        let theory = self.theory_progress(user_id, course_id).await?;
        let lessons = self.courses.lessons_for_course(course_id).await?;

        Ok(CourseDetailDto::new(course, lessons, theory))
    }

    pub async fn get_lesson(
        &self,
        user_id: Option<&str>,
        course_id: &str,
        lesson_id: &str,
    ) -> AppResult<LessonDetailDto> {
        let lesson = self
            .courses
            .find_lesson(lesson_id)
            .await?
            .filter(|l| l.course_id == course_id)
            .ok_or_else(|| AppError::NotFound("Lesson not found.".to_string()))?;

        if !lesson.is_theory {
            let theory = self.theory_progress(user_id, course_id).await?;
            ensure_practice_unlocked(theory)?;
        }

        self.lesson_detail(lesson).await
    }

    async fn lesson_detail(&self, lesson: Lesson) -> AppResult<LessonDetailDto> {
        let (quiz_questions, practice_tasks) = if lesson.is_theory {
            let questions = self.courses.questions_for_lesson(&lesson.id).await?;
            (questions.into_iter().map(Into::into).collect(), Vec::new())
        } else {
            let tasks = self.courses.tasks_for_lesson(&lesson.id).await?;
            (Vec::new(), tasks.into_iter().map(Into::into).collect())
        };

        Ok(LessonDetailDto {
            id: lesson.id,
            course_id: lesson.course_id,
            title: lesson.title,
            content: lesson.content,
            is_theory: lesson.is_theory,
            order: lesson.order,
            quiz_questions,
            practice_tasks,
        })
    }

    /// Records theory progress without any gamification reward.
    pub async fn set_theory_progress(
        &self,
        user_id: &str,
        course_id: &str,
        request: ProgressUpdateRequest,
    ) -> AppResult<MessageResponse> {
        request.validate()?;
        self.get_course(course_id).await?;

        let mut progress = self
            .progress
            .find(user_id, course_id)
            .await?
            .unwrap_or_else(|| Progress::new(user_id, course_id));
        progress.set_theory(request.progress);
        self.progress.upsert(progress).await?;

        Ok(MessageResponse::new("Theory progress updated."))
    }
}
