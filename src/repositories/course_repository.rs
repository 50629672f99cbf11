use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOptions, IndexOptions},
    Collection, IndexModel,
};

use crate::{
    db::{self, Database},
    errors::AppResult,
    models::{
        catalog::CatalogRows,
        domain::{Course, Lesson, PracticeTask, QuizQuestion},
    },
};

/// Read access to course content. Content is authored offline, so there are
/// no write operations here beyond the startup import.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn list_courses(&self) -> AppResult<Vec<Course>>;
    async fn find_course(&self, course_id: &str) -> AppResult<Option<Course>>;
    /// Lessons of a course ordered by `order`.
    async fn lessons_for_course(&self, course_id: &str) -> AppResult<Vec<Lesson>>;
    async fn find_lesson(&self, lesson_id: &str) -> AppResult<Option<Lesson>>;
    async fn questions_for_lesson(&self, lesson_id: &str) -> AppResult<Vec<QuizQuestion>>;
    async fn find_question(&self, question_id: &str) -> AppResult<Option<QuizQuestion>>;
    async fn tasks_for_course(&self, course_id: &str) -> AppResult<Vec<PracticeTask>>;
    async fn tasks_for_lesson(&self, lesson_id: &str) -> AppResult<Vec<PracticeTask>>;
    async fn find_task(&self, task_id: &str) -> AppResult<Option<PracticeTask>>;
}

pub struct MongoCourseRepository {
    courses: Collection<Course>,
    lessons: Collection<Lesson>,
    questions: Collection<QuizQuestion>,
    tasks: Collection<PracticeTask>,
}

fn unique_id_index() -> IndexModel {
    IndexModel::builder()
        .keys(doc! { "id": 1 })
        .options(
            IndexOptions::builder()
                .unique(true)
                .name("id_unique".to_string())
                .build(),
        )
        .build()
}

impl MongoCourseRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            courses: db.get_collection(db::COURSES),
            lessons: db.get_collection(db::LESSONS),
            questions: db.get_collection(db::QUIZ_QUESTIONS),
            tasks: db.get_collection(db::PRACTICE_TASKS),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for course content collections");

        self.courses.create_index(unique_id_index()).await?;

        let lesson_course_index = IndexModel::builder()
            .keys(doc! { "course_id": 1, "order": 1 })
            .build();
        self.lessons
            .create_indexes(vec![unique_id_index(), lesson_course_index])
            .await?;

        let question_lesson_index = IndexModel::builder()
            .keys(doc! { "lesson_id": 1 })
            .build();
        self.questions
            .create_indexes(vec![unique_id_index(), question_lesson_index])
            .await?;

        let task_course_index = IndexModel::builder()
            .keys(doc! { "course_id": 1 })
            .build();
        let task_lesson_index = IndexModel::builder()
            .keys(doc! { "lesson_id": 1 })
            .build();
        self.tasks
            .create_indexes(vec![unique_id_index(), task_course_index, task_lesson_index])
            .await?;

        log::info!("Successfully created indexes for course content collections");
        Ok(())
    }

    /// Seeds the store from the catalog unless courses already exist.
    /// Returns whether anything was imported.
    pub async fn import_if_empty(&self, rows: CatalogRows) -> AppResult<bool> {
        if self.courses.count_documents(doc! {}).await? > 0 {
            return Ok(false);
        }

        log::info!(
            "Importing course catalog: {} courses, {} lessons, {} quiz questions, {} practice tasks",
            rows.courses.len(),
            rows.lessons.len(),
            rows.quiz_questions.len(),
            rows.practice_tasks.len()
        );

        if !rows.courses.is_empty() {
            self.courses.insert_many(&rows.courses).await?;
        }
        if !rows.lessons.is_empty() {
            self.lessons.insert_many(&rows.lessons).await?;
        }
        if !rows.quiz_questions.is_empty() {
            self.questions.insert_many(&rows.quiz_questions).await?;
        }
        if !rows.practice_tasks.is_empty() {
            self.tasks.insert_many(&rows.practice_tasks).await?;
        }

        Ok(true)
    }
}

#[async_trait]
impl CourseRepository for MongoCourseRepository {
    async fn list_courses(&self) -> AppResult<Vec<Course>> {
        let options = FindOptions::builder().sort(doc! { "name": 1 }).build();
        let cursor = self.courses.find(doc! {}).with_options(options).await?;
        let courses: Vec<Course> = cursor.try_collect().await?;
        Ok(courses)
    }

    async fn find_course(&self, course_id: &str) -> AppResult<Option<Course>> {
        let course = self.courses.find_one(doc! { "id": course_id }).await?;
        Ok(course)
    }

    async fn lessons_for_course(&self, course_id: &str) -> AppResult<Vec<Lesson>> {
        let options = FindOptions::builder().sort(doc! { "order": 1 }).build();
        let cursor = self
            .lessons
            .find(doc! { "course_id": course_id })
            .with_options(options)
            .await?;
        let lessons: Vec<Lesson> = cursor.try_collect().await?;
        Ok(lessons)
    }

    async fn find_lesson(&self, lesson_id: &str) -> AppResult<Option<Lesson>> {
        let lesson = self.lessons.find_one(doc! { "id": lesson_id }).await?;
        Ok(lesson)
    }

    async fn questions_for_lesson(&self, lesson_id: &str) -> AppResult<Vec<QuizQuestion>> {
        let cursor = self.questions.find(doc! { "lesson_id": lesson_id }).await?;
        let questions: Vec<QuizQuestion> = cursor.try_collect().await?;
        Ok(questions)
    }

    async fn find_question(&self, question_id: &str) -> AppResult<Option<QuizQuestion>> {
        let question = self.questions.find_one(doc! { "id": question_id }).await?;
        Ok(question)
    }

    async fn tasks_for_course(&self, course_id: &str) -> AppResult<Vec<PracticeTask>> {
        let cursor = self.tasks.find(doc! { "course_id": course_id }).await?;
        let tasks: Vec<PracticeTask> = cursor.try_collect().await?;
        Ok(tasks)
    }

    async fn tasks_for_lesson(&self, lesson_id: &str) -> AppResult<Vec<PracticeTask>> {
        let cursor = self.tasks.find(doc! { "lesson_id": lesson_id }).await?;
        let tasks: Vec<PracticeTask> = cursor.try_collect().await?;
        Ok(tasks)
    }

    async fn find_task(&self, task_id: &str) -> AppResult<Option<PracticeTask>> {
        let task = self.tasks.find_one(doc! { "id": task_id }).await?;
        Ok(task)
    }
}
