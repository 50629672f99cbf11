use std::path::Path;

use async_trait::async_trait;

use crate::{
    errors::AppResult,
    models::{
        catalog::{Catalog, CatalogRows},
        domain::{Course, Lesson, PracticeTask, QuizQuestion},
    },
    repositories::CourseRepository,
};

/// Serves course content straight from the catalog file, held in memory.
pub struct JsonCourseRepository {
    rows: CatalogRows,
}

impl JsonCourseRepository {
    pub fn from_catalog(catalog: Catalog) -> Self {
        let mut rows = catalog.into_rows();
        rows.courses.sort_by(|a, b| a.name.cmp(&b.name));
        rows.lessons.sort_by_key(|l| l.order);
        Self { rows }
    }

    pub async fn load(path: &Path) -> AppResult<Self> {
        let catalog = Catalog::load(path).await?;
        log::info!("Loaded course catalog from {}", path.display());
        Ok(Self::from_catalog(catalog))
    }
}

#[async_trait]
impl CourseRepository for JsonCourseRepository {
    async fn list_courses(&self) -> AppResult<Vec<Course>> {
        Ok(self.rows.courses.clone())
    }

    async fn find_course(&self, course_id: &str) -> AppResult<Option<Course>> {
        Ok(self.rows.courses.iter().find(|c| c.id == course_id).cloned())
    }

    async fn lessons_for_course(&self, course_id: &str) -> AppResult<Vec<Lesson>> {
        Ok(self
            .rows
            .lessons
            .iter()
            .filter(|l| l.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn find_lesson(&self, lesson_id: &str) -> AppResult<Option<Lesson>> {
        Ok(self.rows.lessons.iter().find(|l| l.id == lesson_id).cloned())
    }

    async fn questions_for_lesson(&self, lesson_id: &str) -> AppResult<Vec<QuizQuestion>> {
        Ok(self
            .rows
            .quiz_questions
            .iter()
            .filter(|q| q.lesson_id == lesson_id)
            .cloned()
            .collect())
    }

    async fn find_question(&self, question_id: &str) -> AppResult<Option<QuizQuestion>> {
        Ok(self
            .rows
            .quiz_questions
            .iter()
            .find(|q| q.id == question_id)
            .cloned())
    }

    async fn tasks_for_course(&self, course_id: &str) -> AppResult<Vec<PracticeTask>> {
        Ok(self
            .rows
            .practice_tasks
            .iter()
            .filter(|t| t.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn tasks_for_lesson(&self, lesson_id: &str) -> AppResult<Vec<PracticeTask>> {
        Ok(self
            .rows
            .practice_tasks
            .iter()
            .filter(|t| t.lesson_id == lesson_id)
            .cloned()
            .collect())
    }

    async fn find_task(&self, task_id: &str) -> AppResult<Option<PracticeTask>> {
        Ok(self
            .rows
            .practice_tasks
            .iter()
            .find(|t| t.id == task_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository() -> JsonCourseRepository {
        let json = include_str!("../../data/csharp_course.json");
        JsonCourseRepository::from_catalog(Catalog::from_json(json).unwrap())
    }

    #[tokio::test]
    async fn test_lessons_are_ordered() {
        let repo = repository();
        let course = repo.list_courses().await.unwrap().remove(0);
        let lessons = repo.lessons_for_course(&course.id).await.unwrap();

        assert!(!lessons.is_empty());
        assert!(lessons.windows(2).all(|w| w[0].order <= w[1].order));
    }

    #[tokio::test]
    async fn test_lookup_by_id() {
        let repo = repository();
        let course = repo.list_courses().await.unwrap().remove(0);
        let task = repo.tasks_for_course(&course.id).await.unwrap().remove(0);

        let found = repo.find_task(&task.id).await.unwrap();
        assert_eq!(found, Some(task.clone()));

        let lesson_tasks = repo.tasks_for_lesson(&task.lesson_id).await.unwrap();
        assert!(lesson_tasks.iter().any(|t| t.id == task.id));

        assert!(repo.find_course("missing").await.unwrap().is_none());
        assert!(repo.find_question("missing").await.unwrap().is_none());
    }
}
