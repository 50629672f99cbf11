use std::path::Path;

use serde::Deserialize;

use crate::errors::{AppError, AppResult};
use crate::models::domain::{Course, Lesson, PracticeTask, QuizQuestion};

/// On-disk course content, one file holding every course.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub courses: Vec<CatalogCourse>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogCourse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lessons: Vec<CatalogLesson>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogLesson {
    pub id: String,
    pub title: String,
    pub content: String,
    pub is_theory: bool,
    pub order: i32,
    #[serde(default)]
    pub quiz_questions: Vec<CatalogQuizQuestion>,
    #[serde(default)]
    pub practice_tasks: Vec<CatalogPracticeTask>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuizQuestion {
    pub id: String,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPracticeTask {
    pub id: String,
    pub task_description: String,
    #[serde(default)]
    pub starter_code: String,
    pub test_cases: String,
    #[serde(default)]
    pub average_time_seconds: i32,
}

/// Flattened rows ready to be stored or indexed.
#[derive(Debug, Clone, Default)]
pub struct CatalogRows {
    pub courses: Vec<Course>,
    pub lessons: Vec<Lesson>,
    pub quiz_questions: Vec<QuizQuestion>,
    pub practice_tasks: Vec<PracticeTask>,
}

impl Catalog {
    pub fn from_json(json: &str) -> AppResult<Self> {
        let catalog: Catalog = serde_json::from_str(json)
            .map_err(|e| AppError::InternalError(format!("Invalid course catalog: {}", e)))?;
        catalog.check()?;
        Ok(catalog)
    }

    pub async fn load(path: &Path) -> AppResult<Self> {
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::InternalError(format!(
                "Failed to read course catalog {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }

    fn check(&self) -> AppResult<()> {
        for course in &self.courses {
            for lesson in &course.lessons {
                for question in &lesson.quiz_questions {
                    if !question.options.contains(&question.correct_answer) {
                        return Err(AppError::InternalError(format!(
                            "Quiz question {} has a correct answer outside its options",
                            question.id
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn into_rows(self) -> CatalogRows {
        let mut rows = CatalogRows::default();

        for course in self.courses {
            for lesson in course.lessons {
                for q in lesson.quiz_questions {
                    rows.quiz_questions.push(QuizQuestion {
                        id: q.id,
                        lesson_id: lesson.id.clone(),
                        question_text: q.question_text,
                        options: q.options,
                        correct_answer: q.correct_answer,
                    });
                }
                for t in lesson.practice_tasks {
                    rows.practice_tasks.push(PracticeTask {
                        id: t.id,
                        lesson_id: lesson.id.clone(),
                        course_id: course.id.clone(),
                        task_description: t.task_description,
                        starter_code: t.starter_code,
                        test_cases: t.test_cases,
                        average_time_seconds: t.average_time_seconds,
                    });
                }
                rows.lessons.push(Lesson {
                    id: lesson.id,
                    course_id: course.id.clone(),
                    title: lesson.title,
                    content: lesson.content,
                    is_theory: lesson.is_theory,
                    order: lesson.order,
                });
            }
            rows.courses.push(Course {
                id: course.id,
                name: course.name,
                description: course.description,
                created_at: None,
            });
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "courses": [{
            "id": "csharp",
            "name": "C# Basics",
            "description": "Intro",
            "lessons": [
                {
                    "id": "l-1", "title": "Variables", "content": "int x = 1;",
                    "isTheory": true, "order": 1,
                    "quizQuestions": [{
                        "id": "q-1", "questionText": "Type of 1?",
                        "options": ["int", "string"], "correctAnswer": "int"
                    }]
                },
                {
                    "id": "l-2", "title": "Hello", "content": "Print it",
                    "isTheory": false, "order": 2,
                    "practiceTasks": [{
                        "id": "t-1", "taskDescription": "Print Hello",
                        "testCases": "Console.WriteLine(\"Hello\");"
                    }]
                }
            ]
        }]
    }"#;

    #[test]
    fn test_catalog_flattens_into_rows() {
        let rows = Catalog::from_json(SAMPLE).unwrap().into_rows();

        assert_eq!(rows.courses.len(), 1);
        assert_eq!(rows.lessons.len(), 2);
        assert_eq!(rows.quiz_questions[0].lesson_id, "l-1");
        assert_eq!(rows.practice_tasks[0].course_id, "csharp");
        assert_eq!(rows.practice_tasks[0].lesson_id, "l-2");
        assert!(rows.lessons.iter().all(|l| l.course_id == "csharp"));
    }

    #[test]
    fn test_catalog_rejects_answer_outside_options() {
        let bad = SAMPLE.replace(r#""correctAnswer": "int""#, r#""correctAnswer": "bool""#);
        assert!(Catalog::from_json(&bad).is_err());
    }

    #[test]
    fn test_catalog_rejects_malformed_json() {
        assert!(Catalog::from_json("{ not json").is_err());
    }

    #[test]
    fn test_bundled_catalog_parses() {
        let json = include_str!("../../data/csharp_course.json");
        let rows = Catalog::from_json(json).unwrap().into_rows();
        assert!(!rows.courses.is_empty());
        assert!(rows.lessons.iter().any(|l| !l.is_theory));
        assert!(!rows.practice_tasks.is_empty());
    }
}
