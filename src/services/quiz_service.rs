use std::sync::Arc;

use chrono::Utc;

use crate::{
    errors::{AppError, AppResult},
    models::dto::{
        request::SubmitAnswerRequest,
        response::{QuizQuestionDto, SubmitAnswerResponse},
    },
    repositories::CourseRepository,
    services::gamification::{GamificationService, Reward},
};

pub struct QuizService {
    courses: Arc<dyn CourseRepository>,
    gamification: Arc<GamificationService>,
}

impl QuizService {
    pub fn new(courses: Arc<dyn CourseRepository>, gamification: Arc<GamificationService>) -> Self {
        Self {
            courses,
            gamification,
        }
    }

    /// Questions of a lesson with the correct answers left out.
    pub async fn questions_for_lesson(&self, lesson_id: &str) -> AppResult<Vec<QuizQuestionDto>> {
        self.courses
            .find_lesson(lesson_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Lesson not found.".to_string()))?;

        let questions = self.courses.questions_for_lesson(lesson_id).await?;
        Ok(questions.into_iter().map(QuizQuestionDto::from).collect())
    }

    pub async fn submit_answer(
        &self,
        user_id: &str,
        question_id: &str,
        request: SubmitAnswerRequest,
    ) -> AppResult<SubmitAnswerResponse> {
        let question = self
            .courses
            .find_question(question_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Quiz question not found.".to_string()))?;

        let is_correct = question.is_correct(&request.answer);
        if is_correct {
            let reward = Reward::QuizAnsweredCorrectly;
            let question_id = question.id.clone();
            self.gamification
                .apply(user_id, reward.reason(), move |progression| {
                    if progression.mark_question_solved(&question_id) {
                        reward.apply(progression, Utc::now());
                    }
                })
                .await?;
        }

        Ok(SubmitAnswerResponse {
            is_correct,
            correct_answer: (!is_correct).then_some(question.correct_answer),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::{Lesson, QuizQuestion, User},
        repositories::{
            course_repository::MockCourseRepository, user_repository::MockUserRepository,
            UserRepository,
        },
    };

    fn question() -> QuizQuestion {
        QuizQuestion {
            id: "q-1".to_string(),
            lesson_id: "l-1".to_string(),
            question_text: "Entry point?".to_string(),
            options: vec!["Main".to_string(), "Start".to_string()],
            correct_answer: "Main".to_string(),
        }
    }

    fn courses_with_question() -> MockCourseRepository {
        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_question()
            .returning(|_| Ok(Some(question())));
        courses
    }

    fn service(courses: MockCourseRepository, users: MockUserRepository) -> QuizService {
        let users: Arc<dyn UserRepository> = Arc::new(users);
        QuizService::new(Arc::new(courses), Arc::new(GamificationService::new(users)))
    }

    #[tokio::test]
    async fn test_correct_answer_rewards_and_hides_answer() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|_| Ok(Some(User::new("ada", "ada@example.com", "hash"))));
        users
            .expect_save()
            .withf(|user| {
                user.total_xp == 10 && user.rating == 3 && user.solved_questions == ["q-1"]
            })
            .times(1)
            .returning(|user| Ok(Some(user)));

        let response = service(courses_with_question(), users)
            .submit_answer(
                "u-1",
                "q-1",
                SubmitAnswerRequest {
                    answer: "Main".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(response.is_correct);
        assert_eq!(response.correct_answer, None);
    }

    #[tokio::test]
    async fn test_repeat_correct_answer_is_not_rewarded_again() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| {
            let mut user = User::new("ada", "ada@example.com", "hash");
            user.solved_questions.push("q-1".to_string());
            Ok(Some(user))
        });
        users
            .expect_save()
            .withf(|user| user.total_xp == 0 && user.rating == 0)
            .times(1)
            .returning(|user| Ok(Some(user)));

        let response = service(courses_with_question(), users)
            .submit_answer(
                "u-1",
                "q-1",
                SubmitAnswerRequest {
                    answer: "Main".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(response.is_correct);
    }

    #[tokio::test]
    async fn test_wrong_answer_reveals_correct_one_without_reward() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().never();
        users.expect_save().never();

        let response = service(courses_with_question(), users)
            .submit_answer(
                "u-1",
                "q-1",
                SubmitAnswerRequest {
                    answer: "Start".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(!response.is_correct);
        assert_eq!(response.correct_answer.as_deref(), Some("Main"));
    }

    #[tokio::test]
    async fn test_unknown_question() {
        let mut courses = MockCourseRepository::new();
        courses.expect_find_question().returning(|_| Ok(None));

        let result = service(courses, MockUserRepository::new())
            .submit_answer(
                "u-1",
                "missing",
                SubmitAnswerRequest {
                    answer: "Main".to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_questions_for_lesson() {
        let mut courses = MockCourseRepository::new();
        courses.expect_find_lesson().returning(|_| {
            Ok(Some(Lesson {
                id: "l-1".to_string(),
                course_id: "c-1".to_string(),
                title: "Methods".to_string(),
                content: String::new(),
                is_theory: true,
                order: 1,
            }))
        });
        courses
            .expect_questions_for_lesson()
            .returning(|_| Ok(vec![question()]));

        let questions = service(courses, MockUserRepository::new())
            .questions_for_lesson("l-1")
            .await
            .unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].options.len(), 2);
    }
}
