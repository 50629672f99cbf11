use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{progress::COMPLETE, PracticeTask},
        dto::{
            request::SubmitCodeRequest,
            response::{PracticeTaskDto, SubmissionFailedResponse, SubmissionPassedResponse},
        },
    },
    repositories::CourseRepository,
    services::{
        course_service::ensure_practice_unlocked,
        gamification::{GamificationService, Reward},
        grader::{CodeGrader, GradeOutcome},
        progress_service::ProgressService,
    },
};

#[derive(Debug)]
pub enum SubmissionOutcome {
    Passed(SubmissionPassedResponse),
    Failed(SubmissionFailedResponse),
}

pub struct PracticeService {
    courses: Arc<dyn CourseRepository>,
    progress: Arc<ProgressService>,
    gamification: Arc<GamificationService>,
    grader: CodeGrader,
}

impl PracticeService {
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        progress: Arc<ProgressService>,
        gamification: Arc<GamificationService>,
        grader: CodeGrader,
    ) -> Self {
        Self {
            courses,
            progress,
            gamification,
            grader,
        }
    }

    async fn ensure_unlocked(&self, user_id: &str, course_id: &str) -> AppResult<()> {
        let theory = self
            .progress
            .find(user_id, course_id)
            .await?
            .map(|p| p.theory_progress)
            .unwrap_or(0);
        ensure_practice_unlocked(theory)
    }

    async fn find_task(&self, task_id: &str) -> AppResult<PracticeTask> {
        self.courses
            .find_task(task_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Practice task not found.".to_string()))
    }

    pub async fn tasks_for_course(
        &self,
        user_id: &str,
        course_id: &str,
    ) -> AppResult<Vec<PracticeTaskDto>> {
        self.ensure_unlocked(user_id, course_id).await?;

        let tasks = self.courses.tasks_for_course(course_id).await?;
        if tasks.is_empty() {
            return Err(AppError::NotFound(
                "No practice tasks found for this course.".to_string(),
            ));
        }

        Ok(tasks.into_iter().map(PracticeTaskDto::from).collect())
    }

    pub async fn get_task(&self, user_id: &str, task_id: &str) -> AppResult<PracticeTaskDto> {
        let task = self.find_task(task_id).await?;
        self.ensure_unlocked(user_id, &task.course_id).await?;
        Ok(task.into())
    }

    pub async fn submit(
        &self,
        user_id: &str,
        task_id: &str,
        request: SubmitCodeRequest,
    ) -> AppResult<SubmissionOutcome> {
        request.validate()?;

        let task = self.find_task(task_id).await?;
        self.ensure_unlocked(user_id, &task.course_id).await?;

        let output = match self.grader.grade(&request.code, &task.test_cases).await {
            GradeOutcome::Passed { output } => output,
            GradeOutcome::Failed(failure) => {
                log::info!(
                    "Submission by user {} for task {} failed: {}",
                    user_id,
                    task.id,
                    failure
                );
                return Ok(SubmissionOutcome::Failed(SubmissionFailedResponse {
                    message: "Code execution failed.".to_string(),
                    error: failure.to_string(),
                    output: failure.output().map(str::to_string),
                }));
            }
        };

        let task_count = self.courses.tasks_for_course(&task.course_id).await?.len();
        if task_count == 0 {
            return Err(AppError::InternalError(
                "No practice tasks found for this course.".to_string(),
            ));
        }
        let increment = COMPLETE / task_count as i32;

        let progress = self
            .progress
            .add_practice(user_id, &task.course_id, increment)
            .await?;
        self.gamification
            .reward(user_id, Reward::PracticeTaskPassed)
            .await?;

        log::info!("User {} passed practice task {}", user_id, task.id);

        Ok(SubmissionOutcome::Passed(SubmissionPassedResponse {
            message: "Code executed successfully.".to_string(),
            output,
            practice_progress: progress.practice_progress,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::{Progress, User},
        repositories::{
            certificate_repository::MockCertificateRepository,
            progress_repository::MockProgressRepository, user_repository::MockUserRepository,
            UserRepository,
        },
        services::grader::{MockCodeRunner, RunFailure},
        test_utils::fixtures::catalog_courses,
    };

    const COURSE: &str = "csharp-basics";
    const TASK: &str = "csharp-basics-hello";

    const SOLUTION: &str = r#"using System;
class Program
{
    static void Main()
    {
        Console.WriteLine("Hello, World!");
    }
}"#;

    fn progress_with(theory: i32) -> MockProgressRepository {
        let mut progress = MockProgressRepository::new();
        progress.expect_find().returning(move |user_id, course_id| {
            let mut record = Progress::new(user_id, course_id);
            record.set_theory(theory);
            Ok(Some(record))
        });
        progress.expect_upsert().returning(|p| Ok(p));
        progress
    }

    fn service(progress: MockProgressRepository, runner: MockCodeRunner) -> PracticeService {
        let courses: Arc<dyn CourseRepository> = Arc::new(catalog_courses());

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|_| Ok(Some(User::new("ada", "ada@example.com", "hash"))));
        users.expect_save().returning(|user| Ok(Some(user)));
        let users: Arc<dyn UserRepository> = Arc::new(users);
        let gamification = Arc::new(GamificationService::new(users));

        let progress = Arc::new(ProgressService::new(
            Arc::new(progress),
            courses.clone(),
            Arc::new(MockCertificateRepository::new()),
            gamification.clone(),
        ));

        PracticeService::new(
            courses,
            progress,
            gamification,
            CodeGrader::new(Arc::new(runner)),
        )
    }

    #[tokio::test]
    async fn test_tasks_locked_until_theory_complete() {
        let svc = service(progress_with(50), MockCodeRunner::new());

        let list = svc.tasks_for_course("u-1", COURSE).await;
        assert!(matches!(list, Err(AppError::Forbidden(_))));

        let one = svc.get_task("u-1", TASK).await;
        assert!(matches!(one, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_tasks_listed_once_unlocked() {
        let tasks = service(progress_with(100), MockCodeRunner::new())
            .tasks_for_course("u-1", COURSE)
            .await
            .unwrap();
        assert_eq!(tasks.len(), 3);
    }

    #[tokio::test]
    async fn test_course_without_tasks_is_not_found() {
        let result = service(progress_with(100), MockCodeRunner::new())
            .tasks_for_course("u-1", "no-such-course")
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_submit_locked_never_runs_code() {
        let mut runner = MockCodeRunner::new();
        runner.expect_compile_and_run().never();

        let result = service(progress_with(99), runner)
            .submit(
                "u-1",
                TASK,
                SubmitCodeRequest {
                    code: SOLUTION.to_string(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_passing_submission_advances_practice() {
        let mut runner = MockCodeRunner::new();
        runner
            .expect_compile_and_run()
            .returning(|_| Ok("Hello, World!\n".to_string()));

        let outcome = service(progress_with(100), runner)
            .submit(
                "u-1",
                TASK,
                SubmitCodeRequest {
                    code: SOLUTION.to_string(),
                },
            )
            .await
            .unwrap();

        match outcome {
            SubmissionOutcome::Passed(passed) => {
                assert_eq!(passed.output, "Hello, World!");
                assert_eq!(passed.practice_progress, 33);
            }
            SubmissionOutcome::Failed(failed) => panic!("unexpected failure: {}", failed.error),
        }
    }

    #[tokio::test]
    async fn test_failing_submission_reports_error() {
        let mut runner = MockCodeRunner::new();
        runner
            .expect_compile_and_run()
            .returning(|_| Err(RunFailure::Compile("CS1002: ; expected".to_string())));

        let outcome = service(progress_with(100), runner)
            .submit(
                "u-1",
                TASK,
                SubmitCodeRequest {
                    code: SOLUTION.to_string(),
                },
            )
            .await
            .unwrap();

        match outcome {
            SubmissionOutcome::Failed(failed) => {
                assert_eq!(failed.message, "Code execution failed.");
                assert_eq!(failed.error, "Compilation error: CS1002: ; expected");
                assert_eq!(failed.output, None);
            }
            SubmissionOutcome::Passed(_) => panic!("expected failure"),
        }
    }
}
