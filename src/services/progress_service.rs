use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Certificate, Progress},
        dto::{
            request::ProgressUpdateRequest,
            response::{ProgressDto, ProgressUpdateResponse},
        },
    },
    repositories::{CertificateRepository, CourseRepository, ProgressRepository},
    services::gamification::{GamificationService, Reward},
};

enum Track {
    Theory,
    Practice,
}

pub struct ProgressService {
    progress: Arc<dyn ProgressRepository>,
    courses: Arc<dyn CourseRepository>,
    certificates: Arc<dyn CertificateRepository>,
    gamification: Arc<GamificationService>,
}

impl ProgressService {
    pub fn new(
        progress: Arc<dyn ProgressRepository>,
        courses: Arc<dyn CourseRepository>,
        certificates: Arc<dyn CertificateRepository>,
        gamification: Arc<GamificationService>,
    ) -> Self {
        Self {
            progress,
            courses,
            certificates,
            gamification,
        }
    }

    pub async fn find(&self, user_id: &str, course_id: &str) -> AppResult<Option<Progress>> {
        self.progress.find(user_id, course_id).await
    }

    pub async fn get_progress(&self, user_id: &str, course_id: &str) -> AppResult<ProgressDto> {
        Ok(self
            .progress
            .find(user_id, course_id)
            .await?
            .map(ProgressDto::from)
            .unwrap_or_else(|| ProgressDto::empty(course_id)))
    }

    pub async fn update_theory(
        &self,
        user_id: &str,
        course_id: &str,
        request: ProgressUpdateRequest,
    ) -> AppResult<ProgressUpdateResponse> {
        self.update_track(user_id, course_id, request, Track::Theory)
            .await
    }

    pub async fn update_practice(
        &self,
        user_id: &str,
        course_id: &str,
        request: ProgressUpdateRequest,
    ) -> AppResult<ProgressUpdateResponse> {
        self.update_track(user_id, course_id, request, Track::Practice)
            .await
    }

    async fn update_track(
        &self,
        user_id: &str,
        course_id: &str,
        request: ProgressUpdateRequest,
        track: Track,
    ) -> AppResult<ProgressUpdateResponse> {
        request.validate()?;
        self.ensure_course(course_id).await?;

        let mut progress = self.load_or_new(user_id, course_id).await?;
        let (reward, message) = match track {
            Track::Theory => {
                progress.set_theory(request.progress);
                (Reward::TheoryProgress, "Theory progress updated successfully.")
            }
            Track::Practice => {
                progress.set_practice(request.progress);
                (Reward::PracticeProgress, "Practice progress updated successfully.")
            }
        };

        let progress = self.progress.upsert(progress).await?;
        self.gamification.reward(user_id, reward).await?;
        let certificate_url = self.issue_certificate_if_complete(&progress).await?;

        Ok(ProgressUpdateResponse {
            message: message.to_string(),
            theory_progress: progress.theory_progress,
            practice_progress: progress.practice_progress,
            certificate_url,
        })
    }

    pub async fn update_lesson(
        &self,
        user_id: &str,
        course_id: &str,
        lesson_id: &str,
        request: ProgressUpdateRequest,
    ) -> AppResult<ProgressUpdateResponse> {
        request.validate()?;
        self.courses
            .find_lesson(lesson_id)
            .await?
            .filter(|l| l.course_id == course_id)
            .ok_or_else(|| AppError::NotFound("Lesson not found.".to_string()))?;

        let mut progress = self.load_or_new(user_id, course_id).await?;
        progress.set_lesson(lesson_id, request.progress);
        let progress = self.progress.upsert(progress).await?;
        let certificate_url = self.issue_certificate_if_complete(&progress).await?;

        Ok(ProgressUpdateResponse {
            message: "Lesson progress updated successfully.".to_string(),
            theory_progress: progress.theory_progress,
            practice_progress: progress.practice_progress,
            certificate_url,
        })
    }

    /// Adds `delta` to practice progress (clamped) and returns the new record.
    pub async fn add_practice(
        &self,
        user_id: &str,
        course_id: &str,
        delta: i32,
    ) -> AppResult<Progress> {
        let mut progress = self.load_or_new(user_id, course_id).await?;
        let current = progress.practice_progress;
        progress.set_practice(current.saturating_add(delta));
        let progress = self.progress.upsert(progress).await?;
        self.issue_certificate_if_complete(&progress).await?;
        Ok(progress)
    }

    /// Issues the course certificate once both tracks reach 100. Returns the
    /// certificate URL when the user holds one for this course.
    async fn issue_certificate_if_complete(&self, progress: &Progress) -> AppResult<Option<String>> {
        if !progress.is_complete() {
            return Ok(None);
        }

        if let Some(existing) = self
            .certificates
            .find(&progress.user_id, &progress.course_id)
            .await?
        {
            return Ok(Some(existing.certificate_url));
        }

        let certificate = Certificate::issue(&progress.user_id, &progress.course_id);
        let url = certificate.certificate_url.clone();
        match self.certificates.create(certificate).await {
            Ok(issued) => {
                log::info!(
                    "Issued certificate {} to user {} for course {}",
                    issued.id,
                    issued.user_id,
                    issued.course_id
                );
                Ok(Some(url))
            }
            Err(AppError::AlreadyExists(_)) => Ok(Some(url)),
            Err(e) => Err(e),
        }
    }

    async fn ensure_course(&self, course_id: &str) -> AppResult<()> {
        self.courses
            .find_course(course_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Course not found.".to_string()))
    }

    async fn load_or_new(&self, user_id: &str, course_id: &str) -> AppResult<Progress> {
        Ok(self
            .progress
            .find(user_id, course_id)
            .await?
            .unwrap_or_else(|| Progress::new(user_id, course_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::{Certificate, User},
        repositories::{
            certificate_repository::MockCertificateRepository,
            progress_repository::MockProgressRepository, user_repository::MockUserRepository,
            UserRepository,
        },
        test_utils::fixtures::catalog_courses,
    };

    const COURSE: &str = "csharp-basics";

    fn courses() -> Arc<dyn CourseRepository> {
        Arc::new(catalog_courses())
    }

    fn rewarding_users() -> Arc<dyn UserRepository> {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|_| Ok(Some(User::new("ada", "ada@example.com", "hash"))));
        users.expect_save().returning(|mut user| {
            user.version += 1;
            Ok(Some(user))
        });
        Arc::new(users)
    }

    fn service(
        progress: MockProgressRepository,
        certificates: MockCertificateRepository,
        users: Arc<dyn UserRepository>,
    ) -> ProgressService {
        ProgressService::new(
            Arc::new(progress),
            courses(),
            Arc::new(certificates),
            Arc::new(GamificationService::new(users)),
        )
    }

    fn existing(theory: i32, practice: i32) -> MockProgressRepository {
        let mut progress = MockProgressRepository::new();
        progress.expect_find().returning(move |user_id, course_id| {
            let mut record = Progress::new(user_id, course_id);
            record.set_theory(theory);
            record.set_practice(practice);
            Ok(Some(record))
        });
        progress.expect_upsert().returning(|p| Ok(p));
        progress
    }

    #[tokio::test]
    async fn test_missing_record_reads_as_zero() {
        let mut progress = MockProgressRepository::new();
        progress.expect_find().returning(|_, _| Ok(None));

        let dto = service(
            progress,
            MockCertificateRepository::new(),
            Arc::new(MockUserRepository::new()),
        )
        .get_progress("u-1", COURSE)
        .await
        .unwrap();

        assert_eq!(dto.theory_progress, 0);
        assert_eq!(dto.practice_progress, 0);
        assert!(dto.lessons.is_empty());
    }

    #[tokio::test]
    async fn test_theory_update_rewards_user() {
        let mut certificates = MockCertificateRepository::new();
        certificates.expect_find().never();

        let response = service(existing(0, 0), certificates, rewarding_users())
            .update_theory("u-1", COURSE, ProgressUpdateRequest { progress: 60 })
            .await
            .unwrap();

        assert_eq!(response.theory_progress, 60);
        assert_eq!(response.certificate_url, None);
    }

    #[tokio::test]
    async fn test_unknown_course_is_rejected() {
        let result = service(
            MockProgressRepository::new(),
            MockCertificateRepository::new(),
            Arc::new(MockUserRepository::new()),
        )
        .update_practice("u-1", "missing", ProgressUpdateRequest { progress: 10 })
        .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_out_of_range_progress_is_rejected() {
        let result = service(
            MockProgressRepository::new(),
            MockCertificateRepository::new(),
            Arc::new(MockUserRepository::new()),
        )
        .update_theory("u-1", COURSE, ProgressUpdateRequest { progress: 101 })
        .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_completing_both_tracks_issues_certificate() {
        let mut certificates = MockCertificateRepository::new();
        certificates.expect_find().returning(|_, _| Ok(None));
        certificates
            .expect_create()
            .times(1)
            .returning(|certificate| Ok(certificate));

        let response = service(existing(100, 90), certificates, rewarding_users())
            .update_practice("u-1", COURSE, ProgressUpdateRequest { progress: 100 })
            .await
            .unwrap();

        assert_eq!(
            response.certificate_url.as_deref(),
            Some("/certificates/course_csharp-basics.png")
        );
    }

    #[tokio::test]
    async fn test_existing_certificate_is_not_reissued() {
        let mut certificates = MockCertificateRepository::new();
        certificates
            .expect_find()
            .returning(|user_id, course_id| Ok(Some(Certificate::issue(user_id, course_id))));
        certificates.expect_create().never();

        let response = service(existing(100, 100), certificates, rewarding_users())
            .update_theory("u-1", COURSE, ProgressUpdateRequest { progress: 100 })
            .await
            .unwrap();

        assert!(response.certificate_url.is_some());
    }

    #[tokio::test]
    async fn test_lesson_must_belong_to_course() {
        let result = service(
            MockProgressRepository::new(),
            MockCertificateRepository::new(),
            Arc::new(MockUserRepository::new()),
        )
        .update_lesson(
            "u-1",
            "other-course",
            "csharp-basics-variables",
            ProgressUpdateRequest { progress: 50 },
        )
        .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_practice_clamps_at_complete() {
        let mut certificates = MockCertificateRepository::new();
        certificates.expect_find().returning(|_, _| Ok(None));
        certificates.expect_create().returning(|c| Ok(c));

        let progress = service(existing(100, 80), certificates, rewarding_users())
            .add_practice("u-1", COURSE, 34)
            .await
            .unwrap();

        assert_eq!(progress.practice_progress, 100);
    }
}
