use std::{collections::HashMap, sync::Arc};

use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::Certificate,
        dto::{
            request::IssueCertificateRequest,
            response::{CertificateDto, CertificateIssuedResponse},
        },
    },
    repositories::{CertificateRepository, CourseRepository, ProgressRepository},
};

pub struct CertificateService {
    certificates: Arc<dyn CertificateRepository>,
    courses: Arc<dyn CourseRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl CertificateService {
    pub fn new(
        certificates: Arc<dyn CertificateRepository>,
        courses: Arc<dyn CourseRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            certificates,
            courses,
            progress,
        }
    }

    /// The user's certificates, newest first, labelled with course names.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<CertificateDto>> {
        let certificates = self.certificates.list_for_user(user_id).await?;
        if certificates.is_empty() {
            return Ok(Vec::new());
        }

        let course_names: HashMap<String, String> = self
            .courses
            .list_courses()
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        Ok(certificates
            .into_iter()
            .map(|certificate| {
                let name = course_names
                    .get(&certificate.course_id)
                    .cloned()
                    .unwrap_or_default();
                CertificateDto::new(certificate, name)
            })
            .collect())
    }

    pub async fn issue(
        &self,
        user_id: &str,
        request: IssueCertificateRequest,
    ) -> AppResult<CertificateIssuedResponse> {
        request.validate()?;

        self.courses
            .find_course(&request.course_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found.".to_string()))?;

        let completed = self
            .progress
            .find(user_id, &request.course_id)
            .await?
            .is_some_and(|p| p.is_complete());
        if !completed {
            return Err(AppError::BadRequest(
                "Course not fully completed.".to_string(),
            ));
        }

        if self
            .certificates
            .find(user_id, &request.course_id)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists(
                "Certificate already issued.".to_string(),
            ));
        }

        let certificate = self
            .certificates
            .create(Certificate::issue(user_id, &request.course_id))
            .await?;

        log::info!(
            "Issued certificate {} to user {} for course {}",
            certificate.id,
            user_id,
            certificate.course_id
        );

        Ok(CertificateIssuedResponse {
            message: "Certificate issued.".to_string(),
            certificate_id: certificate.id,
            certificate_url: certificate.certificate_url,
        })
    }
}
