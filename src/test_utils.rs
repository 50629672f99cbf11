use std::sync::Arc;

use crate::{
    app_state::{AppState, Repositories},
    config::Config,
    models::{catalog::Catalog, domain::User},
    repositories::{
        certificate_repository::MockCertificateRepository,
        forum_repository::MockForumRepository, progress_repository::MockProgressRepository,
        user_repository::MockUserRepository, JsonCourseRepository,
    },
    services::grader::MockCodeRunner,
};

pub mod fixtures {
    use super::*;

    pub const CATALOG_JSON: &str = include_str!("../data/csharp_course.json");

    /// Creates a standard test user
    pub fn test_user() -> User {
        User::new("testuser", "test@example.com", "hash")
    }

    pub fn test_user_with_username(username: &str) -> User {
        User::new(username, &format!("{}@example.com", username), "hash")
    }

    /// The bundled C# course, served from memory.
    pub fn catalog_courses() -> JsonCourseRepository {
        JsonCourseRepository::from_catalog(Catalog::from_json(CATALOG_JSON).unwrap())
    }
}

/// App state over the bundled catalog. Every other repository is a mock with
/// no expectations, so only read paths that touch courses alone are usable.
pub fn mock_app_state() -> AppState {
    let repositories = Repositories {
        users: Arc::new(MockUserRepository::new()),
        courses: Arc::new(fixtures::catalog_courses()),
        progress: Arc::new(MockProgressRepository::new()),
        forum: Arc::new(MockForumRepository::new()),
        certificates: Arc::new(MockCertificateRepository::new()),
    };

    AppState::from_repositories(
        Config::test_config(),
        repositories,
        Arc::new(MockCodeRunner::new()),
        None,
    )
}

pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_users_are_distinct() {
        let a = fixtures::test_user();
        let b = fixtures::test_user_with_username("other");
        assert_ne!(a.id, b.id);
        assert_eq!(b.email, "other@example.com");
    }

    #[tokio::test]
    async fn test_mock_state_serves_catalog() {
        let state = mock_app_state();
        let courses = state.course_service.list_courses().await.unwrap();
        assert_eq!(courses.len(), 1);
        test_helpers::assert_error_status(actix_web::http::StatusCode::NOT_FOUND);
    }
}
