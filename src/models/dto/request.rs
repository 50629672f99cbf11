use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::models::domain::{
    forum::{is_known_category, ThreadQuery, ALL_CATEGORIES},
    user::MAX_RATING,
};

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_]+$").expect("USERNAME_REGEX is a valid regex pattern")
});

pub const AVATAR_PREFIX: &str = "/images/avatars/";
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 50;
pub const MAX_PAGE: u64 = 10_000;

fn validate_avatar_path(path: &str) -> Result<(), ValidationError> {
    let file = path.strip_prefix(AVATAR_PREFIX).unwrap_or_default();
    if file.is_empty() || file.contains("..") || file.contains('/') || file.contains('\\') {
        return Err(ValidationError::new("avatar_path")
            .with_message("Avatar must be a file under /images/avatars/".into()));
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<(), ValidationError> {
    if !is_known_category(category) {
        return Err(ValidationError::new("category").with_message("Unknown forum category".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    #[validate(regex(
        path = *USERNAME_REGEX,
        message = "Username must be alphanumeric with underscores"
    ))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRatingRequest {
    #[validate(range(min = 0, max = MAX_RATING))]
    pub rating: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAvatarRequest {
    #[validate(custom(function = "validate_avatar_path"))]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdateRequest {
    #[validate(range(min = 0, max = 100))]
    pub progress: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCodeRequest {
    #[validate(length(min = 1, max = 20000))]
    pub code: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, max = 500))]
    pub answer: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateThreadRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 10000))]
    pub content: String,

    #[validate(custom(function = "validate_category"))]
    pub category: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReplyRequest {
    #[validate(length(min = 1, max = 5000))]
    pub content: String,

    pub parent_reply_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IssueCertificateRequest {
    #[validate(length(min = 1))]
    pub course_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeTaskListQuery {
    pub course_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl From<ThreadListQuery> for ThreadQuery {
    fn from(query: ThreadListQuery) -> Self {
        ThreadQuery {
            category: query
                .category
                .filter(|c| !c.trim().is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES)),
            search: query
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            page: query.page.unwrap_or(1).clamp(1, MAX_PAGE),
            page_size: query
                .page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            username: "ada_l".to_string(),
            email: "ada@example.com".to_string(),
            password: "hunter22".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_username = RegisterRequest {
            username: "ada lovelace!".to_string(),
            ..valid.clone()
        };
        assert!(bad_username.validate().is_err());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            ..valid.clone()
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            password: "abc".to_string(),
            ..valid
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_register_request_reads_camel_case() {
        let json = r#"{"username":"ada","email":"ada@example.com","password":"secret1"}"#;
        let request: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.username, "ada");
    }

    #[test]
    fn test_avatar_path_validation() {
        let ok = UpdateAvatarRequest {
            avatar_url: "/images/avatars/cat.png".to_string(),
        };
        assert!(ok.validate().is_ok());

        for bad in [
            "https://evil.example/cat.png",
            "/images/avatars/",
            "/images/avatars/../secret.txt",
            "/images/avatars/nested/cat.png",
        ] {
            let request = UpdateAvatarRequest {
                avatar_url: bad.to_string(),
            };
            assert!(request.validate().is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_progress_range() {
        assert!(ProgressUpdateRequest { progress: 0 }.validate().is_ok());
        assert!(ProgressUpdateRequest { progress: 100 }.validate().is_ok());
        assert!(ProgressUpdateRequest { progress: 101 }.validate().is_err());
        assert!(ProgressUpdateRequest { progress: -1 }.validate().is_err());
    }

    #[test]
    fn test_thread_category_must_be_known() {
        let request = CreateThreadRequest {
            title: "Title".to_string(),
            content: "Body".to_string(),
            category: "C#".to_string(),
        };
        assert!(request.validate().is_ok());

        let unknown = CreateThreadRequest {
            category: "Memes".to_string(),
            ..request
        };
        assert!(unknown.validate().is_err());
    }

    #[test]
    fn test_thread_list_query_defaults() {
        let query: ThreadQuery = ThreadListQuery::default().into();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);
        assert!(query.category.is_none());

        let clamped: ThreadQuery = ThreadListQuery {
            category: Some("".to_string()),
            search: Some("  loops ".to_string()),
            page: Some(0),
            page_size: Some(500),
        }
        .into();
        assert_eq!(clamped.page, 1);
        assert_eq!(clamped.page_size, MAX_PAGE_SIZE);
        assert!(clamped.category.is_none());
        assert_eq!(clamped.search.as_deref(), Some("loops"));
    }

    #[test]
    fn test_thread_list_query_caps_huge_page() {
        let query: ThreadQuery = ThreadListQuery {
            page: Some(u64::MAX),
            page_size: Some(20),
            ..Default::default()
        }
        .into();

        assert_eq!(query.page, MAX_PAGE);
        assert_eq!(query.offset(), (MAX_PAGE - 1) * 20);
    }

    #[test]
    fn test_thread_list_query_all_means_no_category() {
        let query: ThreadQuery = ThreadListQuery {
            category: Some("all".to_string()),
            ..Default::default()
        }
        .into();
        assert!(query.category.is_none());

        let query: ThreadQuery = ThreadListQuery {
            category: Some("C#".to_string()),
            ..Default::default()
        }
        .into();
        assert_eq!(query.category.as_deref(), Some("C#"));
    }

    #[test]
    fn test_rating_range() {
        assert!(UpdateRatingRequest { rating: 0 }.validate().is_ok());
        assert!(UpdateRatingRequest { rating: MAX_RATING }.validate().is_ok());
        assert!(UpdateRatingRequest { rating: MAX_RATING + 1 }
            .validate()
            .is_err());
        assert!(UpdateRatingRequest { rating: i32::MAX }.validate().is_err());
        assert!(UpdateRatingRequest { rating: -1 }.validate().is_err());
    }
}
