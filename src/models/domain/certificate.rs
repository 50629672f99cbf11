use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Certificate {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub issue_date: DateTime<Utc>,
    pub certificate_url: String,
}

impl Certificate {
    pub fn issue(user_id: &str, course_id: &str) -> Self {
        Certificate {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            course_id: course_id.to_string(),
            issue_date: Utc::now(),
            certificate_url: format!("/certificates/course_{}.png", course_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_certificate_url_uses_course_id() {
        let certificate = Certificate::issue("u-1", "csharp-basics");
        assert_eq!(
            certificate.certificate_url,
            "/certificates/course_csharp-basics.png"
        );
        assert_eq!(certificate.user_id, "u-1");
    }
}
