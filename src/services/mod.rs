pub mod certificate_service;
pub mod course_service;
pub mod forum_service;
pub mod gamification;
pub mod grader;
pub mod practice_service;
pub mod progress_service;
pub mod quiz_service;
pub mod user_service;
