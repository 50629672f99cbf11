pub mod certificate_repository;
pub mod course_repository;
pub mod forum_repository;
pub mod json_course_repository;
pub mod progress_repository;
pub mod user_repository;

pub use certificate_repository::{CertificateRepository, MongoCertificateRepository};
pub use course_repository::{CourseRepository, MongoCourseRepository};
pub use forum_repository::{ForumRepository, MongoForumRepository};
pub use json_course_repository::JsonCourseRepository;
pub use progress_repository::{MongoProgressRepository, ProgressRepository};
pub use user_repository::{MongoUserRepository, UserRepository};
