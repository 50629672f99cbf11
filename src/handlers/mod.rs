pub mod certificate_handler;
pub mod course_handler;
pub mod forum_handler;
pub mod graphql_handler;
pub mod practice_task_handler;
pub mod progress_handler;
pub mod quiz_question_handler;
pub mod user_handler;

use actix_web::web;

pub use user_handler::{health_check, health_check_live, health_check_ready};

/// Registers every REST, health and GraphQL route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(user_handler::register)
        .service(user_handler::login)
        .service(user_handler::logout)
        .service(user_handler::me)
        .service(user_handler::get_profile)
        .service(user_handler::update_rating)
        .service(user_handler::update_avatar)
        .service(health_check)
        .service(health_check_live)
        .service(health_check_ready)
        .service(course_handler::list_courses)
        .service(course_handler::get_course)
        .service(course_handler::get_lesson)
        .service(course_handler::set_theory_progress)
        .service(progress_handler::get_progress)
        .service(progress_handler::update_theory)
        .service(progress_handler::update_practice)
        .service(progress_handler::update_lesson)
        .service(practice_task_handler::list_tasks)
        .service(practice_task_handler::get_task)
        .service(practice_task_handler::submit_code)
        .service(quiz_question_handler::questions_for_lesson)
        .service(quiz_question_handler::submit_answer)
        .service(forum_handler::categories)
        .service(forum_handler::list_threads)
        .service(forum_handler::get_thread)
        .service(forum_handler::create_thread)
        .service(forum_handler::create_reply)
        .service(forum_handler::delete_thread)
        .service(forum_handler::resolve_thread)
        .service(certificate_handler::list_certificates)
        .service(certificate_handler::issue_certificate)
        .service(graphql_handler::graphql)
        .service(graphql_handler::graphiql);
}
