use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::{PracticeTaskListQuery, SubmitCodeRequest},
    services::practice_service::SubmissionOutcome,
};

#[get("/api/PracticeTask")]
pub async fn list_tasks(
    state: web::Data<AppState>,
    query: web::Query<PracticeTaskListQuery>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let tasks = state
        .practice_service
        .tasks_for_course(auth.user_id(), &query.course_id)
        .await?;
    Ok(HttpResponse::Ok().json(tasks))
}

#[get("/api/PracticeTask/{task_id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    task_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let task = state
        .practice_service
        .get_task(auth.user_id(), &task_id)
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

#[post("/api/PracticeTask/{task_id}/submit")]
pub async fn submit_code(
    state: web::Data<AppState>,
    task_id: web::Path<String>,
    request: web::Json<SubmitCodeRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let outcome = state
        .practice_service
        .submit(auth.user_id(), &task_id, request.into_inner())
        .await?;

    Ok(match outcome {
        SubmissionOutcome::Passed(passed) => HttpResponse::Ok().json(passed),
        SubmissionOutcome::Failed(failed) => HttpResponse::BadRequest().json(failed),
    })
}
