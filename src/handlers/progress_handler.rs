use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::ProgressUpdateRequest,
};

#[get("/api/Progress/{course_id}")]
pub async fn get_progress(
    state: web::Data<AppState>,
    course_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let progress = state
        .progress_service
        .get_progress(auth.user_id(), &course_id)
        .await?;
    Ok(HttpResponse::Ok().json(progress))
}

#[post("/api/Progress/{course_id}/theory")]
pub async fn update_theory(
    state: web::Data<AppState>,
    course_id: web::Path<String>,
    request: web::Json<ProgressUpdateRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .progress_service
        .update_theory(auth.user_id(), &course_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/Progress/{course_id}/practice")]
pub async fn update_practice(
    state: web::Data<AppState>,
    course_id: web::Path<String>,
    request: web::Json<ProgressUpdateRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .progress_service
        .update_practice(auth.user_id(), &course_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/Progress/{course_id}/lesson/{lesson_id}")]
pub async fn update_lesson(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    request: web::Json<ProgressUpdateRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let (course_id, lesson_id) = path.into_inner();
    let response = state
        .progress_service
        .update_lesson(auth.user_id(), &course_id, &lesson_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}
