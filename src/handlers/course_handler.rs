use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::ProgressUpdateRequest,
};

#[get("/api/Course")]
pub async fn list_courses(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let courses = state.course_service.list_courses().await?;
    Ok(HttpResponse::Ok().json(courses))
}

#[get("/api/Course/{course_id}")]
pub async fn get_course(
    state: web::Data<AppState>,
    course_id: web::Path<String>,
    auth: Option<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    let user_id = auth.as_ref().map(AuthenticatedUser::user_id);
    let course = state
        .course_service
        .get_course_detail(user_id, &course_id)
        .await?;
    Ok(HttpResponse::Ok().json(course))
}

#[get("/api/Course/{course_id}/lesson/{lesson_id}")]
pub async fn get_lesson(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    auth: Option<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    let (course_id, lesson_id) = path.into_inner();
    let user_id = auth.as_ref().map(AuthenticatedUser::user_id);

    let lesson = state
        .course_service
        .get_lesson(user_id, &course_id, &lesson_id)
        .await?;
    Ok(HttpResponse::Ok().json(lesson))
}

#[post("/api/Course/{course_id}/progress/theory")]
pub async fn set_theory_progress(
    state: web::Data<AppState>,
    course_id: web::Path<String>,
    request: web::Json<ProgressUpdateRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .course_service
        .set_theory_progress(auth.user_id(), &course_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}
