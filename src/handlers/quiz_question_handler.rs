use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::SubmitAnswerRequest,
};

#[get("/api/QuizQuestion/{lesson_id}")]
pub async fn questions_for_lesson(
    state: web::Data<AppState>,
    lesson_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let questions = state.quiz_service.questions_for_lesson(&lesson_id).await?;
    Ok(HttpResponse::Ok().json(questions))
}

#[post("/api/QuizQuestion/{question_id}/submit")]
pub async fn submit_answer(
    state: web::Data<AppState>,
    question_id: web::Path<String>,
    request: web::Json<SubmitAnswerRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .quiz_service
        .submit_answer(auth.user_id(), &question_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}
