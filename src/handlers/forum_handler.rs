use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::request::{CreateReplyRequest, CreateThreadRequest, ThreadListQuery},
};

#[get("/api/Forum/categories")]
pub async fn categories(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.forum_service.categories())
}

#[get("/api/Forum/threads")]
pub async fn list_threads(
    state: web::Data<AppState>,
    query: web::Query<ThreadListQuery>,
) -> Result<HttpResponse, AppError> {
    let page = state
        .forum_service
        .list_threads(query.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/api/Forum/threads/{thread_id}")]
pub async fn get_thread(
    state: web::Data<AppState>,
    thread_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let thread = state.forum_service.get_thread(&thread_id).await?;
    Ok(HttpResponse::Ok().json(thread))
}

#[post("/api/Forum/threads")]
pub async fn create_thread(
    state: web::Data<AppState>,
    request: web::Json<CreateThreadRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .forum_service
        .create_thread(auth.user_id(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/Forum/threads/{thread_id}/replies")]
pub async fn create_reply(
    state: web::Data<AppState>,
    thread_id: web::Path<String>,
    request: web::Json<CreateReplyRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .forum_service
        .create_reply(auth.user_id(), &thread_id, request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[actix_web::delete("/api/Forum/threads/{thread_id}")]
pub async fn delete_thread(
    state: web::Data<AppState>,
    thread_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .forum_service
        .delete_thread(auth.user_id(), &thread_id)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[actix_web::put("/api/Forum/threads/{thread_id}/resolve")]
pub async fn resolve_thread(
    state: web::Data<AppState>,
    thread_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state
        .forum_service
        .resolve_thread(auth.user_id(), &thread_id)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}
