/// Comment handlers
use crate::error::{AppError, Result};
use crate::messages::MessageKey;
use crate::middleware::Caller;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListCommentsQuery {
    #[serde(rename = "postId")]
    pub post_id: Option<Uuid>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(rename = "postId")]
    pub post_id: Option<Uuid>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteCommentQuery {
    #[serde(rename = "commentId")]
    pub comment_id: Option<Uuid>,
}

/// GET /comments?postId&limit&offset
pub async fn list_comments(
    state: web::Data<AppState>,
    query: web::Query<ListCommentsQuery>,
) -> Result<HttpResponse> {
    let post_id = query
        .post_id
        .ok_or(AppError::BadRequest(MessageKey::PostIdRequired))?;

    let comments = state
        .comment_store()
        .list(post_id, query.limit, query.offset)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "data": comments })))
}

/// POST /comments
pub async fn create_comment(
    state: web::Data<AppState>,
    caller: Caller,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let post_id = req
        .post_id
        .ok_or(AppError::BadRequest(MessageKey::PostIdRequired))?;
    let content = req
        .content
        .as_deref()
        .ok_or(AppError::BadRequest(MessageKey::ContentRequired))?;

    let comment = state
        .comment_store()
        .create(&caller.external_id, post_id, content)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "comment": comment,
    })))
}

/// DELETE /comments?commentId
pub async fn delete_comment(
    state: web::Data<AppState>,
    caller: Caller,
    query: web::Query<DeleteCommentQuery>,
) -> Result<HttpResponse> {
    let comment_id = query
        .comment_id
        .ok_or(AppError::BadRequest(MessageKey::CommentIdRequired))?;

    state
        .comment_store()
        .delete(&caller.external_id, comment_id)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
