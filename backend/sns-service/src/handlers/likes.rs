/// Like toggle handlers
use crate::error::{AppError, Result};
use crate::messages::MessageKey;
use crate::middleware::Caller;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    #[serde(rename = "postId")]
    pub post_id: Option<Uuid>,
}

/// POST /likes
pub async fn like_post(
    state: web::Data<AppState>,
    caller: Caller,
    req: web::Json<LikeRequest>,
) -> Result<HttpResponse> {
    let post_id = req
        .post_id
        .ok_or(AppError::BadRequest(MessageKey::PostIdRequired))?;

    let like = state
        .interactions()
        .like(&caller.external_id, post_id)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "like": like,
    })))
}

/// DELETE /likes?postId
pub async fn unlike_post(
    state: web::Data<AppState>,
    caller: Caller,
    query: web::Query<LikeRequest>,
) -> Result<HttpResponse> {
    let post_id = query
        .post_id
        .ok_or(AppError::BadRequest(MessageKey::PostIdRequired))?;

    state
        .interactions()
        .unlike(&caller.external_id, post_id)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
