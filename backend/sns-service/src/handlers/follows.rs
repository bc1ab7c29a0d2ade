/// Follow toggle handlers; targets are addressed by external id
use crate::error::{AppError, Result};
use crate::messages::MessageKey;
use crate::middleware::Caller;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    #[serde(rename = "followingId")]
    pub following_id: Option<String>,
}

impl FollowRequest {
    fn target(&self) -> Result<&str> {
        self.following_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(AppError::BadRequest(MessageKey::FollowingIdRequired))
    }
}

/// POST /follows
pub async fn follow_user(
    state: web::Data<AppState>,
    caller: Caller,
    req: web::Json<FollowRequest>,
) -> Result<HttpResponse> {
    let follow = state
        .interactions()
        .follow(&caller.external_id, req.target()?)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "follow": follow,
    })))
}

/// DELETE /follows?followingId
pub async fn unfollow_user(
    state: web::Data<AppState>,
    caller: Caller,
    query: web::Query<FollowRequest>,
) -> Result<HttpResponse> {
    state
        .interactions()
        .unfollow(&caller.external_id, query.target()?)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
