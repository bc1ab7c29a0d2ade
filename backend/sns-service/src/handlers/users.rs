/// User handlers - profile lookup and caller sync
use crate::error::{AppError, Result};
use crate::messages::MessageKey;
use crate::middleware::{Caller, MaybeCaller};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct SyncUserRequest {
    pub name: Option<String>,
}

/// GET /users/{external_id}
pub async fn get_user(
    state: web::Data<AppState>,
    caller: MaybeCaller,
    external_id: web::Path<String>,
) -> Result<HttpResponse> {
    let profile = state
        .profiles()
        .get(&external_id, caller.external_id())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "data": profile })))
}

/// POST /users/sync
///
/// The body is optional; an empty request syncs with the token's name claim.
pub async fn sync_user(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let req: SyncUserRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SyncUserRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!(error = %e, "rejected sync body");
            AppError::BadRequest(MessageKey::InvalidJson)
        })?
    };

    let user = state
        .identity()
        .sync(&caller, req.name.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": user,
    })))
}
