/// Post handlers - feed listing, single post, multipart create, owner delete
use crate::error::{AppError, Result};
use crate::messages::MessageKey;
use crate::middleware::{Caller, MaybeCaller};
use crate::models::PageWindow;
use crate::services::{ImagePart, PostUpload};
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::StreamExt;
use serde::Deserialize;
use uuid::Uuid;

/// Caption bytes kept from the form. Anything past this is over the
/// character limit regardless of encoding.
const CAPTION_FIELD_LIMIT: usize = 16 * 1024;

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Author filter (external id)
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// GET /posts
pub async fn list_posts(
    state: web::Data<AppState>,
    caller: MaybeCaller,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse> {
    let window = PageWindow::new(query.limit, query.offset);
    let author = query.user_id.as_deref().map(str::trim).filter(|id| !id.is_empty());

    let page = state
        .feed()
        .list_posts(window, author, caller.external_id())
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

/// GET /posts/{post_id}
pub async fn get_post(
    state: web::Data<AppState>,
    caller: MaybeCaller,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = state
        .feed()
        .get_post(post_id.into_inner(), caller.external_id())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "data": post })))
}

/// POST /posts (multipart: `image`, `caption`)
pub async fn create_post(
    state: web::Data<AppState>,
    caller: Caller,
    payload: Multipart,
) -> Result<HttpResponse> {
    let upload = read_post_upload(payload, state.upload.max_bytes).await?;
    let post = state.media().create_post(&caller.external_id, upload).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "post": post,
    })))
}

/// DELETE /posts/{post_id}
pub async fn delete_post(
    state: web::Data<AppState>,
    caller: Caller,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .media()
        .delete_post(&caller.external_id, post_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

/// Collect the form, stopping as soon as the image exceeds `max_bytes`.
async fn read_post_upload(mut payload: Multipart, max_bytes: usize) -> Result<PostUpload> {
    let mut upload = PostUpload::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(malformed)?;
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "image" => {
                let mut image = ImagePart {
                    content_type: field.content_type().map(|m| m.essence_str().to_string()),
                    file_name: field
                        .content_disposition()
                        .and_then(|cd| cd.get_filename())
                        .map(str::to_string),
                    ..ImagePart::default()
                };

                while let Some(chunk) = field.next().await {
                    let data = chunk.map_err(malformed)?;
                    if image.bytes.len() + data.len() > max_bytes {
                        tracing::debug!(max_bytes, "image exceeds upload limit, stopping read");
                        image.truncated = true;
                        upload.image = Some(image);
                        return Ok(upload);
                    }
                    image.bytes.extend_from_slice(&data);
                }

                upload.image = Some(image);
            }
            "caption" => {
                let mut raw = Vec::new();
                while let Some(chunk) = field.next().await {
                    let data = chunk.map_err(malformed)?;
                    let room = CAPTION_FIELD_LIMIT.saturating_sub(raw.len());
                    raw.extend_from_slice(&data[..data.len().min(room)]);
                }
                upload.caption = Some(String::from_utf8_lossy(&raw).into_owned());
            }
            _ => {
                // Ignore unknown fields
                while let Some(chunk) = field.next().await {
                    chunk.map_err(malformed)?;
                }
            }
        }
    }

    Ok(upload)
}

fn malformed(err: actix_multipart::MultipartError) -> AppError {
    tracing::debug!(error = %err, "malformed multipart body");
    AppError::BadRequest(MessageKey::MalformedUpload)
}
