/// HTTP handlers for sns-service
///
/// All JSON endpoints live under `/api`. The identity middleware wraps the
/// whole scope so every handler sees an optional caller.
use crate::error::{json_error_handler, path_error_handler, query_error_handler};
use crate::middleware::IdentityMiddleware;
use actix_web::web;
use identity_jwt::TokenVerifier;
use std::sync::Arc;

pub mod comments;
pub mod follows;
pub mod health;
pub mod likes;
pub mod posts;
pub mod users;

pub use comments::{create_comment, delete_comment, list_comments};
pub use follows::{follow_user, unfollow_user};
pub use likes::{like_post, unlike_post};
pub use posts::{create_post, delete_post, get_post, list_posts};
pub use users::{get_user, sync_user};

/// Mount the `/api` scope.
pub fn configure_routes(cfg: &mut web::ServiceConfig, verifier: Arc<TokenVerifier>) {
    cfg.service(
        web::scope("/api")
            .wrap(IdentityMiddleware::new(verifier))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .service(
                web::resource("/posts")
                    .route(web::get().to(list_posts))
                    .route(web::post().to(create_post)),
            )
            .service(
                web::resource("/posts/{post_id}")
                    .route(web::get().to(get_post))
                    .route(web::delete().to(delete_post)),
            )
            .service(
                web::resource("/comments")
                    .route(web::get().to(list_comments))
                    .route(web::post().to(create_comment))
                    .route(web::delete().to(delete_comment)),
            )
            .service(
                web::resource("/likes")
                    .route(web::post().to(like_post))
                    .route(web::delete().to(unlike_post)),
            )
            .service(
                web::resource("/follows")
                    .route(web::post().to(follow_user))
                    .route(web::delete().to(unfollow_user)),
            )
            .service(web::resource("/users/sync").route(web::post().to(sync_user)))
            .service(web::resource("/users/{external_id}").route(web::get().to(get_user))),
    );
}
