/// Business logic layer
///
/// Services resolve the caller's internal identity, apply validation and
/// ownership rules and translate repository outcomes into [`AppError`]s.
///
/// [`AppError`]: crate::error::AppError
pub mod comments;
pub mod feed;
pub mod identity;
pub mod interactions;
pub mod media;
pub mod profiles;

pub use comments::CommentService;
pub use feed::FeedService;
pub use identity::IdentityService;
pub use interactions::InteractionService;
pub use media::{ImagePart, MediaService, PostUpload};
pub use profiles::ProfileService;
