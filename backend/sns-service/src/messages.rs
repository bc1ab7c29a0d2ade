/// User-facing message table
///
/// Every string the API returns in an `{"error": ...}` body comes from here,
/// so a handler never formats its own wording.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    // Auth boundary
    Unauthorized,
    InvalidToken,

    // Identity
    UserNotFound,
    FollowTargetNotFound,
    UnfollowTargetNotFound,

    // Request shape
    InvalidJson,
    InvalidQuery,
    InvalidPath,
    PostIdRequired,
    CommentIdRequired,
    FollowingIdRequired,
    ContentRequired,
    ContentTooLong,
    NameTooLong,

    // Posts
    PostNotFound,
    PostDeleteForbidden,
    FetchPostsFailed,
    CreatePostFailed,
    DeletePostFailed,

    // Media ingestion
    ImageRequired,
    ImageTooLarge,
    UnsupportedImageType,
    CaptionTooLong,
    MalformedUpload,
    UploadFailed,

    // Likes
    AlreadyLiked,
    CreateLikeFailed,
    DeleteLikeFailed,

    // Follows
    CannotFollowSelf,
    AlreadyFollowing,
    CreateFollowFailed,
    DeleteFollowFailed,

    // Comments
    CommentNotFound,
    CommentDeleteForbidden,
    FetchCommentsFailed,
    CreateCommentFailed,
    DeleteCommentFailed,

    // Users
    SyncUserFailed,

    InternalError,
}

impl MessageKey {
    pub fn text(self) -> &'static str {
        match self {
            MessageKey::Unauthorized => "Unauthorized",
            MessageKey::InvalidToken => "Invalid or expired token",

            MessageKey::UserNotFound => "User not found",
            MessageKey::FollowTargetNotFound => "User to follow not found",
            MessageKey::UnfollowTargetNotFound => "User to unfollow not found",

            MessageKey::InvalidJson => "Invalid JSON body",
            MessageKey::InvalidQuery => "Invalid query parameters",
            MessageKey::InvalidPath => "Invalid path parameter",
            MessageKey::PostIdRequired => "postId is required",
            MessageKey::CommentIdRequired => "commentId is required",
            MessageKey::FollowingIdRequired => "followingId is required",
            MessageKey::ContentRequired => "content is required",
            MessageKey::ContentTooLong => "Comment must be at most 2200 characters",
            MessageKey::NameTooLong => "Name must be at most 100 characters",

            MessageKey::PostNotFound => "Post not found",
            MessageKey::PostDeleteForbidden => "Forbidden: You can only delete your own posts",
            MessageKey::FetchPostsFailed => "Failed to fetch posts",
            MessageKey::CreatePostFailed => "Failed to create post",
            MessageKey::DeletePostFailed => "Failed to delete post",

            MessageKey::ImageRequired => "Please select an image file",
            MessageKey::ImageTooLarge => "File size exceeds 5MB",
            MessageKey::UnsupportedImageType => {
                "Unsupported file type. Only JPEG, PNG, WebP and GIF are allowed"
            }
            MessageKey::CaptionTooLong => "Caption must be at most 2200 characters",
            MessageKey::MalformedUpload => "Malformed multipart upload",
            MessageKey::UploadFailed => "Failed to upload image",

            MessageKey::AlreadyLiked => "Already liked",
            MessageKey::CreateLikeFailed => "Failed to create like",
            MessageKey::DeleteLikeFailed => "Failed to delete like",

            MessageKey::CannotFollowSelf => "Cannot follow yourself",
            MessageKey::AlreadyFollowing => "Already following",
            MessageKey::CreateFollowFailed => "Failed to create follow",
            MessageKey::DeleteFollowFailed => "Failed to delete follow",

            MessageKey::CommentNotFound => "Comment not found",
            MessageKey::CommentDeleteForbidden => {
                "Forbidden: You can only delete your own comments"
            }
            MessageKey::FetchCommentsFailed => "Failed to fetch comments",
            MessageKey::CreateCommentFailed => "Failed to create comment",
            MessageKey::DeleteCommentFailed => "Failed to delete comment",

            MessageKey::SyncUserFailed => "Failed to sync user",

            MessageKey::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl From<MessageKey> for String {
    fn from(key: MessageKey) -> Self {
        key.text().to_string()
    }
}
