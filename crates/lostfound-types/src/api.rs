use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::MessageId;

// -- JWT Claims --

/// Claims issued by the campus identity service. Only verified here, never
/// minted in production.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub admin: bool,
    pub exp: usize,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateMessageRequest {
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<MessageId>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_page_size(),
        }
    }
}

/// A message as seen by one viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageView {
    pub id: MessageId,
    pub author_id: Uuid,
    pub content: String,
    pub parent_id: Option<MessageId>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub like_count: u64,
    /// Present for roots only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<u64>,
    pub is_owner: bool,
    pub liked_by_viewer: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePage {
    pub messages: Vec<MessageView>,
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u64,
    pub total_roots: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadView {
    pub message: MessageView,
    pub replies: Vec<MessageView>,
}

// -- Likes --

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ToggleLikeResponse {
    pub liked: bool,
}

// -- Stats --

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_roots: u64,
    pub total_replies: u64,
    pub total_likes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageStats {
    pub like_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub roots_authored: u64,
    pub replies_authored: u64,
    pub likes_received: u64,
}
