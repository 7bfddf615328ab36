use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type MessageId = i64;

/// A board message. Roots have no parent; replies point at a root and can
/// never be replied to themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub author_id: Uuid,
    pub content: String,
    pub parent_id: Option<MessageId>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// An authenticated caller as resolved by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    /// Admins may delete messages they did not author.
    pub privileged: bool,
}

/// Per-request identity context. Anonymous when no valid credential was
/// presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Option<Uuid>,
    pub privileged: bool,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn caller(&self) -> Option<Caller> {
        self.user_id.map(|user_id| Caller {
            user_id,
            privileged: self.privileged,
        })
    }
}

impl From<Caller> for Viewer {
    fn from(caller: Caller) -> Self {
        Self {
            user_id: Some(caller.user_id),
            privileged: caller.privileged,
        }
    }
}
