use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display name used when an invitation token is absent or unknown.
pub const FALLBACK_GUEST_NAME: &str = "Visitor";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub name: String,
    pub token: String,
    pub hide_gift: bool,
}

/// Outcome of an issuance request. `is_existing` is true when the name was
/// already registered and the stored token was handed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedGuest {
    pub name: String,
    pub hide_gift: bool,
    pub token: String,
    pub is_existing: bool,
}

/// What the home page needs to know about the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedGuest {
    pub display_name: String,
    pub hide_gift: bool,
}

impl Default for ResolvedGuest {
    fn default() -> Self {
        Self {
            display_name: FALLBACK_GUEST_NAME.to_string(),
            hide_gift: false,
        }
    }
}

impl From<Guest> for ResolvedGuest {
    fn from(guest: Guest) -> Self {
        Self {
            display_name: guest.name,
            hide_gift: guest.hide_gift,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWish {
    pub sender_name: String,
    pub attendance: Option<String>,
    pub content: String,
}

/// Guestbook entries are immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wish {
    pub id: i64,
    pub sender_name: String,
    pub attendance: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
