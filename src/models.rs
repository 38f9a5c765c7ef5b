use chrono::Utc;
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Shared status domain for friendships, tagalongs, hangout request
/// recipients and join requests. Pending is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, FromRow, serde::Serialize, serde::Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub pwd_hash: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub profile_picture: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, FromRow, serde::Serialize, serde::Deserialize)]
pub struct Friendship {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub status: RequestStatus,
    pub created_at: chrono::DateTime<Utc>,
}

/// Secondary contact relationship, same shape as a friendship. An accepted
/// tagalong grants default window visibility without category membership.
#[derive(Debug, FromRow, serde::Serialize, serde::Deserialize)]
pub struct Tagalong {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub status: RequestStatus,
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, FromRow, serde::Serialize, serde::Deserialize)]
pub struct FriendshipCategory {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
}

#[derive(Debug, FromRow, serde::Serialize, serde::Deserialize)]
pub struct CategoryMember {
    pub id: Uuid,
    pub category_id: Uuid,
    pub user_id: Uuid,
}

/// A concrete availability slot. `[start_at, end_at)` is half-open UTC;
/// `hangout_id` is set once the window has converted into a confirmed
/// hangout.
#[derive(Debug, Clone, FromRow, serde::Serialize, serde::Deserialize)]
pub struct Window {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_at: chrono::DateTime<Utc>,
    pub end_at: chrono::DateTime<Utc>,
    pub preferred_activity: String,
    pub days_of_notice_needed: i32,
    pub active: bool,
    pub hangout_id: Option<Uuid>,
}

#[derive(Debug, FromRow, serde::Serialize, serde::Deserialize)]
pub struct WindowParticipant {
    pub id: Uuid,
    pub window_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, FromRow, serde::Serialize, serde::Deserialize)]
pub struct WindowVisibility {
    pub id: Uuid,
    pub window_id: Uuid,
    pub category_id: Uuid,
}

/// A date-agnostic template. Only the local time-of-day and the duration of
/// `[start_at, end_at)` are meaningful; the stored date is a model artifact
/// discarded when the preset is applied to a target date.
#[derive(Debug, FromRow, serde::Serialize, serde::Deserialize)]
pub struct Preset {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_at: chrono::DateTime<Utc>,
    pub end_at: chrono::DateTime<Utc>,
    pub preferred_activity: String,
    pub days_of_notice_needed: i32,
}

#[derive(Debug, FromRow, serde::Serialize, serde::Deserialize)]
pub struct PresetParticipant {
    pub id: Uuid,
    pub preset_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, FromRow, serde::Serialize, serde::Deserialize)]
pub struct PresetVisibility {
    pub id: Uuid,
    pub preset_id: Uuid,
    pub category_id: Uuid,
}

#[derive(Debug, FromRow, serde::Serialize, serde::Deserialize)]
pub struct Hangout {
    pub id: Uuid,
    pub title: String,
    pub descr: String,
    pub confirmed_start: chrono::DateTime<Utc>,
    pub confirmed_end: chrono::DateTime<Utc>,
    pub active: bool,
}

#[derive(Debug, FromRow, serde::Serialize, serde::Deserialize)]
pub struct HangoutGuest {
    pub id: Uuid,
    pub hangout_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, FromRow, serde::Serialize, serde::Deserialize)]
pub struct HangoutRequest {
    pub id: Uuid,
    pub hangout_id: Uuid,
    pub sender_id: Uuid,
    pub title: String,
    pub descr: String,
    pub proposed_start: chrono::DateTime<Utc>,
    pub proposed_end: chrono::DateTime<Utc>,
    pub is_open: bool,
    pub status: RequestStatus,
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, FromRow, serde::Serialize, serde::Deserialize)]
pub struct HangoutRequestRecipient {
    pub id: Uuid,
    pub request_id: Uuid,
    pub user_id: Uuid,
    pub status: RequestStatus,
    pub invited_at: chrono::DateTime<Utc>,
}

/// A non-invited user's request to join an open hangout.
#[derive(Debug, FromRow, serde::Serialize, serde::Deserialize)]
pub struct JoinRequest {
    pub id: Uuid,
    pub hangout_id: Uuid,
    pub user_id: Uuid,
    pub status: RequestStatus,
    pub created_at: chrono::DateTime<Utc>,
}
