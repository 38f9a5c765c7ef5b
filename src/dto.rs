use serde::{Deserialize, Serialize};
use chrono::{self, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{
    Hangout, HangoutGuest, HangoutRequest, HangoutRequestRecipient, Window, WindowParticipant,
    WindowVisibility,
};

#[derive(Debug, Deserialize, Clone)]
pub struct NewUserDto {
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub pwd: String,
    pub pwd_confirm: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoginUserRequest {
    pub username: String,
    pub pwd: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthTokenResponse(pub String);

#[derive(Debug, Deserialize, Serialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub username: String,
    pub exp: usize,
}

impl Claims {
    pub fn new(user_id: &Uuid, username: &str, exp: usize) -> Self {
        Self {
            user_id: *user_id,
            username: username.to_string(),
            exp,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewWindowDto {
    pub start_at: chrono::DateTime<Utc>,
    pub end_at: chrono::DateTime<Utc>,
    pub preferred_activity: String,
    #[serde(default)]
    pub days_of_notice_needed: i32,
    #[serde(default)]
    pub participant_ids: Vec<Uuid>,
    #[serde(default)]
    pub visibility_category_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct WindowRangeQuery {
    pub from: Option<chrono::DateTime<Utc>>,
    pub to: Option<chrono::DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewPresetDto {
    pub start_at: chrono::DateTime<Utc>,
    pub end_at: chrono::DateTime<Utc>,
    pub preferred_activity: String,
    #[serde(default)]
    pub days_of_notice_needed: i32,
    #[serde(default)]
    pub participant_ids: Vec<Uuid>,
    #[serde(default)]
    pub visibility_category_ids: Vec<Uuid>,
}

/// `timezone` is the caller's IANA zone name; the preset's time-of-day is
/// re-anchored onto `target_date` in that zone.
#[derive(Debug, Deserialize, Clone)]
pub struct ApplyPresetDto {
    pub target_date: NaiveDate,
    pub timezone: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewHangoutRequestDto {
    pub title: String,
    pub descr: String,
    pub proposed_start: chrono::DateTime<Utc>,
    pub proposed_end: chrono::DateTime<Utc>,
    #[serde(default)]
    pub is_open: bool,
    pub recipient_ids: Vec<Uuid>,
}

/// Response to a hangout invite or a join request. `create_window` asks the
/// service to also reserve a window at the confirmed interval on acceptance.
#[derive(Debug, Deserialize, Clone)]
pub struct RespondDto {
    pub accept: bool,
    #[serde(default)]
    pub create_window: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewContactRequestDto {
    pub recipient_id: Uuid,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RespondContactDto {
    pub accept: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NewCategoryDto {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CategoryMemberDto {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProfilePictureDto {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct HiveQuery {
    pub from: Option<chrono::DateTime<Utc>>,
    pub to: Option<chrono::DateTime<Utc>>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct WindowDetails {
    #[serde(flatten)]
    pub window: Window,
    pub participants: Vec<WindowParticipant>,
    pub visibilities: Vec<WindowVisibility>,
}

#[derive(Debug, Serialize)]
pub struct HangoutRequestDetails {
    #[serde(flatten)]
    pub request: HangoutRequest,
    pub recipients: Vec<HangoutRequestRecipient>,
}

#[derive(Debug, Serialize)]
pub struct HangoutDetails {
    #[serde(flatten)]
    pub hangout: Hangout,
    pub guests: Vec<HangoutGuest>,
}

/// Pending-count aggregate shown as the caller's notification badge.
#[derive(Debug, Serialize)]
pub struct NotificationCounts {
    pub friend_requests: i64,
    pub tagalong_requests: i64,
    pub hangout_invites: i64,
    pub join_requests: i64,
    pub total: i64,
}
