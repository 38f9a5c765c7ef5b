use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
   db,
   dto::{NewWindowDto, WindowDetails},
   errors::ApiError,
   models::{FriendshipCategory, Window},
   PGPool,
};

/// Half-open interval intersection. Touching endpoints do not conflict:
/// a window ending at 15:00 coexists with one starting at 15:00.
pub fn intervals_overlap(
   a_start: DateTime<Utc>,
   a_end: DateTime<Utc>,
   b_start: DateTime<Utc>,
   b_end: DateTime<Utc>,
) -> bool {
   a_start < b_end && a_end > b_start
}

/// First stored window conflicting with the candidate interval, if any.
/// `exclude` skips the window being updated so it does not conflict with
/// itself.
pub fn conflicting_window<'a>(
   windows: &'a [Window],
   start: DateTime<Utc>,
   end: DateTime<Utc>,
   exclude: Option<Uuid>,
) -> Option<&'a Window> {
   windows
      .iter()
      .find(|w| exclude != Some(w.id) && intervals_overlap(start, end, w.start_at, w.end_at))
}

pub fn validate_interval(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ApiError> {
   if end <= start {
      return Err(ApiError::Validation(
         "interval end must be after its start".to_string(),
      ));
   }
   Ok(())
}

/// First requested id missing from the fetched rows, if any.
fn first_unknown(requested: &[Uuid], found: &[Uuid]) -> Option<Uuid> {
   requested.iter().find(|id| !found.contains(id)).copied()
}

/// A visibility category someone other than the window owner owns, if any.
/// Scoping through a foreign category would expose the window to that
/// category's members, whom the owner never selected.
pub fn foreign_category(owner_id: Uuid, categories: &[FriendshipCategory]) -> Option<Uuid> {
   categories
      .iter()
      .find(|c| c.owner_id != owner_id)
      .map(|c| c.id)
}

/// Link ids arrive straight from the client; unknown participants and
/// unknown or foreign categories are rejected before anything is written.
pub async fn validate_links(
   owner_id: Uuid,
   participant_ids: &[Uuid],
   visibility_category_ids: &[Uuid],
   pool: &PGPool,
) -> Result<(), ApiError> {
   for id in participant_ids {
      if !db::user::exists_by_id(*id, pool).await? {
         return Err(ApiError::Validation(format!("unknown participant {}", id)));
      }
   }
   let categories = db::category::get_by_ids(visibility_category_ids, pool).await?;
   let found: Vec<Uuid> = categories.iter().map(|c| c.id).collect();
   if let Some(id) = first_unknown(visibility_category_ids, &found) {
      return Err(ApiError::Validation(format!("unknown category {}", id)));
   }
   if let Some(id) = foreign_category(owner_id, &categories) {
      return Err(ApiError::Validation(format!(
         "category {} is not one of your categories",
         id
      )));
   }
   Ok(())
}

pub async fn create(owner_id: Uuid, dto: NewWindowDto, pool: &PGPool) -> Result<Window, ApiError> {
   validate_interval(dto.start_at, dto.end_at)?;
   if dto.days_of_notice_needed < 0 {
      return Err(ApiError::Validation(
         "days of notice cannot be negative".to_string(),
      ));
   }
   validate_links(owner_id, &dto.participant_ids, &dto.visibility_category_ids, pool).await?;
   let window = Window {
      id: Uuid::new_v4(),
      user_id: owner_id,
      start_at: dto.start_at,
      end_at: dto.end_at,
      preferred_activity: dto.preferred_activity,
      days_of_notice_needed: dto.days_of_notice_needed,
      active: true,
      hangout_id: None,
   };
   create_linked(
      window,
      dto.participant_ids,
      dto.visibility_category_ids,
      pool,
   )
   .await
}

/// Shared write path for direct creation, preset application and
/// hangout-acceptance windows. The overlap check runs under a per-user
/// advisory lock inside the same transaction as the insert, so concurrent
/// creations for one user cannot both pass it.
pub async fn create_linked(
   window: Window,
   participant_ids: Vec<Uuid>,
   visibility_category_ids: Vec<Uuid>,
   pool: &PGPool,
) -> Result<Window, ApiError> {
   let mut tx = pool.begin().await?;
   db::window::lock_participant(&mut tx, window.user_id).await?;
   let existing = db::window::participant_windows(window.user_id, &mut *tx).await?;
   if let Some(other) = conflicting_window(&existing, window.start_at, window.end_at, None) {
      return Err(ApiError::Conflict(format!(
         "time slot overlaps with another window where you are a participant ({} to {})",
         other.start_at, other.end_at
      )));
   }
   let mut participants = participant_ids;
   if !participants.contains(&window.user_id) {
      participants.push(window.user_id);
   }
   db::window::insert_with_links(&mut tx, &window, &participants, &visibility_category_ids).await?;
   tx.commit().await?;
   Ok(window)
}

/// Lists the caller's windows overlapping the range, garbage-collecting
/// fully elapsed windows first.
pub async fn list(
   owner_id: Uuid,
   from: Option<DateTime<Utc>>,
   to: Option<DateTime<Utc>>,
   now: DateTime<Utc>,
   pool: &PGPool,
) -> Result<Vec<Window>, ApiError> {
   db::window::delete_expired(owner_id, now, pool).await?;
   let from = from.unwrap_or(now);
   let to = to.unwrap_or(now + chrono::Duration::days(30));
   validate_interval(from, to)?;
   let windows = db::window::list_range(owner_id, from, to, pool).await?;
   Ok(windows)
}

/// Full detail of one window, for participants only.
pub async fn details(window_id: Uuid, caller_id: Uuid, pool: &PGPool) -> Result<WindowDetails, ApiError> {
   let window = db::window::get_by_id(window_id, pool).await.map_err(|e| match e {
      sqlx::Error::RowNotFound => ApiError::NotFound("window does not exist".to_string()),
      other => other.into(),
   })?;
   let participants = db::window::get_participants(window.id, pool).await?;
   if !participants.iter().any(|p| p.user_id == caller_id) {
      return Err(ApiError::Forbidden(
         "only participants may view this window".to_string(),
      ));
   }
   let visibilities = db::window::visibilities_for(&[window.id], pool).await?;
   Ok(WindowDetails {
      window,
      participants,
      visibilities,
   })
}

pub async fn delete(window_id: Uuid, caller_id: Uuid, pool: &PGPool) -> Result<(), ApiError> {
   let window = db::window::get_by_id(window_id, pool).await.map_err(|e| match e {
      sqlx::Error::RowNotFound => ApiError::NotFound("window does not exist".to_string()),
      other => other.into(),
   })?;
   if window.user_id != caller_id {
      return Err(ApiError::Forbidden(
         "only the window owner may delete it".to_string(),
      ));
   }
   db::window::delete(window_id, pool).await?;
   Ok(())
}

#[cfg(test)]
mod tests {
   use super::*;

   fn at(s: &str) -> DateTime<Utc> {
      s.parse().unwrap()
   }

   fn window(start: &str, end: &str) -> Window {
      Window {
         id: Uuid::new_v4(),
         user_id: Uuid::new_v4(),
         start_at: at(start),
         end_at: at(end),
         preferred_activity: "climbing".to_string(),
         days_of_notice_needed: 0,
         active: true,
         hangout_id: None,
      }
   }

   #[test]
   fn partial_overlap_conflicts() {
      let existing = vec![window("2024-01-01T14:00:00Z", "2024-01-01T15:00:00Z")];
      let hit = conflicting_window(
         &existing,
         at("2024-01-01T14:30:00Z"),
         at("2024-01-01T15:30:00Z"),
         None,
      );
      assert!(hit.is_some());
   }

   #[test]
   fn touching_endpoints_do_not_conflict() {
      let existing = vec![window("2024-01-01T14:00:00Z", "2024-01-01T15:00:00Z")];
      let hit = conflicting_window(
         &existing,
         at("2024-01-01T15:00:00Z"),
         at("2024-01-01T16:00:00Z"),
         None,
      );
      assert!(hit.is_none());
      let before = conflicting_window(
         &existing,
         at("2024-01-01T13:00:00Z"),
         at("2024-01-01T14:00:00Z"),
         None,
      );
      assert!(before.is_none());
   }

   #[test]
   fn containment_conflicts_both_ways() {
      let existing = vec![window("2024-01-01T14:00:00Z", "2024-01-01T18:00:00Z")];
      // candidate inside stored
      assert!(conflicting_window(
         &existing,
         at("2024-01-01T15:00:00Z"),
         at("2024-01-01T16:00:00Z"),
         None
      )
      .is_some());
      // stored inside candidate
      assert!(conflicting_window(
         &existing,
         at("2024-01-01T13:00:00Z"),
         at("2024-01-01T19:00:00Z"),
         None
      )
      .is_some());
   }

   #[test]
   fn overlap_is_symmetric() {
      let a = (at("2024-03-05T09:00:00Z"), at("2024-03-05T11:00:00Z"));
      let b = (at("2024-03-05T10:00:00Z"), at("2024-03-05T12:00:00Z"));
      assert_eq!(
         intervals_overlap(a.0, a.1, b.0, b.1),
         intervals_overlap(b.0, b.1, a.0, a.1)
      );
   }

   #[test]
   fn exclusion_skips_the_window_being_updated() {
      let existing = vec![window("2024-01-01T14:00:00Z", "2024-01-01T15:00:00Z")];
      let own_id = existing[0].id;
      let hit = conflicting_window(
         &existing,
         at("2024-01-01T14:15:00Z"),
         at("2024-01-01T15:15:00Z"),
         Some(own_id),
      );
      assert!(hit.is_none());
   }

   #[test]
   fn unknown_link_ids_are_detected() {
      let known = Uuid::new_v4();
      let missing = Uuid::new_v4();
      assert_eq!(first_unknown(&[known, missing], &[known]), Some(missing));
      assert_eq!(first_unknown(&[known], &[known]), None);
      assert_eq!(first_unknown(&[], &[]), None);
   }

   #[test]
   fn foreign_categories_are_detected() {
      let owner = Uuid::new_v4();
      let mine = FriendshipCategory {
         id: Uuid::new_v4(),
         owner_id: owner,
         name: "close friends".to_string(),
      };
      let theirs = FriendshipCategory {
         id: Uuid::new_v4(),
         owner_id: Uuid::new_v4(),
         name: "climbers".to_string(),
      };
      assert_eq!(foreign_category(owner, &[mine]), None);
      let cats = vec![
         FriendshipCategory {
            id: Uuid::new_v4(),
            owner_id: owner,
            name: "close friends".to_string(),
         },
         theirs,
      ];
      assert_eq!(foreign_category(owner, &cats), Some(cats[1].id));
   }

   #[test]
   fn empty_interval_is_rejected() {
      let t = at("2024-01-01T14:00:00Z");
      assert!(validate_interval(t, t).is_err());
      assert!(validate_interval(t, at("2024-01-01T13:00:00Z")).is_err());
      assert!(validate_interval(t, at("2024-01-01T14:00:01Z")).is_ok());
   }
}
