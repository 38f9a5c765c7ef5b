use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use crate::{
   db,
   dto::{ApplyPresetDto, NewPresetDto},
   errors::ApiError,
   models::{Preset, Window},
   service::window,
   PGPool,
};

pub async fn create(owner_id: Uuid, dto: NewPresetDto, pool: &PGPool) -> Result<Preset, ApiError> {
   window::validate_interval(dto.start_at, dto.end_at)?;
   if dto.days_of_notice_needed < 0 {
      return Err(ApiError::Validation(
         "days of notice cannot be negative".to_string(),
      ));
   }
   window::validate_links(owner_id, &dto.participant_ids, &dto.visibility_category_ids, pool)
      .await?;
   let preset = Preset {
      id: Uuid::new_v4(),
      user_id: owner_id,
      start_at: dto.start_at,
      end_at: dto.end_at,
      preferred_activity: dto.preferred_activity,
      days_of_notice_needed: dto.days_of_notice_needed,
   };
   let mut tx = pool.begin().await?;
   db::preset::insert_with_links(
      &mut tx,
      &preset,
      &dto.participant_ids,
      &dto.visibility_category_ids,
   )
   .await?;
   tx.commit().await?;
   Ok(preset)
}

pub async fn list(owner_id: Uuid, pool: &PGPool) -> Result<Vec<Preset>, ApiError> {
   let presets = db::preset::get_by_owner(owner_id, pool).await?;
   Ok(presets)
}

pub async fn delete(preset_id: Uuid, caller_id: Uuid, pool: &PGPool) -> Result<(), ApiError> {
   let preset = fetch_owned(preset_id, caller_id, pool).await?;
   db::preset::delete(preset.id, pool).await?;
   Ok(())
}

/// Projects the preset onto a calendar date and creates the resulting
/// window. The overlap check applies through the shared window write path,
/// so a conflicting projection fails with no state written.
pub async fn apply(
   preset_id: Uuid,
   dto: ApplyPresetDto,
   caller_id: Uuid,
   pool: &PGPool,
) -> Result<Window, ApiError> {
   let preset = fetch_owned(preset_id, caller_id, pool).await?;
   let tz: Tz = dto
      .timezone
      .parse()
      .map_err(|_| ApiError::Validation(format!("unknown timezone '{}'", dto.timezone)))?;
   let (start_at, end_at) = project_interval(preset.start_at, preset.end_at, dto.target_date, tz);

   let participants = db::preset::get_participants(preset.id, pool)
      .await?
      .into_iter()
      .map(|p| p.user_id)
      .collect();
   let visibilities = db::preset::get_visibilities(preset.id, pool)
      .await?
      .into_iter()
      .map(|v| v.category_id)
      .collect();

   let projected = Window {
      id: Uuid::new_v4(),
      user_id: caller_id,
      start_at,
      end_at,
      preferred_activity: preset.preferred_activity,
      days_of_notice_needed: preset.days_of_notice_needed,
      active: true,
      hangout_id: None,
   };
   window::create_linked(projected, participants, visibilities, pool).await
}

async fn fetch_owned(preset_id: Uuid, caller_id: Uuid, pool: &PGPool) -> Result<Preset, ApiError> {
   let preset = db::preset::get_by_id(preset_id, pool)
      .await
      .map_err(|e| match e {
         sqlx::Error::RowNotFound => ApiError::NotFound("preset does not exist".to_string()),
         other => other.into(),
      })?;
   // ownership failures read the same as absence, so presets are not
   // enumerable across users
   if preset.user_id != caller_id {
      return Err(ApiError::NotFound("preset does not exist".to_string()));
   }
   Ok(preset)
}

/// Re-anchors the preset's local wall-clock slot onto `target_date`.
///
/// The stored start is rendered in `tz`, its time-of-day is combined with
/// the target date and converted back to UTC; the stored date is discarded.
/// The end is purely `start + stored duration`, never re-derived through the
/// timezone, so the duration survives DST transitions exactly.
pub fn project_interval(
   preset_start: DateTime<Utc>,
   preset_end: DateTime<Utc>,
   target_date: NaiveDate,
   tz: Tz,
) -> (DateTime<Utc>, DateTime<Utc>) {
   let time_of_day = preset_start.with_timezone(&tz).time();
   let start = resolve_local(target_date.and_time(time_of_day), tz);
   let end = start + (preset_end - preset_start);
   (start, end)
}

/// Deterministic DST policy: an ambiguous local time (fall-back) takes the
/// earlier offset; a nonexistent local time (spring-forward) shifts forward
/// in 15-minute steps until it lands on a representable instant.
fn resolve_local(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
   let mut probe = naive;
   loop {
      match tz.from_local_datetime(&probe) {
         LocalResult::Single(dt) => return dt.with_timezone(&Utc),
         LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
         LocalResult::None => probe += Duration::minutes(15),
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use chrono::Timelike;
   use chrono_tz::America::New_York;

   fn at(s: &str) -> DateTime<Utc> {
      s.parse().unwrap()
   }

   fn date(s: &str) -> NaiveDate {
      s.parse().unwrap()
   }

   #[test]
   fn projection_keeps_local_wall_clock_and_duration() {
      // 14:00-15:30 New York time, stored against an arbitrary January date
      let start = at("2024-01-15T19:00:00Z");
      let end = at("2024-01-15T20:30:00Z");
      let (s, e) = project_interval(start, end, date("2024-07-04"), New_York);
      let local = s.with_timezone(&New_York);
      assert_eq!(local.date_naive(), date("2024-07-04"));
      assert_eq!((local.hour(), local.minute()), (14, 0));
      assert_eq!(e - s, Duration::minutes(90));
      // July is EDT (UTC-4), January was EST (UTC-5): the UTC instant moves
      // so that the wall clock stays put
      assert_eq!(s, at("2024-07-04T18:00:00Z"));
   }

   #[test]
   fn stored_date_is_irrelevant() {
      let (a, _) = project_interval(
         at("2020-03-03T19:00:00Z"),
         at("2020-03-03T20:30:00Z"),
         date("2024-07-04"),
         New_York,
      );
      let (b, _) = project_interval(
         at("2024-01-15T19:00:00Z"),
         at("2024-01-15T20:30:00Z"),
         date("2024-07-04"),
         New_York,
      );
      assert_eq!(a, b);
   }

   #[test]
   fn spring_forward_gap_shifts_forward() {
      // 02:30 local does not exist on 2024-03-10 in New York; the slot lands
      // on 03:00 EDT, which is 07:00 UTC
      let start = at("2024-01-10T07:30:00Z"); // 02:30 EST
      let end = at("2024-01-10T08:30:00Z");
      let (s, e) = project_interval(start, end, date("2024-03-10"), New_York);
      assert_eq!(s, at("2024-03-10T07:00:00Z"));
      assert_eq!(e - s, Duration::minutes(60));
   }

   #[test]
   fn fall_back_ambiguity_takes_earlier_offset() {
      // 01:30 local happens twice on 2024-11-03 in New York; the EDT reading
      // (UTC-4) wins
      let start = at("2024-01-10T06:30:00Z"); // 01:30 EST
      let end = at("2024-01-10T07:30:00Z");
      let (s, _) = project_interval(start, end, date("2024-11-03"), New_York);
      assert_eq!(s, at("2024-11-03T05:30:00Z"));
   }

   #[test]
   fn utc_zone_is_a_plain_reanchor() {
      let start = at("2024-02-01T14:00:00Z");
      let end = at("2024-02-01T15:30:00Z");
      let (s, e) = project_interval(start, end, date("2024-07-04"), chrono_tz::UTC);
      assert_eq!(s, at("2024-07-04T14:00:00Z"));
      assert_eq!(e, at("2024-07-04T15:30:00Z"));
   }
}
