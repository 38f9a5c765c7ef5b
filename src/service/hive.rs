use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
   db,
   dto::HiveQuery,
   errors::ApiError,
   models::{Window, WindowVisibility},
   service::window,
   PGPool,
};

/// Everything about the viewer the visibility predicate needs: who they are
/// an accepted contact of, and which categories (of any owner) list them as
/// a member.
pub struct ViewerContext {
   pub contact_ids: HashSet<Uuid>,
   pub member_of: HashSet<Uuid>,
}

/// Decides whether one window is visible to the viewer.
///
/// The owner must be an accepted contact; the window must either carry no
/// visibility rows (open to all contacts) or carry one whose category is
/// owned by the window owner and lists the viewer; the notice blackout must
/// not have started; and an optional category filter restricts to windows
/// scoped by that category. `category_owners` maps category id to owner id:
/// a category someone else owns grants nothing, no matter who it lists.
pub fn window_visible(
   w: &Window,
   visibilities: &[WindowVisibility],
   category_owners: &HashMap<Uuid, Uuid>,
   viewer: &ViewerContext,
   now: DateTime<Utc>,
   category_filter: Option<Uuid>,
) -> bool {
   if !viewer.contact_ids.contains(&w.user_id) {
      return false;
   }
   // hidden once the remaining lead time drops below the required notice
   if now + Duration::days(i64::from(w.days_of_notice_needed)) > w.start_at {
      return false;
   }
   let scoped: Vec<&WindowVisibility> = visibilities
      .iter()
      .filter(|v| v.window_id == w.id)
      .collect();
   match (scoped.is_empty(), category_filter) {
      (true, None) => true,
      (true, Some(_)) => false,
      (false, filter) => scoped.iter().any(|v| {
         category_owners.get(&v.category_id) == Some(&w.user_id)
            && viewer.member_of.contains(&v.category_id)
            && filter.map_or(true, |f| v.category_id == f)
      }),
   }
}

/// The cross-user hive view: other users' windows the viewer is allowed to
/// see within the queried range.
pub async fn list(viewer_id: Uuid, query: HiveQuery, now: DateTime<Utc>, pool: &PGPool) -> Result<Vec<Window>, ApiError> {
   let from = query.from.unwrap_or(now);
   let to = query.to.unwrap_or(now + Duration::days(14));
   window::validate_interval(from, to)?;

   let candidates = db::window::hive_candidates(viewer_id, from, to, pool).await?;
   if candidates.is_empty() {
      return Ok(Vec::new());
   }
   let ids: Vec<Uuid> = candidates.iter().map(|w| w.id).collect();
   let visibilities = db::window::visibilities_for(&ids, pool).await?;
   let category_ids: Vec<Uuid> = visibilities.iter().map(|v| v.category_id).collect();
   let category_owners: HashMap<Uuid, Uuid> = db::category::get_by_ids(&category_ids, pool)
      .await?
      .into_iter()
      .map(|c| (c.id, c.owner_id))
      .collect();
   let viewer = ViewerContext {
      contact_ids: db::friendship::accepted_contact_ids(viewer_id, pool)
         .await?
         .into_iter()
         .collect(),
      member_of: db::category::membership_category_ids(viewer_id, pool)
         .await?
         .into_iter()
         .collect(),
   };
   let visible = candidates
      .into_iter()
      .filter(|w| {
         window_visible(w, &visibilities, &category_owners, &viewer, now, query.category_id)
      })
      .collect();
   Ok(visible)
}

#[cfg(test)]
mod tests {
   use super::*;

   fn at(s: &str) -> DateTime<Utc> {
      s.parse().unwrap()
   }

   fn make_window(owner: Uuid, start: &str, notice_days: i32) -> Window {
      Window {
         id: Uuid::new_v4(),
         user_id: owner,
         start_at: at(start),
         end_at: at(start) + Duration::hours(2),
         preferred_activity: "board games".to_string(),
         days_of_notice_needed: notice_days,
         active: true,
         hangout_id: None,
      }
   }

   fn scope(window_id: Uuid, category_id: Uuid) -> WindowVisibility {
      WindowVisibility {
         id: Uuid::new_v4(),
         window_id,
         category_id,
      }
   }

   fn viewer(contacts: &[Uuid], memberships: &[Uuid]) -> ViewerContext {
      ViewerContext {
         contact_ids: contacts.iter().copied().collect(),
         member_of: memberships.iter().copied().collect(),
      }
   }

   fn owned_by(pairs: &[(Uuid, Uuid)]) -> HashMap<Uuid, Uuid> {
      pairs.iter().copied().collect()
   }

   #[test]
   fn unscoped_window_is_visible_to_any_contact() {
      let owner = Uuid::new_v4();
      let w = make_window(owner, "2024-06-10T18:00:00Z", 0);
      let owners = HashMap::new();
      let now = at("2024-06-01T00:00:00Z");
      assert!(window_visible(&w, &[], &owners, &viewer(&[owner], &[]), now, None));
      assert!(!window_visible(&w, &[], &owners, &viewer(&[], &[]), now, None));
   }

   #[test]
   fn scoped_window_needs_category_membership() {
      let owner = Uuid::new_v4();
      let category = Uuid::new_v4();
      let w = make_window(owner, "2024-06-10T18:00:00Z", 0);
      let vis = vec![scope(w.id, category)];
      let owners = owned_by(&[(category, owner)]);
      let now = at("2024-06-01T00:00:00Z");
      assert!(window_visible(&w, &vis, &owners, &viewer(&[owner], &[category]), now, None));
      // accepted contact but not in the category
      assert!(!window_visible(&w, &vis, &owners, &viewer(&[owner], &[]), now, None));
      // in the category but relationship never accepted
      assert!(!window_visible(&w, &vis, &owners, &viewer(&[], &[category]), now, None));
   }

   #[test]
   fn foreign_category_grants_no_visibility() {
      let owner = Uuid::new_v4();
      let stranger = Uuid::new_v4();
      let category = Uuid::new_v4();
      let w = make_window(owner, "2024-06-10T18:00:00Z", 0);
      let vis = vec![scope(w.id, category)];
      let ctx = viewer(&[owner], &[category]);
      let now = at("2024-06-01T00:00:00Z");
      // the scoping category belongs to someone other than the window owner;
      // its membership list must not open the window
      let owners = owned_by(&[(category, stranger)]);
      assert!(!window_visible(&w, &vis, &owners, &ctx, now, None));
      // same rows with the owner actually owning the category
      let owners = owned_by(&[(category, owner)]);
      assert!(window_visible(&w, &vis, &owners, &ctx, now, None));
   }

   #[test]
   fn notice_blackout_hides_the_window() {
      let owner = Uuid::new_v4();
      let w = make_window(owner, "2024-06-10T18:00:00Z", 3);
      let owners = HashMap::new();
      let ctx = viewer(&[owner], &[]);
      // more than three days of lead time left
      assert!(window_visible(&w, &[], &owners, &ctx, at("2024-06-07T17:00:00Z"), None));
      // inside the blackout
      assert!(!window_visible(&w, &[], &owners, &ctx, at("2024-06-08T12:00:00Z"), None));
      // exactly at the boundary still visible
      assert!(window_visible(&w, &[], &owners, &ctx, at("2024-06-07T18:00:00Z"), None));
   }

   #[test]
   fn category_filter_restricts_to_that_scope() {
      let owner = Uuid::new_v4();
      let close_friends = Uuid::new_v4();
      let climbers = Uuid::new_v4();
      let scoped = make_window(owner, "2024-06-10T18:00:00Z", 0);
      let open = make_window(owner, "2024-06-12T18:00:00Z", 0);
      let vis = vec![scope(scoped.id, close_friends)];
      let owners = owned_by(&[(close_friends, owner), (climbers, owner)]);
      let ctx = viewer(&[owner], &[close_friends, climbers]);
      let now = at("2024-06-01T00:00:00Z");
      assert!(window_visible(&scoped, &vis, &owners, &ctx, now, Some(close_friends)));
      assert!(!window_visible(&scoped, &vis, &owners, &ctx, now, Some(climbers)));
      // an unscoped window never matches an explicit category filter
      assert!(!window_visible(&open, &vis, &owners, &ctx, now, Some(close_friends)));
      assert!(window_visible(&open, &vis, &owners, &ctx, now, None));
   }

   #[test]
   fn windows_of_other_owners_visibility_rows_do_not_leak() {
      let owner = Uuid::new_v4();
      let category = Uuid::new_v4();
      let w = make_window(owner, "2024-06-10T18:00:00Z", 0);
      let other = make_window(Uuid::new_v4(), "2024-06-10T18:00:00Z", 0);
      // visibility row belongs to a different window
      let vis = vec![scope(other.id, category)];
      let owners = owned_by(&[(category, owner)]);
      let ctx = viewer(&[owner], &[category]);
      let now = at("2024-06-01T00:00:00Z");
      // w itself carries no rows, so it is open to all contacts
      assert!(window_visible(&w, &vis, &owners, &ctx, now, None));
   }
}
