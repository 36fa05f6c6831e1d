use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Navigation counters persisted by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationStats {
    pub total_navigations: u64,
    /// Keyed by `"{start_id}_{end_id}"`.
    pub popular_routes: BTreeMap<String, u64>,
    /// Keyed by `YYYY-MM-DD`.
    pub daily_stats: BTreeMap<String, u64>,
    pub last_reset: DateTime<Utc>,
}

impl Default for NavigationStats {
    fn default() -> Self {
        Self::reset_at(Utc::now())
    }
}

impl NavigationStats {
    pub fn reset_at(now: DateTime<Utc>) -> Self {
        Self {
            total_navigations: 0,
            popular_routes: BTreeMap::new(),
            daily_stats: BTreeMap::new(),
            last_reset: now,
        }
    }

    pub fn route_key(start_id: &str, end_id: &str) -> String {
        format!("{start_id}_{end_id}")
    }

    pub fn record(&mut self, start_id: &str, end_id: &str, day: NaiveDate) {
        self.total_navigations += 1;
        *self
            .popular_routes
            .entry(Self::route_key(start_id, end_id))
            .or_insert(0) += 1;
        *self
            .daily_stats
            .entry(day.format("%Y-%m-%d").to_string())
            .or_insert(0) += 1;
    }

    /// Splits a route key back into ids. Ids may contain `_`, so every split
    /// position is tried and the first where both halves resolve wins.
    pub fn split_route_key<'k>(
        key: &'k str,
        is_known: impl Fn(&str) -> bool,
    ) -> Option<(&'k str, &'k str)> {
        key.match_indices('_')
            .map(|(idx, _)| (&key[..idx], &key[idx + 1..]))
            .find(|(start, end)| is_known(start) && is_known(end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_updates_all_counters() {
        let mut stats = NavigationStats::default();
        let day = NaiveDate::from_ymd_opt(2024, 9, 2).expect("valid date");
        stats.record("entrance_1", "library", day);
        stats.record("entrance_1", "library", day);
        stats.record("library", "stair_2", day);

        assert_eq!(stats.total_navigations, 3);
        assert_eq!(stats.popular_routes.get("entrance_1_library"), Some(&2));
        assert_eq!(stats.daily_stats.get("2024-09-02"), Some(&3));
    }

    #[test]
    fn split_route_key_handles_underscored_ids() {
        let known = ["entrance_1", "classroom_B115", "library"];
        let is_known = |id: &str| known.contains(&id);
        assert_eq!(
            NavigationStats::split_route_key("entrance_1_classroom_B115", is_known),
            Some(("entrance_1", "classroom_B115"))
        );
        assert_eq!(
            NavigationStats::split_route_key("library_gone", is_known),
            None
        );
    }

    #[test]
    fn stats_file_with_missing_fields_loads() {
        let stats: NavigationStats =
            serde_json::from_str(r#"{"total_navigations":4}"#).expect("parse stats");
        assert_eq!(stats.total_navigations, 4);
        assert!(stats.popular_routes.is_empty());
    }
}
