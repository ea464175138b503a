//! Subscription records and billing query/report types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single billed subscription owned by a user.
///
/// `end_date` is inclusive; `None` means the subscription is still active.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: String,
    pub service_name: String,
    /// Currency units charged per billed month
    pub price: u64,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl Subscription {
    /// True when a stored end date precedes the start date.
    pub fn has_inverted_interval(&self) -> bool {
        matches!(self.end_date, Some(end) if end < self.start_date)
    }
}

/// Fields supplied on creation; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub user_id: String,
    pub service_name: String,
    pub price: u64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl NewSubscription {
    pub fn into_subscription(self, id: Uuid) -> Subscription {
        Subscription {
            id,
            user_id: self.user_id,
            service_name: self.service_name,
            price: self.price,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Optional query window. Either bound may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Does `sub`'s active interval intersect this window?
    /// A missing end date is treated as unbounded.
    pub fn overlaps(&self, sub: &Subscription) -> bool {
        let starts_in_time = self.to.is_none_or(|to| sub.start_date <= to);
        let ends_in_time = match (self.from, sub.end_date) {
            (Some(from), Some(end)) => end >= from,
            _ => true,
        };
        starts_in_time && ends_in_time
    }
}

/// A total-cost query for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalQuery {
    pub user_id: String,
    pub service_name: Option<String>,
    pub window: DateWindow,
}

impl TotalQuery {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            service_name: None,
            window: DateWindow::unbounded(),
        }
    }

    pub fn with_service(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    pub fn with_window(mut self, window: DateWindow) -> Self {
        self.window = window;
        self
    }

    /// Store-side predicate: user, exact service name, date overlap.
    pub fn matches(&self, sub: &Subscription) -> bool {
        sub.user_id == self.user_id
            && self
                .service_name
                .as_deref()
                .is_none_or(|name| sub.service_name == name)
            && self.window.overlaps(sub)
    }
}

/// One billed record within a [`BillingBreakdown`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    pub id: Uuid,
    pub service_name: String,
    pub billed_from: NaiveDate,
    pub billed_to: NaiveDate,
    pub months: u64,
    pub amount: u64,
}

/// Total plus the per-record contributions that make it up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BillingBreakdown {
    pub total: u64,
    pub items: Vec<LineItem>,
    /// Records that survived the service filter but billed nothing
    pub skipped: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_sub(service: &str, start: NaiveDate, end: Option<NaiveDate>) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            user_id: "user-1".into(),
            service_name: service.into(),
            price: 100,
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn test_serialize_omits_missing_end_date() {
        let sub = make_sub("netflix", date(2024, 1, 1), None);
        let json = serde_json::to_string(&sub).unwrap();
        assert!(json.contains("\"start_date\":\"2024-01-01\""));
        assert!(!json.contains("end_date"));
    }

    #[test]
    fn test_deserialize_without_end_date() {
        let json = r#"{
            "id": "6f1c1d56-58e4-4a7b-8a7d-0b6f6d9d3c11",
            "user_id": "user-1",
            "service_name": "spotify",
            "price": 300,
            "start_date": "2024-07-01"
        }"#;
        let sub: Subscription = serde_json::from_str(json).unwrap();
        assert!(sub.end_date.is_none());
        assert_eq!(sub.price, 300);
    }

    #[test]
    fn test_inverted_interval() {
        let sub = make_sub("x", date(2024, 5, 1), Some(date(2024, 4, 1)));
        assert!(sub.has_inverted_interval());
        let ok = make_sub("x", date(2024, 5, 1), Some(date(2024, 5, 1)));
        assert!(!ok.has_inverted_interval());
    }

    #[test]
    fn test_window_overlap_both_bounds() {
        let window = DateWindow::new(Some(date(2024, 3, 1)), Some(date(2024, 6, 30)));

        assert!(window.overlaps(&make_sub("a", date(2024, 1, 1), None)));
        assert!(window.overlaps(&make_sub("a", date(2024, 1, 1), Some(date(2024, 3, 1)))));
        assert!(!window.overlaps(&make_sub("a", date(2024, 1, 1), Some(date(2024, 2, 29)))));
        assert!(!window.overlaps(&make_sub("a", date(2024, 7, 1), None)));
    }

    #[test]
    fn test_window_overlap_single_bound() {
        let from_only = DateWindow::new(Some(date(2024, 3, 1)), None);
        assert!(!from_only.overlaps(&make_sub("a", date(2023, 1, 1), Some(date(2023, 12, 31)))));
        assert!(from_only.overlaps(&make_sub("a", date(2030, 1, 1), None)));

        let to_only = DateWindow::new(None, Some(date(2024, 3, 1)));
        assert!(to_only.overlaps(&make_sub("a", date(2020, 1, 1), Some(date(2020, 2, 1)))));
        assert!(!to_only.overlaps(&make_sub("a", date(2024, 3, 2), None)));
    }

    #[test]
    fn test_query_matches_user_and_service() {
        let sub = make_sub("netflix", date(2024, 1, 1), None);

        assert!(TotalQuery::for_user("user-1").matches(&sub));
        assert!(TotalQuery::for_user("user-1").with_service("netflix").matches(&sub));
        // exact, case-sensitive
        assert!(!TotalQuery::for_user("user-1").with_service("Netflix").matches(&sub));
        assert!(!TotalQuery::for_user("user-2").matches(&sub));
    }
}
