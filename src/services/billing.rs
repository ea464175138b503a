//! Billing-period aggregation
//!
//! Turns a snapshot of subscription records into a total cost, counted in
//! whole calendar months. Everything here is pure: "today" is passed in by
//! the caller and never sampled from a clock.

use crate::types::{BillingBreakdown, DateWindow, LineItem, Subscription};
use chrono::{Datelike, NaiveDate};

/// Every billed interval is charged for at least this many months,
/// including same-day intervals.
pub const MIN_BILLED_MONTHS: u64 = 1;

/// Whole months between two dates.
///
/// A month counts once `end`'s day-of-month has reached `start`'s, so
/// Jan 15 -> Feb 15 is 2 and Jan 15 -> Feb 10 is 1. Callers must ensure
/// `end >= start`.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i64 {
    let years = i64::from(end.year() - start.year());
    let months = i64::from(end.month()) - i64::from(start.month());

    let mut total = years * 12 + months;
    if end.day() >= start.day() {
        total += 1;
    }
    total
}

/// Narrow a record's active interval to the query window.
///
/// Open-ended records with no `to` bound run through `today`.
/// Returns `None` when nothing is left to bill, which also covers records
/// stored with `end_date < start_date`.
pub fn billable_interval(
    sub: &Subscription,
    window: &DateWindow,
    today: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    let start = match window.from {
        Some(from) => sub.start_date.max(from),
        None => sub.start_date,
    };

    let end = match (sub.end_date, window.to) {
        (Some(end), Some(to)) => end.min(to),
        (Some(end), None) => end,
        (None, Some(to)) => to,
        (None, None) => today,
    };

    if end < start {
        return None;
    }
    Some((start, end))
}

/// Months billed for a clipped interval, floored at [`MIN_BILLED_MONTHS`].
pub fn billed_months(start: NaiveDate, end: NaiveDate) -> u64 {
    let months = months_between(start, end);
    if months <= 0 {
        return MIN_BILLED_MONTHS;
    }
    (months as u64).max(MIN_BILLED_MONTHS)
}

/// Aggregator for subscription costs
pub struct BillingAggregator;

impl BillingAggregator {
    /// Cost of a single record within the window, or `None` if it bills nothing.
    pub fn line_item(
        sub: &Subscription,
        window: &DateWindow,
        today: NaiveDate,
    ) -> Option<LineItem> {
        let (billed_from, billed_to) = billable_interval(sub, window, today)?;
        let months = billed_months(billed_from, billed_to);

        Some(LineItem {
            id: sub.id,
            service_name: sub.service_name.clone(),
            billed_from,
            billed_to,
            months,
            amount: sub.price.saturating_mul(months),
        })
    }

    /// Per-record breakdown of the total for `records`.
    ///
    /// `service_name` is an exact, case-sensitive filter.
    pub fn breakdown(
        records: &[Subscription],
        service_name: Option<&str>,
        window: &DateWindow,
        today: NaiveDate,
    ) -> BillingBreakdown {
        let mut result = BillingBreakdown::default();

        for sub in records
            .iter()
            .filter(|s| service_name.is_none_or(|name| s.service_name == name))
        {
            match Self::line_item(sub, window, today) {
                Some(item) => {
                    result.total = result.total.saturating_add(item.amount);
                    result.items.push(item);
                }
                None => result.skipped.push(sub.id),
            }
        }

        result
    }

    /// Total cost of `records` within the window.
    pub fn total(
        records: &[Subscription],
        service_name: Option<&str>,
        window: &DateWindow,
        today: NaiveDate,
    ) -> u64 {
        Self::breakdown(records, service_name, window, today).total
    }
}
