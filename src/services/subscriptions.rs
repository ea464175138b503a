//! Subscription service: CRUD over a store plus cost totals

use crate::services::billing::BillingAggregator;
use crate::services::store::SubscriptionStore;
use crate::types::{
    BillingBreakdown, NewSubscription, Result, StoreWarning, Subscription, SubtrackError,
    TotalQuery,
};
use chrono::NaiveDate;
use uuid::Uuid;

pub struct SubscriptionService<S> {
    store: S,
}

impl<S: SubscriptionStore> SubscriptionService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn create(&self, new: NewSubscription) -> Result<(Subscription, Option<StoreWarning>)> {
        validate_fields(&new.user_id, &new.service_name)?;
        tracing::info!(
            user_id = %new.user_id,
            service = %new.service_name,
            "creating subscription"
        );

        let sub = self.store.create(new)?;
        tracing::info!(id = %sub.id, "subscription created");
        Ok((sub.clone(), interval_warning(&sub)))
    }

    pub fn get(&self, id: Uuid) -> Result<Subscription> {
        tracing::debug!(%id, "getting subscription");
        self.store.get_by_id(id).inspect_err(|e| {
            tracing::warn!(%id, error = %e, "subscription lookup failed");
        })
    }

    pub fn update(&self, sub: &Subscription) -> Result<Option<StoreWarning>> {
        validate_fields(&sub.user_id, &sub.service_name)?;
        tracing::info!(id = %sub.id, "updating subscription");

        self.store.update(sub)?;
        tracing::info!(id = %sub.id, "subscription updated");
        Ok(interval_warning(sub))
    }

    pub fn delete(&self, id: Uuid) -> Result<()> {
        tracing::info!(%id, "deleting subscription");
        self.store.delete(id)?;
        tracing::info!(%id, "subscription deleted");
        Ok(())
    }

    pub fn list(&self, user_id: &str, offset: usize, limit: usize) -> Result<Vec<Subscription>> {
        tracing::debug!(user_id, offset, limit, "listing subscriptions");
        let subs = self.store.list_by_user(user_id, offset, limit)?;
        tracing::debug!(count = subs.len(), "subscriptions listed");
        Ok(subs)
    }

    /// Cost breakdown for a query. `today` bounds open-ended records that
    /// have no `to` limit and must be pinned once by the caller.
    pub fn breakdown(&self, query: &TotalQuery, today: NaiveDate) -> Result<BillingBreakdown> {
        if query.user_id.trim().is_empty() {
            return Err(SubtrackError::Validation("user id must not be empty".into()));
        }
        if let (Some(from), Some(to)) = (query.window.from, query.window.to) {
            if from > to {
                // Still a valid query: every clipped interval is empty
                tracing::warn!(%from, %to, "'from' is after 'to'; nothing will be billed");
            }
        }

        tracing::info!(
            user_id = %query.user_id,
            service = ?query.service_name,
            from = ?query.window.from,
            to = ?query.window.to,
            "calculating total"
        );

        let records = self.store.find_matching(query)?;
        tracing::debug!(count = records.len(), "records matched");

        let breakdown = BillingAggregator::breakdown(
            &records,
            query.service_name.as_deref(),
            &query.window,
            today,
        );

        for id in &breakdown.skipped {
            tracing::warn!(%id, "subscription has no billable interval, skipping");
        }
        for item in &breakdown.items {
            tracing::debug!(
                id = %item.id,
                months = item.months,
                amount = item.amount,
                "line item"
            );
        }
        tracing::info!(total = breakdown.total, "total calculated");

        Ok(breakdown)
    }

    pub fn total(&self, query: &TotalQuery, today: NaiveDate) -> Result<u64> {
        Ok(self.breakdown(query, today)?.total)
    }
}

fn validate_fields(user_id: &str, service_name: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(SubtrackError::Validation("user id must not be empty".into()));
    }
    if service_name.trim().is_empty() {
        return Err(SubtrackError::Validation(
            "service name must not be empty".into(),
        ));
    }
    Ok(())
}

/// Inverted intervals are stored as-is and bill nothing.
fn interval_warning(sub: &Subscription) -> Option<StoreWarning> {
    if sub.has_inverted_interval() {
        tracing::warn!(
            id = %sub.id,
            start = %sub.start_date,
            end = ?sub.end_date,
            "end date precedes start date; subscription will not be billed"
        );
        return Some(StoreWarning::InvertedInterval(sub.id));
    }
    None
}
