//! `subtrack add|update|list` subcommands

use clap::Args;

use super::{parse_date, parse_id, parse_optional_date, report_warning};
use crate::services::{SubscriptionService, SubscriptionStore};
use crate::types::{NewSubscription, Result, Subscription, SubtrackError};

/// Record a new subscription
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Owning user id
    #[arg(long = "user")]
    pub user_id: String,

    /// Service name (exact, case-sensitive)
    #[arg(long = "service")]
    pub service_name: String,

    /// Price per billed month, in whole currency units
    #[arg(long)]
    pub price: u64,

    /// First billed day (YYYY-MM-DD)
    #[arg(long)]
    pub start: String,

    /// Last billed day, inclusive (YYYY-MM-DD); omit for an active subscription
    #[arg(long)]
    pub end: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AddArgs {
    pub fn run<S: SubscriptionStore>(self, service: &SubscriptionService<S>) -> Result<()> {
        let new = NewSubscription {
            user_id: self.user_id,
            service_name: self.service_name,
            price: self.price,
            start_date: parse_date("start", &self.start)?,
            end_date: parse_optional_date("end", self.end.as_deref())?,
        };

        let (sub, warning) = service.create(new)?;
        report_warning(warning);
        print_subscription(&sub, self.json)
    }
}

/// Change fields of a subscription
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Subscription id
    pub id: String,

    #[arg(long = "service")]
    pub service_name: Option<String>,

    #[arg(long)]
    pub price: Option<u64>,

    #[arg(long)]
    pub start: Option<String>,

    #[arg(long, conflicts_with = "clear_end")]
    pub end: Option<String>,

    /// Mark the subscription as still active
    #[arg(long)]
    pub clear_end: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl UpdateArgs {
    pub fn run<S: SubscriptionStore>(self, service: &SubscriptionService<S>) -> Result<()> {
        let mut sub = service.get(parse_id(&self.id)?)?;
        let mut changed = false;

        if let Some(name) = self.service_name {
            sub.service_name = name;
            changed = true;
        }
        if let Some(price) = self.price {
            sub.price = price;
            changed = true;
        }
        if let Some(start) = self.start {
            sub.start_date = parse_date("start", &start)?;
            changed = true;
        }
        if let Some(end) = self.end {
            sub.end_date = Some(parse_date("end", &end)?);
            changed = true;
        }
        if self.clear_end {
            sub.end_date = None;
            changed = true;
        }

        if !changed {
            return Err(SubtrackError::Validation(
                "nothing to update; pass at least one field".into(),
            ));
        }

        let warning = service.update(&sub)?;
        report_warning(warning);
        print_subscription(&sub, self.json)
    }
}

/// List a user's subscriptions
#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(long = "user")]
    pub user_id: String,

    /// Records to skip
    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    /// Maximum records to show (config `list.default_limit` when omitted, 0 = all)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub fn run<S: SubscriptionStore>(
        self,
        service: &SubscriptionService<S>,
        default_limit: usize,
    ) -> Result<()> {
        let limit = self.limit.unwrap_or(default_limit);
        let subs = service.list(&self.user_id, self.offset, limit)?;

        if self.json {
            println!("{}", to_json(&subs)?);
            return Ok(());
        }

        if subs.is_empty() {
            println!("No subscriptions for {}", self.user_id);
            return Ok(());
        }
        for sub in &subs {
            println!("{}", format_row(sub));
        }
        Ok(())
    }
}

pub(super) fn print_subscription(sub: &Subscription, json: bool) -> Result<()> {
    if json {
        println!("{}", to_json(sub)?);
    } else {
        println!("{}", format_row(sub));
    }
    Ok(())
}

fn format_row(sub: &Subscription) -> String {
    let end = sub
        .end_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "active".to_string());
    format!(
        "{}  {:<20} {:>8}/mo  {} .. {}",
        sub.id, sub.service_name, sub.price, sub.start_date, end
    )
}

pub(super) fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| SubtrackError::Parse(format!("Failed to serialize output: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn test_format_row_open_ended() {
        let sub = Subscription {
            id: Uuid::nil(),
            user_id: "user-1".into(),
            service_name: "netflix".into(),
            price: 799,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: None,
        };
        let row = format_row(&sub);
        assert!(row.contains("netflix"));
        assert!(row.contains("799/mo"));
        assert!(row.ends_with("2024-01-01 .. active"));
    }
}
