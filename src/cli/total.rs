//! `subtrack total` subcommand

use chrono::{Local, NaiveDate};
use clap::Args;
use serde::Serialize;

use super::manage::to_json;
use super::parse_optional_date;
use crate::services::{SubscriptionService, SubscriptionStore};
use crate::types::{BillingBreakdown, DateWindow, LineItem, Result, TotalQuery};

/// Total cost of a user's subscriptions
#[derive(Args, Debug)]
pub struct TotalArgs {
    #[arg(long = "user")]
    pub user_id: String,

    /// Only count this service (exact, case-sensitive)
    #[arg(long = "service")]
    pub service_name: Option<String>,

    /// Window start (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Window end, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Include per-subscription line items
    #[arg(long)]
    pub breakdown: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct TotalReport<'a> {
    user_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    service_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<NaiveDate>,
    total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<&'a [LineItem]>,
}

impl TotalArgs {
    pub fn query(&self) -> Result<TotalQuery> {
        let window = DateWindow::new(
            parse_optional_date("from", self.from.as_deref())?,
            parse_optional_date("to", self.to.as_deref())?,
        );

        let mut query = TotalQuery::for_user(self.user_id.clone()).with_window(window);
        if let Some(name) = self.service_name.as_deref().filter(|n| !n.is_empty()) {
            query = query.with_service(name);
        }
        Ok(query)
    }

    pub fn run<S: SubscriptionStore>(self, service: &SubscriptionService<S>) -> Result<()> {
        let query = self.query()?;
        // Pinned once so every open-ended record is billed to the same day
        let today = Local::now().date_naive();
        let breakdown = service.breakdown(&query, today)?;

        if self.json {
            let report = TotalReport {
                user_id: &query.user_id,
                service_name: query.service_name.as_deref(),
                from: query.window.from,
                to: query.window.to,
                total: breakdown.total,
                items: self.breakdown.then_some(breakdown.items.as_slice()),
            };
            println!("{}", to_json(&report)?);
            return Ok(());
        }

        if self.breakdown {
            print_line_items(&breakdown);
        }
        println!("Total: {}", breakdown.total);
        Ok(())
    }
}

fn print_line_items(breakdown: &BillingBreakdown) {
    for item in &breakdown.items {
        println!(
            "{}  {:<20} {} .. {}  {:>3} mo  {:>10}",
            item.id, item.service_name, item.billed_from, item.billed_to, item.months, item.amount
        );
    }
    if !breakdown.skipped.is_empty() {
        println!("({} subscription(s) not billed in this window)", breakdown.skipped.len());
    }
}
