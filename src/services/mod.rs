//! Services for subscription storage and cost aggregation

pub mod billing;
pub mod store;
pub mod subscriptions;

pub use billing::{BillingAggregator, MIN_BILLED_MONTHS};
pub use store::{JsonFileStore, SubscriptionStore};
pub use subscriptions::SubscriptionService;
