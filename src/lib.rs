//! Subscription cost tracking with whole-month billing aggregation

pub mod cli;
pub mod config;
pub mod services;
pub mod types;
