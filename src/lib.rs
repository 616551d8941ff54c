//! Rebate
//!
//! Rebate resolves the discount rules that apply to a shopping cart on a sales channel,
//! honouring eligibility conditions, priorities and stacking.

pub mod channels;
pub mod config;
pub mod context;
pub mod discounts;
pub mod eligibility;
pub mod fixtures;
pub mod ids;
pub mod items;
pub mod observability;
pub mod outcome;
pub mod prelude;
pub mod registry;
pub mod resolver;
pub mod rules;
pub mod service;
