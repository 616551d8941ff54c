//! Rule Conditions
//!
//! Predicates a cart must satisfy before a rule applies.

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::ids::{ChannelId, CustomerSegment, IdSet, ProductId};

/// Validity window for a rule. Start is inclusive, end is exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// First instant the rule is valid, if bounded.
    pub starts_at: Option<Timestamp>,

    /// First instant the rule is no longer valid, if bounded.
    pub ends_at: Option<Timestamp>,
}

impl DateRange {
    /// Create a range with both bounds optional.
    pub const fn new(starts_at: Option<Timestamp>, ends_at: Option<Timestamp>) -> Self {
        Self { starts_at, ends_at }
    }

    /// Check whether `at` falls inside the range.
    pub fn contains(&self, at: Timestamp) -> bool {
        self.starts_at.is_none_or(|start| at >= start) && self.ends_at.is_none_or(|end| at < end)
    }

    pub(crate) fn is_empty(&self) -> bool {
        matches!((self.starts_at, self.ends_at), (Some(start), Some(end)) if end <= start)
    }
}

/// The set of conditions attached to a rule.
///
/// Absent conditions always pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    pub(crate) channels: Option<IdSet<ChannelId>>,
    pub(crate) date_range: Option<DateRange>,
    pub(crate) usage_limit: Option<u32>,
    pub(crate) min_spend: Option<Decimal>,
    pub(crate) products: Option<IdSet<ProductId>>,
    pub(crate) segments: Option<IdSet<CustomerSegment>>,
}

impl Conditions {
    /// Channels the rule is restricted to.
    pub fn channels(&self) -> Option<&IdSet<ChannelId>> {
        self.channels.as_ref()
    }

    /// Validity window.
    pub fn date_range(&self) -> Option<&DateRange> {
        self.date_range.as_ref()
    }

    /// Maximum number of redemptions.
    pub fn usage_limit(&self) -> Option<u32> {
        self.usage_limit
    }

    /// Minimum cart subtotal, in major units.
    pub fn min_spend(&self) -> Option<Decimal> {
        self.min_spend
    }

    /// Products the rule targets.
    pub fn products(&self) -> Option<&IdSet<ProductId>> {
        self.products.as_ref()
    }

    /// Customer segments the rule is restricted to.
    pub fn segments(&self) -> Option<&IdSet<CustomerSegment>> {
        self.segments.as_ref()
    }
}
