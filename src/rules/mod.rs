//! Discount Rules
//!
//! A [`DiscountRule`] is an immutable, validated description of one promotion. Rules are
//! only created through [`RuleBuilder::build`], so every rule the resolver sees already
//! satisfies the value invariants.

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::ids::{ChannelId, CustomerSegment, IdSet, ProductId, RuleId};

pub mod conditions;

pub use conditions::{Conditions, DateRange};

/// Errors raised when a rule definition is malformed.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// The rule value is negative.
    #[error("rule {0}: value must not be negative, got {1}")]
    NegativeValue(RuleId, Decimal),

    /// A percentage value is outside `0..=100`.
    #[error("rule {0}: percentage must be between 0 and 100, got {1}")]
    PercentageOutOfRange(RuleId, Decimal),

    /// A buy-x-get-y rule has a zero `buy` or `get` quantity.
    #[error("rule {0}: buy and get quantities must both be at least 1")]
    InvalidBundle(RuleId),

    /// The minimum spend is negative.
    #[error("rule {0}: minimum spend must not be negative, got {1}")]
    NegativeMinSpend(RuleId, Decimal),

    /// The date range ends at or before it starts.
    #[error("rule {0}: date range ends before it starts")]
    EmptyDateRange(RuleId),

    /// A membership condition was given an empty set (rule id, condition name).
    #[error("rule {0}: {1} condition must not be empty")]
    EmptyCondition(RuleId, &'static str),
}

/// The kind of reward a rule grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountKind {
    /// Percent off the applicable amount; value is `0..=100`.
    Percentage,

    /// Fixed amount off, in major units of the cart currency.
    FixedAmount,

    /// For every `buy + get` qualifying units, the cheapest `get` units are discounted by
    /// `value` percent.
    BuyXGetY {
        /// Units the customer pays for
        buy: u32,

        /// Units discounted per bundle
        get: u32,
    },

    /// Shipping discounted, capped at `value` major units (zero is uncapped).
    FreeShipping,
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountKind::Percentage => f.write_str("percentage"),
            DiscountKind::FixedAmount => f.write_str("fixed-amount"),
            DiscountKind::BuyXGetY { buy, get } => write!(f, "buy-{buy}-get-{get}"),
            DiscountKind::FreeShipping => f.write_str("free-shipping"),
        }
    }
}

/// A validated promotional rule.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountRule {
    id: RuleId,
    kind: DiscountKind,
    value: Decimal,
    conditions: Conditions,
    stackable: bool,
    priority: i32,
}

impl DiscountRule {
    /// Start building a rule.
    pub fn builder(id: impl Into<RuleId>, kind: DiscountKind, value: Decimal) -> RuleBuilder {
        RuleBuilder {
            rule: DiscountRule {
                id: id.into(),
                kind,
                value,
                conditions: Conditions::default(),
                stackable: false,
                priority: 0,
            },
        }
    }

    /// Rule identifier.
    pub fn id(&self) -> &RuleId {
        &self.id
    }

    /// Reward kind.
    pub fn kind(&self) -> DiscountKind {
        self.kind
    }

    /// Reward value; its meaning depends on [`DiscountKind`].
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Eligibility conditions.
    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// Whether this rule can be combined with other rules.
    pub fn is_stackable(&self) -> bool {
        self.stackable
    }

    /// Ordering key; lower values are applied first.
    pub fn priority(&self) -> i32 {
        self.priority
    }
}

/// Builder for [`DiscountRule`].
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    rule: DiscountRule,
}

impl RuleBuilder {
    /// Allow the rule to combine with other rules.
    #[must_use]
    pub fn stackable(mut self, stackable: bool) -> Self {
        self.rule.stackable = stackable;
        self
    }

    /// Set the priority (lower first).
    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.rule.priority = priority;
        self
    }

    /// Restrict the rule to the given channels.
    #[must_use]
    pub fn channels(mut self, channels: impl IntoIterator<Item = impl Into<ChannelId>>) -> Self {
        self.rule.conditions.channels = Some(IdSet::new(channels));
        self
    }

    /// Restrict the rule to a validity window.
    #[must_use]
    pub fn valid_between(mut self, starts_at: Option<Timestamp>, ends_at: Option<Timestamp>) -> Self {
        self.rule.conditions.date_range = Some(DateRange::new(starts_at, ends_at));
        self
    }

    /// Limit the number of redemptions.
    #[must_use]
    pub fn usage_limit(mut self, limit: u32) -> Self {
        self.rule.conditions.usage_limit = Some(limit);
        self
    }

    /// Require a minimum subtotal, in major units.
    #[must_use]
    pub fn min_spend(mut self, min_spend: Decimal) -> Self {
        self.rule.conditions.min_spend = Some(min_spend);
        self
    }

    /// Target the given products.
    #[must_use]
    pub fn products(mut self, products: impl IntoIterator<Item = impl Into<ProductId>>) -> Self {
        self.rule.conditions.products = Some(IdSet::new(products));
        self
    }

    /// Restrict the rule to the given customer segments.
    #[must_use]
    pub fn segments(
        mut self,
        segments: impl IntoIterator<Item = impl Into<CustomerSegment>>,
    ) -> Self {
        self.rule.conditions.segments = Some(IdSet::new(segments));
        self
    }

    /// Validate and produce the rule.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the value is negative, a percentage is outside
    /// `0..=100`, a bundle has a zero quantity, the minimum spend is negative, the date
    /// range is empty, or a membership condition has no members.
    pub fn build(self) -> Result<DiscountRule, ValidationError> {
        let rule = self.rule;
        let id = || rule.id.clone();

        if rule.value < Decimal::ZERO {
            return Err(ValidationError::NegativeValue(id(), rule.value));
        }

        match rule.kind {
            DiscountKind::Percentage | DiscountKind::BuyXGetY { .. }
                if rule.value > Decimal::ONE_HUNDRED =>
            {
                return Err(ValidationError::PercentageOutOfRange(id(), rule.value));
            }
            DiscountKind::BuyXGetY { buy, get } if buy == 0 || get == 0 => {
                return Err(ValidationError::InvalidBundle(id()));
            }
            _ => {}
        }

        let conditions = &rule.conditions;

        if let Some(min_spend) = conditions.min_spend.filter(|spend| *spend < Decimal::ZERO) {
            return Err(ValidationError::NegativeMinSpend(id(), min_spend));
        }

        if conditions.date_range.is_some_and(|range| range.is_empty()) {
            return Err(ValidationError::EmptyDateRange(id()));
        }

        if conditions.channels.as_ref().is_some_and(IdSet::is_empty) {
            return Err(ValidationError::EmptyCondition(id(), "channel"));
        }

        if conditions.products.as_ref().is_some_and(IdSet::is_empty) {
            return Err(ValidationError::EmptyCondition(id(), "product"));
        }

        if conditions.segments.as_ref().is_some_and(IdSet::is_empty) {
            return Err(ValidationError::EmptyCondition(id(), "segment"));
        }

        Ok(rule)
    }
}
