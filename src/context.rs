//! Evaluation Context
//!
//! An immutable snapshot of a cart, taken once per resolution call.

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    ids::{ChannelId, CustomerSegment, RuleId},
    items::LineItem,
};

/// Errors raised while building an evaluation context.
///
/// These are integration bugs in the caller, not business outcomes.
#[derive(Debug, Error, PartialEq)]
pub enum ContextError {
    /// A line item has a quantity of zero (line index).
    #[error("line item {0} has zero quantity")]
    ZeroQuantity(usize),

    /// A line item has a negative unit price (line index).
    #[error("line item {0} has a negative unit price")]
    NegativePrice(usize),

    /// An item's currency differs from the context currency (index, item currency, context currency).
    #[error("line item {0} has currency {1}, but context has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// Shipping cost currency differs from the context currency.
    #[error("shipping has currency {0}, but context has currency {1}")]
    ShippingCurrencyMismatch(&'static str, &'static str),

    /// Shipping cost is negative.
    #[error("shipping cost is negative")]
    NegativeShipping,

    /// Line or cart totals do not fit in minor units.
    #[error("cart totals overflowed")]
    Overflow,
}

/// Read-only cart snapshot evaluated by the discount engine.
#[derive(Debug, Clone)]
pub struct EvaluationContext<'a> {
    items: SmallVec<[LineItem<'a>; 10]>,
    subtotal: Money<'a, Currency>,
    channel: ChannelId,
    segment: Option<CustomerSegment>,
    at: Timestamp,
    shipping: Option<Money<'a, Currency>>,
    redemptions: FxHashMap<RuleId, u32>,
    currency: &'static Currency,
}

impl<'a> EvaluationContext<'a> {
    /// Start building a context for a cart on `channel` at time `at`.
    pub fn builder(
        channel: impl Into<ChannelId>,
        currency: &'static Currency,
        at: Timestamp,
    ) -> ContextBuilder<'a> {
        ContextBuilder {
            items: SmallVec::new(),
            channel: channel.into(),
            segment: None,
            at,
            shipping: None,
            redemptions: FxHashMap::default(),
            currency,
        }
    }

    /// Line items, in cart order.
    pub fn items(&self) -> &[LineItem<'a>] {
        &self.items
    }

    /// Sum of all line totals.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Channel the cart is being priced on.
    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Customer segment, if the customer is known.
    pub fn segment(&self) -> Option<&CustomerSegment> {
        self.segment.as_ref()
    }

    /// Evaluation timestamp.
    pub fn at(&self) -> Timestamp {
        self.at
    }

    /// Shipping cost, if shipping has been quoted.
    pub fn shipping(&self) -> Option<Money<'a, Currency>> {
        self.shipping
    }

    /// How many times `rule` has already been redeemed.
    pub fn redemptions(&self, rule: &RuleId) -> u32 {
        self.redemptions.get(rule).copied().unwrap_or_default()
    }

    /// Currency of every monetary value in the context.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// Builder for [`EvaluationContext`].
#[derive(Debug)]
pub struct ContextBuilder<'a> {
    items: SmallVec<[LineItem<'a>; 10]>,
    channel: ChannelId,
    segment: Option<CustomerSegment>,
    at: Timestamp,
    shipping: Option<Money<'a, Currency>>,
    redemptions: FxHashMap<RuleId, u32>,
    currency: &'static Currency,
}

impl<'a> ContextBuilder<'a> {
    /// Append a line item.
    #[must_use]
    pub fn item(mut self, item: LineItem<'a>) -> Self {
        self.items.push(item);
        self
    }

    /// Append several line items.
    #[must_use]
    pub fn items(mut self, items: impl IntoIterator<Item = LineItem<'a>>) -> Self {
        self.items.extend(items);
        self
    }

    /// Set the customer segment.
    #[must_use]
    pub fn segment(mut self, segment: impl Into<CustomerSegment>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    /// Set the quoted shipping cost.
    #[must_use]
    pub fn shipping(mut self, shipping: Money<'a, Currency>) -> Self {
        self.shipping = Some(shipping);
        self
    }

    /// Record prior redemptions of a rule.
    #[must_use]
    pub fn redemptions(mut self, rule: impl Into<RuleId>, count: u32) -> Self {
        self.redemptions.insert(rule.into(), count);
        self
    }

    /// Validate the snapshot and compute its subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`ContextError`] if any line has zero quantity or a negative price, if a
    /// monetary value is in a different currency, or if totals overflow.
    pub fn build(self) -> Result<EvaluationContext<'a>, ContextError> {
        let mut subtotal: i64 = 0;

        for (idx, item) in self.items.iter().enumerate() {
            let item_currency = item.unit_price().currency();

            if item_currency != self.currency {
                return Err(ContextError::CurrencyMismatch(
                    idx,
                    item_currency.iso_alpha_code,
                    self.currency.iso_alpha_code,
                ));
            }

            if item.quantity() == 0 {
                return Err(ContextError::ZeroQuantity(idx));
            }

            if item.unit_price().to_minor_units() < 0 {
                return Err(ContextError::NegativePrice(idx));
            }

            subtotal = item
                .total_minor()
                .and_then(|total| subtotal.checked_add(total))
                .ok_or(ContextError::Overflow)?;
        }

        if let Some(shipping) = self.shipping {
            if shipping.currency() != self.currency {
                return Err(ContextError::ShippingCurrencyMismatch(
                    shipping.currency().iso_alpha_code,
                    self.currency.iso_alpha_code,
                ));
            }

            if shipping.to_minor_units() < 0 {
                return Err(ContextError::NegativeShipping);
            }
        }

        Ok(EvaluationContext {
            items: self.items,
            subtotal: Money::from_minor(subtotal, self.currency),
            channel: self.channel,
            segment: self.segment,
            at: self.at,
            shipping: self.shipping,
            redemptions: self.redemptions,
            currency: self.currency,
        })
    }
}
