//! Discounts
//!
//! Amount computation for each [`DiscountKind`], in minor units of the cart currency.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    context::EvaluationContext,
    items::{LineItem, cheapest_first},
    rules::{DiscountKind, DiscountRule},
};

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// A major-unit amount does not fit in minor units of the currency.
    #[error("amount {0} cannot be represented in minor units of {1}")]
    AmountConversion(Decimal, &'static str),
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// # Errors
///
/// Returns an error if the percentage calculation overflows or cannot be safely
/// represented (`DiscountError::PercentConversion`).
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Convert a major-unit amount (e.g. `4.99`) to minor units of `currency`.
///
/// # Errors
///
/// Returns `DiscountError::AmountConversion` if the amount does not fit in an `i64`.
pub fn major_to_minor(amount: Decimal, currency: &'static Currency) -> Result<i64, DiscountError> {
    let error = || DiscountError::AmountConversion(amount, currency.iso_alpha_code);

    let scale = 10_i64
        .checked_pow(currency.exponent)
        .map(Decimal::from)
        .ok_or_else(error)?;

    amount
        .checked_mul(scale)
        .ok_or_else(error)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(error)
}

/// Like [`major_to_minor`], but an amount too large for minor units becomes `i64::MAX`.
fn saturating_minor(amount: Decimal, currency: &'static Currency) -> i64 {
    major_to_minor(amount, currency).unwrap_or(i64::MAX)
}

/// Convert a `0..=100` rule value to a [`Percentage`].
fn percent_value(value: Decimal) -> Percentage {
    Percentage::from(value / Decimal::ONE_HUNDRED)
}

/// Calculate how much `rule` takes off `base` minor units.
///
/// `base` is the portion of the cart the rule may discount. The result never exceeds it.
/// Fixed amounts and shipping caps too large for minor units are bounded by `base`.
///
/// # Errors
///
/// Returns a [`DiscountError`] if a percentage amount cannot be represented.
pub fn calculate_discount(
    rule: &DiscountRule,
    base: i64,
    context: &EvaluationContext<'_>,
) -> Result<i64, DiscountError> {
    let amount = match rule.kind() {
        DiscountKind::Percentage => percent_of_minor(&percent_value(rule.value()), base)?,
        DiscountKind::FixedAmount => saturating_minor(rule.value(), context.currency()),
        DiscountKind::BuyXGetY { buy, get } => {
            let discounted = bundle_discounted_minor(rule, context, buy, get);

            percent_of_minor(&percent_value(rule.value()), discounted)?
        }
        DiscountKind::FreeShipping => {
            let shipping = context
                .shipping()
                .map_or(0, |shipping| shipping.to_minor_units());

            if rule.value().is_zero() {
                shipping
            } else {
                shipping.min(saturating_minor(rule.value(), context.currency()))
            }
        }
    };

    Ok(amount.clamp(0, base.max(0)))
}

/// Sum of the unit prices that a buy-x-get-y bundle discounts.
///
/// For every `buy + get` qualifying units, the `get` cheapest units overall are discounted.
fn bundle_discounted_minor(
    rule: &DiscountRule,
    context: &EvaluationContext<'_>,
    buy: u32,
    get: u32,
) -> i64 {
    let qualifying: Vec<&LineItem<'_>> = context
        .items()
        .iter()
        .filter(|item| {
            rule.conditions()
                .products()
                .is_none_or(|products| products.contains(item.product()))
        })
        .collect();

    let units: u64 = qualifying.iter().map(|item| u64::from(item.quantity())).sum();
    let bundle = u64::from(buy) + u64::from(get);
    let mut remaining = (units / bundle).saturating_mul(u64::from(get));

    let mut discounted: i64 = 0;

    for item in cheapest_first(qualifying) {
        if remaining == 0 {
            break;
        }

        let take = remaining.min(u64::from(item.quantity()));
        remaining -= take;

        let take = i64::try_from(take).unwrap_or(i64::MAX);

        discounted = discounted.saturating_add(
            item.unit_price()
                .to_minor_units()
                .saturating_mul(take),
        );
    }

    discounted
}
