//! Cart Fixtures

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;

use crate::{
    context::EvaluationContext,
    discounts::major_to_minor,
    fixtures::{FixtureError, rules::parse_timestamp},
    items::LineItem,
};

/// Wrapper for carts in YAML
#[derive(Debug, Deserialize)]
pub struct CartsFixture {
    /// Map of cart name -> cart fixture
    pub carts: FxHashMap<String, CartFixture>,
}

/// Cart fixture from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct CartFixture {
    /// Channel the cart is priced on
    pub channel: String,

    /// Cart currency (e.g., "GBP")
    pub currency: String,

    /// RFC 3339 evaluation instant
    pub at: String,

    /// Customer segment
    pub segment: Option<String>,

    /// Shipping cost (e.g., "4.99 GBP")
    pub shipping: Option<String>,

    /// Prior redemptions by rule id
    #[serde(default)]
    pub redemptions: FxHashMap<String, u32>,

    /// Line items
    #[serde(default)]
    pub items: Vec<LineItemFixture>,
}

/// Line item fixture from YAML
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemFixture {
    /// Product identifier
    pub product: String,

    /// Quantity
    #[serde(default = "one")]
    pub quantity: u32,

    /// Unit price (e.g., "2.99 GBP")
    pub price: String,
}

const fn one() -> u32 {
    1
}

impl CartFixture {
    /// Build the evaluation context for this cart
    ///
    /// # Errors
    ///
    /// Returns an error if a price, currency or timestamp cannot be parsed, or the cart
    /// contents are invalid.
    pub fn to_context(&self) -> Result<EvaluationContext<'static>, FixtureError> {
        let currency = parse_currency(&self.currency)?;

        let mut builder =
            EvaluationContext::builder(self.channel.as_str(), currency, parse_timestamp(&self.at)?);

        for item in &self.items {
            builder = builder.item(LineItem::new(
                item.product.as_str(),
                item.quantity,
                parse_price(&item.price)?,
            ));
        }

        if let Some(segment) = &self.segment {
            builder = builder.segment(segment.as_str());
        }

        if let Some(shipping) = &self.shipping {
            builder = builder.shipping(parse_price(shipping)?);
        }

        let mut redemptions: Vec<(&String, &u32)> = self.redemptions.iter().collect();
        redemptions.sort();

        for (rule, count) in redemptions {
            builder = builder.redemptions(rule.as_str(), *count);
        }

        Ok(builder.build()?)
    }
}

/// Parse a currency code
///
/// # Errors
///
/// Returns an error if the currency code is not recognised.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code.trim() {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Parse price string (e.g., "2.99 GBP") into money
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if the amount
/// cannot be parsed, or if the currency code is not recognised.
pub fn parse_price(s: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = parse_currency(code)?;

    let minor_units =
        major_to_minor(amount, currency).map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    Ok(Money::from_minor(minor_units, currency))
}
