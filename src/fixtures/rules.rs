//! Rule Fixtures

use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    rules::{DiscountKind, DiscountRule},
};

/// Wrapper for rules in YAML
#[derive(Debug, Deserialize)]
pub struct RulesFixture {
    /// Map of rule id -> rule fixture
    pub rules: FxHashMap<String, RuleFixture>,
}

/// Reward kind, tagged by `kind`
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KindFixture {
    /// Percent off
    Percentage,

    /// Fixed amount off
    FixedAmount,

    /// Buy some, get some discounted
    BuyXGetY {
        /// Units paid for
        buy: u32,

        /// Units discounted
        get: u32,
    },

    /// Shipping discount
    FreeShipping,
}

impl From<KindFixture> for DiscountKind {
    fn from(fixture: KindFixture) -> Self {
        match fixture {
            KindFixture::Percentage => DiscountKind::Percentage,
            KindFixture::FixedAmount => DiscountKind::FixedAmount,
            KindFixture::BuyXGetY { buy, get } => DiscountKind::BuyXGetY { buy, get },
            KindFixture::FreeShipping => DiscountKind::FreeShipping,
        }
    }
}

/// Rule fixture from YAML
#[derive(Debug, Deserialize)]
pub struct RuleFixture {
    /// Reward kind
    #[serde(flatten)]
    pub kind: KindFixture,

    /// Reward value (e.g., "10" or "4.99")
    #[serde(default = "zero")]
    pub value: String,

    /// Whether the rule combines with others
    #[serde(default)]
    pub stackable: bool,

    /// Ordering key, lower first
    #[serde(default)]
    pub priority: i32,

    /// Eligibility conditions
    #[serde(default)]
    pub conditions: ConditionsFixture,
}

fn zero() -> String {
    "0".to_string()
}

/// Rule conditions from YAML
#[derive(Debug, Default, Deserialize)]
pub struct ConditionsFixture {
    /// Channel ids
    pub channels: Option<Vec<String>>,

    /// RFC 3339 start instant, inclusive
    pub starts_at: Option<String>,

    /// RFC 3339 end instant, exclusive
    pub ends_at: Option<String>,

    /// Maximum redemptions
    pub usage_limit: Option<u32>,

    /// Minimum subtotal in major units
    pub min_spend: Option<String>,

    /// Product ids
    pub products: Option<Vec<String>>,

    /// Customer segments
    pub segments: Option<Vec<String>>,
}

impl RuleFixture {
    /// Convert to a validated [`DiscountRule`]
    ///
    /// # Errors
    ///
    /// Returns an error if a value or timestamp cannot be parsed, or the rule is malformed.
    pub fn try_into_rule(self, id: String) -> Result<DiscountRule, FixtureError> {
        let mut builder = DiscountRule::builder(id, self.kind.into(), parse_decimal(&self.value)?)
            .stackable(self.stackable)
            .priority(self.priority);

        let conditions = self.conditions;

        if let Some(channels) = conditions.channels {
            builder = builder.channels(channels);
        }

        if conditions.starts_at.is_some() || conditions.ends_at.is_some() {
            builder = builder.valid_between(
                conditions.starts_at.as_deref().map(parse_timestamp).transpose()?,
                conditions.ends_at.as_deref().map(parse_timestamp).transpose()?,
            );
        }

        if let Some(limit) = conditions.usage_limit {
            builder = builder.usage_limit(limit);
        }

        if let Some(min_spend) = conditions.min_spend {
            builder = builder.min_spend(parse_decimal(&min_spend)?);
        }

        if let Some(products) = conditions.products {
            builder = builder.products(products);
        }

        if let Some(segments) = conditions.segments {
            builder = builder.segments(segments);
        }

        Ok(builder.build()?)
    }
}

/// Parse a decimal string (e.g., "4.99")
///
/// # Errors
///
/// Returns an error if the string is not a decimal number.
pub fn parse_decimal(s: &str) -> Result<Decimal, FixtureError> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidDecimal(s.to_string()))
}

/// Parse an RFC 3339 timestamp (e.g., "2026-06-01T00:00:00Z")
///
/// # Errors
///
/// Returns an error if the string is not a valid timestamp.
pub fn parse_timestamp(s: &str) -> Result<Timestamp, FixtureError> {
    s.trim()
        .parse::<Timestamp>()
        .map_err(|_err| FixtureError::InvalidTimestamp(s.to_string()))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{ids::RuleId, rules::ValidationError};

    use super::*;

    #[test]
    fn parses_percentage_rule_with_conditions() -> TestResult {
        let yaml = r#"
kind: percentage
value: "10"
stackable: true
priority: 5
conditions:
  channels: [web]
  starts_at: "2026-06-01T00:00:00Z"
  min_spend: "50.00"
  products: [hat, socks]
"#;
        let fixture: RuleFixture = serde_norway::from_str(yaml)?;
        let rule = fixture.try_into_rule("summer".to_string())?;

        assert_eq!(rule.kind(), DiscountKind::Percentage);
        assert_eq!(rule.value(), Decimal::TEN);
        assert!(rule.is_stackable());
        assert_eq!(rule.priority(), 5);
        assert_eq!(rule.conditions().min_spend(), Some(Decimal::new(5_000, 2)));
        assert_eq!(rule.conditions().products().map(|set| set.len()), Some(2));
        assert!(
            rule.conditions()
                .date_range()
                .is_some_and(|range| range.ends_at.is_none())
        );

        Ok(())
    }

    #[test]
    fn parses_bundle_rule() -> TestResult {
        let yaml = r#"
kind: buy_x_get_y
buy: 2
get: 1
value: "100"
"#;
        let fixture: RuleFixture = serde_norway::from_str(yaml)?;
        let rule = fixture.try_into_rule("b2g1".to_string())?;

        assert_eq!(rule.kind(), DiscountKind::BuyXGetY { buy: 2, get: 1 });

        Ok(())
    }

    #[test]
    fn free_shipping_value_defaults_to_zero() -> TestResult {
        let fixture: RuleFixture = serde_norway::from_str("kind: free_shipping")?;
        let rule = fixture.try_into_rule("ship".to_string())?;

        assert_eq!(rule.value(), Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn rejects_unknown_kind() {
        let result: Result<RuleFixture, _> =
            serde_norway::from_str("kind: mystery\nvalue: \"1\"");

        assert!(result.is_err());
    }

    #[test]
    fn invalid_rule_surfaces_validation_error() -> TestResult {
        let fixture: RuleFixture = serde_norway::from_str("kind: percentage\nvalue: \"150\"")?;

        let result = fixture.try_into_rule("too-much".to_string());

        assert!(matches!(
            result,
            Err(FixtureError::Rule(ValidationError::PercentageOutOfRange(id, _)))
                if id == RuleId::from("too-much")
        ));

        Ok(())
    }

    #[test]
    fn invalid_timestamp() {
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(FixtureError::InvalidTimestamp(_))
        ));
    }
}
