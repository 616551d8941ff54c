//! Eligibility
//!
//! Decides whether a rule's conditions hold for a cart. Conditions are checked in a fixed
//! order (channel, date range, usage limit, minimum spend, products, then customer segment)
//! and evaluation stops at the first failure.

use std::fmt;

use rusty_money::{Money, iso::Currency};

use crate::{
    context::EvaluationContext, discounts::major_to_minor, items::LineItem, rules::DiscountRule,
};

/// Why a rule was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    /// The cart's channel is not one of the rule's channels.
    ChannelMismatch,

    /// The evaluation time is outside the rule's validity window.
    OutsideDateRange,

    /// The rule has been redeemed as often as allowed.
    UsageLimitExceeded,

    /// The cart subtotal is below the rule's minimum spend.
    MinSpendNotMet,

    /// No line item is in the rule's product set.
    NoMatchingProducts,

    /// The customer is not in one of the rule's segments.
    SegmentMismatch,

    /// A non-stackable rule was already applied.
    ExclusiveConflict,

    /// A percentage amount could not be represented.
    Unpriceable,
}

impl RejectionReason {
    /// Stable, kebab-case reason code.
    pub const fn code(self) -> &'static str {
        match self {
            RejectionReason::ChannelMismatch => "channel-mismatch",
            RejectionReason::OutsideDateRange => "outside-date-range",
            RejectionReason::UsageLimitExceeded => "usage-limit-exceeded",
            RejectionReason::MinSpendNotMet => "min-spend-not-met",
            RejectionReason::NoMatchingProducts => "no-matching-products",
            RejectionReason::SegmentMismatch => "segment-mismatch",
            RejectionReason::ExclusiveConflict => "exclusive-conflict",
            RejectionReason::Unpriceable => "unpriceable",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of checking one rule against one cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EligibilityResult<'a> {
    /// The rule applies; the amount it may discount is attached.
    Eligible(Money<'a, Currency>),

    /// The rule does not apply.
    Ineligible(RejectionReason),
}

impl EligibilityResult<'_> {
    /// Whether the rule applies.
    pub fn is_eligible(&self) -> bool {
        matches!(self, EligibilityResult::Eligible(_))
    }
}

/// Evaluate `rule` against `context`.
///
/// The amount basis is the cart subtotal, or for rules targeting a product set the sum of
/// the matching line totals.
pub fn evaluate<'a>(rule: &DiscountRule, context: &EvaluationContext<'a>) -> EligibilityResult<'a> {
    let conditions = rule.conditions();

    if conditions
        .channels()
        .is_some_and(|channels| !channels.contains(context.channel()))
    {
        return EligibilityResult::Ineligible(RejectionReason::ChannelMismatch);
    }

    if conditions
        .date_range()
        .is_some_and(|range| !range.contains(context.at()))
    {
        return EligibilityResult::Ineligible(RejectionReason::OutsideDateRange);
    }

    if conditions
        .usage_limit()
        .is_some_and(|limit| context.redemptions(rule.id()) >= limit)
    {
        return EligibilityResult::Ineligible(RejectionReason::UsageLimitExceeded);
    }

    if let Some(min_spend) = conditions.min_spend() {
        // A threshold too large to represent can never be met.
        let met = major_to_minor(min_spend, context.currency())
            .is_ok_and(|min| context.subtotal().to_minor_units() >= min);

        if !met {
            return EligibilityResult::Ineligible(RejectionReason::MinSpendNotMet);
        }
    }

    let mut basis = context.subtotal();

    if let Some(products) = conditions.products() {
        let matching: Vec<&LineItem<'a>> = context
            .items()
            .iter()
            .filter(|item| products.contains(item.product()))
            .collect();

        if matching.is_empty() {
            return EligibilityResult::Ineligible(RejectionReason::NoMatchingProducts);
        }

        let total = matching
            .iter()
            .filter_map(|item| item.total_minor())
            .fold(0_i64, i64::saturating_add);

        basis = Money::from_minor(total, context.currency());
    }

    if conditions.segments().is_some_and(|segments| {
        !context
            .segment()
            .is_some_and(|segment| segments.contains(segment))
    }) {
        return EligibilityResult::Ineligible(RejectionReason::SegmentMismatch);
    }

    EligibilityResult::Eligible(basis)
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};
    use rust_decimal::Decimal;
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::rules::DiscountKind;

    use super::*;

    fn cart<'a>() -> Result<EvaluationContext<'a>, crate::context::ContextError> {
        EvaluationContext::builder("web", GBP, Timestamp::UNIX_EPOCH)
            .item(LineItem::new("hat", 1, Money::from_minor(3_000, GBP)))
            .item(LineItem::new("socks", 2, Money::from_minor(500, GBP)))
            .segment("vip")
            .redemptions("limited", 3)
            .build()
    }

    fn percent_rule(id: &str) -> crate::rules::RuleBuilder {
        DiscountRule::builder(id, DiscountKind::Percentage, Decimal::TEN)
    }

    #[test]
    fn unconditional_rule_is_eligible_on_subtotal() -> TestResult {
        let rule = percent_rule("open").build()?;

        assert_eq!(
            evaluate(&rule, &cart()?),
            EligibilityResult::Eligible(Money::from_minor(4_000, GBP))
        );

        Ok(())
    }

    #[test]
    fn channel_mismatch() -> TestResult {
        let rule = percent_rule("app-only").channels(["app"]).build()?;

        assert_eq!(
            evaluate(&rule, &cart()?),
            EligibilityResult::Ineligible(RejectionReason::ChannelMismatch)
        );

        Ok(())
    }

    #[test]
    fn outside_date_range() -> TestResult {
        let tomorrow = Timestamp::UNIX_EPOCH + SignedDuration::from_hours(24);
        let rule = percent_rule("later")
            .valid_between(Some(tomorrow), None)
            .build()?;

        assert_eq!(
            evaluate(&rule, &cart()?),
            EligibilityResult::Ineligible(RejectionReason::OutsideDateRange)
        );

        Ok(())
    }

    #[test]
    fn usage_limit_exceeded() -> TestResult {
        let exhausted = percent_rule("limited").usage_limit(3).build()?;
        let available = percent_rule("limited").usage_limit(4).build()?;

        assert_eq!(
            evaluate(&exhausted, &cart()?),
            EligibilityResult::Ineligible(RejectionReason::UsageLimitExceeded)
        );
        assert!(evaluate(&available, &cart()?).is_eligible());

        Ok(())
    }

    #[test]
    fn min_spend_not_met() -> TestResult {
        let rule = percent_rule("big-spender")
            .min_spend(Decimal::new(5_000, 2))
            .build()?;

        assert_eq!(
            evaluate(&rule, &cart()?),
            EligibilityResult::Ineligible(RejectionReason::MinSpendNotMet)
        );

        Ok(())
    }

    #[test]
    fn min_spend_is_inclusive() -> TestResult {
        let rule = percent_rule("exact").min_spend(Decimal::new(40, 0)).build()?;

        assert!(evaluate(&rule, &cart()?).is_eligible());

        Ok(())
    }

    #[test]
    fn product_set_narrows_basis() -> TestResult {
        let rule = percent_rule("socks").products(["socks", "gloves"]).build()?;

        assert_eq!(
            evaluate(&rule, &cart()?),
            EligibilityResult::Eligible(Money::from_minor(1_000, GBP))
        );

        Ok(())
    }

    #[test]
    fn no_matching_products() -> TestResult {
        let rule = percent_rule("gloves").products(["gloves"]).build()?;

        assert_eq!(
            evaluate(&rule, &cart()?),
            EligibilityResult::Ineligible(RejectionReason::NoMatchingProducts)
        );

        Ok(())
    }

    #[test]
    fn segment_mismatch() -> TestResult {
        let rule = percent_rule("staff").segments(["staff"]).build()?;
        let anonymous =
            EvaluationContext::builder("web", GBP, Timestamp::UNIX_EPOCH).build()?;

        assert_eq!(
            evaluate(&rule, &cart()?),
            EligibilityResult::Ineligible(RejectionReason::SegmentMismatch)
        );
        assert_eq!(
            evaluate(&rule, &anonymous),
            EligibilityResult::Ineligible(RejectionReason::SegmentMismatch)
        );

        Ok(())
    }

    #[test]
    fn first_failing_condition_wins() -> TestResult {
        // Fails channel, min-spend and product checks; channel is reported.
        let rule = percent_rule("everything-wrong")
            .channels(["app"])
            .min_spend(Decimal::new(1_000, 0))
            .products(["gloves"])
            .build()?;

        assert_eq!(
            evaluate(&rule, &cart()?),
            EligibilityResult::Ineligible(RejectionReason::ChannelMismatch)
        );

        Ok(())
    }

    #[test]
    fn reason_codes() {
        assert_eq!(RejectionReason::MinSpendNotMet.to_string(), "min-spend-not-met");
        assert_eq!(
            RejectionReason::ExclusiveConflict.to_string(),
            "exclusive-conflict"
        );
    }
}
