//! Discount Resolver
//!
//! Turns a set of candidate rules and a cart into a [`DiscountOutcome`].
//!
//! Eligible rules are applied in `(priority, id)` order. Stackable rules are applied
//! sequentially on the remainder left by earlier stackable rules, so two 10% rules on a
//! 100.00 cart take 10.00 and then 9.00. At most one non-stackable rule is applied per
//! outcome, and the total discount never exceeds the subtotal. Resolution never fails:
//! anything that does not apply is recorded as a rejection.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use rusty_money::Money;
use tracing::{debug, debug_span, warn};

use crate::{
    context::EvaluationContext,
    discounts::calculate_discount,
    eligibility::{EligibilityResult, RejectionReason, evaluate},
    ids::RuleId,
    outcome::{AppliedDiscount, DiscountOutcome},
    rules::DiscountRule,
};

/// Resolves discount rules against carts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscountResolver;

impl DiscountResolver {
    /// Create a resolver.
    pub const fn new() -> Self {
        Self
    }

    /// Resolve `rules` against `context`.
    ///
    /// Rules sharing an id with an earlier rule in `rules` are ignored.
    pub fn resolve<'a>(
        &self,
        rules: &[DiscountRule],
        context: &EvaluationContext<'a>,
    ) -> DiscountOutcome<'a> {
        let span = debug_span!(
            "resolver.resolve",
            channel_id = %context.channel(),
            rule_count = rules.len()
        );
        let _entered = span.enter();

        let mut seen: FxHashSet<&RuleId> = FxHashSet::default();
        let mut rejected: BTreeMap<RuleId, RejectionReason> = BTreeMap::new();
        let mut eligible: Vec<(&DiscountRule, i64)> = Vec::with_capacity(rules.len());

        for rule in rules {
            if !seen.insert(rule.id()) {
                warn!(rule_id = %rule.id(), "ignoring duplicate rule id");
                continue;
            }

            match evaluate(rule, context) {
                EligibilityResult::Eligible(basis) => {
                    eligible.push((rule, basis.to_minor_units()));
                }
                EligibilityResult::Ineligible(reason) => {
                    debug!(rule_id = %rule.id(), %reason, "rule ineligible");
                    rejected.insert(rule.id().clone(), reason);
                }
            }
        }

        eligible.sort_by(|(a, _), (b, _)| {
            a.priority()
                .cmp(&b.priority())
                .then_with(|| a.id().cmp(b.id()))
        });

        let currency = context.currency();
        let subtotal = context.subtotal().to_minor_units();

        let mut remaining_base = subtotal;
        let mut total_discount: i64 = 0;
        let mut exclusive_applied = false;
        let mut applied = Vec::with_capacity(eligible.len());

        for (rule, basis) in eligible {
            if !rule.is_stackable() && exclusive_applied {
                debug!(rule_id = %rule.id(), "non-stackable rule already applied");
                rejected.insert(rule.id().clone(), RejectionReason::ExclusiveConflict);
                continue;
            }

            let base = basis.min(remaining_base);

            let amount = match calculate_discount(rule, base, context) {
                Ok(amount) => amount,
                Err(error) => {
                    warn!(rule_id = %rule.id(), %error, "could not price rule");
                    rejected.insert(rule.id().clone(), RejectionReason::Unpriceable);
                    continue;
                }
            };

            // Cumulative discount never exceeds the subtotal.
            let amount = amount.min(subtotal - total_discount);

            total_discount += amount;

            if rule.is_stackable() {
                remaining_base -= amount;
            } else {
                exclusive_applied = true;
            }

            debug!(rule_id = %rule.id(), amount, remaining_base, "applied rule");

            applied.push(AppliedDiscount {
                rule_id: rule.id().clone(),
                amount: Money::from_minor(amount, currency),
            });
        }

        DiscountOutcome::new(
            applied,
            rejected,
            context.subtotal(),
            Money::from_minor(total_discount, currency),
        )
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rust_decimal::Decimal;
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::{items::LineItem, rules::DiscountKind};

    use super::*;

    fn cart<'a>(subtotal_minor: i64) -> Result<EvaluationContext<'a>, crate::context::ContextError> {
        EvaluationContext::builder("web", GBP, Timestamp::UNIX_EPOCH)
            .item(LineItem::new("hat", 1, Money::from_minor(subtotal_minor, GBP)))
            .build()
    }

    #[test]
    fn empty_rules_give_empty_outcome() -> TestResult {
        let context = cart(10_000)?;

        let outcome = DiscountResolver::new().resolve(&[], &context);

        assert_eq!(outcome, DiscountOutcome::empty(Money::from_minor(10_000, GBP)));

        Ok(())
    }

    #[test]
    fn duplicate_ids_only_evaluate_first() -> TestResult {
        let context = cart(10_000)?;
        let rules = [
            DiscountRule::builder("dup", DiscountKind::Percentage, Decimal::TEN)
                .stackable(true)
                .build()?,
            DiscountRule::builder("dup", DiscountKind::Percentage, Decimal::new(50, 0))
                .stackable(true)
                .build()?,
        ];

        let outcome = DiscountResolver::new().resolve(&rules, &context);

        assert_eq!(outcome.applied().len(), 1);
        assert_eq!(outcome.total_discount(), Money::from_minor(1_000, GBP));
        assert!(outcome.rejected().is_empty());

        Ok(())
    }

    #[test]
    fn priority_ties_break_by_id() -> TestResult {
        let context = cart(10_000)?;
        let rules = [
            DiscountRule::builder("b", DiscountKind::Percentage, Decimal::TEN).build()?,
            DiscountRule::builder("a", DiscountKind::Percentage, Decimal::new(20, 0)).build()?,
        ];

        let outcome = DiscountResolver::new().resolve(&rules, &context);

        assert_eq!(
            outcome.amount_for(&RuleId::from("a")),
            Some(Money::from_minor(2_000, GBP))
        );
        assert_eq!(
            outcome.rejection(&RuleId::from("b")),
            Some(RejectionReason::ExclusiveConflict)
        );

        Ok(())
    }

    #[test]
    fn stackable_rules_still_apply_after_exclusive_rule() -> TestResult {
        let context = cart(10_000)?;
        let rules = [
            DiscountRule::builder("exclusive", DiscountKind::Percentage, Decimal::TEN)
                .priority(1)
                .build()?,
            DiscountRule::builder("stacking", DiscountKind::Percentage, Decimal::TEN)
                .priority(2)
                .stackable(true)
                .build()?,
        ];

        let outcome = DiscountResolver::new().resolve(&rules, &context);

        // The exclusive rule does not shrink the base for later stackable rules.
        assert_eq!(
            outcome.amount_for(&RuleId::from("stacking")),
            Some(Money::from_minor(1_000, GBP))
        );
        assert_eq!(outcome.total_discount(), Money::from_minor(2_000, GBP));

        Ok(())
    }

    #[test]
    fn last_rule_is_clamped_to_subtotal() -> TestResult {
        let context = cart(1_000)?;
        let rules = [
            DiscountRule::builder("exclusive", DiscountKind::FixedAmount, Decimal::new(8, 0))
                .priority(1)
                .build()?,
            DiscountRule::builder("stacking", DiscountKind::FixedAmount, Decimal::new(5, 0))
                .priority(2)
                .stackable(true)
                .build()?,
        ];

        let outcome = DiscountResolver::new().resolve(&rules, &context);

        assert_eq!(
            outcome.amount_for(&RuleId::from("stacking")),
            Some(Money::from_minor(200, GBP))
        );
        assert_eq!(outcome.total_discount(), Money::from_minor(1_000, GBP));
        assert_eq!(outcome.total()?, Money::from_minor(0, GBP));

        Ok(())
    }

    #[test]
    fn huge_fixed_amount_is_clamped_and_keeps_exclusive_slot() -> TestResult {
        let context = cart(10_000)?;
        let rules = [
            DiscountRule::builder(
                "huge",
                DiscountKind::FixedAmount,
                Decimal::from(100_000_000_000_000_000_i64),
            )
            .priority(1)
            .build()?,
            DiscountRule::builder("ten", DiscountKind::Percentage, Decimal::TEN)
                .priority(2)
                .build()?,
        ];

        let outcome = DiscountResolver::new().resolve(&rules, &context);

        assert_eq!(
            outcome.amount_for(&RuleId::from("huge")),
            Some(Money::from_minor(10_000, GBP))
        );
        assert_eq!(
            outcome.rejection(&RuleId::from("ten")),
            Some(RejectionReason::ExclusiveConflict)
        );
        assert_eq!(outcome.total()?, Money::from_minor(0, GBP));

        Ok(())
    }
}
