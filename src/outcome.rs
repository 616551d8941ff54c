//! Discount Outcome

use std::{collections::BTreeMap, io};

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{eligibility::RejectionReason, ids::RuleId};

/// Errors that can occur when rendering an outcome.
#[derive(Debug, Error)]
pub enum OutcomeError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Failed to write the rendered table.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// One rule that was applied and the amount it took off.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedDiscount<'a> {
    /// Rule that was applied
    pub rule_id: RuleId,

    /// Amount discounted by the rule
    pub amount: Money<'a, Currency>,
}

/// Result of resolving a set of rules against one cart.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountOutcome<'a> {
    applied: Vec<AppliedDiscount<'a>>,
    rejected: BTreeMap<RuleId, RejectionReason>,
    subtotal: Money<'a, Currency>,
    total_discount: Money<'a, Currency>,
}

impl<'a> DiscountOutcome<'a> {
    /// Create an outcome with the given details.
    pub fn new(
        applied: Vec<AppliedDiscount<'a>>,
        rejected: BTreeMap<RuleId, RejectionReason>,
        subtotal: Money<'a, Currency>,
        total_discount: Money<'a, Currency>,
    ) -> Self {
        Self {
            applied,
            rejected,
            subtotal,
            total_discount,
        }
    }

    /// Create an outcome with nothing applied or rejected.
    pub fn empty(subtotal: Money<'a, Currency>) -> Self {
        Self::new(
            Vec::new(),
            BTreeMap::new(),
            subtotal,
            Money::from_minor(0, subtotal.currency()),
        )
    }

    /// Applied rules, in application order.
    pub fn applied(&self) -> &[AppliedDiscount<'a>] {
        &self.applied
    }

    /// Rejected rules and why, ordered by rule id.
    pub fn rejected(&self) -> &BTreeMap<RuleId, RejectionReason> {
        &self.rejected
    }

    /// Why `rule` was rejected, if it was.
    pub fn rejection(&self, rule: &RuleId) -> Option<RejectionReason> {
        self.rejected.get(rule).copied()
    }

    /// Amount `rule` took off, if it was applied.
    pub fn amount_for(&self, rule: &RuleId) -> Option<Money<'a, Currency>> {
        self.applied
            .iter()
            .find(|applied| &applied.rule_id == rule)
            .map(|applied| applied.amount)
    }

    /// Cart subtotal before discounts.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Sum of all applied amounts. Never exceeds the subtotal.
    pub fn total_discount(&self) -> Money<'a, Currency> {
        self.total_discount
    }

    /// Subtotal after discounts.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction fails.
    pub fn total(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal.sub(self.total_discount)
    }

    /// Total discount as a share of the subtotal.
    pub fn savings_percent(&self) -> Percentage {
        let subtotal_minor = self.subtotal.to_minor_units();

        if subtotal_minor == 0 {
            return Percentage::from(0.0);
        }

        let savings_dec =
            Decimal::from_i64(self.total_discount.to_minor_units()).unwrap_or(Decimal::ZERO);
        let subtotal_dec = Decimal::from_i64(subtotal_minor).unwrap_or(Decimal::ONE);

        Percentage::from(savings_dec / subtotal_dec)
    }

    /// Render the outcome as a table.
    ///
    /// # Errors
    ///
    /// Returns an error if the total cannot be computed or the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), OutcomeError> {
        let mut builder = Builder::default();

        builder.push_record(["Rule", "Status", "Amount"]);

        for applied in &self.applied {
            builder.push_record([
                applied.rule_id.to_string(),
                "applied".to_string(),
                format!("-{}", applied.amount),
            ]);
        }

        for (rule_id, reason) in &self.rejected {
            builder.push_record([rule_id.to_string(), reason.to_string(), String::new()]);
        }

        let mut table = builder.build();

        table
            .with(Style::rounded())
            .modify(Columns::last(), Alignment::right());

        writeln!(out, "{table}")?;
        writeln!(out)?;
        writeln!(out, "Subtotal: {}", self.subtotal)?;
        writeln!(
            out,
            "Discount: {} ({:.2}%)",
            self.total_discount,
            (self.savings_percent() * Decimal::ONE_HUNDRED)
        )?;
        writeln!(out, "   Total: {}", self.total()?)?;

        Ok(())
    }
}
