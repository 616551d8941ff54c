//! Discount Service
//!
//! Fetches the active rules for a cart's channel and resolves them.

use thiserror::Error;
use tracing::{Span, info};

use crate::{
    context::EvaluationContext,
    outcome::DiscountOutcome,
    registry::{RegistryError, RuleRegistry},
    resolver::DiscountResolver,
};

/// Discount service errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountServiceError {
    /// The registry could not supply rules.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Resolves carts against the rules a registry holds for their channel.
#[derive(Debug, Clone)]
pub struct DiscountService<R> {
    registry: R,
    resolver: DiscountResolver,
}

impl<R: RuleRegistry> DiscountService<R> {
    /// Create a service from its collaborators.
    pub fn new(registry: R, resolver: DiscountResolver) -> Self {
        Self { registry, resolver }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Resolve the discounts for `context`.
    ///
    /// The registry's rules are copied into this call, so later registry changes do not
    /// affect an in-flight resolution.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountServiceError::Registry`] if the registry lookup fails.
    #[tracing::instrument(
        name = "discounts.service.discounts_for",
        skip(self, context),
        fields(
            channel_id = %context.channel(),
            rule_count = tracing::field::Empty,
            applied_count = tracing::field::Empty
        ),
        err
    )]
    pub async fn discounts_for<'a>(
        &self,
        context: &EvaluationContext<'a>,
    ) -> Result<DiscountOutcome<'a>, DiscountServiceError> {
        let rules = self.registry.list_active_rules(context.channel()).await?;

        let span = Span::current();

        span.record("rule_count", tracing::field::display(rules.len()));

        let outcome = self.resolver.resolve(&rules, context);

        span.record(
            "applied_count",
            tracing::field::display(outcome.applied().len()),
        );

        info!(
            total_discount = %outcome.total_discount(),
            rejected_count = outcome.rejected().len(),
            "resolved discounts"
        );

        Ok(outcome)
    }
}
