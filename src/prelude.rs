//! Rebate prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    channels::{Channel, ChannelCatalog, ChannelError, ChannelUpdate, NewChannel},
    context::{ContextBuilder, ContextError, EvaluationContext},
    discounts::{DiscountError, calculate_discount},
    eligibility::{EligibilityResult, RejectionReason, evaluate},
    ids::{ChannelId, CustomerSegment, IdSet, ProductId, RuleId},
    items::LineItem,
    outcome::{AppliedDiscount, DiscountOutcome, OutcomeError},
    registry::{InMemoryRegistry, RegistryError, RuleRegistry},
    resolver::DiscountResolver,
    rules::{Conditions, DateRange, DiscountKind, DiscountRule, RuleBuilder, ValidationError},
    service::{DiscountService, DiscountServiceError},
};
