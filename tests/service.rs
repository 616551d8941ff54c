//! Integration tests for the discount service over an in-memory registry.

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::GBP};
use testresult::TestResult;

use rebate::prelude::*;

fn registry() -> Result<InMemoryRegistry, Box<dyn std::error::Error>> {
    let mut registry = InMemoryRegistry::new();

    registry
        .add_channel(NewChannel {
            id: ChannelId::from("web"),
            name: "Web Store".to_string(),
            default: true,
        })?
        .add_channel(NewChannel {
            id: ChannelId::from("app"),
            name: "Mobile App".to_string(),
            default: false,
        })?;

    registry
        .add_rule(
            DiscountRule::builder("everywhere", DiscountKind::Percentage, Decimal::TEN)
                .stackable(true)
                .build()?,
        )
        .add_rule(
            DiscountRule::builder("app-only", DiscountKind::FixedAmount, Decimal::from(5))
                .channels(["app"])
                .build()?,
        );

    Ok(registry)
}

fn cart<'a>(channel: &str) -> Result<EvaluationContext<'a>, ContextError> {
    EvaluationContext::builder(channel, GBP, Timestamp::UNIX_EPOCH)
        .item(LineItem::new("hat", 2, Money::from_minor(2_500, GBP)))
        .build()
}

#[tokio::test]
async fn web_cart_only_sees_web_rules() -> TestResult {
    let service = DiscountService::new(registry()?, DiscountResolver::new());

    let outcome = service.discounts_for(&cart("web")?).await?;

    assert_eq!(outcome.applied().len(), 1);
    assert_eq!(
        outcome.amount_for(&RuleId::from("everywhere")),
        Some(Money::from_minor(500, GBP))
    );
    assert_eq!(outcome.rejection(&RuleId::from("app-only")), None);

    Ok(())
}

#[tokio::test]
async fn app_cart_combines_exclusive_and_stackable_rules() -> TestResult {
    let service = DiscountService::new(registry()?, DiscountResolver::new());

    let outcome = service.discounts_for(&cart("app")?).await?;

    // 5.00 off, plus 10% of 50.00
    assert_eq!(outcome.total_discount(), Money::from_minor(1_000, GBP));

    Ok(())
}

#[tokio::test]
async fn unknown_channel_is_an_error() -> TestResult {
    let service = DiscountService::new(registry()?, DiscountResolver::new());

    let result = service.discounts_for(&cart("kiosk")?).await;

    assert_eq!(
        result.err(),
        Some(DiscountServiceError::Registry(RegistryError::ChannelNotFound(
            ChannelId::from("kiosk")
        )))
    );

    Ok(())
}

#[tokio::test]
async fn exclusive_rule_does_not_shrink_stackable_base() -> TestResult {
    let mut registry = registry()?;

    registry.add_rule(
        DiscountRule::builder("flash", DiscountKind::Percentage, Decimal::from(50))
            .priority(-1)
            .build()?,
    );

    let service = DiscountService::new(registry, DiscountResolver::new());

    assert_eq!(service.registry().rules().len(), 3);

    let outcome = service.discounts_for(&cart("web")?).await?;

    assert_eq!(
        outcome.amount_for(&RuleId::from("flash")),
        Some(Money::from_minor(2_500, GBP))
    );
    assert_eq!(
        outcome.amount_for(&RuleId::from("everywhere")),
        Some(Money::from_minor(500, GBP))
    );

    Ok(())
}
