//! Rule Registry
//!
//! The source of active rules for a channel. Storage-backed registries live outside this
//! crate; [`InMemoryRegistry`] serves fixtures and tests.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tracing::debug;

use crate::{
    channels::{ChannelCatalog, ChannelError, NewChannel},
    ids::ChannelId,
    rules::DiscountRule,
};

/// Registry lookup errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The channel does not exist.
    #[error("channel {0} not found")]
    ChannelNotFound(ChannelId),

    /// The backing store could not be reached.
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}

/// Supplies the active rules for a channel.
#[automock]
#[async_trait]
pub trait RuleRegistry: Send + Sync {
    /// Rules active on `channel`, in registry order. An empty list means no discounts apply.
    async fn list_active_rules(
        &self,
        channel: &ChannelId,
    ) -> Result<Vec<DiscountRule>, RegistryError>;
}

/// Registry holding channels and rules in memory.
///
/// A rule is listed for every channel its channel condition names, or for every channel
/// when it has no channel condition.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    channels: ChannelCatalog,
    rules: Vec<DiscountRule>,
}

impl InMemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from an existing catalogue and rules.
    pub fn with_rules(channels: ChannelCatalog, rules: impl Into<Vec<DiscountRule>>) -> Self {
        Self {
            channels,
            rules: rules.into(),
        }
    }

    /// Add a channel.
    ///
    /// # Errors
    ///
    /// Returns a [`ChannelError`] if the channel already exists.
    pub fn add_channel(&mut self, channel: NewChannel) -> Result<&mut Self, ChannelError> {
        self.channels.create(channel)?;

        Ok(self)
    }

    /// Add a rule.
    pub fn add_rule(&mut self, rule: DiscountRule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// The channel catalogue.
    pub fn channels(&self) -> &ChannelCatalog {
        &self.channels
    }

    /// Mutable access to the channel catalogue.
    pub fn channels_mut(&mut self) -> &mut ChannelCatalog {
        &mut self.channels
    }

    /// Every rule, in insertion order.
    pub fn rules(&self) -> &[DiscountRule] {
        &self.rules
    }
}

#[async_trait]
impl RuleRegistry for InMemoryRegistry {
    async fn list_active_rules(
        &self,
        channel: &ChannelId,
    ) -> Result<Vec<DiscountRule>, RegistryError> {
        if !self.channels.contains(channel) {
            return Err(RegistryError::ChannelNotFound(channel.clone()));
        }

        let rules: Vec<DiscountRule> = self
            .rules
            .iter()
            .filter(|rule| {
                rule.conditions()
                    .channels()
                    .is_none_or(|channels| channels.contains(channel))
            })
            .cloned()
            .collect();

        debug!(channel_id = %channel, rule_count = rules.len(), "listed active rules");

        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::rules::DiscountKind;

    use super::*;

    fn registry() -> Result<InMemoryRegistry, Box<dyn std::error::Error>> {
        let mut registry = InMemoryRegistry::new();

        registry
            .add_channel(NewChannel {
                id: ChannelId::from("web"),
                name: "Web".to_string(),
                default: true,
            })?
            .add_channel(NewChannel {
                id: ChannelId::from("app"),
                name: "App".to_string(),
                default: false,
            })?;

        registry
            .add_rule(
                DiscountRule::builder("everywhere", DiscountKind::Percentage, Decimal::TEN)
                    .build()?,
            )
            .add_rule(
                DiscountRule::builder("app-only", DiscountKind::Percentage, Decimal::TEN)
                    .channels(["app"])
                    .build()?,
            );

        Ok(registry)
    }

    #[tokio::test]
    async fn lists_rules_scoped_to_channel() -> TestResult {
        let registry = registry()?;

        let web = registry.list_active_rules(&ChannelId::from("web")).await?;
        let app = registry.list_active_rules(&ChannelId::from("app")).await?;

        let web_ids: Vec<&str> = web.iter().map(|rule| rule.id().as_str()).collect();
        let app_ids: Vec<&str> = app.iter().map(|rule| rule.id().as_str()).collect();

        assert_eq!(web_ids, ["everywhere"]);
        assert_eq!(app_ids, ["everywhere", "app-only"]);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_channel_is_an_error() -> TestResult {
        let registry = registry()?;

        let result = registry.list_active_rules(&ChannelId::from("pos")).await;

        assert_eq!(
            result,
            Err(RegistryError::ChannelNotFound(ChannelId::from("pos")))
        );

        Ok(())
    }

    #[tokio::test]
    async fn channel_without_rules_is_empty() -> TestResult {
        let mut registry = InMemoryRegistry::new();

        registry.add_channel(NewChannel {
            id: ChannelId::from("web"),
            name: "Web".to_string(),
            default: true,
        })?;

        assert!(registry.list_active_rules(&ChannelId::from("web")).await?.is_empty());

        Ok(())
    }
}
