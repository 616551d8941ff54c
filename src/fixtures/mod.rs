//! Fixtures
//!
//! YAML definitions of channels, rules and carts, loaded from
//! `<base>/{channels,rules,carts}/<name>.yml`.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::{
    channels::ChannelError,
    context::{ContextError, EvaluationContext},
    fixtures::{carts::CartFixture, channels::ChannelsFixture, rules::RulesFixture},
    registry::InMemoryRegistry,
    rules::ValidationError,
};

pub mod carts;
pub mod channels;
pub mod rules;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid decimal value
    #[error("Invalid decimal value: {0}")]
    InvalidDecimal(String),

    /// Invalid timestamp
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Cart not found
    #[error("Cart not found: {0}")]
    CartNotFound(String),

    /// Rule definition rejected
    #[error(transparent)]
    Rule(#[from] ValidationError),

    /// Channel definition rejected
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// Cart snapshot rejected
    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Channels and rules
    registry: InMemoryRegistry,

    /// Carts by name
    carts: FxHashMap<String, CartFixture>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            registry: InMemoryRegistry::new(),
            carts: FxHashMap::default(),
        }
    }

    fn read(&self, kind: &str, name: &str) -> Result<String, FixtureError> {
        let file_path = self.base_path.join(kind).join(format!("{name}.yml"));

        debug!(path = %file_path.display(), "reading fixture");

        Ok(fs::read_to_string(&file_path)?)
    }

    /// Load channels from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a channel is duplicated.
    pub fn load_channels(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ChannelsFixture = serde_norway::from_str(&self.read("channels", name)?)?;

        for channel in fixture.channels {
            self.registry.add_channel(channel.into())?;
        }

        Ok(self)
    }

    /// Load rules from a YAML fixture file
    ///
    /// Rules are added in ascending id order.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a rule is malformed.
    pub fn load_rules(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: RulesFixture = serde_norway::from_str(&self.read("rules", name)?)?;

        let mut entries: Vec<_> = fixture.rules.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (id, rule_fixture) in entries {
            let rule = rule_fixture.try_into_rule(id)?;

            self.registry.add_rule(rule);
        }

        Ok(self)
    }

    /// Load carts from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_carts(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: carts::CartsFixture = serde_norway::from_str(&self.read("carts", name)?)?;

        self.carts.extend(fixture.carts);

        Ok(self)
    }

    /// Load a complete fixture set (channels, rules and carts with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in("./fixtures", name)
    }

    /// Load a complete fixture set from a custom base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set_in(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::with_base_path(base_path);

        fixture
            .load_channels(name)?
            .load_rules(name)?
            .load_carts(name)?;

        Ok(fixture)
    }

    /// The registry built from loaded channels and rules
    pub fn registry(&self) -> &InMemoryRegistry {
        &self.registry
    }

    /// Consume the fixture, keeping its registry
    pub fn into_registry(self) -> InMemoryRegistry {
        self.registry
    }

    /// Names of the loaded carts, sorted
    pub fn cart_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.carts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the evaluation context for a named cart
    ///
    /// # Errors
    ///
    /// Returns an error if the cart does not exist or its contents are invalid.
    pub fn context(&self, cart: &str) -> Result<EvaluationContext<'static>, FixtureError> {
        self.carts
            .get(cart)
            .ok_or_else(|| FixtureError::CartNotFound(cart.to_string()))?
            .to_context()
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
