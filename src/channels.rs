//! Channels
//!
//! The catalogue of sales channels. There is always at least one channel once any has been
//! created, and exactly one of them is the default.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::info;

use crate::ids::ChannelId;

/// Channel catalogue errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// A channel with this id already exists.
    #[error("channel {0} already exists")]
    AlreadyExists(ChannelId),

    /// No channel with this id exists.
    #[error("channel {0} not found")]
    NotFound(ChannelId),

    /// The change would leave the catalogue without a channel, or without a default.
    #[error("{0}")]
    MinimumRecordRequired(&'static str),
}

/// A sales channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Channel identifier
    pub id: ChannelId,

    /// Display name
    pub name: String,

    /// Whether this is the default channel
    pub default: bool,
}

/// Data for a new channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChannel {
    /// Channel identifier
    pub id: ChannelId,

    /// Display name
    pub name: String,

    /// Make this the default channel
    pub default: bool,
}

/// Changes to an existing channel; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelUpdate {
    /// New display name
    pub name: Option<String>,

    /// New default flag
    pub default: Option<bool>,
}

/// In-memory channel catalogue, ordered by id.
#[derive(Debug, Clone, Default)]
pub struct ChannelCatalog {
    channels: BTreeMap<ChannelId, Channel>,
}

impl ChannelCatalog {
    /// Create an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// All channels, ordered by id.
    pub fn list(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Whether a channel exists.
    pub fn contains(&self, id: &ChannelId) -> bool {
        self.channels.contains_key(id)
    }

    /// The default channel, if any channel exists.
    pub fn default_channel(&self) -> Option<&Channel> {
        self.channels.values().find(|channel| channel.default)
    }

    /// Fetch one channel.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::NotFound`] if there is no such channel.
    pub fn get(&self, id: &ChannelId) -> Result<&Channel, ChannelError> {
        self.channels
            .get(id)
            .ok_or_else(|| ChannelError::NotFound(id.clone()))
    }

    /// Create a channel. The first channel always becomes the default.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::AlreadyExists`] if the id is taken.
    pub fn create(&mut self, new: NewChannel) -> Result<&Channel, ChannelError> {
        if self.channels.contains_key(&new.id) {
            return Err(ChannelError::AlreadyExists(new.id));
        }

        let default = new.default || self.channels.is_empty();

        if default {
            self.clear_default();
        }

        let id = new.id.clone();

        self.channels.insert(
            new.id.clone(),
            Channel {
                id: new.id,
                name: new.name,
                default,
            },
        );

        info!(channel_id = %id, default, "created channel");

        self.get(&id)
    }

    /// Update a channel.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::NotFound`] for an unknown id, or
    /// [`ChannelError::MinimumRecordRequired`] when unsetting the only default channel.
    pub fn update(&mut self, id: &ChannelId, update: ChannelUpdate) -> Result<&Channel, ChannelError> {
        let current = self.get(id)?;

        if update.default == Some(false) && current.default {
            return Err(ChannelError::MinimumRecordRequired(
                "you must have at least one default channel",
            ));
        }

        if update.default == Some(true) {
            self.clear_default();
        }

        let channel = self
            .channels
            .get_mut(id)
            .ok_or_else(|| ChannelError::NotFound(id.clone()))?;

        if let Some(name) = update.name {
            channel.name = name;
        }

        if let Some(default) = update.default {
            channel.default = default;
        }

        info!(channel_id = %id, "updated channel");

        Ok(channel)
    }

    /// Delete a channel. Deleting the default promotes the first remaining channel.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::NotFound`] for an unknown id, or
    /// [`ChannelError::MinimumRecordRequired`] when deleting the last channel.
    pub fn delete(&mut self, id: &ChannelId) -> Result<Channel, ChannelError> {
        if !self.channels.contains_key(id) {
            return Err(ChannelError::NotFound(id.clone()));
        }

        if self.channels.len() == 1 {
            return Err(ChannelError::MinimumRecordRequired(
                "you must have at least one channel",
            ));
        }

        let removed = self
            .channels
            .remove(id)
            .ok_or_else(|| ChannelError::NotFound(id.clone()))?;

        let promoted = self
            .channels
            .values_mut()
            .next()
            .filter(|_| removed.default);

        if let Some(next) = promoted {
            next.default = true;
            info!(channel_id = %next.id, "promoted channel to default");
        }

        info!(channel_id = %id, "deleted channel");

        Ok(removed)
    }

    fn clear_default(&mut self) {
        for channel in self.channels.values_mut() {
            channel.default = false;
        }
    }
}
