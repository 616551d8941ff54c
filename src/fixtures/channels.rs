//! Channel Fixtures

use serde::Deserialize;

use crate::{channels::NewChannel, ids::ChannelId};

/// Wrapper for channels in YAML
#[derive(Debug, Deserialize)]
pub struct ChannelsFixture {
    /// Channels, in creation order
    pub channels: Vec<ChannelFixture>,
}

/// Channel fixture from YAML
#[derive(Debug, Deserialize)]
pub struct ChannelFixture {
    /// Channel identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Whether this is the default channel
    #[serde(default)]
    pub default: bool,
}

impl From<ChannelFixture> for NewChannel {
    fn from(fixture: ChannelFixture) -> Self {
        NewChannel {
            id: ChannelId::from(fixture.id),
            name: fixture.name,
            default: fixture.default,
        }
    }
}
