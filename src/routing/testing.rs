//! Gateway mock helpers for tests.

use chrono::Utc;

use crate::common::{ChannelKind, ChannelRef, GuildRef, MessageInfo, Snowflake, UserRef};

pub use crate::routing::gateway::MockGateway;

/// Id given to every thread created through [`thread_from`].
pub const THREAD_ID: Snowflake = 9000;

/// Id of the guild the helpers describe.
pub const GUILD_ID: Snowflake = 1;

pub fn text_channel(id: Snowflake, name: &str) -> ChannelRef {
    ChannelRef {
        id,
        name: name.to_string(),
        kind: ChannelKind::TextChannel,
        parent_name: None,
    }
}

/// Text channels with ids from 100 upwards.
pub fn text_channels(names: &[&str]) -> Vec<ChannelRef> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| text_channel(100 + i as Snowflake, name))
        .collect()
}

pub fn guild() -> GuildRef {
    GuildRef {
        id: GUILD_ID,
        name: "Test Guild".to_string(),
        member_count: Some(3),
    }
}

pub fn user(id: Snowflake) -> UserRef {
    UserRef {
        id,
        name: format!("user{}", id),
        display_name: format!("User {}", id),
        bot: false,
    }
}

/// Thread started from `from`, as the platform would return it.
pub fn thread_from(from: &MessageInfo, title: &str) -> ChannelRef {
    ChannelRef {
        id: THREAD_ID,
        name: title.to_string(),
        kind: ChannelKind::Thread,
        parent_name: Some(from.channel.name.clone()),
    }
}

/// Message by user 8, as returned by a fetch.
pub fn fetched_message(channel_id: Snowflake, message_id: Snowflake) -> MessageInfo {
    MessageInfo {
        id: message_id,
        content: "original".to_string(),
        author: user(8),
        channel: text_channel(channel_id, "general"),
        guild: Some(guild()),
        mentions: Vec::new(),
        reply_to: None,
        timestamp: Utc::now(),
    }
}

/// Mock that lists the given text channels for [`GUILD_ID`].
pub fn with_channels(names: &[&str]) -> MockGateway {
    listing(text_channels(names))
}

/// Mock that lists `channels` for [`GUILD_ID`].
pub fn listing(channels: Vec<ChannelRef>) -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway
        .expect_guild_channels()
        .withf(|guild_id| *guild_id == GUILD_ID)
        .returning(move |_| Ok(channels.clone()));
    gateway
}
