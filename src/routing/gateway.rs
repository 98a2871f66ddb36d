//! Collaborator interface to the chat platform.

use serenity::async_trait;

use crate::common::{ChannelRef, GatewayResult, GuildRef, MessageInfo, Snowflake, UserRef};

/// Operations the router needs from the gateway client.
///
/// Every call may fail with [`crate::common::GatewayError`]; callers decide
/// the fallback, implementations never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Send a message to a channel or thread. Returns the new message id.
    async fn send_message(&self, channel_id: Snowflake, text: &str) -> GatewayResult<Snowflake>;
    /// Reply inline to a message. Returns the new message id.
    async fn reply(&self, to: &MessageInfo, text: &str) -> GatewayResult<Snowflake>;
    /// Start a thread rooted at a message.
    async fn create_thread(&self, from: &MessageInfo, title: &str) -> GatewayResult<ChannelRef>;
    /// Fetch a message by id.
    async fn fetch_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> GatewayResult<MessageInfo>;
    /// Look up a guild.
    async fn get_guild(&self, guild_id: Snowflake) -> GatewayResult<GuildRef>;
    /// Look up a channel (or thread) within a guild.
    async fn get_channel(&self, guild_id: Snowflake, channel_id: Snowflake)
        -> GatewayResult<ChannelRef>;
    /// Look up a guild member.
    async fn get_member(&self, guild_id: Snowflake, user_id: Snowflake) -> GatewayResult<UserRef>;
    /// All channels of a guild, ordered by position.
    async fn guild_channels(&self, guild_id: Snowflake) -> GatewayResult<Vec<ChannelRef>>;
}
