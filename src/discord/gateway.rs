//! serenity-backed implementation of the routing [`Gateway`].
//!
//! Guild and channel lookups are answered from the cache only; members and
//! messages fall back to HTTP through serenity's `CacheHttp` helpers.

use serenity::async_trait;
use serenity::builder::{CreateMessage, CreateThread};
use serenity::model::channel::{GuildChannel, Message};
use serenity::model::guild::Guild;
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
use serenity::prelude::Context;

use crate::common::{
    ChannelKind, ChannelRef, GatewayError, GatewayResult, GuildRef, MessageInfo, Snowflake,
    UserRef,
};
use crate::discord::convert;
use crate::routing::Gateway;

/// Gateway bound to the context of one event.
pub struct SerenityGateway {
    ctx: Context,
}

impl SerenityGateway {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    /// Id of the bot user.
    pub fn self_id(&self) -> Snowflake {
        self.ctx.cache.current_user().id.get()
    }

    /// Cached guild summary.
    pub fn cached_guild(&self, guild_id: GuildId) -> Option<GuildRef> {
        self.ctx.cache.guild(guild_id).map(|guild| convert::guild_ref(&guild))
    }

    /// Convert a message, resolving its channel and guild from the cache.
    pub fn message_info(&self, message: &Message) -> MessageInfo {
        let (channel, guild) = match self
            .message_guild(message)
            .and_then(|id| self.ctx.cache.guild(id))
        {
            Some(guild) => {
                let channel = find_channel(&guild, message.channel_id)
                    .map(|channel| to_ref(&guild, channel))
                    .unwrap_or_else(|| convert::unknown_channel(message.channel_id.get()));
                (channel, Some(convert::guild_ref(&guild)))
            }
            None => (convert::unknown_channel(message.channel_id.get()), None),
        };

        convert::message_info(message, channel, guild)
    }

    /// Messages fetched over HTTP carry no guild id, so the cached guilds
    /// are searched for the channel instead.
    fn message_guild(&self, message: &Message) -> Option<GuildId> {
        message.guild_id.or_else(|| {
            self.ctx.cache.guilds().into_iter().find(|&guild_id| {
                self.ctx
                    .cache
                    .guild(guild_id)
                    .is_some_and(|guild| find_channel(&guild, message.channel_id).is_some())
            })
        })
    }
}

fn find_channel(guild: &Guild, channel_id: ChannelId) -> Option<&GuildChannel> {
    guild
        .channels
        .get(&channel_id)
        .or_else(|| guild.threads.iter().find(|thread| thread.id == channel_id))
}

/// Threads carry the name of their parent channel.
fn to_ref(guild: &Guild, channel: &GuildChannel) -> ChannelRef {
    let parent_name = match convert::channel_kind(channel.kind) {
        ChannelKind::Thread => channel
            .parent_id
            .and_then(|parent| guild.channels.get(&parent))
            .map(|parent| parent.name.clone()),
        _ => None,
    };
    convert::channel_ref(channel, parent_name)
}

fn guild_not_cached(guild_id: Snowflake) -> GatewayError {
    GatewayError::NotFound(format!("guild {} is not cached", guild_id))
}

#[async_trait]
impl Gateway for SerenityGateway {
    async fn send_message(&self, channel_id: Snowflake, text: &str) -> GatewayResult<Snowflake> {
        let message = ChannelId::new(channel_id).say(&self.ctx.http, text).await?;
        Ok(message.id.get())
    }

    async fn reply(&self, to: &MessageInfo, text: &str) -> GatewayResult<Snowflake> {
        let channel_id = ChannelId::new(to.channel.id);
        let builder = CreateMessage::new()
            .content(text)
            .reference_message((channel_id, MessageId::new(to.id)));
        let message = channel_id.send_message(&self.ctx.http, builder).await?;
        Ok(message.id.get())
    }

    async fn create_thread(&self, from: &MessageInfo, title: &str) -> GatewayResult<ChannelRef> {
        let thread = ChannelId::new(from.channel.id)
            .create_thread_from_message(&self.ctx, MessageId::new(from.id), CreateThread::new(title))
            .await?;
        Ok(convert::channel_ref(&thread, Some(from.channel.name.clone())))
    }

    async fn fetch_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> GatewayResult<MessageInfo> {
        let message = ChannelId::new(channel_id)
            .message(&self.ctx, MessageId::new(message_id))
            .await?;
        Ok(self.message_info(&message))
    }

    async fn get_guild(&self, guild_id: Snowflake) -> GatewayResult<GuildRef> {
        self.cached_guild(GuildId::new(guild_id))
            .ok_or_else(|| guild_not_cached(guild_id))
    }

    async fn get_channel(
        &self,
        guild_id: Snowflake,
        channel_id: Snowflake,
    ) -> GatewayResult<ChannelRef> {
        let guild = self
            .ctx
            .cache
            .guild(GuildId::new(guild_id))
            .ok_or_else(|| guild_not_cached(guild_id))?;
        find_channel(&guild, ChannelId::new(channel_id))
            .map(|channel| to_ref(&guild, channel))
            .ok_or_else(|| GatewayError::NotFound(format!("channel {}", channel_id)))
    }

    async fn get_member(&self, guild_id: Snowflake, user_id: Snowflake) -> GatewayResult<UserRef> {
        let member = GuildId::new(guild_id)
            .member(&self.ctx, UserId::new(user_id))
            .await?;
        Ok(convert::member_user_ref(&member))
    }

    async fn guild_channels(&self, guild_id: Snowflake) -> GatewayResult<Vec<ChannelRef>> {
        let guild = self
            .ctx
            .cache
            .guild(GuildId::new(guild_id))
            .ok_or_else(|| guild_not_cached(guild_id))?;

        let mut channels: Vec<&GuildChannel> = guild.channels.values().collect();
        channels.sort_by_key(|channel| (channel.position, channel.id));
        Ok(channels
            .into_iter()
            .map(|channel| to_ref(&guild, channel))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serenity::model::channel::ChannelType;

    fn channel(id: u64, name: &str, kind: ChannelType, parent: Option<u64>) -> GuildChannel {
        let mut channel = GuildChannel::default();
        channel.id = ChannelId::new(id);
        channel.guild_id = GuildId::new(1);
        channel.name = name.to_string();
        channel.kind = kind;
        channel.parent_id = parent.map(ChannelId::new);
        channel
    }

    fn guild() -> Guild {
        let mut guild = Guild::default();
        guild.id = GuildId::new(1);
        let general = channel(100, "general", ChannelType::Text, None);
        guild.channels.insert(general.id, general);
        guild
            .threads
            .push(channel(200, "help me", ChannelType::PublicThread, Some(100)));
        guild
    }

    #[test]
    fn test_find_channel_covers_channels_and_threads() {
        let guild = guild();
        assert_eq!(
            find_channel(&guild, ChannelId::new(100)).map(|c| c.name.as_str()),
            Some("general")
        );
        assert_eq!(
            find_channel(&guild, ChannelId::new(200)).map(|c| c.name.as_str()),
            Some("help me")
        );
        assert!(find_channel(&guild, ChannelId::new(300)).is_none());
    }

    #[test]
    fn test_thread_ref_names_its_parent() {
        let guild = guild();
        let thread = find_channel(&guild, ChannelId::new(200)).unwrap();
        let thread_ref = to_ref(&guild, thread);
        assert_eq!(thread_ref.kind, ChannelKind::Thread);
        assert_eq!(thread_ref.parent_name.as_deref(), Some("general"));

        let general = find_channel(&guild, ChannelId::new(100)).unwrap();
        assert_eq!(to_ref(&guild, general).parent_name, None);
    }
}
