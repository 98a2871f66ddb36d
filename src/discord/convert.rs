//! Conversion of serenity models into routing types.
//!
//! Everything here is pure. Cache and HTTP lookups live in
//! `discord::gateway`, which feeds the already-resolved pieces in.

use chrono::{DateTime, Utc};
use serenity::model::channel::{ChannelType, GuildChannel, Message, ReactionType};
use serenity::model::guild::{Guild, Member};
use serenity::model::user::User;
use serenity::model::Timestamp;

use crate::common::{ChannelKind, ChannelRef, EmojiRef, GuildRef, MessageInfo, UserRef};

/// Map a serenity channel type onto the closed routing set.
pub fn channel_kind(kind: ChannelType) -> ChannelKind {
    match kind {
        ChannelType::Text | ChannelType::News => ChannelKind::TextChannel,
        ChannelType::PublicThread | ChannelType::PrivateThread | ChannelType::NewsThread => {
            ChannelKind::Thread
        }
        ChannelType::Forum => ChannelKind::ForumChannel,
        _ => ChannelKind::Other,
    }
}

pub fn channel_ref(channel: &GuildChannel, parent_name: Option<String>) -> ChannelRef {
    ChannelRef {
        id: channel.id.get(),
        name: channel.name.clone(),
        kind: channel_kind(channel.kind),
        parent_name,
    }
}

/// Placeholder for channels the cache does not know, such as DMs.
pub fn unknown_channel(id: u64) -> ChannelRef {
    ChannelRef {
        id,
        name: String::new(),
        kind: ChannelKind::Other,
        parent_name: None,
    }
}

pub fn guild_ref(guild: &Guild) -> GuildRef {
    GuildRef {
        id: guild.id.get(),
        name: guild.name.clone(),
        member_count: Some(guild.member_count),
    }
}

/// `nick` takes precedence over the global display name.
pub fn user_ref(user: &User, nick: Option<&str>) -> UserRef {
    UserRef {
        id: user.id.get(),
        name: user.name.clone(),
        display_name: nick
            .or(user.global_name.as_deref())
            .unwrap_or(&user.name)
            .to_string(),
        bot: user.bot,
    }
}

pub fn member_user_ref(member: &Member) -> UserRef {
    user_ref(&member.user, member.nick.as_deref())
}

pub fn emoji_ref(emoji: &ReactionType) -> EmojiRef {
    match emoji {
        ReactionType::Unicode(emoji) => EmojiRef::Unicode(emoji.clone()),
        ReactionType::Custom { animated, id, name } => EmojiRef::Custom {
            name: name.clone(),
            id: id.get(),
            animated: *animated,
        },
        other => EmojiRef::Unicode(other.to_string()),
    }
}

/// Second precision; anything unrepresentable falls back to the epoch.
pub fn timestamp(ts: Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp(ts.unix_timestamp(), 0).unwrap_or_default()
}

/// Build a [`MessageInfo`] once channel and guild are resolved.
pub fn message_info(message: &Message, channel: ChannelRef, guild: Option<GuildRef>) -> MessageInfo {
    let nick = message.member.as_ref().and_then(|m| m.nick.as_deref());
    MessageInfo {
        id: message.id.get(),
        content: message.content.clone(),
        author: user_ref(&message.author, nick),
        channel,
        guild,
        mentions: message.mentions.iter().map(|user| user.id.get()).collect(),
        reply_to: message
            .message_reference
            .as_ref()
            .and_then(|reference| reference.message_id)
            .map(|id| id.get()),
        timestamp: timestamp(message.timestamp),
    }
}
