//! Shared types used across the application.
//!
//! These are the gateway-independent shapes the router works on. The
//! Discord adapter converts serenity models into them, so nothing in
//! `routing` depends on serenity types.

use std::fmt;

use chrono::{DateTime, Utc};

/// Discord object identifier.
pub type Snowflake = u64;

/// A user or guild member as seen by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: Snowflake,
    /// Account name.
    pub name: String,
    /// Nickname, global name or account name, in that order of preference.
    pub display_name: String,
    pub bot: bool,
}

impl UserRef {
    /// Discord mention markup for this user.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// A guild (server).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildRef {
    pub id: Snowflake,
    pub name: String,
    pub member_count: Option<u64>,
}

/// Kind of channel an event happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Text or announcement channel.
    TextChannel,
    /// Public, private or announcement thread.
    Thread,
    /// Forum channel.
    ForumChannel,
    /// Voice, stage, category, DM and anything else.
    Other,
}

impl ChannelKind {
    /// Whether events in this kind of channel get routed at all.
    pub fn is_routable(self) -> bool {
        matches!(self, Self::TextChannel | Self::Thread | Self::ForumChannel)
    }
}

/// A channel reference with enough data for routing decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRef {
    pub id: Snowflake,
    pub name: String,
    pub kind: ChannelKind,
    /// Parent channel name, for threads.
    pub parent_name: Option<String>,
}

/// A message as seen by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageInfo {
    pub id: Snowflake,
    pub content: String,
    pub author: UserRef,
    pub channel: ChannelRef,
    pub guild: Option<GuildRef>,
    /// Ids of mentioned users.
    pub mentions: Vec<Snowflake>,
    /// Id of the message this one replies to.
    pub reply_to: Option<Snowflake>,
    pub timestamp: DateTime<Utc>,
}

impl MessageInfo {
    pub fn mentions_user(&self, user_id: Snowflake) -> bool {
        self.mentions.contains(&user_id)
    }

    pub fn guild_name(&self) -> &str {
        self.guild.as_ref().map(|g| g.name.as_str()).unwrap_or("DM")
    }
}

/// Reaction emoji.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmojiRef {
    Unicode(String),
    Custom {
        name: Option<String>,
        id: Snowflake,
        animated: bool,
    },
}

impl fmt::Display for EmojiRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unicode(emoji) => match emojis::get(emoji) {
                Some(known) => write!(f, "{} ({})", emoji, known.name()),
                None => write!(f, "{}", emoji),
            },
            Self::Custom { name, id, animated } => {
                let prefix = if *animated { "a" } else { "" };
                write!(f, "<{}:{}:{}>", prefix, name.as_deref().unwrap_or("_"), id)
            }
        }
    }
}

/// A reaction whose message was available (cached or fetched).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionInfo {
    pub emoji: EmojiRef,
    pub reactor: UserRef,
    pub message: MessageInfo,
}

/// A reaction removal carrying only ids, because the message was not cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReaction {
    pub guild_id: Option<Snowflake>,
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    pub message_id: Snowflake,
    pub emoji: EmojiRef,
}

/// A member joining or leaving a guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub user: UserRef,
    pub guild: GuildRef,
    pub account_created: DateTime<Utc>,
}

/// Incoming gateway event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    MessageCreated(MessageInfo),
    MessageDeleted(MessageInfo),
    ReactionAdded(ReactionInfo),
    ReactionRemoved(ReactionInfo),
    RawReactionRemoved(RawReaction),
    MemberJoined(MemberInfo),
    MemberLeft(MemberInfo),
}

impl Event {
    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MessageCreated(_) => "message_created",
            Self::MessageDeleted(_) => "message_deleted",
            Self::ReactionAdded(_) => "reaction_added",
            Self::ReactionRemoved(_) => "reaction_removed",
            Self::RawReactionRemoved(_) => "raw_reaction_removed",
            Self::MemberJoined(_) => "member_joined",
            Self::MemberLeft(_) => "member_left",
        }
    }
}
