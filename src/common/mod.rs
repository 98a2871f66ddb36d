//! Common utilities and types shared across the application.

pub mod error;
pub mod types;

pub use error::{GatewayError, GatewayResult};
pub use types::{
    ChannelKind, ChannelRef, EmojiRef, Event, GuildRef, MemberInfo, MessageInfo, RawReaction,
    ReactionInfo, Snowflake, UserRef,
};
