//! Diagnostic logging of observed events and dispatch outcomes.
//!
//! Nothing here influences routing; every function only writes log lines.

use fancy_regex::Regex;
use tracing::{debug, info, warn};

use crate::common::{ChannelKind, ChannelRef, Event, MemberInfo, MessageInfo, ReactionInfo, Snowflake};
use crate::routing::classifier::Intent;
use crate::routing::dispatcher::DispatchResult;

/// Event observer for diagnostics.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    /// Pattern for a user mention at the start of a message (<@123> or <@!123>).
    leading_mention: Regex,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            leading_mention: Regex::new(r"^\s*<@!?(\d+)>").expect("leading mention pattern is valid"),
        }
    }

    /// Whether `content` starts with a mention of `user_id`.
    pub fn starts_with_mention(&self, content: &str, user_id: Snowflake) -> bool {
        match self.leading_mention.captures(content) {
            Ok(Some(caps)) => caps
                .get(1)
                .and_then(|m| m.as_str().parse::<Snowflake>().ok())
                .is_some_and(|id| id == user_id),
            _ => false,
        }
    }

    /// Log an incoming event.
    pub fn observe(&self, event: &Event, self_id: Snowflake) {
        match event {
            Event::MessageCreated(message) => self.observe_message(message, self_id),
            Event::MessageDeleted(message) => observe_deletion(message),
            Event::ReactionAdded(reaction) => observe_reaction(reaction, "added"),
            Event::ReactionRemoved(reaction) => observe_reaction(reaction, "removed"),
            Event::RawReactionRemoved(raw) => {
                debug!(
                    user_id = raw.user_id,
                    message_id = raw.message_id,
                    channel_id = raw.channel_id,
                    guild_id = ?raw.guild_id,
                    emoji = %raw.emoji,
                    "Raw reaction remove event"
                );
            }
            Event::MemberJoined(member) => observe_member(member, "joined"),
            Event::MemberLeft(member) => observe_member(member, "left"),
        }
    }

    fn observe_message(&self, message: &MessageInfo, self_id: Snowflake) {
        if message.author.bot {
            return;
        }
        if !message.channel.kind.is_routable() {
            debug!(
                channel_id = message.channel.id,
                "Ignoring message from non-routable channel"
            );
            return;
        }

        info!(
            message_id = message.id,
            author_id = message.author.id,
            "Message from {} in {}: {}",
            message.author.name,
            message.guild_name(),
            message.content
        );

        if message.mentions_user(self_id) {
            info!("Bot was mentioned by {}", message.author.name);
            if self.starts_with_mention(&message.content, self_id) {
                info!("Bot was mentioned at the start of the message");
            }
            if message.reply_to.is_some() {
                info!("Bot was mentioned in a reply");
            }
        }

        if let Some(reply_to) = message.reply_to {
            info!("Message is a reply to message {}", reply_to);
        }

        log_channel(&message.channel);
    }
}

fn observe_deletion(message: &MessageInfo) {
    if message.author.bot || !message.channel.kind.is_routable() {
        return;
    }
    info!(
        message_id = message.id,
        author_id = message.author.id,
        "Message deleted from {} in {}: {}",
        message.author.name,
        message.guild_name(),
        message.content
    );
    log_channel(&message.channel);
}

fn observe_reaction(reaction: &ReactionInfo, action: &str) {
    debug!(
        user = %reaction.reactor.name,
        bot = reaction.reactor.bot,
        channel_kind = ?reaction.message.channel.kind,
        guild = %reaction.message.guild_name(),
        "Reaction {} event",
        action
    );
}

fn observe_member(member: &MemberInfo, action: &str) {
    info!(
        user_id = member.user.id,
        guild_id = member.guild.id,
        "Member {}: {} in {}",
        action,
        member.user.name,
        member.guild.name
    );
    info!(
        "Account created: {}",
        member.account_created.format("%Y-%m-%d %H:%M:%S")
    );
    match member.guild.member_count {
        Some(count) => info!("Member count: {}", count),
        None => debug!("Member count unknown"),
    }
}

/// Log where a message lives: thread with parent, forum, or plain channel.
pub fn log_channel(channel: &ChannelRef) {
    match channel.kind {
        ChannelKind::Thread => match &channel.parent_name {
            Some(parent) => info!("Thread: {} (parent channel: {})", channel.name, parent),
            None => info!("Thread: {}", channel.name),
        },
        ChannelKind::ForumChannel => info!("Forum channel: {}", channel.name),
        ChannelKind::TextChannel | ChannelKind::Other => info!("Channel: {}", channel.name),
    }
}

/// Log the outcome of one dispatched intent.
pub fn record(intent: &Intent, result: &DispatchResult) {
    match result {
        DispatchResult::Sent { channel } => {
            info!("{}: sent message to #{}", intent.name(), channel);
        }
        DispatchResult::ThreadCreated { thread } => {
            info!("{}: created thread '{}'", intent.name(), thread);
        }
        DispatchResult::FallbackSent { reason } => {
            warn!("{}: replied inline instead ({})", intent.name(), reason);
        }
        DispatchResult::Logged => {
            debug!("{}: logged", intent.name());
        }
        DispatchResult::Suppressed(reason) => {
            warn!("{}: suppressed ({})", intent.name(), reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::testing::{guild, text_channel, user};
    use chrono::Utc;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::Level;

    const BOT_ID: Snowflake = 1000;

    /// Shared buffer the test subscriber writes into.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` under an INFO-level subscriber and return what it logged.
    fn info_logs(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(Level::INFO)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    fn message_in(channel: ChannelRef) -> MessageInfo {
        MessageInfo {
            id: 500,
            content: "hello there".to_string(),
            author: user(7),
            channel,
            guild: Some(guild()),
            mentions: Vec::new(),
            reply_to: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_human_message_is_logged() {
        let diagnostics = Diagnostics::new();
        let event = Event::MessageCreated(message_in(text_channel(100, "general")));

        let logs = info_logs(|| diagnostics.observe(&event, BOT_ID));
        assert!(logs.contains("Message from user7 in Test Guild: hello there"));
        assert!(logs.contains("Channel: general"));
    }

    #[test]
    fn test_bot_message_is_not_logged() {
        let diagnostics = Diagnostics::new();
        let mut message = message_in(text_channel(100, "general"));
        message.author.bot = true;
        message.mentions = vec![BOT_ID];
        let event = Event::MessageCreated(message);

        let logs = info_logs(|| diagnostics.observe(&event, BOT_ID));
        assert!(logs.is_empty(), "unexpected output: {}", logs);
    }

    #[test]
    fn test_unroutable_channel_is_not_logged_at_info() {
        let diagnostics = Diagnostics::new();
        let channel = ChannelRef {
            id: 100,
            name: "voice".to_string(),
            kind: ChannelKind::Other,
            parent_name: None,
        };
        let event = Event::MessageCreated(message_in(channel));

        let logs = info_logs(|| diagnostics.observe(&event, BOT_ID));
        assert!(!logs.contains("INFO"), "unexpected output: {}", logs);
    }

    #[test]
    fn test_leading_mention_is_noted() {
        let diagnostics = Diagnostics::new();
        let mut message = message_in(text_channel(100, "general"));
        message.content = format!("<@{}> help", BOT_ID);
        message.mentions = vec![BOT_ID];
        let event = Event::MessageCreated(message);

        let logs = info_logs(|| diagnostics.observe(&event, BOT_ID));
        assert!(logs.contains("Bot was mentioned by user7"));
        assert!(logs.contains("Bot was mentioned at the start of the message"));
    }

    #[test]
    fn test_leading_mention_detection() {
        let diagnostics = Diagnostics::new();
        assert!(diagnostics.starts_with_mention("<@1000> hi", 1000));
        assert!(diagnostics.starts_with_mention("<@!1000> hi", 1000));
        assert!(diagnostics.starts_with_mention("  <@1000>", 1000));
        assert!(!diagnostics.starts_with_mention("hi <@1000>", 1000));
        assert!(!diagnostics.starts_with_mention("<@2000> hi", 1000));
        assert!(!diagnostics.starts_with_mention("<@&1000> role", 1000));
    }
}
