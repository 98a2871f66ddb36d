//! Event classification.
//!
//! Maps an incoming [`Event`] to the ordered list of [`Intent`]s the
//! dispatcher should attempt. Classification is pure: the same event and
//! bot id always produce the same intents.

use crate::common::{Event, MemberInfo, MessageInfo, RawReaction, ReactionInfo, Snowflake};
use crate::config::types::RoutingConfig;
use crate::routing::resolver::names_match;

/// Default candidates for the welcome channel, in order of preference.
pub const WELCOME_CANDIDATES: [&str; 5] = ["welcome", "general", "lobby", "main", "chat"];

/// Default candidates for the goodbye channel, in order of preference.
pub const GOODBYE_CANDIDATES: [&str; 6] = ["goodbye", "farewell", "general", "lobby", "main", "chat"];

/// Default name of the channel whose posts become question threads.
pub const QUESTIONS_CHANNEL: &str = "questions";

/// An action the dispatcher should attempt for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Move a post in the questions channel into its own thread.
    RouteToQuestionThread(MessageInfo),
    /// Open a thread for a post that mentions the bot.
    RouteToMentionThread(MessageInfo),
    /// Log the message a reply points to.
    LogReplyContext {
        channel_id: Snowflake,
        message_id: Snowflake,
    },
    /// Greet a new member in the first matching channel.
    SendWelcome {
        member: MemberInfo,
        candidates: Vec<String>,
    },
    /// Say goodbye to a departed member in the first matching channel.
    SendGoodbye {
        member: MemberInfo,
        candidates: Vec<String>,
    },
    /// Log a reaction on a known message.
    LogReaction { reaction: ReactionInfo, added: bool },
    /// Resolve the ids of an uncached reaction removal, then log it.
    ResolveRawReaction(RawReaction),
}

impl Intent {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RouteToQuestionThread(_) => "route_to_question_thread",
            Self::RouteToMentionThread(_) => "route_to_mention_thread",
            Self::LogReplyContext { .. } => "log_reply_context",
            Self::SendWelcome { .. } => "send_welcome",
            Self::SendGoodbye { .. } => "send_goodbye",
            Self::LogReaction { .. } => "log_reaction",
            Self::ResolveRawReaction(_) => "resolve_raw_reaction",
        }
    }
}

/// Decides which intents an event produces.
#[derive(Debug, Clone)]
pub struct Classifier {
    questions_channel: String,
    welcome_candidates: Vec<String>,
    goodbye_candidates: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            questions_channel: QUESTIONS_CHANNEL.to_string(),
            welcome_candidates: WELCOME_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            goodbye_candidates: GOODBYE_CANDIDATES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Classifier {
    pub fn from_config(config: &RoutingConfig) -> Self {
        Self {
            questions_channel: config.questions_channel.clone(),
            welcome_candidates: config.welcome_channels.clone(),
            goodbye_candidates: config.goodbye_channels.clone(),
        }
    }

    /// Classify an event. All applicable rules fire, in a fixed order.
    pub fn classify(&self, event: &Event, self_id: Snowflake) -> Vec<Intent> {
        match event {
            Event::MessageCreated(message) => self.classify_message(message, self_id),
            Event::MessageDeleted(_) => Vec::new(),
            Event::ReactionAdded(reaction) => classify_reaction(reaction, self_id, true),
            Event::ReactionRemoved(reaction) => classify_reaction(reaction, self_id, false),
            Event::RawReactionRemoved(raw) => {
                if raw.user_id == self_id {
                    Vec::new()
                } else {
                    vec![Intent::ResolveRawReaction(raw.clone())]
                }
            }
            Event::MemberJoined(member) => {
                if member.user.id == self_id {
                    return Vec::new();
                }
                vec![Intent::SendWelcome {
                    member: member.clone(),
                    candidates: self.welcome_candidates.clone(),
                }]
            }
            Event::MemberLeft(member) => {
                if member.user.id == self_id {
                    return Vec::new();
                }
                vec![Intent::SendGoodbye {
                    member: member.clone(),
                    candidates: self.goodbye_candidates.clone(),
                }]
            }
        }
    }

    fn classify_message(&self, message: &MessageInfo, self_id: Snowflake) -> Vec<Intent> {
        if message.author.bot || message.author.id == self_id {
            return Vec::new();
        }
        if !message.channel.kind.is_routable() {
            return Vec::new();
        }

        let mut intents = Vec::new();

        if names_match(&message.channel.name, &self.questions_channel) {
            intents.push(Intent::RouteToQuestionThread(message.clone()));
        }

        if message.mentions_user(self_id) {
            intents.push(Intent::RouteToMentionThread(message.clone()));
        }

        if let Some(reply_to) = message.reply_to {
            intents.push(Intent::LogReplyContext {
                channel_id: message.channel.id,
                message_id: reply_to,
            });
        }

        intents
    }
}

fn classify_reaction(reaction: &ReactionInfo, self_id: Snowflake, added: bool) -> Vec<Intent> {
    if reaction.reactor.bot || reaction.reactor.id == self_id {
        return Vec::new();
    }
    if !reaction.message.channel.kind.is_routable() {
        return Vec::new();
    }
    vec![Intent::LogReaction {
        reaction: reaction.clone(),
        added,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ChannelKind, ChannelRef, EmojiRef, GuildRef, UserRef};
    use chrono::Utc;

    const BOT_ID: Snowflake = 1000;

    fn user(id: Snowflake, bot: bool) -> UserRef {
        UserRef {
            id,
            name: format!("user{}", id),
            display_name: format!("User {}", id),
            bot,
        }
    }

    fn message_in(channel_name: &str, kind: ChannelKind) -> MessageInfo {
        MessageInfo {
            id: 500,
            content: "how do I configure X?".to_string(),
            author: user(7, false),
            channel: ChannelRef {
                id: 300,
                name: channel_name.to_string(),
                kind,
                parent_name: None,
            },
            guild: Some(GuildRef {
                id: 1,
                name: "Guild".to_string(),
                member_count: Some(10),
            }),
            mentions: Vec::new(),
            reply_to: None,
            timestamp: Utc::now(),
        }
    }

    fn member(id: Snowflake) -> MemberInfo {
        MemberInfo {
            user: user(id, false),
            guild: GuildRef {
                id: 1,
                name: "Guild".to_string(),
                member_count: Some(11),
            },
            account_created: Utc::now(),
        }
    }

    #[test]
    fn test_bot_messages_produce_nothing() {
        let classifier = Classifier::default();
        let mut message = message_in("questions", ChannelKind::TextChannel);
        message.author = user(BOT_ID, true);
        message.mentions = vec![BOT_ID];
        assert!(classifier
            .classify(&Event::MessageCreated(message.clone()), BOT_ID)
            .is_empty());

        message.author = user(77, true);
        assert!(classifier
            .classify(&Event::MessageCreated(message), BOT_ID)
            .is_empty());
    }

    #[test]
    fn test_questions_channel_routes_to_thread() {
        let classifier = Classifier::default();
        let message = message_in("Questions", ChannelKind::TextChannel);
        let intents = classifier.classify(&Event::MessageCreated(message.clone()), BOT_ID);
        assert_eq!(intents, vec![Intent::RouteToQuestionThread(message)]);
    }

    #[test]
    fn test_non_routable_channel_is_ignored() {
        let classifier = Classifier::default();
        let mut message = message_in("questions", ChannelKind::Other);
        message.mentions = vec![BOT_ID];
        message.reply_to = Some(1);
        assert!(classifier
            .classify(&Event::MessageCreated(message), BOT_ID)
            .is_empty());
    }

    #[test]
    fn test_all_applicable_rules_fire_in_order() {
        let classifier = Classifier::default();
        let mut message = message_in("questions", ChannelKind::Thread);
        message.mentions = vec![3, BOT_ID];
        message.reply_to = Some(444);

        let intents = classifier.classify(&Event::MessageCreated(message.clone()), BOT_ID);
        assert_eq!(
            intents,
            vec![
                Intent::RouteToQuestionThread(message.clone()),
                Intent::RouteToMentionThread(message),
                Intent::LogReplyContext {
                    channel_id: 300,
                    message_id: 444,
                },
            ]
        );
    }

    #[test]
    fn test_plain_message_produces_nothing() {
        let classifier = Classifier::default();
        let message = message_in("general", ChannelKind::TextChannel);
        assert!(classifier
            .classify(&Event::MessageCreated(message), BOT_ID)
            .is_empty());
    }

    #[test]
    fn test_member_events_carry_candidates() {
        let classifier = Classifier::default();
        let joined = classifier.classify(&Event::MemberJoined(member(8)), BOT_ID);
        match joined.as_slice() {
            [Intent::SendWelcome { candidates, .. }] => {
                assert_eq!(candidates, &WELCOME_CANDIDATES.map(String::from).to_vec());
            }
            other => panic!("unexpected intents: {:?}", other),
        }

        let left = classifier.classify(&Event::MemberLeft(member(8)), BOT_ID);
        match left.as_slice() {
            [Intent::SendGoodbye { candidates, .. }] => {
                assert_eq!(candidates, &GOODBYE_CANDIDATES.map(String::from).to_vec());
            }
            other => panic!("unexpected intents: {:?}", other),
        }
    }

    #[test]
    fn test_reactions_by_bots_are_suppressed() {
        let classifier = Classifier::default();
        let reaction = ReactionInfo {
            emoji: EmojiRef::Unicode("👍".to_string()),
            reactor: user(BOT_ID, true),
            message: message_in("general", ChannelKind::TextChannel),
        };
        assert!(classifier
            .classify(&Event::ReactionAdded(reaction.clone()), BOT_ID)
            .is_empty());

        let human = ReactionInfo {
            reactor: user(9, false),
            ..reaction
        };
        assert_eq!(
            classifier.classify(&Event::ReactionRemoved(human.clone()), BOT_ID),
            vec![Intent::LogReaction {
                reaction: human,
                added: false,
            }]
        );
    }

    #[test]
    fn test_raw_reaction_by_self_is_suppressed() {
        let classifier = Classifier::default();
        let raw = RawReaction {
            guild_id: Some(1),
            channel_id: 2,
            user_id: BOT_ID,
            message_id: 3,
            emoji: EmojiRef::Unicode("🔥".to_string()),
        };
        assert!(classifier
            .classify(&Event::RawReactionRemoved(raw.clone()), BOT_ID)
            .is_empty());

        let other = RawReaction { user_id: 5, ..raw };
        assert_eq!(
            classifier.classify(&Event::RawReactionRemoved(other.clone()), BOT_ID),
            vec![Intent::ResolveRawReaction(other)]
        );
    }

    #[test]
    fn test_deletions_are_diagnostic_only() {
        let classifier = Classifier::default();
        let message = message_in("questions", ChannelKind::TextChannel);
        assert!(classifier
            .classify(&Event::MessageDeleted(message), BOT_ID)
            .is_empty());
    }

    #[test]
    fn test_classification_is_idempotent() {
        let classifier = Classifier::default();
        let mut message = message_in("questions", ChannelKind::ForumChannel);
        message.mentions = vec![BOT_ID];
        let event = Event::MessageCreated(message);
        assert_eq!(
            classifier.classify(&event, BOT_ID),
            classifier.classify(&event, BOT_ID)
        );
    }

    #[test]
    fn test_custom_questions_channel() {
        let config = RoutingConfig {
            questions_channel: "help".to_string(),
            ..RoutingConfig::default()
        };
        let classifier = Classifier::from_config(&config);
        let message = message_in("help", ChannelKind::TextChannel);
        assert_eq!(
            classifier.classify(&Event::MessageCreated(message.clone()), BOT_ID),
            vec![Intent::RouteToQuestionThread(message)]
        );
    }
}
