//! Prefix command parsing and responses.
//!
//! Only the gateway-independent part lives here; execution against Discord
//! is in `discord::commands`.

use std::time::Duration;

/// Reply when a guild-only command is used in a DM.
pub const NOT_IN_GUILD: &str = "❌ This command can only be used in a server";

/// Reply when the bot cannot find its own guild member.
pub const BOT_MEMBER_MISSING: &str = "❌ Bot member not found in guild";

/// Title of the permission report embed.
pub const PERMISSIONS_TITLE: &str = "Bot Permissions";

/// Colour of the permission report embed.
pub const PERMISSIONS_COLOUR: u32 = 0x00FF00;

/// Bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Reply with gateway latency.
    Ping,
    /// Report the bot's permissions in the current channel.
    CheckPerms,
    /// List commands.
    Help,
}

/// Longest command name considered for matching.
const MAX_NAME_LEN: usize = 100;

impl Command {
    /// Parse a command from message content.
    ///
    /// Returns `None` when the content does not start with `prefix` or names
    /// an unknown command. Trailing arguments are ignored.
    pub fn parse(content: &str, prefix: &str) -> Option<Self> {
        if prefix.is_empty() {
            return None;
        }
        let rest = content.trim().strip_prefix(prefix)?;
        let name = rest.split_whitespace().next()?;
        if name.len() > MAX_NAME_LEN {
            return None;
        }

        match name.to_lowercase().as_str() {
            "ping" => Some(Self::Ping),
            "checkperms" => Some(Self::CheckPerms),
            "help" => Some(Self::Help),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::CheckPerms => "checkperms",
            Self::Help => "help",
        }
    }
}

/// Text of the `ping` reply.
pub fn ping_response(latency: Option<Duration>) -> String {
    match latency {
        Some(latency) => format!("Pong! Latency: {}ms", latency.as_millis()),
        None => "Pong! Latency: unknown".to_string(),
    }
}

/// Text of the `help` reply.
pub fn help_text(prefix: &str) -> String {
    format!(
        "**Available Commands:**\n\
         • `{0}ping` - Show gateway latency\n\
         • `{0}checkperms` - Show the bot's permissions in this channel\n\
         • `{0}help` - Show this help message",
        prefix
    )
}

/// The fixed set of permissions reported by `checkperms`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermissionReport {
    pub read_messages: bool,
    pub send_messages: bool,
    pub add_reactions: bool,
    pub read_message_history: bool,
    pub use_external_emojis: bool,
    pub manage_messages: bool,
}

impl PermissionReport {
    /// Named fields in display order.
    pub fn fields(&self) -> [(&'static str, bool); 6] {
        [
            ("Read Messages", self.read_messages),
            ("Send Messages", self.send_messages),
            ("Add Reactions", self.add_reactions),
            ("Read Message History", self.read_message_history),
            ("Use External Emojis", self.use_external_emojis),
            ("Manage Messages", self.manage_messages),
        ]
    }
}
