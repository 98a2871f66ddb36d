//! Discord bot commands (!ping, !checkperms, !help).
//!
//! Parsing lives in `routing::commands`; this module runs the parsed command
//! against serenity.

use std::sync::Arc;

use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::gateway::ShardManager;
use serenity::model::channel::Message;
use serenity::model::permissions::Permissions;
use serenity::prelude::*;
use tracing::{debug, info, warn};

use crate::routing::commands::{
    help_text, ping_response, Command, PermissionReport, BOT_MEMBER_MISSING, NOT_IN_GUILD,
    PERMISSIONS_COLOUR, PERMISSIONS_TITLE,
};

/// Type map key for the shard manager, read by `ping`.
pub struct ShardManagerContainer;

impl TypeMapKey for ShardManagerContainer {
    type Value = Arc<ShardManager>;
}

impl From<Permissions> for PermissionReport {
    fn from(perms: Permissions) -> Self {
        Self {
            read_messages: perms.view_channel(),
            send_messages: perms.send_messages(),
            add_reactions: perms.add_reactions(),
            read_message_history: perms.read_message_history(),
            use_external_emojis: perms.use_external_emojis(),
            manage_messages: perms.manage_messages(),
        }
    }
}

/// Command handler for Discord bot.
pub struct CommandHandler {
    prefix: String,
}

impl CommandHandler {
    pub fn new(prefix: String) -> Self {
        Self { prefix }
    }

    /// Parse and execute a command from Discord.
    ///
    /// Returns `true` if the message was a command, `false` otherwise.
    pub async fn handle_command(&self, ctx: &Context, msg: &Message) -> anyhow::Result<bool> {
        let Some(command) = Command::parse(&msg.content, &self.prefix) else {
            return Ok(false);
        };

        debug!("Processing command: {}", command.name());

        match command {
            Command::Ping => self.handle_ping(ctx, msg).await?,
            Command::CheckPerms => self.handle_checkperms(ctx, msg).await?,
            Command::Help => self.handle_help(ctx, msg).await?,
        }
        Ok(true)
    }

    /// Handle !ping command.
    async fn handle_ping(&self, ctx: &Context, msg: &Message) -> anyhow::Result<()> {
        let latency = {
            let data = ctx.data.read().await;
            match data.get::<ShardManagerContainer>() {
                Some(manager) => {
                    let runners = manager.runners.lock().await;
                    runners.get(&ctx.shard_id).and_then(|runner| runner.latency)
                }
                None => None,
            }
        };

        msg.channel_id.say(&ctx.http, ping_response(latency)).await?;
        info!("Ping command used by {}", msg.author.name);
        Ok(())
    }

    /// Handle !checkperms command.
    async fn handle_checkperms(&self, ctx: &Context, msg: &Message) -> anyhow::Result<()> {
        let Some(guild_id) = msg.guild_id else {
            msg.channel_id.say(&ctx.http, NOT_IN_GUILD).await?;
            return Ok(());
        };

        let bot_id = ctx.cache.current_user().id;
        let member = match guild_id.member(ctx, bot_id).await {
            Ok(member) => member,
            Err(e) => {
                warn!("Bot member lookup failed in guild {}: {}", guild_id, e);
                msg.channel_id.say(&ctx.http, BOT_MEMBER_MISSING).await?;
                return Ok(());
            }
        };

        // Threads are checked against their parent channel.
        let report = ctx.cache.guild(guild_id).map(|guild| {
            let channel = guild.channels.get(&msg.channel_id).or_else(|| {
                guild
                    .threads
                    .iter()
                    .find(|thread| thread.id == msg.channel_id)
                    .and_then(|thread| thread.parent_id)
                    .and_then(|parent| guild.channels.get(&parent))
            });
            let perms = match channel {
                Some(channel) => guild.user_permissions_in(channel, &member),
                None => guild.member_permissions(&member),
            };
            PermissionReport::from(perms)
        });

        let Some(report) = report else {
            msg.channel_id.say(&ctx.http, BOT_MEMBER_MISSING).await?;
            return Ok(());
        };

        let embed = report.fields().into_iter().fold(
            CreateEmbed::new()
                .title(PERMISSIONS_TITLE)
                .colour(PERMISSIONS_COLOUR),
            |embed, (name, allowed)| {
                embed.field(name, if allowed { "True" } else { "False" }, true)
            },
        );
        msg.channel_id
            .send_message(&ctx.http, CreateMessage::new().embed(embed))
            .await?;
        info!("Checkperms command used by {}", msg.author.name);
        Ok(())
    }

    /// Handle !help command.
    async fn handle_help(&self, ctx: &Context, msg: &Message) -> anyhow::Result<()> {
        msg.channel_id.say(&ctx.http, help_text(&self.prefix)).await?;
        Ok(())
    }
}
