//! Intent execution against the gateway.
//!
//! Each intent runs once. Failed sends are reported through the returned
//! [`DispatchResult`], never retried and never propagated.

use std::fmt;

use rand::Rng;
use tracing::{error, info, warn};

use crate::common::{
    ChannelKind, GatewayError, MemberInfo, MessageInfo, RawReaction, ReactionInfo, Snowflake,
};
use crate::routing::classifier::Intent;
use crate::routing::diagnostics::log_channel;
use crate::routing::gateway::Gateway;
use crate::routing::resolver::resolve;
use crate::routing::templates::{render, render_title, Pool, TemplateBank, TemplateVars, ThreadPools};

/// Why a fallback reply was sent instead of a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Thread creation was not permitted.
    NoPermission,
    /// Thread creation failed for any other reason.
    Error,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPermission => write!(f, "no permission to create thread"),
            Self::Error => write!(f, "thread creation failed"),
        }
    }
}

/// Why an intent ended without a visible action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressReason {
    /// No channel matched the candidate names.
    NoChannel,
    /// Sending was not permitted.
    Forbidden,
    /// A guild, channel, member or message could not be resolved.
    NotFound(&'static str),
    /// Sending failed for a reason other than permissions.
    SendFailed,
    /// The inline fallback reply failed too.
    FallbackFailed,
    /// The resolved channel is not a text channel, thread or forum.
    NotRoutable,
}

impl fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoChannel => write!(f, "no channel"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::NotFound(what) => write!(f, "{} not found", what),
            Self::SendFailed => write!(f, "send failed"),
            Self::FallbackFailed => write!(f, "fallback reply failed"),
            Self::NotRoutable => write!(f, "channel not routable"),
        }
    }
}

/// Outcome of one dispatched intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    /// A message was sent to the named channel.
    Sent { channel: String },
    /// A thread was created and the response posted in it.
    ThreadCreated { thread: String },
    /// Thread creation failed and an inline reply was sent instead.
    FallbackSent { reason: FallbackReason },
    /// Log-only intent completed.
    Logged,
    /// Nothing was sent.
    Suppressed(SuppressReason),
}

/// Which thread route an intent takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThreadRoute {
    Question,
    Mention,
}

impl ThreadRoute {
    fn label(self) -> &'static str {
        match self {
            Self::Question => "questions thread",
            Self::Mention => "mention thread",
        }
    }
}

/// Executes intents using a gateway and the template bank.
pub struct Dispatcher<'a, G: Gateway + ?Sized> {
    gateway: &'a G,
    templates: &'a TemplateBank,
}

impl<'a, G: Gateway + ?Sized> Dispatcher<'a, G> {
    pub fn new(gateway: &'a G, templates: &'a TemplateBank) -> Self {
        Self { gateway, templates }
    }

    /// Execute one intent.
    pub async fn dispatch<R: Rng + Send + ?Sized>(
        &self,
        intent: &Intent,
        rng: &mut R,
    ) -> DispatchResult {
        match intent {
            Intent::SendWelcome { member, candidates } => {
                let text = render(
                    self.templates.welcome.pick(rng),
                    &TemplateVars::for_member(&member.user, &member.guild),
                );
                self.send_to_named_channel(member, candidates, "welcome", &text)
                    .await
            }
            Intent::SendGoodbye { member, candidates } => {
                let text = render(
                    self.templates.goodbye.pick(rng),
                    &TemplateVars::for_member(&member.user, &member.guild),
                );
                self.send_to_named_channel(member, candidates, "goodbye", &text)
                    .await
            }
            Intent::RouteToQuestionThread(message) => {
                self.route_to_thread(message, ThreadRoute::Question, rng).await
            }
            Intent::RouteToMentionThread(message) => {
                self.route_to_thread(message, ThreadRoute::Mention, rng).await
            }
            Intent::LogReplyContext {
                channel_id,
                message_id,
            } => self.log_reply_context(*channel_id, *message_id).await,
            Intent::LogReaction { reaction, added } => {
                log_reaction(reaction, *added);
                DispatchResult::Logged
            }
            Intent::ResolveRawReaction(raw) => self.resolve_raw_reaction(raw).await,
        }
    }

    async fn send_to_named_channel(
        &self,
        member: &MemberInfo,
        candidates: &[String],
        purpose: &str,
        text: &str,
    ) -> DispatchResult {
        let channels = match self.gateway.guild_channels(member.guild.id).await {
            Ok(channels) => channels,
            Err(e) => {
                warn!("Could not list channels of guild {}: {}", member.guild.name, e);
                return DispatchResult::Suppressed(SuppressReason::NotFound("guild"));
            }
        };
        let text_channels: Vec<_> = channels
            .into_iter()
            .filter(|channel| channel.kind == ChannelKind::TextChannel)
            .collect();

        let Some(channel) = resolve(&text_channels, candidates) else {
            warn!("No suitable {} channel found in {}", purpose, member.guild.name);
            return DispatchResult::Suppressed(SuppressReason::NoChannel);
        };
        info!("Found {} channel: {}", purpose, channel.name);

        match self.gateway.send_message(channel.id, text).await {
            Ok(_) => {
                info!("Sent {} message: {}", purpose, text);
                DispatchResult::Sent {
                    channel: channel.name.clone(),
                }
            }
            Err(GatewayError::Unauthorized(_)) => {
                error!("No permission to send {} message in #{}", purpose, channel.name);
                DispatchResult::Suppressed(SuppressReason::Forbidden)
            }
            Err(e) => {
                error!("Error sending {} message: {}", purpose, e);
                DispatchResult::Suppressed(SuppressReason::SendFailed)
            }
        }
    }

    async fn route_to_thread<R: Rng + Send + ?Sized>(
        &self,
        message: &MessageInfo,
        route: ThreadRoute,
        rng: &mut R,
    ) -> DispatchResult {
        let pools = self.pools(route);
        let vars = TemplateVars::new(&message.author, message.guild_name());
        let title = render_title(pools.titles.pick(rng), &vars);

        let thread = match self.gateway.create_thread(message, &title).await {
            Ok(thread) => thread,
            Err(GatewayError::Unauthorized(e)) => {
                error!("Cannot create {}, insufficient permissions: {}", route.label(), e);
                return self
                    .reply_fallback(message, pools.no_permission, FallbackReason::NoPermission, &vars, rng)
                    .await;
            }
            Err(e) => {
                error!("Error creating {}: {}", route.label(), e);
                return self
                    .reply_fallback(message, pools.error, FallbackReason::Error, &vars, rng)
                    .await;
            }
        };

        let response = render(pools.responses.pick(rng), &vars);
        match self.gateway.send_message(thread.id, &response).await {
            Ok(_) => {
                info!(
                    "Created {} '{}' for {}",
                    route.label(),
                    thread.name,
                    message.author.name
                );
                info!("Responded in thread: {}", response);
                DispatchResult::ThreadCreated {
                    thread: thread.name,
                }
            }
            Err(e) => {
                error!("Created thread '{}' but could not respond in it: {}", thread.name, e);
                DispatchResult::Suppressed(SuppressReason::SendFailed)
            }
        }
    }

    async fn reply_fallback<R: Rng + Send + ?Sized>(
        &self,
        message: &MessageInfo,
        pool: Pool,
        reason: FallbackReason,
        vars: &TemplateVars<'_>,
        rng: &mut R,
    ) -> DispatchResult {
        let text = render(pool.pick(rng), vars);
        match self.gateway.reply(message, &text).await {
            Ok(_) => {
                info!("Replied with fallback: {}", text);
                DispatchResult::FallbackSent { reason }
            }
            Err(e) => {
                error!("Fallback reply failed: {}", e);
                DispatchResult::Suppressed(SuppressReason::FallbackFailed)
            }
        }
    }

    async fn log_reply_context(&self, channel_id: Snowflake, message_id: Snowflake) -> DispatchResult {
        match self.gateway.fetch_message(channel_id, message_id).await {
            Ok(original) => {
                info!("Original message: {}", original.content);
                info!("Original author: {}", original.author.name);
            }
            Err(GatewayError::NotFound(_)) => {
                warn!("Original message not found (might be deleted)");
            }
            Err(GatewayError::Unauthorized(_)) => {
                warn!("No permission to fetch the original message");
            }
            Err(e) => {
                error!("Failed to fetch the original message: {}", e);
            }
        }
        DispatchResult::Logged
    }

    async fn resolve_raw_reaction(&self, raw: &RawReaction) -> DispatchResult {
        let Some(guild_id) = raw.guild_id else {
            warn!("Guild not found");
            return DispatchResult::Suppressed(SuppressReason::NotFound("guild"));
        };
        let guild = match self.gateway.get_guild(guild_id).await {
            Ok(guild) => guild,
            Err(_) => {
                warn!("Guild not found");
                return DispatchResult::Suppressed(SuppressReason::NotFound("guild"));
            }
        };
        let channel = match self.gateway.get_channel(guild_id, raw.channel_id).await {
            Ok(channel) => channel,
            Err(_) => {
                warn!("Channel not found");
                return DispatchResult::Suppressed(SuppressReason::NotFound("channel"));
            }
        };
        let user = match self.gateway.get_member(guild_id, raw.user_id).await {
            Ok(user) => user,
            Err(_) => {
                warn!("User not found");
                return DispatchResult::Suppressed(SuppressReason::NotFound("user"));
            }
        };

        if !channel.kind.is_routable() {
            return DispatchResult::Suppressed(SuppressReason::NotRoutable);
        }

        info!("Raw reaction removed: {}", raw.emoji);
        info!("User: {} (ID: {})", user.name, user.id);
        info!("Channel: {}", channel.name);
        info!("Guild: {}", guild.name);

        match self.gateway.fetch_message(channel.id, raw.message_id).await {
            Ok(message) => {
                info!("Message: {}", message.content);
                info!("Original author: {}", message.author.name);
            }
            Err(GatewayError::NotFound(_)) => warn!("Message not found (might be deleted)"),
            Err(GatewayError::Unauthorized(_)) => warn!("No permission to fetch the message"),
            Err(e) => error!("Failed to fetch the message: {}", e),
        }
        DispatchResult::Logged
    }

    fn pools(&self, route: ThreadRoute) -> &ThreadPools {
        match route {
            ThreadRoute::Question => &self.templates.question,
            ThreadRoute::Mention => &self.templates.mention,
        }
    }
}

fn log_reaction(reaction: &ReactionInfo, added: bool) {
    let action = if added { "added" } else { "removed" };
    info!("Reaction {}: {}", action, reaction.emoji);
    info!("User: {} (ID: {})", reaction.reactor.name, reaction.reactor.id);
    info!("Message: {}", reaction.message.content);
    info!("Original author: {}", reaction.message.author.name);
    info!("Guild: {}", reaction.message.guild_name());
    log_channel(&reaction.message.channel);
}
