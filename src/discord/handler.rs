//! Discord event handling.
//!
//! One binding per event kind. Each binding turns serenity models into a
//! routing [`Event`] and hands it to the shared [`EventRouter`].

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serenity::async_trait;
use serenity::model::channel::{Message, Reaction};
use serenity::model::gateway::Ready;
use serenity::model::guild::Member;
use serenity::model::id::{ChannelId, GuildId, MessageId};
use serenity::model::user::User;
use serenity::prelude::*;
use tracing::{debug, error, info, warn};

use crate::common::{Event, MemberInfo, RawReaction, ReactionInfo, UserRef};
use crate::discord::commands::CommandHandler;
use crate::discord::convert;
use crate::discord::gateway::SerenityGateway;
use crate::routing::EventRouter;

/// Discord event handler.
pub struct RoutingHandler {
    router: Arc<EventRouter>,
    command_handler: CommandHandler,
    intents: GatewayIntents,
}

impl RoutingHandler {
    pub fn new(router: Arc<EventRouter>, command_prefix: String, intents: GatewayIntents) -> Self {
        Self {
            router,
            command_handler: CommandHandler::new(command_prefix),
            intents,
        }
    }

    async fn route(&self, gateway: &SerenityGateway, event: Event) {
        let mut rng = StdRng::from_entropy();
        self.router
            .handle(gateway, gateway.self_id(), event, &mut rng)
            .await;
    }

    fn cached_message(ctx: &Context, channel_id: ChannelId, message_id: MessageId) -> Option<Message> {
        ctx.cache
            .message(channel_id, message_id)
            .map(|message| Message::clone(&message))
    }

    /// Reacting user, preferring the member data carried by the event.
    async fn reactor(ctx: &Context, reaction: &Reaction) -> Option<UserRef> {
        if let Some(member) = &reaction.member {
            return Some(convert::member_user_ref(member));
        }
        match reaction.user(ctx).await {
            Ok(user) => Some(convert::user_ref(&user, None)),
            Err(e) => {
                warn!("Could not resolve user of reaction on {}: {}", reaction.message_id, e);
                None
            }
        }
    }

    fn member_info(gateway: &SerenityGateway, guild_id: GuildId, user: UserRef, raw: &User) -> Option<MemberInfo> {
        let Some(guild) = gateway.cached_guild(guild_id) else {
            warn!("Guild {} not in cache, dropping member event for {}", guild_id, raw.name);
            return None;
        };
        Some(MemberInfo {
            user,
            guild,
            account_created: convert::timestamp(raw.id.created_at()),
        })
    }
}

#[async_trait]
impl EventHandler for RoutingHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            "Discord bot connected as {} (ID: {})",
            ready.user.name, ready.user.id
        );
        info!("Connected to {} guilds", ready.guilds.len());
        info!("Intents enabled: {:?}", self.intents);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let gateway = SerenityGateway::new(ctx.clone());
        let info = gateway.message_info(&msg);
        self.route(&gateway, Event::MessageCreated(info)).await;

        if msg.author.bot {
            return;
        }
        match self.command_handler.handle_command(&ctx, &msg).await {
            Ok(true) => debug!("Command handled for message {}", msg.id),
            Ok(false) => {}
            Err(e) => error!("Command handler error: {}", e),
        }
    }

    async fn message_delete(
        &self,
        ctx: Context,
        channel_id: ChannelId,
        deleted_message_id: MessageId,
        _guild_id: Option<GuildId>,
    ) {
        let Some(message) = Self::cached_message(&ctx, channel_id, deleted_message_id) else {
            debug!("Deleted message {} was not cached", deleted_message_id);
            return;
        };
        let gateway = SerenityGateway::new(ctx);
        let info = gateway.message_info(&message);
        self.route(&gateway, Event::MessageDeleted(info)).await;
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        let message = match Self::cached_message(&ctx, reaction.channel_id, reaction.message_id) {
            Some(message) => message,
            None => match reaction.message(&ctx).await {
                Ok(message) => message,
                Err(e) => {
                    warn!("Could not fetch reacted message {}: {}", reaction.message_id, e);
                    return;
                }
            },
        };
        let Some(reactor) = Self::reactor(&ctx, &reaction).await else {
            return;
        };

        let gateway = SerenityGateway::new(ctx);
        let event = Event::ReactionAdded(ReactionInfo {
            emoji: convert::emoji_ref(&reaction.emoji),
            reactor,
            message: gateway.message_info(&message),
        });
        self.route(&gateway, event).await;
    }

    async fn reaction_remove(&self, ctx: Context, reaction: Reaction) {
        let cached = Self::cached_message(&ctx, reaction.channel_id, reaction.message_id);
        let reactor = match cached {
            Some(_) => Self::reactor(&ctx, &reaction).await,
            None => None,
        };

        let gateway = SerenityGateway::new(ctx);
        let event = match (cached, reactor) {
            (Some(message), Some(reactor)) => Event::ReactionRemoved(ReactionInfo {
                emoji: convert::emoji_ref(&reaction.emoji),
                reactor,
                message: gateway.message_info(&message),
            }),
            _ => {
                let Some(user_id) = reaction.user_id else {
                    debug!("Reaction removal on {} has no user", reaction.message_id);
                    return;
                };
                Event::RawReactionRemoved(RawReaction {
                    guild_id: reaction.guild_id.map(|id| id.get()),
                    channel_id: reaction.channel_id.get(),
                    user_id: user_id.get(),
                    message_id: reaction.message_id.get(),
                    emoji: convert::emoji_ref(&reaction.emoji),
                })
            }
        };
        self.route(&gateway, event).await;
    }

    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        let gateway = SerenityGateway::new(ctx);
        let user = convert::member_user_ref(&new_member);
        if let Some(member) = Self::member_info(&gateway, new_member.guild_id, user, &new_member.user) {
            self.route(&gateway, Event::MemberJoined(member)).await;
        }
    }

    async fn guild_member_removal(
        &self,
        ctx: Context,
        guild_id: GuildId,
        user: User,
        member_data_if_available: Option<Member>,
    ) {
        let gateway = SerenityGateway::new(ctx);
        let nick = member_data_if_available
            .as_ref()
            .and_then(|member| member.nick.as_deref());
        let user_ref = convert::user_ref(&user, nick);
        if let Some(member) = Self::member_info(&gateway, guild_id, user_ref, &user) {
            self.route(&gateway, Event::MemberLeft(member)).await;
        }
    }
}
