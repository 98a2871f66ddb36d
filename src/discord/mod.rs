//! Discord integration.
//!
//! Adapts serenity to the routing core: event conversion, the `Gateway`
//! implementation, commands, and the long-running client.

pub mod client;
pub mod commands;
pub mod convert;
pub mod gateway;
pub mod handler;

pub use client::DiscordBotBuilder;
