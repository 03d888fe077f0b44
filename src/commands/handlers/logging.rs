//! /setlog and /removelog

use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use serenity::model::permissions::Permissions;

use super::{INFO_COLOUR, SUCCESS_COLOUR};
use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandSpec, Invocation, SlashCommandHandler};
use crate::database::{SettingsPatch, WriteOutcome};
use crate::gateway::{Embed, Reply};

const COMMANDS: &[CommandSpec] = &[
    CommandSpec::requires("setlog", Permissions::MANAGE_GUILD),
    CommandSpec::requires("removelog", Permissions::MANAGE_GUILD),
];

pub struct LoggingHandler;

impl LoggingHandler {
    async fn setlog(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let Some(channel) = call.input.channel("channel") else {
            return call.reject("Please choose a channel.").await;
        };

        let patch = SettingsPatch::new().log_channel(Some(channel.id));
        if let WriteOutcome::Rejected(reason) = ctx.store.update_settings(guild_id, &patch).await {
            return call.reject(format!("Couldn't save that: {}.", reason)).await;
        }

        let hello = Embed::new()
            .title("📜 Log Channel Set")
            .description(format!(
                "Moderation actions and member events will be logged here. Set by {}.",
                call.input.user.mention()
            ))
            .colour(INFO_COLOUR)
            .timestamp();
        if let Err(e) = call.gateway.send_message(channel.id, Reply::embed(hello)).await {
            warn!("Could not post to new log channel {}: {}", channel.id, e);
        }

        call.reply(Reply::embed(
            Embed::new()
                .title("✅ Log Channel Set")
                .description(format!("Logs will be posted in <#{}>.", channel.id))
                .colour(SUCCESS_COLOUR),
        ))
        .await
    }

    async fn removelog(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let patch = SettingsPatch::new().log_channel(None);
        if let WriteOutcome::Rejected(reason) = ctx.store.update_settings(guild_id, &patch).await {
            return call.reject(format!("Couldn't save that: {}.", reason)).await;
        }
        call.reply(Reply::text("✅ Logging has been turned off.")).await
    }
}

#[async_trait]
impl SlashCommandHandler for LoggingHandler {
    fn commands(&self) -> &'static [CommandSpec] {
        COMMANDS
    }

    async fn handle(&self, ctx: &CommandContext, call: &Invocation<'_>) -> Result<()> {
        let Some(guild_id) = call.require_guild().await? else {
            return Ok(());
        };

        match call.input.name.as_str() {
            "setlog" => self.setlog(ctx, call, guild_id).await,
            "removelog" => self.removelog(ctx, call, guild_id).await,
            _ => Ok(()),
        }
    }
}
