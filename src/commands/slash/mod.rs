//! # Slash Commands (/)
//!
//! Command definitions pushed to Discord on startup. Option names here are the
//! contract the handlers read against.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Cutie catalogue: general, fun, AI, utility, moderation, roles, welcome, logging

mod ai;
mod fun;
mod general;
mod logging;
mod moderation;
mod roles;
mod utility;
mod welcome;

use anyhow::Result;
use log::info;
use serenity::builder::CreateApplicationCommand;
use serenity::http::Http;
use serenity::model::application::command::Command;
use serenity::model::id::GuildId;

/// Creates all slash command definitions
pub fn create_slash_commands() -> Vec<CreateApplicationCommand> {
    let mut commands = Vec::new();

    // General commands
    commands.extend(general::create_commands());

    // Fun commands
    commands.extend(fun::create_commands());

    // AI commands
    commands.extend(ai::create_commands());

    // Utility commands
    commands.extend(utility::create_commands());

    // Moderation commands
    commands.extend(moderation::create_commands());

    // Role management
    commands.extend(roles::create_commands());

    // Welcome and goodbye
    commands.extend(welcome::create_commands());

    // Log channel
    commands.extend(logging::create_commands());

    commands
}

/// Registers all slash commands globally
pub async fn register_global_commands(http: &Http) -> Result<()> {
    let slash_commands = create_slash_commands();
    let count = slash_commands.len();

    Command::set_global_application_commands(http, |commands| {
        for command in slash_commands {
            commands.add_application_command(command);
        }
        commands
    })
    .await?;

    info!("{} global slash commands registered successfully", count);
    Ok(())
}

/// Registers all slash commands for a specific guild (faster for testing)
pub async fn register_guild_commands(http: &Http, guild_id: GuildId) -> Result<()> {
    let slash_commands = create_slash_commands();
    let count = slash_commands.len();

    guild_id
        .set_application_commands(http, |commands| {
            for command in slash_commands {
                commands.add_application_command(command);
            }
            commands
        })
        .await?;

    info!(
        "{} guild slash commands registered successfully for guild: {}",
        count, guild_id
    );
    Ok(())
}

#[cfg(test)]
pub(crate) fn command_name(command: &CreateApplicationCommand) -> String {
    command
        .0
        .get("name")
        .and_then(|name| name.as_str())
        .unwrap_or_default()
        .to_string()
}
