//! Utility slash commands: /afk, /remind, /calculate, /ascii

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

/// Creates utility commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![
        create_afk_command(),
        create_remind_command(),
        create_calculate_command(),
        create_ascii_command(),
    ]
}

/// Creates the afk command
fn create_afk_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("afk")
        .description("Mark yourself as away")
        .create_option(|option| {
            option
                .name("reason")
                .description("Why you're away")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .to_owned()
}

/// Creates the remind command
fn create_remind_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("remind")
        .description("Set a reminder")
        .create_option(|option| {
            option
                .name("time")
                .description("When to remind you (e.g., 30s, 10m, 2h, 1d)")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("message")
                .description("What to remind you about")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .to_owned()
}

/// Creates the calculate command
fn create_calculate_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("calculate")
        .description("Perform mathematical calculations")
        .create_option(|option| {
            option
                .name("expression")
                .description("Math expression (e.g., 2+2, 10*5, sqrt(16))")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .to_owned()
}

/// Creates the ascii command
fn create_ascii_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("ascii")
        .description("Convert text to ASCII art")
        .create_option(|option| {
            option
                .name("text")
                .description("Text to convert")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .to_owned()
}
