//! General slash commands: /help, /ping, /profile, /avatar, /serverinfo, /userinfo, /roleinfo, /botinfo, /uptime

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

/// Creates general commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![
        create_help_command(),
        create_ping_command(),
        create_user_command("profile", "View user profile information"),
        create_user_command("avatar", "Get user avatar in high quality"),
        create_serverinfo_command(),
        create_user_command("userinfo", "Show detailed information about a member"),
        create_roleinfo_command(),
        create_botinfo_command(),
        create_uptime_command(),
    ]
}

/// Creates the help command
fn create_help_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("help")
        .description("Show available commands and usage information")
        .to_owned()
}

/// Creates the ping command
fn create_ping_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("ping")
        .description("Check bot latency")
        .to_owned()
}

/// Creates a command taking one optional user, defaulting to the invoker
fn create_user_command(name: &str, description: &str) -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name(name)
        .description(description)
        .create_option(|option| {
            option
                .name("user")
                .description("The user to look up (defaults to you)")
                .kind(CommandOptionType::User)
                .required(false)
        })
        .to_owned()
}

/// Creates the serverinfo command
fn create_serverinfo_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("serverinfo")
        .description("Display server information")
        .to_owned()
}

/// Creates the roleinfo command
fn create_roleinfo_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("roleinfo")
        .description("Show information about a role")
        .create_option(|option| {
            option
                .name("role")
                .description("The role to inspect")
                .kind(CommandOptionType::Role)
                .required(true)
        })
        .to_owned()
}

/// Creates the botinfo command
fn create_botinfo_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("botinfo")
        .description("Show information about Cutie")
        .to_owned()
}

/// Creates the uptime command
fn create_uptime_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("uptime")
        .description("How long Cutie has been running")
        .to_owned()
}
