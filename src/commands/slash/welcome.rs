//! Welcome slash commands: /setwelcome, /removewelcome, /testwelcome, /setgoodbye,
//! /removegoodbye, /autorole, /removeautorole

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;
use serenity::model::permissions::Permissions;

const TEMPLATE_HELP: &str = "Placeholders: {user}, {username}, {server}, {memberCount}";

/// Creates welcome/goodbye commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![
        create_set_message_command("setwelcome", "Set the welcome channel and message"),
        create_plain_command("removewelcome", "Turn off welcome messages", Permissions::MANAGE_GUILD),
        create_plain_command("testwelcome", "Preview the welcome message", Permissions::MANAGE_GUILD),
        create_set_message_command("setgoodbye", "Set the goodbye channel and message"),
        create_plain_command("removegoodbye", "Turn off goodbye messages", Permissions::MANAGE_GUILD),
        create_autorole_command(),
        create_plain_command("removeautorole", "Stop assigning a role on join", Permissions::MANAGE_ROLES),
    ]
}

/// Creates /setwelcome or /setgoodbye
fn create_set_message_command(name: &str, description: &str) -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name(name)
        .description(description)
        .default_member_permissions(Permissions::MANAGE_GUILD)
        .create_option(|option| {
            option
                .name("channel")
                .description("Where to post")
                .kind(CommandOptionType::Channel)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("message")
                .description(TEMPLATE_HELP)
                .kind(CommandOptionType::String)
                .required(false)
        })
        .to_owned()
}

/// Creates the autorole command
fn create_autorole_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("autorole")
        .description("Give new members a role automatically")
        .default_member_permissions(Permissions::MANAGE_ROLES)
        .create_option(|option| {
            option
                .name("role")
                .description("The role to assign")
                .kind(CommandOptionType::Role)
                .required(true)
        })
        .to_owned()
}

fn create_plain_command(name: &str, description: &str, permissions: Permissions) -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name(name)
        .description(description)
        .default_member_permissions(permissions)
        .to_owned()
}
