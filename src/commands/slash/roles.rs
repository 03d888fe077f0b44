//! Role slash commands: /addrole, /removerole, /createrole, /deleterole, /roles

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;
use serenity::model::permissions::Permissions;

/// Creates role commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![
        create_member_role_command("addrole", "Give a member a role"),
        create_member_role_command("removerole", "Take a role from a member"),
        create_createrole_command(),
        create_deleterole_command(),
        create_roles_command(),
    ]
}

/// Creates /addrole or /removerole
fn create_member_role_command(name: &str, description: &str) -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name(name)
        .description(description)
        .default_member_permissions(Permissions::MANAGE_ROLES)
        .create_option(|option| {
            option
                .name("user")
                .description("The member")
                .kind(CommandOptionType::User)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("role")
                .description("The role")
                .kind(CommandOptionType::Role)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("reason")
                .description("Audit log reason")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .to_owned()
}

/// Creates the createrole command
fn create_createrole_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("createrole")
        .description("Create a new role")
        .default_member_permissions(Permissions::MANAGE_ROLES)
        .create_option(|option| {
            option
                .name("name")
                .description("Role name")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("color")
                .description("Hex colour like #B4E7FF")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .create_option(|option| {
            option
                .name("hoist")
                .description("Show members separately in the sidebar")
                .kind(CommandOptionType::Boolean)
                .required(false)
        })
        .create_option(|option| {
            option
                .name("mentionable")
                .description("Allow anyone to mention this role")
                .kind(CommandOptionType::Boolean)
                .required(false)
        })
        .to_owned()
}

/// Creates the deleterole command
fn create_deleterole_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("deleterole")
        .description("Delete a role")
        .default_member_permissions(Permissions::MANAGE_ROLES)
        .create_option(|option| {
            option
                .name("role")
                .description("The role to delete")
                .kind(CommandOptionType::Role)
                .required(true)
        })
        .to_owned()
}

/// Creates the roles command
fn create_roles_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("roles")
        .description("List a member's roles, or every role in the server")
        .create_option(|option| {
            option
                .name("user")
                .description("Whose roles to list")
                .kind(CommandOptionType::User)
                .required(false)
        })
        .to_owned()
}
