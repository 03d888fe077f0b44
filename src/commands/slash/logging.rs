//! Logging slash commands: /setlog, /removelog

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;
use serenity::model::permissions::Permissions;

/// Creates logging commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_setlog_command(), create_removelog_command()]
}

/// Creates the setlog command
fn create_setlog_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("setlog")
        .description("Choose where moderation actions and member events are logged")
        .default_member_permissions(Permissions::MANAGE_GUILD)
        .create_option(|option| {
            option
                .name("channel")
                .description("The log channel")
                .kind(CommandOptionType::Channel)
                .required(true)
        })
        .to_owned()
}

/// Creates the removelog command
fn create_removelog_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("removelog")
        .description("Turn off the log channel")
        .default_member_permissions(Permissions::MANAGE_GUILD)
        .to_owned()
}
