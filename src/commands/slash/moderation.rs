//! Moderation slash commands: /ban, /unban, /kick, /timeout, /untimeout, /warn, /warnings,
//! /clearwarnings, /clear, /slowmode, /lock, /unlock, /nickname, /announce, /modstats, /bans

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;
use serenity::model::permissions::Permissions;

/// Creates moderation commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![
        create_ban_command(),
        create_unban_command(),
        create_kick_command(),
        create_timeout_command(),
        create_untimeout_command(),
        create_warn_command(),
        create_member_command("warnings", "List a member's warnings", Permissions::MODERATE_MEMBERS),
        create_member_command("clearwarnings", "Remove all of a member's warnings", Permissions::ADMINISTRATOR),
        create_clear_command(),
        create_slowmode_command(),
        create_channel_toggle_command("lock", "Stop @everyone from sending messages here"),
        create_channel_toggle_command("unlock", "Let @everyone send messages here again"),
        create_nickname_command(),
        create_announce_command(),
        create_plain_command("modstats", "Moderation statistics for this server", Permissions::MODERATE_MEMBERS),
        create_plain_command("bans", "List banned users", Permissions::BAN_MEMBERS),
    ]
}

/// Creates the ban command
fn create_ban_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("ban")
        .description("Ban a member from the server")
        .default_member_permissions(Permissions::BAN_MEMBERS)
        .create_option(|option| {
            option
                .name("user")
                .description("The member to ban")
                .kind(CommandOptionType::User)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("reason")
                .description("Reason for the ban")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .create_option(|option| {
            option
                .name("delete_messages")
                .description("Days of messages to delete (0-7)")
                .kind(CommandOptionType::Integer)
                .required(false)
        })
        .to_owned()
}

/// Creates the unban command
fn create_unban_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("unban")
        .description("Lift a ban")
        .default_member_permissions(Permissions::BAN_MEMBERS)
        .create_option(|option| {
            option
                .name("user_id")
                .description("ID of the banned user")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("reason")
                .description("Reason for the unban")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .to_owned()
}

/// Creates the kick command
fn create_kick_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("kick")
        .description("Kick a member from the server")
        .default_member_permissions(Permissions::KICK_MEMBERS)
        .create_option(|option| {
            option
                .name("user")
                .description("The member to kick")
                .kind(CommandOptionType::User)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("reason")
                .description("Reason for the kick")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .to_owned()
}

/// Creates the timeout command
fn create_timeout_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("timeout")
        .description("Time out a member (up to 28 days)")
        .default_member_permissions(Permissions::MODERATE_MEMBERS)
        .create_option(|option| {
            option
                .name("user")
                .description("The member to time out")
                .kind(CommandOptionType::User)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("duration")
                .description("How long (e.g., 10m, 1h, 2d)")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("reason")
                .description("Reason for the timeout")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .to_owned()
}

/// Creates the untimeout command
fn create_untimeout_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("untimeout")
        .description("Lift a member's timeout")
        .default_member_permissions(Permissions::MODERATE_MEMBERS)
        .create_option(|option| {
            option
                .name("user")
                .description("The member to release")
                .kind(CommandOptionType::User)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("reason")
                .description("Reason for lifting the timeout")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .to_owned()
}

/// Creates the warn command
fn create_warn_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("warn")
        .description("Warn a member")
        .default_member_permissions(Permissions::MODERATE_MEMBERS)
        .create_option(|option| {
            option
                .name("user")
                .description("The member to warn")
                .kind(CommandOptionType::User)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("reason")
                .description("Reason for the warning")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .to_owned()
}

/// Creates a command taking one required member
fn create_member_command(name: &str, description: &str, permissions: Permissions) -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name(name)
        .description(description)
        .default_member_permissions(permissions)
        .create_option(|option| {
            option
                .name("user")
                .description("The member")
                .kind(CommandOptionType::User)
                .required(true)
        })
        .to_owned()
}

/// Creates the clear command
fn create_clear_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("clear")
        .description("Bulk delete recent messages")
        .default_member_permissions(Permissions::MANAGE_MESSAGES)
        .create_option(|option| {
            option
                .name("amount")
                .description("How many messages (1-100)")
                .kind(CommandOptionType::Integer)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("user")
                .description("Only delete messages from this user")
                .kind(CommandOptionType::User)
                .required(false)
        })
        .to_owned()
}

/// Creates the slowmode command
fn create_slowmode_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("slowmode")
        .description("Set this channel's slowmode")
        .default_member_permissions(Permissions::MANAGE_CHANNELS)
        .create_option(|option| {
            option
                .name("duration")
                .description("Seconds between messages (0-21600, 0 disables)")
                .kind(CommandOptionType::Integer)
                .required(true)
        })
        .to_owned()
}

/// Creates /lock or /unlock
fn create_channel_toggle_command(name: &str, description: &str) -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name(name)
        .description(description)
        .default_member_permissions(Permissions::MANAGE_CHANNELS)
        .create_option(|option| {
            option
                .name("reason")
                .description("Reason shown in the channel")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .to_owned()
}

/// Creates the nickname command
fn create_nickname_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("nickname")
        .description("Change or reset a member's nickname")
        .default_member_permissions(Permissions::MANAGE_NICKNAMES)
        .create_option(|option| {
            option
                .name("user")
                .description("The member")
                .kind(CommandOptionType::User)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("nickname")
                .description("New nickname (leave empty to reset)")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .to_owned()
}

/// Creates the announce command
fn create_announce_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("announce")
        .description("Post an announcement")
        .default_member_permissions(Permissions::MANAGE_MESSAGES)
        .create_option(|option| {
            option
                .name("channel")
                .description("Where to post it")
                .kind(CommandOptionType::Channel)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("message")
                .description("The announcement")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("ping_everyone")
                .description("Mention @everyone")
                .kind(CommandOptionType::Boolean)
                .required(false)
        })
        .to_owned()
}

/// Creates an option-less moderation command
fn create_plain_command(name: &str, description: &str, permissions: Permissions) -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name(name)
        .description(description)
        .default_member_permissions(permissions)
        .to_owned()
}
