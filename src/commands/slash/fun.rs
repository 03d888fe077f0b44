//! Fun slash commands: /roll, /coinflip, /8ball, /quote, /choose, /reverse, /poll, /embed

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

/// Creates fun commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![
        create_roll_command(),
        create_coinflip_command(),
        create_8ball_command(),
        create_quote_command(),
        create_choose_command(),
        create_reverse_command(),
        create_poll_command(),
        create_embed_command(),
    ]
}

/// Creates the roll command
fn create_roll_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("roll")
        .description("Roll a dice")
        .create_option(|option| {
            option
                .name("sides")
                .description("Number of sides (2-1000, default 6)")
                .kind(CommandOptionType::Integer)
                .required(false)
        })
        .to_owned()
}

/// Creates the coinflip command
fn create_coinflip_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("coinflip")
        .description("Flip a coin")
        .to_owned()
}

/// Creates the 8ball command
fn create_8ball_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("8ball")
        .description("Ask the magic 8ball")
        .create_option(|option| {
            option
                .name("question")
                .description("Your yes-or-no question")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .to_owned()
}

/// Creates the quote command
fn create_quote_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("quote")
        .description("Get an inspirational quote")
        .to_owned()
}

/// Creates the choose command
fn create_choose_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("choose")
        .description("Let Cutie pick for you")
        .create_option(|option| {
            option
                .name("options")
                .description("Choices separated by commas")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .to_owned()
}

/// Creates the reverse command
fn create_reverse_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("reverse")
        .description("Reverse some text")
        .create_option(|option| {
            option
                .name("text")
                .description("Text to reverse")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .to_owned()
}

/// Creates the poll command
fn create_poll_command() -> CreateApplicationCommand {
    let mut command = CreateApplicationCommand::default();
    command
        .name("poll")
        .description("Create a poll with up to five options")
        .create_option(|option| {
            option
                .name("question")
                .description("The poll question")
                .kind(CommandOptionType::String)
                .required(true)
        });

    for index in 1..=5 {
        command.create_option(|option| {
            option
                .name(format!("option{}", index))
                .description(format!("Option {}", index))
                .kind(CommandOptionType::String)
                .required(index <= 2)
        });
    }
    command
}

/// Creates the embed command
fn create_embed_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("embed")
        .description("Post a custom embed")
        .create_option(|option| {
            option
                .name("title")
                .description("Embed title")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("description")
                .description("Embed description")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("color")
                .description("Hex colour like #FFB6E1")
                .kind(CommandOptionType::String)
                .required(false)
        })
        .to_owned()
}
