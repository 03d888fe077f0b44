//! AI slash commands: /ask, /translate

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

/// Creates AI commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![create_ask_command(), create_translate_command()]
}

/// Creates the ask command
fn create_ask_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("ask")
        .description("Ask a question to the AI")
        .create_option(|option| {
            option
                .name("question")
                .description("What you want to ask Cutie")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .to_owned()
}

/// Creates the translate command
fn create_translate_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("translate")
        .description("Translate text to any language")
        .create_option(|option| {
            option
                .name("text")
                .description("Text to translate")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("language")
                .description("Target language (e.g. Japanese, Spanish)")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .to_owned()
}
