//! /roll, /coinflip, /8ball, /quote, /choose, /reverse, /poll, /embed

use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use rand::seq::IndexedRandom;
use rand::Rng;

use super::random_pastel;
use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandSpec, Invocation, SlashCommandHandler};
use crate::commands::input::CommandInput;
use crate::gateway::{
    truncate, Embed, Reply, EMBED_DESCRIPTION_LIMIT, EMBED_FIELD_LIMIT, EMBED_TITLE_LIMIT,
    MESSAGE_LIMIT,
};

const COMMANDS: &[CommandSpec] = &[
    CommandSpec::everyone("roll"),
    CommandSpec::everyone("coinflip"),
    CommandSpec::everyone("8ball"),
    CommandSpec::everyone("quote"),
    CommandSpec::everyone("choose"),
    CommandSpec::everyone("reverse"),
    CommandSpec::everyone("poll"),
    CommandSpec::everyone("embed"),
];

pub const DEFAULT_SIDES: i64 = 6;
pub const MIN_SIDES: i64 = 2;
pub const MAX_SIDES: i64 = 1000;

pub const POLL_REACTIONS: [&str; 5] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣"];


const EIGHT_BALL_ANSWERS: &[&str] = &[
    "It is certain. ✨",
    "It is decidedly so~",
    "Without a doubt! 💖",
    "Yes, definitely!",
    "You may rely on it.",
    "As I see it, yes.",
    "Most likely~",
    "Outlook good! 🌸",
    "Signs point to yes.",
    "Reply hazy, try again...",
    "Ask again later~",
    "Better not tell you now. 🤫",
    "Cannot predict now.",
    "Concentrate and ask again.",
    "Don't count on it.",
    "My reply is no.",
    "My sources say no...",
    "Outlook not so good. 😿",
    "Very doubtful.",
];

const QUOTES: &[(&str, &str)] = &[
    ("The only way to do great work is to love what you do.", "Steve Jobs"),
    ("Be yourself; everyone else is already taken.", "Oscar Wilde"),
    ("In the middle of difficulty lies opportunity.", "Albert Einstein"),
    ("It always seems impossible until it's done.", "Nelson Mandela"),
    ("Happiness depends upon ourselves.", "Aristotle"),
    ("Whatever you are, be a good one.", "Abraham Lincoln"),
    ("The best way out is always through.", "Robert Frost"),
    ("Stay hungry, stay foolish.", "Stewart Brand"),
];

pub fn roll_die<R: Rng + ?Sized>(rng: &mut R, sides: u32) -> u32 {
    rng.random_range(1..=sides.max(1))
}

/// Splits a comma separated list, dropping blanks. At least two are needed.
pub fn parse_choices(raw: &str) -> Result<Vec<String>, String> {
    let choices: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|choice| !choice.is_empty())
        .map(str::to_string)
        .collect();

    if choices.len() < 2 {
        return Err("Please give me at least two options separated by commas.".to_string());
    }
    Ok(choices)
}

/// Accepts `#RRGGBB` or `RRGGBB`.
pub fn parse_hex_colour(raw: &str) -> Result<u32, String> {
    let hex = raw.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("`{}` is not a hex colour like #FFB6E1.", raw.trim()));
    }
    u32::from_str_radix(hex, 16).map_err(|e| e.to_string())
}

/// The non-blank `option1..option5` values, in order.
pub fn poll_options(input: &CommandInput) -> Vec<String> {
    (1..=POLL_REACTIONS.len())
        .filter_map(|n| input.string(&format!("option{}", n)))
        .map(str::trim)
        .filter(|option| !option.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct FunHandler;

impl FunHandler {
    async fn roll(&self, call: &Invocation<'_>) -> Result<()> {
        let sides = call.input.integer("sides").unwrap_or(DEFAULT_SIDES);
        if !(MIN_SIDES..=MAX_SIDES).contains(&sides) {
            return call
                .reject(format!("A die needs between {} and {} sides.", MIN_SIDES, MAX_SIDES))
                .await;
        }
        let result = roll_die(&mut rand::rng(), sides as u32);

        call.reply(Reply::embed(
            Embed::new()
                .title("🎲 Dice Roll")
                .description(format!("You rolled a **{}**!", result))
                .field("Sides", sides.to_string(), true)
                .colour(random_pastel()),
        ))
        .await
    }

    async fn coinflip(&self, call: &Invocation<'_>) -> Result<()> {
        let heads = rand::rng().random_bool(0.5);
        let side = if heads { "Heads" } else { "Tails" };

        call.reply(Reply::embed(
            Embed::new()
                .title("🪙 Coin Flip")
                .description(format!("It landed on **{}**!", side))
                .colour(random_pastel()),
        ))
        .await
    }

    async fn eight_ball(&self, call: &Invocation<'_>) -> Result<()> {
        let Some(question) = call.input.string("question").map(str::trim).filter(|q| !q.is_empty()) else {
            return call.reject("Please ask me a question!").await;
        };
        let answer = EIGHT_BALL_ANSWERS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or("Ask again later~");

        call.reply(Reply::embed(
            Embed::new()
                .title("🎱 Magic 8-Ball")
                .field("Question", truncate(question, EMBED_FIELD_LIMIT), false)
                .field("Answer", answer, false)
                .colour(random_pastel()),
        ))
        .await
    }

    async fn quote(&self, call: &Invocation<'_>) -> Result<()> {
        let (text, author) = QUOTES
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(QUOTES[0]);

        call.reply(Reply::embed(
            Embed::new()
                .title("💭 Quote")
                .description(format!("*\"{}\"*\n\n- {}", text, author))
                .colour(random_pastel()),
        ))
        .await
    }

    async fn choose(&self, call: &Invocation<'_>) -> Result<()> {
        let choices = match parse_choices(call.input.string("options").unwrap_or_default()) {
            Ok(choices) => choices,
            Err(reason) => return call.reject(reason).await,
        };
        let picked = choices
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_default();

        call.reply(Reply::embed(
            Embed::new()
                .title("🤔 I choose...")
                .description(truncate(&format!("**{}**!", picked), EMBED_DESCRIPTION_LIMIT))
                .field("Options", truncate(&choices.join(", "), EMBED_FIELD_LIMIT), false)
                .colour(random_pastel()),
        ))
        .await
    }

    async fn reverse(&self, call: &Invocation<'_>) -> Result<()> {
        let text = call.input.string("text").unwrap_or_default();
        if text.trim().is_empty() {
            return call.reject("Please give me some text to reverse.").await;
        }
        let reversed: String = text.chars().rev().collect();
        call.reply(Reply::text(truncate(&format!("🔄 {}", reversed), MESSAGE_LIMIT)))
            .await
    }

    async fn poll(&self, call: &Invocation<'_>) -> Result<()> {
        let Some(question) = call.input.string("question").map(str::trim).filter(|q| !q.is_empty()) else {
            return call.reject("A poll needs a question.").await;
        };
        let options = poll_options(call.input);
        if options.len() < 2 {
            return call.reject("A poll needs at least two options.").await;
        }

        let body = options
            .iter()
            .zip(POLL_REACTIONS.iter())
            .map(|(option, emoji)| format!("{} {}", emoji, option))
            .collect::<Vec<_>>()
            .join("\n\n");

        call.reply(Reply::embed(
            Embed::new()
                .title(truncate(&format!("📊 {}", question), EMBED_TITLE_LIMIT))
                .description(truncate(&body, EMBED_DESCRIPTION_LIMIT))
                .footer(format!("Poll by {}", call.input.user.tag))
                .colour(random_pastel())
                .timestamp(),
        ))
        .await?;

        if let Err(e) = call
            .responder
            .react_to_reply(&POLL_REACTIONS[..options.len()])
            .await
        {
            warn!("Failed to add poll reactions: {}", e);
        }
        Ok(())
    }

    async fn embed(&self, call: &Invocation<'_>) -> Result<()> {
        let title = call.input.string("title").unwrap_or_default().trim();
        let description = call.input.string("description").unwrap_or_default().trim();
        if title.is_empty() || description.is_empty() {
            return call.reject("An embed needs a title and a description.").await;
        }
        if title.chars().count() > EMBED_TITLE_LIMIT {
            return call
                .reject(format!("Titles can be at most {} characters.", EMBED_TITLE_LIMIT))
                .await;
        }
        if description.chars().count() > EMBED_DESCRIPTION_LIMIT {
            return call
                .reject(format!(
                    "Descriptions can be at most {} characters.",
                    EMBED_DESCRIPTION_LIMIT
                ))
                .await;
        }

        let colour = match call.input.string("color") {
            Some(raw) => match parse_hex_colour(raw) {
                Ok(colour) => colour,
                Err(reason) => return call.reject(reason).await,
            },
            None => random_pastel(),
        };

        call.reply(Reply::embed(
            Embed::new()
                .title(title)
                .description(description)
                .footer(format!("Created by {}", call.input.user.tag))
                .colour(colour),
        ))
        .await
    }
}

#[async_trait]
impl SlashCommandHandler for FunHandler {
    fn commands(&self) -> &'static [CommandSpec] {
        COMMANDS
    }

    async fn handle(&self, _ctx: &CommandContext, call: &Invocation<'_>) -> Result<()> {
        match call.input.name.as_str() {
            "roll" => self.roll(call).await,
            "coinflip" => self.coinflip(call).await,
            "8ball" => self.eight_ball(call).await,
            "quote" => self.quote(call).await,
            "choose" => self.choose(call).await,
            "reverse" => self.reverse(call).await,
            "poll" => self.poll(call).await,
            "embed" => self.embed(call).await,
            _ => Ok(()),
        }
    }
}
