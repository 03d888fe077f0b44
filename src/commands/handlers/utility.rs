//! /afk, /remind, /calculate and /ascii

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use evalexpr::{
    eval_with_context, ContextWithMutableFunctions, ContextWithMutableVariables, EvalexprResult,
    Function, HashMapContext, Value,
};
use figlet_rs::FIGfont;
use log::{error, info};
use regex::{Captures, Regex};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::random_pastel;
use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandSpec, Invocation, SlashCommandHandler};
use crate::duration::{format_duration, parse_duration, DAY_MS};
use crate::gateway::{truncate, Embed, Gateway, Reply, EMBED_FIELD_LIMIT, MESSAGE_LIMIT};

const COMMANDS: &[CommandSpec] = &[
    CommandSpec::everyone("afk"),
    CommandSpec::everyone("remind"),
    CommandSpec::everyone("calculate"),
    CommandSpec::everyone("ascii"),
];

/// Reminders live in memory, so keep them short enough to plausibly survive.
pub const MAX_REMINDER_MS: u64 = 28 * DAY_MS;

pub const MAX_EXPRESSION_CHARS: usize = 200;
pub const MAX_ASCII_CHARS: usize = 20;

const UNARY_FUNCTIONS: &[(&str, fn(f64) -> f64)] = &[
    ("sqrt", f64::sqrt),
    ("cbrt", f64::cbrt),
    ("abs", f64::abs),
    ("floor", f64::floor),
    ("ceil", f64::ceil),
    ("round", f64::round),
    ("ln", f64::ln),
    ("log", f64::log10),
    ("exp", f64::exp),
    ("sin", f64::sin),
    ("cos", f64::cos),
    ("tan", f64::tan),
];

fn math_context() -> EvalexprResult<HashMapContext> {
    let mut context = HashMapContext::new();
    for (name, op) in UNARY_FUNCTIONS {
        let op = *op;
        context.set_function(
            name.to_string(),
            Function::new(move |argument| Ok(Value::Float(op(argument.as_number()?)))),
        )?;
    }
    context.set_value("pi".to_string(), Value::Float(std::f64::consts::PI))?;
    context.set_value("e".to_string(), Value::Float(std::f64::consts::E))?;
    Ok(context)
}

/// Evaluates an arithmetic expression. Integer literals are read as floats so
/// `7 / 2` is `3.5`, and `^` is exponentiation.
pub fn evaluate_expression(expression: &str) -> Result<f64, String> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err("Please give me an expression to calculate.".to_string());
    }
    if expression.chars().count() > MAX_EXPRESSION_CHARS {
        return Err(format!(
            "Expressions can be at most {} characters.",
            MAX_EXPRESSION_CHARS
        ));
    }

    let number_literal = Regex::new(r"\b\d+(?:\.\d+)?\b").map_err(|e| e.to_string())?;
    let floating = number_literal.replace_all(expression, |caps: &Captures| {
        let literal = &caps[0];
        if literal.contains('.') {
            literal.to_string()
        } else {
            format!("{}.0", literal)
        }
    });

    let context = math_context().map_err(|e| e.to_string())?;
    let value = eval_with_context(&floating, &context)
        .map_err(|_| "I couldn't understand that expression.".to_string())?;
    let number = match value {
        Value::Float(number) => number,
        Value::Int(number) => number as f64,
        _ => return Err("That expression doesn't give a number.".to_string()),
    };
    if !number.is_finite() {
        return Err("The result isn't a finite number.".to_string());
    }
    Ok(number)
}

/// Whole numbers print without a decimal point, everything else to at most
/// ten places.
pub fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        return format!("{}", number as i64);
    }
    let fixed = format!("{:.10}", number);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Renders text in the standard FIGlet font.
pub fn render_ascii(text: &str) -> Result<Option<String>> {
    let font = FIGfont::standard().map_err(|e| anyhow!("figlet font failed to load: {}", e))?;
    Ok(font.convert(text).map(|figure| figure.to_string()))
}

pub struct UtilityHandler;

/// Sleeps in the background, then pings the user in the channel they asked from.
fn schedule_reminder(gateway: Arc<dyn Gateway>, channel_id: u64, user_id: u64, delay_ms: u64, message: String) {
    tokio::spawn(async move {
        sleep(Duration::from_millis(delay_ms)).await;
        let reminder = Reply::text(format!("⏰ <@{}>, reminder: {}", user_id, message));
        if let Err(e) = gateway.send_message(channel_id, reminder).await {
            error!("Failed to deliver reminder to {}: {}", user_id, e);
        }
    });
}

impl UtilityHandler {
    async fn afk(&self, ctx: &CommandContext, call: &Invocation<'_>) -> Result<()> {
        let entry = ctx.afk.set(call.input.user.id, call.input.string("reason"));
        info!("💤 {} is now AFK", call.input.user.tag);

        call.reply(Reply::embed(
            Embed::new()
                .title("💤 AFK")
                .description(format!("{} is now AFK: {}", call.input.user.mention(), entry.reason))
                .colour(random_pastel()),
        ))
        .await
    }

    async fn remind(&self, call: &Invocation<'_>) -> Result<()> {
        let delay_ms = match parse_duration(call.input.string("time").unwrap_or_default()) {
            Ok(ms) => ms,
            Err(e) => return call.reject(format!("{}.", e)).await,
        };
        if delay_ms == 0 {
            return call.reject("The reminder time must be greater than zero.").await;
        }
        if delay_ms > MAX_REMINDER_MS {
            return call.reject("Reminders can be at most 28 days away.").await;
        }
        let message = call.input.string("message").map(str::trim).unwrap_or_default();
        if message.is_empty() {
            return call.reject("What should I remind you about?").await;
        }

        schedule_reminder(
            call.gateway.clone(),
            call.input.channel_id,
            call.input.user.id,
            delay_ms,
            message.to_string(),
        );

        call.reply(
            Reply::text(format!(
                "⏰ Got it! I'll remind you in **{}**: {}",
                format_duration(delay_ms),
                message
            ))
            .ephemeral(),
        )
        .await
    }

    async fn calculate(&self, call: &Invocation<'_>) -> Result<()> {
        let expression = call.input.string("expression").unwrap_or_default();
        let result = match evaluate_expression(expression) {
            Ok(result) => result,
            Err(reason) => return call.reject(reason).await,
        };

        call.reply(Reply::embed(
            Embed::new()
                .title("🧮 Calculator")
                .field(
                    "Expression",
                    truncate(&format!("`{}`", expression.trim()), EMBED_FIELD_LIMIT),
                    false,
                )
                .field("Result", format!("**{}**", format_number(result)), false)
                .colour(random_pastel()),
        ))
        .await
    }

    async fn ascii(&self, call: &Invocation<'_>) -> Result<()> {
        let text = call.input.string("text").map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return call.reject("Please give me some text to draw.").await;
        }
        if text.chars().count() > MAX_ASCII_CHARS {
            return call
                .reject(format!("ASCII art text can be at most {} characters.", MAX_ASCII_CHARS))
                .await;
        }
        if !text.is_ascii() {
            return call.reject("ASCII art only supports plain ASCII characters.").await;
        }

        let Some(art) = render_ascii(text)? else {
            return call.reject("I couldn't draw that text.").await;
        };
        let block = format!("```\n{}\n```", art.trim_end());
        if block.chars().count() > MESSAGE_LIMIT {
            return call.reject("That text is too wide to draw, try something shorter.").await;
        }
        call.reply(Reply::text(block)).await
    }
}

#[async_trait]
impl SlashCommandHandler for UtilityHandler {
    fn commands(&self) -> &'static [CommandSpec] {
        COMMANDS
    }

    async fn handle(&self, ctx: &CommandContext, call: &Invocation<'_>) -> Result<()> {
        match call.input.name.as_str() {
            "afk" => self.afk(ctx, call).await,
            "remind" => self.remind(call).await,
            "calculate" => self.calculate(call).await,
            "ascii" => self.ascii(call).await,
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::afk::DEFAULT_AFK_REASON;
    use crate::commands::context::fixtures::context;
    use crate::commands::input::fixtures::input;
    use crate::commands::input::CommandInput;
    use crate::gateway::mock::{MockGateway, MockResponder};
    use serenity::model::permissions::Permissions;

    #[tokio::test]
    async fn test_afk_defaults_reason() {
        let ctx = context().await;
        let responder = MockResponder::new();
        let input = input("afk", Permissions::empty());
        let call = Invocation {
            input: &input,
            responder: &responder,
            gateway: Arc::new(MockGateway::new()),
        };

        UtilityHandler.handle(&ctx, &call).await.unwrap();

        assert_eq!(ctx.afk.get(10).unwrap().reason, DEFAULT_AFK_REASON);
        assert!(responder.last_text().contains("<@10> is now AFK: AFK"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remind_delivers_after_delay() {
        let ctx = context().await;
        let responder = MockResponder::new();
        let gateway = Arc::new(MockGateway::new());
        let input = input("remind", Permissions::empty())
            .with_str("time", "10m")
            .with_str("message", "stretch");
        let call = Invocation {
            input: &input,
            responder: &responder,
            gateway: gateway.clone(),
        };

        UtilityHandler.handle(&ctx, &call).await.unwrap();
        assert!(responder.last_text().contains("remind you in **10m**"));
        assert!(gateway.sent().is_empty());

        sleep(Duration::from_secs(601)).await;
        let sent = gateway.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 600);
        assert_eq!(sent[0].1.summary(), "⏰ <@10>, reminder: stretch");
    }

    #[tokio::test]
    async fn test_remind_rejects_bad_time() {
        let ctx = context().await;
        for time in ["soon", "0m", "29d"] {
            let responder = MockResponder::new();
            let input = input("remind", Permissions::empty())
                .with_str("time", time)
                .with_str("message", "stretch");
            let call = Invocation {
                input: &input,
                responder: &responder,
                gateway: Arc::new(MockGateway::new()),
            };

            UtilityHandler.handle(&ctx, &call).await.unwrap();
            assert!(responder.last_reply().unwrap().ephemeral, "{} accepted", time);
            assert!(responder.last_text().starts_with("⚠️"));
        }
    }

    async fn run(input: CommandInput) -> MockResponder {
        let ctx = context().await;
        let responder = MockResponder::new();
        let call = Invocation {
            input: &input,
            responder: &responder,
            gateway: Arc::new(MockGateway::new()),
        };
        UtilityHandler.handle(&ctx, &call).await.unwrap();
        responder
    }

    #[test]
    fn test_evaluate_expression() {
        assert_eq!(evaluate_expression("2+2"), Ok(4.0));
        assert_eq!(evaluate_expression("10*5"), Ok(50.0));
        assert_eq!(evaluate_expression("sqrt(16)"), Ok(4.0));
        assert_eq!(evaluate_expression("7 / 2"), Ok(3.5));
        assert_eq!(evaluate_expression("2 ^ 10"), Ok(1024.0));
        assert_eq!(evaluate_expression("(1.5 + 0.5) * 3"), Ok(6.0));
        assert_eq!(evaluate_expression("abs(-3)"), Ok(3.0));
    }

    #[test]
    fn test_evaluate_expression_rejects_nonsense() {
        assert!(evaluate_expression("").is_err());
        assert!(evaluate_expression("2 +").is_err());
        assert!(evaluate_expression("1 / 0").is_err());
        assert!(evaluate_expression("\"text\"").is_err());
        assert!(evaluate_expression("x = 5").is_err());
        assert!(evaluate_expression(&"1+".repeat(150)).is_err());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(4.0), "4");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(1.0 / 3.0), "0.3333333333");
    }

    #[tokio::test]
    async fn test_calculate_replies_with_result() {
        let responder =
            run(input("calculate", Permissions::empty()).with_str("expression", "sqrt(16) + 1")).await;

        let text = responder.last_text();
        assert!(text.contains("Result: **5**"), "{}", text);
        assert!(!responder.last_reply().unwrap().ephemeral);
    }

    #[tokio::test]
    async fn test_calculate_rejects_invalid_expression() {
        let responder =
            run(input("calculate", Permissions::empty()).with_str("expression", "(2 + 3")).await;

        let reply = responder.last_reply().unwrap();
        assert!(reply.ephemeral);
        assert!(reply.summary().contains("couldn't understand"));
    }

    #[test]
    fn test_render_ascii_draws_multiple_lines() {
        let art = render_ascii("Hi").unwrap().unwrap();
        assert!(art.lines().count() > 1);
        assert!(art.contains('|'));
    }

    #[tokio::test]
    async fn test_ascii_wraps_art_in_code_block() {
        let responder = run(input("ascii", Permissions::empty()).with_str("text", "Cutie")).await;

        let text = responder.last_text();
        assert!(text.starts_with("```\n"));
        assert!(text.ends_with("\n```"));
        assert!(text.chars().count() <= MESSAGE_LIMIT);
    }

    #[tokio::test]
    async fn test_ascii_rejects_long_or_unicode_text() {
        for text in ["a".repeat(MAX_ASCII_CHARS + 1), "héllo".to_string(), "   ".to_string()] {
            let responder = run(input("ascii", Permissions::empty()).with_str("text", &text)).await;
            assert!(responder.last_reply().unwrap().ephemeral, "{:?} accepted", text);
        }
    }
}
