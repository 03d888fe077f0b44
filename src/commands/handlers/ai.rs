//! /ask and /translate. Both go through the single-flight AI gate: while one
//! generation is running, every other request is turned away with a busy
//! reply instead of being queued.

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, error, info, warn};

use super::random_pastel;
use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandSpec, Invocation, SlashCommandHandler};
use crate::error::CommandError;
use crate::gateway::{
    split_message, truncate, Embed, Reply, EMBED_FIELD_LIMIT, EMBED_TITLE_LIMIT, MESSAGE_LIMIT,
};
use crate::generation::{mention_creator, GenerationError, GenerationRequest, PromptMessage};
use crate::personas::{translation_prompt, Persona, DEFAULT_CREATOR_NAME};

const COMMANDS: &[CommandSpec] = &[
    CommandSpec::everyone("ask"),
    CommandSpec::everyone("translate"),
];

/// Answers longer than this go out as plain chunked messages instead of an embed.
pub const EMBED_ANSWER_LIMIT: usize = 4000;

pub const ASK_TEMPERATURE: f32 = 0.7;
pub const TRANSLATE_TEMPERATURE: f32 = 0.3;
pub const TRANSLATE_MAX_TOKENS: u64 = 1000;

pub struct AiHandler;

impl AiHandler {
    async fn creator_name(&self, ctx: &CommandContext, call: &Invocation<'_>) -> String {
        let Some(creator_id) = ctx.creator_id else {
            return DEFAULT_CREATOR_NAME.to_string();
        };
        match call.gateway.fetch_user(creator_id).await {
            Ok(user) => user.name,
            Err(e) => {
                debug!("Could not resolve creator {}: {}", creator_id, e);
                DEFAULT_CREATOR_NAME.to_string()
            }
        }
    }

    async fn report_failure(&self, call: &Invocation<'_>, err: GenerationError) -> Result<()> {
        let err = CommandError::from(err);
        match &err {
            CommandError::SafetyBlocked => warn!("/{} answer blocked by the content filter", call.input.name),
            _ => error!("/{} failed: {}", call.input.name, err),
        }
        call.responder
            .edit_reply(Reply::text(err.user_message()))
            .await
    }

    async fn ask(&self, ctx: &CommandContext, call: &Invocation<'_>) -> Result<()> {
        let Some(question) = call.input.string("question").map(str::trim).filter(|q| !q.is_empty()) else {
            return call.reject("Please provide a question after `/ask`.").await;
        };

        let Some(_permit) = ctx.ai_gate.try_acquire() else {
            info!("/ask from {} turned away, gate busy", call.input.user.tag);
            return call
                .reply(Reply::text(CommandError::Busy.user_message()).ephemeral())
                .await;
        };

        call.responder.defer().await?;

        let creator_name = self.creator_name(ctx, call).await;
        let request = GenerationRequest {
            messages: vec![
                PromptMessage::system(ctx.persona.system_prompt(ctx.short_responses, &creator_name)),
                PromptMessage::user(format!("Question: {}", question)),
            ],
            max_tokens: Persona::max_tokens(ctx.short_responses),
            temperature: ASK_TEMPERATURE,
        };

        let answer = match ctx.generator.generate(request).await {
            Ok(answer) => answer,
            Err(e) => return self.report_failure(call, e).await,
        };
        let answer = match ctx.creator_id {
            Some(creator_id) => mention_creator(&answer, &creator_name, &format!("<@{}>", creator_id)),
            None => answer,
        };

        if answer.chars().count() > EMBED_ANSWER_LIMIT {
            let mut chunks = split_message(&answer, MESSAGE_LIMIT).into_iter();
            if let Some(first) = chunks.next() {
                call.responder.edit_reply(Reply::text(first)).await?;
            }
            for chunk in chunks {
                call.responder.follow_up(Reply::text(chunk)).await?;
            }
            return Ok(());
        }

        call.responder
            .edit_reply(Reply::embed(
                Embed::new()
                    .title(format!("💖 Response from {}", ctx.persona.name))
                    .description(answer)
                    .field("Question", truncate(question, EMBED_FIELD_LIMIT), false)
                    .footer(format!("Asked by {}", call.input.user.tag))
                    .colour(random_pastel())
                    .timestamp(),
            ))
            .await
    }

    async fn translate(&self, ctx: &CommandContext, call: &Invocation<'_>) -> Result<()> {
        let text = call.input.string("text").map(str::trim).unwrap_or_default();
        let language = call.input.string("language").map(str::trim).unwrap_or_default();
        if text.is_empty() || language.is_empty() {
            return call.reject("Please give me the text and a target language.").await;
        }

        let Some(_permit) = ctx.ai_gate.try_acquire() else {
            info!("/translate from {} turned away, gate busy", call.input.user.tag);
            return call
                .reply(Reply::text(CommandError::Busy.user_message()).ephemeral())
                .await;
        };

        call.responder.defer().await?;

        let request = GenerationRequest {
            messages: vec![PromptMessage::user(translation_prompt(text, language))],
            max_tokens: TRANSLATE_MAX_TOKENS,
            temperature: TRANSLATE_TEMPERATURE,
        };

        let translation = match ctx.generator.generate(request).await {
            Ok(translation) => translation,
            Err(e) => return self.report_failure(call, e).await,
        };

        call.responder
            .edit_reply(Reply::embed(
                Embed::new()
                    .title("🌐 Translation")
                    .field("Original", truncate(text, EMBED_FIELD_LIMIT), false)
                    .field(
                        truncate(&format!("Translated to {}", language), EMBED_TITLE_LIMIT),
                        truncate(&translation, EMBED_FIELD_LIMIT),
                        false,
                    )
                    .colour(random_pastel()),
            ))
            .await
    }
}

#[async_trait]
impl SlashCommandHandler for AiHandler {
    fn commands(&self) -> &'static [CommandSpec] {
        COMMANDS
    }

    async fn handle(&self, ctx: &CommandContext, call: &Invocation<'_>) -> Result<()> {
        match call.input.name.as_str() {
            "ask" => self.ask(ctx, call).await,
            "translate" => self.translate(ctx, call).await,
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::fixtures::context_with;
    use crate::commands::input::fixtures::{input, user};
    use crate::commands::input::CommandInput;
    use crate::gateway::mock::{MockGateway, MockResponder, ResponderCall};
    use crate::generation::mock::MockGenerator;
    use crate::generation::PromptRole;
    use serenity::model::permissions::Permissions;
    use std::sync::Arc;

    fn ask(question: &str) -> CommandInput {
        input("ask", Permissions::empty()).with_str("question", question)
    }

    #[tokio::test]
    async fn test_ask_defers_then_edits_with_embed() {
        let generator = Arc::new(MockGenerator::replying("Rust is a language~ ✨"));
        let ctx = context_with(generator.clone()).await;
        let responder = MockResponder::new();
        let input = ask("What is Rust?");
        let call = Invocation {
            input: &input,
            responder: &responder,
            gateway: Arc::new(MockGateway::new()),
        };

        AiHandler.handle(&ctx, &call).await.unwrap();

        let calls = responder.calls();
        assert_eq!(calls[0], ResponderCall::Defer);
        assert!(matches!(calls[1], ResponderCall::Edit(_)));
        assert!(responder.last_text().contains("Response from Cutie"));
        assert!(responder.last_text().contains("Rust is a language~"));

        let requests = generator.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, 1000);
        assert_eq!(requests[0].temperature, ASK_TEMPERATURE);
        assert_eq!(requests[0].messages[0].role, PromptRole::System);
        assert!(requests[0].messages[0].content.contains(DEFAULT_CREATOR_NAME));
        assert_eq!(requests[0].messages[1].content, "Question: What is Rust?");
        drop(requests);
        assert!(!ctx.ai_gate.is_busy());
    }

    #[tokio::test]
    async fn test_ask_while_busy_never_calls_generator() {
        let generator = Arc::new(MockGenerator::replying("unused"));
        let ctx = context_with(generator.clone()).await;
        let responder = MockResponder::new();
        let input = ask("hello?");
        let call = Invocation {
            input: &input,
            responder: &responder,
            gateway: Arc::new(MockGateway::new()),
        };

        let held = ctx.ai_gate.try_acquire().unwrap();
        AiHandler.handle(&ctx, &call).await.unwrap();
        drop(held);

        assert_eq!(generator.calls(), 0);
        let reply = responder.last_reply().unwrap();
        assert!(reply.ephemeral);
        assert_eq!(reply.summary(), CommandError::Busy.user_message());
    }

    #[tokio::test]
    async fn test_safety_block_is_reported_and_gate_released() {
        let generator = Arc::new(MockGenerator::with_result(Err(GenerationError::SafetyBlocked)));
        let ctx = context_with(generator).await;
        let responder = MockResponder::new();
        let input = ask("something spicy");
        let call = Invocation {
            input: &input,
            responder: &responder,
            gateway: Arc::new(MockGateway::new()),
        };

        AiHandler.handle(&ctx, &call).await.unwrap();

        assert_eq!(
            responder.last_text(),
            CommandError::SafetyBlocked.user_message()
        );
        assert!(!ctx.ai_gate.is_busy());
    }

    #[tokio::test]
    async fn test_short_mode_and_creator_mention() {
        let generator = Arc::new(MockGenerator::replying("I was made by Hana, my favourite person."));
        let ctx = context_with(generator.clone())
            .await
            .with_creator(Some(4242))
            .with_short_responses(true);
        let responder = MockResponder::new();
        let input = ask("Who made you?");
        let call = Invocation {
            input: &input,
            responder: &responder,
            gateway: Arc::new(MockGateway::new().with_user(user(4242, "Hana"))),
        };

        AiHandler.handle(&ctx, &call).await.unwrap();

        let requests = generator.requests.lock().unwrap();
        assert_eq!(requests[0].max_tokens, 150);
        assert!(requests[0].messages[0].content.contains("Hana"));
        assert!(responder.last_text().contains("<@4242>"));
    }

    #[tokio::test]
    async fn test_long_answer_is_chunked() {
        let generator = Arc::new(MockGenerator::replying(&"a".repeat(4500)));
        let ctx = context_with(generator).await;
        let responder = MockResponder::new();
        let input = ask("Tell me everything");
        let call = Invocation {
            input: &input,
            responder: &responder,
            gateway: Arc::new(MockGateway::new()),
        };

        AiHandler.handle(&ctx, &call).await.unwrap();

        let calls = responder.calls();
        assert_eq!(calls.len(), 4);
        assert!(matches!(&calls[1], ResponderCall::Edit(reply) if reply.content.as_deref().map(str::len) == Some(2000)));
        assert!(matches!(calls[2], ResponderCall::FollowUp(_)));
        assert!(matches!(&calls[3], ResponderCall::FollowUp(reply) if reply.content.as_deref().map(str::len) == Some(500)));
    }

    #[tokio::test]
    async fn test_translate_uses_low_temperature() {
        let generator = Arc::new(MockGenerator::replying("Bonjour"));
        let ctx = context_with(generator.clone()).await;
        let responder = MockResponder::new();
        let input = input("translate", Permissions::empty())
            .with_str("text", "Hello")
            .with_str("language", "French");
        let call = Invocation {
            input: &input,
            responder: &responder,
            gateway: Arc::new(MockGateway::new()),
        };

        AiHandler.handle(&ctx, &call).await.unwrap();

        let requests = generator.requests.lock().unwrap();
        assert_eq!(requests[0].temperature, TRANSLATE_TEMPERATURE);
        assert_eq!(requests[0].messages.len(), 1);
        assert!(requests[0].messages[0].content.contains("to French"));
        assert!(responder.last_text().contains("Translated to French: Bonjour"));
    }

    #[tokio::test]
    async fn test_translate_field_name_fits_discord_limit() {
        let generator = Arc::new(MockGenerator::replying("..."));
        let ctx = context_with(generator).await;
        let responder = MockResponder::new();
        let language = "Klingon".repeat(60);
        let input = input("translate", Permissions::empty())
            .with_str("text", &"Hello ".repeat(300))
            .with_str("language", &language);
        let call = Invocation {
            input: &input,
            responder: &responder,
            gateway: Arc::new(MockGateway::new()),
        };

        AiHandler.handle(&ctx, &call).await.unwrap();

        let embed = responder.last_reply().and_then(|reply| reply.embed).unwrap();
        assert!(embed.fields[0].value.chars().count() <= EMBED_FIELD_LIMIT);
        assert_eq!(embed.fields[1].name.chars().count(), EMBED_TITLE_LIMIT);
    }
}
