//! # Command Router
//!
//! Maps command names to handlers. Before a handler runs, the invoking
//! member's permissions are checked against the command's declared
//! [`Requirement`]; a failed check is answered privately and the handler is
//! never called. Any error a handler returns, or any panic it raises, is
//! caught here and turned into a generic apology, sent as an edit when the
//! interaction was already acknowledged and as a fresh reply otherwise.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false

use anyhow::Result;
use async_trait::async_trait;
use futures::FutureExt;
use log::{debug, error, info, warn};
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::commands::handler::{Invocation, Requirement, SlashCommandHandler};
use crate::commands::handlers::create_all_handlers;
use crate::commands::{CommandContext, CommandInput};
use crate::error::CommandError;
use crate::gateway::{Gateway, Reply, Responder};

pub const GENERIC_ERROR_MESSAGE: &str =
    "❌ Sorry, I encountered an error processing your command. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// No handler is registered under that name.
    Ignored,
    Denied,
    Completed,
    Failed,
}

struct Registration {
    requirement: Requirement,
    handler: Arc<dyn SlashCommandHandler>,
}

#[derive(Default)]
pub struct CommandRouter {
    entries: HashMap<&'static str, Registration>,
}

impl CommandRouter {
    pub fn new() -> Self {
        CommandRouter::default()
    }

    pub fn with_default_handlers() -> Self {
        let mut router = CommandRouter::new();
        for handler in create_all_handlers() {
            router.register(handler);
        }
        info!("🧭 {} commands routed", router.entries.len());
        router
    }

    pub fn register(&mut self, handler: Arc<dyn SlashCommandHandler>) {
        for spec in handler.commands() {
            let registration = Registration {
                requirement: spec.requirement,
                handler: handler.clone(),
            };
            if self.entries.insert(spec.name, registration).is_some() {
                warn!("Command /{} registered twice, keeping the latest", spec.name);
            }
        }
    }

    pub fn requirement(&self, name: &str) -> Option<Requirement> {
        self.entries.get(name).map(|entry| entry.requirement)
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.entries.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub async fn dispatch(
        &self,
        ctx: &CommandContext,
        input: &CommandInput,
        responder: &dyn Responder,
        gateway: Arc<dyn Gateway>,
    ) -> Dispatch {
        let Some(entry) = self.entries.get(input.name.as_str()) else {
            debug!("Ignoring unknown command /{}", input.name);
            return Dispatch::Ignored;
        };

        if !entry.requirement.is_met_by(input) {
            info!(
                "🚫 {} tried /{} without permission",
                input.user.tag, input.name
            );
            let denial = Reply::text(CommandError::PermissionDenied.user_message()).ephemeral();
            if let Err(e) = responder.reply(denial).await {
                error!("Failed to send permission denial: {}", e);
            }
            return Dispatch::Denied;
        }

        let tracked = TrackedResponder::new(responder);
        let call = Invocation {
            input,
            responder: &tracked,
            gateway,
        };

        let outcome = AssertUnwindSafe(entry.handler.handle(ctx, &call))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(())) => Dispatch::Completed,
            Ok(Err(e)) => {
                error!("Error handling slash command '/{}': {:?}", input.name, e);
                send_reply_or_edit(&tracked, Reply::text(GENERIC_ERROR_MESSAGE)).await;
                Dispatch::Failed
            }
            Err(panic) => {
                let err = CommandError::Internal(panic_message(panic.as_ref()));
                error!("Slash command '/{}' panicked: {}", input.name, err);
                send_reply_or_edit(&tracked, Reply::text(err.user_message())).await;
                Dispatch::Failed
            }
        }
    }
}

async fn send_reply_or_edit(tracked: &TrackedResponder<'_>, apology: Reply) {
    let sent = if tracked.acknowledged() {
        tracked.edit_reply(apology).await
    } else {
        tracked.reply(apology.ephemeral()).await
    };
    if let Err(why) = sent {
        error!("Failed to send error message: {}", why);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Remembers whether the interaction has been answered or deferred.
struct TrackedResponder<'a> {
    inner: &'a dyn Responder,
    acknowledged: AtomicBool,
}

impl<'a> TrackedResponder<'a> {
    fn new(inner: &'a dyn Responder) -> Self {
        TrackedResponder {
            inner,
            acknowledged: AtomicBool::new(false),
        }
    }

    fn acknowledged(&self) -> bool {
        self.acknowledged.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Responder for TrackedResponder<'_> {
    async fn reply(&self, reply: Reply) -> Result<()> {
        self.inner.reply(reply).await?;
        self.acknowledged.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn defer(&self) -> Result<()> {
        self.inner.defer().await?;
        self.acknowledged.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn edit_reply(&self, reply: Reply) -> Result<()> {
        self.inner.edit_reply(reply).await
    }

    async fn follow_up(&self, reply: Reply) -> Result<()> {
        self.inner.follow_up(reply).await
    }

    async fn react_to_reply(&self, emojis: &[&str]) -> Result<()> {
        self.inner.react_to_reply(emojis).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::fixtures::{context, context_with};
    use crate::commands::handler::CommandSpec;
    use crate::commands::input::fixtures::{input, user};
    use crate::commands::slash::{command_name, create_slash_commands};
    use crate::gateway::mock::{MockGateway, MockResponder, ResponderCall};
    use crate::generation::mock::MockGenerator;
    use anyhow::anyhow;
    use serenity::model::permissions::Permissions;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicUsize;

    /// Counts calls; optionally defers and then fails or panics.
    struct StubHandler {
        calls: AtomicUsize,
        defer_then_fail: bool,
        fail: bool,
        panic_after_defer: Option<bool>,
    }

    impl StubHandler {
        fn new() -> Self {
            StubHandler {
                calls: AtomicUsize::new(0),
                defer_then_fail: false,
                fail: false,
                panic_after_defer: None,
            }
        }
    }

    const STUB_COMMANDS: &[CommandSpec] = &[
        CommandSpec::everyone("stub"),
        CommandSpec::requires("guarded", Permissions::BAN_MEMBERS),
    ];

    #[async_trait]
    impl SlashCommandHandler for StubHandler {
        fn commands(&self) -> &'static [CommandSpec] {
            STUB_COMMANDS
        }

        async fn handle(&self, _ctx: &CommandContext, call: &Invocation<'_>) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.defer_then_fail {
                call.responder.defer().await?;
                return Err(anyhow!("boom after defer"));
            }
            if let Some(defer_first) = self.panic_after_defer {
                if defer_first {
                    call.responder.defer().await?;
                }
                let empty: Vec<u64> = Vec::new();
                let _ = empty[call.input.user.id as usize];
            }
            if self.fail {
                return Err(anyhow!("boom"));
            }
            call.reply(Reply::text("ok")).await
        }
    }

    fn router_with(stub: Arc<StubHandler>) -> CommandRouter {
        let mut router = CommandRouter::new();
        router.register(stub);
        router
    }

    #[tokio::test]
    async fn test_unknown_command_is_ignored() {
        let ctx = context().await;
        let router = router_with(Arc::new(StubHandler::new()));
        let responder = MockResponder::new();

        let outcome = router
            .dispatch(
                &ctx,
                &input("nope", Permissions::all()),
                &responder,
                Arc::new(MockGateway::new()),
            )
            .await;

        assert_eq!(outcome, Dispatch::Ignored);
        assert!(responder.calls().is_empty());
    }

    #[tokio::test]
    async fn test_denied_request_never_reaches_handler() {
        let ctx = context().await;
        let stub = Arc::new(StubHandler::new());
        let router = router_with(stub.clone());
        let responder = MockResponder::new();

        let outcome = router
            .dispatch(
                &ctx,
                &input("guarded", Permissions::SEND_MESSAGES),
                &responder,
                Arc::new(MockGateway::new()),
            )
            .await;

        assert_eq!(outcome, Dispatch::Denied);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
        let reply = responder.last_reply().unwrap();
        assert!(reply.ephemeral);
        assert_eq!(reply.summary(), CommandError::PermissionDenied.user_message());
    }

    #[tokio::test]
    async fn test_dm_invocation_fails_permission_check() {
        let ctx = context().await;
        let stub = Arc::new(StubHandler::new());
        let router = router_with(stub.clone());
        let responder = MockResponder::new();
        let mut dm = input("guarded", Permissions::all());
        dm.permissions = None;
        dm.guild_id = None;

        let outcome = router
            .dispatch(&ctx, &dm, &responder, Arc::new(MockGateway::new()))
            .await;

        assert_eq!(outcome, Dispatch::Denied);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_before_acknowledging_replies() {
        let ctx = context().await;
        let mut stub = StubHandler::new();
        stub.fail = true;
        let router = router_with(Arc::new(stub));
        let responder = MockResponder::new();

        let outcome = router
            .dispatch(
                &ctx,
                &input("stub", Permissions::empty()),
                &responder,
                Arc::new(MockGateway::new()),
            )
            .await;

        assert_eq!(outcome, Dispatch::Failed);
        assert_eq!(
            responder.calls(),
            vec![ResponderCall::Reply(Reply::text(GENERIC_ERROR_MESSAGE).ephemeral())]
        );
    }

    #[tokio::test]
    async fn test_failure_after_defer_edits_placeholder() {
        let ctx = context().await;
        let mut stub = StubHandler::new();
        stub.defer_then_fail = true;
        let router = router_with(Arc::new(stub));
        let responder = MockResponder::new();

        let outcome = router
            .dispatch(
                &ctx,
                &input("stub", Permissions::empty()),
                &responder,
                Arc::new(MockGateway::new()),
            )
            .await;

        assert_eq!(outcome, Dispatch::Failed);
        assert_eq!(
            responder.calls(),
            vec![
                ResponderCall::Defer,
                ResponderCall::Edit(Reply::text(GENERIC_ERROR_MESSAGE)),
            ]
        );
    }

    #[tokio::test]
    async fn test_panic_after_defer_edits_placeholder() {
        let ctx = context().await;
        let mut stub = StubHandler::new();
        stub.panic_after_defer = Some(true);
        let router = router_with(Arc::new(stub));
        let responder = MockResponder::new();

        let outcome = router
            .dispatch(
                &ctx,
                &input("stub", Permissions::empty()),
                &responder,
                Arc::new(MockGateway::new()),
            )
            .await;

        assert_eq!(outcome, Dispatch::Failed);
        assert_eq!(
            responder.calls(),
            vec![
                ResponderCall::Defer,
                ResponderCall::Edit(Reply::text(GENERIC_ERROR_MESSAGE)),
            ]
        );
    }

    #[tokio::test]
    async fn test_panic_before_acknowledging_replies() {
        let ctx = context().await;
        let mut stub = StubHandler::new();
        stub.panic_after_defer = Some(false);
        let router = router_with(Arc::new(stub));
        let responder = MockResponder::new();

        let outcome = router
            .dispatch(
                &ctx,
                &input("stub", Permissions::empty()),
                &responder,
                Arc::new(MockGateway::new()),
            )
            .await;

        assert_eq!(outcome, Dispatch::Failed);
        assert_eq!(
            responder.calls(),
            vec![ResponderCall::Reply(Reply::text(GENERIC_ERROR_MESSAGE).ephemeral())]
        );
    }

    #[test]
    fn test_panic_message_reads_str_and_string_payloads() {
        assert_eq!(panic_message(&"index out of bounds"), "index out of bounds");
        assert_eq!(panic_message(&"owned".to_string()), "owned");
        assert_eq!(panic_message(&42u8), "unknown panic");
    }

    #[tokio::test]
    async fn test_default_router_denies_ban_for_plain_member() {
        let ctx = context().await;
        let router = CommandRouter::with_default_handlers();
        let gateway = Arc::new(MockGateway::new());
        let responder = MockResponder::new();
        let ban = input("ban", Permissions::SEND_MESSAGES).with_user("user", user(20, "troll"));

        let outcome = router.dispatch(&ctx, &ban, &responder, gateway.clone()).await;

        assert_eq!(outcome, Dispatch::Denied);
        assert!(gateway.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_default_router_timeout_limit() {
        let ctx = context().await;
        let router = CommandRouter::with_default_handlers();
        let gateway = Arc::new(MockGateway::new());
        let responder = MockResponder::new();
        let timeout = input("timeout", Permissions::MODERATE_MEMBERS)
            .with_user("user", user(20, "troll"))
            .with_str("duration", "30d");

        let outcome = router.dispatch(&ctx, &timeout, &responder, gateway.clone()).await;

        assert_eq!(outcome, Dispatch::Completed);
        assert!(responder.last_text().starts_with("⚠️"));
        assert!(gateway.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_default_router_ask_while_busy() {
        let generator = Arc::new(MockGenerator::replying("hi"));
        let ctx = context_with(generator.clone()).await;
        let router = CommandRouter::with_default_handlers();
        let responder = MockResponder::new();
        let ask = input("ask", Permissions::empty()).with_str("question", "hello?");

        let _held = ctx.ai_gate.try_acquire().unwrap();
        router
            .dispatch(&ctx, &ask, &responder, Arc::new(MockGateway::new()))
            .await;

        assert_eq!(generator.calls(), 0);
        assert_eq!(responder.last_text(), CommandError::Busy.user_message());
    }

    #[test]
    fn test_every_schema_has_a_handler_with_matching_permissions() {
        let router = CommandRouter::with_default_handlers();
        let schemas = create_slash_commands();

        let schema_names: HashSet<String> = schemas.iter().map(command_name).collect();
        let routed: HashSet<String> = router
            .command_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        assert_eq!(schema_names, routed);

        for schema in &schemas {
            let name = command_name(schema);
            let declared = schema
                .0
                .get("default_member_permissions")
                .and_then(|value| value.as_str())
                .and_then(|bits| bits.parse::<u64>().ok());

            match router.requirement(&name) {
                Some(Requirement::Everyone) => assert_eq!(declared, None, "/{}", name),
                Some(Requirement::Permission(required)) => {
                    assert_eq!(declared, Some(required.bits()), "/{}", name)
                }
                None => panic!("/{} has no handler", name),
            }
        }
    }
}
