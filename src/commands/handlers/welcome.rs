//! Welcome, goodbye and autorole settings.

use anyhow::Result;
use async_trait::async_trait;
use serenity::model::permissions::Permissions;

use super::SUCCESS_COLOUR;
use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandSpec, Invocation, SlashCommandHandler};
use crate::database::{SettingsPatch, WriteOutcome};
use crate::events::{
    render_template, welcome_reply, TemplateVars, DEFAULT_GOODBYE_MESSAGE, DEFAULT_WELCOME_MESSAGE,
};
use crate::gateway::{Embed, Reply, EMBED_DESCRIPTION_LIMIT};

const COMMANDS: &[CommandSpec] = &[
    CommandSpec::requires("setwelcome", Permissions::MANAGE_GUILD),
    CommandSpec::requires("removewelcome", Permissions::MANAGE_GUILD),
    CommandSpec::requires("testwelcome", Permissions::MANAGE_GUILD),
    CommandSpec::requires("setgoodbye", Permissions::MANAGE_GUILD),
    CommandSpec::requires("removegoodbye", Permissions::MANAGE_GUILD),
    CommandSpec::requires("autorole", Permissions::MANAGE_ROLES),
    CommandSpec::requires("removeautorole", Permissions::MANAGE_ROLES),
];

pub struct WelcomeHandler;

#[derive(Clone, Copy)]
enum Greeting {
    Welcome,
    Goodbye,
}

impl Greeting {
    fn default_message(self) -> &'static str {
        match self {
            Greeting::Welcome => DEFAULT_WELCOME_MESSAGE,
            Greeting::Goodbye => DEFAULT_GOODBYE_MESSAGE,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Greeting::Welcome => "Welcome",
            Greeting::Goodbye => "Goodbye",
        }
    }

    fn patch(self, channel: Option<u64>, message: Option<String>) -> SettingsPatch {
        match self {
            Greeting::Welcome => SettingsPatch::new().welcome(channel, message),
            Greeting::Goodbye => SettingsPatch::new().goodbye(channel, message),
        }
    }
}

impl WelcomeHandler {
    /// Saves the patch; only a rejected write stops the reply.
    async fn save(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64, patch: SettingsPatch) -> Result<bool> {
        if let WriteOutcome::Rejected(reason) = ctx.store.update_settings(guild_id, &patch).await {
            call.reject(format!("Couldn't save that: {}.", reason)).await?;
            return Ok(false);
        }
        Ok(true)
    }

    async fn set_greeting(
        &self,
        ctx: &CommandContext,
        call: &Invocation<'_>,
        guild_id: u64,
        greeting: Greeting,
    ) -> Result<()> {
        let Some(channel) = call.input.channel("channel") else {
            return call.reject("Please choose a channel.").await;
        };
        let message = call
            .input
            .string("message")
            .map(str::trim)
            .filter(|message| !message.is_empty())
            .unwrap_or(greeting.default_message());
        if message.chars().count() > EMBED_DESCRIPTION_LIMIT {
            return call
                .reject(format!("Messages can be at most {} characters.", EMBED_DESCRIPTION_LIMIT))
                .await;
        }

        let patch = greeting.patch(Some(channel.id), Some(message.to_string()));
        if !self.save(ctx, call, guild_id, patch).await? {
            return Ok(());
        }

        call.reply(Reply::embed(
            Embed::new()
                .title(format!("✅ {} Message Set", greeting.label()))
                .field("Channel", format!("<#{}>", channel.id), true)
                .field("Message", message, false)
                .colour(SUCCESS_COLOUR),
        ))
        .await
    }

    async fn remove_greeting(
        &self,
        ctx: &CommandContext,
        call: &Invocation<'_>,
        guild_id: u64,
        greeting: Greeting,
    ) -> Result<()> {
        if !self.save(ctx, call, guild_id, greeting.patch(None, None)).await? {
            return Ok(());
        }
        call.reply(Reply::text(format!(
            "✅ {} messages have been turned off.",
            greeting.label()
        )))
        .await
    }

    async fn testwelcome(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let settings = ctx.store.get_settings(guild_id).await;
        let Some((channel_id, template)) = settings.welcome() else {
            return call
                .reject("Welcome messages aren't set up yet. Use /setwelcome first.")
                .await;
        };

        let guild = match call.gateway.guild_overview(guild_id).await {
            Ok(guild) => guild,
            Err(e) => return call.upstream_failed("load server", e).await,
        };
        let text = render_template(
            template,
            &TemplateVars {
                user: &call.input.user,
                server: &guild.name,
                member_count: guild.member_count,
            },
        );

        if let Err(e) = call
            .gateway
            .send_message(channel_id, welcome_reply(text, &call.input.user))
            .await
        {
            return call.upstream_failed("send test welcome", e).await;
        }
        call.reply(Reply::text(format!("✅ Test welcome message sent to <#{}>.", channel_id)).ephemeral())
            .await
    }

    async fn autorole(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let Some(role) = call.input.role("role") else {
            return call.reject("Please choose a role.").await;
        };
        if role.managed {
            return call
                .reject("That role is managed by an integration and can't be assigned.")
                .await;
        }

        if !self
            .save(ctx, call, guild_id, SettingsPatch::new().auto_role(Some(role.id)))
            .await?
        {
            return Ok(());
        }
        call.reply(Reply::text(format!(
            "✅ New members will now get <@&{}>.",
            role.id
        )))
        .await
    }

    async fn removeautorole(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        if !self
            .save(ctx, call, guild_id, SettingsPatch::new().auto_role(None))
            .await?
        {
            return Ok(());
        }
        call.reply(Reply::text("✅ Autorole has been turned off.")).await
    }
}

#[async_trait]
impl SlashCommandHandler for WelcomeHandler {
    fn commands(&self) -> &'static [CommandSpec] {
        COMMANDS
    }

    async fn handle(&self, ctx: &CommandContext, call: &Invocation<'_>) -> Result<()> {
        let Some(guild_id) = call.require_guild().await? else {
            return Ok(());
        };

        match call.input.name.as_str() {
            "setwelcome" => self.set_greeting(ctx, call, guild_id, Greeting::Welcome).await,
            "removewelcome" => self.remove_greeting(ctx, call, guild_id, Greeting::Welcome).await,
            "testwelcome" => self.testwelcome(ctx, call, guild_id).await,
            "setgoodbye" => self.set_greeting(ctx, call, guild_id, Greeting::Goodbye).await,
            "removegoodbye" => self.remove_greeting(ctx, call, guild_id, Greeting::Goodbye).await,
            "autorole" => self.autorole(ctx, call, guild_id).await,
            "removeautorole" => self.removeautorole(ctx, call, guild_id).await,
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::fixtures::context;
    use crate::commands::input::fixtures::input;
    use crate::commands::input::{CommandInput, OptionValue};
    use crate::gateway::mock::{MockGateway, MockResponder};
    use crate::gateway::{ChannelRef, RoleRef};
    use std::sync::Arc;

    fn channel(id: u64) -> OptionValue {
        OptionValue::Channel(ChannelRef { id, name: None })
    }

    async fn run(ctx: &CommandContext, gateway: Arc<MockGateway>, input: CommandInput) -> MockResponder {
        let responder = MockResponder::new();
        let call = Invocation {
            input: &input,
            responder: &responder,
            gateway,
        };
        WelcomeHandler.handle(ctx, &call).await.unwrap();
        responder
    }

    #[tokio::test]
    async fn test_setwelcome_defaults_message_and_testwelcome_renders() {
        let ctx = context().await;
        let gateway = Arc::new(MockGateway::new());

        run(
            &ctx,
            gateway.clone(),
            input("setwelcome", Permissions::MANAGE_GUILD).with("channel", channel(42)),
        )
        .await;
        let settings = ctx.store.get_settings(500).await;
        assert_eq!(settings.welcome(), Some((42, DEFAULT_WELCOME_MESSAGE)));

        let responder = run(&ctx, gateway.clone(), input("testwelcome", Permissions::MANAGE_GUILD)).await;
        assert!(responder.last_reply().unwrap().ephemeral);

        let sent = gateway.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 42);
        assert!(sent[0].1.summary().contains("Welcome <@10> to **Test Server**! 🎉"));
    }

    #[tokio::test]
    async fn test_testwelcome_without_setup_is_refused() {
        let ctx = context().await;
        let gateway = Arc::new(MockGateway::new());
        let responder = run(&ctx, gateway.clone(), input("testwelcome", Permissions::MANAGE_GUILD)).await;

        assert!(responder.last_text().contains("/setwelcome"));
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn test_goodbye_set_and_remove() {
        let ctx = context().await;
        let gateway = Arc::new(MockGateway::new());

        run(
            &ctx,
            gateway.clone(),
            input("setgoodbye", Permissions::MANAGE_GUILD)
                .with("channel", channel(43))
                .with_str("message", "Bye {username}!"),
        )
        .await;
        assert_eq!(
            ctx.store.get_settings(500).await.goodbye(),
            Some((43, "Bye {username}!"))
        );

        run(&ctx, gateway, input("removegoodbye", Permissions::MANAGE_GUILD)).await;
        assert_eq!(ctx.store.get_settings(500).await.goodbye(), None);
    }

    #[tokio::test]
    async fn test_autorole_round_trip() {
        let ctx = context().await;
        let gateway = Arc::new(MockGateway::new());
        let role = RoleRef {
            id: 55,
            name: "Friends".to_string(),
            ..RoleRef::default()
        };

        run(
            &ctx,
            gateway.clone(),
            input("autorole", Permissions::MANAGE_ROLES).with("role", OptionValue::Role(role)),
        )
        .await;
        assert_eq!(ctx.store.get_settings(500).await.auto_role, Some(55));

        run(&ctx, gateway, input("removeautorole", Permissions::MANAGE_ROLES)).await;
        assert_eq!(ctx.store.get_settings(500).await.auto_role, None);
    }
}
