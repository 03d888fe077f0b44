use anyhow::Result;
use log::{debug, error, info};
use openai::set_key;
use serenity::async_trait;
use serenity::model::application::interaction::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::guild::Member;
use serenity::model::id::GuildId;
use serenity::model::user::User;
use serenity::prelude::*;
use std::sync::Arc;

use cutie::commands::{register_global_commands, register_guild_commands, CommandContext};
use cutie::config::Config;
use cutie::database::Database;
use cutie::events::{on_member_join, on_member_leave, relay_afk_notices};
use cutie::gateway::discord::{command_input, user_ref, DiscordGateway, DiscordResponder};
use cutie::gateway::Gateway;
use cutie::generation::OpenAiGenerator;
use cutie::router::CommandRouter;

struct Handler {
    context: Arc<CommandContext>,
    router: Arc<CommandRouter>,
    dev_guild_id: Option<u64>,
}

impl Handler {
    fn new(context: CommandContext, router: CommandRouter, dev_guild_id: Option<u64>) -> Self {
        Handler {
            context: Arc::new(context),
            router: Arc::new(router),
            dev_guild_id,
        }
    }

    fn gateway(&self, ctx: &Context) -> Arc<dyn Gateway> {
        Arc::new(DiscordGateway::new(ctx.http.clone(), ctx.cache.clone()))
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let mentioned: Vec<u64> = msg
            .mentions
            .iter()
            .filter(|user| !user.bot)
            .map(|user| user.id.0)
            .collect();
        let notices = self.context.afk.observe(msg.author.id.0, &mentioned);
        if notices.is_empty() {
            return;
        }

        relay_afk_notices(self.gateway(&ctx), msg.channel_id.0, notices).await;
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);
        info!("🌐 Gateway version: {}", ready.version);

        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }

        let registered = match self.dev_guild_id {
            Some(guild_id) => register_guild_commands(&ctx.http, GuildId(guild_id)).await,
            None => register_global_commands(&ctx.http).await,
        };
        match registered {
            Ok(()) => info!("✅ Slash commands registered"),
            Err(e) => error!("❌ Failed to register slash commands: {}", e),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::ApplicationCommand(command) => {
                let input = command_input(&command);
                let responder = DiscordResponder::new(ctx.http.clone(), command);
                let outcome = self
                    .router
                    .dispatch(&self.context, &input, &responder, self.gateway(&ctx))
                    .await;
                debug!("/{} by {}: {:?}", input.name, input.user.tag, outcome);
            }
            other => debug!("Ignoring interaction {:?}", other.kind()),
        }
    }

    async fn guild_member_addition(&self, ctx: Context, new_member: Member) {
        let user = user_ref(&new_member.user);
        on_member_join(
            &self.context.store,
            self.gateway(&ctx).as_ref(),
            new_member.guild_id.0,
            &user,
        )
        .await;
    }

    async fn guild_member_removal(
        &self,
        ctx: Context,
        guild_id: GuildId,
        user: User,
        _member_data_if_available: Option<Member>,
    ) {
        let user = user_ref(&user);
        on_member_leave(&self.context.store, self.gateway(&ctx).as_ref(), guild_id.0, &user).await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Cutie Discord Bot...");

    set_key(config.openai_api_key.clone());

    let database = Database::new(&config.database_path).await?;
    let generator = Arc::new(OpenAiGenerator::new(config.openai_model.clone()));
    let context = CommandContext::new(database, generator)
        .with_creator(config.creator_id)
        .with_short_responses(config.use_short_response);
    let router = CommandRouter::with_default_handlers();
    let handler = Handler::new(context, router, config.dev_guild_id);

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {}", e);
            error!("This could indicate:");
            error!("  - Invalid bot token format");
            error!("  - Network issues reaching Discord API");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");
    info!("Gateway intents: {:?}", intents);

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {:?}", why);
        error!("This could be due to:");
        error!("  - Invalid bot token");
        error!("  - Missing privileged intents (Server Members, Message Content)");
        error!("  - Discord API outage");
        return Err(anyhow::anyhow!("Failed to establish gateway connection: {}", why));
    }

    Ok(())
}
