//! /help, /ping, /profile, /avatar, /serverinfo, /userinfo, /roleinfo, /botinfo, /uptime

use anyhow::Result;
use async_trait::async_trait;
use std::time::Instant;

use super::{random_pastel, snowflake_timestamp, INFO_COLOUR};
use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandSpec, Invocation, SlashCommandHandler};
use crate::duration::format_duration;
use crate::gateway::{truncate, Embed, Reply, EMBED_FIELD_LIMIT};

const COMMANDS: &[CommandSpec] = &[
    CommandSpec::everyone("help"),
    CommandSpec::everyone("ping"),
    CommandSpec::everyone("profile"),
    CommandSpec::everyone("avatar"),
    CommandSpec::everyone("serverinfo"),
    CommandSpec::everyone("userinfo"),
    CommandSpec::everyone("roleinfo"),
    CommandSpec::everyone("botinfo"),
    CommandSpec::everyone("uptime"),
];

const HELP_SECTIONS: &[(&str, &str)] = &[
    ("🌸 General", "`/help` `/ping` `/profile` `/avatar` `/serverinfo` `/userinfo` `/roleinfo` `/botinfo` `/uptime`"),
    ("🎲 Fun", "`/roll` `/coinflip` `/8ball` `/quote` `/choose` `/reverse` `/poll` `/embed`"),
    ("💖 AI", "`/ask` `/translate`"),
    ("🛠️ Utility", "`/afk` `/remind` `/calculate` `/ascii`"),
    ("🛡️ Moderation", "`/ban` `/unban` `/kick` `/timeout` `/untimeout` `/warn` `/warnings` `/clearwarnings` `/clear` `/slowmode` `/lock` `/unlock` `/nickname` `/announce` `/modstats` `/bans`"),
    ("🎭 Roles", "`/addrole` `/removerole` `/createrole` `/deleterole` `/roles`"),
    ("👋 Welcome", "`/setwelcome` `/removewelcome` `/testwelcome` `/setgoodbye` `/removegoodbye` `/autorole` `/removeautorole`"),
    ("📜 Logging", "`/setlog` `/removelog`"),
];

pub struct GeneralHandler;

impl GeneralHandler {
    async fn help(&self, call: &Invocation<'_>) -> Result<()> {
        let embed = HELP_SECTIONS.iter().fold(
            Embed::new()
                .title("✨ Cutie's Commands")
                .description("Here's everything I can do~ (◕‿◕)♡")
                .colour(random_pastel()),
            |embed, (section, commands)| embed.field(*section, *commands, false),
        );
        call.reply(Reply::embed(embed.footer("Moderation commands need the matching permission")))
            .await
    }

    async fn ping(&self, call: &Invocation<'_>) -> Result<()> {
        let started = Instant::now();
        call.reply(Reply::text("🏓 Pinging...")).await?;
        let round_trip = started.elapsed().as_millis();

        call.responder
            .edit_reply(Reply::embed(
                Embed::new()
                    .title("🏓 Pong!")
                    .field("Round trip", format!("{}ms", round_trip), true)
                    .colour(random_pastel())
                    .timestamp(),
            ))
            .await
    }

    async fn profile(&self, call: &Invocation<'_>) -> Result<()> {
        let user = call.input.user_or_self("user");
        let mut embed = Embed::new()
            .title(format!("{}'s Profile", user.name))
            .thumbnail(&user.avatar_url)
            .field("Username", &user.tag, true)
            .field("ID", user.id.to_string(), true)
            .field("Account Created", format!("<t:{}:R>", user.created_at), true)
            .colour(random_pastel());

        if let Some(guild_id) = call.input.guild_id {
            if let Ok(member) = call.gateway.fetch_member(guild_id, user.id).await {
                if let Some(joined) = member.joined_at {
                    embed = embed.field("Joined Server", format!("<t:{}:R>", joined), true);
                }
                if let Some(nickname) = member.nickname {
                    embed = embed.field("Nickname", nickname, true);
                }
            }
        }

        call.reply(Reply::embed(embed)).await
    }

    async fn avatar(&self, call: &Invocation<'_>) -> Result<()> {
        let user = call.input.user_or_self("user");
        call.reply(Reply::embed(
            Embed::new()
                .title(format!("{}'s Avatar", user.name))
                .description(format!("[Open original]({})", user.avatar_url))
                .image(&user.avatar_url)
                .colour(random_pastel()),
        ))
        .await
    }

    async fn serverinfo(&self, call: &Invocation<'_>) -> Result<()> {
        let Some(guild_id) = call.require_guild().await? else {
            return Ok(());
        };
        let guild = match call.gateway.guild_overview(guild_id).await {
            Ok(guild) => guild,
            Err(e) => return call.upstream_failed("load server info", e).await,
        };

        let mut embed = Embed::new()
            .title(format!("📊 {}", guild.name))
            .field("Owner", format!("<@{}>", guild.owner_id), true)
            .field(
                "Members",
                guild
                    .member_count
                    .map(|count| count.to_string())
                    .unwrap_or_else(|| "Unknown".to_string()),
                true,
            )
            .field("Created", format!("<t:{}:R>", guild.created_at), true)
            .field("Channels", guild.channel_count.to_string(), true)
            .field("Roles", guild.role_count.to_string(), true)
            .field("Emojis", guild.emoji_count.to_string(), true)
            .footer(format!("Server ID: {}", guild.id))
            .colour(INFO_COLOUR);
        if let Some(icon) = guild.icon_url {
            embed = embed.thumbnail(icon);
        }

        call.reply(Reply::embed(embed)).await
    }

    async fn userinfo(&self, call: &Invocation<'_>) -> Result<()> {
        let Some(guild_id) = call.require_guild().await? else {
            return Ok(());
        };
        let user = call.input.user_or_self("user");

        let mut embed = Embed::new()
            .title(format!("👤 {}", user.tag))
            .thumbnail(&user.avatar_url)
            .field("ID", user.id.to_string(), true)
            .field("Bot", if user.bot { "Yes" } else { "No" }, true)
            .field("Account Created", format!("<t:{}:F>", user.created_at), false)
            .colour(INFO_COLOUR);

        match call.gateway.fetch_member(guild_id, user.id).await {
            Ok(member) => {
                if let Some(joined) = member.joined_at {
                    embed = embed.field("Joined Server", format!("<t:{}:F>", joined), false);
                }
                if let Some(nickname) = member.nickname {
                    embed = embed.field("Nickname", nickname, true);
                }
                if let Some(until) = member.timed_out_until {
                    embed = embed.field("Timed Out Until", format!("<t:{}:R>", until), true);
                }
                let roles = if member.roles.is_empty() {
                    "None".to_string()
                } else {
                    member
                        .roles
                        .iter()
                        .map(|role| format!("<@&{}>", role))
                        .collect::<Vec<_>>()
                        .join(" ")
                };
                embed = embed.field(
                    format!("Roles [{}]", member.roles.len()),
                    truncate(&roles, EMBED_FIELD_LIMIT),
                    false,
                );
            }
            Err(_) => embed = embed.footer("Not a member of this server"),
        }

        call.reply(Reply::embed(embed)).await
    }

    async fn roleinfo(&self, call: &Invocation<'_>) -> Result<()> {
        let Some(role) = call.input.role("role") else {
            return call.reject("Please choose a role.").await;
        };
        let yes_no = |flag: bool| if flag { "Yes" } else { "No" };

        call.reply(Reply::embed(
            Embed::new()
                .title(format!("🎭 {}", role.name))
                .field("ID", role.id.to_string(), true)
                .field("Colour", format!("#{:06X}", role.colour), true)
                .field("Position", role.position.to_string(), true)
                .field("Hoisted", yes_no(role.hoist), true)
                .field("Mentionable", yes_no(role.mentionable), true)
                .field("Managed", yes_no(role.managed), true)
                .field("Created", format!("<t:{}:R>", snowflake_timestamp(role.id)), false)
                .colour(if role.colour == 0 { INFO_COLOUR } else { role.colour }),
        ))
        .await
    }

    async fn botinfo(&self, ctx: &CommandContext, call: &Invocation<'_>) -> Result<()> {
        let bot = match call.gateway.bot_overview().await {
            Ok(bot) => bot,
            Err(e) => return call.upstream_failed("load bot info", e).await,
        };
        let uptime = format_duration(ctx.started_at.elapsed().as_millis() as u64);

        call.reply(Reply::embed(
            Embed::new()
                .title(format!("🤖 {}", bot.user.name))
                .description(ctx.persona.description.clone())
                .thumbnail(&bot.user.avatar_url)
                .field("Servers", bot.guild_count.to_string(), true)
                .field("Uptime", uptime, true)
                .field("Version", env!("CARGO_PKG_VERSION"), true)
                .field("Library", "serenity", true)
                .colour(random_pastel()),
        ))
        .await
    }

    async fn uptime(&self, ctx: &CommandContext, call: &Invocation<'_>) -> Result<()> {
        let uptime = format_duration(ctx.started_at.elapsed().as_millis() as u64);
        call.reply(Reply::embed(
            Embed::new()
                .title("⏱️ Uptime")
                .description(format!("I've been awake for **{}**~", uptime))
                .colour(random_pastel()),
        ))
        .await
    }
}

#[async_trait]
impl SlashCommandHandler for GeneralHandler {
    fn commands(&self) -> &'static [CommandSpec] {
        COMMANDS
    }

    async fn handle(&self, ctx: &CommandContext, call: &Invocation<'_>) -> Result<()> {
        match call.input.name.as_str() {
            "help" => self.help(call).await,
            "ping" => self.ping(call).await,
            "profile" => self.profile(call).await,
            "avatar" => self.avatar(call).await,
            "serverinfo" => self.serverinfo(call).await,
            "userinfo" => self.userinfo(call).await,
            "roleinfo" => self.roleinfo(call).await,
            "botinfo" => self.botinfo(ctx, call).await,
            "uptime" => self.uptime(ctx, call).await,
            _ => Ok(()),
        }
    }
}
