//! Moderation commands. Every mutation that succeeds is written to the
//! moderation log; refused or failed ones are not.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serenity::model::permissions::Permissions;

use super::{random_pastel, INFO_COLOUR, SUCCESS_COLOUR};
use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandSpec, Invocation, SlashCommandHandler};
use crate::database::WriteOutcome;
use crate::duration::{format_duration, parse_duration, DAY_MS, SECOND_MS};
use crate::gateway::{truncate, Embed, Reply, UserRef, EMBED_DESCRIPTION_LIMIT};
use crate::modlog::{self, tally, ActionRecord, ModAction};

const COMMANDS: &[CommandSpec] = &[
    CommandSpec::requires("ban", Permissions::BAN_MEMBERS),
    CommandSpec::requires("unban", Permissions::BAN_MEMBERS),
    CommandSpec::requires("kick", Permissions::KICK_MEMBERS),
    CommandSpec::requires("timeout", Permissions::MODERATE_MEMBERS),
    CommandSpec::requires("untimeout", Permissions::MODERATE_MEMBERS),
    CommandSpec::requires("warn", Permissions::MODERATE_MEMBERS),
    CommandSpec::requires("warnings", Permissions::MODERATE_MEMBERS),
    CommandSpec::requires("clearwarnings", Permissions::ADMINISTRATOR),
    CommandSpec::requires("clear", Permissions::MANAGE_MESSAGES),
    CommandSpec::requires("slowmode", Permissions::MANAGE_CHANNELS),
    CommandSpec::requires("lock", Permissions::MANAGE_CHANNELS),
    CommandSpec::requires("unlock", Permissions::MANAGE_CHANNELS),
    CommandSpec::requires("nickname", Permissions::MANAGE_NICKNAMES),
    CommandSpec::requires("announce", Permissions::MANAGE_MESSAGES),
    CommandSpec::requires("modstats", Permissions::MODERATE_MEMBERS),
    CommandSpec::requires("bans", Permissions::BAN_MEMBERS),
];

/// Discord refuses timeouts longer than this.
pub const MAX_TIMEOUT_MS: u64 = 28 * DAY_MS;
pub const MAX_PURGE: i64 = 100;
pub const MAX_SLOWMODE_SECS: i64 = 21_600;
pub const MAX_BAN_DELETE_DAYS: i64 = 7;
pub const MAX_NICKNAME_CHARS: usize = 32;

const WARNINGS_SHOWN: usize = 10;
const BANS_SHOWN: usize = 20;

pub struct ModerationHandler;

fn warning_time(created_at: &str) -> String {
    NaiveDateTime::parse_from_str(created_at, "%Y-%m-%d %H:%M:%S")
        .map(|at| format!("<t:{}:R>", at.and_utc().timestamp()))
        .unwrap_or_else(|_| created_at.to_string())
}

impl ModerationHandler {
    async fn target<'c>(&self, call: &'c Invocation<'_>, verb: &str) -> Result<Option<&'c UserRef>> {
        let Some(target) = call.input.user("user") else {
            call.reject("Please specify a member.").await?;
            return Ok(None);
        };
        if target.id == call.input.user.id {
            call.reject(format!("You can't {} yourself.", verb)).await?;
            return Ok(None);
        }
        Ok(Some(target))
    }

    #[allow(clippy::too_many_arguments)]
    async fn log(
        &self,
        ctx: &CommandContext,
        call: &Invocation<'_>,
        guild_id: u64,
        action: ModAction,
        target_id: u64,
        target_label: String,
        details: Option<String>,
    ) {
        modlog::record(
            &ctx.store,
            call.gateway.as_ref(),
            ActionRecord {
                guild_id,
                action,
                moderator: &call.input.user,
                target_id,
                target_label,
                reason: call.input.string("reason"),
                details,
            },
        )
        .await;
    }

    fn action_embed(&self, call: &Invocation<'_>, action: ModAction, target: String) -> Embed {
        Embed::new()
            .title(action.title())
            .field("Target", target, true)
            .field("Moderator", call.input.user.mention(), true)
            .field(
                "Reason",
                call.input.string("reason").unwrap_or("No reason provided"),
                false,
            )
            .colour(action.colour())
            .timestamp()
    }

    async fn ban(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let Some(target) = self.target(call, "ban").await? else {
            return Ok(());
        };
        let days = call.input.integer("delete_messages").unwrap_or(0);
        if !(0..=MAX_BAN_DELETE_DAYS).contains(&days) {
            return call
                .reject(format!("Message deletion must be between 0 and {} days.", MAX_BAN_DELETE_DAYS))
                .await;
        }

        if let Err(e) = call
            .gateway
            .ban(guild_id, target.id, days as u8, call.input.string("reason"))
            .await
        {
            return call.upstream_failed("ban", e).await;
        }

        self.log(ctx, call, guild_id, ModAction::Ban, target.id, target.mention(), None)
            .await;
        call.reply(Reply::embed(self.action_embed(call, ModAction::Ban, target.tag.clone())))
            .await
    }

    async fn unban(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let raw = call.input.string("user_id").unwrap_or_default().trim();
        let Ok(user_id) = raw.parse::<u64>() else {
            return call.reject(format!("`{}` is not a valid user ID.", raw)).await;
        };

        if let Err(e) = call.gateway.unban(guild_id, user_id, call.input.string("reason")).await {
            return call.upstream_failed("unban", e).await;
        }

        let label = format!("<@{}>", user_id);
        self.log(ctx, call, guild_id, ModAction::Unban, user_id, label.clone(), None)
            .await;
        call.reply(Reply::embed(self.action_embed(call, ModAction::Unban, label)))
            .await
    }

    async fn kick(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let Some(target) = self.target(call, "kick").await? else {
            return Ok(());
        };

        if let Err(e) = call.gateway.kick(guild_id, target.id, call.input.string("reason")).await {
            return call.upstream_failed("kick", e).await;
        }

        self.log(ctx, call, guild_id, ModAction::Kick, target.id, target.mention(), None)
            .await;
        call.reply(Reply::embed(self.action_embed(call, ModAction::Kick, target.tag.clone())))
            .await
    }

    async fn timeout(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let Some(target) = self.target(call, "time out").await? else {
            return Ok(());
        };
        let duration_ms = match parse_duration(call.input.string("duration").unwrap_or_default()) {
            Ok(ms) => ms,
            Err(e) => return call.reject(format!("{}.", e)).await,
        };
        if duration_ms == 0 {
            return call.reject("The timeout must be longer than zero.").await;
        }
        if duration_ms > MAX_TIMEOUT_MS {
            return call.reject("Timeouts can be at most 28 days.").await;
        }

        let until = Utc::now() + chrono::Duration::milliseconds(duration_ms as i64);
        if let Err(e) = call.gateway.set_timeout(guild_id, target.id, Some(until)).await {
            return call.upstream_failed("timeout", e).await;
        }

        let length = format_duration(duration_ms);
        self.log(
            ctx,
            call,
            guild_id,
            ModAction::Timeout,
            target.id,
            target.mention(),
            Some(format!("Duration: {}", length)),
        )
        .await;
        call.reply(Reply::embed(
            self.action_embed(call, ModAction::Timeout, target.tag.clone())
                .field("Duration", length, true)
                .field("Ends", format!("<t:{}:R>", until.timestamp()), true),
        ))
        .await
    }

    async fn untimeout(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let Some(target) = call.input.user("user") else {
            return call.reject("Please specify a member.").await;
        };

        if let Err(e) = call.gateway.set_timeout(guild_id, target.id, None).await {
            return call.upstream_failed("remove timeout", e).await;
        }

        self.log(ctx, call, guild_id, ModAction::Untimeout, target.id, target.mention(), None)
            .await;
        call.reply(Reply::embed(self.action_embed(call, ModAction::Untimeout, target.tag.clone())))
            .await
    }

    async fn warn(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let Some(target) = self.target(call, "warn").await? else {
            return Ok(());
        };
        let reason = call.input.string("reason").unwrap_or_default();

        let outcome = ctx
            .store
            .add_warning(guild_id, target.id, reason, call.input.user.id)
            .await;
        if let WriteOutcome::Rejected(why) = outcome {
            return call.reject(format!("Can't add that warning: {}.", why)).await;
        }

        let total = ctx.store.get_warnings(guild_id, target.id).await.len();
        self.log(
            ctx,
            call,
            guild_id,
            ModAction::Warn,
            target.id,
            target.mention(),
            Some(format!("Total warnings: {}", total)),
        )
        .await;
        call.reply(Reply::embed(
            self.action_embed(call, ModAction::Warn, target.tag.clone())
                .field("Total Warnings", total.to_string(), true),
        ))
        .await
    }

    async fn warnings(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let Some(target) = call.input.user("user") else {
            return call.reject("Please specify a member.").await;
        };
        let warnings = ctx.store.get_warnings(guild_id, target.id).await;

        if warnings.is_empty() {
            return call
                .reply(Reply::embed(
                    Embed::new()
                        .title(format!("⚠️ Warnings for {}", target.tag))
                        .description("No warnings. What a good member~ 🌸")
                        .colour(SUCCESS_COLOUR),
                ))
                .await;
        }

        let listing = warnings
            .iter()
            .take(WARNINGS_SHOWN)
            .map(|warning| {
                format!(
                    "**#{}** {}\nby <@{}> {}",
                    warning.id,
                    warning.reason,
                    warning.moderator_id,
                    warning_time(&warning.created_at)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut embed = Embed::new()
            .title(format!("⚠️ Warnings for {}", target.tag))
            .description(truncate(&listing, EMBED_DESCRIPTION_LIMIT))
            .field("Total", warnings.len().to_string(), true)
            .colour(0xF1C40F);
        if warnings.len() > WARNINGS_SHOWN {
            embed = embed.footer(format!("Showing the latest {}", WARNINGS_SHOWN));
        }
        call.reply(Reply::embed(embed)).await
    }

    async fn clearwarnings(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let Some(target) = call.input.user("user") else {
            return call.reject("Please specify a member.").await;
        };
        let cleared = ctx.store.get_warnings(guild_id, target.id).await.len();
        ctx.store.clear_warnings(guild_id, target.id).await;

        self.log(
            ctx,
            call,
            guild_id,
            ModAction::ClearWarnings,
            target.id,
            target.mention(),
            Some(format!("Cleared: {}", cleared)),
        )
        .await;
        call.reply(Reply::embed(
            Embed::new()
                .title(ModAction::ClearWarnings.title())
                .description(format!("Removed {} warning(s) from {}.", cleared, target.mention()))
                .colour(SUCCESS_COLOUR),
        ))
        .await
    }

    async fn clear(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let amount = call.input.integer("amount").unwrap_or(0);
        if !(1..=MAX_PURGE).contains(&amount) {
            return call
                .reject(format!("Amount must be between 1 and {}.", MAX_PURGE))
                .await;
        }
        let author = call.input.user("user").map(|user| user.id);
        let channel_id = call.input.channel_id;

        let deleted = match call
            .gateway
            .purge_messages(channel_id, amount as u64, author)
            .await
        {
            Ok(deleted) => deleted,
            Err(e) => return call.upstream_failed("clear messages", e).await,
        };

        self.log(
            ctx,
            call,
            guild_id,
            ModAction::Clear,
            channel_id,
            format!("<#{}>", channel_id),
            Some(format!("Deleted: {}", deleted)),
        )
        .await;
        call.reply(Reply::text(format!("🧹 Deleted {} message(s).", deleted)).ephemeral())
            .await
    }

    async fn slowmode(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let seconds = call.input.integer("duration").unwrap_or(0);
        if !(0..=MAX_SLOWMODE_SECS).contains(&seconds) {
            return call
                .reject(format!("Slowmode must be between 0 and {} seconds.", MAX_SLOWMODE_SECS))
                .await;
        }
        let channel_id = call.input.channel_id;

        if let Err(e) = call.gateway.set_slowmode(channel_id, seconds as u64).await {
            return call.upstream_failed("set slowmode", e).await;
        }

        let summary = if seconds == 0 {
            "Slowmode disabled.".to_string()
        } else {
            format!("Slowmode set to **{}**.", format_duration(seconds as u64 * SECOND_MS))
        };
        self.log(
            ctx,
            call,
            guild_id,
            ModAction::Slowmode,
            channel_id,
            format!("<#{}>", channel_id),
            Some(summary.clone()),
        )
        .await;
        call.reply(Reply::embed(
            Embed::new()
                .title(ModAction::Slowmode.title())
                .description(summary)
                .colour(INFO_COLOUR),
        ))
        .await
    }

    async fn set_locked(
        &self,
        ctx: &CommandContext,
        call: &Invocation<'_>,
        guild_id: u64,
        locked: bool,
    ) -> Result<()> {
        let channel_id = call.input.channel_id;
        let (action, verb) = if locked {
            (ModAction::Lock, "lock channel")
        } else {
            (ModAction::Unlock, "unlock channel")
        };

        if let Err(e) = call.gateway.set_channel_locked(guild_id, channel_id, locked).await {
            return call.upstream_failed(verb, e).await;
        }

        let label = format!("<#{}>", channel_id);
        self.log(ctx, call, guild_id, action, channel_id, label.clone(), None)
            .await;
        call.reply(Reply::embed(self.action_embed(call, action, label)))
            .await
    }

    async fn nickname(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let Some(target) = call.input.user("user") else {
            return call.reject("Please specify a member.").await;
        };
        let nickname = call
            .input
            .string("nickname")
            .map(str::trim)
            .filter(|nick| !nick.is_empty());
        if let Some(nick) = nickname {
            if nick.chars().count() > MAX_NICKNAME_CHARS {
                return call
                    .reject(format!("Nicknames can be at most {} characters.", MAX_NICKNAME_CHARS))
                    .await;
            }
        }

        if let Err(e) = call.gateway.set_nickname(guild_id, target.id, nickname).await {
            return call.upstream_failed("change nickname", e).await;
        }

        let details = match nickname {
            Some(nick) => format!("New nickname: {}", nick),
            None => "Nickname reset".to_string(),
        };
        self.log(
            ctx,
            call,
            guild_id,
            ModAction::Nickname,
            target.id,
            target.mention(),
            Some(details.clone()),
        )
        .await;
        call.reply(Reply::embed(
            Embed::new()
                .title(ModAction::Nickname.title())
                .description(format!("{}: {}", target.mention(), details))
                .colour(INFO_COLOUR),
        ))
        .await
    }

    async fn announce(&self, call: &Invocation<'_>) -> Result<()> {
        let Some(channel) = call.input.channel("channel") else {
            return call.reject("Please choose a channel.").await;
        };
        let message = call.input.string("message").map(str::trim).unwrap_or_default();
        if message.is_empty() {
            return call.reject("An announcement needs a message.").await;
        }
        if message.chars().count() > EMBED_DESCRIPTION_LIMIT {
            return call
                .reject(format!(
                    "Announcements can be at most {} characters.",
                    EMBED_DESCRIPTION_LIMIT
                ))
                .await;
        }

        let announcement = Reply {
            content: call
                .input
                .boolean("ping_everyone")
                .unwrap_or(false)
                .then(|| "@everyone".to_string()),
            ..Reply::embed(
                Embed::new()
                    .title("📢 Announcement")
                    .description(message)
                    .footer(format!("Announced by {}", call.input.user.tag))
                    .colour(random_pastel())
                    .timestamp(),
            )
        };

        if let Err(e) = call.gateway.send_message(channel.id, announcement).await {
            return call.upstream_failed("post announcement", e).await;
        }
        call.reply(Reply::text(format!("✅ Announcement posted in <#{}>.", channel.id)).ephemeral())
            .await
    }

    async fn modstats(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let entries = ctx.store.get_action_stats(guild_id).await;
        if entries.is_empty() {
            return call
                .reply(Reply::embed(
                    Embed::new()
                        .title("📈 Moderation Stats")
                        .description("No moderation actions recorded yet.")
                        .colour(INFO_COLOUR),
                ))
                .await;
        }

        let embed = tally(&entries).into_iter().fold(
            Embed::new()
                .title("📈 Moderation Stats")
                .description(format!("**{}** actions recorded", entries.len()))
                .colour(INFO_COLOUR),
            |embed, (action, count)| embed.field(action, count.to_string(), true),
        );
        call.reply(Reply::embed(embed)).await
    }

    async fn bans(&self, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let bans = match call.gateway.list_bans(guild_id).await {
            Ok(bans) => bans,
            Err(e) => return call.upstream_failed("list bans", e).await,
        };

        let description = if bans.is_empty() {
            "No banned users.".to_string()
        } else {
            let listing = bans
                .iter()
                .take(BANS_SHOWN)
                .map(|ban| {
                    format!(
                        "`{}` ({}) • {}",
                        ban.tag,
                        ban.user_id,
                        ban.reason.as_deref().unwrap_or("No reason provided")
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            truncate(&listing, EMBED_DESCRIPTION_LIMIT)
        };

        let mut embed = Embed::new()
            .title(format!("🔨 Banned Users ({})", bans.len()))
            .description(description)
            .colour(0xE74C3C);
        if bans.len() > BANS_SHOWN {
            embed = embed.footer(format!("Showing the first {}", BANS_SHOWN));
        }
        call.reply(Reply::embed(embed).ephemeral()).await
    }
}

#[async_trait]
impl SlashCommandHandler for ModerationHandler {
    fn commands(&self) -> &'static [CommandSpec] {
        COMMANDS
    }

    async fn handle(&self, ctx: &CommandContext, call: &Invocation<'_>) -> Result<()> {
        let Some(guild_id) = call.require_guild().await? else {
            return Ok(());
        };

        match call.input.name.as_str() {
            "ban" => self.ban(ctx, call, guild_id).await,
            "unban" => self.unban(ctx, call, guild_id).await,
            "kick" => self.kick(ctx, call, guild_id).await,
            "timeout" => self.timeout(ctx, call, guild_id).await,
            "untimeout" => self.untimeout(ctx, call, guild_id).await,
            "warn" => self.warn(ctx, call, guild_id).await,
            "warnings" => self.warnings(ctx, call, guild_id).await,
            "clearwarnings" => self.clearwarnings(ctx, call, guild_id).await,
            "clear" => self.clear(ctx, call, guild_id).await,
            "slowmode" => self.slowmode(ctx, call, guild_id).await,
            "lock" => self.set_locked(ctx, call, guild_id, true).await,
            "unlock" => self.set_locked(ctx, call, guild_id, false).await,
            "nickname" => self.nickname(ctx, call, guild_id).await,
            "announce" => self.announce(call).await,
            "modstats" => self.modstats(ctx, call, guild_id).await,
            "bans" => self.bans(call, guild_id).await,
            _ => Ok(()),
        }
    }
}
