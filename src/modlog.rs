//! # Feature: Moderation Log
//!
//! Every successful moderation action is appended to the store and, when the
//! guild has a log channel, echoed there as an embed.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: true (per guild, via `/setlog`)

use log::{info, warn};
use std::collections::HashMap;

use crate::database::{Database, ModerationLogEntry, WriteOutcome};
use crate::gateway::{Embed, Gateway, Reply, UserRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModAction {
    Ban,
    Unban,
    Kick,
    Timeout,
    Untimeout,
    Warn,
    ClearWarnings,
    Clear,
    Slowmode,
    Lock,
    Unlock,
    Nickname,
    AddRole,
    RemoveRole,
    CreateRole,
    DeleteRole,
}

impl ModAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModAction::Ban => "ban",
            ModAction::Unban => "unban",
            ModAction::Kick => "kick",
            ModAction::Timeout => "timeout",
            ModAction::Untimeout => "untimeout",
            ModAction::Warn => "warn",
            ModAction::ClearWarnings => "clearwarnings",
            ModAction::Clear => "clear",
            ModAction::Slowmode => "slowmode",
            ModAction::Lock => "lock",
            ModAction::Unlock => "unlock",
            ModAction::Nickname => "nickname",
            ModAction::AddRole => "addrole",
            ModAction::RemoveRole => "removerole",
            ModAction::CreateRole => "createrole",
            ModAction::DeleteRole => "deleterole",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ModAction::Ban => "🔨 Member Banned",
            ModAction::Unban => "🔓 Member Unbanned",
            ModAction::Kick => "👢 Member Kicked",
            ModAction::Timeout => "⏰ Member Timed Out",
            ModAction::Untimeout => "✅ Timeout Removed",
            ModAction::Warn => "⚠️ Member Warned",
            ModAction::ClearWarnings => "🧽 Warnings Cleared",
            ModAction::Clear => "🧹 Messages Cleared",
            ModAction::Slowmode => "🐢 Slowmode Changed",
            ModAction::Lock => "🔒 Channel Locked",
            ModAction::Unlock => "🔓 Channel Unlocked",
            ModAction::Nickname => "✏️ Nickname Changed",
            ModAction::AddRole => "➕ Role Added",
            ModAction::RemoveRole => "➖ Role Removed",
            ModAction::CreateRole => "✨ Role Created",
            ModAction::DeleteRole => "🗑️ Role Deleted",
        }
    }

    pub fn colour(&self) -> u32 {
        match self {
            ModAction::Ban | ModAction::Kick | ModAction::DeleteRole => 0xE74C3C,
            ModAction::Timeout | ModAction::Warn | ModAction::Lock => 0xF1C40F,
            ModAction::Unban | ModAction::Untimeout | ModAction::Unlock => 0x2ECC71,
            _ => 0x3498DB,
        }
    }
}

/// One action as it is shown in the log channel.
#[derive(Debug, Clone)]
pub struct ActionRecord<'a> {
    pub guild_id: u64,
    pub action: ModAction,
    pub moderator: &'a UserRef,
    pub target_id: u64,
    /// How the target is rendered, e.g. a user or channel mention.
    pub target_label: String,
    pub reason: Option<&'a str>,
    pub details: Option<String>,
}

impl ActionRecord<'_> {
    pub fn embed(&self) -> Embed {
        let mut embed = Embed::new()
            .title(self.action.title())
            .colour(self.action.colour())
            .field("Target", &self.target_label, true)
            .field("Moderator", self.moderator.mention(), true)
            .field("Reason", self.reason.unwrap_or("No reason provided"), false);
        if let Some(details) = &self.details {
            embed = embed.field("Details", details, false);
        }
        embed.footer(format!("Moderator ID: {}", self.moderator.id)).timestamp()
    }
}

/// Persists the action, then posts it to the log channel if one is set.
///
/// Neither step can fail the caller; problems are logged.
pub async fn record(store: &Database, gateway: &dyn Gateway, record: ActionRecord<'_>) -> WriteOutcome {
    let outcome = store
        .log_action(
            record.guild_id,
            record.action.as_str(),
            record.moderator.id,
            record.target_id,
            record.reason,
        )
        .await;

    info!(
        "🛡️ {} by {} on {} in guild {}",
        record.action.as_str(),
        record.moderator.tag,
        record.target_id,
        record.guild_id
    );

    let settings = store.get_settings(record.guild_id).await;
    if let Some(channel_id) = settings.log_channel {
        if let Err(e) = gateway.send_message(channel_id, Reply::embed(record.embed())).await {
            warn!("Failed to post to log channel {}: {}", channel_id, e);
        }
    }

    outcome
}

/// Counts log rows per action kind, most frequent first.
pub fn tally(entries: &[ModerationLogEntry]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entry in entries {
        *counts.entry(entry.action.as_str()).or_insert(0) += 1;
    }

    let mut tally: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(action, count)| (action.to_string(), count))
        .collect();
    tally.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    tally
}
