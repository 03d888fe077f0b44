//! # Messaging Gateway
//!
//! Everything handlers need from Discord goes through two traits:
//! [`Responder`] for the interaction being answered and [`Gateway`] for guild
//! reads and moderation mutations. Handlers only ever see the plain data types
//! defined here, which keeps them testable without a live connection.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: false

pub mod discord;
#[cfg(test)]
pub mod mock;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hard limit on message content length.
pub const MESSAGE_LIMIT: usize = 2000;
/// Hard limit on an embed title and on a field name.
pub const EMBED_TITLE_LIMIT: usize = 256;
/// Hard limit on an embed description.
pub const EMBED_DESCRIPTION_LIMIT: usize = 4096;
/// Hard limit on a single embed field value.
pub const EMBED_FIELD_LIMIT: usize = 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub colour: Option<u32>,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub timestamp: bool,
}

impl Embed {
    pub fn new() -> Self {
        Embed::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn colour(mut self, colour: u32) -> Self {
        self.colour = Some(colour);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(url.into());
        self
    }

    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    pub fn timestamp(mut self) -> Self {
        self.timestamp = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub content: Option<String>,
    pub embed: Option<Embed>,
    pub ephemeral: bool,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Reply {
            content: Some(content.into()),
            ..Reply::default()
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Reply {
            embed: Some(embed),
            ..Reply::default()
        }
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    /// Text shown in logs and tests: content first, then the embed's
    /// title and description.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(content) = &self.content {
            parts.push(content.clone());
        }
        if let Some(embed) = &self.embed {
            parts.extend(embed.title.clone());
            parts.extend(embed.description.clone());
            for field in &embed.fields {
                parts.push(format!("{}: {}", field.name, field.value));
            }
        }
        parts.join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: u64,
    pub name: String,
    pub tag: String,
    pub avatar_url: String,
    pub bot: bool,
    /// Account creation, unix seconds.
    pub created_at: i64,
}

impl UserRef {
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    pub id: u64,
    pub name: String,
    pub colour: u32,
    pub position: i64,
    pub hoist: bool,
    pub mentionable: bool,
    pub managed: bool,
    pub permissions: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: u64,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub user_id: u64,
    pub nickname: Option<String>,
    /// Unix seconds.
    pub joined_at: Option<i64>,
    pub roles: Vec<u64>,
    pub timed_out_until: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildOverview {
    pub id: u64,
    pub name: String,
    pub owner_id: u64,
    pub member_count: Option<u64>,
    pub created_at: i64,
    pub channel_count: usize,
    pub role_count: usize,
    pub emoji_count: usize,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotOverview {
    pub user: UserRef,
    pub guild_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanEntry {
    pub user_id: u64,
    pub tag: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRole {
    pub name: String,
    pub colour: Option<u32>,
    pub hoist: bool,
    pub mentionable: bool,
}

/// Replies scoped to one interaction.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn reply(&self, reply: Reply) -> Result<()>;

    /// Acknowledges now and shows a "thinking" placeholder.
    async fn defer(&self) -> Result<()>;

    /// Replaces the placeholder or the first reply.
    async fn edit_reply(&self, reply: Reply) -> Result<()>;

    async fn follow_up(&self, reply: Reply) -> Result<()>;

    async fn react_to_reply(&self, emojis: &[&str]) -> Result<()>;
}

/// Guild reads and mutations.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn fetch_user(&self, user_id: u64) -> Result<UserRef>;
    async fn fetch_member(&self, guild_id: u64, user_id: u64) -> Result<MemberSummary>;
    async fn guild_overview(&self, guild_id: u64) -> Result<GuildOverview>;
    async fn guild_roles(&self, guild_id: u64) -> Result<Vec<RoleRef>>;
    async fn bot_overview(&self) -> Result<BotOverview>;
    async fn list_bans(&self, guild_id: u64) -> Result<Vec<BanEntry>>;

    async fn ban(
        &self,
        guild_id: u64,
        user_id: u64,
        delete_message_days: u8,
        reason: Option<&str>,
    ) -> Result<()>;
    async fn unban(&self, guild_id: u64, user_id: u64, reason: Option<&str>) -> Result<()>;
    async fn kick(&self, guild_id: u64, user_id: u64, reason: Option<&str>) -> Result<()>;

    /// `None` lifts an existing timeout.
    async fn set_timeout(
        &self,
        guild_id: u64,
        user_id: u64,
        until: Option<DateTime<Utc>>,
    ) -> Result<()>;

    /// `None` resets to the account name.
    async fn set_nickname(&self, guild_id: u64, user_id: u64, nickname: Option<&str>) -> Result<()>;

    async fn add_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
        reason: Option<&str>,
    ) -> Result<()>;
    async fn remove_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
        reason: Option<&str>,
    ) -> Result<()>;
    async fn create_role(&self, guild_id: u64, role: NewRole) -> Result<RoleRef>;
    async fn delete_role(&self, guild_id: u64, role_id: u64) -> Result<()>;

    /// Deletes up to `amount` recent messages, optionally only from `author`.
    /// Returns how many were removed.
    async fn purge_messages(&self, channel_id: u64, amount: u64, author: Option<u64>) -> Result<usize>;
    async fn set_slowmode(&self, channel_id: u64, seconds: u64) -> Result<()>;

    /// Denies or restores `SEND_MESSAGES` for `@everyone`.
    async fn set_channel_locked(&self, guild_id: u64, channel_id: u64, locked: bool) -> Result<()>;

    /// Returns the new message id.
    async fn send_message(&self, channel_id: u64, reply: Reply) -> Result<u64>;
    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<()>;
}

/// Splits text into pieces of at most `limit` characters, on char boundaries.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        if count == limit {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Cuts text down to `limit` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(limit.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_message_respects_limit() {
        let text = "a".repeat(4500);
        let chunks = split_message(&text, MESSAGE_LIMIT);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 2000);
        assert_eq!(chunks[2].len(), 500);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_split_message_keeps_multibyte_chars_whole() {
        let text = "💖".repeat(3);
        let chunks = split_message(&text, 2);
        assert_eq!(chunks, vec!["💖💖".to_string(), "💖".to_string()]);
        assert!(split_message("", 10).is_empty());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_reply_summary_includes_embed() {
        let reply = Reply::embed(
            Embed::new()
                .title("🎲 Dice Roll")
                .description("You rolled a **4**")
                .field("Sides", "6", true),
        )
        .ephemeral();

        assert!(reply.ephemeral);
        let summary = reply.summary();
        assert!(summary.contains("Dice Roll"));
        assert!(summary.contains("Sides: 6"));
    }
}
