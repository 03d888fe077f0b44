use anyhow::Result;
use log::{error, info, warn};
use sqlite::{Connection, State};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::CommandError;

/// Per-guild configuration. A `None` field means the feature is off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuildSettings {
    pub guild_id: u64,
    pub welcome_channel: Option<u64>,
    pub welcome_message: Option<String>,
    pub goodbye_channel: Option<u64>,
    pub goodbye_message: Option<String>,
    pub auto_role: Option<u64>,
    pub log_channel: Option<u64>,
    pub updated_at: Option<String>,
}

impl GuildSettings {
    pub fn welcome(&self) -> Option<(u64, &str)> {
        Some((self.welcome_channel?, self.welcome_message.as_deref()?))
    }

    pub fn goodbye(&self) -> Option<(u64, &str)> {
        Some((self.goodbye_channel?, self.goodbye_message.as_deref()?))
    }
}

/// A partial settings update. The outer `Option` is "touch this field", the
/// inner one is the new value (`None` clears it).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub welcome_channel: Option<Option<u64>>,
    pub welcome_message: Option<Option<String>>,
    pub goodbye_channel: Option<Option<u64>>,
    pub goodbye_message: Option<Option<String>>,
    pub auto_role: Option<Option<u64>>,
    pub log_channel: Option<Option<u64>>,
}

impl SettingsPatch {
    pub fn new() -> Self {
        SettingsPatch::default()
    }

    pub fn welcome(mut self, channel: Option<u64>, message: Option<String>) -> Self {
        self.welcome_channel = Some(channel);
        self.welcome_message = Some(message);
        self
    }

    pub fn goodbye(mut self, channel: Option<u64>, message: Option<String>) -> Self {
        self.goodbye_channel = Some(channel);
        self.goodbye_message = Some(message);
        self
    }

    pub fn welcome_channel(mut self, channel: Option<u64>) -> Self {
        self.welcome_channel = Some(channel);
        self
    }

    pub fn auto_role(mut self, role: Option<u64>) -> Self {
        self.auto_role = Some(role);
        self
    }

    pub fn log_channel(mut self, channel: Option<u64>) -> Self {
        self.log_channel = Some(channel);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments().is_empty()
    }

    fn assignments(&self) -> Vec<(&'static str, Option<String>)> {
        let id = |value: &Option<u64>| value.map(|v| v.to_string());
        let mut columns = Vec::new();

        if let Some(v) = &self.welcome_channel {
            columns.push(("welcome_channel", id(v)));
        }
        if let Some(v) = &self.welcome_message {
            columns.push(("welcome_message", v.clone()));
        }
        if let Some(v) = &self.goodbye_channel {
            columns.push(("goodbye_channel", id(v)));
        }
        if let Some(v) = &self.goodbye_message {
            columns.push(("goodbye_message", v.clone()));
        }
        if let Some(v) = &self.auto_role {
            columns.push(("auto_role", id(v)));
        }
        if let Some(v) = &self.log_channel {
            columns.push(("log_channel", id(v)));
        }
        columns
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub id: i64,
    pub guild_id: u64,
    pub user_id: u64,
    pub reason: String,
    pub moderator_id: u64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationLogEntry {
    pub id: i64,
    pub guild_id: u64,
    pub action: String,
    pub moderator_id: u64,
    pub target_id: u64,
    pub reason: Option<String>,
    pub created_at: String,
}

/// What happened to a store write.
///
/// Callers reply to the user regardless of the outcome; failures are already
/// logged by the time this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Committed,
    Dropped,
    Rejected(String),
}

impl WriteOutcome {
    fn from_result(operation: &str, result: Result<()>) -> Self {
        match result {
            Ok(()) => WriteOutcome::Committed,
            Err(e) => {
                let err = CommandError::Persistence(format!("{}: {}", operation, e));
                error!("💾 {}", err);
                WriteOutcome::Dropped
            }
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, WriteOutcome::Committed)
    }
}

#[derive(Clone)]
pub struct Database {
    connection: Arc<Mutex<Connection>>,
}

impl Database {
    pub async fn new(database_path: &str) -> Result<Self> {
        let connection = sqlite::open(database_path)?;
        let db = Database {
            connection: Arc::new(Mutex::new(connection)),
        };

        db.init_tables().await?;
        info!("Database initialized at: {}", database_path);
        Ok(db)
    }

    async fn init_tables(&self) -> Result<()> {
        let conn = self.connection.lock().await;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS guild_settings (
                guild_id TEXT PRIMARY KEY,
                welcome_channel TEXT,
                welcome_message TEXT,
                goodbye_channel TEXT,
                goodbye_message TEXT,
                auto_role TEXT,
                log_channel TEXT,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS warnings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                reason TEXT NOT NULL,
                moderator_id TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_warnings_member
             ON warnings(guild_id, user_id)",
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS mod_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id TEXT NOT NULL,
                action TEXT NOT NULL,
                moderator_id TEXT NOT NULL,
                target_id TEXT NOT NULL,
                reason TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_mod_logs_guild
             ON mod_logs(guild_id)",
        )?;

        Ok(())
    }

    // Guild Settings Methods

    /// Never fails: a missing row or a read error yields all-disabled settings.
    pub async fn get_settings(&self, guild_id: u64) -> GuildSettings {
        match self.read_settings(guild_id).await {
            Ok(Some(settings)) => settings,
            Ok(None) => GuildSettings {
                guild_id,
                ..GuildSettings::default()
            },
            Err(e) => {
                warn!("Failed to read settings for guild {}: {}", guild_id, e);
                GuildSettings {
                    guild_id,
                    ..GuildSettings::default()
                }
            }
        }
    }

    async fn read_settings(&self, guild_id: u64) -> Result<Option<GuildSettings>> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare(
            "SELECT welcome_channel, welcome_message, goodbye_channel, goodbye_message,
                    auto_role, log_channel, updated_at
             FROM guild_settings WHERE guild_id = ?",
        )?;
        statement.bind((1, guild_id.to_string().as_str()))?;

        if let State::Row = statement.next()? {
            Ok(Some(GuildSettings {
                guild_id,
                welcome_channel: parse_id(statement.read::<Option<String>, _>(0)?),
                welcome_message: statement.read::<Option<String>, _>(1)?,
                goodbye_channel: parse_id(statement.read::<Option<String>, _>(2)?),
                goodbye_message: statement.read::<Option<String>, _>(3)?,
                auto_role: parse_id(statement.read::<Option<String>, _>(4)?),
                log_channel: parse_id(statement.read::<Option<String>, _>(5)?),
                updated_at: statement.read::<Option<String>, _>(6)?,
            }))
        } else {
            Ok(None)
        }
    }

    /// Upserts only the fields named in `patch` and stamps `updated_at`.
    pub async fn update_settings(&self, guild_id: u64, patch: &SettingsPatch) -> WriteOutcome {
        let assignments = patch.assignments();
        if assignments.is_empty() {
            return WriteOutcome::Rejected("no settings to change".to_string());
        }

        let result = self.write_settings(guild_id, &assignments).await;
        WriteOutcome::from_result("update_settings", result)
    }

    async fn write_settings(
        &self,
        guild_id: u64,
        assignments: &[(&'static str, Option<String>)],
    ) -> Result<()> {
        let guild = guild_id.to_string();
        let conn = self.connection.lock().await;

        let mut insert = conn.prepare("INSERT OR IGNORE INTO guild_settings (guild_id) VALUES (?)")?;
        insert.bind((1, guild.as_str()))?;
        insert.next()?;

        let set_clause = assignments
            .iter()
            .map(|(column, _)| format!("{} = ?", column))
            .collect::<Vec<_>>()
            .join(", ");
        let mut update = conn.prepare(format!(
            "UPDATE guild_settings SET {}, updated_at = CURRENT_TIMESTAMP WHERE guild_id = ?",
            set_clause
        ))?;

        for (index, (_, value)) in assignments.iter().enumerate() {
            update.bind((index + 1, value.as_deref()))?;
        }
        update.bind((assignments.len() + 1, guild.as_str()))?;
        update.next()?;

        Ok(())
    }

    // Warning Methods

    pub async fn add_warning(
        &self,
        guild_id: u64,
        user_id: u64,
        reason: &str,
        moderator_id: u64,
    ) -> WriteOutcome {
        let reason = reason.trim();
        if reason.is_empty() {
            return WriteOutcome::Rejected("a warning needs a reason".to_string());
        }

        let result = self.insert_warning(guild_id, user_id, reason, moderator_id).await;
        WriteOutcome::from_result("add_warning", result)
    }

    async fn insert_warning(&self, guild_id: u64, user_id: u64, reason: &str, moderator_id: u64) -> Result<()> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare(
            "INSERT INTO warnings (guild_id, user_id, reason, moderator_id) VALUES (?, ?, ?, ?)",
        )?;
        statement.bind((1, guild_id.to_string().as_str()))?;
        statement.bind((2, user_id.to_string().as_str()))?;
        statement.bind((3, reason))?;
        statement.bind((4, moderator_id.to_string().as_str()))?;
        statement.next()?;
        Ok(())
    }

    /// Newest first. Read failures are logged and yield an empty list.
    pub async fn get_warnings(&self, guild_id: u64, user_id: u64) -> Vec<Warning> {
        self.read_warnings(guild_id, user_id).await.unwrap_or_else(|e| {
            warn!("Failed to read warnings for {} in {}: {}", user_id, guild_id, e);
            Vec::new()
        })
    }

    async fn read_warnings(&self, guild_id: u64, user_id: u64) -> Result<Vec<Warning>> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare(
            "SELECT id, reason, moderator_id, created_at FROM warnings
             WHERE guild_id = ? AND user_id = ?
             ORDER BY created_at DESC, id DESC",
        )?;
        statement.bind((1, guild_id.to_string().as_str()))?;
        statement.bind((2, user_id.to_string().as_str()))?;

        let mut warnings = Vec::new();
        while let State::Row = statement.next()? {
            warnings.push(Warning {
                id: statement.read::<i64, _>(0)?,
                guild_id,
                user_id,
                reason: statement.read::<String, _>(1)?,
                moderator_id: statement.read::<String, _>(2)?.parse().unwrap_or_default(),
                created_at: statement.read::<String, _>(3)?,
            });
        }
        Ok(warnings)
    }

    pub async fn clear_warnings(&self, guild_id: u64, user_id: u64) -> WriteOutcome {
        let result = self.delete_warnings(guild_id, user_id).await;
        WriteOutcome::from_result("clear_warnings", result)
    }

    async fn delete_warnings(&self, guild_id: u64, user_id: u64) -> Result<()> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare("DELETE FROM warnings WHERE guild_id = ? AND user_id = ?")?;
        statement.bind((1, guild_id.to_string().as_str()))?;
        statement.bind((2, user_id.to_string().as_str()))?;
        statement.next()?;
        Ok(())
    }

    // Moderation Log Methods

    pub async fn log_action(
        &self,
        guild_id: u64,
        action: &str,
        moderator_id: u64,
        target_id: u64,
        reason: Option<&str>,
    ) -> WriteOutcome {
        let result = self
            .insert_log(guild_id, action, moderator_id, target_id, reason)
            .await;
        WriteOutcome::from_result("log_action", result)
    }

    async fn insert_log(
        &self,
        guild_id: u64,
        action: &str,
        moderator_id: u64,
        target_id: u64,
        reason: Option<&str>,
    ) -> Result<()> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare(
            "INSERT INTO mod_logs (guild_id, action, moderator_id, target_id, reason)
             VALUES (?, ?, ?, ?, ?)",
        )?;
        statement.bind((1, guild_id.to_string().as_str()))?;
        statement.bind((2, action))?;
        statement.bind((3, moderator_id.to_string().as_str()))?;
        statement.bind((4, target_id.to_string().as_str()))?;
        statement.bind((5, reason))?;
        statement.next()?;
        Ok(())
    }

    /// Raw log rows for a guild, oldest first. Aggregation is up to the caller.
    pub async fn get_action_stats(&self, guild_id: u64) -> Vec<ModerationLogEntry> {
        self.read_log(guild_id).await.unwrap_or_else(|e| {
            warn!("Failed to read moderation log for guild {}: {}", guild_id, e);
            Vec::new()
        })
    }

    async fn read_log(&self, guild_id: u64) -> Result<Vec<ModerationLogEntry>> {
        let conn = self.connection.lock().await;
        let mut statement = conn.prepare(
            "SELECT id, action, moderator_id, target_id, reason, created_at FROM mod_logs
             WHERE guild_id = ? ORDER BY id",
        )?;
        statement.bind((1, guild_id.to_string().as_str()))?;

        let mut entries = Vec::new();
        while let State::Row = statement.next()? {
            entries.push(ModerationLogEntry {
                id: statement.read::<i64, _>(0)?,
                guild_id,
                action: statement.read::<String, _>(1)?,
                moderator_id: statement.read::<String, _>(2)?.parse().unwrap_or_default(),
                target_id: statement.read::<String, _>(3)?.parse().unwrap_or_default(),
                reason: statement.read::<Option<String>, _>(4)?,
                created_at: statement.read::<String, _>(5)?,
            });
        }
        Ok(entries)
    }
}

fn parse_id(value: Option<String>) -> Option<u64> {
    value.and_then(|v| v.parse().ok())
}
