//! Slash command handler trait and infrastructure
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 1.0.0: Replaced per-command permission checks with declared requirements

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, error};
use serenity::model::permissions::Permissions;
use std::sync::Arc;

use super::context::CommandContext;
use super::input::CommandInput;
use crate::error::CommandError;
use crate::gateway::{Gateway, Reply, Responder};

/// What a member must hold to run a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Everyone,
    Permission(Permissions),
}

impl Requirement {
    pub fn is_met_by(&self, input: &CommandInput) -> bool {
        match self {
            Requirement::Everyone => true,
            Requirement::Permission(required) => input.has_permission(*required),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub requirement: Requirement,
}

impl CommandSpec {
    pub const fn everyone(name: &'static str) -> Self {
        CommandSpec {
            name,
            requirement: Requirement::Everyone,
        }
    }

    pub const fn requires(name: &'static str, permissions: Permissions) -> Self {
        CommandSpec {
            name,
            requirement: Requirement::Permission(permissions),
        }
    }
}

/// One command call as a handler sees it.
pub struct Invocation<'a> {
    pub input: &'a CommandInput,
    pub responder: &'a dyn Responder,
    pub gateway: Arc<dyn Gateway>,
}

impl Invocation<'_> {
    pub async fn reply(&self, reply: Reply) -> Result<()> {
        self.responder.reply(reply).await
    }

    /// Refuses bad input with an ephemeral message.
    pub async fn reject(&self, reason: impl Into<String>) -> Result<()> {
        let err = CommandError::Validation(reason.into());
        debug!("/{} rejected: {}", self.input.name, err);
        self.responder
            .reply(Reply::text(err.user_message()).ephemeral())
            .await
    }

    /// Logs a failed Discord call and tells the user it didn't work.
    pub async fn upstream_failed(&self, action: &str, cause: anyhow::Error) -> Result<()> {
        let err = CommandError::Upstream(format!("{}: {}", action, cause));
        error!("/{} failed: {}", self.input.name, err);
        self.responder
            .reply(Reply::text(err.user_message()).ephemeral())
            .await
    }

    /// The guild id, or an ephemeral refusal when used in a DM.
    pub async fn require_guild(&self) -> Result<Option<u64>> {
        match self.input.guild_id {
            Some(guild_id) => Ok(Some(guild_id)),
            None => {
                self.reject("This command can only be used in a server.").await?;
                Ok(None)
            }
        }
    }
}

/// Trait for slash command handlers
///
/// A handler can serve several commands if they share state or helpers. The
/// router checks each command's [`Requirement`] before `handle` is called.
#[async_trait]
pub trait SlashCommandHandler: Send + Sync {
    fn commands(&self) -> &'static [CommandSpec];

    async fn handle(&self, ctx: &CommandContext, call: &Invocation<'_>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::input::fixtures::input;

    fn _assert_object_safe(_: &dyn SlashCommandHandler) {}

    #[test]
    fn test_requirement_check() {
        let everyone = CommandSpec::everyone("ping");
        let ban = CommandSpec::requires("ban", Permissions::BAN_MEMBERS);

        let member = input("ban", Permissions::SEND_MESSAGES);
        assert!(everyone.requirement.is_met_by(&member));
        assert!(!ban.requirement.is_met_by(&member));

        let moderator = input("ban", Permissions::BAN_MEMBERS | Permissions::KICK_MEMBERS);
        assert!(ban.requirement.is_met_by(&moderator));
    }
}
