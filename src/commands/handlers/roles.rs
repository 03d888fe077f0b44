//! /addrole, /removerole, /createrole, /deleterole, /roles

use anyhow::Result;
use async_trait::async_trait;
use serenity::model::permissions::Permissions;

use super::{parse_hex_colour, random_pastel, INFO_COLOUR, SUCCESS_COLOUR};
use crate::commands::context::CommandContext;
use crate::commands::handler::{CommandSpec, Invocation, SlashCommandHandler};
use crate::gateway::{truncate, Embed, NewRole, Reply, RoleRef, EMBED_DESCRIPTION_LIMIT};
use crate::modlog::{self, ActionRecord, ModAction};

const COMMANDS: &[CommandSpec] = &[
    CommandSpec::requires("addrole", Permissions::MANAGE_ROLES),
    CommandSpec::requires("removerole", Permissions::MANAGE_ROLES),
    CommandSpec::requires("createrole", Permissions::MANAGE_ROLES),
    CommandSpec::requires("deleterole", Permissions::MANAGE_ROLES),
    CommandSpec::everyone("roles"),
];

pub const MAX_ROLE_NAME_CHARS: usize = 100;

pub struct RolesHandler;

/// Position of the highest role in `held`; members with none sit at 0 like @everyone.
pub fn highest_position(roles: &[RoleRef], held: &[u64]) -> i64 {
    roles
        .iter()
        .filter(|role| held.contains(&role.id))
        .map(|role| role.position)
        .max()
        .unwrap_or(0)
}

fn mention_list(role_ids: impl Iterator<Item = u64>) -> String {
    let mentions: Vec<String> = role_ids.map(|id| format!("<@&{}>", id)).collect();
    if mentions.is_empty() {
        "None".to_string()
    } else {
        truncate(&mentions.join(" "), EMBED_DESCRIPTION_LIMIT)
    }
}

impl RolesHandler {
    /// The chosen role, provided it is not managed by an integration and sits
    /// below the invoker's highest role. Refusals are answered here.
    async fn manageable_role<'c>(
        &self,
        call: &'c Invocation<'_>,
        guild_id: u64,
    ) -> Result<Option<&'c RoleRef>> {
        let Some(role) = call.input.role("role") else {
            call.reject("Please choose a role.").await?;
            return Ok(None);
        };
        if role.managed {
            call.reject("That role is managed by an integration and can't be changed.")
                .await?;
            return Ok(None);
        }
        match self.outranks(call, guild_id, role).await {
            Ok(true) => Ok(Some(role)),
            Ok(false) => {
                call.reject("You can only manage roles below your highest role.")
                    .await?;
                Ok(None)
            }
            Err(e) => {
                call.upstream_failed("check role hierarchy", e).await?;
                Ok(None)
            }
        }
    }

    /// The guild owner outranks every role; anyone else needs a higher one.
    async fn outranks(&self, call: &Invocation<'_>, guild_id: u64, role: &RoleRef) -> Result<bool> {
        let invoker = call.input.user.id;
        let guild = call.gateway.guild_overview(guild_id).await?;
        if guild.owner_id == invoker {
            return Ok(true);
        }

        let member = call.gateway.fetch_member(guild_id, invoker).await?;
        let roles = call.gateway.guild_roles(guild_id).await?;
        let highest = highest_position(&roles, &member.roles);
        Ok(role.position < highest)
    }

    async fn change_member_role(
        &self,
        ctx: &CommandContext,
        call: &Invocation<'_>,
        guild_id: u64,
        add: bool,
    ) -> Result<()> {
        let Some(target) = call.input.user("user") else {
            return call.reject("Please specify a member.").await;
        };
        let Some(role) = self.manageable_role(call, guild_id).await? else {
            return Ok(());
        };
        let reason = call.input.string("reason");

        let (action, result) = if add {
            (
                ModAction::AddRole,
                call.gateway.add_role(guild_id, target.id, role.id, reason).await,
            )
        } else {
            (
                ModAction::RemoveRole,
                call.gateway.remove_role(guild_id, target.id, role.id, reason).await,
            )
        };
        if let Err(e) = result {
            return call.upstream_failed(action.as_str(), e).await;
        }

        modlog::record(
            &ctx.store,
            call.gateway.as_ref(),
            ActionRecord {
                guild_id,
                action,
                moderator: &call.input.user,
                target_id: target.id,
                target_label: target.mention(),
                reason,
                details: Some(format!("Role: <@&{}>", role.id)),
            },
        )
        .await;

        let verb = if add { "Gave" } else { "Removed" };
        let preposition = if add { "to" } else { "from" };
        call.reply(Reply::embed(
            Embed::new()
                .title(action.title())
                .description(format!(
                    "{} <@&{}> {} {}.",
                    verb,
                    role.id,
                    preposition,
                    target.mention()
                ))
                .colour(SUCCESS_COLOUR),
        ))
        .await
    }

    async fn createrole(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let name = call.input.string("name").map(str::trim).unwrap_or_default();
        if name.is_empty() || name.chars().count() > MAX_ROLE_NAME_CHARS {
            return call
                .reject(format!("Role names must be 1 to {} characters.", MAX_ROLE_NAME_CHARS))
                .await;
        }
        let colour = match call.input.string("color").map(parse_hex_colour) {
            Some(Ok(colour)) => Some(colour),
            Some(Err(reason)) => return call.reject(reason).await,
            None => None,
        };

        let role = NewRole {
            name: name.to_string(),
            colour,
            hoist: call.input.boolean("hoist").unwrap_or(false),
            mentionable: call.input.boolean("mentionable").unwrap_or(false),
        };
        let created = match call.gateway.create_role(guild_id, role).await {
            Ok(created) => created,
            Err(e) => return call.upstream_failed("create role", e).await,
        };

        modlog::record(
            &ctx.store,
            call.gateway.as_ref(),
            ActionRecord {
                guild_id,
                action: ModAction::CreateRole,
                moderator: &call.input.user,
                target_id: created.id,
                target_label: format!("<@&{}>", created.id),
                reason: None,
                details: Some(format!("Name: {}", created.name)),
            },
        )
        .await;

        call.reply(Reply::embed(
            Embed::new()
                .title(ModAction::CreateRole.title())
                .description(format!("Created <@&{}>.", created.id))
                .field("Colour", format!("#{:06X}", created.colour), true)
                .field("Hoisted", created.hoist.to_string(), true)
                .field("Mentionable", created.mentionable.to_string(), true)
                .colour(colour.unwrap_or_else(random_pastel)),
        ))
        .await
    }

    async fn deleterole(&self, ctx: &CommandContext, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        let Some(role) = self.manageable_role(call, guild_id).await? else {
            return Ok(());
        };

        if let Err(e) = call.gateway.delete_role(guild_id, role.id).await {
            return call.upstream_failed("delete role", e).await;
        }

        modlog::record(
            &ctx.store,
            call.gateway.as_ref(),
            ActionRecord {
                guild_id,
                action: ModAction::DeleteRole,
                moderator: &call.input.user,
                target_id: role.id,
                target_label: format!("**{}**", role.name),
                reason: None,
                details: None,
            },
        )
        .await;
        call.reply(Reply::embed(
            Embed::new()
                .title(ModAction::DeleteRole.title())
                .description(format!("Deleted **{}**.", role.name))
                .colour(SUCCESS_COLOUR),
        ))
        .await
    }

    async fn roles(&self, call: &Invocation<'_>, guild_id: u64) -> Result<()> {
        if let Some(user) = call.input.user("user") {
            let member = match call.gateway.fetch_member(guild_id, user.id).await {
                Ok(member) => member,
                Err(e) => return call.upstream_failed("load member", e).await,
            };
            return call
                .reply(Reply::embed(
                    Embed::new()
                        .title(format!("🎭 {}'s Roles ({})", user.name, member.roles.len()))
                        .description(mention_list(member.roles.into_iter()))
                        .colour(INFO_COLOUR),
                ))
                .await;
        }

        let mut roles = match call.gateway.guild_roles(guild_id).await {
            Ok(roles) => roles,
            Err(e) => return call.upstream_failed("load roles", e).await,
        };
        // @everyone shares the guild's id
        roles.retain(|role| role.id != guild_id);
        roles.sort_by(|a, b| b.position.cmp(&a.position));

        call.reply(Reply::embed(
            Embed::new()
                .title(format!("🎭 Server Roles ({})", roles.len()))
                .description(mention_list(roles.iter().map(|role| role.id)))
                .colour(INFO_COLOUR),
        ))
        .await
    }
}

#[async_trait]
impl SlashCommandHandler for RolesHandler {
    fn commands(&self) -> &'static [CommandSpec] {
        COMMANDS
    }

    async fn handle(&self, ctx: &CommandContext, call: &Invocation<'_>) -> Result<()> {
        let Some(guild_id) = call.require_guild().await? else {
            return Ok(());
        };

        match call.input.name.as_str() {
            "addrole" => self.change_member_role(ctx, call, guild_id, true).await,
            "removerole" => self.change_member_role(ctx, call, guild_id, false).await,
            "createrole" => self.createrole(ctx, call, guild_id).await,
            "deleterole" => self.deleterole(ctx, call, guild_id).await,
            "roles" => self.roles(call, guild_id).await,
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::fixtures::context;
    use crate::commands::input::fixtures::{input, user};
    use crate::commands::input::{CommandInput, OptionValue};
    use crate::gateway::mock::{MockGateway, MockResponder};
    use crate::gateway::MemberSummary;
    use std::sync::Arc;

    /// A gateway where the default invoker (id 10) holds one role at `rank`.
    fn gateway_with_invoker_rank(rank: i64) -> MockGateway {
        let mut gateway = MockGateway::new();
        gateway.roles = vec![role(500, "@everyone", 0), role(40, "Mods", rank)];
        gateway.members.insert(
            10,
            MemberSummary {
                user_id: 10,
                roles: vec![40],
                ..MemberSummary::default()
            },
        );
        gateway
    }

    fn role(id: u64, name: &str, position: i64) -> RoleRef {
        RoleRef {
            id,
            name: name.to_string(),
            position,
            ..RoleRef::default()
        }
    }

    async fn run(ctx: &CommandContext, gateway: Arc<MockGateway>, input: CommandInput) -> MockResponder {
        let responder = MockResponder::new();
        let call = Invocation {
            input: &input,
            responder: &responder,
            gateway,
        };
        RolesHandler.handle(ctx, &call).await.unwrap();
        responder
    }

    #[tokio::test]
    async fn test_addrole_assigns_and_logs() {
        let ctx = context().await;
        let gateway = Arc::new(gateway_with_invoker_rank(5));
        let responder = run(
            &ctx,
            gateway.clone(),
            input("addrole", Permissions::MANAGE_ROLES)
                .with_user("user", user(20, "pal"))
                .with("role", OptionValue::Role(role(30, "Artists", 2))),
        )
        .await;

        assert_eq!(gateway.mutations(), vec!["addrole 500 20 30".to_string()]);
        assert!(responder.last_text().contains("Gave <@&30> to <@20>."));
        assert_eq!(ctx.store.get_action_stats(500).await[0].action, "addrole");
    }

    #[tokio::test]
    async fn test_roles_at_or_above_invoker_are_refused() {
        let ctx = context().await;
        let gateway = Arc::new(gateway_with_invoker_rank(5));

        for position in [5, 8] {
            let responder = run(
                &ctx,
                gateway.clone(),
                input("addrole", Permissions::MANAGE_ROLES)
                    .with_user("user", user(20, "pal"))
                    .with("role", OptionValue::Role(role(30, "Admins", position))),
            )
            .await;

            let reply = responder.last_reply().unwrap();
            assert!(reply.ephemeral);
            assert!(reply.summary().contains("below your highest role"));
        }

        let responder = run(
            &ctx,
            gateway.clone(),
            input("deleterole", Permissions::MANAGE_ROLES)
                .with("role", OptionValue::Role(role(30, "Admins", 9))),
        )
        .await;
        assert!(responder.last_reply().unwrap().ephemeral);
        assert!(gateway.mutations().is_empty());
        assert!(ctx.store.get_action_stats(500).await.is_empty());
    }

    #[tokio::test]
    async fn test_guild_owner_outranks_every_role() {
        let ctx = context().await;
        let gateway = Arc::new(MockGateway::new());
        let mut owner_call = input("removerole", Permissions::MANAGE_ROLES)
            .with_user("user", user(20, "pal"))
            .with("role", OptionValue::Role(role(30, "Top", 99)));
        owner_call.user = user(1, "owner");

        run(&ctx, gateway.clone(), owner_call).await;

        assert_eq!(gateway.mutations(), vec!["removerole 500 20 30".to_string()]);
    }

    #[test]
    fn test_highest_position() {
        let roles = vec![role(1, "a", 3), role(2, "b", 7), role(3, "c", 5)];
        assert_eq!(highest_position(&roles, &[1, 3]), 5);
        assert_eq!(highest_position(&roles, &[2]), 7);
        assert_eq!(highest_position(&roles, &[]), 0);
    }

    #[tokio::test]
    async fn test_createrole_and_deleterole_are_logged() {
        let ctx = context().await;
        let gateway = Arc::new(gateway_with_invoker_rank(5));

        run(
            &ctx,
            gateway.clone(),
            input("createrole", Permissions::MANAGE_ROLES).with_str("name", "Bakers"),
        )
        .await;
        run(
            &ctx,
            gateway.clone(),
            input("deleterole", Permissions::MANAGE_ROLES)
                .with("role", OptionValue::Role(role(30, "Old", 2))),
        )
        .await;

        let mut logged: Vec<String> = ctx
            .store
            .get_action_stats(500)
            .await
            .into_iter()
            .map(|entry| entry.action)
            .collect();
        logged.sort();
        assert_eq!(logged, vec!["createrole".to_string(), "deleterole".to_string()]);
    }

    #[tokio::test]
    async fn test_managed_roles_are_refused() {
        let ctx = context().await;
        let gateway = Arc::new(MockGateway::new());
        let mut bot_role = role(31, "Bot", 5);
        bot_role.managed = true;

        let responder = run(
            &ctx,
            gateway.clone(),
            input("deleterole", Permissions::MANAGE_ROLES).with("role", OptionValue::Role(bot_role)),
        )
        .await;

        assert!(responder.last_reply().unwrap().ephemeral);
        assert!(gateway.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_createrole_parses_colour() {
        let ctx = context().await;
        let gateway = Arc::new(MockGateway::new());
        let responder = run(
            &ctx,
            gateway.clone(),
            input("createrole", Permissions::MANAGE_ROLES)
                .with_str("name", "Bakers")
                .with_str("color", "#FFB6E1"),
        )
        .await;

        assert_eq!(gateway.mutations(), vec!["createrole 500 Bakers".to_string()]);
        assert!(responder.last_text().contains("Colour: #FFB6E1"));
    }

    #[tokio::test]
    async fn test_roles_lists_highest_first_without_everyone() {
        let ctx = context().await;
        let mut gateway = MockGateway::new();
        gateway.roles = vec![role(500, "@everyone", 0), role(1, "Low", 1), role(2, "High", 9)];

        let responder = run(&ctx, Arc::new(gateway), input("roles", Permissions::empty())).await;

        let text = responder.last_text();
        assert!(text.contains("Server Roles (2)"));
        assert!(text.contains("<@&2> <@&1>"));
        assert!(!text.contains("<@&500>"));
    }
}
