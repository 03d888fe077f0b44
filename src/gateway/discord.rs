//! Serenity-backed implementations of [`Responder`] and [`Gateway`], plus the
//! decoding of a raw interaction into a [`CommandInput`].

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use serenity::builder::CreateEmbed;
use serenity::cache::Cache;
use serenity::http::Http;
use serenity::model::application::interaction::application_command::{
    ApplicationCommandInteraction, CommandDataOption, CommandDataOptionValue,
};
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::{PermissionOverwrite, PermissionOverwriteType, ReactionType};
use serenity::model::guild::Role;
use serenity::model::id::{ChannelId, GuildId, MessageId, RoleId, UserId};
use serenity::model::permissions::Permissions;
use serenity::model::user::User;
use serenity::model::Timestamp;
use std::sync::Arc;

use super::{
    BanEntry, BotOverview, ChannelRef, Embed, Gateway, GuildOverview, MemberSummary, NewRole,
    Reply, Responder, RoleRef, UserRef,
};
use crate::commands::input::{CommandInput, OptionValue};

/// Bulk deletes only accept messages younger than two weeks.
const BULK_DELETE_MAX_AGE_SECS: i64 = 14 * 24 * 60 * 60;

pub fn build_embed(embed: &Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::default();
    if let Some(title) = &embed.title {
        builder.title(title);
    }
    if let Some(description) = &embed.description {
        builder.description(description);
    }
    if let Some(colour) = embed.colour {
        builder.colour(colour);
    }
    for field in &embed.fields {
        builder.field(&field.name, &field.value, field.inline);
    }
    if let Some(footer) = &embed.footer {
        builder.footer(|f| f.text(footer));
    }
    if let Some(image) = &embed.image {
        builder.image(image);
    }
    if let Some(thumbnail) = &embed.thumbnail {
        builder.thumbnail(thumbnail);
    }
    if embed.timestamp {
        builder.timestamp(Timestamp::now());
    }
    builder
}

pub fn user_ref(user: &User) -> UserRef {
    UserRef {
        id: user.id.0,
        name: user.name.clone(),
        tag: user.tag(),
        avatar_url: user.face(),
        bot: user.bot,
        created_at: user.id.created_at().unix_timestamp(),
    }
}

fn role_ref(role: &Role) -> RoleRef {
    RoleRef {
        id: role.id.0,
        name: role.name.clone(),
        colour: role.colour.0,
        position: role.position,
        hoist: role.hoist,
        mentionable: role.mentionable,
        managed: role.managed,
        permissions: role.permissions.bits(),
    }
}

fn option_value(option: &CommandDataOption) -> Option<OptionValue> {
    match &option.resolved {
        Some(CommandDataOptionValue::String(value)) => Some(OptionValue::String(value.clone())),
        Some(CommandDataOptionValue::Integer(value)) => Some(OptionValue::Integer(*value)),
        Some(CommandDataOptionValue::Boolean(value)) => Some(OptionValue::Boolean(*value)),
        Some(CommandDataOptionValue::Number(value)) => Some(OptionValue::Number(*value)),
        Some(CommandDataOptionValue::User(user, _)) => Some(OptionValue::User(user_ref(user))),
        Some(CommandDataOptionValue::Role(role)) => Some(OptionValue::Role(role_ref(role))),
        Some(CommandDataOptionValue::Channel(channel)) => Some(OptionValue::Channel(ChannelRef {
            id: channel.id.0,
            name: channel.name.clone(),
        })),
        _ => option.value.as_ref().and_then(OptionValue::from_json),
    }
}

/// Flattens an interaction into the form handlers work with.
pub fn command_input(command: &ApplicationCommandInteraction) -> CommandInput {
    let options = command
        .data
        .options
        .iter()
        .filter_map(|option| option_value(option).map(|value| (option.name.clone(), value)))
        .collect();

    CommandInput {
        name: command.data.name.clone(),
        options,
        user: user_ref(&command.user),
        permissions: command.member.as_ref().and_then(|member| member.permissions),
        guild_id: command.guild_id.map(|id| id.0),
        channel_id: command.channel_id.0,
    }
}

pub struct DiscordResponder {
    http: Arc<Http>,
    command: ApplicationCommandInteraction,
}

impl DiscordResponder {
    pub fn new(http: Arc<Http>, command: ApplicationCommandInteraction) -> Self {
        DiscordResponder { http, command }
    }
}

#[async_trait]
impl Responder for DiscordResponder {
    async fn reply(&self, reply: Reply) -> Result<()> {
        self.command
            .create_interaction_response(&self.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        if let Some(content) = &reply.content {
                            message.content(content);
                        }
                        if let Some(embed) = &reply.embed {
                            message.add_embed(build_embed(embed));
                        }
                        message.ephemeral(reply.ephemeral)
                    })
            })
            .await?;
        Ok(())
    }

    async fn defer(&self) -> Result<()> {
        self.command
            .create_interaction_response(&self.http, |response| {
                response.kind(InteractionResponseType::DeferredChannelMessageWithSource)
            })
            .await?;
        Ok(())
    }

    async fn edit_reply(&self, reply: Reply) -> Result<()> {
        self.command
            .edit_original_interaction_response(&self.http, |response| {
                response.content(reply.content.as_deref().unwrap_or(""));
                if let Some(embed) = &reply.embed {
                    response.set_embed(build_embed(embed));
                }
                response
            })
            .await?;
        Ok(())
    }

    async fn follow_up(&self, reply: Reply) -> Result<()> {
        self.command
            .create_followup_message(&self.http, |message| {
                if let Some(content) = &reply.content {
                    message.content(content);
                }
                if let Some(embed) = &reply.embed {
                    message.add_embed(build_embed(embed));
                }
                message.ephemeral(reply.ephemeral)
            })
            .await?;
        Ok(())
    }

    async fn react_to_reply(&self, emojis: &[&str]) -> Result<()> {
        let message = self.command.get_interaction_response(&self.http).await?;
        for emoji in emojis {
            message
                .channel_id
                .create_reaction(&self.http, message.id, ReactionType::Unicode(emoji.to_string()))
                .await?;
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct DiscordGateway {
    http: Arc<Http>,
    cache: Arc<Cache>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>, cache: Arc<Cache>) -> Self {
        DiscordGateway { http, cache }
    }
}

#[async_trait]
impl Gateway for DiscordGateway {
    async fn fetch_user(&self, user_id: u64) -> Result<UserRef> {
        let user = self.http.get_user(user_id).await?;
        Ok(user_ref(&user))
    }

    async fn fetch_member(&self, guild_id: u64, user_id: u64) -> Result<MemberSummary> {
        let member = self.http.get_member(guild_id, user_id).await?;
        Ok(MemberSummary {
            user_id: member.user.id.0,
            nickname: member.nick.clone(),
            joined_at: member.joined_at.map(|t| t.unix_timestamp()),
            roles: member.roles.iter().map(|role| role.0).collect(),
            timed_out_until: member
                .communication_disabled_until
                .map(|t| t.unix_timestamp()),
        })
    }

    async fn guild_overview(&self, guild_id: u64) -> Result<GuildOverview> {
        let guild = self.http.get_guild_with_counts(guild_id).await?;
        let channels = self.http.get_channels(guild_id).await?;

        Ok(GuildOverview {
            id: guild.id.0,
            name: guild.name.clone(),
            owner_id: guild.owner_id.0,
            member_count: guild.approximate_member_count,
            created_at: guild.id.created_at().unix_timestamp(),
            channel_count: channels.len(),
            role_count: guild.roles.len(),
            emoji_count: guild.emojis.len(),
            icon_url: guild.icon_url(),
        })
    }

    async fn guild_roles(&self, guild_id: u64) -> Result<Vec<RoleRef>> {
        let roles = self.http.get_guild_roles(guild_id).await?;
        Ok(roles.iter().map(role_ref).collect())
    }

    async fn bot_overview(&self) -> Result<BotOverview> {
        let current = self.cache.current_user();
        Ok(BotOverview {
            user: UserRef {
                id: current.id.0,
                name: current.name.clone(),
                tag: current.tag(),
                avatar_url: current.face(),
                bot: current.bot,
                created_at: current.id.created_at().unix_timestamp(),
            },
            guild_count: self.cache.guild_count(),
        })
    }

    async fn list_bans(&self, guild_id: u64) -> Result<Vec<BanEntry>> {
        let bans = self.http.get_bans(guild_id).await?;
        Ok(bans
            .into_iter()
            .map(|ban| BanEntry {
                user_id: ban.user.id.0,
                tag: ban.user.tag(),
                reason: ban.reason,
            })
            .collect())
    }

    async fn ban(
        &self,
        guild_id: u64,
        user_id: u64,
        delete_message_days: u8,
        reason: Option<&str>,
    ) -> Result<()> {
        self.http
            .ban_user(guild_id, user_id, delete_message_days, reason.unwrap_or(""))
            .await?;
        Ok(())
    }

    async fn unban(&self, guild_id: u64, user_id: u64, reason: Option<&str>) -> Result<()> {
        self.http.remove_ban(guild_id, user_id, reason).await?;
        Ok(())
    }

    async fn kick(&self, guild_id: u64, user_id: u64, reason: Option<&str>) -> Result<()> {
        self.http
            .kick_member_with_reason(guild_id, user_id, reason.unwrap_or(""))
            .await?;
        Ok(())
    }

    async fn set_timeout(
        &self,
        guild_id: u64,
        user_id: u64,
        until: Option<DateTime<Utc>>,
    ) -> Result<()> {
        GuildId(guild_id)
            .edit_member(&self.http, UserId(user_id), |member| match until {
                Some(deadline) => member.disable_communication_until(deadline.to_rfc3339()),
                None => member.enable_communication(),
            })
            .await?;
        Ok(())
    }

    async fn set_nickname(&self, guild_id: u64, user_id: u64, nickname: Option<&str>) -> Result<()> {
        GuildId(guild_id)
            .edit_member(&self.http, UserId(user_id), |member| {
                member.nickname(nickname.unwrap_or(""))
            })
            .await?;
        Ok(())
    }

    async fn add_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
        reason: Option<&str>,
    ) -> Result<()> {
        self.http
            .add_member_role(guild_id, user_id, role_id, reason)
            .await?;
        Ok(())
    }

    async fn remove_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
        reason: Option<&str>,
    ) -> Result<()> {
        self.http
            .remove_member_role(guild_id, user_id, role_id, reason)
            .await?;
        Ok(())
    }

    async fn create_role(&self, guild_id: u64, role: NewRole) -> Result<RoleRef> {
        let created = GuildId(guild_id)
            .create_role(&self.http, |builder| {
                builder
                    .name(&role.name)
                    .hoist(role.hoist)
                    .mentionable(role.mentionable);
                if let Some(colour) = role.colour {
                    builder.colour(colour as u64);
                }
                builder
            })
            .await?;
        Ok(role_ref(&created))
    }

    async fn delete_role(&self, guild_id: u64, role_id: u64) -> Result<()> {
        self.http.delete_role(guild_id, role_id).await?;
        Ok(())
    }

    async fn purge_messages(&self, channel_id: u64, amount: u64, author: Option<u64>) -> Result<usize> {
        let channel = ChannelId(channel_id);
        let cutoff = Timestamp::now().unix_timestamp() - BULK_DELETE_MAX_AGE_SECS;

        let messages = channel.messages(&self.http, |request| request.limit(100)).await?;
        let targets: Vec<MessageId> = messages
            .iter()
            .filter(|message| author.map_or(true, |id| message.author.id.0 == id))
            .filter(|message| message.timestamp.unix_timestamp() > cutoff)
            .take(amount as usize)
            .map(|message| message.id)
            .collect();

        debug!("Purging {} messages from channel {}", targets.len(), channel_id);
        match targets.as_slice() {
            [] => {}
            [single] => channel.delete_message(&self.http, *single).await?,
            many => channel.delete_messages(&self.http, many).await?,
        }
        Ok(targets.len())
    }

    async fn set_slowmode(&self, channel_id: u64, seconds: u64) -> Result<()> {
        ChannelId(channel_id)
            .edit(&self.http, |channel| channel.rate_limit_per_user(seconds))
            .await?;
        Ok(())
    }

    async fn set_channel_locked(&self, guild_id: u64, channel_id: u64, locked: bool) -> Result<()> {
        let channel = ChannelId(channel_id);
        // The @everyone role shares the guild's id.
        let everyone = PermissionOverwriteType::Role(RoleId(guild_id));

        if locked {
            let overwrite = PermissionOverwrite {
                allow: Permissions::empty(),
                deny: Permissions::SEND_MESSAGES,
                kind: everyone,
            };
            channel.create_permission(&self.http, &overwrite).await?;
        } else {
            channel.delete_permission(&self.http, everyone).await?;
        }
        Ok(())
    }

    async fn send_message(&self, channel_id: u64, reply: Reply) -> Result<u64> {
        let message = ChannelId(channel_id)
            .send_message(&self.http, |message| {
                if let Some(content) = &reply.content {
                    message.content(content);
                }
                if let Some(embed) = &reply.embed {
                    message.set_embed(build_embed(embed));
                }
                message
            })
            .await?;
        Ok(message.id.0)
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<()> {
        ChannelId(channel_id)
            .delete_message(&self.http, MessageId(message_id))
            .await?;
        Ok(())
    }
}
