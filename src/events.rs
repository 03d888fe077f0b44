//! # Feature: Member Events
//!
//! Welcome and goodbye messages, the join autorole, log-channel notices for
//! joins and leaves, and the transient AFK notices posted from the message
//! observer.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0
//! - **Toggleable**: true (per guild, via `/setwelcome`, `/setgoodbye`, `/autorole`, `/setlog`)

use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::afk::AfkNotice;
use crate::commands::handlers::random_pastel;
use crate::database::Database;
use crate::gateway::{Embed, Gateway, Reply, UserRef};

pub const DEFAULT_WELCOME_MESSAGE: &str = "Welcome {user} to **{server}**! 🎉";
pub const DEFAULT_GOODBYE_MESSAGE: &str = "**{username}** has left **{server}**. 👋";

/// How long AFK notices stay up before they are cleaned away.
pub const AFK_NOTICE_TTL: Duration = Duration::from_secs(10);

pub struct TemplateVars<'a> {
    pub user: &'a UserRef,
    pub server: &'a str,
    pub member_count: Option<u64>,
}

/// Fills `{user}`, `{username}`, `{server}` and `{memberCount}`.
pub fn render_template(template: &str, vars: &TemplateVars<'_>) -> String {
    let member_count = vars
        .member_count
        .map(|count| count.to_string())
        .unwrap_or_else(|| "?".to_string());

    template
        .replace("{user}", &vars.user.mention())
        .replace("{username}", &vars.user.name)
        .replace("{server}", vars.server)
        .replace("{memberCount}", &member_count)
}

pub fn welcome_reply(text: String, user: &UserRef) -> Reply {
    Reply::embed(
        Embed::new()
            .title("👋 Welcome!")
            .description(text)
            .thumbnail(&user.avatar_url)
            .colour(random_pastel())
            .timestamp(),
    )
}

pub fn goodbye_reply(text: String, user: &UserRef) -> Reply {
    Reply::embed(
        Embed::new()
            .title("😢 Goodbye!")
            .description(text)
            .thumbnail(&user.avatar_url)
            .colour(0x95A5A6)
            .timestamp(),
    )
}

async fn server_identity(gateway: &dyn Gateway, guild_id: u64) -> (String, Option<u64>) {
    match gateway.guild_overview(guild_id).await {
        Ok(overview) => (overview.name, overview.member_count),
        Err(e) => {
            warn!("Could not load guild {} for templates: {}", guild_id, e);
            ("the server".to_string(), None)
        }
    }
}

pub async fn on_member_join(store: &Database, gateway: &dyn Gateway, guild_id: u64, user: &UserRef) {
    let settings = store.get_settings(guild_id).await;
    info!("📥 {} joined guild {}", user.tag, guild_id);

    if let Some((channel_id, template)) = settings.welcome() {
        let (server, member_count) = server_identity(gateway, guild_id).await;
        let text = render_template(
            template,
            &TemplateVars {
                user,
                server: &server,
                member_count,
            },
        );
        if let Err(e) = gateway.send_message(channel_id, welcome_reply(text, user)).await {
            error!("Failed to send welcome message in {}: {}", channel_id, e);
        }
    }

    if let Some(role_id) = settings.auto_role {
        match gateway.add_role(guild_id, user.id, role_id, Some("Auto role")).await {
            Ok(()) => debug!("Gave auto role {} to {}", role_id, user.id),
            Err(e) => error!("Failed to give auto role {} to {}: {}", role_id, user.id, e),
        }
    }

    if let Some(log_channel) = settings.log_channel {
        let notice = Embed::new()
            .title("📥 Member Joined")
            .description(format!("{} ({})", user.mention(), user.tag))
            .field("Account Created", format!("<t:{}:R>", user.created_at), true)
            .footer(format!("User ID: {}", user.id))
            .colour(0x2ECC71)
            .timestamp();
        if let Err(e) = gateway.send_message(log_channel, Reply::embed(notice)).await {
            warn!("Failed to post join notice to {}: {}", log_channel, e);
        }
    }
}

pub async fn on_member_leave(store: &Database, gateway: &dyn Gateway, guild_id: u64, user: &UserRef) {
    let settings = store.get_settings(guild_id).await;
    info!("📤 {} left guild {}", user.tag, guild_id);

    if let Some((channel_id, template)) = settings.goodbye() {
        let (server, member_count) = server_identity(gateway, guild_id).await;
        let text = render_template(
            template,
            &TemplateVars {
                user,
                server: &server,
                member_count,
            },
        );
        if let Err(e) = gateway.send_message(channel_id, goodbye_reply(text, user)).await {
            error!("Failed to send goodbye message in {}: {}", channel_id, e);
        }
    }

    if let Some(log_channel) = settings.log_channel {
        let notice = Embed::new()
            .title("📤 Member Left")
            .description(format!("{} ({})", user.mention(), user.tag))
            .footer(format!("User ID: {}", user.id))
            .colour(0xE67E22)
            .timestamp();
        if let Err(e) = gateway.send_message(log_channel, Reply::embed(notice)).await {
            warn!("Failed to post leave notice to {}: {}", log_channel, e);
        }
    }
}

/// Posts each notice and schedules its deletion.
pub async fn relay_afk_notices(gateway: Arc<dyn Gateway>, channel_id: u64, notices: Vec<AfkNotice>) {
    for notice in notices {
        let message_id = match gateway.send_message(channel_id, Reply::text(notice.message())).await {
            Ok(id) => id,
            Err(e) => {
                warn!("Failed to post AFK notice in {}: {}", channel_id, e);
                continue;
            }
        };

        let gateway = gateway.clone();
        tokio::spawn(async move {
            sleep(AFK_NOTICE_TTL).await;
            if let Err(e) = gateway.delete_message(channel_id, message_id).await {
                debug!("AFK notice {} already gone: {}", message_id, e);
            }
        });
    }
}
