//! In-memory stand-ins for the gateway traits. Every call is recorded so tests
//! can assert on what a handler did, or did not, send to Discord.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use super::{
    BanEntry, BotOverview, Gateway, GuildOverview, MemberSummary, NewRole, Reply, Responder,
    RoleRef, UserRef,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ResponderCall {
    Reply(Reply),
    Defer,
    Edit(Reply),
    FollowUp(Reply),
    React(Vec<String>),
}

#[derive(Default)]
pub struct MockResponder {
    calls: Mutex<Vec<ResponderCall>>,
}

impl MockResponder {
    pub fn new() -> Self {
        MockResponder::default()
    }

    pub fn calls(&self) -> Vec<ResponderCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The last reply or edit, whichever came last.
    pub fn last_reply(&self) -> Option<Reply> {
        self.calls()
            .into_iter()
            .rev()
            .find_map(|call| match call {
                ResponderCall::Reply(reply) | ResponderCall::Edit(reply) => Some(reply),
                _ => None,
            })
    }

    pub fn last_text(&self) -> String {
        self.last_reply().map(|reply| reply.summary()).unwrap_or_default()
    }

    fn push(&self, call: ResponderCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Responder for MockResponder {
    async fn reply(&self, reply: Reply) -> Result<()> {
        self.push(ResponderCall::Reply(reply));
        Ok(())
    }

    async fn defer(&self) -> Result<()> {
        self.push(ResponderCall::Defer);
        Ok(())
    }

    async fn edit_reply(&self, reply: Reply) -> Result<()> {
        self.push(ResponderCall::Edit(reply));
        Ok(())
    }

    async fn follow_up(&self, reply: Reply) -> Result<()> {
        self.push(ResponderCall::FollowUp(reply));
        Ok(())
    }

    async fn react_to_reply(&self, emojis: &[&str]) -> Result<()> {
        self.push(ResponderCall::React(
            emojis.iter().map(|e| e.to_string()).collect(),
        ));
        Ok(())
    }
}

/// Reads come from the fixture maps; mutations are appended to `mutations`.
#[derive(Default)]
pub struct MockGateway {
    pub users: HashMap<u64, UserRef>,
    pub members: HashMap<u64, MemberSummary>,
    pub roles: Vec<RoleRef>,
    pub bans: Vec<BanEntry>,
    pub fail_mutations: bool,
    mutations: Mutex<Vec<String>>,
    sent: Mutex<Vec<(u64, Reply)>>,
    next_message_id: AtomicU64,
}

impl MockGateway {
    pub fn new() -> Self {
        MockGateway::default()
    }

    pub fn with_user(mut self, user: UserRef) -> Self {
        self.members.insert(
            user.id,
            MemberSummary {
                user_id: user.id,
                joined_at: Some(1_600_000_000),
                ..MemberSummary::default()
            },
        );
        self.users.insert(user.id, user);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_mutations = true;
        self
    }

    pub fn mutations(&self) -> Vec<String> {
        self.mutations.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(u64, Reply)> {
        self.sent.lock().unwrap().clone()
    }

    fn mutate(&self, call: String) -> Result<()> {
        self.mutations.lock().unwrap().push(call.clone());
        if self.fail_mutations {
            return Err(anyhow!("mock gateway refused {}", call));
        }
        Ok(())
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn fetch_user(&self, user_id: u64) -> Result<UserRef> {
        self.users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown user {}", user_id))
    }

    async fn fetch_member(&self, _guild_id: u64, user_id: u64) -> Result<MemberSummary> {
        self.members
            .get(&user_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown member {}", user_id))
    }

    async fn guild_overview(&self, guild_id: u64) -> Result<GuildOverview> {
        Ok(GuildOverview {
            id: guild_id,
            name: "Test Server".to_string(),
            owner_id: 1,
            member_count: Some(42),
            created_at: 1_500_000_000,
            channel_count: 5,
            role_count: self.roles.len(),
            emoji_count: 0,
            icon_url: None,
        })
    }

    async fn guild_roles(&self, _guild_id: u64) -> Result<Vec<RoleRef>> {
        Ok(self.roles.clone())
    }

    async fn bot_overview(&self) -> Result<BotOverview> {
        Ok(BotOverview {
            user: UserRef {
                id: 999,
                name: "Cutie".to_string(),
                tag: "Cutie#0001".to_string(),
                bot: true,
                ..UserRef::default()
            },
            guild_count: 3,
        })
    }

    async fn list_bans(&self, _guild_id: u64) -> Result<Vec<BanEntry>> {
        Ok(self.bans.clone())
    }

    async fn ban(
        &self,
        guild_id: u64,
        user_id: u64,
        delete_message_days: u8,
        _reason: Option<&str>,
    ) -> Result<()> {
        self.mutate(format!("ban {} {} {}", guild_id, user_id, delete_message_days))
    }

    async fn unban(&self, guild_id: u64, user_id: u64, _reason: Option<&str>) -> Result<()> {
        self.mutate(format!("unban {} {}", guild_id, user_id))
    }

    async fn kick(&self, guild_id: u64, user_id: u64, _reason: Option<&str>) -> Result<()> {
        self.mutate(format!("kick {} {}", guild_id, user_id))
    }

    async fn set_timeout(
        &self,
        guild_id: u64,
        user_id: u64,
        until: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let label = if until.is_some() { "timeout" } else { "untimeout" };
        self.mutate(format!("{} {} {}", label, guild_id, user_id))
    }

    async fn set_nickname(&self, guild_id: u64, user_id: u64, nickname: Option<&str>) -> Result<()> {
        self.mutate(format!(
            "nickname {} {} {}",
            guild_id,
            user_id,
            nickname.unwrap_or("<reset>")
        ))
    }

    async fn add_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
        _reason: Option<&str>,
    ) -> Result<()> {
        self.mutate(format!("addrole {} {} {}", guild_id, user_id, role_id))
    }

    async fn remove_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
        _reason: Option<&str>,
    ) -> Result<()> {
        self.mutate(format!("removerole {} {} {}", guild_id, user_id, role_id))
    }

    async fn create_role(&self, guild_id: u64, role: NewRole) -> Result<RoleRef> {
        self.mutate(format!("createrole {} {}", guild_id, role.name))?;
        Ok(RoleRef {
            id: 7000,
            name: role.name,
            colour: role.colour.unwrap_or(0),
            hoist: role.hoist,
            mentionable: role.mentionable,
            ..RoleRef::default()
        })
    }

    async fn delete_role(&self, guild_id: u64, role_id: u64) -> Result<()> {
        self.mutate(format!("deleterole {} {}", guild_id, role_id))
    }

    async fn purge_messages(&self, channel_id: u64, amount: u64, _author: Option<u64>) -> Result<usize> {
        self.mutate(format!("purge {} {}", channel_id, amount))?;
        Ok(amount as usize)
    }

    async fn set_slowmode(&self, channel_id: u64, seconds: u64) -> Result<()> {
        self.mutate(format!("slowmode {} {}", channel_id, seconds))
    }

    async fn set_channel_locked(&self, _guild_id: u64, channel_id: u64, locked: bool) -> Result<()> {
        let label = if locked { "lock" } else { "unlock" };
        self.mutate(format!("{} {}", label, channel_id))
    }

    async fn send_message(&self, channel_id: u64, reply: Reply) -> Result<u64> {
        self.sent.lock().unwrap().push((channel_id, reply));
        Ok(self.next_message_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<()> {
        self.mutate(format!("delete {} {}", channel_id, message_id))
    }
}
