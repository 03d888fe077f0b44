//! Decoded slash-command input and typed option accessors.

use serde_json::Value;
use serenity::model::permissions::Permissions;

use crate::gateway::{ChannelRef, RoleRef, UserRef};

#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Number(f64),
    User(UserRef),
    Role(RoleRef),
    Channel(ChannelRef),
}

impl OptionValue {
    /// Fallback for options that arrive without resolved data.
    pub fn from_json(value: &Value) -> Option<OptionValue> {
        match value {
            Value::String(s) => Some(OptionValue::String(s.clone())),
            Value::Bool(b) => Some(OptionValue::Boolean(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(OptionValue::Integer)
                .or_else(|| n.as_f64().map(OptionValue::Number)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandInput {
    pub name: String,
    pub options: Vec<(String, OptionValue)>,
    pub user: UserRef,
    /// `None` outside a guild.
    pub permissions: Option<Permissions>,
    pub guild_id: Option<u64>,
    pub channel_id: u64,
}

impl CommandInput {
    fn option(&self, name: &str) -> Option<&OptionValue> {
        self.options
            .iter()
            .find(|(option, _)| option == name)
            .map(|(_, value)| value)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.option(name) {
            Some(OptionValue::String(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.option(name) {
            Some(OptionValue::Integer(value)) => Some(*value),
            Some(OptionValue::Number(value)) if value.fract() == 0.0 => Some(*value as i64),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.option(name) {
            Some(OptionValue::Boolean(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn user(&self, name: &str) -> Option<&UserRef> {
        match self.option(name) {
            Some(OptionValue::User(user)) => Some(user),
            _ => None,
        }
    }

    pub fn role(&self, name: &str) -> Option<&RoleRef> {
        match self.option(name) {
            Some(OptionValue::Role(role)) => Some(role),
            _ => None,
        }
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelRef> {
        match self.option(name) {
            Some(OptionValue::Channel(channel)) => Some(channel),
            _ => None,
        }
    }

    /// The `user` option, or the invoker when it was left out.
    pub fn user_or_self(&self, name: &str) -> &UserRef {
        self.user(name).unwrap_or(&self.user)
    }

    pub fn has_permission(&self, required: Permissions) -> bool {
        self.permissions
            .map(|held| held.contains(Permissions::ADMINISTRATOR) || held.contains(required))
            .unwrap_or(false)
    }
}

#[cfg(test)]
pub mod fixtures {
    use super::*;

    pub fn user(id: u64, name: &str) -> UserRef {
        UserRef {
            id,
            name: name.to_string(),
            tag: format!("{}#0001", name),
            avatar_url: format!("https://cdn.example/{}.png", id),
            bot: false,
            created_at: 1_500_000_000,
        }
    }

    /// A guild invocation by user 10 holding `permissions`.
    pub fn input(name: &str, permissions: Permissions) -> CommandInput {
        CommandInput {
            name: name.to_string(),
            options: Vec::new(),
            user: user(10, "invoker"),
            permissions: Some(permissions),
            guild_id: Some(500),
            channel_id: 600,
        }
    }

    impl CommandInput {
        pub fn with(mut self, name: &str, value: OptionValue) -> Self {
            self.options.push((name.to_string(), value));
            self
        }

        pub fn with_str(self, name: &str, value: &str) -> Self {
            self.with(name, OptionValue::String(value.to_string()))
        }

        pub fn with_int(self, name: &str, value: i64) -> Self {
            self.with(name, OptionValue::Integer(value))
        }

        pub fn with_user(self, name: &str, value: UserRef) -> Self {
            self.with(name, OptionValue::User(value))
        }
    }
}
