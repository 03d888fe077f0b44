//! # Command System
//!
//! Slash command schemas, the handlers behind them, and the plumbing they
//! share: decoded input, the long-lived context and the handler trait.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Handlers declare their permission requirements; bang commands removed
//! - 1.0.0: Initial reorganization with modular command structure

pub mod context;
pub mod handler;
pub mod handlers;
pub mod input;
pub mod slash;

pub use context::CommandContext;
pub use handler::{CommandSpec, Invocation, Requirement, SlashCommandHandler};
pub use handlers::create_all_handlers;
pub use input::{CommandInput, OptionValue};
pub use slash::{create_slash_commands, register_global_commands, register_guild_commands};
