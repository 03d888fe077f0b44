//! Slash command handlers, one per command category.

mod ai;
mod fun;
mod general;
mod logging;
mod moderation;
mod roles;
mod utility;
mod welcome;

use rand::seq::IndexedRandom;
use std::sync::Arc;

use super::handler::SlashCommandHandler;

pub use ai::AiHandler;
pub use fun::{parse_choices, parse_hex_colour, poll_options, roll_die, FunHandler, POLL_REACTIONS};
pub use general::GeneralHandler;
pub use logging::LoggingHandler;
pub use moderation::ModerationHandler;
pub use roles::RolesHandler;
pub use utility::UtilityHandler;
pub use welcome::WelcomeHandler;

/// Soft colours used for friendly embeds.
pub const PASTEL_COLOURS: [u32; 7] = [
    0xFFB6E1, 0xB4E7FF, 0xD4B5FF, 0xFFE5B4, 0xB4FFB4, 0xFFD4E5, 0xE0BBE4,
];

pub const SUCCESS_COLOUR: u32 = 0x2ECC71;
pub const INFO_COLOUR: u32 = 0x5865F2;

pub fn random_pastel() -> u32 {
    PASTEL_COLOURS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(PASTEL_COLOURS[0])
}

/// Unix seconds encoded in a Discord snowflake.
pub fn snowflake_timestamp(id: u64) -> i64 {
    (((id >> 22) + 1_420_070_400_000) / 1000) as i64
}

/// Creates all slash command handlers
pub fn create_all_handlers() -> Vec<Arc<dyn SlashCommandHandler>> {
    vec![
        Arc::new(GeneralHandler),
        Arc::new(FunHandler),
        Arc::new(AiHandler),
        Arc::new(UtilityHandler),
        Arc::new(ModerationHandler),
        Arc::new(RolesHandler),
        Arc::new(WelcomeHandler),
        Arc::new(LoggingHandler),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_pastel_is_from_palette() {
        for _ in 0..20 {
            assert!(PASTEL_COLOURS.contains(&random_pastel()));
        }
    }

    #[test]
    fn test_snowflake_timestamp() {
        // Discord's documented example snowflake
        assert_eq!(snowflake_timestamp(175928847299117063), 1462015105);
    }
}
