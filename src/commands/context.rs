use std::sync::Arc;
use std::time::Instant;

use crate::afk::AfkTracker;
use crate::ai_gate::AiGate;
use crate::database::Database;
use crate::generation::TextGenerator;
use crate::personas::Persona;

/// Long-lived state shared by every handler.
pub struct CommandContext {
    pub store: Database,
    pub ai_gate: AiGate,
    pub generator: Arc<dyn TextGenerator>,
    pub afk: AfkTracker,
    pub persona: Persona,
    pub creator_id: Option<u64>,
    pub short_responses: bool,
    pub started_at: Instant,
}

impl CommandContext {
    pub fn new(store: Database, generator: Arc<dyn TextGenerator>) -> Self {
        CommandContext {
            store,
            ai_gate: AiGate::new(),
            generator,
            afk: AfkTracker::new(),
            persona: Persona::cutie(),
            creator_id: None,
            short_responses: false,
            started_at: Instant::now(),
        }
    }

    pub fn with_creator(mut self, creator_id: Option<u64>) -> Self {
        self.creator_id = creator_id;
        self
    }

    pub fn with_short_responses(mut self, short: bool) -> Self {
        self.short_responses = short;
        self
    }
}

#[cfg(test)]
pub mod fixtures {
    use super::*;
    use crate::generation::mock::MockGenerator;

    pub async fn context_with(generator: Arc<MockGenerator>) -> CommandContext {
        let store = Database::new(":memory:").await.unwrap();
        CommandContext::new(store, generator)
    }

    pub async fn context() -> CommandContext {
        context_with(Arc::new(MockGenerator::replying("Hello from Cutie~"))).await
    }
}
