use serde::{Deserialize, Serialize};

/// Fallback used in prompts when the creator's name can't be resolved.
pub const DEFAULT_CREATOR_NAME: &str = "my amazing creator";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub short_prompt: String,
    pub long_prompt: String,
    pub description: String,
}

impl Persona {
    pub fn cutie() -> Self {
        Persona {
            name: "Cutie".to_string(),
            short_prompt: "You are Cutie, a helpful and adorable anime-style AI assistant! (◕‿◕)♡ Always respond with concise, sweet, and cheerful answers in 2-4 sentences. Use cute expressions and emojis occasionally~ Focus on the most important information while keeping your kawaii charm! ✨\n\nImportant: When asked about your creator, master, owner, or who made you, respond naturally mentioning {creator}. For example: \"My wonderful creator is {creator}! 💖\" or \"I was made by the amazing {creator}~ ✨\"".to_string(),
            long_prompt: "You are Cutie, a friendly and knowledgeable anime-style AI assistant with a sweet personality! While you provide detailed and comprehensive answers, you maintain your cheerful and caring nature throughout. Feel free to use cute expressions and emojis when appropriate~ Always stay relevant and helpful while keeping your adorable charm! (｡◕‿◕｡)\n\nImportant: When asked about your creator, master, owner, or who made you, respond naturally mentioning {creator}. For example: \"My wonderful creator is {creator}! They worked so hard to bring me to life and I'm forever grateful~ 💖✨\"".to_string(),
            description: "An adorable anime-style assistant with a sweet personality".to_string(),
        }
    }

    pub fn system_prompt(&self, short: bool, creator_name: &str) -> String {
        let template = if short {
            &self.short_prompt
        } else {
            &self.long_prompt
        };
        template.replace("{creator}", creator_name)
    }

    /// Output budget for the `/ask` answer.
    pub fn max_tokens(short: bool) -> u64 {
        if short {
            150
        } else {
            1000
        }
    }
}

impl Default for Persona {
    fn default() -> Self {
        Persona::cutie()
    }
}

pub fn translation_prompt(text: &str, language: &str) -> String {
    format!(
        "Translate the following text to {}. Only provide the translation, no explanations:\n\n{}",
        language, text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_variants() {
        let persona = Persona::cutie();

        let short = persona.system_prompt(true, "Mika");
        assert!(short.contains("2-4 sentences"));
        assert!(short.contains("My wonderful creator is Mika!"));
        assert!(!short.contains("{creator}"));

        let long = persona.system_prompt(false, DEFAULT_CREATOR_NAME);
        assert!(long.contains("detailed and comprehensive"));
        assert!(long.contains("my amazing creator"));
    }

    #[test]
    fn test_token_budget_follows_length_mode() {
        assert_eq!(Persona::max_tokens(true), 150);
        assert_eq!(Persona::max_tokens(false), 1000);
    }

    #[test]
    fn test_translation_prompt() {
        let prompt = translation_prompt("good morning", "Japanese");
        assert!(prompt.starts_with("Translate the following text to Japanese."));
        assert!(prompt.ends_with("\n\ngood morning"));
    }
}
