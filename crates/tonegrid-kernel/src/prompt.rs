//! Coordinate → prompt mapping.
//!
//! A [`PromptTemplate`] turns a grid coordinate and a block of text into the
//! system/user prompt pair sent to the model. Every template carries a
//! version tag; requests naming any other version are rejected before the
//! backend is called, so a client holding a retired template cannot issue
//! prompts against the current one.

use tonegrid_types::{Coordinate, ToneDescriptor};

/// Current prompt version. Bump whenever the template text changes.
pub const PROMPT_VERSION: &str = "1.0.0";

const SYSTEM_PROMPT: &str = "You rewrite text **preserving meaning** and factual content while adjusting:
- Formality level: Casual ↔ Neutral ↔ Formal
- Voice: Friendly ↔ Neutral ↔ Direct
Rules:
- Keep language **natural** and **clear**.
- Do **not** add new facts.
- Keep approximate length (±15%).
- Maintain lists/formatting and code fences.
- If input is empty or whitespace, return an empty string.";

/// The system prompt plus the user prompt for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// A versioned prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    version: String,
    system: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::current()
    }
}

impl PromptTemplate {
    /// The template this build ships with.
    pub fn current() -> Self {
        Self {
            version: PROMPT_VERSION.to_string(),
            system: SYSTEM_PROMPT.to_string(),
        }
    }

    /// Version tag callers must echo back.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether a caller-supplied version matches this template.
    pub fn matches_version(&self, version: &str) -> bool {
        self.version == version
    }

    pub fn system_prompt(&self) -> &str {
        &self.system
    }

    /// Build the user prompt. The text is embedded verbatim.
    pub fn user_prompt(&self, text: &str, coord: Coordinate) -> String {
        let tone = ToneDescriptor::describe(coord);
        format!(
            "Given this text:\n\"\"\"\n{text}\n\"\"\"\nAdjust tone using these controls:\n- Formality: {formality}\n- Voice: {voice}\nReturn only the rewritten text.",
            formality = tone.formality,
            voice = tone.voice,
        )
    }

    /// Both prompts for one request.
    pub fn render(&self, text: &str, coord: Coordinate) -> PromptPair {
        PromptPair {
            system: self.system.clone(),
            user: self.user_prompt(text, coord),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(x: i64, y: i64) -> Coordinate {
        Coordinate::new(x, y).unwrap()
    }

    #[test]
    fn test_version() {
        let t = PromptTemplate::current();
        assert_eq!(t.version(), "1.0.0");
        assert!(t.matches_version("1.0.0"));
        assert!(!t.matches_version("0.9.0"));
    }

    #[test]
    fn test_system_prompt_content() {
        let system = PromptTemplate::current().system_prompt().to_string();
        for needle in [
            "rewrite text",
            "preserving meaning",
            "Formality level",
            "Voice",
            "Casual",
            "Formal",
            "Friendly",
            "Direct",
        ] {
            assert!(system.contains(needle), "missing {needle:?}");
        }
    }

    #[test]
    fn test_user_prompt_casual_friendly() {
        let prompt = PromptTemplate::current().user_prompt("Hello world", coord(-1, -1));
        assert!(prompt.contains("Hello world"));
        assert!(prompt.contains("Formality: Casual"));
        assert!(prompt.contains("Voice: Friendly"));
    }

    #[test]
    fn test_user_prompt_formal_direct() {
        let prompt = PromptTemplate::current().user_prompt("Hello world", coord(1, 1));
        assert!(prompt.contains("Formality: Formal"));
        assert!(prompt.contains("Voice: Direct"));
    }

    #[test]
    fn test_user_prompt_multiline_verbatim() {
        let text = "Line 1\nLine 2\nLine 3";
        let prompt = PromptTemplate::current().user_prompt(text, coord(-1, 1));
        assert!(prompt.contains(&format!("\"\"\"\n{text}\n\"\"\"")));
        assert!(prompt.contains("Formality: Casual"));
        assert!(prompt.contains("Voice: Direct"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let t = PromptTemplate::current();
        assert_eq!(t.render("abc", coord(0, 0)), t.render("abc", coord(0, 0)));
    }
}
