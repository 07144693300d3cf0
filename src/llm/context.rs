//! Conversation-context assembly for stateless text generation.
//!
//! The client sends its own history with every request; [`ContextAssembler`]
//! flattens the trailing window of that history plus the new message into
//! one prompt:
//!
//! ```text
//! Human: <turn 1 human>
//! Assistant: <turn 1 assistant>
//! ...
//! Human: <message>
//! Assistant: <- single trailing space, no newline
//! ```
//!
//! The downstream model is tuned against this exact framing.  Changing the
//! labels, the order, the window cut-off or the trailing space changes
//! model behaviour.

use serde::{Deserialize, Deserializer, Serialize};

/// Default number of trailing turns kept in the prompt.
pub const DEFAULT_MAX_TURNS: usize = 10;

// ---------------------------------------------------------------------------
// Turn
// ---------------------------------------------------------------------------

/// One completed human/assistant exchange supplied by the client.
///
/// A missing or `null` side reads as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    #[serde(default, deserialize_with = "null_as_default")]
    pub human: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assistant: String,
}

impl Turn {
    pub fn new(human: impl Into<String>, assistant: impl Into<String>) -> Self {
        Self {
            human: human.into(),
            assistant: assistant.into(),
        }
    }
}

/// Deserialize `null` as `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ---------------------------------------------------------------------------
// ContextAssembler
// ---------------------------------------------------------------------------

/// Builds flattened chat prompts from a bounded window of prior turns.
///
/// # Example
/// ```rust
/// use chatbot_gateway::llm::{ContextAssembler, Turn};
///
/// let assembler = ContextAssembler::default();
/// let prompt = assembler.build_prompt(&[Turn::new("hi", "hello")], "how are you?");
/// assert_eq!(prompt, "Human: hi\nAssistant: hello\nHuman: how are you?\nAssistant: ");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
    max_turns: usize,
}

impl ContextAssembler {
    pub fn new(max_turns: usize) -> Self {
        Self { max_turns }
    }

    /// Flatten the last `max_turns` turns of `history` (oldest first) and
    /// the new `message` into a single prompt string.
    pub fn build_prompt(&self, history: &[Turn], message: &str) -> String {
        let start = history.len().saturating_sub(self.max_turns);
        let window = &history[start..];

        let mut prompt = String::with_capacity(
            window
                .iter()
                .map(|t| t.human.len() + t.assistant.len() + 20)
                .sum::<usize>()
                + message.len()
                + 20,
        );

        for turn in window {
            prompt.push_str("Human: ");
            prompt.push_str(&turn.human);
            prompt.push_str("\nAssistant: ");
            prompt.push_str(&turn.assistant);
            prompt.push('\n');
        }

        prompt.push_str("Human: ");
        prompt.push_str(message);
        prompt.push_str("\nAssistant: ");
        prompt
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
