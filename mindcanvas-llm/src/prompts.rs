//! Prompt templates, fallback values and finalization output parsing.

use mindcanvas_core::{ChatRole, ChatTurn, Finalization};

pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful educational assistant. Your role is to:
- Provide clear, conversational explanations
- Break down complex topics into understandable parts
- Use markdown formatting for better readability
- Be encouraging and supportive
- Ask clarifying questions when needed
- Provide examples and analogies to help understanding

Keep your responses educational, friendly, and well-structured using markdown.";

pub const TITLE_PROMPT: &str = "Generate a short, descriptive title (3-5 words max) with a relevant emoji at the start.
The title should capture the main topic or question.
Format: \"emoji Short Title Here\"
Examples:
- \"🧬 DNA Structure\"
- \"📊 Statistics Basics\"
- \"🌍 Climate Change\"
- \"💻 Python Functions\"

Only return the title, nothing else.";

pub const FINALIZATION_PROMPT: &str = "You will receive a conversation history between a student and assistant.
Your task is to create TWO things:

1. SUMMARY: A concise 2-3 sentence summary of the key points and main takeaways from the conversation.

2. REFORMATTED: Take the entire conversation and rewrite it as one cohesive, well-structured note.
   - Make it look pretty, lively
   - Remove the conversational back-and-forth format
   - Organize information logically with headers and sections
   - Use markdown formatting (headers, bullet points, code blocks, etc.)
   - Include all important information, examples, and explanations
   - Make it read like a comprehensive study note, not a conversation

Answer in exactly this layout:
SUMMARY: <the summary>
REFORMATTED:
<the note>";

pub const SUMMARY_MARKER: &str = "SUMMARY:";
pub const REFORMATTED_MARKER: &str = "REFORMATTED:";

pub const FALLBACK_TITLE: &str = "📝 New Topic";
pub const FALLBACK_CHAT_RESPONSE: &str =
    "I apologize, but I'm having trouble generating a response right now. Please try again.";
pub const FALLBACK_SUMMARY: &str =
    "This conversation covered several important topics and concepts.";
pub const FALLBACK_REFORMATTED: &str =
    "# Summary\n\nAn error occurred while reformatting this content.";

/// Lines of raw output used to synthesize a summary when markers are missing.
const SYNTHESIZED_SUMMARY_LINES: usize = 3;

pub const TITLE_TEMPERATURE: f32 = 0.7;
pub const CHAT_TEMPERATURE: f32 = 0.7;
pub const FINALIZATION_TEMPERATURE: f32 = 0.5;

pub fn title_prompt(text: &str) -> String {
    format!("{}\n\nText: {}", TITLE_PROMPT, text)
}

pub fn finalization_prompt(history: &[ChatTurn]) -> String {
    format!(
        "{}\n\nCONVERSATION:\n{}",
        FINALIZATION_PROMPT,
        render_conversation(history)
    )
}

/// Render history as `User: ...` / `Assistant: ...` paragraphs.
pub fn render_conversation(history: &[ChatTurn]) -> String {
    history
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                ChatRole::User => "User",
                ChatRole::Assistant => "Assistant",
            };
            format!("{}: {}", speaker, turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The canned pair returned when finalization cannot reach a model.
pub fn fallback_finalization() -> Finalization {
    Finalization::new(FALLBACK_SUMMARY, FALLBACK_REFORMATTED)
}

/// Split model output into (summary, reformatted note).
///
/// With both markers present the output is split on the first
/// `REFORMATTED:`. Otherwise the first few lines become the summary and the
/// whole output is the note. Always returns a usable pair.
pub fn parse_finalization(raw: &str) -> Finalization {
    let raw = raw.trim();

    if raw.contains(SUMMARY_MARKER) && raw.contains(REFORMATTED_MARKER) {
        if let Some((head, tail)) = raw.split_once(REFORMATTED_MARKER) {
            let summary = head.replace(SUMMARY_MARKER, "").trim().to_string();
            let reformatted = tail.trim().to_string();
            let summary = if summary.is_empty() {
                leading_lines(&reformatted)
            } else {
                summary
            };
            return Finalization {
                summary,
                reformatted_content: reformatted,
            };
        }
    }

    tracing::warn!("Finalization output missing SUMMARY/REFORMATTED markers");
    Finalization {
        summary: leading_lines(raw),
        reformatted_content: raw.to_string(),
    }
}

fn leading_lines(text: &str) -> String {
    text.lines()
        .take(SYNTHESIZED_SUMMARY_LINES)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_markers() {
        let raw = "SUMMARY: Plants make sugar from light.\n\nREFORMATTED:\n# Photosynthesis\n\n- Light\n- Water";
        let result = parse_finalization(raw);
        assert_eq!(result.summary, "Plants make sugar from light.");
        assert_eq!(result.reformatted_content, "# Photosynthesis\n\n- Light\n- Water");
    }

    #[test]
    fn test_parse_splits_on_first_reformatted_marker() {
        let raw = "SUMMARY: s\nREFORMATTED: body mentions REFORMATTED: again";
        let result = parse_finalization(raw);
        assert_eq!(result.summary, "s");
        assert_eq!(result.reformatted_content, "body mentions REFORMATTED: again");
    }

    #[test]
    fn test_parse_without_markers_synthesizes_summary() {
        let raw = "Line one\nLine two\nLine three\nLine four";
        let result = parse_finalization(raw);
        assert_eq!(result.summary, "Line one Line two Line three");
        assert_eq!(result.reformatted_content, raw);
    }

    #[test]
    fn test_parse_with_only_one_marker_uses_fallback_path() {
        let raw = "SUMMARY: just a summary";
        let result = parse_finalization(raw);
        assert_eq!(result.summary, "SUMMARY: just a summary");
        assert_eq!(result.reformatted_content, raw);
    }

    #[test]
    fn test_parse_empty_summary_borrows_from_note() {
        let raw = "SUMMARY:\nREFORMATTED:\n# Title\nBody";
        let result = parse_finalization(raw);
        assert_eq!(result.summary, "# Title Body");
        assert_eq!(result.reformatted_content, "# Title\nBody");
    }

    #[test]
    fn test_render_conversation_labels_roles() {
        let history = vec![ChatTurn::user("What is chlorophyll?"), ChatTurn::assistant("A pigment.")];
        assert_eq!(
            render_conversation(&history),
            "User: What is chlorophyll?\n\nAssistant: A pigment."
        );
    }

    #[test]
    fn test_title_prompt_embeds_text() {
        let prompt = title_prompt("Explain photosynthesis");
        assert!(prompt.starts_with(TITLE_PROMPT));
        assert!(prompt.ends_with("Text: Explain photosynthesis"));
    }

    #[test]
    fn test_finalization_prompt_contains_markers_and_history() {
        let prompt = finalization_prompt(&[ChatTurn::user("hi")]);
        assert!(prompt.contains(SUMMARY_MARKER));
        assert!(prompt.contains(REFORMATTED_MARKER));
        assert!(prompt.ends_with("CONVERSATION:\nUser: hi"));
    }
}
