//! Prompt context for a block branched from a parent.

/// Labeled sections, in order: parent summary, highlight, optional surrounding
/// text, then the question. A parent that is not finalized contributes an
/// empty summary.
pub fn build_block_context(
    parent_summary: Option<&str>,
    highlighted_text: &str,
    context_range: Option<&str>,
    message: &str,
) -> String {
    let mut context = format!(
        "Previous context: {}\n\nHighlighted section: {}\n",
        parent_summary.unwrap_or_default(),
        highlighted_text
    );
    if let Some(range) = context_range.filter(|r| !r.is_empty()) {
        context.push_str(&format!("Surrounding context: {}\n", range));
    }
    context.push_str(&format!("\nUser question: {}", message));
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_context_layout() {
        let context = build_block_context(
            Some("Plants make sugar from light."),
            "chlorophyll",
            Some("Leaves contain chlorophyll, a pigment."),
            "Why is it green?",
        );
        assert_eq!(
            context,
            "Previous context: Plants make sugar from light.\n\n\
             Highlighted section: chlorophyll\n\
             Surrounding context: Leaves contain chlorophyll, a pigment.\n\
             \nUser question: Why is it green?"
        );
    }

    #[test]
    fn test_unfinalized_parent_and_no_range() {
        let context = build_block_context(None, "chlorophyll", None, "Why is it green?");
        assert_eq!(
            context,
            "Previous context: \n\nHighlighted section: chlorophyll\n\nUser question: Why is it green?"
        );
    }

    #[test]
    fn test_empty_range_is_skipped() {
        let context = build_block_context(None, "x", Some(""), "q");
        assert!(!context.contains("Surrounding context"));
    }
}
