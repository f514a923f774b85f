//! Context assembly: turning retrieved documents into the model's system
//! prompt, and windowing conversation history.

use helpdesk_model::ChatMessage;

use crate::document::RetrievedDocument;

const ENTRY_SEPARATOR: &str = "\n\n---\n\n";
const CONTEXT_HEADER: &str = "\n\nContext from documentation:\n";

/// Marker used in place of the context block when nothing was retrieved.
pub const NO_CONTEXT_MARKER: &str = "No context available.";

/// Renders retrieved documents as numbered, cited context entries.
///
/// # Example
///
/// ```rust,ignore
/// let assembler = ContextAssembler::new("You are a helpful support assistant.");
/// let prompt = assembler.system_prompt(&documents);
/// ```
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    base_instructions: String,
}

impl ContextAssembler {
    pub fn new(base_instructions: impl Into<String>) -> Self {
        Self { base_instructions: base_instructions.into() }
    }

    pub fn base_instructions(&self) -> &str {
        &self.base_instructions
    }

    /// Render documents as `[n] source - section (subsection):\ntext`
    /// entries joined by a `---` separator. `None` when there are no documents.
    pub fn render_context(&self, documents: &[RetrievedDocument]) -> Option<String> {
        if documents.is_empty() {
            return None;
        }

        let entries: Vec<String> = documents
            .iter()
            .enumerate()
            .map(|(i, doc)| {
                let meta = &doc.metadata;
                match meta.subsection.as_deref().filter(|s| !s.is_empty()) {
                    Some(sub) => format!(
                        "[{}] {} - {} ({sub}):\n{}",
                        i + 1,
                        meta.source,
                        meta.section,
                        doc.text
                    ),
                    None => {
                        format!("[{}] {} - {}:\n{}", i + 1, meta.source, meta.section, doc.text)
                    }
                }
            })
            .collect();

        Some(entries.join(ENTRY_SEPARATOR))
    }

    /// Base instructions followed by the context block.
    pub fn system_prompt(&self, documents: &[RetrievedDocument]) -> String {
        let context = self.render_context(documents);
        format!(
            "{}{CONTEXT_HEADER}{}",
            self.base_instructions,
            context.as_deref().unwrap_or(NO_CONTEXT_MARKER)
        )
    }
}

/// A read-only view of the most recent messages of a conversation.
#[derive(Debug, Clone, Copy)]
pub struct ConversationWindow<'a> {
    messages: &'a [ChatMessage],
}

impl<'a> ConversationWindow<'a> {
    /// The last `max` messages of `history`, in their original order.
    pub fn last(history: &'a [ChatMessage], max: usize) -> Self {
        let start = history.len().saturating_sub(max);
        Self { messages: &history[start..] }
    }

    pub fn messages(&self) -> &'a [ChatMessage] {
        self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'a, ChatMessage> {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use helpdesk_model::ChatRole;

    use super::*;
    use crate::document::DocumentMetadata;

    fn doc(source: &str, section: &str, subsection: Option<&str>, text: &str) -> RetrievedDocument {
        RetrievedDocument {
            id: format!("{source}-{section}"),
            text: text.into(),
            score: 0.8,
            metadata: DocumentMetadata {
                source: source.into(),
                section: section.into(),
                title: None,
                subsection: subsection.map(Into::into),
            },
        }
    }

    #[test]
    fn renders_numbered_entries_with_optional_subsection() {
        let assembler = ContextAssembler::new("Base");
        let rendered = assembler
            .render_context(&[
                doc("guide.md", "setup", Some("keys"), "Open Settings"),
                doc("faq.md", "billing", Some(""), "Monthly"),
            ])
            .unwrap();

        assert_eq!(
            rendered,
            "[1] guide.md - setup (keys):\nOpen Settings\n\n---\n\n[2] faq.md - billing:\nMonthly"
        );
    }

    #[test]
    fn system_prompt_appends_context_block() {
        let assembler = ContextAssembler::new("Base");
        let prompt = assembler.system_prompt(&[doc("a.md", "s", None, "T")]);
        assert_eq!(prompt, "Base\n\nContext from documentation:\n[1] a.md - s:\nT");
    }

    #[test]
    fn system_prompt_without_documents_uses_marker() {
        let assembler = ContextAssembler::new("Base");
        assert!(assembler.render_context(&[]).is_none());
        assert_eq!(
            assembler.system_prompt(&[]),
            "Base\n\nContext from documentation:\nNo context available."
        );
    }

    #[test]
    fn window_keeps_last_messages_in_order() {
        let history: Vec<ChatMessage> = (1..=6)
            .map(|i| {
                let role = if i % 2 == 1 { ChatRole::User } else { ChatRole::Assistant };
                ChatMessage::new(role, format!("m{i}"))
            })
            .collect();

        let window = ConversationWindow::last(&history, 4);
        let contents: Vec<&str> = window.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m3", "m4", "m5", "m6"]);
        assert_eq!(history.len(), 6);
    }

    #[test]
    fn window_edge_cases() {
        let history = vec![ChatMessage::user("only")];
        assert!(ConversationWindow::last(&history, 0).is_empty());
        assert_eq!(ConversationWindow::last(&history, 10).len(), 1);
        assert!(ConversationWindow::last(&[], 4).is_empty());
    }
}
