//! Reading pre-chunked documents for indexing.

use std::io::BufRead;

use anyhow::Context;
use helpdesk_rag::DocumentChunk;

/// Parse one [`DocumentChunk`] per non-blank line.
///
/// Errors name the offending line number.
pub fn read_chunks(reader: impl BufRead) -> anyhow::Result<Vec<DocumentChunk>> {
    let mut chunks = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", i + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let chunk: DocumentChunk = serde_json::from_str(&line)
            .with_context(|| format!("invalid chunk on line {}", i + 1))?;
        chunks.push(chunk);
    }
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_chunks_and_skips_blank_lines() {
        let input = concat!(
            r#"{"id":"faq_0","text":"Reset via email.","metadata":{"source":"faq.md","section":"account","chunkIndex":0}}"#,
            "\n\n",
            r#"{"id":"faq_1","text":"Export under Settings.","metadata":{"source":"faq.md","section":"data","subsection":"Export","chunkIndex":1},"embedding":[0.1,0.2]}"#,
            "\n",
        );

        let chunks = read_chunks(input.as_bytes()).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].id, "faq_0");
        assert!(chunks[0].embedding.is_none());
        assert_eq!(chunks[1].metadata.chunk_index, 1);
        assert_eq!(chunks[1].metadata.document.subsection.as_deref(), Some("Export"));
        assert_eq!(chunks[1].embedding.as_deref(), Some(&[0.1, 0.2][..]));
    }

    #[test]
    fn error_names_the_line() {
        let input = "\n{\"id\":\"x\"}\n";
        let err = read_chunks(input.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
