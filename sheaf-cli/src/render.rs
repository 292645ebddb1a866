//! Terminal rendering of gather output.

use sheaf_core::ContentBlock;

/// Render content blocks for stdout. Text blocks pass through verbatim;
/// binary payloads become a one-line notice since raw bytes do not belong
/// on a terminal.
pub fn render_blocks(blocks: &[ContentBlock]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            ContentBlock::Text(text) => out.push_str(text),
            ContentBlock::Binary {
                display,
                mime,
                data,
            } => {
                out.push_str(&format!(
                    "[binary file: {} ({}, {} bytes)]\n\n",
                    display,
                    mime,
                    data.len()
                ));
            }
        }
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_blocks_pass_through() {
        let blocks = vec![
            ContentBlock::Text("--- a.md ---\nA\n\n".to_string()),
            ContentBlock::Text("--- End of content ---".to_string()),
        ];
        assert_eq!(
            render_blocks(&blocks),
            "--- a.md ---\nA\n\n--- End of content ---\n"
        );
    }

    #[test]
    fn test_binary_block_becomes_notice() {
        let blocks = vec![ContentBlock::Binary {
            display: "logo.png".to_string(),
            mime: "image/png",
            data: vec![0; 64],
        }];
        assert_eq!(
            render_blocks(&blocks),
            "[binary file: logo.png (image/png, 64 bytes)]\n\n"
        );
    }
}
