use super::PresentationMeta;
use crate::error::{DeckError, DeckResult};

/// Split YAML front matter (between leading `---` lines) from the body.
///
/// A document without front matter yields default metadata and the whole
/// text as body.
pub fn extract(content: &str) -> DeckResult<(PresentationMeta, String)> {
    let content = content.replace("\r\n", "\n");
    let Some(rest) = content.strip_prefix("---\n") else {
        return Ok((PresentationMeta::default(), content));
    };

    let Some(end) = find_closing_fence(rest) else {
        return Ok((PresentationMeta::default(), content));
    };

    let yaml = &rest[..end];
    let body = rest[end..]
        .split_once('\n')
        .map(|(_, body)| body)
        .unwrap_or("");

    let meta = if yaml.trim().is_empty() {
        PresentationMeta::default()
    } else {
        serde_yaml::from_str(yaml)
            .map_err(|e| DeckError::no_deck(format!("invalid front matter: {e}")))?
    };

    Ok((meta, body.to_string()))
}

/// Byte offset of the line that closes the front matter block.
fn find_closing_fence(rest: &str) -> Option<usize> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}
