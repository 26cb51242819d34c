use super::Inline;

type Wrap = fn(Vec<Inline>) -> Inline;

const EMPHASIS: [(&str, Wrap); 3] = [
    ("**", Inline::Bold),
    ("~~", Inline::Strikethrough),
    ("*", Inline::Italic),
];

/// Parse inline markdown: `**bold**`, `*italic*`, `~~strike~~`, `` `code` ``
/// and `[text](url)`. Unterminated markers are kept as literal text.
pub fn parse(text: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut literal = String::new();
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if let Some((inline, consumed)) = parse_span(rest) {
            if !literal.is_empty() {
                out.push(Inline::Text(std::mem::take(&mut literal)));
            }
            out.push(inline);
            rest = &rest[consumed..];
        } else {
            literal.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    if !literal.is_empty() {
        out.push(Inline::Text(literal));
    }
    out
}

/// Try to parse one span at the start of `s`, returning it and the number of
/// bytes consumed.
fn parse_span(s: &str) -> Option<(Inline, usize)> {
    if let Some(inner) = s.strip_prefix('`') {
        let end = inner.find('`')?;
        return Some((Inline::Code(inner[..end].to_string()), end + 2));
    }

    for (delim, wrap) in EMPHASIS {
        let Some(inner) = s.strip_prefix(delim) else {
            continue;
        };
        match inner.find(delim) {
            Some(end) if end > 0 => {
                return Some((wrap(parse(&inner[..end])), end + 2 * delim.len()));
            }
            _ => continue,
        }
    }

    if let Some(inner) = s.strip_prefix('[') {
        let close = inner.find("](")?;
        let after = &inner[close + 2..];
        let end = after.find(')')?;
        let link = Inline::Link {
            text: parse(&inner[..close]),
            url: after[..end].to_string(),
        };
        return Some((link, 1 + close + 2 + end + 1));
    }

    None
}
