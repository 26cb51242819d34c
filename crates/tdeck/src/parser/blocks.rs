use std::sync::LazyLock;

use regex::Regex;

use super::{Block, Directive, ListItem, ListMarker, inline};

static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z0-9_-]+):\s*(.*)$").expect("valid regex"));
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*?)(?:\s+#+)?\s*$").expect("valid regex"));
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)([-+*]|\d+[.)])\s+(.*)$").expect("valid regex"));
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!\[([^\]]*)\]\(([^)]+)\)$").expect("valid regex"));

/// Pull `@key: value` lines out of a slide, returning them and the remaining
/// markdown. Directives inside code fences are left alone.
pub fn extract_directives(raw: &str) -> (Vec<Directive>, String) {
    let mut directives = Vec::new();
    let mut content = Vec::new();
    let mut in_fence = false;

    for line in raw.lines() {
        let trimmed = line.trim();
        if is_fence(trimmed) {
            in_fence = !in_fence;
        }
        if !in_fence {
            if let Some(caps) = DIRECTIVE.captures(trimmed) {
                directives.push(Directive {
                    name: caps[1].to_ascii_lowercase(),
                    value: caps[2].trim().to_string(),
                });
                continue;
            }
        }
        content.push(line);
    }

    (directives, content.join("\n"))
}

/// Parse a slide's markdown into blocks.
pub fn parse(content: &str) -> Vec<Block> {
    let lines: Vec<&str> = content.lines().collect();
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if trimmed.is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks);
            i += 1;
            continue;
        }

        if is_fence(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            let (block, next) = parse_code_block(&lines, i);
            blocks.push(block);
            i = next;
            continue;
        }

        if let Some(caps) = HEADING.captures(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(Block::Heading {
                level: caps[1].len() as u8,
                inlines: inline::parse(&caps[2]),
            });
            i += 1;
            continue;
        }

        if is_rule(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(Block::HorizontalRule);
            i += 1;
            continue;
        }

        if let Some(caps) = IMAGE.captures(trimmed) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(Block::Image {
                alt: caps[1].to_string(),
                path: caps[2].to_string(),
            });
            i += 1;
            continue;
        }

        if trimmed.starts_with('>') {
            flush_paragraph(&mut paragraph, &mut blocks);
            let mut quoted = Vec::new();
            while i < lines.len() && lines[i].trim().starts_with('>') {
                quoted.push(lines[i].trim().trim_start_matches('>').trim());
                i += 1;
            }
            blocks.push(Block::BlockQuote {
                inlines: inline::parse(&quoted.join(" ")),
            });
            continue;
        }

        if LIST_ITEM.is_match(line) {
            flush_paragraph(&mut paragraph, &mut blocks);
            let start = i;
            while i < lines.len() && is_list_line(lines[i]) {
                i += 1;
            }
            let items = parse_list(&lines[start..i]);
            let ordered = items.first().is_some_and(|f| f.marker == ListMarker::Ordered);
            blocks.push(Block::List { ordered, items });
            continue;
        }

        paragraph.push(trimmed);
        i += 1;
    }

    flush_paragraph(&mut paragraph, &mut blocks);
    blocks
}

fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if paragraph.is_empty() {
        return;
    }
    blocks.push(Block::Paragraph {
        inlines: inline::parse(&paragraph.join(" ")),
    });
    paragraph.clear();
}

fn parse_code_block(lines: &[&str], start: usize) -> (Block, usize) {
    let opening = lines[start].trim();
    let fence_char = opening.chars().next().unwrap_or('`');
    let fence_len = opening.chars().take_while(|&c| c == fence_char).count();
    let info = opening[fence_len..].trim();
    let language = info
        .split_whitespace()
        .next()
        .map(str::to_string)
        .filter(|l| !l.is_empty());

    let mut code = Vec::new();
    let mut i = start + 1;
    while i < lines.len() {
        let trimmed = lines[i].trim();
        let closing = trimmed.chars().take_while(|&c| c == fence_char).count();
        if closing >= fence_len && trimmed.chars().skip(closing).all(char::is_whitespace) {
            i += 1;
            break;
        }
        code.push(lines[i]);
        i += 1;
    }

    (
        Block::CodeBlock {
            language,
            code: code.join("\n"),
        },
        i,
    )
}

/// A list continues through item lines and indented continuation lines.
fn is_list_line(line: &str) -> bool {
    LIST_ITEM.is_match(line) || (line.starts_with("  ") && !line.trim().is_empty())
}

fn parse_list(lines: &[&str]) -> Vec<ListItem> {
    // (indent, item) for every item line; continuation lines join the
    // previous item's text.
    let mut flat: Vec<(usize, ListMarker, String)> = Vec::new();
    for line in lines {
        if let Some(caps) = LIST_ITEM.captures(line) {
            let indent = caps[1].chars().count();
            let marker = match &caps[2] {
                "-" => ListMarker::Static,
                "+" => ListMarker::NextStep,
                "*" => ListMarker::WithPrev,
                _ => ListMarker::Ordered,
            };
            flat.push((indent, marker, caps[3].trim().to_string()));
        } else if let Some(last) = flat.last_mut() {
            last.2.push(' ');
            last.2.push_str(line.trim());
        }
    }

    let mut pos = 0;
    build_items(&flat, &mut pos, 0)
}

fn build_items(flat: &[(usize, ListMarker, String)], pos: &mut usize, indent: usize) -> Vec<ListItem> {
    let mut items: Vec<ListItem> = Vec::new();
    while *pos < flat.len() {
        let (item_indent, marker, text) = &flat[*pos];
        if *item_indent < indent {
            break;
        }
        if *item_indent > indent && !items.is_empty() {
            let children = build_items(flat, pos, *item_indent);
            if let Some(parent) = items.last_mut() {
                parent.children.extend(children);
            }
            continue;
        }
        items.push(ListItem {
            marker: *marker,
            inlines: inline::parse(text),
            children: Vec::new(),
        });
        *pos += 1;
    }
    items
}

fn is_fence(trimmed: &str) -> bool {
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

fn is_rule(trimmed: &str) -> bool {
    trimmed.len() >= 3
        && ['-', '_', '*']
            .iter()
            .any(|&rule| trimmed.chars().all(|c| c == rule))
}
