const SLIDE_BREAK: &str = "\x00SLIDE_BREAK\x00";

/// Split a document body (front matter already removed) into raw slides.
///
/// A slide break is any of:
/// 1. `---` with blank lines (or the document edge) on both sides
/// 2. three or more consecutive blank lines
/// 3. a `# ` heading once the current slide already has content
pub fn split(body: &str) -> Vec<String> {
    let body = body.replace("\r\n", "\n");
    let lines: Vec<&str> = body.split('\n').collect();

    let marked = mark_blank_runs(&mark_dash_separators(&lines));

    marked
        .join("\n")
        .split(SLIDE_BREAK)
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .flat_map(split_by_heading)
        .collect()
}

/// Replace `---` lines that sit between blank lines with a break marker.
fn mark_dash_separators<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if is_dash_separator(line.trim()) {
            let prev_blank = out
                .last()
                .is_none_or(|l| l.trim().is_empty() || *l == SLIDE_BREAK);
            let next_blank = lines.get(i + 1).is_none_or(|l| l.trim().is_empty());
            if prev_blank && next_blank {
                if out.last().is_some_and(|l| l.trim().is_empty()) {
                    out.pop();
                }
                out.push(SLIDE_BREAK);
                // The blank line after the separator belongs to the break.
                i += 2;
                continue;
            }
        }
        out.push(line);
        i += 1;
    }
    out
}

/// Collapse runs of three or more blank lines into a break marker.
fn mark_blank_runs<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut blanks = 0;
    for &line in lines {
        if line == SLIDE_BREAK {
            blanks = 0;
            out.push(line);
        } else if line.trim().is_empty() {
            blanks += 1;
            match blanks {
                1 | 2 => out.push(line),
                3 => {
                    out.truncate(out.len() - 2);
                    out.push(SLIDE_BREAK);
                }
                _ => {}
            }
        } else {
            blanks = 0;
            out.push(line);
        }
    }
    out
}

/// Start a new slide at every `# ` heading that follows content.
/// Lines inside fenced code blocks are never headings, and directives
/// directly above a heading travel with it.
fn split_by_heading(chunk: &str) -> Vec<String> {
    let mut slides = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut has_content = false;
    let mut fence: Option<(char, usize)> = None;

    for line in chunk.lines() {
        let trimmed = line.trim();

        match fence {
            Some((ch, len)) => {
                let closing = trimmed.chars().take_while(|&c| c == ch).count();
                if closing >= len && trimmed.chars().skip(closing).all(char::is_whitespace) {
                    fence = None;
                }
            }
            None => {
                if let Some(ch) = ['`', '~']
                    .into_iter()
                    .find(|&ch| trimmed.starts_with(&ch.to_string().repeat(3)))
                {
                    fence = Some((ch, trimmed.chars().take_while(|&c| c == ch).count()));
                }
            }
        }

        if line.starts_with("# ") && has_content && fence.is_none() {
            let carried = take_trailing_directives(&mut current);
            push_slide(&mut slides, &current);
            current = carried;
            has_content = false;
        }

        current.push(line);
        if !trimmed.is_empty() && !is_directive(trimmed) {
            has_content = true;
        }
    }

    push_slide(&mut slides, &current);
    slides
}

fn push_slide(slides: &mut Vec<String>, lines: &[&str]) {
    let text = lines.join("\n");
    let text = text.trim();
    if !text.is_empty() {
        slides.push(text.to_string());
    }
}

/// Remove trailing directive (and blank) lines from `lines`, returning the
/// directives so they can lead the next slide.
fn take_trailing_directives<'a>(lines: &mut Vec<&'a str>) -> Vec<&'a str> {
    let keep = lines
        .iter()
        .rposition(|l| {
            let t = l.trim();
            !t.is_empty() && !is_directive(t)
        })
        .map_or(0, |i| i + 1);
    lines
        .split_off(keep)
        .into_iter()
        .filter(|l| !l.trim().is_empty())
        .collect()
}

fn is_dash_separator(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

fn is_directive(line: &str) -> bool {
    let Some(rest) = line.strip_prefix('@') else {
        return false;
    };
    rest.split_once(':').is_some_and(|(name, _)| {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    })
}
