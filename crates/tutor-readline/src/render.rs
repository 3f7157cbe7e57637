//! Terminal rendering of assistant replies.
//!
//! Handles the Markdown subset the tutor produces: ATX headings, fenced
//! code blocks, bullet and numbered lists, block quotes, rules, and the
//! inline forms `**bold**`, `*italic*`, `` `code` `` and `[text](url)`.
//! Anything else passes through untouched.

use std::sync::LazyLock;

use colored::Colorize;
use regex::{Captures, Regex};

static HEADING: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}(#{1,6})\s+(.*?)\s*#*\s*$").ok());

static RULE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s{0,3}(?:-{3,}|\*{3,}|_{3,})\s*$").ok());

static QUOTE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\s*>\s?(.*)$").ok());

static BULLET: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^(\s*)[-*+]\s+(.*)$").ok());

static ORDERED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\s*)(\d+)[.)]\s+(.*)$").ok());

static CODE_SPAN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"`([^`]+)`").ok());

static LINK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").ok());

static BOLD: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").ok());

// No whitespace just inside the markers, so `2 * 3 * 4` is left alone.
static ITALIC: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\*([^*\s](?:[^*]*[^*\s])?)\*").ok());

const FENCE: &str = "```";

/// Renders `text` for an ANSI terminal.
pub fn render_markdown(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut in_fence = false;

    for line in text.lines() {
        if let Some(info) = line.trim_start().strip_prefix(FENCE) {
            if in_fence {
                out.push("└".bright_black().to_string());
            } else {
                let language = info.trim();
                out.push(format!("{} {}", "┌".bright_black(), language.bright_black()).trim_end().to_string());
            }
            in_fence = !in_fence;
            continue;
        }

        if in_fence {
            out.push(format!("{} {}", "│".bright_black(), line.yellow()));
        } else {
            out.push(render_block_line(line));
        }
    }

    out.join("\n")
}

fn render_block_line(line: &str) -> String {
    if let Some(caps) = captures(&HEADING, line) {
        let title = render_inline(&caps[2]);
        return if caps[1].len() == 1 {
            title.bright_magenta().bold().underline().to_string()
        } else {
            title.bold().to_string()
        };
    }
    if matches(&RULE, line) {
        return "─".repeat(40).bright_black().to_string();
    }
    if let Some(caps) = captures(&QUOTE, line) {
        return format!("{} {}", "│".bright_black(), render_inline(&caps[1]).italic());
    }
    if let Some(caps) = captures(&BULLET, line) {
        return format!("{}{} {}", &caps[1], "•".cyan(), render_inline(&caps[2]));
    }
    if let Some(caps) = captures(&ORDERED, line) {
        return format!("{}{} {}", &caps[1], format!("{}.", &caps[2]).cyan(), render_inline(&caps[3]));
    }
    render_inline(line)
}

/// Styles inline spans. Code spans are cut out first so their content
/// is never read as emphasis.
fn render_inline(text: &str) -> String {
    let Some(code) = CODE_SPAN.as_ref() else {
        return style_spans(text);
    };

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in code.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&style_spans(&text[last..whole.start()]));
        out.push_str(&inner.as_str().yellow().to_string());
        last = whole.end();
    }
    out.push_str(&style_spans(&text[last..]));
    out
}

fn style_spans(text: &str) -> String {
    let mut out = text.to_string();
    if let Some(link) = LINK.as_ref() {
        out = link
            .replace_all(&out, |caps: &Captures| {
                format!("{} ({})", caps[1].bright_blue().underline(), caps[2].bright_black())
            })
            .into_owned();
    }
    if let Some(bold) = BOLD.as_ref() {
        out = bold
            .replace_all(&out, |caps: &Captures| caps[1].bold().to_string())
            .into_owned();
    }
    if let Some(italic) = ITALIC.as_ref() {
        out = italic
            .replace_all(&out, |caps: &Captures| caps[1].italic().to_string())
            .into_owned();
    }
    out
}

fn captures<'t>(pattern: &LazyLock<Option<Regex>>, line: &'t str) -> Option<Captures<'t>> {
    pattern.as_ref()?.captures(line)
}

fn matches(pattern: &LazyLock<Option<Regex>>, line: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(line))
}
