//! Strict parsing of oracle replies into tagged verdicts.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

/// A parsed answer. `Malformed` keeps the text that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "detail", rename_all = "snake_case")]
pub enum Verdict<T> {
    Yes(T),
    No,
    Malformed(String),
}

impl<T> Verdict<T> {
    #[must_use]
    pub fn is_yes(&self) -> bool {
        matches!(self, Self::Yes(_))
    }

    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

/// Per-method answer to "does this method need refactoring".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    /// The reply as received, kept for the result record.
    pub raw: String,
    /// `(method, verdict)` in reply order; `Yes` carries the instruction.
    pub methods: Vec<(String, Verdict<String>)>,
}

impl Assessment {
    /// Nothing in the reply could be read as a method verdict.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        self.methods.is_empty()
    }

    #[must_use]
    pub fn any_yes(&self) -> bool {
        self.methods.iter().any(|(_, v)| v.is_yes())
    }

    /// `method: instruction` lines for every method that needs work.
    #[must_use]
    pub fn instructions(&self) -> Vec<String> {
        self.methods
            .iter()
            .filter_map(|(name, v)| match v {
                Verdict::Yes(text) if text.is_empty() => Some(name.clone()),
                Verdict::Yes(text) => Some(format!("{name}: {text}")),
                _ => None,
            })
            .collect()
    }
}

/// Returns the body of the first fenced code block, or the trimmed text
/// when there is none. An unterminated fence runs to the end.
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    let Some(open) = text.find("```") else {
        return text.trim().to_string();
    };
    let after_marker = &text[open + 3..];
    let inner = after_marker
        .find("```")
        .map_or(after_marker, |close| &after_marker[..close]);
    drop_language_tag(inner).trim_matches('\n').trim_end().to_string()
}

/// Source text from a code reply: the fenced body ending in exactly one
/// newline. Empty when the reply carries no code.
#[must_use]
pub fn extract_code(text: &str) -> String {
    let mut code = strip_code_fences(text);
    if !code.is_empty() {
        code.push('\n');
    }
    code
}

const LANGUAGE_TAGS: [&str; 7] = ["java", "json", "text", "txt", "plaintext", "markdown", "md"];

/// Strips the info string from the text between two fence markers.
fn drop_language_tag(inner: &str) -> &str {
    let line_end = inner.find('\n').unwrap_or(inner.len());
    let first = &inner[..line_end];
    let leading = first.len() - first.trim_start().len();
    let head = &first[leading..];

    match head.find(char::is_whitespace) {
        // A lone word on the opening line is a tag unless nothing follows it.
        None if line_end < inner.len() => {
            let rest = &inner[line_end + 1..];
            if rest.trim().is_empty() {
                inner
            } else {
                rest
            }
        }
        None => inner,
        Some(word_end) if LANGUAGE_TAGS.contains(&head[..word_end].to_ascii_lowercase().as_str()) => {
            inner[leading + word_end..].trim_start_matches([' ', '\t'])
        }
        Some(_) => inner,
    }
}

/// Reads a needs-refactoring reply: a JSON object first, then
/// `Name: value` lines.
#[must_use]
pub fn parse_assessment(reply: &str) -> Assessment {
    let body = strip_code_fences(reply);
    let methods = serde_json::from_str::<serde_json::Map<String, Value>>(&body)
        .map(|map| {
            map.into_iter()
                .map(|(name, value)| (name, verdict_from_json(&value)))
                .collect()
        })
        .unwrap_or_else(|_| verdicts_from_lines(&body));
    Assessment {
        raw: reply.to_string(),
        methods,
    }
}

/// Reads a true/false style answer.
#[must_use]
pub fn parse_decision(reply: &str) -> Verdict<()> {
    let body = strip_code_fences(reply).to_lowercase();
    let words: Vec<&str> = body
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    match words.first().copied() {
        Some("true" | "yes") => return Verdict::Yes(()),
        Some("false" | "no") => return Verdict::No,
        _ => {}
    }
    let has_true = words.contains(&"true");
    let has_false = words.contains(&"false");
    match (has_true, has_false) {
        (true, false) => Verdict::Yes(()),
        (false, true) => Verdict::No,
        _ => Verdict::Malformed(reply.trim().to_string()),
    }
}

fn verdict_from_json(value: &Value) -> Verdict<String> {
    match value {
        Value::String(s) => verdict_from_text(s),
        Value::Bool(true) => Verdict::Yes(String::new()),
        Value::Bool(false) => Verdict::No,
        Value::Array(items) => match items.as_slice() {
            [Value::String(flag), rest @ ..] => {
                let instruction = rest
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                match verdict_from_text(flag) {
                    Verdict::Yes(_) => Verdict::Yes(instruction),
                    other => other,
                }
            }
            _ => Verdict::Malformed(value.to_string()),
        },
        Value::Object(fields) => {
            let flag = ["needs", "needs_refactoring", "answer", "verdict"]
                .iter()
                .find_map(|k| fields.get(*k));
            let instruction = ["instruction", "improvement", "improvement_instruction"]
                .iter()
                .find_map(|k| fields.get(*k).and_then(Value::as_str))
                .unwrap_or_default()
                .to_string();
            match flag.map(verdict_from_json) {
                Some(Verdict::Yes(_)) => Verdict::Yes(instruction),
                Some(other) => other,
                None => Verdict::Malformed(value.to_string()),
            }
        }
        _ => Verdict::Malformed(value.to_string()),
    }
}

/// `yes, do X` / `(Yes, do X)` / `No`.
fn verdict_from_text(text: &str) -> Verdict<String> {
    let cleaned = text
        .trim()
        .trim_end_matches(',')
        .trim_matches(|c| matches!(c, '(' | ')' | '"' | '\''))
        .trim();
    let head_len = cleaned
        .find(|c: char| !c.is_alphabetic())
        .unwrap_or(cleaned.len());
    match cleaned[..head_len].to_lowercase().as_str() {
        "yes" | "true" => {
            let rest = cleaned[head_len..]
                .trim_start_matches(|c: char| c == ',' || c == ':' || c == '-' || c.is_whitespace());
            Verdict::Yes(rest.trim().to_string())
        }
        "no" | "false" => Verdict::No,
        _ => Verdict::Malformed(text.to_string()),
    }
}

static METHOD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*[-*]?\s*"?([A-Za-z_$][\w$]*(?:\([^)]*\))?)"?\s*:\s*(.+?)\s*$"#)
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

fn verdicts_from_lines(body: &str) -> Vec<(String, Verdict<String>)> {
    body.lines()
        .filter_map(|line| {
            let caps = METHOD_LINE.captures(line)?;
            let name = caps.get(1)?.as_str().to_string();
            let verdict = verdict_from_text(caps.get(2)?.as_str());
            (!verdict.is_malformed()).then_some((name, verdict))
        })
        .collect()
}
