//! Parse YAML front matter of skill and agent documents.
//!
//! Documents open with a `---` line, carry a YAML-like header, close it with a
//! second `---` line and continue with a markdown body. The header is parsed
//! with `serde_yaml`; documents whose header is not strictly valid YAML (for
//! example an unquoted `description: Use when: ...`) fall back to a line
//! scanner that understands plain `key: value` pairs and block scalars.

use serde_yaml::{Mapping, Value};

/// Parsed front-matter header.
///
/// Keys keep their source order. Unknown keys are retained and ignored by
/// callers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    entries: Vec<(String, FieldValue)>,
}

/// A single header value: either a scalar string or a list of strings.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FrontMatter {
    /// Get a scalar field as a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.entries.iter().find_map(|(k, v)| match v {
            FieldValue::Text(s) if k == key => Some(s.as_str()),
            _ => None,
        })
    }

    /// Get a field as a list of strings.
    ///
    /// A scalar is split on commas, so both `tools: Read, Grep` and
    /// `tools: [Read, Grep]` give the same result.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        let Some((_, value)) = self.entries.iter().find(|(k, _)| k == key) else {
            return Vec::new();
        };
        match value {
            FieldValue::Text(s) => split_inline_list(s),
            FieldValue::List(items) => items.clone(),
        }
    }

    fn insert(&mut self, key: String, value: FieldValue) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }
}

/// Split content into the raw header and the body.
///
/// The body is returned verbatim: everything after the closing delimiter
/// line, including its trailing newline. Returns `None` when the document
/// does not open with `---` or the block is never closed.
pub fn split(content: &str) -> Option<(&str, &str)> {
    let rest = strip_delimiter_line(content)?;
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']).trim() == "---" {
            let header = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((header, body));
        }
        offset += line.len();
    }
    None
}

fn strip_delimiter_line(content: &str) -> Option<&str> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let first_end = content.find('\n')?;
    if content[..first_end].trim() != "---" {
        return None;
    }
    Some(&content[first_end + 1..])
}

/// Parse a raw header block.
pub fn parse(header: &str) -> FrontMatter {
    match serde_yaml::from_str::<Value>(header) {
        Ok(Value::Mapping(mapping)) => from_mapping(&mapping),
        Ok(Value::Null) => FrontMatter::default(),
        Ok(_) | Err(_) => scan_lines(header),
    }
}

/// Split a document and parse its header in one step.
pub fn parse_document(content: &str) -> Option<(FrontMatter, &str)> {
    let (header, body) = split(content)?;
    Some((parse(header), body))
}

fn from_mapping(mapping: &Mapping) -> FrontMatter {
    let mut fm = FrontMatter::default();
    for (key, value) in mapping {
        let Some(key) = scalar_to_string(key) else {
            continue;
        };
        let value = match value {
            Value::Sequence(items) => {
                FieldValue::List(items.iter().filter_map(scalar_to_string).collect())
            }
            other => match scalar_to_string(other) {
                Some(s) => FieldValue::Text(s),
                None => continue,
            },
        };
        fm.insert(key, value);
    }
    fm
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(Clone, Copy, PartialEq)]
enum BlockStyle {
    Folded,
    Literal,
}

struct PendingBlock {
    key: String,
    style: BlockStyle,
    lines: Vec<String>,
}

impl PendingBlock {
    fn finish(self, fm: &mut FrontMatter) {
        let text = match self.style {
            BlockStyle::Folded => self.lines.join(" "),
            BlockStyle::Literal => self.lines.join("\n"),
        };
        fm.insert(self.key, FieldValue::Text(text.trim().to_string()));
    }
}

/// Line-oriented fallback for headers `serde_yaml` rejects.
fn scan_lines(header: &str) -> FrontMatter {
    let mut fm = FrontMatter::default();
    let mut pending: Option<PendingBlock> = None;
    let mut list_key: Option<(String, Vec<String>)> = None;

    for line in header.lines() {
        let indented = line.starts_with(' ') || line.starts_with('\t');

        if indented {
            let trimmed = line.trim();
            if let Some(block) = pending.as_mut() {
                if !trimmed.is_empty() {
                    block.lines.push(trimmed.to_string());
                }
                continue;
            }
            if let Some((_, items)) = list_key.as_mut() {
                if let Some(item) = trimmed.strip_prefix("- ") {
                    items.push(unquote(item.trim()).to_string());
                }
                continue;
            }
            continue;
        }

        if let Some(block) = pending.take() {
            block.finish(&mut fm);
        }
        if let Some((key, items)) = list_key.take() {
            fm.insert(key, FieldValue::List(items));
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_string();
        if key.is_empty() || key.starts_with('#') {
            continue;
        }
        let value = value.trim();
        match value {
            ">" | ">-" | ">+" => {
                pending = Some(PendingBlock {
                    key,
                    style: BlockStyle::Folded,
                    lines: Vec::new(),
                });
            }
            "|" | "|-" | "|+" => {
                pending = Some(PendingBlock {
                    key,
                    style: BlockStyle::Literal,
                    lines: Vec::new(),
                });
            }
            "" => list_key = Some((key, Vec::new())),
            _ if value.starts_with('[') && value.ends_with(']') => {
                let inner = &value[1..value.len() - 1];
                fm.insert(key, FieldValue::List(split_inline_list(inner)));
            }
            _ => fm.insert(key, FieldValue::Text(unquote(value).to_string())),
        }
    }

    if let Some(block) = pending.take() {
        block.finish(&mut fm);
    }
    if let Some((key, items)) = list_key.take() {
        fm.insert(key, FieldValue::List(items));
    }
    fm
}

fn unquote(value: &str) -> &str {
    let stripped = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')));
    stripped.unwrap_or(value)
}

fn split_inline_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| unquote(item.trim()).trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
