//! Manifest rendering.
//!
//! Templates are YAML documents with `{{NAME}}` placeholders standing
//! in for whole scalar or sequence values. Names are upper-case ASCII
//! letters, digits and underscores. Every substituted value is emitted
//! as a JSON literal (a double-quoted string, `true`/`false`, or a flow
//! sequence), which YAML reads back verbatim, so user-supplied text can
//! never change the document structure.
//!
//! Rendering is strict: a placeholder without a parameter is an error,
//! and so is one that does not stand alone as a mapping value, sequence
//! item or line (`name: db-{{NAME}}` and `name: "{{NAME}}"` both fail).

use std::collections::BTreeMap;

use crate::error::TemplateError;

/// A typed value substituted into a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestValue {
    String(String),
    Bool(bool),
    List(Vec<String>),
}

impl ManifestValue {
    fn to_literal(&self) -> String {
        match self {
            ManifestValue::String(s) => escape_for_yaml(serde_json::Value::from(s.as_str())),
            ManifestValue::Bool(b) => b.to_string(),
            ManifestValue::List(items) => escape_for_yaml(serde_json::Value::from(items.clone())),
        }
    }
}

/// JSON-encode `value`, then `\u`-escape the characters JSON leaves raw
/// but YAML treats as line breaks or rejects as non-printable.
fn escape_for_yaml(value: serde_json::Value) -> String {
    let json = value.to_string();
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if needs_yaml_escape(c) {
            out.push_str(&format!("\\u{:04X}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

fn needs_yaml_escape(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '\u{2028}' | '\u{2029}' | '\u{FEFF}' | '\u{FFFE}' | '\u{FFFF}'
        )
}

impl From<&str> for ManifestValue {
    fn from(value: &str) -> Self {
        ManifestValue::String(value.to_string())
    }
}

impl From<String> for ManifestValue {
    fn from(value: String) -> Self {
        ManifestValue::String(value)
    }
}

impl From<bool> for ManifestValue {
    fn from(value: bool) -> Self {
        ManifestValue::Bool(value)
    }
}

impl From<Vec<String>> for ManifestValue {
    fn from(value: Vec<String>) -> Self {
        ManifestValue::List(value)
    }
}

/// Named values available to a template.
#[derive(Debug, Clone, Default)]
pub struct ManifestParameters {
    values: BTreeMap<String, ManifestValue>,
}

impl ManifestParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ManifestValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ManifestValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ManifestValue> {
        self.values.get(name)
    }
}

/// A manifest template for one workload kind.
#[derive(Debug, Clone)]
pub struct ManifestTemplate {
    source: String,
}

impl ManifestTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Substitute every placeholder. Pure: the same template and
    /// parameters always produce the same text.
    pub fn render(&self, params: &ManifestParameters) -> Result<String, TemplateError> {
        let source = self.source.as_str();
        let mut out = String::with_capacity(source.len());
        let mut cursor = 0;

        while let Some(found) = source[cursor..].find("{{") {
            let open = cursor + found;
            out.push_str(&source[cursor..open]);

            let body_start = open + 2;
            let Some(len) = source[body_start..].find("}}") else {
                return Err(TemplateError::MalformedPlaceholder {
                    offset: open,
                    reason: "missing closing `}}`".into(),
                });
            };
            let name = source[body_start..body_start + len].trim();
            let close = body_start + len + 2;

            if !is_placeholder_name(name) {
                return Err(TemplateError::MalformedPlaceholder {
                    offset: open,
                    reason: format!("invalid placeholder name `{name}`"),
                });
            }
            if !is_whole_value(source, open, close) {
                return Err(TemplateError::MalformedPlaceholder {
                    offset: open,
                    reason: format!("placeholder {name} must stand for a whole value"),
                });
            }

            let value = params
                .get(name)
                .ok_or_else(|| TemplateError::UnresolvedPlaceholder(name.to_string()))?;
            out.push_str(&value.to_literal());
            cursor = close;
        }

        out.push_str(&source[cursor..]);
        Ok(out)
    }
}

/// Parse rendered YAML into the object submitted to the cluster.
pub fn parse_manifest(rendered: &str) -> Result<serde_json::Value, TemplateError> {
    let value: serde_json::Value =
        serde_yaml::from_str(rendered).map_err(|e| TemplateError::InvalidManifest(e.to_string()))?;
    if !value.is_object() {
        return Err(TemplateError::InvalidManifest(
            "top level must be a mapping".into(),
        ));
    }
    Ok(value)
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}

/// The token must be preceded on its line by nothing, `key: ` or `- `,
/// and followed only by whitespace.
fn is_whole_value(source: &str, open: usize, close: usize) -> bool {
    let line_start = source[..open].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[close..].find('\n').map_or(source.len(), |i| close + i);
    let before = &source[line_start..open];
    let after = &source[close..line_end];

    if !after.trim().is_empty() {
        return false;
    }
    let lead = before.trim_end();
    if lead.is_empty() {
        return true;
    }
    if lead.len() == before.len() {
        // No separating whitespace, e.g. `db-{{NAME}}` or `key:{{NAME}}`.
        return false;
    }
    if lead.trim_start().chars().all(|c| c == '-' || c == ' ') {
        // Sequence item, possibly nested: `- `, `- - `.
        return lead.trim_start().split(' ').all(|part| part.is_empty() || part == "-");
    }
    lead.ends_with(':') && !lead.trim_start().starts_with(['{', '['])
}
