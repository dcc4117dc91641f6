//! Configuration templates and placeholder rendering.
//!
//! ## Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  raw value (serde_json::Value, from a TemplateLoader)        │
//! │  └── Template::from_raw  → shape checks                      │
//! │        ├── content: String          ("{{ip}}:{{port}}")      │
//! │        └── variables: name → VariableType                    │
//! │  TemplateContext (name → Value)                              │
//! │  └── Template::render    → String, or UnresolvedPlaceholder  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A placeholder is `{{identifier}}`, where the identifier is made of ASCII
//! letters, digits and underscores; whitespace just inside the braces is
//! ignored. Anything else between braces (e.g. Go templates such as
//! `{{.State.Running}}`) is plain text and is copied through unchanged.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::DomainError;

// ── Variable types ────────────────────────────────────────────────────────────

/// Declared type of a template variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    String,
    Number,
    Boolean,
    Secret,
}

impl VariableType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Secret => "secret",
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariableType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "number" => Ok(Self::Number),
            "boolean" | "bool" => Ok(Self::Boolean),
            "secret" => Ok(Self::Secret),
            other => Err(format!("unknown variable type '{other}'")),
        }
    }
}

// ── Template ──────────────────────────────────────────────────────────────────

/// A named, parameterized configuration blueprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    content: String,
    variables: BTreeMap<String, VariableType>,
}

impl Template {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            variables: BTreeMap::new(),
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, ty: VariableType) -> Self {
        self.variables.insert(name.into(), ty);
        self
    }

    /// Build a template from a loader's raw value.
    ///
    /// # Shape rules
    ///
    /// - `raw` must be an object.
    /// - `content`, if present, must be a string. If absent, the whole raw
    ///   value is serialized (pretty JSON) and becomes the content, so one
    ///   blueprint can describe an entire structured file.
    /// - `variables`, if present, must map names to type tags.
    pub fn from_raw(name: &str, raw: &Value) -> Result<Self, DomainError> {
        let invalid = |reason: String| DomainError::InvalidTemplate {
            name: name.to_string(),
            reason,
        };

        let object = raw
            .as_object()
            .ok_or_else(|| invalid(format!("expected an object, found {}", kind_of(raw))))?;

        let content = match object.get("content") {
            Some(Value::String(content)) => content.clone(),
            Some(other) => {
                return Err(invalid(format!(
                    "'content' must be a string, found {}",
                    kind_of(other)
                )));
            }
            None => serde_json::to_string_pretty(raw)
                .map_err(|e| invalid(format!("failed to serialize structured content: {e}")))?,
        };

        let mut variables = BTreeMap::new();
        match object.get("variables") {
            None => {}
            Some(Value::Object(map)) => {
                for (var, tag) in map {
                    let tag = tag.as_str().ok_or_else(|| {
                        invalid(format!("variable '{var}' must have a string type tag"))
                    })?;
                    let ty = tag
                        .parse::<VariableType>()
                        .map_err(|e| invalid(format!("variable '{var}': {e}")))?;
                    variables.insert(var.clone(), ty);
                }
            }
            Some(other) => {
                return Err(invalid(format!(
                    "'variables' must be an object, found {}",
                    kind_of(other)
                )));
            }
        }

        Ok(Self {
            name: name.to_string(),
            content,
            variables,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn variables(&self) -> &BTreeMap<String, VariableType> {
        &self.variables
    }

    /// Distinct placeholder names in first-appearance order.
    pub fn placeholders(&self) -> Vec<&str> {
        placeholders(&self.content)
    }

    /// Substitute every placeholder from `context`.
    ///
    /// All placeholders are resolved before any output is built, so a
    /// missing value never yields a half-rendered string. Pure: the same
    /// template and context always give the same output.
    pub fn render(&self, context: &TemplateContext) -> Result<String, DomainError> {
        let segments = segments(&self.content);

        let mut resolved: BTreeMap<&str, String> = BTreeMap::new();
        for segment in &segments {
            if let Segment::Placeholder(name) = segment {
                if resolved.contains_key(name) {
                    continue;
                }
                let value = context.get(name).and_then(stringify).ok_or_else(|| {
                    DomainError::UnresolvedPlaceholder {
                        template: self.name.clone(),
                        placeholder: (*name).to_string(),
                    }
                })?;
                resolved.insert(*name, value);
            }
        }

        let mut output = String::with_capacity(self.content.len());
        for segment in &segments {
            match segment {
                Segment::Text(text) => output.push_str(text),
                Segment::Placeholder(name) => output.push_str(&resolved[name]),
            }
        }
        Ok(output)
    }
}

// ── Context ───────────────────────────────────────────────────────────────────

/// Variables handed to [`Template::render`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TemplateContext {
    values: BTreeMap<String, Value>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for TemplateContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Self::new();
        for (k, v) in iter {
            ctx.insert(k, v);
        }
        ctx
    }
}

// ── Scanner ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

/// Distinct placeholder names in `content`, in first-appearance order.
pub fn placeholders(content: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for segment in segments(content) {
        if let Segment::Placeholder(name) = segment {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Split `content` into literal text and placeholder names.
fn segments(content: &str) -> Vec<Segment<'_>> {
    let bytes = content.as_bytes();
    let mut out = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i] == b'{' && bytes[i + 1] == b'{' {
            let Some(rel) = content[i + 2..].find("}}") else {
                break;
            };
            let inner = content[i + 2..i + 2 + rel].trim();
            if is_identifier(inner) {
                if text_start < i {
                    out.push(Segment::Text(&content[text_start..i]));
                }
                out.push(Segment::Placeholder(inner));
                i += 2 + rel + 2;
                text_start = i;
                continue;
            }
        }
        i += 1;
    }

    if text_start < content.len() {
        out.push(Segment::Text(&content[text_start..]));
    }
    out
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Canonical string form of a context value; `None` for null.
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
