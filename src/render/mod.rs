//! Value rendering.
//!
//! [`ValueRenderer::render`] turns a resolved entry into its display string.
//! A specialized [`Rule`] registered for the entry's tag wins when it yields a
//! non-empty string; otherwise the value is rendered generically by type.

mod format;
mod rules;

use std::fmt;

use crate::format::tiff::{Entry, EntryValue, FieldType, TagRegistry, TagScope};

pub use format::{apex_aperture, apex_shutter, fixed, float_ratio, pad2};
pub use rules::{GPS_RULES, TIFF_RULES};

// =============================================================================
// Rule
// =============================================================================

/// How a specialized tag is rendered.
#[derive(Clone, Copy)]
pub enum Rule {
    /// Label of the first integer (or byte) value
    Lookup {
        labels: &'static [(i64, &'static str)],
        /// Label for codes missing from the table; `None` falls back to the
        /// generic rendering
        default: Option<&'static str>,
    },

    /// Label of an ASCII value
    Letter {
        labels: &'static [(&'static str, &'static str)],
        default: Option<&'static str>,
        ignore_case: bool,
    },

    /// Formula over the whole value
    Format(fn(&EntryValue) -> Option<String>),
}

impl Rule {
    /// Apply the rule, or `None` if it does not fit the value.
    pub fn apply(&self, value: &EntryValue) -> Option<String> {
        match *self {
            Rule::Lookup { labels, default } => {
                let code = value.first_integer()?;
                labels
                    .iter()
                    .find(|(c, _)| *c == code)
                    .map(|(_, label)| *label)
                    .or(default)
                    .map(str::to_string)
            }
            Rule::Letter {
                labels,
                default,
                ignore_case,
            } => {
                let text = value.text()?;
                let key = if ignore_case {
                    text.to_uppercase()
                } else {
                    text.to_string()
                };
                labels
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, label)| *label)
                    .or(default)
                    .map(str::to_string)
            }
            Rule::Format(formula) => formula(value),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Lookup { labels, default } => f
                .debug_struct("Lookup")
                .field("labels", &labels.len())
                .field("default", default)
                .finish(),
            Rule::Letter { labels, default, .. } => f
                .debug_struct("Letter")
                .field("labels", &labels.len())
                .field("default", default)
                .finish(),
            Rule::Format(_) => f.write_str("Format"),
        }
    }
}

// =============================================================================
// ValueRenderer
// =============================================================================

/// Renders entries using the renderers of a [`TagRegistry`].
pub struct ValueRenderer<'r> {
    registry: &'r TagRegistry,
}

impl<'r> ValueRenderer<'r> {
    pub fn new(registry: &'r TagRegistry) -> Self {
        Self { registry }
    }

    /// Display string of a resolved entry.
    ///
    /// Returns an empty string if the entry has no value yet.
    pub fn render(&self, scope: TagScope, entry: &Entry) -> String {
        let Some(value) = entry.value.as_ref() else {
            return String::new();
        };

        if let Some(rule) = self.registry.renderer(scope, entry.tag) {
            match rule.apply(value) {
                Some(text) if !text.is_empty() => return text,
                _ => {}
            }
        }

        render_generic(entry.field_type, value)
    }
}

/// Type-driven rendering used when no specialized rule applies.
pub fn render_generic(field_type: FieldType, value: &EntryValue) -> String {
    match value {
        EntryValue::Bytes(bytes) if field_type == FieldType::Byte => pack_bytes(bytes).to_string(),
        EntryValue::Bytes(bytes) => ascii_lossy(bytes),
        EntryValue::Text(text) => text.trim().to_string(),
        EntryValue::Integers(values) => values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(","),
        EntryValue::Rationals(values) => values
            .iter()
            .map(|(n, d)| format!("{}/{}", n, d))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Byte values combined as `sum(b[i] << (len - 1 - i))` in 32-bit arithmetic.
fn pack_bytes(bytes: &[u8]) -> i32 {
    let len = bytes.len();
    bytes.iter().enumerate().fold(0i32, |acc, (i, &b)| {
        acc.wrapping_add(i32::from(b).wrapping_shl((len - 1 - i) as u32))
    })
}

/// Opaque bytes as text: non-ASCII bytes become '?', trailing NULs are dropped.
fn ascii_lossy(bytes: &[u8]) -> String {
    let text: String = bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect();
    text.trim_end_matches('\0').to_string()
}

// =============================================================================
// Tests
// =============================================================================
