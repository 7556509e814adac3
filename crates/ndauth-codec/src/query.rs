//! Canonical query string construction.
//!
//! Flattens a [`Parameters`] tree into escaped `(key, value)` components:
//!
//! - map at `k` with inner key `ik` → key `k[ik]`
//! - sequence at `k` → each element at `k[]` (or `k`, see [`ArrayEncoding`])
//! - bool → `1`/`0` or `true`/`false` (see [`BoolEncoding`])
//! - integer → decimal digits, no separators
//! - string → as-is
//!
//! Keys are sorted by byte order at every level, so equal parameter sets
//! always produce the same string.

use serde::{Deserialize, Serialize};

use crate::escape::escape;
use crate::value::{ParameterValue, Parameters};

/// An escaped `(key, value)` pair.
pub type QueryComponent = (String, String);

/// How sequence elements are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayEncoding {
    /// `key[]=a&key[]=b`
    #[default]
    Brackets,
    /// `key=a&key=b`
    NoBrackets,
}

impl ArrayEncoding {
    fn encode(self, key: &str) -> String {
        match self {
            Self::Brackets => format!("{key}[]"),
            Self::NoBrackets => key.to_string(),
        }
    }
}

/// How booleans are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolEncoding {
    /// `1` / `0`
    #[default]
    Numeric,
    /// `true` / `false`
    Literal,
}

impl BoolEncoding {
    fn encode(self, value: bool) -> &'static str {
        match (self, value) {
            (Self::Numeric, true) => "1",
            (Self::Numeric, false) => "0",
            (Self::Literal, true) => "true",
            (Self::Literal, false) => "false",
        }
    }
}

/// Encoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderOptions {
    pub array_encoding: ArrayEncoding,
    pub bool_encoding: BoolEncoding,
}

/// Key normalization applied before sorting and escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyCase {
    #[default]
    Preserve,
    /// Lower-case every key, nested ones included.
    Lower,
}

impl KeyCase {
    fn apply(self, key: &str) -> String {
        match self {
            Self::Preserve => key.to_string(),
            Self::Lower => key.to_lowercase(),
        }
    }
}

/// Builds canonical query strings from parameter sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEncoder {
    options: EncoderOptions,
}

impl QueryEncoder {
    pub fn new(options: EncoderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> EncoderOptions {
        self.options
    }

    /// Sorted, flattened components joined as `key=value&...`.
    ///
    /// An empty parameter set yields an empty string.
    pub fn query(&self, parameters: &Parameters) -> String {
        join(&self.query_components(parameters))
    }

    /// Sorted, flattened components without joining.
    pub fn query_components(&self, parameters: &Parameters) -> Vec<QueryComponent> {
        self.canonical_components(parameters, KeyCase::Preserve)
    }

    /// Like [`query_components`](Self::query_components) with keys normalized
    /// by `case` first.
    ///
    /// Entries are ordered by normalized key, then by original key, so two
    /// keys that normalize to the same text are both kept in a stable order.
    pub fn canonical_components(
        &self,
        parameters: &Parameters,
        case: KeyCase,
    ) -> Vec<QueryComponent> {
        let mut components = Vec::with_capacity(parameters.len());
        for (key, value) in normalized_entries(parameters, case) {
            self.flatten_into(&key, value, case, &mut components);
        }
        components
    }

    /// Escaped components for a single key/value pair.
    ///
    /// An empty sequence or empty map produces no components.
    pub fn flatten(&self, key: &str, value: &ParameterValue) -> Vec<QueryComponent> {
        let mut components = Vec::new();
        self.flatten_into(key, value, KeyCase::Preserve, &mut components);
        components
    }

    /// Render a scalar the way the flattener would, before escaping.
    ///
    /// Returns `None` for sequences and maps.
    pub fn render_scalar(&self, value: &ParameterValue) -> Option<String> {
        match value {
            ParameterValue::String(s) => Some(s.clone()),
            ParameterValue::Integer(n) => Some(n.to_string()),
            ParameterValue::Bool(b) => Some(self.options.bool_encoding.encode(*b).to_string()),
            ParameterValue::Sequence(_) | ParameterValue::Map(_) => None,
        }
    }

    fn flatten_into(
        &self,
        key: &str,
        value: &ParameterValue,
        case: KeyCase,
        out: &mut Vec<QueryComponent>,
    ) {
        match value {
            ParameterValue::Map(nested) => {
                for (nested_key, nested_value) in normalized_entries(nested, case) {
                    self.flatten_into(&format!("{key}[{nested_key}]"), nested_value, case, out);
                }
            }
            ParameterValue::Sequence(items) => {
                let item_key = self.options.array_encoding.encode(key);
                for item in items {
                    self.flatten_into(&item_key, item, case, out);
                }
            }
            scalar => {
                if let Some(rendered) = self.render_scalar(scalar) {
                    out.push((escape(key), escape(&rendered)));
                }
            }
        }
    }
}

/// Join components as `key=value` pairs separated by `&`.
pub fn join(components: &[QueryComponent]) -> String {
    components
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn normalized_entries(parameters: &Parameters, case: KeyCase) -> Vec<(String, &ParameterValue)> {
    let mut entries: Vec<(String, &str, &ParameterValue)> = parameters
        .iter()
        .map(|(key, value)| (case.apply(key), key, value))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    entries
        .into_iter()
        .map(|(normalized, _, value)| (normalized, value))
        .collect()
}
