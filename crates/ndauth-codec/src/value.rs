//! Parameter values and the ordered parameter set.

use indexmap::IndexMap;

/// A single parameter value.
///
/// Closed set of shapes a handshake parameter can take. Nested maps and
/// sequences are flattened into bracketed keys by the query builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    String(String),
    Integer(i64),
    Bool(bool),
    Sequence(Vec<ParameterValue>),
    Map(Parameters),
}

impl ParameterValue {
    /// The string payload, if this is a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::Sequence(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
            Self::Integer(_) | Self::Bool(_) => false,
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for ParameterValue {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

macro_rules! integer_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParameterValue {
                fn from(value: $ty) -> Self {
                    Self::Integer(i64::from(value))
                }
            }
        )*
    };
}

integer_from!(i8, i16, i32, i64, u8, u16, u32);

impl<T: Into<ParameterValue>> From<Vec<T>> for ParameterValue {
    fn from(values: Vec<T>) -> Self {
        Self::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl From<Parameters> for ParameterValue {
    fn from(value: Parameters) -> Self {
        Self::Map(value)
    }
}

/// A set of named parameters.
///
/// Keys are unique. Iteration follows insertion order (decoding relies on
/// this to keep query items in the order they appeared); equality ignores
/// order, and every serialization sorts keys first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: IndexMap<String, ParameterValue>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. An existing key keeps its position and has its value
    /// replaced; the previous value is returned.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ParameterValue>,
    ) -> Option<ParameterValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ParameterValue> {
        self.entries.get(key)
    }

    /// The value under `key` if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParameterValue::as_str)
    }

    /// Remove a key, keeping the relative order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<ParameterValue> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries sorted ascending by key bytes.
    pub fn sorted(&self) -> Vec<(&str, &ParameterValue)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        sorted
    }
}

impl<K, V> FromIterator<(K, V)> for Parameters
where
    K: Into<String>,
    V: Into<ParameterValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        params.extend(iter);
        params
    }
}

impl<K, V> Extend<(K, V)> for Parameters
where
    K: Into<String>,
    V: Into<ParameterValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl IntoIterator for Parameters {
    type Item = (String, ParameterValue);
    type IntoIter = indexmap::map::IntoIter<String, ParameterValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
