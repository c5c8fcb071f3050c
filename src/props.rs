//! Generic per-node property storage.

use hashbrown::HashMap;

use crate::error::{Error, Result};
use crate::value::{FromValue, Value};

/// Key → [`Value`] map owned by every node.
///
/// Written only from the control thread and never read from `process`.
#[derive(Clone, Debug, Default)]
pub struct PropertyStore {
    props: HashMap<String, Value>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`. Last write wins.
    pub fn set(&mut self, key: &str, value: Value) {
        match self.props.get_mut(key) {
            Some(slot) => *slot = value,
            None => {
                self.props.insert(key.to_owned(), value);
            }
        }
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.props.contains_key(key)
    }

    /// Look up `key` and coerce it to `T`, returning `default` when absent.
    ///
    /// A present value of the wrong type is a schema mismatch between the node
    /// and whoever set the property, so it is reported rather than defaulted.
    pub fn get_or<T: FromValue>(&self, key: &str, default: T) -> Result<T> {
        match self.props.get(key) {
            None => Ok(default),
            Some(value) => T::from_value(value).ok_or_else(|| Error::TypeMismatch {
                key: key.to_owned(),
                expected: T::EXPECTED,
                found: value.type_name(),
            }),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.props.remove(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.props.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v))
    }
}
