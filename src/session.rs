//! Session state shared across one dialogue's prompts.
//!
//! Every dialogue owns exactly one [`SessionState`]: a key/value store
//! seeded at construction with caller-supplied initial data and mutated by
//! prompts as the dialogue progresses. Values are [`serde_json::Value`] so
//! applications can stash arbitrary structured data without the engine
//! caring about its shape.
//!
//! # Examples
//!
//! ```rust
//! use dialogweave::session::SessionState;
//! use serde_json::json;
//!
//! let mut session = SessionState::builder()
//!     .with_value("player", json!("Ada"))
//!     .with_value("retries", json!(0))
//!     .build();
//!
//! session.insert("stage", json!("greeting"));
//! assert_eq!(session.get("player"), Some(&json!("Ada")));
//! assert_eq!(session.len(), 3);
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mutable key/value data owned by a single dialogue.
///
/// The map is copied at construction time, never aliased, so the caller's
/// original data is never mutated by the dialogue. Multiple dialogues never
/// share a `SessionState`. Serializable so embedding applications can
/// snapshot a participant's progress between inputs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    data: FxHashMap<String, Value>,
}

impl SessionState {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for seeding initial session data.
    pub fn builder() -> SessionStateBuilder {
        SessionStateBuilder::default()
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Insert or replace a value, returning the previous one if present.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.data.insert(key.into(), value)
    }

    /// Remove a value by key.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.remove(key)
    }

    /// Returns `true` if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over all entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }
}

impl From<FxHashMap<String, Value>> for SessionState {
    fn from(data: FxHashMap<String, Value>) -> Self {
        Self { data }
    }
}

/// Builder for seeding a [`SessionState`] with initial values.
#[derive(Debug, Default)]
pub struct SessionStateBuilder {
    data: FxHashMap<String, Value>,
}

impl SessionStateBuilder {
    /// Add an initial key/value pair.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Build the final session state.
    pub fn build(self) -> SessionState {
        SessionState { data: self.data }
    }
}
