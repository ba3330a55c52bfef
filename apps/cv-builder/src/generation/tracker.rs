//! Per-field generation state.
//!
//! Each AI-draftable field has its own `Idle -> Requesting -> Idle` state machine, keyed by
//! `GenerationKey`. Keys are never evicted; the set of draftable fields in a session is small.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::models::ListKind;

/// The field a generation request writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationTarget {
    Summary,
    /// Description of the experience entry at this position.
    ExperienceDescription(usize),
}

impl GenerationTarget {
    pub fn key(&self) -> GenerationKey {
        match *self {
            GenerationTarget::Summary => GenerationKey {
                field: "summary",
                index: None,
            },
            GenerationTarget::ExperienceDescription(index) => GenerationKey {
                field: ListKind::Experience.as_str(),
                index: Some(index),
            },
        }
    }
}

/// `field` or `field:index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenerationKey {
    field: &'static str,
    index: Option<usize>,
}

impl fmt::Display for GenerationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}:{}", self.field, index),
            None => f.write_str(self.field),
        }
    }
}

impl Serialize for GenerationKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    #[default]
    Idle,
    Requesting,
}

#[derive(Debug, Default)]
pub struct GenerationTracker {
    states: HashMap<GenerationKey, GenerationState>,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as requesting. Idempotent.
    pub fn begin(&mut self, key: GenerationKey) {
        self.states.insert(key, GenerationState::Requesting);
    }

    /// Marks `key` idle. The key stays in the map.
    pub fn end(&mut self, key: GenerationKey) {
        self.states.insert(key, GenerationState::Idle);
    }

    pub fn is_busy(&self, key: GenerationKey) -> bool {
        self.state(key) == GenerationState::Requesting
    }

    pub fn state(&self, key: GenerationKey) -> GenerationState {
        self.states.get(&key).copied().unwrap_or_default()
    }

    /// Begins `key` only if it is idle. Returns false without changing anything otherwise.
    pub fn try_begin(&mut self, key: GenerationKey) -> bool {
        if self.is_busy(key) {
            return false;
        }
        self.begin(key);
        true
    }

    /// Keys currently requesting, sorted by their text form.
    pub fn busy_keys(&self) -> Vec<GenerationKey> {
        let mut keys: Vec<GenerationKey> = self
            .states
            .iter()
            .filter(|(_, s)| **s == GenerationState::Requesting)
            .map(|(k, _)| *k)
            .collect();
        keys.sort_by_key(|k| k.to_string());
        keys
    }
}
