//! In-process [`KeyValueStore`] used by tests and local tooling.
//!
//! Mirrors the Redis data model closely enough for the entity stores: one
//! key namespace holding counters, hashes, and lists, with type errors when a
//! key is used as the wrong kind of value. Batches are applied under a single
//! lock acquisition, so other callers never observe a partial batch.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::RecordFields;

use super::{
    BatchGuard, BatchOutcome, KeyValueStore, StoreError, StoreKey, WriteBatch, WriteCommand,
};

#[derive(Debug, Clone)]
enum Value {
    Counter(i64),
    Hash(BTreeMap<String, Vec<u8>>),
    List(VecDeque<Vec<u8>>),
}

impl Value {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Counter(_) => "counter",
            Self::Hash(_) => "hash",
            Self::List(_) => "list",
        }
    }
}

fn wrong_type(key: &StoreKey, found: &Value, expected: &str) -> StoreError {
    type_clash(key, found.kind(), expected)
}

fn type_clash(key: &StoreKey, found: &str, expected: &str) -> StoreError {
    StoreError::query(format!("WRONGTYPE {key} holds a {found}, expected a {expected}"))
}

/// Thread-safe in-memory key-value store.
#[derive(Debug, Default)]
pub struct InMemoryKeyValueStore {
    entries: Mutex<HashMap<StoreKey, Value>>,
}

impl InMemoryKeyValueStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Overwrite the hash under `key`, bypassing batches. Intended for tests
    /// that need to seed corrupt or partial records.
    pub fn put_hash(&self, key: StoreKey, fields: impl IntoIterator<Item = (String, Vec<u8>)>) {
        self.lock()
            .insert(key, Value::Hash(fields.into_iter().collect()));
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<StoreKey, Value>> {
        // The map is never left half-updated, so a poisoned lock is still usable.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn guard_holds(
    entries: &HashMap<StoreKey, Value>,
    guard: &BatchGuard,
) -> Result<bool, StoreError> {
    match guard {
        BatchGuard::FieldAbsent { key, field } => match entries.get(key) {
            None => Ok(true),
            Some(Value::Hash(hash)) => Ok(!hash.contains_key(field)),
            Some(other) => Err(wrong_type(key, other, "hash")),
        },
    }
}

fn required_kind(command: &WriteCommand) -> (&StoreKey, &'static str) {
    match command {
        WriteCommand::HashSet { key, .. } => (key, "hash"),
        WriteCommand::ListPush { key, .. } => (key, "list"),
    }
}

/// Checks every command against the stored kinds and against kinds staged by
/// earlier commands in the same batch.
fn check_commands(
    entries: &HashMap<StoreKey, Value>,
    commands: &[WriteCommand],
) -> Result<(), StoreError> {
    let mut staged: HashMap<&StoreKey, &'static str> = HashMap::new();
    for command in commands {
        let (key, expected) = required_kind(command);
        let current = match staged.get(key) {
            Some(kind) => Some(*kind),
            None => entries.get(key).map(Value::kind),
        };
        match current {
            None => {
                staged.insert(key, expected);
            }
            Some(found) if found == expected => {}
            Some(found) => return Err(type_clash(key, found, expected)),
        }
    }
    Ok(())
}

fn apply_command(entries: &mut HashMap<StoreKey, Value>, command: WriteCommand) {
    match command {
        WriteCommand::HashSet { key, field, value } => {
            if let Value::Hash(hash) = entries
                .entry(key)
                .or_insert_with(|| Value::Hash(BTreeMap::new()))
            {
                hash.insert(field, value);
            }
        }
        WriteCommand::ListPush { key, value } => {
            if let Value::List(list) = entries
                .entry(key)
                .or_insert_with(|| Value::List(VecDeque::new()))
            {
                list.push_front(value);
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn increment(&self, key: &StoreKey) -> Result<i64, StoreError> {
        let mut entries = self.lock();
        let value = entries.entry(key.clone()).or_insert(Value::Counter(0));
        match value {
            Value::Counter(count) => {
                *count = count
                    .checked_add(1)
                    .ok_or_else(|| StoreError::query(format!("counter {key} overflowed")))?;
                Ok(*count)
            }
            other => Err(wrong_type(key, other, "counter")),
        }
    }

    async fn hash_get(&self, key: &StoreKey, field: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match self.lock().get(key) {
            None => Ok(None),
            Some(Value::Hash(hash)) => Ok(hash.get(field).cloned()),
            Some(other) => Err(wrong_type(key, other, "hash")),
        }
    }

    async fn hash_get_all(&self, key: &StoreKey) -> Result<RecordFields, StoreError> {
        match self.lock().get(key) {
            None => Ok(RecordFields::new()),
            Some(Value::Hash(hash)) => Ok(hash
                .iter()
                .map(|(field, value)| (field.clone(), value.clone()))
                .collect()),
            Some(other) => Err(wrong_type(key, other, "hash")),
        }
    }

    async fn list_range(&self, key: &StoreKey, limit: usize) -> Result<Vec<Vec<u8>>, StoreError> {
        match self.lock().get(key) {
            None => Ok(Vec::new()),
            Some(Value::List(list)) => Ok(list.iter().take(limit).cloned().collect()),
            Some(other) => Err(wrong_type(key, other, "list")),
        }
    }

    async fn execute(&self, batch: WriteBatch) -> Result<BatchOutcome, StoreError> {
        let mut entries = self.lock();
        for guard in batch.guards() {
            if !guard_holds(&entries, guard)? {
                return Ok(BatchOutcome::Rejected);
            }
        }
        // Validate every command before mutating so a type error applies nothing.
        check_commands(&entries, batch.commands())?;
        for command in batch.commands().iter().cloned() {
            apply_command(&mut entries, command);
        }
        Ok(BatchOutcome::Applied)
    }
}
