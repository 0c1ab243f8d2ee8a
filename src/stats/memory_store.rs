//! In-process store for tests and mock deployments

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use super::store::{resolve_range, KeyValueStore, StoreError};

#[derive(Debug, Clone)]
enum Entry {
    Text(String),
    List(VecDeque<String>),
    Set(BTreeSet<String>),
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>, StoreError> {
        self.entries.lock().map_err(|_| StoreError::LockPoisoned)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.lock()?.get(key) {
            None => Ok(None),
            Some(Entry::Text(value)) => Ok(Some(value.clone())),
            Some(_) => Err(StoreError::WrongType(key.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?
            .insert(key.to_string(), Entry::Text(value.to_string()));
        Ok(())
    }

    fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut entries = self.lock()?;
        let current = match entries.get(key) {
            None => 0,
            Some(Entry::Text(value)) => value
                .parse::<i64>()
                .map_err(|_| StoreError::NotAnInteger(key.to_string()))?,
            Some(_) => return Err(StoreError::WrongType(key.to_string())),
        };
        let next = current + 1;
        entries.insert(key.to_string(), Entry::Text(next.to_string()));
        Ok(next)
    }

    fn lpush(&self, key: &str, value: &str) -> Result<usize, StoreError> {
        let mut entries = self.lock()?;
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(VecDeque::new()));
        match entry {
            Entry::List(list) => {
                list.push_front(value.to_string());
                Ok(list.len())
            }
            _ => Err(StoreError::WrongType(key.to_string())),
        }
    }

    fn ltrim(&self, key: &str, start: i64, stop: i64) -> Result<(), StoreError> {
        let mut entries = self.lock()?;
        let list = match entries.get_mut(key) {
            None => return Ok(()),
            Some(Entry::List(list)) => list,
            Some(_) => return Err(StoreError::WrongType(key.to_string())),
        };
        match resolve_range(list.len(), start, stop) {
            Some((first, last)) => {
                list.truncate(last + 1);
                list.drain(..first);
            }
            None => list.clear(),
        }
        if list.is_empty() {
            entries.remove(key);
        }
        Ok(())
    }

    fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
        match self.lock()?.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::List(list)) => Ok(resolve_range(list.len(), start, stop)
                .map(|(first, last)| list.range(first..=last).cloned().collect())
                .unwrap_or_default()),
            Some(_) => Err(StoreError::WrongType(key.to_string())),
        }
    }

    fn llen(&self, key: &str) -> Result<usize, StoreError> {
        match self.lock()?.get(key) {
            None => Ok(0),
            Some(Entry::List(list)) => Ok(list.len()),
            Some(_) => Err(StoreError::WrongType(key.to_string())),
        }
    }

    fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut entries = self.lock()?;
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::Set(BTreeSet::new()));
        match entry {
            Entry::Set(set) => Ok(set.insert(member.to_string())),
            _ => Err(StoreError::WrongType(key.to_string())),
        }
    }

    fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError> {
        match self.lock()?.get(key) {
            None => Ok(Vec::new()),
            Some(Entry::Set(set)) => Ok(set.iter().cloned().collect()),
            Some(_) => Err(StoreError::WrongType(key.to_string())),
        }
    }
}
