//! RON-backed creature roster.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;

use arena_core::{CreatureId, CreatureProfile, PlayerId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CreatureOracle, OracleError, Result};

/// On-disk roster layout.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RosterFile {
    pub creatures: Vec<CreatureProfile>,
}

/// Catalog held in memory, keyed by creature id.
///
/// Profiles can be replaced at runtime with [`InMemoryRoster::upsert`]; open
/// matches keep the snapshot they captured at start.
pub struct InMemoryRoster {
    creatures: RwLock<BTreeMap<CreatureId, CreatureProfile>>,
}

impl InMemoryRoster {
    pub fn new() -> Self {
        Self {
            creatures: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn from_profiles(profiles: impl IntoIterator<Item = CreatureProfile>) -> Self {
        let creatures = profiles
            .into_iter()
            .map(|profile| (profile.id, profile))
            .collect();
        Self {
            creatures: RwLock::new(creatures),
        }
    }

    /// Parse a roster from RON text.
    pub fn from_ron(source: &str) -> Result<Self> {
        let file: RosterFile = ron::from_str(source)?;
        Ok(Self::from_profiles(file.creatures))
    }

    /// Load a roster file from disk.
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let roster = Self::from_ron(&source)?;
        tracing::info!(path = %path.display(), creatures = roster.len(), "Loaded creature roster");
        Ok(roster)
    }

    /// Insert or replace a profile.
    pub fn upsert(&self, profile: CreatureProfile) -> Result<()> {
        let mut creatures = self
            .creatures
            .write()
            .map_err(|_| OracleError::Unavailable("roster lock poisoned".into()))?;
        creatures.insert(profile.id, profile);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.creatures.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read<T>(&self, f: impl FnOnce(&BTreeMap<CreatureId, CreatureProfile>) -> T) -> Result<T> {
        let creatures = self
            .creatures
            .read()
            .map_err(|_| OracleError::Unavailable("roster lock poisoned".into()))?;
        Ok(f(&creatures))
    }
}

impl Default for InMemoryRoster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CreatureOracle for InMemoryRoster {
    async fn creature(&self, id: CreatureId) -> Result<Option<CreatureProfile>> {
        self.read(|creatures| creatures.get(&id).cloned())
    }

    async fn creatures_owned_by(&self, owner: PlayerId) -> Result<Vec<CreatureProfile>> {
        self.read(|creatures| {
            creatures
                .values()
                .filter(|profile| profile.owner == owner)
                .cloned()
                .collect()
        })
    }

    async fn all_creatures(&self) -> Result<Vec<CreatureProfile>> {
        self.read(|creatures| creatures.values().cloned().collect())
    }
}
