//! One long-lived repository per entity type.
//!
//! The first request for an entity type constructs its repository bound to
//! the connection supplied at that moment; every later request gets the same
//! instance, whatever connection it passes. Entries are never evicted.
//! [`Registry::rebind`] is the only way to swap the bound connection.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::Lazy;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::repository::SeaRepository;

type Entry = Arc<dyn Any + Send + Sync>;

/// Process-wide registry used by [`repository`].
static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// Process-wide repository for `E`.
///
/// `db` is only used when this is the first request for `E`.
pub fn repository<E: EntityTrait>(db: &Arc<DatabaseConnection>) -> Arc<SeaRepository<E>> {
    REGISTRY.get_or_init::<E>(db)
}

/// Map from entity type to its repository.
#[derive(Default)]
pub struct Registry {
    entries: RwLock<HashMap<TypeId, Entry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance
    pub fn global() -> &'static Registry {
        &REGISTRY
    }

    /// Cached repository for `E`, constructing it on first use.
    pub fn get_or_init<E: EntityTrait>(
        &self,
        db: &Arc<DatabaseConnection>,
    ) -> Arc<SeaRepository<E>> {
        if let Some(repo) = self.get::<E>() {
            return repo;
        }

        let mut entries = self.write();
        // Another caller may have won the race between the two locks
        if let Some(repo) = entries.get(&TypeId::of::<E>()).and_then(downcast::<E>) {
            return repo;
        }

        let repo = Arc::new(SeaRepository::<E>::new(Arc::clone(db)));
        entries.insert(TypeId::of::<E>(), repo.clone());
        tracing::debug!(entity = std::any::type_name::<E>(), "Repository registered");
        repo
    }

    /// Cached repository for `E`, if any
    pub fn get<E: EntityTrait>(&self) -> Option<Arc<SeaRepository<E>>> {
        self.read().get(&TypeId::of::<E>()).and_then(downcast::<E>)
    }

    /// Replace the repository for `E` with one bound to `db`.
    ///
    /// Holders of the previous instance keep using the old connection.
    pub fn rebind<E: EntityTrait>(
        &self,
        db: &Arc<DatabaseConnection>,
    ) -> Arc<SeaRepository<E>> {
        let repo = Arc::new(SeaRepository::<E>::new(Arc::clone(db)));
        let previous = self.write().insert(TypeId::of::<E>(), repo.clone());

        tracing::info!(
            entity = std::any::type_name::<E>(),
            replaced = previous.is_some(),
            "Repository rebound"
        );
        repo
    }

    pub fn contains<E: EntityTrait>(&self) -> bool {
        self.read().contains_key(&TypeId::of::<E>())
    }

    /// Number of registered entity types
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Entries are only ever inserted whole, so a poisoned lock still holds a
    // consistent map.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<TypeId, Entry>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<TypeId, Entry>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn downcast<E: EntityTrait>(entry: &Entry) -> Option<Arc<SeaRepository<E>>> {
    entry.clone().downcast::<SeaRepository<E>>().ok()
}
