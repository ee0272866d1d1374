use std::sync::{Arc, Mutex};

use super::domain::ProfileId;
use super::profile::Profile;

/// Storage abstraction so the pipeline can be exercised in isolation.
///
/// Implementations hand out immutable snapshots; a mutation builds a new collection and
/// swaps it in, so readers holding an older snapshot never observe a partial write.
/// `insert_with` and `update` run their closure while holding the write side, so a
/// read-modify-write never interleaves with another writer.
pub trait ProfileRepository: Send + Sync {
    /// Build the new profile from the current collection and append it.
    fn insert_with<F>(&self, build: F) -> Result<Profile, RepositoryError>
    where
        F: FnOnce(&[Profile]) -> Profile;

    /// Apply `mutate` to the stored profile. An `Err` from `mutate` leaves the store untouched.
    fn update<F, E>(&self, id: &ProfileId, mutate: F) -> Result<Profile, E>
    where
        F: FnOnce(&mut Profile) -> Result<(), E>,
        E: From<RepositoryError>;

    fn fetch(&self, id: &ProfileId) -> Result<Option<Profile>, RepositoryError>;
    fn snapshot(&self) -> Result<Arc<Vec<Profile>>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("profile {0} already exists")]
    Conflict(ProfileId),
    #[error("profile {0} not found")]
    NotFound(ProfileId),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// In-process repository holding the profile list in insertion order.
#[derive(Debug, Default, Clone)]
pub struct MemoryProfileRepository {
    profiles: Arc<Mutex<Arc<Vec<Profile>>>>,
}

impl MemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn swap<F, T, E>(&self, mutate: F) -> Result<T, E>
    where
        F: FnOnce(&mut Vec<Profile>) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = self
            .profiles
            .lock()
            .map_err(|_| RepositoryError::Unavailable("profile store poisoned".to_string()))?;
        let mut next = guard.as_ref().clone();
        let outcome = mutate(&mut next)?;
        *guard = Arc::new(next);
        Ok(outcome)
    }
}

impl ProfileRepository for MemoryProfileRepository {
    fn insert_with<F>(&self, build: F) -> Result<Profile, RepositoryError>
    where
        F: FnOnce(&[Profile]) -> Profile,
    {
        self.swap(|profiles| {
            let profile = build(profiles);
            if profiles.iter().any(|existing| existing.id == profile.id) {
                return Err(RepositoryError::Conflict(profile.id));
            }
            profiles.push(profile.clone());
            Ok(profile)
        })
    }

    fn update<F, E>(&self, id: &ProfileId, mutate: F) -> Result<Profile, E>
    where
        F: FnOnce(&mut Profile) -> Result<(), E>,
        E: From<RepositoryError>,
    {
        self.swap(|profiles| {
            let slot = profiles
                .iter_mut()
                .find(|existing| &existing.id == id)
                .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
            mutate(slot)?;
            Ok(slot.clone())
        })
    }

    fn fetch(&self, id: &ProfileId) -> Result<Option<Profile>, RepositoryError> {
        let snapshot = self.snapshot()?;
        Ok(snapshot.iter().find(|profile| &profile.id == id).cloned())
    }

    fn snapshot(&self) -> Result<Arc<Vec<Profile>>, RepositoryError> {
        self.profiles
            .lock()
            .map(|guard| Arc::clone(&*guard))
            .map_err(|_| RepositoryError::Unavailable("profile store poisoned".to_string()))
    }
}
