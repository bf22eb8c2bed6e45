//! In-process document store.
//!
//! Every entity type gets its own [`Collection`], keyed by identity and kept in
//! insertion order. Writes are last-write-wins; there are no version tokens.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock as StdRwLock};

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

pub trait Document: Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{collection} already contains a document with id {id}")]
    DuplicateId { collection: &'static str, id: Uuid },

    #[error("{collection} already contains a document with this {field}")]
    UniqueViolation { collection: &'static str, field: &'static str },
}

pub struct Collection<T: Document> {
    docs: Arc<RwLock<Vec<T>>>,
}

impl<T: Document> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self { docs: Arc::clone(&self.docs) }
    }
}

impl<T: Document> Default for Collection<T> {
    fn default() -> Self {
        Self { docs: Arc::new(RwLock::new(Vec::new())) }
    }
}

impl<T: Document> Collection<T> {
    pub async fn insert(&self, doc: T) -> Result<T, StoreError> {
        self.insert_unique(doc, "id", |_, _| false).await
    }

    /// Insert unless `conflicts(existing, new)` holds for any stored document.
    /// The check and the write happen under one lock.
    pub async fn insert_unique<F>(&self, doc: T, field: &'static str, conflicts: F) -> Result<T, StoreError>
    where
        F: Fn(&T, &T) -> bool,
    {
        let mut docs = self.docs.write().await;

        if docs.iter().any(|d| d.id() == doc.id()) {
            return Err(StoreError::DuplicateId { collection: T::COLLECTION, id: doc.id() });
        }
        if docs.iter().any(|d| conflicts(d, &doc)) {
            return Err(StoreError::UniqueViolation { collection: T::COLLECTION, field });
        }

        debug!("Inserting {} into {}", doc.id(), T::COLLECTION);
        docs.push(doc.clone());
        Ok(doc)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Option<T> {
        self.docs.read().await.iter().find(|d| d.id() == id).cloned()
    }

    pub async fn find_all(&self) -> Vec<T> {
        self.docs.read().await.clone()
    }

    pub async fn find_where<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.docs.read().await.iter().filter(|d| predicate(d)).cloned().collect()
    }

    pub async fn find_one<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.docs.read().await.iter().find(|d| predicate(d)).cloned()
    }

    /// Apply a fallible mutation to one document while holding the write lock.
    /// Returns `Ok(None)` when no document has that id.
    pub async fn try_update<F, E>(&self, id: Uuid, mutate: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&mut T) -> Result<(), E>,
    {
        let mut docs = self.docs.write().await;
        match docs.iter_mut().find(|d| d.id() == id) {
            Some(doc) => {
                mutate(doc)?;
                debug!("Updated {} in {}", id, T::COLLECTION);
                Ok(Some(doc.clone()))
            }
            None => Ok(None),
        }
    }

    pub async fn update<F>(&self, id: Uuid, mutate: F) -> Option<T>
    where
        F: FnOnce(&mut T),
    {
        let result: Result<Option<T>, std::convert::Infallible> = self
            .try_update(id, |doc| {
                mutate(doc);
                Ok(())
            })
            .await;
        match result {
            Ok(doc) => doc,
            Err(never) => match never {},
        }
    }

    /// Mutate one document unless the result would clash with another stored
    /// document. The check and the write happen under one lock.
    pub async fn update_unique<F, C>(
        &self,
        id: Uuid,
        field: &'static str,
        mutate: F,
        conflicts: C,
    ) -> Result<Option<T>, StoreError>
    where
        F: FnOnce(&mut T),
        C: Fn(&T, &T) -> bool,
    {
        let mut docs = self.docs.write().await;
        let Some(position) = docs.iter().position(|d| d.id() == id) else {
            return Ok(None);
        };

        let mut updated = docs[position].clone();
        mutate(&mut updated);
        if docs.iter().any(|d| d.id() != id && conflicts(d, &updated)) {
            return Err(StoreError::UniqueViolation { collection: T::COLLECTION, field });
        }

        debug!("Updated {} in {}", id, T::COLLECTION);
        docs[position] = updated.clone();
        Ok(Some(updated))
    }

    pub async fn delete(&self, id: Uuid) -> Option<T> {
        let mut docs = self.docs.write().await;
        let position = docs.iter().position(|d| d.id() == id)?;
        debug!("Deleting {} from {}", id, T::COLLECTION);
        Some(docs.remove(position))
    }

    pub async fn count(&self) -> usize {
        self.docs.read().await.len()
    }
}

/// Handle to every collection. Cloning shares the underlying data.
#[derive(Clone, Default)]
pub struct Database {
    collections: Arc<StdRwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection<T: Document>(&self) -> Collection<T> {
        let key = TypeId::of::<T>();

        {
            let collections = self.collections.read().unwrap_or_else(|e| e.into_inner());
            if let Some(existing) = collections.get(&key).and_then(|c| c.downcast_ref::<Collection<T>>()) {
                return existing.clone();
            }
        }

        let mut collections = self.collections.write().unwrap_or_else(|e| e.into_inner());
        collections
            .entry(key)
            .or_insert_with(|| Box::new(Collection::<T>::default()))
            .downcast_ref::<Collection<T>>()
            .cloned()
            .unwrap_or_default()
    }
}
