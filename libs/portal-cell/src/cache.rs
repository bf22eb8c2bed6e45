use uuid::Uuid;

use appointment_cell::models::Appointment;
use branch_cell::models::Branch;
use doctor_cell::models::Doctor;
use patient_cell::models::Patient;
use prescription_cell::models::Prescription;

/// Records the portal keeps locally, addressed by server identity.
pub trait Cached: Clone {
    fn key(&self) -> Uuid;
}

macro_rules! cached_by_id {
    ($($ty:ty),* $(,)?) => {
        $(impl Cached for $ty {
            fn key(&self) -> Uuid {
                self.id
            }
        })*
    };
}

cached_by_id!(Branch, Doctor, Patient, Appointment, Prescription);

/// Identity-keyed local copy of one collection.
///
/// Writes return the single mutated record from the server and that record
/// is upserted here, so a write never triggers a full reload. Iteration
/// order is first-seen order.
#[derive(Debug, Clone)]
pub struct EntityCache<T: Cached> {
    items: Vec<T>,
}

impl<T: Cached> Default for EntityCache<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Cached> EntityCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Returns `true` when the record was already cached.
    pub fn upsert(&mut self, item: T) -> bool {
        match self.items.iter_mut().find(|existing| existing.key() == item.key()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => {
                self.items.push(item);
                false
            }
        }
    }

    pub fn remove(&mut self, id: Uuid) -> Option<T> {
        let position = self.items.iter().position(|item| item.key() == id)?;
        Some(self.items.remove(position))
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.items.iter().find(|item| item.key() == id)
    }

    pub fn values(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
