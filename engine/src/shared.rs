//! FILENAME: engine/src/shared.rs
//! PURPOSE: Thread-safe handle around a `Cloud`.
//! CONTEXT: A plain `Cloud` is single-owner. `SharedCloud` guards it with a
//! single exclusive lock for every operation. Reads take the lock too, because
//! a point lookup may materialize a default value.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::aggregate::Numeric;
use crate::cloud::{Cloud, Coords};
use crate::error::{CloudError, CloudResult};
use crate::filter::Filter;
use crate::value::Value;

pub struct SharedCloud<R, V> {
    inner: Arc<Mutex<Cloud<R, V>>>,
}

impl<R, V> SharedCloud<R, V> {
    pub fn new(cloud: Cloud<R, V>) -> Self {
        SharedCloud {
            inner: Arc::new(Mutex::new(cloud)),
        }
    }

    fn lock(&self) -> CloudResult<MutexGuard<'_, Cloud<R, V>>> {
        self.inner.lock().map_err(|_| CloudError::Poisoned)
    }

    /// Runs `f` with exclusive access to the cloud.
    pub fn with<T>(&self, f: impl FnOnce(&mut Cloud<R, V>) -> T) -> CloudResult<T> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }

    pub fn len(&self) -> CloudResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> CloudResult<bool> {
        Ok(self.lock()?.is_empty())
    }
}

impl<R, V: Clone> SharedCloud<R, V> {
    /// Copy of the value at the given coordinates, materializing it if new.
    pub fn value_at(&self, coords: impl Into<Coords>) -> CloudResult<V> {
        self.lock()?.value_at(coords).cloned()
    }

    pub fn load_data_with<I, F>(&self, rows: I, make_point: F) -> CloudResult<usize>
    where
        I: IntoIterator<Item = R>,
        F: FnMut(R, &V) -> V,
    {
        self.lock()?.load_data_with(rows, make_point)
    }

    pub fn values_at(&self, filters: &[Filter]) -> CloudResult<Vec<V>> {
        let guard = self.lock()?;
        let values = guard.values_at(filters)?;
        Ok(values.into_iter().cloned().collect())
    }
}

impl<R, V: Numeric> SharedCloud<R, V> {
    pub fn sum(&self, filters: &[Filter]) -> CloudResult<Value> {
        self.lock()?.sum(filters)
    }
}

impl<R, V> Clone for SharedCloud<R, V> {
    fn clone(&self) -> Self {
        SharedCloud {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, V> From<Cloud<R, V>> for SharedCloud<R, V> {
    fn from(cloud: Cloud<R, V>) -> Self {
        Self::new(cloud)
    }
}
