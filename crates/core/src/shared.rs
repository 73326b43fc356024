//! Thread-safe access to one ward from many clients.
//!
//! Every read and every operation runs to completion under a single mutex, so checking that a
//! bed is free and occupying it can never interleave with another request.

use crate::events::WardEvent;
use crate::ward::{Command, Ward};
use crate::{WardError, WardResult};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct SharedWard(Arc<Mutex<Ward>>);

impl SharedWard {
    pub fn new(ward: Ward) -> Self {
        Self(Arc::new(Mutex::new(ward)))
    }

    /// Runs `f` with shared access to the ward.
    pub fn read<T>(&self, f: impl FnOnce(&Ward) -> T) -> WardResult<T> {
        let guard = self.0.lock().map_err(|_| WardError::LockPoisoned)?;
        Ok(f(&guard))
    }

    /// Runs a fallible mutation under the lock.
    pub fn write<T>(&self, f: impl FnOnce(&mut Ward) -> WardResult<T>) -> WardResult<T> {
        let mut guard = self.0.lock().map_err(|_| WardError::LockPoisoned)?;
        f(&mut guard)
    }

    pub fn apply(&self, command: Command) -> WardResult<Vec<WardEvent>> {
        self.write(|ward| ward.apply(command))
    }
}
