//! In-memory adapters for the host simulator and tests.
//!
//! - [`MemoryStorage`] implements [`StoragePort`] over a `HashMap`.
//! - [`InMemoryCalendar`] is a [`Fetcher`] serving a fixed event list.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::Utc;
use log::info;

use crate::adapters::fetch_worker::Fetcher;
use crate::app::ports::{StorageError, StoragePort};
use crate::calendar::{CalendarSnapshot, Event};
use crate::error::FetchError;

// ── Storage ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStorage {
    store: RefCell<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{namespace}::{key}")
    }
}

impl StoragePort for MemoryStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let composite = Self::composite_key(namespace, key);
        match self.store.borrow().get(&composite) {
            Some(data) if data.len() > buf.len() => Err(StorageError::BufferTooSmall),
            Some(data) => {
                buf[..data.len()].copy_from_slice(data);
                Ok(data.len())
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let composite = Self::composite_key(namespace, key);
        self.store.borrow_mut().insert(composite, data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        let composite = Self::composite_key(namespace, key);
        self.store.borrow_mut().remove(&composite);
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        let composite = Self::composite_key(namespace, key);
        self.store.borrow().contains_key(&composite)
    }
}

// ── Calendar ──────────────────────────────────────────────────

/// Serves the same events on every fetch, stamped with the fetch time.
pub struct InMemoryCalendar {
    events: Vec<Event>,
    /// Fail every n-th fetch (`0` never fails).
    fail_every: u32,
    fetches: u32,
}

impl InMemoryCalendar {
    pub fn new(events: Vec<Event>) -> Self {
        info!("InMemoryCalendar: {} events", events.len());
        Self {
            events,
            fail_every: 0,
            fetches: 0,
        }
    }

    pub fn failing_every(mut self, n: u32) -> Self {
        self.fail_every = n;
        self
    }
}

impl Fetcher for InMemoryCalendar {
    fn fetch(&mut self) -> Result<CalendarSnapshot, FetchError> {
        self.fetches = self.fetches.wrapping_add(1);
        if self.fail_every != 0 && self.fetches % self.fail_every == 0 {
            return Err(FetchError::Offline);
        }
        CalendarSnapshot::new(self.events.clone(), Utc::now()).map_err(|_| FetchError::Parse)
    }
}
