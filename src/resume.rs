//! Wake-resume state.
//!
//! After a restart out of deep sleep the alert table would otherwise be
//! empty and every imminent meeting would buzz a second time. The
//! handled-alert records, current page and theme are written to the
//! "resume" namespace as one postcard blob.

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::alerts::AlertRecord;
use crate::app::ports::{StorageError, StoragePort};
use crate::error::ResumeError;
use crate::navigation::Theme;

const RESUME_NAMESPACE: &str = "resume";
const RESUME_KEY: &str = "state";
/// Upper bound on the encoded blob (64 records with short ids).
pub const RESUME_MAX_BYTES: usize = 4096;
/// Bumped whenever the layout of [`ResumeState`] changes.
const RESUME_FORMAT: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeState {
    format: u8,
    pub records: Vec<AlertRecord>,
    pub page: u16,
    pub theme: Theme,
}

impl ResumeState {
    pub fn new(records: Vec<AlertRecord>, page: u16, theme: Theme) -> Self {
        Self {
            format: RESUME_FORMAT,
            records,
            page,
            theme,
        }
    }

    /// Drop records that expired while the device was off.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        self.records.retain(|r| r.expires_at > now);
    }
}

/// Save / load [`ResumeState`] through a [`StoragePort`].
pub struct ResumeStore;

impl ResumeStore {
    pub fn save(storage: &mut dyn StoragePort, state: &ResumeState) -> Result<(), ResumeError> {
        let bytes = postcard::to_allocvec(state).map_err(|_| ResumeError::Encode)?;
        if bytes.len() > RESUME_MAX_BYTES {
            warn!("Resume: state is {} bytes, not saved", bytes.len());
            return Err(ResumeError::Encode);
        }
        storage
            .write(RESUME_NAMESPACE, RESUME_KEY, &bytes)
            .map_err(|_| ResumeError::Storage)?;
        info!(
            "Resume: saved {} alert records ({} bytes)",
            state.records.len(),
            bytes.len()
        );
        Ok(())
    }

    /// Load the saved state. `Ok(None)` when nothing was saved.
    pub fn load(storage: &dyn StoragePort) -> Result<Option<ResumeState>, ResumeError> {
        let mut buf = vec![0u8; RESUME_MAX_BYTES];
        let len = match storage.read(RESUME_NAMESPACE, RESUME_KEY, &mut buf) {
            Ok(len) => len,
            Err(StorageError::NotFound) => return Ok(None),
            Err(_) => return Err(ResumeError::Storage),
        };
        let state: ResumeState =
            postcard::from_bytes(&buf[..len]).map_err(|_| ResumeError::Corrupted)?;
        if state.format != RESUME_FORMAT {
            warn!("Resume: unknown format {}, ignoring", state.format);
            return Err(ResumeError::Corrupted);
        }
        Ok(Some(state))
    }

    pub fn clear(storage: &mut dyn StoragePort) -> Result<(), ResumeError> {
        storage
            .delete(RESUME_NAMESPACE, RESUME_KEY)
            .map_err(|_| ResumeError::Storage)
    }
}
