//! Fuzz target: `ResumeStore::load`
//!
//! Plants arbitrary bytes in the resume slot and verifies:
//! - No panics on truncated or garbage blobs
//! - Anything that loads can be saved and loads back identically
//!
//! cargo fuzz run fuzz_resume_blob

#![no_main]

use agendalight::adapters::memory::MemoryStorage;
use agendalight::app::ports::StoragePort;
use agendalight::resume::ResumeStore;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut storage = MemoryStorage::new();
    if storage.write("resume", "state", data).is_err() {
        return;
    }

    if let Ok(Some(state)) = ResumeStore::load(&storage) {
        let mut fresh = MemoryStorage::new();
        if ResumeStore::save(&mut fresh, &state).is_ok() {
            let again = ResumeStore::load(&fresh).expect("saved state must load");
            assert_eq!(again, Some(state));
        }
    }
});
