//! Durable conversation store.
//!
//! Persists every conversation record in `conversations.json` under the
//! configured state path, behind an in-memory write-through cache. Saves
//! are whole-record upserts keyed by session id and the file is rewritten
//! on every save. Losing a write here loses the call record, so a failed
//! write is retried once and then surfaced instead of dropped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use cs_domain::error::{Error, Result};
use cs_domain::trace::TraceEvent;

use crate::record::ConversationRecord;

/// Keyed collection of conversation records backed by a JSON file.
pub struct SessionStore {
    records_path: PathBuf,
    records: RwLock<HashMap<String, ConversationRecord>>,
}

impl SessionStore {
    /// Load or create the store at `state_path/conversations.json`.
    ///
    /// A malformed file starts the store empty rather than refusing to
    /// boot; the damage is logged so the operator can recover the file.
    pub fn new(state_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(state_path).map_err(Error::Io)?;

        let records_path = state_path.join("conversations.json");
        let records = if records_path.exists() {
            let raw = std::fs::read_to_string(&records_path).map_err(Error::Io)?;
            match serde_json::from_str::<Vec<ConversationRecord>>(&raw) {
                Ok(list) => list.into_iter().map(|r| (r.id.clone(), r)).collect(),
                Err(e) => {
                    tracing::warn!(
                        path = %records_path.display(),
                        error = %e,
                        "conversation store is malformed, starting empty"
                    );
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        tracing::info!(
            conversations = records.len(),
            path = %records_path.display(),
            "conversation store loaded"
        );

        Ok(Self {
            records_path,
            records: RwLock::new(records),
        })
    }

    /// Upsert one record and flush the store to disk.
    pub fn save(&self, record: ConversationRecord) -> Result<()> {
        let id = record.id.clone();
        {
            let mut records = self.records.write();
            records.insert(id.clone(), record);
        }

        let retried = self.flush_with_retry()?;
        TraceEvent::SessionSaved {
            session_id: id,
            retried,
        }
        .emit();
        Ok(())
    }

    /// Look up a record by session id.
    pub fn get(&self, id: &str) -> Option<ConversationRecord> {
        self.records.read().get(id).cloned()
    }

    /// All known records, in no guaranteed order; callers sort.
    pub fn list(&self) -> Vec<ConversationRecord> {
        self.records.read().values().cloned().collect()
    }

    /// Delete a record. Deleting an absent id is a no-op, not an error.
    pub fn delete(&self, id: &str) -> Result<()> {
        let removed = self.records.write().remove(id).is_some();
        if !removed {
            return Ok(());
        }

        self.flush_with_retry()?;
        TraceEvent::SessionDeleted {
            session_id: id.to_owned(),
        }
        .emit();
        Ok(())
    }

    // ── Private helpers ───────────────────────────────────────────────

    /// Write the full store to disk, retrying once on failure before
    /// surfacing the error. Returns whether the retry path was taken.
    fn flush_with_retry(&self) -> Result<bool> {
        match self.flush() {
            Ok(()) => Ok(false),
            Err(first) => {
                tracing::warn!(error = %first, "conversation store write failed, retrying");
                self.flush()
                    .map_err(|e| Error::Storage(format!("write failed after retry: {e}")))?;
                Ok(true)
            }
        }
    }

    fn flush(&self) -> Result<()> {
        // Stored as an array to stay compatible with existing files.
        let records = self.records.read();
        let mut list: Vec<&ConversationRecord> = records.values().collect();
        list.sort_by(|a, b| a.start_time.cmp(&b.start_time));

        let json = serde_json::to_string_pretty(&list)
            .map_err(|e| Error::Other(format!("serializing conversations: {e}")))?;
        std::fs::write(&self.records_path, json).map_err(Error::Io)?;
        Ok(())
    }
}
