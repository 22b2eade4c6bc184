//! Snapshot repository trait.

use crate::error::Result;
use crate::snapshot::model::SurveySnapshot;

/// A single named slot holding the in-progress session.
///
/// Reads and writes are synchronous. Callers treat failures as best-effort:
/// they are logged and never shown to the participant.
pub trait SnapshotRepository: Send + Sync {
    /// Returns the saved snapshot, or `None` if the slot is empty.
    fn load(&self) -> Result<Option<SurveySnapshot>>;

    /// Replaces the slot's contents.
    fn save(&self, snapshot: &SurveySnapshot) -> Result<()>;

    /// Empties the slot. Clearing an empty slot is not an error.
    fn clear(&self) -> Result<()>;
}
