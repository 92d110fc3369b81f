use serde::{Deserialize, Serialize};

use crate::toolkit::note_toolbox::entry::Entry;


/// Per-item settle of a bulk import. Persisted entries stay saved when others fail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkImportReport {
    pub total: usize,
    pub persisted: usize,
    pub failed: usize,
    pub used_fallback: bool,
    pub entries: Vec<Entry>,
    pub errors: Vec<String>,
}

impl BulkImportReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}
