//! Note request and listing types.

use serde::{Deserialize, Serialize};

/// Body accepted when appending a note.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteRequest {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub content: String,
}

/// Location of a newly appended note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteCreated {
    /// Day bucket (`YYYY-MM-DD`, UTC).
    pub date: String,
    /// Generated child key.
    pub id: String,
}

/// Stored note plus its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEntry {
    pub id: String,
    pub content: String,
    /// Epoch milliseconds at write time.
    pub timestamp: i64,
}

/// Notes of one user for one day, ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteList {
    pub uid: String,
    pub date: String,
    pub notes: Vec<NoteEntry>,
}
