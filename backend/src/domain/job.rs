//! Job data model and collaborator-list parsing.
//!
//! Collaborators are stored as a proper relation with set semantics, but the
//! wire format keeps the historical comma-separated string (`"2, 3"`), so
//! parsing and rendering live here next to the type.

use chrono::NaiveDateTime;

use super::Error;

/// A unit of assigned work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: i32,
    /// Id of the colonist leading the work; must reference an existing user.
    pub team_leader: i32,
    /// Textual description. The field keeps the historical column name.
    pub job: String,
    /// Effort units; always positive.
    pub work_size: i32,
    /// Collaborator ids, ascending, duplicates removed.
    pub collaborators: Vec<i32>,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
    pub is_finished: bool,
    /// Associated category names, ascending. Set semantics.
    pub categories: Vec<String>,
}

/// Input for creating a job.
#[derive(Debug, Clone, Default)]
pub struct NewJob {
    /// Explicit identity to honor, or `None` for a store-generated id.
    pub id: Option<i32>,
    pub team_leader: i32,
    pub job: String,
    pub work_size: i32,
    pub collaborators: Vec<i32>,
    /// Defaults to the creation time when absent.
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub is_finished: bool,
    /// Category names, resolved find-or-create inside the same transaction.
    pub categories: Vec<String>,
}

/// Partial update. Absent fields stay unchanged; `end_date: Some(None)`
/// clears the timestamp; a present `categories` list fully replaces the set.
#[derive(Debug, Clone, Default)]
pub struct JobUpdate {
    pub team_leader: Option<i32>,
    pub job: Option<String>,
    pub work_size: Option<i32>,
    pub collaborators: Option<Vec<i32>>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<Option<NaiveDateTime>>,
    pub is_finished: Option<bool>,
    pub categories: Option<Vec<String>>,
}

/// Parse a comma-separated id list such as `"2, 3"`.
///
/// Whitespace around entries is ignored, duplicates collapse, and the result
/// is sorted ascending (membership, not ordering). An empty string is an
/// empty set.
pub fn parse_id_list(raw: &str) -> Result<Vec<i32>, Error> {
    let mut ids = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let id: i32 = part
            .parse()
            .map_err(|_| Error::invalid_request(format!("invalid id in list: {part:?}")))?;
        ids.push(id);
    }
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// Render an id list back into the wire format, e.g. `[2, 3]` -> `"2, 3"`.
pub fn format_id_list(ids: &[i32]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
