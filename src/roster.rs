//! Roster import: register performers in bulk from CSV (`category,name`).

use crate::error::{Result, TournamentError};
use crate::models::{PerformerId, Tournament};
use serde::Deserialize;
use std::io::Read;

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct RosterEntry {
    pub category: String,
    pub name: String,
}

/// Parse a roster. Every malformed line is reported, not only the first.
pub fn parse_roster<R: Read>(reader: R) -> Result<Vec<RosterEntry>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut entries = Vec::new();
    let mut errors = Vec::new();
    for (i, row) in csv_reader.deserialize::<RosterEntry>().enumerate() {
        // header is line 1
        let line = i + 2;
        match row {
            Ok(entry) if entry.name.is_empty() => errors.push(format!("line {}: empty name", line)),
            Ok(entry) => entries.push(entry),
            Err(e) => errors.push(format!("line {}: {}", line, e)),
        }
    }
    if !errors.is_empty() {
        return Err(TournamentError::Validation(errors));
    }
    Ok(entries)
}

/// Register every entry, or none of them.
pub fn apply_roster(tournament: &mut Tournament, entries: &[RosterEntry]) -> Result<Vec<PerformerId>> {
    let mut draft = tournament.clone();
    let mut ids = Vec::with_capacity(entries.len());
    let mut errors = Vec::new();
    for entry in entries {
        let Some(category_id) = draft.category_by_name(&entry.category).map(|c| c.id) else {
            errors.push(format!("unknown category '{}' for '{}'", entry.category, entry.name));
            continue;
        };
        match draft.register_performer(category_id, &entry.name) {
            Ok(id) => ids.push(id),
            Err(TournamentError::Validation(mut e)) => errors.append(&mut e),
            Err(e) => return Err(e),
        }
    }
    if !errors.is_empty() {
        return Err(TournamentError::Validation(errors));
    }
    *tournament = draft;
    log::info!("imported {} performers into '{}'", ids.len(), tournament.name);
    Ok(ids)
}
