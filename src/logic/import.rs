//! Roster import from CSV (`id,name` with a header row; `id` may be blank).

use crate::models::{Identity, ParticipantId};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("malformed roster: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: name is empty")]
    EmptyName { row: usize },

    #[error("row {row}: participant {id} listed twice")]
    DuplicateId { row: usize, id: ParticipantId },
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(default)]
    id: Option<ParticipantId>,
    name: String,
}

/// Read identities in file order. Rows without an id get a fresh one.
pub fn identities_from_csv<R: Read>(reader: R) -> Result<Vec<Identity>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut seen = HashSet::new();
    let mut identities = Vec::new();

    for (index, record) in rdr.deserialize::<RosterRow>().enumerate() {
        let row = index + 1;
        let record = record?;
        if record.name.is_empty() {
            return Err(ImportError::EmptyName { row });
        }
        let identity = match record.id {
            Some(id) => Identity::new(id, record.name),
            None => Identity::named(record.name),
        };
        if !seen.insert(identity.id) {
            return Err(ImportError::DuplicateId { row, id: identity.id });
        }
        identities.push(identity);
    }
    log::debug!("imported {} identities", identities.len());
    Ok(identities)
}
