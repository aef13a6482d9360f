use serde::{Deserialize, Serialize};

use crate::game::{GameDoc, ValidationError};

/// A full delivery of the collection state, in backend order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Increases with every change to the collection.
    pub version: u64,
    pub games: Vec<GameDoc>,
}

/// A record in a snapshot that cannot be displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidRecord {
    pub id: String,
    pub error: ValidationError,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&GameDoc> {
        self.games.iter().find(|g| g.id == id)
    }

    /// Split the snapshot into displayable records and records that fail
    /// validation, preserving backend order in both.
    pub fn partition_valid(&self) -> (Vec<&GameDoc>, Vec<InvalidRecord>) {
        let mut valid = Vec::with_capacity(self.games.len());
        let mut invalid = Vec::new();
        for doc in &self.games {
            match doc.fields.validate() {
                Ok(()) => valid.push(doc),
                Err(error) => invalid.push(InvalidRecord {
                    id: doc.id.clone(),
                    error,
                }),
            }
        }
        (valid, invalid)
    }
}
