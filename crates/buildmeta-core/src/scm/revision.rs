use std::fmt;

use chrono::{DateTime, Utc};

/// Identifier and commit time of a change-control revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    id: String,
    date: DateTime<Utc>,
}

impl Revision {
    pub fn new(id: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            date,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.date.to_rfc3339())
    }
}
