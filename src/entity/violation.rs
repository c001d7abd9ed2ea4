use std::fmt::{self, Display, Formatter};

use semver::Version;
use serde::Serialize;

/// A peer dependency that would not hold after the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PeerViolation {
    /// The consumer's peer is not part of the project at all
    Missing {
        consumer: String,
        peer: String,
        required: String,
    },
    Incompatible {
        consumer: String,
        peer: String,
        required: String,
        would_install: Version,
    },
}

impl PeerViolation {
    pub fn consumer(&self) -> &str {
        match self {
            PeerViolation::Missing { consumer, .. } | PeerViolation::Incompatible { consumer, .. } => {
                consumer
            }
        }
    }
}

impl Display for PeerViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PeerViolation::Missing {
                consumer,
                peer,
                required,
            } => write!(
                f,
                "package {:?} has a missing peer dependency of {:?} @ {:?}",
                consumer, peer, required
            ),
            PeerViolation::Incompatible {
                consumer,
                peer,
                required,
                would_install,
            } => write!(
                f,
                "package {:?} has an incompatible peer dependency to {:?} (requires {:?}, would install \"{}\")",
                consumer, peer, required, would_install
            ),
        }
    }
}
