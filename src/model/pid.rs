//! Persistent-identifier reservation types.

use serde::{Deserialize, Serialize};

/// Status of a PID reservation.
///
/// Only `reserved` is representable here; registration against an external
/// registrar is out of scope, and discarded reservations are removed from
/// the store entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PidStatus {
    /// Identifier value is minted and held for the record
    Reserved,
}

/// A persistent-identifier reservation tied to one (record, scheme) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pid {
    /// Identifier scheme (e.g. "doi", "oai")
    pub scheme: String,

    /// Minted identifier value
    pub identifier: String,

    /// Reservation status
    pub status: PidStatus,
}

impl Pid {
    /// Create a reserved PID.
    pub fn reserved(scheme: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            identifier: identifier.into(),
            status: PidStatus::Reserved,
        }
    }
}
