//! Routing protocol identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// AMM design whose pools are fetched and cached separately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolId {
    V2,
    V3,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown protocol '{0}' (expected V2 or V3)")]
pub struct UnknownProtocol(pub String);

impl ProtocolId {
    pub const ALL: [ProtocolId; 2] = [ProtocolId::V2, ProtocolId::V3];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolId::V2 => "V2",
            ProtocolId::V3 => "V3",
        }
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolId {
    type Err = UnknownProtocol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "V2" => Ok(ProtocolId::V2),
            "V3" => Ok(ProtocolId::V3),
            _ => Err(UnknownProtocol(s.to_string())),
        }
    }
}
