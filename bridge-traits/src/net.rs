//! Network and transport lookup tables.
//!
//! The caller-facing capability surface takes raw numeric codes; these
//! enums are the fixed domains those codes are validated against. An
//! out-of-table code is an input-validation failure, never a silent
//! default.

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Network layer selector. Code domain: `{0: ip4, 1: ip6}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    Ip4,
    Ip6,
}

impl NetworkKind {
    /// Resolves a raw network code, failing on anything outside the table.
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(NetworkKind::Ip4),
            1 => Ok(NetworkKind::Ip6),
            other => Err(BridgeError::InvalidArgument(format!(
                "invalid network code {other}"
            ))),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            NetworkKind::Ip4 => 0,
            NetworkKind::Ip6 => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NetworkKind::Ip4 => "ip4",
            NetworkKind::Ip6 => "ip6",
        }
    }
}

/// Transport layer selector. Code domain: `{0: tcp, 1: udp}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Tcp,
    Udp,
}

impl TransportKind {
    /// Resolves a raw transport code, failing on anything outside the table.
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(TransportKind::Tcp),
            1 => Ok(TransportKind::Udp),
            other => Err(BridgeError::InvalidArgument(format!(
                "invalid transport code {other}"
            ))),
        }
    }

    pub fn code(self) -> u32 {
        match self {
            TransportKind::Tcp => 0,
            TransportKind::Udp => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::Tcp => "tcp",
            TransportKind::Udp => "udp",
        }
    }
}
