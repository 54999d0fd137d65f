//! Logical storage containers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A logical storage area, each bound to exactly one backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Container {
    /// Submitted dossiers
    Dossier,
    /// Primary documents
    Document,
    /// Generated exports
    Export,
    /// Temporary working files
    Temporary,
}

impl Container {
    /// Every container, in registry order
    pub const ALL: [Container; 4] = [
        Container::Dossier,
        Container::Document,
        Container::Export,
        Container::Temporary,
    ];

    /// Wire name of the container
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dossier => "DOSSIER",
            Self::Document => "DOCUMENT",
            Self::Export => "EXPORT",
            Self::Temporary => "TEMPORARY",
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A container name outside the known set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown container: {0}")]
pub struct UnknownContainer(pub String);

impl FromStr for Container {
    type Err = UnknownContainer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownContainer(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for container in Container::ALL {
            assert_eq!(container.as_str().parse::<Container>().unwrap(), container);
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert_eq!(
            "document".parse::<Container>(),
            Err(UnknownContainer("document".to_string()))
        );
        assert!("ARCHIVE".parse::<Container>().is_err());
        assert!("".parse::<Container>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&Container::Temporary).unwrap();
        assert_eq!(json, "\"TEMPORARY\"");

        let parsed: Container = serde_json::from_str("\"EXPORT\"").unwrap();
        assert_eq!(parsed, Container::Export);
    }
}
