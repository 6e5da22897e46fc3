use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Logical category that absorbs many raw playlist category labels
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogicalCategory {
    LiveTv,
    Filmovi,
    Serije,
    /// Raw key that matched no rule, kept as its own category
    Raw(String),
}

impl LogicalCategory {
    pub const LIVE_TV: &'static str = "LiveTV";
    pub const FILMOVI: &'static str = "Filmovi";
    pub const SERIJE: &'static str = "Serije";

    /// Resolve a category name as used in URLs and responses
    pub fn parse(name: &str) -> Self {
        match name {
            Self::LIVE_TV => Self::LiveTv,
            Self::FILMOVI => Self::Filmovi,
            Self::SERIJE => Self::Serije,
            other => Self::Raw(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::LiveTv => Self::LIVE_TV,
            Self::Filmovi => Self::FILMOVI,
            Self::Serije => Self::SERIJE,
            Self::Raw(key) => key,
        }
    }

    /// Whether groups of this category drill down into shows/seasons/episodes
    pub fn is_series(&self) -> bool {
        matches!(self, Self::Serije)
    }
}

impl std::fmt::Display for LogicalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LogicalCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LogicalCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::parse(&name))
    }
}
