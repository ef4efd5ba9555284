// ── Entity kinds ──
//
// The five catalog collections and the per-kind behavior that differs
// between them (page size, write discipline, display label).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// A named catalog collection in the remote store.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EntityKind {
    Accommodations,
    #[strum(to_string = "exclusives", serialize = "experiences")]
    Exclusives,
    Photography,
    Chefs,
    Popular,
}

impl EntityKind {
    /// Every kind, in the order the favorites view lists them.
    pub const ALL: [Self; 5] = [
        Self::Accommodations,
        Self::Exclusives,
        Self::Photography,
        Self::Chefs,
        Self::Popular,
    ];

    /// Collection path segment in the store.
    pub fn collection(self) -> &'static str {
        self.into()
    }

    /// Human-readable singular label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Accommodations => "Accommodation",
            Self::Exclusives => "Experience",
            Self::Photography => "Photography service",
            Self::Chefs => "Chef service",
            Self::Popular => "Popular experience",
        }
    }

    /// Page size used when no override is configured.
    pub fn default_items_per_page(self) -> usize {
        match self {
            Self::Accommodations => 6,
            _ => 3,
        }
    }

    /// Write discipline used when no override is configured.
    ///
    /// Accommodations accept partial updates; the remaining collections
    /// have always been written by fetching the record and replacing it.
    pub fn default_write_mode(self) -> WriteMode {
        match self {
            Self::Accommodations => WriteMode::Patch,
            _ => WriteMode::Replace,
        }
    }
}

/// How a favorite flag change is persisted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WriteMode {
    /// `PATCH` with only `isFavorite`.
    Patch,
    /// `GET` the record, flip the flag, `PUT` the whole record back.
    Replace,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_collection_names_and_aliases() {
        assert_eq!("chefs".parse::<EntityKind>().unwrap(), EntityKind::Chefs);
        assert_eq!(
            "Experiences".parse::<EntityKind>().unwrap(),
            EntityKind::Exclusives
        );
        assert!("users".parse::<EntityKind>().is_err());
    }

    #[test]
    fn collection_path_matches_display() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.collection(), kind.to_string());
        }
        assert_eq!(EntityKind::Exclusives.collection(), "exclusives");
    }

    #[test]
    fn defaults_per_kind() {
        assert_eq!(EntityKind::Accommodations.default_items_per_page(), 6);
        assert_eq!(EntityKind::Popular.default_items_per_page(), 3);
        assert_eq!(
            EntityKind::Accommodations.default_write_mode(),
            WriteMode::Patch
        );
        assert_eq!(EntityKind::Chefs.default_write_mode(), WriteMode::Replace);
    }
}
