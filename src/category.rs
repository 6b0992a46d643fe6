use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of distinct discoveries in the scene (both pillows count as one).
pub const TOTAL_CATEGORY_COUNT: usize = TargetCategory::ALL.len();

/// Discoverable group of scene objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetCategory {
    Link,
    TechStack,
    Instrument,
    Sculpture,
    Seating,
    Literature,
    Lantern,
}

impl TargetCategory {
    pub const ALL: [TargetCategory; 7] = [
        TargetCategory::Link,
        TargetCategory::TechStack,
        TargetCategory::Instrument,
        TargetCategory::Sculpture,
        TargetCategory::Seating,
        TargetCategory::Literature,
        TargetCategory::Lantern,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::TechStack => "techstack",
            Self::Instrument => "instrument",
            Self::Sculpture => "sculpture",
            Self::Seating => "seating",
            Self::Literature => "literature",
            Self::Lantern => "lantern",
        }
    }

    /// Categories that navigate away instead of opening a modal.
    pub fn is_external(self) -> bool {
        matches!(self, Self::Link)
    }
}

impl fmt::Display for TargetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scene object name paired with the discovery it counts towards.
pub struct TargetName {
    pub name: &'static str,
    pub category: TargetCategory,
}

/// Clickable scene objects. Names outside this table are ignored, and the
/// same list doubles as the allow-list for the pointer cursor.
pub const TARGET_NAMES: &[TargetName] = &[
    TargetName {
        name: "Text_target",
        category: TargetCategory::Link,
    },
    TargetName {
        name: "pc_target",
        category: TargetCategory::TechStack,
    },
    TargetName {
        name: "Guitar_target",
        category: TargetCategory::Instrument,
    },
    TargetName {
        name: "pot_target",
        category: TargetCategory::Sculpture,
    },
    TargetName {
        name: "pillow_target",
        category: TargetCategory::Seating,
    },
    TargetName {
        name: "pillow2_target",
        category: TargetCategory::Seating,
    },
    TargetName {
        name: "book_target",
        category: TargetCategory::Literature,
    },
    TargetName {
        name: "lantern_target",
        category: TargetCategory::Lantern,
    },
];

pub fn category_for_node(name: &str) -> Option<TargetCategory> {
    TARGET_NAMES
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| entry.category)
}

pub fn is_interactive(name: &str) -> bool {
    category_for_node(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_pillows_share_seating() {
        assert_eq!(
            category_for_node("pillow_target"),
            Some(TargetCategory::Seating)
        );
        assert_eq!(
            category_for_node("pillow2_target"),
            Some(TargetCategory::Seating)
        );
    }

    #[test]
    fn table_covers_every_category() {
        for category in TargetCategory::ALL {
            assert!(TARGET_NAMES.iter().any(|entry| entry.category == category));
        }
        assert_eq!(TOTAL_CATEGORY_COUNT, 7);
    }

    #[test]
    fn unknown_names_are_not_interactive() {
        assert!(is_interactive("lantern_target"));
        assert!(!is_interactive("lamp_target"));
        assert!(!is_interactive(""));
    }
}
