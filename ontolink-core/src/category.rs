//! Semantic categories assigned to mentions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Category of a mention, shared by manual annotation and recognizer output.
///
/// Only categories with a configured taxonomy root ever get a populated
/// label index; mentions of the others are always reported unlinked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SemanticCategory {
    /// Foods and ingredients.
    Food,
    /// Units of measure.
    Unit,
    /// Amounts.
    Quantity,
    /// Preparation processes ("diced", "roasted").
    Process,
    /// Colors.
    Color,
    /// Physical qualities ("crispy", "thick").
    PhysicalQuality,
    /// Diets ("vegan").
    Diet,
    /// Parts of a food ("skin", "yolk").
    Part,
    /// Purpose of an ingredient ("for garnish").
    Purpose,
    /// Tastes.
    Taste,
}

/// Annotation labels that denote food despite not containing "food".
const FOOD_ALIASES: &[&str] = &[
    "possible_substite",
    "example",
    "trade_name",
    "excluded",
    "exclusive",
];

impl SemanticCategory {
    /// All categories, in declaration order.
    pub const ALL: [SemanticCategory; 10] = [
        SemanticCategory::Food,
        SemanticCategory::Unit,
        SemanticCategory::Quantity,
        SemanticCategory::Process,
        SemanticCategory::Color,
        SemanticCategory::PhysicalQuality,
        SemanticCategory::Diet,
        SemanticCategory::Part,
        SemanticCategory::Purpose,
        SemanticCategory::Taste,
    ];

    /// Canonical upper-case name.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            SemanticCategory::Food => "FOOD",
            SemanticCategory::Unit => "UNIT",
            SemanticCategory::Quantity => "QUANTITY",
            SemanticCategory::Process => "PROCESS",
            SemanticCategory::Color => "COLOR",
            SemanticCategory::PhysicalQuality => "PHYSICAL_QUALITY",
            SemanticCategory::Diet => "DIET",
            SemanticCategory::Part => "PART",
            SemanticCategory::Purpose => "PURPOSE",
            SemanticCategory::Taste => "TASTE",
        }
    }

    /// Map a raw annotation label (BRAT category, recognizer label) to a category.
    ///
    /// Case-insensitive. Anything mentioning "food", plus a handful of
    /// food-specific BRAT labels, is `Food`. Unknown labels also fall back
    /// to `Food`, since that is the category most annotation schemes
    /// subdivide.
    ///
    /// ```
    /// use ontolink_core::SemanticCategory;
    ///
    /// assert_eq!(SemanticCategory::from_annotation_label("FOOD_PRODUCT"), SemanticCategory::Food);
    /// assert_eq!(SemanticCategory::from_annotation_label("trade_name"), SemanticCategory::Food);
    /// assert_eq!(SemanticCategory::from_annotation_label("Unit"), SemanticCategory::Unit);
    /// assert_eq!(SemanticCategory::from_annotation_label("whatever"), SemanticCategory::Food);
    /// ```
    #[must_use]
    pub fn from_annotation_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("food") || FOOD_ALIASES.contains(&lower.as_str()) {
            return SemanticCategory::Food;
        }
        lower.parse().unwrap_or(SemanticCategory::Food)
    }
}

impl fmt::Display for SemanticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl FromStr for SemanticCategory {
    type Err = Error;

    /// Strict parse of a category name (case-insensitive, `-` or `_`).
    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_label() == upper)
            .ok_or_else(|| Error::unknown_category(s))
    }
}
