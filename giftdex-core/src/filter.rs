//! Filtering and ordering of the catalog for a selection state

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::models::{Catalog, Item};

/// Selector value meaning "every character"
pub const ALL_CHARACTERS: &str = "all";

/// The character selector's current value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CharacterFilter {
    #[default]
    All,
    Character(String),
}

impl CharacterFilter {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL_CHARACTERS {
            CharacterFilter::All
        } else {
            CharacterFilter::Character(value.to_string())
        }
    }

    /// The selected character id, `None` for "all"
    pub fn character(&self) -> Option<&str> {
        match self {
            CharacterFilter::All => None,
            CharacterFilter::Character(id) => Some(id.as_str()),
        }
    }

    pub fn as_str(&self) -> &str {
        self.character().unwrap_or(ALL_CHARACTERS)
    }
}

impl FromStr for CharacterFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CharacterFilter::parse(s))
    }
}

impl fmt::Display for CharacterFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of the user's choices, built by the presentation layer per event
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub character: CharacterFilter,
    pub requirements: BTreeSet<String>,
}

impl Selection {
    pub fn new(character: CharacterFilter, requirements: BTreeSet<String>) -> Self {
        Self {
            character,
            requirements,
        }
    }

    /// Every character, no requirement filters
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_character(id: impl Into<String>) -> Self {
        Self {
            character: CharacterFilter::Character(id.into()),
            requirements: BTreeSet::new(),
        }
    }

    pub fn with_requirement(mut self, id: impl Into<String>) -> Self {
        self.requirements.insert(id.into());
        self
    }

    pub fn matches_character(&self, item: &Item) -> bool {
        match &self.character {
            CharacterFilter::All => true,
            CharacterFilter::Character(id) => item.applies_to(id),
        }
    }

    pub fn matches_requirements(&self, item: &Item) -> bool {
        self.requirements.is_empty()
            || item.has_no_requirements()
            || self
                .requirements
                .iter()
                .any(|id| item.references_requirement(id))
    }

    pub fn matches(&self, item: &Item) -> bool {
        self.matches_character(item) && self.matches_requirements(item)
    }

    /// Display order for two items under this selection
    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        match &self.character {
            CharacterFilter::All => compare_names(&a.name, &b.name),
            CharacterFilter::Character(id) => b
                .value_for(id)
                .total_cmp(&a.value_for(id))
                .then_with(|| compare_names(&a.name, &b.name)),
        }
    }
}

/// Name ordering used for display: case-insensitive first, and on a
/// case-only difference lowercase sorts before uppercase.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| b.cmp(a))
}

/// Items visible under `selection`, in display order
pub fn filter_items<'a>(catalog: &'a Catalog, selection: &Selection) -> Vec<&'a Item> {
    let mut visible: Vec<&Item> = catalog
        .items()
        .iter()
        .filter(|item| selection.matches(item))
        .collect();
    visible.sort_by(|a, b| selection.compare(a, b));
    visible
}
