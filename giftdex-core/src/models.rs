use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Placeholder shown when an item has no comment for the selected character
pub const NO_COMMENTS: &str = "No comments available";

/// Requirements text meaning "no prerequisites at all"
pub const NO_REQUIREMENTS: &str = "None";

/// Separator between source segments when several sources apply
pub const SOURCE_SEPARATOR: &str = " + ";

/// A named term that can be referenced from free text as `|id|`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Term {
    /// Display name
    pub name: String,
    /// Icon reference (usually a relative image path); empty when absent
    #[serde(default)]
    pub img: String,
    /// Ids of the terms this one unlocks
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub upgrades: Vec<String>,
    /// Whether the term is offered as a character option / requirement checkbox.
    /// Set from the key syntax: pipe-wrapped keys (`"|oven|"`) are filterable.
    #[serde(skip)]
    pub filterable: bool,
}

impl Term {
    pub fn new(name: impl Into<String>, img: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            img: img.into(),
            upgrades: Vec::new(),
            filterable: false,
        }
    }

    pub fn with_upgrades<I, S>(mut self, upgrades: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.upgrades = upgrades.into_iter().map(Into::into).collect();
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    /// Folds another entry for the same id into this one. Flags and upgrades
    /// are unioned; `prefer_other` takes its name and icon.
    fn merge(&mut self, other: Term, prefer_other: bool) {
        self.filterable |= other.filterable;
        for upgrade in other.upgrades {
            if !self.upgrades.contains(&upgrade) {
                self.upgrades.push(upgrade);
            }
        }
        if prefer_other {
            self.name = other.name;
            if !other.img.is_empty() {
                self.img = other.img;
            }
        } else if self.img.is_empty() {
            self.img = other.img;
        }
    }
}

/// Strips the optional `|...|` wrapping from a dictionary key.
/// Returns the bare id and whether it was wrapped.
fn normalize_key(key: &str) -> (String, bool) {
    let wrapped = key.len() >= 2 && key.starts_with('|') && key.ends_with('|');
    (key.trim_matches('|').to_string(), wrapped)
}

/// Problem found by [`TermDictionary::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionaryIssue {
    /// An upgrade id that is not a key of the dictionary
    UnknownUpgrade { term: String, upgrade: String },
    /// A term listing itself as an upgrade
    SelfUpgrade { term: String },
    /// A chain of upgrades that leads back to its start
    UpgradeCycle { path: Vec<String> },
}

impl fmt::Display for DictionaryIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictionaryIssue::UnknownUpgrade { term, upgrade } => {
                write!(f, "term '{}' lists unknown upgrade '{}'", term, upgrade)
            }
            DictionaryIssue::SelfUpgrade { term } => {
                write!(f, "term '{}' lists itself as an upgrade", term)
            }
            DictionaryIssue::UpgradeCycle { path } => {
                write!(f, "upgrade cycle: {}", path.join(" -> "))
            }
        }
    }
}

/// Lookup table of terms, keyed by id, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "IndexMap<String, Term>")]
pub struct TermDictionary {
    terms: IndexMap<String, Term>,
}

impl From<IndexMap<String, Term>> for TermDictionary {
    fn from(raw: IndexMap<String, Term>) -> Self {
        let mut dictionary = TermDictionary::default();
        for (key, term) in raw {
            let (id, wrapped) = normalize_key(&key);
            let term = Term {
                filterable: term.filterable || wrapped,
                upgrades: term
                    .upgrades
                    .iter()
                    .map(|u| u.trim_matches('|').to_string())
                    .collect(),
                ..term
            };

            // `"|oven|"` and `"oven"` name the same term
            match dictionary.terms.get_mut(&id) {
                Some(existing) => {
                    log::debug!("Merging duplicate dictionary key '{}'", key);
                    existing.merge(term, !wrapped);
                }
                None => dictionary.insert(id, term),
            }
        }
        dictionary
    }
}

impl TermDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a term, replacing any previous entry with the same id in place
    pub fn insert(&mut self, id: impl Into<String>, term: Term) {
        self.terms.insert(id.into(), term);
    }

    pub fn get(&self, id: &str) -> Option<&Term> {
        self.terms.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.terms.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterates `(id, term)` pairs in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.terms.iter().map(|(id, term)| (id.as_str(), term))
    }

    /// Upgrade ids unlocked by `id` (empty when unknown or none)
    pub fn upgrades_of(&self, id: &str) -> &[String] {
        self.terms
            .get(id)
            .map(|t| t.upgrades.as_slice())
            .unwrap_or(&[])
    }

    /// Terms offered as requirement checkboxes, in document order
    pub fn requirement_options(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.iter().filter(|(_, term)| term.filterable)
    }

    /// Terms offered in the character selector (the `all` term is excluded,
    /// since the selector always carries its own "all" entry)
    pub fn character_options(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.requirement_options()
            .filter(|(id, _)| *id != crate::filter::ALL_CHARACTERS)
    }

    /// Checks the upgrade relation: every upgrade must exist and no term
    /// may reach itself through upgrades.
    pub fn validate(&self) -> Vec<DictionaryIssue> {
        let mut issues = Vec::new();

        for (id, term) in self.iter() {
            for upgrade in &term.upgrades {
                if upgrade == id {
                    issues.push(DictionaryIssue::SelfUpgrade {
                        term: id.to_string(),
                    });
                } else if !self.contains(upgrade) {
                    issues.push(DictionaryIssue::UnknownUpgrade {
                        term: id.to_string(),
                        upgrade: upgrade.clone(),
                    });
                }
            }
        }

        // Depth-first search over known, non-self edges
        let mut finished: HashSet<&str> = HashSet::new();
        for (start, _) in self.iter() {
            if finished.contains(start) {
                continue;
            }
            let mut path: Vec<&str> = Vec::new();
            self.find_cycles(start, &mut path, &mut finished, &mut issues);
        }

        issues
    }

    fn find_cycles<'a>(
        &'a self,
        id: &'a str,
        path: &mut Vec<&'a str>,
        finished: &mut HashSet<&'a str>,
        issues: &mut Vec<DictionaryIssue>,
    ) {
        path.push(id);
        for upgrade in self.upgrades_of(id) {
            let upgrade = upgrade.as_str();
            if upgrade == id || !self.contains(upgrade) || finished.contains(upgrade) {
                continue;
            }
            if let Some(pos) = path.iter().position(|p| *p == upgrade) {
                let mut cycle: Vec<String> = path[pos..].iter().map(|s| s.to_string()).collect();
                cycle.push(upgrade.to_string());
                issues.push(DictionaryIssue::UpgradeCycle { path: cycle });
                continue;
            }
            self.find_cycles(upgrade, path, finished, issues);
        }
        path.pop();
        finished.insert(id);
    }
}

/// One catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Item {
    /// Item name (may itself contain references)
    #[serde(rename = "item")]
    pub name: String,
    /// Characters the item applies to
    #[serde(default)]
    pub character: Vec<String>,
    /// Per-character value
    #[serde(default)]
    pub value: HashMap<String, f64>,
    /// Per-character heart rating
    #[serde(default)]
    pub hearts: HashMap<String, u32>,
    /// Where the item comes from, segments joined by `" + "`
    #[serde(default)]
    pub source: String,
    /// `"None"` or text containing requirement references
    #[serde(default)]
    pub requirements: String,
    /// Per-character comments
    #[serde(default)]
    pub comments: HashMap<String, String>,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Character ids, with any `|...|` wrapping removed
    pub fn character_ids(&self) -> impl Iterator<Item = &str> {
        self.character.iter().map(|c| c.trim_matches('|'))
    }

    pub fn applies_to(&self, character: &str) -> bool {
        self.character_ids().any(|c| c == character)
    }

    pub fn value_for(&self, character: &str) -> f64 {
        self.value.get(character).copied().unwrap_or(0.0)
    }

    pub fn hearts_for(&self, character: &str) -> u32 {
        self.hearts.get(character).copied().unwrap_or(0)
    }

    pub fn comment_for(&self, character: &str) -> &str {
        self.comments
            .get(character)
            .map(|c| c.as_str())
            .unwrap_or(NO_COMMENTS)
    }

    /// True when the item explicitly has no prerequisites
    pub fn has_no_requirements(&self) -> bool {
        self.requirements == NO_REQUIREMENTS
    }

    /// True when `|id|` appears in the requirements text
    pub fn references_requirement(&self, id: &str) -> bool {
        self.requirements.contains(&format!("|{}|", id))
    }

    /// Requirements text for display ("None" when empty)
    pub fn requirements_text(&self) -> &str {
        if self.requirements.is_empty() {
            NO_REQUIREMENTS
        } else {
            &self.requirements
        }
    }

    /// Splits the source into its `" + "` separated segments
    pub fn source_segments(&self) -> Vec<&str> {
        if self.source.is_empty() {
            return Vec::new();
        }
        self.source.split(SOURCE_SEPARATOR).collect()
    }
}

/// Ordered collection of items, immutable once loaded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Finds an item by exact name, falling back to a case-insensitive match
    pub fn find_by_name(&self, name: &str) -> Option<&Item> {
        self.items
            .iter()
            .find(|i| i.name == name)
            .or_else(|| self.items.iter().find(|i| i.name.eq_ignore_ascii_case(name)))
    }

    /// Returns the catalog sorted ascending by name
    pub fn sorted_by_name(mut self) -> Self {
        self.items
            .sort_by(|a, b| crate::filter::compare_names(&a.name, &b.name));
        self
    }
}

/// Everything loaded at startup: the dictionary and the catalog.
///
/// Built once and then only read; engines borrow from it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub terms: TermDictionary,
    pub catalog: Catalog,
}

impl Session {
    pub fn new(terms: TermDictionary, catalog: Catalog) -> Self {
        Self { terms, catalog }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary(json: &str) -> TermDictionary {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_dictionary_normalizes_wrapped_keys() {
        let terms = dictionary(
            r#"{
                "|alice|": {"name": "Alice", "img": "images/alice.png"},
                "wood": {"name": "Wood", "img": "images/wood.png"},
                "|oven|": {"name": "Oven", "img": "images/oven.png", "upgrades": ["|big-oven|"]}
            }"#,
        );

        assert_eq!(terms.len(), 3);
        assert!(terms.get("alice").unwrap().filterable);
        assert!(!terms.get("wood").unwrap().filterable);
        assert_eq!(terms.upgrades_of("oven"), ["big-oven".to_string()]);
        assert!(terms.get("|alice|").is_none());
    }

    #[test]
    fn test_dictionary_keeps_document_order() {
        let terms = dictionary(
            r#"{
                "|zed|": {"name": "Zed", "img": "z.png"},
                "|all|": {"name": "All", "img": "all.png"},
                "|amy|": {"name": "Amy", "img": "a.png"}
            }"#,
        );

        let requirement_ids: Vec<_> = terms.requirement_options().map(|(id, _)| id).collect();
        assert_eq!(requirement_ids, vec!["zed", "all", "amy"]);

        let character_ids: Vec<_> = terms.character_options().map(|(id, _)| id).collect();
        assert_eq!(character_ids, vec!["zed", "amy"]);
    }

    #[test]
    fn test_wrapped_and_bare_keys_merge() {
        let wrapped_first = dictionary(
            r#"{
                "|oven|": {"name": "Oven (filter)", "img": "", "upgrades": ["big"]},
                "oven": {"name": "Oven", "img": "oven.png"},
                "big": {"name": "Big Oven", "img": "big.png"}
            }"#,
        );
        let bare_first = dictionary(
            r#"{
                "oven": {"name": "Oven", "img": "oven.png"},
                "|oven|": {"name": "Oven (filter)", "img": "other.png", "upgrades": ["|big|"]},
                "big": {"name": "Big Oven", "img": "big.png"}
            }"#,
        );

        for terms in [&wrapped_first, &bare_first] {
            assert_eq!(terms.len(), 2);
            let oven = terms.get("oven").unwrap();
            assert!(oven.filterable);
            assert_eq!(oven.name, "Oven");
            assert_eq!(oven.img, "oven.png");
            assert_eq!(terms.upgrades_of("oven"), ["big".to_string()]);

            let requirement_ids: Vec<_> = terms.requirement_options().map(|(id, _)| id).collect();
            assert_eq!(requirement_ids, vec!["oven"]);
        }
    }

    #[test]
    fn test_term_without_img() {
        let terms = dictionary(r#"{"|wood|": {"name": "Wood"}}"#);

        let wood = terms.get("wood").unwrap();
        assert_eq!(wood.name, "Wood");
        assert_eq!(wood.img, "");
        assert!(wood.filterable);
    }

    #[test]
    fn test_validate_clean_dictionary() {
        let mut terms = TermDictionary::new();
        terms.insert("base", Term::new("Base", "b.png").with_upgrades(["up1"]));
        terms.insert("up1", Term::new("Up", "u.png"));

        assert!(terms.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_unknown_and_self_upgrades() {
        let mut terms = TermDictionary::new();
        terms.insert("base", Term::new("Base", "b.png").with_upgrades(["ghost", "base"]));

        let issues = terms.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues.contains(&DictionaryIssue::UnknownUpgrade {
            term: "base".to_string(),
            upgrade: "ghost".to_string(),
        }));
        assert!(issues.contains(&DictionaryIssue::SelfUpgrade {
            term: "base".to_string()
        }));
    }

    #[test]
    fn test_validate_reports_transitive_cycle_once() {
        let mut terms = TermDictionary::new();
        terms.insert("a", Term::new("A", "a.png").with_upgrades(["b"]));
        terms.insert("b", Term::new("B", "b.png").with_upgrades(["c"]));
        terms.insert("c", Term::new("C", "c.png").with_upgrades(["a"]));

        let issues = terms.validate();
        assert_eq!(
            issues,
            vec![DictionaryIssue::UpgradeCycle {
                path: vec!["a".into(), "b".into(), "c".into(), "a".into()],
            }]
        );
        assert_eq!(issues[0].to_string(), "upgrade cycle: a -> b -> c -> a");
    }

    #[test]
    fn test_item_defaults_for_missing_character_fields() {
        let item: Item = serde_json::from_str(
            r#"{
                "item": "Cake",
                "character": ["alice"],
                "value": {"alice": 12},
                "hearts": {"alice": 3},
                "source": "|oven| + |market|",
                "requirements": "|oven|",
                "comments": {"alice": "Loves it"}
            }"#,
        )
        .unwrap();

        assert!(item.applies_to("alice"));
        assert!(!item.applies_to("bob"));
        assert_eq!(item.value_for("alice"), 12.0);
        assert_eq!(item.value_for("bob"), 0.0);
        assert_eq!(item.hearts_for("bob"), 0);
        assert_eq!(item.comment_for("alice"), "Loves it");
        assert_eq!(item.comment_for("bob"), NO_COMMENTS);
        assert_eq!(item.source_segments(), vec!["|oven|", "|market|"]);
        assert!(item.references_requirement("oven"));
        assert!(!item.references_requirement("ove"));
    }

    #[test]
    fn test_requirements_text_defaults_to_none() {
        let item = Item::new("Stick");
        assert_eq!(item.requirements_text(), "None");
        assert!(!item.has_no_requirements());

        let explicit = Item {
            requirements: "None".to_string(),
            ..Item::new("Stone")
        };
        assert!(explicit.has_no_requirements());
    }

    #[test]
    fn test_catalog_sorted_by_name_and_lookup() {
        let catalog = Catalog::new(vec![Item::new("cup"), Item::new("Axe"), Item::new("bow")])
            .sorted_by_name();

        let names: Vec<_> = catalog.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Axe", "bow", "cup"]);
        assert_eq!(catalog.find_by_name("BOW").unwrap().name, "bow");
        assert!(catalog.find_by_name("sword").is_none());
    }
}
