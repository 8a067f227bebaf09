//! Requirement checkbox state and the upgrade visibility rule
//!
//! A requirement may list upgrades in the dictionary. An upgrade checkbox is
//! only shown while one of its bases is checked; hiding it also unchecks it, so a
//! hidden upgrade never keeps filtering the catalog.

use std::collections::BTreeSet;

use crate::filter::{CharacterFilter, Selection};
use crate::models::TermDictionary;

/// One rendered requirement checkbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementControl {
    pub id: String,
    pub label: String,
    pub checked: bool,
    pub visible: bool,
}

/// The requirement checkbox group, in render order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementControls {
    controls: Vec<RequirementControl>,
}

impl RequirementControls {
    /// One unchecked checkbox per filterable term, with the upgrade rule
    /// already applied (so upgrades start hidden)
    pub fn from_dictionary(terms: &TermDictionary) -> Self {
        let mut controls = Self {
            controls: terms
                .requirement_options()
                .map(|(id, term)| RequirementControl {
                    id: id.to_string(),
                    label: term.name.clone(),
                    checked: false,
                    visible: true,
                })
                .collect(),
        };
        controls.apply_upgrade_rule(terms);
        controls
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequirementControl> {
        self.controls.iter()
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&RequirementControl> {
        self.controls.iter().find(|c| c.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.controls.iter().position(|c| c.id == id)
    }

    /// Sets a checkbox without re-running the rule.
    /// Returns false when no control has that id.
    pub fn set_checked(&mut self, id: &str, checked: bool) -> bool {
        match self.position(id) {
            Some(pos) => {
                self.controls[pos].checked = checked;
                true
            }
            None => false,
        }
    }

    /// A user toggling one checkbox: set it, then re-apply the rule
    pub fn toggle(&mut self, id: &str, checked: bool, terms: &TermDictionary) -> bool {
        let found = self.set_checked(id, checked);
        if found {
            self.apply_upgrade_rule(terms);
        }
        found
    }

    /// Shows each upgrade while at least one of its bases is checked and
    /// hides (and unchecks) it otherwise. Upgrades without a control are
    /// skipped.
    ///
    /// Repeats until nothing changes so that chains of upgrades settle in a
    /// single call; the result is the same however often it is applied.
    /// Returns true if any control changed.
    pub fn apply_upgrade_rule(&mut self, terms: &TermDictionary) -> bool {
        let before = self.controls.clone();
        // Checks are only ever cleared here, so the passes settle within the bound.
        for _ in 0..=self.controls.len() + 1 {
            if !self.apply_once(terms) {
                break;
            }
        }
        self.controls != before
    }

    /// One pass, with every upgrade's target computed from the state at the
    /// start of the pass
    fn apply_once(&mut self, terms: &TermDictionary) -> bool {
        let mut targets: Vec<Option<bool>> = vec![None; self.controls.len()];
        for base in &self.controls {
            for upgrade_id in terms.upgrades_of(&base.id) {
                if let Some(pos) = self.position(upgrade_id) {
                    let shown = targets[pos].unwrap_or(false) || base.checked;
                    targets[pos] = Some(shown);
                }
            }
        }

        let mut changed = false;
        for (control, target) in self.controls.iter_mut().zip(targets) {
            let Some(shown) = target else {
                continue;
            };
            let checked = control.checked && shown;
            if control.visible != shown || control.checked != checked {
                control.visible = shown;
                control.checked = checked;
                changed = true;
            }
        }
        changed
    }

    /// Ids of the checked controls
    pub fn checked_ids(&self) -> BTreeSet<String> {
        self.controls
            .iter()
            .filter(|c| c.checked)
            .map(|c| c.id.clone())
            .collect()
    }

    /// Selection snapshot for the engines
    pub fn selection(&self, character: CharacterFilter) -> Selection {
        Selection::new(character, self.checked_ids())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Term;

    fn terms() -> TermDictionary {
        let mut terms = TermDictionary::new();
        terms.insert(
            "base",
            Term::new("Base", "base.png").with_upgrades(["up1"]).filterable(),
        );
        terms.insert(
            "up1",
            Term::new("Upgrade", "up1.png").with_upgrades(["up2"]).filterable(),
        );
        terms.insert("up2", Term::new("Upgrade 2", "up2.png").filterable());
        terms.insert("other", Term::new("Other", "other.png").filterable());
        terms
    }

    fn visible(controls: &RequirementControls, id: &str) -> bool {
        controls.get(id).unwrap().visible
    }

    fn checked(controls: &RequirementControls, id: &str) -> bool {
        controls.get(id).unwrap().checked
    }

    #[test]
    fn test_upgrades_start_hidden() {
        let controls = RequirementControls::from_dictionary(&terms());

        assert_eq!(controls.len(), 4);
        assert!(visible(&controls, "base"));
        assert!(!visible(&controls, "up1"));
        assert!(!visible(&controls, "up2"));
        assert!(visible(&controls, "other"));
    }

    #[test]
    fn test_checking_base_shows_upgrade() {
        let terms = terms();
        let mut controls = RequirementControls::from_dictionary(&terms);

        assert!(controls.toggle("base", true, &terms));
        assert!(visible(&controls, "up1"));
        assert!(!visible(&controls, "up2"));
    }

    #[test]
    fn test_unchecking_base_hides_and_clears_upgrade() {
        let terms = terms();
        let mut controls = RequirementControls::from_dictionary(&terms);

        controls.toggle("base", true, &terms);
        controls.toggle("up1", true, &terms);
        assert!(visible(&controls, "up2"));

        controls.toggle("base", false, &terms);
        assert!(!visible(&controls, "up1"));
        assert!(!checked(&controls, "up1"));
        // the chain settles in the same call
        assert!(!visible(&controls, "up2"));
        assert_eq!(controls.checked_ids(), BTreeSet::new());
    }

    #[test]
    fn test_upgrade_keeps_checked_state_while_base_checked() {
        let terms = terms();
        let mut controls = RequirementControls::from_dictionary(&terms);

        controls.toggle("base", true, &terms);
        controls.toggle("up1", true, &terms);
        controls.toggle("other", true, &terms);

        assert!(checked(&controls, "up1"));
        let ids: Vec<_> = controls.checked_ids().into_iter().collect();
        assert_eq!(ids, vec!["base", "other", "up1"]);
    }

    #[test]
    fn test_rule_is_idempotent() {
        let terms = terms();
        let mut controls = RequirementControls::from_dictionary(&terms);
        controls.set_checked("up1", true);
        controls.set_checked("base", true);

        controls.apply_upgrade_rule(&terms);
        let once = controls.clone();
        assert!(!controls.apply_upgrade_rule(&terms));
        assert_eq!(controls, once);
    }

    #[test]
    fn test_shared_upgrade_follows_any_checked_base() {
        let mut terms = TermDictionary::new();
        terms.insert("a", Term::new("A", "a.png").with_upgrades(["u"]).filterable());
        terms.insert("b", Term::new("B", "b.png").with_upgrades(["u"]).filterable());
        terms.insert("u", Term::new("U", "u.png").filterable());
        let mut controls = RequirementControls::from_dictionary(&terms);
        assert!(!visible(&controls, "u"));

        assert!(controls.toggle("a", true, &terms));
        assert!(visible(&controls, "u"));
        controls.toggle("u", true, &terms);

        let settled = controls.clone();
        assert!(!controls.apply_upgrade_rule(&terms));
        assert_eq!(controls, settled);
        assert!(checked(&controls, "u"));

        controls.toggle("a", false, &terms);
        assert!(!visible(&controls, "u"));
        assert!(!checked(&controls, "u"));
        assert!(!controls.apply_upgrade_rule(&terms));
    }

    #[test]
    fn test_missing_upgrade_control_is_skipped() {
        let mut terms = TermDictionary::new();
        terms.insert(
            "base",
            Term::new("Base", "base.png").with_upgrades(["ghost"]).filterable(),
        );
        let mut controls = RequirementControls::from_dictionary(&terms);

        assert!(controls.toggle("base", true, &terms));
        assert!(!controls.toggle("ghost", true, &terms));
        assert_eq!(controls.len(), 1);
    }

    #[test]
    fn test_cyclic_upgrades_terminate() {
        let mut terms = TermDictionary::new();
        terms.insert("a", Term::new("A", "a.png").with_upgrades(["b"]).filterable());
        terms.insert("b", Term::new("B", "b.png").with_upgrades(["a"]).filterable());
        let mut controls = RequirementControls::from_dictionary(&terms);

        controls.toggle("a", true, &terms);
        controls.apply_upgrade_rule(&terms);
        assert!(!controls.apply_upgrade_rule(&terms));
    }

    #[test]
    fn test_selection_snapshot() {
        let terms = terms();
        let mut controls = RequirementControls::from_dictionary(&terms);
        controls.toggle("other", true, &terms);

        let selection = controls.selection(CharacterFilter::parse("alice"));
        assert_eq!(selection.character.character(), Some("alice"));
        assert!(selection.requirements.contains("other"));
    }
}
