//! HTML output: item cards and the static catalog page

use crate::config::Config;
use crate::controls::RequirementControls;
use crate::filter::{filter_items, CharacterFilter, Selection, ALL_CHARACTERS};
use crate::models::{Item, Session, TermDictionary};
use crate::substitute::{escape_attribute, icon_annotation, substitute_with};

/// Shown in per-character fields while no character is selected
pub const SELECT_A_CHARACTER: &str = "Select a character";

/// Most heart icons drawn for one rating; larger ratings are capped
pub const MAX_HEARTS: u32 = 10;

/// Number of heart icons to draw for a rating
pub fn heart_count(hearts: u32) -> usize {
    if hearts > MAX_HEARTS {
        log::warn!("Hearts rating {} capped at {}", hearts, MAX_HEARTS);
    }
    hearts.min(MAX_HEARTS) as usize
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub icon_width: u32,
    pub heart_icon: String,
    pub heart_width: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Config::default().into()
    }
}

impl From<Config> for RenderOptions {
    fn from(config: Config) -> Self {
        Self {
            icon_width: config.icon_width,
            heart_icon: config.heart_icon,
            heart_width: config.heart_width,
        }
    }
}

impl From<&Config> for RenderOptions {
    fn from(config: &Config) -> Self {
        config.clone().into()
    }
}

/// Content of one rendered item, every field already substituted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCard {
    pub title: String,
    pub characters: String,
    pub value: String,
    pub hearts: String,
    pub source: String,
    pub requirements: String,
    pub comments: String,
}

impl ItemCard {
    pub fn to_html(&self) -> String {
        format!(
            r#"
        <div class="item-card">
            <h3>{}</h3>
            <p><strong>Character(s):</strong> {}</p>
            <p><strong>Value:</strong> {}</p>
            <p><strong>Hearts:</strong> {}</p>
            <p><strong>Source:</strong> {}</p>
            <p><strong>Requirement(s):</strong> {}</p>
            <p><strong>Comments:</strong> {}</p>
        </div>"#,
            self.title,
            self.characters,
            self.value,
            self.hearts,
            self.source,
            self.requirements,
            self.comments
        )
    }
}

/// Formats a value without a trailing ".0" for whole numbers
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Turns engine output into HTML fragments
pub struct Renderer<'a> {
    terms: &'a TermDictionary,
    options: RenderOptions,
}

impl<'a> Renderer<'a> {
    pub fn new(terms: &'a TermDictionary, options: RenderOptions) -> Self {
        Self { terms, options }
    }

    /// Substitutes term references using the configured icon width
    pub fn substitute(&self, text: &str) -> String {
        let width = self.options.icon_width;
        substitute_with(text, self.terms, |term| icon_annotation(term, width))
    }

    /// Character list, known ids shown with their icon
    pub fn characters_text(&self, item: &Item) -> String {
        let width = self.options.icon_width;
        item.character_ids()
            .map(|id| match self.terms.get(id) {
                Some(term) => icon_annotation(term, width),
                None => id.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn value_text(&self, item: &Item, character: &CharacterFilter) -> String {
        match character.character() {
            None => SELECT_A_CHARACTER.to_string(),
            Some(id) => format_value(item.value_for(id)),
        }
    }

    pub fn hearts_text(&self, item: &Item, character: &CharacterFilter) -> String {
        let Some(id) = character.character() else {
            return SELECT_A_CHARACTER.to_string();
        };
        let hearts = item.hearts_for(id);
        if hearts == 0 {
            return "0".to_string();
        }
        let heart = format!(
            r#"<img src="{}" alt="heart" style="width: {}px;"> "#,
            escape_attribute(&self.options.heart_icon),
            self.options.heart_width
        );
        format!(
            r#"<span class="hearts">{}</span>"#,
            heart.repeat(heart_count(hearts))
        )
    }

    pub fn comments_text(&self, item: &Item, character: &CharacterFilter) -> String {
        match character.character() {
            None => SELECT_A_CHARACTER.to_string(),
            Some(id) => self.substitute(item.comment_for(id)),
        }
    }

    pub fn card(&self, item: &Item, character: &CharacterFilter) -> ItemCard {
        ItemCard {
            title: self.substitute(&item.name),
            characters: self.characters_text(item),
            value: self.value_text(item, character),
            hearts: self.hearts_text(item, character),
            source: self.substitute(&item.source),
            requirements: self.substitute(item.requirements_text()),
            comments: self.comments_text(item, character),
        }
    }

    /// The contents of the items container for a list of visible items
    pub fn items_html(&self, items: &[&Item], character: &CharacterFilter) -> String {
        items
            .iter()
            .map(|item| self.card(item, character).to_html())
            .collect()
    }

    fn character_select_html(&self, selected: &CharacterFilter) -> String {
        let mut html = String::from(r#"<select id="characterFilter">"#);
        html.push_str(&option_html(ALL_CHARACTERS, "All", selected.character().is_none()));
        for (id, term) in self.terms.character_options() {
            html.push_str(&option_html(id, &term.name, selected.character() == Some(id)));
        }
        html.push_str("</select>");
        html
    }

    fn requirement_filter_html(&self, controls: &RequirementControls) -> String {
        let mut html = String::from(r#"<div id="requirementFilter">"#);
        for control in controls.iter() {
            let style = if control.visible {
                ""
            } else {
                r#" style="display: none""#
            };
            let checked = if control.checked { " checked" } else { "" };
            html.push_str(&format!(
                r#"<label{}><input type="checkbox" value="{}"{}> {}</label><br>"#,
                style,
                escape_attribute(&control.id),
                checked,
                control.label
            ));
        }
        html.push_str("</div>");
        html
    }

    /// A complete page: filter controls reflecting the selection, then the
    /// filtered and sorted item cards
    pub fn page(&self, session: &Session, controls: &RequirementControls, selection: &Selection) -> String {
        let visible = filter_items(&session.catalog, selection);
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Item Database</title>
</head>
<body>
    <div id="filters">
        {}
        {}
    </div>
    <div id="itemsContainer">{}
    </div>
</body>
</html>
"#,
            self.character_select_html(&selection.character),
            self.requirement_filter_html(controls),
            self.items_html(&visible, &selection.character)
        )
    }
}

fn option_html(value: &str, label: &str, selected: bool) -> String {
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        escape_attribute(value),
        if selected { " selected" } else { "" },
        label
    )
}
