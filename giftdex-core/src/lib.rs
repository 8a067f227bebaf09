pub mod config;
pub mod controls;
pub mod error;
pub mod filter;
pub mod models;
pub mod render;
pub mod source;
pub mod substitute;

// Re-export commonly used types
pub use config::{get_config_path, Config, CONFIG_ENV_VAR};
pub use controls::{RequirementControl, RequirementControls};
pub use error::LoadError;
pub use filter::{compare_names, filter_items, CharacterFilter, Selection, ALL_CHARACTERS};
pub use models::{
    Catalog, DictionaryIssue, Item, Session, Term, TermDictionary, NO_COMMENTS, NO_REQUIREMENTS,
    SOURCE_SEPARATOR,
};
pub use render::{
    format_value, heart_count, ItemCard, RenderOptions, Renderer, MAX_HEARTS, SELECT_A_CHARACTER,
};
pub use source::{load_catalog, load_session, load_terms, Source};
pub use substitute::{
    referenced_ids, substitute, substitute_plain, substitute_with, tokenize, Token,
};
