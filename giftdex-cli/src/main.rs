mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::Path;

use giftdex_core::{
    filter_items, format_value, get_config_path, heart_count, load_session, substitute_plain,
    CharacterFilter, Config, Item, RenderOptions, Renderer, RequirementControls, Selection,
    Session, Source, TermDictionary, NO_REQUIREMENTS, SELECT_A_CHARACTER,
};

use crate::cli::{Cli, Command, ConfigCommand, FilterArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::resolve(cli.config.as_deref())?;
    if let Some(source) = &cli.source {
        config.source = source.clone();
    }

    match &cli.command {
        Command::List { filter } => {
            let session = open_session(&config).await?;
            list_items(&session, filter);
        }
        Command::Show { name, character } => {
            let session = open_session(&config).await?;
            show_item(&session, name, character)?;
        }
        Command::Render { filter, output } => {
            let session = open_session(&config).await?;
            render_page(&session, &config, filter, output.as_deref())?;
        }
        Command::Terms { check } => {
            let session = open_session(&config).await?;
            list_terms(&session.terms, *check);
        }
        Command::Config(config_cmd) => {
            handle_config_command(config_cmd, &config, cli.config.as_deref())?;
        }
    }

    Ok(())
}

/// Loads both documents; a missing or broken document only empties its half
async fn open_session(config: &Config) -> Result<Session> {
    let source = Source::from_location(&config.source)
        .with_context(|| format!("Invalid source: {}", config.source))?;
    Ok(load_session(&source, config).await)
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Builds the selection the way the page does: check the requested boxes,
/// then let the upgrade rule drop any whose base is not checked
fn build_selection(terms: &TermDictionary, filter: &FilterArgs) -> (RequirementControls, Selection) {
    let mut controls = RequirementControls::from_dictionary(terms);
    for id in &filter.require {
        let id = id.trim().trim_matches('|');
        if id.is_empty() {
            continue;
        }
        if !controls.set_checked(id, true) {
            log::warn!("Unknown requirement '{}' ignored", id);
        }
    }
    controls.apply_upgrade_rule(terms);

    for id in &filter.require {
        let id = id.trim().trim_matches('|');
        if controls.get(id).is_some_and(|c| !c.checked) {
            log::warn!("Requirement '{}' ignored: its base requirement is not selected", id);
        }
    }

    let character = CharacterFilter::parse(&filter.character);
    if let Some(id) = character.character() {
        if !terms.contains(id) {
            log::warn!("Character '{}' is not in the term dictionary", id);
        }
    }

    let selection = controls.selection(character);
    (controls, selection)
}

fn list_items(session: &Session, filter: &FilterArgs) {
    let (_, selection) = build_selection(&session.terms, filter);
    let items = filter_items(&session.catalog, &selection);

    if items.is_empty() {
        println!("{}", "No items found.".yellow());
        return;
    }

    println!(
        "{:<30} | {:<8} | {:<6} | {:<40}",
        "Item", "Value", "Hearts", "Requirement(s)"
    );
    println!("{}", "-".repeat(92));

    for item in &items {
        let (value, hearts) = match selection.character.character() {
            Some(id) => (
                format_value(item.value_for(id)),
                "♥".repeat(heart_count(item.hearts_for(id))),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        let requirements = substitute_plain(item.requirements_text(), &session.terms);
        let requirements = if requirements == NO_REQUIREMENTS {
            requirements.dimmed()
        } else {
            requirements.normal()
        };

        println!(
            "{:<30} | {:<8} | {:<6} | {:<40}",
            substitute_plain(&item.name, &session.terms),
            value.green(),
            hearts.red(),
            requirements
        );
    }

    println!("\n{} item(s)", items.len());
}

fn show_item(session: &Session, name: &str, character: &str) -> Result<()> {
    let item = session
        .catalog
        .find_by_name(name)
        .with_context(|| format!("Item not found: {}", name))?;
    let character = CharacterFilter::parse(character);
    let terms = &session.terms;

    println!("{}: {}", "Item".blue(), substitute_plain(&item.name, terms));
    println!("{}: {}", "Character(s)".blue(), plain_characters(item, terms));

    match character.character() {
        Some(id) => {
            println!("{}: {}", "Value".blue(), format_value(item.value_for(id)));
            println!(
                "{}: {}",
                "Hearts".blue(),
                "♥".repeat(heart_count(item.hearts_for(id))).red()
            );
        }
        None => {
            println!("{}: {}", "Value".blue(), SELECT_A_CHARACTER.dimmed());
            println!("{}: {}", "Hearts".blue(), SELECT_A_CHARACTER.dimmed());
        }
    }

    let segments = item.source_segments();
    if segments.len() > 1 {
        println!("{}:", "Source".blue());
        for segment in segments {
            println!("  - {}", substitute_plain(segment, terms));
        }
    } else {
        println!("{}: {}", "Source".blue(), substitute_plain(&item.source, terms));
    }

    println!(
        "{}: {}",
        "Requirement(s)".blue(),
        substitute_plain(item.requirements_text(), terms)
    );

    match character.character() {
        Some(id) => println!(
            "{}: {}",
            "Comments".blue(),
            substitute_plain(item.comment_for(id), terms)
        ),
        None => println!("{}: {}", "Comments".blue(), SELECT_A_CHARACTER.dimmed()),
    }

    Ok(())
}

fn plain_characters(item: &Item, terms: &TermDictionary) -> String {
    item.character_ids()
        .map(|id| terms.get(id).map(|t| t.name.as_str()).unwrap_or(id))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_page(
    session: &Session,
    config: &Config,
    filter: &FilterArgs,
    output: Option<&Path>,
) -> Result<()> {
    let (controls, selection) = build_selection(&session.terms, filter);
    let renderer = Renderer::new(&session.terms, RenderOptions::from(config));
    let html = renderer.page(session, &controls, &selection);

    match output {
        Some(path) => {
            fs::write(path, html)
                .with_context(|| format!("Failed to write page to {:?}", path))?;
            let shown = filter_items(&session.catalog, &selection).len();
            println!("{} Rendered {} item(s) to {}", "✓".green(), shown, path.display());
        }
        None => print!("{}", html),
    }

    Ok(())
}

fn list_terms(terms: &TermDictionary, check: bool) {
    let issues = terms.validate();

    if !check {
        if terms.is_empty() {
            println!("{}", "No terms found.".yellow());
        } else {
            println!("{:<20} | {:<25} | {:<6} | {}", "ID", "Name", "Filter", "Upgrades");
            println!("{}", "-".repeat(80));
            for (id, term) in terms.iter() {
                let filterable = if term.filterable { "yes".green() } else { "no".normal() };
                println!(
                    "{:<20} | {:<25} | {:<6} | {}",
                    id,
                    term.name,
                    filterable,
                    term.upgrades.join(", ")
                );
            }
        }
        println!();
    }

    if issues.is_empty() {
        println!("{} No problems in the upgrade relation", "✓".green());
    } else {
        println!("{}", "Upgrade problems:".red().bold());
        for issue in issues {
            println!("  {}", issue);
        }
    }
}

fn handle_config_command(cmd: &ConfigCommand, config: &Config, explicit: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let yaml = config.to_yaml()?;
            println!("{}", "Configuration:".blue().bold());
            print!("{}", yaml);
        }
        ConfigCommand::Init { path } => {
            let path = match path.as_deref().or(explicit) {
                Some(p) => p.to_path_buf(),
                None => get_config_path()?,
            };
            if Config::create_default(&path)? {
                println!("{} Wrote default config to {}", "✓".green(), path.display());
            } else {
                println!("{} Config already exists at {}", "!".yellow(), path.display());
            }
        }
        ConfigCommand::Path => match explicit {
            Some(p) => println!("{}", p.display()),
            None => println!("{}", get_config_path()?.display()),
        },
    }
    Ok(())
}
