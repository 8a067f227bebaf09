use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Browse and render a game item catalog")]
pub struct Cli {
    /// Directory or http(s) URL holding terms.json and data.json
    #[clap(long, short = 's')]
    pub source: Option<String>,

    /// Path to the config file (defaults to ~/.giftdex.yaml or $GIFTDEX_CONFIG)
    #[clap(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[clap(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub command: Command,
}

/// Filter flags shared by the listing commands
#[derive(clap::Args, Debug, Clone)]
pub struct FilterArgs {
    /// Character id to filter and sort by ("all" for every character)
    #[clap(long, short = 'C', default_value = "all")]
    pub character: String,

    /// Requirement ids to check (comma-separated)
    #[clap(long, short = 'r', value_delimiter = ',')]
    pub require: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the items visible for a selection
    List {
        #[clap(flatten)]
        filter: FilterArgs,
    },

    /// Show all fields of one item
    Show {
        /// Item name
        name: String,

        /// Character whose value, hearts and comments to show
        #[clap(long, short = 'C', default_value = "all")]
        character: String,
    },

    /// Write the catalog page as HTML
    Render {
        #[clap(flatten)]
        filter: FilterArgs,

        /// Output file (stdout when omitted)
        #[clap(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List dictionary terms
    Terms {
        /// Only report problems in the upgrade relation
        #[clap(long)]
        check: bool,
    },

    /// Manage the config file
    #[clap(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the resolved configuration
    Show,

    /// Write a default config file
    Init {
        /// Where to write it (defaults to the standard config path)
        #[clap(long)]
        path: Option<PathBuf>,
    },

    /// Print the path of the config file
    Path,
}
