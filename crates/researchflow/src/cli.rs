use clap::{Args, Parser, Subcommand};
use researchflow_core::SortOrder;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "researchflow")]
#[command(version)]
#[command(about = "Search, read and format research articles from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session token
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },

    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// Password confirmation
        #[arg(long)]
        confirm: String,
    },

    /// Sign out and forget saved articles and conversations
    Logout,

    /// Ask for articles in natural language
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Load the next page of the last search
    More,

    /// Change search filters and re-run the last search
    Filter(FilterArgs),

    /// Start a new search conversation
    New,

    /// Show the search conversation
    History {
        /// Print the raw transcript as JSON
        #[arg(long)]
        json: bool,
    },

    /// Chat with a single document
    Doc {
        #[command(subcommand)]
        action: DocAction,
    },

    /// Manage saved articles
    Saved {
        #[command(subcommand)]
        action: Option<SavedAction>,
    },

    /// Format a document in a citation style
    Format {
        #[arg(short, long)]
        file: PathBuf,
        /// ABNT, APA, IEEE, SBC, ICML, NeurIPS, AAAI, Springer Nature or Elsevier
        #[arg(short, long)]
        style: String,
        /// Where to write the formatted files
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print version information
    Version,
}

#[derive(Args, Debug, Default, PartialEq)]
pub struct FilterArgs {
    #[arg(long)]
    pub sort: Option<SortOrder>,
    #[arg(long = "from")]
    pub year_from: Option<i32>,
    #[arg(long = "to")]
    pub year_to: Option<i32>,
    #[arg(long)]
    pub open_access: Option<bool>,
}

#[derive(Subcommand)]
pub enum DocAction {
    /// Load a document by URL, local PDF or saved article
    Open {
        #[arg(long, conflicts_with_all = ["file", "saved"])]
        url: Option<String>,
        #[arg(long, conflicts_with = "saved")]
        file: Option<PathBuf>,
        /// URL of a saved article
        #[arg(long)]
        saved: Option<String>,
    },
    /// Ask a question about the open document
    Ask {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Close the document and its conversation
    Switch,
    /// Show the open document and conversation
    Show,
}

#[derive(Subcommand)]
pub enum SavedAction {
    /// List saved articles
    List,
    /// Save the n-th article of the latest results (1-based)
    Add { n: usize },
    /// Remove a saved article by URL
    Remove { url: String },
}
