//! CLI commands and argument parsing

use crate::types::{SortBy, SortOrder};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Page through arXiv search results from the command line
#[derive(Parser, Debug)]
#[command(name = "arxiv-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search and stream matching papers
    Search {
        /// Free-form search terms
        terms: Vec<String>,

        /// Restrict to a category (repeatable, OR-ed)
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Restrict to an author (repeatable, OR-ed)
        #[arg(long = "author")]
        authors: Vec<String>,

        /// Words that must appear in the title
        #[arg(long)]
        title: Option<String>,

        /// Submitted on or after (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Submitted on or before (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Sort field
        #[arg(long, default_value = "relevance")]
        sort_by: SortField,

        /// Sort direction
        #[arg(long, default_value = "desc")]
        order: Direction,

        /// Maximum papers to print (0 = no limit)
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Papers per request (overrides the settings file)
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Fetch papers by arXiv identifier
    Get {
        /// Identifiers such as 2301.00001 or hep-th/9901001
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one paper per line)
    Json,
    /// Human-readable output
    Pretty,
}

/// Sort field
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortField {
    Relevance,
    Updated,
    Submitted,
}

impl From<SortField> for SortBy {
    fn from(field: SortField) -> Self {
        match field {
            SortField::Relevance => Self::Relevance,
            SortField::Updated => Self::LastUpdatedDate,
            SortField::Submitted => Self::SubmittedDate,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Direction {
    Asc,
    Desc,
}

impl From<Direction> for SortOrder {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Asc => Self::Ascending,
            Direction::Desc => Self::Descending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from([
            "arxiv-pager",
            "--format",
            "pretty",
            "search",
            "quantum",
            "error",
            "--category",
            "quant-ph",
            "--category",
            "cs.ET",
            "--from",
            "2023-01-01",
            "--sort-by",
            "submitted",
            "--order",
            "asc",
            "-l",
            "25",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Pretty);
        let Commands::Search {
            terms,
            categories,
            from,
            sort_by,
            order,
            limit,
            ..
        } = cli.command
        else {
            panic!("expected search command");
        };
        assert_eq!(terms, vec!["quantum", "error"]);
        assert_eq!(categories, vec!["quant-ph", "cs.ET"]);
        assert_eq!(from, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(SortBy::from(sort_by), SortBy::SubmittedDate);
        assert_eq!(SortOrder::from(order), SortOrder::Ascending);
        assert_eq!(limit, 25);
    }

    #[test]
    fn test_get_requires_ids() {
        assert!(Cli::try_parse_from(["arxiv-pager", "get"]).is_err());

        let cli = Cli::try_parse_from(["arxiv-pager", "get", "2301.00001", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Get { ids } if ids == ["2301.00001"]));
    }
}
