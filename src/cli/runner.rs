//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::{ArxivClient, ClientConfig};
use crate::config::ClientSettings;
use crate::query::Query;
use crate::types::Paper;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::io::{self, Write};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
    cancel: CancellationToken,
}

/// Arguments of the `search` command, gathered into a query
struct SearchArgs<'a> {
    terms: &'a [String],
    categories: &'a [String],
    authors: &'a [String],
    title: Option<&'a str>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl Runner {
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            cancel: CancellationToken::new(),
        }
    }

    /// Token cancelled when the run should stop early (e.g. on Ctrl-C)
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;
        let client = ArxivClient::with_config(config).context("Failed to create client")?;

        match &self.cli.command {
            Commands::Search {
                terms,
                categories,
                authors,
                title,
                from,
                to,
                sort_by,
                order,
                limit,
                page_size,
            } => {
                let args = SearchArgs {
                    terms,
                    categories,
                    authors,
                    title: title.as_deref(),
                    from: *from,
                    to: *to,
                };
                let mut builder = build_query(&args)
                    .sort((*sort_by).into(), (*order).into())
                    .limit(*limit);
                if let Some(size) = page_size {
                    builder = builder.max_results(*size);
                }
                let query = builder.build().context("Invalid search")?;
                self.search(&client, query).await
            }
            Commands::Get { ids } => self.get(&client, ids).await,
        }
    }

    fn load_config(&self) -> Result<ClientConfig> {
        match &self.cli.config {
            Some(path) => {
                let settings = ClientSettings::from_file(path)?;
                info!("Loaded settings from {}", path.display());
                Ok(settings.into())
            }
            None => Ok(ClientConfig::default()),
        }
    }

    async fn search(&self, client: &ArxivClient, query: Query) -> Result<()> {
        info!("Searching: {}", query.effective_search_query());
        let mut papers = client.iter(query, self.cancel.clone());
        let mut out = io::stdout().lock();

        while let Some(paper) = papers.poll_next().await.context("Search failed")? {
            self.emit(&mut out, &paper)?;
        }

        info!(
            "Printed {} of {} papers in {} pages",
            papers.total_consumed(),
            papers
                .total_available()
                .map_or_else(|| "?".to_string(), |n| n.to_string()),
            papers.current_page_index()
        );
        Ok(())
    }

    async fn get(&self, client: &ArxivClient, ids: &[String]) -> Result<()> {
        let mut out = io::stdout().lock();
        let mut missing = 0;

        for id in ids {
            match client.get_by_id(id, &self.cancel).await {
                Ok(paper) => self.emit(&mut out, &paper)?,
                Err(crate::Error::NotFound { id }) => {
                    warn!("Paper {id} not found");
                    missing += 1;
                }
                Err(e) => return Err(e).with_context(|| format!("Failed to fetch {id}")),
            }
        }

        if missing > 0 {
            anyhow::bail!("{missing} of {} papers not found", ids.len());
        }
        Ok(())
    }

    fn emit(&self, out: &mut impl Write, paper: &Paper) -> Result<()> {
        match self.cli.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, paper)?;
                writeln!(out)?;
            }
            OutputFormat::Pretty => write_pretty(out, paper)?,
        }
        Ok(())
    }
}

fn build_query(args: &SearchArgs<'_>) -> crate::query::QueryBuilder {
    let mut builder = Query::builder();
    for term in args.terms {
        builder = builder.term(term);
    }
    for category in args.categories {
        builder = builder.category(category);
    }
    for author in args.authors {
        builder = builder.author(author);
    }
    if let Some(title) = args.title {
        builder = builder.title(title);
    }
    if let Some(from) = args.from {
        builder = builder.date_from(from);
    }
    if let Some(to) = args.to {
        builder = builder.date_to(to);
    }
    builder
}

fn write_pretty(out: &mut impl Write, paper: &Paper) -> io::Result<()> {
    let authors = paper
        .authors
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    writeln!(out, "{}  {}", paper.id, collapse_whitespace(&paper.title))?;
    writeln!(out, "    {authors}")?;
    writeln!(
        out,
        "    {} | {}",
        paper.published_at.format("%Y-%m-%d"),
        paper.categories.join(" ")
    )?;
    if let Some(pdf) = paper.pdf_url() {
        writeln!(out, "    {pdf}")?;
    }
    writeln!(out)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::paper;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_query_from_args() {
        let terms = vec!["neural".to_string()];
        let categories = vec!["cs.LG".to_string(), "stat.ML".to_string()];
        let args = SearchArgs {
            terms: &terms,
            categories: &categories,
            authors: &[],
            title: Some("transformer"),
            from: None,
            to: None,
        };
        let query = build_query(&args).build().unwrap();
        assert_eq!(
            query.search_query,
            "(neural) AND (cat:cs.LG OR cat:stat.ML) AND ti:transformer"
        );
    }

    #[test]
    fn test_write_pretty() {
        let mut p = paper("2301.00001");
        p.title = "A  multi-line\n   title".to_string();
        let mut buf = Vec::new();
        write_pretty(&mut buf, &p).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("2301.00001  A multi-line title\n"));
        assert!(text.contains("2023-01-01"));
    }
}
