//! Search query description and a fluent builder
//!
//! A [`Query`] names *what* to search for. Page size and total-item limit may
//! be overridden per query; otherwise the client configuration applies.

use crate::error::{Error, Result};
use crate::types::{SortBy, SortOrder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y%m%d";

/// Parameters of one search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Search expression (e.g. "au:Einstein AND cat:physics.hist-ph")
    #[serde(default)]
    pub search_query: String,
    /// Explicit arXiv identifiers, used instead of the search expression
    #[serde(default)]
    pub id_list: Vec<String>,
    /// Offset for direct (non-iterator) searches
    #[serde(default)]
    pub start: usize,
    /// Results per request, overrides the client page size
    #[serde(default)]
    pub max_results: Option<usize>,
    /// Cap on items yielded by an iterator, overrides the client limit
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default)]
    pub submitted_from: Option<NaiveDate>,
    #[serde(default)]
    pub submitted_to: Option<NaiveDate>,
}

impl Query {
    /// Query for a free-form search expression
    pub fn search(expression: impl Into<String>) -> Self {
        Self {
            search_query: expression.into(),
            ..Self::default()
        }
    }

    /// Query for a list of identifiers
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id_list: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Start building a query
    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    /// Set results per request
    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Set the iterator item limit
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check that the query can be sent
    pub fn validate(&self) -> Result<()> {
        let has_dates = self.submitted_from.is_some() || self.submitted_to.is_some();
        if self.id_list.is_empty() && self.search_query.trim().is_empty() && !has_dates {
            return Err(Error::invalid(
                "either a search query or an id list must be provided",
            ));
        }
        if self.max_results == Some(0) {
            return Err(Error::invalid("max results must be positive"));
        }
        Ok(())
    }

    /// Search expression with the submitted-date filter folded in
    pub fn effective_search_query(&self) -> String {
        let Some(filter) = self.date_filter() else {
            return self.search_query.clone();
        };
        if self.search_query.trim().is_empty() {
            filter
        } else {
            format!("({}) AND {filter}", self.search_query)
        }
    }

    fn date_filter(&self) -> Option<String> {
        let fmt = |d: &NaiveDate| d.format(DATE_FORMAT).to_string();
        match (&self.submitted_from, &self.submitted_to) {
            (Some(from), Some(to)) => Some(format!("submittedDate:[{} TO {}]", fmt(from), fmt(to))),
            (Some(from), None) => Some(format!("submittedDate:[{} TO *]", fmt(from))),
            (None, Some(to)) => Some(format!("submittedDate:[* TO {}]", fmt(to))),
            (None, None) => None,
        }
    }
}

/// Fluent builder for [`Query`]
///
/// Each field group is OR-ed internally and the groups are AND-ed together.
/// General terms are joined in order, so [`and`](Self::and),
/// [`or`](Self::or) and [`and_not`](Self::and_not) placed between them
/// decide how they combine.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    terms: Vec<String>,
    categories: Vec<String>,
    authors: Vec<String>,
    titles: Vec<String>,
    abstracts: Vec<String>,
    ids: Vec<String>,
    query: Query,
}

impl QueryBuilder {
    /// Add a general search term
    #[must_use]
    pub fn term(mut self, term: impl Into<String>) -> Self {
        push_non_empty(&mut self.terms, term.into());
        self
    }

    /// Join the surrounding terms with `AND`
    #[must_use]
    pub fn and(mut self) -> Self {
        self.terms.push("AND".to_string());
        self
    }

    /// Join the surrounding terms with `OR`
    #[must_use]
    pub fn or(mut self) -> Self {
        self.terms.push("OR".to_string());
        self
    }

    /// Exclude the following term
    #[must_use]
    pub fn and_not(mut self) -> Self {
        self.terms.push("ANDNOT".to_string());
        self
    }

    /// Add a category filter (e.g. "cs.AI")
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        push_non_empty(&mut self.categories, category.into());
        self
    }

    /// Add an author filter
    #[must_use]
    pub fn author(mut self, author: impl Into<String>) -> Self {
        push_non_empty(&mut self.authors, author.into());
        self
    }

    /// Add a title filter
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        push_non_empty(&mut self.titles, title.into());
        self
    }

    /// Add an abstract filter
    #[must_use]
    pub fn abstract_text(mut self, text: impl Into<String>) -> Self {
        push_non_empty(&mut self.abstracts, text.into());
        self
    }

    /// Add an identifier (switches the query to id-list mode)
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        push_non_empty(&mut self.ids, id.into());
        self
    }

    /// Restrict to papers submitted in `[from, to]`
    #[must_use]
    pub fn date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.query.submitted_from = Some(from);
        self.query.submitted_to = Some(to);
        self
    }

    /// Restrict to papers submitted on or after `from`
    #[must_use]
    pub fn date_from(mut self, from: NaiveDate) -> Self {
        self.query.submitted_from = Some(from);
        self
    }

    /// Restrict to papers submitted on or before `to`
    #[must_use]
    pub fn date_to(mut self, to: NaiveDate) -> Self {
        self.query.submitted_to = Some(to);
        self
    }

    #[must_use]
    pub fn sort(mut self, by: SortBy, order: SortOrder) -> Self {
        self.query.sort_by = by;
        self.query.sort_order = order;
        self
    }

    #[must_use]
    pub fn max_results(mut self, max_results: usize) -> Self {
        self.query.max_results = Some(max_results);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn start(mut self, start: usize) -> Self {
        self.query.start = start;
        self
    }

    /// Build and validate the query
    pub fn build(self) -> Result<Query> {
        let mut query = self.query;
        if self.ids.is_empty() {
            let mut parts = Vec::new();
            if !self.terms.is_empty() {
                parts.push(format!("({})", self.terms.join(" ")));
            }
            push_group(&mut parts, "cat", &self.categories);
            push_group(&mut parts, "au", &self.authors);
            push_group(&mut parts, "ti", &self.titles);
            push_group(&mut parts, "abs", &self.abstracts);
            query.search_query = parts.join(" AND ");
        } else {
            query.id_list = self.ids;
        }
        query.validate()?;
        Ok(query)
    }
}

fn push_non_empty(list: &mut Vec<String>, value: String) {
    if !value.trim().is_empty() {
        list.push(value);
    }
}

fn push_group(parts: &mut Vec<String>, prefix: &str, values: &[String]) {
    match values {
        [] => {}
        [single] => parts.push(format!("{prefix}:{single}")),
        many => {
            let joined = many
                .iter()
                .map(|v| format!("{prefix}:{v}"))
                .collect::<Vec<_>>()
                .join(" OR ");
            parts.push(format!("({joined})"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_builder_combines_groups() {
        let query = Query::builder()
            .term("quantum computing")
            .category("cs.AI")
            .category("cs.LG")
            .author("Hinton")
            .build()
            .unwrap();

        assert_eq!(
            query.search_query,
            "(quantum computing) AND (cat:cs.AI OR cat:cs.LG) AND au:Hinton"
        );
        assert!(query.id_list.is_empty());
    }

    #[test]
    fn test_builder_term_operators() {
        let query = Query::builder()
            .term("ti:transformer")
            .or()
            .term("ti:attention")
            .and_not()
            .term("abs:survey")
            .category("cs.CL")
            .build()
            .unwrap();
        assert_eq!(
            query.search_query,
            "(ti:transformer OR ti:attention ANDNOT abs:survey) AND cat:cs.CL"
        );

        let query = Query::builder()
            .term("electron")
            .and()
            .term("proton")
            .build()
            .unwrap();
        assert_eq!(query.search_query, "(electron AND proton)");
    }

    #[test]
    fn test_builder_id_list_wins() {
        let query = Query::builder()
            .term("ignored")
            .id("2101.00001")
            .id("2101.00002v2")
            .build()
            .unwrap();
        assert_eq!(query.id_list, vec!["2101.00001", "2101.00002v2"]);
        assert!(query.search_query.is_empty());
    }

    #[test]
    fn test_builder_requires_something() {
        let err = Query::builder().term("  ").build().unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_builder_rejects_zero_page_size() {
        let err = Query::builder().term("x").max_results(0).build().unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_date_filter_variants() {
        let both = Query {
            submitted_from: Some(date(2023, 1, 1)),
            submitted_to: Some(date(2023, 12, 31)),
            ..Query::search("graphs")
        };
        assert_eq!(
            both.effective_search_query(),
            "(graphs) AND submittedDate:[20230101 TO 20231231]"
        );

        let from_only = Query {
            submitted_from: Some(date(2024, 2, 3)),
            ..Query::default()
        };
        assert_eq!(
            from_only.effective_search_query(),
            "submittedDate:[20240203 TO *]"
        );
        assert!(from_only.validate().is_ok());

        let to_only = Query {
            submitted_to: Some(date(2020, 5, 6)),
            ..Query::search("x")
        };
        assert_eq!(
            to_only.effective_search_query(),
            "(x) AND submittedDate:[* TO 20200506]"
        );
    }

    #[test]
    fn test_no_dates_keeps_expression() {
        let query = Query::search("au:Einstein");
        assert_eq!(query.effective_search_query(), "au:Einstein");
    }
}
