//! OData system query options for the `People` collection.
//!
//! Only `LastName` can be filtered and sorted. The pipeline runs
//! filter, count, sort and paginate in that order, each step producing a new vector.

use crate::odata::fixtures::Person;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

/// The single field the mock service can filter and sort on.
pub const SUPPORTED_FIELD: &str = "LastName";

static FILTER_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((.*),'(.*)'\)").expect("valid filter pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Filters on field {0} are not supported.")]
    UnsupportedFilterField(String),
    #[error("Sorting on field {0} is not supported.")]
    UnsupportedSortField(String),
}

/// Parse the query part of a URL into a map with URL decoding.
///
/// Accepts either a full URL or a bare query string.
pub fn parse_query_string(url: &str) -> HashMap<String, String> {
    let query = url.split_once('?').map_or(url, |(_, q)| q);

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// `$filter=<fn>(LastName,'<value>')`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub needle: String,
}

impl Filter {
    /// Parse a `$filter` value. Expressions not shaped like a function call are ignored.
    pub fn parse(expression: &str) -> Result<Option<Self>, QueryError> {
        let Some(caps) = FILTER_CALL.captures(expression) else {
            return Ok(None);
        };
        let field = &caps[1];
        if field != SUPPORTED_FIELD {
            return Err(QueryError::UnsupportedFilterField(field.to_string()));
        }
        Ok(Some(Self {
            needle: caps[2].to_string(),
        }))
    }

    pub fn apply(&self, people: &[Person]) -> Vec<Person> {
        people
            .iter()
            .filter(|person| last_name(person).contains(self.needle.as_str()))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// `$orderby=LastName[ asc|desc]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn parse(expression: &str) -> Result<Self, QueryError> {
        let mut tokens = expression.split_whitespace();
        let field = tokens.next().unwrap_or("");
        if field != SUPPORTED_FIELD {
            return Err(QueryError::UnsupportedSortField(field.to_string()));
        }
        let direction = match tokens.next() {
            Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        Ok(Self { direction })
    }

    /// Stable sort on upper-cased last names.
    pub fn apply(&self, people: &[Person]) -> Vec<Person> {
        let mut sorted = people.to_vec();
        sorted.sort_by(|a, b| {
            let ord = last_name(a)
                .to_uppercase()
                .cmp(&last_name(b).to_uppercase());
            match self.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
        sorted
    }
}

/// `$skip=<n>&$top=<m>`; both must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: usize,
    pub top: usize,
}

impl Page {
    pub fn apply(&self, people: &[Person]) -> Vec<Person> {
        people
            .iter()
            .skip(self.skip)
            .take(self.top)
            .cloned()
            .collect()
    }
}

/// All query options recognized on a collection request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectionQuery {
    pub filter: Option<Filter>,
    pub order_by: Option<OrderBy>,
    pub page: Option<Page>,
    /// `$count=true` asks for an inline `@odata.count`
    pub inline_count: bool,
}

/// Result of running a [`CollectionQuery`].
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Number of records after filtering, before pagination
    pub count: usize,
    pub items: Vec<Person>,
}

impl CollectionQuery {
    pub fn from_url(url: &str) -> Result<Self, QueryError> {
        let params = parse_query_string(url);

        let filter = match params.get("$filter") {
            Some(expr) => Filter::parse(expr)?,
            None => None,
        };
        let order_by = params
            .get("$orderby")
            .map(|expr| OrderBy::parse(expr))
            .transpose()?;
        let page = match (
            params.get("$skip").and_then(|s| s.parse().ok()),
            params.get("$top").and_then(|t| t.parse().ok()),
        ) {
            (Some(skip), Some(top)) => Some(Page { skip, top }),
            _ => None,
        };
        let inline_count = params.get("$count").is_some_and(|c| c == "true");

        Ok(Self {
            filter,
            order_by,
            page,
            inline_count,
        })
    }

    pub fn run(&self, people: &[Person]) -> QueryResult {
        let filtered = match &self.filter {
            Some(filter) => filter.apply(people),
            None => people.to_vec(),
        };
        let count = filtered.len();
        let sorted = match &self.order_by {
            Some(order_by) => order_by.apply(&filtered),
            None => filtered,
        };
        let items = match &self.page {
            Some(page) => page.apply(&sorted),
            None => sorted,
        };
        QueryResult { count, items }
    }
}

fn last_name(person: &Person) -> &str {
    person
        .get(SUPPORTED_FIELD)
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

/// Case-insensitive ordering used by the sort step, exposed for callers comparing results.
pub fn compare_last_names(a: &Person, b: &Person) -> Ordering {
    last_name(a).to_uppercase().cmp(&last_name(b).to_uppercase())
}
