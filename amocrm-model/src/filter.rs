//! List queries.

use std::fmt;

/// Largest page size the API accepts.
pub const MAX_LIMIT: u32 = 250;

/// A `filter[...]` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `filter[name]=value`
    Single { name: String, value: String },
    /// `filter[name][]=value`
    SingleList { name: String, value: String },
    /// `filter[name][0]=a&filter[name][1]=b`
    Multi { name: String, values: Vec<String> },
    /// `filter[name][from]=a&filter[name][to]=b`
    Range { name: String, from: String, to: String },
}

impl Filter {
    pub fn single(name: impl Into<String>, value: impl ToString) -> Self {
        Self::Single {
            name: name.into(),
            value: value.to_string(),
        }
    }

    pub fn single_list(name: impl Into<String>, value: impl ToString) -> Self {
        Self::SingleList {
            name: name.into(),
            value: value.to_string(),
        }
    }

    pub fn multi<T: ToString>(name: impl Into<String>, values: impl IntoIterator<Item = T>) -> Self {
        Self::Multi {
            name: name.into(),
            values: values.into_iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn range(name: impl Into<String>, from: impl ToString, to: impl ToString) -> Self {
        Self::Range {
            name: name.into(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Single { name, .. }
            | Self::SingleList { name, .. }
            | Self::Multi { name, .. }
            | Self::Range { name, .. } => name,
        }
    }

    /// Query parameters for this filter.
    pub fn as_params(&self) -> Vec<(String, String)> {
        match self {
            Self::Single { name, value } => vec![(format!("filter[{name}]"), value.clone())],
            Self::SingleList { name, value } => vec![(format!("filter[{name}][]"), value.clone())],
            Self::Multi { name, values } => values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("filter[{name}][{i}]"), v.clone()))
                .collect(),
            Self::Range { name, from, to } => vec![
                (format!("filter[{name}][from]"), from.clone()),
                (format!("filter[{name}][to]"), to.clone()),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// One page request against a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub query: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Option<(String, SortDirection)>,
    /// Related collections requested via `with=`.
    pub include: Vec<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: MAX_LIMIT,
            query: None,
            filters: Vec::new(),
            order: None,
            include: Vec::new(),
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free-text search.
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.query = Some(text.into());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Only one sort key is supported by the API.
    pub fn order(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order = Some((field.into(), direction));
        self
    }

    /// Page size, clamped to `1..=MAX_LIMIT`.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, MAX_LIMIT);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn include(mut self, include: impl IntoIterator<Item = String>) -> Self {
        for name in include {
            if !self.include.contains(&name) {
                self.include.push(name);
            }
        }
        self
    }

    /// All query parameters in a stable order.
    pub fn as_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.min(MAX_LIMIT).to_string()),
        ];
        if let Some(query) = &self.query {
            params.push(("query".to_string(), query.clone()));
        }
        if let Some((field, direction)) = &self.order {
            params.push((format!("order[{field}]"), direction.to_string()));
        }
        for filter in &self.filters {
            params.extend(filter.as_params());
        }
        if !self.include.is_empty() {
            params.push(("with".to_string(), self.include.join(",")));
        }
        params
    }
}
