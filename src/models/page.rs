use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One page of a collection plus the server's total-count metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// List responses come in two shapes: a paginated envelope or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListBody<T> {
    #[serde(rename_all = "camelCase")]
    Paged {
        content: Vec<T>,
        total_elements: u64,
    },
    Bare(Vec<T>),
}

impl<T> From<ListBody<T>> for Page<T> {
    fn from(body: ListBody<T>) -> Self {
        match body {
            ListBody::Paged {
                content,
                total_elements,
            } => Page::new(content, total_elements),
            ListBody::Bare(items) => {
                let total = items.len() as u64;
                Page::new(items, total)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Sort order on one field, sent remotely as `sort=field,asc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    pub fn to_param(&self) -> String {
        format!("{},{}", self.field, self.direction.as_str())
    }

    /// Parses `field` or `field,asc|desc`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.splitn(2, ',');
        let field = parts.next()?.trim();
        if field.is_empty() {
            return None;
        }
        let direction = match parts.next() {
            Some(d) => SortDirection::from_str(d.trim())?,
            None => SortDirection::Asc,
        };
        Some(Self {
            field: field.to_string(),
            direction,
        })
    }
}

/// A read request against a remote collection.
///
/// `filters` are exact-match equality constraints, sent as query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<Sort>,
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn paged(page: u32, size: u32) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// Query-string pairs in a stable order.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(size) = self.size {
            params.push(("size".to_string(), size.to_string()));
        }
        if let Some(ref sort) = self.sort {
            params.push(("sort".to_string(), sort.to_param()));
        }
        for (field, value) in &self.filters {
            params.push((field.clone(), value.clone()));
        }
        params
    }
}
