// Model catalog entries and the models listing query
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

pub const PAGE_SIZES: [usize; 5] = [10, 20, 30, 50, 100];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    #[serde(rename = "model_uid")]
    pub model_id: String,
    pub name: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub primary_use_case: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("page size {0} is not supported")]
    InvalidPageSize(usize),
    #[error("pages are numbered from 1")]
    InvalidPage,
    #[error("unknown sort column {0:?}")]
    UnknownColumn(String),
    #[error("unknown sort direction {0:?}")]
    UnknownDirection(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Id,
    Image,
    Name,
    Version,
    Provider,
    Link,
    Description,
}

impl SortColumn {
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        match raw {
            "id" => Ok(SortColumn::Id),
            "image" => Ok(SortColumn::Image),
            "name" => Ok(SortColumn::Name),
            "version" => Ok(SortColumn::Version),
            "provider" => Ok(SortColumn::Provider),
            "link" => Ok(SortColumn::Link),
            "description" => Ok(SortColumn::Description),
            other => Err(CatalogError::UnknownColumn(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        match raw {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(CatalogError::UnknownDirection(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelQuery {
    pub search: String,
    pub sort_by: SortColumn,
    pub direction: SortDirection,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ModelQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort_by: SortColumn::default(),
            direction: SortDirection::default(),
            page: 1,
            page_size: PAGE_SIZES[0],
        }
    }
}

/// A catalog entry as listed, numbered by its catalog position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelRow {
    pub row_id: usize,
    #[serde(flatten)]
    pub model: ModelDescriptor,
}

impl ModelRow {
    fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let m = &self.model;
        self.row_id.to_string().contains(needle)
            || [&m.image, &m.name, &m.link, &m.version, &m.provider]
                .iter()
                .any(|field| field.to_lowercase().contains(needle))
    }

    fn compare(&self, other: &Self, column: SortColumn) -> Ordering {
        let (a, b) = (&self.model, &other.model);
        match column {
            SortColumn::Id => self.row_id.cmp(&other.row_id),
            SortColumn::Image => a.image.cmp(&b.image),
            SortColumn::Name => a.name.cmp(&b.name),
            SortColumn::Version => a.version.cmp(&b.version),
            SortColumn::Provider => a.provider.cmp(&b.provider),
            SortColumn::Link => a.link.cmp(&b.link),
            SortColumn::Description => a.description.cmp(&b.description),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelPage {
    pub rows: Vec<ModelRow>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Search, sort and paginate the catalog.
pub fn query_models(catalog: &[ModelDescriptor], query: &ModelQuery) -> Result<ModelPage, CatalogError> {
    if !PAGE_SIZES.contains(&query.page_size) {
        return Err(CatalogError::InvalidPageSize(query.page_size));
    }
    if query.page == 0 {
        return Err(CatalogError::InvalidPage);
    }

    let needle = query.search.trim().to_lowercase();
    let mut rows: Vec<ModelRow> = catalog
        .iter()
        .enumerate()
        .map(|(i, model)| ModelRow {
            row_id: i + 1,
            model: model.clone(),
        })
        .filter(|row| row.matches(&needle))
        .collect();

    rows.sort_by(|a, b| {
        let ord = a.compare(b, query.sort_by);
        match query.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });

    let total = rows.len();
    let rows = rows
        .into_iter()
        .skip((query.page - 1) * query.page_size)
        .take(query.page_size)
        .collect();

    Ok(ModelPage {
        rows,
        total,
        page: query.page,
        page_size: query.page_size,
    })
}
