//! List/query layer - filtering, ordering and page-based pagination.

use std::str::FromStr;

use uuid::Uuid;

use crate::error::DomainError;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a page request from optional query parameters.
    pub fn new(page: Option<u64>, page_size: Option<u64>) -> Result<Self, DomainError> {
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err(DomainError::Validation(
                "page must be a positive integer".to_string(),
            ));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(DomainError::Validation(format!(
                "page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        Ok(Self { page, page_size })
    }

    /// Rows to skip. Saturates for page numbers far past any real result set.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// One page of results plus the total count across all pages.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
        }
    }

    pub fn num_pages(&self) -> u64 {
        if self.total == 0 {
            1
        } else {
            self.total.div_ceil(self.page_size)
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.num_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }

    /// Reject pages past the end; page 1 is always valid, even when empty.
    pub(crate) fn ensure_in_range(self) -> Result<Self, DomainError> {
        if self.page > self.num_pages() {
            return Err(DomainError::not_found("Page"));
        }
        Ok(self)
    }
}

/// Columns that posts and comments can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    CreatedAt,
    UpdatedAt,
}

/// Requested ordering, parsed from `created_at` / `-updated_at` style parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub field: SortField,
    pub descending: bool,
}

impl Ordering {
    pub const NEWEST_FIRST: Ordering = Ordering {
        field: SortField::CreatedAt,
        descending: true,
    };

    pub const OLDEST_FIRST: Ordering = Ordering {
        field: SortField::CreatedAt,
        descending: false,
    };

    /// Parse an `ordering` parameter, falling back to `default` for absent or unknown fields.
    pub fn parse_or(raw: Option<&str>, default: Ordering) -> Ordering {
        match raw.map(str::parse::<Ordering>) {
            Some(Ok(ordering)) => ordering,
            Some(Err(field)) => {
                tracing::debug!(ordering = %field, "Ignoring unknown ordering field");
                default
            }
            None => default,
        }
    }
}

impl FromStr for Ordering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (descending, name) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let field = match name {
            "id" => SortField::Id,
            "created_at" => SortField::CreatedAt,
            "updated_at" => SortField::UpdatedAt,
            _ => return Err(s.to_string()),
        };

        Ok(Self { field, descending })
    }
}

/// Query over a single user's posts.
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub owner_id: Uuid,
    pub is_published: Option<bool>,
    /// Exact title match.
    pub title: Option<String>,
    pub ordering: Ordering,
    pub page: PageRequest,
}

impl PostQuery {
    pub fn for_owner(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            is_published: None,
            title: None,
            ordering: Ordering::NEWEST_FIRST,
            page: PageRequest::default(),
        }
    }
}

/// Query over the comments of a single post.
#[derive(Debug, Clone)]
pub struct CommentQuery {
    pub post_id: Uuid,
    pub user_id: Option<Uuid>,
    pub ordering: Ordering,
    pub page: PageRequest,
}

impl CommentQuery {
    pub fn for_post(post_id: Uuid) -> Self {
        Self {
            post_id,
            user_id: None,
            ordering: Ordering::OLDEST_FIRST,
            page: PageRequest::default(),
        }
    }
}
