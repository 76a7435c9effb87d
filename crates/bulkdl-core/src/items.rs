//! Work item generation.
//!
//! An `ItemPlan` describes a finite run: `count` URLs under a base URL, each
//! saved under a name derived from its position. Items are produced lazily and
//! the plan holds no iteration state, so every call to `items()` yields the
//! same sequence.

use thiserror::Error;
use url::Url;

/// Placeholder substituted with the item index in a name pattern.
pub const INDEX_PLACEHOLDER: &str = "{index}";

/// Invalid plan parameters.
#[derive(Debug, Error)]
pub enum ItemPlanError {
    #[error("invalid base URL {url:?}: {reason}")]
    BaseUrl { url: String, reason: String },
    #[error("name pattern {0:?} must contain {{index}} exactly once")]
    Placeholder(String),
    #[error("name pattern {0:?} does not render to a plain file name")]
    NotAFileName(String),
}

/// One unit of work: where to fetch from and which artifact to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    index: usize,
    url: String,
    name: String,
}

impl WorkItem {
    /// 0-based position in the plan.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Artifact name the body is persisted under.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Validated description of which items a run covers.
#[derive(Debug, Clone)]
pub struct ItemPlan {
    base_url: String,
    count: usize,
    name_pattern: String,
}

impl ItemPlan {
    /// Validate and build a plan. The base URL must be absolute http(s); the
    /// pattern must contain `{index}` once and render to a single path component.
    pub fn new(base_url: &str, count: usize, name_pattern: &str) -> Result<Self, ItemPlanError> {
        let parsed = Url::parse(base_url).map_err(|e| ItemPlanError::BaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ItemPlanError::BaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        if name_pattern.matches(INDEX_PLACEHOLDER).count() != 1 {
            return Err(ItemPlanError::Placeholder(name_pattern.to_string()));
        }
        if !is_plain_file_name(&render_name(name_pattern, 0)) {
            return Err(ItemPlanError::NotAFileName(name_pattern.to_string()));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            count,
            name_pattern: name_pattern.to_string(),
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the item at `index` (no bounds check against `count`).
    pub fn item(&self, index: usize) -> WorkItem {
        WorkItem {
            index,
            url: format!("{}/{}", self.base_url, index),
            name: render_name(&self.name_pattern, index),
        }
    }

    /// Lazy sequence of all items, in index order.
    pub fn items(&self) -> impl Iterator<Item = WorkItem> + '_ {
        (0..self.count).map(move |i| self.item(i))
    }

    /// Items grouped into consecutive chunks of `size` (the last may be shorter).
    /// A `size` of 0 is treated as 1.
    pub fn chunks(&self, size: usize) -> impl Iterator<Item = Vec<WorkItem>> + '_ {
        let size = size.max(1);
        (0..self.count).step_by(size).map(move |start| {
            let end = (start + size).min(self.count);
            (start..end).map(|i| self.item(i)).collect()
        })
    }

    /// Number of chunks `chunks(size)` yields: `ceil(count / size)`.
    pub fn chunk_count(&self, size: usize) -> usize {
        self.count.div_ceil(size.max(1))
    }
}

fn render_name(pattern: &str, index: usize) -> String {
    pattern.replace(INDEX_PLACEHOLDER, &index.to_string())
}

/// True if `name` is a single, non-special path component.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.chars().any(|c| c == '/' || c == '\\' || c == '\0' || c.is_control())
}
