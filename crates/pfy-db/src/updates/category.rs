//! Category update builder. A new title re-derives the slug.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
}

pub struct CategoryUpdateBuilder(CategoryUpdate);

impl CategoryUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(CategoryUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub const fn status(mut self, status: bool) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn build(self) -> CategoryUpdate {
        self.0
    }
}

impl Default for CategoryUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
