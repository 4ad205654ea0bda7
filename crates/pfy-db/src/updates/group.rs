//! Group update builder.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Option<String>>,
    /// Replaces the whole member list, order preserved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
}

pub struct GroupUpdateBuilder(GroupUpdate);

impl GroupUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(GroupUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn image(mut self, image: Option<String>) -> Self {
        self.0.image = Some(image);
        self
    }

    #[must_use]
    pub fn members(mut self, members: Vec<String>) -> Self {
        self.0.members = Some(members);
        self
    }

    #[must_use]
    pub const fn status(mut self, status: bool) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn build(self) -> GroupUpdate {
        self.0
    }
}

impl Default for GroupUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
