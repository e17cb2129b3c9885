use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storeadmin_core::error::require_non_blank;
use storeadmin_core::patch::set_if_some;
use storeadmin_core::{CategoryId, DomainResult, Entity, Filter, ImageId, Patch};

/// A product category shown in the storefront navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    pub description: Option<String>,
    pub image_id: Option<ImageId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Category {
    type Id = CategoryId;
    const NAME: &'static str = "category";

    fn id(&self) -> CategoryId {
        self.id
    }
}

/// Payload for creating a category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewCategory {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_id: Option<ImageId>,
}

impl NewCategory {
    pub fn validate(&self) -> DomainResult<()> {
        require_non_blank("title", &self.title)
    }

    /// Validate and build the record to persist.
    pub fn into_category(self, id: CategoryId, now: DateTime<Utc>) -> DomainResult<Category> {
        self.validate()?;
        Ok(Category {
            id,
            title: self.title.trim().to_string(),
            description: self.description,
            image_id: self.image_id,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Fields of a category an admin may change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_id: Option<ImageId>,
}

impl CategoryPatch {
    pub fn validate(&self) -> DomainResult<()> {
        match &self.title {
            Some(title) => require_non_blank("title", title),
            None => Ok(()),
        }
    }
}

impl Patch<Category> for CategoryPatch {
    fn apply_to(self, target: &mut Category) {
        set_if_some(&mut target.title, self.title.map(|t| t.trim().to_string()));
        if self.description.is_some() {
            target.description = self.description;
        }
        if self.image_id.is_some() {
            target.image_id = self.image_id;
        }
    }

    fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.image_id.is_none()
    }
}

/// List filter: case-insensitive substring match on `title`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CategoryFilter {
    pub title: Option<String>,
}

impl Filter<Category> for CategoryFilter {
    fn matches(&self, category: &Category) -> bool {
        match self.title.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                category.title.to_lowercase().contains(&needle.to_lowercase())
            }
            _ => true,
        }
    }
}
