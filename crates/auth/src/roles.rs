use serde::{Deserialize, Serialize};

use storeadmin_core::error::require_non_blank;
use storeadmin_core::{DomainResult, Entity, RoleId};

/// Role used for RBAC, identified externally by its `slug`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

impl Entity for Role {
    type Id = RoleId;
    const NAME: &'static str = "role";

    fn id(&self) -> RoleId {
        self.id
    }
}

/// Payload for creating a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRole {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

impl NewRole {
    pub fn new(name: &str, slug: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
            description: Some(description.to_string()),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        require_non_blank("name", &self.name)?;
        require_non_blank("slug", &self.slug)?;
        if !self
            .slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(storeadmin_core::DomainError::validation(format!(
                "slug '{}' may only contain lowercase letters, digits, '-' and '_'",
                self.slug
            )));
        }
        Ok(())
    }

    pub fn into_role(self, id: RoleId) -> DomainResult<Role> {
        self.validate()?;
        Ok(Role {
            id,
            name: self.name,
            slug: self.slug,
            description: self.description,
        })
    }
}

/// Roles every fresh installation starts with.
pub fn default_roles() -> Vec<NewRole> {
    vec![
        NewRole::new("Admin", "admin", "System Administrator"),
        NewRole::new("Manager", "manager", "System Manager"),
        NewRole::new("Client", "client", "System client"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_roles_are_valid_and_unique() {
        let roles = default_roles();
        assert_eq!(roles.len(), 3);
        for role in &roles {
            role.validate().unwrap();
        }
        let slugs: Vec<_> = roles.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, ["admin", "manager", "client"]);
    }

    #[test]
    fn uppercase_slug_is_rejected() {
        assert!(NewRole::new("Admin", "Admin", "x").validate().is_err());
    }

    proptest! {
        #[test]
        fn lowercase_slugs_are_accepted(slug in "[a-z0-9_-]{1,24}") {
            prop_assert!(NewRole::new("Role", &slug, "d").validate().is_ok());
        }

        #[test]
        fn slugs_with_spaces_are_rejected(head in "[a-z]{1,8}", tail in "[a-z]{1,8}") {
            let slug = format!("{head} {tail}");
            prop_assert!(NewRole::new("Role", &slug, "d").validate().is_err());
        }
    }
}
