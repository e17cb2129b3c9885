//! User accounts managed from the admin panel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use storeadmin_core::error::require_non_blank;
use storeadmin_core::patch::set_if_some;
use storeadmin_core::{DomainError, DomainResult, Entity, Filter, ImageId, Patch, UserId};

use crate::password::{PasswordError, hash_password};

pub const MIN_PASSWORD_LEN: usize = 6;

/// A registered user.
///
/// The password hash is loaded from storage but never serialized into responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub image_id: Option<ImageId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for User {
    type Id = UserId;
    const NAME: &'static str = "user";

    fn id(&self) -> UserId {
        self.id
    }
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

fn validate_email(email: &str) -> DomainResult<()> {
    require_non_blank("email", email)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(DomainError::validation(format!("'{email}' is not a valid email"))),
    }
}

/// Payload for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub image_id: Option<ImageId>,
}

impl NewUser {
    pub fn validate(&self) -> DomainResult<()> {
        require_non_blank("name", &self.name)?;
        require_non_blank("surname", &self.surname)?;
        validate_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(())
    }

    /// Validate, hash the password and build the record to persist.
    pub fn into_user(self, id: UserId, now: DateTime<Utc>) -> Result<User, UserError> {
        self.validate()?;
        let password_hash = hash_password(&self.password)?;
        Ok(User {
            id,
            name: self.name.trim().to_string(),
            surname: self.surname.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            password_hash,
            image_id: self.image_id,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Fields of a user an admin may change. Passwords are not changed through this path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image_id: Option<ImageId>,
}

impl UserPatch {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            require_non_blank("name", name)?;
        }
        if let Some(surname) = &self.surname {
            require_non_blank("surname", surname)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }
}

impl Patch<User> for UserPatch {
    fn apply_to(self, target: &mut User) {
        set_if_some(&mut target.name, self.name.map(|v| v.trim().to_string()));
        set_if_some(&mut target.surname, self.surname.map(|v| v.trim().to_string()));
        set_if_some(&mut target.email, self.email.map(|v| v.trim().to_lowercase()));
        if self.image_id.is_some() {
            target.image_id = self.image_id;
        }
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.surname.is_none() && self.email.is_none() && self.image_id.is_none()
    }
}

/// List filter: `name` matches name, surname or email (case-insensitive substring).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserFilter {
    pub name: Option<String>,
}

impl Filter<User> for UserFilter {
    fn matches(&self, user: &User) -> bool {
        match self.name.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                [&user.name, &user.surname, &user.email]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::verify_password;

    fn jane() -> NewUser {
        NewUser {
            name: "Jane".to_string(),
            surname: "Doe".to_string(),
            email: "Jane@Example.com".to_string(),
            password: "hunter22".to_string(),
            image_id: None,
        }
    }

    #[test]
    fn creation_hashes_password_and_normalizes_email() {
        let user = jane().into_user(UserId::new(), Utc::now()).unwrap();
        assert_eq!(user.email, "jane@example.com");
        assert_ne!(user.password_hash, "hunter22");
        assert!(verify_password("hunter22", &user.password_hash).unwrap());
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = jane().into_user(UserId::new(), Utc::now()).unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["name"], "Jane");
    }

    #[test]
    fn short_password_and_bad_email_are_rejected() {
        let mut short = jane();
        short.password = "123".to_string();
        assert!(short.validate().is_err());

        let mut bad_email = jane();
        bad_email.email = "jane.example.com".to_string();
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn filter_matches_surname_and_email() {
        let user = jane().into_user(UserId::new(), Utc::now()).unwrap();
        let by_surname = UserFilter { name: Some("doe".to_string()) };
        let by_email = UserFilter { name: Some("example".to_string()) };
        let miss = UserFilter { name: Some("smith".to_string()) };
        assert!(by_surname.matches(&user));
        assert!(by_email.matches(&user));
        assert!(!miss.matches(&user));
    }

    #[test]
    fn filter_trims_the_term() {
        let user = jane().into_user(UserId::new(), Utc::now()).unwrap();
        let padded = UserFilter { name: Some(" doe ".to_string()) };
        assert!(padded.matches(&user));
    }

    #[test]
    fn patch_cannot_blank_out_name() {
        let patch = UserPatch {
            name: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}
