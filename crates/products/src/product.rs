use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storeadmin_core::error::{require_non_blank, require_non_negative};
use storeadmin_core::patch::set_if_some;
use storeadmin_core::{DomainResult, Entity, Filter, ImageId, Patch, ProductId};

/// Catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    /// Price in smallest currency unit (e.g., cents).
    pub price: i64,
    pub image_id: Option<ImageId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Product {
    type Id = ProductId;
    const NAME: &'static str = "product";

    fn id(&self) -> ProductId {
        self.id
    }
}

/// Payload for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub image_id: Option<ImageId>,
}

impl NewProduct {
    pub fn validate(&self) -> DomainResult<()> {
        require_non_blank("name", &self.name)?;
        require_non_negative("price", self.price)
    }

    pub fn into_product(self, id: ProductId, now: DateTime<Utc>) -> DomainResult<Product> {
        self.validate()?;
        Ok(Product {
            id,
            name: self.name.trim().to_string(),
            description: self.description,
            price: self.price,
            image_id: self.image_id,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Fields of a product an admin may change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub image_id: Option<ImageId>,
}

impl ProductPatch {
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            require_non_blank("name", name)?;
        }
        if let Some(price) = self.price {
            require_non_negative("price", price)?;
        }
        Ok(())
    }
}

impl Patch<Product> for ProductPatch {
    fn apply_to(self, target: &mut Product) {
        set_if_some(&mut target.name, self.name.map(|n| n.trim().to_string()));
        set_if_some(&mut target.price, self.price);
        if self.description.is_some() {
            target.description = self.description;
        }
        if self.image_id.is_some() {
            target.image_id = self.image_id;
        }
    }

    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.image_id.is_none()
    }
}

/// List filter. The query parameter is called `title` but matches the product `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductFilter {
    pub title: Option<String>,
}

impl Filter<Product> for ProductFilter {
    fn matches(&self, product: &Product) -> bool {
        match self.title.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                product.name.to_lowercase().contains(&needle.to_lowercase())
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn new_product(name: &str, price: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            price,
            image_id: None,
        }
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(new_product("Mug", -5).validate().is_err());
    }

    #[test]
    fn patch_with_negative_price_is_rejected() {
        let patch = ProductPatch {
            price: Some(-1),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn patch_updates_price_and_keeps_name() {
        let mut product = new_product("Mug", 1200)
            .into_product(ProductId::new(), Utc::now())
            .unwrap();
        ProductPatch {
            price: Some(900),
            ..Default::default()
        }
        .apply_to(&mut product);
        assert_eq!(product.price, 900);
        assert_eq!(product.name, "Mug");
    }

    #[test]
    fn title_filter_matches_name() {
        let product = new_product("Coffee Mug", 1200)
            .into_product(ProductId::new(), Utc::now())
            .unwrap();
        let filter = ProductFilter {
            title: Some("MUG".to_string()),
        };
        assert!(filter.matches(&product));
    }

    #[test]
    fn title_filter_trims_the_term() {
        let product = new_product("Coffee Mug", 1200)
            .into_product(ProductId::new(), Utc::now())
            .unwrap();
        let filter = ProductFilter {
            title: Some(" mug  ".to_string()),
        };
        assert!(filter.matches(&product));
    }

    #[test]
    fn image_id_is_parsed_from_json() {
        let image = ImageId::new();
        let body = serde_json::json!({ "name": "Mug", "price": 100, "image_id": image.to_string() });
        let parsed: NewProduct = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.image_id, Some(image));
    }

    proptest! {
        /// Property: any non-blank name with a non-negative price is accepted.
        #[test]
        fn valid_products_are_accepted(
            name in "[A-Za-z][A-Za-z0-9 ]{0,40}",
            price in 0i64..10_000_000
        ) {
            prop_assert!(new_product(&name, price).validate().is_ok());
        }
    }
}
