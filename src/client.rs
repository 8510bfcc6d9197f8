// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use clap::ValueEnum;
use inflector::Inflector as _;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::error::Result;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum Category {
    Promos,
    Cafeteria,
    Dulces,
    Bebidas,
    BebidasAlcohol,
    Hamburguesas,
    Pizzas,
    SandwichesTostados,
    SandwichesEspeciales,
    Ensaladas,
    Empanadas,
    Panchos,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = self.to_possible_value().ok_or(std::fmt::Error)?;
        write!(f, "{}", value.get_name().to_title_case())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Tabled)]
pub(crate) struct Product {
    #[serde(rename = "_id")]
    #[tabled(rename = "ID")]
    pub(crate) id: String,
    #[tabled(rename = "Title")]
    pub(crate) title: String,
    #[serde(rename = "englishTitle", default)]
    #[tabled(rename = "English Title", display_with = "display_optional")]
    pub(crate) english_title: Option<String>,
    #[tabled(rename = "Category")]
    pub(crate) category: Category,
    #[tabled(rename = "Price")]
    pub(crate) price: f64,
    #[serde(default)]
    #[tabled(rename = "Description", display_with = "display_optional")]
    pub(crate) description: Option<String>,
}

fn display_optional(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// The writable fields of a product, as sent on create and update. Optional
/// fields that are unset are left out of the payload entirely.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductInput {
    pub(crate) category: Category,
    pub(crate) title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) english_title: Option<String>,
    pub(crate) price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
}

impl From<Product> for ProductInput {
    fn from(value: Product) -> Self {
        Self {
            category: value.category,
            title: value.title,
            english_title: value.english_title,
            price: value.price,
            description: value.description,
        }
    }
}

#[async_trait]
pub(crate) trait Client {
    async fn list_products(&self) -> Result<Vec<Product>>;

    async fn create_product(&self, product: ProductInput) -> Result<Product>;

    async fn update_product(&self, id: &str, product: ProductInput) -> Result<Product>;

    async fn delete_product(&self, id: &str) -> Result<()>;
}

#[async_trait]
impl<T: Client + Send + Sync + ?Sized> Client for &T {
    async fn list_products(&self) -> Result<Vec<Product>> {
        (**self).list_products().await
    }

    async fn create_product(&self, product: ProductInput) -> Result<Product> {
        (**self).create_product(product).await
    }

    async fn update_product(&self, id: &str, product: ProductInput) -> Result<Product> {
        (**self).update_product(id, product).await
    }

    async fn delete_product(&self, id: &str) -> Result<()> {
        (**self).delete_product(id).await
    }
}
