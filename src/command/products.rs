// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use core::num::NonZeroUsize;

use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, error};
use tabled::{settings::Style, Table};

use crate::{
    client::{Category, Client, Product, ProductInput},
    error::{Error, Result},
    validation,
};

use super::Context;

/// Manage the products on the menu.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    List(List),
    Create(Create),
    Update(Update),
    Delete(Delete),
}

#[async_trait]
impl super::Command for Command {
    async fn execute(self, ctx: &Context) -> Result<()> {
        let _identity = ctx.gate.admit().await?;
        match self {
            Self::List(cmd) => cmd.run(&ctx.api).await,
            Self::Create(cmd) => cmd.run(&ctx.api).await,
            Self::Update(cmd) => cmd.run(&ctx.api).await,
            Self::Delete(cmd) => cmd.run(&ctx.api).await,
        }
    }
}

fn print_table<'p, I: IntoIterator<Item = &'p Product>>(products: I) {
    println!("{}", Table::new(products).with(Style::rounded()));
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum SortKey {
    Title,
    Category,
    Price,
}

/// List the products on the menu.
#[derive(Debug, Parser)]
pub(crate) struct List {
    /// Only show products in this category.
    #[arg(short, long, value_enum)]
    category: Option<Category>,

    /// Only show products whose title contains this text.
    #[arg(short, long)]
    search: Option<String>,

    /// The number of products to show.
    #[arg(short = 'n', long)]
    count: Option<NonZeroUsize>,

    /// The column to sort by. Products are shown in server order otherwise.
    #[arg(long, value_enum)]
    sort: Option<SortKey>,
}

impl List {
    fn select(&self, mut products: Vec<Product>) -> Vec<Product> {
        if let Some(category) = self.category {
            products.retain(|product| product.category == category);
        }
        if let Some(search) = self.search.as_deref() {
            let needle = search.to_lowercase();
            products.retain(|product| {
                product.title.to_lowercase().contains(&needle)
                    || product
                        .english_title
                        .as_deref()
                        .is_some_and(|title| title.to_lowercase().contains(&needle))
            });
        }
        match self.sort {
            Some(SortKey::Title) => {
                products.sort_by_cached_key(|product| product.title.to_lowercase());
            }
            Some(SortKey::Category) => products.sort_by_key(|product| product.category),
            Some(SortKey::Price) => products.sort_by(|a, b| a.price.total_cmp(&b.price)),
            None => {}
        }
        products
    }

    async fn run(self, client: impl Client + Send + Sync) -> Result<()> {
        let products = self.select(client.list_products().await?);
        if !products.is_empty() {
            print_table(
                products
                    .iter()
                    .take(self.count.map_or(usize::MAX, NonZeroUsize::get)),
            );
        }
        println!("Total products: {}", products.len());
        Ok(())
    }
}

/// Add a product to the menu.
#[derive(Debug, Parser)]
pub(crate) struct Create {
    #[arg(short, long)]
    title: String,

    #[arg(short, long, value_enum)]
    category: Category,

    #[arg(short, long)]
    price: f64,

    /// The title shown on the English menu.
    #[arg(long)]
    english_title: Option<String>,

    #[arg(short, long)]
    description: Option<String>,
}

impl Create {
    fn into_input(self) -> ProductInput {
        validation::normalize(ProductInput {
            category: self.category,
            title: self.title,
            english_title: self.english_title,
            price: self.price,
            description: self.description,
        })
    }

    async fn run(self, client: impl Client + Send + Sync) -> Result<()> {
        let input = self.into_input();
        let existing = client.list_products().await?;
        validation::validate(&input, &existing, None)?;

        let created = client.create_product(input).await?;
        debug!("Created product {}", created.id);
        print_table([&created]);
        Ok(())
    }
}

/// Change a product. Fields that are not given keep their current value; pass
/// an empty string to clear an optional one.
#[derive(Debug, Parser)]
pub(crate) struct Update {
    /// The ID of the product to change.
    id: String,

    #[arg(short, long)]
    title: Option<String>,

    #[arg(short, long, value_enum)]
    category: Option<Category>,

    #[arg(short, long)]
    price: Option<f64>,

    /// The title shown on the English menu.
    #[arg(long)]
    english_title: Option<String>,

    #[arg(short, long)]
    description: Option<String>,
}

impl Update {
    fn merge(self, current: Product) -> ProductInput {
        let mut input = ProductInput::from(current);
        if let Some(title) = self.title {
            input.title = title;
        }
        if let Some(category) = self.category {
            input.category = category;
        }
        if let Some(price) = self.price {
            input.price = price;
        }
        if let Some(english_title) = self.english_title {
            input.english_title = Some(english_title);
        }
        if let Some(description) = self.description {
            input.description = Some(description);
        }
        validation::normalize(input)
    }

    async fn run(self, client: impl Client + Send + Sync) -> Result<()> {
        let existing = client.list_products().await?;
        let Some(current) = existing.iter().find(|product| product.id == self.id) else {
            error!("There is no product with ID {}", self.id);
            return Err(Error::Command);
        };

        let id = self.id.clone();
        let input = self.merge(current.clone());
        validation::validate(&input, &existing, Some(&id))?;

        let updated = client.update_product(&id, input).await?;
        print_table([&updated]);
        Ok(())
    }
}

/// Remove a product from the menu.
#[derive(Debug, Parser)]
pub(crate) struct Delete {
    /// The ID of the product to remove.
    id: String,
}

impl Delete {
    async fn run(self, client: impl Client + Send + Sync) -> Result<()> {
        client.delete_product(&self.id).await?;
        println!("Deleted product {}", self.id);
        Ok(())
    }
}
