// SPDX-FileCopyrightText: 2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::ops::RangeInclusive;

use crate::{
    client::{Product, ProductInput},
    error::Validation,
};

const TITLE_LEN: RangeInclusive<usize> = 3..=60;
const DESCRIPTION_LEN: RangeInclusive<usize> = 6..=180;
const PRICE: RangeInclusive<f64> = 1.0..=100_000.0;

fn check_len(
    field: &'static str,
    value: &str,
    range: &RangeInclusive<usize>,
) -> Result<(), Validation> {
    let len = value.chars().count();
    if range.contains(&len) {
        Ok(())
    } else {
        Err(Validation::Length {
            field,
            min: *range.start(),
            max: *range.end(),
            len,
        })
    }
}

/// Blank optional fields count as absent.
pub(crate) fn normalize(mut input: ProductInput) -> ProductInput {
    input.title = input.title.trim().to_owned();
    input.english_title = input
        .english_title
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty());
    input.description = input
        .description
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty());
    input
}

/// Checks a product form against the catalog it is about to join. `own_id` is
/// the product being edited, whose current title does not count as taken.
pub(crate) fn validate(
    input: &ProductInput,
    existing: &[Product],
    own_id: Option<&str>,
) -> Result<(), Validation> {
    if input.title.is_empty() {
        return Err(Validation::TitleMissing);
    }
    check_len("title", &input.title, &TITLE_LEN)?;
    if let Some(english_title) = input.english_title.as_deref() {
        check_len("English title", english_title, &TITLE_LEN)?;
    }
    if let Some(description) = input.description.as_deref() {
        check_len("description", description, &DESCRIPTION_LEN)?;
    }
    if !PRICE.contains(&input.price) {
        return Err(Validation::Price {
            min: *PRICE.start(),
            max: *PRICE.end(),
            price: input.price,
        });
    }

    let taken = existing
        .iter()
        .filter(|product| Some(product.id.as_str()) != own_id)
        .any(|product| product.title == input.title);
    if taken {
        return Err(Validation::DuplicateTitle(input.title.clone()));
    }

    Ok(())
}
