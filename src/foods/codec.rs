use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ingredients::{join_ingredients, parse_foods_to_ingredients, Ingredient};

pub const DISH_SEPARATOR: &str = " — ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FoodsError {
    #[error("o nome do prato não pode conter \"{}\"", DISH_SEPARATOR.trim())]
    SeparatorInName,
    #[error("o ingrediente \"{0}\" não pode conter vírgula")]
    CommaInIngredient(String),
    #[error("o ingrediente \"{0}\" não seria lido de volta como foi digitado")]
    NotRoundTrippable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitFoods {
    pub dish_name: String,
    pub ingredients_raw: String,
}

/// Prefixes the ingredient list with the dish name when there is one.
pub fn build_foods_string(dish_name: Option<&str>, ingredients: &str) -> String {
    match dish_name.map(str::trim) {
        Some(name) if !name.is_empty() => format!("{}{}{}", name, DISH_SEPARATOR, ingredients),
        _ => ingredients.to_string(),
    }
}

/// Splits at the first separator. Without one the whole string is ingredients.
pub fn split_foods_and_dish_name(foods: &str) -> SplitFoods {
    match foods.split_once(DISH_SEPARATOR) {
        Some((name, rest)) => SplitFoods {
            dish_name: name.trim().to_string(),
            ingredients_raw: rest.trim().to_string(),
        },
        None => SplitFoods {
            dish_name: String::new(),
            ingredients_raw: foods.to_string(),
        },
    }
}

/// A dish as the client edits it. The wire `foods` string is derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dish {
    pub name: Option<String>,
    pub ingredients: Vec<Ingredient>,
}

impl Dish {
    pub fn new(name: Option<&str>, ingredients: Vec<Ingredient>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        Self { name, ingredients }
    }

    /// Derives the wire string, refusing anything that would not decode back.
    pub fn encode(&self) -> Result<String, FoodsError> {
        if let Some(name) = &self.name {
            if name.contains(DISH_SEPARATOR.trim()) {
                return Err(FoodsError::SeparatorInName);
            }
        }
        for ing in &self.ingredients {
            if ing.name.contains(',') || ing.weight.contains(',') {
                return Err(FoodsError::CommaInIngredient(ing.name.clone()));
            }
            if ing.name.contains(DISH_SEPARATOR.trim()) {
                return Err(FoodsError::SeparatorInName);
            }
        }
        let foods = build_foods_string(
            self.name.as_deref(),
            &join_ingredients(&self.ingredients),
        );
        let expected = self.canonical();
        let decoded = Self::decode(&foods);
        if decoded != expected {
            let culprit = expected
                .ingredients
                .iter()
                .enumerate()
                .find(|(i, ing)| decoded.ingredients.get(*i) != Some(*ing))
                .map(|(_, ing)| ing.name.clone())
                .unwrap_or_default();
            return Err(FoodsError::NotRoundTrippable(culprit));
        }
        Ok(foods)
    }

    /// The shape [`Dish::decode`] yields for this dish: trimmed fields, and
    /// unweighed ingredients carry the default unit.
    fn canonical(&self) -> Self {
        let ingredients = self
            .ingredients
            .iter()
            .map(|ing| {
                if ing.weight.trim().is_empty() {
                    Ingredient::unweighed(&ing.name)
                } else {
                    Ingredient::new(&ing.name, &ing.weight, ing.unit)
                }
            })
            .collect();
        Self::new(self.name.as_deref(), ingredients)
    }

    pub fn decode(foods: &str) -> Self {
        let split = split_foods_and_dish_name(foods);
        Self::new(
            Some(&split.dish_name),
            parse_foods_to_ingredients(&split.ingredients_raw),
        )
    }

    /// Display title: the dish name, else the ingredient list.
    pub fn title(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => join_ingredients(&self.ingredients),
        }
    }
}
