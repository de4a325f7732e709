use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    G,
    Ml,
    Un,
}

impl WeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::G => "g",
            WeightUnit::Ml => "ml",
            WeightUnit::Un => "un",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "g" => Ok(WeightUnit::G),
            "ml" => Ok(WeightUnit::Ml),
            "un" => Ok(WeightUnit::Un),
            other => Err(format!("unknown unit: {}", other)),
        }
    }
}

/// One line of a dish. `weight` is kept as typed ("100", "1,5", "").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub weight: String,
    pub unit: WeightUnit,
}

impl Ingredient {
    pub fn new(name: &str, weight: &str, unit: WeightUnit) -> Self {
        Self {
            name: name.trim().to_string(),
            weight: weight.trim().to_string(),
            unit,
        }
    }

    pub fn unweighed(name: &str) -> Self {
        Self::new(name, "", WeightUnit::G)
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_ingredient(self))
    }
}

/// "100g de arroz", or just the name when there is no weight.
pub fn format_ingredient(ing: &Ingredient) -> String {
    if ing.weight.is_empty() {
        return ing.name.clone();
    }
    format!("{}{} de {}", ing.weight, ing.unit, ing.name)
}

pub fn join_ingredients(ingredients: &[Ingredient]) -> String {
    ingredients
        .iter()
        .map(format_ingredient)
        .collect::<Vec<_>>()
        .join(", ")
}

lazy_static! {
    static ref WITH_DE_RE: Regex =
        Regex::new(r"(?i)^(\d+[.,]?\d*)\s*(g|ml|un)\s+de\s+(.+)$").unwrap();
    static ref WITHOUT_DE_RE: Regex =
        Regex::new(r"(?i)^(\d+[.,]?\d*)\s*(g|ml|un)\s+(.+)$").unwrap();
}

fn parse_segment(part: &str) -> Ingredient {
    for re in [&*WITH_DE_RE, &*WITHOUT_DE_RE] {
        if let Some(caps) = re.captures(part) {
            let unit = caps[2].parse().unwrap_or_default();
            return Ingredient::new(&caps[3], &caps[1], unit);
        }
    }
    Ingredient::unweighed(part)
}

/// Best-effort inverse of [`join_ingredients`].
///
/// Accepts "100g de arroz, 200ml de leite", "100g arroz" and bare names.
/// Segments matching neither weighted form become an unweighed ingredient.
pub fn parse_foods_to_ingredients(foods: &str) -> Vec<Ingredient> {
    foods
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(parse_segment)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_and_without_weight() {
        assert_eq!(format_ingredient(&Ingredient::unweighed("arroz")), "arroz");
        assert_eq!(
            format_ingredient(&Ingredient::new("arroz", "100", WeightUnit::G)),
            "100g de arroz"
        );
    }

    #[test]
    fn parses_both_weighted_forms() {
        let parsed = parse_foods_to_ingredients("100g de arroz branco, 200ML leite");
        assert_eq!(
            parsed,
            vec![
                Ingredient::new("arroz branco", "100", WeightUnit::G),
                Ingredient::new("leite", "200", WeightUnit::Ml),
            ]
        );
    }

    #[test]
    fn keeps_decimal_weight_as_typed() {
        let parsed = parse_foods_to_ingredients("1.5un de banana, 2.5 g de sal");
        assert_eq!(parsed[0].weight, "1.5");
        assert_eq!(parsed[0].unit, WeightUnit::Un);
        assert_eq!(parsed[1].weight, "2.5");
        assert_eq!(parsed[1].name, "sal");
    }

    #[test]
    fn comma_decimal_in_a_single_segment() {
        // the list split happens first, so "1,5" only survives on its own
        let ing = parse_segment("1,5un de banana");
        assert_eq!(ing, Ingredient::new("banana", "1,5", WeightUnit::Un));
    }

    #[test]
    fn falls_back_to_name_only() {
        let parsed = parse_foods_to_ingredients(" arroz , , uma paçoquinha,");
        assert_eq!(
            parsed,
            vec![
                Ingredient::unweighed("arroz"),
                Ingredient::unweighed("uma paçoquinha"),
            ]
        );
        assert!(parse_foods_to_ingredients("").is_empty());
    }

    #[test]
    fn reparses_formatted_list() {
        let original = vec![
            Ingredient::new("arroz", "100", WeightUnit::G),
            Ingredient::new("leite", "200", WeightUnit::Ml),
            Ingredient::new("ovo", "2", WeightUnit::Un),
            Ingredient::unweighed("salada verde"),
        ];
        assert_eq!(parse_foods_to_ingredients(&join_ingredients(&original)), original);
    }

    #[test]
    fn unit_from_str() {
        assert_eq!("ML".parse::<WeightUnit>(), Ok(WeightUnit::Ml));
        assert!("kg".parse::<WeightUnit>().is_err());
    }
}
