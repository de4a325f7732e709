use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Macros as the backend labels them, e.g. "145 kcal", "3.2 g".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NutritionData {
    pub calories: String,
    pub protein: String,
    pub carbs: String,
    pub fat: String,
}

/// Body of `POST /nutrition/calories`.
#[derive(Debug, Deserialize)]
pub struct NutritionResponse {
    #[serde(default)]
    pub nutrition: Option<NutritionData>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NutritionRequest<'a> {
    pub foods: &'a str,
}

lazy_static! {
    static ref NUMBER_RE: Regex = Regex::new(r"[\d.,]+").unwrap();
    static ref LEADING_FLOAT_RE: Regex = Regex::new(r"^(\d+\.?\d*|\.\d+)").unwrap();
}

/// First number in a labelled value: "145 kcal" -> 145.0. Zero when absent.
///
/// The first comma reads as a decimal point, then the longest valid prefix
/// wins, so "1.500,5 kcal" gives 1.5.
pub fn extract_num(s: &str) -> f64 {
    NUMBER_RE
        .find(s)
        .map(|m| m.as_str().replacen(',', ".", 1))
        .and_then(|n| {
            LEADING_FLOAT_RE
                .find(&n)
                .and_then(|m| m.as_str().parse::<f64>().ok())
        })
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Rounded numeric macros for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MacroTotals {
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
}

impl MacroTotals {
    pub fn from_nutrition(n: &NutritionData) -> Self {
        Self {
            calories: extract_num(&n.calories).round() as i64,
            protein: extract_num(&n.protein).round() as i64,
            carbs: extract_num(&n.carbs).round() as i64,
            fat: extract_num(&n.fat).round() as i64,
        }
    }

    pub fn from_optional(n: Option<&NutritionData>) -> Self {
        n.map(Self::from_nutrition).unwrap_or_default()
    }
}
