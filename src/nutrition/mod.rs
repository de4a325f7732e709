pub mod dto;
pub mod services;

pub use dto::{extract_num, MacroTotals, NutritionData, NutritionResponse};
pub use services::get_nutrition;
