pub mod dto;
pub mod services;

pub use dto::{DaySummary, Meal, MealType, MealUpdate, NewMeal};
pub use services::{
    create_meal, delete_meal, duplicate_meal, get_day_summary, get_meals_by_range, update_meal,
};
