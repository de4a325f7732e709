pub mod codec;
pub mod draft;
pub mod ingredients;

pub use codec::{build_foods_string, split_foods_and_dish_name, Dish, FoodsError, SplitFoods};
pub use draft::MealDraft;
pub use ingredients::{
    format_ingredient, join_ingredients, parse_foods_to_ingredients, Ingredient, WeightUnit,
};
