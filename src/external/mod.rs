//! Remote food databases behind the [`crate::core::remote::FoodLookup`] seam.

pub mod mock;
pub mod open_food_facts;

pub use mock::MockFoodLookup;
pub use open_food_facts::OpenFoodFactsClient;
