pub mod account;
pub mod builder;
pub mod error;
pub mod generate;
pub mod recipe;

// Re-export common error type
pub use error::{LadleError, Result};
pub use recipe::{MealType, Recipe};
