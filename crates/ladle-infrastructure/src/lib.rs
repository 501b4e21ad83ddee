pub mod account_store;
pub mod persistent_list;
pub mod recipe_store;

pub use account_store::AccountStore;
pub use persistent_list::PersistentList;
pub use recipe_store::RecipeStore;
