//! Shared state behind the dispatcher.

use std::collections::HashMap;
use std::sync::Mutex;

use ladle_core::Recipe;
use ladle_core::generate::GenerativeServices;
use ladle_infrastructure::{AccountStore, RecipeStore};

use crate::arena::SessionArena;
use crate::config::ServerConfig;

/// Everything the request handlers share: both stores, the builder-session
/// arena, the draft table (generated but unsaved recipes), and the
/// generative services new sessions are wired to.
pub struct AppState {
    pub accounts: AccountStore,
    pub recipes: RecipeStore,
    pub sessions: SessionArena,
    pub drafts: Mutex<HashMap<String, Recipe>>,
    pub services: GenerativeServices,
}

impl AppState {
    pub fn new(config: &ServerConfig, services: GenerativeServices) -> Self {
        Self {
            accounts: AccountStore::open(config.account_db.clone()),
            recipes: RecipeStore::open(config.recipe_db.clone()),
            sessions: SessionArena::new(config.max_sessions),
            drafts: Mutex::new(HashMap::new()),
            services,
        }
    }

    /// A recipe by id, drafts shadowing the persistent store.
    pub fn find_recipe(&self, id: &str) -> Option<Recipe> {
        let drafts = self.drafts.lock().expect("draft table lock poisoned");
        if let Some(draft) = drafts.get(id) {
            return Some(draft.clone());
        }
        drop(drafts);
        self.recipes.by_id(id)
    }
}
