//! The persistent recipe store and its sort/filter query.

use std::path::PathBuf;
use std::sync::Mutex;

use ladle_core::Recipe;
use ladle_core::Result;

use crate::persistent_list::PersistentList;

/// Recipes mirrored to a JSON database file.
///
/// Invariant: the in-memory list is kept sorted by creation date descending
/// after load and after every add or edit; removal preserves order. The
/// internal mutex makes each operation atomic relative to concurrent
/// readers and the file rewrite.
pub struct RecipeStore {
    inner: Mutex<PersistentList<Recipe>>,
}

impl RecipeStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut list = PersistentList::open(path);
        sort_by_date(list.items_mut());
        Self {
            inner: Mutex::new(list),
        }
    }

    /// Appends a recipe, persists, and restores the date ordering.
    pub fn add(&self, recipe: Recipe) -> Result<()> {
        let mut list = self.inner.lock().expect("recipe store lock poisoned");
        list.add(recipe)?;
        sort_by_date(list.items_mut());
        Ok(())
    }

    /// Removes the recipe with the given id, if present.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut list = self.inner.lock().expect("recipe store lock poisoned");
        list.remove_where(|r| r.id == id)
    }

    pub fn by_id(&self, id: &str) -> Option<Recipe> {
        self.inner
            .lock()
            .expect("recipe store lock poisoned")
            .items()
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Replaces the instructions of the recipe with the given id, restamping
    /// its creation date. Returns false if the id is unknown.
    pub fn edit_instructions(&self, id: &str, instructions: &str) -> Result<bool> {
        let mut list = self.inner.lock().expect("recipe store lock poisoned");
        let Some(recipe) = list.items_mut().iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };
        recipe.set_instructions(instructions);
        list.save()?;
        sort_by_date(list.items_mut());
        Ok(true)
    }

    /// Ids of the owner's recipes, ordered by `sort_by` and narrowed by
    /// `filter_by`.
    ///
    /// Sort keys: "most-recent" / "least-recent" (creation date descending /
    /// ascending), "a-z" / "z-a" (ordinal title comparison). An unknown sort
    /// key leaves the list in its invariant order. Filter keys: "all" passes
    /// everything, the three meal types keep only matching recipes, and any
    /// other key also passes everything - that pass-through mirrors the
    /// behavior clients already rely on.
    pub fn ids(&self, owner: &str, sort_by: &str, filter_by: &str) -> Vec<String> {
        let list = self.inner.lock().expect("recipe store lock poisoned");
        let mut selected: Vec<&Recipe> =
            list.items().iter().filter(|r| r.owner == owner).collect();

        match sort_by {
            "most-recent" => selected.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            "least-recent" => selected.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            "a-z" => selected.sort_by(|a, b| a.title.cmp(&b.title)),
            "z-a" => selected.sort_by(|a, b| b.title.cmp(&a.title)),
            _ => {}
        }

        match filter_by {
            "all" => {}
            "breakfast" | "lunch" | "dinner" => {
                selected.retain(|r| r.meal_type.as_str() == filter_by);
            }
            _ => {}
        }

        selected.iter().map(|r| r.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("recipe store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn sort_by_date(recipes: &mut [Recipe]) {
    // Most recent first.
    recipes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use ladle_core::MealType;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn store(temp_dir: &TempDir) -> RecipeStore {
        RecipeStore::open(temp_dir.path().join("database.json"))
    }

    fn recipe(title: &str, owner: &str, meal_type: MealType, age_secs: i64) -> Recipe {
        let mut recipe = Recipe::new(
            Uuid::new_v4().to_string(),
            title,
            format!("How to make {title}."),
            owner,
            vec![1, 2, 3],
            meal_type,
        );
        recipe.created_at -= Duration::seconds(age_secs);
        recipe
    }

    fn titles(store: &RecipeStore, ids: &[String]) -> Vec<String> {
        ids.iter()
            .map(|id| store.by_id(id).unwrap().title)
            .collect()
    }

    #[test]
    fn test_round_trip_preserves_all_fields() {
        let dir = TempDir::new().unwrap();
        let recipes = store(&dir);
        let written: Vec<Recipe> = (0..3)
            .map(|i| recipe(&format!("Recipe {i}"), "alice", MealType::Dinner, i * 100))
            .collect();
        for r in &written {
            recipes.add(r.clone()).unwrap();
        }

        let reloaded = store(&dir);
        assert_eq!(reloaded.len(), 3);
        for r in &written {
            let loaded = reloaded.by_id(&r.id).unwrap();
            assert_eq!(loaded.title, r.title);
            assert_eq!(loaded.instructions, r.instructions);
            assert_eq!(loaded.meal_type, r.meal_type);
            assert_eq!(loaded.owner, r.owner);
            assert_eq!(loaded.image, r.image);
        }
    }

    #[test]
    fn test_most_recent_is_reverse_of_least_recent() {
        let dir = TempDir::new().unwrap();
        let recipes = store(&dir);
        for i in 0..4 {
            recipes
                .add(recipe(&format!("R{i}"), "alice", MealType::Lunch, i * 60))
                .unwrap();
        }

        let most = recipes.ids("alice", "most-recent", "all");
        let mut least = recipes.ids("alice", "least-recent", "all");
        least.reverse();
        assert_eq!(most, least);
    }

    #[test]
    fn test_alphabetical_sort_ignores_timestamps() {
        let dir = TempDir::new().unwrap();
        let recipes = store(&dir);
        // creation times deliberately out of title order
        recipes.add(recipe("B", "alice", MealType::Dinner, 1000)).unwrap();
        recipes.add(recipe("C", "alice", MealType::Dinner, 2000)).unwrap();
        recipes.add(recipe("A", "alice", MealType::Dinner, 0)).unwrap();

        let ids = recipes.ids("alice", "a-z", "all");
        assert_eq!(titles(&recipes, &ids), vec!["A", "B", "C"]);

        let ids = recipes.ids("alice", "z-a", "all");
        assert_eq!(titles(&recipes, &ids), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_filter_by_meal_type() {
        let dir = TempDir::new().unwrap();
        let recipes = store(&dir);
        recipes.add(recipe("Eggs", "alice", MealType::Breakfast, 0)).unwrap();
        recipes.add(recipe("Soup", "alice", MealType::Lunch, 10)).unwrap();
        recipes.add(recipe("Stew", "alice", MealType::Dinner, 20)).unwrap();

        let ids = recipes.ids("alice", "most-recent", "breakfast");
        assert_eq!(titles(&recipes, &ids), vec!["Eggs"]);
    }

    #[test]
    fn test_unknown_filter_key_passes_everything_through() {
        let dir = TempDir::new().unwrap();
        let recipes = store(&dir);
        recipes.add(recipe("Eggs", "alice", MealType::Breakfast, 0)).unwrap();
        recipes.add(recipe("Soup", "alice", MealType::Lunch, 10)).unwrap();

        let ids = recipes.ids("alice", "a-z", "brunch");
        assert_eq!(titles(&recipes, &ids), vec!["Eggs", "Soup"]);
    }

    #[test]
    fn test_unknown_sort_key_keeps_invariant_order() {
        let dir = TempDir::new().unwrap();
        let recipes = store(&dir);
        recipes.add(recipe("Old", "alice", MealType::Dinner, 500)).unwrap();
        recipes.add(recipe("New", "alice", MealType::Dinner, 0)).unwrap();

        // list invariant is most-recent first
        let ids = recipes.ids("alice", "sideways", "all");
        assert_eq!(titles(&recipes, &ids), vec!["New", "Old"]);
    }

    #[test]
    fn test_ids_only_for_the_given_owner() {
        let dir = TempDir::new().unwrap();
        let recipes = store(&dir);
        recipes.add(recipe("Mine", "alice", MealType::Dinner, 0)).unwrap();
        recipes.add(recipe("Theirs", "bob", MealType::Dinner, 0)).unwrap();

        let ids = recipes.ids("alice", "most-recent", "all");
        assert_eq!(titles(&recipes, &ids), vec!["Mine"]);
        assert!(recipes.ids("carol", "most-recent", "all").is_empty());
    }

    #[test]
    fn test_remove_preserves_remaining_order() {
        let dir = TempDir::new().unwrap();
        let recipes = store(&dir);
        let middle = recipe("Middle", "alice", MealType::Dinner, 100);
        let middle_id = middle.id.clone();
        recipes.add(recipe("Oldest", "alice", MealType::Dinner, 200)).unwrap();
        recipes.add(middle).unwrap();
        recipes.add(recipe("Newest", "alice", MealType::Dinner, 0)).unwrap();

        assert!(recipes.remove(&middle_id).unwrap());
        assert!(!recipes.remove(&middle_id).unwrap());

        let ids = recipes.ids("alice", "most-recent", "all");
        assert_eq!(titles(&recipes, &ids), vec!["Newest", "Oldest"]);
    }

    #[test]
    fn test_edit_restamps_and_resorts() {
        let dir = TempDir::new().unwrap();
        let recipes = store(&dir);
        let old = recipe("Old", "alice", MealType::Dinner, 5000);
        let old_id = old.id.clone();
        recipes.add(old).unwrap();
        recipes.add(recipe("New", "alice", MealType::Dinner, 60)).unwrap();

        assert!(recipes.edit_instructions(&old_id, "Now with more garlic.").unwrap());
        assert!(!recipes.edit_instructions("no-such-id", "x").unwrap());

        // the edited recipe is now the most recent
        let ids = recipes.ids("alice", "most-recent", "all");
        assert_eq!(ids[0], old_id);
        assert_eq!(
            recipes.by_id(&old_id).unwrap().instructions,
            "Now with more garlic."
        );
    }
}
