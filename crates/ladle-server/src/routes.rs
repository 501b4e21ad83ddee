//! One handler per wire path.
//!
//! Every response is a single string payload. The legacy clients send one
//! HTTP method per operation (GET/POST/PUT/DELETE) but the protocol never
//! depended on them, so every route accepts any method. The leading-dot
//! sentinel on instruction payloads disambiguates "empty" from "absent" in
//! the string-only protocol and is preserved byte-for-byte at this
//! boundary; everything behind it works with plain `Option`/`Result`.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::any;
use serde::Deserialize;
use url::form_urlencoded;

use ladle_core::builder::{ElementName, RecipeBuilder};

use crate::error::ApiError;
use crate::state::AppState;

const SUCCESS: &str = "success";
const FAILURE: &str = "failure";

/// Builds the dispatch router over the shared state.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", any(status))
        .route("/generate-new-recipe-builder", any(generate_new_builder))
        .route("/get-recipe-meal-type", any(get_recipe_meal_type))
        .route("/get-recipe-title", any(get_recipe_title))
        .route("/get-recipe-date", any(get_recipe_date))
        .route("/get-recipe-instructions", any(get_recipe_instructions))
        .route("/get-recipe-image", any(get_recipe_image))
        .route("/get-recipe-ids", any(get_recipe_ids))
        .route("/reset-recipe-creator-element", any(reset_creator_element))
        .route("/specify-recipe-creator-element", any(specify_creator_element))
        .route("/is-recipe-creator-completed", any(is_creator_completed))
        .route("/generate-recipe", any(generate_recipe))
        .route("/remove-recipe", any(remove_recipe))
        .route("/save-recipe", any(save_recipe))
        .route("/edit-recipe", any(edit_recipe))
        .route("/add-account", any(add_account))
        .route("/login", any(login))
        .route("/get-account-json", any(get_account_json))
        .route("/passwords-match", any(passwords_match))
        .route("/valid-username", any(valid_username))
        .route("/valid-password", any(valid_password))
        .route("/recipe", any(recipe_html))
        .fallback(invalid_path)
        .with_state(state)
}

#[derive(Deserialize)]
struct RecipeIdQuery {
    #[serde(rename = "recipeID")]
    recipe_id: String,
}

#[derive(Deserialize)]
struct RecipeIdsQuery {
    #[serde(rename = "accountUsername")]
    account_username: String,
    #[serde(rename = "sortBy")]
    sort_by: String,
    #[serde(rename = "filterBy")]
    filter_by: String,
}

#[derive(Deserialize)]
struct ElementQuery {
    #[serde(rename = "recipeID")]
    recipe_id: String,
    #[serde(rename = "elementName")]
    element_name: String,
}

#[derive(Deserialize)]
struct SpecifyQuery {
    #[serde(rename = "recipeID")]
    recipe_id: String,
    #[serde(rename = "elementName")]
    element_name: String,
    hex: String,
}

#[derive(Deserialize)]
struct GenerateQuery {
    #[serde(rename = "recipeID")]
    recipe_id: String,
    #[serde(rename = "accountUsername")]
    account_username: String,
}

#[derive(Deserialize)]
struct EditQuery {
    #[serde(rename = "recipeID")]
    recipe_id: String,
    #[serde(rename = "newInstructions")]
    new_instructions: String,
}

#[derive(Deserialize)]
struct CredentialsQuery {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct PasswordsQuery {
    password1: String,
    password2: String,
}

#[derive(Deserialize)]
struct UsernameQuery {
    username: String,
}

#[derive(Deserialize)]
struct PasswordQuery {
    password: String,
}

async fn invalid_path() -> &'static str {
    "Invalid path"
}

async fn status() -> &'static str {
    "available"
}

async fn generate_new_builder(State(state): State<Arc<AppState>>) -> String {
    let builder = RecipeBuilder::new(state.services.clone());
    state.sessions.insert(builder)
}

async fn get_recipe_meal_type(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecipeIdQuery>,
) -> Result<String, ApiError> {
    let recipe = state
        .find_recipe(&query.recipe_id)
        .ok_or_else(|| ApiError::not_found("recipe", &query.recipe_id))?;
    Ok(recipe.meal_type.to_string())
}

async fn get_recipe_title(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecipeIdQuery>,
) -> Result<String, ApiError> {
    let recipe = state
        .find_recipe(&query.recipe_id)
        .ok_or_else(|| ApiError::not_found("recipe", &query.recipe_id))?;
    Ok(recipe.title)
}

async fn get_recipe_date(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecipeIdQuery>,
) -> Result<String, ApiError> {
    let recipe = state
        .find_recipe(&query.recipe_id)
        .ok_or_else(|| ApiError::not_found("recipe", &query.recipe_id))?;
    Ok(recipe.formatted_date())
}

async fn get_recipe_instructions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecipeIdQuery>,
) -> Result<String, ApiError> {
    let recipe = state
        .find_recipe(&query.recipe_id)
        .ok_or_else(|| ApiError::not_found("recipe", &query.recipe_id))?;
    // dot sentinel keeps the payload non-empty even for empty instructions
    Ok(format!(".{}", encode_component(&recipe.instructions)))
}

async fn get_recipe_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecipeIdQuery>,
) -> Result<String, ApiError> {
    let recipe = state
        .find_recipe(&query.recipe_id)
        .ok_or_else(|| ApiError::not_found("recipe", &query.recipe_id))?;
    Ok(recipe.image_hex())
}

async fn get_recipe_ids(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecipeIdsQuery>,
) -> String {
    let ids = state
        .recipes
        .ids(&query.account_username, &query.sort_by, &query.filter_by);
    if ids.is_empty() {
        ".".to_string()
    } else {
        ids.join(",")
    }
}

async fn reset_creator_element(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ElementQuery>,
) -> Result<&'static str, ApiError> {
    let element: ElementName = query
        .element_name
        .parse()
        .map_err(|_| ApiError::bad_request(format!("invalid element name '{}'", query.element_name)))?;
    let session = state
        .sessions
        .get(&query.recipe_id)
        .ok_or_else(|| ApiError::not_found("session", &query.recipe_id))?;
    session.lock().await.reset(element);
    Ok(SUCCESS)
}

async fn specify_creator_element(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SpecifyQuery>,
) -> Result<String, ApiError> {
    let Ok(element) = query.element_name.parse::<ElementName>() else {
        tracing::warn!(element = %query.element_name, "specify with unknown element");
        return Ok(FAILURE.to_string());
    };
    let Ok(audio) = hex::decode(&query.hex) else {
        tracing::warn!("specify with undecodable audio payload");
        return Ok(FAILURE.to_string());
    };
    let session = state
        .sessions
        .get(&query.recipe_id)
        .ok_or_else(|| ApiError::not_found("session", &query.recipe_id))?;

    let mut builder = session.lock().await;
    match builder.specify(element, &audio).await {
        Ok(Some(value)) => Ok(format!(".{value}")),
        Ok(None) => Ok(".invalid".to_string()),
        Err(err) => {
            tracing::warn!(%err, "transcription failed during specify");
            Ok(FAILURE.to_string())
        }
    }
}

async fn is_creator_completed(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecipeIdQuery>,
) -> Result<String, ApiError> {
    let session = state
        .sessions
        .get(&query.recipe_id)
        .ok_or_else(|| ApiError::not_found("session", &query.recipe_id))?;
    let completed = session.lock().await.is_completed();
    Ok(completed.to_string())
}

async fn generate_recipe(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GenerateQuery>,
) -> Result<&'static str, ApiError> {
    let session = state
        .sessions
        .get(&query.recipe_id)
        .ok_or_else(|| ApiError::not_found("session", &query.recipe_id))?;

    let builder = session.lock().await;
    match builder.produce_recipe(&query.account_username).await {
        Ok(recipe) => {
            state
                .drafts
                .lock()
                .expect("draft table lock poisoned")
                .insert(recipe.id.clone(), recipe);
            Ok(SUCCESS)
        }
        Err(err) => {
            tracing::warn!(%err, session = %query.recipe_id, "recipe generation failed");
            Ok(FAILURE)
        }
    }
}

async fn remove_recipe(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecipeIdQuery>,
) -> Result<&'static str, ApiError> {
    state.recipes.remove(&query.recipe_id).map_err(ApiError::from)?;
    Ok(SUCCESS)
}

async fn save_recipe(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecipeIdQuery>,
) -> Result<&'static str, ApiError> {
    let draft = state
        .drafts
        .lock()
        .expect("draft table lock poisoned")
        .remove(&query.recipe_id)
        .ok_or_else(|| ApiError::not_found("draft", &query.recipe_id))?;
    state.recipes.add(draft).map_err(ApiError::from)?;
    // the session has served its purpose
    state.sessions.remove(&query.recipe_id);
    Ok(SUCCESS)
}

async fn edit_recipe(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EditQuery>,
) -> Result<&'static str, ApiError> {
    let Some(instructions) = query.new_instructions.strip_prefix('.') else {
        tracing::warn!("edit payload missing dot sentinel");
        return Ok(FAILURE);
    };
    match state.recipes.edit_instructions(&query.recipe_id, instructions) {
        Ok(true) => Ok(SUCCESS),
        Ok(false) => Ok(FAILURE),
        Err(err) => {
            tracing::error!(%err, "failed to persist instruction edit");
            Ok(FAILURE)
        }
    }
}

async fn add_account(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CredentialsQuery>,
) -> &'static str {
    match state.accounts.add(&query.username, &query.password) {
        Ok(true) => "created",
        Ok(false) => "in use",
        Err(err) => {
            tracing::error!(%err, "failed to persist new account");
            "in use"
        }
    }
}

async fn login(State(state): State<Arc<AppState>>, Query(query): Query<CredentialsQuery>) -> &'static str {
    if state.accounts.login(&query.username, &query.password) {
        SUCCESS
    } else {
        FAILURE
    }
}

async fn get_account_json(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CredentialsQuery>,
) -> Result<String, ApiError> {
    let account = state
        .accounts
        .account_record(&query.username, &query.password)
        .ok_or_else(|| ApiError::not_found("account", &query.username))?;
    serde_json::to_string(&account)
        .map_err(|err| ApiError::Internal(err.into()))
}

async fn passwords_match(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PasswordsQuery>,
) -> String {
    state
        .accounts
        .passwords_match(&query.password1, &query.password2)
        .to_string()
}

async fn valid_username(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UsernameQuery>,
) -> String {
    state.accounts.validate_username(&query.username).to_string()
}

async fn valid_password(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PasswordQuery>,
) -> String {
    state.accounts.validate_password(&query.password).to_string()
}

async fn recipe_html(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecipeIdQuery>,
) -> Html<String> {
    match state.recipes.by_id(&query.recipe_id) {
        Some(recipe) => Html(recipe.to_html()),
        None => {
            tracing::warn!(id = %query.recipe_id, "html rendering for unknown recipe");
            Html(FAILURE.to_string())
        }
    }
}

/// Percent-encodes a payload component the way the legacy protocol does
/// (spaces become `+`).
fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
