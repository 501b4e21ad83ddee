//! The client-side proxy for the Ladle wire protocol.
//!
//! One method per server operation. The proxy holds no server-side truth:
//! it caches only the last successful login's username and the active
//! sort/filter preference, both reset on logout. Any transport failure
//! fires the injected "service unreachable" callback before the call
//! returns a failure value; the owner of that callback decides how to halt
//! further traffic.

use reqwest::{Client, Method};
use url::Url;
use url::form_urlencoded;

use ladle_core::account::Account;
use ladle_core::{LadleError, Result};

const DEFAULT_SORT: &str = "most-recent";
const DEFAULT_FILTER: &str = "all";

/// Invoked once per request that failed at the transport level.
pub type UnreachableCallback = Box<dyn Fn() + Send + Sync>;

pub struct ClientProxy {
    base_url: Url,
    http: Client,
    on_unreachable: UnreachableCallback,
    username: Option<String>,
    sort_by: String,
    filter_by: String,
}

impl ClientProxy {
    pub fn new(base_url: &str, on_unreachable: UnreachableCallback) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| LadleError::config(format!("invalid server url: {err}")))?;
        Ok(Self {
            base_url,
            http: Client::new(),
            on_unreachable,
            username: None,
            sort_by: DEFAULT_SORT.to_string(),
            filter_by: DEFAULT_FILTER.to_string(),
        })
    }

    /// The username cached from the last successful login, if any.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn sort_by(&self) -> &str {
        &self.sort_by
    }

    pub fn set_sort_by(&mut self, sort_by: impl Into<String>) {
        self.sort_by = sort_by.into();
    }

    pub fn filter_by(&self) -> &str {
        &self.filter_by
    }

    pub fn set_filter_by(&mut self, filter_by: impl Into<String>) {
        self.filter_by = filter_by.into();
    }

    /// Forgets the cached login and restores default display preferences.
    pub fn logout(&mut self) {
        self.username = None;
        self.sort_by = DEFAULT_SORT.to_string();
        self.filter_by = DEFAULT_FILTER.to_string();
    }

    /// True if the server answers its health check.
    pub async fn status(&self) -> bool {
        self.send(Method::GET, "/status", &[])
            .await
            .is_some_and(|body| body == "available")
    }

    /// Starts a builder session, returning its id.
    pub async fn generate_new_recipe_builder(&self) -> Option<String> {
        self.send(Method::GET, "/generate-new-recipe-builder", &[])
            .await
    }

    pub async fn get_recipe_meal_type(&self, recipe_id: &str) -> Option<String> {
        self.send(Method::GET, "/get-recipe-meal-type", &[("recipeID", recipe_id)])
            .await
    }

    pub async fn get_recipe_title(&self, recipe_id: &str) -> Option<String> {
        self.send(Method::GET, "/get-recipe-title", &[("recipeID", recipe_id)])
            .await
    }

    pub async fn get_recipe_date(&self, recipe_id: &str) -> Option<String> {
        self.send(Method::GET, "/get-recipe-date", &[("recipeID", recipe_id)])
            .await
    }

    /// The recipe's instructions, decoded from the dot-sentinel payload.
    pub async fn get_recipe_instructions(&self, recipe_id: &str) -> Option<String> {
        let body = self
            .send(
                Method::GET,
                "/get-recipe-instructions",
                &[("recipeID", recipe_id)],
            )
            .await?;
        let encoded = body.strip_prefix('.')?;
        Some(decode_component(encoded))
    }

    /// The recipe's image bytes.
    pub async fn get_recipe_image(&self, recipe_id: &str) -> Option<Vec<u8>> {
        let body = self
            .send(Method::GET, "/get-recipe-image", &[("recipeID", recipe_id)])
            .await?;
        match hex::decode(body) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::warn!(%err, "server sent undecodable image data");
                None
            }
        }
    }

    /// Ids of the logged-in user's recipes under the active sort/filter
    /// preference.
    pub async fn get_recipe_ids(&self) -> Option<Vec<String>> {
        let username = self.username.as_deref()?;
        let body = self
            .send(
                Method::GET,
                "/get-recipe-ids",
                &[
                    ("accountUsername", username),
                    ("sortBy", &self.sort_by),
                    ("filterBy", &self.filter_by),
                ],
            )
            .await?;
        Some(parse_id_list(&body))
    }

    pub async fn reset_recipe_creator_element(&self, recipe_id: &str, element: &str) -> bool {
        self.send(
            Method::PUT,
            "/reset-recipe-creator-element",
            &[("recipeID", recipe_id), ("elementName", element)],
        )
        .await
        .is_some_and(|body| body == "success")
    }

    /// Sends an audio payload to settle a builder field. Returns the value
    /// the field settled on, or `None` if nothing was recognized.
    pub async fn specify_recipe_creator_element(
        &self,
        recipe_id: &str,
        element: &str,
        audio: &[u8],
    ) -> Option<String> {
        let body = self
            .send(
                Method::POST,
                "/specify-recipe-creator-element",
                &[
                    ("recipeID", recipe_id),
                    ("elementName", element),
                    ("hex", &hex::encode(audio)),
                ],
            )
            .await?;
        let value = body.strip_prefix('.')?;
        if value == "invalid" {
            return None;
        }
        Some(value.to_string())
    }

    pub async fn is_recipe_creator_completed(&self, recipe_id: &str) -> bool {
        self.send(
            Method::GET,
            "/is-recipe-creator-completed",
            &[("recipeID", recipe_id)],
        )
        .await
        .is_some_and(|body| body == "true")
    }

    /// Generates a draft recipe from a completed builder session.
    pub async fn generate_recipe(&self, recipe_id: &str) -> bool {
        let Some(username) = self.username.as_deref() else {
            tracing::warn!("generate_recipe without a logged-in user");
            return false;
        };
        self.send(
            Method::PUT,
            "/generate-recipe",
            &[("recipeID", recipe_id), ("accountUsername", username)],
        )
        .await
        .is_some_and(|body| body == "success")
    }

    pub async fn remove_recipe(&self, recipe_id: &str) -> bool {
        self.send(Method::DELETE, "/remove-recipe", &[("recipeID", recipe_id)])
            .await
            .is_some_and(|body| body == "success")
    }

    pub async fn save_recipe(&self, recipe_id: &str) -> bool {
        self.send(Method::GET, "/save-recipe", &[("recipeID", recipe_id)])
            .await
            .is_some_and(|body| body == "success")
    }

    pub async fn edit_recipe(&self, recipe_id: &str, new_instructions: &str) -> bool {
        // the dot keeps the value non-empty even for empty instructions
        let payload = format!(".{new_instructions}");
        self.send(
            Method::PUT,
            "/edit-recipe",
            &[("recipeID", recipe_id), ("newInstructions", &payload)],
        )
        .await
        .is_some_and(|body| body == "success")
    }

    /// Creates an account; on success the new username becomes the cached
    /// login.
    pub async fn add_account(&mut self, username: &str, password: &str) -> Option<String> {
        let body = self
            .send(
                Method::POST,
                "/add-account",
                &[("username", username), ("password", password)],
            )
            .await?;
        if body == "created" {
            self.username = Some(username.to_string());
            return Some(username.to_string());
        }
        None
    }

    /// Logs in; on success caches the username and restores default
    /// display preferences.
    pub async fn login(&mut self, username: &str, password: &str) -> bool {
        let success = self
            .send(
                Method::GET,
                "/login",
                &[("username", username), ("password", password)],
            )
            .await
            .is_some_and(|body| body == "success");
        if success {
            self.username = Some(username.to_string());
            self.sort_by = DEFAULT_SORT.to_string();
            self.filter_by = DEFAULT_FILTER.to_string();
        }
        success
    }

    pub async fn passwords_match(&self, password1: &str, password2: &str) -> bool {
        self.send(
            Method::GET,
            "/passwords-match",
            &[("password1", password1), ("password2", password2)],
        )
        .await
        .is_some_and(|body| body == "true")
    }

    pub async fn valid_username(&self, username: &str) -> bool {
        self.send(Method::GET, "/valid-username", &[("username", username)])
            .await
            .is_some_and(|body| body == "true")
    }

    pub async fn valid_password(&self, password: &str) -> bool {
        self.send(Method::GET, "/valid-password", &[("password", password)])
            .await
            .is_some_and(|body| body == "true")
    }

    /// The stored account record, for persisting a "remember me" login.
    pub async fn account_record(&self, username: &str, password: &str) -> Option<Account> {
        let body = self
            .send(
                Method::GET,
                "/get-account-json",
                &[("username", username), ("password", password)],
            )
            .await?;
        match serde_json::from_str(&body) {
            Ok(account) => Some(account),
            Err(err) => {
                tracing::warn!(%err, "server sent undecodable account record");
                None
            }
        }
    }

    /// The recipe rendered as a standalone HTML page.
    pub async fn recipe_html(&self, recipe_id: &str) -> Option<String> {
        self.send(Method::GET, "/recipe", &[("recipeID", recipe_id)])
            .await
    }

    /// Sends one request, returning the body on a successful response.
    ///
    /// Transport failures fire the unreachable callback; an error status
    /// from the server is just a failed call.
    async fn send(&self, method: Method, path: &str, params: &[(&str, &str)]) -> Option<String> {
        let mut url = match self.base_url.join(path) {
            Ok(url) => url,
            Err(err) => {
                tracing::error!(%err, path, "could not build request url");
                return None;
            }
        };
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        let response = match self.http.request(method, url).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%err, path, "server unreachable");
                (self.on_unreachable)();
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), path, "request failed");
            return None;
        }

        match response.text().await {
            Ok(body) => Some(body),
            Err(err) => {
                tracing::warn!(%err, path, "failed to read response body");
                (self.on_unreachable)();
                None
            }
        }
    }
}

/// Decodes one form-encoded component (`+` becomes a space).
fn decode_component(encoded: &str) -> String {
    form_urlencoded::parse(encoded.as_bytes())
        .next()
        .map(|(decoded, _)| decoded.into_owned())
        .unwrap_or_default()
}

/// Splits the id-list payload; a bare "." means no recipes.
fn parse_id_list(body: &str) -> Vec<String> {
    if body == "." {
        return Vec::new();
    }
    body.split(',').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn proxy(base_url: &str) -> (ClientProxy, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let proxy = ClientProxy::new(
            base_url,
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();
        (proxy, fired)
    }

    #[test]
    fn test_defaults_and_logout_reset() {
        let (mut proxy, _) = proxy("http://localhost:8100");
        assert_eq!(proxy.sort_by(), "most-recent");
        assert_eq!(proxy.filter_by(), "all");
        assert!(proxy.username().is_none());

        proxy.set_sort_by("a-z");
        proxy.set_filter_by("dinner");
        proxy.logout();
        assert_eq!(proxy.sort_by(), "most-recent");
        assert_eq!(proxy.filter_by(), "all");
        assert!(proxy.username().is_none());
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(ClientProxy::new("not a url", Box::new(|| {})).is_err());
    }

    #[test]
    fn test_decode_component() {
        assert_eq!(decode_component("Beat+eggs.%0ACook+gently."), "Beat eggs.\nCook gently.");
        assert_eq!(decode_component(""), "");
    }

    #[test]
    fn test_parse_id_list() {
        assert!(parse_id_list(".").is_empty());
        assert_eq!(parse_id_list("a,b"), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(parse_id_list("solo"), vec!["solo".to_string()]);
    }

    #[tokio::test]
    async fn test_unreachable_callback_fires_on_transport_failure() {
        // nothing listens on this port
        let (proxy, fired) = proxy("http://127.0.0.1:9");
        assert!(!proxy.status().await);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        assert!(proxy.get_recipe_title("any").await.is_none());
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
