//! The in-progress recipe builder session.
//!
//! A builder is created with a stable id (which becomes the recipe id), is
//! fed by voice through its two resettable fields, and once complete can
//! produce a finished [`Recipe`] any number of times. Regeneration reuses
//! the same id, so a regenerated recipe replaces rather than duplicates.

use uuid::Uuid;

use crate::error::{LadleError, Result};
use crate::generate::{GenerativeServices, Transcriber};
use crate::recipe::{MealType, Recipe};

/// Token budget for the recipe text generation call.
const MAX_TOKENS: u32 = 300;

/// Prompt template for the text generation service. The `Title:` marker is
/// what [`parse_generated`] splits on.
const PROMPT_TEMPLATE: &str = "Please provide a recipe with a title denoted with \"Title:\", \
     a new line, and then a detailed recipe. \
     Create a {meal_type} recipe with the following ingredients: {ingredients}";

/// Meal-type tokens in the order transcriptions are scanned against them.
const MEAL_TOKENS: [&str; 3] = ["breakfast", "lunch", "dinner"];

/// The two voice-specified slots of a builder session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementName {
    MealType,
    Ingredients,
}

impl std::str::FromStr for ElementName {
    type Err = LadleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mealType" => Ok(ElementName::MealType),
            "ingredients" => Ok(ElementName::Ingredients),
            other => Err(LadleError::invalid_request(format!(
                "unknown builder element '{other}'"
            ))),
        }
    }
}

/// A value slot that is either unset or holds one string, settable by
/// transcribing an audio payload and clearable independently.
///
/// A field constructed with an allowed-token list only accepts
/// transcriptions containing one of the tokens; the scan is
/// case-insensitive and by substring, so "BREAKFAST!!!" settles on
/// "breakfast". Substring matching is deliberate: transcriptions routinely
/// carry trailing words and punctuation.
#[derive(Debug, Clone)]
pub struct ResettableField {
    value: Option<String>,
    allowed: Option<&'static [&'static str]>,
}

impl ResettableField {
    fn constrained(allowed: &'static [&'static str]) -> Self {
        Self {
            value: None,
            allowed: Some(allowed),
        }
    }

    fn free_text() -> Self {
        Self {
            value: None,
            allowed: None,
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Clears the field back to unset.
    pub fn reset(&mut self) {
        self.value = None;
    }

    /// Transcribes the audio payload and tries to settle the field.
    ///
    /// Returns the stored value on success and `None` when a constrained
    /// field did not hear any allowed token (the field is left as it was).
    /// Transcription failures propagate unmodified.
    pub async fn specify(
        &mut self,
        transcriber: &dyn Transcriber,
        audio: &[u8],
    ) -> Result<Option<String>> {
        let transcription = transcriber.transcribe(audio).await?;
        if let Some(allowed) = self.allowed {
            let lowered = transcription.to_lowercase();
            for token in allowed {
                if lowered.contains(token) {
                    self.value = Some((*token).to_string());
                    return Ok(Some((*token).to_string()));
                }
            }
            return Ok(None);
        }
        self.value = Some(transcription.clone());
        Ok(Some(transcription))
    }
}

/// Builds one recipe through the voice workflow.
pub struct RecipeBuilder {
    id: String,
    meal_type: ResettableField,
    ingredients: ResettableField,
    services: GenerativeServices,
}

impl RecipeBuilder {
    /// Creates a fresh builder with a newly minted recipe id.
    pub fn new(services: GenerativeServices) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            meal_type: ResettableField::constrained(&MEAL_TOKENS),
            ingredients: ResettableField::free_text(),
            services,
        }
    }

    /// The stable id every recipe produced by this session will carry.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn field(&self, element: ElementName) -> &ResettableField {
        match element {
            ElementName::MealType => &self.meal_type,
            ElementName::Ingredients => &self.ingredients,
        }
    }

    /// Clears the named field.
    pub fn reset(&mut self, element: ElementName) {
        match element {
            ElementName::MealType => self.meal_type.reset(),
            ElementName::Ingredients => self.ingredients.reset(),
        }
    }

    /// Transcribes the audio payload into the named field.
    pub async fn specify(&mut self, element: ElementName, audio: &[u8]) -> Result<Option<String>> {
        let transcriber = self.services.transcriber.clone();
        match element {
            ElementName::MealType => self.meal_type.specify(transcriber.as_ref(), audio).await,
            ElementName::Ingredients => self.ingredients.specify(transcriber.as_ref(), audio).await,
        }
    }

    /// True once both fields are set and a recipe can be produced.
    pub fn is_completed(&self) -> bool {
        self.meal_type.is_set() && self.ingredients.is_set()
    }

    /// Generates a finished recipe for the given owner.
    ///
    /// Callers are expected to have checked [`is_completed`](Self::is_completed)
    /// first. The generated text must contain the `Title:` marker; a response
    /// without one fails the call. Calling this again on the same session
    /// produces a recipe with the same id but freshly generated content.
    pub async fn produce_recipe(&self, owner: &str) -> Result<Recipe> {
        let meal_token = self
            .meal_type
            .value()
            .ok_or_else(|| LadleError::invalid_request("meal type not specified"))?;
        let ingredients = self
            .ingredients
            .value()
            .ok_or_else(|| LadleError::invalid_request("ingredients not specified"))?;

        let prompt = PROMPT_TEMPLATE
            .replace("{meal_type}", meal_token)
            .replace("{ingredients}", ingredients);
        let response = self.services.text.generate_text(&prompt, MAX_TOKENS).await?;
        let (title, instructions) = parse_generated(&response)?;

        let image = self.services.image.generate_image(&title).await?;
        let meal_type: MealType = meal_token.parse()?;

        Ok(Recipe::new(
            self.id.clone(),
            title,
            instructions,
            owner,
            image,
            meal_type,
        ))
    }
}

/// Splits a generated response into title and instructions.
///
/// Everything before the literal `Title:` marker is discarded; the first
/// line after it is the title, the remaining lines are the instructions.
fn parse_generated(response: &str) -> Result<(String, String)> {
    let (_, after_marker) = response.split_once("Title:").ok_or_else(|| {
        LadleError::generation("generated text is missing the 'Title:' marker")
    })?;
    let mut lines = after_marker.lines();
    let title = lines.next().unwrap_or("").trim().to_string();
    let instructions = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    Ok((title, instructions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{ImageGenerator, TextGenerator, Transcriber};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedTranscriber(&'static str);

    #[async_trait]
    impl Transcriber for FixedTranscriber {
        async fn transcribe(&self, _audio: &[u8]) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingTranscriber;

    #[async_trait]
    impl Transcriber for FailingTranscriber {
        async fn transcribe(&self, _audio: &[u8]) -> Result<String> {
            Err(LadleError::transcription("microphone ate the tape"))
        }
    }

    /// Returns a numbered response each call so regeneration is observable.
    struct CountingGenerator(AtomicUsize);

    #[async_trait]
    impl TextGenerator for CountingGenerator {
        async fn generate_text(&self, prompt: &str, max_tokens: u32) -> Result<String> {
            assert!(max_tokens > 0);
            assert!(prompt.contains("breakfast"));
            let n = self.0.fetch_add(1, Ordering::SeqCst);
            Ok(format!(
                "Title: Omelette v{n}\nBeat the eggs.\nCook them."
            ))
        }
    }

    struct FixedImage;

    #[async_trait]
    impl ImageGenerator for FixedImage {
        async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
            Ok(prompt.as_bytes().to_vec())
        }
    }

    fn services(transcriber: Arc<dyn Transcriber>) -> GenerativeServices {
        GenerativeServices::new(
            Arc::new(CountingGenerator(AtomicUsize::new(0))),
            transcriber,
            Arc::new(FixedImage),
        )
    }

    #[tokio::test]
    async fn test_meal_type_matches_despite_shouting() {
        let mut builder = RecipeBuilder::new(services(Arc::new(FixedTranscriber("BREAKFAST!!!"))));
        let value = builder
            .specify(ElementName::MealType, b"audio")
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some("breakfast"));
        assert_eq!(builder.field(ElementName::MealType).value(), Some("breakfast"));
    }

    #[tokio::test]
    async fn test_ingredients_stored_verbatim() {
        let text = "I have eggs, cheese, and bread.";
        let mut builder = RecipeBuilder::new(services(Arc::new(FixedTranscriber(
            "I have eggs, cheese, and bread.",
        ))));
        let value = builder
            .specify(ElementName::Ingredients, b"audio")
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some(text));
    }

    #[tokio::test]
    async fn test_unmatched_meal_type_leaves_field_unset() {
        let mut builder =
            RecipeBuilder::new(services(Arc::new(FixedTranscriber("second supper please"))));
        let value = builder
            .specify(ElementName::MealType, b"audio")
            .await
            .unwrap();
        assert!(value.is_none());
        assert!(!builder.field(ElementName::MealType).is_set());
    }

    #[tokio::test]
    async fn test_transcription_failure_propagates() {
        let mut builder = RecipeBuilder::new(services(Arc::new(FailingTranscriber)));
        let err = builder
            .specify(ElementName::Ingredients, b"audio")
            .await
            .unwrap_err();
        assert!(err.is_service_failure());
        assert!(!builder.field(ElementName::Ingredients).is_set());
    }

    #[tokio::test]
    async fn test_reset_clears_field() {
        let mut builder = RecipeBuilder::new(services(Arc::new(FixedTranscriber("lunch"))));
        builder.specify(ElementName::MealType, b"audio").await.unwrap();
        assert!(builder.field(ElementName::MealType).is_set());
        builder.reset(ElementName::MealType);
        assert!(!builder.field(ElementName::MealType).is_set());
    }

    #[tokio::test]
    async fn test_completed_only_when_both_fields_set() {
        let mut builder = RecipeBuilder::new(services(Arc::new(FixedTranscriber("breakfast"))));
        assert!(!builder.is_completed());
        builder.specify(ElementName::MealType, b"audio").await.unwrap();
        assert!(!builder.is_completed());
        builder
            .specify(ElementName::Ingredients, b"audio")
            .await
            .unwrap();
        assert!(builder.is_completed());
    }

    #[tokio::test]
    async fn test_regeneration_keeps_id_changes_content() {
        let mut builder = RecipeBuilder::new(services(Arc::new(FixedTranscriber("breakfast"))));
        builder.specify(ElementName::MealType, b"audio").await.unwrap();
        builder
            .specify(ElementName::Ingredients, b"audio")
            .await
            .unwrap();

        let first = builder.produce_recipe("alice").await.unwrap();
        let second = builder.produce_recipe("alice").await.unwrap();

        assert_eq!(first.id, builder.id());
        assert_eq!(first.id, second.id);
        assert_ne!(first.title, second.title);
        assert_eq!(first.owner, "alice");
        assert_eq!(first.meal_type, MealType::Breakfast);
        // image prompt is the title, so the image follows the content
        assert_eq!(first.image, first.title.as_bytes());
    }

    #[tokio::test]
    async fn test_produce_requires_completed_session() {
        let builder = RecipeBuilder::new(services(Arc::new(FixedTranscriber("breakfast"))));
        let err = builder.produce_recipe("alice").await.unwrap_err();
        assert!(matches!(err, LadleError::InvalidRequest(_)));
    }

    #[test]
    fn test_parse_generated_splits_title_and_body() {
        let (title, body) =
            parse_generated("Title:  Shakshuka \nSimmer tomatoes.\nAdd eggs.").unwrap();
        assert_eq!(title, "Shakshuka");
        assert_eq!(body, "Simmer tomatoes.\nAdd eggs.");
    }

    #[test]
    fn test_parse_generated_ignores_preamble() {
        let (title, body) = parse_generated("Sure!\nTitle: Toast\nButter the bread.").unwrap();
        assert_eq!(title, "Toast");
        assert_eq!(body, "Butter the bread.");
    }

    #[test]
    fn test_parse_generated_missing_marker_is_error() {
        let err = parse_generated("here is a recipe with no marker").unwrap_err();
        assert!(matches!(err, LadleError::Generation(_)));
    }

    #[test]
    fn test_element_name_parsing() {
        assert_eq!("mealType".parse::<ElementName>().unwrap(), ElementName::MealType);
        assert_eq!(
            "ingredients".parse::<ElementName>().unwrap(),
            ElementName::Ingredients
        );
        assert!("garnish".parse::<ElementName>().is_err());
    }
}
