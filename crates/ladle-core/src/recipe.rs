//! The recipe record and its meal-type classification.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use chrono::{DateTime, FixedOffset, Local, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::LadleError;

/// Timestamp format shared by the database files and the wire protocol,
/// e.g. `2024-03-01T18:30:05+09:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// The meal classification a builder session must settle on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    /// All meal types, in the order the builder scans transcriptions.
    pub const ALL: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
        }
    }
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MealType {
    type Err = LadleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            other => Err(LadleError::invalid_request(format!(
                "unknown meal type '{other}'"
            ))),
        }
    }
}

/// A finished recipe.
///
/// The serde field names match the legacy database layout so existing
/// `database.json` files load unchanged. The image is stored as a hex
/// string in text contexts and as raw bytes in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(rename = "recipeID")]
    pub id: String,
    pub title: String,
    pub instructions: String,
    #[serde(rename = "dateCreated", with = "legacy_timestamp")]
    pub created_at: DateTime<FixedOffset>,
    #[serde(rename = "accountUsername")]
    pub owner: String,
    #[serde(rename = "imageHex", with = "hex::serde")]
    pub image: Vec<u8>,
    #[serde(rename = "mealType")]
    pub meal_type: MealType,
}

impl Recipe {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        instructions: impl Into<String>,
        owner: impl Into<String>,
        image: Vec<u8>,
        meal_type: MealType,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            instructions: instructions.into(),
            created_at: now(),
            owner: owner.into(),
            image,
            meal_type,
        }
    }

    /// Replaces the instructions and restamps the creation date, so the
    /// record sorts as freshly changed.
    pub fn set_instructions(&mut self, instructions: impl Into<String>) {
        self.created_at = now();
        self.instructions = instructions.into();
    }

    /// The creation timestamp in the shared fixed format.
    pub fn formatted_date(&self) -> String {
        self.created_at.format(TIMESTAMP_FORMAT).to_string()
    }

    /// The image as the hex string used on the wire and in the database.
    pub fn image_hex(&self) -> String {
        hex::encode(&self.image)
    }

    /// Renders the recipe as a standalone HTML page with the image inlined
    /// as a base64 data URL.
    pub fn to_html(&self) -> String {
        let image_base64 = BASE64_STANDARD.encode(&self.image);
        let instructions = escape_html(&self.instructions).replace('\n', "<br>");
        format!(
            "<html><body style=\"background-color: #e7ffe6; font-family: Arial;\">\
             <h1>{}</h1>\
             <img src=\"data:image/png;base64,{}\" alt=\"Recipe Image\">\
             <p>{}</p></body></html>",
            escape_html(&self.title),
            image_base64,
            instructions
        )
    }
}

/// The current local time with its UTC offset, at second precision.
pub fn now() -> DateTime<FixedOffset> {
    let now = Local::now().fixed_offset();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Escapes characters unsafe for HTML bodies as numeric entities,
/// along with everything outside ASCII.
fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if (c as u32) > 127 || matches!(c, '"' | '\'' | '<' | '>' | '&') {
            out.push_str(&format!("&#{};", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

mod legacy_timestamp {
    use super::{FixedOffset, TIMESTAMP_FORMAT};
    use chrono::DateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        value: &DateTime<FixedOffset>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(D::Error::custom)
    }
}
