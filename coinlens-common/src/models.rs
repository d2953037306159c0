//! Coin data model
//!
//! A coin is identified once, stored as a [`CoinRecord`], and always leaves the
//! service as a [`CoinView`]. The two image files belonging to a record are not
//! tracked in the database; they are located purely by naming convention from
//! the record id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// URL prefix under which stored images are served
pub const UPLOADS_URL_PREFIX: &str = "/uploads/";

const FRONT_IMAGE_SUFFIX: &str = "-front.jpg";
const BACK_IMAGE_SUFFIX: &str = "-back.jpg";

/// Filename of the front image for a coin id (`<id>-front.jpg`)
pub fn front_image_name(id: &str) -> String {
    format!("{}{}", id, FRONT_IMAGE_SUFFIX)
}

/// Filename of the back image for a coin id (`<id>-back.jpg`)
pub fn back_image_name(id: &str) -> String {
    format!("{}{}", id, BACK_IMAGE_SUFFIX)
}

/// Public URL of the front image, derived from the id and never stored
pub fn image_front_url(id: &str) -> String {
    format!("{}{}", UPLOADS_URL_PREFIX, front_image_name(id))
}

/// Public URL of the back image, derived from the id and never stored
pub fn image_back_url(id: &str) -> String {
    format!("{}{}", UPLOADS_URL_PREFIX, back_image_name(id))
}

/// Normalized answer of the recognition service
///
/// Missing fields (or explicit `null`) decode as empty strings. Unknown fields
/// are ignored. No semantic validation is performed: `year` is free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinAnalysis {
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub year: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub country: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Persisted coin row
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CoinRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub year: String,
    pub country: String,
    /// Assigned by the database at insert time
    pub created_at: DateTime<Utc>,
}

/// Public coin representation returned by every coin endpoint
///
/// The identify endpoint returns only the five core fields. List and update
/// responses also carry the derived image URLs and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub year: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_front_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_back_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl CoinView {
    /// View of a freshly identified coin (no URLs, no timestamp)
    pub fn from_analysis(id: String, analysis: CoinAnalysis) -> Self {
        Self {
            id,
            name: analysis.name,
            description: analysis.description,
            year: analysis.year,
            country: analysis.country,
            image_front_url: None,
            image_back_url: None,
            created_at: None,
        }
    }
}

impl From<CoinRecord> for CoinView {
    fn from(record: CoinRecord) -> Self {
        Self {
            image_front_url: Some(image_front_url(&record.id)),
            image_back_url: Some(image_back_url(&record.id)),
            created_at: Some(record.created_at),
            id: record.id,
            name: record.name,
            description: record.description,
            year: record.year,
            country: record.country,
        }
    }
}
