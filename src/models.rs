use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One catalog entry as received from the FreeToGame API.
///
/// Every field is optional and decoded leniently: strings stay strings,
/// numbers and booleans are rendered to their string form, `null`/absent
/// becomes `None`. Downstream code never inspects JSON types again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGameRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub platform: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub publisher: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub developer: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub short_description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub game_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub thumbnail: Option<String>,
}

impl RawGameRecord {
    /// Convenience constructor used by tests and fixtures.
    pub fn new(id: impl Into<String>, genre: Option<&str>) -> Self {
        Self {
            id: Some(id.into()),
            genre: genre.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// Persisted storefront product (Prisma `Product` model).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    #[sqlx(rename = "originalPrice")]
    #[serde(rename = "originalPrice")]
    pub original_price: Option<i64>,
    pub image: Option<String>,
    pub category: String,
    pub rating: f64,
    #[sqlx(rename = "isNew")]
    #[serde(rename = "isNew")]
    pub is_new: bool,
    #[sqlx(rename = "createdAt")]
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "updatedAt")]
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// New product with storefront defaults (free, unrated, not flagged new).
    pub fn new(id: impl Into<String>, title: impl Into<String>, category: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            price: 0,
            original_price: None,
            image: None,
            category: category.into(),
            rating: 0.0,
            is_new: false,
            created_at: now,
            updated_at: now,
        }
    }
}
