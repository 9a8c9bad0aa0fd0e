use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::collection::Payload;
use crate::store::SqlRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioImage {
    pub image_url: String,
}

impl Payload for PortfolioImage {
    /// The stored file name is the last path segment of the public URL.
    fn object_key(&self) -> Option<String> {
        self.image_url
            .rsplit('/')
            .next()
            .map(|segment| segment.split(['?', '#']).next().unwrap_or(segment))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

impl SqlRow for PortfolioImage {
    const TABLE: &'static str = "portfolio_images";
    const COLUMNS: &'static [&'static str] = &["image_url"];

    fn from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            image_url: row.get(offset)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![Value::Text(self.image_url.clone())]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramReview {
    pub name: String,
    pub url: String,
}

impl InstagramReview {
    /// Trimmed name plus an absolute http(s) link.
    pub fn parse(name: &str, url: &str) -> Result<Self, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Review name is required".into());
        }
        if name.chars().count() > 200 {
            return Err("Review name must be 200 characters or less".into());
        }

        let parsed = url::Url::parse(url.trim()).map_err(|_| "Review link is not a valid URL".to_string())?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err("Review link must start with http:// or https://".into());
        }

        Ok(Self {
            name: name.to_string(),
            url: parsed.to_string(),
        })
    }
}

impl Payload for InstagramReview {}

impl SqlRow for InstagramReview {
    const TABLE: &'static str = "instagram_reviews";
    const COLUMNS: &'static [&'static str] = &["name", "url"];

    fn from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(offset)?,
            url: row.get(offset + 1)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![Value::Text(self.name.clone()), Value::Text(self.url.clone())]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub comment: String,
    pub status: crate::contact::ContactStatus,
    pub created_at: String,
    pub updated_at: String,
}
