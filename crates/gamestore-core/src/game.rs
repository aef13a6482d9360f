use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum title length accepted by the catalog.
pub const MAX_TITLE_LEN: usize = 256;
/// Maximum image URL length accepted by the catalog.
pub const MAX_IMAGE_LEN: usize = 2048;
/// Maximum description length accepted by the catalog.
pub const MAX_DESCRIPTION_LEN: usize = 4096;

/// Backend-assigned document identifier.
pub type GameId = String;

/// The four mutable fields of a catalog entry. Inserts and updates always
/// carry exactly these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameFields {
    pub title: String,
    pub image: String,
    pub price: f64,
    pub description: String,
}

/// A catalog entry as delivered by the backend: id plus fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDoc {
    pub id: GameId,
    #[serde(flatten)]
    pub fields: GameFields,
}

/// A field-level problem with a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title is required")]
    MissingTitle,
    #[error("title exceeds {MAX_TITLE_LEN} chars")]
    TitleTooLong,
    #[error("image URL exceeds {MAX_IMAGE_LEN} chars")]
    ImageTooLong,
    #[error("description exceeds {MAX_DESCRIPTION_LEN} chars")]
    DescriptionTooLong,
    #[error("price is required")]
    MissingPrice,
    #[error("price must be a number, got {0:?}")]
    PriceNotANumber(String),
    #[error("price must be a non-negative amount")]
    NegativePrice,
}

impl GameFields {
    /// Check every field, returning the first problem found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::TitleTooLong);
        }
        if self.image.chars().count() > MAX_IMAGE_LEN {
            return Err(ValidationError::ImageTooLong);
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::DescriptionTooLong);
        }
        if !self.price.is_finite() {
            return Err(ValidationError::PriceNotANumber(self.price.to_string()));
        }
        if self.price < 0.0 {
            return Err(ValidationError::NegativePrice);
        }
        Ok(())
    }

    /// Price with a dollar sign and exactly two decimals.
    pub fn price_label(&self) -> String {
        format_price(self.price)
    }
}

/// Format an amount for display, e.g. `9.5` -> `$9.50`.
pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

/// Parse the raw price input from a form field.
pub fn parse_price(raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingPrice);
    }
    let price: f64 = trimmed
        .parse()
        .map_err(|_| ValidationError::PriceNotANumber(trimmed.to_string()))?;
    if !price.is_finite() {
        return Err(ValidationError::PriceNotANumber(trimmed.to_string()));
    }
    if price < 0.0 {
        return Err(ValidationError::NegativePrice);
    }
    Ok(price)
}
