//! Rendering seam between the view logic and the page.
//!
//! Components build plain view models and hand them to a [`Surface`]; the
//! browser implementation lives in `dom.rs`, tests use a recording one.

use gamestore_core::game::{GameDoc, GameFields, ValidationError, parse_price};
use gamestore_core::session::PanelVisibility;

/// One storefront card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub id: String,
    pub title: String,
    pub image: String,
    pub description: String,
    pub price_label: String,
}

impl CardView {
    pub fn from_doc(doc: &GameDoc) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.fields.title.clone(),
            image: doc.fields.image.clone(),
            description: doc.fields.description.clone(),
            price_label: doc.fields.price_label(),
        }
    }
}

/// One admin table row. `problem` is set when the stored record fails
/// validation, so the admin can still find and fix it.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: String,
    pub title: String,
    pub price_label: String,
    pub problem: Option<String>,
}

impl RowView {
    pub fn from_doc(doc: &GameDoc) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.fields.title.clone(),
            price_label: doc.fields.price_label(),
            problem: doc.fields.validate().err().map(|e| e.to_string()),
        }
    }
}

/// Raw editor form values. An empty `id` means insert mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorForm {
    pub id: String,
    pub title: String,
    pub image: String,
    pub price: String,
    pub description: String,
}

impl EditorForm {
    /// Populate the form from a stored record (update mode).
    pub fn from_doc(doc: &GameDoc) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.fields.title.clone(),
            image: doc.fields.image.clone(),
            price: doc.fields.price.to_string(),
            description: doc.fields.description.clone(),
        }
    }

    /// Target record id, or `None` in insert mode.
    pub fn target_id(&self) -> Option<&str> {
        let id = self.id.trim();
        (!id.is_empty()).then_some(id)
    }

    /// Parse and validate the form into the fields sent to the backend.
    pub fn to_fields(&self) -> Result<GameFields, ValidationError> {
        let fields = GameFields {
            title: self.title.trim().to_string(),
            image: self.image.trim().to_string(),
            price: parse_price(&self.price)?,
            description: self.description.trim().to_string(),
        };
        fields.validate()?;
        Ok(fields)
    }
}

/// Everything the components need from the page.
pub trait Surface {
    /// Replace the storefront container content with `cards`.
    fn render_cards(&self, cards: &[CardView]);
    /// Replace the admin table body with `rows`.
    fn render_rows(&self, rows: &[RowView]);
    fn set_panels(&self, panels: PanelVisibility);
    fn fill_editor(&self, form: &EditorForm);
    /// Clear the editor form, including the hidden id.
    fn reset_editor(&self);
    fn reset_contact_form(&self);
    /// Show or clear the editor's pending status line.
    fn set_pending(&self, status: Option<&str>);
    fn alert(&self, message: &str);
    fn confirm(&self, message: &str) -> bool;
    fn show_error(&self, message: &str);
}
