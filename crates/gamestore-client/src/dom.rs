//! Browser [`Surface`] over the storefront and admin page markup.

use gamestore_core::session::PanelVisibility;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement};

use crate::diag;
use crate::surface::{CardView, EditorForm, RowView, Surface};

pub const GAMES_CONTAINER: &str = ".games";
pub const CONTACT_FORM: &str = "contact-form";
pub const LOGIN_FORM: &str = "login-form";
pub const LOGIN_SECTION: &str = "login-section";
pub const ADMIN_PANEL: &str = "admin-panel";
pub const GAME_FORM: &str = "game-form";
pub const TABLE_BODY: &str = "games-table-body";
pub const LOGOUT_BUTTON: &str = "logout-btn";
pub const EMAIL_INPUT: &str = "admin-email";
pub const PASSWORD_INPUT: &str = "admin-password";
pub const STATUS_LINE: &str = "status-message";
pub const FORM_STATUS: &str = "game-form-status";

const FIELD_ID: &str = "game-id";
const FIELD_TITLE: &str = "game-title";
const FIELD_IMAGE: &str = "game-image";
const FIELD_PRICE: &str = "game-price";
const FIELD_DESCRIPTION: &str = "game-description";

pub struct DomSurface {
    document: Document,
}

impl DomSurface {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    pub fn games_container(&self) -> Option<Element> {
        self.document.query_selector(GAMES_CONTAINER).ok().flatten()
    }

    /// Value of an `<input>` or `<textarea>`, empty if missing.
    pub fn field_value(&self, id: &str) -> String {
        let Some(el) = self.by_id(id) else {
            return String::new();
        };
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            return input.value();
        }
        el.dyn_ref::<HtmlTextAreaElement>()
            .map(|area| area.value())
            .unwrap_or_default()
    }

    fn set_field_value(&self, id: &str, value: &str) {
        let Some(el) = self.by_id(id) else {
            diag::console_warn!("missing form field #{id}");
            return;
        };
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        }
    }

    pub fn read_editor(&self) -> EditorForm {
        EditorForm {
            id: self.field_value(FIELD_ID),
            title: self.field_value(FIELD_TITLE),
            image: self.field_value(FIELD_IMAGE),
            price: self.field_value(FIELD_PRICE),
            description: self.field_value(FIELD_DESCRIPTION),
        }
    }

    fn reset_form(&self, id: &str) {
        if let Some(form) = self.by_id(id).and_then(|el| el.dyn_into::<HtmlFormElement>().ok()) {
            form.reset();
        }
    }

    fn set_display(&self, id: &str, visible: bool) {
        let Some(el) = self.by_id(id).and_then(|el| el.dyn_into::<HtmlElement>().ok()) else {
            return;
        };
        let value = if visible { "block" } else { "none" };
        if el.style().set_property("display", value).is_err() {
            diag::console_warn!("could not toggle #{id}");
        }
    }

    fn element(&self, tag: &str, class: &str, text: Option<&str>) -> Result<Element, JsValue> {
        let el = self.document.create_element(tag)?;
        if !class.is_empty() {
            el.set_class_name(class);
        }
        if let Some(text) = text {
            el.set_text_content(Some(text));
        }
        Ok(el)
    }

    fn button(&self, class: &str, label: &str, id: &str) -> Result<Element, JsValue> {
        let button = self.element("button", class, Some(label))?;
        button.set_attribute("type", "button")?;
        button.set_attribute("data-id", id)?;
        Ok(button)
    }

    fn build_card(&self, card: &CardView) -> Result<Element, JsValue> {
        let root = self.element("div", "game-card", None)?;
        let image = self.element("img", "", None)?;
        image.set_attribute("src", &card.image)?;
        image.set_attribute("alt", &card.title)?;
        root.append_child(&image)?;
        root.append_child(&self.element("h3", "", Some(&card.title))?)?;
        root.append_child(&self.element("p", "", Some(&card.description))?)?;
        root.append_child(&self.element("p", "price", Some(&card.price_label))?)?;
        root.append_child(&self.button("buy-btn", "Buy", &card.id)?)?;
        Ok(root)
    }

    fn build_row(&self, row: &RowView) -> Result<Element, JsValue> {
        let tr = self.element("tr", "", None)?;
        if let Some(problem) = &row.problem {
            tr.set_class_name("invalid");
            tr.set_attribute("title", problem)?;
        }
        tr.append_child(&self.element("td", "", Some(&row.title))?)?;
        tr.append_child(&self.element("td", "", Some(&row.price_label))?)?;
        let actions = self.element("td", "", None)?;
        actions.append_child(&self.button("edit-btn", "Edit", &row.id)?)?;
        actions.append_child(&self.button("delete-btn", "Delete", &row.id)?)?;
        tr.append_child(&actions)?;
        Ok(tr)
    }

    /// Build every child first, then swap them in, so a failure leaves the
    /// previous content in place.
    fn replace_children(
        &self,
        container: &Element,
        children: Result<Vec<Element>, JsValue>,
    ) -> Result<(), JsValue> {
        let children = children?;
        container.set_text_content(None);
        for child in &children {
            container.append_child(child)?;
        }
        Ok(())
    }
}

impl Surface for DomSurface {
    fn render_cards(&self, cards: &[CardView]) {
        let Some(container) = self.games_container() else {
            return;
        };
        let children = cards.iter().map(|c| self.build_card(c)).collect();
        if let Err(e) = self.replace_children(&container, children) {
            diag::console_warn!("rendering cards failed: {e:?}");
        }
    }

    fn render_rows(&self, rows: &[RowView]) {
        let Some(body) = self.by_id(TABLE_BODY) else {
            return;
        };
        let children = rows.iter().map(|r| self.build_row(r)).collect();
        if let Err(e) = self.replace_children(&body, children) {
            diag::console_warn!("rendering rows failed: {e:?}");
        }
    }

    fn set_panels(&self, panels: PanelVisibility) {
        self.set_display(LOGIN_SECTION, panels.login_visible);
        self.set_display(ADMIN_PANEL, panels.admin_visible);
    }

    fn fill_editor(&self, form: &EditorForm) {
        self.set_field_value(FIELD_ID, &form.id);
        self.set_field_value(FIELD_TITLE, &form.title);
        self.set_field_value(FIELD_IMAGE, &form.image);
        self.set_field_value(FIELD_PRICE, &form.price);
        self.set_field_value(FIELD_DESCRIPTION, &form.description);
    }

    fn reset_editor(&self) {
        self.reset_form(GAME_FORM);
        // Hidden inputs keep their value across form.reset()
        self.set_field_value(FIELD_ID, "");
    }

    fn reset_contact_form(&self) {
        self.reset_form(CONTACT_FORM);
    }

    fn set_pending(&self, status: Option<&str>) {
        if let Some(line) = self.by_id(FORM_STATUS) {
            line.set_text_content(status);
        }
        if let Ok(Some(button)) = self
            .document
            .query_selector(&format!("#{GAME_FORM} button[type=submit]"))
            && let Ok(button) = button.dyn_into::<web_sys::HtmlButtonElement>()
        {
            button.set_disabled(status.is_some());
        }
    }

    fn alert(&self, message: &str) {
        if let Some(window) = web_sys::window()
            && window.alert_with_message(message).is_err()
        {
            diag::console_warn!("alert failed: {message}");
        }
    }

    fn confirm(&self, message: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(message).ok())
            .unwrap_or(false)
    }

    /// Errors go to the status line rather than a modal, since stream
    /// reconnects can report repeatedly.
    fn show_error(&self, message: &str) {
        diag::console_warn!("{message}");
        match self.by_id(STATUS_LINE) {
            Some(line) => line.set_text_content(Some(message)),
            None => self.alert(message),
        }
    }
}
