//! Test doubles for driving the components without a browser.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gamestore_core::session::PanelVisibility;

use crate::app::Context;
use crate::backend::{AuthClient, CollectionClient};
use crate::catalog::AcknowledgePurchase;
use crate::memory::MemoryBackend;
use crate::surface::{CardView, EditorForm, RowView, Surface};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "secret";

/// Surface that remembers what was drawn and asked.
#[derive(Default)]
pub struct RecordingSurface {
    pub cards: RefCell<Vec<CardView>>,
    pub card_renders: Cell<usize>,
    pub rows: RefCell<Vec<RowView>>,
    pub row_renders: Cell<usize>,
    pub panels: Cell<Option<PanelVisibility>>,
    pub editor: RefCell<EditorForm>,
    pub editor_resets: Cell<usize>,
    pub contact_resets: Cell<usize>,
    pub pending: RefCell<Vec<Option<String>>>,
    pub alerts: RefCell<Vec<String>>,
    pub errors: RefCell<Vec<String>>,
    pub confirms: RefCell<Vec<String>>,
    pub confirm_answer: Cell<bool>,
}

impl RecordingSurface {
    pub fn card_titles(&self) -> Vec<String> {
        self.cards.borrow().iter().map(|c| c.title.clone()).collect()
    }

    pub fn last_error(&self) -> Option<String> {
        self.errors.borrow().last().cloned()
    }
}

impl Surface for RecordingSurface {
    fn render_cards(&self, cards: &[CardView]) {
        *self.cards.borrow_mut() = cards.to_vec();
        self.card_renders.set(self.card_renders.get() + 1);
    }

    fn render_rows(&self, rows: &[RowView]) {
        *self.rows.borrow_mut() = rows.to_vec();
        self.row_renders.set(self.row_renders.get() + 1);
    }

    fn set_panels(&self, panels: PanelVisibility) {
        self.panels.set(Some(panels));
    }

    fn fill_editor(&self, form: &EditorForm) {
        *self.editor.borrow_mut() = form.clone();
    }

    fn reset_editor(&self) {
        *self.editor.borrow_mut() = EditorForm::default();
        self.editor_resets.set(self.editor_resets.get() + 1);
    }

    fn reset_contact_form(&self) {
        self.contact_resets.set(self.contact_resets.get() + 1);
    }

    fn set_pending(&self, status: Option<&str>) {
        self.pending.borrow_mut().push(status.map(str::to_string));
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn confirm(&self, message: &str) -> bool {
        self.confirms.borrow_mut().push(message.to_string());
        self.confirm_answer.get()
    }

    fn show_error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }
}

/// A memory backend with one admin account plus a recording surface.
pub struct Harness {
    pub backend: MemoryBackend,
    pub surface: Rc<RecordingSurface>,
    pub ctx: Context,
}

impl Harness {
    pub fn new() -> Self {
        let backend = MemoryBackend::new().with_account(ADMIN_EMAIL, ADMIN_PASSWORD);
        let surface = Rc::new(RecordingSurface::default());
        let games: Rc<dyn CollectionClient> = Rc::new(backend.clone());
        let auth: Rc<dyn AuthClient> = Rc::new(backend.clone());
        let surface_dyn: Rc<dyn Surface> = Rc::clone(&surface) as Rc<dyn Surface>;
        let ctx = Context {
            games,
            auth,
            purchases: Rc::new(AcknowledgePurchase::new(Rc::clone(&surface_dyn))),
            surface: surface_dyn,
        };
        Self {
            backend,
            surface,
            ctx,
        }
    }
}
