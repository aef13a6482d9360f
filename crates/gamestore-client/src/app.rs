use std::rc::Rc;

use crate::admin::AdminTable;
use crate::backend::{AuthClient, CollectionClient};
use crate::catalog::{CatalogView, PurchaseHandler};
use crate::contact::ContactHandler;
use crate::editor::RecordEditor;
use crate::session::SessionGate;
use crate::surface::Surface;

/// Handles every component is constructed with. There is no global backend.
#[derive(Clone)]
pub struct Context {
    pub games: Rc<dyn CollectionClient>,
    pub auth: Rc<dyn AuthClient>,
    pub surface: Rc<dyn Surface>,
    pub purchases: Rc<dyn PurchaseHandler>,
}

/// Which page sections were found in the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageFeatures {
    pub storefront: bool,
    pub contact: bool,
    pub admin: bool,
}

/// The components for one page, wired to a shared context.
pub struct App {
    pub features: PageFeatures,
    pub catalog: Rc<CatalogView>,
    pub contact: ContactHandler,
    pub admin: Rc<AdminTable>,
    pub gate: Rc<SessionGate>,
    pub editor: Rc<RecordEditor>,
}

impl App {
    pub fn new(ctx: Context, features: PageFeatures) -> Self {
        let admin = AdminTable::new(ctx.clone());
        Self {
            features,
            catalog: CatalogView::new(ctx.clone()),
            contact: ContactHandler::new(ctx.clone()),
            gate: SessionGate::new(ctx.clone(), Rc::clone(&admin)),
            admin,
            editor: Rc::new(RecordEditor::new(ctx)),
        }
    }

    /// Open the subscriptions the page needs.
    pub fn start(&self) {
        if self.features.storefront {
            self.catalog.start();
        }
        if self.features.admin {
            self.gate.start();
        }
    }
}
