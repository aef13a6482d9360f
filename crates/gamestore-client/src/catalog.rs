use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gamestore_core::snapshot::Snapshot;

use crate::app::Context;
use crate::backend::{SnapshotResult, Subscription};
use crate::diag;
use crate::surface::{CardView, Surface};

pub const PURCHASE_ACK: &str =
    "Thanks for your interest! Please contact admin via email or Telegram.";

/// What happens when a visitor presses "Buy" on a card.
pub trait PurchaseHandler {
    fn purchase_intent(&self, game: &CardView);
}

/// No checkout yet: acknowledge and point the visitor at the admin.
pub struct AcknowledgePurchase {
    surface: Rc<dyn Surface>,
}

impl AcknowledgePurchase {
    pub fn new(surface: Rc<dyn Surface>) -> Self {
        Self { surface }
    }
}

impl PurchaseHandler for AcknowledgePurchase {
    fn purchase_intent(&self, _game: &CardView) {
        self.surface.alert(PURCHASE_ACK);
    }
}

/// Public storefront: one card per game, rebuilt on every snapshot.
pub struct CatalogView {
    ctx: Context,
    cards: RefCell<Vec<CardView>>,
    subscription: RefCell<Option<Subscription>>,
}

impl CatalogView {
    pub fn new(ctx: Context) -> Rc<Self> {
        Rc::new(Self {
            ctx,
            cards: RefCell::new(Vec::new()),
            subscription: RefCell::new(None),
        })
    }

    /// Subscribe to the collection. Calling again keeps the live subscription.
    pub fn start(self: &Rc<Self>) {
        if self.subscription.borrow().is_some() {
            return;
        }
        let weak: Weak<Self> = Rc::downgrade(self);
        let subscription = self
            .ctx
            .games
            .subscribe(Box::new(move |result: SnapshotResult| {
                if let Some(view) = weak.upgrade() {
                    view.apply_snapshot(result);
                }
            }));
        *self.subscription.borrow_mut() = Some(subscription);
    }

    pub fn apply_snapshot(&self, result: SnapshotResult) {
        match result {
            Ok(snapshot) => self.render(&snapshot),
            Err(e) => {
                diag::console_warn!("catalog snapshot failed: {e}");
                self.ctx
                    .surface
                    .show_error(&format!("Could not load games: {e}"));
            },
        }
    }

    fn render(&self, snapshot: &Snapshot) {
        let (valid, invalid) = snapshot.partition_valid();
        let cards: Vec<CardView> = valid.into_iter().map(CardView::from_doc).collect();
        self.ctx.surface.render_cards(&cards);
        *self.cards.borrow_mut() = cards;

        if !invalid.is_empty() {
            let ids: Vec<&str> = invalid.iter().map(|r| r.id.as_str()).collect();
            self.ctx.surface.show_error(&format!(
                "Some games could not be displayed: {}",
                ids.join(", ")
            ));
        }
    }

    /// Handle a "Buy" press on the card with `id`.
    pub fn buy(&self, id: &str) {
        let card = self.cards.borrow().iter().find(|c| c.id == id).cloned();
        match card {
            Some(card) => self.ctx.purchases.purchase_intent(&card),
            None => diag::console_warn!("buy pressed for unknown game {id}"),
        }
    }

    pub fn cards(&self) -> Vec<CardView> {
        self.cards.borrow().clone()
    }
}
