use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::app::Context;
use crate::backend::{SnapshotResult, Subscription};
use crate::diag;
use crate::surface::{EditorForm, RowView};

pub const DELETE_CONFIRM: &str = "Are you sure you want to delete this game?";

/// Admin table of every stored game, live while an admin is signed in.
pub struct AdminTable {
    ctx: Context,
    rows: RefCell<Vec<RowView>>,
    subscription: RefCell<Option<Subscription>>,
}

impl AdminTable {
    pub fn new(ctx: Context) -> Rc<Self> {
        Rc::new(Self {
            ctx,
            rows: RefCell::new(Vec::new()),
            subscription: RefCell::new(None),
        })
    }

    pub fn is_live(&self) -> bool {
        self.subscription.borrow().is_some()
    }

    /// Start syncing. At most one subscription is ever live.
    pub fn start(self: &Rc<Self>) {
        if self.is_live() {
            return;
        }
        let weak: Weak<Self> = Rc::downgrade(self);
        let subscription = self
            .ctx
            .games
            .subscribe(Box::new(move |result: SnapshotResult| {
                if let Some(table) = weak.upgrade() {
                    table.apply_snapshot(result);
                }
            }));
        *self.subscription.borrow_mut() = Some(subscription);
    }

    /// Cancel the subscription and clear the table.
    pub fn stop(&self) {
        let subscription = self.subscription.borrow_mut().take();
        if subscription.is_none() {
            return;
        }
        drop(subscription);
        self.rows.borrow_mut().clear();
        self.ctx.surface.render_rows(&[]);
    }

    pub fn apply_snapshot(&self, result: SnapshotResult) {
        match result {
            Ok(snapshot) => {
                let rows: Vec<RowView> = snapshot.games.iter().map(RowView::from_doc).collect();
                self.ctx.surface.render_rows(&rows);
                *self.rows.borrow_mut() = rows;
            },
            Err(e) => {
                diag::console_warn!("admin snapshot failed: {e}");
                self.ctx
                    .surface
                    .show_error(&format!("Could not load games: {e}"));
            },
        }
    }

    pub fn rows(&self) -> Vec<RowView> {
        self.rows.borrow().clone()
    }

    /// Load a record into the editor for update.
    pub async fn edit(&self, id: &str) {
        match self.ctx.games.get(id).await {
            Ok(Some(doc)) => self.ctx.surface.fill_editor(&EditorForm::from_doc(&doc)),
            Ok(None) => self
                .ctx
                .surface
                .show_error("That game no longer exists."),
            Err(e) => self
                .ctx
                .surface
                .show_error(&format!("Could not load game: {e}")),
        }
    }

    /// Delete a record after the admin confirms.
    pub async fn delete(&self, id: &str) {
        if !self.ctx.surface.confirm(DELETE_CONFIRM) {
            return;
        }
        if let Err(e) = self.ctx.games.delete(id).await {
            diag::console_warn!("delete {id} failed: {e}");
            self.ctx
                .surface
                .show_error(&format!("Could not delete game: {e}"));
        }
    }
}
