use std::cell::Cell;

use crate::app::Context;
use crate::backend::ClientError;
use crate::diag;
use crate::surface::EditorForm;

pub const SAVING: &str = "Saving…";

/// Add/edit form on the admin page. A blank hidden id means insert.
pub struct RecordEditor {
    ctx: Context,
    pending: Cell<bool>,
}

impl RecordEditor {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            pending: Cell::new(false),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Validate and save the form. The form is only reset once the backend
    /// confirms the write; on failure it is left as typed.
    pub async fn submit(&self, form: EditorForm) {
        if self.pending.get() {
            return;
        }
        let fields = match form.to_fields() {
            Ok(fields) => fields,
            Err(e) => {
                self.ctx
                    .surface
                    .show_error(&format!("Cannot save game: {e}"));
                return;
            },
        };

        self.pending.set(true);
        self.ctx.surface.set_pending(Some(SAVING));
        let result: Result<(), ClientError> = match form.target_id() {
            Some(id) => self.ctx.games.update(id, fields).await,
            None => self.ctx.games.insert(fields).await.map(|_| ()),
        };
        self.pending.set(false);
        self.ctx.surface.set_pending(None);

        match result {
            Ok(()) => self.ctx.surface.reset_editor(),
            Err(e) => {
                diag::console_warn!("save failed: {e}");
                self.ctx
                    .surface
                    .show_error(&format!("Could not save game: {e}"));
            },
        }
    }
}
