use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gamestore_core::session::{SessionState, Transition, User};

use crate::admin::AdminTable;
use crate::app::Context;
use crate::backend::Subscription;
use crate::diag;

/// Login/admin panel switch on the admin page.
///
/// Explicit sign-in/sign-out results and provider notifications both go
/// through [`SessionGate::apply`], so the panels always match the last
/// known auth state.
pub struct SessionGate {
    ctx: Context,
    admin: Rc<AdminTable>,
    state: RefCell<SessionState>,
    observer: RefCell<Option<Subscription>>,
}

impl SessionGate {
    pub fn new(ctx: Context, admin: Rc<AdminTable>) -> Rc<Self> {
        Rc::new(Self {
            ctx,
            admin,
            state: RefCell::new(SessionState::LoggedOut),
            observer: RefCell::new(None),
        })
    }

    /// Show the logged-out panels and follow the provider's auth state.
    pub fn start(self: &Rc<Self>) {
        if self.observer.borrow().is_some() {
            return;
        }
        let panels = self.state.borrow().panels();
        self.ctx.surface.set_panels(panels);

        let weak: Weak<Self> = Rc::downgrade(self);
        let observer = self
            .ctx
            .auth
            .observe(Box::new(move |user: Option<User>| {
                if let Some(gate) = weak.upgrade() {
                    gate.apply(SessionState::from_user(user));
                }
            }));
        *self.observer.borrow_mut() = Some(observer);
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Move to `next`, update the panels and start or stop the admin table.
    pub fn apply(&self, next: SessionState) {
        let (transition, panels) = {
            let mut state = self.state.borrow_mut();
            let transition = state.apply(next);
            (transition, state.panels())
        };
        self.ctx.surface.set_panels(panels);
        match transition {
            Transition::Entered => self.admin.start(),
            Transition::Left => self.admin.stop(),
            Transition::None | Transition::Switched => {},
        }
    }

    pub async fn sign_in(&self, email: String, password: String) {
        match self.ctx.auth.sign_in(&email, &password).await {
            Ok(user) => self.apply(SessionState::LoggedIn(user)),
            Err(e) => {
                diag::console_warn!("sign-in failed: {e}");
                self.ctx.surface.alert(&format!("Login failed: {e}"));
            },
        }
    }

    /// Always ends in `LoggedOut`; a provider failure is only reported.
    pub async fn sign_out(&self) {
        let result = self.ctx.auth.sign_out().await;
        self.apply(SessionState::LoggedOut);
        if let Err(e) = result {
            self.ctx
                .surface
                .show_error(&format!("Sign-out did not complete: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ClientError;
    use crate::editor::RecordEditor;
    use crate::surface::EditorForm;
    use crate::testing::{ADMIN_EMAIL, ADMIN_PASSWORD, Harness};
    use futures::executor::block_on;
    use gamestore_core::session::PanelVisibility;
    use gamestore_core::test_helpers::{make_fields, make_user};

    const LOGIN: PanelVisibility = PanelVisibility {
        login_visible: true,
        admin_visible: false,
    };
    const ADMIN: PanelVisibility = PanelVisibility {
        login_visible: false,
        admin_visible: true,
    };

    fn gate(h: &Harness) -> (Rc<SessionGate>, Rc<AdminTable>) {
        let admin = AdminTable::new(h.ctx.clone());
        let gate = SessionGate::new(h.ctx.clone(), Rc::clone(&admin));
        gate.start();
        (gate, admin)
    }

    #[test]
    fn starts_on_login_panel() {
        let h = Harness::new();
        let (gate, admin) = gate(&h);
        assert_eq!(h.surface.panels.get(), Some(LOGIN));
        assert_eq!(gate.state(), SessionState::LoggedOut);
        assert!(!admin.is_live());
    }

    #[test]
    fn sign_in_shows_admin_and_loads_table() {
        let h = Harness::new();
        h.backend.seed(make_fields("Chess", 1.0));
        let (gate, admin) = gate(&h);

        block_on(gate.sign_in(ADMIN_EMAIL.into(), ADMIN_PASSWORD.into()));

        assert_eq!(h.surface.panels.get(), Some(ADMIN));
        assert!(admin.is_live());
        assert_eq!(h.backend.snapshot_subscribers(), 1);
        assert_eq!(h.surface.rows.borrow().len(), 1);
    }

    #[test]
    fn bad_credentials_keep_login_and_load_nothing() {
        let h = Harness::new();
        let (gate, admin) = gate(&h);

        block_on(gate.sign_in(ADMIN_EMAIL.into(), "wrong".into()));

        assert_eq!(h.surface.panels.get(), Some(LOGIN));
        assert_eq!(
            *h.surface.alerts.borrow(),
            vec!["Login failed: invalid email or password".to_string()]
        );
        assert!(!admin.is_live());
        assert_eq!(h.surface.row_renders.get(), 0);
    }

    #[test]
    fn sign_out_returns_to_login_and_cancels_sync() {
        let h = Harness::new();
        let (gate, admin) = gate(&h);
        block_on(gate.sign_in(ADMIN_EMAIL.into(), ADMIN_PASSWORD.into()));

        block_on(gate.sign_out());

        assert_eq!(h.surface.panels.get(), Some(LOGIN));
        assert!(!admin.is_live());
        assert_eq!(h.backend.snapshot_subscribers(), 0);
    }

    #[test]
    fn sign_out_failure_still_logs_out() {
        let h = Harness::new();
        let (gate, _admin) = gate(&h);
        block_on(gate.sign_in(ADMIN_EMAIL.into(), ADMIN_PASSWORD.into()));
        h.backend
            .fail_next(ClientError::Network("offline".into()));

        block_on(gate.sign_out());

        assert_eq!(gate.state(), SessionState::LoggedOut);
        assert_eq!(h.surface.panels.get(), Some(LOGIN));
        assert!(h.surface.last_error().unwrap().contains("offline"));
    }

    #[test]
    fn provider_expiry_converges_to_login() {
        let h = Harness::new();
        let (gate, admin) = gate(&h);
        block_on(gate.sign_in(ADMIN_EMAIL.into(), ADMIN_PASSWORD.into()));

        h.backend.expire_session();

        assert_eq!(gate.state(), SessionState::LoggedOut);
        assert_eq!(h.surface.panels.get(), Some(LOGIN));
        assert!(!admin.is_live());
    }

    #[test]
    fn rejected_save_converges_to_login() {
        let h = Harness::new();
        let (gate, admin) = gate(&h);
        block_on(gate.sign_in(ADMIN_EMAIL.into(), ADMIN_PASSWORD.into()));
        let editor = RecordEditor::new(h.ctx.clone());
        h.backend
            .fail_next(ClientError::Unauthorized("session expired".into()));

        block_on(editor.submit(EditorForm {
            title: "Chess".into(),
            price: "1".into(),
            ..EditorForm::default()
        }));

        assert_eq!(gate.state(), SessionState::LoggedOut);
        assert_eq!(h.surface.panels.get(), Some(LOGIN));
        assert!(!admin.is_live());
        assert_eq!(h.backend.snapshot_subscribers(), 0);
        assert!(h.backend.snapshot().is_empty());
    }

    #[test]
    fn repeated_sign_in_keeps_one_subscription() {
        let h = Harness::new();
        let (gate, _admin) = gate(&h);
        block_on(gate.sign_in(ADMIN_EMAIL.into(), ADMIN_PASSWORD.into()));
        gate.apply(SessionState::LoggedIn(make_user("other@example.com")));
        block_on(gate.sign_in(ADMIN_EMAIL.into(), ADMIN_PASSWORD.into()));

        assert_eq!(h.backend.snapshot_subscribers(), 1);
    }
}
