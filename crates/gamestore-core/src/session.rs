use serde::{Deserialize, Serialize};

/// An authenticated admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
}

/// Login/admin gate state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn(User),
}

/// Which of the two admin-page panels is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelVisibility {
    pub login_visible: bool,
    pub admin_visible: bool,
}

/// What the caller has to do after a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State unchanged, nothing to start or stop.
    None,
    /// Entered `LoggedIn`: start the admin table subscription.
    Entered,
    /// Entered `LoggedOut`: stop the admin table subscription.
    Left,
    /// Still logged in, but as a different user.
    Switched,
}

impl SessionState {
    pub fn from_user(user: Option<User>) -> Self {
        match user {
            Some(u) => Self::LoggedIn(u),
            None => Self::LoggedOut,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, Self::LoggedIn(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::LoggedIn(u) => Some(u),
            Self::LoggedOut => None,
        }
    }

    /// Panel visibility is a pure function of the state, so explicit
    /// sign-in and provider notifications always agree.
    pub fn panels(&self) -> PanelVisibility {
        let logged_in = self.is_logged_in();
        PanelVisibility {
            login_visible: !logged_in,
            admin_visible: logged_in,
        }
    }

    /// Move to `next`, reporting what changed.
    pub fn apply(&mut self, next: SessionState) -> Transition {
        let transition = match (&*self, &next) {
            (Self::LoggedOut, Self::LoggedOut) => Transition::None,
            (Self::LoggedOut, Self::LoggedIn(_)) => Transition::Entered,
            (Self::LoggedIn(_), Self::LoggedOut) => Transition::Left,
            (Self::LoggedIn(a), Self::LoggedIn(b)) if a == b => Transition::None,
            (Self::LoggedIn(_), Self::LoggedIn(_)) => Transition::Switched,
        };
        if transition != Transition::None {
            tracing::debug!(?transition, "session state changed");
        }
        *self = next;
        transition
    }
}
