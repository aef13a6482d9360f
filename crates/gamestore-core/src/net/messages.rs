use serde::{Deserialize, Serialize};

use crate::game::GameId;
use crate::session::User;

/// POST /auth/sign-in body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Successful sign-in: an opaque bearer token plus the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    pub user: User,
}

/// GET /auth/session response. `user` is null when the token is unknown
/// or expired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: Option<User>,
}

/// POST /games response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertResponse {
    pub id: GameId,
}

/// JSON body of every non-2xx API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
