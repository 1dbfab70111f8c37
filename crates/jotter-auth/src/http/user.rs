//! Current-user handler.

use axum::Json;

use crate::extractors::CurrentUser;
use crate::storage::User;

/// Handler for `GET /auth/user`.
///
/// Returns the caller's user record. The guard rejects unauthenticated
/// callers with 401 before this body runs.
pub async fn current_user_handler(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
