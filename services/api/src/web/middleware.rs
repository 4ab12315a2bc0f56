//! services/api/src/web/middleware.rs
//!
//! Session middleware for protecting routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::web::rest::{reject, HandlerError};
use crate::web::state::AppState;

/// Middleware that requires a logged-in user on this device.
///
/// If there is one, the `User` is inserted into request extensions for handlers
/// to use. Otherwise the request is answered with 401 Unauthorized.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, HandlerError> {
    let language = state.context.language().await;
    let user = state
        .context
        .require_user()
        .await
        .map_err(|e| reject(e, language))?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
