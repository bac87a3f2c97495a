pub mod health;
pub mod page;
pub mod trade;

use crate::AppState;
use axum::Router;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(page::router())
        .merge(trade::router())
        .merge(health::router())
}
