//! # Gatewayエンドポイント
//!
//! - `GET /api/generateFileLink` — フレンドリーURL発行
//! - `GET /api/fileProxy?originalUrl=...` — 署名付きURLの検証とリダイレクト

pub mod file_proxy;
pub mod generate_link;
pub mod invalid_link;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::sync::Arc;

use saslink_core::{FILE_PROXY_ROUTE, GENERATE_LINK_ROUTE};

use crate::config::GatewayState;

pub use file_proxy::handle_file_proxy;
pub use generate_link::handle_generate_link;

/// axumルーターを構築する。
pub fn router(state: Arc<GatewayState>) -> axum::Router {
    axum::Router::new()
        .route(GENERATE_LINK_ROUTE, axum::routing::get(handle_generate_link))
        .route(FILE_PROXY_ROUTE, axum::routing::get(handle_file_proxy))
        .with_state(state)
}
