//! # GET /api/fileProxy
//!
//! フレンドリーURLに埋め込まれた署名付きURLを検証し、有効ならリダイレクトする。
//!
//! ## 検証順序
//! 1. `originalUrl` の抽出と絶対URLとしての解釈
//! 2. 許可ストレージホストとの照合（オープンリダイレクト対策）
//! 3. `se`（有効期限）の確認
//!
//! どこで拒否しても同じ無効リンクページを返し、どの検査で落ちたかは応答に出さない。
//! 再署名は行わず、発行済みの署名をそのまま転送する。

use std::sync::Arc;

use axum::extract::{RawQuery, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use saslink_core::{extract_original_url, validate_signed_link};
use saslink_types::LinkVerdict;

use super::invalid_link::invalid_link_page;
use crate::config::GatewayState;

/// GET /api/fileProxy — 署名付きURLへのリダイレクト。
///
/// 成功時は抽出した文字列を変更せず `Location` に載せて302を返す。
/// 失敗時は200で無効リンクページを返す。
pub async fn handle_file_proxy(
    State(state): State<Arc<GatewayState>>,
    RawQuery(query): RawQuery,
) -> Response {
    let candidate = extract_original_url(query.as_deref());

    match validate_signed_link(candidate.as_deref(), &state.config.storage_host, Utc::now()) {
        LinkVerdict::Valid(target) => match HeaderValue::from_str(&target) {
            Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
            Err(e) => {
                tracing::debug!(error = %e, "リダイレクト先をヘッダーに設定できません");
                invalid_link_page()
            }
        },
        LinkVerdict::Invalid(reason) => {
            tracing::debug!(reason = %reason, "リンクを拒否しました");
            invalid_link_page()
        }
    }
}
