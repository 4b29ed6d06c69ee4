//! # Gateway エラー型

use axum::http::StatusCode;

/// Gatewayエラー型。
///
/// リンク生成側の失敗のみを表す。プロキシ側の拒否はすべて無効リンクページで応答し、
/// このエラー型は使わない。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// ストレージ操作に失敗
    #[error("ストレージ操作に失敗: {0}")]
    Storage(String),
    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
    /// 不正なリクエスト
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            GatewayError::Storage(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        tracing::warn!(status = %status, error = %self, "リンク生成に失敗しました");
        (status, self.to_string()).into_response()
    }
}
