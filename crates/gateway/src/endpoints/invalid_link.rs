//! # 無効リンクページ
//!
//! 拒否理由（不正な形式・許可外ホスト・期限切れ）を区別せず、常に同じページを返す。

use axum::response::{Html, IntoResponse, Response};

/// 無効リンクページの本文
pub const INVALID_LINK_HTML: &str = "<html><body><div style=\"text-align: center; margin: 5%; margin-top: 20%\"><p style=\"font-size: 4vh; font-family:'San Francisco'\">This link is not valid anymore, please go back to the app and regenerate it.</p></div></body></html>";

/// HTTP 200 の無効リンクページ。
pub fn invalid_link_page() -> Response {
    Html(INVALID_LINK_HTML).into_response()
}
