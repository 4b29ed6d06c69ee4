//! `check` サブコマンド

use chrono::Utc;
use saslink_core::{extract_original_url, validate_signed_link};
use saslink_types::LinkVerdict;
use url::Url;

/// フレンドリーURLなら埋め込まれた `originalUrl` を、そうでなければ入力そのものを検証する。
pub fn run_check(input: &str, storage_host: &str) -> LinkVerdict {
    let candidate = Url::parse(input)
        .ok()
        .and_then(|url| extract_original_url(url.query()))
        .unwrap_or_else(|| input.to_string());
    validate_signed_link(Some(&candidate), storage_host, Utc::now())
}
