//! # フレンドリーURLとプロキシ検証
//!
//! 署名付きURLを同一オリジンのフレンドリーURLに埋め込み、
//! アクセス時に埋め込まれたURLを検証する。

use chrono::{DateTime, Utc};
use saslink_types::{LinkRejection, LinkVerdict, ORIGINAL_URL_PARAM, SAS_EXPIRY_PARAM};
use url::Url;

use crate::{parse_sas_datetime, CoreError};

/// リンク生成エンドポイントのパス
pub const GENERATE_LINK_ROUTE: &str = "/api/generateFileLink";

/// プロキシエンドポイントのパス。フレンドリーURLは常にこのパスを指す。
pub const FILE_PROXY_ROUTE: &str = "/api/fileProxy";

/// リクエスト元のスキーム・ホスト・ポート。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
}

impl RequestOrigin {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port,
        }
    }

    /// `scheme://host[:port]` 形式の文字列から構築する。
    pub fn parse(origin: &str) -> Result<Self, CoreError> {
        let url = Url::parse(origin)
            .map_err(|e| CoreError::InvalidOrigin(format!("{origin}: {e}")))?;
        let host = url
            .host_str()
            .ok_or_else(|| CoreError::InvalidOrigin(format!("ホストがありません: {origin}")))?;
        Ok(Self::new(url.scheme(), host, url.port()))
    }

    fn to_url(&self) -> Result<Url, CoreError> {
        if !matches!(self.scheme.as_str(), "http" | "https") {
            return Err(CoreError::InvalidOrigin(format!(
                "未対応のスキームです: {}",
                self.scheme
            )));
        }
        let mut url = Url::parse(&format!("{}://{}", self.scheme, self.host))
            .map_err(|e| CoreError::InvalidOrigin(format!("{}: {e}", self.host)))?;
        url.set_port(self.port)
            .map_err(|_| CoreError::InvalidOrigin(format!("ポートを設定できません: {}", self.host)))?;
        Ok(url)
    }
}

/// 署名付きURLを埋め込んだフレンドリーURLを構築する。
///
/// スキーム・ホスト・ポートはリクエスト元から引き継ぎ、パスは `route`、
/// クエリは `originalUrl` のみとする。
pub fn build_friendly_url(
    origin: &RequestOrigin,
    route: &str,
    signed_url: &str,
) -> Result<Url, CoreError> {
    let mut url = origin.to_url()?;
    url.set_path(route);
    url.query_pairs_mut()
        .clear()
        .append_pair(ORIGINAL_URL_PARAM, signed_url);
    Ok(url)
}

/// 生のクエリ文字列から最初の `originalUrl` を取り出す。
///
/// キー名の大文字小文字は区別しない。不正なパーセントエンコーディングがあっても失敗しない。
pub fn extract_original_url(raw_query: Option<&str>) -> Option<String> {
    let query = raw_query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key.eq_ignore_ascii_case(ORIGINAL_URL_PARAM))
        .map(|(_, value)| value.into_owned())
}

/// 埋め込まれた署名付きURLを検証する。
///
/// 1. http(s) の絶対URLとして解釈できなければ `Malformed`
/// 2. ホストが `storage_host` と一致しなければ `UntrustedHost`（大文字小文字は区別しない）
/// 3. `se`（キー名は大文字小文字を区別しない）が無い・解釈できない・`now` より過去なら
///    `ExpiredOrUnparsableExpiry`
/// 4. それ以外は入力文字列をそのまま `Valid` で返す
pub fn validate_signed_link(
    candidate: Option<&str>,
    storage_host: &str,
    now: DateTime<Utc>,
) -> LinkVerdict {
    let Some(raw) = candidate else {
        return LinkVerdict::Invalid(LinkRejection::Malformed);
    };
    let Ok(url) = Url::parse(raw) else {
        return LinkVerdict::Invalid(LinkRejection::Malformed);
    };
    if !matches!(url.scheme(), "http" | "https") {
        return LinkVerdict::Invalid(LinkRejection::Malformed);
    }

    match url.host_str() {
        Some(host) if host.eq_ignore_ascii_case(storage_host) => {}
        _ => return LinkVerdict::Invalid(LinkRejection::UntrustedHost),
    }

    let expiry = url
        .query_pairs()
        .find(|(key, _)| key.eq_ignore_ascii_case(SAS_EXPIRY_PARAM))
        .and_then(|(_, value)| parse_sas_datetime(&value));
    match expiry {
        Some(expiry) if now <= expiry => LinkVerdict::Valid(raw.to_string()),
        _ => LinkVerdict::Invalid(LinkRejection::ExpiredOrUnparsableExpiry),
    }
}
