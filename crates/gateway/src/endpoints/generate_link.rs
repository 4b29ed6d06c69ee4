//! # GET /api/generateFileLink
//!
//! 固定リソースの署名付きURLを発行し、同一オリジンのフレンドリーURLに包んで返す。

use std::sync::Arc;

use axum::extract::State;
use axum::http::uri::Authority;
use axum::http::{header, HeaderMap, Uri};
use chrono::Utc;
use saslink_core::{build_friendly_url, CoreError, RequestOrigin, FILE_PROXY_ROUTE};
use saslink_types::AccessGrant;

use crate::config::{GatewayConfig, GatewayState};
use crate::error::GatewayError;

/// GET /api/generateFileLink — フレンドリーURL発行。
///
/// 有効期限 `now + link_ttl`、読み取り専用のアクセス許可でストレージに署名付きURLを発行させ、
/// `originalUrl` に埋め込んだプロキシURLを平文で返す。
/// ストレージの失敗はそのままエラーレスポンスになる。
pub async fn handle_generate_link(
    State(state): State<Arc<GatewayState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<String, GatewayError> {
    let origin = resolve_origin(&uri, &headers, &state.config)?;

    let grant = AccessGrant::read_only(
        state.config.resource.clone(),
        Utc::now(),
        state.config.link_ttl,
    )
    .map_err(|e| GatewayError::Internal(e.to_string()))?;
    let signed_url = state.blob_storage.mint_signed_url(&grant).await?;

    let friendly = build_friendly_url(&origin, FILE_PROXY_ROUTE, &signed_url).map_err(|e| match e {
        CoreError::InvalidOrigin(msg) => GatewayError::BadRequest(msg),
        other => GatewayError::Internal(other.to_string()),
    })?;

    tracing::info!(
        resource = %grant.resource,
        expiry = %grant.expiry,
        "フレンドリーURLを発行しました"
    );
    Ok(friendly.to_string())
}

/// リクエスト元のスキーム・ホスト・ポートを決定する。
///
/// - ホスト: 絶対形式のURI、なければ `Host` ヘッダー
/// - スキーム: 絶対形式のURI、`TRUST_FORWARDED_PROTO` 有効時は `X-Forwarded-Proto`、なければ既定値
pub(crate) fn resolve_origin(
    uri: &Uri,
    headers: &HeaderMap,
    config: &GatewayConfig,
) -> Result<RequestOrigin, GatewayError> {
    let authority = match uri.authority() {
        Some(authority) => authority.clone(),
        None => {
            let host = headers
                .get(header::HOST)
                .ok_or_else(|| GatewayError::BadRequest("Hostヘッダーがありません".to_string()))?
                .to_str()
                .map_err(|e| GatewayError::BadRequest(format!("Hostヘッダーが不正です: {e}")))?;
            host.parse::<Authority>()
                .map_err(|e| GatewayError::BadRequest(format!("Hostヘッダーが不正です: {e}")))?
        }
    };

    let scheme = match uri.scheme_str() {
        Some(scheme) => scheme.to_ascii_lowercase(),
        None => config
            .trust_forwarded_proto
            .then(|| forwarded_proto(headers))
            .flatten()
            .unwrap_or_else(|| config.default_scheme.clone()),
    };

    Ok(RequestOrigin::new(
        scheme,
        authority.host(),
        authority.port_u16(),
    ))
}

/// `X-Forwarded-Proto` の先頭値（http/httpsのみ）
fn forwarded_proto(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("x-forwarded-proto")?.to_str().ok()?;
    let proto = value.split(',').next()?.trim().to_ascii_lowercase();
    matches!(proto.as_str(), "http" | "https").then_some(proto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use axum::response::IntoResponse;
    use saslink_core::extract_original_url;
    use url::Url;

    use crate::endpoints::test_helpers::*;

    fn host_headers(host: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_str(host).unwrap());
        headers
    }

    fn path_uri() -> Uri {
        Uri::from_static("/api/generateFileLink")
    }

    /// フレンドリーURLのスキーム・ホスト・ポートはリクエストと一致し、パスはプロキシを指す
    #[tokio::test]
    async fn test_generate_link_keeps_request_origin() {
        let body = handle_generate_link(
            State(test_state()),
            path_uri(),
            host_headers("localhost:7071"),
        )
        .await
        .unwrap();

        let friendly = Url::parse(&body).unwrap();
        assert_eq!(friendly.scheme(), "http");
        assert_eq!(friendly.host_str(), Some("localhost"));
        assert_eq!(friendly.port(), Some(7071));
        assert_eq!(friendly.path(), FILE_PROXY_ROUTE);

        let signed = extract_original_url(friendly.query()).unwrap();
        assert!(signed.starts_with(&format!("https://{STORAGE_HOST}/c/f.pdf?")));
        assert!(signed.contains("&sp=r&"));
    }

    /// 署名の有効期限はおよそ1時間後（秒未満は切り捨て）
    #[tokio::test]
    async fn test_generate_link_expiry_is_one_hour() {
        let before = Utc::now();
        let body = handle_generate_link(State(test_state()), path_uri(), host_headers("localhost"))
            .await
            .unwrap();

        let signed = extract_original_url(Url::parse(&body).unwrap().query()).unwrap();
        let se = Url::parse(&signed)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "se")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        let expiry = saslink_core::parse_sas_datetime(&se).unwrap();
        let ttl = expiry - before;
        assert!(ttl <= chrono::Duration::hours(1) + chrono::Duration::seconds(1));
        assert!(ttl > chrono::Duration::minutes(59));
    }

    #[tokio::test]
    async fn test_generate_link_uses_absolute_uri() {
        let uri: Uri = "https://links.example.com:8443/api/generateFileLink".parse().unwrap();
        let body = handle_generate_link(State(test_state()), uri, host_headers("ignored"))
            .await
            .unwrap();
        assert!(body.starts_with("https://links.example.com:8443/api/fileProxy?originalUrl="));
    }

    #[tokio::test]
    async fn test_forwarded_proto_only_when_trusted() {
        let mut headers = host_headers("links.example.com");
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));

        let body = handle_generate_link(State(test_state()), path_uri(), headers.clone())
            .await
            .unwrap();
        assert!(body.starts_with("http://links.example.com/api/fileProxy?"));

        let mut config = test_config();
        config.trust_forwarded_proto = true;
        let state = test_state_with(config, MockBlobStorage);
        let body = handle_generate_link(State(state), path_uri(), headers)
            .await
            .unwrap();
        assert!(body.starts_with("https://links.example.com/api/fileProxy?"));
    }

    #[test]
    fn test_resolve_origin_ipv6_host() {
        let origin =
            resolve_origin(&path_uri(), &host_headers("[::1]:3000"), &test_config()).unwrap();
        assert_eq!(origin, RequestOrigin::new("http", "[::1]", Some(3000)));
    }

    #[tokio::test]
    async fn test_generate_link_without_host_is_bad_request() {
        let result =
            handle_generate_link(State(test_state()), path_uri(), HeaderMap::new()).await;
        assert!(matches!(result, Err(GatewayError::BadRequest(_))));
    }

    /// ストレージの失敗は握りつぶさず500になる
    #[tokio::test]
    async fn test_generate_link_storage_failure_is_server_error() {
        let state = test_state_with(test_config(), FailingBlobStorage);
        let result = handle_generate_link(State(state), path_uri(), host_headers("localhost")).await;

        let err = result.unwrap_err();
        assert!(matches!(err, GatewayError::Storage(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    /// 有効期限が日時の範囲を超える場合はパニックせず500になる
    #[tokio::test]
    async fn test_generate_link_out_of_range_ttl_is_server_error() {
        let mut config = test_config();
        config.link_ttl = chrono::Duration::days(1_000_000_000);
        let state = test_state_with(config, MockBlobStorage);
        let result = handle_generate_link(State(state), path_uri(), host_headers("localhost")).await;

        let err = result.unwrap_err();
        assert!(matches!(err, GatewayError::Internal(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_generate_link_over_http() {
        let port = start_gateway(test_state()).await;

        let response = reqwest::get(format!("http://127.0.0.1:{port}/api/generateFileLink"))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert!(response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/plain"));

        let body = response.text().await.unwrap();
        assert!(body.starts_with(&format!("http://127.0.0.1:{port}/api/fileProxy?originalUrl=")));
    }
}
