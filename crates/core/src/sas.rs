//! # サービスSAS
//!
//! 共有キーでBlob単位のサービスSASを発行する。
//! 署名対象文字列はバージョン 2020-12-06 以降の形式に従う。

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use saslink_types::{AccessGrant, SAS_EXPIRY_PARAM, SAS_SIGNATURE_PARAM};
use url::Url;

use crate::{CoreError, StorageAccount};

/// 署名に使うストレージサービスバージョン（`sv`）
pub const SAS_VERSION: &str = "2020-12-06";

/// Blob単位のSAS（`sr=b`）
const SIGNED_RESOURCE_BLOB: &str = "b";

/// SASの日時表現（秒精度、UTC）
const SAS_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// 日時をSASの `se` / `st` 形式に整形する。
pub fn format_sas_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(SAS_DATETIME_FORMAT).to_string()
}

/// SASの日時文字列をUTCとして解釈する。
///
/// RFC 3339、分精度（`YYYY-MM-DDTHH:MMZ`）、タイムゾーン無し、日付のみを受け付ける。
/// タイムゾーンが無い場合はUTCとみなす。
pub fn parse_sas_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%MZ", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// アクセス許可に対する署名付きBlob URLを発行する。
///
/// `{blobEndpoint}/{container}/{blobPath}?sv=..&se=..&sr=b&sp=..&sig=..`
pub fn blob_service_sas_url(
    account: &StorageAccount,
    grant: &AccessGrant,
) -> Result<String, CoreError> {
    if grant.permissions.is_empty() {
        return Err(CoreError::EmptyPermissions);
    }

    let permissions = grant.permissions.as_sas_str();
    let expiry = format_sas_datetime(&grant.expiry);
    let canonicalized_resource = format!(
        "/blob/{}/{}/{}",
        account.account_name, grant.resource.container, grant.resource.blob_path
    );

    let string_to_sign = [
        permissions.as_str(),          // signedPermissions
        "",                            // signedStart
        expiry.as_str(),               // signedExpiry
        canonicalized_resource.as_str(),
        "",                            // signedIdentifier
        "",                            // signedIP
        "",                            // signedProtocol
        SAS_VERSION,                   // signedVersion
        SIGNED_RESOURCE_BLOB,          // signedResource
        "",                            // signedSnapshotTime
        "",                            // signedEncryptionScope
        "",                            // rscc
        "",                            // rscd
        "",                            // rsce
        "",                            // rscl
        "",                            // rsct
    ]
    .join("\n");

    let signature = account.account_key.sign(&string_to_sign)?;

    let mut url: Url = account.blob_endpoint.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            CoreError::InvalidBlobUrl(format!("パスを持てないエンドポイントです: {}", account.blob_endpoint))
        })?;
        segments.pop_if_empty().push(&grant.resource.container);
        segments.extend(grant.resource.blob_path.split('/'));
    }
    url.query_pairs_mut()
        .clear()
        .append_pair("sv", SAS_VERSION)
        .append_pair(SAS_EXPIRY_PARAM, &expiry)
        .append_pair("sr", SIGNED_RESOURCE_BLOB)
        .append_pair("sp", &permissions)
        .append_pair(SAS_SIGNATURE_PARAM, &signature);

    Ok(url.to_string())
}
