//! # ストレージ接続文字列
//!
//! `Key=Value;Key=Value` 形式の接続文字列からアカウント名・共有キー・
//! Blobエンドポイントを取り出す。

use std::collections::HashMap;

use saslink_crypto::AccountKey;
use url::Url;

use crate::CoreError;

/// ローカルエミュレータのアカウント名
pub const DEV_STORAGE_ACCOUNT_NAME: &str = "devstoreaccount1";

/// ローカルエミュレータの既知の共有キー（公開されている固定値）
const DEV_STORAGE_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";

const DEV_STORAGE_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// 署名付きURLの発行に必要なストレージアカウント情報。
#[derive(Debug, Clone)]
pub struct StorageAccount {
    /// アカウント名
    pub account_name: String,
    /// 共有キー
    pub account_key: AccountKey,
    /// BlobサービスのエンドポイントURL
    pub blob_endpoint: Url,
}

impl StorageAccount {
    /// 接続文字列をパースする。
    ///
    /// 値に `=` を含められるよう、各要素は最初の `=` で分割する。キーの大文字小文字は区別しない。
    pub fn from_connection_string(connection_string: &str) -> Result<Self, CoreError> {
        let mut fields: HashMap<String, &str> = HashMap::new();
        for part in connection_string.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (key, value) = part.split_once('=').ok_or_else(|| {
                CoreError::InvalidConnectionString(format!("'=' がありません: {part}"))
            })?;
            fields.insert(key.trim().to_ascii_lowercase(), value.trim());
        }

        let use_dev_storage = fields
            .get("usedevelopmentstorage")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        if use_dev_storage {
            return Self::development_storage();
        }

        let account_name = fields
            .get("accountname")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CoreError::InvalidConnectionString("AccountNameがありません".into()))?
            .to_string();
        let account_key = fields
            .get("accountkey")
            .ok_or_else(|| CoreError::InvalidConnectionString("AccountKeyがありません".into()))?;
        let account_key = AccountKey::from_base64(account_key)?;

        let blob_endpoint = match fields.get("blobendpoint") {
            Some(endpoint) => endpoint.to_string(),
            None => {
                let protocol = fields
                    .get("defaultendpointsprotocol")
                    .copied()
                    .unwrap_or("https");
                let suffix = fields
                    .get("endpointsuffix")
                    .copied()
                    .unwrap_or(DEFAULT_ENDPOINT_SUFFIX);
                format!("{protocol}://{account_name}.blob.{suffix}")
            }
        };
        let blob_endpoint = parse_endpoint(&blob_endpoint)?;

        Ok(Self {
            account_name,
            account_key,
            blob_endpoint,
        })
    }

    /// ローカルエミュレータ用のアカウント。
    pub fn development_storage() -> Result<Self, CoreError> {
        Ok(Self {
            account_name: DEV_STORAGE_ACCOUNT_NAME.to_string(),
            account_key: AccountKey::from_base64(DEV_STORAGE_ACCOUNT_KEY)?,
            blob_endpoint: parse_endpoint(DEV_STORAGE_BLOB_ENDPOINT)?,
        })
    }

    /// Blobエンドポイントのホスト名。リダイレクト許可ホストの既定値に使う。
    pub fn blob_host(&self) -> Option<&str> {
        self.blob_endpoint.host_str()
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, CoreError> {
    let url = Url::parse(endpoint).map_err(|e| {
        CoreError::InvalidConnectionString(format!("Blobエンドポイントが不正です: {endpoint}: {e}"))
    })?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(CoreError::InvalidConnectionString(format!(
            "Blobエンドポイントにホストがありません: {endpoint}"
        )));
    }
    Ok(url)
}
