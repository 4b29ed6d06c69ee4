//! # saslink 共有型定義
//!
//! 署名付きURL（SAS）を安定したフレンドリーURLへ変換するために
//! 各crateで共有するデータ構造を提供する。
//!
//! ## 用語
//! - 署名付きURL: ストレージが発行した、有効期限と署名を含むURL
//! - フレンドリーURL: 署名付きURLを `originalUrl` クエリとして埋め込んだ同一オリジンのURL

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// フレンドリーURLに署名付きURLを埋め込むクエリパラメータ名
pub const ORIGINAL_URL_PARAM: &str = "originalUrl";

/// 署名付きURLの有効期限フィールド名（signed expiry）
pub const SAS_EXPIRY_PARAM: &str = "se";

/// 署名付きURLの署名フィールド名
pub const SAS_SIGNATURE_PARAM: &str = "sig";

// ---------------------------------------------------------------------------
// リソース
// ---------------------------------------------------------------------------

/// 署名対象のBlob。`container/path/to/file` 形式の1文字列から構築する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobResource {
    /// コンテナ名
    pub container: String,
    /// コンテナ内のBlobパス（先頭の `/` なし）
    pub blob_path: String,
}

/// `BlobResource` のパースエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("リソースパスは container/path 形式である必要があります: {0:?}")]
pub struct InvalidResourcePath(pub String);

impl BlobResource {
    /// コンテナ名とBlobパスから構築する。
    pub fn new(container: impl Into<String>, blob_path: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            blob_path: blob_path.into(),
        }
    }
}

impl FromStr for BlobResource {
    type Err = InvalidResourcePath;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('/');
        let (container, blob_path) = trimmed
            .split_once('/')
            .ok_or_else(|| InvalidResourcePath(s.to_string()))?;
        let blob_path = blob_path.trim_start_matches('/');
        if container.is_empty() || blob_path.is_empty() {
            return Err(InvalidResourcePath(s.to_string()));
        }
        Ok(Self::new(container, blob_path))
    }
}

impl fmt::Display for BlobResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.blob_path)
    }
}

// ---------------------------------------------------------------------------
// 権限
// ---------------------------------------------------------------------------

/// Blobに対するアクセス権限の集合。
///
/// SASの `sp` フィールドでは `racwdl` の順で表現される。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlobPermissions {
    pub read: bool,
    pub add: bool,
    pub create: bool,
    pub write: bool,
    pub delete: bool,
    pub list: bool,
}

impl BlobPermissions {
    /// 読み取りのみ
    pub const READ: Self = Self {
        read: true,
        add: false,
        create: false,
        write: false,
        delete: false,
        list: false,
    };

    /// 権限を1つも含まないか
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// SASの `sp` フィールド表現を返す。
    pub fn as_sas_str(&self) -> String {
        [
            (self.read, 'r'),
            (self.add, 'a'),
            (self.create, 'c'),
            (self.write, 'w'),
            (self.delete, 'd'),
            (self.list, 'l'),
        ]
        .iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, c)| *c)
        .collect()
    }
}

/// 未知の権限文字
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("未知の権限文字です: {0:?}")]
pub struct UnknownPermission(pub char);

impl FromStr for BlobPermissions {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut perms = Self::default();
        for c in s.chars() {
            match c {
                'r' => perms.read = true,
                'a' => perms.add = true,
                'c' => perms.create = true,
                'w' => perms.write = true,
                'd' => perms.delete = true,
                'l' => perms.list = true,
                other => return Err(UnknownPermission(other)),
            }
        }
        Ok(perms)
    }
}

// ---------------------------------------------------------------------------
// アクセス許可
// ---------------------------------------------------------------------------

/// 1つのリソースに対する期限付きアクセス許可。
///
/// リンク生成ごとに作られ、署名に使われた後は破棄される。永続化しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    /// 対象リソース
    pub resource: BlobResource,
    /// 有効期限（UTC、秒単位）
    pub expiry: DateTime<Utc>,
    /// 付与する権限
    pub permissions: BlobPermissions,
}

/// 有効期限が表現可能な日時の範囲を超えた
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("有効期限が範囲外です: {now} + {ttl}")]
pub struct ExpiryOutOfRange {
    pub now: DateTime<Utc>,
    pub ttl: Duration,
}

impl AccessGrant {
    /// `now + ttl` を有効期限とするアクセス許可を構築する。
    /// SASは秒精度のため、サブ秒は切り捨てる。
    pub fn new(
        resource: BlobResource,
        now: DateTime<Utc>,
        ttl: Duration,
        permissions: BlobPermissions,
    ) -> Result<Self, ExpiryOutOfRange> {
        let expiry = now
            .checked_add_signed(ttl)
            .ok_or(ExpiryOutOfRange { now, ttl })?;
        Ok(Self {
            resource,
            expiry: expiry.trunc_subsecs(0),
            permissions,
        })
    }

    /// 読み取り専用のアクセス許可を構築する。
    pub fn read_only(
        resource: BlobResource,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, ExpiryOutOfRange> {
        Self::new(resource, now, ttl, BlobPermissions::READ)
    }
}

// ---------------------------------------------------------------------------
// 検証結果
// ---------------------------------------------------------------------------

/// プロキシが署名付きURLを拒否した理由。
///
/// 内部でのみ区別し、レスポンス本文には出さない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkRejection {
    /// `originalUrl` が無い、または絶対URLとして解釈できない
    Malformed,
    /// 許可されたストレージホスト以外を指している
    UntrustedHost,
    /// `se` が無い、解釈できない、または過去
    ExpiredOrUnparsableExpiry,
}

impl LinkRejection {
    /// ログ用の安定したコード
    pub fn code(&self) -> &'static str {
        match self {
            LinkRejection::Malformed => "malformed",
            LinkRejection::UntrustedHost => "untrusted_host",
            LinkRejection::ExpiredOrUnparsableExpiry => "expired_or_unparsable_expiry",
        }
    }
}

impl fmt::Display for LinkRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// プロキシの検証状態機械の最終結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkVerdict {
    /// リダイレクト先（抽出した文字列そのもの）
    Valid(String),
    /// 拒否
    Invalid(LinkRejection),
}

impl LinkVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, LinkVerdict::Valid(_))
    }
}
