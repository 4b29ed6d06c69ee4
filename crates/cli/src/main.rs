//! # saslink CLI
//!
//! Gatewayを起動せずに署名付きURL・フレンドリーURLを発行し、
//! 既存のリンクがプロキシで受理されるかを確認する運用ツール。

mod commands;

use clap::{Parser, Subcommand};
use saslink_types::{BlobPermissions, BlobResource, LinkVerdict};

/// saslink CLI
#[derive(Debug, Parser)]
#[command(name = "saslink-cli")]
#[command(about = "署名付きURLの発行と検証", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// 署名付きURLを発行する。--originを指定するとフレンドリーURLを出力する。
    Mint {
        /// ストレージ接続文字列
        #[arg(long, env = "STORAGE_ACCOUNT_CONNECTION_STRING", hide_env_values = true)]
        connection_string: String,
        /// 対象リソース（container/path/to/file）
        #[arg(long, env = "BLOB_RESOURCE_PATH")]
        resource: BlobResource,
        /// 有効期間（秒）
        #[arg(long, default_value_t = 3600)]
        ttl_secs: u32,
        /// 権限（racwdl の組み合わせ）
        #[arg(long, default_value = "r")]
        permissions: BlobPermissions,
        /// フレンドリーURLのオリジン（例: https://links.example.com）
        #[arg(long)]
        origin: Option<String>,
    },

    /// フレンドリーURLまたは署名付きURLを現在時刻で検証する。
    Check {
        /// 検証するURL
        url: String,
        /// リダイレクトを許可するストレージホスト
        #[arg(long, env = "STORAGE_HOST")]
        storage_host: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        CliCommand::Mint {
            connection_string,
            resource,
            ttl_secs,
            permissions,
            origin,
        } => {
            let link = commands::mint::run_mint(
                &connection_string,
                resource,
                ttl_secs,
                permissions,
                origin.as_deref(),
            )?;
            println!("{link}");
        }
        CliCommand::Check { url, storage_host } => {
            match commands::check::run_check(&url, &storage_host) {
                LinkVerdict::Valid(_) => println!("valid"),
                LinkVerdict::Invalid(reason) => {
                    println!("{}", reason.code());
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
