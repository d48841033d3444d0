use std::str::FromStr;
use thiserror::Error;

/// 設定のエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// 永続化先
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL（本番）
    Postgres,
    /// プロセス内メモリ（ローカル実行・動作確認用、再起動で消える）
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(format!("Unknown storage backend: {}", s)),
        }
    }
}

/// 環境変数から読み込むアプリケーション設定
///
/// - STORAGE_BACKEND: postgres（既定）| memory
/// - DATABASE_URL: 既定 postgres://localhost/library
/// - DATABASE_MAX_CONNECTIONS: 既定 5
/// - PORT: 既定 3000
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub storage: StorageBackend,
    pub database_url: String,
    pub max_connections: u32,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から読み込む（テスト用に環境変数を差し替えられる）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            storage: parse_or(&lookup, "STORAGE_BACKEND", StorageBackend::Postgres)?,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "postgres://localhost/library".to_string()),
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            port: parse_or(&lookup, "PORT", 3000)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}
