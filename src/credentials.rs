//! 認証情報管理モジュール
//!
//! 管理APIの認証に必要なAPIキー/シグネチャペアの保存・読み込みを管理します。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// 認証情報関連のエラー型
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// APIキーが空
    #[error("API key must not be empty")]
    EmptyApiKey,

    /// シグネチャが空
    #[error("Signature must not be empty")]
    EmptySignature,

    /// 設定ディレクトリが特定できない
    #[error("Failed to determine config directory")]
    NoConfigDir,

    /// I/Oエラー
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSONシリアライズエラー
    #[error("JSON serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type CredentialResult<T> = Result<T, CredentialError>;

/// 管理APIの認証情報
///
/// ワイヤ形式（`X-API-Key` / `X-Signature` ヘッダー）と同じペアを保持します。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// APIキー
    pub api_key: String,
    /// シグネチャ
    pub signature: String,
}

/// 認証情報ストア
///
/// 単一のJSONレコードとして設定ディレクトリ配下に永続化します。
/// 書き込みはset/clearの明示呼び出しのみ（単一ライター）。
pub struct CredentialStore {
    /// 保存ファイルのパス
    store_path: PathBuf,
}

impl CredentialStore {
    /// 新しいCredentialStoreを作成
    ///
    /// # Arguments
    ///
    /// * `config_dir` - 設定ディレクトリのパス（例: ~/.config/dgadmin）
    pub fn new(config_dir: PathBuf) -> Self {
        let store_path = config_dir.join("credentials.json");
        Self { store_path }
    }

    /// デフォルトの設定ディレクトリを使用してCredentialStoreを作成
    pub fn with_default_dir() -> CredentialResult<Self> {
        let config_dir = directories::ProjectDirs::from("in", "miloapp", "dgadmin")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(CredentialError::NoConfigDir)?;

        Ok(Self::new(config_dir))
    }

    /// 認証情報を保存
    ///
    /// 空文字列はネットワークアクセスの前段で弾きます。
    pub fn set_credentials(&self, api_key: &str, signature: &str) -> CredentialResult<()> {
        if api_key.trim().is_empty() {
            return Err(CredentialError::EmptyApiKey);
        }
        if signature.trim().is_empty() {
            return Err(CredentialError::EmptySignature);
        }

        // ディレクトリが存在しない場合は作成
        if let Some(parent) = self.store_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let record = Credentials {
            api_key: api_key.to_string(),
            signature: signature.to_string(),
        };

        fs::write(&self.store_path, serde_json::to_string_pretty(&record)?)?;

        Ok(())
    }

    /// 認証情報が存在するか確認（デシリアライズなし）
    pub fn has_credentials(&self) -> bool {
        self.store_path.exists()
    }

    /// 認証情報を読み込み
    ///
    /// 壊れたレコードはエラーにせず「不在」として扱い、古いファイルを削除します。
    /// 2回目の呼び出しも同様に不在を返します（冪等）。
    pub fn get_credentials(&self) -> Option<Credentials> {
        let content = match fs::read_to_string(&self.store_path) {
            Ok(content) => content,
            Err(_) => return None,
        };

        match serde_json::from_str::<Credentials>(&content) {
            Ok(record) if !record.api_key.is_empty() && !record.signature.is_empty() => Some(record),
            _ => {
                tracing::warn!(
                    "🔑 Stored credentials are corrupt, clearing: {}",
                    self.store_path.display()
                );
                let _ = fs::remove_file(&self.store_path);
                None
            }
        }
    }

    /// 認証情報を削除
    pub fn clear_credentials(&self) -> CredentialResult<()> {
        if self.store_path.exists() {
            fs::remove_file(&self.store_path)?;
        }
        Ok(())
    }

    /// 保存ファイルのパスを取得
    pub fn store_path(&self) -> &PathBuf {
        &self.store_path
    }
}
