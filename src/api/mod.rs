//! 管理APIクライアントモジュール
//!
//! デイリーゲーム管理APIへのアクセスレイヤーを提供します。
//!
//! ## 機能
//!
//! - 認証ヘッダー付与とレスポンス正規化（HTTPクライアントラッパー）
//! - エンティティ別APIモジュール（This-or-That / Most-Likely / Silly）
//! - プリサインURL経由の画像アップロードフロー

mod client;
pub mod most_likely;
pub mod silly_questions;
pub mod this_or_that;

pub use client::ApiClient;

/// API関連のエラー型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 認証情報が未保存のままリクエストが発行された
    #[error("API credentials not found")]
    Unauthenticated,

    /// 非2xxレスポンス（サーバー提供または汎用メッセージ付き）
    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    /// 画像のContent-Typeが受け付け対象外
    #[error("Unsupported image content type: {0}")]
    InvalidFileType(String),

    /// ストレージへのバイナリPUTが失敗
    #[error("Image upload failed with status {0}")]
    UploadFailed(u16),

    /// ネットワークエラー
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// レスポンスJSONの解析エラー
    #[error("Failed to parse response JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// 画像ファイルの読み込みエラー
    #[error("Failed to read image file: {0}")]
    Io(#[from] std::io::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;
