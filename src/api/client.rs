//! 認証付きHTTPクライアントラッパー
//!
//! 全エンドポイント共通の認証ヘッダー付与とレスポンス正規化を提供します。
//! リトライ・キャッシュは行いません。

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::{ApiError, ApiResult};
use crate::credentials::CredentialStore;

/// 認証ヘッダー名
const HEADER_API_KEY: &str = "X-API-Key";
const HEADER_SIGNATURE: &str = "X-Signature";

/// エラーレスポンスボディ（`message`フィールドは省略可）
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// 管理API用HTTPクライアント
///
/// 認証情報ストアを参照として保持し、リクエストごとに読み出します。
/// グローバル状態からは読みません。
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<CredentialStore>,
}

impl ApiClient {
    /// 新しいApiClientを作成
    pub fn new(
        base_url: impl Into<String>,
        timeout_ms: u64,
        store: Arc<CredentialStore>,
    ) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url: trim_trailing_slash(base_url.into()),
            store,
        })
    }

    /// ベースURLを取得
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 認証情報ストアを取得
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// 認証ヘッダー付きのリクエストビルダーを作成
    ///
    /// 認証情報が保存されていない場合、ネットワークアクセスの前に
    /// `ApiError::Unauthenticated` で失敗します。JSONボディのContent-Typeは
    /// 呼び出し側の `.json(..)` が設定します。
    pub fn fetch_with_auth(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let credentials = self
            .store
            .get_credentials()
            .ok_or(ApiError::Unauthenticated)?;

        let url = format!("{}{}", self.base_url, path);
        Ok(self
            .http
            .request(method, url)
            .header(HEADER_API_KEY, credentials.api_key)
            .header(HEADER_SIGNATURE, credentials.signature))
    }

    /// プリサインURLへの生バイナリPUT
    ///
    /// プリサインURLは追加認証を必要としないため、認証ヘッダーは付けません。
    pub async fn put_binary(&self, url: &str, bytes: Vec<u8>, content_type: &str) -> ApiResult<()> {
        let response = self
            .http
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::UploadFailed(response.status().as_u16()));
        }
        Ok(())
    }

    /// レスポンスを正規化
    ///
    /// - 201: ボディが空なら成功センチネル（`None`）、非空ならJSON解析
    /// - その他2xx: ボディが空なら`None`、非空ならJSON解析
    /// - 非2xx: エラーボディの`message`を取り出し、無ければ
    ///   `request failed with status <code>` で `RequestFailed`
    pub async fn handle_response<T: DeserializeOwned>(response: Response) -> ApiResult<Option<T>> {
        let status = response.status();

        if status == StatusCode::CREATED {
            let text = response.text().await?;
            if text.trim().is_empty() {
                return Ok(None);
            }
            return Ok(Some(serde_json::from_str(&text)?));
        }

        if !status.is_success() {
            let code = status.as_u16();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| format!("request failed with status {}", code));
            return Err(ApiError::RequestFailed {
                status: code,
                message,
            });
        }

        let text = response.text().await?;
        if text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(serde_json::from_str(&text)?))
        }
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
