//! Most-Likely 質問APIモジュール
//!
//! 質問のCRUDに加え、プリサインURL経由の画像アップロードフローを提供します。
//! アップロードは送信時に実行します（選択時ではなく）。

use chrono::NaiveDate;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use super::client::ApiClient;
use super::{ApiError, ApiResult};

/// 質問ID（サーバー採番の不透明ID）
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

/// 受け付ける画像Content-Type
const ACCEPTED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/jpg"];

/// 質問作成ペイロード
///
/// `image_url` はアップロード済みオブジェクトキー（生URLではない）。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MostLikelyQuestion {
    pub question_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub date: NaiveDate,
}

/// 質問（読み取り形）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MostLikelyQuestionResponse {
    pub question_id: QuestionId,
    pub question_text: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// 一覧レスポンス（ラッパーオブジェクト形）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MostLikelyQuestionsResponse {
    pub most_likely_questions: Vec<MostLikelyQuestionResponse>,
}

/// アップロードチケット
///
/// アップロードごとに取得し、即時消費します。永続化しません。
#[derive(Debug, Clone, Deserialize)]
pub struct UploadTicket {
    #[serde(rename = "preSignedURL")]
    pub pre_signed_url: String,
    #[serde(rename = "objectKey")]
    pub object_key: String,
}

/// Content-Typeが受け付け対象か検証
///
/// 対象外の場合、ネットワークアクセスなしで `InvalidFileType` を返します。
pub fn validate_image_content_type(content_type: &str) -> ApiResult<()> {
    if ACCEPTED_IMAGE_TYPES.contains(&content_type) {
        Ok(())
    } else {
        Err(ApiError::InvalidFileType(content_type.to_string()))
    }
}

/// ファイル拡張子からContent-Typeを決定
pub fn image_content_type_for(path: &Path) -> ApiResult<&'static str> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpeg") => Ok("image/jpeg"),
        Some("jpg") => Ok("image/jpg"),
        Some("png") => Ok("image/png"),
        other => Err(ApiError::InvalidFileType(
            other.unwrap_or("(no extension)").to_string(),
        )),
    }
}

/// Most-Likely 質問API
#[derive(Clone)]
pub struct MostLikelyApi {
    client: Arc<ApiClient>,
}

impl MostLikelyApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// 質問を作成（成功は201）
    pub async fn post_question(
        &self,
        question: &MostLikelyQuestion,
    ) -> ApiResult<Option<MostLikelyQuestionResponse>> {
        let response = self
            .client
            .fetch_with_auth(Method::POST, "/admin/daily-games/most-likely/questions")?
            .json(question)
            .send()
            .await?;

        ApiClient::handle_response(response).await
    }

    /// 指定日の質問一覧を取得
    pub async fn get_questions(&self, date: NaiveDate) -> ApiResult<MostLikelyQuestionsResponse> {
        let response = self
            .client
            .fetch_with_auth(Method::GET, "/admin/daily-games/most-likely/questions")?
            .query(&[("date", date.to_string())])
            .send()
            .await?;

        Ok(ApiClient::handle_response(response).await?.unwrap_or_default())
    }

    /// 質問をIDで削除
    pub async fn delete_question(&self, question_id: &QuestionId) -> ApiResult<bool> {
        let path = format!("/admin/daily-games/most-likely/{}", question_id);
        let response = self
            .client
            .fetch_with_auth(Method::DELETE, &path)?
            .send()
            .await?;

        ApiClient::handle_response::<serde_json::Value>(response).await?;
        Ok(true)
    }

    /// アップロードチケットを取得
    ///
    /// 希望するContent-Typeは `Content-Type` ヘッダーで渡します。
    pub async fn get_upload_url(&self, content_type: &str) -> ApiResult<UploadTicket> {
        validate_image_content_type(content_type)?;

        let response = self
            .client
            .fetch_with_auth(Method::GET, "/admin/daily-games/most-likely/upload-url")?
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .send()
            .await?;

        ApiClient::handle_response(response)
            .await?
            .ok_or(ApiError::RequestFailed {
                status: 200,
                message: "upload-url response was empty".to_string(),
            })
    }

    /// 画像をアップロードし、オブジェクトキーを返す
    ///
    /// 1. Content-Type検証（対象外はネットワークアクセスなしで失敗）
    /// 2. アップロードチケット取得
    /// 3. プリサインURLへ生バイトをPUT（リトライなし）
    pub async fn upload_image(&self, bytes: Vec<u8>, content_type: &str) -> ApiResult<String> {
        validate_image_content_type(content_type)?;

        let ticket = self.get_upload_url(content_type).await?;
        self.client
            .put_binary(&ticket.pre_signed_url, bytes, content_type)
            .await?;

        tracing::debug!("🖼️ Image uploaded as {}", ticket.object_key);
        Ok(ticket.object_key)
    }

    /// 画像ファイル付きで質問を作成
    ///
    /// 返却されたオブジェクトキーを `imageUrl` として作成POSTに使います。
    pub async fn post_question_with_image(
        &self,
        question_text: &str,
        date: NaiveDate,
        image_path: &Path,
    ) -> ApiResult<Option<MostLikelyQuestionResponse>> {
        let content_type = image_content_type_for(image_path)?;
        let bytes = tokio::fs::read(image_path).await?;
        let object_key = self.upload_image(bytes, content_type).await?;

        self.post_question(&MostLikelyQuestion {
            question_text: question_text.to_string(),
            image_url: Some(object_key),
            date,
        })
        .await
    }
}
