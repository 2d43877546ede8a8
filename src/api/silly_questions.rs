//! Silly Questions APIモジュール
//!
//! デイリー取得は単一オブジェクト形のレスポンスで、未作成の日は空状態
//! （`None`）として扱います。

use chrono::NaiveDate;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::client::ApiClient;
use super::{ApiError, ApiResult};

/// 質問ID（サーバー採番の不透明ID）
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SillyQuestionId(pub String);

/// 質問作成ペイロード
#[derive(Debug, Clone, Serialize)]
pub struct SillyQuestion {
    pub question: String,
    pub date: NaiveDate,
}

/// 質問（読み取り形）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SillyQuestionResponse {
    pub question_id: SillyQuestionId,
    pub question: String,
    pub question_date: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Silly Questions API
#[derive(Clone)]
pub struct SillyQuestionsApi {
    client: Arc<ApiClient>,
}

impl SillyQuestionsApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// 質問を作成（成功は201）
    pub async fn post_question(
        &self,
        question: &SillyQuestion,
    ) -> ApiResult<Option<SillyQuestionResponse>> {
        let response = self
            .client
            .fetch_with_auth(Method::POST, "/admin/daily-games/silly-questions")?
            .json(question)
            .send()
            .await?;

        ApiClient::handle_response(response).await
    }

    /// 指定日の質問を取得
    ///
    /// その日の質問が存在しない場合（404または空ボディ）は `None`。
    pub async fn get_daily_question(
        &self,
        date: NaiveDate,
    ) -> ApiResult<Option<SillyQuestionResponse>> {
        let response = self
            .client
            .fetch_with_auth(Method::GET, "/daily-games/silly-questions/daily")?
            .query(&[("date", date.to_string())])
            .send()
            .await?;

        match ApiClient::handle_response(response).await {
            Err(ApiError::RequestFailed { status: 404, .. }) => Ok(None),
            other => other,
        }
    }

    /// 質問をIDで削除
    pub async fn delete_question(&self, question_id: &SillyQuestionId) -> ApiResult<bool> {
        let path = format!("/admin/daily-games/silly-questions/{}", question_id);
        let response = self
            .client
            .fetch_with_auth(Method::DELETE, &path)?
            .send()
            .await?;

        ApiClient::handle_response::<serde_json::Value>(response).await?;
        Ok(true)
    }
}
