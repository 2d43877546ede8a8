//! This-or-That ペアリングAPIモジュール

use chrono::NaiveDate;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::client::ApiClient;
use super::ApiResult;

/// ペアリングID（サーバー採番の不透明ID）
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PairingId(pub String);

/// ペアリング作成ペイロード
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThisOrThatPairing {
    pub option1_text: String,
    pub option2_text: String,
    pub date: NaiveDate,
}

/// 選択肢（読み取り形）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThisOrThatOption {
    pub option_id: String,
    pub option_text: String,
    #[serde(default)]
    pub created_at: String,
}

/// ペアリング（読み取り形）
///
/// 1ペアリングはちょうど2つの選択肢を持ちます。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThisOrThatPairingResponse {
    pub pairing_id: PairingId,
    pub option1: ThisOrThatOption,
    pub option2: ThisOrThatOption,
    pub valid_date: String,
}

/// This-or-That ペアリングAPI
///
/// 一覧レスポンスは素のリスト形（他エンティティとはエンベロープが異なる）。
#[derive(Clone)]
pub struct ThisOrThatApi {
    client: Arc<ApiClient>,
}

impl ThisOrThatApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// ペアリングを作成（成功は201）
    pub async fn post_pairing(
        &self,
        pairing: &ThisOrThatPairing,
    ) -> ApiResult<Option<ThisOrThatPairingResponse>> {
        let response = self
            .client
            .fetch_with_auth(Method::POST, "/admin/daily-games/this-or-that/pairings")?
            .json(pairing)
            .send()
            .await?;

        ApiClient::handle_response(response).await
    }

    /// 指定日のペアリング一覧を取得
    pub async fn get_pairings(&self, date: NaiveDate) -> ApiResult<Vec<ThisOrThatPairingResponse>> {
        let response = self
            .client
            .fetch_with_auth(Method::GET, "/admin/daily-games/this-or-that/pairings")?
            .query(&[("date", date.to_string())])
            .send()
            .await?;

        Ok(ApiClient::handle_response(response).await?.unwrap_or_default())
    }

    /// ペアリングをIDで削除
    pub async fn delete_pairing(&self, pairing_id: &PairingId) -> ApiResult<bool> {
        let path = format!("/admin/daily-games/this-or-that/pairings/{}", pairing_id);
        let response = self
            .client
            .fetch_with_auth(Method::DELETE, &path)?
            .send()
            .await?;

        ApiClient::handle_response::<serde_json::Value>(response).await?;
        Ok(true)
    }
}
