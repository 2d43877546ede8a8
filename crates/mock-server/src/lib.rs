//! デイリーゲーム管理APIのモックサーバー
//!
//! 開発・統合テスト用。全状態はメモリ上に保持します。
//! 認証は `X-API-Key` / `X-Signature` ヘッダーが非空であることのみ確認します。

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// 受け付ける画像Content-Type
const ACCEPTED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/jpg"];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingRequest {
    pub option1_text: String,
    pub option2_text: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionRecord {
    pub option_id: String,
    pub option_text: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingRecord {
    pub pairing_id: String,
    pub option1: OptionRecord,
    pub option2: OptionRecord,
    pub valid_date: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MostLikelyRequest {
    pub question_text: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub date: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MostLikelyRecord {
    pub question_id: String,
    pub question_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredMostLikely {
    record: MostLikelyRecord,
    date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SillyRequest {
    pub question: String,
    pub date: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SillyRecord {
    pub question_id: String,
    pub question: String,
    pub question_date: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Default)]
struct Inner {
    /// アップロードチケットのURL組み立てに使う自身の公開ベースURL
    public_base: String,
    pairings: Vec<PairingRecord>,
    most_likely: Vec<StoredMostLikely>,
    silly: Vec<SillyRecord>,
    /// アップロード済みオブジェクトキー → 受信バイト数
    uploads: HashMap<String, usize>,
    /// Sillyデイリーエンドポイントに500を返させる（テスト用）
    fail_silly: bool,
    /// ペアリング一覧レスポンスの遅延（ミリ秒、テスト用）
    pairings_delay_ms: u64,
}

/// インメモリのモックサーバー状態
#[derive(Clone, Default)]
pub struct MockServer {
    inner: Arc<Mutex<Inner>>,
}

/// 認証ヘッダー欠落
#[derive(Debug)]
struct Unauthorized;

impl warp::reject::Reject for Unauthorized {}

fn auth() -> impl Filter<Extract = (), Error = Rejection> + Copy {
    warp::header::optional::<String>("x-api-key")
        .and(warp::header::optional::<String>("x-signature"))
        .and_then(|key: Option<String>, signature: Option<String>| async move {
            let present = key.is_some_and(|value| !value.is_empty())
                && signature.is_some_and(|value| !value.is_empty());
            if present {
                Ok(())
            } else {
                Err(warp::reject::custom(Unauthorized))
            }
        })
        .untuple_one()
}

/// 拒否をJSONエラーレスポンスへ変換
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, std::convert::Infallible> {
    let (status, message) = if err.find::<Unauthorized>().is_some() {
        (StatusCode::UNAUTHORIZED, "invalid API credentials")
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found")
    } else {
        (StatusCode::BAD_REQUEST, "bad request")
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&json!({ "message": message })),
        status,
    ))
}

impl MockServer {
    /// 公開ベースURLを設定（プリサインURLの組み立てに使用）
    pub fn set_public_base(&self, base: impl Into<String>) {
        self.inner.lock().unwrap().public_base = base.into();
    }

    /// アップロード済みオブジェクトの受信バイト数を取得（テスト用）
    pub fn upload_size(&self, object_key: &str) -> Option<usize> {
        self.inner.lock().unwrap().uploads.get(object_key).copied()
    }

    /// Sillyデイリーエンドポイントの失敗を注入（テスト用）
    pub fn set_silly_failure(&self, fail: bool) {
        self.inner.lock().unwrap().fail_silly = fail;
    }

    /// ペアリング一覧レスポンスの遅延を設定（テスト用）
    pub fn set_pairings_delay_ms(&self, delay_ms: u64) {
        self.inner.lock().unwrap().pairings_delay_ms = delay_ms;
    }

    /// 全ルートを構築
    ///
    /// 呼び出し側で `.recover(handle_rejection)` を適用してください。
    pub fn routes(&self) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
        let post_pairing = {
            let state = self.clone();
            warp::path!("admin" / "daily-games" / "this-or-that" / "pairings")
                .and(warp::post())
                .and(auth())
                .and(warp::body::json())
                .map(move |request: PairingRequest| {
                    let now = Utc::now().to_rfc3339();
                    let record = PairingRecord {
                        pairing_id: Uuid::new_v4().to_string(),
                        option1: OptionRecord {
                            option_id: Uuid::new_v4().to_string(),
                            option_text: request.option1_text,
                            created_at: now.clone(),
                        },
                        option2: OptionRecord {
                            option_id: Uuid::new_v4().to_string(),
                            option_text: request.option2_text,
                            created_at: now,
                        },
                        valid_date: request.date,
                    };
                    state.inner.lock().unwrap().pairings.push(record.clone());
                    log::info!("created pairing {}", record.pairing_id);
                    warp::reply::with_status(warp::reply::json(&record), StatusCode::CREATED)
                })
        };

        let list_pairings = {
            let state = self.clone();
            warp::path!("admin" / "daily-games" / "this-or-that" / "pairings")
                .and(warp::get())
                .and(auth())
                .and(warp::query::<HashMap<String, String>>())
                .and_then(move |query: HashMap<String, String>| {
                    let state = state.clone();
                    async move {
                        let delay_ms = state.inner.lock().unwrap().pairings_delay_ms;
                        if delay_ms > 0 {
                            tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                        }
                        let date = query.get("date").cloned().unwrap_or_default();
                        let inner = state.inner.lock().unwrap();
                        let pairings: Vec<_> = inner
                            .pairings
                            .iter()
                            .filter(|pairing| pairing.valid_date == date)
                            .cloned()
                            .collect();
                        Ok::<_, Rejection>(warp::reply::json(&pairings))
                    }
                })
        };

        let delete_pairing = {
            let state = self.clone();
            warp::path!("admin" / "daily-games" / "this-or-that" / "pairings" / String)
                .and(warp::delete())
                .and(auth())
                .map(move |pairing_id: String| {
                    let mut inner = state.inner.lock().unwrap();
                    let before = inner.pairings.len();
                    inner.pairings.retain(|pairing| pairing.pairing_id != pairing_id);
                    if inner.pairings.len() < before {
                        warp::reply::with_status(
                            warp::reply::json(&json!({ "success": true })),
                            StatusCode::OK,
                        )
                    } else {
                        warp::reply::with_status(
                            warp::reply::json(&json!({ "message": "pairing not found" })),
                            StatusCode::NOT_FOUND,
                        )
                    }
                })
        };

        let post_most_likely = {
            let state = self.clone();
            warp::path!("admin" / "daily-games" / "most-likely" / "questions")
                .and(warp::post())
                .and(auth())
                .and(warp::body::json())
                .map(move |request: MostLikelyRequest| {
                    let record = MostLikelyRecord {
                        question_id: Uuid::new_v4().to_string(),
                        question_text: request.question_text,
                        image_url: request.image_url,
                    };
                    state.inner.lock().unwrap().most_likely.push(StoredMostLikely {
                        record: record.clone(),
                        date: request.date,
                    });
                    log::info!("created most-likely question {}", record.question_id);
                    warp::reply::with_status(warp::reply::json(&record), StatusCode::CREATED)
                })
        };

        let list_most_likely = {
            let state = self.clone();
            warp::path!("admin" / "daily-games" / "most-likely" / "questions")
                .and(warp::get())
                .and(auth())
                .and(warp::query::<HashMap<String, String>>())
                .map(move |query: HashMap<String, String>| {
                    let date = query.get("date").cloned().unwrap_or_default();
                    let inner = state.inner.lock().unwrap();
                    let questions: Vec<_> = inner
                        .most_likely
                        .iter()
                        .filter(|stored| stored.date == date)
                        .map(|stored| stored.record.clone())
                        .collect();
                    warp::reply::json(&json!({ "mostLikelyQuestions": questions }))
                })
        };

        let upload_url = {
            let state = self.clone();
            warp::path!("admin" / "daily-games" / "most-likely" / "upload-url")
                .and(warp::get())
                .and(auth())
                .and(warp::header::optional::<String>("content-type"))
                .map(move |content_type: Option<String>| {
                    let content_type = content_type.unwrap_or_default();
                    if !ACCEPTED_IMAGE_TYPES.contains(&content_type.as_str()) {
                        return warp::reply::with_status(
                            warp::reply::json(&json!({ "message": "unsupported content type" })),
                            StatusCode::BAD_REQUEST,
                        );
                    }
                    let object_key = format!("most-likely/{}", Uuid::new_v4());
                    let inner = state.inner.lock().unwrap();
                    let ticket = json!({
                        "preSignedURL": format!("{}/upload/{}", inner.public_base, object_key),
                        "objectKey": object_key,
                    });
                    warp::reply::with_status(warp::reply::json(&ticket), StatusCode::OK)
                })
        };

        let delete_most_likely = {
            let state = self.clone();
            warp::path!("admin" / "daily-games" / "most-likely" / String)
                .and(warp::delete())
                .and(auth())
                .map(move |question_id: String| {
                    let mut inner = state.inner.lock().unwrap();
                    let before = inner.most_likely.len();
                    inner
                        .most_likely
                        .retain(|stored| stored.record.question_id != question_id);
                    if inner.most_likely.len() < before {
                        warp::reply::with_status(
                            warp::reply::json(&json!({ "success": true })),
                            StatusCode::OK,
                        )
                    } else {
                        warp::reply::with_status(
                            warp::reply::json(&json!({ "message": "question not found" })),
                            StatusCode::NOT_FOUND,
                        )
                    }
                })
        };

        // プリサインURLのPUT先。オブジェクトキーはスラッシュを含むためtailで受ける
        let put_upload = {
            let state = self.clone();
            warp::path("upload")
                .and(warp::path::tail())
                .and(warp::put())
                .and(warp::body::bytes())
                .map(move |tail: warp::path::Tail, body: warp::hyper::body::Bytes| {
                    let object_key = tail.as_str().to_string();
                    log::info!("stored upload {} ({} bytes)", object_key, body.len());
                    state
                        .inner
                        .lock()
                        .unwrap()
                        .uploads
                        .insert(object_key, body.len());
                    warp::reply::with_status(warp::reply::json(&json!({})), StatusCode::OK)
                })
        };

        let post_silly = {
            let state = self.clone();
            warp::path!("admin" / "daily-games" / "silly-questions")
                .and(warp::post())
                .and(auth())
                .and(warp::body::json())
                .map(move |request: SillyRequest| {
                    let now = Utc::now().to_rfc3339();
                    let record = SillyRecord {
                        question_id: Uuid::new_v4().to_string(),
                        question: request.question,
                        question_date: request.date,
                        created_at: now.clone(),
                        updated_at: now,
                    };
                    state.inner.lock().unwrap().silly.push(record.clone());
                    log::info!("created silly question {}", record.question_id);
                    warp::reply::with_status(warp::reply::json(&record), StatusCode::CREATED)
                })
        };

        let daily_silly = {
            let state = self.clone();
            warp::path!("daily-games" / "silly-questions" / "daily")
                .and(warp::get())
                .and(auth())
                .and(warp::query::<HashMap<String, String>>())
                .map(move |query: HashMap<String, String>| {
                    let date = query.get("date").cloned().unwrap_or_default();
                    let inner = state.inner.lock().unwrap();
                    if inner.fail_silly {
                        return warp::reply::with_status(
                            warp::reply::json(&json!({ "message": "internal error" })),
                            StatusCode::INTERNAL_SERVER_ERROR,
                        );
                    }
                    match inner
                        .silly
                        .iter()
                        .find(|record| record.question_date == date)
                    {
                        Some(record) => warp::reply::with_status(
                            warp::reply::json(record),
                            StatusCode::OK,
                        ),
                        None => warp::reply::with_status(
                            warp::reply::json(&json!({
                                "message": "no silly question for this date"
                            })),
                            StatusCode::NOT_FOUND,
                        ),
                    }
                })
        };

        let delete_silly = {
            let state = self.clone();
            warp::path!("admin" / "daily-games" / "silly-questions" / String)
                .and(warp::delete())
                .and(auth())
                .map(move |question_id: String| {
                    let mut inner = state.inner.lock().unwrap();
                    let before = inner.silly.len();
                    inner.silly.retain(|record| record.question_id != question_id);
                    if inner.silly.len() < before {
                        warp::reply::with_status(
                            warp::reply::json(&json!({ "success": true })),
                            StatusCode::OK,
                        )
                    } else {
                        warp::reply::with_status(
                            warp::reply::json(&json!({ "message": "question not found" })),
                            StatusCode::NOT_FOUND,
                        )
                    }
                })
        };

        post_pairing
            .or(list_pairings)
            .or(delete_pairing)
            .or(post_most_likely)
            .or(list_most_likely)
            .or(upload_url)
            .or(delete_most_likely)
            .or(put_upload)
            .or(post_silly)
            .or(daily_silly)
            .or(delete_silly)
    }
}

/// エフェメラルポートでモックサーバーを起動し、アドレスを返す（テスト用）
pub async fn spawn(server: MockServer) -> SocketAddr {
    let routes = server.routes().recover(handle_rejection);
    let (addr, future) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    server.set_public_base(format!("http://{}", addr));
    tokio::spawn(future);
    addr
}
