//! モックサーバーに対する統合テスト
//!
//! 各テストはエフェメラルポートで独立したモックサーバーを起動します。

use chrono::NaiveDate;
use dgadmin::api::most_likely::QuestionId;
use dgadmin::{
    ApiClient, ApiError, CredentialStore, DashboardSync, MostLikelyApi, MostLikelyQuestion,
    SillyQuestion, SillyQuestionsApi, ThisOrThatApi, ThisOrThatPairing,
};
use mock_server::MockServer;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn date(text: &str) -> NaiveDate {
    text.parse().unwrap()
}

/// モックサーバーと認証済みクライアントを用意
async fn setup() -> (MockServer, Arc<ApiClient>, TempDir) {
    let server = MockServer::default();
    let addr = mock_server::spawn(server.clone()).await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(CredentialStore::new(dir.path().to_path_buf()));
    store.set_credentials("test-key", "test-signature").unwrap();

    let client = Arc::new(ApiClient::new(format!("http://{}", addr), 5_000, store).unwrap());
    (server, client, dir)
}

#[tokio::test]
async fn test_unauthenticated_request_fails_before_network() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(CredentialStore::new(dir.path().to_path_buf()));

    // 到達不能なベースURL。ネットワークに出ればNetworkエラーになるはず
    let client = Arc::new(ApiClient::new("http://127.0.0.1:9", 1_000, store).unwrap());
    let api = ThisOrThatApi::new(client);

    let result = api.get_pairings(date("2024-05-01")).await;
    assert!(matches!(result, Err(ApiError::Unauthenticated)));
}

#[tokio::test]
async fn test_pairing_lifecycle() {
    let (_server, client, _dir) = setup().await;
    let api = ThisOrThatApi::new(client);
    let target = date("2024-05-01");

    let created = api
        .post_pairing(&ThisOrThatPairing {
            option1_text: "Pizza".to_string(),
            option2_text: "Burger".to_string(),
            date: target,
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.option1.option_text, "Pizza");
    assert_eq!(created.valid_date, "2024-05-01");

    let listed = api.get_pairings(target).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].pairing_id, created.pairing_id);

    assert!(api.delete_pairing(&created.pairing_id).await.unwrap());
    assert!(api.get_pairings(target).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pairing_list_is_date_scoped() {
    let (_server, client, _dir) = setup().await;
    let api = ThisOrThatApi::new(client);

    for day in ["2024-05-01", "2024-05-02"] {
        api.post_pairing(&ThisOrThatPairing {
            option1_text: "Tea".to_string(),
            option2_text: "Coffee".to_string(),
            date: date(day),
        })
        .await
        .unwrap();
    }

    let listed = api.get_pairings(date("2024-05-01")).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].valid_date, "2024-05-01");
}

#[tokio::test]
async fn test_image_upload_and_question_creation() {
    let (server, client, _dir) = setup().await;
    let api = MostLikelyApi::new(client);
    let target = date("2024-05-01");

    let bytes = vec![0x89, 0x50, 0x4e, 0x47];
    let object_key = api.upload_image(bytes.clone(), "image/png").await.unwrap();
    assert!(object_key.starts_with("most-likely/"));
    assert_eq!(server.upload_size(&object_key), Some(bytes.len()));

    let created = api
        .post_question(&MostLikelyQuestion {
            question_text: "Who is most likely to oversleep?".to_string(),
            image_url: Some(object_key.clone()),
            date: target,
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.image_url.as_deref(), Some(object_key.as_str()));

    let listed = api.get_questions(target).await.unwrap();
    assert_eq!(listed.most_likely_questions.len(), 1);
}

#[tokio::test]
async fn test_image_upload_rejects_unknown_content_type() {
    let (server, client, _dir) = setup().await;
    let api = MostLikelyApi::new(client);

    let result = api.upload_image(vec![1, 2, 3], "image/gif").await;
    assert!(matches!(result, Err(ApiError::InvalidFileType(_))));
    // 検証で弾かれた場合はアップロードが発生しない
    assert_eq!(server.upload_size("most-likely"), None);
}

#[tokio::test]
async fn test_most_likely_delete() {
    let (_server, client, _dir) = setup().await;
    let api = MostLikelyApi::new(client);
    let target = date("2024-05-01");

    let created = api
        .post_question(&MostLikelyQuestion {
            question_text: "Who is most likely to win?".to_string(),
            image_url: None,
            date: target,
        })
        .await
        .unwrap()
        .unwrap();

    assert!(api.delete_question(&created.question_id).await.unwrap());
    let listed = api.get_questions(target).await.unwrap();
    assert!(listed.most_likely_questions.is_empty());
}

#[tokio::test]
async fn test_silly_question_daily_lookup() {
    let (_server, client, _dir) = setup().await;
    let api = SillyQuestionsApi::new(client);
    let target = date("2024-05-01");

    // 未登録の日は空状態
    assert!(api.get_daily_question(target).await.unwrap().is_none());

    api.post_question(&SillyQuestion {
        question: "What sound does a shy robot make?".to_string(),
        date: target,
    })
    .await
    .unwrap();

    let daily = api.get_daily_question(target).await.unwrap().unwrap();
    assert_eq!(daily.question, "What sound does a shy robot make?");
    assert_eq!(daily.question_date, "2024-05-01");

    assert!(api
        .get_daily_question(date("2024-05-02"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_dashboard_sync_refresh_after_create() {
    let (_server, client, _dir) = setup().await;
    let target = date("2024-05-01");
    let sync = DashboardSync::new(client, target);

    let report = sync.refresh_all().await;
    assert!(report.is_ok());
    assert!(sync.snapshot().pairings.is_empty());

    sync.create_pairing(&ThisOrThatPairing {
        option1_text: "Cats".to_string(),
        option2_text: "Dogs".to_string(),
        date: target,
    })
    .await
    .unwrap();
    sync.create_silly(&SillyQuestion {
        question: "Why is the moon shy?".to_string(),
        date: target,
    })
    .await
    .unwrap();

    let snapshot = sync.snapshot();
    assert_eq!(snapshot.selected_date, target);
    assert_eq!(snapshot.pairings.len(), 1);
    assert!(snapshot.silly.is_some());
    assert!(snapshot.most_likely.is_empty());
}

#[tokio::test]
async fn test_dashboard_sync_date_switch_clears_other_day() {
    let (_server, client, _dir) = setup().await;
    let first = date("2024-05-01");
    let second = date("2024-05-02");
    let sync = DashboardSync::new(client, first);

    sync.create_pairing(&ThisOrThatPairing {
        option1_text: "Rain".to_string(),
        option2_text: "Snow".to_string(),
        date: first,
    })
    .await
    .unwrap();
    assert_eq!(sync.snapshot().pairings.len(), 1);

    let report = sync.select_date(second).await;
    assert!(report.is_ok());

    let snapshot = sync.snapshot();
    assert_eq!(snapshot.selected_date, second);
    assert!(snapshot.pairings.is_empty());

    sync.select_date(first).await;
    assert_eq!(sync.snapshot().pairings.len(), 1);
}

#[tokio::test]
async fn test_refresh_failure_is_isolated_per_entity() {
    let (server, client, _dir) = setup().await;
    let target = date("2024-05-01");
    let sync = DashboardSync::new(client, target);

    sync.create_pairing(&ThisOrThatPairing {
        option1_text: "Cats".to_string(),
        option2_text: "Dogs".to_string(),
        date: target,
    })
    .await
    .unwrap();
    sync.create_most_likely(&MostLikelyQuestion {
        question_text: "Who is most likely to nap?".to_string(),
        image_url: None,
        date: target,
    })
    .await
    .unwrap();

    server.set_silly_failure(true);
    let report = sync.refresh_all().await;

    // Sillyだけが失敗し、他の2エンティティはエラーなしで更新される
    assert!(matches!(
        report.silly,
        Some(ApiError::RequestFailed { status: 500, .. })
    ));
    assert!(report.this_or_that.is_none());
    assert!(report.most_likely.is_none());

    let snapshot = sync.snapshot();
    assert_eq!(snapshot.pairings.len(), 1);
    assert_eq!(snapshot.most_likely.len(), 1);
}

#[tokio::test]
async fn test_stale_pairing_fetch_is_discarded_after_date_change() {
    let (server, client, _dir) = setup().await;
    let first = date("2024-05-01");
    let second = date("2024-05-02");

    let api = ThisOrThatApi::new(Arc::clone(&client));
    api.post_pairing(&ThisOrThatPairing {
        option1_text: "Rain".to_string(),
        option2_text: "Snow".to_string(),
        date: first,
    })
    .await
    .unwrap();

    let sync = DashboardSync::new(client, first);

    // 最初の日付のペアリング取得を遅延させ、その応答が届く前に
    // 日付を切り替える。切り替え後の取得は遅延なしで先に完了する
    server.set_pairings_delay_ms(300);
    let (stale_report, fresh_report) = tokio::join!(sync.refresh_all(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        server.set_pairings_delay_ms(0);
        sync.select_date(second).await
    });
    assert!(stale_report.is_ok());
    assert!(fresh_report.is_ok());

    // 遅れて届いた古い日付の一覧は選択中の表示を上書きしない
    let snapshot = sync.snapshot();
    assert_eq!(snapshot.selected_date, second);
    assert!(snapshot.pairings.is_empty());
}

#[tokio::test]
async fn test_delete_missing_most_likely_reports_server_message() {
    let (_server, client, _dir) = setup().await;
    let api = MostLikelyApi::new(client);

    let result = api
        .delete_question(&QuestionId("no-such-id".to_string()))
        .await;
    match result {
        Err(ApiError::RequestFailed { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "question not found");
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}
