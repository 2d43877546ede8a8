//! ビュー同期レイヤー
//!
//! 選択中の日付に対する各エンティティの最新一覧を保持します。
//! 日付変更で3エンティティすべて、作成・削除では該当エンティティのみを
//! 再取得します。取得結果は発行時の日付タグが選択中の日付と一致する場合
//! のみ反映します（遅延レスポンスによる上書きを防ぐ）。

use chrono::NaiveDate;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::api::most_likely::{
    MostLikelyApi, MostLikelyQuestion, MostLikelyQuestionResponse, QuestionId,
};
use crate::api::silly_questions::{
    SillyQuestion, SillyQuestionId, SillyQuestionResponse, SillyQuestionsApi,
};
use crate::api::this_or_that::{
    PairingId, ThisOrThatApi, ThisOrThatPairing, ThisOrThatPairingResponse,
};
use crate::api::{ApiClient, ApiError, ApiResult};
use crate::util::matches_date;

/// ダッシュボード状態のスナップショット
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub selected_date: NaiveDate,
    pub pairings: Vec<ThisOrThatPairingResponse>,
    pub most_likely: Vec<MostLikelyQuestionResponse>,
    pub silly: Option<SillyQuestionResponse>,
}

/// 一括リフレッシュの結果
///
/// エンティティごとに独立（1つの失敗は他の2つの表示に影響しない）。
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub this_or_that: Option<ApiError>,
    pub most_likely: Option<ApiError>,
    pub silly: Option<ApiError>,
}

impl RefreshReport {
    pub fn is_ok(&self) -> bool {
        self.this_or_that.is_none() && self.most_likely.is_none() && self.silly.is_none()
    }
}

struct DashboardState {
    selected_date: NaiveDate,
    pairings: Vec<ThisOrThatPairingResponse>,
    most_likely: Vec<MostLikelyQuestionResponse>,
    silly: Option<SillyQuestionResponse>,
}

/// ダッシュボード同期サービス
///
/// ロックはawaitをまたいで保持しません。
pub struct DashboardSync {
    this_or_that: ThisOrThatApi,
    most_likely: MostLikelyApi,
    silly: SillyQuestionsApi,
    state: RwLock<DashboardState>,
}

impl DashboardSync {
    pub fn new(client: Arc<ApiClient>, initial_date: NaiveDate) -> Self {
        Self {
            this_or_that: ThisOrThatApi::new(Arc::clone(&client)),
            most_likely: MostLikelyApi::new(Arc::clone(&client)),
            silly: SillyQuestionsApi::new(client),
            state: RwLock::new(DashboardState {
                selected_date: initial_date,
                pairings: Vec::new(),
                most_likely: Vec::new(),
                silly: None,
            }),
        }
    }

    /// 選択中の日付を取得
    pub fn selected_date(&self) -> NaiveDate {
        self.state.read().selected_date
    }

    /// 現在の状態のスナップショットを取得
    pub fn snapshot(&self) -> DashboardSnapshot {
        let state = self.state.read();
        DashboardSnapshot {
            selected_date: state.selected_date,
            pairings: state.pairings.clone(),
            most_likely: state.most_likely.clone(),
            silly: state.silly.clone(),
        }
    }

    /// 日付を変更し、3エンティティすべてを再取得
    pub async fn select_date(&self, date: NaiveDate) -> RefreshReport {
        self.state.write().selected_date = date;
        self.refresh_all().await
    }

    /// 選択中の日付で3エンティティすべてを再取得
    ///
    /// 3つの取得は互いに独立で、並行に実行されます。
    pub async fn refresh_all(&self) -> RefreshReport {
        let date = self.selected_date();

        let (pairings, most_likely, silly) = tokio::join!(
            self.refresh_pairings_for(date),
            self.refresh_most_likely_for(date),
            self.refresh_silly_for(date),
        );

        let report = RefreshReport {
            this_or_that: pairings.err(),
            most_likely: most_likely.err(),
            silly: silly.err(),
        };
        if !report.is_ok() {
            tracing::warn!("📋 Dashboard refresh finished with failures: {:?}", report);
        }
        report
    }

    async fn refresh_pairings_for(&self, issued_for: NaiveDate) -> ApiResult<()> {
        let pairings: Vec<_> = self
            .this_or_that
            .get_pairings(issued_for)
            .await?
            .into_iter()
            .filter(|pairing| matches_date(&pairing.valid_date, issued_for))
            .collect();

        let mut state = self.state.write();
        if state.selected_date == issued_for {
            state.pairings = pairings;
        } else {
            tracing::debug!("📅 Discarding stale pairing list for {}", issued_for);
        }
        Ok(())
    }

    async fn refresh_most_likely_for(&self, issued_for: NaiveDate) -> ApiResult<()> {
        // Most-Likelyの読み取り形は日付フィールドを持たないため、
        // サーバー側フィルタの結果をそのまま受け入れる
        let questions = self.most_likely.get_questions(issued_for).await?;

        let mut state = self.state.write();
        if state.selected_date == issued_for {
            state.most_likely = questions.most_likely_questions;
        } else {
            tracing::debug!("📅 Discarding stale most-likely list for {}", issued_for);
        }
        Ok(())
    }

    async fn refresh_silly_for(&self, issued_for: NaiveDate) -> ApiResult<()> {
        let question = self
            .silly
            .get_daily_question(issued_for)
            .await?
            .filter(|question| matches_date(&question.question_date, issued_for));

        let mut state = self.state.write();
        if state.selected_date == issued_for {
            state.silly = question;
        } else {
            tracing::debug!("📅 Discarding stale silly question for {}", issued_for);
        }
        Ok(())
    }

    /// ペアリングを作成し、成功後に該当一覧のみ再取得
    pub async fn create_pairing(
        &self,
        pairing: &ThisOrThatPairing,
    ) -> ApiResult<Option<ThisOrThatPairingResponse>> {
        let created = self.this_or_that.post_pairing(pairing).await?;
        self.refresh_pairings_for(self.selected_date()).await?;
        Ok(created)
    }

    /// ペアリングを削除し、成功後に該当一覧のみ再取得
    pub async fn delete_pairing(&self, pairing_id: &PairingId) -> ApiResult<bool> {
        let deleted = self.this_or_that.delete_pairing(pairing_id).await?;
        self.refresh_pairings_for(self.selected_date()).await?;
        Ok(deleted)
    }

    /// Most-Likely質問を作成し、成功後に該当一覧のみ再取得
    pub async fn create_most_likely(
        &self,
        question: &MostLikelyQuestion,
    ) -> ApiResult<Option<MostLikelyQuestionResponse>> {
        let created = self.most_likely.post_question(question).await?;
        self.refresh_most_likely_for(self.selected_date()).await?;
        Ok(created)
    }

    /// Most-Likely質問を削除し、成功後に該当一覧のみ再取得
    pub async fn delete_most_likely(&self, question_id: &QuestionId) -> ApiResult<bool> {
        let deleted = self.most_likely.delete_question(question_id).await?;
        self.refresh_most_likely_for(self.selected_date()).await?;
        Ok(deleted)
    }

    /// Silly質問を作成し、成功後に該当エントリのみ再取得
    pub async fn create_silly(
        &self,
        question: &SillyQuestion,
    ) -> ApiResult<Option<SillyQuestionResponse>> {
        let created = self.silly.post_question(question).await?;
        self.refresh_silly_for(self.selected_date()).await?;
        Ok(created)
    }

    /// Silly質問を削除し、成功後に該当エントリのみ再取得
    pub async fn delete_silly(&self, question_id: &SillyQuestionId) -> ApiResult<bool> {
        let deleted = self.silly.delete_question(question_id).await?;
        self.refresh_silly_for(self.selected_date()).await?;
        Ok(deleted)
    }
}
