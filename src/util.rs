//! 共通ユーティリティ

use chrono::NaiveDate;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログ初期化
pub fn init_logging(default_level: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact(),
    );

    subscriber.try_init()?;

    Ok(())
}

/// 日付フィールドが指定日と一致するか
///
/// サーバーは日付（`2024-05-01`）またはタイムスタンプ
/// （`2024-05-01T10:00:00Z`）のどちらかの形を返すため、
/// 先頭の日付部分のみを比較します。
pub fn matches_date(value: &str, date: NaiveDate) -> bool {
    let date_str = date.format("%Y-%m-%d").to_string();
    value.get(..10).is_some_and(|head| head == date_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn may_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_matches_plain_date() {
        assert!(matches_date("2024-05-01", may_first()));
        assert!(!matches_date("2024-05-02", may_first()));
    }

    #[test]
    fn test_matches_timestamp_date_portion() {
        assert!(matches_date("2024-05-01T10:00:00Z", may_first()));
        assert!(!matches_date("2024-05-02T00:00:00Z", may_first()));
    }

    #[test]
    fn test_short_or_empty_value_never_matches() {
        assert!(!matches_date("", may_first()));
        assert!(!matches_date("2024-05", may_first()));
    }
}
