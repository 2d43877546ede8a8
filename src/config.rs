//! アプリケーション設定管理モジュール
//!
//! XDGディレクトリを使用した設定ファイルの永続化と管理を提供します。

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// ログ設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// ログレベル (trace/debug/info/warn/error)
    pub log_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// アプリケーション設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 管理APIのベースURL
    pub api_base_url: String,

    /// リクエストタイムアウト（ミリ秒）
    pub request_timeout_ms: u64,

    /// ログ設定
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            // ローカル開発用のデフォルト。ステージング等は設定で切り替える
            api_base_url: "http://localhost:8080".to_string(),
            request_timeout_ms: 15000,
            log: LogConfig::default(),
        }
    }
}

/// 設定管理
pub struct ConfigManager {
    /// 設定ファイルのパス
    config_path: PathBuf,
}

impl ConfigManager {
    /// デフォルトの設定ディレクトリを使用してConfigManagerを作成
    pub fn new() -> Result<Self> {
        let config_dir = ProjectDirs::from("in", "miloapp", "dgadmin")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .context("Failed to determine config directory")?;

        Ok(Self::with_config_dir(config_dir))
    }

    /// 指定ディレクトリを使用してConfigManagerを作成
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        let config_path = config_dir.join("config.toml");
        Self { config_path }
    }

    /// 設定を読み込み
    ///
    /// ファイルが存在しない場合はデフォルト設定を返します。
    pub fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!(
                "⚙️ No config file at {}, using defaults",
                self.config_path.display()
            );
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config: {}", self.config_path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", self.config_path.display()))?;

        debug!("⚙️ Config loaded from {}", self.config_path.display());
        Ok(config)
    }

    /// 設定を保存
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, toml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path.display()))?;

        info!("⚙️ Config saved to {}", self.config_path.display());
        Ok(())
    }

    /// 設定ファイルのパスを取得
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout_ms, 15000);
        assert_eq!(config.log.log_level, "info");
    }

    #[test]
    fn test_load_missing_config_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_config_dir(temp_dir.path().to_path_buf());

        let config = manager.load_config().unwrap();
        assert_eq!(config.api_base_url, AppConfig::default().api_base_url);
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_config_dir(temp_dir.path().to_path_buf());

        let config = AppConfig {
            api_base_url: "https://api.staging.miloapp.in".to_string(),
            request_timeout_ms: 30000,
            log: LogConfig {
                log_level: "debug".to_string(),
            },
        };
        manager.save_config(&config).unwrap();

        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded.api_base_url, "https://api.staging.miloapp.in");
        assert_eq!(loaded.request_timeout_ms, 30000);
        assert_eq!(loaded.log.log_level, "debug");
    }

    #[test]
    fn test_load_config_is_repeatable() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_config_dir(temp_dir.path().to_path_buf());

        let config = AppConfig {
            api_base_url: "http://localhost:9090".to_string(),
            request_timeout_ms: 5000,
            log: LogConfig {
                log_level: "debug".to_string(),
            },
        };
        manager.save_config(&config).unwrap();

        // ログレベル決定のために初期化前にも読むため、連続読みで同じ結果を返すこと
        let first = manager.load_config().unwrap();
        let second = manager.load_config().unwrap();
        assert_eq!(first.log.log_level, second.log.log_level);
        assert_eq!(first.api_base_url, second.api_base_url);
    }

    #[test]
    fn test_config_toml_format() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_config_dir(temp_dir.path().to_path_buf());

        manager.save_config(&AppConfig::default()).unwrap();

        let content = fs::read_to_string(manager.config_path()).unwrap();
        assert!(content.contains("api_base_url"));
        assert!(content.contains("[log]"));
    }
}
