pub mod api;
pub mod config;
pub mod credentials;
pub mod sync;
pub mod util;

// Re-export the main error types for convenience
pub use api::{ApiError, ApiResult};
pub use credentials::{CredentialError, CredentialResult};

// Re-export the API surface for convenience
pub use api::most_likely::{MostLikelyApi, MostLikelyQuestion, UploadTicket};
pub use api::silly_questions::{SillyQuestion, SillyQuestionsApi};
pub use api::this_or_that::{ThisOrThatApi, ThisOrThatPairing};
pub use api::ApiClient;
pub use config::{AppConfig, ConfigManager};
pub use credentials::{CredentialStore, Credentials};
pub use sync::{DashboardSnapshot, DashboardSync, RefreshReport};

/// アプリケーション全体のエラー型
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// APIレイヤーのエラー
    #[error(transparent)]
    Api(#[from] api::ApiError),

    /// 認証情報ストアのエラー
    #[error(transparent)]
    Credential(#[from] credentials::CredentialError),

    /// 設定レイヤーのエラー
    #[error(transparent)]
    Config(#[from] anyhow::Error),

    /// I/Oエラー
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AdminResult<T> = Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        // Test that the main modules are accessible
        assert!(std::any::type_name::<api::ApiClient>().contains("ApiClient"));
        assert!(std::any::type_name::<credentials::CredentialStore>().contains("CredentialStore"));
        assert!(std::any::type_name::<sync::DashboardSync>().contains("DashboardSync"));
    }

    #[test]
    fn test_error_types_re_exported() {
        // Test that error types are available from the crate root
        let _api_error = ApiError::Unauthenticated;
        let _credential_error = CredentialError::EmptyApiKey;

        let admin_error: AdminError = ApiError::Unauthenticated.into();
        assert!(matches!(admin_error, AdminError::Api(_)));
    }
}
