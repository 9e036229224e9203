/// 共有エラー型とエラーハンドリング
pub mod errors;

/// 共有設定管理
pub mod config;

/// APIサーバーとの通信
pub mod api_client;

/// クエリキャッシュ
pub mod query_cache;

/// 共有ユーティリティ関数
pub mod utils;

// 便利な再エクスポート
pub use api_client::{ApiClient, ApiClientConfig, ErrorResponse};
pub use config::{
    initialize_logging_system, load_environment_variables, ApiConfig, Environment, QueryConfig,
};
pub use errors::{AppError, AppResult, ErrorSeverity, FieldError};
pub use query_cache::{CacheEntry, CacheKey, InMemoryQueryCache, QueryCache};
