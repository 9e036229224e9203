use crate::shared::errors::{AppError, AppResult};
use std::time::Duration;

/// 実行環境
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// `ENVIRONMENT`から実行環境を判定する
    ///
    /// 未設定の場合はビルド種別（debug_assertions）で決める
    pub fn detect() -> Self {
        match std::env::var("ENVIRONMENT") {
            Ok(value) => Self::parse(&value),
            Err(_) if cfg!(debug_assertions) => Environment::Development,
            Err(_) => Environment::Production,
        }
    }

    /// `production`（大文字小文字は区別しない）以外はすべて開発環境
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    /// `LOG_LEVEL`が無い場合のログレベル
    pub fn default_log_level(self) -> log::LevelFilter {
        match self {
            Environment::Development => log::LevelFilter::Debug,
            Environment::Production => log::LevelFilter::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// 環境変数取得エラー
#[derive(Debug, Clone)]
pub struct EnvVarError {
    pub var_name: String,
    pub message: String,
}

impl std::fmt::Display for EnvVarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "環境変数 {} を取得できません: {}", self.var_name, self.message)
    }
}

impl std::error::Error for EnvVarError {}

/// 環境変数を取得する
///
/// 起動時の環境変数を優先し、無ければビルド時に埋め込まれた値を使う。
#[macro_export]
macro_rules! get_env_var {
    ($var_name:expr) => {{
        if let Ok(value) = std::env::var($var_name) {
            Ok(value)
        } else if let Some(value) = option_env!($var_name) {
            log::debug!("{}はビルド時の値を使用します", $var_name);
            Ok(value.to_string())
        } else {
            Err($crate::shared::config::environment::EnvVarError {
                var_name: $var_name.to_string(),
                message: "起動時にもビルド時にも設定されていません".to_string(),
            })
        }
    }};
}

/// 環境変数を取得する（未設定ならNone）
#[macro_export]
macro_rules! get_env_var_optional {
    ($var_name:expr) => {{
        $crate::get_env_var!($var_name).ok()
    }};
}

/// 環境変数を取得する（未設定ならデフォルト値の文字列）
#[macro_export]
macro_rules! get_env_var_or_default {
    ($var_name:expr, $default_value:expr) => {{
        $crate::get_env_var!($var_name).unwrap_or_else(|_| $default_value.to_string())
    }};
}

/// 環境変数を読み込む
///
/// 開発ビルドの場合のみ.envファイルを読み込む。
/// ログシステム初期化前に呼ばれるため、結果は標準エラーに出力する。
pub fn load_environment_variables() {
    if !cfg!(debug_assertions) {
        return;
    }

    match dotenv::dotenv() {
        Ok(path) => eprintln!("環境ファイルを読み込みました: {}", path.display()),
        Err(e) => eprintln!("環境ファイルを読み込めませんでした（環境変数を使用します）: {e}"),
    }
}

/// `LOG_LEVEL`の値をログレベルに変換する（不明な値はNone）
fn parse_log_level(raw: &str) -> Option<log::LevelFilter> {
    raw.trim().parse().ok()
}

/// ログシステムを初期化する
///
/// `LOG_LEVEL`、無ければ実行環境に応じたレベルでenv_loggerを初期化する。
/// 二重初期化はエラーにせず無視する。
pub fn initialize_logging_system() {
    let environment = Environment::detect();
    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|raw| parse_log_level(&raw))
        .unwrap_or_else(|| environment.default_log_level());

    let initialized = env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .try_init();

    if initialized.is_ok() {
        log::info!(
            "ログシステムを初期化しました: level={log_level}, environment={}",
            environment.as_str()
        );
    }
}

/// 数値の環境変数を読み込む（パース失敗時はデフォルト値）
fn parse_env_or_default<T>(var_name: &str, raw: String, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    raw.parse().unwrap_or_else(|_| {
        log::warn!("{var_name}のパースに失敗しました。デフォルト値{default}を使用します");
        default
    })
}

/// リトライ回数の上限
pub const MAX_API_RETRIES: u32 = 10;

/// API設定を管理する構造体
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// APIサーバーのベースURL
    pub base_url: String,
    /// APIリクエストのタイムアウト（秒）
    pub timeout_seconds: u64,
    /// APIリクエストの最大リトライ回数
    pub max_retries: u32,
}

impl ApiConfig {
    /// 環境変数からAPI設定を読み込む
    ///
    /// # エラー
    /// API_SERVER_URLが未設定、または不正なURLの場合は設定エラー
    pub fn from_env() -> AppResult<Self> {
        log::debug!("ApiConfig::from_env() - 環境変数の読み込みを開始");

        let base_url = crate::get_env_var!("API_SERVER_URL").map_err(|e| {
            log::error!("API_SERVER_URLの取得に失敗しました: {e}");
            AppError::configuration(
                "API_SERVER_URLが設定されていません。.envファイルまたは環境変数を確認してください",
            )
        })?;

        let timeout_seconds = parse_env_or_default(
            "API_TIMEOUT_SECONDS",
            crate::get_env_var_or_default!("API_TIMEOUT_SECONDS", "30"),
            30,
        );
        let max_retries = parse_env_or_default(
            "API_MAX_RETRIES",
            crate::get_env_var_or_default!("API_MAX_RETRIES", "3"),
            3,
        );

        let config = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_seconds,
            max_retries,
        };
        config.validate()?;

        if Environment::detect() == Environment::Production
            && config.base_url.starts_with("http://")
            && !config.is_localhost()
        {
            log::warn!(
                "本番環境で暗号化されていないAPIサーバーURLを使用しています: {}",
                config.base_url
            );
        }

        log::info!(
            "API設定: base_url={}, timeout={}s, max_retries={}",
            config.base_url,
            config.timeout_seconds,
            config.max_retries
        );

        Ok(config)
    }

    /// 設定を検証する
    pub fn validate(&self) -> AppResult<()> {
        if self.base_url.is_empty() {
            return Err(AppError::configuration(
                "APIサーバーのベースURLが設定されていません",
            ));
        }

        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| AppError::configuration(format!("APIサーバーのURLが不正です: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::configuration(format!(
                "APIサーバーのURLはhttpまたはhttpsである必要があります: {}",
                parsed.scheme()
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(AppError::configuration(
                "APIタイムアウトは0より大きい値である必要があります",
            ));
        }

        if self.max_retries > MAX_API_RETRIES {
            return Err(AppError::configuration(format!(
                "APIリトライ回数は{MAX_API_RETRIES}以下である必要があります: {}",
                self.max_retries
            )));
        }

        Ok(())
    }

    /// APIサーバーがlocalhostかどうかを判定
    pub fn is_localhost(&self) -> bool {
        self.base_url.contains("localhost") || self.base_url.contains("127.0.0.1")
    }
}

/// 経費クエリ（キャッシュ・自動更新・ページング）の設定
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// キャッシュが新鮮とみなされる期間
    pub stale_time: Duration,
    /// 自動再取得の間隔
    pub refetch_interval: Duration,
    /// 参照されないクエリを破棄するまでの期間
    pub idle_eviction: Duration,
    /// 一覧画面の1ページあたりの件数
    pub page_size: u32,
    /// ダッシュボードの最近の経費の件数
    pub recent_limit: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(30),
            refetch_interval: Duration::from_secs(30),
            idle_eviction: Duration::from_secs(300),
            page_size: 10,
            recent_limit: 5,
        }
    }
}

impl QueryConfig {
    /// 環境変数からクエリ設定を読み込む（未設定の項目はデフォルト値）
    pub fn from_env() -> Self {
        let stale_seconds = parse_env_or_default(
            "EXPENSE_STALE_SECONDS",
            crate::get_env_var_or_default!("EXPENSE_STALE_SECONDS", "30"),
            30u64,
        );
        let refetch_seconds = parse_env_or_default(
            "EXPENSE_REFETCH_INTERVAL_SECONDS",
            crate::get_env_var_or_default!("EXPENSE_REFETCH_INTERVAL_SECONDS", "30"),
            30u64,
        );
        let idle_seconds = parse_env_or_default(
            "EXPENSE_CACHE_IDLE_SECONDS",
            crate::get_env_var_or_default!("EXPENSE_CACHE_IDLE_SECONDS", "300"),
            300u64,
        );
        let page_size = parse_env_or_default(
            "EXPENSE_PAGE_SIZE",
            crate::get_env_var_or_default!("EXPENSE_PAGE_SIZE", "10"),
            10u32,
        );
        let recent_limit = parse_env_or_default(
            "EXPENSE_RECENT_LIMIT",
            crate::get_env_var_or_default!("EXPENSE_RECENT_LIMIT", "5"),
            5u32,
        );

        Self {
            stale_time: Duration::from_secs(stale_seconds),
            // 0秒間隔はtokio::time::intervalがパニックするため1秒に切り上げる
            refetch_interval: Duration::from_secs(refetch_seconds.max(1)),
            idle_eviction: Duration::from_secs(idle_seconds),
            page_size: page_size.max(1),
            recent_limit: recent_limit.max(1),
        }
    }
}
