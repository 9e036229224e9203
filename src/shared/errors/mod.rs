use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 入力フィールド単位のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// フィールド名（フォームのキーと一致）
    pub field: String,
    /// ユーザーに表示するメッセージ
    pub message: String,
}

impl FieldError {
    pub fn new<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// ローカルバリデーションエラー（ネットワークには到達しない）
    #[error("バリデーションエラー: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// 一時的な通信エラー（ネットワーク障害・5xx、リトライ可能）
    ///
    /// `server_message`はAPIサーバーが返したエラーメッセージ（ある場合のみ）
    #[error("一時的な通信エラー: {detail}")]
    TransientFetch {
        detail: String,
        server_message: Option<String>,
    },

    /// セッション期限切れ（401/403、再認証が必要）
    #[error("認証期限切れ: {0}")]
    AuthExpired(String),

    /// リソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// APIサーバーがリクエストを拒否した（その他の4xx）
    #[error(
        "APIサーバーがリクエストを拒否しました: status={status}, message={}",
        .server_message.as_deref().unwrap_or("-")
    )]
    Rejected {
        status: u16,
        server_message: Option<String>,
    },

    /// レスポンスを解釈できない
    #[error("レスポンス解析エラー: {0}")]
    InvalidResponse(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// エラーの重要度を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// 低重要度（ユーザー入力エラーなど）
    Low,
    /// 中重要度（外部サービス一時的エラーなど）
    Medium,
    /// 高重要度（設定エラーなど）
    High,
    /// 最重要（認証エラーなど）
    Critical,
}

/// メッセージが無い場合に表示する汎用メッセージ
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

impl AppError {
    /// ユーザーに表示するためのフレンドリーなメッセージを取得
    ///
    /// # 戻り値
    /// ユーザーに表示可能なエラーメッセージ
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Validation(errors) => errors
                .first()
                .map(|e| e.message.as_str())
                .unwrap_or("Please check the form for errors"),
            AppError::TransientFetch { server_message, .. } => server_message
                .as_deref()
                .unwrap_or("Could not reach the server. Please try again."),
            AppError::AuthExpired(_) => "Your session has expired. Please log in again.",
            AppError::NotFound(_) => "The requested expense no longer exists",
            AppError::Rejected { server_message, .. } => {
                server_message.as_deref().unwrap_or(GENERIC_ERROR_MESSAGE)
            }
            AppError::InvalidResponse(_) => GENERIC_ERROR_MESSAGE,
            AppError::Configuration(_) => "The application is not configured correctly",
        }
    }

    /// APIサーバーがエラーレスポンスで返したメッセージ
    ///
    /// # 戻り値
    /// サーバーが応答しメッセージを含めていた場合のみSome
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AppError::TransientFetch { server_message, .. }
            | AppError::Rejected { server_message, .. } => server_message.as_deref(),
            _ => None,
        }
    }

    /// エラーの詳細情報を取得
    ///
    /// # 戻り値
    /// エラーの詳細情報（ログ出力用）
    pub fn details(&self) -> String {
        format!("{self}")
    }

    /// エラーの重要度を取得
    ///
    /// # 戻り値
    /// エラーの重要度レベル
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Validation(_) => ErrorSeverity::Low,
            AppError::NotFound(_) => ErrorSeverity::Low,
            AppError::Rejected { .. } => ErrorSeverity::Low,
            AppError::TransientFetch { .. } => ErrorSeverity::Medium,
            AppError::InvalidResponse(_) => ErrorSeverity::Medium,
            AppError::Configuration(_) => ErrorSeverity::High,
            AppError::AuthExpired(_) => ErrorSeverity::Critical,
        }
    }

    /// 呼び出し側でリトライしてよいエラーかどうか
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::TransientFetch { .. })
    }

    /// 再認証フローへの遷移が必要かどうか
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AppError::AuthExpired(_))
    }

    /// バリデーションエラーのフィールド一覧（それ以外は空）
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            AppError::Validation(errors) => errors,
            _ => &[],
        }
    }

    /// 単一フィールドのバリデーションエラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `field` - フィールド名
    /// * `message` - バリデーションエラーメッセージ
    ///
    /// # 戻り値
    /// バリデーションエラー
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }

    /// リソース未発見エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `resource` - 見つからなかったリソース名
    ///
    /// # 戻り値
    /// リソース未発見エラー
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        AppError::NotFound(format!("{}が見つかりません", resource.into()))
    }

    /// 一時的な通信エラーを作成するヘルパー関数（サーバーのメッセージなし）
    pub fn transient<S: Into<String>>(detail: S) -> Self {
        AppError::TransientFetch {
            detail: detail.into(),
            server_message: None,
        }
    }

    /// 認証期限切れエラーを作成するヘルパー関数
    pub fn auth_expired<S: Into<String>>(message: S) -> Self {
        AppError::AuthExpired(message.into())
    }

    /// 設定エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `message` - 設定エラーメッセージ
    ///
    /// # 戻り値
    /// 設定エラー
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }
}

/// AppErrorからStringへの変換（表示層での使用のため）
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.user_message().to_string()
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;
