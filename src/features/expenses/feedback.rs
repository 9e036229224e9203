//! 操作結果の表示層向け分類
//!
//! 作成・削除の結果から、通知メッセージ・フィールドエラー・
//! ログイン画面への遷移要否を決める。

use crate::features::expenses::client::DeleteOutcome;
use crate::features::expenses::models::Expense;
use crate::shared::errors::{AppError, AppResult, FieldError};
use serde::{Deserialize, Serialize};

/// 通知の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// ユーザーへの通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// 失敗時の通知メッセージの決め方
#[derive(Debug, Clone, Copy)]
enum FailureMessage<'a> {
    /// サーバーのメッセージがあればそれを、無ければ既定のメッセージを使う
    ServerOr(&'a str),
    /// 常に既定のメッセージを使う
    Fixed(&'a str),
}

/// 表示層が行うべき対応
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// 通知（トースト）
    pub notice: Option<Notice>,
    /// フォームのフィールドごとのエラー
    pub field_errors: Vec<FieldError>,
    /// ログイン画面へ遷移する必要があるか
    pub redirect_to_login: bool,
}

const CREATE_SUCCESS: &str = "Expense added successfully!";
const CREATE_FAILURE: &str = "Failed to add expense";
const DELETE_SUCCESS: &str = "Expense deleted successfully";
const DELETE_FAILURE: &str = "Failed to delete expense";

impl Feedback {
    /// 経費作成の結果を分類する
    pub fn for_create(result: &AppResult<Expense>) -> Self {
        match result {
            Ok(_) => Self::notice(Notice::success(CREATE_SUCCESS)),
            Err(error) => Self::for_error(error, FailureMessage::ServerOr(CREATE_FAILURE)),
        }
    }

    /// 経費削除の結果を分類する
    pub fn for_delete(result: &AppResult<DeleteOutcome>) -> Self {
        match result {
            Ok(DeleteOutcome::Cancelled) => Self::default(),
            Ok(DeleteOutcome::Deleted) | Ok(DeleteOutcome::AlreadyAbsent) => {
                Self::notice(Notice::success(DELETE_SUCCESS))
            }
            Err(error) => Self::for_error(error, FailureMessage::Fixed(DELETE_FAILURE)),
        }
    }

    /// 取得系の失敗を分類する（成功時は何も表示しない）
    pub fn for_fetch<T>(result: &AppResult<T>) -> Self {
        match result {
            Ok(_) => Self::default(),
            Err(error) => Self::for_error(error, FailureMessage::Fixed(error.user_message())),
        }
    }

    fn notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            ..Self::default()
        }
    }

    fn for_error(error: &AppError, failure: FailureMessage<'_>) -> Self {
        match error {
            // バリデーションエラーはフォーム上に表示し、通知は出さない
            AppError::Validation(errors) => Self {
                field_errors: errors.clone(),
                ..Self::default()
            },
            AppError::AuthExpired(_) => Self {
                notice: Some(Notice::error(error.user_message())),
                redirect_to_login: true,
                ..Self::default()
            },
            _ => {
                let message = match failure {
                    FailureMessage::ServerOr(fallback) => error.server_message().unwrap_or(fallback),
                    FailureMessage::Fixed(message) => message,
                };
                Self::notice(Notice::error(message))
            }
        }
    }
}
