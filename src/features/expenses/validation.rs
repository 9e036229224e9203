//! 経費入力のローカルバリデーション
//!
//! ネットワーク送信前にフォーム値を検証し、違反したフィールドをすべて列挙する。

use crate::features::categories::{Category, PaymentMethod};
use crate::features::expenses::models::{CreateExpenseDto, ExpenseDraft};
use crate::shared::errors::{AppError, AppResult, FieldError};
use crate::shared::utils::{
    is_present, is_within_length, normalize_optional, normalize_string, parse_amount,
    parse_calendar_date, parse_tags,
};

/// タイトルの最大文字数
pub const TITLE_MAX_LENGTH: usize = 100;
/// 説明の最大文字数
pub const DESCRIPTION_MAX_LENGTH: usize = 500;

/// フォーム値を検証して作成用DTOに変換する
///
/// # 戻り値
/// 検証済みDTO、または違反したすべてのフィールドを含むバリデーションエラー
///
/// # バリデーション規則
/// - title: 必須、100文字以内
/// - amount: 必須、数値、0より大きい
/// - category: 必須、既定のカテゴリであること
/// - date: 必須、実在する日付（YYYY-MM-DD）
/// - paymentMethod: 任意、既定の支払い方法であること（未指定はCash）
/// - description: 任意、500文字以内
pub fn validate_draft(draft: &ExpenseDraft) -> AppResult<CreateExpenseDto> {
    let mut errors = Vec::new();

    let title = normalize_string(&draft.title);
    if !is_present(&title) {
        errors.push(FieldError::new("title", "Title is required"));
    } else if !is_within_length(&title, TITLE_MAX_LENGTH) {
        errors.push(FieldError::new(
            "title",
            format!("Title must be less than {TITLE_MAX_LENGTH} characters"),
        ));
    }

    let amount = if !is_present(&draft.amount) {
        errors.push(FieldError::new("amount", "Amount is required"));
        None
    } else {
        match parse_amount(&draft.amount) {
            None => {
                errors.push(FieldError::new("amount", "Amount must be a number"));
                None
            }
            Some(value) if value <= 0.0 => {
                errors.push(FieldError::new("amount", "Amount must be greater than 0"));
                None
            }
            Some(value) => Some(value),
        }
    };

    let category = if !is_present(&draft.category) {
        errors.push(FieldError::new("category", "Category is required"));
        None
    } else {
        match draft.category.parse::<Category>() {
            Ok(category) => Some(category),
            Err(_) => {
                errors.push(FieldError::new("category", "Category is not recognized"));
                None
            }
        }
    };

    let date = if !is_present(&draft.date) {
        errors.push(FieldError::new("date", "Date is required"));
        None
    } else {
        let parsed = parse_calendar_date(&draft.date);
        if parsed.is_none() {
            errors.push(FieldError::new("date", "Date must be a valid calendar date"));
        }
        parsed
    };

    let payment_method = match normalize_optional(draft.payment_method.as_deref()) {
        None => PaymentMethod::default(),
        Some(raw) => raw.parse::<PaymentMethod>().unwrap_or_else(|_| {
            errors.push(FieldError::new(
                "paymentMethod",
                "Payment method is not recognized",
            ));
            PaymentMethod::default()
        }),
    };

    let description = normalize_optional(draft.description.as_deref());
    if let Some(desc) = &description {
        if !is_within_length(desc, DESCRIPTION_MAX_LENGTH) {
            errors.push(FieldError::new(
                "description",
                format!("Description must be less than {DESCRIPTION_MAX_LENGTH} characters"),
            ));
        }
    }

    let tags = draft.tags.as_deref().map(parse_tags).unwrap_or_default();

    match (amount, category, date) {
        (Some(amount), Some(category), Some(date)) if errors.is_empty() => Ok(CreateExpenseDto {
            title,
            amount,
            category,
            date,
            payment_method,
            description,
            tags,
        }),
        _ => {
            log::debug!("経費入力のバリデーションに失敗しました: {errors:?}");
            Err(AppError::Validation(errors))
        }
    }
}
