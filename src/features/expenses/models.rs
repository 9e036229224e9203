use crate::features::categories::{Category, PaymentMethod};
use crate::shared::utils::date_format;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 経費データモデル
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// サーバーが採番する識別子
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub amount: f64,
    pub category: Category,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// 経費入力フォームの値（未検証）
///
/// フォームが保持する文字列のまま受け取り、`validate_draft`で
/// `CreateExpenseDto`に変換する
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub title: String,
    pub amount: String,
    pub category: String,
    pub date: String,
    pub payment_method: Option<String>,
    pub description: Option<String>,
    /// カンマ区切りのタグ（例: "business, travel"）
    pub tags: Option<String>,
}

impl ExpenseDraft {
    /// 日付を今日で初期化したフォーム値を作成
    pub fn with_today() -> Self {
        Self {
            date: crate::shared::utils::today().format("%Y-%m-%d").to_string(),
            ..Self::default()
        }
    }
}

/// 経費作成用DTO（検証済み、POSTボディ）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseDto {
    pub title: String,
    pub amount: f64,
    pub category: Category,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
}

/// ページング情報
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 現在のページ（1始まり）
    pub page: u32,
    /// 総ページ数
    pub pages: u32,
    /// 総件数
    pub total: u64,
}

impl Pagination {
    /// 空のコレクションに対するページング情報
    pub fn empty(page: u32) -> Self {
        Self {
            page,
            pages: 0,
            total: 0,
        }
    }
}

/// 経費一覧の1ページ分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpensePage {
    pub data: Vec<Expense>,
    pub pagination: Pagination,
}

/// 月別集計のキー
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

/// 月別合計
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    #[serde(rename = "_id")]
    pub month: MonthKey,
    pub total: f64,
    #[serde(default)]
    pub count: u64,
}

/// カテゴリ別合計
///
/// カテゴリ名はサーバーの集計結果をそのまま保持する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    #[serde(rename = "_id")]
    pub category: String,
    pub total: f64,
    #[serde(default)]
    pub count: u64,
}

/// 経費の集計
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseStats {
    #[serde(default)]
    pub total_expenses: f64,
    /// 月別合計（古い順）
    #[serde(default)]
    pub monthly_expenses: Vec<MonthlyTotal>,
    /// カテゴリ別合計（順不同）
    #[serde(default)]
    pub expenses_by_category: Vec<CategoryTotal>,
}

impl ExpenseStats {
    /// 月別合計を古い順に並べ替える
    pub fn sort_chronologically(&mut self) {
        self.monthly_expenses.sort_by_key(|m| m.month);
    }
}

/// `{ data: T }`形式のレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// 経費一覧レスポンス（最近の経費ではpaginationが無い）
#[derive(Debug, Serialize, Deserialize)]
pub struct ExpenseListEnvelope {
    #[serde(default)]
    pub data: Vec<Expense>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl ExpenseListEnvelope {
    /// ページとして解釈する（ページング情報が無い場合は件数から補完）
    pub fn into_page(self, requested_page: u32) -> ExpensePage {
        let pagination = self.pagination.unwrap_or_else(|| {
            if self.data.is_empty() {
                Pagination::empty(requested_page)
            } else {
                Pagination {
                    page: requested_page,
                    pages: requested_page,
                    total: self.data.len() as u64,
                }
            }
        });

        ExpensePage {
            data: self.data,
            pagination,
        }
    }
}
