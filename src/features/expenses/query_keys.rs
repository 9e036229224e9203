use crate::features::expenses::models::{Expense, ExpensePage, ExpenseStats};
use crate::features::expenses::repository::PageQuery;
use crate::shared::errors::AppError;
use crate::shared::query_cache::CacheKey;

/// 経費クエリのキャッシュキー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpenseQueryKey {
    /// 経費一覧の1ページ（ページ・件数・カテゴリごと）
    Expenses(PageQuery),
    /// 最近の経費
    RecentExpenses { limit: u32 },
    /// 集計
    Stats,
}

/// 無効化の単位となるクエリ種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpenseQueryKind {
    Expenses,
    RecentExpenses,
    Stats,
}

/// 経費の作成・削除で古くなるクエリ種別
///
/// 新しい経費は一覧・最近の経費・集計のすべてに影響する
pub const MUTATION_AFFECTED_KINDS: [ExpenseQueryKind; 3] = [
    ExpenseQueryKind::Expenses,
    ExpenseQueryKind::RecentExpenses,
    ExpenseQueryKind::Stats,
];

impl CacheKey for ExpenseQueryKey {
    type Kind = ExpenseQueryKind;

    fn kind(&self) -> ExpenseQueryKind {
        match self {
            ExpenseQueryKey::Expenses(_) => ExpenseQueryKind::Expenses,
            ExpenseQueryKey::RecentExpenses { .. } => ExpenseQueryKind::RecentExpenses,
            ExpenseQueryKey::Stats => ExpenseQueryKind::Stats,
        }
    }
}

/// キャッシュに保持するデータ
#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseQueryData {
    Page(ExpensePage),
    Recent(Vec<Expense>),
    Stats(ExpenseStats),
}

fn mismatch(expected: &str, actual: &ExpenseQueryData) -> AppError {
    AppError::InvalidResponse(format!(
        "キャッシュデータの種類が一致しません: expected={expected}, actual={actual:?}"
    ))
}

impl TryFrom<ExpenseQueryData> for ExpensePage {
    type Error = AppError;

    fn try_from(data: ExpenseQueryData) -> Result<Self, Self::Error> {
        match data {
            ExpenseQueryData::Page(page) => Ok(page),
            other => Err(mismatch("Page", &other)),
        }
    }
}

impl TryFrom<ExpenseQueryData> for Vec<Expense> {
    type Error = AppError;

    fn try_from(data: ExpenseQueryData) -> Result<Self, Self::Error> {
        match data {
            ExpenseQueryData::Recent(expenses) => Ok(expenses),
            other => Err(mismatch("Recent", &other)),
        }
    }
}

impl TryFrom<ExpenseQueryData> for ExpenseStats {
    type Error = AppError;

    fn try_from(data: ExpenseQueryData) -> Result<Self, Self::Error> {
        match data {
            ExpenseQueryData::Stats(stats) => Ok(stats),
            other => Err(mismatch("Stats", &other)),
        }
    }
}
