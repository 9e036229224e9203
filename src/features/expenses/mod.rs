/// 経費機能モジュール
///
/// このモジュールは経費コレクションに関連するすべての機能を提供します：
/// - 経費一覧（ページング・カテゴリフィルター）、最近の経費、集計の取得とキャッシュ
/// - 経費の作成（ローカルバリデーション付き）と削除
/// - 作成・削除後のキャッシュ無効化と定期的な自動更新
/// - 一覧画面の表示状態と検索語による絞り込み
pub mod auto_refresh;
pub mod client;
pub mod feedback;
pub mod models;
pub mod query_keys;
pub mod repository;
pub mod validation;
pub mod view_state;

#[cfg(test)]
mod client_test;
#[cfg(test)]
pub(crate) mod test_support;

// 公開インターフェース：外部から使用可能な型と関数をエクスポート

// モデル
pub use models::{
    CategoryTotal, CreateExpenseDto, Expense, ExpenseDraft, ExpensePage, ExpenseStats, MonthKey,
    MonthlyTotal, Pagination,
};

// クライアント
pub use auto_refresh::{AutoRefresh, AutoRefreshHandle};
pub use client::{DeleteOutcome, ExpenseCollectionClient};
pub use feedback::{Feedback, Notice, NoticeLevel};
pub use query_keys::{ExpenseQueryData, ExpenseQueryKey, ExpenseQueryKind};
pub use repository::{ApiExpenseRepository, ExpenseRepository, PageQuery};
pub use validation::validate_draft;
pub use view_state::{filter_by_search, ExpenseListView, ExpenseViewState};
