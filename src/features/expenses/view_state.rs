//! 経費一覧画面の表示状態
//!
//! 現在のページ・カテゴリフィルター・検索語を明示的な構造体として保持し、
//! クライアントの取得関数に引数として渡す。

use crate::features::categories::Category;
use crate::features::expenses::client::ExpenseCollectionClient;
use crate::features::expenses::models::{Expense, ExpensePage, Pagination};
use crate::shared::errors::AppResult;
use serde::{Deserialize, Serialize};

/// 経費一覧の表示状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseViewState {
    /// 現在のページ（1始まり）
    pub page: u32,
    /// カテゴリフィルター（Noneは全カテゴリ）
    pub category: Option<Category>,
    /// 検索語（取得済みページに対してのみ適用）
    pub search_term: String,
    /// 直近に取得したページの総ページ数
    pub total_pages: Option<u32>,
}

impl Default for ExpenseViewState {
    fn default() -> Self {
        Self {
            page: 1,
            category: None,
            search_term: String::new(),
            total_pages: None,
        }
    }
}

/// 画面に表示する経費一覧
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseListView {
    /// 検索語で絞り込んだ経費
    pub expenses: Vec<Expense>,
    /// 絞り込み前の件数（「N件中M件」表示用）
    pub page_count: usize,
    pub pagination: Pagination,
}

impl ExpenseListView {
    /// ページ送りを表示するかどうか
    pub fn has_multiple_pages(&self) -> bool {
        self.pagination.pages > 1
    }
}

impl ExpenseViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 前のページへ（1ページ目で止まる）
    pub fn previous_page(&mut self) -> u32 {
        self.page = self.page.saturating_sub(1).max(1);
        self.page
    }

    /// 次のページへ（直近の総ページ数で止まる）
    pub fn next_page(&mut self) -> u32 {
        if let Some(total_pages) = self.total_pages {
            if self.page < total_pages {
                self.page += 1;
            }
        }
        self.page
    }

    /// 前のページへ移動できるかどうか
    pub fn can_go_previous(&self) -> bool {
        self.page > 1
    }

    /// 次のページへ移動できるかどうか
    pub fn can_go_next(&self) -> bool {
        self.total_pages.is_some_and(|total| self.page < total)
    }

    /// カテゴリフィルターを変更する
    ///
    /// 変更時は1ページ目に戻す
    pub fn set_category(&mut self, category: Option<Category>) {
        if self.category != category {
            self.category = category;
            self.page = 1;
            self.total_pages = None;
        }
    }

    /// 検索語を変更する（再取得は発生しない）
    pub fn set_search_term<S: Into<String>>(&mut self, term: S) {
        self.search_term = term.into();
    }

    /// 取得したページのページング情報を記録する
    pub fn record_page(&mut self, page: &ExpensePage) {
        self.total_pages = Some(page.pagination.pages);
    }

    /// 現在の状態で経費一覧を取得し、検索語で絞り込む
    pub async fn load(
        &mut self,
        client: &ExpenseCollectionClient,
        page_size: u32,
    ) -> AppResult<ExpenseListView> {
        let page = client
            .list_expenses(self.page, page_size, self.category)
            .await?;
        self.record_page(&page);

        let expenses = filter_by_search(&page.data, &self.search_term)
            .into_iter()
            .cloned()
            .collect();

        Ok(ExpenseListView {
            expenses,
            page_count: page.data.len(),
            pagination: page.pagination,
        })
    }
}

/// 検索語で経費を絞り込む
///
/// タイトルまたは説明に検索語を含むもの（大文字小文字を区別しない）を返す。
/// 検索語は入力どおりに扱い、空白も一致対象に含める。空文字列の場合はすべて返す。
pub fn filter_by_search<'a>(expenses: &'a [Expense], term: &str) -> Vec<&'a Expense> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return expenses.iter().collect();
    }

    expenses
        .iter()
        .filter(|expense| {
            expense.title.to_lowercase().contains(&needle)
                || expense
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .collect()
}
