//! ダッシュボードのサマリー
//!
//! 集計と最近の経費を並行して取得し、サマリーカードの値を導出する。

use crate::features::expenses::client::ExpenseCollectionClient;
use crate::features::expenses::models::{CategoryTotal, Expense, ExpenseStats, MonthlyTotal};
use crate::shared::errors::AppResult;
use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};

/// ダッシュボードに表示する値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// これまでの総支出
    pub total_expenses: f64,
    /// 今月の支出
    pub this_month: f64,
    /// 最近の取引件数
    pub recent_transactions: usize,
    /// 支出のあるカテゴリ数
    pub category_count: usize,
    /// 月別推移（古い順）
    pub monthly: Vec<MonthlyTotal>,
    pub by_category: Vec<CategoryTotal>,
    pub recent: Vec<Expense>,
}

impl DashboardSummary {
    /// 集計と最近の経費からサマリーを作成する
    ///
    /// # 引数
    /// * `stats` - 経費の集計
    /// * `recent` - 最近の経費
    /// * `today` - 「今月」の基準日
    pub fn from_parts(stats: ExpenseStats, recent: Vec<Expense>, today: NaiveDate) -> Self {
        let this_month = stats
            .monthly_expenses
            .iter()
            .find(|m| m.month.year == today.year() && m.month.month == today.month())
            .map(|m| m.total)
            .unwrap_or(0.0);

        Self {
            total_expenses: stats.total_expenses,
            this_month,
            recent_transactions: recent.len(),
            category_count: stats.expenses_by_category.len(),
            monthly: stats.monthly_expenses,
            by_category: stats.expenses_by_category,
            recent,
        }
    }
}

/// ダッシュボードのサマリーを取得する
///
/// # 引数
/// * `client` - 経費コレクションクライアント
/// * `recent_limit` - 最近の経費の件数
/// * `today` - 「今月」の基準日
///
/// # 戻り値
/// サマリー。どちらかの取得に失敗した場合はそのエラー
pub async fn load_dashboard(
    client: &ExpenseCollectionClient,
    recent_limit: u32,
    today: NaiveDate,
) -> AppResult<DashboardSummary> {
    let (stats, recent) = futures::try_join!(client.get_stats(), client.list_recent(recent_limit))?;
    debug!(
        "ダッシュボードデータ取得完了: total={}, recent={}",
        stats.total_expenses,
        recent.len()
    );
    Ok(DashboardSummary::from_parts(stats, recent, today))
}
