// 機能モジュール構造
pub mod features;
pub mod shared;

use features::auth::session::InMemorySession;
use features::dashboard::load_dashboard;
use features::expenses::{ExpenseCollectionClient, ExpenseViewState};
use log::{info, warn};
use shared::config::environment::{initialize_logging_system, load_environment_variables};
use shared::errors::AppResult;
use shared::utils::{format_amount, today};
use std::sync::Arc;

pub use features::dashboard::DashboardSummary;
pub use features::expenses::{
    AutoRefresh, AutoRefreshHandle, DeleteOutcome, Expense, ExpenseDraft, ExpensePage,
    ExpenseStats, Feedback,
};
pub use shared::errors::{AppError, FieldError};

/// ダッシュボードと経費一覧の1ページ目を取得してログに出力する
///
/// 環境変数の読み込みとログシステムの初期化もここで行う
pub async fn run() -> AppResult<()> {
    // 環境に応じた.envファイルを読み込み（ログシステム初期化前に実行）
    load_environment_variables();
    initialize_logging_system();

    info!("経費ダッシュボードを開始します...");

    let session = Arc::new(match get_env_var_optional!("API_AUTH_TOKEN") {
        Some(token) => InMemorySession::with_token(token),
        None => {
            warn!("API_AUTH_TOKENが設定されていません。未認証でリクエストします");
            InMemorySession::new()
        }
    });

    let client = ExpenseCollectionClient::from_env(session)?;
    let config = client.config().clone();

    let summary = load_dashboard(&client, config.recent_limit, today()).await?;
    info!(
        "総支出: {}, 今月: {}, 最近の取引: {}件, カテゴリ数: {}",
        format_amount(summary.total_expenses),
        format_amount(summary.this_month),
        summary.recent_transactions,
        summary.category_count
    );
    for month in &summary.monthly {
        info!(
            "  {}-{:02}: {}",
            month.month.year,
            month.month.month,
            format_amount(month.total)
        );
    }
    for category in &summary.by_category {
        info!("  {}: {}", category.category, format_amount(category.total));
    }

    let mut view = ExpenseViewState::new();
    let list = view.load(&client, config.page_size).await?;
    info!(
        "経費一覧 {}/{}ページ（全{}件）",
        list.pagination.page, list.pagination.pages, list.pagination.total
    );
    for expense in &list.expenses {
        info!(
            "  {} {} {} [{}]",
            expense.date,
            expense.title,
            format_amount(expense.amount),
            expense.category
        );
    }

    info!("経費ダッシュボードを終了します");
    Ok(())
}
