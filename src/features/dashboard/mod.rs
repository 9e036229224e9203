/// ダッシュボード機能モジュール
///
/// 集計と最近の経費を組み合わせ、ダッシュボードのサマリーを作成します
pub mod summary;

pub use summary::{load_dashboard, DashboardSummary};
