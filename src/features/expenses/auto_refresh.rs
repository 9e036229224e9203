//! 経費クエリの自動更新
//!
//! 一定間隔で参照中のクエリを再取得し、表示中のデータが
//! 更新間隔以上古くならないようにする。

use crate::features::expenses::client::ExpenseCollectionClient;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// 自動更新タスク
pub struct AutoRefresh;

/// 実行中の自動更新タスクのハンドル
pub struct AutoRefreshHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl AutoRefresh {
    /// 自動更新タスクを起動する
    ///
    /// # 引数
    /// * `client` - 経費コレクションクライアント
    /// * `interval` - 更新間隔（0より大きいこと）
    pub fn spawn(client: Arc<ExpenseCollectionClient>, interval: Duration) -> AutoRefreshHandle {
        let cancel = CancellationToken::new();
        let child = cancel.child_token();

        let task = tokio::spawn(async move {
            info!("経費クエリの自動更新を開始します: interval={interval:?}");

            // 最初のtickは即座に完了するため、1間隔後から開始する
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = child.cancelled() => {
                        info!("経費クエリの自動更新を停止しました");
                        break;
                    }
                    _ = ticker.tick() => {
                        let refreshed = client.refetch_active().await;
                        debug!("自動更新: refreshed={refreshed}");
                    }
                }
            }
        });

        AutoRefreshHandle { cancel, task }
    }

    /// クライアントの設定の間隔で自動更新タスクを起動する
    pub fn spawn_with_config(client: Arc<ExpenseCollectionClient>) -> AutoRefreshHandle {
        let interval = client.config().refetch_interval;
        Self::spawn(client, interval)
    }
}

impl AutoRefreshHandle {
    /// 自動更新を停止し、タスクの終了を待つ
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            log::warn!("自動更新タスクの終了待ちに失敗しました: {e}");
        }
    }

    /// 停止済みかどうか
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
