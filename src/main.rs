// 経費ダッシュボードのエントリーポイント

#[tokio::main]
async fn main() {
    if let Err(e) = expense_tracker_lib::run().await {
        log::error!("経費ダッシュボードの実行に失敗しました: {e}");
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}
