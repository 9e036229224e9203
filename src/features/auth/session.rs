use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// セッション情報の提供元
///
/// トークンの保存方法やログイン画面への遷移は表示層の責務。
/// 経費クライアントはトークンの取得と期限切れの通知だけを行う。
pub trait SessionProvider: Send + Sync {
    /// 現在の認証トークン
    fn auth_token(&self) -> Option<String>;

    /// APIサーバーがセッションを拒否した（401/403）
    fn on_session_expired(&self);
}

/// メモリ上でトークンを保持するセッション
#[derive(Debug, Default)]
pub struct InMemorySession {
    token: RwLock<Option<String>>,
    expired: AtomicBool,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// トークン付きで作成
    pub fn with_token<S: Into<String>>(token: S) -> Self {
        let session = Self::new();
        session.sign_in(token);
        session
    }

    /// ログインしてトークンを保持する
    pub fn sign_in<S: Into<String>>(&self, token: S) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(token.into());
        self.expired.store(false, Ordering::SeqCst);
        log::info!("セッションを開始しました");
    }

    /// ログアウトしてトークンを破棄する
    pub fn sign_out(&self) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
        log::info!("セッションを終了しました");
    }

    /// ログイン画面への遷移が必要かどうか
    pub fn needs_reauthentication(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }
}

impl SessionProvider for InMemorySession {
    fn auth_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn on_session_expired(&self) {
        log::warn!("セッションの期限が切れました。再ログインが必要です");
        self.sign_out();
        self.expired.store(true, Ordering::SeqCst);
    }
}
