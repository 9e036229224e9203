//! 経費コレクションクライアント
//!
//! 経費の取得・作成・削除を仲介し、クエリキー単位の短期キャッシュを管理する。
//! 作成・削除が成功したら、古くなりうるクエリ種別を明示的に無効化する。

use crate::features::auth::session::SessionProvider;
use crate::features::categories::Category;
use crate::features::expenses::models::{Expense, ExpenseDraft, ExpensePage, ExpenseStats};
use crate::features::expenses::query_keys::{
    ExpenseQueryData, ExpenseQueryKey, MUTATION_AFFECTED_KINDS,
};
use crate::features::expenses::repository::{ApiExpenseRepository, ExpenseRepository, PageQuery};
use crate::features::expenses::validation::validate_draft;
use crate::shared::api_client::ApiClient;
use crate::shared::config::QueryConfig;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::query_cache::{InMemoryQueryCache, QueryCache};
use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::time::Instant;

/// 削除操作の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// ユーザーが確認を拒否した（何も行っていない）
    Cancelled,
    /// 削除した
    Deleted,
    /// サーバー上に既に存在しなかった（削除済みとして扱う）
    AlreadyAbsent,
}

/// 経費クエリのキャッシュ型
pub type ExpenseQueryCache = dyn QueryCache<ExpenseQueryKey, ExpenseQueryData>;

/// 経費コレクションクライアント
pub struct ExpenseCollectionClient {
    repository: Arc<dyn ExpenseRepository>,
    cache: Arc<ExpenseQueryCache>,
    session: Arc<dyn SessionProvider>,
    config: QueryConfig,
}

impl ExpenseCollectionClient {
    /// メモリキャッシュ付きでクライアントを作成
    pub fn new(
        repository: Arc<dyn ExpenseRepository>,
        session: Arc<dyn SessionProvider>,
        config: QueryConfig,
    ) -> Self {
        Self::with_cache(
            repository,
            Arc::new(InMemoryQueryCache::<ExpenseQueryKey, ExpenseQueryData>::new()),
            session,
            config,
        )
    }

    /// キャッシュ実装を指定してクライアントを作成
    pub fn with_cache(
        repository: Arc<dyn ExpenseRepository>,
        cache: Arc<ExpenseQueryCache>,
        session: Arc<dyn SessionProvider>,
        config: QueryConfig,
    ) -> Self {
        Self {
            repository,
            cache,
            session,
            config,
        }
    }

    /// 環境変数の設定からAPIサーバー向けのクライアントを作成
    pub fn from_env(session: Arc<dyn SessionProvider>) -> AppResult<Self> {
        let api_client = ApiClient::new()?;
        let repository = Arc::new(ApiExpenseRepository::new(api_client));
        Ok(Self::new(repository, session, QueryConfig::from_env()))
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// 経費一覧の1ページを取得する
    ///
    /// # 引数
    /// * `page` - ページ番号（1以上）
    /// * `page_size` - 1ページあたりの件数
    /// * `category` - カテゴリフィルター（オプション）
    pub async fn list_expenses(
        &self,
        page: u32,
        page_size: u32,
        category: Option<Category>,
    ) -> AppResult<ExpensePage> {
        if page < 1 {
            return Err(AppError::validation("page", "Page must be 1 or greater"));
        }
        if page_size < 1 {
            return Err(AppError::validation(
                "pageSize",
                "Page size must be 1 or greater",
            ));
        }

        let key = ExpenseQueryKey::Expenses(PageQuery {
            page,
            limit: page_size,
            category,
        });
        self.query(key).await?.try_into()
    }

    /// 最近の経費を新しい順に取得する
    pub async fn list_recent(&self, limit: u32) -> AppResult<Vec<Expense>> {
        if limit < 1 {
            return Err(AppError::validation("limit", "Limit must be 1 or greater"));
        }

        self.query(ExpenseQueryKey::RecentExpenses { limit })
            .await?
            .try_into()
    }

    /// 経費の集計を取得する
    pub async fn get_stats(&self) -> AppResult<ExpenseStats> {
        self.query(ExpenseQueryKey::Stats).await?.try_into()
    }

    /// 経費を作成する
    ///
    /// ローカルバリデーションに失敗した場合はAPIサーバーへ送信しない。
    /// 成功時は一覧・最近の経費・集計のキャッシュを無効化する。
    pub async fn create_expense(&self, draft: &ExpenseDraft) -> AppResult<Expense> {
        let dto = validate_draft(draft)?;
        info!("経費作成処理開始: title={}, amount={}", dto.title, dto.amount);

        let token = self.session.auth_token();
        let expense = self
            .repository
            .create(&dto, token.as_deref())
            .await
            .map_err(|e| self.observe_failure("経費作成", e))?;

        self.invalidate_after_mutation();
        info!("経費作成成功: expense_id={}", expense.id);
        Ok(expense)
    }

    /// 経費を削除する
    ///
    /// # 引数
    /// * `id` - 経費ID
    /// * `confirmed` - ユーザーが削除を確認したかどうか（falseの場合は何もしない）
    ///
    /// サーバー上に存在しない場合も削除済みとして扱い、キャッシュを無効化する
    pub async fn delete_expense(&self, id: &str, confirmed: bool) -> AppResult<DeleteOutcome> {
        if !confirmed {
            debug!("経費削除がキャンセルされました: expense_id={id}");
            return Ok(DeleteOutcome::Cancelled);
        }
        if id.trim().is_empty() {
            return Err(AppError::validation("id", "Expense id is required"));
        }

        info!("経費削除処理開始: expense_id={id}");
        let token = self.session.auth_token();
        let outcome = match self.repository.delete(id, token.as_deref()).await {
            Ok(()) => DeleteOutcome::Deleted,
            Err(AppError::NotFound(message)) => {
                info!("経費は既に削除されています: expense_id={id}, message={message}");
                DeleteOutcome::AlreadyAbsent
            }
            Err(e) => return Err(self.observe_failure("経費削除", e)),
        };

        self.invalidate_after_mutation();
        Ok(outcome)
    }

    /// キャッシュを無視してAPIサーバーから再取得する
    pub async fn refetch(&self, key: ExpenseQueryKey) -> AppResult<ExpenseQueryData> {
        let data = self
            .fetch_from_api(key)
            .await
            .map_err(|e| self.observe_failure("クエリ再取得", e))?;
        self.cache.set(key, data.clone(), Instant::now());
        Ok(data)
    }

    /// 参照中のクエリをすべて再取得する
    ///
    /// 一定期間参照されていないクエリは破棄し、再取得しない。
    ///
    /// # 戻り値
    /// 再取得に成功したクエリ数
    pub async fn refetch_active(&self) -> usize {
        let evicted = self.cache.evict_idle(self.config.idle_eviction);
        if !evicted.is_empty() {
            debug!("未使用のクエリを破棄しました: count={}", evicted.len());
        }

        let keys = self.cache.keys();
        let results = join_all(keys.iter().map(|key| self.refetch(*key))).await;

        let refreshed = results.iter().filter(|r| r.is_ok()).count();
        let failed = results.len() - refreshed;
        if failed > 0 {
            warn!("自動更新で一部のクエリの取得に失敗しました: refreshed={refreshed}, failed={failed}");
        } else {
            debug!("自動更新完了: refreshed={refreshed}");
        }
        refreshed
    }

    /// キャッシュが新鮮なら返し、そうでなければAPIサーバーから取得する
    async fn query(&self, key: ExpenseQueryKey) -> AppResult<ExpenseQueryData> {
        if let Some(entry) = self.cache.get(&key) {
            if entry.is_fresh(Instant::now(), self.config.stale_time) {
                debug!("キャッシュヒット: key={key:?}");
                return Ok(entry.data);
            }
            debug!("キャッシュが古いため再取得します: key={key:?}");
        } else {
            debug!("キャッシュミス: key={key:?}");
        }

        self.refetch(key).await
    }

    async fn fetch_from_api(&self, key: ExpenseQueryKey) -> AppResult<ExpenseQueryData> {
        let token = self.session.auth_token();
        let token = token.as_deref();

        match key {
            ExpenseQueryKey::Expenses(query) => self
                .repository
                .fetch_page(query, token)
                .await
                .map(ExpenseQueryData::Page),
            ExpenseQueryKey::RecentExpenses { limit } => self
                .repository
                .fetch_recent(limit, token)
                .await
                .map(ExpenseQueryData::Recent),
            ExpenseQueryKey::Stats => self
                .repository
                .fetch_stats(token)
                .await
                .map(ExpenseQueryData::Stats),
        }
    }

    fn invalidate_after_mutation(&self) {
        let count = self.cache.invalidate(&MUTATION_AFFECTED_KINDS);
        debug!("ミューテーション後にキャッシュを無効化しました: count={count}");
    }

    /// 失敗をログに記録し、認証切れの場合はセッションに通知する
    fn observe_failure(&self, operation: &str, error: AppError) -> AppError {
        match &error {
            AppError::AuthExpired(_) => {
                warn!("{operation}で認証エラーが発生しました: {error}");
                self.session.on_session_expired();
            }
            AppError::Validation(_) => {
                debug!("{operation}でバリデーションエラー: {error}");
            }
            _ => {
                warn!("{operation}に失敗しました: {error}");
            }
        }
        error
    }
}
