//! 経費コレクションへのアクセス層
//!
//! `ExpenseRepository`はAPIサーバーとの通信を抽象化する。
//! 本番では`ApiExpenseRepository`（HTTP）、テストではメモリ上の実装を使う。

use crate::features::categories::Category;
use crate::features::expenses::models::{
    CreateExpenseDto, DataEnvelope, Expense, ExpenseListEnvelope, ExpensePage, ExpenseStats,
};
use crate::shared::api_client::{with_query, ApiClient};
use crate::shared::errors::AppResult;
use async_trait::async_trait;

/// 経費一覧のページ指定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
    pub category: Option<Category>,
}

/// 経費コレクションの操作
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// 経費一覧の1ページを取得する
    async fn fetch_page(&self, query: PageQuery, auth_token: Option<&str>)
        -> AppResult<ExpensePage>;

    /// 最近の経費を新しい順に取得する
    async fn fetch_recent(&self, limit: u32, auth_token: Option<&str>) -> AppResult<Vec<Expense>>;

    /// 集計を取得する
    async fn fetch_stats(&self, auth_token: Option<&str>) -> AppResult<ExpenseStats>;

    /// 経費を作成する
    async fn create(&self, dto: &CreateExpenseDto, auth_token: Option<&str>)
        -> AppResult<Expense>;

    /// 経費を削除する
    async fn delete(&self, id: &str, auth_token: Option<&str>) -> AppResult<()>;
}

const EXPENSES_ENDPOINT: &str = "/expenses";
const STATS_ENDPOINT: &str = "/expenses/stats/summary";

/// APIサーバー経由の経費リポジトリ
#[derive(Debug, Clone)]
pub struct ApiExpenseRepository {
    api_client: ApiClient,
}

impl ApiExpenseRepository {
    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }

    /// 一覧取得のエンドポイントを組み立てる
    pub fn page_endpoint(query: &PageQuery) -> String {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(category) = query.category {
            params.push(("category", category.as_str().to_string()));
        }
        with_query(EXPENSES_ENDPOINT, &params)
    }

    /// 最近の経費のエンドポイントを組み立てる
    pub fn recent_endpoint(limit: u32) -> String {
        with_query(EXPENSES_ENDPOINT, &[("limit", limit.to_string())])
    }

    /// 削除のエンドポイントを組み立てる
    pub fn item_endpoint(id: &str) -> String {
        format!("{EXPENSES_ENDPOINT}/{}", urlencoding::encode(id))
    }
}

#[async_trait]
impl ExpenseRepository for ApiExpenseRepository {
    async fn fetch_page(
        &self,
        query: PageQuery,
        auth_token: Option<&str>,
    ) -> AppResult<ExpensePage> {
        let endpoint = Self::page_endpoint(&query);
        let response: ExpenseListEnvelope = self.api_client.get(&endpoint, auth_token).await?;
        let page = response.into_page(query.page);

        log::info!(
            "経費一覧取得成功: page={}/{}, count={}, total={}",
            page.pagination.page,
            page.pagination.pages,
            page.data.len(),
            page.pagination.total
        );
        Ok(page)
    }

    async fn fetch_recent(&self, limit: u32, auth_token: Option<&str>) -> AppResult<Vec<Expense>> {
        let endpoint = Self::recent_endpoint(limit);
        let response: ExpenseListEnvelope = self.api_client.get(&endpoint, auth_token).await?;

        log::info!("最近の経費取得成功: count={}", response.data.len());
        Ok(response.data)
    }

    async fn fetch_stats(&self, auth_token: Option<&str>) -> AppResult<ExpenseStats> {
        let response: DataEnvelope<ExpenseStats> =
            self.api_client.get(STATS_ENDPOINT, auth_token).await?;
        let mut stats = response.data;
        stats.sort_chronologically();

        log::info!(
            "経費集計取得成功: total={}, months={}, categories={}",
            stats.total_expenses,
            stats.monthly_expenses.len(),
            stats.expenses_by_category.len()
        );
        Ok(stats)
    }

    async fn create(
        &self,
        dto: &CreateExpenseDto,
        auth_token: Option<&str>,
    ) -> AppResult<Expense> {
        let response: DataEnvelope<Expense> = self
            .api_client
            .post(EXPENSES_ENDPOINT, dto, auth_token)
            .await?;

        log::info!("経費作成成功: expense_id={}", response.data.id);
        Ok(response.data)
    }

    async fn delete(&self, id: &str, auth_token: Option<&str>) -> AppResult<()> {
        let endpoint = Self::item_endpoint(id);
        self.api_client.delete(&endpoint, auth_token).await?;

        log::info!("経費削除成功: expense_id={id}");
        Ok(())
    }
}
