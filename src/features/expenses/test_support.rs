//! テスト用のメモリ上の経費リポジトリ
//!
//! 操作ごとの呼び出し回数を記録し、ネットワーク呼び出しの有無を検証できる。

use crate::features::auth::session::InMemorySession;
use crate::features::categories::{Category, PaymentMethod};
use crate::features::expenses::client::ExpenseCollectionClient;
use crate::features::expenses::models::{
    CategoryTotal, CreateExpenseDto, Expense, ExpensePage, ExpenseStats, MonthKey, MonthlyTotal,
    Pagination,
};
use crate::features::expenses::repository::{ExpenseRepository, PageQuery};
use crate::shared::config::QueryConfig;
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// 次の呼び出しで発生させる失敗
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Transient,
    AuthExpired,
}

impl Failure {
    fn into_error(self) -> AppError {
        match self {
            Failure::Transient => AppError::transient("status=503"),
            Failure::AuthExpired => AppError::auth_expired("Token expired"),
        }
    }
}

#[derive(Default)]
struct State {
    /// 新しい順
    expenses: Vec<Expense>,
    next_id: u64,
    calls: HashMap<&'static str, usize>,
    fail_next: Option<Failure>,
}

/// メモリ上の経費リポジトリ
#[derive(Default)]
pub struct FakeExpenseRepository {
    state: Mutex<State>,
}

impl FakeExpenseRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定した経費で初期化する（先頭が最新）
    pub fn with_expenses(expenses: Vec<Expense>) -> Self {
        let repository = Self::new();
        {
            let mut state = repository.state.lock().unwrap();
            state.next_id = expenses.len() as u64;
            state.expenses = expenses;
        }
        repository
    }

    /// 操作の呼び出し回数
    pub fn calls(&self, operation: &str) -> usize {
        *self.state.lock().unwrap().calls.get(operation).unwrap_or(&0)
    }

    /// 全操作の呼び出し回数の合計
    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.values().sum()
    }

    /// 次の呼び出しを失敗させる
    pub fn fail_next(&self, failure: Failure) {
        self.state.lock().unwrap().fail_next = Some(failure);
    }

    fn begin(&self, operation: &'static str) -> AppResult<std::sync::MutexGuard<'_, State>> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(operation).or_insert(0) += 1;
        match state.fail_next.take() {
            Some(failure) => Err(failure.into_error()),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl ExpenseRepository for FakeExpenseRepository {
    async fn fetch_page(
        &self,
        query: PageQuery,
        _auth_token: Option<&str>,
    ) -> AppResult<ExpensePage> {
        let state = self.begin("fetch_page")?;
        let matching: Vec<&Expense> = state
            .expenses
            .iter()
            .filter(|e| query.category.map_or(true, |c| e.category == c))
            .collect();

        let total = matching.len() as u64;
        let limit = u64::from(query.limit);
        let pages = ((total + limit - 1) / limit) as u32;
        let start = (query.page as usize - 1) * query.limit as usize;
        let data = matching
            .into_iter()
            .skip(start)
            .take(query.limit as usize)
            .cloned()
            .collect();

        Ok(ExpensePage {
            data,
            pagination: Pagination {
                page: query.page,
                pages,
                total,
            },
        })
    }

    async fn fetch_recent(&self, limit: u32, _auth_token: Option<&str>) -> AppResult<Vec<Expense>> {
        let state = self.begin("fetch_recent")?;
        Ok(state.expenses.iter().take(limit as usize).cloned().collect())
    }

    async fn fetch_stats(&self, _auth_token: Option<&str>) -> AppResult<ExpenseStats> {
        let state = self.begin("fetch_stats")?;

        let mut monthly: BTreeMap<MonthKey, (f64, u64)> = BTreeMap::new();
        let mut by_category: BTreeMap<&'static str, (f64, u64)> = BTreeMap::new();
        for expense in &state.expenses {
            let key = MonthKey {
                year: expense.date.year(),
                month: expense.date.month(),
            };
            let month = monthly.entry(key).or_insert((0.0, 0));
            month.0 += expense.amount;
            month.1 += 1;

            let category = by_category
                .entry(expense.category.as_str())
                .or_insert((0.0, 0));
            category.0 += expense.amount;
            category.1 += 1;
        }

        Ok(ExpenseStats {
            total_expenses: state.expenses.iter().map(|e| e.amount).sum(),
            monthly_expenses: monthly
                .into_iter()
                .map(|(month, (total, count))| MonthlyTotal {
                    month,
                    total,
                    count,
                })
                .collect(),
            expenses_by_category: by_category
                .into_iter()
                .map(|(category, (total, count))| CategoryTotal {
                    category: category.to_string(),
                    total,
                    count,
                })
                .collect(),
        })
    }

    async fn create(
        &self,
        dto: &CreateExpenseDto,
        _auth_token: Option<&str>,
    ) -> AppResult<Expense> {
        let mut state = self.begin("create")?;
        state.next_id += 1;
        let expense = Expense {
            id: format!("exp-{}", state.next_id),
            title: dto.title.clone(),
            amount: dto.amount,
            category: dto.category,
            date: dto.date,
            payment_method: dto.payment_method,
            description: dto.description.clone(),
            tags: dto.tags.clone(),
            created_at: None,
            updated_at: None,
        };
        state.expenses.insert(0, expense.clone());
        Ok(expense)
    }

    async fn delete(&self, id: &str, _auth_token: Option<&str>) -> AppResult<()> {
        let mut state = self.begin("delete")?;
        let before = state.expenses.len();
        state.expenses.retain(|e| e.id != id);
        if state.expenses.len() == before {
            return Err(AppError::not_found(format!("経費 {id}")));
        }
        Ok(())
    }
}

/// テスト用の経費を作成する
pub fn sample_expense(id: &str, title: &str, amount: f64, category: Category) -> Expense {
    Expense {
        id: id.to_string(),
        title: title.to_string(),
        amount,
        category,
        date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        payment_method: PaymentMethod::Cash,
        description: None,
        tags: vec![],
        created_at: None,
        updated_at: None,
    }
}

/// フェイクリポジトリとセッションでクライアントを組み立てる
pub fn client_with(
    repository: Arc<FakeExpenseRepository>,
) -> (ExpenseCollectionClient, Arc<InMemorySession>) {
    let session = Arc::new(InMemorySession::with_token("test-token"));
    let client =
        ExpenseCollectionClient::new(repository, session.clone(), QueryConfig::default());
    (client, session)
}
