use super::test_support::{client_with, sample_expense, Failure, FakeExpenseRepository};
use crate::features::categories::Category;
use crate::features::expenses::auto_refresh::AutoRefresh;
use crate::features::expenses::client::{DeleteOutcome, ExpenseCollectionClient};
use crate::features::expenses::models::ExpenseDraft;
use crate::features::expenses::repository::ExpenseRepository;
use crate::features::expenses::validation::validate_draft;
use crate::features::expenses::view_state::ExpenseViewState;
use crate::shared::errors::AppError;
use crate::shared::utils::today;
use std::sync::Arc;
use std::time::Duration;

fn coffee_draft() -> ExpenseDraft {
    ExpenseDraft {
        title: "Coffee".to_string(),
        amount: "4.50".to_string(),
        category: "Food & Dining".to_string(),
        payment_method: Some("Cash".to_string()),
        ..ExpenseDraft::with_today()
    }
}

/// 一覧・最近の経費・集計をすべて一度取得してキャッシュする
async fn warm_all_queries(client: &ExpenseCollectionClient) {
    client.list_expenses(1, 10, None).await.unwrap();
    client.list_recent(5).await.unwrap();
    client.get_stats().await.unwrap();
}

#[tokio::test]
async fn test_create_with_missing_fields_makes_no_request() {
    let repository = Arc::new(FakeExpenseRepository::new());
    let (client, _) = client_with(repository.clone());

    let draft = ExpenseDraft {
        amount: "12".to_string(),
        ..ExpenseDraft::with_today()
    };
    let err = client.create_expense(&draft).await.unwrap_err();

    let fields: Vec<&str> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"category"));
    assert_eq!(repository.total_calls(), 0);
}

#[tokio::test]
async fn test_create_with_non_positive_amount_is_rejected_locally() {
    let repository = Arc::new(FakeExpenseRepository::new());
    let (client, _) = client_with(repository.clone());

    for amount in ["0", "-3", "abc"] {
        let draft = ExpenseDraft {
            amount: amount.to_string(),
            ..coffee_draft()
        };
        let err = client.create_expense(&draft).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.field_errors()[0].field, "amount");
    }
    assert_eq!(repository.total_calls(), 0);
}

#[tokio::test]
async fn test_created_expense_appears_in_recent_list() {
    let repository = Arc::new(FakeExpenseRepository::with_expenses(vec![
        sample_expense("a", "Groceries", 52.3, Category::Shopping),
        sample_expense("b", "Bus pass", 30.0, Category::Transportation),
    ]));
    let (client, _) = client_with(repository.clone());

    // 作成前に一度取得してキャッシュしておく
    let before = client.list_recent(5).await.unwrap();
    assert_eq!(before.len(), 2);

    let created = client.create_expense(&coffee_draft()).await.unwrap();
    assert_eq!(created.title, "Coffee");
    assert_eq!(created.amount, 4.5);
    assert_eq!(created.category, Category::FoodAndDining);
    assert_eq!(created.date, today());

    let recent = client.list_recent(5).await.unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].id, created.id);
    assert_eq!(repository.calls("fetch_recent"), 2);
}

#[tokio::test]
async fn test_create_invalidates_every_query_kind() {
    let repository = Arc::new(FakeExpenseRepository::new());
    let (client, _) = client_with(repository.clone());
    warm_all_queries(&client).await;

    client.create_expense(&coffee_draft()).await.unwrap();
    warm_all_queries(&client).await;

    assert_eq!(repository.calls("fetch_page"), 2);
    assert_eq!(repository.calls("fetch_recent"), 2);
    assert_eq!(repository.calls("fetch_stats"), 2);

    let stats = client.get_stats().await.unwrap();
    assert_eq!(stats.total_expenses, 4.5);
}

#[tokio::test]
async fn test_delete_invalidates_every_query_kind() {
    let repository = Arc::new(FakeExpenseRepository::with_expenses(vec![sample_expense(
        "a",
        "Hotel",
        120.0,
        Category::Travel,
    )]));
    let (client, _) = client_with(repository.clone());
    warm_all_queries(&client).await;

    let outcome = client.delete_expense("a", true).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);

    let page = client.list_expenses(1, 10, None).await.unwrap();
    assert!(page.data.is_empty());
    assert_eq!(client.get_stats().await.unwrap().total_expenses, 0.0);
    assert!(client.list_recent(5).await.unwrap().is_empty());

    assert_eq!(repository.calls("fetch_page"), 2);
    assert_eq!(repository.calls("fetch_recent"), 2);
    assert_eq!(repository.calls("fetch_stats"), 2);
}

#[tokio::test]
async fn test_delete_without_confirmation_does_nothing() {
    let repository = Arc::new(FakeExpenseRepository::with_expenses(vec![sample_expense(
        "a",
        "Hotel",
        120.0,
        Category::Travel,
    )]));
    let (client, _) = client_with(repository.clone());

    let outcome = client.delete_expense("a", false).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Cancelled);
    assert_eq!(repository.total_calls(), 0);

    let page = client.list_expenses(1, 10, None).await.unwrap();
    assert_eq!(page.pagination.total, 1);
}

#[tokio::test]
async fn test_delete_missing_expense_is_treated_as_deleted() {
    let repository = Arc::new(FakeExpenseRepository::new());
    let (client, _) = client_with(repository.clone());
    client.get_stats().await.unwrap();

    let outcome = client.delete_expense("missing", true).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::AlreadyAbsent);

    // 存在しなかった場合もキャッシュは無効化される
    client.get_stats().await.unwrap();
    assert_eq!(repository.calls("fetch_stats"), 2);
}

#[tokio::test]
async fn test_delete_with_blank_id_is_rejected() {
    let repository = Arc::new(FakeExpenseRepository::new());
    let (client, _) = client_with(repository.clone());

    let err = client.delete_expense("  ", true).await.unwrap_err();
    assert_eq!(err.field_errors()[0].field, "id");
    assert_eq!(repository.total_calls(), 0);
}

#[tokio::test]
async fn test_identical_query_within_stale_time_fetches_once() {
    let repository = Arc::new(FakeExpenseRepository::with_expenses(vec![
        sample_expense("a", "Taxi", 18.0, Category::Transportation),
        sample_expense("b", "Cinema", 12.0, Category::Entertainment),
    ]));
    let (client, _) = client_with(repository.clone());

    let first = client.list_expenses(1, 10, None).await.unwrap();
    let second = client.list_expenses(1, 10, None).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(repository.calls("fetch_page"), 1);

    // カテゴリが異なれば別のクエリとして取得する
    let filtered = client
        .list_expenses(1, 10, Some(Category::Entertainment))
        .await
        .unwrap();
    assert_eq!(filtered.data.len(), 1);
    assert_eq!(filtered.data[0].id, "b");
    assert_eq!(repository.calls("fetch_page"), 2);

    // ページサイズが異なる場合も同様
    client.list_expenses(1, 1, None).await.unwrap();
    assert_eq!(repository.calls("fetch_page"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_query_after_stale_time_refetches() {
    let repository = Arc::new(FakeExpenseRepository::new());
    let (client, _) = client_with(repository.clone());

    client.get_stats().await.unwrap();
    tokio::time::advance(Duration::from_secs(10)).await;
    client.get_stats().await.unwrap();
    assert_eq!(repository.calls("fetch_stats"), 1);

    tokio::time::advance(Duration::from_secs(21)).await;
    client.get_stats().await.unwrap();
    assert_eq!(repository.calls("fetch_stats"), 2);
}

#[tokio::test]
async fn test_empty_collection() {
    let repository = Arc::new(FakeExpenseRepository::new());
    let (client, _) = client_with(repository);

    let page = client.list_expenses(1, 10, None).await.unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.pagination.total, 0);
    assert_eq!(page.pagination.pages, 0);

    let stats = client.get_stats().await.unwrap();
    assert_eq!(stats.total_expenses, 0.0);
    assert!(stats.monthly_expenses.is_empty());
    assert!(stats.expenses_by_category.is_empty());
}

#[tokio::test]
async fn test_invalid_page_arguments_are_rejected() {
    let repository = Arc::new(FakeExpenseRepository::new());
    let (client, _) = client_with(repository.clone());

    let err = client.list_expenses(0, 10, None).await.unwrap_err();
    assert_eq!(err.field_errors()[0].field, "page");
    let err = client.list_expenses(1, 0, None).await.unwrap_err();
    assert_eq!(err.field_errors()[0].field, "pageSize");
    let err = client.list_recent(0).await.unwrap_err();
    assert_eq!(err.field_errors()[0].field, "limit");

    assert_eq!(repository.total_calls(), 0);
}

#[tokio::test]
async fn test_auth_expired_notifies_session() {
    let repository = Arc::new(FakeExpenseRepository::new());
    let (client, session) = client_with(repository.clone());

    repository.fail_next(Failure::AuthExpired);
    let err = client.list_recent(5).await.unwrap_err();

    assert!(err.requires_reauthentication());
    assert!(session.needs_reauthentication());
}

#[tokio::test]
async fn test_failed_fetch_is_not_cached() {
    let repository = Arc::new(FakeExpenseRepository::new());
    let (client, session) = client_with(repository.clone());

    repository.fail_next(Failure::Transient);
    let err = client.get_stats().await.unwrap_err();
    assert!(err.is_retryable());
    assert!(!session.needs_reauthentication());

    client.get_stats().await.unwrap();
    assert_eq!(repository.calls("fetch_stats"), 2);
}

#[tokio::test]
async fn test_failed_create_keeps_cache() {
    let repository = Arc::new(FakeExpenseRepository::new());
    let (client, _) = client_with(repository.clone());
    client.get_stats().await.unwrap();

    repository.fail_next(Failure::Transient);
    assert!(client.create_expense(&coffee_draft()).await.is_err());

    client.get_stats().await.unwrap();
    assert_eq!(repository.calls("fetch_stats"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_refetch_active_evicts_idle_queries() {
    let repository = Arc::new(FakeExpenseRepository::new());
    let (client, _) = client_with(repository.clone());

    client.get_stats().await.unwrap();
    tokio::time::advance(Duration::from_secs(301)).await;
    client.list_recent(5).await.unwrap();

    // 集計は300秒以上参照されていないため破棄される
    assert_eq!(client.refetch_active().await, 1);
    assert_eq!(repository.calls("fetch_stats"), 1);
    assert_eq!(repository.calls("fetch_recent"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_auto_refresh_refetches_on_interval() {
    let repository = Arc::new(FakeExpenseRepository::new());
    let (client, _) = client_with(repository.clone());
    let client = Arc::new(client);

    client.get_stats().await.unwrap();
    let handle = AutoRefresh::spawn_with_config(client.clone());

    tokio::time::sleep(Duration::from_secs(29)).await;
    assert_eq!(repository.calls("fetch_stats"), 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(repository.calls("fetch_stats"), 2);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(repository.calls("fetch_stats"), 3);

    handle.stop().await;
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(repository.calls("fetch_stats"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_auto_refresh_keeps_data_fresh_for_readers() {
    let repository = Arc::new(FakeExpenseRepository::new());
    let (client, _) = client_with(repository.clone());
    let client = Arc::new(client);
    let handle = AutoRefresh::spawn(client.clone(), Duration::from_secs(30));

    client.get_stats().await.unwrap();
    let dto = validate_draft(&coffee_draft()).unwrap();
    repository.create(&dto, None).await.unwrap();

    // 他の利用者による変更も次の更新で反映される
    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(client.get_stats().await.unwrap().total_expenses, 4.5);
    assert_eq!(repository.calls("fetch_stats"), 2);

    handle.stop().await;
}

#[tokio::test]
async fn test_view_state_load_and_paging() {
    let expenses = (1..=12)
        .map(|i| sample_expense(&format!("e{i}"), &format!("Item {i}"), 1.0, Category::Other))
        .collect();
    let repository = Arc::new(FakeExpenseRepository::with_expenses(expenses));
    let (client, _) = client_with(repository.clone());

    let mut state = ExpenseViewState::new();
    let view = state.load(&client, 10).await.unwrap();
    assert_eq!(view.expenses.len(), 10);
    assert!(view.has_multiple_pages());
    assert_eq!(state.total_pages, Some(2));

    assert_eq!(state.next_page(), 2);
    let view = state.load(&client, 10).await.unwrap();
    assert_eq!(view.expenses.len(), 2);
    assert_eq!(state.next_page(), 2);

    // 検索語はページ内で絞り込み、再取得しない
    state.set_search_term("item 11");
    let view = state.load(&client, 10).await.unwrap();
    assert_eq!(view.expenses.len(), 1);
    assert_eq!(view.page_count, 2);
    assert_eq!(repository.calls("fetch_page"), 2);

    state.set_category(Some(Category::Travel));
    assert_eq!(state.page, 1);
    let view = state.load(&client, 10).await.unwrap();
    assert!(view.expenses.is_empty());
    assert!(!view.has_multiple_pages());
}
