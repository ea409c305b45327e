use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CreatePaymentCmd, DateRange, Engine, EngineError, NewOrderCmd, OilStockCmd, OilType,
    OrderListFilter, UpdateOrderCmd, UpdatePaymentCmd,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn seed(db: &DatabaseConnection) -> (Uuid, Uuid) {
    let backend = db.get_database_backend();
    for (username, role) in [("alice", "manager"), ("bob", "employee")] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, role) VALUES (?, ?)",
            vec![username.into(), role.into()],
        ))
        .await
        .unwrap();
    }

    let mut customers = Vec::new();
    for shop in ["Barkat HW", "Madina Traders"] {
        let id = Uuid::new_v4();
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO customers (id, shop_name, name, phone_number, created_at) VALUES (?, ?, ?, ?, ?)",
            vec![
                id.to_string().into(),
                shop.into(),
                shop.into(),
                "0300-0000000".into(),
                at(0).into(),
            ],
        ))
        .await
        .unwrap();
        customers.push(id);
    }
    (customers[0], customers[1])
}

async fn engine_with_db() -> (Engine, Uuid, Uuid) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let (first, second) = seed(&db).await;
    let engine = Engine::builder().database(db).build().await.unwrap();
    (engine, first, second)
}

async fn engine_with_file_db() -> (Engine, Uuid, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let (customer, _) = seed(&db).await;
    let engine = Engine::builder()
        .database(db)
        .lock_timeout(Duration::from_secs(30))
        .build()
        .await
        .unwrap();

    (engine, customer, path)
}

/// 2024-12-01 at `hour`:00 UTC.
fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 1, hour, 0, 0).unwrap()
}

async fn order(engine: &Engine, customer: Uuid, price_minor: i64) -> Uuid {
    engine
        .new_order(NewOrderCmd::new(customer, "alice", "Barkat HW", "self", 1, price_minor).at(at(8)))
        .await
        .unwrap()
        .id
}

async fn pay(engine: &Engine, order_id: Uuid, cash_in_minor: i64, hour: u32) -> engine::Payment {
    engine
        .create_payment(CreatePaymentCmd::new(order_id, "alice", cash_in_minor).at(at(hour)))
        .await
        .unwrap()
}

#[tokio::test]
async fn payments_never_exceed_order_price() {
    let (engine, customer, _) = engine_with_db().await;
    let order_id = order(&engine, customer, 100).await;

    let first = pay(&engine, order_id, 60, 9).await;
    assert_eq!(first.seq, 1);
    assert_eq!(first.remaining_amount_minor, 40);

    let second = pay(&engine, order_id, 40, 10).await;
    assert_eq!(second.seq, 2);
    assert_eq!(second.remaining_amount_minor, 0);

    let err = engine
        .create_payment(CreatePaymentCmd::new(order_id, "alice", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Overpayment(_)));

    let ledger = engine.payments_for_order(order_id).await.unwrap();
    assert_eq!(ledger, vec![first, second]);
}

#[tokio::test]
async fn snapshots_follow_the_running_balance() {
    let (engine, customer, _) = engine_with_db().await;
    let order_id = order(&engine, customer, 1000).await;

    for (hour, cash_in) in [(9, 150), (10, 250), (11, 100), (12, 500)] {
        pay(&engine, order_id, cash_in, hour).await;
    }

    let ledger = engine.payments_for_order(order_id).await.unwrap();
    let mut paid = 0;
    for (idx, payment) in ledger.iter().enumerate() {
        paid += payment.cash_in_minor;
        assert_eq!(payment.seq, idx as i64 + 1);
        assert_eq!(payment.remaining_amount_minor, 1000 - paid);
        assert!(payment.remaining_amount_minor >= 0);
    }

    let report = engine.reconcile_order(order_id).await.unwrap();
    assert_eq!(report.total_paid_minor, 1000);
    assert_eq!(report.outstanding_minor, 0);
    assert!(report.stale_snapshots.is_empty());
    assert!(report.consistent);
}

#[tokio::test]
async fn rejected_payments_leave_the_ledger_unchanged() {
    let (engine, customer, _) = engine_with_db().await;
    let order_id = order(&engine, customer, 100).await;
    pay(&engine, order_id, 70, 9).await;

    for cash_in in [0, -10, 31] {
        assert!(
            engine
                .create_payment(CreatePaymentCmd::new(order_id, "alice", cash_in))
                .await
                .is_err()
        );
    }

    let err = engine
        .create_payment(CreatePaymentCmd::new(order_id, "mallory", 10))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .create_payment(CreatePaymentCmd::new(Uuid::new_v4(), "alice", 10))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    assert_eq!(engine.payments_for_order(order_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_payment_recomputes_its_own_snapshot_only() {
    let (engine, customer, _) = engine_with_db().await;
    let order_id = order(&engine, customer, 100).await;
    let first = pay(&engine, order_id, 50, 9).await;
    let second = pay(&engine, order_id, 30, 10).await;

    let err = engine
        .update_payment(UpdatePaymentCmd::new(first.id, "bob").cash_in(71))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Overpayment(_)));

    let updated = engine
        .update_payment(UpdatePaymentCmd::new(first.id, "bob").cash_in(60).at(at(11)))
        .await
        .unwrap();
    assert_eq!(updated.cash_in_minor, 60);
    assert_eq!(updated.remaining_amount_minor, 10);
    assert_eq!(updated.updated_by.as_deref(), Some("bob"));
    assert_eq!(updated.updated_at, at(11));
    assert_eq!(updated.created_by.as_deref(), Some("alice"));

    let untouched = engine.payment(second.id).await.unwrap();
    assert_eq!(untouched.remaining_amount_minor, 20);

    let report = engine.reconcile_order(order_id).await.unwrap();
    assert_eq!(report.total_paid_minor, 90);
    assert_eq!(report.outstanding_minor, 10);
    assert_eq!(report.latest_snapshot_minor, Some(20));
    // Neither stored snapshot matches a replay of the edited ledger.
    assert_eq!(report.stale_snapshots, vec![first.id, second.id]);
    assert!(!report.consistent);
}

#[tokio::test]
async fn update_without_amount_only_touches_audit_fields() {
    let (engine, customer, _) = engine_with_db().await;
    let order_id = order(&engine, customer, 100).await;
    let payment = pay(&engine, order_id, 40, 9).await;

    let updated = engine
        .update_payment(UpdatePaymentCmd::new(payment.id, "bob").at(at(12)))
        .await
        .unwrap();
    assert_eq!(updated.cash_in_minor, 40);
    assert_eq!(updated.remaining_amount_minor, 60);
    assert_eq!(updated.updated_by.as_deref(), Some("bob"));
    assert_eq!(updated.updated_at, at(12));
}

#[tokio::test]
async fn delete_payment_keeps_sibling_snapshots() {
    let (engine, customer, _) = engine_with_db().await;
    let order_id = order(&engine, customer, 100).await;
    let first = pay(&engine, order_id, 50, 9).await;
    let second = pay(&engine, order_id, 30, 10).await;

    engine.delete_payment(first.id).await.unwrap();
    let err = engine.delete_payment(first.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let ledger = engine.payments_for_order(order_id).await.unwrap();
    assert_eq!(ledger, vec![second.clone()]);

    // Numbering follows the highest surviving payment.
    let third = pay(&engine, order_id, 70, 11).await;
    assert_eq!(third.seq, 3);
    assert_eq!(third.remaining_amount_minor, 0);
}

#[tokio::test]
async fn deleting_the_latest_payment_frees_its_seq() {
    let (engine, customer, _) = engine_with_db().await;
    let order_id = order(&engine, customer, 100).await;
    pay(&engine, order_id, 20, 9).await;
    let latest = pay(&engine, order_id, 30, 10).await;
    assert_eq!(latest.seq, 2);

    engine.delete_payment(latest.id).await.unwrap();
    let replacement = pay(&engine, order_id, 30, 11).await;
    assert_eq!(replacement.seq, 2);
    assert_eq!(replacement.remaining_amount_minor, 50);

    let seqs: Vec<i64> = engine
        .payments_for_order(order_id)
        .await
        .unwrap()
        .iter()
        .map(|p| p.seq)
        .collect();
    assert_eq!(seqs, vec![1, 2]);
}

#[tokio::test]
async fn stock_never_goes_negative() {
    let (engine, _, _) = engine_with_db().await;

    let first = engine
        .record_oil_stock(OilStockCmd::purchase(OilType::Black, "alice", 100, 50).at(at(9)))
        .await
        .unwrap();
    assert_eq!(first.remaining_oil, 100);
    assert_eq!(first.purchase_price_minor, 50);

    let second = engine
        .record_oil_stock(OilStockCmd::usage(OilType::Black, "alice", 30).at(at(10)))
        .await
        .unwrap();
    assert_eq!(second.remaining_oil, 70);
    assert_eq!(second.seq, 2);

    let err = engine
        .record_oil_stock(OilStockCmd::usage(OilType::Black, "alice", 80))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientStock(_)));

    let remaining = engine.remaining_oil().await.unwrap();
    assert_eq!(remaining.get(&OilType::Black), Some(&70));

    let report = engine.reconcile_oil_stock(OilType::Black).await.unwrap();
    assert_eq!(report.entries, 2);
    assert_eq!(report.total_purchased, 100);
    assert_eq!(report.total_used, 30);
    assert_eq!(report.latest_remaining, 70);
    assert!(report.consistent);
}

#[tokio::test]
async fn oil_types_keep_independent_ledgers() {
    let (engine, _, _) = engine_with_db().await;

    engine
        .record_oil_stock(OilStockCmd::purchase(OilType::Black, "alice", 100, 0))
        .await
        .unwrap();
    let err = engine
        .record_oil_stock(OilStockCmd::usage(OilType::Tyre, "alice", 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientStock(_)));

    let tyre = engine
        .record_oil_stock(OilStockCmd::purchase(OilType::Tyre, "bob", 40, 10))
        .await
        .unwrap();
    assert_eq!(tyre.seq, 1);
    assert_eq!(tyre.remaining_oil, 40);

    let first = engine.remaining_oil().await.unwrap();
    let second = engine.remaining_oil().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.into_iter().collect::<Vec<_>>(),
        vec![(OilType::Black, 100), (OilType::Tyre, 40)]
    );
}

#[tokio::test]
async fn empty_stock_reports_nothing() {
    let (engine, _, _) = engine_with_db().await;
    assert!(engine.remaining_oil().await.unwrap().is_empty());

    let report = engine.reconcile_oil_stock(OilType::Tyre).await.unwrap();
    assert_eq!(report.entries, 0);
    assert!(report.consistent);
}

#[tokio::test]
async fn list_oil_stock_filters_by_creation_time() {
    let (engine, _, _) = engine_with_db().await;
    engine
        .record_oil_stock(OilStockCmd::purchase(OilType::Black, "alice", 10, 0).at(at(9)))
        .await
        .unwrap();
    engine
        .record_oil_stock(OilStockCmd::purchase(OilType::Tyre, "alice", 10, 0).at(at(15)))
        .await
        .unwrap();

    let morning = DateRange::new(at(0), at(12)).unwrap();
    let entries = engine.list_oil_stock(morning).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].oil_type, OilType::Black);

    let whole_day = DateRange::parse("2024-12-01", "2024-12-01").unwrap();
    assert_eq!(engine.list_oil_stock(whole_day).await.unwrap().len(), 2);
}

#[tokio::test]
async fn delivery_is_recorded_once_and_leaves_pending_orders() {
    let (engine, customer, _) = engine_with_db().await;
    let order_id = order(&engine, customer, 100).await;

    let pending = engine.pending_orders().await.unwrap();
    assert_eq!(pending.iter().map(|o| o.id).collect::<Vec<_>>(), vec![order_id]);

    let delivered = engine
        .update_order(UpdateOrderCmd::new(order_id, "bob").delivery(true).at(at(14)))
        .await
        .unwrap();
    assert_eq!(delivered.delivered_at, Some(at(14)));
    assert_eq!(delivered.delivered_by.as_deref(), Some("bob"));
    assert_eq!(delivered.updated_by.as_deref(), Some("bob"));
    assert!(engine.pending_orders().await.unwrap().is_empty());

    let again = engine
        .update_order(UpdateOrderCmd::new(order_id, "alice").delivery(true).at(at(16)))
        .await
        .unwrap();
    assert_eq!(again.delivered_at, Some(at(14)));
    assert_eq!(again.delivered_by.as_deref(), Some("bob"));
    assert_eq!(again.updated_by.as_deref(), Some("alice"));

    let err = engine
        .update_order(UpdateOrderCmd::new(order_id, "alice").delivery(false))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert!(engine.order(order_id).await.unwrap().delivery);
}

#[tokio::test]
async fn update_order_keeps_price_and_creation_fields() {
    let (engine, customer, _) = engine_with_db().await;
    let order_id = order(&engine, customer, 100).await;

    let updated = engine
        .update_order(
            UpdateOrderCmd::new(order_id, "bob")
                .source("Madina Traders")
                .order_type("delivery")
                .quantity(3)
                .pick_up(true)
                .at(at(12)),
        )
        .await
        .unwrap();

    let stored = engine.order(order_id).await.unwrap();
    assert_eq!(stored, updated);
    assert_eq!(stored.source, "Madina Traders");
    assert_eq!(stored.order_type, "delivery");
    assert_eq!(stored.quantity, 3);
    assert!(stored.pick_up);
    assert_eq!(stored.price_minor, 100);
    assert_eq!(stored.created_at, at(8));
    assert_eq!(stored.created_by.as_deref(), Some("alice"));
    assert_eq!(stored.updated_at, at(12));

    let err = engine
        .update_order(UpdateOrderCmd::new(order_id, "bob").quantity(0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn pending_payments_lists_delivered_orders_still_owed() {
    let (engine, first_customer, second_customer) = engine_with_db().await;

    let unpaid = engine
        .new_order(NewOrderCmd::new(first_customer, "alice", "Barkat HW", "self", 1, 100).delivery(true))
        .await
        .unwrap();
    let paid = engine
        .new_order(
            NewOrderCmd::new(second_customer, "alice", "Madina Traders", "self", 1, 100)
                .delivery(true)
                .initial_cash_in(100),
        )
        .await
        .unwrap();
    let partly_paid_pending = engine
        .new_order(
            NewOrderCmd::new(second_customer, "alice", "Madina Traders", "self", 1, 100)
                .initial_cash_in(10),
        )
        .await
        .unwrap();

    let pending = engine.pending_payments(None).await.unwrap();
    assert_eq!(pending.iter().map(|o| o.id).collect::<Vec<_>>(), vec![unpaid.id]);
    assert_eq!(paid.payments[0].remaining_amount_minor, 0);
    assert!(!partly_paid_pending.delivery);

    let for_second = engine.pending_payments(Some(second_customer)).await.unwrap();
    assert!(for_second.is_empty());

    let err = engine
        .pending_payments(Some(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn new_order_is_rejected_as_a_whole() {
    let (engine, customer, _) = engine_with_db().await;

    let err = engine
        .new_order(NewOrderCmd::new(customer, "alice", "Barkat HW", "self", 1, 100).initial_cash_in(101))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Overpayment(_)));

    let err = engine
        .new_order(NewOrderCmd::new(Uuid::new_v4(), "alice", "Barkat HW", "self", 1, 100))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .new_order(NewOrderCmd::new(customer, "alice", "  ", "self", 1, 100))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .new_order(NewOrderCmd::new(customer, "alice", "Barkat HW", "self", 1, -1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let all = engine
        .list_orders(OrderListFilter::default())
        .await
        .unwrap();
    assert!(all.is_empty());
}

#[tokio::test]
async fn delete_order_removes_its_payments() {
    let (engine, customer, _) = engine_with_db().await;
    let order_id = order(&engine, customer, 100).await;
    let payment = pay(&engine, order_id, 30, 9).await;

    engine.delete_order(order_id).await.unwrap();

    assert!(matches!(
        engine.order(order_id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine.payment(payment.id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine.delete_order(order_id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
}

#[tokio::test]
async fn list_orders_applies_optional_bounds() {
    let (engine, customer, _) = engine_with_db().await;
    for hour in [8, 12, 16] {
        engine
            .new_order(NewOrderCmd::new(customer, "alice", "Barkat HW", "self", 1, 10).at(at(hour)))
            .await
            .unwrap();
    }

    let all = engine.list_orders(OrderListFilter::default()).await.unwrap();
    assert_eq!(
        all.iter().map(|o| o.created_at).collect::<Vec<_>>(),
        vec![at(8), at(12), at(16)]
    );

    let from_noon = OrderListFilter {
        from: Some(at(12)),
        to: None,
    };
    assert_eq!(engine.list_orders(from_noon).await.unwrap().len(), 2);

    let until_noon = OrderListFilter {
        from: None,
        to: Some(at(12)),
    };
    assert_eq!(engine.list_orders(until_noon).await.unwrap().len(), 2);
}

#[tokio::test]
async fn list_payments_filters_by_range() {
    let (engine, customer, _) = engine_with_db().await;
    let order_id = order(&engine, customer, 100).await;
    pay(&engine, order_id, 10, 9).await;
    pay(&engine, order_id, 10, 18).await;

    let morning = DateRange::new(at(0), at(12)).unwrap();
    let payments = engine.list_payments(Some(morning)).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].created_at, at(9));

    // No range means today, and nothing was paid today.
    assert!(engine.list_payments(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn orders_by_payment_range_sums_in_range_cash() {
    let (engine, first_customer, second_customer) = engine_with_db().await;
    let first = order(&engine, first_customer, 100).await;
    let second = order(&engine, second_customer, 200).await;
    order(&engine, first_customer, 300).await;

    pay(&engine, first, 20, 9).await;
    pay(&engine, first, 30, 15).await;
    pay(&engine, second, 50, 10).await;

    let range = DateRange::new(at(9), at(12)).unwrap();
    let report = engine.orders_by_payment_range(range).await.unwrap();

    assert_eq!(report.grand_total_minor, 70);
    assert_eq!(report.orders.len(), 2);

    let first_summary = report
        .orders
        .iter()
        .find(|s| s.order.id == first)
        .unwrap();
    assert_eq!(first_summary.total_in_range_minor, 20);
    assert_eq!(first_summary.payments.len(), 2);
    assert_eq!(
        first_summary
            .payments
            .iter()
            .map(|p| p.in_range)
            .collect::<Vec<_>>(),
        vec![true, false]
    );
    assert_eq!(
        first_summary.customer.as_ref().map(|c| c.id),
        Some(first_customer)
    );

    let empty = DateRange::new(at(20), at(21)).unwrap();
    let report = engine.orders_by_payment_range(empty).await.unwrap();
    assert!(report.orders.is_empty());
    assert_eq!(report.grand_total_minor, 0);
}

#[tokio::test]
async fn actors_resolve_known_usernames() {
    let (engine, _, _) = engine_with_db().await;

    let actors = engine.actors(["alice", "bob", "alice", "ghost"]).await.unwrap();
    assert_eq!(actors.len(), 2);
    assert_eq!(actors["alice"].role, "manager");
    assert_eq!(actors["bob"].role, "employee");

    assert!(matches!(
        engine.actor("ghost").await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_payments_never_overpay() {
    let (engine, customer, path) = engine_with_file_db().await;
    let engine = Arc::new(engine);
    let order_id = order(&engine, customer, 100).await;

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..10 {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move {
            engine
                .create_payment(CreatePaymentCmd::new(order_id, "alice", 20))
                .await
        });
    }

    let mut accepted = 0;
    let mut rejected = 0;
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Ok(_) => accepted += 1,
            Err(EngineError::Overpayment(_)) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(accepted, 5);
    assert_eq!(rejected, 5);

    let report = engine.reconcile_order(order_id).await.unwrap();
    assert_eq!(report.total_paid_minor, 100);
    assert!(report.consistent);
    let seqs: Vec<i64> = engine
        .payments_for_order(order_id)
        .await
        .unwrap()
        .iter()
        .map(|p| p.seq)
        .collect();
    assert_eq!(seqs, vec![1, 2, 3, 4, 5]);

    drop(engine);
    let _ = std::fs::remove_file(path);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_stock_usage_never_goes_negative() {
    let (engine, _, path) = engine_with_file_db().await;
    let engine = Arc::new(engine);
    engine
        .record_oil_stock(OilStockCmd::purchase(OilType::Black, "alice", 100, 500))
        .await
        .unwrap();

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..10 {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move {
            engine
                .record_oil_stock(OilStockCmd::usage(OilType::Black, "bob", 20))
                .await
        });
    }

    let mut accepted = 0;
    let mut rejected = 0;
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Ok(_) => accepted += 1,
            Err(EngineError::InsufficientStock(_)) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(accepted, 5);
    assert_eq!(rejected, 5);

    let remaining = engine.remaining_oil().await.unwrap();
    assert_eq!(remaining.get(&OilType::Black), Some(&0));

    let report = engine.reconcile_oil_stock(OilType::Black).await.unwrap();
    assert_eq!(report.entries, 6);
    assert_eq!(report.total_used, 100);
    assert!(report.consistent);

    drop(engine);
    let _ = std::fs::remove_file(path);
}
