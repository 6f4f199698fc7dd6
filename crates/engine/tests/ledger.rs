use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AppDefaults, Engine, EngineError, PaymentMethod, Role, TransactionKind, TransactionListFilter,
    TransactionStatus,
};
use migration::MigratorTrait;
use uuid::Uuid;

const DEFAULTS: AppDefaults = AppDefaults {
    max_debt_minor: 60,
    service_charge_bps: 2_000,
};

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    engine.ensure_app_defaults(DEFAULTS).await.unwrap();
    (engine, db)
}

/// A vendor with `{balance: 100, service_charge: 20}` and a default bank.
async fn funded_vendor(engine: &Engine) -> Uuid {
    let vendor_id = engine.new_vendor("Corner Shop").await.unwrap();
    let account = engine.settle_sale(vendor_id, 100).await.unwrap();
    assert_eq!(account.balance, 100);
    assert_eq!(account.service_charge, 20);
    engine
        .add_bank_account(vendor_id, "First Bank", "0123456789", "Corner Shop Ltd")
        .await
        .unwrap();
    vendor_id
}

async fn count_transactions(db: &DatabaseConnection, vendor_id: Uuid) -> i64 {
    let row = db
        .query_one(Statement::from_sql_and_values(
            db.get_database_backend(),
            "SELECT COUNT(*) AS n FROM transactions WHERE vendor_id = ?",
            vec![vendor_id.to_string().into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap()
}

async fn set_balance(db: &DatabaseConnection, vendor_id: Uuid, balance: i64) {
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE accounts SET balance = ? WHERE vendor_id = ?",
        vec![balance.into(), vendor_id.to_string().into()],
    ))
    .await
    .unwrap();
}

#[tokio::test]
async fn new_vendor_starts_with_an_empty_account() {
    let (engine, _db) = engine_with_db().await;
    let vendor_id = engine.new_vendor("  Shop  ").await.unwrap();

    let vendor = engine.vendor(vendor_id).await.unwrap();
    assert_eq!(vendor.name, "Shop");
    let account = engine.account(vendor_id).await.unwrap();
    assert_eq!((account.balance, account.service_charge), (0, 0));
}

#[tokio::test]
async fn unknown_vendor_account_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let err = engine.account(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn settle_sale_charges_the_configured_fee() {
    let (engine, _db) = engine_with_db().await;
    let vendor_id = engine.new_vendor("Shop").await.unwrap();

    engine.settle_sale(vendor_id, 100).await.unwrap();
    let account = engine.settle_sale(vendor_id, 9).await.unwrap();
    // 20% of 9 rounds down to 1.
    assert_eq!(account.balance, 109);
    assert_eq!(account.service_charge, 21);

    let err = engine.settle_sale(vendor_id, 0).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn settle_sale_rejects_a_balance_overflow() {
    let (engine, db) = engine_with_db().await;
    let vendor_id = engine.new_vendor("Shop").await.unwrap();
    set_balance(&db, vendor_id, i64::MAX - 5).await;

    let err = engine.settle_sale(vendor_id, 10).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let account = engine.account(vendor_id).await.unwrap();
    assert_eq!(account.balance, i64::MAX - 5);
    assert_eq!(account.service_charge, 0);
}

#[tokio::test]
async fn withdrawal_scenario_completes_and_blocks_a_second_pending() {
    let (engine, db) = engine_with_db().await;
    let vendor_id = funded_vendor(&engine).await;

    let tx = engine.open_withdrawal(vendor_id, 50).await.unwrap();
    assert_eq!(tx.status, TransactionStatus::Processing);
    assert_eq!(tx.kind, TransactionKind::Withdrawal);
    assert!(tx.bank_account_id.is_some());
    assert!(tx.details.contains("******6789"));

    let err = engine.open_withdrawal(vendor_id, 10).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::PendingTransaction("withdrawal".to_string())
    );
    assert_eq!(err.to_string(), "There is a pending withdrawal");
    assert_eq!(count_transactions(&db, vendor_id).await, 1);

    let done = engine
        .complete_transaction(vendor_id, tx.id, TransactionKind::Withdrawal)
        .await
        .unwrap();
    assert_eq!(done.status, TransactionStatus::Completed);
    assert!(done.resolved_at.is_some());

    let account = engine.account(vendor_id).await.unwrap();
    assert_eq!(account.balance, 50);
    assert_eq!(account.service_charge, 20);

    // Nothing is pending any more.
    engine.open_withdrawal(vendor_id, 10).await.unwrap();
}

#[tokio::test]
async fn debt_payment_without_service_charge_is_rejected() {
    let (engine, db) = engine_with_db().await;
    let vendor_id = engine.new_vendor("Shop").await.unwrap();

    let err = engine
        .open_debt_payment(vendor_id, 10, PaymentMethod::Card)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NoServiceCharge);
    assert_eq!(count_transactions(&db, vendor_id).await, 0);
}

#[tokio::test]
async fn debt_payment_above_service_charge_is_rejected() {
    let (engine, db) = engine_with_db().await;
    let vendor_id = funded_vendor(&engine).await;

    let err = engine
        .open_debt_payment(vendor_id, 21, PaymentMethod::Wallet)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));
    assert_eq!(count_transactions(&db, vendor_id).await, 0);
}

#[tokio::test]
async fn completed_debt_payment_lowers_only_the_service_charge() {
    let (engine, _db) = engine_with_db().await;
    let vendor_id = funded_vendor(&engine).await;

    let tx = engine
        .open_debt_payment(vendor_id, 15, PaymentMethod::Transfer)
        .await
        .unwrap();
    assert_eq!(tx.method, Some(PaymentMethod::Transfer));
    assert!(tx.bank_account_id.is_none());

    let err = engine
        .open_debt_payment(vendor_id, 1, PaymentMethod::Card)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::PendingTransaction("service charge payment".to_string())
    );

    engine
        .complete_transaction(vendor_id, tx.id, TransactionKind::ServiceChargePayment)
        .await
        .unwrap();
    let account = engine.account(vendor_id).await.unwrap();
    assert_eq!(account.service_charge, 5);
    assert_eq!(account.balance, 100);
}

#[tokio::test]
async fn pending_kinds_are_independent() {
    let (engine, _db) = engine_with_db().await;
    let vendor_id = funded_vendor(&engine).await;

    engine.open_withdrawal(vendor_id, 10).await.unwrap();
    engine
        .open_debt_payment(vendor_id, 10, PaymentMethod::Card)
        .await
        .unwrap();
}

#[tokio::test]
async fn withdrawal_above_balance_is_rejected() {
    let (engine, db) = engine_with_db().await;
    let vendor_id = funded_vendor(&engine).await;

    let err = engine.open_withdrawal(vendor_id, 101).await.unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));
    assert_eq!(count_transactions(&db, vendor_id).await, 0);
    assert_eq!(engine.account(vendor_id).await.unwrap().balance, 100);
}

#[tokio::test]
async fn withdrawal_is_blocked_at_the_debt_limit() {
    let (engine, _db) = engine_with_db().await;
    let vendor_id = funded_vendor(&engine).await;

    engine
        .update_app_defaults(AppDefaults {
            max_debt_minor: 20,
            ..DEFAULTS
        })
        .await
        .unwrap();

    let err = engine.open_withdrawal(vendor_id, 10).await.unwrap_err();
    assert!(matches!(err, EngineError::ServiceChargeLimit(_)));
}

#[tokio::test]
async fn withdrawal_requires_a_default_bank_account() {
    let (engine, _db) = engine_with_db().await;
    let vendor_id = engine.new_vendor("Shop").await.unwrap();
    engine.settle_sale(vendor_id, 100).await.unwrap();

    let err = engine.open_withdrawal(vendor_id, 10).await.unwrap_err();
    assert_eq!(err, EngineError::MissingDefaultBank);
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let vendor_id = funded_vendor(&engine).await;

    for amount in [0, -5] {
        let err = engine.open_withdrawal(vendor_id, amount).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
        let err = engine
            .open_debt_payment(vendor_id, amount, PaymentMethod::Card)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }
}

#[tokio::test]
async fn cancel_leaves_the_account_untouched() {
    let (engine, _db) = engine_with_db().await;
    let vendor_id = funded_vendor(&engine).await;

    let tx = engine.open_withdrawal(vendor_id, 40).await.unwrap();
    let cancelled = engine
        .cancel_transaction(vendor_id, tx.id, TransactionKind::Withdrawal)
        .await
        .unwrap();
    assert_eq!(cancelled.status, TransactionStatus::Cancelled);

    let account = engine.account(vendor_id).await.unwrap();
    assert_eq!((account.balance, account.service_charge), (100, 20));

    // A cancelled withdrawal does not block a new one.
    engine.open_withdrawal(vendor_id, 40).await.unwrap();
}

#[tokio::test]
async fn terminal_transactions_cannot_be_resolved_again() {
    let (engine, _db) = engine_with_db().await;
    let vendor_id = funded_vendor(&engine).await;

    let tx = engine.open_withdrawal(vendor_id, 30).await.unwrap();
    engine
        .complete_transaction(vendor_id, tx.id, TransactionKind::Withdrawal)
        .await
        .unwrap();

    let err = engine
        .complete_transaction(vendor_id, tx.id, TransactionKind::Withdrawal)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    let err = engine
        .cancel_transaction(vendor_id, tx.id, TransactionKind::Withdrawal)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    assert_eq!(engine.account(vendor_id).await.unwrap().balance, 70);
    let stored = engine.transaction(vendor_id, tx.id).await.unwrap();
    assert_eq!(stored.status, TransactionStatus::Completed);
}

#[tokio::test]
async fn failed_completion_keeps_the_transaction_processing() {
    let (engine, db) = engine_with_db().await;
    let vendor_id = funded_vendor(&engine).await;

    let tx = engine.open_withdrawal(vendor_id, 50).await.unwrap();
    set_balance(&db, vendor_id, 10).await;

    let err = engine
        .complete_transaction(vendor_id, tx.id, TransactionKind::Withdrawal)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));

    // The status flip was rolled back with the failed decrement.
    let stored = engine.transaction(vendor_id, tx.id).await.unwrap();
    assert_eq!(stored.status, TransactionStatus::Processing);
    assert!(stored.resolved_at.is_none());
    assert_eq!(engine.account(vendor_id).await.unwrap().balance, 10);
}

#[tokio::test]
async fn resolving_with_a_mismatched_kind_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let vendor_id = funded_vendor(&engine).await;

    let tx = engine
        .open_debt_payment(vendor_id, 10, PaymentMethod::Card)
        .await
        .unwrap();
    let err = engine
        .complete_transaction(vendor_id, tx.id, TransactionKind::Withdrawal)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let stored = engine.transaction(vendor_id, tx.id).await.unwrap();
    assert_eq!(stored.status, TransactionStatus::Processing);
    assert_eq!(engine.account(vendor_id).await.unwrap().service_charge, 20);
}

#[tokio::test]
async fn other_vendors_transactions_are_not_visible() {
    let (engine, _db) = engine_with_db().await;
    let owner = funded_vendor(&engine).await;
    let other = engine.new_vendor("Other").await.unwrap();

    let tx = engine.open_withdrawal(owner, 10).await.unwrap();
    let err = engine.transaction(other, tx.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    let err = engine
        .cancel_transaction(other, tx.id, TransactionKind::Withdrawal)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn duplicate_processing_rows_are_rejected_by_the_index() {
    let (engine, db) = engine_with_db().await;
    let vendor_id = funded_vendor(&engine).await;
    engine.open_withdrawal(vendor_id, 10).await.unwrap();

    let res = db
        .execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO transactions (id, vendor_id, kind, amount_minor, status, details, created_at) \
             VALUES (?, ?, 'withdrawal', 5, 'processing', 'dup', '2026-01-01T00:00:00Z')",
            vec![Uuid::new_v4().to_string().into(), vendor_id.to_string().into()],
        ))
        .await;
    assert!(res.is_err());
    assert_eq!(count_transactions(&db, vendor_id).await, 1);
}

#[tokio::test]
async fn list_transactions_filters_and_orders_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let vendor_id = funded_vendor(&engine).await;

    let first = engine.open_withdrawal(vendor_id, 10).await.unwrap();
    engine
        .cancel_transaction(vendor_id, first.id, TransactionKind::Withdrawal)
        .await
        .unwrap();
    let second = engine.open_withdrawal(vendor_id, 20).await.unwrap();
    engine
        .open_debt_payment(vendor_id, 5, PaymentMethod::Card)
        .await
        .unwrap();

    let all = engine
        .list_transactions(&TransactionListFilter {
            vendor_id: Some(vendor_id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    let withdrawals = engine
        .list_transactions(&TransactionListFilter {
            vendor_id: Some(vendor_id),
            kind: Some(TransactionKind::Withdrawal),
            status: Some(TransactionStatus::Processing),
            limit: None,
        })
        .await
        .unwrap();
    assert_eq!(withdrawals.len(), 1);
    assert_eq!(withdrawals[0].id, second.id);

    let limited = engine
        .list_transactions(&TransactionListFilter {
            vendor_id: Some(vendor_id),
            limit: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn first_bank_account_becomes_default_until_switched() {
    let (engine, _db) = engine_with_db().await;
    let vendor_id = engine.new_vendor("Shop").await.unwrap();

    let first = engine
        .add_bank_account(vendor_id, "First Bank", "1111", "Shop")
        .await
        .unwrap();
    let second = engine
        .add_bank_account(vendor_id, "Second Bank", "2222", "Shop")
        .await
        .unwrap();
    assert!(first.is_default);
    assert!(!second.is_default);

    let err = engine
        .add_bank_account(vendor_id, "First Bank", "1111", "Shop")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    engine
        .set_default_bank_account(vendor_id, second.id)
        .await
        .unwrap();
    let default = engine.default_bank_account(vendor_id).await.unwrap().unwrap();
    assert_eq!(default.id, second.id);

    let banks = engine.bank_accounts(vendor_id).await.unwrap();
    assert_eq!(banks.len(), 2);
    assert_eq!(banks.iter().filter(|b| b.is_default).count(), 1);
    assert_eq!(banks[0].id, second.id);

    let err = engine
        .set_default_bank_account(vendor_id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn delete_vendor_removes_every_owned_row() {
    let (engine, db) = engine_with_db().await;
    let vendor_id = funded_vendor(&engine).await;
    engine.open_withdrawal(vendor_id, 10).await.unwrap();
    engine
        .new_user("shop", "secret", Role::Vendor, Some(vendor_id))
        .await
        .unwrap();

    engine.delete_vendor(vendor_id).await.unwrap();

    assert!(matches!(
        engine.vendor(vendor_id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine.account(vendor_id).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert_eq!(count_transactions(&db, vendor_id).await, 0);
    assert!(engine.authenticate("shop", "secret").await.unwrap().is_none());

    let err = engine.delete_vendor(vendor_id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn users_authenticate_with_their_password() {
    let (engine, _db) = engine_with_db().await;
    let vendor_id = engine.new_vendor("Shop").await.unwrap();

    let user = engine
        .new_user("shop", "secret", Role::Vendor, Some(vendor_id))
        .await
        .unwrap();
    assert_eq!(user.vendor_id, Some(vendor_id));

    let found = engine.authenticate("shop", "secret").await.unwrap().unwrap();
    assert_eq!(found, user);
    assert!(engine.authenticate("shop", "wrong").await.unwrap().is_none());
    assert!(engine.authenticate("ghost", "secret").await.unwrap().is_none());

    let err = engine
        .new_user("shop", "other", Role::Vendor, Some(vendor_id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let err = engine
        .new_user("lost", "secret", Role::Vendor, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn app_defaults_seed_once_and_validate_updates() {
    let (engine, _db) = engine_with_db().await;

    let kept = engine
        .ensure_app_defaults(AppDefaults {
            max_debt_minor: 1,
            service_charge_bps: 1,
        })
        .await
        .unwrap();
    assert_eq!(kept, DEFAULTS);

    let err = engine
        .update_app_defaults(AppDefaults {
            max_debt_minor: -1,
            service_charge_bps: 100,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(engine.app_defaults().await.unwrap(), DEFAULTS);
}
