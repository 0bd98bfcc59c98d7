// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use sumbook::context::{AppContext, DEFAULT_STORE_NAME};
use sumbook::docstore::{Backend, path as paths};
use sumbook::error::{Error, GENERIC_FAILURE};
use sumbook::models::{
    AuthUser, CategoryIcon, ImportedTransaction, NewTransaction, PreferencesPatch,
    TransactionPatch, TransactionType,
};

fn user(uid: &str, name: Option<&str>) -> AuthUser {
    AuthUser {
        uid: uid.into(),
        email: format!("{}@example.com", uid),
        display_name: name.map(str::to_string),
    }
}

fn setup() -> (Backend, AppContext) {
    let backend = Backend::open_in_memory().unwrap();
    let mut ctx = AppContext::new(backend.clone());
    ctx.init(user("u1", Some("Ann"))).unwrap();
    (backend, ctx)
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, d, 12, 0, 0).unwrap()
}

fn record(ctx: &mut AppContext, name: &str, amount: &str, kind: TransactionType) -> String {
    let new = NewTransaction::new(name, dec(amount), kind, None, day(1)).unwrap();
    ctx.add_transaction(new).unwrap()
}

fn names<'a>(it: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    it.collect()
}

#[test]
fn fresh_account_gets_a_default_book_and_participant() {
    let (_backend, ctx) = setup();
    assert_eq!(ctx.stores().len(), 1);
    let book = &ctx.stores()[0];
    assert_eq!(book.name, DEFAULT_STORE_NAME);
    assert_eq!(ctx.active_store_id(), Some(book.id.as_str()));
    assert_eq!(ctx.preferences().active_store_id.as_deref(), Some(book.id.as_str()));
    assert_eq!(ctx.preferences().currency, "USD");
    assert_eq!(names(ctx.app_users().iter().map(|u| u.name.as_str())), ["Ann"]);
    assert_eq!(ctx.app_users()[0].position, 0);
}

#[test]
fn signing_in_again_does_not_duplicate_defaults() {
    let (backend, mut ctx) = setup();
    ctx.teardown();
    ctx.init(user("u1", Some("Ann"))).unwrap();
    assert_eq!(ctx.stores().len(), 1);
    assert_eq!(ctx.app_users().len(), 1);

    let mut other = AppContext::new(backend);
    other.init(user("u1", Some("Ann"))).unwrap();
    assert_eq!(other.stores().len(), 1);
}

#[test]
fn account_without_display_name_starts_with_no_participants() {
    let backend = Backend::open_in_memory().unwrap();
    let mut ctx = AppContext::new(backend);
    ctx.init(user("u9", None)).unwrap();
    assert_eq!(ctx.stores().len(), 1);
    assert!(ctx.app_users().is_empty());
}

#[test]
fn teardown_releases_listeners_and_state() {
    let (backend, mut ctx) = setup();
    assert_eq!(backend.listener_count(), 5);
    ctx.teardown();
    assert_eq!(backend.listener_count(), 0);
    assert!(ctx.user().is_none());
    assert!(ctx.stores().is_empty());
    assert!(matches!(ctx.add_store("X"), Err(Error::NotSignedIn)));
}

#[test]
fn writes_show_up_after_pump_and_feed_the_summary() {
    let (_backend, mut ctx) = setup();
    record(&mut ctx, "Ann", "100", TransactionType::Income);
    record(&mut ctx, "Ann", "40", TransactionType::Expense);
    assert!(ctx.transactions().is_empty());

    assert!(ctx.pump() > 0);
    assert_eq!(ctx.transactions().len(), 2);
    let s = ctx.summary();
    assert_eq!(s.total_income, dec("100"));
    assert_eq!(s.total_expense, dec("40"));
    assert_eq!(s.total_balance, dec("60"));
    assert_eq!(s.user_balances.len(), 1);
    assert_eq!(s.user_balances[0].name, "Ann");
    assert_eq!(s.user_balances[0].balance, dec("60"));
}

#[test]
fn listing_is_newest_first() {
    let (_backend, mut ctx) = setup();
    for d in [3, 1, 2] {
        let new =
            NewTransaction::new("Ann", dec("1"), TransactionType::Expense, None, day(d)).unwrap();
        ctx.add_transaction(new).unwrap();
    }
    ctx.pump();
    let days: Vec<DateTime<Utc>> = ctx.transactions_by_date().iter().map(|t| t.date).collect();
    assert_eq!(days, [day(3), day(2), day(1)]);
}

#[test]
fn income_never_carries_a_category() {
    let (_backend, mut ctx) = setup();
    let food = ctx.add_category("Food", CategoryIcon::Utensils).unwrap();
    ctx.pump();
    let new = NewTransaction::new(
        "Ann",
        dec("5"),
        TransactionType::Income,
        Some(food.clone()),
        day(1),
    )
    .unwrap();
    assert_eq!(new.category_id, None);
    ctx.add_transaction(new).unwrap();
    ctx.pump();
    assert_eq!(ctx.transactions()[0].category_id, None);
}

#[test]
fn changing_type_keeps_the_transaction_in_place() {
    let (backend, mut ctx) = setup();
    let food = ctx.add_category("Food", CategoryIcon::Utensils).unwrap();
    ctx.pump();
    let new = NewTransaction::new(
        "Ann",
        dec("12.50"),
        TransactionType::Expense,
        Some(food.clone()),
        day(2),
    )
    .unwrap();
    let id = ctx.add_transaction(new).unwrap();
    ctx.pump();

    let patch = TransactionPatch {
        r#type: Some(TransactionType::Income),
        ..Default::default()
    };
    ctx.update_transaction(&id, patch).unwrap();
    ctx.pump();
    assert_eq!(ctx.transactions().len(), 1);
    let tx = &ctx.transactions()[0];
    assert_eq!(tx.id, id);
    assert_eq!(tx.r#type, TransactionType::Income);
    assert_eq!(tx.category_id, None);
    assert_eq!(tx.amount, dec("12.50"));
    assert_eq!(ctx.summary().total_income, dec("12.50"));
    assert_eq!(ctx.summary().total_expense, Decimal::ZERO);

    let store_id = ctx.active_store_id().unwrap().to_string();
    let stored = backend
        .session("u1")
        .list(&paths::transactions("u1", &store_id).unwrap())
        .unwrap();
    assert_eq!(stored.len(), 1);

    let patch = TransactionPatch {
        r#type: Some(TransactionType::Expense),
        category_id: Some(Some(food.clone())),
        ..Default::default()
    };
    ctx.update_transaction(&id, patch).unwrap();
    ctx.pump();
    let tx = &ctx.transactions()[0];
    assert_eq!(tx.r#type, TransactionType::Expense);
    assert_eq!(tx.category_id.as_deref(), Some(food.as_str()));
}

#[test]
fn edit_of_missing_transaction_leaves_a_notice() {
    let (_backend, mut ctx) = setup();
    let patch = TransactionPatch {
        amount: Some(dec("5")),
        ..Default::default()
    };
    ctx.update_transaction("missing", patch).unwrap();
    let notices = ctx.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].action, "update transaction");
    assert_eq!(notices[0].message, GENERIC_FAILURE);
    assert!(ctx.drain_notices().is_empty());
}

#[test]
fn invalid_input_is_rejected_up_front() {
    let (_backend, mut ctx) = setup();
    assert!(matches!(
        NewTransaction::new("Ann", Decimal::ZERO, TransactionType::Expense, None, day(1)),
        Err(Error::NonPositiveAmount)
    ));
    assert!(matches!(
        NewTransaction::new("  ", dec("1"), TransactionType::Expense, None, day(1)),
        Err(Error::EmptyName)
    ));
    let patch = TransactionPatch {
        amount: Some(dec("-1")),
        ..Default::default()
    };
    assert!(matches!(
        ctx.update_transaction("any", patch),
        Err(Error::NonPositiveAmount)
    ));
    assert!(matches!(
        ctx.add_category(" ", CategoryIcon::Tag),
        Err(Error::EmptyName)
    ));
    assert!(ctx.drain_notices().is_empty());
}

#[test]
fn clear_all_requires_the_book_name() {
    let (_backend, mut ctx) = setup();
    record(&mut ctx, "Ann", "1", TransactionType::Expense);
    record(&mut ctx, "Ann", "2", TransactionType::Income);
    ctx.pump();

    assert!(matches!(
        ctx.clear_all_transactions("personal!"),
        Err(Error::ConfirmationMismatch)
    ));
    ctx.pump();
    assert_eq!(ctx.transactions().len(), 2);

    assert_eq!(ctx.clear_all_transactions(DEFAULT_STORE_NAME).unwrap(), 2);
    ctx.pump();
    assert!(ctx.transactions().is_empty());
    assert_eq!(ctx.summary().total_balance, Decimal::ZERO);
}

#[test]
fn category_positions_append_and_reorder_is_a_permutation() {
    let (_backend, mut ctx) = setup();
    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        ids.push(ctx.add_category(name, CategoryIcon::Tag).unwrap());
        ctx.pump();
    }
    let positions: Vec<i64> = ctx.categories().iter().map(|c| c.position).collect();
    assert_eq!(positions, [0, 1, 2]);

    ctx.delete_category(&ids[1]).unwrap();
    ctx.pump();
    let d = ctx.add_category("D", CategoryIcon::Gift).unwrap();
    ctx.pump();
    assert_eq!(ctx.categories().last().map(|c| c.position), Some(3));

    let order = vec![d.clone(), ids[0].clone(), ids[2].clone()];
    ctx.update_category_order(&order).unwrap();
    ctx.pump();
    assert_eq!(
        names(ctx.categories().iter().map(|c| c.name.as_str())),
        ["D", "A", "C"]
    );

    for bad in [
        vec![d.clone(), ids[0].clone()],
        vec![d.clone(), d.clone(), ids[0].clone()],
        vec![d.clone(), ids[0].clone(), ids[1].clone()],
    ] {
        assert!(matches!(
            ctx.update_category_order(&bad),
            Err(Error::InvalidReorder)
        ));
    }
}

#[test]
fn category_edit_changes_name_and_icon() {
    let (_backend, mut ctx) = setup();
    let id = ctx.add_category("Food", CategoryIcon::Tag).unwrap();
    ctx.pump();
    ctx.update_category(&id, Some("Groceries"), Some(CategoryIcon::ShoppingCart))
        .unwrap();
    ctx.pump();
    let c = &ctx.categories()[0];
    assert_eq!(c.name, "Groceries");
    assert_eq!(c.icon, CategoryIcon::ShoppingCart);
}

#[test]
fn renaming_a_participant_keeps_recorded_names() {
    let (_backend, mut ctx) = setup();
    record(&mut ctx, "Ann", "10", TransactionType::Income);
    ctx.pump();
    let ann = ctx.app_users()[0].id.clone();
    ctx.rename_app_user(&ann, "Anna").unwrap();
    ctx.pump();

    assert_eq!(ctx.transactions()[0].user_name, "Ann");
    let balances: Vec<&str> = ctx
        .summary()
        .user_balances
        .iter()
        .map(|b| b.name.as_str())
        .collect();
    assert_eq!(balances, ["Anna", "Ann"]);
    assert_eq!(ctx.summary().user_balances[0].balance, Decimal::ZERO);
}

#[test]
fn participants_reorder() {
    let (_backend, mut ctx) = setup();
    let bob = ctx.add_app_user("Bob").unwrap();
    ctx.pump();
    let ann = ctx.app_users()[0].id.clone();
    ctx.update_app_user_order(&[bob.clone(), ann.clone()]).unwrap();
    ctx.pump();
    assert_eq!(
        names(ctx.app_users().iter().map(|u| u.name.as_str())),
        ["Bob", "Ann"]
    );
    ctx.delete_app_user(&bob).unwrap();
    ctx.pump();
    assert_eq!(ctx.app_users().len(), 1);
}

#[test]
fn new_book_becomes_active_and_scopes_data() {
    let (_backend, mut ctx) = setup();
    let personal = ctx.active_store_id().unwrap().to_string();
    record(&mut ctx, "Ann", "10", TransactionType::Income);
    ctx.pump();

    let trip = ctx.add_store(" Trip ").unwrap();
    ctx.pump();
    assert_eq!(ctx.active_store_id(), Some(trip.as_str()));
    assert_eq!(ctx.active_store().map(|s| s.name.as_str()), Some("Trip"));
    assert!(ctx.transactions().is_empty());
    assert_eq!(names(ctx.app_users().iter().map(|u| u.name.as_str())), ["Ann"]);

    ctx.switch_store(&personal).unwrap();
    ctx.pump();
    assert_eq!(ctx.active_store_id(), Some(personal.as_str()));
    assert_eq!(ctx.transactions().len(), 1);

    assert!(matches!(ctx.switch_store("nope"), Err(Error::NotFound(_))));
}

#[test]
fn rename_book() {
    let (_backend, mut ctx) = setup();
    let id = ctx.active_store_id().unwrap().to_string();
    ctx.rename_store(&id, "Household").unwrap();
    ctx.pump();
    assert_eq!(ctx.stores()[0].name, "Household");
}

#[test]
fn the_last_book_cannot_be_deleted() {
    let (_backend, mut ctx) = setup();
    let id = ctx.active_store_id().unwrap().to_string();
    assert!(matches!(ctx.delete_store(&id), Err(Error::LastStore)));
    ctx.pump();
    assert_eq!(ctx.stores().len(), 1);
}

#[test]
fn deleting_a_book_removes_everything_under_it() {
    let (backend, mut ctx) = setup();
    let personal = ctx.active_store_id().unwrap().to_string();
    let trip = ctx.add_store("Trip").unwrap();
    ctx.pump();
    ctx.add_category("Fuel", CategoryIcon::Fuel).unwrap();
    record(&mut ctx, "Ann", "30", TransactionType::Expense);
    ctx.pump();
    assert_eq!(ctx.transactions().len(), 1);

    ctx.delete_store(&trip).unwrap();
    ctx.pump();
    assert_eq!(ctx.stores().len(), 1);
    assert_eq!(ctx.active_store_id(), Some(personal.as_str()));
    assert_eq!(ctx.preferences().active_store_id.as_deref(), Some(personal.as_str()));

    let docs = backend.session("u1");
    let trip_path = paths::store("u1", &trip).unwrap();
    assert!(docs.get(&trip_path).unwrap().is_none());
    assert!(docs.list_descendants(&trip_path).unwrap().is_empty());
    assert!(
        !docs
            .list_descendants(&paths::store("u1", &personal).unwrap())
            .unwrap()
            .is_empty()
    );
}

#[test]
fn stale_active_book_falls_back_to_the_first() {
    let (backend, mut ctx) = setup();
    let personal = ctx.active_store_id().unwrap().to_string();
    let mut f = serde_json::Map::new();
    f.insert("activeStoreId".into(), json!("ghost"));
    backend
        .session("u1")
        .set_merge(paths::preferences("u1").unwrap(), f)
        .unwrap();
    ctx.pump();
    assert_eq!(ctx.active_store_id(), Some(personal.as_str()));
    assert_eq!(ctx.preferences().active_store_id.as_deref(), Some(personal.as_str()));
}

#[test]
fn preferences_merge() {
    let (_backend, mut ctx) = setup();
    let book = ctx.active_store_id().unwrap().to_string();
    ctx.update_preferences(PreferencesPatch {
        currency: Some(" eur ".into()),
        address: Some("1 Main St".into()),
    })
    .unwrap();
    ctx.pump();
    assert_eq!(ctx.preferences().currency, "EUR");
    assert_eq!(ctx.preferences().address.as_deref(), Some("1 Main St"));
    assert_eq!(ctx.preferences().active_store_id.as_deref(), Some(book.as_str()));

    ctx.update_preferences(PreferencesPatch {
        currency: None,
        address: Some(String::new()),
    })
    .unwrap();
    ctx.pump();
    assert_eq!(ctx.preferences().address, None);
    assert_eq!(ctx.preferences().currency, "EUR");
}

#[test]
fn offline_writes_turn_into_notices() {
    let (backend, mut ctx) = setup();
    backend.set_available(false);
    ctx.add_category("Food", CategoryIcon::Utensils).unwrap();
    let notices = ctx.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].action, "add category");
    assert_eq!(notices[0].message, GENERIC_FAILURE);

    assert!(matches!(
        ctx.clear_all_transactions(DEFAULT_STORE_NAME),
        Err(Error::Unavailable)
    ));

    backend.set_available(true);
    ctx.pump();
    assert!(ctx.categories().is_empty());
    assert_eq!(ctx.stores().len(), 1);
    assert!(ctx.drain_notices().is_empty());
}

#[test]
fn legacy_collections_are_migrated_once() {
    let (backend, mut ctx) = setup();
    let sid = ctx.active_store_id().unwrap().to_string();
    let docs = backend.session("u1");
    let body = |amount: &str| {
        json!({
            "userName": "Ann",
            "amount": amount,
            "categoryId": "c1",
            "date": "2024-05-01T00:00:00Z",
            "userId": "u1",
            "storeId": sid,
        })
    };
    docs.set(
        paths::legacy_transactions("u1", &sid, TransactionType::Expense)
            .unwrap()
            .doc("e1")
            .unwrap(),
        &body("12.5"),
    )
    .unwrap();
    docs.set(
        paths::legacy_transactions("u1", &sid, TransactionType::Income)
            .unwrap()
            .doc("i1")
            .unwrap(),
        &body("50"),
    )
    .unwrap();

    assert_eq!(ctx.migrate_legacy_transactions().unwrap(), 2);
    ctx.pump();
    let mut txs = ctx.transactions().to_vec();
    txs.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0].id, "e1");
    assert_eq!(txs[0].r#type, TransactionType::Expense);
    assert_eq!(txs[0].category_id.as_deref(), Some("c1"));
    assert_eq!(txs[1].id, "i1");
    assert_eq!(txs[1].r#type, TransactionType::Income);
    assert_eq!(txs[1].category_id, None);
    assert_eq!(ctx.summary().total_balance, dec("37.5"));

    for kind in [TransactionType::Expense, TransactionType::Income] {
        let left = docs
            .list(&paths::legacy_transactions("u1", &sid, kind).unwrap())
            .unwrap();
        assert!(left.is_empty());
    }
    assert_eq!(ctx.migrate_legacy_transactions().unwrap(), 0);
}

fn legacy_body(sid: &str, amount: &str) -> serde_json::Value {
    json!({
        "userName": "Ann",
        "amount": amount,
        "date": "2024-05-01T00:00:00Z",
        "userId": "u1",
        "storeId": sid,
    })
}

fn put_legacy(backend: &Backend, sid: &str, kind: TransactionType, id: &str, amount: &str) {
    backend
        .session("u1")
        .set(
            paths::legacy_transactions("u1", sid, kind)
                .unwrap()
                .doc(id)
                .unwrap(),
            &legacy_body(sid, amount),
        )
        .unwrap();
}

fn legacy_ids(backend: &Backend, sid: &str, kind: TransactionType) -> Vec<String> {
    let mut ids: Vec<String> = backend
        .session("u1")
        .list(&paths::legacy_transactions("u1", sid, kind).unwrap())
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();
    ids.sort();
    ids
}

#[test]
fn undecodable_legacy_document_moves_nothing() {
    let (backend, mut ctx) = setup();
    let sid = ctx.active_store_id().unwrap().to_string();
    put_legacy(&backend, &sid, TransactionType::Expense, "e1", "12.5");
    put_legacy(&backend, &sid, TransactionType::Expense, "e2", "3");
    put_legacy(&backend, &sid, TransactionType::Income, "i1", "abc");

    assert!(ctx.migrate_legacy_transactions().is_err());
    ctx.pump();
    assert!(ctx.transactions().is_empty());
    let target = backend
        .session("u1")
        .list(&paths::transactions("u1", &sid).unwrap())
        .unwrap();
    assert!(target.is_empty());
    assert_eq!(legacy_ids(&backend, &sid, TransactionType::Expense), ["e1", "e2"]);
    assert_eq!(legacy_ids(&backend, &sid, TransactionType::Income), ["i1"]);
}

#[test]
fn legacy_id_already_in_transactions_stops_the_migration() {
    let (backend, mut ctx) = setup();
    let sid = ctx.active_store_id().unwrap().to_string();
    backend
        .session("u1")
        .set(
            paths::transactions("u1", &sid).unwrap().doc("e1").unwrap(),
            &json!({
                "userName": "Bob",
                "amount": "99",
                "type": "income",
                "date": "2025-01-01T00:00:00Z",
                "userId": "u1",
                "storeId": sid,
            }),
        )
        .unwrap();
    put_legacy(&backend, &sid, TransactionType::Expense, "e0", "1");
    put_legacy(&backend, &sid, TransactionType::Expense, "e1", "12.5");
    ctx.pump();

    let err = ctx.migrate_legacy_transactions().unwrap_err();
    assert!(matches!(err, Error::MigrationConflict(ref id) if id == "e1"));
    ctx.pump();
    assert_eq!(ctx.transactions().len(), 1);
    let kept = &ctx.transactions()[0];
    assert_eq!(kept.user_name, "Bob");
    assert_eq!(kept.amount, dec("99"));
    assert_eq!(kept.r#type, TransactionType::Income);
    assert_eq!(legacy_ids(&backend, &sid, TransactionType::Expense), ["e0", "e1"]);
}

#[test]
fn same_id_in_both_legacy_collections_is_a_conflict() {
    let (backend, mut ctx) = setup();
    let sid = ctx.active_store_id().unwrap().to_string();
    put_legacy(&backend, &sid, TransactionType::Expense, "x1", "4");
    put_legacy(&backend, &sid, TransactionType::Income, "x1", "8");

    assert!(matches!(
        ctx.migrate_legacy_transactions(),
        Err(Error::MigrationConflict(_))
    ));
    ctx.pump();
    assert!(ctx.transactions().is_empty());
    assert_eq!(legacy_ids(&backend, &sid, TransactionType::Income), ["x1"]);
}

#[test]
fn oversized_stored_amounts_do_not_break_the_summary() {
    let (backend, mut ctx) = setup();
    let sid = ctx.active_store_id().unwrap().to_string();
    let target = paths::transactions("u1", &sid).unwrap();
    for id in ["big1", "big2"] {
        backend
            .session("u1")
            .set(
                target.doc(id).unwrap(),
                &json!({
                    "userName": "Ann",
                    "amount": "79228162514264337593543950335",
                    "type": "income",
                    "date": "2025-01-01T00:00:00Z",
                    "userId": "u1",
                    "storeId": sid,
                }),
            )
            .unwrap();
    }
    ctx.pump();
    assert_eq!(ctx.transactions().len(), 2);
    assert_eq!(ctx.summary().total_income, Decimal::MAX);
}

#[test]
fn edits_respect_the_amount_cap() {
    let (_backend, mut ctx) = setup();
    let id = record(&mut ctx, "Ann", "10", TransactionType::Expense);
    ctx.pump();
    let err = ctx
        .update_transaction(
            &id,
            TransactionPatch {
                amount: Some(dec("1000000000000.01")),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::AmountTooLarge(_)));
    ctx.pump();
    assert_eq!(ctx.transactions()[0].amount, dec("10"));
}

#[test]
fn import_skips_known_ids_and_unknown_categories() {
    let (_backend, mut ctx) = setup();
    let food = ctx.add_category("Food", CategoryIcon::Utensils).unwrap();
    ctx.pump();
    let row = |id: &str, category: Option<&str>| ImportedTransaction {
        id: id.into(),
        date: day(4),
        user_name: "Ann".into(),
        r#type: TransactionType::Expense,
        amount: dec("3"),
        category: category.map(str::to_string),
    };

    let summary = ctx
        .import_transactions(vec![
            row("t1", Some("Food")),
            row("t2", Some("Nope")),
            row("t1", Some("Food")),
        ])
        .unwrap();
    assert_eq!((summary.imported, summary.skipped), (2, 1));
    ctx.pump();
    let t1 = ctx.transactions().iter().find(|t| t.id == "t1").unwrap();
    assert_eq!(t1.category_id.as_deref(), Some(food.as_str()));
    let t2 = ctx.transactions().iter().find(|t| t.id == "t2").unwrap();
    assert_eq!(t2.category_id, None);

    let again = ctx
        .import_transactions(vec![row("t1", None), row("t2", None)])
        .unwrap();
    assert_eq!((again.imported, again.skipped), (0, 2));
}

#[test]
fn accounts_are_isolated() {
    let (backend, ctx) = setup();
    let sid = ctx.active_store_id().unwrap().to_string();
    let intruder = backend.session("u2");
    assert!(matches!(
        intruder.list(&paths::transactions("u1", &sid).unwrap()),
        Err(Error::PermissionDenied(_))
    ));
    assert!(matches!(
        intruder.delete(paths::store("u1", &sid).unwrap()),
        Err(Error::PermissionDenied(_))
    ));

    let mut other = AppContext::new(backend.clone());
    other.init(user("u2", Some("Bo"))).unwrap();
    assert_eq!(other.stores().len(), 1);
    assert_ne!(other.active_store_id(), Some(sid.as_str()));
    assert_eq!(ctx.stores().len(), 1);
}
