// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{TimeZone, Utc};
use mockito::{Matcher, Server};
use rust_decimal::Decimal;
use sumbook::insight::{InsightClient, NO_EXPENSES, UNAVAILABLE, expense_payload};
use sumbook::models::{Category, CategoryIcon, Transaction, TransactionType};

fn tx(id: &str, kind: TransactionType, category: Option<&str>) -> Transaction {
    Transaction {
        id: id.into(),
        user_name: "Ann".into(),
        amount: Decimal::new(425, 2),
        r#type: kind,
        category_id: category.map(str::to_string),
        date: Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap(),
        user_id: "u1".into(),
        store_id: "s1".into(),
    }
}

fn food() -> Category {
    Category {
        id: "c1".into(),
        name: "Food".into(),
        icon: CategoryIcon::Utensils,
        user_id: "u1".into(),
        store_id: "s1".into(),
        position: 0,
    }
}

#[test]
fn payload_holds_expenses_only() {
    let txs = vec![
        tx("e1", TransactionType::Expense, Some("c1")),
        tx("i1", TransactionType::Income, None),
    ];
    let payload = expense_payload(&txs, &[food()]).unwrap().unwrap();
    let items: serde_json::Value = serde_json::from_str(&payload).unwrap();
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "e1");
    assert_eq!(items[0]["category"], "Food");
    assert_eq!(items[0]["amount"], "4.25");
}

#[test]
fn describe_returns_the_endpoint_text() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/insight")
        .match_header("authorization", "Bearer k1")
        .match_body(Matcher::Regex(r#""transactions":"\["#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"description":"A pie chart by category works best."}"#)
        .create();

    let client =
        InsightClient::new(Some(format!("{}/insight", server.url())), Some("k1".into())).unwrap();
    let text = client.describe(&[tx("e1", TransactionType::Expense, Some("c1"))], &[food()]);
    assert_eq!(text, "A pie chart by category works best.");
    mock.assert();
}

#[test]
fn remote_failure_becomes_a_fixed_message() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/insight")
        .with_status(500)
        .with_body("boom")
        .create();

    let client = InsightClient::new(Some(format!("{}/insight", server.url())), None).unwrap();
    let text = client.describe(&[tx("e1", TransactionType::Expense, None)], &[]);
    assert_eq!(text, UNAVAILABLE);
    mock.assert();
}

#[test]
fn no_expenses_means_no_request() {
    let mut server = Server::new();
    let mock = server.mock("POST", "/insight").expect(0).create();

    let client = InsightClient::new(Some(format!("{}/insight", server.url())), None).unwrap();
    let text = client.describe(&[tx("i1", TransactionType::Income, None)], &[]);
    assert_eq!(text, NO_EXPENSES);
    mock.assert();
}

#[test]
fn unconfigured_endpoint_is_unavailable() {
    let client = InsightClient::new(None, None).unwrap();
    let text = client.describe(&[tx("e1", TransactionType::Expense, None)], &[]);
    assert_eq!(text, UNAVAILABLE);
}
