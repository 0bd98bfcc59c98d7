// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

use crate::models::{AppUser, Transaction, TransactionType};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserBalance {
    pub name: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub total_balance: Decimal,
    pub user_balances: Vec<UserBalance>,
}

/// Totals plus one balance per participant.
///
/// Every participant is listed, in list order, even without transactions.
/// Names found only on transactions are appended in first-seen order.
/// Sums that would leave the `Decimal` range are clamped to its bounds.
pub fn aggregate(transactions: &[Transaction], users: &[AppUser]) -> FinancialSummary {
    let mut total_income = Decimal::ZERO;
    let mut total_expense = Decimal::ZERO;
    let mut buckets: Vec<(String, Decimal, Decimal)> = Vec::with_capacity(users.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for u in users {
        if !index.contains_key(&u.name) {
            index.insert(u.name.clone(), buckets.len());
            buckets.push((u.name.clone(), Decimal::ZERO, Decimal::ZERO));
        }
    }

    for t in transactions {
        let slot = *index.entry(t.user_name.clone()).or_insert_with(|| {
            buckets.push((t.user_name.clone(), Decimal::ZERO, Decimal::ZERO));
            buckets.len() - 1
        });
        match t.r#type {
            TransactionType::Income => {
                total_income = add(total_income, t.amount);
                buckets[slot].1 = add(buckets[slot].1, t.amount);
            }
            TransactionType::Expense => {
                total_expense = add(total_expense, t.amount);
                buckets[slot].2 = add(buckets[slot].2, t.amount);
            }
        }
    }

    FinancialSummary {
        total_income,
        total_expense,
        total_balance: sub(total_income, total_expense),
        user_balances: buckets
            .into_iter()
            .map(|(name, income, expense)| UserBalance {
                name,
                income,
                expense,
                balance: sub(income, expense),
            })
            .collect(),
    }
}

fn add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or_else(|| {
        warn!("sum out of range, clamping");
        a.saturating_add(b)
    })
}

fn sub(a: Decimal, b: Decimal) -> Decimal {
    a.checked_sub(b).unwrap_or_else(|| {
        warn!("difference out of range, clamping");
        a.saturating_sub(b)
    })
}
