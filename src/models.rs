// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Account that signed in. Not to be confused with [`AppUser`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// A book: a named ledger scoping every other record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub name: String,
    pub user_id: String,
}

/// Participant transactions are attributed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUser {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub store_id: String,
    pub position: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryIcon {
    ShoppingCart,
    Utensils,
    Coffee,
    Car,
    Fuel,
    Home,
    Zap,
    HeartPulse,
    GraduationCap,
    Plane,
    Gift,
    Shirt,
    Film,
    Smartphone,
    PiggyBank,
    #[default]
    Tag,
}

impl CategoryIcon {
    pub const ALL: [CategoryIcon; 16] = [
        CategoryIcon::ShoppingCart,
        CategoryIcon::Utensils,
        CategoryIcon::Coffee,
        CategoryIcon::Car,
        CategoryIcon::Fuel,
        CategoryIcon::Home,
        CategoryIcon::Zap,
        CategoryIcon::HeartPulse,
        CategoryIcon::GraduationCap,
        CategoryIcon::Plane,
        CategoryIcon::Gift,
        CategoryIcon::Shirt,
        CategoryIcon::Film,
        CategoryIcon::Smartphone,
        CategoryIcon::PiggyBank,
        CategoryIcon::Tag,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryIcon::ShoppingCart => "shopping-cart",
            CategoryIcon::Utensils => "utensils",
            CategoryIcon::Coffee => "coffee",
            CategoryIcon::Car => "car",
            CategoryIcon::Fuel => "fuel",
            CategoryIcon::Home => "home",
            CategoryIcon::Zap => "zap",
            CategoryIcon::HeartPulse => "heart-pulse",
            CategoryIcon::GraduationCap => "graduation-cap",
            CategoryIcon::Plane => "plane",
            CategoryIcon::Gift => "gift",
            CategoryIcon::Shirt => "shirt",
            CategoryIcon::Film => "film",
            CategoryIcon::Smartphone => "smartphone",
            CategoryIcon::PiggyBank => "piggy-bank",
            CategoryIcon::Tag => "tag",
        }
    }
}

impl fmt::Display for CategoryIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryIcon {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        CategoryIcon::ALL
            .into_iter()
            .find(|icon| icon.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown icon '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: CategoryIcon,
    pub user_id: String,
    pub store_id: String,
    pub position: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Collection name used by the old two-collection layout.
    pub fn legacy_collection(&self) -> &'static str {
        match self {
            TransactionType::Income => "incomes",
            TransactionType::Expense => "expenses",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

/// `user_name` is copied from the participant when the transaction is
/// recorded; renaming the participant later leaves it untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub user_name: String,
    pub amount: Decimal,
    pub r#type: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub date: DateTime<Utc>,
    pub user_id: String,
    pub store_id: String,
}

/// Validated input for a new transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub user_name: String,
    pub amount: Decimal,
    pub r#type: TransactionType,
    pub category_id: Option<String>,
    pub date: DateTime<Utc>,
}

/// Largest amount a single transaction may carry.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0); // 1_000_000_000_000

/// Amounts must be strictly positive and no larger than [`MAX_AMOUNT`].
pub fn check_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::NonPositiveAmount);
    }
    if amount > MAX_AMOUNT {
        return Err(Error::AmountTooLarge(MAX_AMOUNT));
    }
    Ok(())
}

impl NewTransaction {
    pub fn new(
        user_name: &str,
        amount: Decimal,
        r#type: TransactionType,
        category_id: Option<String>,
        date: DateTime<Utc>,
    ) -> Result<Self> {
        let user_name = user_name.trim();
        if user_name.is_empty() {
            return Err(Error::EmptyName);
        }
        check_amount(amount)?;
        let category_id = match r#type {
            TransactionType::Income => None,
            TransactionType::Expense => category_id.filter(|c| !c.is_empty()),
        };
        Ok(Self {
            user_name: user_name.to_string(),
            amount,
            r#type,
            category_id,
            date,
        })
    }
}

/// Partial edit of a transaction. `category_id: Some(None)` clears the category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub user_name: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<DateTime<Utc>>,
    pub r#type: Option<TransactionType>,
    pub category_id: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default)]
    pub active_store_id: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub address: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            active_store_id: None,
            currency: default_currency(),
            address: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferencesPatch {
    pub currency: Option<String>,
    pub address: Option<String>,
}

/// Row produced by the CSV importer, ids included.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedTransaction {
    pub id: String,
    pub date: DateTime<Utc>,
    pub user_name: String,
    pub r#type: TransactionType,
    pub amount: Decimal,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn when() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn new_transaction_rejects_non_positive_amounts() {
        let err = NewTransaction::new("A", Decimal::ZERO, TransactionType::Expense, None, when())
            .unwrap_err();
        assert!(matches!(err, Error::NonPositiveAmount));
        let err = NewTransaction::new(
            "A",
            Decimal::new(-5, 0),
            TransactionType::Income,
            None,
            when(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::NonPositiveAmount));
    }

    #[test]
    fn new_transaction_caps_amounts() {
        assert!(
            NewTransaction::new("A", MAX_AMOUNT, TransactionType::Income, None, when()).is_ok()
        );
        let err = NewTransaction::new(
            "A",
            MAX_AMOUNT + Decimal::new(1, 2),
            TransactionType::Income,
            None,
            when(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::AmountTooLarge(_)));
        let err = NewTransaction::new("A", Decimal::MAX, TransactionType::Expense, None, when())
            .unwrap_err();
        assert!(matches!(err, Error::AmountTooLarge(_)));
    }

    #[test]
    fn income_drops_category() {
        let tx = NewTransaction::new(
            " A ",
            Decimal::new(10, 0),
            TransactionType::Income,
            Some("food".into()),
            when(),
        )
        .unwrap();
        assert_eq!(tx.user_name, "A");
        assert_eq!(tx.category_id, None);
    }

    #[test]
    fn transaction_document_shape() {
        let tx = Transaction {
            id: "t1".into(),
            user_name: "A".into(),
            amount: Decimal::new(4050, 2),
            r#type: TransactionType::Expense,
            category_id: Some("food".into()),
            date: when(),
            user_id: "u".into(),
            store_id: "s".into(),
        };
        let v = serde_json::to_value(&tx).unwrap();
        assert_eq!(v["type"], "expense");
        assert_eq!(v["userName"], "A");
        assert_eq!(v["amount"], "40.50");
        assert_eq!(v["categoryId"], "food");
        assert!(v.get("id").is_none());
    }

    #[test]
    fn icons_parse_case_insensitively() {
        assert_eq!(
            "Shopping-Cart".parse::<CategoryIcon>().unwrap(),
            CategoryIcon::ShoppingCart
        );
        assert!("rocket".parse::<CategoryIcon>().is_err());
        let v = serde_json::to_value(CategoryIcon::HeartPulse).unwrap();
        assert_eq!(v, "heart-pulse");
    }

    #[test]
    fn preferences_default_currency() {
        let p: UserPreferences = serde_json::from_str("{}").unwrap();
        assert_eq!(p.currency, "USD");
        assert_eq!(p.active_store_id, None);
    }
}
