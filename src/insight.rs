// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Spending summaries from a hosted text-generation endpoint.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Config;
use crate::models::{Category, Transaction, TransactionType};
use crate::utils::http_client;

pub const NO_EXPENSES: &str = "No expense data yet. Record a few expenses to get spending insights.";
pub const UNAVAILABLE: &str = "Unable to generate insights right now. Please try again later.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExpenseItem<'a> {
    id: &'a str,
    date: String,
    user_name: &'a str,
    amount: String,
    category: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct InsightRequest {
    /// JSON array of expenses, sent as one string field.
    transactions: String,
}

#[derive(Debug, Deserialize)]
struct InsightResponse {
    description: String,
}

/// Expenses only, encoded the way the endpoint expects. `None` when there
/// is nothing to send.
pub fn expense_payload(
    transactions: &[Transaction],
    categories: &[Category],
) -> Result<Option<String>> {
    let items: Vec<ExpenseItem<'_>> = transactions
        .iter()
        .filter(|t| t.r#type == TransactionType::Expense)
        .map(|t| ExpenseItem {
            id: &t.id,
            date: t.date.to_rfc3339(),
            user_name: &t.user_name,
            amount: t.amount.to_string(),
            category: t
                .category_id
                .as_deref()
                .and_then(|id| categories.iter().find(|c| c.id == id))
                .map(|c| c.name.as_str()),
        })
        .collect();
    if items.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string(&items)?))
}

pub struct InsightClient {
    http: reqwest::blocking::Client,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl InsightClient {
    pub fn new(endpoint: Option<String>, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            endpoint,
            api_key,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(cfg.insight_url.clone(), cfg.insight_api_key.clone())
    }

    /// Suggested chart and the points it should make. Never fails: an empty
    /// expense list is answered locally and any remote problem turns into
    /// [`UNAVAILABLE`].
    pub fn describe(&self, transactions: &[Transaction], categories: &[Category]) -> String {
        let payload = match expense_payload(transactions, categories) {
            Ok(Some(p)) => p,
            Ok(None) => return NO_EXPENSES.to_string(),
            Err(e) => {
                warn!(error = %e, "could not encode expenses");
                return UNAVAILABLE.to_string();
            }
        };
        match self.request(payload) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "insight request failed");
                UNAVAILABLE.to_string()
            }
        }
    }

    fn request(&self, payload: String) -> Result<String> {
        let endpoint = self
            .endpoint
            .as_deref()
            .context("No insight endpoint configured (set SUMBOOK_INSIGHT_URL)")?;
        let mut req = self.http.post(endpoint).json(&InsightRequest {
            transactions: payload,
        });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let resp: InsightResponse = req.send()?.error_for_status()?.json()?;
        let text = resp.description.trim();
        if text.is_empty() {
            return Err(anyhow!("Insight endpoint returned an empty description"));
        }
        Ok(text.to_string())
    }
}
