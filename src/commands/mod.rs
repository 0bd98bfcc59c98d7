// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod books;
pub mod categories;
pub mod exporter;
pub mod importer;
pub mod insight;
pub mod prefs;
pub mod reports;
pub mod transactions;
pub mod users;
