// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub, SubAssign};

use crate::error::CoreError;

/// Upper bound for interactively entered amounts.
pub const MAX_AMOUNT: i64 = 1_000_000_000;
/// Upper bound for amounts stored in templates.
pub const MAX_TEMPLATE_AMOUNT: i64 = 999_999_999;
/// Title length bounds for template-created transactions.
pub const TITLE_MIN_LEN: usize = 1;
pub const TITLE_MAX_LEN: usize = 80;

/// The closed set of transaction kinds. Three categories: payments decrease
/// balance, incomes feed one accumulator, compensations release an
/// accumulator back into balance (a two-field effect).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "payment/fixed")]
    PaymentFixed,
    #[serde(rename = "payment/variable")]
    PaymentVariable,
    #[serde(rename = "income/profit")]
    IncomeProfit,
    #[serde(rename = "income/stock")]
    IncomeStock,
    #[serde(rename = "income/forward-payment")]
    IncomeForwardPayment,
    #[serde(rename = "compensation/stock")]
    CompensationStock,
    #[serde(rename = "compensation/forward-payment")]
    CompensationForwardPayment,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 7] = [
        TransactionKind::PaymentFixed,
        TransactionKind::PaymentVariable,
        TransactionKind::IncomeProfit,
        TransactionKind::IncomeStock,
        TransactionKind::IncomeForwardPayment,
        TransactionKind::CompensationStock,
        TransactionKind::CompensationForwardPayment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::PaymentFixed => "payment/fixed",
            TransactionKind::PaymentVariable => "payment/variable",
            TransactionKind::IncomeProfit => "income/profit",
            TransactionKind::IncomeStock => "income/stock",
            TransactionKind::IncomeForwardPayment => "income/forward-payment",
            TransactionKind::CompensationStock => "compensation/stock",
            TransactionKind::CompensationForwardPayment => "compensation/forward-payment",
        }
    }

    /// Parse the wire form, e.g. `payment/fixed`. An unknown string is a
    /// fatal error; a silent zero-effect default would corrupt balances.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "payment/fixed" => Ok(TransactionKind::PaymentFixed),
            "payment/variable" => Ok(TransactionKind::PaymentVariable),
            "income/profit" => Ok(TransactionKind::IncomeProfit),
            "income/stock" => Ok(TransactionKind::IncomeStock),
            "income/forward-payment" => Ok(TransactionKind::IncomeForwardPayment),
            "compensation/stock" => Ok(TransactionKind::CompensationStock),
            "compensation/forward-payment" => Ok(TransactionKind::CompensationForwardPayment),
            other => Err(CoreError::UnknownTransactionType(other.to_string())),
        }
    }

    /// Signed adjustment this kind applies to a period's running totals.
    pub fn effect(&self, amount: Decimal) -> Balances {
        match self {
            TransactionKind::PaymentFixed | TransactionKind::PaymentVariable => Balances {
                balance: -amount,
                ..Balances::ZERO
            },
            TransactionKind::IncomeProfit => Balances {
                balance: amount,
                ..Balances::ZERO
            },
            TransactionKind::IncomeStock => Balances {
                stock: amount,
                ..Balances::ZERO
            },
            TransactionKind::IncomeForwardPayment => Balances {
                forward_payments: amount,
                ..Balances::ZERO
            },
            TransactionKind::CompensationStock => Balances {
                balance: amount,
                stock: -amount,
                ..Balances::ZERO
            },
            TransactionKind::CompensationForwardPayment => Balances {
                balance: amount,
                forward_payments: -amount,
                ..Balances::ZERO
            },
        }
    }
}

/// The three quantities every period tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    pub balance: Decimal,
    pub stock: Decimal,
    pub forward_payments: Decimal,
}

impl Balances {
    pub const ZERO: Balances = Balances {
        balance: Decimal::ZERO,
        stock: Decimal::ZERO,
        forward_payments: Decimal::ZERO,
    };

    pub fn is_zero(&self) -> bool {
        *self == Balances::ZERO
    }
}

impl Add for Balances {
    type Output = Balances;
    fn add(self, rhs: Balances) -> Balances {
        Balances {
            balance: self.balance + rhs.balance,
            stock: self.stock + rhs.stock,
            forward_payments: self.forward_payments + rhs.forward_payments,
        }
    }
}

impl Sub for Balances {
    type Output = Balances;
    fn sub(self, rhs: Balances) -> Balances {
        Balances {
            balance: self.balance - rhs.balance,
            stock: self.stock - rhs.stock,
            forward_payments: self.forward_payments - rhs.forward_payments,
        }
    }
}

impl AddAssign for Balances {
    fn add_assign(&mut self, rhs: Balances) {
        *self = *self + rhs;
    }
}

impl SubAssign for Balances {
    fn sub_assign(&mut self, rhs: Balances) {
        *self = *self - rhs;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    pub period_id: i64,
    pub kind: TransactionKind,
    pub title: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub date_created: String,
}

/// One weekly accounting bucket. `start`/`end` hold running totals; the end
/// date is derived from `start_date` by the calendar partitioner, never
/// stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    pub id: i64,
    pub user_id: String,
    pub start_date: NaiveDate,
    pub start: Balances,
    pub end: Balances,
}

/// One-shot prefill for `tx add`. No recurrence semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub title: String,
    pub kind: TransactionKind,
    pub amount: Decimal,
}
