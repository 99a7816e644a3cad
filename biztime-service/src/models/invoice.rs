//! Invoice model for biztime-service.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Company;

/// Invoice row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: i32,
    pub comp_code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amt: Decimal,
    pub paid: bool,
    pub add_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
}

/// `{id, comp_code}` projection used by the invoice listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct InvoiceSummary {
    pub id: i32,
    pub comp_code: String,
}

/// Flat row of an invoice joined to its owning company.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct InvoiceCompanyRow {
    pub id: i32,
    pub comp_code: String,
    pub amt: Decimal,
    pub paid: bool,
    pub add_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub name: String,
    pub description: Option<String>,
}

impl InvoiceCompanyRow {
    /// Split the joined row back into the company it belongs to.
    pub fn company(&self) -> Company {
        Company {
            code: self.comp_code.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Input for creating an invoice. Storage fills `paid`, `paid_date` and `id`.
///
/// `add_date` comes from the same clock as the `today` used for payments,
/// so an invoice is never paid before it was added.
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub comp_code: String,
    pub amt: Decimal,
    pub add_date: NaiveDate,
}

/// Input for updating an invoice.
#[derive(Debug, Clone)]
pub struct UpdateInvoice {
    pub amt: Decimal,
    pub paid: bool,
}

/// Outcome of applying an incoming `paid` flag to an invoice.
///
/// An invoice is either unpaid (`paid_date` null) or paid, in which case
/// `paid_date` is the day of its most recent unpaid-to-paid transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentTransition {
    /// Was unpaid, now paid on the given day.
    Paid(NaiveDate),
    /// Now unpaid, whatever it was before.
    Unpaid,
    /// Was paid and stays paid; the first payment day is kept.
    RemainsPaid(NaiveDate),
}

impl PaymentTransition {
    /// Decide the transition, checking the rules in order:
    /// unpaid and paying, then not paying, then already paid.
    pub fn evaluate(current_paid_date: Option<NaiveDate>, paid: bool, today: NaiveDate) -> Self {
        match (current_paid_date, paid) {
            (None, true) => PaymentTransition::Paid(today),
            (_, false) => PaymentTransition::Unpaid,
            (Some(paid_date), true) => PaymentTransition::RemainsPaid(paid_date),
        }
    }

    /// Value to store in `paid_date`.
    pub fn paid_date(&self) -> Option<NaiveDate> {
        match self {
            PaymentTransition::Paid(date) | PaymentTransition::RemainsPaid(date) => Some(*date),
            PaymentTransition::Unpaid => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentTransition::Paid(_) => "paid",
            PaymentTransition::Unpaid => "unpaid",
            PaymentTransition::RemainsPaid(_) => "remains_paid",
        }
    }
}
