use crate::models::{Company, Invoice, InvoiceCompanyRow, InvoiceSummary};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub comp_code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amt: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amt: Decimal,
    pub paid: bool,
}

/// Invoice nested with its owning company.
#[derive(Debug, Serialize, Deserialize)]
pub struct InvoiceDetail {
    pub id: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub amt: Decimal,
    pub paid: bool,
    pub add_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub company: Company,
}

impl From<InvoiceCompanyRow> for InvoiceDetail {
    fn from(row: InvoiceCompanyRow) -> Self {
        let company = row.company();
        Self {
            id: row.id,
            amt: row.amt,
            paid: row.paid,
            add_date: row.add_date,
            paid_date: row.paid_date,
            company,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvoiceListResponse {
    pub invoices: Vec<InvoiceSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvoiceResponse<T = Invoice> {
    pub invoice: T,
}
