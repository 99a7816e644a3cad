//! Data-access contract used by the HTTP handlers.

use crate::models::{
    Company, CreateCompany, CreateInvoice, Invoice, InvoiceCompanyRow, InvoiceSummary,
    UpdateCompany, UpdateInvoice,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use service_core::error::AppError;

/// Queries over the `companies` and `invoices` tables.
///
/// Lookups by key return `None` when no row matches and deletes report
/// whether a row was removed; turning that into a 404 is the caller's job.
/// Storage constraint failures come back as [`AppError::Conflict`] or
/// [`AppError::NotFound`] where they have a client-facing meaning.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn health_check(&self) -> Result<(), AppError>;

    async fn list_companies(&self) -> Result<Vec<Company>, AppError>;

    async fn get_company(&self, code: &str) -> Result<Option<Company>, AppError>;

    /// Ids of every invoice owned by `code`, ascending.
    async fn list_company_invoice_ids(&self, code: &str) -> Result<Vec<i32>, AppError>;

    /// Fails with `Conflict` when the code is taken.
    async fn create_company(&self, input: &CreateCompany) -> Result<Company, AppError>;

    async fn update_company(
        &self,
        code: &str,
        input: &UpdateCompany,
    ) -> Result<Option<Company>, AppError>;

    /// Fails with `Conflict` while invoices still reference the company.
    async fn delete_company(&self, code: &str) -> Result<bool, AppError>;

    async fn list_invoices(&self) -> Result<Vec<InvoiceSummary>, AppError>;

    async fn get_invoice_with_company(
        &self,
        id: i32,
    ) -> Result<Option<InvoiceCompanyRow>, AppError>;

    /// Fails with `NotFound` when `comp_code` names no company.
    async fn create_invoice(&self, input: &CreateInvoice) -> Result<Invoice, AppError>;

    /// Apply `amt`/`paid` and reconcile `paid_date` against the stored value
    /// with [`PaymentTransition`](crate::models::PaymentTransition), as one
    /// atomic step.
    async fn update_invoice(
        &self,
        id: i32,
        input: &UpdateInvoice,
        today: NaiveDate,
    ) -> Result<Option<Invoice>, AppError>;

    async fn delete_invoice(&self, id: i32) -> Result<bool, AppError>;
}
