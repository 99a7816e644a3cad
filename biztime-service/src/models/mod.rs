//! Domain models for biztime-service.

mod company;
mod invoice;

pub use company::{slugify, Company, CreateCompany, UpdateCompany};
pub use invoice::{
    CreateInvoice, Invoice, InvoiceCompanyRow, InvoiceSummary, PaymentTransition, UpdateInvoice,
};
