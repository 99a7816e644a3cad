//! Common test utilities for biztime-service integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use biztime_service::models::{
    Company, CreateCompany, CreateInvoice, Invoice, InvoiceCompanyRow, InvoiceSummary,
    PaymentTransition, UpdateCompany, UpdateInvoice,
};
use biztime_service::services::Store;
use biztime_service::startup::{router, AppState};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use service_core::error::AppError;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};
use tower::ServiceExt;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,biztime_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[derive(Default)]
struct Tables {
    companies: BTreeMap<String, Company>,
    invoices: BTreeMap<i32, Invoice>,
    next_invoice_id: i32,
}

/// In-memory [`Store`] with the same key and constraint behaviour as the
/// PostgreSQL schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Make every subsequent call fail like a lost database connection.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Overwrite the stored paid state of an invoice.
    pub fn set_paid(&self, id: i32, paid_date: Option<NaiveDate>) {
        let mut tables = self.tables.lock().unwrap();
        let invoice = tables.invoices.get_mut(&id).expect("invoice exists");
        invoice.paid = paid_date.is_some();
        invoice.paid_date = paid_date;
    }

    pub fn invoice(&self, id: i32) -> Option<Invoice> {
        self.tables.lock().unwrap().invoices.get(&id).cloned()
    }

    fn check(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "connection refused"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        self.check()
    }

    async fn list_companies(&self) -> Result<Vec<Company>, AppError> {
        self.check()?;
        Ok(self.tables.lock().unwrap().companies.values().cloned().collect())
    }

    async fn get_company(&self, code: &str) -> Result<Option<Company>, AppError> {
        self.check()?;
        Ok(self.tables.lock().unwrap().companies.get(code).cloned())
    }

    async fn list_company_invoice_ids(&self, code: &str) -> Result<Vec<i32>, AppError> {
        self.check()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .invoices
            .values()
            .filter(|invoice| invoice.comp_code == code)
            .map(|invoice| invoice.id)
            .collect())
    }

    async fn create_company(&self, input: &CreateCompany) -> Result<Company, AppError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if tables.companies.contains_key(&input.code) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Company with code '{}' already exists",
                input.code
            )));
        }
        let company = Company {
            code: input.code.clone(),
            name: input.name.clone(),
            description: input.description.clone(),
        };
        tables.companies.insert(company.code.clone(), company.clone());
        Ok(company)
    }

    async fn update_company(
        &self,
        code: &str,
        input: &UpdateCompany,
    ) -> Result<Option<Company>, AppError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.companies.get_mut(code).map(|company| {
            company.name = input.name.clone();
            company.description = input.description.clone();
            company.clone()
        }))
    }

    async fn delete_company(&self, code: &str) -> Result<bool, AppError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if tables.invoices.values().any(|invoice| invoice.comp_code == code) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Company with code '{}' still has invoices",
                code
            )));
        }
        Ok(tables.companies.remove(code).is_some())
    }

    async fn list_invoices(&self) -> Result<Vec<InvoiceSummary>, AppError> {
        self.check()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .invoices
            .values()
            .map(|invoice| InvoiceSummary {
                id: invoice.id,
                comp_code: invoice.comp_code.clone(),
            })
            .collect())
    }

    async fn get_invoice_with_company(
        &self,
        id: i32,
    ) -> Result<Option<InvoiceCompanyRow>, AppError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.invoices.get(&id).and_then(|invoice| {
            tables
                .companies
                .get(&invoice.comp_code)
                .map(|company| InvoiceCompanyRow {
                    id: invoice.id,
                    comp_code: invoice.comp_code.clone(),
                    amt: invoice.amt,
                    paid: invoice.paid,
                    add_date: invoice.add_date,
                    paid_date: invoice.paid_date,
                    name: company.name.clone(),
                    description: company.description.clone(),
                })
        }))
    }

    async fn create_invoice(&self, input: &CreateInvoice) -> Result<Invoice, AppError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if !tables.companies.contains_key(&input.comp_code) {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "No company with code of '{}' exists.",
                input.comp_code
            )));
        }
        tables.next_invoice_id += 1;
        let invoice = Invoice {
            id: tables.next_invoice_id,
            comp_code: input.comp_code.clone(),
            amt: input.amt,
            paid: false,
            add_date: input.add_date,
            paid_date: None,
        };
        tables.invoices.insert(invoice.id, invoice.clone());
        Ok(invoice)
    }

    async fn update_invoice(
        &self,
        id: i32,
        input: &UpdateInvoice,
        today: NaiveDate,
    ) -> Result<Option<Invoice>, AppError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables.invoices.get_mut(&id).map(|invoice| {
            let transition = PaymentTransition::evaluate(invoice.paid_date, input.paid, today);
            invoice.amt = input.amt;
            invoice.paid = input.paid;
            invoice.paid_date = transition.paid_date();
            invoice.clone()
        }))
    }

    async fn delete_invoice(&self, id: i32) -> Result<bool, AppError> {
        self.check()?;
        Ok(self.tables.lock().unwrap().invoices.remove(&id).is_some())
    }
}

/// Router over a fresh [`MemoryStore`].
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

/// Response status, headers and parsed JSON body.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        init_tracing();
        let store = Arc::new(MemoryStore::default());
        let router = router(AppState::new(store.clone()));
        Self { router, store }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    /// Create a company and return its derived code.
    pub async fn create_company(&self, name: &str, description: &str) -> String {
        let response = self
            .post(
                "/companies",
                serde_json::json!({ "name": name, "description": description }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["company"]["code"]
            .as_str()
            .expect("code")
            .to_string()
    }

    /// Create an invoice and return its id.
    pub async fn create_invoice(&self, comp_code: &str, amt: f64) -> i64 {
        let response = self
            .post(
                "/invoices",
                serde_json::json!({ "comp_code": comp_code, "amt": amt }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["invoice"]["id"].as_i64().expect("id")
    }
}

pub fn decimal(value: &str) -> Decimal {
    value.parse().expect("valid decimal")
}

/// Assert the uniform `{error: {message, status}}` envelope.
pub fn assert_error(response: &TestResponse, status: StatusCode) {
    assert_eq!(response.status, status, "{}", response.body);
    assert_eq!(
        response.body["error"]["status"].as_u64(),
        Some(status.as_u16() as u64),
        "{}",
        response.body
    );
    assert!(
        response.body["error"]["message"].is_string(),
        "{}",
        response.body
    );
}
