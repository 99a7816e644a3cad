//! Database service for biztime-service.

use crate::models::{
    Company, CreateCompany, CreateInvoice, Invoice, InvoiceCompanyRow, InvoiceSummary,
    PaymentTransition, UpdateCompany, UpdateInvoice,
};
use crate::services::metrics::{DB_QUERY_DURATION, PAYMENT_TRANSITIONS_TOTAL};
use crate::services::store::Store;
use async_trait::async_trait;
use chrono::NaiveDate;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "biztime-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

#[async_trait]
impl Store for Database {
    /// Check database health.
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Company Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    async fn list_companies(&self) -> Result<Vec<Company>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_companies"])
            .start_timer();

        let companies = sqlx::query_as::<_, Company>(
            r#"
            SELECT code, name, description
            FROM companies
            ORDER BY code
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list companies: {}", e)))?;

        timer.observe_duration();

        Ok(companies)
    }

    #[instrument(skip(self), fields(code = %code))]
    async fn get_company(&self, code: &str) -> Result<Option<Company>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_company"])
            .start_timer();

        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT code, name, description
            FROM companies
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get company: {}", e)))?;

        timer.observe_duration();

        Ok(company)
    }

    #[instrument(skip(self), fields(code = %code))]
    async fn list_company_invoice_ids(&self, code: &str) -> Result<Vec<i32>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_company_invoice_ids"])
            .start_timer();

        let ids = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT id
            FROM invoices
            WHERE comp_code = $1
            ORDER BY id
            "#,
        )
        .bind(code)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list company invoices: {}", e))
        })?;

        timer.observe_duration();

        Ok(ids)
    }

    #[instrument(skip(self, input), fields(code = %input.code))]
    async fn create_company(&self, input: &CreateCompany) -> Result<Company, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_company"])
            .start_timer();

        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (code, name, description)
            VALUES ($1, $2, $3)
            RETURNING code, name, description
            "#,
        )
        .bind(&input.code)
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Company with code '{}' already exists",
                    input.code
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create company: {}", e)),
        })?;

        timer.observe_duration();

        info!(code = %company.code, name = %company.name, "Company created");

        Ok(company)
    }

    #[instrument(skip(self, input), fields(code = %code))]
    async fn update_company(
        &self,
        code: &str,
        input: &UpdateCompany,
    ) -> Result<Option<Company>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_company"])
            .start_timer();

        let company = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies
            SET name = $2,
                description = $3
            WHERE code = $1
            RETURNING code, name, description
            "#,
        )
        .bind(code)
        .bind(&input.name)
        .bind(&input.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update company: {}", e)))?;

        timer.observe_duration();

        Ok(company)
    }

    #[instrument(skip(self), fields(code = %code))]
    async fn delete_company(&self, code: &str) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_company"])
            .start_timer();

        let result = sqlx::query("DELETE FROM companies WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::Conflict(anyhow::anyhow!(
                        "Company with code '{}' still has invoices",
                        code
                    ))
                } else {
                    AppError::DatabaseError(anyhow::anyhow!("Failed to delete company: {}", e))
                }
            })?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // Invoice Operations
    // -------------------------------------------------------------------------

    #[instrument(skip(self))]
    async fn list_invoices(&self) -> Result<Vec<InvoiceSummary>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let invoices = sqlx::query_as::<_, InvoiceSummary>(
            r#"
            SELECT id, comp_code
            FROM invoices
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list invoices: {}", e)))?;

        timer.observe_duration();

        Ok(invoices)
    }

    #[instrument(skip(self), fields(invoice_id = id))]
    async fn get_invoice_with_company(
        &self,
        id: i32,
    ) -> Result<Option<InvoiceCompanyRow>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice_with_company"])
            .start_timer();

        let row = sqlx::query_as::<_, InvoiceCompanyRow>(
            r#"
            SELECT i.id, i.comp_code, i.amt, i.paid, i.add_date, i.paid_date,
                   c.name, c.description
            FROM invoices AS i
            JOIN companies AS c ON i.comp_code = c.code
            WHERE i.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?;

        timer.observe_duration();

        Ok(row)
    }

    #[instrument(skip(self, input), fields(comp_code = %input.comp_code))]
    async fn create_invoice(&self, input: &CreateInvoice) -> Result<Invoice, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_invoice"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (comp_code, amt, add_date)
            VALUES ($1, $2, $3)
            RETURNING id, comp_code, amt, paid, add_date, paid_date
            "#,
        )
        .bind(&input.comp_code)
        .bind(input.amt)
        .bind(input.add_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::NotFound(anyhow::anyhow!(
                    "No company with code of '{}' exists.",
                    input.comp_code
                ))
            } else {
                AppError::DatabaseError(anyhow::anyhow!("Failed to create invoice: {}", e))
            }
        })?;

        timer.observe_duration();

        info!(invoice_id = invoice.id, comp_code = %invoice.comp_code, "Invoice created");

        Ok(invoice)
    }

    #[instrument(skip(self, input), fields(invoice_id = id, paid = input.paid))]
    async fn update_invoice(
        &self,
        id: i32,
        input: &UpdateInvoice,
        today: NaiveDate,
    ) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_invoice"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        // Row lock so the paid_date decision cannot race another update.
        let current = sqlx::query_scalar::<_, Option<NaiveDate>>(
            r#"
            SELECT paid_date
            FROM invoices
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to lock invoice: {}", e)))?;

        let Some(current_paid_date) = current else {
            timer.observe_duration();
            return Ok(None);
        };

        let transition = PaymentTransition::evaluate(current_paid_date, input.paid, today);

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices
            SET amt = $2,
                paid = $3,
                paid_date = $4
            WHERE id = $1
            RETURNING id, comp_code, amt, paid, add_date, paid_date
            "#,
        )
        .bind(id)
        .bind(input.amt)
        .bind(input.paid)
        .bind(transition.paid_date())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update invoice: {}", e)))?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit invoice update: {}", e))
        })?;

        timer.observe_duration();

        PAYMENT_TRANSITIONS_TOTAL
            .with_label_values(&[transition.as_str()])
            .inc();
        info!(
            invoice_id = id,
            transition = transition.as_str(),
            paid_date = ?invoice.paid_date,
            "Invoice updated"
        );

        Ok(Some(invoice))
    }

    #[instrument(skip(self), fields(invoice_id = id))]
    async fn delete_invoice(&self, id: i32) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_invoice"])
            .start_timer();

        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to delete invoice: {}", e)))?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }
}
