//! Invoice handlers.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use service_core::error::AppError;
use service_core::extract::{AppJson, AppPath};

use crate::{
    dtos::{
        CreateInvoiceRequest, InvoiceDetail, InvoiceListResponse, InvoiceResponse,
        MessageResponse, UpdateInvoiceRequest,
    },
    models::{CreateInvoice, UpdateInvoice},
    services::metrics::MUTATIONS_TOTAL,
    startup::AppState,
};

/// `GET /invoices`
pub async fn list_invoices(
    State(state): State<AppState>,
) -> Result<Json<InvoiceListResponse>, AppError> {
    let invoices = state.store.list_invoices().await?;

    Ok(Json(InvoiceListResponse { invoices }))
}

/// `GET /invoices/:id`, nesting the owning company.
pub async fn get_invoice(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<InvoiceResponse<InvoiceDetail>>, AppError> {
    let row = state
        .store
        .get_invoice_with_company(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("No invoice with id of '{}' exists.", id)))?;

    Ok(Json(InvoiceResponse {
        invoice: InvoiceDetail::from(row),
    }))
}

/// `POST /invoices`
pub async fn create_invoice(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), AppError> {
    let input = CreateInvoice {
        comp_code: payload.comp_code,
        amt: payload.amt,
        add_date: Utc::now().date_naive(),
    };

    tracing::info!(comp_code = %input.comp_code, amt = %input.amt, "Creating invoice");

    let invoice = state.store.create_invoice(&input).await?;

    MUTATIONS_TOTAL
        .with_label_values(&["invoice", "create"])
        .inc();

    Ok((StatusCode::CREATED, Json(InvoiceResponse { invoice })))
}

/// `PUT /invoices/:id`. `paid_date` follows the paid flag, see
/// [`PaymentTransition`](crate::models::PaymentTransition).
pub async fn update_invoice(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<UpdateInvoiceRequest>,
) -> Result<Json<InvoiceResponse>, AppError> {
    let input = UpdateInvoice {
        amt: payload.amt,
        paid: payload.paid,
    };
    let today = Utc::now().date_naive();

    let invoice = state
        .store
        .update_invoice(id, &input, today)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("No invoice with {} exists", id)))?;

    MUTATIONS_TOTAL
        .with_label_values(&["invoice", "update"])
        .inc();

    Ok(Json(InvoiceResponse { invoice }))
}

/// `DELETE /invoices/:id`
pub async fn delete_invoice(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.store.delete_invoice(id).await? {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "Invoice with id {} does not exist",
            id
        )));
    }

    tracing::info!(invoice_id = id, "Invoice deleted");
    MUTATIONS_TOTAL
        .with_label_values(&["invoice", "delete"])
        .inc();

    Ok(Json(MessageResponse::new("Invoice deleted")))
}
