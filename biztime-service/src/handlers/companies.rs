//! Company handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{Map, Value};
use service_core::error::AppError;
use service_core::extract::{AppJson, AppPath};

use crate::{
    dtos::{
        CompanyDetail, CompanyListResponse, CompanyResponse, CreateCompanyRequest,
        MessageResponse, UpdateCompanyRequest,
    },
    models::{CreateCompany, UpdateCompany},
    services::metrics::MUTATIONS_TOTAL,
    startup::AppState,
};

/// `GET /companies`
pub async fn list_companies(
    State(state): State<AppState>,
) -> Result<Json<CompanyListResponse>, AppError> {
    let companies = state.store.list_companies().await?;

    Ok(Json(CompanyListResponse { companies }))
}

/// `GET /companies/:code`, with the ids of the company's invoices.
pub async fn get_company(
    State(state): State<AppState>,
    AppPath(code): AppPath<String>,
) -> Result<Json<CompanyResponse<CompanyDetail>>, AppError> {
    let company = state.store.get_company(&code).await?.ok_or_else(|| {
        AppError::NotFound(anyhow::anyhow!(
            "No company with code of '{}' exists.",
            code
        ))
    })?;

    let invoices = state.store.list_company_invoice_ids(&code).await?;

    Ok(Json(CompanyResponse {
        company: CompanyDetail::new(company, invoices),
    }))
}

/// `POST /companies`. The code is slugged from the name.
pub async fn create_company(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCompanyRequest>,
) -> Result<(StatusCode, Json<CompanyResponse>), AppError> {
    let input = CreateCompany::from_name(payload.name, payload.description).ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!(
            "Company name must contain at least one letter or digit"
        ))
    })?;

    tracing::info!(code = %input.code, "Creating company");

    let company = state.store.create_company(&input).await?;

    MUTATIONS_TOTAL
        .with_label_values(&["company", "create"])
        .inc();

    Ok((StatusCode::CREATED, Json(CompanyResponse { company })))
}

/// `PUT /companies/:code`. Any `code` key in the body is refused.
pub async fn update_company(
    State(state): State<AppState>,
    AppPath(code): AppPath<String>,
    AppJson(body): AppJson<Map<String, Value>>,
) -> Result<Json<CompanyResponse>, AppError> {
    if body.contains_key("code") {
        return Err(AppError::BadRequest(anyhow::anyhow!("Not allowed")));
    }

    let payload: UpdateCompanyRequest = serde_json::from_value(Value::Object(body))
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid company: {}", e)))?;

    let input = UpdateCompany {
        name: payload.name,
        description: payload.description,
    };

    let company = state
        .store
        .update_company(&code, &input)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Can't update company with code '{}'", code))
        })?;

    MUTATIONS_TOTAL
        .with_label_values(&["company", "update"])
        .inc();

    Ok(Json(CompanyResponse { company }))
}

/// `DELETE /companies/:code`
pub async fn delete_company(
    State(state): State<AppState>,
    AppPath(code): AppPath<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if !state.store.delete_company(&code).await? {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "There is no company with code '{}'",
            code
        )));
    }

    tracing::info!(code = %code, "Company deleted");
    MUTATIONS_TOTAL
        .with_label_values(&["company", "delete"])
        .inc();

    Ok(Json(MessageResponse::new("Company deleted")))
}
