//! API Routes
//!
//! HTTP endpoint definitions. The router is generic over the account store
//! so tests can drive it without a database.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::Account;
use crate::error::AppError;
use crate::ledger::LedgerService;
use crate::store::AccountStore;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub name: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            balance: account.balance,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddBalanceRequest {
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub source_account_id: i64,
    pub target_account_id: i64,
    pub amount: Decimal,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router<S: AccountStore>() -> Router<Arc<LedgerService<S>>> {
    Router::new()
        .route(
            "/accounts",
            post(create_account::<S>).get(list_accounts::<S>),
        )
        .route("/accounts/:account_id/add-balance", post(add_balance::<S>))
        .route("/transfers", post(transfer::<S>))
}

/// POST /accounts — create an account with balance 0
async fn create_account<S: AccountStore>(
    State(service): State<Arc<LedgerService<S>>>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let account = service.create_account(&request.name).await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

/// GET /accounts — list all accounts
async fn list_accounts<S: AccountStore>(
    State(service): State<Arc<LedgerService<S>>>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    let accounts = service.list_accounts().await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}

/// POST /accounts/:account_id/add-balance — credit an account
async fn add_balance<S: AccountStore>(
    State(service): State<Arc<LedgerService<S>>>,
    Path(account_id): Path<i64>,
    Json(request): Json<AddBalanceRequest>,
) -> Result<StatusCode, AppError> {
    service.credit(account_id, request.amount).await?;
    Ok(StatusCode::OK)
}

/// POST /transfers — atomically move an amount between two accounts
async fn transfer<S: AccountStore>(
    State(service): State<Arc<LedgerService<S>>>,
    Json(request): Json<TransferRequest>,
) -> Result<StatusCode, AppError> {
    service
        .transfer(
            request.source_account_id,
            request.target_account_id,
            request.amount,
        )
        .await?;
    Ok(StatusCode::OK)
}
