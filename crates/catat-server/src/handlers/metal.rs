//! Precious-metal-domain handlers

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{AppError, AppState};
use catat_core::{BatchOutcome, MetalPurchaseRecord, PreciousMetal};

use super::{today, ExpenseTextRequest, ReceiptImageRequest};

/// POST /process_expense - one metal purchase from free text
pub async fn process_expense(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExpenseTextRequest>,
) -> Result<Json<MetalPurchaseRecord>, AppError> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(AppError::bad_request("Text must not be empty"));
    }

    let interpreter = state.interpreter()?;
    let record = interpreter
        .interpret_text::<PreciousMetal>(text, today())
        .await?;
    Ok(Json(record))
}

/// POST /process_image_expense - metal purchases from a receipt image
pub async fn process_image_expense(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReceiptImageRequest>,
) -> Result<Json<BatchOutcome<MetalPurchaseRecord>>, AppError> {
    let interpreter = state.interpreter()?;
    let outcome = interpreter
        .interpret_receipt::<PreciousMetal>(&request.image, &request.caption, today())
        .await?;
    Ok(Json(outcome))
}
