//! Financial-domain handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState};
use catat_core::{BatchOutcome, Financial, TransactionRecord};

use super::{today, ExpenseTextRequest, ReceiptImageRequest, VoiceNoteRequest};

/// POST /process_expense_keuangan - one transaction from free text
pub async fn process_expense_keuangan(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExpenseTextRequest>,
) -> Result<Json<TransactionRecord>, AppError> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(AppError::bad_request("Text must not be empty"));
    }

    let interpreter = state.interpreter()?;
    let record = interpreter.interpret_text::<Financial>(text, today()).await?;
    Ok(Json(record))
}

/// POST /process_image_expense_keuangan - transactions from a receipt image
pub async fn process_image_expense_keuangan(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReceiptImageRequest>,
) -> Result<Json<BatchOutcome<TransactionRecord>>, AppError> {
    let interpreter = state.interpreter()?;
    let outcome = interpreter
        .interpret_receipt::<Financial>(&request.image, &request.caption, today())
        .await?;
    Ok(Json(outcome))
}

/// Response for the voice route
#[derive(Debug, Serialize)]
pub struct VoiceSummaryResponse {
    pub summary: String,
}

/// POST /process_voice_expense_keuangan - free-text summary of a voice note
pub async fn process_voice_expense_keuangan(
    State(state): State<Arc<AppState>>,
    Json(request): Json<VoiceNoteRequest>,
) -> Result<Json<VoiceSummaryResponse>, AppError> {
    let interpreter = state.interpreter()?;
    let summary = interpreter
        .summarize_voice(&request.file_base64, today())
        .await?;
    Ok(Json(VoiceSummaryResponse { summary }))
}
