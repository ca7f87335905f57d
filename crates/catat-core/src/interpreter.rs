//! Interpretation pipeline
//!
//! One request flows strictly sequentially: render prompt → gateway call →
//! extraction → coercion. The pipeline is stateless across requests; the
//! only shared data (templates, allow-lists) is read-only.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use base64::Engine;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::extract::{self, Payload};
use crate::model::{ModelBackend, ModelClient};
use crate::models::BatchOutcome;
use crate::profile::{DomainProfile, SourceVariant, TextReplyFormat};
use crate::prompts::{PromptId, PromptLibrary};

/// Mime type for voice-note uploads
pub const AUDIO_MIME_TYPE: &str = "audio/mp3";

/// Pipeline facade: owns the model client and the prompt library.
#[derive(Clone)]
pub struct Interpreter {
    model: ModelClient,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl Interpreter {
    /// Create an interpreter with the default prompt resolution (overrides
    /// from the data dir, embedded fallbacks).
    pub fn new(model: ModelClient) -> Self {
        Self {
            model,
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
        }
    }

    /// Create an interpreter that only uses embedded prompts.
    pub fn embedded_only(model: ModelClient) -> Self {
        Self {
            model,
            prompts: Arc::new(RwLock::new(PromptLibrary::embedded_only())),
        }
    }

    /// Create from environment variables; None when no backend is configured.
    pub fn from_env() -> Option<Self> {
        ModelClient::from_env().map(Self::new)
    }

    pub fn model(&self) -> &ModelClient {
        &self.model
    }

    fn render(&self, id: PromptId, vars: &HashMap<&str, &str>) -> Result<String> {
        let mut prompts = self
            .prompts
            .write()
            .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
        let template = prompts.get(id)?;
        Ok(template.render(vars))
    }

    /// Interpret free text into a single record.
    ///
    /// The model's `Error:` sentinel propagates as [`Error::Rejected`], a
    /// caller-level condition on the text routes.
    pub async fn interpret_text<P: DomainProfile>(
        &self,
        text: &str,
        today: NaiveDate,
    ) -> Result<P::Record> {
        let today_str = today.to_string();
        let mut vars = HashMap::new();
        vars.insert("text", text);
        vars.insert("current_date", today_str.as_str());
        let prompt = self.render(P::text_prompt(), &vars)?;

        info!(domain = P::NAME, "Interpreting text input");
        let raw = self.model.generate_text(&prompt).await?;

        let obj = match P::text_reply_format() {
            TextReplyFormat::FencedJson => extract::fenced_object(&raw)?,
            TextReplyFormat::KeyValueLines => extract::line_object(&raw)?,
        };
        Ok(P::record_from_object(&obj, SourceVariant::Text, today))
    }

    /// Interpret a receipt image into an ordered record list.
    ///
    /// A reply declaring "no transactions" (including the `Error:` sentinel)
    /// is a successful empty outcome with an advisory note, never a failure.
    pub async fn interpret_receipt<P: DomainProfile>(
        &self,
        image_base64: &str,
        caption: &str,
        today: NaiveDate,
    ) -> Result<BatchOutcome<P::Record>> {
        let today_str = today.to_string();
        let mut vars = HashMap::new();
        vars.insert("caption", caption);
        vars.insert("current_date", today_str.as_str());
        let prompt = self.render(P::receipt_prompt(), &vars)?;

        info!(domain = P::NAME, "Interpreting receipt image");
        let raw = self.model.generate_with_image(&prompt, image_base64).await?;

        match extract::payload(&raw) {
            Ok(Payload::List { items, note }) => Ok(BatchOutcome {
                transactions: assemble::<P>(&items, today),
                note,
            }),
            Ok(Payload::Note(note)) => Ok(BatchOutcome::empty_with_note(note)),
            Err(Error::Rejected(reason)) => {
                info!(domain = P::NAME, reason = %reason, "Model declined the image");
                Ok(BatchOutcome::empty_with_note(reason))
            }
            Err(e) => Err(e),
        }
    }

    /// Summarize a voice note into free text (no record extraction).
    pub async fn summarize_voice(&self, file_base64: &str, today: NaiveDate) -> Result<String> {
        let audio = base64::engine::general_purpose::STANDARD
            .decode(file_base64.trim())
            .map_err(|e| Error::InvalidData(format!("Invalid base64 audio payload: {}", e)))?;
        if audio.is_empty() {
            return Err(Error::InvalidData("Empty audio payload".into()));
        }

        let today_str = today.to_string();
        let mut vars = HashMap::new();
        vars.insert("current_date", today_str.as_str());
        let prompt = self.render(PromptId::VoiceSummary, &vars)?;

        info!("Summarizing voice note");
        let raw = self
            .model
            .generate_with_audio(&prompt, &audio, AUDIO_MIME_TYPE)
            .await?;
        Ok(raw.trim().to_string())
    }
}

/// Map extracted elements through the profile's normalizer, in input order.
///
/// Non-object elements are skipped with a warning; one malformed element
/// never aborts its siblings. An empty input is a valid empty result.
pub fn assemble<P: DomainProfile>(items: &[Value], today: NaiveDate) -> Vec<P::Record> {
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item {
            Value::Object(obj) => {
                records.push(P::record_from_object(obj, SourceVariant::Receipt, today))
            }
            other => {
                warn!(index, raw = %other, "Skipping non-object transaction element");
            }
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MockBackend;
    use crate::models::TransactionType;
    use crate::profile::{Financial, PreciousMetal};
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn interpreter(mock: MockBackend) -> Interpreter {
        Interpreter::embedded_only(ModelClient::Mock(mock))
    }

    #[tokio::test]
    async fn test_interpret_text_financial() {
        let mock = MockBackend::with_reply(
            "```json\n{\"category\": \"Food & Beverage\", \"transaction_type\": \"Expense\", \"amount\": \"15rb\", \"date\": \"2024-06-01\", \"description\": \"kopi\"}\n```",
        );
        let record = interpreter(mock.clone())
            .interpret_text::<Financial>("beli kopi 15rb", today())
            .await
            .unwrap();

        assert_eq!(record.amount, 15000.0);
        assert_eq!(record.category, "Food & Beverage");
        assert_eq!(record.transaction_type, TransactionType::Expense);
        assert_eq!(record.date, today());

        // The rendered prompt embeds the user input and the current date
        let prompts = mock.seen_prompts();
        assert!(prompts[0].contains("beli kopi 15rb"));
        assert!(prompts[0].contains("2024-06-01"));
    }

    #[tokio::test]
    async fn test_interpret_text_income() {
        let mock = MockBackend::with_reply(
            r#"{"category": "Salary", "transaction_type": "Income", "amount": "3jt", "description": "gaji bulan ini"}"#,
        );
        let record = interpreter(mock)
            .interpret_text::<Financial>("gaji bulan ini 3jt", today())
            .await
            .unwrap();

        assert_eq!(record.amount, 3_000_000.0);
        assert_eq!(record.transaction_type, TransactionType::Income);
        assert_eq!(record.category, "Salary");
    }

    #[tokio::test]
    async fn test_interpret_text_rejection_propagates() {
        let mock = MockBackend::with_reply("Error: not a transaction");
        let err = interpreter(mock)
            .interpret_text::<Financial>("hello there", today())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Rejected(_)));
    }

    #[tokio::test]
    async fn test_interpret_text_metal_line_reply() {
        let mock = MockBackend::with_reply(
            "brand: Antam\nweight_grams: 5\namount: 5000000\nquantity: 1\nsavings_goal: Emergency Fund\ndate: 2024-01-11",
        );
        let record = interpreter(mock)
            .interpret_text::<PreciousMetal>("Antam 5g 5000k 1 Dana Darurat", today())
            .await
            .unwrap();

        assert_eq!(record.brand, "Antam");
        assert_eq!(record.weight_grams, 5.0);
        assert_eq!(record.amount, 5_000_000.0);
        assert_eq!(record.savings_goal, "Emergency Fund");
    }

    #[tokio::test]
    async fn test_interpret_receipt_batch() {
        let reply = json!({
            "transactions": [
                {"category": "Food & Beverage", "transaction_type": "Expense", "amount": 12000, "description": "nasi goreng"},
                "garbage element",
                {"category": "Transportation", "transaction_type": "Expense", "amount": 8000, "description": "parkir"}
            ]
        });
        let mock = MockBackend::with_reply(reply.to_string());
        let outcome = interpreter(mock)
            .interpret_receipt::<Financial>("QUJD", "makan siang", today())
            .await
            .unwrap();

        // The malformed element is dropped; order is preserved
        assert_eq!(outcome.transactions.len(), 2);
        assert_eq!(outcome.transactions[0].description, "nasi goreng");
        assert_eq!(outcome.transactions[1].description, "parkir");
        assert!(outcome.note.is_none());
    }

    #[tokio::test]
    async fn test_interpret_receipt_empty_is_success() {
        let mock = MockBackend::with_reply(r#"{"transactions": []}"#);
        let outcome = interpreter(mock)
            .interpret_receipt::<Financial>("QUJD", "", today())
            .await
            .unwrap();
        assert!(outcome.transactions.is_empty());
        assert!(outcome.note.is_none());
    }

    #[tokio::test]
    async fn test_interpret_receipt_bare_array_matches_envelope() {
        let item = json!({"category": "Food & Beverage", "transaction_type": "Expense", "amount": 12000, "description": "nasi goreng"});
        let envelope = json!({ "transactions": [item] }).to_string();
        let bare = json!([item]).to_string();

        let from_envelope = interpreter(MockBackend::with_reply(envelope))
            .interpret_receipt::<Financial>("QUJD", "", today())
            .await
            .unwrap();
        let from_bare = interpreter(MockBackend::with_reply(bare))
            .interpret_receipt::<Financial>("QUJD", "", today())
            .await
            .unwrap();

        assert_eq!(from_envelope.transactions.len(), 1);
        assert_eq!(from_bare.transactions.len(), 1);
        assert_eq!(
            from_envelope.transactions[0].description,
            from_bare.transactions[0].description
        );
        assert!(from_bare.note.is_none());
    }

    #[tokio::test]
    async fn test_interpret_receipt_rejection_becomes_note() {
        let mock = MockBackend::with_reply("Error: this image is not a receipt");
        let outcome = interpreter(mock)
            .interpret_receipt::<Financial>("QUJD", "", today())
            .await
            .unwrap();
        assert!(outcome.transactions.is_empty());
        assert_eq!(outcome.note.as_deref(), Some("this image is not a receipt"));
    }

    #[tokio::test]
    async fn test_interpret_receipt_metal() {
        let reply = json!({
            "transactions": [
                {"brand": "emas UBS", "weight_grams": "10g", "amount": "10jt", "quantity": 1, "savings_goal": "Home"}
            ]
        });
        let mock = MockBackend::with_reply(reply.to_string());
        let outcome = interpreter(mock)
            .interpret_receipt::<PreciousMetal>("QUJD", "", today())
            .await
            .unwrap();

        assert_eq!(outcome.transactions.len(), 1);
        let record = &outcome.transactions[0];
        assert_eq!(record.brand, "UBS");
        assert_eq!(record.weight_grams, 10.0);
        assert_eq!(record.amount, 10_000_000.0);
        // No date on the receipt element: defaults to today
        assert_eq!(record.date, today());
    }

    #[tokio::test]
    async fn test_summarize_voice() {
        let mock = MockBackend::with_reply("  You spent 15000 on coffee today.  ");
        let audio_b64 = base64::engine::general_purpose::STANDARD.encode(b"fake mp3 bytes");
        let summary = interpreter(mock.clone())
            .summarize_voice(&audio_b64, today())
            .await
            .unwrap();
        assert_eq!(summary, "You spent 15000 on coffee today.");
        assert!(mock.seen_prompts()[0].contains("2024-06-01"));
    }

    #[tokio::test]
    async fn test_summarize_voice_bad_base64() {
        let mock = MockBackend::new();
        let err = interpreter(mock)
            .summarize_voice("not base64!!!", today())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_assemble_preserves_order_and_skips_garbage() {
        let items = vec![
            json!({"description": "first", "amount": 1}),
            json!(42),
            json!({"description": "second", "amount": 2}),
        ];
        let records = assemble::<Financial>(&items, today());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description, "first");
        assert_eq!(records[1].description, "second");
    }

    #[test]
    fn test_assemble_empty_input() {
        let records = assemble::<Financial>(&[], today());
        assert!(records.is_empty());
    }
}
