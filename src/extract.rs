//! Admission of source documents and the extraction collaborator.
//!
//! Turning a PDF into questions is delegated to an [`ExtractionProvider`].
//! Whatever it returns is unvalidated; the session checks it before use.

use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::model::RawQuiz;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// The header may be preceded by junk bytes, but only within the first KiB.
const PDF_HEADER_WINDOW: usize = 1024;

/// A document accepted for extraction.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    file_name: String,
    bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn from_path(path: &Path, limit: u64) -> Result<Self, ExtractionError> {
        let size = fs::metadata(path)?.len();
        if size > limit {
            return Err(ExtractionError::TooLarge { size, limit });
        }
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        Self::from_bytes(file_name, bytes, limit)
    }

    pub fn from_bytes(
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        limit: u64,
    ) -> Result<Self, ExtractionError> {
        if bytes.is_empty() {
            return Err(ExtractionError::Empty);
        }
        if bytes.len() as u64 > limit {
            return Err(ExtractionError::TooLarge {
                size: bytes.len() as u64,
                limit,
            });
        }
        let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
        if !window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
            return Err(ExtractionError::NotPdf);
        }
        Ok(Self {
            file_name: file_name.into(),
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn sha256_hex(&self) -> String {
        let digest = Sha256::digest(&self.bytes);
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

/// Turns a source document into an (unvalidated) quiz.
pub trait ExtractionProvider: Send + Sync {
    fn extract(&self, document: &SourceDocument) -> Result<RawQuiz, ExtractionError>;
}

impl<P: ExtractionProvider + ?Sized> ExtractionProvider for Arc<P> {
    fn extract(&self, document: &SourceDocument) -> Result<RawQuiz, ExtractionError> {
        (**self).extract(document)
    }
}

impl<P: ExtractionProvider + ?Sized> ExtractionProvider for Box<P> {
    fn extract(&self, document: &SourceDocument) -> Result<RawQuiz, ExtractionError> {
        (**self).extract(document)
    }
}

/// Parse the JSON text of an extraction. Tolerates a surrounding
/// markdown code fence.
pub fn parse_quiz_json(text: &str) -> Result<RawQuiz, ExtractionError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(body.trim()).map_err(ExtractionError::Malformed)
}

/// Result of a background extraction, tagged with the session epoch it was
/// requested under.
#[derive(Debug)]
pub struct ExtractionEvent {
    pub epoch: u64,
    pub result: Result<RawQuiz, ExtractionError>,
}

/// Run `provider` on a worker thread; the single result arrives on the
/// returned channel.
pub fn spawn_extraction(
    provider: Arc<dyn ExtractionProvider>,
    document: SourceDocument,
    epoch: u64,
) -> mpsc::Receiver<ExtractionEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = provider.extract(&document);
        let _ = tx.send(ExtractionEvent { epoch, result });
    });
    rx
}

const EXTRACTION_INSTRUCTIONS: &str = "Extract EVERY question from this PDF.

DIRECTIONS/CONTEXT RULES:
- If a set of questions shares a common block of directions or instructions, copy that text EXACTLY into the 'context' field of EACH question in the set.
- Do not summarize, solve or rephrase data tables or instructions; give the raw text as it appears.

SECTION RULES:
- Categorize questions into the sections found in the document (e.g. 'Reasoning', 'Numerical Ability', 'Quantitative Aptitude').
- If no sections are explicitly mentioned, use 'General'.

BILINGUAL RULES:
- If the document is bilingual, preserve both languages in the 'question', 'options' and 'context' fields.

GENERAL:
- Provide a detailed title.
- Set 'timeLimitSeconds' based on difficulty (roughly 60-90 seconds per question).
- Ensure every single question is extracted.";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// Extraction through the Gemini `generateContent` endpoint. One request per
/// document, no retries.
pub struct GeminiProvider {
    client: reqwest::blocking::Client,
    config: Option<GeminiConfig>,
}

impl GeminiProvider {
    pub fn new(config: Option<GeminiConfig>) -> Result<Self, ExtractionError> {
        let timeout = config
            .as_ref()
            .map(|c| c.timeout)
            .unwrap_or(Duration::from_secs(300));
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    fn request_body(document: &SourceDocument) -> serde_json::Value {
        json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": "application/pdf", "data": document.to_base64() } },
                    { "text": EXTRACTION_INSTRUCTIONS }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        })
    }
}

fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "description": { "type": "STRING" },
            "timeLimitSeconds": { "type": "INTEGER" },
            "sections": { "type": "ARRAY", "items": { "type": "STRING" } },
            "questions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "question": { "type": "STRING" },
                        "context": { "type": "STRING" },
                        "section": { "type": "STRING" },
                        "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "correctAnswerIndex": { "type": "INTEGER" },
                        "explanation": { "type": "STRING" }
                    },
                    "required": ["id", "question", "options", "correctAnswerIndex", "explanation"]
                }
            }
        },
        "required": ["title", "description", "questions", "timeLimitSeconds", "sections"]
    })
}

impl ExtractionProvider for GeminiProvider {
    fn extract(&self, document: &SourceDocument) -> Result<RawQuiz, ExtractionError> {
        let config = self.config.as_ref().ok_or(ExtractionError::Disabled)?;

        let url = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );
        info!(file = %document.file_name(), model = %config.model, "requesting extraction");

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &config.api_key)
            .json(&Self::request_body(document))
            .send()?;

        if !response.status().is_success() {
            return Err(ExtractionError::HttpStatus(response.status()));
        }

        let body: GenerateResponse = response.json()?;
        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .concat()
            })
            .filter(|t| !t.trim().is_empty())
            .ok_or(ExtractionError::EmptyResponse)?;

        debug!(chars = text.len(), "extraction response received");
        parse_quiz_json(&text)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: u64 = 1024 * 1024;

    #[test]
    fn test_accepts_pdf_header() {
        let doc = SourceDocument::from_bytes("mock.pdf", b"%PDF-1.7\n...".to_vec(), LIMIT).unwrap();
        assert_eq!(doc.file_name(), "mock.pdf");
        assert_eq!(doc.len(), 12);
    }

    #[test]
    fn test_rejects_non_pdf() {
        let err = SourceDocument::from_bytes("notes.txt", b"hello world".to_vec(), LIMIT).unwrap_err();
        assert!(matches!(err, ExtractionError::NotPdf));
    }

    #[test]
    fn test_rejects_empty_and_oversized() {
        assert!(matches!(
            SourceDocument::from_bytes("a.pdf", Vec::new(), LIMIT).unwrap_err(),
            ExtractionError::Empty
        ));
        assert!(matches!(
            SourceDocument::from_bytes("a.pdf", b"%PDF-1.4 padding".to_vec(), 8).unwrap_err(),
            ExtractionError::TooLarge { size: 16, limit: 8 }
        ));
    }

    #[test]
    fn test_sha256_hex() {
        let doc = SourceDocument::from_bytes("a.pdf", b"%PDF-".to_vec(), LIMIT).unwrap();
        let hex = doc.sha256_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hex, doc.clone().sha256_hex());
    }

    #[test]
    fn test_parse_quiz_json_strips_fence() {
        let text = "```json\n{\"title\":\"T\",\"timeLimitSeconds\":60,\"questions\":[]}\n```";
        let raw = parse_quiz_json(text).unwrap();
        assert_eq!(raw.title, "T");
        assert_eq!(raw.time_limit_seconds, 60);
    }

    #[test]
    fn test_parse_quiz_json_malformed() {
        let err = parse_quiz_json("not json").unwrap_err();
        assert!(matches!(err, ExtractionError::Malformed(_)));
        assert!(err.to_string().contains("Failed to extract questions"));
    }

    #[test]
    fn test_disabled_provider() {
        let provider = GeminiProvider::new(None).unwrap();
        assert!(!provider.enabled());
        let doc = SourceDocument::from_bytes("a.pdf", b"%PDF-1.4".to_vec(), LIMIT).unwrap();
        assert!(matches!(
            provider.extract(&doc).unwrap_err(),
            ExtractionError::Disabled
        ));
    }

    #[test]
    fn test_request_body_carries_document() {
        let doc = SourceDocument::from_bytes("a.pdf", b"%PDF-1.4".to_vec(), LIMIT).unwrap();
        let body = GeminiProvider::request_body(&doc);
        let data = &body["contents"][0]["parts"][0]["inlineData"]["data"];
        assert_eq!(data.as_str().unwrap(), BASE64.encode(b"%PDF-1.4"));
        assert_eq!(
            body["generationConfig"]["responseMimeType"].as_str(),
            Some("application/json")
        );
    }
}
