//! Document uploads: validation, transport encoding and text extraction.
//!
//! Only PDF and Word documents up to 10 MiB are accepted. Validation runs
//! before anything is sent to the webhook.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, instrument};

use crate::error::{GenerationError, UploadError};
use crate::util::format_file_size;

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Request body limit for JSON uploads: base64 of `MAX_UPLOAD_BYTES` plus room
/// for the data-URL prefix and the other fields.
pub const MAX_UPLOAD_BODY_BYTES: usize = (MAX_UPLOAD_BYTES as usize).div_ceil(3) * 4 + 64 * 1024;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
}

impl DocumentKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            MIME_PDF => Some(DocumentKind::Pdf),
            MIME_DOC => Some(DocumentKind::Doc),
            MIME_DOCX => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            DocumentKind::Pdf => MIME_PDF,
            DocumentKind::Doc => MIME_DOC,
            DocumentKind::Docx => MIME_DOCX,
        }
    }
}

/// Check declared type and size. Nothing is decoded or sent.
pub fn validate_upload(mime_type: &str, size: u64) -> Result<DocumentKind, UploadError> {
    let kind = DocumentKind::from_mime(mime_type)
        .ok_or_else(|| UploadError::UnsupportedType(mime_type.to_string()))?;
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge { size, max: MAX_UPLOAD_BYTES });
    }
    Ok(kind)
}

/// Drop a `data:<mime>;base64,` prefix if present.
pub fn strip_data_url_prefix(data: &str) -> &str {
    if data.starts_with("data:") {
        match data.split_once(',') {
            Some((_, payload)) => payload,
            None => "",
        }
    } else {
        data
    }
}

/// A validated document held in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Validate and wrap raw bytes.
    pub fn new(file_name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<Self, UploadError> {
        if file_name.trim().is_empty() || bytes.is_empty() {
            return Err(UploadError::MissingFile);
        }
        let kind = validate_upload(mime_type, bytes.len() as u64)?;
        Ok(Self { file_name: file_name.to_string(), kind, bytes })
    }

    /// Decode a base64 payload (optionally a data URL) sent by the widget.
    #[instrument(level = "debug", skip(data), fields(data_len = data.len()))]
    pub fn from_base64(file_name: &str, mime_type: &str, data: &str) -> Result<Self, UploadError> {
        // Reject on declared type and approximate size before decoding anything.
        let payload = strip_data_url_prefix(data.trim());
        let padding = payload.bytes().rev().take_while(|b| *b == b'=').count() as u64;
        let approx = ((payload.len() as u64 / 4) * 3).saturating_sub(padding);
        validate_upload(mime_type, approx)?;

        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| UploadError::InvalidEncoding(e.to_string()))?;
        let file = Self::new(file_name, mime_type, bytes)?;
        debug!(file_name = %file.file_name, size = %format_file_size(file.size()), "Upload accepted");
        Ok(file)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn mime_type(&self) -> &'static str {
        self.kind.mime()
    }

    /// Transport-safe payload for the webhook (plain base64, no data-URL prefix).
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// Collaborator that turns a document into plain text for local synthesis.
pub trait DocumentExtractor: Send + Sync {
    fn extract_text(&self, file: &UploadedFile) -> Result<String, GenerationError>;
}

/// Stand-in extractor returning a fixed passage per document kind.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimulatedExtractor;

impl DocumentExtractor for SimulatedExtractor {
    fn extract_text(&self, file: &UploadedFile) -> Result<String, GenerationError> {
        if file.bytes.is_empty() {
            return Err(GenerationError::ExtractionError("Failed to read file".into()));
        }
        let body = match file.kind {
            DocumentKind::Pdf => PDF_SAMPLE,
            DocumentKind::Doc | DocumentKind::Docx => WORD_SAMPLE,
        };
        Ok(format!("Sample content from {}. \n{}", file.file_name, body))
    }
}

const PDF_SAMPLE: &str = "
    Artificial Intelligence (AI) is intelligence demonstrated by machines, as opposed to the natural intelligence displayed by humans and animals. Leading AI textbooks define the field as the study of \"intelligent agents\": any device that perceives its environment and takes actions that maximize its chance of successfully achieving its goals.

    Machine learning is a subset of AI that provides systems the ability to automatically learn and improve from experience without being explicitly programmed. It focuses on the development of computer programs that can access data and use it to learn for themselves.

    Deep learning is part of a broader family of machine learning methods based on artificial neural networks with representation learning. Learning can be supervised, semi-supervised or unsupervised.";

const WORD_SAMPLE: &str = "
    Cloud computing is the delivery of computing services including servers, storage, databases, networking, software, analytics, and intelligence over the Internet (\"the cloud\") to offer faster innovation, flexible resources, and economies of scale.

    Types of cloud computing include Infrastructure as a Service (IaaS), Platform as a Service (PaaS), and Software as a Service (SaaS). Each type provides different levels of control, flexibility, and management.

    Benefits of cloud computing include cost savings, scalability, performance, speed, productivity, reliability, and security.";
