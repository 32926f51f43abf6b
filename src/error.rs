//! Error types for the recipe-pdf2json library.
//!
//! Every failure terminates the current conversion; nothing is retried and
//! nothing is silently defaulted. [`RecipeError`] keeps the failure modes
//! apart so programmatic callers can tell a missing API key from a model that
//! ignored the "JSON only" instruction:
//!
//! * configuration — a required credential is absent ([`RecipeError::Configuration`])
//! * input — the PDF cannot be opened, rasterised, or has no pages
//! * transport — the backend could not be reached ([`RecipeError::Connectivity`])
//! * remote — the backend answered with a non-2xx status ([`RecipeError::RemoteApi`])
//! * content — the reply is not a JSON object ([`RecipeError::Content`])
//!
//! [`RecipeError::kind`] collapses the variants into an [`ErrorKind`] for
//! callers that only want to branch on the category.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the recipe-pdf2json library.
#[derive(Debug, Error)]
pub enum RecipeError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// A required credential or environment value is missing.
    ///
    /// Always raised before any network I/O is attempted.
    #[error("Provider '{provider}' is not configured.\n{hint}")]
    Configuration { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// The PDF could not be opened or rasterised.
    #[error("Error converting PDF '{path}' to images: {detail}")]
    Rendering { path: PathBuf, detail: String },

    /// The PDF opened fine but produced no pages.
    #[error("No pages could be extracted from '{path}'")]
    EmptyDocument { path: PathBuf },

    /// A provider was handed an empty image list.
    #[error("No page images were supplied to {provider}")]
    NoPageImages { provider: String },

    /// A rendered page could not be re-encoded as PNG.
    #[error("Image encoding failed for page {page}: {detail}")]
    Encoding { page: usize, detail: String },

    // ── Provider errors ───────────────────────────────────────────────────
    /// The backend could not be reached (connection refused, DNS, timeout).
    #[error("Could not connect to {provider} at {endpoint}: {detail}")]
    Connectivity {
        provider: String,
        endpoint: String,
        detail: String,
    },

    /// The backend answered with a non-success status.
    #[error("{provider} API error: {status} - {body}")]
    RemoteApi {
        provider: String,
        status: u16,
        body: String,
    },

    /// The backend answered, but its text is not a JSON object.
    ///
    /// `raw` holds the text as received (before fence stripping) for
    /// diagnostics; it is not part of the display message.
    #[error("{provider} returned a response that is not valid recipe JSON: {detail}")]
    Content {
        provider: String,
        detail: String,
        raw: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output JSON file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse category of a [`RecipeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    Rendering,
    EmptyDocument,
    Encoding,
    Connectivity,
    RemoteApi,
    Content,
    Io,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Configuration => "configuration",
            Self::Rendering => "rendering",
            Self::EmptyDocument => "empty_document",
            Self::Encoding => "encoding",
            Self::Connectivity => "connectivity",
            Self::RemoteApi => "remote_api",
            Self::Content => "content",
            Self::Io => "io",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

impl RecipeError {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } | Self::InvalidConfig(_) => ErrorKind::Configuration,
            Self::Rendering { .. } => ErrorKind::Rendering,
            Self::EmptyDocument { .. } | Self::NoPageImages { .. } => ErrorKind::EmptyDocument,
            Self::Encoding { .. } => ErrorKind::Encoding,
            Self::Connectivity { .. } => ErrorKind::Connectivity,
            Self::RemoteApi { .. } => ErrorKind::RemoteApi,
            Self::Content { .. } => ErrorKind::Content,
            Self::OutputWriteFailed { .. } => ErrorKind::Io,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn missing_credential(provider: &str, var: &str) -> Self {
        Self::Configuration {
            provider: provider.to_string(),
            hint: format!(
                "{var} not found. Please set it in .env file or as an environment variable."
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_names_variable() {
        let e = RecipeError::missing_credential("openai", "OPENAI_API_KEY");
        assert_eq!(e.kind(), ErrorKind::Configuration);
        let msg = e.to_string();
        assert!(msg.contains("openai"), "got: {msg}");
        assert!(msg.contains("OPENAI_API_KEY"), "got: {msg}");
    }

    #[test]
    fn remote_api_display_carries_status_and_body() {
        let e = RecipeError::RemoteApi {
            provider: "ollama".into(),
            status: 500,
            body: "model not found".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("model not found"));
        assert_eq!(e.kind(), ErrorKind::RemoteApi);
    }

    #[test]
    fn content_display_omits_raw_text() {
        let e = RecipeError::Content {
            provider: "anthropic".into(),
            detail: "expected value at line 1 column 1".into(),
            raw: "Sure! Here is your recipe".into(),
        };
        assert!(!e.to_string().contains("Sure!"));
        assert_eq!(e.kind(), ErrorKind::Content);
    }

    #[test]
    fn connectivity_display() {
        let e = RecipeError::Connectivity {
            provider: "ollama".into(),
            endpoint: "http://localhost:11434".into(),
            detail: "connection refused".into(),
        };
        assert!(e.to_string().contains("http://localhost:11434"));
        assert_eq!(e.kind(), ErrorKind::Connectivity);
    }

    #[test]
    fn empty_document_is_distinct_from_rendering() {
        let empty = RecipeError::EmptyDocument {
            path: PathBuf::from("a.pdf"),
        };
        let render = RecipeError::Rendering {
            path: PathBuf::from("a.pdf"),
            detail: "corrupt xref".into(),
        };
        assert_ne!(empty.kind(), render.kind());
    }

    #[test]
    fn empty_image_list_has_its_own_message() {
        let e = RecipeError::NoPageImages {
            provider: "anthropic".into(),
        };
        assert_eq!(e.kind(), ErrorKind::EmptyDocument);
        assert_eq!(e.to_string(), "No page images were supplied to anthropic");
    }

    #[test]
    fn kind_display_is_snake_case() {
        assert_eq!(ErrorKind::RemoteApi.to_string(), "remote_api");
        assert_eq!(ErrorKind::EmptyDocument.to_string(), "empty_document");
    }
}
