//! Input validation: make sure the user-supplied path is a readable PDF.
//!
//! pdfium reports a missing or non-PDF file with an opaque load error. We
//! check existence, readability and the `%PDF` magic bytes up front so the
//! resulting [`RecipeError::Rendering`] says what is actually wrong.

use crate::error::RecipeError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Validate `path` and return it as an owned `PathBuf`.
pub fn resolve_local(path: impl AsRef<Path>) -> Result<PathBuf, RecipeError> {
    let path = path.as_ref().to_path_buf();
    let rendering = |detail: String| RecipeError::Rendering {
        path: path.clone(),
        detail,
    };

    if !path.exists() {
        return Err(rendering("file not found".into()));
    }
    if path.is_dir() {
        return Err(rendering("path is a directory".into()));
    }

    let mut file = std::fs::File::open(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => rendering("permission denied".into()),
        _ => rendering(e.to_string()),
    })?;

    let mut magic = [0u8; 4];
    match file.read_exact(&mut magic) {
        Ok(()) if &magic == PDF_MAGIC => {}
        Ok(()) => {
            return Err(rendering(format!(
                "not a PDF file (first bytes: {magic:?})"
            )))
        }
        Err(_) => return Err(rendering("file is too short to be a PDF".into())),
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}
