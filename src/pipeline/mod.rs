//! Pipeline stages for PDF-to-recipe conversion.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own and the rendering backend can be swapped without
//! touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ provider ──▶ extract
//! (path)    (pdfium)   (base64)   (VLM call)   (fence strip + JSON)
//! ```
//!
//! 1. [`input`]   — check the user-supplied path is a readable PDF
//! 2. [`render`]  — rasterise every page; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`encode`]  — PNG-encode and base64-wrap each page for the request body
//! 4. the adapters in [`crate::provider`] make the single network call
//! 5. [`extract`] — turn the model's reply text into a [`crate::RecipeRecord`]

pub mod encode;
pub mod extract;
pub mod input;
pub mod render;
