//! # xlft - XLIFF Translation CLI
//!
//! `xlft` translates XLIFF 1.2 files through OpenAI-compatible chat
//! endpoints without breaking inline formatting.
//!
//! Styled units keep their text in several `<g ctype="x-text">` spans. The
//! spans are joined into one string with ` __SEG__ ` between them, sent for
//! translation as a single piece, then split back into the original spans.
//! Any token that survives is removed before the file is written.
//!
//! ## Features
//!
//! - **Structure preserving**: targets are deep copies of their sources with
//!   only the span text replaced
//! - **Batch translation**: several units per request, with per-unit retries
//!   as a fallback
//! - **Caching**: repeated units are served from a `SQLite` cache
//! - **Checks**: `inspect`, `validate` and `cleanup` subcommands
//!
//! ## Quick Start
//!
//! ```bash
//! # Translate a file
//! xlft course.xlf --to es
//!
//! # Keep brand names untranslated
//! xlft course.xlf --to de-DE --preserve Pixel,MbG
//!
//! # Guided mode: pick a file from the data directory
//! xlft
//!
//! # Check a translated file
//! xlft validate course_translated.xlf
//! ```
//!
//! ## Configuration
//!
//! Settings are stored in `~/.config/xlft/config.toml`:
//!
//! ```toml
//! [xlft]
//! provider = "openai"
//! model = "gpt-4o"
//! to = "es"
//! batch_size = 10
//!
//! [providers.openai]
//! endpoint = "https://api.openai.com"
//! api_key_env = "OPENAI_API_KEY"
//! models = ["gpt-4o", "gpt-4o-mini"]
//! ```

/// Translation cache management using `SQLite`.
pub mod cache;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management and provider settings.
pub mod config;

/// File system utilities.
pub mod fs;

/// Reading XLF files from disk.
pub mod input;

/// Global output configuration (quiet mode, colors, stderr/stdout routing).
pub mod output;

/// XDG-style path utilities for configuration and cache.
pub mod paths;

/// Extract, translate, write back, sweep and validate in one flow.
pub mod pipeline;

/// Gateway contract and the OpenAI-compatible translation client.
pub mod translation;

/// Terminal UI components (spinner, colors).
pub mod ui;

/// XLIFF 1.2 unit model, boundary tokens and document checks.
pub mod xliff;

/// Arena-backed XML document model.
pub mod xml;
