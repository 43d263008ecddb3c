//! Subcommand implementations.

/// Cleanup command handler.
pub mod cleanup;

/// Configure command handler.
pub mod configure;

/// Inspect command handler.
pub mod inspect;

/// Interactive translation flow.
pub mod interactive;

/// Provider listing command handler.
pub mod providers;

/// Terminal reports shared by the commands.
pub mod report;

/// Translation command handler.
pub mod translate;

/// Validate command handler.
pub mod validate;
