/// State management module
///
/// This module handles all application state, including:
/// - The submitted-post database (outbox.rs)
/// - Shared data structures (data.rs)
/// - The per-dialog compose session (session.rs)

pub mod data;
pub mod outbox;
pub mod session;
