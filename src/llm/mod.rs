//! Completion provider clients and abstractions.
//!
//! The rest of the application talks to the model through the
//! [`CompletionClient`] trait; the concrete provider (Gemini's
//! `generateContent` REST API) lives behind it. Retry policy deliberately
//! does NOT live here; it belongs to the agent layer so "can talk to the
//! model" stays separate from "should I try again".

/// Core completion client trait, response formats, and provider factory.
pub mod client;
/// Gemini `generateContent` client over reqwest.
pub mod gemini;

pub use client::{CompletionClient, CompletionFactory, Provider, ResponseFormat};
pub use gemini::GeminiClient;
