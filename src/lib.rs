//! Bias News - headline political-bias checker
//!
//! This crate fetches the top headlines of an RSS feed, asks an
//! OpenAI-compatible chat-completion API to rate each one's US political
//! bias, and renders the results. Users can also submit an article URL
//! for the same analysis.

pub mod classifier;
pub mod config;
pub mod error;
pub mod extractor;
pub mod headlines;
pub mod routes;
