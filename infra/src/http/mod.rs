//! HTTP adapters for the external authentication service

pub mod client;

#[cfg(test)]
mod tests;

pub use client::{classify_verify_response, HttpAuthClient};
