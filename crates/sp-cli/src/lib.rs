//! # sp-cli
//!
//! Command-line tools for SAML Service Providers.
//!
//! This crate provides:
//! - Response validation against IdP trust settings
//! - Certificate fingerprinting for `idp_cert_fingerprint`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::struct_excessive_bools)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
