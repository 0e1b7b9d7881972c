//! SAML 2.0 Response validation for Service Providers.
//!
//! This crate validates Responses an Identity Provider posts back to a
//! Service Provider:
//!
//! - **Document loading** - Base64 or raw XML payloads, parsed without DTDs
//! - **Safe extraction** - comment-free text and fixed, namespace-aware paths
//! - **Signed-assertion location** - wrapping-resistant discovery of the one
//!   assertion covered by an enveloped signature
//! - **XML signature** - canonicalization, digest and RSA signature checks
//! - **Conditions and audience** - time window with clock drift, audience
//!   restriction
//! - **Attributes** - ordered multi-value attribute container
//!
//! # Architecture
//!
//! - [`document`] - payload decoding and parsing
//! - [`extract`] - safe text and fixed path lookup
//! - [`c14n`] - exclusive and inclusive XML canonicalization
//! - [`signature`] - signature parsing, location and verification
//! - [`conditions`] / [`audience`] - protocol checks
//! - [`attributes`] - the attribute container
//! - [`response`] - the [`Response`] façade tying the pipeline together
//!
//! # Example
//!
//! ```rust,ignore
//! use sp_saml::{Response, ResponseOptions, Settings};
//!
//! let settings = Settings::default()
//!     .with_fingerprint("E3:9E:12:0C:89:64:A8:97:66:A9:DC:7E:62:75:E2:6B:DA:D9:1B:10")
//!     .with_sp_entity_id("https://sp.example.com/metadata");
//!
//! let response = Response::new(&saml_response_param, ResponseOptions::default())?
//!     .with_settings(settings);
//!
//! response.validate()?;
//! let user = response.name_id();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod attributes;
pub mod audience;
pub mod c14n;
pub mod conditions;
pub mod constants;
pub mod document;
pub mod error;
pub mod extract;
pub mod options;
pub mod outcome;
pub mod response;
pub mod settings;
pub mod signature;

pub use attributes::{AttributeLookup, Attributes};
pub use document::SamlDocument;
pub use error::{SamlError, SamlResult, ValidationError, ValidationErrorKind};
pub use options::{Clock, FixedClock, ResponseOptions, SystemClock};
pub use outcome::{ValidationOutcome, ValidationStage};
pub use response::Response;
pub use settings::{Settings, TrustAnchor};
pub use signature::verifier::{SignatureVerifier, XmlDsigVerifier};
