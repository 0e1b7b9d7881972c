//! End-to-End Integration Tests
//!
//! These tests validate complete SAML Responses signed with a real RSA key,
//! from payload decoding to attribute extraction.

mod attributes;
mod common;
mod protocol;
mod signatures;
mod wrapping;
