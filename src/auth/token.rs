//! Token models exchanged with providers and the redacted secret wrappers they carry.

pub mod access;
pub mod secret;
