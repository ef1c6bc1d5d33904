//! Provider-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`): client credentials,
//! absolute endpoint URLs, the ordered scope list, and the provider family tag.
//! `strategy` defines [`ProviderStrategy`], the per-family hook consulted by flow engines
//! when they decorate authorization URLs and extract a subject from user-info documents.

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
