//! Auth-domain identifiers, scope lists, secrets, and token models.

pub mod id;
pub mod identity;
pub mod scope;
pub mod token;

pub use id::*;
pub use identity::*;
pub use scope::*;
pub use token::{access::*, secret::*};
