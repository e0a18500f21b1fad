//! Auth types shared across Campus services.
//!
//! Token verification happens in the gateway; services only read the identity
//! it forwards through the `IdentityHeaders` extractor.

pub mod identity;
