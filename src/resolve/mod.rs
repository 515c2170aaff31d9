//! Symbolic resolution of address and service identifiers.
//!
//! Two independent resolvers run over disjoint record fields:
//!
//! - [`NameResolver`] rewrites address identifiers into `name[address]`
//!   display form via live DNS, falling back to the inventory address
//!   table, falling back to the identifier itself.
//! - [`ServiceResolver`] expands service and service-group identifiers
//!   into `name(port/proto ...)` form, compressing contiguous ports
//!   into ranges. Group expansion is cycle-safe.
//!
//! Both memoize per identifier for the lifetime of the resolver (one
//! run); concurrent first access computes each identifier at most once.

mod dns;
mod name;
mod service;

pub use dns::{DnsNameLookup, NameLookup};
pub use name::NameResolver;
pub use service::ServiceResolver;
