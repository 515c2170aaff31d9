//! fwpol - firewall policy export with symbolic resolution.
//!
//! Records are fetched from the device management API, filtered against
//! the configured predicates, and run through two resolvers before export:
//!
//! ```text
//! Device API ──> Filter Engine ──> Name Resolver ────┐
//!                                  (srcaddr/dstaddr)  ├──> CSV / console
//!                                  Service Resolver ──┘
//!                                  (service)
//! ```
//!
//! Filtering and resolution never mutate the fetched records; the pipeline
//! produces [`record::ResolvedRecord`] views that carry both the original
//! identifiers and their display forms.

pub mod client;
pub mod config;
pub mod export;
pub mod filter;
pub mod inventory;
pub mod pipeline;
pub mod record;
pub mod resolve;
pub mod telemetry;
