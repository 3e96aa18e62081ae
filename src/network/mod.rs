//! The assignment graph: demand sites, supply resources, and the mapping
//! between them.
//!
//! Ownership of the site↔resource relation lives in a single assignment
//! table (site → resource) on [`Network`]; the per-resource membership and
//! load views are derived from it, so the two directions of the relation
//! can never disagree.

mod error;
mod graph;
mod types;

pub use error::{ConfigurationError, ConnectionError};
pub use graph::Network;
pub use types::{ConsumptionTier, Resource, ResourceId, Site, SiteId};
