//! Load balancing for capacity-bounded supply networks.
//!
//! A network is a fixed collection of demand **sites** (each drawing a fixed
//! amount of power) and capacity-bounded supply **resources**. The crate
//! searches for an assignment of sites to resources that minimizes a
//! composite cost balancing load imbalance (dispersion of utilizations)
//! against aggregate overload (capacity surcharge):
//!
//! - **[`network`]**: the assignment graph: sites, resources, and a single
//!   source-of-truth assignment table with a derived per-resource load index.
//! - **[`cost`]**: the cost model: dispersion + λ × surcharge, plus a
//!   read-only incremental delta for single-site moves.
//! - **[`snapshot`]**: capture/restore of a full assignment for rollback.
//! - **[`search`]**: the optimization engine: multi-restart exhaustive hill
//!   climbing followed by simulated annealing, with random perturbation
//!   between restarts and best-solution tracking.
//! - **[`format`]**: line-oriented textual persistence of a network
//!   (`resource(..)`, `site(..)`, `connection(..)` facts).
//!
//! # Architecture
//!
//! The engine mutates the supplied network in place through its attach/detach
//! primitives, evaluates trial moves read-only through the incremental cost
//! delta, and restores the best snapshot seen before returning, so the caller
//! always observes a final cost no worse than the initial one.

pub mod cost;
pub mod format;
pub mod network;
pub mod search;
pub mod snapshot;
