//! The local search engine.
//!
//! A multi-restart hybrid: each restart descends to a local minimum with
//! exhaustive hill climbing (every site × every other resource), then runs
//! a simulated annealing phase seeded from the post-descent cost, and the
//! working state is randomly perturbed before the next restart. The best
//! assignment seen across all restarts is restored before returning, so the
//! caller never observes a worsened network.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Lourenço, Martin & Stützle (2003), "Iterated Local Search"

mod config;
mod runner;

pub use config::SearchConfig;
pub use runner::{SearchError, SearchResult, SearchRunner};
