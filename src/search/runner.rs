//! Search execution loop.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use super::config::SearchConfig;
use crate::cost;
use crate::network::{ConnectionError, Network, ResourceId, SiteId};
use crate::snapshot::Snapshot;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Float tolerance below which a cost difference does not count as an
/// improvement; keeps ties from committing on rounding noise.
const EPSILON: f64 = 1e-12;

/// A failed search run. The network is left in its last committed state.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The configuration failed validation; the network was not touched.
    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),

    /// A mutation primitive failed while committing a move. The pre-trial
    /// assignment was restored before this error propagated.
    #[error("trial move failed: {0}")]
    Trial(#[from] ConnectionError),
}

/// Numeric outcome of a search run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchResult {
    /// Cost of the assignment the caller handed in.
    pub initial_cost: f64,

    /// Cost after restoring the best snapshot. Never above `initial_cost`.
    pub final_cost: f64,

    /// Committed strictly-improving moves (hill-climb commits plus
    /// improving annealing acceptances).
    pub improving_moves: usize,

    /// Annealing acceptances, including uphill moves.
    pub accepted_moves: usize,

    /// Restarts that ran to the end of their annealing phase.
    pub restarts: usize,

    /// Budget slots consumed: hill-climb sweeps plus annealing iterations.
    pub iterations: usize,

    /// Global best cost after each completed restart. Non-increasing.
    pub cost_history: Vec<f64>,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,
}

impl SearchResult {
    fn no_op(cost: f64) -> Self {
        Self {
            initial_cost: cost,
            final_cost: cost,
            improving_moves: 0,
            accepted_moves: 0,
            restarts: 0,
            iterations: 0,
            cost_history: Vec::new(),
            cancelled: false,
        }
    }
}

/// Executes the multi-restart hybrid search.
pub struct SearchRunner;

impl SearchRunner {
    /// Optimizes the network in place within `budget` iterations.
    ///
    /// The engine takes exclusive write access to the network for the whole
    /// call, mutates the assignment relation only (never the entity sets),
    /// and restores the best snapshot seen before returning. A network with
    /// no sites or no resources is a no-op, not an error.
    ///
    /// The budget is split across `max(3, budget / 100)` restarts; each
    /// restart spends its share on hill-climb sweeps and annealing
    /// iterations per [`SearchConfig::phase_split`].
    pub fn run(
        net: &mut Network,
        budget: usize,
        config: &SearchConfig,
    ) -> Result<SearchResult, SearchError> {
        Self::run_with_cancel(net, budget, config, None)
    }

    /// Runs the search with an optional cancellation token, checked between
    /// sweeps and restarts. On cancellation the best snapshot seen so far
    /// is still restored before returning.
    pub fn run_with_cancel(
        net: &mut Network,
        budget: usize,
        config: &SearchConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SearchResult, SearchError> {
        config.validate().map_err(SearchError::InvalidConfig)?;

        let site_count = net.site_count();
        let resource_count = net.resource_count();
        let initial_cost = cost::total_cost(net);

        if site_count == 0 || resource_count == 0 {
            info!(
                "nothing to optimize: {site_count} site(s), {resource_count} resource(s)"
            );
            return Ok(SearchResult::no_op(initial_cost));
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let restarts = (budget / 100).max(3);
        let per_restart = budget / restarts;
        let sweep_cap = (per_restart as f64 * config.phase_split) as usize;
        let anneal_iters = per_restart - sweep_cap;

        info!(
            "optimizing {site_count} site(s) across {resource_count} resource(s): \
             {restarts} restarts, {per_restart} iterations each, initial cost {initial_cost:.4}"
        );

        let mut best = Snapshot::capture(net);
        let mut best_cost = initial_cost;
        let mut previous_end_cost = initial_cost;
        let mut fraction = config.perturbation_fraction;

        let mut improving_moves = 0usize;
        let mut accepted_moves = 0usize;
        let mut iterations = 0usize;
        let mut completed_restarts = 0usize;
        let mut cost_history = Vec::with_capacity(restarts);
        let mut cancelled = false;

        'restarts: for restart in 0..restarts {
            // Phase 1: exhaustive hill climbing, one full sweep per slot,
            // until a sweep commits nothing or the phase cap is reached.
            for _ in 0..sweep_cap {
                if is_cancelled(&cancel) {
                    cancelled = true;
                    break 'restarts;
                }
                let commits = Self::sweep(net)?;
                iterations += 1;
                improving_moves += commits;
                if commits == 0 {
                    break;
                }
            }

            // Phase 2: simulated annealing seeded from the post-descent cost.
            let mut temperature =
                cost::total_cost(net) * config.initial_temperature_factor;
            for _ in 0..anneal_iters {
                iterations += 1;
                let site = SiteId(rng.random_range(0..site_count));
                let to = ResourceId(rng.random_range(0..resource_count));
                if net.assignment(site) != Some(to) {
                    let delta = cost::move_delta(net, site, to);
                    let accept = if delta < 0.0 {
                        true
                    } else if temperature > 0.0 {
                        rng.random_range(0.0..1.0) < (-delta / temperature).exp()
                    } else {
                        false
                    };
                    if accept {
                        net.reassign(site, to)?;
                        accepted_moves += 1;
                        if delta < 0.0 {
                            improving_moves += 1;
                        }
                    }
                }
                temperature *= config.cooling_factor;
            }

            completed_restarts += 1;

            let end_cost = cost::total_cost(net);
            if end_cost < best_cost - EPSILON {
                best_cost = end_cost;
                best = Snapshot::capture(net);
                debug!("restart {}: new best cost {end_cost:.4}", restart + 1);
            }
            cost_history.push(best_cost);

            // Diversify the working state for the next restart. No cost
            // gate: raising the cost here is how the search changes basins.
            if restart + 1 < restarts {
                if is_cancelled(&cancel) {
                    cancelled = true;
                    break;
                }
                if config.adaptive_perturbation {
                    if (previous_end_cost - end_cost).abs() < config.stagnation_threshold {
                        fraction = (fraction * 2.0).min(1.0);
                    } else {
                        fraction = config.perturbation_fraction;
                    }
                }
                let draws = ((site_count as f64 * fraction) as usize).max(1);
                for _ in 0..draws {
                    let site = SiteId(rng.random_range(0..site_count));
                    let to = ResourceId(rng.random_range(0..resource_count));
                    if net.assignment(site) != Some(to) {
                        net.reassign(site, to)?;
                    }
                }
            }
            previous_end_cost = end_cost;
        }

        best.restore(net)?;
        let final_cost = cost::total_cost(net);

        info!(
            "optimization finished: {improving_moves} improving move(s), \
             cost {initial_cost:.4} -> {final_cost:.4}"
        );

        Ok(SearchResult {
            initial_cost,
            final_cost,
            improving_moves,
            accepted_moves,
            restarts: completed_restarts,
            iterations,
            cost_history,
            cancelled,
        })
    }

    /// One full hill-climb sweep: for each site, price a move to every
    /// other resource read-only and commit the strictly best one. Ties
    /// keep the current assignment. Returns the number of commits.
    fn sweep(net: &mut Network) -> Result<usize, ConnectionError> {
        let mut commits = 0;
        for index in 0..net.site_count() {
            let site = SiteId(index);
            let mut best_delta = -EPSILON;
            let mut best_to = None;
            for candidate in 0..net.resource_count() {
                let candidate = ResourceId(candidate);
                if net.assignment(site) == Some(candidate) {
                    continue;
                }
                let delta = cost::move_delta(net, site, candidate);
                if delta < best_delta {
                    best_delta = delta;
                    best_to = Some(candidate);
                }
            }
            if let Some(to) = best_to {
                net.reassign(site, to)?;
                commits += 1;
            }
        }
        Ok(commits)
    }
}

fn is_cancelled(cancel: &Option<Arc<AtomicBool>>) -> bool {
    cancel
        .as_ref()
        .is_some_and(|flag| flag.load(Ordering::Relaxed))
}
