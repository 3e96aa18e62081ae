//! The cost model: a pure function of the current assignment state.
//!
//! `cost = dispersion + λ × surcharge`, where dispersion is the sum of
//! absolute deviations of the resources' utilizations from their mean
//! (load imbalance) and surcharge is the total utilization excess beyond
//! 1.0 (aggregate overload).
//!
//! All evaluations are read-only and O(resources) thanks to the network's
//! load index. Trial moves are priced through [`move_delta`] instead of the
//! mutate-evaluate-revert pattern, so a trial can never leave the graph in
//! a half-moved state.

use crate::network::{Network, ResourceId, SiteId};

/// Sum of absolute deviations of each resource's utilization from the mean
/// utilization. 0 when the network has no resources.
pub fn dispersion(net: &Network) -> f64 {
    let n = net.resource_count();
    if n == 0 {
        return 0.0;
    }
    let mean = net
        .resources()
        .map(|(id, _)| net.utilization(id))
        .sum::<f64>()
        / n as f64;
    net.resources()
        .map(|(id, _)| (net.utilization(id) - mean).abs())
        .sum()
}

/// Sum of each resource's utilization excess beyond 1.0.
pub fn surcharge(net: &Network) -> f64 {
    net.resources()
        .map(|(id, _)| (net.utilization(id) - 1.0).max(0.0))
        .sum()
}

/// Total cost of the current assignment: `dispersion + λ × surcharge`.
pub fn total_cost(net: &Network) -> f64 {
    dispersion(net) + net.penalty() * surcharge(net)
}

/// Cost change of reassigning `site` to `to`, without mutating the graph.
///
/// Only the loads of the site's current resource and of `to` differ in the
/// hypothetical state; the dispersion and surcharge sums are re-walked with
/// those two loads adjusted. 0 when the site is already attached to `to`.
pub fn move_delta(net: &Network, site: SiteId, to: ResourceId) -> f64 {
    let from = net.assignment(site);
    if from == Some(to) {
        return 0.0;
    }
    let n = net.resource_count();
    if n == 0 {
        return 0.0;
    }

    let demand = i64::from(net.site(site).demand());
    let moved_utilization = |id: ResourceId| {
        let mut load = i64::from(net.load(id));
        if from == Some(id) {
            load -= demand;
        }
        if id == to {
            load += demand;
        }
        let capacity = net.resource(id).capacity();
        if capacity == 0 {
            0.0
        } else {
            load as f64 / f64::from(capacity)
        }
    };

    let mean = net
        .resources()
        .map(|(id, _)| moved_utilization(id))
        .sum::<f64>()
        / n as f64;
    let mut new_dispersion = 0.0;
    let mut new_surcharge = 0.0;
    for (id, _) in net.resources() {
        let u = moved_utilization(id);
        new_dispersion += (u - mean).abs();
        new_surcharge += (u - 1.0).max(0.0);
    }

    new_dispersion + net.penalty() * new_surcharge - total_cost(net)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::ConsumptionTier;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn overloaded() -> Network {
        // G1 cap 10 carrying 5×10 units, G2 cap 100 empty
        let mut net = Network::default();
        net.add_resource("g1", 10).unwrap();
        net.add_resource("g2", 100).unwrap();
        for i in 0..5 {
            net.add_site(&format!("m{i}"), ConsumptionTier::Low).unwrap();
            net.connect(&format!("m{i}"), "g1").unwrap();
        }
        net
    }

    #[test]
    fn test_empty_network_costs_nothing() {
        let net = Network::default();
        assert_eq!(dispersion(&net), 0.0);
        assert_eq!(surcharge(&net), 0.0);
        assert_eq!(total_cost(&net), 0.0);
    }

    #[test]
    fn test_hand_computed_cost() {
        let net = overloaded();
        // u1 = 50/10 = 5, u2 = 0, mean = 2.5
        assert!((dispersion(&net) - 5.0).abs() < 1e-12);
        assert!((surcharge(&net) - 4.0).abs() < 1e-12);
        assert!((total_cost(&net) - (5.0 + 10.0 * 4.0)).abs() < 1e-12);
    }

    #[test]
    fn test_single_resource_has_zero_dispersion() {
        let mut net = Network::default();
        net.add_resource("g1", 100).unwrap();
        net.add_site("m1", ConsumptionTier::High).unwrap();
        net.connect("m1", "g1").unwrap();
        assert_eq!(dispersion(&net), 0.0);
        assert_eq!(total_cost(&net), 0.0);
    }

    #[test]
    fn test_cost_is_pure() {
        let net = overloaded();
        assert_eq!(total_cost(&net), total_cost(&net));
    }

    #[test]
    fn test_move_delta_matches_recompute() {
        let mut net = overloaded();
        let m0 = net.site_id("m0").unwrap();
        let g2 = net.resource_id("g2").unwrap();

        let before = total_cost(&net);
        let delta = move_delta(&net, m0, g2);
        assert_eq!(total_cost(&net), before, "delta evaluation must not mutate");

        net.reassign(m0, g2).unwrap();
        assert!((total_cost(&net) - (before + delta)).abs() < 1e-9);
        assert!(delta < 0.0, "relieving an overloaded resource must improve");
    }

    #[test]
    fn test_move_delta_to_current_resource_is_zero() {
        let net = overloaded();
        let m0 = net.site_id("m0").unwrap();
        let g1 = net.resource_id("g1").unwrap();
        assert_eq!(move_delta(&net, m0, g1), 0.0);
    }

    fn random_network(seed: u64, sites: usize, resources: usize) -> Network {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut net = Network::default();
        for r in 0..resources {
            net.add_resource(&format!("g{r}"), rng.random_range(10..200)).unwrap();
        }
        let tiers = [
            ConsumptionTier::Low,
            ConsumptionTier::Normal,
            ConsumptionTier::High,
        ];
        for s in 0..sites {
            let site = net.add_site(&format!("m{s}"), tiers[rng.random_range(0..3)]).unwrap();
            let resource = crate::network::ResourceId(rng.random_range(0..resources));
            net.attach(site, resource).unwrap();
        }
        net
    }

    proptest! {
        #[test]
        fn prop_move_delta_agrees_with_recompute(
            seed in 0u64..500,
            site in 0usize..12,
            resource in 0usize..4,
        ) {
            let mut net = random_network(seed, 12, 4);
            let site = SiteId(site);
            let to = ResourceId(resource);

            let before = total_cost(&net);
            let delta = move_delta(&net, site, to);
            net.reassign(site, to).unwrap();
            prop_assert!((total_cost(&net) - (before + delta)).abs() < 1e-9);
        }

        #[test]
        fn prop_dispersion_and_surcharge_non_negative(seed in 0u64..500) {
            let net = random_network(seed, 10, 3);
            prop_assert!(dispersion(&net) >= 0.0);
            prop_assert!(surcharge(&net) >= 0.0);
            prop_assert!(total_cost(&net) >= 0.0);
        }
    }
}
