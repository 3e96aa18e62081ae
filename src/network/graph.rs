//! The [`Network`] container and its mutation primitives.

use std::collections::HashMap;

use super::error::{ConfigurationError, ConnectionError};
use super::types::{ConsumptionTier, Resource, ResourceId, Site, SiteId};

/// Default overload penalty weight λ.
pub(crate) const DEFAULT_PENALTY: f64 = 10.0;

/// An assignment graph of demand sites and capacity-bounded resources.
///
/// The site→resource assignment table is the single source of truth for the
/// connection relation; per-resource loads are a derived index maintained by
/// every mutation. A site is attached to at most one resource at any instant,
/// and there is no second copy of the relation that could fall out of sync.
///
/// Identifiers are normalized to upper case on insertion and lookup.
#[derive(Debug, Clone)]
pub struct Network {
    sites: Vec<Site>,
    resources: Vec<Resource>,
    site_index: HashMap<String, SiteId>,
    resource_index: HashMap<String, ResourceId>,
    /// Source of truth for the connection relation, indexed by site.
    assignment: Vec<Option<ResourceId>>,
    /// Derived: sum of attached sites' demands, indexed by resource.
    loads: Vec<u32>,
    penalty: f64,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            sites: Vec::new(),
            resources: Vec::new(),
            site_index: HashMap::new(),
            resource_index: HashMap::new(),
            assignment: Vec::new(),
            loads: Vec::new(),
            penalty: DEFAULT_PENALTY,
        }
    }
}

impl Network {
    /// Creates an empty network with the given overload penalty weight λ.
    pub fn new(penalty: f64) -> Result<Self, ConfigurationError> {
        if !penalty.is_finite() || penalty <= 0.0 {
            return Err(ConfigurationError::InvalidPenalty(penalty));
        }
        Ok(Self {
            penalty,
            ..Self::default()
        })
    }

    /// The overload penalty weight λ.
    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    // ---- construction -----------------------------------------------------

    /// Adds a resource, or updates the capacity of an existing one with the
    /// same name.
    pub fn add_resource(
        &mut self,
        name: &str,
        capacity: u32,
    ) -> Result<ResourceId, ConfigurationError> {
        let name = normalize(name)?;
        if capacity == 0 {
            return Err(ConfigurationError::InvalidCapacity(capacity));
        }
        if let Some(&id) = self.resource_index.get(&name) {
            self.resources[id.0].capacity = capacity;
            return Ok(id);
        }
        let id = ResourceId(self.resources.len());
        self.resources.push(Resource { name: name.clone(), capacity });
        self.loads.push(0);
        self.resource_index.insert(name, id);
        Ok(id)
    }

    /// Adds a site, or updates the tier of an existing one with the same
    /// name (its resource's load is adjusted accordingly).
    pub fn add_site(
        &mut self,
        name: &str,
        tier: ConsumptionTier,
    ) -> Result<SiteId, ConfigurationError> {
        let name = normalize(name)?;
        if let Some(&id) = self.site_index.get(&name) {
            let old = self.sites[id.0].tier;
            if old != tier {
                if let Some(rid) = self.assignment[id.0] {
                    self.loads[rid.0] = self.loads[rid.0] - old.demand() + tier.demand();
                }
                self.sites[id.0].tier = tier;
            }
            return Ok(id);
        }
        let id = SiteId(self.sites.len());
        self.sites.push(Site { name: name.clone(), tier });
        self.assignment.push(None);
        self.site_index.insert(name, id);
        Ok(id)
    }

    /// Replaces the capacity of an existing resource.
    pub fn set_capacity(
        &mut self,
        resource: ResourceId,
        capacity: u32,
    ) -> Result<(), ConfigurationError> {
        if capacity == 0 {
            return Err(ConfigurationError::InvalidCapacity(capacity));
        }
        self.resources[resource.0].capacity = capacity;
        Ok(())
    }

    // ---- lookup -----------------------------------------------------------

    /// Resolves a site name (case-insensitive).
    pub fn site_id(&self, name: &str) -> Option<SiteId> {
        self.site_index.get(&name.trim().to_ascii_uppercase()).copied()
    }

    /// Resolves a resource name (case-insensitive).
    pub fn resource_id(&self, name: &str) -> Option<ResourceId> {
        self.resource_index
            .get(&name.trim().to_ascii_uppercase())
            .copied()
    }

    /// The site behind an id issued by this network.
    pub fn site(&self, id: SiteId) -> &Site {
        &self.sites[id.0]
    }

    /// The resource behind an id issued by this network.
    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.resources[id.0]
    }

    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// All sites in insertion order.
    pub fn sites(&self) -> impl Iterator<Item = (SiteId, &Site)> {
        self.sites.iter().enumerate().map(|(i, s)| (SiteId(i), s))
    }

    /// All resources in insertion order.
    pub fn resources(&self) -> impl Iterator<Item = (ResourceId, &Resource)> {
        self.resources
            .iter()
            .enumerate()
            .map(|(i, r)| (ResourceId(i), r))
    }

    // ---- assignment relation ----------------------------------------------

    /// The resource a site is currently attached to, if any.
    pub fn assignment(&self, site: SiteId) -> Option<ResourceId> {
        self.assignment[site.0]
    }

    /// Current load of a resource (sum of attached sites' demands).
    pub fn load(&self, resource: ResourceId) -> u32 {
        self.loads[resource.0]
    }

    /// Current utilization of a resource: load / capacity, 0 when the
    /// capacity is 0.
    pub fn utilization(&self, resource: ResourceId) -> f64 {
        let capacity = self.resources[resource.0].capacity;
        if capacity == 0 {
            0.0
        } else {
            f64::from(self.loads[resource.0]) / f64::from(capacity)
        }
    }

    /// Sites currently attached to a resource.
    pub fn members(&self, resource: ResourceId) -> impl Iterator<Item = SiteId> + '_ {
        self.assignment
            .iter()
            .enumerate()
            .filter(move |(_, r)| **r == Some(resource))
            .map(|(i, _)| SiteId(i))
    }

    /// Sites with no resource. A ready network has none.
    pub fn unassigned_sites(&self) -> impl Iterator<Item = SiteId> + '_ {
        self.assignment
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_none())
            .map(|(i, _)| SiteId(i))
    }

    /// Whether every site is attached to a resource.
    pub fn is_ready(&self) -> bool {
        self.assignment.iter().all(Option::is_some)
    }

    // ---- mutation primitives ----------------------------------------------

    /// Attaches a site to a resource.
    ///
    /// A no-op if the site is already attached to that same resource; fails
    /// without touching the graph if it is attached to a different one. The
    /// assignment table and the load index are updated together, so no
    /// partially-linked state is ever observable.
    pub fn attach(&mut self, site: SiteId, resource: ResourceId) -> Result<(), ConnectionError> {
        match self.assignment[site.0] {
            Some(current) if current == resource => Ok(()),
            Some(current) => Err(ConnectionError::AlreadyAttached {
                site: self.sites[site.0].name.clone(),
                resource: self.resources[current.0].name.clone(),
            }),
            None => {
                self.assignment[site.0] = Some(resource);
                self.loads[resource.0] += self.sites[site.0].demand();
                Ok(())
            }
        }
    }

    /// Detaches a site from its resource, returning the previous attachment.
    /// A no-op (returning `None`) if the site is already detached.
    pub fn detach(&mut self, site: SiteId) -> Option<ResourceId> {
        let previous = self.assignment[site.0].take();
        if let Some(resource) = previous {
            self.loads[resource.0] -= self.sites[site.0].demand();
        }
        previous
    }

    /// Moves a site to `to`, detaching it from its current resource first.
    ///
    /// On failure the site's original attachment is restored before the
    /// error propagates, so the relation never ends up half-updated.
    pub fn reassign(&mut self, site: SiteId, to: ResourceId) -> Result<(), ConnectionError> {
        let previous = self.detach(site);
        match self.attach(site, to) {
            Ok(()) => Ok(()),
            Err(err) => {
                if let Some(previous) = previous {
                    self.attach(site, previous)?;
                }
                Err(err)
            }
        }
    }

    // ---- by-name connection management ------------------------------------

    /// Connects a site and a resource given their names, in either order.
    pub fn connect(&mut self, first: &str, second: &str) -> Result<(), ConnectionError> {
        let (site, resource) = self.resolve_pair(first, second)?;
        self.attach(site, resource)
    }

    /// Removes an existing connection given the two names, in either order.
    pub fn disconnect(&mut self, first: &str, second: &str) -> Result<(), ConnectionError> {
        let (site, resource) = self.resolve_pair(first, second)?;
        if self.assignment[site.0] == Some(resource) {
            self.detach(site);
            Ok(())
        } else {
            Err(ConnectionError::NotAttached {
                site: self.sites[site.0].name.clone(),
                resource: self.resources[resource.0].name.clone(),
            })
        }
    }

    fn resolve_pair(
        &self,
        first: &str,
        second: &str,
    ) -> Result<(SiteId, ResourceId), ConnectionError> {
        if let (Some(s), Some(r)) = (self.site_id(first), self.resource_id(second)) {
            return Ok((s, r));
        }
        if let (Some(s), Some(r)) = (self.site_id(second), self.resource_id(first)) {
            return Ok((s, r));
        }
        Err(ConnectionError::UnknownPair(
            first.trim().to_ascii_uppercase(),
            second.trim().to_ascii_uppercase(),
        ))
    }
}

fn normalize(name: &str) -> Result<String, ConfigurationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigurationError::EmptyIdentifier);
    }
    Ok(name.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Network {
        let mut net = Network::default();
        net.add_resource("g1", 100).unwrap();
        net.add_resource("g2", 50).unwrap();
        net.add_site("m1", ConsumptionTier::Low).unwrap();
        net.add_site("m2", ConsumptionTier::High).unwrap();
        net
    }

    #[test]
    fn test_new_rejects_non_positive_penalty() {
        assert_eq!(
            Network::new(0.0).unwrap_err(),
            ConfigurationError::InvalidPenalty(0.0)
        );
        assert!(Network::new(-3.0).is_err());
        assert!(Network::new(f64::NAN).is_err());
        assert!((Network::default().penalty() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_add_rejects_empty_identifier() {
        let mut net = Network::default();
        assert_eq!(
            net.add_resource("  ", 10).unwrap_err(),
            ConfigurationError::EmptyIdentifier
        );
        assert_eq!(
            net.add_site("", ConsumptionTier::Low).unwrap_err(),
            ConfigurationError::EmptyIdentifier
        );
    }

    #[test]
    fn test_add_resource_rejects_zero_capacity() {
        let mut net = Network::default();
        assert_eq!(
            net.add_resource("g1", 0).unwrap_err(),
            ConfigurationError::InvalidCapacity(0)
        );
    }

    #[test]
    fn test_names_are_normalized() {
        let net = sample();
        assert_eq!(net.site_id("m1"), net.site_id(" M1 "));
        assert_eq!(net.resource_id("G2"), net.resource_id("g2"));
        assert_eq!(net.site(net.site_id("m1").unwrap()).name(), "M1");
    }

    #[test]
    fn test_add_existing_resource_updates_capacity() {
        let mut net = sample();
        let id = net.add_resource("G1", 33).unwrap();
        assert_eq!(net.resource(id).capacity(), 33);
        assert_eq!(net.resource_count(), 2);
    }

    #[test]
    fn test_add_existing_site_updates_tier_and_load() {
        let mut net = sample();
        let m1 = net.site_id("m1").unwrap();
        let g1 = net.resource_id("g1").unwrap();
        net.attach(m1, g1).unwrap();
        assert_eq!(net.load(g1), 10);

        net.add_site("m1", ConsumptionTier::High).unwrap();
        assert_eq!(net.site_count(), 2);
        assert_eq!(net.load(g1), 40);
        assert_eq!(net.assignment(m1), Some(g1));
    }

    #[test]
    fn test_attach_updates_load() {
        let mut net = sample();
        let m2 = net.site_id("m2").unwrap();
        let g2 = net.resource_id("g2").unwrap();
        net.attach(m2, g2).unwrap();
        assert_eq!(net.load(g2), 40);
        assert_eq!(net.assignment(m2), Some(g2));
        assert_eq!(net.members(g2).collect::<Vec<_>>(), vec![m2]);
    }

    #[test]
    fn test_attach_same_resource_is_noop() {
        let mut net = sample();
        let m1 = net.site_id("m1").unwrap();
        let g1 = net.resource_id("g1").unwrap();
        net.attach(m1, g1).unwrap();
        net.attach(m1, g1).unwrap();
        assert_eq!(net.load(g1), 10);
    }

    #[test]
    fn test_attach_elsewhere_is_rejected() {
        let mut net = sample();
        let m1 = net.site_id("m1").unwrap();
        let g1 = net.resource_id("g1").unwrap();
        let g2 = net.resource_id("g2").unwrap();
        net.attach(m1, g1).unwrap();

        let err = net.attach(m1, g2).unwrap_err();
        assert_eq!(
            err,
            ConnectionError::AlreadyAttached {
                site: "M1".to_string(),
                resource: "G1".to_string(),
            }
        );
        // graph unchanged
        assert_eq!(net.assignment(m1), Some(g1));
        assert_eq!(net.load(g1), 10);
        assert_eq!(net.load(g2), 0);
    }

    #[test]
    fn test_detach_is_noop_when_detached() {
        let mut net = sample();
        let m1 = net.site_id("m1").unwrap();
        assert_eq!(net.detach(m1), None);
    }

    #[test]
    fn test_reassign_moves_load() {
        let mut net = sample();
        let m2 = net.site_id("m2").unwrap();
        let g1 = net.resource_id("g1").unwrap();
        let g2 = net.resource_id("g2").unwrap();
        net.attach(m2, g1).unwrap();

        net.reassign(m2, g2).unwrap();
        assert_eq!(net.assignment(m2), Some(g2));
        assert_eq!(net.load(g1), 0);
        assert_eq!(net.load(g2), 40);
    }

    #[test]
    fn test_connect_accepts_either_order() {
        let mut net = sample();
        net.connect("g1", "m1").unwrap();
        net.connect("m2", "g1").unwrap();
        let g1 = net.resource_id("g1").unwrap();
        assert_eq!(net.load(g1), 50);
    }

    #[test]
    fn test_connect_unknown_pair() {
        let mut net = sample();
        let err = net.connect("m1", "nope").unwrap_err();
        assert_eq!(
            err,
            ConnectionError::UnknownPair("M1".to_string(), "NOPE".to_string())
        );
    }

    #[test]
    fn test_disconnect_requires_existing_connection() {
        let mut net = sample();
        net.connect("m1", "g1").unwrap();
        assert!(net.disconnect("m1", "g2").is_err());
        net.disconnect("g1", "m1").unwrap();
        assert_eq!(net.unassigned_sites().count(), 2);
    }

    #[test]
    fn test_readiness() {
        let mut net = sample();
        assert!(!net.is_ready());
        net.connect("m1", "g1").unwrap();
        net.connect("m2", "g2").unwrap();
        assert!(net.is_ready());
        assert_eq!(net.unassigned_sites().count(), 0);
    }

    #[test]
    fn test_utilization() {
        let mut net = sample();
        let g2 = net.resource_id("g2").unwrap();
        assert_eq!(net.utilization(g2), 0.0);
        net.connect("m2", "g2").unwrap();
        assert!((net.utilization(g2) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_set_capacity() {
        let mut net = sample();
        let g1 = net.resource_id("g1").unwrap();
        net.set_capacity(g1, 10).unwrap();
        assert_eq!(net.resource(g1).capacity(), 10);
        assert!(net.set_capacity(g1, 0).is_err());
    }
}
