//! Capture and restore of a full assignment state.

use crate::network::{ConnectionError, Network, ResourceId, SiteId};

/// An ordered record of every site's attachment at capture time.
///
/// Restoring walks the recorded pairs and re-attaches only the sites whose
/// live assignment differs, through the network's own attach/detach
/// primitives, so the relation comes back fully consistent no matter how
/// many uncoordinated mutations happened in between. Restoring twice in a
/// row is a no-op after the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<(SiteId, Option<ResourceId>)>,
}

impl Snapshot {
    /// Records the current assignment of every site.
    pub fn capture(net: &Network) -> Self {
        Self {
            entries: net
                .sites()
                .map(|(id, _)| (id, net.assignment(id)))
                .collect(),
        }
    }

    /// Rewinds the network's assignment to the recorded state.
    pub fn restore(&self, net: &mut Network) -> Result<(), ConnectionError> {
        for &(site, recorded) in &self.entries {
            if net.assignment(site) == recorded {
                continue;
            }
            net.detach(site);
            if let Some(resource) = recorded {
                net.attach(site, resource)?;
            }
        }
        Ok(())
    }

    /// Number of recorded sites.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
