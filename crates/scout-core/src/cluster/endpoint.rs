use std::collections::BTreeSet;

/// Service role a cluster member can expose on a `host:port`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EndpointKind {
    Rpc,
    Tvu,
    Gossip,
    ServeRepair,
    Pubsub,
}

impl EndpointKind {
    /// Lookup order used when deriving a node's IP address.
    pub const PRIORITY: [EndpointKind; 5] = [
        Self::Rpc,
        Self::Tvu,
        Self::Gossip,
        Self::ServeRepair,
        Self::Pubsub,
    ];

    /// Convert to the wire field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rpc => "rpc",
            Self::Tvu => "tvu",
            Self::Gossip => "gossip",
            Self::ServeRepair => "serveRepair",
            Self::Pubsub => "pubsub",
        }
    }
}

impl std::fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `host:port` addresses a member advertises, one slot per endpoint kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoints {
    pub rpc: Option<String>,
    pub tvu: Option<String>,
    pub gossip: Option<String>,
    pub serve_repair: Option<String>,
    pub pubsub: Option<String>,
    /// Kinds whose key appeared in the peer's report, even as `null`.
    reported: BTreeSet<EndpointKind>,
}

impl Endpoints {
    /// Get the address for an endpoint kind. Empty strings count as absent.
    pub fn get(&self, kind: EndpointKind) -> Option<&str> {
        let slot = match kind {
            EndpointKind::Rpc => &self.rpc,
            EndpointKind::Tvu => &self.tvu,
            EndpointKind::Gossip => &self.gossip,
            EndpointKind::ServeRepair => &self.serve_repair,
            EndpointKind::Pubsub => &self.pubsub,
        };
        slot.as_deref().filter(|addr| !addr.is_empty())
    }

    /// Set the address for an endpoint kind.
    pub fn set(&mut self, kind: EndpointKind, addr: Option<String>) {
        let slot = match kind {
            EndpointKind::Rpc => &mut self.rpc,
            EndpointKind::Tvu => &mut self.tvu,
            EndpointKind::Gossip => &mut self.gossip,
            EndpointKind::ServeRepair => &mut self.serve_repair,
            EndpointKind::Pubsub => &mut self.pubsub,
        };
        *slot = addr;
    }

    /// Set an endpoint from a peer report, remembering that its key was sent.
    pub fn report(&mut self, kind: EndpointKind, addr: Option<String>) {
        self.reported.insert(kind);
        self.set(kind, addr);
    }

    /// Value to write under the kind's key: `None` omits the key, `Some(None)`
    /// writes an explicit `null` the peer sent.
    pub fn wire_value(&self, kind: EndpointKind) -> Option<Option<String>> {
        let slot = match kind {
            EndpointKind::Rpc => &self.rpc,
            EndpointKind::Tvu => &self.tvu,
            EndpointKind::Gossip => &self.gossip,
            EndpointKind::ServeRepair => &self.serve_repair,
            EndpointKind::Pubsub => &self.pubsub,
        };
        match slot {
            Some(addr) => Some(Some(addr.clone())),
            None if self.reported.contains(&kind) => Some(None),
            None => None,
        }
    }

    /// Check whether any endpoint is populated.
    pub fn is_empty(&self) -> bool {
        EndpointKind::PRIORITY.iter().all(|k| self.get(*k).is_none())
    }

    /// Copy over every endpoint `other` knows about.
    pub fn merge_from(&mut self, other: &Endpoints) {
        for kind in EndpointKind::PRIORITY {
            if let Some(addr) = other.get(kind) {
                self.set(kind, Some(addr.to_string()));
            }
        }
        self.reported.extend(other.reported.iter().copied());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(EndpointKind::ServeRepair.as_str(), "serveRepair");
        assert_eq!(EndpointKind::Rpc.to_string(), "rpc");
    }

    #[test]
    fn test_wire_value_distinguishes_null_from_missing() {
        let mut endpoints = Endpoints::default();
        endpoints.report(EndpointKind::Rpc, None);
        endpoints.report(EndpointKind::Gossip, Some("1.1.1.1:8001".to_string()));

        assert_eq!(endpoints.wire_value(EndpointKind::Rpc), Some(None));
        assert_eq!(
            endpoints.wire_value(EndpointKind::Gossip),
            Some(Some("1.1.1.1:8001".to_string()))
        );
        assert_eq!(endpoints.wire_value(EndpointKind::Tvu), None);
    }

    #[test]
    fn test_empty_string_is_absent() {
        let endpoints = Endpoints {
            rpc: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(endpoints.get(EndpointKind::Rpc), None);
        assert!(endpoints.is_empty());
    }

    #[test]
    fn test_merge_keeps_existing_when_other_is_null() {
        let mut left = Endpoints {
            rpc: Some("10.0.0.1:8899".to_string()),
            gossip: Some("10.0.0.1:8001".to_string()),
            ..Default::default()
        };
        let right = Endpoints {
            tvu: Some("10.0.0.1:8003".to_string()),
            gossip: Some("10.0.0.2:8001".to_string()),
            ..Default::default()
        };

        left.merge_from(&right);

        assert_eq!(left.rpc.as_deref(), Some("10.0.0.1:8899"));
        assert_eq!(left.tvu.as_deref(), Some("10.0.0.1:8003"));
        assert_eq!(left.gossip.as_deref(), Some("10.0.0.2:8001"));
    }
}
