use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::endpoint::{EndpointKind, Endpoints};
use super::resolver;

/// Stable identity of a cluster member (its public key).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeIdentity(pub String);

impl NodeIdentity {
    /// Create from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One cluster member as reported by a membership query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireNode", into = "WireNode")]
pub struct NodeRecord {
    /// Unique identity, the deduplication key.
    pub identity: NodeIdentity,
    /// Advertised service addresses.
    pub endpoints: Endpoints,
    /// Round-trip latency of the last successful probe, in milliseconds.
    pub latency_ms: Option<f64>,
    /// Whether the node answered a liveness probe in this run.
    pub is_active: bool,
    /// Every other field the peer reported, kept verbatim.
    pub extra: Map<String, Value>,
}

impl NodeRecord {
    /// Create a record with no endpoints.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: NodeIdentity::new(identity),
            endpoints: Endpoints::default(),
            latency_ms: None,
            is_active: false,
            extra: Map::new(),
        }
    }

    /// Builder-style endpoint setter.
    pub fn with_endpoint(mut self, kind: EndpointKind, addr: impl Into<String>) -> Self {
        self.endpoints.set(kind, Some(addr.into()));
        self
    }

    /// The advertised `rpc` endpoint, if any.
    pub fn rpc(&self) -> Option<&str> {
        self.endpoints.get(EndpointKind::Rpc)
    }

    /// Host derived from the first populated endpoint.
    pub fn resolved_ip(&self) -> Option<&str> {
        resolver::resolve_host(&self.endpoints)
    }

    /// Port the liveness probe should use.
    pub fn probed_port(&self, default_port: u16) -> u16 {
        resolver::probe_port(&self.endpoints, default_port)
    }

    /// Record a successful probe at `ip:port`.
    ///
    /// Nodes that did not advertise `rpc` get one synthesized from the probed
    /// address so later runs can use them as seeds.
    pub fn mark_active(&mut self, ip: &str, port: u16, latency_ms: f64) {
        self.is_active = true;
        self.latency_ms = Some(latency_ms);
        if self.rpc().is_none() {
            self.endpoints
                .set(EndpointKind::Rpc, Some(format!("{}:{}", ip, port)));
        }
    }

    /// Fold another report of the same identity into this one.
    ///
    /// Non-null fields of `other` win; null fields never erase known values.
    pub fn merge(&mut self, other: NodeRecord) {
        debug_assert_eq!(self.identity, other.identity);
        self.endpoints.merge_from(&other.endpoints);
        if other.latency_ms.is_some() {
            self.latency_ms = other.latency_ms;
        }
        self.is_active |= other.is_active;
        for (key, value) in other.extra {
            if !value.is_null() {
                self.extra.insert(key, value);
            } else {
                self.extra.entry(key).or_insert(Value::Null);
            }
        }
    }
}

/// JSON shape of a node object on the wire and on disk.
///
/// Endpoint keys are written back only if the peer sent them, so a stored
/// object keeps the shape it arrived in.
#[derive(Serialize, Deserialize)]
struct WireNode {
    #[serde(alias = "identity")]
    pubkey: NodeIdentity,
    #[serde(default, deserialize_with = "reported", skip_serializing_if = "Option::is_none")]
    rpc: Option<Option<String>>,
    #[serde(default, deserialize_with = "reported", skip_serializing_if = "Option::is_none")]
    tvu: Option<Option<String>>,
    #[serde(default, deserialize_with = "reported", skip_serializing_if = "Option::is_none")]
    gossip: Option<Option<String>>,
    #[serde(
        rename = "serveRepair",
        alias = "serve_repair",
        default,
        deserialize_with = "reported",
        skip_serializing_if = "Option::is_none"
    )]
    serve_repair: Option<Option<String>>,
    #[serde(default, deserialize_with = "reported", skip_serializing_if = "Option::is_none")]
    pubsub: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    latency: Option<f64>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// A present key, `null` or not, becomes `Some`; a missing key stays `None`
/// through `#[serde(default)]`.
fn reported<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl From<WireNode> for NodeRecord {
    fn from(wire: WireNode) -> Self {
        let mut endpoints = Endpoints::default();
        for (kind, value) in [
            (EndpointKind::Rpc, wire.rpc),
            (EndpointKind::Tvu, wire.tvu),
            (EndpointKind::Gossip, wire.gossip),
            (EndpointKind::ServeRepair, wire.serve_repair),
            (EndpointKind::Pubsub, wire.pubsub),
        ] {
            if let Some(addr) = value {
                endpoints.report(kind, addr);
            }
        }

        Self {
            identity: wire.pubkey,
            endpoints,
            latency_ms: wire.latency,
            is_active: false,
            extra: wire.extra,
        }
    }
}

impl From<NodeRecord> for WireNode {
    fn from(node: NodeRecord) -> Self {
        Self {
            pubkey: node.identity,
            rpc: node.endpoints.wire_value(EndpointKind::Rpc),
            tvu: node.endpoints.wire_value(EndpointKind::Tvu),
            gossip: node.endpoints.wire_value(EndpointKind::Gossip),
            serve_repair: node.endpoints.wire_value(EndpointKind::ServeRepair),
            pubsub: node.endpoints.wire_value(EndpointKind::Pubsub),
            latency: node.latency_ms,
            extra: node.extra,
        }
    }
}
