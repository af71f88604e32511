mod endpoint;
mod node;
mod set;

pub mod resolver;

pub use endpoint::{EndpointKind, Endpoints};
pub use node::{NodeIdentity, NodeRecord};
pub use set::NodeSet;
