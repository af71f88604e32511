mod store;

pub use store::{encode_nodes, seed_url, NodeStore};
