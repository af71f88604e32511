//! The discovery pipeline.
//!
//! Stages run strictly one after another. Inside a stage, a [`WorkerPool`]
//! fans independent per-peer tasks out and hands every result back to the
//! [`DiscoveryOrchestrator`], which does all merging on its own task.

mod fetcher;
mod observer;
mod orchestrator;
mod pool;
mod probe;

pub use fetcher::{FetchPolicy, MembershipFetcher};
pub use observer::{DiscoveryObserver, NoopObserver, Stage};
pub use orchestrator::{DiscoveryOrchestrator, DiscoveryReport, ExpansionRound};
pub use pool::WorkerPool;
pub use probe::{probe_url, LivenessProbe, ProbeResult};
