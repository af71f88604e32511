pub mod discovery;
pub mod storage;
pub mod transport;

pub use discovery::{
    DiscoveryObserver, DiscoveryOrchestrator, DiscoveryReport, ExpansionRound, FetchPolicy,
    LivenessProbe, MembershipFetcher, NoopObserver, ProbeResult, Stage, WorkerPool,
};
pub use storage::NodeStore;
pub use transport::HttpTransport;
