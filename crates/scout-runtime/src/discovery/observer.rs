/// Pipeline stage, as reported to a [`DiscoveryObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Membership queries against seeds.
    SeedFetch,
    /// Liveness probes.
    Probe,
    /// Membership queries against active peers.
    Expansion,
}

impl Stage {
    /// Human-readable label for progress output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SeedFetch => "Fetching nodes from initial RPCs",
            Self::Probe => "Checking nodes",
            Self::Expansion => "Fetching new nodes",
        }
    }

    /// Short name for log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SeedFetch => "seed_fetch",
            Self::Probe => "probe",
            Self::Expansion => "expansion",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives progress events from the orchestrator.
///
/// `task_finished` is called from worker tasks, so implementations must be
/// cheap and thread-safe.
pub trait DiscoveryObserver: Send + Sync {
    /// A stage is about to dispatch `total` tasks.
    fn stage_started(&self, _stage: Stage, _total: usize) {}

    /// One task of the stage completed.
    fn task_finished(&self, _stage: Stage) {}

    /// Every task of the stage completed.
    fn stage_finished(&self, _stage: Stage) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DiscoveryObserver for NoopObserver {}
