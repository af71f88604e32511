use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use scout_core::rpc::RpcTransport;
use scout_core::{NodeIdentity, NodeRecord, NodeSet, Result, ScoutConfig};

use super::fetcher::{FetchPolicy, MembershipFetcher};
use super::observer::{DiscoveryObserver, NoopObserver, Stage};
use super::pool::WorkerPool;
use super::probe::LivenessProbe;
use crate::storage::{seed_url, NodeStore};

/// Counters for one expansion round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpansionRound {
    /// 1-based round number.
    pub round: u32,
    /// Active peers asked for membership.
    pub queried: usize,
    /// Identities seen for the first time this round.
    pub new_nodes: usize,
    /// New identities that answered the liveness probe.
    pub activated: usize,
}

/// Summary of a finished discovery run.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Distinct seed URLs queried in the first stage.
    pub seeds: usize,
    /// Distinct identities reported by the seeds.
    pub discovered: usize,
    /// Nodes handed to the liveness probe, across all stages.
    pub probed: usize,
    /// Size of the persisted active set.
    pub active: usize,
    pub rounds: Vec<ExpansionRound>,
    /// The persisted active set, ordered by identity.
    pub active_nodes: Vec<NodeRecord>,
}

impl DiscoveryReport {
    /// Wall-clock duration of the run.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// New identities found across every expansion round.
    pub fn expansion_new_nodes(&self) -> usize {
        self.rounds.iter().map(|r| r.new_nodes).sum()
    }
}

/// A node with a resolved probe address.
struct ProbeTarget {
    node: NodeRecord,
    ip: String,
    port: u16,
}

/// Drives one discovery run from seeds to the persisted active set.
pub struct DiscoveryOrchestrator {
    config: ScoutConfig,
    seed_fetcher: MembershipFetcher,
    expansion_fetcher: MembershipFetcher,
    probe: LivenessProbe,
    store: NodeStore,
    observer: Arc<dyn DiscoveryObserver>,
}

impl DiscoveryOrchestrator {
    /// Create an orchestrator that talks to peers through `transport`.
    pub fn new(config: ScoutConfig, transport: Arc<dyn RpcTransport>) -> Self {
        let seed_fetcher =
            MembershipFetcher::new(transport.clone(), FetchPolicy::seeds(&config.discovery));
        let expansion_fetcher =
            MembershipFetcher::new(transport.clone(), FetchPolicy::expansion(&config.discovery));
        let probe = LivenessProbe::new(transport, config.probe.timeout());
        let store = NodeStore::from_config(&config.storage);

        Self {
            config,
            seed_fetcher,
            expansion_fetcher,
            probe,
            store,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Report progress to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn DiscoveryObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Get the snapshot store.
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Run the full pipeline once.
    ///
    /// Peer failures are absorbed along the way. Only failing to write a
    /// snapshot aborts the run.
    pub async fn run(&self) -> Result<DiscoveryReport> {
        let run_id = Uuid::new_v4();
        self.run_inner(run_id)
            .instrument(tracing::info_span!("discovery", run_id = %run_id))
            .await
    }

    async fn run_inner(&self, run_id: Uuid) -> Result<DiscoveryReport> {
        let started_at = Utc::now();

        let seeds = self.seeds().await;
        let seed_count = seeds.len();
        tracing::info!(seeds = seed_count, "Starting discovery");

        let discovered = self.collect_membership(seeds).await.into_records();
        let discovered_count = discovered.len();
        self.store.save_full_cluster(&discovered).await?;
        tracing::info!(
            nodes = discovered_count,
            path = %self.store.full_cluster_path().display(),
            "Saved discovered nodes"
        );

        let targets = self.probe_targets(discovered);
        let mut probed = targets.len();
        let mut active: NodeSet = self.probe_nodes(targets).await.into_iter().collect();
        tracing::info!(probed, active = active.len(), "Liveness check complete");

        let mut rounds = Vec::new();
        let mut seen_in_expansion: HashSet<NodeIdentity> = HashSet::new();
        let mut frontier: Vec<NodeRecord> = active.iter().cloned().collect();

        for round in 1..=self.config.discovery.max_expansion_rounds {
            if frontier.is_empty() {
                break;
            }

            let queried = frontier.len();
            let new_nodes: Vec<NodeRecord> = self
                .expand(&frontier)
                .await
                .into_iter()
                .filter(|n| !active.contains(&n.identity))
                .filter(|n| seen_in_expansion.insert(n.identity.clone()))
                .collect();
            let new_count = new_nodes.len();

            if new_nodes.is_empty() {
                tracing::info!(round, queried, "No new nodes found");
                rounds.push(ExpansionRound {
                    round,
                    queried,
                    new_nodes: 0,
                    activated: 0,
                });
                break;
            }

            let targets = self.probe_targets(new_nodes);
            probed += targets.len();
            let activated = self.probe_nodes(targets).await;
            tracing::info!(
                round,
                queried,
                new_nodes = new_count,
                activated = activated.len(),
                "Expansion round complete"
            );

            rounds.push(ExpansionRound {
                round,
                queried,
                new_nodes: new_count,
                activated: activated.len(),
            });
            active.extend(activated.iter().cloned());
            frontier = activated;
        }

        let active_nodes = active.into_records();
        self.store.save_active_nodes(&active_nodes).await?;
        tracing::info!(
            active = active_nodes.len(),
            path = %self.store.active_nodes_path().display(),
            "Saved active nodes"
        );

        Ok(DiscoveryReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            seeds: seed_count,
            discovered: discovered_count,
            probed,
            active: active_nodes.len(),
            rounds,
            active_nodes,
        })
    }

    /// Bootstrap endpoints followed by peers remembered from the last run,
    /// without duplicates.
    pub async fn seeds(&self) -> Vec<String> {
        let remembered = self.store.load_seed_endpoints().await;
        let mut seen = HashSet::new();
        self.config
            .discovery
            .bootstrap
            .iter()
            .cloned()
            .chain(remembered)
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }

    /// Ask every seed for membership and merge the answers.
    pub async fn collect_membership(&self, seeds: Vec<String>) -> NodeSet {
        self.fetch_all(
            Stage::SeedFetch,
            &self.seed_fetcher,
            self.config.discovery.fetch_workers,
            seeds,
        )
        .await
    }

    /// Ask each node in `frontier` for membership through its `rpc` endpoint.
    pub async fn expand(&self, frontier: &[NodeRecord]) -> NodeSet {
        let mut urls: Vec<String> = frontier
            .iter()
            .filter_map(|n| n.rpc())
            .map(seed_url)
            .collect();
        urls.sort();
        urls.dedup();

        self.fetch_all(
            Stage::Expansion,
            &self.expansion_fetcher,
            self.config.discovery.expansion_workers,
            urls,
        )
        .await
    }

    async fn fetch_all(
        &self,
        stage: Stage,
        fetcher: &MembershipFetcher,
        workers: usize,
        urls: Vec<String>,
    ) -> NodeSet {
        let results = WorkerPool::new(workers)
            .run(
                stage,
                urls,
                |url| {
                    let fetcher = fetcher.clone();
                    async move { fetcher.fetch(&url).await }
                },
                self.observer.clone(),
            )
            .await;

        NodeSet::merge(results)
    }

    fn probe_targets(&self, nodes: impl IntoIterator<Item = NodeRecord>) -> Vec<ProbeTarget> {
        let scan_null_rpc = self.config.discovery.scan_null_rpc;
        let default_port = self.config.probe.default_port;
        let mut skipped = 0usize;

        let targets: Vec<ProbeTarget> = nodes
            .into_iter()
            .filter_map(|node| {
                if !scan_null_rpc && node.rpc().is_none() {
                    skipped += 1;
                    return None;
                }
                let Some(ip) = node.resolved_ip().map(str::to_string) else {
                    skipped += 1;
                    return None;
                };
                let port = node.probed_port(default_port);
                Some(ProbeTarget { node, ip, port })
            })
            .collect();

        if skipped > 0 {
            tracing::debug!(skipped, "Excluded nodes from liveness check");
        }
        targets
    }

    /// Probe every target and return the ones that answered, updated with
    /// latency and a backfilled `rpc` endpoint.
    async fn probe_nodes(&self, targets: Vec<ProbeTarget>) -> Vec<NodeRecord> {
        let results = WorkerPool::new(self.config.probe.workers)
            .run(
                Stage::Probe,
                targets,
                |target| {
                    let probe = self.probe.clone();
                    async move {
                        let result = probe.probe(&target.ip, target.port).await;
                        (target.node, result)
                    }
                },
                self.observer.clone(),
            )
            .await;

        results
            .into_iter()
            .filter_map(|(mut node, result)| match result.latency_ms {
                Some(latency_ms) if result.is_active => {
                    node.mark_active(&result.ip, result.port, latency_ms);
                    Some(node)
                }
                _ => None,
            })
            .collect()
    }
}
