use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use monoize_extract::{ChangeExtractor, FormatPatchExtractor};
use monoize_gateway::{FetchError, GitGateway, InitError, RepositoryGateway, ScratchArea, TargetRepository};
use monoize_plan::{MergePlanner, SourceChanges};
use monoize_replay::{ReplayEngine, ReplayObserver};
use monoize_types::SourceSpec;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::MergeConfig;
use crate::error::{MergeError, MergeResult};
use crate::report::MergeReport;

/// The merge pipeline: fetch, extract and parse every source in parallel,
/// plan once all are in, then replay sequentially into the target.
///
/// Anything that fails before replay aborts the run and removes the target,
/// so a failed run leaves either nothing or, with `force`, nothing where the
/// old target was.
pub struct Monoize<G = GitGateway, E = FormatPatchExtractor> {
    gateway: Arc<G>,
    extractor: Arc<E>,
    cancel: CancellationToken,
}

impl Monoize {
    /// Pipeline over the `git` binary, configured from `config`.
    pub fn from_config(config: &MergeConfig) -> Self {
        let gateway = GitGateway::new(config.credentials.clone())
            .with_committer(config.committer.clone());
        Self::with_parts(gateway, FormatPatchExtractor)
    }
}

impl<G, E> Monoize<G, E>
where
    G: RepositoryGateway + 'static,
    E: ChangeExtractor + 'static,
{
    pub fn with_parts(gateway: G, extractor: E) -> Self {
        Self {
            gateway: Arc::new(gateway),
            extractor: Arc::new(extractor),
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops the run when cancelled.
    ///
    /// During collection in-flight fetches are aborted and the run fails.
    /// During replay the change being applied is finished and the rest are
    /// reported as skipped.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run one merge.
    ///
    /// Returns the report even when individual entries failed to apply;
    /// check [`MergeReport::is_success`].
    pub async fn run(
        &self,
        config: &MergeConfig,
        observer: &mut dyn ReplayObserver,
    ) -> MergeResult<MergeReport> {
        config.validate()?;
        let target_path = std::path::absolute(&config.target).map_err(|source| InitError::Io {
            path: config.target.clone(),
            source,
        })?;

        info!(
            target = %target_path.display(),
            sources = config.sources.len(),
            dry_run = config.dry_run,
            "starting merge"
        );
        let target = match self.gateway.prepare_target(&target_path, config.force).await {
            Ok(target) => target,
            Err(e) => {
                if !matches!(e, InitError::TargetExists(_)) {
                    remove_target(&target_path).await;
                }
                return Err(e.into());
            }
        };
        let scratch = target.scratch().clone();
        let mut engine = ReplayEngine::with_target(target).with_cancellation(self.cancel.clone());

        let sources = match self.collect(config, &scratch).await {
            Ok(sources) => sources,
            Err(e) => {
                abandon(&mut engine, &target_path).await;
                return Err(e);
            }
        };

        let plan = MergePlanner::plan(sources);
        info!(entries = plan.len(), "merge plan ready");

        if config.dry_run {
            let report = MergeReport::planned(target_path.clone(), &plan);
            abandon(&mut engine, &target_path).await;
            return Ok(report);
        }

        match engine.replay(plan, observer).await {
            Ok(replay) => Ok(MergeReport::replayed(target_path, &replay)),
            Err(e) => {
                abandon(&mut engine, &target_path).await;
                Err(e.into())
            }
        }
    }

    /// Fetch, extract and parse all sources concurrently. Returns one
    /// [`SourceChanges`] per source, in source order, or the first failure.
    async fn collect(
        &self,
        config: &MergeConfig,
        scratch: &ScratchArea,
    ) -> MergeResult<Vec<SourceChanges>> {
        let cancel = self.cancel.child_token();
        let mut tasks = JoinSet::new();
        for (rank, source) in config.sources.iter().enumerate() {
            let job = SourceJob {
                rank,
                source: Arc::new(source.clone()),
                scratch: scratch.clone(),
                timeout: config.fetch_timeout,
                cancel: cancel.clone(),
            };
            let gateway = Arc::clone(&self.gateway);
            let extractor = Arc::clone(&self.extractor);
            tasks.spawn(async move { (rank, job.run(&*gateway, &*extractor).await) });
        }

        let mut slots: Vec<Option<SourceChanges>> = (0..config.sources.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            let result = match joined {
                Ok((rank, result)) => result.map(|changes| (rank, changes)),
                Err(e) => Err(MergeError::Task(e.to_string())),
            };
            match result {
                Ok((rank, changes)) => slots[rank] = Some(changes),
                Err(e) => {
                    warn!(error = %e, "source failed; cancelling remaining sources");
                    cancel.cancel();
                    tasks.shutdown().await;
                    return Err(e);
                }
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(rank, slot)| {
                slot.ok_or_else(|| MergeError::Task(format!("source {rank} produced no result")))
            })
            .collect()
    }
}

/// Per-source work item, run on its own task.
struct SourceJob {
    rank: usize,
    source: Arc<SourceSpec>,
    scratch: ScratchArea,
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl SourceJob {
    async fn run<G, E>(self, gateway: &G, extractor: &E) -> MergeResult<SourceChanges>
    where
        G: RepositoryGateway,
        E: ChangeExtractor,
    {
        let locator = self.source.locator().to_string();
        let clone_dir = self.scratch.source_dir(self.rank, &self.source);

        let fetch = gateway.fetch(Arc::clone(&self.source), &clone_dir, &self.cancel);
        let repo = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .map_err(|_| FetchError::TimedOut {
                    locator: locator.clone(),
                    seconds: limit.as_secs(),
                })??,
            None => fetch.await?,
        };

        let export_dir = self.scratch.export_dir(self.rank, &self.source);
        let units = extractor.extract(&repo, &export_dir).await?;
        if let Err(e) = self.scratch.remove_source(self.rank, &self.source) {
            warn!(source = %locator, error = %e, "could not remove fetched clone");
        }

        let descriptors = units
            .into_iter()
            .map(monoize_descriptor::parse)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(source = %locator, changes = descriptors.len(), "source ready");
        Ok(SourceChanges::new(self.source, descriptors))
    }
}

/// Tear down after a fatal error or a dry run.
async fn abandon<T: TargetRepository>(engine: &mut ReplayEngine<T>, target: &Path) {
    if let Err(e) = engine.finalize().await {
        warn!(error = %e, "could not finalize target");
    }
    remove_target(target).await;
}

async fn remove_target(target: &Path) {
    match tokio::fs::remove_dir_all(target).await {
        Ok(()) => debug!(target = %target.display(), "target removed"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(target = %target.display(), error = %e, "could not remove target"),
    }
}
