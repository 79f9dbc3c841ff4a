use monoize_gateway::{ApplyError, TargetRepository};
use monoize_plan::MergePlan;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::ReplayError;
use crate::observer::ReplayObserver;
use crate::report::{EntryOutcome, ReplayReport};

/// Lifecycle of a [`ReplayEngine`]. `Finalized` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayState {
    Empty,
    Initialized,
    Replaying,
    Finalized,
}

/// Sequential, single-owner replay of a merge plan into a target.
pub struct ReplayEngine<T> {
    target: Option<T>,
    state: ReplayState,
    cancel: CancellationToken,
}

impl<T: TargetRepository> Default for ReplayEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TargetRepository> ReplayEngine<T> {
    /// An engine without a target.
    pub fn new() -> Self {
        Self {
            target: None,
            state: ReplayState::Empty,
            cancel: CancellationToken::new(),
        }
    }

    /// An engine that already owns `target`.
    pub fn with_target(target: T) -> Self {
        Self {
            target: Some(target),
            state: ReplayState::Initialized,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop replaying once `token` is cancelled. The entry in flight is
    /// finished; every later entry is reported as cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Hand the target to the engine.
    pub fn initialize(&mut self, target: T) -> Result<(), ReplayError> {
        self.expect_state(ReplayState::Empty)?;
        self.target = Some(target);
        self.state = ReplayState::Initialized;
        Ok(())
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    pub fn into_target(self) -> Option<T> {
        self.target
    }

    /// Apply every entry of `plan` in order, then finalize the target.
    ///
    /// Each entry is attempted at most once. A rejected entry is recorded in
    /// the report and replay continues with the next one. After cancellation
    /// the remaining entries are not attempted and carry
    /// [`ApplyError::Cancelled`]. The report always has one outcome per plan
    /// entry.
    pub async fn replay(
        &mut self,
        plan: MergePlan,
        observer: &mut dyn ReplayObserver,
    ) -> Result<ReplayReport, ReplayError> {
        self.expect_state(ReplayState::Initialized)?;
        check_positions(&plan)?;
        let Some(target) = self.target.as_mut() else {
            return Err(ReplayError::InvalidState {
                expected: ReplayState::Initialized,
                actual: ReplayState::Empty,
            });
        };

        self.state = ReplayState::Replaying;
        info!(entries = plan.len(), "replaying merge plan");

        let mut report = ReplayReport {
            outcomes: Vec::with_capacity(plan.len()),
            cleanup_error: None,
        };
        for entry in plan {
            if self.cancel.is_cancelled() {
                report
                    .outcomes
                    .push(EntryOutcome::new(&entry, Err(ApplyError::Cancelled)));
                continue;
            }
            observer.before_apply(&entry);
            let result = target
                .apply(&entry.descriptor.unit, &entry.subdirectory)
                .await;
            match &result {
                Ok(()) => debug!(
                    position = entry.position,
                    subdirectory = %entry.subdirectory,
                    "change applied"
                ),
                Err(e) => warn!(
                    position = entry.position,
                    subdirectory = %entry.subdirectory,
                    error = %e,
                    "change rejected; continuing"
                ),
            }
            let outcome = EntryOutcome::new(&entry, result);
            observer.after_apply(&outcome);
            report.outcomes.push(outcome);
        }

        if let Err(e) = target.finalize().await {
            warn!(error = %e, "failed to remove scratch state");
            report.cleanup_error = Some(e);
        }
        self.state = ReplayState::Finalized;

        let skipped = report.skipped().count();
        if skipped > 0 {
            warn!(skipped, "replay cancelled; remaining changes were not applied");
        }
        info!(
            applied = report.applied().count(),
            failed = report.failed().count() - skipped,
            skipped,
            "replay finished"
        );
        Ok(report)
    }

    /// Finalize without replaying, e.g. when the merge is abandoned.
    ///
    /// Finalizing twice is a no-op.
    pub async fn finalize(&mut self) -> Result<(), ReplayError> {
        match self.state {
            ReplayState::Finalized => return Ok(()),
            ReplayState::Replaying => {
                return Err(ReplayError::InvalidState {
                    expected: ReplayState::Initialized,
                    actual: ReplayState::Replaying,
                })
            }
            ReplayState::Empty | ReplayState::Initialized => {}
        }
        if let Some(target) = self.target.as_mut() {
            if let Err(e) = target.finalize().await {
                warn!(error = %e, "failed to remove scratch state");
            }
        }
        self.state = ReplayState::Finalized;
        Ok(())
    }

    fn expect_state(&self, expected: ReplayState) -> Result<(), ReplayError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ReplayError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }
}

/// Plan positions must be strictly increasing.
fn check_positions(plan: &MergePlan) -> Result<(), ReplayError> {
    for pair in plan.entries.windows(2) {
        if pair[1].position <= pair[0].position {
            return Err(ReplayError::DuplicateEntry(pair[1].position));
        }
    }
    Ok(())
}
