//! Per-run pipeline state machine

use crate::error::SeatMapError;
use log::debug;
use serde::Serialize;

/// Pipeline stage. Runs move strictly forward
/// `Init -> Calibrated -> Located -> Classified -> Aggregated`, or jump to
/// `Failed` from any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Init,
    Calibrated,
    Located,
    Classified,
    Aggregated,
    Failed,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Aggregated | Stage::Failed)
    }

    fn next(self) -> Option<Stage> {
        match self {
            Stage::Init => Some(Stage::Calibrated),
            Stage::Calibrated => Some(Stage::Located),
            Stage::Located => Some(Stage::Classified),
            Stage::Classified => Some(Stage::Aggregated),
            Stage::Aggregated | Stage::Failed => None,
        }
    }
}

/// Tracks one run through the pipeline. No retries: a failed run stays failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineRun {
    stage: Stage,
    failed_at: Option<Stage>,
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineRun {
    pub fn new() -> Self {
        Self {
            stage: Stage::Init,
            failed_at: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Stage the run was in when it failed
    pub fn failed_at(&self) -> Option<Stage> {
        self.failed_at
    }

    pub fn advance(&mut self, to: Stage) -> Result<(), SeatMapError> {
        if self.stage.next() != Some(to) {
            return Err(SeatMapError::InvalidTransition {
                from: self.stage,
                to,
            });
        }
        debug!("Pipeline {:?} -> {:?}", self.stage, to);
        self.stage = to;
        Ok(())
    }

    /// Mark the run failed. Has no effect on a run that already finished.
    pub fn fail(&mut self) {
        if self.stage.is_terminal() {
            return;
        }
        debug!("Pipeline {:?} -> Failed", self.stage);
        self.failed_at = Some(self.stage);
        self.stage = Stage::Failed;
    }
}
