use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::core::series::ParameterId;
use crate::error::{DefError, DefResult};
use crate::fit::{FitJob, FitPoll, FitRequest, FitResponse, FitWorker, PolynomialFitter};

/// Tracks at most one in-flight fit per series.
#[derive(Debug, Default)]
pub struct FitCoordinator {
    worker: Option<FitWorker>,
    jobs: IndexMap<ParameterId, FitJob>,
}

impl FitCoordinator {
    #[must_use]
    pub fn new(fitter: Arc<dyn PolynomialFitter>) -> Self {
        Self {
            worker: Some(FitWorker::new(fitter)),
            jobs: IndexMap::new(),
        }
    }

    pub fn set_fitter(&mut self, fitter: Arc<dyn PolynomialFitter>) {
        self.worker = Some(FitWorker::new(fitter));
    }

    #[must_use]
    pub fn has_fitter(&self) -> bool {
        self.worker.is_some()
    }

    #[must_use]
    pub fn in_flight(&self, parameter: &ParameterId) -> bool {
        self.jobs.contains_key(parameter)
    }

    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn start(&mut self, request: FitRequest) -> DefResult<()> {
        let worker = self
            .worker
            .as_ref()
            .ok_or_else(|| DefError::FitFailure("no fitter configured".to_owned()))?;
        if self.jobs.contains_key(&request.parameter) {
            return Err(DefError::FitFailure("already running".to_owned()));
        }
        let parameter = request.parameter.clone();
        let job = worker.spawn(request)?;
        self.jobs.insert(parameter, job);
        Ok(())
    }

    /// Cancels the job for `parameter`. Returns `false` when none was running.
    pub fn cancel(&mut self, parameter: &ParameterId) -> bool {
        match self.jobs.shift_remove(parameter) {
            Some(job) => {
                job.cancel();
                debug!(parameter = %parameter, "fit cancelled");
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, job) in self.jobs.drain(..) {
            job.cancel();
        }
    }

    /// Collects finished jobs in start order. Pending jobs stay tracked.
    pub fn poll(&mut self) -> Vec<(ParameterId, DefResult<FitResponse>)> {
        let mut finished = Vec::new();
        self.jobs.retain(|parameter, job| match job.poll() {
            FitPoll::Pending => true,
            FitPoll::Cancelled => false,
            FitPoll::Finished(result) => {
                if let Err(err) = &result {
                    warn!(parameter = %parameter, error = %err, "fit failed");
                }
                finished.push((parameter.clone(), result));
                false
            }
        });
        finished
    }
}
