use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::thread;

use tracing::{debug, warn};

use crate::core::series::ParameterId;
use crate::error::{DefError, DefResult};
use crate::fit::{FitRequest, FitResponse, PolynomialFitter};

/// Spawns fit jobs on background threads.
#[derive(Clone)]
pub struct FitWorker {
    fitter: Arc<dyn PolynomialFitter>,
}

impl std::fmt::Debug for FitWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FitWorker").finish_non_exhaustive()
    }
}

impl FitWorker {
    #[must_use]
    pub fn new(fitter: Arc<dyn PolynomialFitter>) -> Self {
        Self { fitter }
    }

    /// Validates `request` and starts it on a new thread.
    pub fn spawn(&self, request: FitRequest) -> DefResult<FitJob> {
        request.validate()?;

        let (tx, rx) = channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let parameter = request.parameter.clone();
        let fitter = Arc::clone(&self.fitter);
        let cancelled = Arc::clone(&cancel);

        thread::Builder::new()
            .name(format!("ringdef-fit-{parameter}"))
            .spawn(move || {
                if cancelled.load(Ordering::Acquire) {
                    return;
                }
                let result = fitter.fit(&request).and_then(|response| {
                    if response.values.len() == request.values.len() {
                        Ok(response)
                    } else {
                        Err(DefError::FitFailure(format!(
                            "fitter returned {} values for {} rings",
                            response.values.len(),
                            request.values.len()
                        )))
                    }
                });
                if !cancelled.load(Ordering::Acquire) {
                    // The receiver is gone when the job was dropped.
                    let _ = tx.send(result);
                }
            })
            .map_err(|e| DefError::FitFailure(format!("failed to start fit worker: {e}")))?;

        debug!(parameter = %parameter, "fit job started");
        Ok(FitJob {
            parameter,
            rx,
            cancel,
        })
    }
}

/// State of a job as seen from the interaction thread.
#[derive(Debug)]
pub enum FitPoll {
    Pending,
    Finished(DefResult<FitResponse>),
    Cancelled,
}

/// Handle to one running fit.
#[derive(Debug)]
pub struct FitJob {
    parameter: ParameterId,
    rx: Receiver<DefResult<FitResponse>>,
    cancel: Arc<AtomicBool>,
}

impl FitJob {
    #[must_use]
    pub fn parameter(&self) -> &ParameterId {
        &self.parameter
    }

    /// Requests cancellation; a result produced afterwards is discarded.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Non-blocking check for a result.
    pub fn poll(&self) -> FitPoll {
        if self.is_cancelled() {
            return FitPoll::Cancelled;
        }
        match self.rx.try_recv() {
            Ok(result) => FitPoll::Finished(result),
            Err(TryRecvError::Empty) => FitPoll::Pending,
            Err(TryRecvError::Disconnected) => {
                warn!(parameter = %self.parameter, "fit worker exited without a result");
                FitPoll::Finished(Err(DefError::FitFailure(
                    "fit worker exited without a result".to_owned(),
                )))
            }
        }
    }

    /// Blocks until the job finishes. Intended for hosts without an event loop.
    pub fn wait(self) -> DefResult<FitResponse> {
        if self.is_cancelled() {
            return Err(DefError::FitFailure("fit was cancelled".to_owned()));
        }
        self.rx.recv().unwrap_or_else(|_| {
            Err(DefError::FitFailure(
                "fit worker exited without a result".to_owned(),
            ))
        })
    }
}
