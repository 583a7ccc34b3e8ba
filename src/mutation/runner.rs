use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use futures::future::join_all;
use serde_json::Value;

use crate::error_catalog::CatalogLoader;
use crate::mutation::config::RunnerSettings;
use crate::mutation::error::{already_submitting, MutationError, MutationResult};
use crate::mutation::outcome::{
    classify, domain_error_message, transport_error_message, Classification, DomainError,
};
use crate::mutation::request::{DependentRead, MutationRequest};
use crate::mutation::transport::{MutationTransport, ReadRefresher};
use crate::notification::{Notification, NotificationSink};
use crate::platform::runtime;

#[cfg(target_arch = "wasm32")]
pub type MutationContinuation = Box<dyn FnOnce(&Value) + 'static>;
#[cfg(not(target_arch = "wasm32"))]
pub type MutationContinuation = Box<dyn FnOnce(&Value) + Send + 'static>;

#[cfg(target_arch = "wasm32")]
pub type SubmittingListener = Arc<dyn Fn(bool) + 'static>;
#[cfg(not(target_arch = "wasm32"))]
pub type SubmittingListener = Arc<dyn Fn(bool) + Send + Sync + 'static>;

type ListenerSlot = Arc<RwLock<Option<SubmittingListener>>>;

fn current_listener(slot: &ListenerSlot) -> Option<SubmittingListener> {
    slot.read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Token letting the owner of a run opt out of its side effects.
///
/// Cancelling does not abort the write. Once it settles the runner returns to
/// idle but skips notifications, dependent-read refreshes and the continuation.
#[derive(Clone, Debug, Default)]
pub struct RunCancellation {
    cancelled: Arc<AtomicBool>,
}

impl RunCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// How a run settled.
#[derive(Clone, Debug, PartialEq)]
pub enum RunOutcome {
    Succeeded {
        payload: Value,
    },
    DomainError {
        payload: Value,
        primary: DomainError,
        errors: Vec<DomainError>,
        message: String,
    },
    TransportFailed {
        error: MutationError,
        message: &'static str,
    },
    Cancelled,
}

impl RunOutcome {
    /// The settled payload, absent for rejected or cancelled runs.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            RunOutcome::Succeeded { payload } | RunOutcome::DomainError { payload, .. } => {
                Some(payload)
            }
            RunOutcome::TransportFailed { .. } | RunOutcome::Cancelled => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded { .. })
    }
}

/// Executes one remote write at a time and turns its outcome into a notification.
///
/// Clones share the submitting flag and its listener, so a handle held by a
/// form and one held by its submit button observe the same state.
#[derive(Clone)]
pub struct MutationRunner {
    transport: Arc<dyn MutationTransport>,
    refresher: Arc<dyn ReadRefresher>,
    catalog: CatalogLoader,
    sink: Arc<dyn NotificationSink>,
    settings: RunnerSettings,
    submitting: Arc<AtomicBool>,
    listener: ListenerSlot,
}

impl MutationRunner {
    pub fn new(
        transport: Arc<dyn MutationTransport>,
        refresher: Arc<dyn ReadRefresher>,
        catalog: CatalogLoader,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            transport,
            refresher,
            catalog,
            sink,
            settings: RunnerSettings::default(),
            submitting: Arc::new(AtomicBool::new(false)),
            listener: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_settings(mut self, settings: RunnerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Registers a callback invoked with every change of the submitting flag.
    pub fn with_submitting_listener(self, listener: SubmittingListener) -> Self {
        self.set_submitting_listener(listener);
        self
    }

    /// Replaces the listener for this runner and every clone of it.
    pub fn set_submitting_listener(&self, listener: SubmittingListener) {
        *self
            .listener
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(listener);
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    pub fn submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Runs `request` and invokes `continuation` with the payload if the write settles.
    ///
    /// Returns `Err` only when another run is already in flight on this runner;
    /// every other failure is reported through the notification sink and the
    /// returned [`RunOutcome`].
    pub async fn run(
        &self,
        request: MutationRequest,
        continuation: Option<MutationContinuation>,
    ) -> MutationResult<RunOutcome> {
        self.run_with_cancellation(request, continuation, RunCancellation::new())
            .await
    }

    pub async fn run_with_cancellation(
        &self,
        request: MutationRequest,
        continuation: Option<MutationContinuation>,
        cancellation: RunCancellation,
    ) -> MutationResult<RunOutcome> {
        let guard = self.begin()?;

        runtime::sleep(request.dispatch_delay).await;
        log::debug!(
            "dispatching mutation with {} dependent reads",
            request.dependent_reads.len()
        );
        let settled = self.transport.invoke(request.invocation()).await;
        drop(guard);

        if cancellation.is_cancelled() {
            log::debug!("mutation settled after its owner cancelled; skipping side effects");
            return Ok(RunOutcome::Cancelled);
        }

        let outcome = match settled {
            Ok(payload) => self.resolve_payload(&request, payload, continuation).await,
            Err(error) => self.resolve_rejection(error),
        };
        Ok(outcome)
    }

    fn begin(&self) -> MutationResult<SubmissionGuard> {
        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(already_submitting());
        }
        if let Some(listener) = current_listener(&self.listener) {
            listener(true);
        }
        Ok(SubmissionGuard {
            submitting: Arc::clone(&self.submitting),
            listener: Arc::clone(&self.listener),
        })
    }

    async fn resolve_payload(
        &self,
        request: &MutationRequest,
        payload: Value,
        continuation: Option<MutationContinuation>,
    ) -> RunOutcome {
        let classification = classify(&payload);
        let refresh = match classification {
            Classification::Success => true,
            Classification::DomainError { .. } => self.settings.refetch_on_domain_error,
        };

        let outcome = match classification {
            Classification::Success => {
                if let Some(message) = &request.success_message {
                    self.sink.notify(Notification::success(message.clone()));
                }
                RunOutcome::Succeeded {
                    payload: payload.clone(),
                }
            }
            Classification::DomainError { primary, all } => {
                let catalog = match self.catalog.load(&self.settings.locale).await {
                    Ok(catalog) => Some(catalog),
                    Err(err) => {
                        log::debug!("resolving domain error without catalog: {err}");
                        None
                    }
                };
                let message = domain_error_message(catalog.as_deref(), &primary);
                self.sink.notify(Notification::error(message.clone()));
                RunOutcome::DomainError {
                    payload: payload.clone(),
                    primary,
                    errors: all,
                    message,
                }
            }
        };

        if let Some(continuation) = continuation {
            continuation(&payload);
        }

        // After every caller-visible effect of the run.
        if refresh {
            self.refresh_dependent_reads(&request.dependent_reads).await;
        }
        outcome
    }

    fn resolve_rejection(&self, error: MutationError) -> RunOutcome {
        log::warn!("mutation rejected: {error}");
        let message = transport_error_message(&error);
        self.sink.notify(Notification::error(message));
        RunOutcome::TransportFailed { error, message }
    }

    async fn refresh_dependent_reads(&self, reads: &[DependentRead]) {
        if reads.is_empty() {
            return;
        }
        let results = join_all(reads.iter().map(|read| self.refresher.refresh(read))).await;
        for (read, result) in reads.iter().zip(results) {
            if let Err(err) = result {
                log::warn!("failed to refresh dependent read `{}`: {err}", read.query);
            }
        }
    }
}

/// Returns the runner to idle when the write settles or the run is dropped.
struct SubmissionGuard {
    submitting: Arc<AtomicBool>,
    listener: ListenerSlot,
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        self.submitting.store(false, Ordering::SeqCst);
        if let Some(listener) = current_listener(&self.listener) {
            listener(false);
        }
    }
}
