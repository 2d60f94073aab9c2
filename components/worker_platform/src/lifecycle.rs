//! Install/activate lifecycle driver.
//!
//! Fires the lifecycle events and awaits every deferred operation their
//! handlers registered before reporting the phase complete. Install
//! failures are recorded rather than propagated (configurable via
//! [`LifecyclePolicy`]); activate failures always propagate. The driver
//! also enforces ordering: activate's dispatch never begins before
//! install's deferred work has settled.

use crate::event::{event_type, WorkerEvent};
use crate::scope::ServiceWorkerGlobalScope;
use async_runtime::Completion;
use tracing::warn;

/// Service worker lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Initial state after the script is evaluated.
    Parsed,
    /// Install event dispatched, deferred work possibly outstanding.
    Installing,
    /// Install complete.
    Installed,
    /// Activate event dispatched, deferred work possibly outstanding.
    Activating,
    /// Worker is active and may control fetches.
    Activated,
    /// Worker failed a phase or was discarded.
    Redundant,
}

impl WorkerState {
    /// True once the worker has reached the state where the shell
    /// routes fetches to it.
    pub fn can_intercept_fetch(&self) -> bool {
        matches!(self, WorkerState::Activated)
    }

    /// True for the terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerState::Redundant)
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerState::Parsed => write!(f, "parsed"),
            WorkerState::Installing => write!(f, "installing"),
            WorkerState::Installed => write!(f, "installed"),
            WorkerState::Activating => write!(f, "activating"),
            WorkerState::Activated => write!(f, "activated"),
            WorkerState::Redundant => write!(f, "redundant"),
        }
    }
}

/// What a failed install deferred operation does to the registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecyclePolicy {
    /// Record the failure and report install as complete anyway.
    #[default]
    ReportOnly,
    /// Reject the install completion and mark the worker redundant.
    FailRegistration,
}

/// Lifecycle bookkeeping owned by the worker scope.
pub(crate) struct LifecycleDriver {
    state: WorkerState,
    policy: LifecyclePolicy,
    install_failed: bool,
    install_outcome: Option<Completion<()>>,
}

impl LifecycleDriver {
    pub(crate) fn new(policy: LifecyclePolicy) -> Self {
        Self {
            state: WorkerState::Parsed,
            policy,
            install_failed: false,
            install_outcome: None,
        }
    }

    pub(crate) fn state(&self) -> WorkerState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: WorkerState) {
        self.state = state;
    }

    pub(crate) fn policy(&self) -> LifecyclePolicy {
        self.policy
    }

    pub(crate) fn install_failed(&self) -> bool {
        self.install_failed
    }

    pub(crate) fn record_install_failure(&mut self) {
        self.install_failed = true;
    }

    pub(crate) fn record_install(&mut self, outcome: Completion<()>) {
        self.install_outcome = Some(outcome);
    }

    pub(crate) fn install_gate(&self) -> Option<Completion<()>> {
        self.install_outcome.clone()
    }
}

impl ServiceWorkerGlobalScope {
    /// Fires the install event and resolves once all deferred work has
    /// settled.
    ///
    /// A deferred failure is recorded on the scope (and logged); under
    /// the default [`LifecyclePolicy::ReportOnly`] the returned
    /// completion still resolves. With no deferred work, completion is
    /// immediate.
    pub fn fire_install(&self) -> Completion<()> {
        self.with_lifecycle(|driver| driver.set_state(WorkerState::Installing));

        let mut event = WorkerEvent::extendable(event_type::INSTALL);
        self.event_target().dispatch(&mut event, None);

        let outcome = Completion::new();
        let waited = Completion::all(event.take_pending_work());
        let scope = self.clone();
        let reported = outcome.clone();
        waited.on_settle(move |result| match result {
            Ok(_) => {
                scope.with_lifecycle(|driver| driver.set_state(WorkerState::Installed));
                reported.resolve(());
            }
            Err(error) => {
                warn!(%error, "install deferred work failed");
                let policy = scope.with_lifecycle(|driver| {
                    driver.record_install_failure();
                    driver.policy()
                });
                match policy {
                    LifecyclePolicy::ReportOnly => {
                        scope.with_lifecycle(|driver| driver.set_state(WorkerState::Installed));
                        reported.resolve(());
                    }
                    LifecyclePolicy::FailRegistration => {
                        scope.with_lifecycle(|driver| driver.set_state(WorkerState::Redundant));
                        reported.reject(error.clone());
                    }
                }
            }
        });

        self.with_lifecycle(|driver| driver.record_install(outcome.clone()));
        outcome
    }

    /// Fires the activate event and resolves once all deferred work has
    /// settled; the first deferred failure propagates.
    ///
    /// If install is still running its deferred work, the activate
    /// dispatch is chained onto the install completion: the driver
    /// enforces install-then-activate ordering rather than relying on
    /// caller discipline.
    pub fn fire_activate(&self) -> Completion<()> {
        let outcome = Completion::new();
        let gate = self.with_lifecycle(|driver| driver.install_gate());
        match gate {
            Some(install) if !install.is_settled() => {
                let scope = self.clone();
                let chained = outcome.clone();
                install.on_settle(move |_| scope.dispatch_activate(&chained));
            }
            _ => self.dispatch_activate(&outcome),
        }
        outcome
    }

    fn dispatch_activate(&self, outcome: &Completion<()>) {
        self.with_lifecycle(|driver| driver.set_state(WorkerState::Activating));

        let mut event = WorkerEvent::extendable(event_type::ACTIVATE);
        self.event_target().dispatch(&mut event, None);

        let waited = Completion::all(event.take_pending_work());
        let scope = self.clone();
        let reported = outcome.clone();
        waited.on_settle(move |result| match result {
            Ok(_) => {
                scope.with_lifecycle(|driver| driver.set_state(WorkerState::Activated));
                reported.resolve(());
            }
            Err(error) => {
                warn!(%error, "activate deferred work failed");
                scope.with_lifecycle(|driver| driver.set_state(WorkerState::Redundant));
                reported.reject(error.clone());
            }
        });
    }
}
