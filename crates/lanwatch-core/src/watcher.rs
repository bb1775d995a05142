// ── The watch cycle ──
//
// One cycle: read the tracking mode, poll the router, diff against the
// whitelist, drive the throttle. Cycles run strictly one at a time on
// a fixed interval; every cycle authenticates from scratch and no
// state survives between them, so a failed cycle simply leaves the
// previous throttle state alone until the next one.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::mode::{ModeSource, TrackingMode};
use crate::model::Whitelist;
use crate::notify::Notifier;
use crate::throttle::ThrottleClient;
use lanwatch_api::{Host, RouterClient};

/// What one cycle did to the throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleAction {
    None,
    Enabled,
    Released,
}

/// What one poll cycle observed and did.
#[derive(Debug)]
pub struct CycleOutcome {
    pub mode: TrackingMode,
    pub hosts: Vec<Host>,
    pub strangers: Vec<Host>,
    /// Throttle state as read this cycle; `None` when the state
    /// endpoint was unavailable (no action is taken in that case).
    pub limited: Option<bool>,
    pub action: ThrottleAction,
}

impl CycleOutcome {
    fn idle(mode: TrackingMode) -> Self {
        Self {
            mode,
            hosts: Vec::new(),
            strangers: Vec::new(),
            limited: None,
            action: ThrottleAction::None,
        }
    }
}

/// Drives the poll cycle against a router backend.
pub struct Watcher {
    router: RouterClient,
    whitelist: Whitelist,
    throttle: ThrottleClient,
    interval: Duration,
    mode: Option<ModeSource>,
    notifier: Option<Notifier>,
}

impl Watcher {
    pub fn new(
        router: RouterClient,
        whitelist: Whitelist,
        throttle: ThrottleClient,
        interval: Duration,
    ) -> Self {
        Self {
            router,
            whitelist,
            throttle,
            interval,
            mode: None,
            notifier: None,
        }
    }

    /// Read the tracking mode from a control page each cycle. Without
    /// one the watcher behaves as if `Limit` were always selected.
    pub fn with_mode_source(mut self, mode: ModeSource) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Run cycles on the configured interval until cancelled.
    ///
    /// Cycle failures are logged and (best-effort) notified, never
    /// fatal -- the next tick starts over with a fresh login.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = self.interval.as_secs(), "watcher started");

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("watcher stopped");
                    return;
                }
                _ = interval.tick() => {}
            }

            match self.run_cycle().await {
                Ok(outcome) => debug!(
                    hosts = outcome.hosts.len(),
                    strangers = outcome.strangers.len(),
                    action = ?outcome.action,
                    "cycle complete"
                ),
                Err(e) => {
                    warn!(error = %e, "cycle failed");
                    self.notify_best_effort(&format!("Device check failed: {e}"))
                        .await;
                }
            }
        }
    }

    /// Execute a single poll cycle.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, CoreError> {
        let mode = self.current_mode().await;
        if !mode.tracks() {
            debug!(?mode, "tracking disabled; idle cycle");
            return Ok(CycleOutcome::idle(mode));
        }

        let hosts = self
            .router
            .list_active_hosts()
            .await
            .map_err(CoreError::from)?;
        let strangers: Vec<Host> = self
            .whitelist
            .strangers(&hosts)
            .into_iter()
            .cloned()
            .collect();
        debug!(
            hosts = hosts.len(),
            strangers = strangers.len(),
            "router poll complete"
        );

        let limited = match self.throttle.state().await {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(error = %e, "throttle state unavailable");
                self.notify_best_effort("Unable to get current speed limit state")
                    .await;
                None
            }
        };

        let mut action = ThrottleAction::None;
        if !strangers.is_empty() {
            for host in &strangers {
                info!(name = %host.name, mac = %host.mac, "unfamiliar device online");
            }
            if limited == Some(false) && self.toggle_and_report("Enabling speed limit").await {
                action = ThrottleAction::Enabled;
            }
        } else if mode.releases()
            && limited == Some(true)
            && self.toggle_and_report("Removing speed limit").await
        {
            action = ThrottleAction::Released;
        }

        Ok(CycleOutcome {
            mode,
            hosts,
            strangers,
            limited,
            action,
        })
    }

    async fn current_mode(&self) -> TrackingMode {
        let Some(source) = &self.mode else {
            return TrackingMode::Limit;
        };
        match source.fetch().await {
            Ok(mode) => mode,
            Err(e) => {
                warn!(error = %e, "tracking mode unavailable; leaving connection alone");
                self.notify_best_effort("Unable to read the tracking mode setting")
                    .await;
                TrackingMode::Off
            }
        }
    }

    async fn toggle_and_report(&self, message: &str) -> bool {
        match self.throttle.toggle().await {
            Ok(()) => {
                info!("{message}");
                self.notify_best_effort(message).await;
                true
            }
            Err(e) => {
                warn!(error = %e, "throttle toggle failed");
                self.notify_best_effort(&format!("Unable to toggle speed limit: {e}"))
                    .await;
                false
            }
        }
    }

    async fn notify_best_effort(&self, message: &str) {
        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.send(message).await {
                warn!(error = %e, "notification not delivered");
            }
        }
    }
}
