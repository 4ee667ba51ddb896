//! Service lifecycle: start the subscribers and the monitor, stop them
//! within a grace window.

use crate::bus::EventBus;
use crate::handlers::HandlerSet;
use crate::monitor::RiskMonitor;
use custodia::RiskEvaluationEngine;
use mensura::SizerConfigHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{info, warn};

/// Owns the running subscriber tasks and the monitor loop.
///
/// Dropping the service without calling [`shutdown`](Self::shutdown)
/// leaves the tasks running until the bus closes; orderly teardown should
/// always go through the grace-window path.
pub struct RiskControlService {
    handlers: HandlerSet,
    monitor_task: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
}

impl RiskControlService {
    /// Wire the handlers to the bus and launch the monitor.
    pub fn start(
        engine: Arc<RiskEvaluationEngine>,
        sizer_config: SizerConfigHandle,
        bus: &Arc<EventBus>,
        monitor: RiskMonitor,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handlers = HandlerSet::spawn(engine, sizer_config, bus, shutdown_rx.clone());
        let monitor_task = tokio::spawn(monitor.run(shutdown_rx));
        info!("risk control service started");

        Self {
            handlers,
            monitor_task,
            shutdown_tx,
        }
    }

    /// Stop the monitor, then wind down the handlers, waiting up to
    /// `grace` for outstanding evaluations at each step.
    pub async fn shutdown(self, grace: Duration) {
        let _ = self.shutdown_tx.send(true);

        let mut monitor_task = self.monitor_task;
        if timeout(grace, &mut monitor_task).await.is_err() {
            warn!("monitor did not stop within the grace window, aborting");
            monitor_task.abort();
        }

        self.handlers.shutdown(grace).await;
        info!("risk control service stopped");
    }
}
