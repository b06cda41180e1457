//! Telemetry sink capability for marigold.
//!
//! Error-handling steps report routed failures through a [`TelemetrySink`]
//! injected at engine construction. Sinks only observe; they never fail the
//! step that reports to them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::error;

/// A routed step failure, as reported by an error-handling step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
  pub execution_id: String,
  pub workflow_id: String,
  /// The step that reports (the error handler).
  pub reporter_step_id: String,
  /// The step whose failure was routed to the handler.
  pub failed_step_id: String,
  pub message: String,
  pub reported_at: DateTime<Utc>,
}

pub trait TelemetrySink: Send + Sync {
  fn report(&self, report: ErrorReport);
}

/// Emits reports as `tracing` error events.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
  fn report(&self, report: ErrorReport) {
    error!(
      execution_id = %report.execution_id,
      workflow_id = %report.workflow_id,
      reporter_step_id = %report.reporter_step_id,
      failed_step_id = %report.failed_step_id,
      reported_at = %report.reported_at,
      "{}",
      report.message
    );
  }
}

/// Sends reports to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
  sender: mpsc::UnboundedSender<ErrorReport>,
}

impl ChannelSink {
  pub fn new(sender: mpsc::UnboundedSender<ErrorReport>) -> Self {
    Self { sender }
  }
}

impl TelemetrySink for ChannelSink {
  fn report(&self, report: ErrorReport) {
    // Receiver may have been dropped
    let _ = self.sender.send(report);
  }
}
