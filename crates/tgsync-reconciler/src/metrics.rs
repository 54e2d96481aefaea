//! Prometheus metrics collection and formatting.
//!
//! This module provides metrics in Prometheus text exposition format.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{FailureKind, ReconcileError};
use crate::outcome::Outcome;

/// Invocation counters, shared by all requests of the trigger endpoint.
#[derive(Debug, Default)]
pub struct Metrics {
    registered: AtomicU64,
    deregistered: AtomicU64,
    unchanged: AtomicU64,
    ignored: AtomicU64,
    empty_result: AtomicU64,
    fault: AtomicU64,
    targets_registered: AtomicU64,
    targets_deregistered: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished invocation.
    pub fn record(&self, result: &Result<Outcome, ReconcileError>) {
        match result {
            Ok(Outcome::Registered { targets, .. }) => {
                self.registered.fetch_add(1, Ordering::Relaxed);
                self.targets_registered
                    .fetch_add(targets.len() as u64, Ordering::Relaxed);
            }
            Ok(Outcome::Deregistered { targets, .. }) => {
                self.deregistered.fetch_add(1, Ordering::Relaxed);
                self.targets_deregistered
                    .fetch_add(targets.len() as u64, Ordering::Relaxed);
            }
            Ok(Outcome::Unchanged { .. }) => {
                self.unchanged.fetch_add(1, Ordering::Relaxed);
            }
            Ok(Outcome::Ignored { .. }) => {
                self.ignored.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => match e.kind() {
                FailureKind::EmptyResult => {
                    self.empty_result.fetch_add(1, Ordering::Relaxed);
                }
                FailureKind::Fault => {
                    self.fault.fetch_add(1, Ordering::Relaxed);
                }
            },
        }
    }

    /// Format all counters as Prometheus text.
    pub fn render(&self) -> String {
        let mut output = String::new();

        writeln!(
            output,
            "# HELP tgsync_invocations_total Reconciler invocations by outcome"
        )
        .ok();
        writeln!(output, "# TYPE tgsync_invocations_total counter").ok();
        for (outcome, counter) in [
            ("registered", &self.registered),
            ("deregistered", &self.deregistered),
            ("unchanged", &self.unchanged),
            ("ignored", &self.ignored),
            ("empty_result", &self.empty_result),
            ("fault", &self.fault),
        ] {
            writeln!(
                output,
                "tgsync_invocations_total{{outcome=\"{outcome}\"}} {}",
                counter.load(Ordering::Relaxed)
            )
            .ok();
        }

        writeln!(output).ok();
        writeln!(
            output,
            "# HELP tgsync_targets_total Targets submitted to the registry by operation"
        )
        .ok();
        writeln!(output, "# TYPE tgsync_targets_total counter").ok();
        writeln!(
            output,
            "tgsync_targets_total{{operation=\"register\"}} {}",
            self.targets_registered.load(Ordering::Relaxed)
        )
        .ok();
        writeln!(
            output,
            "tgsync_targets_total{{operation=\"deregister\"}} {}",
            self.targets_deregistered.load(Ordering::Relaxed)
        )
        .ok();

        output
    }
}
