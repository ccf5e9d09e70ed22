//! Metric descriptions for the notification subsystem
//!
//! Call sites use the `metrics` macros directly; this module only registers
//! descriptions so exporters render meaningful help text. Wiring an exporter
//! is the embedding application's concern.

use metrics::{describe_counter, describe_gauge};

/// Register descriptions for every metric this crate emits
pub fn init_metrics() {
    describe_counter!(
        "notify.deltas.applied",
        "Change-feed deltas that mutated the cached notification set"
    );
    describe_counter!(
        "notify.alerts.emitted",
        "Added deltas that passed the delivery filter"
    );
    describe_counter!(
        "notify.alerts.suppressed",
        "Added deltas suppressed by the delivery filter"
    );
    describe_counter!(
        "notify.stream.errors",
        "Terminal change-feed stream failures"
    );
    describe_counter!(
        "notify.remote_writes.failed",
        "Read acknowledgements rejected by the remote store"
    );
    describe_gauge!(
        "notify.unread",
        "Derived unread count of the cached notification set"
    );
}
