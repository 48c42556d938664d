//! Public SDK surface for SwiftDesk.
//!
//! Re-exports the building blocks and the wiring used by the `swiftdesk`
//! binary so embedders can assemble the same service.

pub mod app;

/// Re-export for convenience.
pub use swiftdesk_config as config;
pub use swiftdesk_core as core;
/// Re-export for convenience.
pub use swiftdesk_protocol as protocol;
pub use swiftdesk_server as server;
pub use swiftdesk_store as store;
pub use swiftdesk_upstream as upstream;

/// Initialize `env_logger` with millisecond timestamps, honouring `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
#[inline]
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}
