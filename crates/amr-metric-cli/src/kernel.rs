//! Kernel-name resolution for the service boundary.
//!
//! Callers (e.g. an HTTP wrapper) pass free-form kernel names. Only the
//! Wasserstein WL kernel is implemented; every other name resolves to it
//! with a logged warning, so a request never fails on an unrecognized
//! kernel variant.

use tracing::{info, warn};

/// The kernels this binary can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    WassersteinWl,
}

/// Resolve a requested kernel name, falling back to Wasserstein WL.
pub fn resolve(name: &str) -> Kernel {
    match name {
        "wwlk" => {
            info!(kernel = name, "running Wasserstein WL kernel");
        }
        "wlk" | "wwlk-theta" | "random-walk" => {
            warn!(
                kernel = name,
                "kernel is unimplemented; similarity will be based on the Wasserstein WL kernel"
            );
        }
        other => {
            warn!(
                kernel = other,
                "unrecognized kernel; falling back to the Wasserstein WL kernel"
            );
        }
    }
    Kernel::WassersteinWl
}
