#[cfg(feature = "metrics")]
use std::time::Instant;

#[cfg(feature = "metrics")]
use log::debug;

/// Runs `f`, logging how long it took when the `metrics` feature is enabled.
#[cfg(feature = "metrics")]
pub fn measure<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let tt = Instant::now();
    let result = f();

    debug!(
        "metrics: {label} took {}",
        humantime::format_duration(tt.elapsed()),
    );

    result
}

#[cfg(not(feature = "metrics"))]
pub fn measure<T>(_: &str, f: impl FnOnce() -> T) -> T {
    f()
}
