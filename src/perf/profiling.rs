/// Instrumentation for the frame pipeline hot path.
/// Counters are relaxed atomics and compile to nothing unless the
/// `profiling` feature is enabled.
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for the stages of the rasterization pipeline.
pub struct FunctionCounters {
    // Triangle stream
    pub triangles_submitted: AtomicU64,
    pub triangles_behind_near: AtomicU64,
    pub triangles_clipped: AtomicU64,
    pub clip_triangles_appended: AtomicU64,
    pub triangles_culled: AtomicU64,

    // Pixel stream
    pub pixels_tested: AtomicU64,
    pub depth_test_passed: AtomicU64,
    pub depth_test_failed: AtomicU64,
}

impl FunctionCounters {
    pub const fn new() -> Self {
        Self {
            triangles_submitted: AtomicU64::new(0),
            triangles_behind_near: AtomicU64::new(0),
            triangles_clipped: AtomicU64::new(0),
            clip_triangles_appended: AtomicU64::new(0),
            triangles_culled: AtomicU64::new(0),
            pixels_tested: AtomicU64::new(0),
            depth_test_passed: AtomicU64::new(0),
            depth_test_failed: AtomicU64::new(0),
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.triangles_submitted.store(0, Ordering::Relaxed);
        self.triangles_behind_near.store(0, Ordering::Relaxed);
        self.triangles_clipped.store(0, Ordering::Relaxed);
        self.clip_triangles_appended.store(0, Ordering::Relaxed);
        self.triangles_culled.store(0, Ordering::Relaxed);
        self.pixels_tested.store(0, Ordering::Relaxed);
        self.depth_test_passed.store(0, Ordering::Relaxed);
        self.depth_test_failed.store(0, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            triangles_submitted: self.triangles_submitted.load(Ordering::Relaxed),
            triangles_behind_near: self.triangles_behind_near.load(Ordering::Relaxed),
            triangles_clipped: self.triangles_clipped.load(Ordering::Relaxed),
            clip_triangles_appended: self.clip_triangles_appended.load(Ordering::Relaxed),
            triangles_culled: self.triangles_culled.load(Ordering::Relaxed),
            pixels_tested: self.pixels_tested.load(Ordering::Relaxed),
            depth_test_passed: self.depth_test_passed.load(Ordering::Relaxed),
            depth_test_failed: self.depth_test_failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of counter values at a point in time
#[derive(Debug, Clone, Copy)]
pub struct CounterSnapshot {
    pub triangles_submitted: u64,
    pub triangles_behind_near: u64,
    pub triangles_clipped: u64,
    pub clip_triangles_appended: u64,
    pub triangles_culled: u64,
    pub pixels_tested: u64,
    pub depth_test_passed: u64,
    pub depth_test_failed: u64,
}

impl CounterSnapshot {
    /// Print formatted report
    pub fn print_report(&self) {
        println!("\n=== Pipeline Counters Report ===");
        println!("\nTriangle Stream:");
        println!("  submitted:            {:12}", self.triangles_submitted);
        println!("  behind near plane:    {:12}", self.triangles_behind_near);
        println!("  clipped:              {:12}", self.triangles_clipped);
        println!("  appended by clipper:  {:12}", self.clip_triangles_appended);
        println!("  culled at setup:      {:12}", self.triangles_culled);

        println!("\nPixel Stream:");
        println!("  pixels tested:        {:12}", self.pixels_tested);
        println!("  depth test passed:    {:12}", self.depth_test_passed);
        println!("  depth test failed:    {:12}", self.depth_test_failed);
        if self.pixels_tested > 0 {
            let pass_rate =
                (self.depth_test_passed as f64 / self.pixels_tested as f64) * 100.0;
            println!("  depth pass rate:      {:11.2}%", pass_rate);
        }
        println!();
    }
}

/// Global function counters instance
pub static FUNCTION_COUNTERS: FunctionCounters = FunctionCounters::new();

/// Macro for incrementing a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_call {
    ($counter:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    };
}

/// Macro for adding to a counter (only when profiling feature is enabled)
#[macro_export]
macro_rules! count_add {
    ($counter:expr, $value:expr) => {
        #[cfg(feature = "profiling")]
        {
            $counter.fetch_add($value, std::sync::atomic::Ordering::Relaxed);
        }
    };
}
