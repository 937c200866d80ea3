//! Antithesis-style `ALWAYS`/`SOMETIMES`/`NEVER` property annotations for
//! deterministic simulation testing (DST).
//!
//! These macros let the coordinator and model assert properties inline,
//! at the point where they are naturally checked, rather than bolting
//! them onto test code after the fact:
//!
//! - [`always!`] — the condition must hold every time this line is
//!   reached. Violations panic immediately (a correctness bug), exactly
//!   like a `debug_assert!`.
//! - [`never!`] — the negation of `always!`; reads better at call sites
//!   phrased as a forbidden condition.
//! - [`sometimes!`] — the condition is expected to become true at least
//!   once somewhere in a full run (e.g. "a barrier was retried at least
//!   once"). It never panics; with the `sim` feature it records a hit
//!   into a thread-local registry that a simulation harness can inspect
//!   after the run to catch properties that were never exercised.
//!
//! Without the `sim` feature, `sometimes!` is a no-op aside from
//! evaluating its condition (so call sites never need `#[cfg]`).

use std::fmt;

/// A single property observation recorded by [`sometimes!`] when the
/// `sim` feature is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyHit {
    pub name: &'static str,
    pub satisfied: bool,
}

impl fmt::Display for PropertyHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]",
            self.name,
            if self.satisfied { "hit" } else { "missed" }
        )
    }
}

#[cfg(feature = "sim")]
mod registry {
    use super::PropertyHit;
    use std::cell::RefCell;

    thread_local! {
        static HITS: RefCell<Vec<PropertyHit>> = const { RefCell::new(Vec::new()) };
    }

    /// Records a property observation for the current thread/simulation step.
    pub fn record(hit: PropertyHit) {
        HITS.with(|h| h.borrow_mut().push(hit));
    }

    /// Drains and returns every observation recorded so far on this thread.
    pub fn drain() -> Vec<PropertyHit> {
        HITS.with(|h| std::mem::take(&mut *h.borrow_mut()))
    }

    /// Returns true if `name` was ever recorded as satisfied.
    pub fn was_ever_satisfied(name: &str) -> bool {
        HITS.with(|h| {
            h.borrow()
                .iter()
                .any(|hit| hit.name == name && hit.satisfied)
        })
    }
}

#[cfg(feature = "sim")]
pub use registry::{drain, was_ever_satisfied};

/// Asserts that `$cond` holds. Panics with `$name` and the evaluated
/// message on violation. Use for invariants that must hold at every
/// reachable call site (e.g. "fence_version never exceeds version").
#[macro_export]
macro_rules! always {
    ($cond:expr, $name:expr $(,)?) => {
        assert!($cond, "ALWAYS violated: {}", $name);
    };
    ($cond:expr, $name:expr, $($arg:tt)+) => {
        assert!($cond, "ALWAYS violated: {}: {}", $name, format!($($arg)+));
    };
}

/// Asserts that `$cond` is false. Equivalent to `always!(!$cond, ...)`,
/// phrased for forbidden conditions (e.g. "two nodes never share a ring
/// token").
#[macro_export]
macro_rules! never {
    ($cond:expr, $name:expr $(,)?) => {
        $crate::always!(!($cond), $name);
    };
    ($cond:expr, $name:expr, $($arg:tt)+) => {
        $crate::always!(!($cond), $name, $($arg)+);
    };
}

/// Records that `$cond` was observed to be true (or false) at this
/// point, without panicking either way. A simulation harness can later
/// check [`was_ever_satisfied`] to catch properties that a test suite
/// never actually exercised.
#[cfg(feature = "sim")]
#[macro_export]
macro_rules! sometimes {
    ($cond:expr, $name:expr $(,)?) => {
        $crate::record($crate::PropertyHit {
            name: $name,
            satisfied: $cond,
        });
    };
}

#[cfg(not(feature = "sim"))]
#[macro_export]
macro_rules! sometimes {
    ($cond:expr, $name:expr $(,)?) => {
        let _ = $cond;
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn always_passes_on_true() {
        always!(1 + 1 == 2, "math works");
    }

    #[test]
    #[should_panic(expected = "ALWAYS violated: math is broken")]
    fn always_panics_on_false() {
        always!(1 + 1 == 3, "math is broken");
    }

    #[test]
    fn never_passes_when_condition_absent() {
        never!(1 + 1 == 3, "math never breaks");
    }

    #[test]
    fn sometimes_never_panics() {
        sometimes!(false, "rare_event");
        sometimes!(true, "rare_event");
    }

    #[cfg(feature = "sim")]
    #[test]
    fn sometimes_records_hits_when_sim_enabled() {
        let _ = crate::drain();
        sometimes!(true, "barrier_retried");
        assert!(crate::was_ever_satisfied("barrier_retried"));
    }
}
