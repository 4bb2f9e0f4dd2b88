use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crossbeam::channel::{Receiver, RecvTimeoutError, TryRecvError};
use tracing::{debug, span, warn, Level};
use typed_builder::TypedBuilder;

use crate::{Acquisition, OutcomeCode, Publisher, Transport};

/// Runs acquisition cycles at a fixed rate and forwards each decoded ensemble to a
/// [Publisher].
///
/// Cycles are strictly sequential and independent; a failed cycle publishes nothing
/// and the next scheduled cycle is the only retry.
///
/// # Example
/// ```
/// use dvl::{DvlEnsemble, Poller, ReaderTransport, Result};
///
/// let poller = Poller::builder().rate_hz(100.0).max_cycles(2).build();
/// let mut transport = ReaderTransport::new(&[][..]);
/// let mut published = Vec::new();
/// let stats = poller.run(
///     &mut transport,
///     &mut |ens: DvlEnsemble| -> Result<()> {
///         published.push(ens);
///         Ok(())
///     },
///     &crossbeam::channel::never(),
/// );
/// assert_eq!(stats.cycles, 2);
/// assert!(published.is_empty());
/// ```
#[derive(TypedBuilder, Debug, Clone)]
pub struct Poller {
    #[builder(default)]
    acquisition: Acquisition,
    /// Target cycles per second.
    #[builder(default = 10.0)]
    rate_hz: f64,
    /// Stop after this many cycles; 0 runs none. Runs until shutdown if not set.
    #[builder(default, setter(strip_option))]
    max_cycles: Option<u64>,
}

impl Default for Poller {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Counts collected over the lifetime of a [Poller::run].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PollStats {
    pub cycles: u64,
    pub published: u64,
    pub publish_errors: u64,
    /// Failed cycles by outcome.
    pub failures: BTreeMap<OutcomeCode, u64>,
}

impl Poller {
    /// Time between the starts of consecutive cycles.
    #[must_use]
    pub fn period(&self) -> Duration {
        if self.rate_hz.is_finite() && self.rate_hz > 0.0 {
            Duration::from_secs_f64(1.0 / self.rate_hz)
        } else {
            Duration::ZERO
        }
    }

    /// Run cycles until `max_cycles` is reached or `shutdown` receives a message or is
    /// disconnected. Pass [crossbeam::channel::never] to run without a shutdown signal.
    ///
    /// Shutdown is only observed between cycles. If a cycle takes longer than the
    /// period the next cycle begins immediately.
    pub fn run<T, P>(&self, transport: &mut T, publisher: &mut P, shutdown: &Receiver<()>) -> PollStats
    where
        T: Transport + ?Sized,
        P: Publisher + ?Sized,
    {
        let period = self.period();
        let mut stats = PollStats::default();

        if self.max_cycles == Some(0) {
            return stats;
        }
        if let Ok(()) | Err(TryRecvError::Disconnected) = shutdown.try_recv() {
            debug!("shutdown before first cycle");
            return stats;
        }

        loop {
            let start = Instant::now();
            stats.cycles += 1;

            let span = span!(Level::TRACE, "cycle", num = stats.cycles);
            let guard = span.enter();
            match self.acquisition.acquire(transport) {
                Ok(ensemble) => match publisher.publish(ensemble) {
                    Ok(()) => stats.published += 1,
                    Err(err) => {
                        warn!("failed to publish ensemble: {err}");
                        stats.publish_errors += 1;
                    }
                },
                Err(err) => {
                    debug!(code = %err.code(), "acquisition failed: {err}");
                    *stats.failures.entry(err.code()).or_default() += 1;
                }
            }
            drop(guard);

            if self.max_cycles.is_some_and(|max| stats.cycles >= max) {
                break;
            }

            let remaining = period.saturating_sub(start.elapsed());
            match shutdown.recv_timeout(remaining) {
                Err(RecvTimeoutError::Timeout) => (),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    debug!(cycles = stats.cycles, "shutdown requested");
                    break;
                }
            }
        }

        stats
    }
}
