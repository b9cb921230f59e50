//! Repeated execution of a request, in the foreground or on a background
//! thread that can be cancelled and joined.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{anyhow, Result};
use console::style;
use tokio::runtime::{Builder, Runtime};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::render;
use crate::session::Session;

/// Outcome of a repeat run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatSummary {
    pub issued: u32,
    pub last_status: i64,
    pub cancelled: bool,
    /// Whether the last observed status code lies in 2000..=3000
    pub success: bool,
}

/// Timer for the pauses of a worker. Requests stay blocking and run outside
/// of the runtime.
pub(crate) struct Pause {
    runtime: Runtime,
}

impl Pause {
    pub(crate) fn new() -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_time().build()?;
        Ok(Self { runtime })
    }

    /// Wait for `duration` unless `token` is cancelled first. Returns whether
    /// it was cancelled.
    pub(crate) fn wait(&self, token: &CancellationToken, duration: Duration) -> bool {
        self.runtime.block_on(async {
            tokio::select! {
                _ = token.cancelled() => true,
                _ = tokio::time::sleep(duration) => false,
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct Repeat {
    times: u32,
    interval: Duration,
    verbose: Option<bool>,
}

impl Repeat {
    pub fn new(times: u32) -> Self {
        Self {
            times,
            interval: Duration::ZERO,
            verbose: None,
        }
    }

    /// Pause between two requests
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Verbosity while the requests run; defaults to the session's.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Run `request` in the calling thread.
    pub fn run<F: FnMut()>(&self, session: &Session, request: F) -> Result<RepeatSummary> {
        self.run_until(session, &CancellationToken::new(), request)
    }

    /// Run `request` on a worker thread.
    pub fn spawn<F>(self, session: Session, request: F) -> RepeatHandle
    where
        F: FnMut() + Send + 'static,
    {
        let token = CancellationToken::new();
        let worker_token = token.clone();
        let thread = thread::spawn(move || self.run_until(&session, &worker_token, request));
        RepeatHandle { token, thread }
    }

    fn run_until<F: FnMut()>(
        &self,
        session: &Session,
        token: &CancellationToken,
        mut request: F,
    ) -> Result<RepeatSummary> {
        let pause = Pause::new()?;
        let verbose = self.verbose.unwrap_or_else(|| session.is_verbose());
        let mut issued = 0;

        for i in 1..=self.times {
            if token.is_cancelled() {
                break;
            }
            if verbose {
                println!("{}", style(format!("## Request {}", i)).dim().bold());
            }

            // every status is reported while repeating
            let with_results = session.with_results();
            let old = session.verbose(verbose, true);
            request();
            session.verbose(old, with_results);
            issued += 1;
            debug!("Repeat {}/{} finished", i, self.times);

            if i < self.times && !self.interval.is_zero() && pause.wait(token, self.interval) {
                break;
            }
        }

        let last_status = session.last_response_status();
        let summary = RepeatSummary {
            issued,
            last_status,
            cancelled: token.is_cancelled(),
            success: (2000..=3000).contains(&last_status),
        };
        if summary.success {
            render::print_success("Finished successful");
        } else {
            render::print_failure("Finished with errors");
        }
        Ok(summary)
    }
}

/// A repeat run in progress on a background thread
#[derive(Debug)]
pub struct RepeatHandle {
    token: CancellationToken,
    thread: JoinHandle<Result<RepeatSummary>>,
}

impl RepeatHandle {
    /// Stop after the request currently in flight
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Wait for the run to finish
    pub fn join(self) -> Result<RepeatSummary> {
        self.thread
            .join()
            .map_err(|_| anyhow!("Repeat worker panicked"))?
    }
}
