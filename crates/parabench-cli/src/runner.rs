// Dweve Parabench - Parametric Build Matrix and Benchmark Harness
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bounded concurrent job execution with timeouts and progress reporting.
//!
//! Compile and timing jobs are subprocess-bound, so they run as futures on a
//! single-threaded Tokio runtime. A semaphore caps the number of jobs in
//! flight, and each job may carry a timeout: on expiry its future is dropped,
//! which kills the child and every process it started.
//!
//! # Architecture
//!
//! - [`Job`] trait for the unit of work (compile one variant, time one binary)
//! - [`Runner`] fans jobs out and collects a [`RunResults`] in submission order
//! - Atomic counters for progress tracking across in-flight jobs
//! - Failures are collected, never propagated: one bad variant does not stop
//!   the others
//!
//! # Examples
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use parabench_cli::runner::{block_on, Job, Runner, RunnerConfig};
//!
//! struct Sleep(u64);
//!
//! #[async_trait]
//! impl Job for Sleep {
//!     type Output = u64;
//!
//!     async fn run(&self) -> parabench_core::Result<u64> {
//!         tokio::time::sleep(std::time::Duration::from_millis(self.0)).await;
//!         Ok(self.0)
//!     }
//!
//!     fn program(&self) -> &str {
//!         "sleep"
//!     }
//!
//!     fn parameters(&self) -> String {
//!         format!("MS={}", self.0)
//!     }
//! }
//!
//! # fn main() -> Result<(), parabench_cli::error::CliError> {
//! let runner = Runner::new(RunnerConfig::default());
//! let results = block_on(runner.run(vec![Sleep(10), Sleep(20)]))?;
//! assert_eq!(results.success_count(), 2);
//! # Ok(())
//! # }
//! ```

use crate::error::CliError;
use async_trait::async_trait;
use colored::{ColoredString, Colorize};
use parabench_core::Error;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Configuration for a job run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Maximum number of jobs in flight.
    ///
    /// Default: available parallelism
    pub max_jobs: usize,

    /// Per-job time budget. `None` lets jobs run unbounded.
    pub timeout: Option<Duration>,

    /// Number of finished jobs between progress lines. Set to 0 to disable.
    ///
    /// Default: 1 (report after each job)
    pub progress_interval: usize,

    /// Report every job by name instead of aggregate counts.
    pub verbose: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_jobs: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            timeout: None,
            progress_interval: 1,
            verbose: false,
        }
    }
}

/// Result of one job.
#[derive(Debug, Clone)]
pub struct JobResult<T> {
    /// `program [parameters]` of the job
    pub label: String,
    /// The result of running the job
    pub result: Result<T, Error>,
}

impl<T> JobResult<T> {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Failed for any reason other than a timeout.
    pub fn is_failure(&self) -> bool {
        matches!(&self.result, Err(e) if !e.is_timeout())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(&self.result, Err(e) if e.is_timeout())
    }
}

/// Aggregated results of a run, in job submission order.
#[derive(Debug, Clone)]
pub struct RunResults<T> {
    pub results: Vec<JobResult<T>>,
    /// Wall-clock duration of the whole run in milliseconds
    pub elapsed_ms: u128,
}

impl<T> RunResults<T> {
    pub fn new(results: Vec<JobResult<T>>, elapsed_ms: u128) -> Self {
        Self {
            results,
            elapsed_ms,
        }
    }

    pub fn total_jobs(&self) -> usize {
        self.results.len()
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failure()).count()
    }

    pub fn timeout_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_timeout()).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.is_success())
    }

    pub fn successes(&self) -> impl Iterator<Item = &JobResult<T>> {
        self.results.iter().filter(|r| r.is_success())
    }

    /// Failed and timed-out jobs.
    pub fn failures(&self) -> impl Iterator<Item = &JobResult<T>> {
        self.results.iter().filter(|r| !r.is_success())
    }

    /// Jobs per second.
    pub fn throughput(&self) -> f64 {
        if self.elapsed_ms == 0 {
            0.0
        } else {
            (self.total_jobs() as f64) / (self.elapsed_ms as f64 / 1000.0)
        }
    }
}

/// A unit of subprocess work for the [`Runner`].
///
/// Jobs are moved into spawned tasks, so they own what they need (shared
/// context behind an `Arc`).
#[async_trait]
pub trait Job: Send + Sync + 'static {
    /// The output of a successful run
    type Output: Send + 'static;

    /// Run the job to completion.
    ///
    /// # Errors
    ///
    /// Any [`Error`]; it is recorded against this job only.
    async fn run(&self) -> Result<Self::Output, Error>;

    /// Program the job belongs to.
    fn program(&self) -> &str;

    /// Rendered parameter vector of the job.
    fn parameters(&self) -> String;

    /// Human-readable identity used in progress and failure reports.
    fn label(&self) -> String {
        let parameters = self.parameters();
        if parameters.is_empty() {
            self.program().to_string()
        } else {
            format!("{} [{}]", self.program(), parameters)
        }
    }
}

/// Progress tracker shared by in-flight jobs.
#[derive(Debug)]
struct ProgressTracker {
    total: usize,
    processed: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    timed_out: AtomicUsize,
    interval: usize,
    verbose: bool,
    start_time: Instant,
}

impl ProgressTracker {
    fn new(total: usize, interval: usize, verbose: bool) -> Self {
        Self {
            total,
            processed: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            timed_out: AtomicUsize::new(0),
            interval,
            verbose,
            start_time: Instant::now(),
        }
    }

    fn record_success(&self, label: &str) {
        let processed = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        self.succeeded.fetch_add(1, Ordering::Relaxed);

        if self.should_report(processed) {
            self.report_progress(label, true);
        }
    }

    fn record_failure(&self, label: &str, error: &Error) {
        let processed = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        if error.is_timeout() {
            self.timed_out.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }

        if self.verbose {
            eprintln!("{} {} - {}", "✗".red().bold(), label, error);
        }

        if self.should_report(processed) {
            self.report_progress(label, false);
        }
    }

    fn should_report(&self, processed: usize) -> bool {
        self.interval > 0 && (processed % self.interval == 0 || processed == self.total)
    }

    fn report_progress(&self, current: &str, success: bool) {
        let processed = self.processed.load(Ordering::Relaxed);
        let succeeded = self.succeeded.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let timed_out = self.timed_out.load(Ordering::Relaxed);
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            processed as f64 / elapsed
        } else {
            0.0
        };

        if self.verbose {
            let status = if success {
                "✓".green().bold()
            } else {
                "✗".red().bold()
            };
            eprintln!(
                "{} [{}/{}] {} ({:.1} jobs/s)",
                status, processed, self.total, current, rate
            );
        } else {
            eprintln!(
                "Progress: [{}/{}] {} succeeded, {} failed, {} timed out ({:.1} jobs/s)",
                processed, self.total, succeeded, failed, timed_out, rate
            );
        }
    }
}

/// Runs [`Job`]s with bounded concurrency.
#[derive(Debug, Clone)]
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run every job and collect the results in submission order.
    ///
    /// Must be called within a Tokio runtime (see [`block_on`]).
    pub async fn run<J: Job>(&self, jobs: Vec<J>) -> RunResults<J::Output> {
        let start_time = Instant::now();
        let total = jobs.len();
        if total == 0 {
            return RunResults::new(Vec::new(), 0);
        }

        let tracker = Arc::new(ProgressTracker::new(
            total,
            self.config.progress_interval,
            self.config.verbose,
        ));
        let permits = Arc::new(Semaphore::new(self.config.max_jobs.max(1)));
        let timeout = self.config.timeout;

        let labels: Vec<String> = jobs.iter().map(Job::label).collect();
        let mut tasks = JoinSet::new();
        for ((index, job), label) in jobs.into_iter().enumerate().zip(labels.iter().cloned()) {
            let tracker = Arc::clone(&tracker);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let result = match permits.acquire_owned().await {
                    Ok(permit) => {
                        let result = run_job(&job, timeout).await;
                        drop(permit);
                        result
                    }
                    Err(e) => Err(Error::aborted(&label, format!("job pool closed: {}", e))),
                };

                match &result {
                    Ok(_) => tracker.record_success(&label),
                    Err(e) => {
                        warn!(
                            program = %job.program(),
                            parameters = %job.parameters(),
                            error = %e,
                            "job failed"
                        );
                        tracker.record_failure(&label, e);
                    }
                }
                (index, JobResult { label, result })
            });
        }

        let mut slots: Vec<Option<JobResult<J::Output>>> = (0..total).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => warn!(error = %e, "job task aborted"),
            }
        }

        // A task that panicked left its slot empty.
        let results: Vec<_> = slots
            .into_iter()
            .zip(labels)
            .map(|(slot, label)| {
                slot.unwrap_or_else(|| {
                    let error = Error::aborted(&label, "job task panicked");
                    tracker.record_failure(&label, &error);
                    JobResult {
                        label,
                        result: Err(error),
                    }
                })
            })
            .collect();
        debug!(jobs = results.len(), "run finished");
        RunResults::new(results, start_time.elapsed().as_millis())
    }
}

async fn run_job<J: Job>(job: &J, timeout: Option<Duration>) -> Result<J::Output, Error> {
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, job.run()).await {
            Ok(result) => result,
            Err(_) => Err(Error::timeout(job.label(), limit)),
        },
        None => job.run().await,
    }
}

/// Drive a future to completion on a fresh current-thread runtime.
///
/// Ctrl-C drops the future and every task on the runtime, which kills the
/// subprocesses they were waiting on.
///
/// # Errors
///
/// [`CliError::Runtime`] if the runtime cannot be built or the run was
/// interrupted.
pub fn block_on<F: Future>(future: F) -> Result<F::Output, CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;
    runtime.block_on(async move {
        tokio::select! {
            output = future => Ok(output),
            Ok(()) = tokio::signal::ctrl_c() => {
                warn!("interrupted, stopping running jobs");
                Err(CliError::Runtime("interrupted".to_string()))
            }
        }
    })
}

/// Tone of a summary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Good,
    Bad,
}

/// Print a boxed run summary to stdout.
///
/// ```text
/// ════════════════════════════════════════════════════════════
/// Build: compile variants
/// ════════════════════════════════════════════════════════════
///   Planned: 6
///   Compiled: 5
///   Failed: 1
///   Elapsed: 2.31s
/// ════════════════════════════════════════════════════════════
/// ```
pub fn print_summary(title: &str, operation: &str, rows: &[(&str, usize, Tone)], elapsed_ms: u128) {
    println!();
    println!("{}", "═".repeat(60).bright_blue());
    println!("{} {}", format!("{}:", title).bright_blue().bold(), operation.bright_white());
    println!("{}", "═".repeat(60).bright_blue());
    for (label, count, tone) in rows {
        let label = format!("{}:", label);
        let label: ColoredString = match tone {
            Tone::Neutral => label.bright_cyan(),
            Tone::Good => label.green().bold(),
            Tone::Bad if *count > 0 => label.red().bold(),
            Tone::Bad => label.bright_cyan(),
        };
        println!("  {} {}", label, count.to_string().bright_white());
    }
    println!(
        "  {} {:.2}s",
        "Elapsed:".bright_cyan(),
        elapsed_ms as f64 / 1000.0
    );
    println!("{}", "═".repeat(60).bright_blue());
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SleepJob {
        id: usize,
        delay_ms: u64,
        fail: bool,
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Job for SleepJob {
        type Output = usize;

        async fn run(&self) -> Result<usize, Error> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.fail {
                Err(Error::timing_parse("bad report"))
            } else {
                Ok(self.id)
            }
        }

        fn program(&self) -> &str {
            "sleep"
        }

        fn parameters(&self) -> String {
            format!("ID={}", self.id)
        }
    }

    fn sleep_jobs(delays: &[u64], failing: &[usize]) -> (Vec<SleepJob>, Arc<AtomicUsize>) {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let jobs = delays
            .iter()
            .enumerate()
            .map(|(id, &delay_ms)| SleepJob {
                id,
                delay_ms,
                fail: failing.contains(&id),
                in_flight: Arc::clone(&in_flight),
                peak: Arc::clone(&peak),
            })
            .collect();
        (jobs, peak)
    }

    fn config(max_jobs: usize, timeout: Option<Duration>) -> RunnerConfig {
        RunnerConfig {
            max_jobs,
            timeout,
            progress_interval: 0,
            verbose: false,
        }
    }

    #[tokio::test]
    async fn test_results_keep_submission_order() {
        let (jobs, _) = sleep_jobs(&[30, 1, 15, 5], &[]);
        let results = Runner::new(config(4, None)).run(jobs).await;

        let ids: Vec<usize> = results
            .results
            .iter()
            .map(|r| *r.result.as_ref().unwrap())
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert!(results.all_succeeded());
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let (jobs, peak) = sleep_jobs(&[10; 8], &[]);
        let results = Runner::new(config(2, None)).run(jobs).await;
        assert_eq!(results.success_count(), 8);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_others() {
        let (jobs, _) = sleep_jobs(&[1, 1, 1], &[1]);
        let results = Runner::new(config(1, None)).run(jobs).await;

        assert_eq!(results.success_count(), 2);
        assert_eq!(results.failure_count(), 1);
        assert_eq!(results.timeout_count(), 0);
        let failed: Vec<&str> = results.failures().map(|r| r.label.as_str()).collect();
        assert_eq!(failed, vec!["sleep [ID=1]"]);
    }

    #[tokio::test]
    async fn test_timeout_is_reported_separately() {
        let (jobs, _) = sleep_jobs(&[1, 5_000], &[]);
        let results = Runner::new(config(2, Some(Duration::from_millis(100))))
            .run(jobs)
            .await;

        assert_eq!(results.success_count(), 1);
        assert_eq!(results.failure_count(), 0);
        assert_eq!(results.timeout_count(), 1);
        assert!(results.results[1].is_timeout());
    }

    struct PanickingJob;

    #[async_trait]
    impl Job for PanickingJob {
        type Output = usize;

        async fn run(&self) -> Result<usize, Error> {
            panic!("job blew up");
        }

        fn program(&self) -> &str {
            "panicking"
        }

        fn parameters(&self) -> String {
            String::new()
        }
    }

    #[tokio::test]
    async fn test_panicked_job_is_counted_as_failure() {
        let results = Runner::new(config(2, None))
            .run(vec![PanickingJob, PanickingJob])
            .await;

        assert_eq!(results.total_jobs(), 2);
        assert_eq!(results.failure_count(), 2);
        assert_eq!(results.results[0].label, "panicking");
        assert!(matches!(
            results.results[1].result,
            Err(Error::Aborted { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_run() {
        let results = Runner::new(config(4, None)).run(Vec::<SleepJob>::new()).await;
        assert_eq!(results.total_jobs(), 0);
        assert_eq!(results.throughput(), 0.0);
    }

    #[test]
    fn test_block_on_runs_future() {
        assert_eq!(block_on(async { 7 }).unwrap(), 7);
    }
}
