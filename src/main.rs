use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use clap::Parser;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

use agentry::application::monitoring::agent_status::AgentStatusRegistry;
use agentry::application::scheduler::{AgentScheduler, SignalHandle};
use agentry::config::SchedulerConfig;
use agentry::domain::agent::Agent;

/// Producer/worker simulation exercising the wake/poll scheduling runtime:
/// plain threads mutate shared state (a job queue) and signal the worker
/// agents, which drain it one decision at a time.
#[derive(Parser, Debug)]
#[command(name = "agentry")]
struct Cli {
    /// Number of producer threads
    #[arg(long, default_value_t = 2)]
    producers: usize,

    /// Jobs emitted by each producer
    #[arg(long, default_value_t = 25)]
    jobs_per_producer: usize,

    /// Number of worker agents
    #[arg(long, default_value_t = 3)]
    workers: usize,
}

struct Job {
    id: usize,
    payload: String,
}

/// Worker agent: one job handled per decision pass.
struct JobWorker {
    name: String,
    jobs: Receiver<Job>,
    processed: Arc<AtomicUsize>,
}

#[async_trait]
impl Agent for JobWorker {
    fn name(&self) -> &str {
        &self.name
    }

    async fn pick_and_execute(&mut self) -> Result<bool> {
        match self.jobs.try_recv() {
            Ok(job) => {
                self.processed.fetch_add(1, Ordering::SeqCst);
                info!("{}: handled job #{} ({})", self.name, job.id, job.payload);
                Ok(true)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => Ok(false),
        }
    }
}

fn spawn_producer(
    producer_id: usize,
    jobs: usize,
    job_tx: Sender<Job>,
    wakers: Vec<SignalHandle>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        for n in 0..jobs {
            let job = Job {
                id: producer_id * jobs + n,
                payload: format!("from producer {}", producer_id),
            };
            if job_tx.send(job).is_err() {
                return;
            }
            // State changed: wake every worker. Redundant signals coalesce.
            for waker in &wakers {
                waker.signal();
            }
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();
    let config = SchedulerConfig::from_env()?;
    info!(
        "Starting simulation: {} producers x {} jobs, {} workers.",
        cli.producers, cli.jobs_per_producer, cli.workers
    );

    let registry = Arc::new(AgentStatusRegistry::new());
    let (job_tx, job_rx) = crossbeam_channel::unbounded();
    let processed = Arc::new(AtomicUsize::new(0));

    let mut schedulers = Vec::with_capacity(cli.workers);
    for i in 0..cli.workers {
        let worker = JobWorker {
            name: format!("worker-{}", i),
            jobs: job_rx.clone(),
            processed: processed.clone(),
        };
        let mut scheduler =
            AgentScheduler::with_config(worker, config.clone(), Some(registry.clone()));
        scheduler.start();
        schedulers.push(scheduler);
    }

    let wakers: Vec<SignalHandle> = schedulers.iter().map(|s| s.signal_handle()).collect();
    let producers: Vec<_> = (0..cli.producers)
        .map(|id| spawn_producer(id, cli.jobs_per_producer, job_tx.clone(), wakers.clone()))
        .collect();
    drop(job_tx);

    let total = cli.producers * cli.jobs_per_producer;
    let deadline = tokio::time::Instant::now() + Duration::from_secs(30);
    while processed.load(Ordering::SeqCst) < total {
        if tokio::time::Instant::now() >= deadline {
            anyhow::bail!(
                "Timed out: {}/{} jobs processed",
                processed.load(Ordering::SeqCst),
                total
            );
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    for producer in producers {
        producer
            .join()
            .map_err(|_| anyhow!("Producer thread panicked"))?;
    }

    for scheduler in &mut schedulers {
        scheduler.stop().await?;
    }

    let statuses = registry.get_all().await;
    info!(
        "Simulation complete: {} jobs processed.\n{}",
        processed.load(Ordering::SeqCst),
        serde_json::to_string_pretty(&statuses)?
    );

    Ok(())
}
