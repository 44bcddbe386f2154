use clap::Parser;
use dispatch_sim::metrics::{fmt_opt, MetricsSummary};
use dispatch_sim::request::{load_csv, save_records_csv, save_requests_csv};
use dispatch_sim::simulation::telemetry;
use dispatch_sim::{Config, Request, RequestGenerator, Simulator};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[cfg(feature = "cli")]
use colored::Colorize;
#[cfg(feature = "cli")]
use tabled::{settings::Style, Table, Tabled};

#[derive(Parser, Debug)]
#[command(author, version, about = "Worker pool and rate-limited gateway simulator", long_about = None)]
struct Args {
    /// Request CSV (user_id,request_time,processing_time). Without it the
    /// [workload] section of the config generates requests.
    input: Option<PathBuf>,

    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Queue policy: priority or fifo
    #[arg(long)]
    policy: Option<String>,

    /// Maximum queue length (fifo policy only)
    #[arg(long)]
    queue_size: Option<usize>,

    /// Random seed for queue selection and fault injection
    #[arg(long)]
    seed: Option<u64>,

    /// Minimal output (final metrics only)
    #[arg(short, long)]
    quiet: bool,

    /// Print every telemetry point during the run
    #[arg(short, long)]
    verbose: bool,

    /// Very verbose debug output
    #[arg(long)]
    debug: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Save metrics to JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save per-request records to CSV
    #[arg(long)]
    records: Option<PathBuf>,

    /// Save the telemetry series to CSV
    #[arg(long)]
    telemetry: Option<PathBuf>,

    /// Directory for telemetry charts
    #[cfg(feature = "cli")]
    #[arg(long)]
    plots: Option<PathBuf>,

    /// Write the generated workload to this CSV and exit
    #[arg(long)]
    generate: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum VerbosityLevel {
    Quiet,
    Normal,
    Verbose,
    Debug,
}

impl Args {
    fn verbosity_level(&self) -> VerbosityLevel {
        if self.debug {
            VerbosityLevel::Debug
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else if self.quiet {
            VerbosityLevel::Quiet
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Command-line values take precedence over the file
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(workers) = self.workers {
            config.simulation.num_workers = workers;
        }
        if let Some(policy) = &self.policy {
            config.queue.policy = policy.clone();
        }
        if let Some(size) = self.queue_size {
            config.queue.max_size = Some(size);
        }
        if let Some(seed) = self.seed {
            config.simulation.seed = seed;
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Tabled)]
struct QueuingRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "p50")]
    p50: String,
    #[tabled(rename = "p75")]
    p75: String,
    #[tabled(rename = "p90")]
    p90: String,
    #[tabled(rename = "p99")]
    p99: String,
}

#[cfg(feature = "cli")]
#[derive(Tabled)]
struct EndpointRow {
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Requests")]
    requests: u64,
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", context, err);
    std::process::exit(1);
}

#[cfg(feature = "cli")]
fn heading(text: &str, use_color: bool) {
    if use_color {
        println!("\n{}", text.yellow().bold());
    } else {
        println!("\n{}", text);
    }
}

#[cfg(not(feature = "cli"))]
fn heading(text: &str, _use_color: bool) {
    println!("\n{}", text);
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    let verbosity = args.verbosity_level();
    let use_color = !args.no_color;

    if verbosity >= VerbosityLevel::Normal {
        #[cfg(feature = "cli")]
        if use_color {
            println!("{}", "Dispatch Simulator".bright_cyan().bold());
        } else {
            println!("Dispatch Simulator");
        }
        #[cfg(not(feature = "cli"))]
        println!("Dispatch Simulator");
    }

    // Load configuration
    let mut config = match &args.config {
        Some(path) => {
            if verbosity >= VerbosityLevel::Normal {
                println!("Loading configuration from: {:?}", path);
            }
            Config::from_file(path).unwrap_or_else(|e| fail("Error loading configuration", e))
        }
        None => Config::default(),
    };
    args.apply_overrides(&mut config);
    if let Err(e) = config.validate() {
        fail("Error in configuration", e);
    }

    let requests = load_requests(&args, &config);

    if let Some(path) = &args.generate {
        save_requests_csv(path, &requests)
            .unwrap_or_else(|e| fail("Error writing generated workload", e));
        println!("Wrote {} requests to {:?}", requests.len(), path);
        return;
    }

    if verbosity >= VerbosityLevel::Normal {
        heading("Configuration:", use_color);
        println!("  Requests: {}", requests.len());
        println!("  Workers: {}", config.simulation.num_workers);
        println!(
            "  Queue: {}{}",
            config.queue.policy,
            config
                .queue
                .max_size
                .map(|n| format!(" (max {})", n))
                .unwrap_or_default()
        );
        println!(
            "  Gateway: {} endpoints, {} calls per {}s each, {:.1}% server errors",
            config.gateway.num_endpoints,
            config.gateway.rate_limit_per_minute,
            config.gateway.window_secs,
            config.gateway.fault_probability * 100.0
        );
        println!("  Seed: {}", config.simulation.seed);
        println!();
    }

    let mut simulator = Simulator::new(requests, &config)
        .unwrap_or_else(|e| fail("Error creating simulator", e));

    let start_time = Instant::now();

    let result = match verbosity {
        VerbosityLevel::Quiet | VerbosityLevel::Debug => simulator.run(),
        VerbosityLevel::Normal => run_with_dashboard(&mut simulator, use_color),
        VerbosityLevel::Verbose => run_verbose(&mut simulator),
    };
    let records = result.unwrap_or_else(|e| fail("Simulation failed", e));

    let elapsed = start_time.elapsed();

    let summary = simulator.get_metrics_summary();
    if verbosity == VerbosityLevel::Debug {
        summary.print();
    } else {
        print_final_metrics(
            &summary,
            simulator.get_current_time(),
            elapsed,
            verbosity,
            use_color,
        );
    }

    if let Some(output_path) = &args.output {
        match save_metrics_json(&summary, output_path) {
            Ok(_) => {
                if verbosity >= VerbosityLevel::Normal {
                    println!("\nMetrics saved to: {:?}", output_path);
                }
            }
            Err(e) => eprintln!("Error saving metrics to JSON: {}", e),
        }
    }

    if let Some(path) = &args.records {
        match save_records_csv(path, &records) {
            Ok(_) => {
                if verbosity >= VerbosityLevel::Normal {
                    println!("Records saved to: {:?}", path);
                }
            }
            Err(e) => eprintln!("Error saving records: {}", e),
        }
    }

    if let Some(path) = &args.telemetry {
        match telemetry::save_csv(path, simulator.get_time_series_data()) {
            Ok(_) => {
                if verbosity >= VerbosityLevel::Normal {
                    println!("Telemetry saved to: {:?}", path);
                }
            }
            Err(e) => eprintln!("Error saving telemetry: {}", e),
        }
    }

    #[cfg(feature = "cli")]
    if let Some(dir) = &args.plots {
        match dispatch_sim::visualization::plot_telemetry(simulator.get_time_series_data(), dir) {
            Ok(paths) => {
                if verbosity >= VerbosityLevel::Normal {
                    println!("\nGenerated plots:");
                    for path in paths {
                        println!("  - {}", path.display());
                    }
                }
            }
            Err(e) => eprintln!("Error generating plots: {}", e),
        }
    }
}

fn load_requests(args: &Args, config: &Config) -> Vec<Request> {
    match &args.input {
        Some(path) if args.generate.is_none() => {
            load_csv(path).unwrap_or_else(|e| fail("Error loading requests", e))
        }
        _ => RequestGenerator::new(config.workload.clone(), config.workload_seed()).generate_all(),
    }
}

fn run_with_dashboard(
    simulator: &mut Simulator,
    use_color: bool,
) -> Result<Vec<Request>, dispatch_sim::SimError> {
    let rule = "━".repeat(60);
    #[cfg(feature = "cli")]
    if use_color {
        println!("{}", rule.bright_black());
        println!("{}", "Simulation Progress".bright_cyan().bold());
        println!("{}", rule.bright_black());
    } else {
        println!("{}\nSimulation Progress\n{}", rule, rule);
    }
    #[cfg(not(feature = "cli"))]
    println!("{}\nSimulation Progress\n{}", rule, rule);

    let mut first_update = true;
    let num_lines = 5; // lines the dashboard uses, including the final rule

    simulator.run_with_callback(|progress| {
        let total = progress.total_requests.max(1);
        let percent = (progress.finished_requests as f64 / total as f64 * 100.0).min(100.0);
        let bar_width = 40;
        let filled = (bar_width as f64 * percent / 100.0) as usize;
        let bar: String = "█".repeat(filled) + &"░".repeat(bar_width - filled);

        if !first_update {
            // Move the cursor up and clear the previous dashboard
            print!("\x1B[{}A\x1B[J", num_lines);
        }
        first_update = false;

        let point = progress.point;
        let progress_line = format!(
            "  Progress: [{}] {}/{} ({:.0}%)",
            bar, progress.finished_requests, progress.total_requests, percent
        );
        let time_line = format!("  Time:     {:.1}s simulated", progress.current_time);
        let queue_line = format!(
            "  Queue:    {} expedited, {} standard, {} busy workers",
            point.expedited_depth, point.standard_depth, progress.busy_workers
        );
        let gateway_line = format!(
            "  Gateway:  {:.1} calls/min, {} rejected, {} server errors",
            point.gateway_calls_per_minute, point.cumulative_rejected, point.cumulative_faulted
        );

        print_dashboard(
            [
                progress_line.as_str(),
                time_line.as_str(),
                queue_line.as_str(),
                gateway_line.as_str(),
            ],
            &rule,
            use_color,
        );
    })
}

#[cfg(feature = "cli")]
fn print_dashboard(lines: [&str; 4], rule: &str, use_color: bool) {
    let [progress, time, queue, gateway] = lines;
    if use_color {
        println!("{}", progress.cyan());
        println!("{}", time.yellow());
        println!("{}", queue.green());
        println!("{}", gateway.magenta());
        println!("{}", rule.bright_black());
    } else {
        println!("{}\n{}\n{}\n{}\n{}", progress, time, queue, gateway, rule);
    }
}

#[cfg(not(feature = "cli"))]
fn print_dashboard(lines: [&str; 4], rule: &str, _use_color: bool) {
    let [progress, time, queue, gateway] = lines;
    println!("{}\n{}\n{}\n{}\n{}", progress, time, queue, gateway, rule);
}

fn run_verbose(simulator: &mut Simulator) -> Result<Vec<Request>, dispatch_sim::SimError> {
    println!("Starting simulation...");
    simulator.run_with_callback(|progress| {
        let point = progress.point;
        println!(
            "[{:.1}s] {}/{} finished | expedited {} standard {} | busy {} | ok {} rejected {} errors {} | {:.1} calls/min",
            progress.current_time,
            progress.finished_requests,
            progress.total_requests,
            point.expedited_depth,
            point.standard_depth,
            progress.busy_workers,
            point.cumulative_succeeded,
            point.cumulative_rejected,
            point.cumulative_faulted,
            point.gateway_calls_per_minute,
        );
    })
}

#[cfg(feature = "cli")]
fn print_final_metrics(
    summary: &MetricsSummary,
    sim_time: f64,
    real_time: std::time::Duration,
    verbosity: VerbosityLevel,
    use_color: bool,
) {
    if verbosity == VerbosityLevel::Quiet {
        println!(
            "Simulating... done ({:.1}s simulated, {:.2}s real)",
            sim_time,
            real_time.as_secs_f64()
        );
        println!(
            "Queuing: {}s mean (p50: {}s, p99: {}s)",
            fmt_opt(summary.queuing.mean),
            fmt_opt(summary.queuing.p50),
            fmt_opt(summary.queuing.p99)
        );
        println!(
            "Processed: {}/{} ({} rejected)",
            summary.processed_requests, summary.total_requests, summary.rejected_requests
        );
        return;
    }

    if use_color {
        println!(
            "\n{} ({:.1}s simulated, {:.2}s real)",
            "Simulation Complete".bright_green().bold(),
            sim_time,
            real_time.as_secs_f64()
        );
        println!("{}", "━".repeat(80).bright_black());
    } else {
        println!(
            "\nSimulation Complete ({:.1}s simulated, {:.2}s real)",
            sim_time,
            real_time.as_secs_f64()
        );
        println!("{}", "━".repeat(80));
    }

    heading("QUEUING TIME", use_color);
    let rows = vec![QueuingRow {
        metric: "Queuing time (s)".to_string(),
        mean: fmt_opt(summary.queuing.mean),
        p50: fmt_opt(summary.queuing.p50),
        p75: fmt_opt(summary.queuing.p75),
        p90: fmt_opt(summary.queuing.p90),
        p99: fmt_opt(summary.queuing.p99),
    }];
    println!("{}", Table::new(&rows).with(Style::rounded()));
    println!("  • End-to-end latency: {}s mean", fmt_opt(summary.latency_mean));

    heading("GATEWAY USAGE", use_color);
    let mut endpoint_rows: Vec<EndpointRow> = summary
        .endpoint_usage
        .iter()
        .enumerate()
        .map(|(endpoint, &requests)| EndpointRow {
            endpoint: endpoint.to_string(),
            requests,
        })
        .collect();
    endpoint_rows.push(EndpointRow {
        endpoint: "none".to_string(),
        requests: summary.unserved_requests,
    });
    println!("{}", Table::new(&endpoint_rows).with(Style::rounded()));
    println!("  • Ended on a server error: {}", summary.faulted_requests);

    heading("QUEUES", use_color);
    println!("  • Expedited admitted: {}", summary.expedited_admitted);
    println!("  • Standard admitted:  {}", summary.standard_admitted);

    heading("SUMMARY", use_color);
    println!(
        "  • Requests: {} processed, {} rejected, {} total",
        summary.processed_requests, summary.rejected_requests, summary.total_requests
    );
    println!("  • Throughput: {:.3} requests/s", summary.requests_per_sec);
    println!(
        "  • Worker utilization: {:.1}%",
        summary.worker_utilization * 100.0
    );
    println!("  • Simulation Time: {:.1}s", sim_time);
    println!("  • Real Time: {:.2}s", real_time.as_secs_f64());
}

#[cfg(not(feature = "cli"))]
fn print_final_metrics(
    summary: &MetricsSummary,
    sim_time: f64,
    _real_time: std::time::Duration,
    _verbosity: VerbosityLevel,
    _use_color: bool,
) {
    println!("\nSimulation Complete ({:.1}s)", sim_time);
    println!(
        "Queuing: {}s mean (p50: {}s)",
        fmt_opt(summary.queuing.mean),
        fmt_opt(summary.queuing.p50)
    );
    println!(
        "Processed: {}/{} ({} rejected)",
        summary.processed_requests, summary.total_requests, summary.rejected_requests
    );
}

fn save_metrics_json(
    summary: &MetricsSummary,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    use serde_json::json;

    let json_data = json!({
        "queuing_time_s": {
            "mean": summary.queuing.mean,
            "p50": summary.queuing.p50,
            "p75": summary.queuing.p75,
            "p90": summary.queuing.p90,
            "p99": summary.queuing.p99,
        },
        "latency_mean_s": summary.latency_mean,
        "gateway": {
            "endpoint_usage": summary.endpoint_usage,
            "unserved": summary.unserved_requests,
            "faulted": summary.faulted_requests,
        },
        "queues": {
            "expedited_admitted": summary.expedited_admitted,
            "standard_admitted": summary.standard_admitted,
        },
        "throughput": {
            "requests_per_sec": summary.requests_per_sec,
            "worker_utilization": summary.worker_utilization,
        },
        "requests": {
            "total": summary.total_requests,
            "processed": summary.processed_requests,
            "rejected": summary.rejected_requests,
            "succeeded": summary.succeeded_requests,
        },
        "simulated_time_s": summary.simulated_time,
    });

    std::fs::write(path, serde_json::to_string_pretty(&json_data)?)?;
    Ok(())
}
