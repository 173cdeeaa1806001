use sanity::*;
use rayon::prelude::*;
use itertools::Itertools;

/// Runs many random scenarios in parallel, checking
/// every tick of every one of them.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of scenarios
    #[arg(short, long, default_value_t = 1000)]
    runs:           u64,

    /// Seed of the first scenario; run `i` uses `seed + i`
    #[arg(short, long, default_value_t = 62)]
    seed:           u64,

    /// Size of the address space
    #[arg(short, long, default_value_t = TOTAL_MEMORY)]
    total_memory:   MemUnits,

    /// Largest scenario to generate
    #[arg(short, long, default_value_t = 20)]
    max_processes:  usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Args::parse();
    let cfg = SimConfig {
        total_memory:   cli.total_memory,
        max_processes:  cli.max_processes,
        ..Default::default()
    };

    let (passed, failed): (Vec<_>, Vec<_>) = (0..cli.runs)
        .into_par_iter()
        .map(|i| {
            let seed = cli.seed + i;
            (seed, run_seeded(seed, &cfg))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .partition(|(_, outcome)| outcome.is_ok());

    for (seed, outcome) in &failed {
        if let Err(e) = outcome {
            println!("Seed {}: {}", seed, e);
        }
    }

    let traces = passed.into_iter()
        .filter_map(|(_, outcome)| outcome.ok())
        .collect_vec();
    let ticks: usize = traces.iter().map(|t| t.ticks.len()).sum();
    let processes: usize = traces.iter().map(|t| t.processes.len()).sum();
    let worst = traces.iter()
        .filter_map(|t| t.max_turnaround)
        .max()
        .unwrap_or(0);
    let longest = traces.iter()
        .filter_map(|t| t.makespan)
        .max()
        .unwrap_or(0);
    let means = traces.iter()
        .filter_map(|t| t.mean_turnaround)
        .collect_vec();
    let mean = if means.is_empty() { 0.0 } else { means.iter().sum::<f64>() / means.len() as f64 };

    println!("Scenarios:\t\t{} ({} failed)", cli.runs, failed.len());
    println!("Processes:\t\t{}", processes);
    println!("Ticks simulated:\t{}", ticks);
    println!("Mean turnaround:\t{:.2}", mean);
    println!("Worst turnaround:\t{}", worst);
    println!("Longest run:\t\t{}", longest);

    if !failed.is_empty() {
        anyhow::bail!("{} of {} scenarios failed", failed.len(), cli.runs);
    }

    Ok(())
}
