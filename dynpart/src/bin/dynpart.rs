use dynpart::*;

/// Dynamic partitioning memory management simulation
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a CSV scenario (header, then `arrival,service,size` per line)
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    #[arg(required_unless_present = "interactive", conflicts_with = "interactive")]
    input:          Option<PathBuf>,

    /// Ask for the scenario on the terminal instead
    #[arg(long)]
    interactive:    bool,

    /// Size of the address space
    #[arg(short, long, default_value_t = TOTAL_MEMORY)]
    total_memory:   MemUnits,

    /// Capacity of the process table
    #[arg(long, default_value_t = MAX_PROCESSES)]
    max_processes:  usize,

    /// Smallest accepted scenario
    #[arg(long, default_value_t = MIN_PROCESSES)]
    min_processes:  usize,

    /// Print only the final statistics
    #[arg(short, long)]
    quiet:          bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Args::parse();
    let cfg = SimConfig {
        total_memory:   cli.total_memory,
        max_processes:  cli.max_processes,
        min_processes:  cli.min_processes,
    };

    let specs = match cli.input {
        Some(path)  => {
            CsvParser::from_path(&path)?.read_specs()?
        },
        None        => {
            println!("\n\t\t_____________ Dynamic Partitioning Memory Management Simulation _____________");
            let stdin = std::io::stdin();
            PromptParser::new(stdin.lock(), std::io::stdout(), &cfg).read_specs()?
        }
    };

    let mut sim = Simulation::new(cfg, specs)?;
    info!("Simulating {} processes in {} units.", sim.registry().len(), cfg.total_memory);
    let summary = sim.run(|report| {
        if !cli.quiet {
            println!("\n{}", report);
        }
    })?;

    println!("\n________________ Simulation Complete __________________\n");
    println!("{}", summary);

    Ok(())
}
