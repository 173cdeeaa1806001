use sanity::*;
use std::fs::File;
use std::io::BufWriter;
use log::info;

/// Runs a CSV scenario, checks every tick of it,
/// and dumps the whole run as JSON.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a CSV scenario
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    input:          PathBuf,

    /// Where to write the trace (stdout if absent)
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    output:         Option<PathBuf>,

    /// Size of the address space
    #[arg(short, long, default_value_t = TOTAL_MEMORY)]
    total_memory:   MemUnits,

    /// Indent the JSON output
    #[arg(short, long)]
    pretty:         bool,
}

fn write_trace<W: Write>(w: W, trace: &Trace, pretty: bool) -> serde_json::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(w, trace)
    } else {
        serde_json::to_writer(w, trace)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Args::parse();
    let cfg = SimConfig {
        total_memory:   cli.total_memory,
        ..Default::default()
    };

    let sim = read_from_path(cli.input, cfg)?;
    let trace = Trace::record(sim)?;
    info!("All {} ticks check out.", trace.ticks.len());

    match cli.output {
        Some(path)  => {
            let mut w = BufWriter::new(File::create(path)?);
            write_trace(&mut w, &trace, cli.pretty)?;
            w.flush()?;
        },
        None        => {
            let stdout = std::io::stdout();
            let mut w = stdout.lock();
            write_trace(&mut w, &trace, cli.pretty)?;
            writeln!(w)?;
        }
    }

    Ok(())
}
