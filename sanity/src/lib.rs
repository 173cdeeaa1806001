//! Out-of-band checks for `dynpart`: per-tick invariants verified
//! from the outside, JSON traces of whole runs, and randomly
//! generated scenarios for stress testing.
pub use dynpart::*;
pub use serde::{Serialize, Deserialize};
pub use rand::{Rng, SeedableRng, rngs::StdRng};
use itertools::Itertools;
use log::debug;

/// Everything that can go wrong while watching a simulation.
#[derive(Error, Debug)]
pub enum Violation {
    #[error("tick {tick}: {used} units used plus {holes} in holes exceed {total}")]
    Overcommitted {
        tick:   Ticks,
        used:   MemUnits,
        holes:  MemUnits,
        total:  MemUnits,
    },
    #[error("tick {tick}: used ({used}) and free ({free}) do not add up to {total}")]
    Unbalanced {
        tick:   Ticks,
        used:   MemUnits,
        free:   MemUnits,
        total:  MemUnits,
    },
    #[error("tick {tick}: {used} units reported used, but allocated regions add up to {allocated}")]
    Unaccounted {
        tick:       Ticks,
        used:       MemUnits,
        allocated:  MemUnits,
    },
    #[error("tick {tick}: region {first:?} overlaps {second:?}")]
    Overlap {
        tick:   Ticks,
        first:  (MemUnits, MemUnits),
        second: (MemUnits, MemUnits),
    },
    #[error("tick {tick}: region ends at {end}, past the {total}-unit address space")]
    OutOfBounds {
        tick:   Ticks,
        end:    MemUnits,
        total:  MemUnits,
    },
    #[error("tick {tick}: holes at {left} and {right} should have been merged")]
    Uncoalesced {
        tick:   Ticks,
        left:   MemUnits,
        right:  MemUnits,
    },
    #[error("tick {tick}: process {id} is listed as {listed} but its state is {state:?}")]
    WrongState {
        tick:   Ticks,
        id:     ProcessId,
        listed: &'static str,
        state:  Option<ProcessState>,
    },
    #[error("still running after {ticks} ticks")]
    NoProgress { ticks: Ticks },
    #[error(transparent)]
    Sim(#[from] SimError),
    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Checks the address-space invariants on a single snapshot.
pub fn check_tick(r: &TickReport) -> Result<(), Violation> {
    let tick = r.tick;
    let holes: MemUnits = r.holes.iter().map(|h| h.size).sum();
    if r.used + holes > r.total {
        return Err(Violation::Overcommitted { tick, used: r.used, holes, total: r.total });
    }
    if r.used + r.free != r.total {
        return Err(Violation::Unbalanced { tick, used: r.used, free: r.free, total: r.total });
    }
    let allocated: MemUnits = r.allocated.iter().map(|a| a.size).sum();
    if allocated != r.used {
        return Err(Violation::Unaccounted { tick, used: r.used, allocated });
    }

    let regions = r.allocated
        .iter()
        .map(|a| (a.start, a.start + a.size))
        .chain(r.holes.iter().map(|h| (h.start, h.end())))
        .sorted_unstable()
        .collect_vec();
    for (first, second) in regions.iter().tuple_windows() {
        if first.1 > second.0 {
            return Err(Violation::Overlap { tick, first: *first, second: *second });
        }
    }
    if let Some(&(_, end)) = regions.last() {
        if end > r.total {
            return Err(Violation::OutOfBounds { tick, end, total: r.total });
        }
    }

    for (left, right) in r.holes.iter().tuple_windows() {
        if left.end() >= right.start {
            return Err(Violation::Uncoalesced { tick, left: left.start, right: right.start });
        }
    }

    Ok(())
}

/// Cross-checks a snapshot against the registry it came from.
fn check_states(sim: &Simulation, r: &TickReport) -> Result<(), Violation> {
    let reg = sim.registry();
    let expect = |id: ProcessId, wanted: ProcessState, listed: &'static str| {
        let state = reg.get(id).map(Process::state);
        if state == Some(wanted) {
            Ok(())
        } else {
            Err(Violation::WrongState { tick: r.tick, id, listed, state })
        }
    };
    for a in &r.allocated {
        expect(a.id, ProcessState::Allocated, "allocated")?;
    }
    for id in &r.queued {
        expect(*id, ProcessState::Pending, "queued")?;
    }

    for p in reg.allocated() {
        let end = p.start + p.size;
        if let Some(q) = reg.allocated().find(|q| q.id != p.id && q.overlaps(p.start, end)) {
            return Err(Violation::Overlap {
                tick:   r.tick,
                first:  (p.start, end),
                second: (q.start, q.start + q.size),
            });
        }
    }

    Ok(())
}

/// No run can take longer than this: before the last arrival the
/// clock simply advances, and after it at least one process is in
/// memory during every tick.
fn tick_bound(reg: &ProcessRegistry) -> Ticks {
    let last_arrival = reg.iter()
        .map(|p| p.arrival)
        .max()
        .unwrap_or(0);

    reg.iter()
        .map(|p| p.service.saturating_add(1))
        .fold(last_arrival.saturating_add(1), Ticks::saturating_add)
}

/// Same as [`Simulation::run`], but every snapshot is checked
/// before `observer` gets to see it.
pub fn check_run<F>(sim: &mut Simulation, mut observer: F) -> Result<Summary, Violation>
where F: FnMut(&TickReport) {
    let bound = tick_bound(sim.registry());
    while !sim.is_done() {
        if sim.clock() > bound {
            return Err(Violation::NoProgress { ticks: sim.clock() });
        }
        let report = sim.step()?;
        check_tick(&report)?;
        check_states(sim, &report)?;
        observer(&report);
    }

    Ok(Summary::from_registry(sim.registry()))
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionRecord {
    pub id:     ProcessId,
    pub size:   MemUnits,
    pub start:  MemUnits,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoleRecord {
    pub start:  MemUnits,
    pub size:   MemUnits,
}

/// One tick, as written to a JSON trace. Events are kept in
/// their human-readable form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TickRecord {
    pub tick:       Ticks,
    pub used:       MemUnits,
    pub free:       MemUnits,
    pub allocated:  Vec<RegionRecord>,
    pub holes:      Vec<HoleRecord>,
    pub queued:     Vec<ProcessId>,
    pub events:     Vec<String>,
}

impl From<&TickReport> for TickRecord {
    fn from(r: &TickReport) -> Self {
        Self {
            tick:       r.tick,
            used:       r.used,
            free:       r.free,
            allocated:  r.allocated
                .iter()
                .map(|a| RegionRecord { id: a.id, size: a.size, start: a.start })
                .collect(),
            holes:      r.holes
                .iter()
                .map(|h| HoleRecord { start: h.start, size: h.size })
                .collect(),
            queued:     r.queued.clone(),
            events:     r.events.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessRecord {
    pub id:         ProcessId,
    pub arrival:    Ticks,
    pub service:    Ticks,
    pub size:       MemUnits,
    pub completion: Option<Ticks>,
    pub turnaround: Option<Ticks>,
}

impl From<&Process> for ProcessRecord {
    fn from(p: &Process) -> Self {
        let spec = p.spec();
        Self {
            id:         p.id,
            arrival:    spec.arrival,
            service:    spec.service,
            size:       spec.size,
            completion: p.completion,
            turnaround: p.turnaround(),
        }
    }
}

/// A checked, complete run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Trace {
    pub total_memory:       MemUnits,
    pub processes:          Vec<ProcessRecord>,
    pub ticks:              Vec<TickRecord>,
    pub mean_turnaround:    Option<f64>,
    pub max_turnaround:     Option<Ticks>,
    pub makespan:           Option<Ticks>,
}

impl Trace {
    /// Runs `sim` to completion under [check_run] and keeps
    /// every snapshot.
    pub fn record(mut sim: Simulation) -> Result<Self, Violation> {
        let mut ticks = vec![];
        let summary = check_run(&mut sim, |r| ticks.push(TickRecord::from(r)))?;

        Ok(Self {
            total_memory:       sim.config().total_memory,
            processes:          sim.registry().iter().map(ProcessRecord::from).collect(),
            ticks,
            mean_turnaround:    summary.mean_turnaround(),
            max_turnaround:     summary.max_turnaround(),
            makespan:           summary.makespan(),
        })
    }
}

/// Draws whole scenarios out of a seeded generator. Sizes are
/// always valid for the configured address space, so whatever
/// comes out is accepted by [`init`].
pub struct RandomScenario {
    rng:                StdRng,
    pub min_processes:  usize,
    pub max_processes:  usize,
    pub max_arrival:    Ticks,
    pub max_service:    Ticks,
    pub max_size:       MemUnits,
}

impl RandomScenario {
    pub fn new(seed: u64, cfg: &SimConfig) -> Self {
        Self {
            rng:            StdRng::seed_from_u64(seed),
            min_processes:  cfg.min_processes.max(1),
            max_processes:  cfg.max_processes,
            max_arrival:    20,
            max_service:    10,
            max_size:       cfg.total_memory,
        }
    }
}

impl ScenarioGen<[usize; 3]> for RandomScenario {
    fn read_specs(&mut self) -> Result<Vec<ProcessSpec>, SetupError> {
        if self.min_processes > self.max_processes {
            return Err(SetupError::TooFewProcesses {
                count:  self.max_processes,
                min:    self.min_processes,
            });
        }
        let count = self.rng.gen_range(self.min_processes..=self.max_processes);
        let max_size = self.max_size.max(1);
        let draws = (0..count)
            .map(|_| [
                self.rng.gen_range(0..=self.max_arrival),
                self.rng.gen_range(0..=self.max_service),
                self.rng.gen_range(1..=max_size),
            ])
            .collect_vec();

        Ok(draws.into_iter()
            .map(|d| self.gen_single(d))
            .collect())
    }

    fn gen_single(&self, d: [usize; 3]) -> ProcessSpec {
        ProcessSpec::new(d[0], d[1], d[2])
    }
}

/// Generates the scenario for `seed` and records a checked run of it.
pub fn run_seeded(seed: u64, cfg: &SimConfig) -> Result<Trace, Violation> {
    let specs = RandomScenario::new(seed, cfg).read_specs()?;
    debug!("Seed {}: {} processes.", seed, specs.len());

    Trace::record(Simulation::new(*cfg, specs)?)
}
