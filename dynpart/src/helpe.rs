pub use std::{
    collections::VecDeque,
    io::{BufRead, BufReader, Write},
    path::PathBuf,
    hash::BuildHasherDefault,
};
pub use thiserror::Error;
pub use itertools::Itertools;
pub use indexmap::IndexMap;
pub use ahash::AHasher;
pub use clap::Parser;
pub use log::{debug, info, trace};

pub use crate::{Process, Simulation,
    process::ProcessState,
    queue::AdmissionQueue,
    holes::*,
    registry::*,
    driver::*,
    scenario::*,
    stats::*,
};

/// The unit for measuring simulated time. One tick is one iteration
/// of the driver's loop; nothing else is assumed about it.
pub type Ticks = usize;

/// The unit for measuring memory. Sizes and addresses share it, and
/// the address space always starts at zero.
pub type MemUnits = usize;

/// Processes are numbered `1..=N` in the order they were read.
pub type ProcessId = u32;

/// Reference size of the simulated address space.
pub const TOTAL_MEMORY: MemUnits = 1024;
/// Reference capacity of the process table.
pub const MAX_PROCESSES: usize = 100;
/// Smallest scenario accepted by default.
pub const MIN_PROCESSES: usize = 1;

/// Knobs of a simulation run. The defaults are the reference
/// constants above; the binaries override them from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub total_memory:   MemUnits,
    pub max_processes:  usize,
    pub min_processes:  usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            total_memory:   TOTAL_MEMORY,
            max_processes:  MAX_PROCESSES,
            min_processes:  MIN_PROCESSES,
        }
    }
}

/// The raw description of a process, as handed over by
/// whoever reads the scenario. Ids are not part of it: they
/// are assigned by [`init`] from the position in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessSpec {
    pub arrival:    Ticks,
    pub service:    Ticks,
    pub size:       MemUnits,
}

impl ProcessSpec {
    pub fn new(arrival: Ticks, service: Ticks, size: MemUnits) -> Self {
        Self { arrival, service, size }
    }
}

#[derive(Error, Debug)]
#[error("{message} (process {id})\n{:?}", culprit)]
/// Appears while building the [ProcessRegistry] out of
/// user-provided specs.
pub struct ProcessError {
    pub message:    String,
    pub id:         ProcessId,
    pub culprit:    ProcessSpec,
}

/// Everything that can go wrong *before* the first tick. A simulation
/// is never constructed out of input that produced one of these.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("At least {min} processes are required, got {count}.")]
    TooFewProcesses { count: usize, min: usize },
    #[error("At most {max} processes are supported, got {count}.")]
    TooManyProcesses { count: usize, max: usize },
    #[error("Malformed scenario at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error(transparent)]
    Rejected(#[from] ProcessError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Internal invariant violations detected while ticking. None of
/// these can fire for input that went through [`init`]; if one does,
/// the run is defective and must not be trusted.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SimError {
    #[error("Admission queue overflow (capacity {capacity}).")]
    QueueOverflow { capacity: usize },
    #[error("No process with id {0} in the registry.")]
    UnknownProcess(ProcessId),
    #[error("Stalled at tick {tick}: {waiting} process(es) queued, none allocated.")]
    Stalled { tick: Ticks, waiting: usize },
}
