//! Welcome to `dynpart`!
//!
//! A discrete-time simulator of *dynamic partitioning*: processes arrive,
//! ask for one contiguous chunk of a fixed address space, run for a while
//! and give the chunk back. Whoever does not fit waits in a FIFO until some
//! memory is released.

mod process;
mod queue;

pub mod holes;
pub mod registry;
pub mod driver;
pub mod scenario;
pub mod report;
pub mod stats;
pub mod helpe;

pub use crate::helpe::*;

/// Our fundamental unit of interest. A [`Process`] is born with an
/// immutable [`ProcessSpec`] (arrival, service time, size) and then
/// walks through exactly one of three states:
///
/// 1. *pending*: it has not arrived yet, or it arrived and is waiting
///     in the [`AdmissionQueue`] for memory.
/// 2. *allocated*: it occupies `[start, start + size)`.
/// 3. *finished*: its memory has been handed back and its
///     [`completion`](Process::completion) tick is recorded.
///
/// > ***ATTENTION:*** a process with service time `S` holds its memory
/// > for `S + 1` ticks. Remaining time is decremented *before* the
/// > completion check, and completion fires only once the counter would
/// > go below zero. Turnaround times are reported accordingly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub id:             ProcessId,
    pub arrival:        Ticks,
    pub service:        Ticks,
    pub size:           MemUnits,
    // Counts down once the process sits in memory.
    pub remaining:      Ticks,
    // Meaningful only while `allocated` holds.
    pub start:          MemUnits,
    pub allocated:      bool,
    pub finished:       bool,
    pub completion:     Option<Ticks>,
}

/// The whole state of one simulation run. There are no globals:
/// the registry, the address space and the admission queue all
/// live here, and only the driver (see [`driver`]) mutates them.
pub struct Simulation {
    cfg:        SimConfig,
    clock:      Ticks,
    finished:   usize,
    registry:   registry::ProcessRegistry,
    memory:     holes::Memory,
    queue:      AdmissionQueue,
}
