use crate::helpe::*;

/// Id-indexed process table. Iteration order is insertion
/// order, which is also id order.
pub type ProcessTable = IndexMap<ProcessId, Process, BuildHasherDefault<AHasher>>;

/// The fixed collection of every process in a scenario. Neither
/// the count nor the ids change after [`init`].
#[derive(Debug, Clone)]
pub struct ProcessRegistry {
    table: ProcessTable,
}

/// Builds the [ProcessRegistry] out of user-provided specs, assigning
/// ids `1..=N` in input order. A successfully returned registry is
/// guaranteed to be compliant with the simulator's assumptions:
/// - the process count lies within the configured bounds
/// - no process has zero size
/// - no process is larger than the whole address space
///
/// This function is the gatekeeper to the rest of the library.
pub fn init(specs: Vec<ProcessSpec>, cfg: &SimConfig) -> Result<ProcessRegistry, SetupError> {
    let count = specs.len();
    if count < cfg.min_processes {
        return Err(SetupError::TooFewProcesses { count, min: cfg.min_processes });
    }
    if count > cfg.max_processes {
        return Err(SetupError::TooManyProcesses { count, max: cfg.max_processes });
    }

    let mut table = ProcessTable::with_capacity_and_hasher(count, Default::default());
    for (idx, spec) in specs.into_iter().enumerate() {
        let id = ProcessId::try_from(idx + 1)
            .map_err(|_| SetupError::TooManyProcesses { count, max: ProcessId::MAX as usize })?;
        if spec.size == 0 {
            return Err(ProcessError {
                message: String::from("Process with 0 size found!"),
                id,
                culprit: spec,
            }.into());
        } else if spec.size > cfg.total_memory {
            return Err(ProcessError {
                message: format!("Process larger than the {}-unit address space found!", cfg.total_memory),
                id,
                culprit: spec,
            }.into());
        }
        table.insert(id, Process::new(id, spec));
    }

    Ok(ProcessRegistry { table })
}

impl ProcessRegistry {
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn get(&self, id: ProcessId) -> Option<&Process> {
        self.table.get(&id)
    }

    /// Positional access, `0..len()`, in id order.
    pub fn at(&self, idx: usize) -> &Process {
        &self.table[idx]
    }

    pub fn at_mut(&mut self, idx: usize) -> &mut Process {
        &mut self.table[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.table.values()
    }

    /// Overwrites the entry sharing `p`'s id with `p`.
    pub fn replace(&mut self, p: Process) -> Result<(), SimError> {
        match self.table.get_mut(&p.id) {
            Some(slot)  => {
                *slot = p;
                Ok(())
            },
            None        => Err(SimError::UnknownProcess(p.id)),
        }
    }

    /// Processes currently holding memory, in id order.
    pub fn allocated(&self) -> impl Iterator<Item = &Process> {
        self.table
            .values()
            .filter(|p| p.allocated)
    }

    /// The lowest address above every allocated region. This is
    /// a linear probe over the whole table, on every call.
    pub fn tail_address(&self) -> MemUnits {
        self.allocated()
            .filter_map(|p| p.end())
            .fold(0, MemUnits::max)
    }

    pub fn all_finished(&self) -> bool {
        self.table.values().all(|p| p.finished)
    }
}
