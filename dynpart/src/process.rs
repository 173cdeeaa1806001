use crate::helpe::*;

/// The three mutually exclusive lifecycle states of a [Process].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Pending,
    Allocated,
    Finished,
}

impl Process {
    /// Spawns a fresh, pending process out of its spec.
    pub fn new(id: ProcessId, spec: ProcessSpec) -> Self {
        Self {
            id,
            arrival:    spec.arrival,
            service:    spec.service,
            size:       spec.size,
            remaining:  spec.service,
            start:      0,
            allocated:  false,
            finished:   false,
            completion: None,
        }
    }

    pub fn spec(&self) -> ProcessSpec {
        ProcessSpec::new(self.arrival, self.service, self.size)
    }

    pub fn state(&self) -> ProcessState {
        debug_assert!(!(self.allocated && self.finished), "Process both allocated and finished!");
        if self.finished {
            ProcessState::Finished
        } else if self.allocated {
            ProcessState::Allocated
        } else {
            ProcessState::Pending
        }
    }

    /// Returns `true` if the process shows up at tick `t` and
    /// still needs to be admitted.
    #[inline(always)]
    pub fn arrives_at(&self, t: Ticks) -> bool {
        self.arrival == t && !self.allocated && !self.finished
    }

    /// First address past the process' region, if it has one.
    #[inline(always)]
    pub fn end(&self) -> Option<MemUnits> {
        if self.allocated { Some(self.start + self.size) }
        else { None }
    }

    /// Returns `true` if the process currently occupies
    /// any address within `[start, end)`.
    #[inline(always)]
    pub fn overlaps(&self, start: MemUnits, end: MemUnits) -> bool {
        self.allocated && self.start < end && start < self.start + self.size
    }

    /// Marks the process as sitting at `start`.
    pub fn place(&mut self, start: MemUnits) {
        self.start = start;
        self.allocated = true;
    }

    /// Spends one tick of service. Returns `true` when the process
    /// had nothing left to do, i.e. the counter would go negative.
    pub fn run_once(&mut self) -> bool {
        match self.remaining.checked_sub(1) {
            Some(r) => {
                self.remaining = r;
                false
            },
            None    => { true }
        }
    }

    /// Takes the process out of memory for good.
    pub fn finish(&mut self, t: Ticks) {
        debug_assert!(self.completion.is_none(), "Process finished twice!");
        self.allocated = false;
        self.finished = true;
        self.completion = Some(t);
    }

    pub fn turnaround(&self) -> Option<Ticks> {
        self.completion
            .map(|c| c - self.arrival)
    }
}
