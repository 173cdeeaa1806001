use crate::helpe::*;
use std::fmt;

/// The end-of-run record of one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub id:         ProcessId,
    pub arrival:    Ticks,
    pub service:    Ticks,
    pub completion: Ticks,
}

impl Completion {
    #[inline(always)]
    pub fn turnaround(&self) -> Ticks {
        self.completion - self.arrival
    }
}

/// Turnaround statistics over every finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub completions: Vec<Completion>,
}

impl Summary {
    pub fn from_registry(reg: &ProcessRegistry) -> Self {
        Self {
            completions: reg.iter()
                .filter_map(|p| {
                    p.completion.map(|completion| Completion {
                        id:         p.id,
                        arrival:    p.arrival,
                        service:    p.service,
                        completion,
                    })
                })
                .collect()
        }
    }

    /// Arithmetic mean of all turnaround times. `None` if
    /// nothing has finished.
    pub fn mean_turnaround(&self) -> Option<f64> {
        if self.completions.is_empty() {
            return None;
        }
        let sum: Ticks = self.completions
            .iter()
            .map(Completion::turnaround)
            .sum();

        Some(sum as f64 / self.completions.len() as f64)
    }

    pub fn max_turnaround(&self) -> Option<Ticks> {
        self.completions
            .iter()
            .map(Completion::turnaround)
            .max()
    }

    /// Tick at which the last process finished.
    pub fn makespan(&self) -> Option<Ticks> {
        self.completions
            .iter()
            .map(|c| c.completion)
            .max()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PID\tArrival\tService\tCompletion\tTurnaround")?;
        for c in &self.completions {
            writeln!(f, "{}\t{}\t{}\t{}\t\t{}", c.id, c.arrival, c.service, c.completion, c.turnaround())?;
        }
        match self.mean_turnaround() {
            Some(m) => write!(f, "\nAverage Turnaround Time: {:.2}", m),
            None    => write!(f, "\nAverage Turnaround Time: n/a"),
        }
    }
}
