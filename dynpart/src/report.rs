//! Human-readable rendering of [TickReport]s.
use crate::helpe::*;
use std::fmt;

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimEvent::Arrived(id)           => write!(f, "Process {} arrived.", id),
            SimEvent::Suspended(id)         => write!(f, "Memory full! Process {} is suspended.", id),
            SimEvent::Finished(id)          => write!(f, "Process {} finished execution.", id),
            SimEvent::MovedFromQueue(id)    => write!(f, "Process {} moved from queue to memory.", id),
        }
    }
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Time: {} ---\n", self.tick)?;
        for e in &self.events {
            writeln!(f, "{}", e)?;
        }

        writeln!(f, "\n----- Memory State ------")?;
        writeln!(f, "Total Memory: {} units", self.total)?;
        writeln!(f, "Memory Used : {} units", self.used)?;
        writeln!(f, "Memory Free : {} units", self.free)?;

        writeln!(f, "\nAllocated Processes:")?;
        writeln!(f, "PID\tSize\tStart")?;
        for r in &self.allocated {
            writeln!(f, "{}\t{}\t{}", r.id, r.size, r.start)?;
        }

        if !self.holes.is_empty() {
            writeln!(f, "\nFree Holes:")?;
            writeln!(f, "Start\t\tSize")?;
            for h in &self.holes {
                writeln!(f, "{}\t\t{}", h.start, h.size)?;
            }
        }

        if !self.queued.is_empty() {
            writeln!(f, "\nSuspended Processes : {}", self.queued.iter().join(" "))?;
        }

        Ok(())
    }
}
