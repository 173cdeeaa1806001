use crate::helpe::*;

/// Processes that arrived but found no room, oldest first.
///
/// Entries are full snapshots. A process that later gets placed out
/// of the queue must be written back into the registry explicitly.
#[derive(Debug, Clone)]
pub struct AdmissionQueue {
    waiting:    VecDeque<Process>,
    capacity:   usize,
}

impl AdmissionQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            waiting:    VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `p` at the back. Every process can sit in the queue
    /// at most once, so running out of room means a broken invariant.
    pub fn enqueue(&mut self, p: Process) -> Result<(), SimError> {
        if self.waiting.len() >= self.capacity {
            return Err(SimError::QueueOverflow { capacity: self.capacity });
        }
        debug_assert!(self.waiting.iter().all(|w| w.id != p.id), "Process queued twice!");
        self.waiting.push_back(p);

        Ok(())
    }

    /// Removes and returns the process that has waited longest.
    pub fn dequeue(&mut self) -> Option<Process> {
        self.waiting.pop_front()
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    /// Ids in queue order, front first.
    pub fn ids(&self) -> Vec<ProcessId> {
        self.waiting
            .iter()
            .map(|p| p.id)
            .collect()
    }
}
