use crate::helpe::*;

/// Something worth telling the user about, in the order it happened
/// within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    Arrived(ProcessId),
    /// Arrived, but no region was large enough. The process waits
    /// in the admission queue.
    Suspended(ProcessId),
    Finished(ProcessId),
    MovedFromQueue(ProcessId),
}

/// An allocated region, as listed in a [TickReport].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub id:     ProcessId,
    pub size:   MemUnits,
    pub start:  MemUnits,
}

/// What the world looks like at the end of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub tick:       Ticks,
    pub total:      MemUnits,
    pub used:       MemUnits,
    pub free:       MemUnits,
    pub allocated:  Vec<Region>,
    pub holes:      Vec<Hole>,
    pub queued:     Vec<ProcessId>,
    pub events:     Vec<SimEvent>,
}

impl Simulation {
    /// Validates `specs` (see [`init`]) and sets up an empty
    /// address space at tick 0.
    pub fn new(cfg: SimConfig, specs: Vec<ProcessSpec>) -> Result<Self, SetupError> {
        let registry = init(specs, &cfg)?;
        let capacity = registry.len();

        Ok(Self {
            cfg,
            clock:      0,
            finished:   0,
            memory:     Memory::new(cfg.total_memory),
            queue:      AdmissionQueue::with_capacity(capacity),
            registry,
        })
    }

    pub fn clock(&self) -> Ticks {
        self.clock
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    pub fn registry(&self) -> &ProcessRegistry {
        &self.registry
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn queue(&self) -> &AdmissionQueue {
        &self.queue
    }

    pub fn is_done(&self) -> bool {
        self.finished == self.registry.len()
    }

    /// Ticks until every process has finished, handing each
    /// snapshot to `observer`.
    pub fn run<F>(&mut self, mut observer: F) -> Result<Summary, SimError>
    where F: FnMut(&TickReport) {
        while !self.is_done() {
            let report = self.step()?;
            observer(&report);
        }
        debug_assert!(self.registry.all_finished());

        Ok(Summary::from_registry(&self.registry))
    }

    /// Runs exactly one tick: admission, then execution (with a queue
    /// drain after every release), then the snapshot.
    pub fn step(&mut self) -> Result<TickReport, SimError> {
        let now = self.clock;
        let mut events = vec![];

        // Newcomers get one shot at memory; whoever misses it queues up.
        for idx in 0..self.registry.len() {
            if !self.registry.at(idx).arrives_at(now) {
                continue;
            }
            let (id, size) = {
                let p = self.registry.at(idx);
                (p.id, p.size)
            };
            info!("Process {} arrived.", id);
            events.push(SimEvent::Arrived(id));
            match self.find_room(size) {
                Some(start) => {
                    self.registry.at_mut(idx).place(start);
                },
                None        => {
                    info!("Memory full! Process {} is suspended.", id);
                    events.push(SimEvent::Suspended(id));
                    self.queue.enqueue(self.registry.at(idx).clone())?;
                }
            }
        }

        // Allocation state is checked as each process is visited, so
        // a process drained further up this loop runs this tick too,
        // provided its id is larger than the releasing one's.
        for idx in 0..self.registry.len() {
            let p = self.registry.at_mut(idx);
            if !p.allocated || !p.run_once() {
                continue;
            }
            let (id, start, size) = (p.id, p.start, p.size);
            p.finish(now);
            self.memory.release(start, size);
            self.finished += 1;
            info!("Process {} finished execution.", id);
            events.push(SimEvent::Finished(id));
            self.drain(&mut events)?;
        }

        if !self.queue.is_empty() && self.registry.allocated().next().is_none() {
            return Err(SimError::Stalled { tick: now, waiting: self.queue.len() });
        }

        let report = self.snapshot(now, events);
        self.clock += 1;

        Ok(report)
    }

    /// One pass over the admission queue. Only the entries present
    /// when the pass starts are tried; those that still do not fit
    /// go back to the end of the line.
    fn drain(&mut self, events: &mut Vec<SimEvent>) -> Result<(), SimError> {
        let pass = self.queue.len();
        for _ in 0..pass {
            let mut waiting = match self.queue.dequeue() {
                Some(p) => p,
                None    => break,
            };
            match self.find_room(waiting.size) {
                Some(start) => {
                    waiting.place(start);
                    info!("Process {} moved from queue to memory.", waiting.id);
                    events.push(SimEvent::MovedFromQueue(waiting.id));
                    self.registry.replace(waiting)?;
                },
                None        => {
                    self.queue.enqueue(waiting)?;
                }
            }
        }

        Ok(())
    }

    fn find_room(&mut self, size: MemUnits) -> Option<MemUnits> {
        let registry = &self.registry;
        self.memory.place(size, || registry.tail_address())
    }

    fn snapshot(&self, tick: Ticks, events: Vec<SimEvent>) -> TickReport {
        TickReport {
            tick,
            total:      self.memory.total(),
            used:       self.memory.used(),
            free:       self.memory.free(),
            allocated:  self.registry
                .allocated()
                .map(|p| Region { id: p.id, size: p.size, start: p.start })
                .collect(),
            holes:      self.memory.holes().to_vec(),
            queued:     self.queue.ids(),
            events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim(specs: &[(Ticks, Ticks, MemUnits)]) -> Simulation {
        Simulation::new(
            SimConfig::default(),
            specs.iter()
                .map(|&(a, s, z)| ProcessSpec::new(a, s, z))
                .collect()
        ).unwrap()
    }

    fn run_all(s: &mut Simulation) -> Vec<TickReport> {
        let mut reports = vec![];
        s.run(|r| reports.push(r.clone())).unwrap();

        reports
    }

    #[test]
    fn single_process() {
        let mut s = sim(&[(0, 2, 100)]);
        let first = s.step().unwrap();
        assert_eq!(first.allocated, vec![Region { id: 1, size: 100, start: 0 }]);
        assert_eq!(first.events, vec![SimEvent::Arrived(1)]);
        assert_eq!(first.used, 100);

        let summary = s.run(|_| {}).unwrap();
        assert_eq!(s.clock(), 3);
        assert_eq!(s.registry().get(1).and_then(|p| p.completion), Some(2));
        assert_eq!(summary.mean_turnaround(), Some(2.0));
        assert_eq!(s.memory().holes(), &[Hole::new(0, 100)]);
    }

    #[test]
    fn oversubscribed_pair_goes_through_queue() {
        let mut s = sim(&[(0, 2, 600), (0, 1, 500)]);
        let reports = run_all(&mut s);

        assert_eq!(reports[0].events, vec![
            SimEvent::Arrived(1),
            SimEvent::Arrived(2),
            SimEvent::Suspended(2),
        ]);
        assert_eq!(reports[0].queued, vec![2]);
        assert_eq!(reports[1].queued, vec![2]);

        let t2 = &reports[2];
        assert_eq!(t2.events, vec![SimEvent::Finished(1), SimEvent::MovedFromQueue(2)]);
        assert_eq!(t2.allocated, vec![Region { id: 2, size: 500, start: 0 }]);
        assert_eq!(t2.holes, vec![Hole::new(500, 100)]);
        assert!(t2.queued.is_empty());

        // The drained process has a larger id than the releasing one,
        // so it already ran during tick 2.
        assert_eq!(reports.len(), 4);
        assert_eq!(s.registry().get(2).and_then(|p| p.completion), Some(3));
        assert_eq!(s.memory().holes(), &[Hole::new(0, 600)]);
    }

    #[test]
    fn drained_process_with_smaller_id_waits_a_tick() {
        // Process 1 arrives later than 2 and has to queue behind it.
        let mut s = sim(&[(1, 0, 800), (0, 2, 500)]);
        let reports = run_all(&mut s);
        assert_eq!(reports[1].queued, vec![1]);
        // 2 finishes at tick 2, 1 is placed but not run during that tick.
        assert_eq!(reports[2].events, vec![SimEvent::Finished(2), SimEvent::MovedFromQueue(1)]);
        assert_eq!(s.registry().get(1).and_then(|p| p.completion), Some(3));
    }

    #[test]
    fn three_equal_processes() {
        let mut s = sim(&[(0, 1, 200), (0, 5, 200), (0, 1, 200)]);
        let reports = run_all(&mut s);

        assert_eq!(reports[0].allocated.iter().map(|r| r.start).collect::<Vec<_>>(), vec![0, 200, 400]);
        assert_eq!(reports[1].events, vec![SimEvent::Finished(1), SimEvent::Finished(3)]);
        assert_eq!(reports[1].holes, vec![Hole::new(0, 200), Hole::new(400, 200)]);
        let last = reports.last().unwrap();
        assert_eq!(last.tick, 5);
        assert_eq!(last.holes, vec![Hole::new(0, 600)]);
        assert_eq!(last.used, 0);
    }

    #[test]
    fn adjacent_releases_coalesce_before_next_allocation() {
        let mut s = sim(&[(0, 1, 200), (0, 1, 200), (0, 5, 200), (2, 1, 400)]);
        let reports = run_all(&mut s);
        assert_eq!(reports[1].holes, vec![Hole::new(0, 400)]);
        assert!(reports[2].allocated.contains(&Region { id: 4, size: 400, start: 0 }));
        assert!(reports[2].holes.is_empty());
    }

    #[test]
    fn idle_ticks_before_first_arrival() {
        let mut s = sim(&[(3, 0, 10)]);
        let reports = run_all(&mut s);
        assert_eq!(reports.len(), 4);
        assert!(reports[..3].iter().all(|r| r.events.is_empty() && r.used == 0));
        assert_eq!(reports[3].events, vec![SimEvent::Arrived(1), SimEvent::Finished(1)]);
    }

    #[test]
    fn fifo_within_a_drain_pass() {
        // 1 holds everything; 2 and 3 queue in that order and both
        // fit once 1 is gone.
        let mut s = sim(&[(0, 2, 1024), (0, 3, 300), (0, 3, 300)]);
        let reports = run_all(&mut s);
        assert_eq!(reports[0].queued, vec![2, 3]);
        assert_eq!(reports[2].events, vec![
            SimEvent::Finished(1),
            SimEvent::MovedFromQueue(2),
            SimEvent::MovedFromQueue(3),
        ]);
        assert_eq!(reports[2].allocated, vec![
            Region { id: 2, size: 300, start: 0 },
            Region { id: 3, size: 300, start: 300 },
        ]);
    }

    #[test]
    fn failing_head_goes_to_the_back() {
        // Once 1 leaves, 3 is still too big and goes back in line
        // behind 4, which fits. 3 gets in only when 2 is gone too.
        let mut s = sim(&[(0, 2, 400), (0, 9, 600), (1, 1, 700), (1, 1, 300)]);
        let reports = run_all(&mut s);
        assert_eq!(reports[1].queued, vec![3, 4]);
        assert_eq!(reports[2].events, vec![SimEvent::Finished(1), SimEvent::MovedFromQueue(4)]);
        assert_eq!(reports[2].queued, vec![3]);
        assert!(s.is_done());
        assert_eq!(s.registry().get(3).map(|p| p.start), Some(0));
        assert_eq!(s.registry().get(3).and_then(|p| p.completion), Some(10));
    }

    #[test]
    fn queue_with_nothing_allocated_is_a_stall() {
        // Only reachable by bypassing admission: a process waits
        // while memory is empty.
        let mut s = sim(&[(5, 1, 100)]);
        let stray = s.registry.at(0).clone();
        s.queue.enqueue(stray).unwrap();
        assert_eq!(s.step().unwrap_err(), SimError::Stalled { tick: 0, waiting: 1 });
    }
}
