use dynpart::*;

fn get_crate_root() -> Result<PathBuf, std::env::VarError> {
    Ok(PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?))
}

fn load(p: &str) -> Result<Simulation, Box<dyn std::error::Error>> {
    let mut csv_path = get_crate_root()?;
    csv_path.push(p);
    let sim = read_from_path(csv_path, SimConfig::default())?;

    Ok(sim)
}

/// Runs `sim` to completion, checking the address-space invariants
/// after every tick.
fn run_checked(sim: &mut Simulation) -> (Vec<TickReport>, Summary) {
    let mut reports = vec![];
    let summary = sim.run(|r| reports.push(r.clone())).unwrap();
    for r in &reports {
        let hole_space: MemUnits = r.holes.iter().map(|h| h.size).sum();
        assert!(r.used + hole_space <= r.total, "tick {}: over-committed", r.tick);
        assert_eq!(r.used + r.free, r.total);
        assert_eq!(r.used, r.allocated.iter().map(|a| a.size).sum::<MemUnits>());

        let mut regions = r.allocated
            .iter()
            .map(|a| (a.start, a.start + a.size))
            .chain(r.holes.iter().map(|h| (h.start, h.end())))
            .collect_vec();
        regions.sort_unstable();
        for (a, b) in regions.iter().tuple_windows() {
            assert!(a.1 <= b.0, "tick {}: {:?} overlaps {:?}", r.tick, a, b);
        }
        assert!(regions.last().map_or(true, |l| l.1 <= r.total));

        for (a, b) in r.holes.iter().tuple_windows() {
            assert!(a.end() < b.start, "tick {}: holes not coalesced", r.tick);
        }
    }

    (reports, summary)
}

#[test]
fn single_process() {
    let mut sim = load("tests/data/single.csv").unwrap();
    let (reports, summary) = run_checked(&mut sim);
    assert_eq!(reports[0].allocated, vec![Region { id: 1, size: 100, start: 0 }]);
    assert_eq!(reports.len(), 3);
    assert_eq!(summary.completions, vec![Completion { id: 1, arrival: 0, service: 2, completion: 2 }]);
    assert_eq!(summary.mean_turnaround(), Some(2.0));
}

#[test]
fn oversubscribed_pair() {
    let mut sim = load("tests/data/oversubscribed.csv").unwrap();
    let (reports, summary) = run_checked(&mut sim);
    assert_eq!(reports[0].allocated, vec![Region { id: 1, size: 600, start: 0 }]);
    assert_eq!(reports[0].queued, vec![2]);
    let moved = reports.iter()
        .find(|r| r.events.contains(&SimEvent::MovedFromQueue(2)))
        .unwrap();
    assert_eq!(moved.allocated, vec![Region { id: 2, size: 500, start: 0 }]);
    assert_eq!(summary.mean_turnaround(), Some(2.5));
}

#[test]
fn coalesced_hole_is_reused() {
    let mut sim = load("tests/data/coalesce.csv").unwrap();
    let (reports, _) = run_checked(&mut sim);
    assert_eq!(reports[1].holes, vec![Hole::new(0, 400)]);
    assert!(reports[2].allocated.contains(&Region { id: 4, size: 400, start: 0 }));
}

#[test]
fn classroom_scenario_terminates() {
    let mut sim = load("tests/data/classroom.csv").unwrap();
    let (reports, summary) = run_checked(&mut sim);
    assert!(sim.is_done());
    assert!(sim.queue().is_empty());
    assert_eq!(summary.completions.len(), 10);
    assert!(summary.completions.iter().all(|c| c.completion >= c.arrival + c.service));
    // Process 9 needs the whole address space, so it must have waited.
    assert!(reports.iter().any(|r| r.events.contains(&SimEvent::Suspended(9))));
    assert!(reports.iter().any(|r| r.events.contains(&SimEvent::MovedFromQueue(9))));
    assert_eq!(reports.last().map(|r| r.used), Some(0));
}

#[test]
fn arrivals_and_finishes_are_each_reported_once() {
    let mut sim = load("tests/data/classroom.csv").unwrap();
    let (reports, _) = run_checked(&mut sim);
    let events = reports.iter()
        .flat_map(|r| r.events.iter().copied())
        .collect_vec();
    for id in 1..=10 {
        assert_eq!(events.iter().filter(|e| **e == SimEvent::Arrived(id)).count(), 1);
        assert_eq!(events.iter().filter(|e| **e == SimEvent::Finished(id)).count(), 1);
        let suspended = events.iter().filter(|e| **e == SimEvent::Suspended(id)).count();
        let moved = events.iter().filter(|e| **e == SimEvent::MovedFromQueue(id)).count();
        assert_eq!(suspended, moved);
    }
}

#[test]
fn oversized_process_is_rejected() {
    match load("tests/data/bad_size.csv") {
        Err(e) => {
            let e = e.downcast::<SetupError>().unwrap();
            assert!(matches!(*e, SetupError::Rejected(ProcessError { id: 2, .. })));
        },
        Ok(_)  => panic!("a 2048-unit process must not be accepted"),
    }
}

#[test]
fn malformed_record_is_rejected() {
    match load("tests/data/malformed.csv") {
        Err(e) => {
            let e = e.downcast::<SetupError>().unwrap();
            assert!(matches!(*e, SetupError::Malformed { line: 3, .. }));
        },
        Ok(_)  => panic!("a malformed record must not be accepted"),
    }
}

#[test]
fn smaller_address_space() {
    let cfg = SimConfig { total_memory: 256, ..Default::default() };
    let specs = vec![
        ProcessSpec::new(0, 1, 200),
        ProcessSpec::new(0, 1, 100),
        ProcessSpec::new(1, 0, 56),
    ];
    let mut sim = Simulation::new(cfg, specs).unwrap();
    let (reports, _) = run_checked(&mut sim);
    assert_eq!(reports[0].total, 256);
    assert_eq!(reports[0].queued, vec![2]);
    // Process 1 leaves, process 2 drains into its hole, process 3
    // (zero service) leaves in the same tick.
    assert_eq!(reports[1].events, vec![
        SimEvent::Arrived(3),
        SimEvent::Finished(1),
        SimEvent::MovedFromQueue(2),
        SimEvent::Finished(3),
    ]);
    assert_eq!(reports[1].allocated, vec![Region { id: 2, size: 100, start: 0 }]);
    assert_eq!(reports[1].holes, vec![Hole::new(100, 156)]);
    assert_eq!(reports.len(), 3);
}
