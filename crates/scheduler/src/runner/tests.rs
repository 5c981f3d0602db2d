#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mlfq_core::{SchedulerConfig, SchedulerError, Tier};

    use crate::runner::Scheduler;
    use crate::ticker::{ManualTickSource, TickSource};

    fn scheduler_with(max_active: usize) -> (Scheduler, Arc<ManualTickSource>) {
        let source = Arc::new(ManualTickSource::new());
        let config = SchedulerConfig {
            max_active,
            ..SchedulerConfig::default()
        };
        let tick_source: Arc<dyn TickSource> = source.clone();
        (Scheduler::new(config, tick_source), source)
    }

    fn scheduler() -> (Scheduler, Arc<ManualTickSource>) {
        scheduler_with(3)
    }

    /// Fill Critical with `n` jobs so every tick's activation goes there.
    fn busy_critical(s: &mut Scheduler, n: usize) {
        for i in 0..n {
            s.admit(format!("c{i}"), "busy", 50, Tier::Critical).unwrap();
        }
    }

    #[test]
    fn scheduler_creation() {
        let (s, _) = scheduler();
        assert!(s.is_empty());
        assert_eq!(s.max_active(), 3);
        assert!(s.active_ops().is_empty());
        assert_eq!(s.metrics().ticks, 0);
    }

    #[test]
    fn lone_job_has_zero_delay_before_and_after_activation() {
        let (mut s, _) = scheduler();
        s.admit("j1", "A", 10, Tier::Low).unwrap();

        assert_eq!(s.estimate_delay("j1").unwrap(), 0);
        assert!(!s.is_active("j1"));

        s.tick();
        assert!(s.is_active("j1"));
        assert_eq!(s.estimate_delay("j1").unwrap(), 0);
        assert_eq!(s.active_ops(), vec!["j1".to_string()]);
    }

    #[test]
    fn one_activation_per_tick_within_a_tier() {
        let (mut s, _) = scheduler();
        s.admit("j1", "A", 100, Tier::Medium).unwrap();
        s.admit("j2", "B", 5, Tier::Medium).unwrap();

        s.tick();
        assert!(s.is_active("j1"));
        assert!(!s.is_active("j2"));

        s.tick();
        assert!(s.is_active("j2"));

        s.tick();
        let m = s.metrics();
        assert_eq!(m.ticks, 3);
        assert_eq!(m.activations, 2);
        assert_eq!(m.promotions, 0);
    }

    #[test]
    fn activation_prefers_higher_tier() {
        let (mut s, _) = scheduler();
        s.admit("low", "L", 5, Tier::Low).unwrap();
        s.admit("crit", "C", 5, Tier::Critical).unwrap();
        s.admit("high", "H", 5, Tier::High).unwrap();

        s.tick();
        assert!(s.is_active("crit"));
        s.tick();
        assert!(s.is_active("high"));
        s.tick();
        assert!(s.is_active("low"));
        assert_eq!(
            s.active_ops(),
            vec!["crit".to_string(), "high".to_string(), "low".to_string()]
        );
    }

    #[test]
    fn active_count_grows_by_at_most_one_per_tick() {
        let (mut s, _) = scheduler_with(100);
        for (i, tier) in Tier::ALL.iter().cycle().take(12).enumerate() {
            s.admit(format!("j{i}"), "job", 3, *tier).unwrap();
        }

        let mut previous = s.active_count();
        for _ in 0..20 {
            s.tick();
            let now = s.active_count();
            assert!(now <= previous + 1, "active went {previous} -> {now}");
            previous = now;
        }
        assert_eq!(previous, 12);
    }

    #[test]
    fn starved_low_job_promoted_on_fourth_tick() {
        let (mut s, _) = scheduler();
        busy_critical(&mut s, 5);
        s.admit("j1", "A", 5, Tier::Low).unwrap();

        for _ in 0..3 {
            s.tick();
        }
        assert_eq!(s.tier_of("j1"), Some(Tier::Low));
        assert_eq!(s.job("j1").unwrap().age_counter(), 3);

        s.tick();
        assert_eq!(s.tier_of("j1"), Some(Tier::Medium));
        let job = s.job("j1").unwrap();
        assert_eq!(job.remaining_time(), 5);
        assert_eq!(job.age_counter(), 4);
        assert_eq!(job.age_threshold(), Tier::Medium.weight());
        assert_eq!(s.total_time(Tier::Low), 0);
        assert_eq!(s.total_time(Tier::Medium), 5);
    }

    #[test]
    fn promotion_moves_one_tier_per_tick() {
        let (mut s, _) = scheduler();
        busy_critical(&mut s, 10);
        s.admit("j1", "A", 5, Tier::Low).unwrap();

        for _ in 0..4 {
            s.tick();
        }
        assert_eq!(s.tier_of("j1"), Some(Tier::Medium));

        // Age 5 is not a multiple of Medium's weight
        s.tick();
        assert_eq!(s.tier_of("j1"), Some(Tier::Medium));

        s.tick();
        assert_eq!(s.tier_of("j1"), Some(Tier::High));

        s.tick();
        assert_eq!(s.tier_of("j1"), Some(Tier::High));
        s.tick();
        assert_eq!(s.tier_of("j1"), Some(Tier::Critical));
        assert_eq!(s.job("j1").unwrap().remaining_time(), 5);
        assert_eq!(s.metrics().promotions, 3);
    }

    #[test]
    fn tier_of_matches_admission() {
        let (mut s, _) = scheduler();
        for tier in Tier::ALL {
            s.admit(format!("{tier}"), "job", 1, tier).unwrap();
        }
        for tier in Tier::ALL {
            assert_eq!(s.tier_of(&tier.to_string()), Some(tier));
        }
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn readmission_is_rejected() {
        let (mut s, _) = scheduler();
        s.admit("j1", "A", 10, Tier::Low).unwrap();

        let err = s.admit("j1", "B", 3, Tier::Critical).unwrap_err();
        assert!(matches!(err, SchedulerError::AlreadyExists(k) if k == "j1"));
        assert_eq!(s.tier_of("j1"), Some(Tier::Low));
        assert_eq!(s.job("j1").unwrap().name(), "A");
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn complete_then_cancel_is_not_found() {
        let (mut s, _) = scheduler();
        s.admit("j1", "A", 3, Tier::Critical).unwrap();

        s.complete("j1").unwrap();
        assert!(!s.contains("j1"));
        assert!(s.is_empty());

        let err = s.cancel("j1").unwrap_err();
        assert!(matches!(err, SchedulerError::NotFound(k) if k == "j1"));
    }

    #[test]
    fn unknown_keys_are_not_found() {
        let (mut s, _) = scheduler();
        assert!(matches!(s.cancel("ghost"), Err(SchedulerError::NotFound(_))));
        assert!(matches!(s.complete("ghost"), Err(SchedulerError::NotFound(_))));
        assert!(matches!(s.estimate_delay("ghost"), Err(SchedulerError::NotFound(_))));
    }

    #[test]
    fn cancel_active_job_stops_its_ticker() {
        let (mut s, source) = scheduler();
        s.admit("j1", "A", 10, Tier::High).unwrap();
        s.admit("j2", "B", 4, Tier::High).unwrap();
        s.tick();
        assert_eq!(source.live_count(), 1);

        s.cancel("j1").unwrap();
        assert_eq!(source.live_count(), 0);
        assert_eq!(s.total_time(Tier::High), 4);
        assert_eq!(s.active_count(), 0);
        assert_eq!(s.metrics().cancellations, 1);

        s.tick();
        assert!(s.is_active("j2"));
    }

    #[test]
    fn running_jobs_count_down_and_floor_at_zero() {
        let (mut s, source) = scheduler();
        s.admit("j1", "A", 3, Tier::Medium).unwrap();
        s.admit("j2", "B", 8, Tier::Medium).unwrap();
        s.tick();

        let mut last = s.remaining_time("j1").unwrap();
        for _ in 0..6 {
            source.advance(1);
            let now = s.remaining_time("j1").unwrap();
            assert!(now <= last);
            last = now;
        }
        assert_eq!(last, 0);
        assert_eq!(s.remaining_time("j2"), Some(8));
        assert_eq!(s.total_time(Tier::Medium), 8);
    }

    #[test]
    fn completing_active_job_frees_slot() {
        let (mut s, _) = scheduler();
        s.admit("j1", "A", 10, Tier::Medium).unwrap();
        s.admit("j2", "B", 10, Tier::Medium).unwrap();
        s.tick();
        assert!(s.is_active("j1"));

        s.complete("j1").unwrap();
        assert_eq!(s.active_count(), 0);

        s.tick();
        assert!(s.is_active("j2"));
        assert_eq!(s.metrics().completions, 1);
    }

    #[test]
    fn complete_reclaims_exhausted_front_job() {
        let (mut s, source) = scheduler();
        s.admit("short", "S", 1, Tier::Low).unwrap();
        s.admit("long", "L", 10, Tier::Low).unwrap();
        s.tick();
        s.tick();
        source.advance(1);
        assert_eq!(s.remaining_time("short"), Some(0));

        s.complete("long").unwrap();
        assert!(!s.contains("short"));
        assert!(s.is_empty());
        assert_eq!(s.metrics().reclaimed, 1);
    }

    #[test]
    fn active_ops_truncated_at_cap() {
        let (mut s, _) = scheduler_with(2);
        s.admit("low", "L", 5, Tier::Low).unwrap();
        s.admit("crit", "C", 5, Tier::Critical).unwrap();
        s.admit("med", "M", 5, Tier::Medium).unwrap();
        for _ in 0..3 {
            s.tick();
        }

        // Activation ignores the cap; enumeration applies it
        assert_eq!(s.active_count(), 3);
        assert_eq!(s.active_ops(), vec!["crit".to_string(), "med".to_string()]);
    }

    #[test]
    fn capacity_cannot_go_below_floor() {
        let (mut s, _) = scheduler();
        s.admit("j1", "A", 5, Tier::Low).unwrap();
        s.admit("j2", "B", 5, Tier::Low).unwrap();
        s.tick();
        s.tick();

        let err = s.adjust_capacity(-1000).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidCapacity { requested: -997, floor: 2 }));
        assert_eq!(s.max_active(), 3);
        assert_eq!(s.active_ops().len(), 2);

        assert_eq!(s.adjust_capacity(-1).unwrap(), 2);
        assert!(s.adjust_capacity(-1).is_err());
        assert_eq!(s.adjust_capacity(4).unwrap(), 6);
    }

    #[test]
    fn capacity_floor_is_one_when_idle() {
        let (mut s, _) = scheduler();
        assert_eq!(s.adjust_capacity(-2).unwrap(), 1);
        assert!(matches!(
            s.adjust_capacity(-1),
            Err(SchedulerError::InvalidCapacity { requested: 0, floor: 1 })
        ));
    }

    /// c1 (10) and h1 (6) active; c2 (4) pending in Critical;
    /// m1 (3) then m2 (5) pending in Medium.
    fn estimation_fixture(max_active: usize) -> Scheduler {
        let (mut s, _) = scheduler_with(max_active);
        s.admit("c1", "C1", 10, Tier::Critical).unwrap();
        s.admit("h1", "H1", 6, Tier::High).unwrap();
        s.tick();
        s.tick();
        s.admit("c2", "C2", 4, Tier::Critical).unwrap();
        s.admit("m1", "M1", 3, Tier::Medium).unwrap();
        s.admit("m2", "M2", 5, Tier::Medium).unwrap();
        s
    }

    #[test]
    fn estimate_folds_higher_tiers_then_own_queue() {
        let s = estimation_fixture(3);

        assert_eq!(s.estimate_delay("c1").unwrap(), 0);
        assert_eq!(s.estimate_delay("h1").unwrap(), 0);
        // [10, 6] -> nothing ahead in Critical
        assert_eq!(s.estimate_delay("c2").unwrap(), 6);
        // [10, 6] + c2 -> [10, 10]
        assert_eq!(s.estimate_delay("m1").unwrap(), 10);
        // [10, 10] + m1 -> [13, 10]
        assert_eq!(s.estimate_delay("m2").unwrap(), 10);
    }

    #[test]
    fn estimate_respects_active_cap() {
        let s = estimation_fixture(1);
        // Single bucket [10]: 10 + 4 + 3
        assert_eq!(s.estimate_delay("m2").unwrap(), 17);
        assert_eq!(s.estimate_delay("c2").unwrap(), 10);
    }

    #[test]
    fn estimate_zero_only_when_active_under_load() {
        let s = estimation_fixture(3);
        for key in ["c2", "m1", "m2"] {
            assert!(!s.is_active(key));
            assert!(s.estimate_delay(key).unwrap() > 0, "{key} should wait");
        }
    }

    #[test]
    fn shutdown_stops_all_tickers() {
        let (mut s, source) = scheduler();
        s.admit("a", "A", 5, Tier::Low).unwrap();
        s.admit("b", "B", 5, Tier::High).unwrap();
        s.tick();
        s.tick();
        assert_eq!(source.live_count(), 2);

        s.shutdown();
        assert_eq!(source.live_count(), 0);
        source.advance(3);
        assert_eq!(s.remaining_time("a"), Some(5));
    }

    #[test]
    fn snapshot_reports_every_tier() {
        let (mut s, _) = scheduler();
        s.admit("a", "A", 5, Tier::Medium).unwrap();
        s.admit("b", "B", 7, Tier::Medium).unwrap();
        s.tick();

        let snap = s.snapshot();
        assert_eq!(snap.levels.len(), 4);
        let medium = &snap.levels[Tier::Medium.index()];
        assert_eq!(medium.tier, Tier::Medium);
        assert_eq!(medium.active, 1);
        assert_eq!(medium.pending, 1);
        assert_eq!(medium.total_time, 12);
        assert_eq!(snap.active_ops, vec!["a".to_string()]);
        assert_eq!(snap.metrics.activations, 1);
    }

    #[test]
    fn pending_and_finished_ops() {
        let (mut s, source) = scheduler();
        s.admit("a", "A", 1, Tier::Low).unwrap();
        s.admit("b", "B", 4, Tier::Critical).unwrap();
        s.admit("c", "C", 4, Tier::Low).unwrap();
        s.tick();
        assert_eq!(s.pending_ops(), vec!["a".to_string(), "c".to_string()]);

        s.tick();
        source.advance(1);
        assert_eq!(s.finished_ops(), vec!["a".to_string()]);
        assert_eq!(s.pending_ops(), vec!["c".to_string()]);
    }
}
