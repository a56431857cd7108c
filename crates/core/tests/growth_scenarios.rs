use tree_rings_core::{
    AnimationConfig, AnimationController, GrowthEngine, ManualClock, PaletteGenerator,
    RingSeries, Section,
};

fn synthetic_controller() -> (AnimationController<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let controller = AnimationController::with_clock(
        RingSeries::synthetic(),
        &AnimationConfig::default(),
        clock.clone(),
    )
    .expect("default config is valid");
    (controller, clock)
}

#[test]
fn full_run_reaches_last_ring_at_82_5_seconds() {
    let series = RingSeries::synthetic();
    assert_eq!(series.len(), 34);

    let engine = GrowthEngine::new(2.5, series.len()).unwrap();
    assert_eq!(engine.sample(82.5), 33.0);

    let (mut controller, clock) = synthetic_controller();
    clock.set_secs(82.5);
    let frame = controller.tick();

    assert_eq!(frame.growth_position, 33.0);
    assert_eq!(frame.visible_ring_count, 34);
    assert_eq!(frame.current_ring_index, 33);
    assert_eq!(frame.current_year, 2023);
    assert!(frame.fully_grown);
}

#[test]
fn growth_never_overshoots_the_last_ring() {
    let (mut controller, clock) = synthetic_controller();
    for minutes in [2.0, 10.0, 600.0] {
        clock.set_secs(minutes * 60.0);
        let frame = controller.tick();
        assert_eq!(frame.growth_position, 33.0);
        assert_eq!(frame.partial_growth, 0.0);
    }
}

#[test]
fn pausing_for_five_seconds_does_not_skip_growth() {
    let (mut controller, clock) = synthetic_controller();

    clock.set_secs(10.0);
    let before_pause = controller.tick().growth_position;
    controller.toggle_play();

    clock.set_secs(15.0);
    controller.tick();
    controller.toggle_play();
    let after_resume = controller.tick();

    assert_eq!(after_resume.growth_position, before_pause);
    // Rhythm is cosmetic and kept on wall time.
    assert_eq!(after_resume.rhythm.section, Section::Verse);
    assert_eq!(after_resume.rhythm.beat_index, 30);
}

#[test]
fn sixty_hertz_ticks_grow_monotonically() {
    let (mut controller, clock) = synthetic_controller();
    let mut previous = controller.frame().growth_position;

    for _ in 0..(60 * 90) {
        clock.advance_secs(1.0 / 60.0);
        let frame = controller.tick();
        assert!(frame.growth_position >= previous);
        assert!((0.0..1.0).contains(&frame.partial_growth));
        assert!(frame.visible_ring_count >= 3);
        previous = frame.growth_position;
    }
    assert_eq!(previous, 33.0);
}

#[test]
fn palette_is_reproducible_across_controllers() {
    let (first, _) = synthetic_controller();
    let (second, _) = synthetic_controller();
    assert_eq!(first.palette(), second.palette());
    assert_eq!(
        **first.palette(),
        PaletteGenerator::new().generate(&RingSeries::synthetic())
    );
}

#[test]
fn pausing_between_ticks_resumes_without_a_jump() {
    let (mut controller, clock) = synthetic_controller();

    clock.set_secs(9.0);
    let shown = controller.tick().growth_position;
    clock.set_secs(10.0);
    controller.toggle_play();

    let frozen: Vec<f64> = [11.0, 13.0, 15.0]
        .into_iter()
        .map(|seconds| {
            clock.set_secs(seconds);
            controller.tick().growth_position
        })
        .collect();
    assert_eq!(frozen, vec![shown; 3]);

    controller.toggle_play();
    assert_eq!(controller.tick().growth_position, shown);
}

#[test]
fn far_future_clock_reading_is_fully_grown() {
    let (mut controller, clock) = synthetic_controller();
    clock.set_secs(1e20);
    let frame = controller.tick();
    assert_eq!(frame.growth_position, 33.0);
    assert!(frame.fully_grown);
}
