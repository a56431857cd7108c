//! Play/pause/restart state machine and per-frame state assembly.
//!
//! [`AnimationController`] owns the only mutable clock in the system. Each
//! [`AnimationController::tick`] samples the rhythm and growth engines and
//! hands out an [`AnimationFrame`] snapshot; consumers never see a raw
//! timestamp.

use std::{fmt, ops::ControlFlow, str::FromStr, sync::Arc, time::Duration};

use serde::Serialize;

use crate::{
    AnimationConfig, Clock, Color, GrowthEngine, GrowthPosition, Palette, PaletteGenerator,
    PlaybackClock, Result, RhythmEngine, RhythmState, RingRecord, RingSeries, SystemClock,
    TreeRingError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Playing,
    Paused,
}

/// Commands accepted from the host input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    TogglePlay,
    Restart,
    Quit,
}

impl FromStr for Command {
    type Err = TreeRingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "toggle-play" | "toggle" | "space" => Ok(Self::TogglePlay),
            "restart" | "r" => Ok(Self::Restart),
            "quit" | "q" | "escape" | "esc" => Ok(Self::Quit),
            _ => Err(TreeRingError::UnknownCommand(s.trim().to_string())),
        }
    }
}

/// Side effects the host may want to mirror, e.g. pausing audio playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackEvent {
    Paused,
    Resumed,
    Restarted,
    /// The last ring has been reached. Emitted once per run.
    FullyGrown,
}

/// Receives [`PlaybackEvent`]s synchronously from the controller.
pub trait PlaybackListener {
    fn on_event(&mut self, event: PlaybackEvent);
}

impl<F> PlaybackListener for F
where
    F: FnMut(PlaybackEvent),
{
    fn on_event(&mut self, event: PlaybackEvent) {
        self(event)
    }
}

/// Mutable animation state, changed only by tick, toggle and restart.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    playback: PlaybackState,
    clock: PlaybackClock,
    current_ring: f64,
    /// Clock reading `current_ring` was sampled at.
    sampled_at: Duration,
}

impl AnimationState {
    fn start(now: Duration) -> Self {
        Self {
            playback: PlaybackState::Playing,
            clock: PlaybackClock::start(now),
            current_ring: 0.0,
            sampled_at: now,
        }
    }

    pub fn playback(&self) -> PlaybackState {
        self.playback
    }

    pub fn is_playing(&self) -> bool {
        self.playback == PlaybackState::Playing
    }

    /// Cached growth position.
    pub fn current_ring(&self) -> f64 {
        self.current_ring
    }
}

/// Everything a renderer, info panel or audio trigger needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct AnimationFrame {
    pub rhythm: RhythmState,
    pub visible_ring_count: usize,
    /// Grown fraction of the current ring, in `[0, 1)`.
    pub partial_growth: f64,
    pub current_ring_index: usize,
    /// Continuous growth position the integer fields derive from.
    pub growth_position: f64,
    pub current_year: i32,
    pub ring_count: usize,
    pub is_playing: bool,
    pub fully_grown: bool,
    #[serde(skip)]
    pub palette: Arc<Palette>,
}

impl AnimationFrame {
    pub fn ring_color(&self, ring: usize) -> Color {
        self.palette.color_for(ring)
    }

    pub fn current_color(&self) -> Color {
        self.ring_color(self.current_ring_index)
    }
}

/// Owns the animation clock and drives both engines.
pub struct AnimationController<C: Clock = SystemClock> {
    clock: C,
    series: RingSeries,
    palette: Arc<Palette>,
    rhythm: RhythmEngine,
    growth: GrowthEngine,
    state: AnimationState,
    fully_grown_announced: bool,
    listeners: Vec<Box<dyn PlaybackListener>>,
}

impl AnimationController<SystemClock> {
    /// Controller on the wall clock, playing from now.
    pub fn new(series: RingSeries, config: &AnimationConfig) -> Result<Self> {
        Self::with_clock(series, config, SystemClock::new())
    }
}

impl<C: Clock> AnimationController<C> {
    /// Validates `config` and starts playing at the clock's current reading.
    pub fn with_clock(series: RingSeries, config: &AnimationConfig, clock: C) -> Result<Self> {
        config.validate()?;
        let rhythm = RhythmEngine::new(config.bpm)?;
        let growth = GrowthEngine::new(config.ring_duration_secs, series.len())?;
        let palette = Arc::new(PaletteGenerator::new().generate(&series));
        let state = AnimationState::start(clock.now());

        tracing::debug!(
            rings = series.len(),
            bpm = config.bpm,
            ring_duration_secs = config.ring_duration_secs,
            "animation controller ready"
        );

        Ok(Self {
            clock,
            series,
            palette,
            rhythm,
            growth,
            state,
            fully_grown_announced: false,
            listeners: Vec::new(),
        })
    }

    pub fn subscribe(&mut self, listener: impl PlaybackListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    pub fn current_ring(&self) -> f64 {
        self.state.current_ring
    }

    pub fn series(&self) -> &RingSeries {
        &self.series
    }

    pub fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    /// Record for the ring currently growing.
    pub fn current_record(&self) -> &RingRecord {
        let index = (self.state.current_ring.floor() as usize).min(self.series.len() - 1);
        &self.series.records()[index]
    }

    /// Advances growth (when playing) and returns the new frame.
    pub fn tick(&mut self) -> AnimationFrame {
        let now = self.clock.now();
        if self.state.is_playing() {
            let play_elapsed = self.state.clock.play_elapsed(now).as_secs_f64();
            self.state.current_ring = self.growth.sample(play_elapsed);
            self.state.sampled_at = now;

            let position = GrowthPosition::new(self.state.current_ring, self.growth.ring_count());
            if position.is_fully_grown() && !self.fully_grown_announced {
                self.fully_grown_announced = true;
                tracing::debug!(rings = self.series.len(), "all rings grown");
                self.emit(PlaybackEvent::FullyGrown);
            }
        }
        self.frame()
    }

    /// Frame for the current state without advancing growth.
    pub fn frame(&self) -> AnimationFrame {
        let now = self.clock.now();
        let wall_elapsed = self.state.clock.wall_elapsed(now).as_secs_f64();
        let position = GrowthPosition::new(self.state.current_ring, self.growth.ring_count());

        AnimationFrame {
            rhythm: self.rhythm.sample(wall_elapsed),
            visible_ring_count: position.visible_ring_count(),
            partial_growth: position.partial_growth(),
            current_ring_index: position.current_ring_index(),
            growth_position: position.position,
            current_year: self.current_record().year,
            ring_count: self.series.len(),
            is_playing: self.state.is_playing(),
            fully_grown: position.is_fully_grown(),
            palette: Arc::clone(&self.palette),
        }
    }

    /// Flips between playing and paused; the growth position is untouched.
    ///
    /// Pausing freezes the clock at the last sampled instant rather than at
    /// the toggle, so growth resumes exactly from the position on screen.
    pub fn toggle_play(&mut self) -> PlaybackState {
        let now = self.clock.now();
        let event = match self.state.playback {
            PlaybackState::Playing => {
                self.state.clock.pause(self.state.sampled_at);
                self.state.playback = PlaybackState::Paused;
                PlaybackEvent::Paused
            }
            PlaybackState::Paused => {
                self.state.clock.resume(now);
                self.state.sampled_at = now;
                self.state.playback = PlaybackState::Playing;
                PlaybackEvent::Resumed
            }
        };
        tracing::debug!(
            state = ?self.state.playback,
            ring = self.state.current_ring,
            "playback toggled"
        );
        self.emit(event);
        self.state.playback
    }

    /// Back to the first ring, playing, with a fresh time origin.
    pub fn restart(&mut self) {
        self.state = AnimationState::start(self.clock.now());
        self.fully_grown_announced = false;
        tracing::debug!("animation restarted");
        self.emit(PlaybackEvent::Restarted);
    }

    /// Applies a host command. `Quit` leaves the state alone and asks the
    /// host to stop ticking.
    pub fn handle(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::TogglePlay => {
                self.toggle_play();
            }
            Command::Restart => self.restart(),
            Command::Quit => {
                tracing::debug!("quit requested");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Replaces the data set, rebuilds the palette and restarts.
    pub fn reload(&mut self, series: RingSeries) -> Result<()> {
        self.growth = GrowthEngine::new(self.growth.ring_duration(), series.len())?;
        self.palette = Arc::new(PaletteGenerator::new().generate(&series));
        self.series = series;
        tracing::debug!(rings = self.series.len(), "ring data reloaded");
        self.restart();
        Ok(())
    }

    fn emit(&mut self, event: PlaybackEvent) {
        for listener in &mut self.listeners {
            listener.on_event(event);
        }
    }
}

impl<C: Clock> fmt::Debug for AnimationController<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationController")
            .field("rings", &self.series.len())
            .field("rhythm", &self.rhythm)
            .field("growth", &self.growth)
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::ManualClock;

    fn controller() -> (AnimationController<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let controller = AnimationController::with_clock(
            RingSeries::synthetic(),
            &AnimationConfig::default(),
            clock.clone(),
        )
        .unwrap();
        (controller, clock)
    }

    #[test]
    fn initial_frame_is_well_defined() {
        let (controller, _clock) = controller();
        let frame = controller.frame();

        assert!(frame.is_playing);
        assert_eq!(frame.growth_position, 0.0);
        assert_eq!(frame.visible_ring_count, 3);
        assert_eq!(frame.current_ring_index, 0);
        assert_eq!(frame.current_year, 1990);
        assert_eq!(frame.rhythm.beat_index, 0);
        assert!(frame.rhythm.is_strong_beat);
        assert_eq!(frame.palette.len(), 34);
    }

    #[test]
    fn ticks_follow_elapsed_time() {
        let (mut controller, clock) = controller();
        clock.set_secs(13.75);
        let frame = controller.tick();

        assert_eq!(frame.current_ring_index, 5);
        assert!((frame.partial_growth - 0.5).abs() < 1e-9);
        assert_eq!(frame.current_year, 1995);
        assert_eq!(frame.current_color(), controller.palette().colors()[5]);
    }

    #[test]
    fn pause_freezes_growth() {
        let (mut controller, clock) = controller();
        clock.set_secs(4.0);
        controller.tick();
        assert_eq!(controller.toggle_play(), PlaybackState::Paused);

        let frozen = controller.current_ring();
        for step in 1..=20 {
            clock.set_secs(4.0 + f64::from(step));
            let frame = controller.tick();
            assert_eq!(frame.growth_position, frozen);
            assert!(!frame.is_playing);
        }
    }

    #[test]
    fn rhythm_keeps_running_while_paused() {
        let (mut controller, clock) = controller();
        controller.toggle_play();
        clock.set_secs(10.0);
        let frame = controller.tick();
        assert_eq!(frame.rhythm.time_elapsed, 10.0);
        assert_eq!(frame.growth_position, 0.0);
    }

    #[test]
    fn resume_continues_from_frozen_point() {
        let (mut controller, clock) = controller();
        clock.set_secs(10.0);
        controller.tick();
        let at_pause = controller.current_ring();
        controller.toggle_play();

        clock.set_secs(15.0);
        controller.tick();
        assert_eq!(controller.toggle_play(), PlaybackState::Playing);
        let frame = controller.tick();
        assert_eq!(frame.growth_position, at_pause);
        assert_eq!(frame.growth_position, 4.0);

        clock.set_secs(17.5);
        assert_eq!(controller.tick().growth_position, 5.0);
    }

    #[test]
    fn pause_between_ticks_resumes_from_displayed_position() {
        let (mut controller, clock) = controller();
        clock.set_secs(9.0);
        let shown = controller.tick().growth_position;
        assert!((shown - 3.6).abs() < 1e-9);

        clock.set_secs(10.0);
        controller.toggle_play();
        for seconds in [11.0, 13.0, 15.0] {
            clock.set_secs(seconds);
            assert_eq!(controller.tick().growth_position, shown);
        }

        controller.toggle_play();
        assert_eq!(controller.tick().growth_position, shown);

        clock.set_secs(17.5);
        assert!((controller.tick().growth_position - 4.6).abs() < 1e-9);
    }

    #[test]
    fn repause_without_tick_keeps_position() {
        let (mut controller, clock) = controller();
        clock.set_secs(5.0);
        controller.tick();
        clock.set_secs(6.0);
        controller.toggle_play();

        clock.set_secs(20.0);
        controller.toggle_play();
        clock.set_secs(21.0);
        controller.toggle_play();

        clock.set_secs(30.0);
        controller.toggle_play();
        assert_eq!(controller.tick().growth_position, 2.0);
    }

    #[test]
    fn restart_resets_state() {
        let (mut controller, clock) = controller();
        clock.set_secs(30.0);
        controller.tick();
        controller.toggle_play();

        controller.restart();
        assert_eq!(controller.current_ring(), 0.0);
        assert!(controller.is_playing());

        let frame = controller.frame();
        assert_eq!(frame.rhythm.time_elapsed, 0.0);

        clock.set_secs(32.5);
        assert_eq!(controller.tick().growth_position, 1.0);
    }

    #[test]
    fn toggle_does_not_move_growth() {
        let (mut controller, clock) = controller();
        clock.set_secs(7.5);
        controller.tick();
        controller.toggle_play();
        assert_eq!(controller.current_ring(), 3.0);
        controller.toggle_play();
        assert_eq!(controller.current_ring(), 3.0);
    }

    #[test]
    fn listeners_receive_transitions() {
        let (mut controller, clock) = controller();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        controller.subscribe(move |event: PlaybackEvent| sink.borrow_mut().push(event));

        controller.toggle_play();
        controller.toggle_play();
        clock.set_secs(500.0);
        controller.tick();
        controller.tick();
        controller.restart();

        assert_eq!(
            *seen.borrow(),
            vec![
                PlaybackEvent::Paused,
                PlaybackEvent::Resumed,
                PlaybackEvent::FullyGrown,
                PlaybackEvent::Restarted,
            ]
        );
    }

    #[test]
    fn commands_map_to_transitions() {
        let (mut controller, _clock) = controller();
        assert_eq!(
            controller.handle("toggle-play".parse().unwrap()),
            ControlFlow::Continue(())
        );
        assert!(!controller.is_playing());
        assert_eq!(
            controller.handle(Command::Restart),
            ControlFlow::Continue(())
        );
        assert!(controller.is_playing());
        assert_eq!(controller.handle(Command::Quit), ControlFlow::Break(()));

        assert_eq!("R".parse::<Command>().unwrap(), Command::Restart);
        assert_eq!(" quit ".parse::<Command>().unwrap(), Command::Quit);
        let err = "jump".parse::<Command>().unwrap_err();
        assert!(format!("{err}").contains("jump"));
    }

    #[test]
    fn reload_rebuilds_palette_and_restarts() {
        let (mut controller, clock) = controller();
        clock.set_secs(20.0);
        controller.tick();

        let records = RingSeries::synthetic().records()[..5].to_vec();
        controller.reload(RingSeries::new(records).unwrap()).unwrap();
        assert_eq!(controller.palette().len(), 5);
        assert_eq!(controller.current_ring(), 0.0);

        clock.set_secs(1000.0);
        let frame = controller.tick();
        assert_eq!(frame.growth_position, 4.0);
        assert_eq!(frame.visible_ring_count, 5);
        assert!(frame.fully_grown);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = AnimationConfig {
            bpm: 0,
            ..AnimationConfig::default()
        };
        let result =
            AnimationController::with_clock(RingSeries::synthetic(), &config, ManualClock::new());
        assert!(matches!(result, Err(TreeRingError::InvalidConfig(_))));
    }
}
