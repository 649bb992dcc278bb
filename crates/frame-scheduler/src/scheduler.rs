//! FrameScheduler: the cooperative frame-driven step machine.
//!
//! The scheduler owns a private run state, an optional bound data sequence, a
//! user step function and a hook table. The host drives it by firing the frame
//! requests it places through its [`FrameSource`]; each `tick()` either re-arms
//! itself (throttled or paused) or advances the cursor and executes one logical
//! step.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::SchedulerConfig;
use crate::error::SchedulerError;
use crate::event::{call_guarded, HookTable, SchedulerEvent};
use crate::frame::{FrameSource, TickHandle};
use crate::options::ScheduleOptions;
use crate::state::SchedulerState;

/// Step function invoked once per executed logical step.
pub type StepFn<T> = Box<dyn FnMut(&mut StepContext<'_, T>)>;

/// Transform applied to the current item before the step function sees it.
pub type ParseFn<T> = Box<dyn FnMut(&T) -> T>;

/// Control requests a step function can queue against its own scheduler.
/// Applied after the step returns, once the next frame has been arranged.
pub(crate) enum Command {
    Pause,
    Stop,
}

/// Per-step view handed to the step function.
pub struct StepContext<'a, T> {
    index: usize,
    value: Option<T>,
    data: Option<&'a [T]>,
    cache: Option<&'a Value>,
    commands: &'a mut Vec<Command>,
}

impl<'a, T> StepContext<'a, T> {
    /// Zero-based index of this logical step within the current pass.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The parsed current item, when a sequence is bound.
    #[inline]
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Take ownership of the parsed current item.
    #[inline]
    pub fn take_value(&mut self) -> Option<T> {
        self.value.take()
    }

    /// The full bound sequence, when present.
    #[inline]
    pub fn data(&self) -> Option<&[T]> {
        self.data
    }

    /// The opaque user cache value, when present.
    #[inline]
    pub fn cache(&self) -> Option<&Value> {
        self.cache
    }

    /// Request a Running -> Paused transition after this step.
    #[inline]
    pub fn pause(&mut self) {
        self.commands.push(Command::Pause);
    }

    /// Request a terminal stop after this step.
    #[inline]
    pub fn stop(&mut self) {
        self.commands.push(Command::Stop);
    }
}

/// Mutable run state, owned exclusively by the scheduler.
#[derive(Debug, Default)]
struct RunState {
    lifecycle: SchedulerState,
    /// Cursor into the bound sequence; `None` before the first executed step
    /// of a pass.
    current: Option<usize>,
    /// Host frames seen since the last executed step, modulo the skip factor.
    frame_counter: u32,
    /// Handle of the currently scheduled frame request, if any.
    pending: Option<TickHandle>,
}

impl RunState {
    fn reset_pass(&mut self) {
        self.lifecycle = SchedulerState::Initial;
        self.current = None;
        self.frame_counter = 0;
    }
}

/// Frame-driven animation scheduler.
///
/// Generic over the item type `T` of the optional bound sequence and the host
/// frame mechanism `S`. All methods are synchronous; the waiting happens inside
/// the host between `tick()` invocations.
pub struct FrameScheduler<T, S: FrameSource> {
    frames: S,
    config: SchedulerConfig,
    run_state: RunState,
    data: Option<Vec<T>>,
    parse: Option<ParseFn<T>>,
    step: Option<StepFn<T>>,
    hooks: HookTable,
    cache: Option<Value>,
}

impl<T: Clone, S: FrameSource> FrameScheduler<T, S> {
    /// Create an idle scheduler over the given frame source.
    pub fn new(frames: S) -> Self {
        Self {
            frames,
            config: SchedulerConfig::default(),
            run_state: RunState::default(),
            data: None,
            parse: None,
            step: None,
            hooks: HookTable::default(),
            cache: None,
        }
    }

    /// Create a scheduler and apply options in one call. With `auto_run` set
    /// and a step function supplied, playback starts immediately.
    pub fn with_options(frames: S, options: ScheduleOptions<T>) -> Self {
        let mut scheduler = Self::new(frames);
        scheduler.configure(options);
        scheduler
    }

    /// Merge a partial configuration into the scheduler.
    ///
    /// `speed` is snapped onto the supported ladder. A supplied step function,
    /// parse function, data binding or cache value replaces the previous one;
    /// omitted fields keep their current values. With `auto_run` in effect and
    /// a step function bound, an idle scheduler starts right away.
    pub fn configure(&mut self, options: ScheduleOptions<T>) -> &mut Self {
        if let Some(speed) = options.speed {
            self.config.set_speed(speed);
        }
        if let Some(auto_run) = options.auto_run {
            self.config.auto_run = auto_run;
        }
        if let Some(looped) = options.looped {
            self.config.looped = looped;
        }
        if let Some(policy) = options.fault_policy {
            self.config.fault_policy = policy;
        }
        if let Some(data) = options.data {
            self.data = Some(data);
        }
        if let Some(parse) = options.parse {
            self.parse = Some(parse);
        }
        if let Some(step) = options.step {
            self.step = Some(step);
        }
        if let Some(cache) = options.cache {
            self.cache = Some(cache);
        }

        if self.config.auto_run
            && self.step.is_some()
            && self.run_state.lifecycle == SchedulerState::Initial
            && self.run_state.pending.is_none()
        {
            // cannot fail: a step function is bound
            let _ = self.run();
        }
        self
    }

    /// Register a lifecycle hook under `"start"`, `"pause"` or `"end"`
    /// (camelCase spellings `onStart`/`onPause`/`onEnd` work too). Unknown
    /// names are ignored.
    pub fn on(&mut self, name: &str, hook: impl FnMut(&SchedulerEvent) + 'static) -> &mut Self {
        self.hooks.register(name, Box::new(hook));
        self
    }

    /// Start (or restart) the schedule.
    ///
    /// Fails with [`SchedulerError::NoStepFunction`] when no step function is
    /// bound. Otherwise dispatches `Started` and requests the first frame; the
    /// lifecycle stays Initial until the first executed step. Calling `run`
    /// while Running or Paused only re-arms the frame request; calling it after
    /// Ended begins a fresh pass.
    pub fn run(&mut self) -> Result<(), SchedulerError> {
        if self.step.is_none() {
            return Err(SchedulerError::NoStepFunction);
        }
        match self.run_state.lifecycle {
            SchedulerState::Running | SchedulerState::Paused => {
                self.rearm();
                return Ok(());
            }
            SchedulerState::Ended => self.run_state.reset_pass(),
            SchedulerState::Initial => {}
        }
        log::debug!("scheduler starting at {} steps/s", self.config.speed());
        self.hooks
            .dispatch(&SchedulerEvent::Started, self.config.fault_policy);
        self.rearm();
        Ok(())
    }

    /// Bind a step function and start the schedule.
    pub fn run_with(
        &mut self,
        step: impl FnMut(&mut StepContext<'_, T>) + 'static,
    ) -> Result<(), SchedulerError> {
        self.step = Some(Box::new(step));
        self.run()
    }

    /// Flip between Running and Paused.
    ///
    /// Returns the resulting state token, or `None` when called from Initial
    /// or Ended, where the toggle has no effect. Entering Paused dispatches
    /// `Paused` exactly once per transition.
    pub fn toggle(&mut self) -> Option<&'static str> {
        match self.run_state.lifecycle {
            SchedulerState::Running => {
                self.run_state.lifecycle = SchedulerState::Paused;
                log::debug!("scheduler paused");
                self.hooks
                    .dispatch(&SchedulerEvent::Paused, self.config.fault_policy);
                Some(SchedulerState::Paused.name())
            }
            SchedulerState::Paused => {
                self.run_state.lifecycle = SchedulerState::Running;
                log::debug!("scheduler resumed");
                Some(SchedulerState::Running.name())
            }
            SchedulerState::Initial | SchedulerState::Ended => None,
        }
    }

    /// Terminal, user-initiated stop. No-op from Initial or Ended.
    ///
    /// Cancels the pending frame request, moves to Ended and dispatches
    /// `Stopped` (distinct from a terminal `SequenceBoundary`). With `clear`
    /// set, the bound data and cache are discarded as well.
    pub fn stop(&mut self, clear: bool) {
        if !self.run_state.lifecycle.can_stop() {
            return;
        }
        if let Some(handle) = self.run_state.pending.take() {
            self.frames.cancel(handle);
        }
        self.run_state.lifecycle = SchedulerState::Ended;
        log::debug!("scheduler stopped");
        self.hooks
            .dispatch(&SchedulerEvent::Stopped, self.config.fault_policy);
        if clear {
            self.data = None;
            self.cache = None;
        }
    }

    /// Stop and discard everything: run state, configuration, step and parse
    /// functions, data, hooks and cache. The scheduler is unusable until it is
    /// reconfigured; `run()` fails with `NoStepFunction` until then.
    pub fn clear(&mut self) {
        self.stop(true);
        // stop() is a no-op from Initial, but run() may already have armed a
        // frame there; the no-dangling invariant still has to hold
        if let Some(handle) = self.run_state.pending.take() {
            self.frames.cancel(handle);
        }
        self.run_state = RunState::default();
        self.config = SchedulerConfig::default();
        self.step = None;
        self.parse = None;
        self.data = None;
        self.cache = None;
        self.hooks.clear();
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> SchedulerState {
        self.run_state.lifecycle
    }

    /// The bound data sequence, when present.
    #[inline]
    pub fn data(&self) -> Option<&[T]> {
        self.data.as_deref()
    }

    /// The opaque user cache value, when present.
    #[inline]
    pub fn cache(&self) -> Option<&Value> {
        self.cache.as_ref()
    }

    /// Replace the opaque user cache value.
    #[inline]
    pub fn set_cache(&mut self, cache: Value) {
        self.cache = Some(cache);
    }

    /// Effective configuration.
    #[inline]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The host frame mechanism.
    #[inline]
    pub fn frame_source(&self) -> &S {
        &self.frames
    }

    /// Mutable access to the host frame mechanism, mainly for driving a
    /// [`ManualFrameSource`](crate::frame::ManualFrameSource).
    #[inline]
    pub fn frame_source_mut(&mut self) -> &mut S {
        &mut self.frames
    }

    /// One invocation of the scheduler's frame-callback handler. The host
    /// calls this when a frame request placed through the [`FrameSource`]
    /// fires.
    pub fn tick(&mut self) {
        // the frame that delivered this tick is spent
        self.run_state.pending = None;
        if self.run_state.lifecycle.is_ended() || self.step.is_none() {
            return;
        }

        let skip = self.config.skip_factor();
        self.run_state.frame_counter = (self.run_state.frame_counter + 1) % skip;
        if self.run_state.lifecycle == SchedulerState::Paused || self.run_state.frame_counter != 0 {
            // throttling/pause path: keep spinning at host rate so resume
            // latency stays at one host frame, but do no user-visible work
            self.rearm();
            return;
        }

        let index = self.run_state.current.map_or(0, |i| i + 1);
        self.run_state.current = Some(index);

        // `>=` rather than `==`: configure() may rebind a shorter sequence
        // mid-run, leaving the cursor past the new length
        if let Some(len) = self.data.as_ref().map(Vec::len) {
            if index >= len {
                self.finish_pass();
                return;
            }
        }

        self.run_state.lifecycle = SchedulerState::Running;
        let value = match (self.data.as_ref(), self.parse.as_mut()) {
            (Some(data), Some(parse)) => Some(parse(&data[index])),
            (Some(data), None) => Some(data[index].clone()),
            (None, _) => None,
        };

        let mut step_fn = match self.step.take() {
            Some(step_fn) => step_fn,
            None => return,
        };
        let mut commands = Vec::new();
        {
            let mut ctx = StepContext {
                index,
                value,
                data: self.data.as_deref(),
                cache: self.cache.as_ref(),
                commands: &mut commands,
            };
            call_guarded("step function", self.config.fault_policy, || {
                step_fn(&mut ctx)
            });
        }
        self.step = Some(step_fn);
        self.rearm();
        self.apply_commands(commands);
    }

    /// End-of-sequence handling, entered exactly once per pass. The tick that
    /// reached the boundary has already consumed its frame request, so there
    /// is nothing to cancel on the terminal path.
    fn finish_pass(&mut self) {
        if self.config.looped {
            self.run_state.current = None;
            self.rearm();
            log::debug!("sequence pass complete, looping");
            self.hooks.dispatch(
                &SchedulerEvent::SequenceBoundary { terminal: false },
                self.config.fault_policy,
            );
        } else {
            self.run_state.lifecycle = SchedulerState::Ended;
            log::debug!("sequence complete");
            self.hooks.dispatch(
                &SchedulerEvent::SequenceBoundary { terminal: true },
                self.config.fault_policy,
            );
        }
    }

    fn apply_commands(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::Pause => {
                    if self.run_state.lifecycle.is_running() {
                        self.toggle();
                    }
                }
                Command::Stop => self.stop(false),
            }
        }
    }

    /// Cancel any stale pending request and arm the next frame.
    fn rearm(&mut self) {
        if let Some(handle) = self.run_state.pending.take() {
            self.frames.cancel(handle);
        }
        self.run_state.pending = Some(self.frames.request());
    }
}

impl<T: Clone + DeserializeOwned, S: FrameSource> FrameScheduler<T, S> {
    /// Merge wire-format JSON options; see [`ScheduleOptions::from_json`] for
    /// the permissive-ignore rules.
    pub fn configure_json(&mut self, value: &Value) -> &mut Self {
        self.configure(ScheduleOptions::from_json(value))
    }
}

impl<T, S: FrameSource> std::fmt::Debug for FrameScheduler<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("config", &self.config)
            .field("run_state", &self.run_state)
            .field("data_len", &self.data.as_ref().map(Vec::len))
            .field("has_step", &self.step.is_some())
            .field("hooks", &self.hooks)
            .finish()
    }
}
