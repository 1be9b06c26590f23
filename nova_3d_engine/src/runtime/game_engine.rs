/// GameEngine - owns the components and runs the three engine loops.
///
/// - physics (own thread, optional): fixed-step accumulator, physics
///   simulation step, then every PHYSICS component's `fixed_update`
/// - game (caller's thread): clamped frame delta, every UPDATE component's
///   `update`, then every `late_update`, then a `RenderState` is built from
///   the RENDER components and published
/// - render (own thread, optional): submits each newly published state once
///
/// The component list is shared by the game and physics loops behind one
/// mutex; the render thread only touches the `RenderBufferManager` and the
/// submitter. Stopping is cooperative: every loop polls the running flag
/// once per iteration.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::Duration;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::render::{RenderBufferManager, RenderSubmitter};
use crate::scene::NodeType;
use super::component::{GameComponent, PhysicsSimulation};
use super::context::{EngineContext, EngineHandle};
use super::options::EngineOptions;
use super::time::{Clock, FixedStepAccumulator, FrameStats, SystemClock};

const SOURCE: &str = "nova3d::GameEngine";

/// Idle wait of the physics and render loops.
const IDLE_SLEEP: Duration = Duration::from_millis(1);

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Stops the engine when the game loop unwinds, so workers can be joined.
struct StopOnDrop<'a>(&'a EngineHandle);

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.0.stop();
    }
}

pub struct GameEngine {
    options: EngineOptions,
    clock: Arc<dyn Clock>,
    handle: EngineHandle,
    context: Arc<EngineContext>,
    components: Mutex<Vec<Box<dyn GameComponent>>>,
    physics: Mutex<Option<Box<dyn PhysicsSimulation>>>,
    submitter: Mutex<Box<dyn RenderSubmitter>>,
    buffers: RenderBufferManager,
    pending_resize: Mutex<Option<(u32, u32)>>,
    stats: Mutex<FrameStats>,
    frame_index: AtomicU64,
}

impl GameEngine {
    /// Create an engine submitting frames to `submitter`.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `options` do not validate.
    pub fn new<S: RenderSubmitter + 'static>(options: EngineOptions, submitter: S) -> Result<Self> {
        options.validate()?;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
        let handle = EngineHandle::new();
        let context = Arc::new(EngineContext::new(clock.clone(), handle.clone(), options.clone()));

        crate::engine_debug!(
            SOURCE,
            "Engine created ({} render buffers, physics {}, render thread {})",
            options.render_buffer_count,
            options.run_physics,
            options.run_render_thread
        );

        Ok(Self {
            buffers: RenderBufferManager::new(options.render_buffer_count),
            stats: Mutex::new(FrameStats::new(f64::from(options.frame_stats_interval))),
            options,
            clock,
            handle,
            context,
            components: Mutex::new(Vec::new()),
            physics: Mutex::new(None),
            submitter: Mutex::new(Box::new(submitter)),
            pending_resize: Mutex::new(None),
            frame_index: AtomicU64::new(0),
        })
    }

    /// Replace the time source. Components added afterwards see the new
    /// clock through their context.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.context = Arc::new(EngineContext::new(clock.clone(), self.handle.clone(), self.options.clone()));
        self.clock = clock;
        self
    }

    // ===== SETUP =====

    pub fn set_physics<P: PhysicsSimulation + 'static>(&self, physics: P) {
        *lock(&self.physics) = Some(Box::new(physics));
    }

    /// Register a component. Safe while the engine runs.
    pub fn add_component<C: GameComponent + 'static>(&self, mut component: C) {
        component.attach(self.context.clone());
        crate::engine_debug!(SOURCE, "Component '{}' added", component.name());
        lock(&self.components).push(Box::new(component));
    }

    pub fn clear_components(&self) {
        lock(&self.components).clear();
        crate::engine_debug!(SOURCE, "Components cleared");
    }

    pub fn component_count(&self) -> usize {
        lock(&self.components).len()
    }

    // ===== ACCESSORS =====

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    pub fn context(&self) -> Arc<EngineContext> {
        self.context.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    /// Latest published frames, for render-side consumers.
    pub fn render_buffers(&self) -> &RenderBufferManager {
        &self.buffers
    }

    pub fn frame_stats(&self) -> FrameStats {
        lock(&self.stats).clone()
    }

    /// Frames built so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index.load(Ordering::Acquire)
    }

    // ===== CONTROL =====

    /// Queue a render-area change; applied at the start of the next frame.
    pub fn on_resize(&self, width: u32, height: u32) {
        *lock(&self.pending_resize) = Some((width, height));
    }

    pub fn stop(&self) {
        if self.handle.is_running() {
            crate::engine_info!(SOURCE, "Stop requested");
        }
        self.handle.stop();
    }

    /// Run until stopped. Blocks the calling thread, which hosts the game
    /// loop; the physics and render threads are spawned as configured and
    /// joined before returning.
    ///
    /// # Errors
    ///
    /// - `InvalidOperation` if the engine is already running
    /// - `ThreadError` if a worker could not be spawned or panicked
    /// - the submitter's error if a frame submission failed
    pub fn run(&self) -> Result<()> {
        if !self.handle.start() {
            crate::engine_bail!(SOURCE, "Engine is already running");
        }
        crate::engine_info!(SOURCE, "Engine started with {} components", self.component_count());

        let result = thread::scope(|scope| {
            let _stop = StopOnDrop(&self.handle);

            let physics = if self.options.run_physics {
                match self.spawn_worker(scope, "nova3d-physics", || self.physics_loop()) {
                    Ok(worker) => Some(worker),
                    Err(error) => return Err(error),
                }
            } else {
                None
            };
            let render = if self.options.run_render_thread {
                match self.spawn_worker(scope, "nova3d-render", || self.render_loop()) {
                    Ok(worker) => Some(worker),
                    Err(error) => {
                        self.handle.stop();
                        let _ = Self::join_worker("physics", physics);
                        return Err(error);
                    }
                }
            } else {
                None
            };

            let game = self.game_loop();
            self.handle.stop();

            let physics = Self::join_worker("physics", physics);
            let render = Self::join_worker("render", render);
            game.and(physics).and(render)
        });

        crate::engine_info!(SOURCE, "Engine stopped after {} frames", self.frame_index());
        result
    }

    fn spawn_worker<'scope, 'env, F>(
        &self,
        scope: &'scope Scope<'scope, 'env>,
        name: &str,
        body: F,
    ) -> Result<ScopedJoinHandle<'scope, Result<()>>>
    where
        F: FnOnce() -> Result<()> + Send + 'scope,
    {
        let worker = thread::Builder::new()
            .name(name.to_string())
            .spawn_scoped(scope, body)
            .map_err(|error| {
                self.handle.stop();
                Engine::log_and_return_error(
                    SOURCE,
                    Error::ThreadError(format!("failed to spawn {}: {}", name, error)),
                )
            })?;
        crate::engine_debug!(SOURCE, "Thread '{}' spawned", name);
        Ok(worker)
    }

    fn join_worker(name: &str, worker: Option<ScopedJoinHandle<'_, Result<()>>>) -> Result<()> {
        let Some(worker) = worker else { return Ok(()) };
        let result = worker.join().map_err(|_| {
            Engine::log_and_return_error(SOURCE, Error::ThreadError(format!("{} thread panicked", name)))
        })?;
        crate::engine_debug!(SOURCE, "Thread '{}' joined", name);
        result
    }

    // ===== LOOPS =====

    fn physics_loop(&self) -> Result<()> {
        let dt = self.options.fixed_delta_time;
        let mut accumulator = FixedStepAccumulator::new(f64::from(dt), self.options.max_sub_steps);
        let mut previous = self.clock.now();

        while self.handle.is_running() {
            let now = self.clock.now();
            let steps = accumulator.advance(now - previous);
            previous = now;

            for _ in 0..steps {
                if !self.handle.is_running() {
                    break;
                }
                self.fixed_step(dt);
            }
            thread::sleep(IDLE_SLEEP);
        }

        if accumulator.discarded_steps() > 0 {
            crate::engine_debug!(SOURCE, "Physics discarded {} steps over the run", accumulator.discarded_steps());
        }
        Ok(())
    }

    fn fixed_step(&self, dt: f32) {
        if let Some(physics) = lock(&self.physics).as_mut() {
            physics.step(dt);
        }
        let mut components = lock(&self.components);
        for component in components.iter_mut() {
            if component.capabilities().contains(NodeType::PHYSICS) {
                component.fixed_update(dt);
            }
        }
    }

    fn game_loop(&self) -> Result<()> {
        self.apply_resize(self.options.render_width, self.options.render_height);

        let max_delta = f64::from(self.options.max_delta_time);
        let mut previous = self.clock.now();
        let mut last_submitted = None;

        while self.handle.is_running() {
            let frame_start = self.clock.now();
            let elapsed = (frame_start - previous).max(0.0);
            previous = frame_start;
            let dt = elapsed.min(max_delta) as f32;

            let pending = lock(&self.pending_resize).take();
            if let Some((width, height)) = pending {
                self.apply_resize(width, height);
            }

            self.update_components(dt);
            self.build_frame(frame_start);

            if !self.options.run_render_thread {
                self.submit_latest(&mut last_submitted)?;
            }

            self.record_stats(elapsed);
            if self.options.limit_frame_rate {
                self.limit_frame_rate(frame_start);
            }
        }
        Ok(())
    }

    fn render_loop(&self) -> Result<()> {
        let mut last_submitted = None;
        while self.handle.is_running() {
            if !self.submit_latest(&mut last_submitted)? {
                thread::sleep(IDLE_SLEEP);
            }
        }
        Ok(())
    }

    // ===== FRAME STEPS =====

    fn apply_resize(&self, width: u32, height: u32) {
        crate::engine_debug!(SOURCE, "Render area {}x{}", width, height);
        for component in lock(&self.components).iter_mut() {
            component.on_render_area_changed(width, height);
        }
        lock(&self.submitter).on_resize(width, height);
    }

    /// All updates, then all late updates.
    fn update_components(&self, dt: f32) {
        let mut components = lock(&self.components);
        for component in components.iter_mut() {
            if component.capabilities().contains(NodeType::UPDATE) {
                component.update(dt);
            }
        }
        for component in components.iter_mut() {
            if component.capabilities().contains(NodeType::UPDATE) {
                component.late_update(dt);
            }
        }
    }

    /// Fill and publish the next render state. Without a free slot the
    /// frame's snapshot is skipped.
    fn build_frame(&self, time: f64) {
        let frame_index = self.frame_index.fetch_add(1, Ordering::AcqRel) + 1;
        let Some(mut slot) = self.buffers.acquire_write_slot() else {
            return;
        };
        slot.frame_index = frame_index;
        slot.time = time;

        for component in lock(&self.components).iter_mut() {
            if component.capabilities().contains(NodeType::RENDER) {
                component.render(&mut slot);
            }
        }
        slot.sort_for_submission();
        slot.publish();
    }

    /// Submit the latest publication if it was not submitted yet.
    /// Returns whether a frame was submitted.
    fn submit_latest(&self, last_submitted: &mut Option<u64>) -> Result<bool> {
        let Some(read) = self.buffers.acquire_read_slot() else {
            return Ok(false);
        };
        if *last_submitted == Some(read.frame_index) {
            return Ok(false);
        }

        let frame_index = read.frame_index;
        let result = lock(&self.submitter).submit(&read);
        read.release();

        match result {
            Ok(()) => {
                *last_submitted = Some(frame_index);
                Ok(true)
            }
            Err(error) => {
                crate::engine_error!(SOURCE, "Frame {} submission failed: {}", frame_index, error);
                self.handle.stop();
                Err(error)
            }
        }
    }

    fn record_stats(&self, elapsed: f64) {
        let mut stats = lock(&self.stats);
        if stats.record(elapsed) && self.options.show_frame_stats {
            crate::engine_info!(
                SOURCE,
                "FPS: {:.1} | Frame: {:.2} ms (min {:.2}, max {:.2}) | Frames: {}",
                stats.fps,
                stats.frame_time_ms,
                stats.min_frame_time_ms,
                stats.max_frame_time_ms,
                stats.frame_count
            );
        }
    }

    fn limit_frame_rate(&self, frame_start: f64) {
        let target = 1.0 / f64::from(self.options.target_frame_rate);
        let remaining = target - (self.clock.now() - frame_start);
        if remaining > 0.0 {
            thread::sleep(Duration::from_secs_f64(remaining));
        }
    }
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("options", &self.options)
            .field("running", &self.handle.is_running())
            .field("frame_index", &self.frame_index())
            .finish()
    }
}

#[cfg(test)]
#[path = "game_engine_tests.rs"]
mod tests;
