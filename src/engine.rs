//! Program execution engine
//!
//! Turns the unordered block set into a deterministic, steppable,
//! cancellable simulation run. A single tokio stepping task owns each run
//! and is the only writer of robot state; observers read immutable
//! [`Snapshot`] values from a watch channel. Cancellation is carried by a
//! token checked at the per-step suspension boundary.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::program::Program;
use crate::types::{Block, BlockKind, RobotState};

/// Human-readable status messages published with snapshots.
pub mod messages {
    pub const EMPTY_PROGRAM: &str = "Add some logic blocks to create your program!";
    pub const EXECUTING: &str = "Executing program...";
    pub const COMPLETED: &str = "Program executed successfully!";
    pub const STOPPED: &str = "Execution stopped.";
    pub const RESET: &str = "Workspace cleared. Ready to build!";
}

/// Immutable view of engine state, replaced atomically on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub robot: RobotState,
    /// Index of the step about to execute; `None` while idle.
    pub current_step: Option<usize>,
    pub is_running: bool,
    pub message: String,
}

impl Snapshot {
    fn idle() -> Self {
        Self {
            robot: RobotState::initial(),
            current_step: None,
            is_running: false,
            message: String::new(),
        }
    }
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Stopped,
}

/// Result of asking the engine to start a run.
#[derive(Debug)]
pub enum StartOutcome {
    Started(RunHandle),
    /// Nothing to execute; reported via the published message, not an error.
    EmptyProgram,
    /// A run is already in flight; the request is ignored.
    AlreadyRunning,
}

/// Handle to an in-flight run. Await it to observe the terminal outcome.
#[derive(Debug)]
pub struct RunHandle {
    handle: JoinHandle<RunOutcome>,
}

impl RunHandle {
    pub async fn wait(self) -> Result<RunOutcome> {
        self.handle.await.context("stepping task panicked")
    }
}

#[derive(Default)]
struct RunSlot {
    /// Cancellation token of the live run, `None` while idle.
    cancel: Option<CancellationToken>,
    /// Bumped on every start and reset; a stepping task may only publish
    /// while its generation is current.
    generation: u64,
}

struct Shared {
    config: SimulationConfig,
    snapshot_tx: watch::Sender<Snapshot>,
    run: Mutex<RunSlot>,
}

impl Shared {
    /// Mutate and publish the snapshot if `generation` still identifies the
    /// live run. Returns false when the run has been superseded.
    fn publish(&self, generation: u64, mutate: impl FnOnce(&mut Snapshot)) -> bool {
        let run = self.run.lock().expect("run slot lock poisoned");
        if run.generation != generation {
            return false;
        }
        self.snapshot_tx.send_modify(mutate);
        true
    }
}

/// Runs a program against the simulated robot.
///
/// At most one run is in flight at a time; the stepping task is the sole
/// writer of robot state and step index.
#[derive(Clone)]
pub struct ExecutionEngine {
    shared: Arc<Shared>,
}

impl ExecutionEngine {
    pub fn new(config: SimulationConfig) -> Self {
        let (snapshot_tx, _) = watch::channel(Snapshot::idle());
        Self {
            shared: Arc::new(Shared {
                config,
                snapshot_tx,
                run: Mutex::new(RunSlot::default()),
            }),
        }
    }

    /// Subscribe to snapshot updates. Receivers observe the step index for a
    /// block before that block's effect is applied.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.shared.snapshot_tx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.shared
            .run
            .lock()
            .expect("run slot lock poisoned")
            .cancel
            .is_some()
    }

    /// Derive the execution order for a block set: ascending canvas y
    /// position, ties keeping insertion order.
    ///
    /// Program order follows vertical placement only; horizontal position
    /// never affects execution.
    pub fn execution_order(blocks: &[Block]) -> Vec<Block> {
        let mut order = blocks.to_vec();
        order.sort_by(|a, b| a.position.y.total_cmp(&b.position.y));
        order
    }

    /// Start a run over the current block set.
    ///
    /// The order is snapshotted here; mutating the program during the run
    /// does not affect the in-flight sequence. Rejected without a state
    /// transition when the program is empty or a run is already in flight.
    pub fn start(&self, program: &Program) -> StartOutcome {
        let mut run = self.shared.run.lock().expect("run slot lock poisoned");

        if run.cancel.is_some() {
            warn!("start requested while a run is in flight; ignoring");
            return StartOutcome::AlreadyRunning;
        }

        if program.is_empty() {
            self.shared
                .snapshot_tx
                .send_modify(|s| s.message = messages::EMPTY_PROGRAM.to_string());
            return StartOutcome::EmptyProgram;
        }

        let order = Self::execution_order(program.blocks());
        let cancel = CancellationToken::new();
        run.cancel = Some(cancel.clone());
        run.generation += 1;
        let generation = run.generation;
        drop(run);

        self.shared.publish(generation, |s| {
            s.is_running = true;
            s.current_step = Some(0);
            s.message = messages::EXECUTING.to_string();
        });

        info!(steps = order.len(), "starting program run");
        let shared = self.shared.clone();
        let handle = tokio::spawn(run_loop(shared, order, cancel, generation));

        StartOutcome::Started(RunHandle { handle })
    }

    /// Request cancellation of the in-flight run. Observed at the next step
    /// boundary; no-op while idle.
    pub fn stop(&self) {
        let run = self.shared.run.lock().expect("run slot lock poisoned");
        if let Some(cancel) = &run.cancel {
            info!("stop requested");
            cancel.cancel();
        }
    }

    /// Stop any in-flight run, clear the program, and restore the initial
    /// robot state. Valid at any time.
    pub fn reset(&self, program: &mut Program) {
        let mut run = self.shared.run.lock().expect("run slot lock poisoned");
        if let Some(cancel) = run.cancel.take() {
            cancel.cancel();
        }
        // Supersede the old run so its remaining publishes are discarded.
        run.generation += 1;
        self.shared.snapshot_tx.send_modify(|s| {
            *s = Snapshot {
                robot: RobotState::initial(),
                current_step: None,
                is_running: false,
                message: messages::RESET.to_string(),
            };
        });
        drop(run);

        program.clear();
        info!("workspace reset");
    }
}

/// The stepping task: one iteration per block in snapshot order.
async fn run_loop(
    shared: Arc<Shared>,
    order: Vec<Block>,
    cancel: CancellationToken,
    generation: u64,
) -> RunOutcome {
    let delay = Duration::from_millis(shared.config.step_delay_ms);
    let grid_size = shared.config.grid_size;

    for (index, block) in order.iter().enumerate() {
        // Publish the index first so a renderer can highlight the block
        // about to execute.
        if !shared.publish(generation, |s| s.current_step = Some(index)) {
            return RunOutcome::Stopped;
        }

        // Visual execution time; the sole cooperative yield point.
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(delay) => {}
        }

        // Cancellation is observed at the step boundary: the in-flight
        // step's effect is never applied.
        if cancel.is_cancelled() {
            return finish(&shared, generation, RunOutcome::Stopped);
        }

        debug!(step = index, kind = ?block.kind, "applying instruction");
        if !shared.publish(generation, |s| apply_effect(block.kind, &mut s.robot, grid_size)) {
            return RunOutcome::Stopped;
        }
    }

    finish(&shared, generation, RunOutcome::Completed)
}

fn finish(shared: &Shared, generation: u64, outcome: RunOutcome) -> RunOutcome {
    let mut run = shared.run.lock().expect("run slot lock poisoned");
    if run.generation == generation {
        run.cancel = None;
        shared.snapshot_tx.send_modify(|s| {
            s.is_running = false;
            s.current_step = None;
            s.message = match outcome {
                RunOutcome::Completed => messages::COMPLETED,
                RunOutcome::Stopped => messages::STOPPED,
            }
            .to_string();
        });
    }
    info!(?outcome, "run finished");
    outcome
}

/// Apply one instruction's effect to the robot.
///
/// If and loop blocks occupy a step without branching: the flat block model
/// has no child scope to branch into. Unknown kinds are no-ops so the run
/// keeps making progress.
fn apply_effect(kind: BlockKind, robot: &mut RobotState, grid_size: i32) {
    match kind {
        BlockKind::Move => {
            let (dx, dy) = robot.direction.delta();
            // Clamping, not an obstacle stop: hitting the boundary silently
            // halts further movement in that direction.
            robot.x = (robot.x + dx).clamp(0, grid_size - 1);
            robot.y = (robot.y + dy).clamp(0, grid_size - 1);
        }
        BlockKind::Turn => robot.direction = robot.direction.turned_right(),
        BlockKind::Wait | BlockKind::If | BlockKind::Loop | BlockKind::Unknown => {}
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
