//! Time-travel navigation over a recorded delta log
//!
//! This is the heart of the debugger. The forward executor runs the program
//! exactly once and records every cell mutation as an [`Update`]; the
//! [`Timeline`] then moves a cursor across the recorded step sequence,
//! reconstructing the machine state at any position purely by applying or
//! undoing deltas: O(1) per step moved, never a rebuild from scratch and
//! never a re-execution of instruction semantics.
//!
//! # Core Invariant
//!
//! After every navigation call, the exposed [`State`] at cursor position `p`
//! is exactly the state obtained by applying the updates of steps `[0, p)`
//! in order to the initial state. Moving forward applies each step's
//! `new_value`s; moving backward applies the `old_value`s, in the *same
//! forward order* they were recorded. That undo order is only correct
//! because the executor guarantees the writes within one step target
//! distinct cells, a documented precondition of the log that the timeline
//! does not re-validate.
//!
//! # Observers
//!
//! Registered [`UpdateListener`]s are invoked synchronously, in registration
//! order, once per applied cell write, and once more per navigation call
//! with a [`TimelineEvent::CursorMoved`] event that carries no state change.
//! A listener must not navigate the timeline from inside its callback.

use crate::machine::instruction::Command;
use crate::machine::state::{State, IAR};
use crate::machine::START_LABEL;
use rustc_hash::FxHashMap;

/// One recorded memory-cell change: applying `new_value` and then
/// `old_value` at `address` restores the prior value exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Update {
    /// The cell that changed (negative for register cells).
    pub address: i32,
    /// The value before the step executed.
    pub old_value: i32,
    /// The value after the step executed.
    pub new_value: i32,
}

/// What a listener is being told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineEvent {
    /// A cell now holds `value` (emitted once per applied update).
    CellChanged { address: i32, value: i32 },
    /// Navigation finished at `position`; no cell changed for this event.
    CursorMoved { position: usize },
}

/// Observer of timeline navigation.
///
/// Callbacks run synchronously on the navigating thread, inside the
/// navigation call.
pub trait UpdateListener {
    fn timeline_changed(&mut self, event: &TimelineEvent);
}

/// The recorded execution history and a cursor into it.
///
/// Owns the delta log, the program's static representation (commands,
/// labels, source text), the reconstructed [`State`], and the listener set.
/// The log, commands and labels are immutable after construction; only the
/// state and the cursor ever change.
pub struct Timeline {
    updates: Vec<Vec<Update>>,
    source: String,
    label_map: FxHashMap<String, i32>,
    commands: Vec<Command>,
    state: State,
    position: usize,
    listeners: Vec<Box<dyn UpdateListener>>,
}

impl Timeline {
    /// Build a timeline at position 0.
    ///
    /// The state starts from the command encodings plus `initial_values`,
    /// with the IAR seeded from the `START` label (address 0 if absent).
    pub fn new(
        updates: Vec<Vec<Update>>,
        source: String,
        label_map: FxHashMap<String, i32>,
        commands: Vec<Command>,
        initial_values: &FxHashMap<i32, i32>,
    ) -> Self {
        let mut state = State::new(&commands, initial_values);
        let start = label_map.get(START_LABEL).copied().unwrap_or(0);
        state.set(IAR, start);
        Timeline {
            updates,
            source,
            label_map,
            commands,
            state,
            position: 0,
            listeners: Vec::new(),
        }
    }

    /// Register an observer. Listeners are notified in registration order.
    pub fn add_listener(&mut self, listener: Box<dyn UpdateListener>) {
        self.listeners.push(listener);
    }

    /// Move the cursor to `target`, clamped into `[0, count_steps()]`.
    ///
    /// Realized as single-step advances or retreats from the current
    /// position, so the cost is proportional to the distance moved. Always
    /// finishes with one [`TimelineEvent::CursorMoved`] notification, even
    /// when the cursor did not move.
    pub fn set_position(&mut self, target: i64) {
        let target = target.clamp(0, self.updates.len() as i64) as usize;

        while self.position < target {
            self.advance();
        }
        while self.position > target {
            self.retreat();
        }

        self.emit(TimelineEvent::CursorMoved {
            position: self.position,
        });
    }

    /// Move the cursor by `offset` steps (negative moves backward).
    pub fn add_to_position(&mut self, offset: i64) {
        self.set_position(self.position as i64 + offset);
    }

    /// The current cursor position, in `[0, count_steps()]`.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total number of recorded steps.
    pub fn count_steps(&self) -> usize {
        self.updates.len()
    }

    /// Current value of the cell at `address` (0 if never written).
    pub fn get(&self, address: i32) -> i32 {
        self.state.get(address)
    }

    /// The command the IAR currently points at.
    ///
    /// `None` is an expected case, not an error: the IAR legitimately points
    /// outside the code at the final halted state.
    pub fn find_current_command(&self) -> Option<&Command> {
        let iar = self.state.get(IAR);
        self.commands.iter().find(|command| command.address == iar)
    }

    /// Reverse label lookup: the symbolic name mapped to `address`.
    ///
    /// When several labels alias one address, the lexicographically smallest
    /// name wins, so the result is deterministic regardless of map iteration
    /// order.
    pub fn name_for(&self, address: i32) -> Option<&str> {
        self.label_map
            .iter()
            .filter(|&(_, &a)| a == address)
            .map(|(name, _)| name.as_str())
            .min()
    }

    /// The program's commands, in assembly order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// The original source text, verbatim.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The name → address label map.
    pub fn label_map(&self) -> &FxHashMap<String, i32> {
        &self.label_map
    }

    /// Every non-negative address the program defines or ever touches.
    ///
    /// Stable across navigation: the union of the cells defined at
    /// construction and the cells written by any recorded step. Sorted.
    pub fn memory_addresses(&self) -> Vec<i32> {
        let mut addresses: Vec<i32> = self
            .state
            .addresses()
            .chain(
                self.updates
                    .iter()
                    .flatten()
                    .map(|update| update.address),
            )
            .filter(|&address| address >= 0)
            .collect();
        addresses.sort_unstable();
        addresses.dedup();
        addresses
    }

    /// Apply the step at the cursor, then move the cursor past it.
    fn advance(&mut self) {
        for i in 0..self.updates[self.position].len() {
            let update = self.updates[self.position][i];
            self.apply(update.address, update.new_value);
        }
        self.position += 1;
    }

    /// Move the cursor back over the previous step, then undo it.
    ///
    /// Old values are applied in the recorded forward order; the executor
    /// guarantees the writes within a step target distinct cells.
    fn retreat(&mut self) {
        self.position -= 1;
        for i in 0..self.updates[self.position].len() {
            let update = self.updates[self.position][i];
            self.apply(update.address, update.old_value);
        }
    }

    /// Write one cell and notify listeners of the change.
    fn apply(&mut self, address: i32, value: i32) {
        self.state.set(address, value);
        self.emit(TimelineEvent::CellChanged { address, value });
    }

    fn emit(&mut self, event: TimelineEvent) {
        for listener in &mut self.listeners {
            listener.timeline_changed(&event);
        }
    }
}
