//! Timer state inferred from the sequence of reported timer values
//! States: Reset, Running, Stopped

use crate::types::TimerStatus;
use log::{debug, info};
use statig::prelude::*;

/// Input events to the timer state machine
#[derive(Debug, Clone, Copy)]
pub enum TimerInput {
    Millis(u32),
}

#[derive(Debug, Default)]
pub struct TimerContext {
    pub previous_millis: Option<u32>,
}

/// Next status for a new timer value `millis`, given the previous value.
///
/// A value that goes backwards without reaching zero keeps the current status.
pub fn next_status(previous: Option<u32>, millis: u32, current: TimerStatus) -> TimerStatus {
    if millis == 0 {
        return TimerStatus::Reset;
    }
    match previous {
        None => TimerStatus::Running,
        Some(prev) if millis > prev => TimerStatus::Running,
        Some(prev) if millis == prev => TimerStatus::Stopped,
        Some(prev) => {
            debug!("Timer went backwards {}ms -> {}ms, holding {:?}", prev, millis, current);
            current
        }
    }
}

#[derive(Debug, Default)]
pub struct TimerStateMachine;

#[state_machine(
    initial = "State::reset()",
    state(derive(Debug)),
    on_transition = "Self::on_transition"
)]
impl TimerStateMachine {
    #[state]
    fn reset(context: &mut TimerContext, event: &TimerInput) -> Response<State> {
        Self::advance(context, event, TimerStatus::Reset)
    }

    #[state]
    fn running(context: &mut TimerContext, event: &TimerInput) -> Response<State> {
        Self::advance(context, event, TimerStatus::Running)
    }

    #[state]
    fn stopped(context: &mut TimerContext, event: &TimerInput) -> Response<State> {
        Self::advance(context, event, TimerStatus::Stopped)
    }

    fn on_transition(&mut self, source: &State, target: &State) {
        debug!(
            "Timer transition: {:?} -> {:?}",
            Self::state_to_status(source),
            Self::state_to_status(target)
        );
    }
}

impl TimerStateMachine {
    fn advance(context: &mut TimerContext, event: &TimerInput, current: TimerStatus) -> Response<State> {
        let TimerInput::Millis(millis) = *event;
        let next = next_status(context.previous_millis, millis, current);
        context.previous_millis = Some(millis);

        if next == current {
            Response::Handled
        } else {
            Response::Transition(Self::status_to_state(next))
        }
    }

    fn status_to_state(status: TimerStatus) -> State {
        match status {
            TimerStatus::Reset => State::reset(),
            TimerStatus::Running => State::running(),
            TimerStatus::Stopped => State::stopped(),
        }
    }

    fn state_to_status(state: &State) -> TimerStatus {
        match state {
            State::Reset {} => TimerStatus::Reset,
            State::Running {} => TimerStatus::Running,
            State::Stopped {} => TimerStatus::Stopped,
        }
    }
}

/// Owns the state machine and its context for one connection.
pub struct TimerTracker {
    machine: StateMachine<TimerStateMachine>,
    context: TimerContext,
}

impl Default for TimerTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerTracker {
    pub fn new() -> Self {
        Self {
            machine: TimerStateMachine::default().state_machine(),
            context: TimerContext::default(),
        }
    }

    /// Feed one timer value; returns `(from, to)` when the status changed.
    pub fn update(&mut self, millis: u32) -> Option<(TimerStatus, TimerStatus)> {
        let previous = self.status();
        self.machine
            .handle_with_context(&TimerInput::Millis(millis), &mut self.context);
        let current = self.status();

        if previous != current {
            info!("Timer state changed: {:?} -> {:?} at {}ms", previous, current, millis);
            Some((previous, current))
        } else {
            None
        }
    }

    pub fn status(&self) -> TimerStatus {
        TimerStateMachine::state_to_status(self.machine.state())
    }

    pub fn previous_millis(&self) -> Option<u32> {
        self.context.previous_millis
    }
}
