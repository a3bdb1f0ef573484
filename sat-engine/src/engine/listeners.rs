use std::fmt::Debug;
use std::marker::PhantomData;

use downcast_rs::impl_downcast;
use downcast_rs::Downcast;
use enum_map::Enum;
use enum_map::EnumMap;
use enumset::EnumSet;
use enumset::EnumSetType;

use super::Explanation;
use super::SolverState;
use super::Trail;
use crate::basic_types::ClauseId;
use crate::basic_types::Literal;
use crate::statistics::StatisticLogger;

/// The state transitions of the [`Engine`](crate::Engine) which a listener can subscribe to.
#[derive(Debug, Enum, EnumSetType, Hash)]
pub enum EngineEvent {
    /// A decision was recorded on the trail.
    Assertion,
    /// A literal was implied by a clause.
    Propagate,
    /// A clause became false on the trail.
    Conflict,
    /// Conflict analysis produced an explanation.
    Explanation,
    /// The trail is about to be undone to a lower level.
    Backjump,
    /// A restart is about to take place.
    Restart,
    /// Forgetting of learned clauses was requested.
    Forget,
    /// The engine reached a terminal state.
    Solution,
    /// The engine started or stopped.
    StartStop,
}

/// A module which observes the [`Engine`](crate::Engine), e.g. a decision heuristic, an activity
/// tracker or a debugger.
///
/// The engine only calls the hooks of the events returned by
/// [`EngineListener::subscribe_to_events`]. Listeners are notified synchronously, in registration
/// order, before the triggering operation continues.
pub trait EngineListener: Downcast + Debug {
    /// The events this listener wants to be notified of. Queried once, on registration.
    fn subscribe_to_events(&self) -> EnumSet<EngineEvent>;

    fn on_assertion(&mut self, _decision: Literal, _level: u32) {}

    fn on_propagate(&mut self, _literal: Literal, _antecedent: ClauseId) {}

    fn on_conflict(&mut self, _clause: ClauseId) {}

    fn on_explanation(&mut self, _explanation: &Explanation) {}

    /// Called before the trail is undone, so `trail` still contains the literals above `level`.
    fn on_backjump(&mut self, _level: u32, _trail: &Trail) {}

    fn on_restart(&mut self) {}

    fn on_forget(&mut self) {}

    /// Called once the engine is in `state`, which is terminal.
    fn on_solution(&mut self, _state: SolverState, _trail: &Trail) {}

    fn on_start_stop(&mut self, _is_running: bool) {}

    /// Logs the statistics of the listener.
    fn log_statistics(&self, _statistic_logger: StatisticLogger) {}
}

impl_downcast!(EngineListener);

/// A typed reference to a listener registered with the [`Engine`](crate::Engine).
#[derive(Debug)]
pub struct ListenerHandle<L> {
    index: usize,
    listener: PhantomData<L>,
}

impl<L> Clone for ListenerHandle<L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for ListenerHandle<L> {}

/// The registered listeners, together with an ordered subscriber list per event.
#[derive(Debug, Default)]
pub(crate) struct ListenerRegistry {
    listeners: Vec<Box<dyn EngineListener>>,
    subscribers: EnumMap<EngineEvent, Vec<usize>>,
}

impl ListenerRegistry {
    pub(crate) fn register<L: EngineListener>(&mut self, listener: L) -> ListenerHandle<L> {
        let index = self.listeners.len();
        for event in listener.subscribe_to_events() {
            self.subscribers[event].push(index);
        }
        self.listeners.push(Box::new(listener));

        ListenerHandle {
            index,
            listener: PhantomData,
        }
    }

    pub(crate) fn get<L: EngineListener>(&self, handle: ListenerHandle<L>) -> Option<&L> {
        self.listeners
            .get(handle.index)
            .and_then(|listener| listener.downcast_ref::<L>())
    }

    pub(crate) fn get_mut<L: EngineListener>(
        &mut self,
        handle: ListenerHandle<L>,
    ) -> Option<&mut L> {
        self.listeners
            .get_mut(handle.index)
            .and_then(|listener| listener.downcast_mut::<L>())
    }

    pub(crate) fn num_subscribers(&self, event: EngineEvent) -> usize {
        self.subscribers[event].len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &dyn EngineListener> {
        self.listeners.iter().map(|listener| listener.as_ref())
    }

    pub(crate) fn notify_assertion(&mut self, decision: Literal, level: u32) {
        for &index in &self.subscribers[EngineEvent::Assertion] {
            self.listeners[index].on_assertion(decision, level);
        }
    }

    pub(crate) fn notify_propagate(&mut self, literal: Literal, antecedent: ClauseId) {
        for &index in &self.subscribers[EngineEvent::Propagate] {
            self.listeners[index].on_propagate(literal, antecedent);
        }
    }

    pub(crate) fn notify_conflict(&mut self, clause: ClauseId) {
        for &index in &self.subscribers[EngineEvent::Conflict] {
            self.listeners[index].on_conflict(clause);
        }
    }

    pub(crate) fn notify_explanation(&mut self, explanation: &Explanation) {
        for &index in &self.subscribers[EngineEvent::Explanation] {
            self.listeners[index].on_explanation(explanation);
        }
    }

    pub(crate) fn notify_backjump(&mut self, level: u32, trail: &Trail) {
        for &index in &self.subscribers[EngineEvent::Backjump] {
            self.listeners[index].on_backjump(level, trail);
        }
    }

    pub(crate) fn notify_restart(&mut self) {
        for &index in &self.subscribers[EngineEvent::Restart] {
            self.listeners[index].on_restart();
        }
    }

    pub(crate) fn notify_forget(&mut self) {
        for &index in &self.subscribers[EngineEvent::Forget] {
            self.listeners[index].on_forget();
        }
    }

    pub(crate) fn notify_solution(&mut self, state: SolverState, trail: &Trail) {
        for &index in &self.subscribers[EngineEvent::Solution] {
            self.listeners[index].on_solution(state, trail);
        }
    }

    pub(crate) fn notify_start_stop(&mut self, is_running: bool) {
        for &index in &self.subscribers[EngineEvent::StartStop] {
            self.listeners[index].on_start_stop(is_running);
        }
    }
}

#[cfg(test)]
mod tests {
    use enumset::enum_set;

    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        name: &'static str,
        log: Vec<String>,
    }

    impl EngineListener for Recorder {
        fn subscribe_to_events(&self) -> EnumSet<EngineEvent> {
            enum_set!(EngineEvent::Assertion | EngineEvent::Restart)
        }

        fn on_assertion(&mut self, decision: Literal, level: u32) {
            self.log.push(format!("{} {decision}@{level}", self.name));
        }

        fn on_restart(&mut self) {
            self.log.push(format!("{} restart", self.name));
        }
    }

    #[test]
    fn only_subscribed_events_are_dispatched() {
        let mut registry = ListenerRegistry::default();
        let handle = registry.register(Recorder {
            name: "a",
            log: vec![],
        });

        registry.notify_assertion(Literal::from_dimacs(-3), 2);
        registry.notify_forget();
        registry.notify_restart();

        let recorder = registry.get(handle).expect("registered listener");
        assert_eq!(vec!["a -3@2", "a restart"], recorder.log);
        assert_eq!(0, registry.num_subscribers(EngineEvent::Forget));
    }

    #[test]
    fn listeners_are_notified_in_registration_order() {
        let mut registry = ListenerRegistry::default();
        let first = registry.register(Recorder {
            name: "first",
            log: vec![],
        });
        let second = registry.register(Recorder {
            name: "second",
            log: vec![],
        });

        registry.notify_restart();

        assert_eq!(
            vec![0, 1],
            registry.subscribers[EngineEvent::Restart].clone()
        );
        assert_eq!(1, registry.get(first).map_or(0, |r| r.log.len()));
        assert_eq!(1, registry.get_mut(second).map_or(0, |r| r.log.len()));
    }
}
