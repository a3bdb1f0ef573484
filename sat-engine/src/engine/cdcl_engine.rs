use std::collections::VecDeque;
use std::time::Instant;

use log::debug;

use super::engine_state::EngineState;
use super::listeners::ListenerRegistry;
use super::ConflictAnalyzer;
use super::EngineConfig;
use super::EngineListener;
use super::EngineStatistics;
use super::Explanation;
use super::ListenerHandle;
use super::PropagationContext;
use super::SolverState;
use super::Trail;
use crate::basic_types::BufferPool;
use crate::basic_types::ClauseId;
use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::clause_stores::ClauseStore;
use crate::clause_stores::CompositeClauseStore;
use crate::error::EngineError;
use crate::sat_assert_moderate;
use crate::sat_assert_simple;
use crate::statistics::log_statistic;
use crate::statistics::log_statistic_postfix;
use crate::statistics::should_log_statistics;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::termination::CancellationToken;

/// The number of propagated literals between two checks of the deadline.
const HALT_CHECK_INTERVAL: usize = 64;

/// The conflict-driven clause-learning kernel.
///
/// The engine owns the [`Trail`], a [`ClauseStore`] and a [`ConflictAnalyzer`], and moves
/// between the [`SolverState`]s in response to the operations of a decision procedure:
/// - [`Engine::assert_decision`] records a decision and propagates it; a falsified clause puts
///   the engine in [`SolverState::Conflict`] and produces an [`Explanation`];
/// - [`Engine::backjump_to_level`], [`Engine::trigger_idle_event`] and [`Engine::learn`] resolve
///   a conflict;
/// - [`Engine::restart`] and [`Engine::forget`] reset the search;
/// - [`Engine::trigger_sat_event`] and [`Engine::trigger_unsat_event`] end it.
///
/// Every transition is announced to the registered [`EngineListener`]s.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    state: EngineState,
    trail: Trail,
    clause_store: Box<dyn ClauseStore>,
    analyzer: ConflictAnalyzer,
    /// Literals which are true on the trail but not yet propagated by the clause store.
    pending: VecDeque<Literal>,
    listeners: ListenerRegistry,
    /// The explanation of the most recent conflict, until it is learned.
    explanation: Option<Explanation>,
    forget_requested: bool,
    is_running: bool,
    started_at: Option<Instant>,
    deadline: Option<Instant>,
    max_variable: u32,
    cancellation: CancellationToken,
    buffer_pool: BufferPool,
    statistics: EngineStatistics,
    /// Unit clauses added above the root level. They are implied again after every backjump
    /// which unassigns them, until they hold at the root.
    root_units: Vec<(Literal, ClauseId)>,
}

impl Engine {
    /// Create an engine with a [`CompositeClauseStore`] wired from `config`.
    pub fn new(config: EngineConfig) -> Engine {
        let clause_store = Box::new(CompositeClauseStore::new(&config));
        Engine::with_clause_store(config, clause_store)
    }

    pub fn with_clause_store(config: EngineConfig, clause_store: Box<dyn ClauseStore>) -> Engine {
        let buffer_pool = BufferPool::new(config.buffer_capacity, config.buffer_pool_capacity);
        Engine {
            config,
            state: EngineState::default(),
            trail: Trail::default(),
            clause_store,
            analyzer: ConflictAnalyzer::default(),
            pending: VecDeque::new(),
            listeners: ListenerRegistry::default(),
            explanation: None,
            forget_requested: false,
            is_running: false,
            started_at: None,
            deadline: None,
            max_variable: 0,
            cancellation: CancellationToken::new(),
            buffer_pool,
            statistics: EngineStatistics::default(),
            root_units: vec![],
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn current_state(&self) -> SolverState {
        self.state.get()
    }

    pub fn current_level(&self) -> u32 {
        self.trail.current_level()
    }

    pub fn max_variable(&self) -> u32 {
        self.max_variable
    }

    pub fn clause_store(&self) -> &dyn ClauseStore {
        self.clause_store.as_ref()
    }

    pub fn statistics(&self) -> &EngineStatistics {
        &self.statistics
    }

    /// The explanation of the most recent conflict, if it has not been learned yet.
    pub fn explanation(&self) -> Option<&Explanation> {
        self.explanation.as_ref()
    }

    /// A token which stops the engine at its next cancellation point when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Whether every variable is assigned.
    pub fn is_complete(&self) -> bool {
        self.trail.size() == self.max_variable as usize
    }

    /// Whether the engine was cancelled or ran out of time.
    pub fn should_stop(&self) -> bool {
        self.cancellation.is_cancelled()
            || self
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Register `listener` for the events it subscribes to. Listeners are notified in the order
    /// of registration.
    pub fn add_listener<L: EngineListener>(&mut self, listener: L) -> ListenerHandle<L> {
        self.listeners.register(listener)
    }

    pub fn listener<L: EngineListener>(&self, handle: ListenerHandle<L>) -> Option<&L> {
        self.listeners.get(handle)
    }

    pub fn listener_mut<L: EngineListener>(&mut self, handle: ListenerHandle<L>) -> Option<&mut L> {
        self.listeners.get_mut(handle)
    }

    /// The listener together with the trail, e.g. for a heuristic which picks an unassigned
    /// variable.
    pub fn listener_with_trail<L: EngineListener>(
        &mut self,
        handle: ListenerHandle<L>,
    ) -> Option<(&mut L, &Trail)> {
        let listener = self.listeners.get_mut(handle)?;
        Some((listener, &self.trail))
    }

    /// Make the variables `1..=max_variable` available. The maximum never decreases.
    pub fn set_max_variable(&mut self, max_variable: u32) {
        if max_variable <= self.max_variable {
            return;
        }

        self.trail.ensure_capacity(max_variable as usize);
        self.trail.add_variable(Variable::new(max_variable));
        self.clause_store.grow(max_variable);
        self.max_variable = max_variable;
    }

    /// Allocate a variable above the current maximum.
    pub fn get_fresh_variable(&mut self) -> Variable {
        self.set_max_variable(self.max_variable + 1);
        Variable::new(self.max_variable)
    }

    /// Allocate `num_variables` consecutive variables above the current maximum.
    pub fn get_many_fresh_variables(&mut self, num_variables: u32) -> Vec<Variable> {
        let first = self.max_variable + 1;
        self.set_max_variable(self.max_variable + num_variables);
        (first..=self.max_variable).map(Variable::new).collect()
    }

    /// Add a clause of the formula, given as DIMACS literals.
    ///
    /// Duplicate literals are removed. Tautologies, and clauses satisfied at the root level, are
    /// not stored and `None` is returned. An empty clause, or a clause whose literals are all
    /// false at the root level, makes the formula unsatisfiable.
    ///
    /// The clause is checked against the current assignment; an implied literal is queued and
    /// propagated by the next call to [`Engine::unit_propagate`].
    pub fn add_model_clause(&mut self, clause: &[i32]) -> Result<Option<ClauseId>, EngineError> {
        if self.state.is_infeasible() {
            return Err(EngineError::InconsistentSolver);
        }
        sat_assert_simple!(
            !self.state.is_conflicting(),
            "clauses cannot be added while a conflict is unresolved"
        );

        let mut literals = self.buffer_pool.acquire();
        for &code in clause {
            let literal = match Literal::try_from_dimacs(code) {
                Some(literal) if literal.variable().id() <= self.max_variable => literal,
                Some(_) => {
                    return Err(EngineError::UnknownVariable {
                        literal: code,
                        max_variable: self.max_variable,
                    })
                }
                None => return Err(EngineError::InvalidLiteral(code)),
            };
            literals.push(literal);
        }

        literals.sort_unstable_by_key(|literal| (literal.variable(), literal.is_negative()));
        literals.dedup();
        let is_tautology = literals
            .windows(2)
            .any(|pair| pair[0].variable() == pair[1].variable());
        let is_satisfied_at_root = self.trail.current_level() == 0
            && literals
                .iter()
                .any(|&literal| self.trail.is_literal_true(literal));
        if is_tautology || is_satisfied_at_root {
            self.buffer_pool.release(literals);
            return Ok(None);
        }
        if self.trail.current_level() == 0 {
            literals.retain(|&literal| !self.trail.is_literal_false(literal));
        }

        if literals.is_empty() {
            debug!("The empty clause was added");
            self.buffer_pool.release(literals);
            self.trigger_unsat_event();
            return Ok(None);
        }

        let mut context = PropagationContext::new(
            &mut self.trail,
            &mut self.pending,
            &mut self.listeners,
            &mut self.statistics,
        );
        let clause_id = self.clause_store.add_clause(&literals, true, &mut context);
        let conflict = context.into_conflict();

        if literals.len() == 1 && self.trail.current_level() > 0 {
            self.root_units.push((literals[0], clause_id));
        }
        self.buffer_pool.release(literals);

        if let Some(conflict) = conflict {
            self.trigger_conflict_event(conflict);
        }

        Ok(Some(clause_id))
    }

    /// Record `decision` as the decision opening `new_level`, then propagate.
    ///
    /// Does nothing if the engine was cancelled or ran out of time; the engine is stopped
    /// instead.
    pub fn assert_decision(&mut self, decision: Literal, new_level: u32) {
        sat_assert_simple!(
            self.state.is_ready(),
            "decisions are only made in the idle state, not in {}",
            self.state.get()
        );
        sat_assert_simple!(
            new_level > self.trail.current_level(),
            "decision level {new_level} does not exceed the current level {}",
            self.trail.current_level()
        );

        if self.should_stop() {
            self.stop();
            return;
        }

        self.trail.assert_decision(decision, new_level);
        self.statistics.num_decisions += 1;
        self.listeners.notify_assertion(decision, new_level);
        self.pending.push_back(decision);

        self.unit_propagate();
    }

    /// Hand every pending literal to the clause store, until no literal is pending or a conflict
    /// occurs.
    pub fn unit_propagate(&mut self) {
        if !self.state.is_ready() {
            return;
        }

        let mut num_propagated = 0;
        while self.state.is_ready() {
            if num_propagated % HALT_CHECK_INTERVAL == 0 && self.should_stop() {
                self.stop();
                break;
            }

            let Some(literal) = self.pending.pop_front() else {
                break;
            };
            num_propagated += 1;

            let mut context = PropagationContext::new(
                &mut self.trail,
                &mut self.pending,
                &mut self.listeners,
                &mut self.statistics,
            );
            self.clause_store.assert_literal(literal, &mut context);
            if let Some(conflict) = context.into_conflict() {
                self.trigger_conflict_event(conflict);
            }
        }
    }

    /// Move to [`SolverState::Conflict`] because `clause` is false on the trail.
    ///
    /// Above the root level the conflict is analysed and the [`Explanation`] is announced; at the
    /// root level the formula is unsatisfiable.
    pub fn trigger_conflict_event(&mut self, clause: ClauseId) {
        self.state.declare_conflict();
        self.statistics.num_conflicts += 1;
        self.listeners.notify_conflict(clause);
        self.pending.clear();

        if self.trail.current_level() == 0 {
            self.trigger_unsat_event();
            return;
        }

        let analysis = self.analyzer.analyze(
            clause,
            &self.trail,
            self.clause_store.as_mut(),
            &mut self.buffer_pool,
        );
        match analysis {
            Some(explanation) => {
                self.listeners.notify_explanation(&explanation);
                self.clause_store.decay_activities();
                if let Some(previous) = self.explanation.replace(explanation) {
                    self.buffer_pool.release(previous.into_literals());
                }
            }
            None => self.trigger_unsat_event(),
        }
    }

    /// Undo every assignment above `level`.
    ///
    /// Unit clauses added above the root level are implied again at `level` if the backjump
    /// unassigned them. An explanation which asks for a higher level than `level` is dropped.
    pub fn backjump_to_level(&mut self, level: u32) {
        let current_level = self.trail.current_level();
        sat_assert_simple!(
            !self.state.get().is_terminal(),
            "cannot backjump in the terminal state {}",
            self.state.get()
        );

        self.listeners.notify_backjump(level, &self.trail);
        self.trail.backjump(level);
        self.clause_store.backjump(level, &self.trail);
        self.pending.clear();
        self.imply_root_units();

        if self
            .explanation
            .as_ref()
            .is_some_and(|explanation| explanation.backjump_level() > level)
        {
            if let Some(stale) = self.explanation.take() {
                self.buffer_pool.release(stale.into_literals());
            }
        }

        self.statistics
            .average_backjump_distance
            .add_term(u64::from(current_level - level));
    }

    /// Imply the unit clauses added above the root which are unassigned. They are forgotten once
    /// they hold at the root level.
    fn imply_root_units(&mut self) {
        let mut context = PropagationContext::new(
            &mut self.trail,
            &mut self.pending,
            &mut self.listeners,
            &mut self.statistics,
        );
        for &(literal, clause) in &self.root_units {
            if context.literal_value(literal).is_none() {
                context.imply(literal, clause);
            }
        }

        if self.trail.current_level() == 0 {
            self.root_units.clear();
        }
    }

    /// Return to [`SolverState::Unknown`], dropping pending literals which are no longer true.
    ///
    /// Has no effect once the formula is decided.
    pub fn trigger_idle_event(&mut self) {
        if self.state.get().is_terminal() {
            return;
        }
        self.state.declare_ready();
        self.pending
            .retain(|&literal| self.trail.is_literal_true(literal));
    }

    /// The level the most recent explanation asks to backjump to, or 0 without an explanation.
    pub fn get_level_to_backjump(&self) -> u32 {
        self.explanation
            .as_ref()
            .map_or(0, |explanation| explanation.backjump_level())
    }

    /// Add a learned clause and propagate.
    ///
    /// The first literal must be unassigned and all others false, which is the shape of an
    /// [`Explanation`] after backjumping to its level. The first literal may also be false when
    /// a unit clause added above the root was implied again by the backjump; the clause is then
    /// in conflict. Learning the empty clause does nothing.
    pub fn learn(&mut self, literals: &[Literal]) {
        sat_assert_simple!(
            self.state.is_ready(),
            "clauses are learned in the idle state, not in {}",
            self.state.get()
        );
        if literals.is_empty() {
            return;
        }
        sat_assert_moderate!(
            !self.trail.is_literal_true(literals[0])
                && literals[1..]
                    .iter()
                    .all(|&literal| self.trail.is_literal_false(literal)),
            "a learned clause must be asserting at the current level"
        );

        let mut context = PropagationContext::new(
            &mut self.trail,
            &mut self.pending,
            &mut self.listeners,
            &mut self.statistics,
        );
        let _ = self.clause_store.add_clause(literals, false, &mut context);
        let conflict = context.into_conflict();

        self.statistics.num_learned_clauses += 1;
        self.statistics
            .average_learned_clause_length
            .add_term(literals.len() as u64);

        match conflict {
            Some(conflict) => self.trigger_conflict_event(conflict),
            None => self.unit_propagate(),
        }
    }

    /// Learn the explanation of the most recent conflict, if there is one.
    pub fn learn_explanation(&mut self) {
        if let Some(explanation) = self.explanation.take() {
            debug!("Learning {explanation}");
            self.learn(explanation.literals());
            self.buffer_pool.release(explanation.into_literals());
        }
    }

    /// Backjump to the root level, forget learned clauses if requested, and return to the idle
    /// state. A restart from [`SolverState::Conflict`] drops the explanation of the conflict.
    ///
    /// Has no effect once the formula is decided.
    pub fn restart(&mut self) {
        if self.state.get().is_terminal() {
            debug!("Ignoring a restart in the terminal state {}", self.state.get());
            return;
        }

        self.listeners.notify_restart();
        self.statistics.num_restarts += 1;

        if self.trail.current_level() > 0 {
            self.backjump_to_level(0);
        }

        if self.forget_requested {
            self.forget_requested = false;
            let num_forgotten = self
                .clause_store
                .forget(self.config.forget_fraction, &self.trail);
            self.statistics.num_forgotten_clauses += num_forgotten as u64;
            debug!(
                "Forgot {num_forgotten} learned clauses, {} clauses remain",
                self.clause_store.num_clauses()
            );
        }

        self.trigger_idle_event();
    }

    /// Request the removal of learned clauses at the next restart.
    pub fn forget(&mut self) {
        self.forget_requested = true;
        self.listeners.notify_forget();
    }

    pub fn trigger_sat_event(&mut self) {
        sat_assert_moderate!(self.is_complete(), "a model assigns every variable");

        self.state.declare_solution_found();
        self.listeners
            .notify_solution(SolverState::Satisfiable, &self.trail);
        self.stop();
    }

    pub fn trigger_unsat_event(&mut self) {
        self.state.declare_infeasible();
        self.listeners
            .notify_solution(SolverState::Unsatisfiable, &self.trail);
        self.stop();
    }

    /// Start the clock; the configured timeout runs from here.
    pub fn start(&mut self) {
        if self.is_running {
            return;
        }

        let now = Instant::now();
        self.is_running = true;
        self.started_at = Some(now);
        self.deadline = self.config.timeout.map(|timeout| now + timeout);
        self.listeners.notify_start_stop(true);
    }

    /// Stop the clock. Stopping a stopped engine has no effect.
    pub fn stop(&mut self) {
        if !self.is_running {
            return;
        }

        self.is_running = false;
        self.deadline = None;
        if let Some(started_at) = self.started_at.take() {
            self.statistics.time_spent_in_engine += started_at.elapsed().as_millis() as u64;
        }
        self.listeners.notify_start_stop(false);
    }

    /// 10 if the formula is satisfiable, 20 if it is unsatisfiable, 0 otherwise.
    pub fn get_return_code(&self) -> i32 {
        match self.state.get() {
            SolverState::Satisfiable => 10,
            SolverState::Unsatisfiable => 20,
            SolverState::Unknown | SolverState::Conflict => 0,
        }
    }

    /// Write the statistics of the engine, its clause store and its listeners.
    pub fn log_statistics(&self) {
        if !should_log_statistics() {
            return;
        }

        self.statistics.log(StatisticLogger::default());
        log_statistic(
            "averageNumResolutions",
            self.analyzer.average_num_resolutions(),
        );
        self.clause_store
            .log_statistics(StatisticLogger::new(["clause_store"]));
        for listener in self.listeners.iter() {
            listener.log_statistics(StatisticLogger::default());
        }
        log_statistic_postfix();
    }
}
