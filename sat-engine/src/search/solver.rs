use log::debug;
use log::info;

use super::RestartPolicy;
use crate::branching::Brancher;
use crate::engine::EngineConfig;
use crate::engine::ListenerHandle;
use crate::termination::TerminationCondition;
use crate::Engine;
use crate::SolverState;

/// The number of conflicts between two progress reports at a non-zero verbosity.
const PROGRESS_INTERVAL: u64 = 1000;

/// The result of [`Solver::solve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveOutcome {
    /// The trail of the engine is a model of the formula.
    Satisfiable,
    /// The formula has no model.
    Unsatisfiable,
    /// The search was stopped before it reached a conclusion.
    Unknown,
}

/// Runs the CDCL loop: decide, propagate, analyse conflicts, backjump, learn, and restart.
#[derive(Debug)]
pub struct Solver {
    restart_policy: RestartPolicy,
    verbosity: u8,
    num_conflicts: u64,
}

impl Solver {
    pub fn new(config: &EngineConfig) -> Solver {
        Solver {
            restart_policy: RestartPolicy::new(config),
            verbosity: config.verbosity,
            num_conflicts: 0,
        }
    }

    /// Search for a model of the clauses in `engine`, asking `brancher` for decisions, until
    /// the formula is decided or `termination` (or the engine's own cancellation) stops the
    /// search.
    ///
    /// The brancher must have been registered with `engine`.
    pub fn solve<B: Brancher>(
        &mut self,
        engine: &mut Engine,
        brancher: ListenerHandle<B>,
        termination: &mut impl TerminationCondition,
    ) -> SolveOutcome {
        engine.start();
        engine.unit_propagate();

        loop {
            match engine.current_state() {
                SolverState::Satisfiable | SolverState::Unsatisfiable => break,
                SolverState::Conflict => {
                    self.resolve_conflict(engine);
                    continue;
                }
                SolverState::Unknown => {}
            }

            if !engine.is_running() || termination.should_stop() || engine.should_stop() {
                debug!("The search was stopped at level {}", engine.current_level());
                break;
            }

            if self.restart_policy.should_restart() {
                if self.restart_policy.notify_restart() {
                    engine.forget();
                }
                engine.restart();
                engine.unit_propagate();
                continue;
            }

            let (brancher, trail) = engine
                .listener_with_trail(brancher)
                .expect("the brancher is registered with the engine");
            match brancher.next_decision(trail) {
                Some(decision) => {
                    termination.decision_has_been_made();
                    let level = engine.current_level() + 1;
                    engine.assert_decision(decision, level);
                }
                None => engine.trigger_sat_event(),
            }
        }

        engine.stop();

        match engine.current_state() {
            SolverState::Satisfiable => SolveOutcome::Satisfiable,
            SolverState::Unsatisfiable => SolveOutcome::Unsatisfiable,
            SolverState::Unknown | SolverState::Conflict => SolveOutcome::Unknown,
        }
    }

    fn resolve_conflict(&mut self, engine: &mut Engine) {
        self.num_conflicts += 1;
        self.restart_policy.notify_conflict();

        let level = engine.get_level_to_backjump();
        engine.backjump_to_level(level);
        engine.trigger_idle_event();
        engine.learn_explanation();

        if self.verbosity > 0 && self.num_conflicts % PROGRESS_INTERVAL == 0 {
            let statistics = engine.statistics();
            info!(
                "conflicts: {}, decisions: {}, restarts: {}, learned: {}, clauses: {}",
                self.num_conflicts,
                statistics.num_decisions,
                statistics.num_restarts,
                statistics.num_learned_clauses - statistics.num_forgotten_clauses,
                engine.clause_store().num_clauses()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Literal;
    use crate::branching::VsidsBrancher;
    use crate::termination::DecisionBudget;
    use crate::termination::Indefinite;

    fn solve(num_variables: u32, clauses: &[Vec<i32>], config: EngineConfig) -> (Engine, SolveOutcome) {
        let mut engine = Engine::new(config);
        engine.set_max_variable(num_variables);
        for clause in clauses {
            let _ = engine.add_model_clause(clause).expect("valid clause");
        }
        let brancher = engine.add_listener(VsidsBrancher::new(engine.config()));
        let mut solver = Solver::new(engine.config());
        let outcome = solver.solve(&mut engine, brancher, &mut Indefinite);
        (engine, outcome)
    }

    /// `holes + 1` pigeons in `holes` holes; variable `p * holes + h + 1` puts pigeon `p` in hole
    /// `h`.
    fn pigeonhole(holes: i32) -> (u32, Vec<Vec<i32>>) {
        let var = |pigeon: i32, hole: i32| pigeon * holes + hole + 1;
        let mut clauses = vec![];
        for pigeon in 0..=holes {
            clauses.push((0..holes).map(|hole| var(pigeon, hole)).collect());
        }
        for hole in 0..holes {
            for first in 0..=holes {
                for second in first + 1..=holes {
                    clauses.push(vec![-var(first, hole), -var(second, hole)]);
                }
            }
        }
        (((holes + 1) * holes) as u32, clauses)
    }

    fn satisfies(engine: &Engine, clauses: &[Vec<i32>]) -> bool {
        clauses.iter().all(|clause| {
            clause
                .iter()
                .any(|&code| engine.trail().is_literal_true(Literal::from_dimacs(code)))
        })
    }

    #[test]
    fn model_satisfies_every_clause() {
        let clauses = vec![
            vec![1, 2, 3],
            vec![-1, -2],
            vec![-1, -3],
            vec![-2, -3],
            vec![2, 4],
            vec![-4, 5, -3],
            vec![-5, 1, 4],
        ];

        let (engine, outcome) = solve(5, &clauses, EngineConfig::default());

        assert_eq!(SolveOutcome::Satisfiable, outcome);
        assert!(engine.is_complete());
        assert!(satisfies(&engine, &clauses));
        assert_eq!(10, engine.get_return_code());
    }

    #[test]
    fn pigeonhole_is_unsatisfiable() {
        let (num_variables, clauses) = pigeonhole(4);

        let (engine, outcome) = solve(num_variables, &clauses, EngineConfig::default());

        assert_eq!(SolveOutcome::Unsatisfiable, outcome);
        assert_eq!(20, engine.get_return_code());
        assert!(engine.statistics().num_conflicts > 0);
    }

    #[test]
    fn frequent_restarts_and_forgetting_keep_the_answer() {
        let (num_variables, clauses) = pigeonhole(5);
        let config = EngineConfig {
            restart_initial_conflicts: 2,
            forget_interval: 1,
            forget_fraction: 0.9,
            ..EngineConfig::default()
        };

        let (engine, outcome) = solve(num_variables, &clauses, config);

        assert_eq!(SolveOutcome::Unsatisfiable, outcome);
        assert!(engine.statistics().num_restarts > 0);
    }

    #[test]
    fn empty_formula_is_satisfiable() {
        let (engine, outcome) = solve(3, &[], EngineConfig::default());

        assert_eq!(SolveOutcome::Satisfiable, outcome);
        assert_eq!(3, engine.trail().size());
    }

    #[test]
    fn formula_refuted_while_loading_is_unsatisfiable() {
        let (_, outcome) = solve(1, &[vec![1], vec![-1]], EngineConfig::default());

        assert_eq!(SolveOutcome::Unsatisfiable, outcome);
    }

    #[test]
    fn exhausted_budget_gives_unknown() {
        let (num_variables, clauses) = pigeonhole(6);
        let mut engine = Engine::new(EngineConfig::default());
        engine.set_max_variable(num_variables);
        for clause in &clauses {
            let _ = engine.add_model_clause(clause).expect("valid clause");
        }
        let brancher = engine.add_listener(VsidsBrancher::new(engine.config()));

        let outcome =
            Solver::new(engine.config()).solve(&mut engine, brancher, &mut DecisionBudget::new(5));

        assert_eq!(SolveOutcome::Unknown, outcome);
        assert_eq!(0, engine.get_return_code());
        assert!(!engine.is_running());
    }

    #[test]
    fn cancelled_engine_gives_unknown() {
        let (num_variables, clauses) = pigeonhole(6);
        let mut engine = Engine::new(EngineConfig::default());
        engine.set_max_variable(num_variables);
        for clause in &clauses {
            let _ = engine.add_model_clause(clause).expect("valid clause");
        }
        let brancher = engine.add_listener(VsidsBrancher::new(engine.config()));
        engine.cancellation_token().cancel();

        let outcome = Solver::new(engine.config()).solve(&mut engine, brancher, &mut Indefinite);

        assert_eq!(SolveOutcome::Unknown, outcome);
        assert_eq!(SolverState::Unknown, engine.current_state());
    }
}
