//! The generic optimization run loop.
//!
//! An [`Optimizer`] pairs an [`Evaluator`] with a [`Strategy`]. The strategy
//! decides where to look; the optimizer does everything else:
//!
//! - evaluates every proposed candidate through the evaluator
//! - tracks the best sample (lowest soft-constraints value, then lowest
//!   objective value)
//! - counts iterations
//! - checks the finish and termination criteria in [`Termination`]
//!
//! # Run Loop
//!
//! Each iteration proposes, evaluates, updates the best sample, hands the
//! samples to the strategy, and increments the iteration count exactly once.
//! The loop continues while the run is neither finished nor terminated.
//!
//! If the strategy reports that it is stagnating, the iteration restarts it
//! before proposing. A restart counts toward
//! [`number_of_restarts`](Optimizer::number_of_restarts) and never ends the
//! run; the best sample survives it.
//!
//! # Observer Events
//!
//! [`Optimizer::optimize_observed`] emits one [`Event`] per iteration, after
//! the strategy update. Observers can return [`Action::StopEarly`] to end the
//! run with [`Status::StoppedByObserver`]. There is no way to interrupt an
//! iteration in progress.
//!
//! # Parallel Evaluation
//!
//! With the `parallel` feature, the candidates of one iteration are evaluated
//! with `rayon`. The strategy update still waits for every candidate.

mod action;
mod best;
mod error;
mod event;
mod status;
mod strategy;
mod termination;


pub use action::Action;
pub use error::Error;
pub use event::Event;
pub use status::Status;
pub use strategy::Strategy;
pub use termination::{ConfigError, Termination};

use skein_core::{Observer, Sample};
use tracing::{debug, info};

use crate::evaluation::Evaluator;

use best::Best;

/// Runs a [`Strategy`] against an objective until a stop criterion is met.
#[derive(Debug)]
pub struct Optimizer<S> {
    evaluator: Evaluator,
    strategy: S,
    termination: Termination,
    best: Best,
    iterations: usize,
    restarts: usize,
}

impl<S: Strategy> Optimizer<S> {
    /// Creates an optimizer with default termination criteria.
    ///
    /// The default criteria never stop a run on their own. Set a maximum or an
    /// acceptable objective value, or observe the run and stop it early.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the strategy and the objective
    /// have different dimensions.
    pub fn new(evaluator: Evaluator, strategy: S) -> Result<Self, Error> {
        let expected = evaluator.objective().dimension();
        let found = strategy.dimension();
        if expected != found {
            return Err(Error::DimensionMismatch { expected, found });
        }

        Ok(Self {
            evaluator,
            strategy,
            termination: Termination::default(),
            best: Best::default(),
            iterations: 0,
            restarts: 0,
        })
    }

    /// Replaces the termination criteria.
    #[must_use]
    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    /// Runs until the optimizer is finished or terminated.
    pub fn optimize(&mut self) -> Status {
        self.optimize_observed(())
    }

    /// Runs until the optimizer is finished, terminated, or stopped by the
    /// observer.
    ///
    /// Calling this again after a stop resumes the run with the current
    /// strategy state and counters.
    pub fn optimize_observed<Obs>(&mut self, mut observer: Obs) -> Status
    where
        Obs: for<'a> Observer<Event<'a, S>, Action>,
    {
        let status = loop {
            if let Some(status) = self.stop_reason() {
                break status;
            }

            let population = self.step();

            let event = Event {
                iteration: self.iterations,
                number_of_evaluations: self.evaluator.number_of_evaluations(),
                number_of_distinct_evaluations: self.evaluator.number_of_distinct_evaluations(),
                population: &population,
                best: self.best.sample(),
                strategy: &self.strategy,
            };

            if let Some(Action::StopEarly) = observer.observe(&event) {
                break Status::StoppedByObserver;
            }
        };

        info!(
            ?status,
            iterations = self.iterations,
            restarts = self.restarts,
            evaluations = self.evaluator.number_of_evaluations(),
            distinct_evaluations = self.evaluator.number_of_distinct_evaluations(),
            best_objective_value = self.best_objective_value(),
            "optimization ended"
        );

        status
    }

    /// Runs a single iteration and returns its samples in proposal order.
    ///
    /// This ignores the termination criteria, so callers driving the loop
    /// themselves should check [`is_finished`](Self::is_finished) and
    /// [`is_terminated`](Self::is_terminated).
    pub fn step(&mut self) -> Vec<Sample> {
        if self.strategy.is_stagnating() {
            self.restarts += 1;
            info!(
                iteration = self.iterations,
                restarts = self.restarts,
                "strategy stagnated, restarting"
            );
            self.strategy.restart();
        }

        let candidates = self.strategy.propose();
        let samples = self.evaluate_all(&candidates);

        for sample in &samples {
            self.best.update(sample);
        }
        self.strategy.update(&samples);
        self.iterations += 1;

        debug!(
            iteration = self.iterations,
            evaluations = self.evaluator.number_of_evaluations(),
            best_objective_value = self.best_objective_value(),
            "iteration complete"
        );

        samples
    }

    /// Returns true if the best objective value is acceptable.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.termination.is_finished(self.best_objective_value())
    }

    /// Returns true if the iteration or evaluation budget is exhausted.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.termination
            .is_terminated(self.iterations, self.evaluator.number_of_evaluations())
    }

    #[must_use]
    pub fn number_of_iterations(&self) -> usize {
        self.iterations
    }

    /// Returns how many times the strategy was restarted after stagnating.
    #[must_use]
    pub fn number_of_restarts(&self) -> usize {
        self.restarts
    }

    #[must_use]
    pub fn number_of_evaluations(&self) -> usize {
        self.evaluator.number_of_evaluations()
    }

    #[must_use]
    pub fn number_of_distinct_evaluations(&self) -> usize {
        self.evaluator.number_of_distinct_evaluations()
    }

    /// Returns the best sample so far, if any.
    #[must_use]
    pub fn best(&self) -> Option<&Sample> {
        self.best.sample()
    }

    /// Returns the best parameter so far, or an empty slice before the first
    /// iteration.
    #[must_use]
    pub fn best_parameter(&self) -> &[f64] {
        self.best
            .sample()
            .map(|best| best.parameter.as_slice())
            .unwrap_or_default()
    }

    /// Returns the best objective value so far, or infinity before the first
    /// iteration.
    #[must_use]
    pub fn best_objective_value(&self) -> f64 {
        self.best
            .sample()
            .map_or(f64::INFINITY, |best| best.objective_value)
    }

    /// Returns the soft-constraints value of the best sample, or infinity
    /// before the first iteration.
    #[must_use]
    pub fn best_soft_constraints_value(&self) -> f64 {
        self.best
            .sample()
            .map_or(f64::INFINITY, |best| best.soft_constraints_value)
    }

    pub fn set_maximal_number_of_iterations(&mut self, max_iterations: usize) {
        self.termination.set_max_iterations(Some(max_iterations));
    }

    pub fn set_maximal_number_of_evaluations(&mut self, max_evaluations: usize) {
        self.termination.set_max_evaluations(Some(max_evaluations));
    }

    /// Sets the objective value at or below which the run is finished.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is NaN. The criteria are left unchanged.
    pub fn set_acceptable_objective_value(&mut self, value: f64) -> Result<(), ConfigError> {
        self.termination.set_acceptable_objective_value(value)
    }

    #[must_use]
    pub fn termination(&self) -> &Termination {
        &self.termination
    }

    #[must_use]
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    #[must_use]
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Returns the strategy mutably, for example to adjust a step size
    /// between runs.
    pub fn strategy_mut(&mut self) -> &mut S {
        &mut self.strategy
    }

    /// Restores the optimizer to its construction-time state.
    ///
    /// Clears the evaluator's cache, counters, and history, resets the
    /// strategy, forgets the best sample, and zeroes the iteration and restart
    /// counts. The termination criteria are kept.
    pub fn reset(&mut self) {
        self.evaluator.reset();
        self.strategy.reset();
        self.best.clear();
        self.iterations = 0;
        self.restarts = 0;
    }

    fn stop_reason(&self) -> Option<Status> {
        if self.is_finished() {
            return Some(Status::Finished);
        }

        if self
            .termination
            .max_iterations()
            .is_some_and(|max| self.iterations >= max)
        {
            return Some(Status::MaxIterations);
        }

        if self
            .termination
            .max_evaluations()
            .is_some_and(|max| self.evaluator.number_of_evaluations() >= max)
        {
            return Some(Status::MaxEvaluations);
        }

        None
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_all(&self, candidates: &[Vec<f64>]) -> Vec<Sample> {
        candidates
            .iter()
            .map(|candidate| self.evaluator.sample(candidate))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn evaluate_all(&self, candidates: &[Vec<f64>]) -> Vec<Sample> {
        use rayon::prelude::*;

        // Borrow only the evaluator so the strategy need not be `Sync`.
        let evaluator = &self.evaluator;
        candidates
            .par_iter()
            .map(|candidate| evaluator.sample(candidate))
            .collect()
    }
}
