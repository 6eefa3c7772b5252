//! CP solver interface and a backtracking implementation.

use super::model::{Constraint, CpModel};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Largest domain the backtracking solver will enumerate per variable.
pub const MAX_DOMAIN_SIZE: i64 = 1 << 16;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible (but not necessarily optimal) solution found.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Model is invalid or malformed.
    ModelInvalid,
    /// Solver exceeded time limit.
    Timeout,
    /// No solution found for unknown reasons.
    Unknown,
}

/// Solution from a CP solver.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CpSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Integer variable assignments.
    pub values: HashMap<String, i64>,
    /// Number of search nodes visited.
    pub nodes: usize,
    /// Solve time in milliseconds.
    pub solve_time_ms: i64,
}

impl CpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            values: HashMap::new(),
            nodes: 0,
            solve_time_ms: 0,
        }
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
    }

    /// Assigned value of a variable.
    pub fn value(&self, name: &str) -> Option<i64> {
        self.values.get(name).copied()
    }
}

/// Solver configuration.
///
/// # Examples
///
/// ```
/// use u_formulate::cp::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_time_limit_ms(5_000)
///     .with_seed(7);
/// assert_eq!(config.seed, Some(7));
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Maximum solve time in milliseconds. 0 = no limit.
    pub time_limit_ms: i64,
    /// Seed for shuffling value order. `None` tries values ascending.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 60_000,
            seed: None,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: i64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.time_limit_ms < 0 {
            return Err(format!(
                "time_limit_ms must be non-negative, got {}",
                self.time_limit_ms
            ));
        }
        Ok(())
    }
}

/// Trait for CP solver implementations.
///
/// Implementors provide the actual constraint solving logic. The
/// formulation code only depends on this trait, so a different engine
/// can be plugged in without touching the models.
pub trait CpSolver {
    /// Solves the model and returns a solution.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}

/// Depth-first search with forward checking.
///
/// Picks the unassigned variable with the smallest remaining domain
/// (ties broken by declaration order), tries its values, and after each
/// assignment removes the value from every all-different peer. A peer
/// left with one value is assigned in turn; a peer left with none
/// triggers a backtrack. Linear equalities prune every value that
/// cannot reach the right-hand side given the other terms' bounds, and
/// the two rules run until neither removes anything.
///
/// # Limitations
///
/// - Only handles AllDifferent, Equal and LinearEq constraints
/// - Stops at the first feasible assignment (no objective)
/// - Domains are enumerated explicitly, so they must be small
#[derive(Debug, Default)]
pub struct BacktrackingSolver;

impl BacktrackingSolver {
    pub fn new() -> Self {
        Self
    }
}

impl CpSolver for BacktrackingSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        if let Err(e) = model.validate() {
            warn!(model = %model.name, error = %e, "rejecting invalid CP model");
            return CpSolution::empty(SolverStatus::ModelInvalid);
        }
        if let Err(e) = config.validate() {
            warn!(error = %e, "rejecting invalid solver config");
            return CpSolution::empty(SolverStatus::ModelInvalid);
        }
        if let Some(var) = model
            .int_vars()
            .iter()
            .find(|v| v.domain_size() > MAX_DOMAIN_SIZE)
        {
            warn!(var = %var.name, size = var.domain_size(), "domain too large to enumerate");
            return CpSolution::empty(SolverStatus::ModelInvalid);
        }

        let start_time = Instant::now();
        info!(
            model = %model.name,
            vars = model.var_count(),
            constraints = model.constraint_count(),
            "cp solve start"
        );

        let mut search = Search::new(model, config, start_time);
        let status = match search.initial_domains() {
            Some(mut domains) => match search.run(&mut domains) {
                Step::Found(assignment) => {
                    let values = model
                        .int_vars()
                        .iter()
                        .zip(assignment)
                        .map(|(v, value)| (v.name.clone(), value))
                        .collect();
                    let solution = CpSolution {
                        status: SolverStatus::Feasible,
                        values,
                        nodes: search.nodes,
                        solve_time_ms: start_time.elapsed().as_millis() as i64,
                    };
                    info!(
                        status = ?solution.status,
                        nodes = solution.nodes,
                        ms = solution.solve_time_ms,
                        "cp solve end"
                    );
                    return solution;
                }
                Step::Exhausted => SolverStatus::Infeasible,
                Step::TimedOut => SolverStatus::Timeout,
            },
            None => SolverStatus::Infeasible,
        };

        let solution = CpSolution {
            status,
            values: HashMap::new(),
            nodes: search.nodes,
            solve_time_ms: start_time.elapsed().as_millis() as i64,
        };
        info!(
            status = ?solution.status,
            nodes = solution.nodes,
            ms = solution.solve_time_ms,
            "cp solve end"
        );
        solution
    }
}

type Domains = Vec<Vec<i64>>;

/// `(variable index, coefficient)` terms and right-hand side.
type Linear = (Vec<(usize, i64)>, i64);

enum Step {
    Found(Vec<i64>),
    Exhausted,
    TimedOut,
}

struct Search<'a> {
    model: &'a CpModel,
    /// For each variable, the variables it shares an all-different with.
    peers: Vec<Vec<usize>>,
    linear: Vec<Linear>,
    rng: Option<StdRng>,
    deadline_ms: Option<u128>,
    start_time: Instant,
    nodes: usize,
}

impl<'a> Search<'a> {
    fn new(model: &'a CpModel, config: &SolverConfig, start_time: Instant) -> Self {
        let n = model.var_count();
        let mut peers: Vec<Vec<usize>> = vec![Vec::new(); n];
        for c in &model.constraints {
            if let Constraint::AllDifferent { vars } = c {
                let idx: Vec<usize> = vars.iter().filter_map(|v| model.var_index(v)).collect();
                for &a in &idx {
                    for &b in &idx {
                        if a != b {
                            peers[a].push(b);
                        }
                    }
                }
            }
        }
        for p in &mut peers {
            p.sort_unstable();
            p.dedup();
        }

        let linear = model
            .constraints
            .iter()
            .filter_map(|c| match c {
                Constraint::LinearEq { terms, rhs } => {
                    let idx = terms
                        .iter()
                        .filter_map(|(v, coef)| model.var_index(v).map(|i| (i, *coef)))
                        .collect();
                    Some((idx, *rhs))
                }
                _ => None,
            })
            .collect();

        Self {
            model,
            peers,
            linear,
            rng: config.seed.map(StdRng::seed_from_u64),
            deadline_ms: (config.time_limit_ms > 0).then_some(config.time_limit_ms as u128),
            start_time,
            nodes: 0,
        }
    }

    /// Builds the root domains, applies equalities, and propagates any
    /// singletons. `None` means the root is already inconsistent.
    fn initial_domains(&self) -> Option<Domains> {
        let mut domains: Domains = self
            .model
            .int_vars()
            .iter()
            .map(|v| match v.fixed {
                Some(value) => vec![value],
                None => (v.min..=v.max).collect(),
            })
            .collect();

        for c in &self.model.constraints {
            if let Constraint::Equal { var, value } = c {
                let i = self.model.var_index(var)?;
                domains[i].retain(|d| d == value);
                if domains[i].is_empty() {
                    debug!(var = %var, value, "equality outside domain");
                    return None;
                }
            }
        }

        let singletons: Vec<usize> = (0..domains.len())
            .filter(|&i| domains[i].len() == 1)
            .collect();
        if self.propagate(&mut domains, singletons) {
            Some(domains)
        } else {
            None
        }
    }

    /// Runs all-different and linear pruning to a fixpoint. Returns
    /// `false` when some domain is wiped out.
    fn propagate(&self, domains: &mut Domains, mut queue: Vec<usize>) -> bool {
        loop {
            if !self.propagate_all_different(domains, queue) {
                return false;
            }
            match self.prune_linear(domains) {
                None => return false,
                Some(fresh) if fresh.is_empty() => return true,
                Some(fresh) => queue = fresh,
            }
        }
    }

    /// Removes each queued singleton's value from its peers.
    fn propagate_all_different(&self, domains: &mut Domains, mut queue: Vec<usize>) -> bool {
        while let Some(i) = queue.pop() {
            let value = domains[i][0];
            for &p in &self.peers[i] {
                let before = domains[p].len();
                domains[p].retain(|&d| d != value);
                match domains[p].len() {
                    0 => return false,
                    1 if before > 1 => queue.push(p),
                    _ => {}
                }
            }
        }
        true
    }

    /// Drops values that leave a linear equality unreachable. Returns the
    /// variables newly reduced to one value, or `None` on a wipe-out.
    fn prune_linear(&self, domains: &mut Domains) -> Option<Vec<usize>> {
        let mut fresh = Vec::new();
        for (terms, rhs) in &self.linear {
            let rhs = i128::from(*rhs);
            let (lo, hi) = terms.iter().fold((0i128, 0i128), |(lo, hi), &(i, coef)| {
                let (tlo, thi) = term_range(&domains[i], coef);
                (lo + tlo, hi + thi)
            });
            for &(i, coef) in terms {
                let (tlo, thi) = term_range(&domains[i], coef);
                let (rest_lo, rest_hi) = (lo - tlo, hi - thi);
                let before = domains[i].len();
                domains[i].retain(|&v| {
                    let t = i128::from(coef) * i128::from(v);
                    t + rest_lo <= rhs && t + rest_hi >= rhs
                });
                match domains[i].len() {
                    0 => return None,
                    1 if before > 1 => fresh.push(i),
                    _ => {}
                }
            }
        }
        Some(fresh)
    }

    fn timed_out(&self) -> bool {
        self.deadline_ms
            .is_some_and(|limit| self.start_time.elapsed().as_millis() > limit)
    }

    fn run(&mut self, domains: &mut Domains) -> Step {
        self.nodes += 1;
        if self.timed_out() {
            return Step::TimedOut;
        }

        let branch = domains
            .iter()
            .enumerate()
            .filter(|(_, d)| d.len() > 1)
            .min_by_key(|(i, d)| (d.len(), *i))
            .map(|(i, _)| i);

        let Some(var) = branch else {
            return Step::Found(domains.iter().map(|d| d[0]).collect());
        };

        let mut values = domains[var].clone();
        if let Some(rng) = self.rng.as_mut() {
            values.shuffle(rng);
        }

        for value in values {
            let mut child = domains.clone();
            child[var] = vec![value];
            if !self.propagate(&mut child, vec![var]) {
                continue;
            }
            match self.run(&mut child) {
                Step::Exhausted => {}
                found_or_timeout => return found_or_timeout,
            }
        }
        Step::Exhausted
    }
}

/// Smallest and largest value of `coef * x` over a sorted, non-empty
/// domain.
fn term_range(domain: &[i64], coef: i64) -> (i128, i128) {
    let first = i128::from(coef) * i128::from(domain[0]);
    let last = i128::from(coef) * i128::from(domain[domain.len() - 1]);
    (first.min(last), first.max(last))
}
