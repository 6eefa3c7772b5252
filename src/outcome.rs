//! Tagged solver outcome shared by every formulation.

/// Result of handing a model to a solver.
///
/// Every pipeline reports through this type so call sites must decide
/// what to print for each variant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome<T> {
    /// Proven optimal assignment.
    Optimal(T),
    /// Feasible assignment, optimality not proven (or no objective).
    Feasible(T),
    /// The constraints admit no assignment.
    Infeasible,
    /// The solver stopped without a verdict (timeout, unbounded, ...).
    Unknown,
}

impl<T> Outcome<T> {
    /// Whether an assignment is available.
    pub fn is_solution_found(&self) -> bool {
        matches!(self, Outcome::Optimal(_) | Outcome::Feasible(_))
    }

    /// Returns the assignment, if any.
    pub fn solution(&self) -> Option<&T> {
        match self {
            Outcome::Optimal(v) | Outcome::Feasible(v) => Some(v),
            Outcome::Infeasible | Outcome::Unknown => None,
        }
    }

    /// Consumes the outcome, returning the assignment if any.
    pub fn into_solution(self) -> Option<T> {
        match self {
            Outcome::Optimal(v) | Outcome::Feasible(v) => Some(v),
            Outcome::Infeasible | Outcome::Unknown => None,
        }
    }

    /// Maps the carried assignment, keeping the variant.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Optimal(v) => Outcome::Optimal(f(v)),
            Outcome::Feasible(v) => Outcome::Feasible(f(v)),
            Outcome::Infeasible => Outcome::Infeasible,
            Outcome::Unknown => Outcome::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solution_access() {
        let o: Outcome<i32> = Outcome::Optimal(3);
        assert!(o.is_solution_found());
        assert_eq!(o.solution(), Some(&3));

        let f: Outcome<i32> = Outcome::Feasible(4);
        assert_eq!(f.into_solution(), Some(4));

        let i: Outcome<i32> = Outcome::Infeasible;
        assert!(!i.is_solution_found());
        assert!(i.solution().is_none());
    }

    #[test]
    fn test_map_keeps_variant() {
        let o = Outcome::Feasible(2).map(|v| v * 10);
        assert_eq!(o, Outcome::Feasible(20));

        let u: Outcome<i32> = Outcome::Unknown;
        assert_eq!(u.map(|v| v + 1), Outcome::Unknown);
    }
}
