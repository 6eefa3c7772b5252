//! Minimization method catalogue.

use super::error::NlpError;
use std::fmt;
use std::str::FromStr;

/// What a minimization method can honour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Simple variable bounds.
    pub bounds: bool,
    /// Inequality constraints `g(x) >= 0`.
    pub inequality: bool,
    /// Equality constraints `h(x) = 0`.
    pub equality: bool,
    /// Whether this crate ships a backend for the method.
    pub available: bool,
}

/// Minimization methods, by their conventional names.
///
/// Several classical methods silently ignore constraints. Rather than
/// letting such a pairing run and return an infeasible point, every
/// method carries its [`Capabilities`] and a problem is checked against
/// them before solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Method {
    NelderMead,
    Powell,
    Cg,
    Bfgs,
    NewtonCg,
    LBfgsB,
    Tnc,
    Cobyla,
    Slsqp,
    TrustConstr,
    Dogleg,
    TrustNcg,
    TrustExact,
    TrustKrylov,
}

impl Method {
    /// Every known method, in catalogue order.
    pub const ALL: [Method; 14] = [
        Method::NelderMead,
        Method::Powell,
        Method::Cg,
        Method::Bfgs,
        Method::NewtonCg,
        Method::LBfgsB,
        Method::Tnc,
        Method::Cobyla,
        Method::Slsqp,
        Method::TrustConstr,
        Method::Dogleg,
        Method::TrustNcg,
        Method::TrustExact,
        Method::TrustKrylov,
    ];

    /// Conventional lower-case name.
    pub fn name(self) -> &'static str {
        match self {
            Method::NelderMead => "nelder-mead",
            Method::Powell => "powell",
            Method::Cg => "cg",
            Method::Bfgs => "bfgs",
            Method::NewtonCg => "newton-cg",
            Method::LBfgsB => "l-bfgs-b",
            Method::Tnc => "tnc",
            Method::Cobyla => "cobyla",
            Method::Slsqp => "slsqp",
            Method::TrustConstr => "trust-constr",
            Method::Dogleg => "dogleg",
            Method::TrustNcg => "trust-ncg",
            Method::TrustExact => "trust-exact",
            Method::TrustKrylov => "trust-krylov",
        }
    }

    pub fn capabilities(self) -> Capabilities {
        let with_nlopt = cfg!(feature = "nlopt");
        let (bounds, inequality, equality, available) = match self {
            Method::NelderMead | Method::LBfgsB => (true, false, false, with_nlopt),
            Method::Powell | Method::Tnc => (true, false, false, false),
            Method::Cg
            | Method::Bfgs
            | Method::NewtonCg
            | Method::Dogleg
            | Method::TrustNcg
            | Method::TrustExact
            | Method::TrustKrylov => (false, false, false, false),
            Method::Cobyla => (true, true, false, true),
            Method::Slsqp => (true, true, true, with_nlopt),
            Method::TrustConstr => (true, true, true, false),
        };
        Capabilities {
            bounds,
            inequality,
            equality,
            available,
        }
    }

    /// Best available method for problems with inequality constraints:
    /// SLSQP when built with NLopt, COBYLA otherwise.
    pub fn default_constrained() -> Method {
        if Method::Slsqp.capabilities().available {
            Method::Slsqp
        } else {
            Method::Cobyla
        }
    }

    /// Methods this crate can actually run.
    pub fn available() -> impl Iterator<Item = Method> {
        Method::ALL
            .into_iter()
            .filter(|m| m.capabilities().available)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = NlpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Method::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| NlpError::UnknownMethod(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for m in Method::ALL {
            assert_eq!(m.name().parse::<Method>().ok(), Some(m));
        }
    }

    #[test]
    fn test_parse_is_lenient_on_case() {
        assert_eq!("SLSQP".parse::<Method>().ok(), Some(Method::Slsqp));
        assert_eq!("Nelder_Mead".parse::<Method>().ok(), Some(Method::NelderMead));
    }

    #[test]
    fn test_unknown_method() {
        assert!(matches!(
            "simplex-magic".parse::<Method>(),
            Err(NlpError::UnknownMethod(_))
        ));
    }

    #[test]
    fn test_constraint_support() {
        assert!(!Method::Bfgs.capabilities().inequality);
        assert!(!Method::NelderMead.capabilities().inequality);
        assert!(Method::Cobyla.capabilities().inequality);
        assert!(!Method::Cobyla.capabilities().equality);
        assert!(Method::Slsqp.capabilities().equality);
    }

    #[cfg(not(feature = "nlopt"))]
    #[test]
    fn test_available_backends() {
        let available: Vec<Method> = Method::available().collect();
        assert_eq!(available, vec![Method::Cobyla]);
        assert_eq!(Method::default_constrained(), Method::Cobyla);
    }

    #[cfg(feature = "nlopt")]
    #[test]
    fn test_available_backends() {
        let available: Vec<Method> = Method::available().collect();
        assert_eq!(
            available,
            vec![
                Method::NelderMead,
                Method::LBfgsB,
                Method::Cobyla,
                Method::Slsqp
            ]
        );
        assert_eq!(Method::default_constrained(), Method::Slsqp);
    }
}
