use crate::{Expr, ImplicantSet, Pattern, Primes};

impl From<&ImplicantSet> for Expr {
    fn from(patterns: &ImplicantSet) -> Expr {
        patterns
            .iter()
            .fold(Expr::from(false), |expr, p| expr | Expr::from(p))
    }
}

impl From<&Primes> for Expr {
    fn from(primes: &Primes) -> Self {
        Self::from(primes.as_implicants())
    }
}

impl From<Primes> for ImplicantSet {
    fn from(primes: Primes) -> Self {
        primes.into_implicants()
    }
}

impl From<&Primes> for ImplicantSet {
    fn from(primes: &Primes) -> Self {
        primes.as_implicants().clone()
    }
}

impl From<&ImplicantSet> for Primes {
    fn from(implicants: &ImplicantSet) -> Self {
        implicants.iter().cloned().collect()
    }
}

impl From<ImplicantSet> for Primes {
    fn from(implicants: ImplicantSet) -> Self {
        implicants.into_iter().collect()
    }
}

impl From<&Expr> for Primes {
    fn from(expr: &Expr) -> Self {
        Self::from_expr(expr)
    }
}

impl From<Expr> for Primes {
    fn from(expr: Expr) -> Self {
        Self::from_expr(&expr)
    }
}

impl From<&Expr> for ImplicantSet {
    fn from(expr: &Expr) -> Self {
        Primes::from(expr).into()
    }
}

impl From<bool> for ImplicantSet {
    fn from(value: bool) -> Self {
        let mut result = Self::default();
        if value {
            result.push_new_pattern(Pattern::default());
        }
        result
    }
}

impl From<bool> for Primes {
    fn from(value: bool) -> Self {
        Primes::from(ImplicantSet::from(value))
    }
}
