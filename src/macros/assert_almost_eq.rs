/// Panics unless `$a` and `$b` differ by at most `$prec` in absolute terms.
#[macro_export]
macro_rules! assert_almost_eq {
    ($a:expr, $b:expr, $prec:expr $(,)?) => {{
        let (left, right): (f64, f64) = ($a, $b);
        if !$crate::numeric::almost_eq(left, right, $prec) {
            panic!(
                "assertion failed: `abs(left - right) < {:e}`, (left: `{}`, right: `{}`)",
                $prec, left, right
            );
        }
    }};
}

/// Panics unless the three compartment values sum to `$population` within
/// [`CONSERVATION_TOLERANCE`](crate::numeric::CONSERVATION_TOLERANCE) relative error.
#[macro_export]
macro_rules! assert_conserved {
    ($s:expr, $i:expr, $r:expr, $population:expr $(,)?) => {{
        let total: f64 = $s + $i + $r;
        let population: f64 = $population;
        if !$crate::numeric::relatively_eq(
            total,
            population,
            $crate::numeric::CONSERVATION_TOLERANCE,
        ) {
            panic!(
                "assertion failed: compartments sum to {} but population is {}",
                total, population
            );
        }
    }};
}
