//! Built-in real functions that configuration files refer to by name.
//!
//! Exact functions sit next to approximations of them (truncated series,
//! perturbed formulas) so that a config can pair the two in a test case.

/// A real function of a real variable.
pub type RealFn = fn(f64) -> f64;

/// A named catalog function.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub function: RealFn,
}

fn sqrt(x: f64) -> f64 {
    x.sqrt()
}

fn x_sqrt_x(x: f64) -> f64 {
    x * x.sqrt()
}

fn x_sqrt_x_perturbed(x: f64) -> f64 {
    x * (x + 1e-12).sqrt()
}

fn exp(x: f64) -> f64 {
    x.exp()
}

fn exp_taylor(x: f64) -> f64 {
    // Horner form of 1 + x + x^2/2 + x^3/6 + x^4/24.
    1.0 + x * (1.0 + x * (0.5 + x * (1.0 / 6.0 + x / 24.0)))
}

fn sin(x: f64) -> f64 {
    x.sin()
}

fn sin_taylor(x: f64) -> f64 {
    let x2 = x * x;
    x * (1.0 - x2 / 6.0 * (1.0 - x2 / 20.0))
}

fn cos(x: f64) -> f64 {
    x.cos()
}

fn cos_taylor(x: f64) -> f64 {
    let x2 = x * x;
    1.0 - x2 / 2.0 * (1.0 - x2 / 12.0)
}

fn ln(x: f64) -> f64 {
    x.ln()
}

fn reciprocal(x: f64) -> f64 {
    1.0 / x
}

fn negate(x: f64) -> f64 {
    -x
}

fn abs(x: f64) -> f64 {
    x.abs()
}

fn floor(x: f64) -> f64 {
    x.floor()
}

fn zero(_: f64) -> f64 {
    0.0
}

fn identity(x: f64) -> f64 {
    x
}

fn square(x: f64) -> f64 {
    x * x
}

fn cube(x: f64) -> f64 {
    x * x * x
}

fn cbrt(x: f64) -> f64 {
    x.cbrt()
}

fn sin_sq_plus_cos_sq_minus_one(x: f64) -> f64 {
    let (s, c) = x.sin_cos();
    s * s + c * c - 1.0
}

static CATALOG: &[CatalogEntry] = &[
    CatalogEntry { name: "sqrt", description: "square root", function: sqrt },
    CatalogEntry { name: "x_sqrt_x", description: "x * sqrt(x)", function: x_sqrt_x },
    CatalogEntry {
        name: "x_sqrt_x_perturbed",
        description: "x * sqrt(x + 1e-12)",
        function: x_sqrt_x_perturbed,
    },
    CatalogEntry { name: "exp", description: "exponential", function: exp },
    CatalogEntry {
        name: "exp_taylor",
        description: "4th order Taylor polynomial of exp at 0",
        function: exp_taylor,
    },
    CatalogEntry { name: "sin", description: "sine", function: sin },
    CatalogEntry {
        name: "sin_taylor",
        description: "5th order Taylor polynomial of sin at 0",
        function: sin_taylor,
    },
    CatalogEntry { name: "cos", description: "cosine", function: cos },
    CatalogEntry {
        name: "cos_taylor",
        description: "4th order Taylor polynomial of cos at 0",
        function: cos_taylor,
    },
    CatalogEntry { name: "ln", description: "natural logarithm", function: ln },
    CatalogEntry { name: "reciprocal", description: "1 / x", function: reciprocal },
    CatalogEntry { name: "negate", description: "-x", function: negate },
    CatalogEntry { name: "abs", description: "absolute value", function: abs },
    CatalogEntry { name: "floor", description: "largest integer not above x", function: floor },
    CatalogEntry { name: "zero", description: "constant 0", function: zero },
    CatalogEntry { name: "identity", description: "x", function: identity },
    CatalogEntry { name: "square", description: "x^2", function: square },
    CatalogEntry { name: "cube", description: "x^3", function: cube },
    CatalogEntry { name: "cbrt", description: "cube root", function: cbrt },
    CatalogEntry {
        name: "pythagorean_residual",
        description: "sin^2 x + cos^2 x - 1",
        function: sin_sq_plus_cos_sq_minus_one,
    },
];

/// Every catalog entry, in a stable order.
pub fn entries() -> &'static [CatalogEntry] {
    CATALOG
}

/// Look up a function by name.
pub fn lookup(name: &str) -> Option<RealFn> {
    CATALOG.iter().find(|e| e.name == name).map(|e| e.function)
}
