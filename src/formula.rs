use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::errors::ValidationError;

/// Outcome of a formula computation: most formulas produce a number, a few
/// (like the quadratic formula) produce ready-made text.
#[derive(Clone, Debug, PartialEq)]
pub enum FormulaResult {
    Number(f64),
    Text(String),
}

/// One named numeric parameter a formula needs.
pub struct FormulaInput {
    pub label: &'static str,
    pub id: &'static str,
}

/// Validated input values keyed by input id.
pub type FormulaValues = HashMap<&'static str, f64>;

/// A single catalog entry: metadata plus a pure computation.
pub struct FormulaDefinition {
    pub name: &'static str,
    pub grade: &'static str,
    pub inputs: Vec<FormulaInput>,
    pub formula_text: &'static str,
    calc: fn(&FormulaValues) -> FormulaResult,
}

/// All formulas of one subject, in catalog order.
pub struct Subject {
    pub name: &'static str,
    pub formulas: Vec<(&'static str, FormulaDefinition)>,
}

impl FormulaDefinition {
    /// Checks that every declared input is present and parses as a finite
    /// number. Returns the parsed values, or an error naming every missing
    /// and invalid input id. Nothing is computed on failure.
    pub fn validate(&self, raw: &HashMap<String, String>) -> Result<FormulaValues, ValidationError> {
        let mut missing = Vec::new();
        let mut invalid = Vec::new();
        let mut values = FormulaValues::new();
        for input in &self.inputs {
            match raw.get(input.id) {
                None => missing.push(input.id.to_string()),
                Some(s) if s.trim().is_empty() => missing.push(input.id.to_string()),
                Some(s) => match s.trim().parse::<f64>() {
                    Ok(v) if v.is_finite() => {
                        values.insert(input.id, v);
                    }
                    _ => invalid.push(input.id.to_string()),
                },
            }
        }
        if !missing.is_empty() || !invalid.is_empty() {
            return Err(ValidationError { missing, invalid });
        }
        Ok(values)
    }

    /// Runs the pure computation. Call [`validate`](Self::validate) first.
    pub fn apply(&self, values: &FormulaValues) -> FormulaResult {
        (self.calc)(values)
    }

    /// Validation and computation in one step.
    pub fn evaluate(&self, raw: &HashMap<String, String>) -> Result<FormulaResult, ValidationError> {
        let values = self.validate(raw)?;
        Ok(self.apply(&values))
    }

    /// History line for an invocation: `Name (Label: value, ...)`.
    pub fn describe_invocation(&self, values: &FormulaValues) -> String {
        let args: Vec<String> = self
            .inputs
            .iter()
            .map(|inp| format!("{}: {}", inp.label, values[inp.id]))
            .collect();
        format!("{} ({})", self.name, args.join(", "))
    }
}

/// Finds a formula by subject name and formula key.
pub fn lookup(subject: &str, key: &str) -> Option<&'static FormulaDefinition> {
    CATALOG
        .iter()
        .find(|s| s.name == subject)
        .and_then(|s| s.formulas.iter().find(|(k, _)| *k == key))
        .map(|(_, def)| def)
}

/// Subject names in catalog order.
pub fn subjects() -> Vec<&'static str> {
    CATALOG.iter().map(|s| s.name).collect()
}

fn input(label: &'static str, id: &'static str) -> FormulaInput {
    FormulaInput { label, id }
}

fn quadratic(v: &FormulaValues) -> FormulaResult {
    let (a, b, c) = (v["a"], v["b"], v["c"]);
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return FormulaResult::Text("No real roots".to_string());
    }
    let x1 = (-b + disc.sqrt()) / (2.0 * a);
    let x2 = (-b - disc.sqrt()) / (2.0 * a);
    FormulaResult::Text(format!("x1 = {:.4}, x2 = {:.4}", x1, x2))
}

fn distance(v: &FormulaValues) -> FormulaResult {
    FormulaResult::Number(((v["x2"] - v["x1"]).powi(2) + (v["y2"] - v["y1"]).powi(2)).sqrt())
}

fn slope(v: &FormulaValues) -> FormulaResult {
    FormulaResult::Number((v["y2"] - v["y1"]) / (v["x2"] - v["x1"]))
}

fn speed(v: &FormulaValues) -> FormulaResult {
    FormulaResult::Number(v["distance"] / v["time"])
}

fn force(v: &FormulaValues) -> FormulaResult {
    FormulaResult::Number(v["m"] * v["a"])
}

fn kinetic_energy(v: &FormulaValues) -> FormulaResult {
    FormulaResult::Number(0.5 * v["m"] * v["v"] * v["v"])
}

fn ohms_law(v: &FormulaValues) -> FormulaResult {
    FormulaResult::Number(v["i"] * v["r"])
}

fn moles(v: &FormulaValues) -> FormulaResult {
    FormulaResult::Number(v["mass"] / v["molarMass"])
}

fn density(v: &FormulaValues) -> FormulaResult {
    FormulaResult::Number(v["mass"] / v["volume"])
}

fn ph(v: &FormulaValues) -> FormulaResult {
    FormulaResult::Number(-v["h"].log10())
}

fn simple_interest(v: &FormulaValues) -> FormulaResult {
    FormulaResult::Number(v["p"] * v["r"] * v["t"] / 100.0)
}

fn compound_interest(v: &FormulaValues) -> FormulaResult {
    let amount = v["p"] * (1.0 + v["r"] / (100.0 * v["n"])).powf(v["n"] * v["t"]);
    FormulaResult::Number(amount - v["p"])
}

fn profit(v: &FormulaValues) -> FormulaResult {
    FormulaResult::Number(v["sp"] - v["cp"])
}

fn profit_percent(v: &FormulaValues) -> FormulaResult {
    FormulaResult::Number((v["sp"] - v["cp"]) / v["cp"] * 100.0)
}

fn circle_area(v: &FormulaValues) -> FormulaResult {
    FormulaResult::Number(std::f64::consts::PI * v["r"] * v["r"])
}

fn rectangle_area(v: &FormulaValues) -> FormulaResult {
    FormulaResult::Number(v["l"] * v["w"])
}

fn triangle_area(v: &FormulaValues) -> FormulaResult {
    FormulaResult::Number(0.5 * v["b"] * v["h"])
}

fn sphere_volume(v: &FormulaValues) -> FormulaResult {
    FormulaResult::Number(4.0 / 3.0 * std::f64::consts::PI * v["r"].powi(3))
}

fn pythagorean(v: &FormulaValues) -> FormulaResult {
    FormulaResult::Number((v["a"] * v["a"] + v["b"] * v["b"]).sqrt())
}

fn def(
    name: &'static str,
    grade: &'static str,
    inputs: Vec<FormulaInput>,
    formula_text: &'static str,
    calc: fn(&FormulaValues) -> FormulaResult,
) -> FormulaDefinition {
    FormulaDefinition { name, grade, inputs, formula_text, calc }
}

lazy_static! {
    /// The full subject catalog, in UI listing order.
    pub static ref CATALOG: Vec<Subject> = vec![
        Subject {
            name: "mathematics",
            formulas: vec![
                (
                    "quadratic",
                    def(
                        "Quadratic Formula",
                        "10-12",
                        vec![
                            input("a (coefficient of x²)", "a"),
                            input("b (coefficient of x)", "b"),
                            input("c (constant)", "c"),
                        ],
                        "x = (-b ± √(b²-4ac)) / 2a",
                        quadratic,
                    ),
                ),
                (
                    "distance",
                    def(
                        "Distance Formula",
                        "9-10",
                        vec![
                            input("x₁", "x1"),
                            input("y₁", "y1"),
                            input("x₂", "x2"),
                            input("y₂", "y2"),
                        ],
                        "√((x₂-x₁)² + (y₂-y₁)²)",
                        distance,
                    ),
                ),
                (
                    "slope",
                    def(
                        "Slope of Line",
                        "8-10",
                        vec![
                            input("x₁", "x1"),
                            input("y₁", "y1"),
                            input("x₂", "x2"),
                            input("y₂", "y2"),
                        ],
                        "m = (y₂ - y₁) / (x₂ - x₁)",
                        slope,
                    ),
                ),
            ],
        },
        Subject {
            name: "physics",
            formulas: vec![
                (
                    "speed",
                    def(
                        "Speed",
                        "6-9",
                        vec![input("Distance (m)", "distance"), input("Time (s)", "time")],
                        "v = d / t",
                        speed,
                    ),
                ),
                (
                    "force",
                    def(
                        "Force (F = ma)",
                        "9-11",
                        vec![input("Mass (kg)", "m"), input("Acceleration (m/s²)", "a")],
                        "F = m × a",
                        force,
                    ),
                ),
                (
                    "kineticEnergy",
                    def(
                        "Kinetic Energy",
                        "9-11",
                        vec![input("Mass (kg)", "m"), input("Velocity (m/s)", "v")],
                        "KE = ½mv²",
                        kinetic_energy,
                    ),
                ),
                (
                    "ohmsLaw",
                    def(
                        "Ohm's Law",
                        "10-12",
                        vec![input("Current (A)", "i"), input("Resistance (Ω)", "r")],
                        "V = I × R",
                        ohms_law,
                    ),
                ),
            ],
        },
        Subject {
            name: "chemistry",
            formulas: vec![
                (
                    "moles",
                    def(
                        "Moles",
                        "9-11",
                        vec![input("Mass (g)", "mass"), input("Molar Mass (g/mol)", "molarMass")],
                        "n = m / M",
                        moles,
                    ),
                ),
                (
                    "density",
                    def(
                        "Density",
                        "8-10",
                        vec![input("Mass (g)", "mass"), input("Volume (cm³)", "volume")],
                        "ρ = m / V",
                        density,
                    ),
                ),
                (
                    "pH",
                    def(
                        "pH Calculation",
                        "11-12",
                        vec![input("H⁺ Concentration (mol/L)", "h")],
                        "pH = -log₁₀[H⁺]",
                        ph,
                    ),
                ),
            ],
        },
        Subject {
            name: "commerce",
            formulas: vec![
                (
                    "simpleInterest",
                    def(
                        "Simple Interest",
                        "7-10",
                        vec![
                            input("Principal (₹)", "p"),
                            input("Rate (% per annum)", "r"),
                            input("Time (years)", "t"),
                        ],
                        "SI = (P × R × T) / 100",
                        simple_interest,
                    ),
                ),
                (
                    "compoundInterest",
                    def(
                        "Compound Interest",
                        "8-12",
                        vec![
                            input("Principal (₹)", "p"),
                            input("Rate (% per annum)", "r"),
                            input("Time (years)", "t"),
                            input("Compounds per year", "n"),
                        ],
                        "CI = P(1 + r/100n)^(nt) - P",
                        compound_interest,
                    ),
                ),
                (
                    "profit",
                    def(
                        "Profit/Loss",
                        "6-9",
                        vec![input("Cost Price (₹)", "cp"), input("Selling Price (₹)", "sp")],
                        "Profit = SP - CP",
                        profit,
                    ),
                ),
                (
                    "profitPercent",
                    def(
                        "Profit %",
                        "7-10",
                        vec![input("Cost Price (₹)", "cp"), input("Selling Price (₹)", "sp")],
                        "Profit% = ((SP - CP) / CP) × 100",
                        profit_percent,
                    ),
                ),
            ],
        },
        Subject {
            name: "geometry",
            formulas: vec![
                (
                    "circleArea",
                    def(
                        "Area of Circle",
                        "6-8",
                        vec![input("Radius (r)", "r")],
                        "A = πr²",
                        circle_area,
                    ),
                ),
                (
                    "rectangleArea",
                    def(
                        "Area of Rectangle",
                        "5-7",
                        vec![input("Length", "l"), input("Width", "w")],
                        "A = l × w",
                        rectangle_area,
                    ),
                ),
                (
                    "triangleArea",
                    def(
                        "Area of Triangle",
                        "6-8",
                        vec![input("Base", "b"), input("Height", "h")],
                        "A = ½ × b × h",
                        triangle_area,
                    ),
                ),
                (
                    "sphereVolume",
                    def(
                        "Volume of Sphere",
                        "9-10",
                        vec![input("Radius (r)", "r")],
                        "V = (4/3)πr³",
                        sphere_volume,
                    ),
                ),
                (
                    "pythagorean",
                    def(
                        "Pythagorean Theorem",
                        "8-10",
                        vec![input("Side a", "a"), input("Side b", "b")],
                        "c = √(a² + b²)",
                        pythagorean,
                    ),
                ),
            ],
        },
    ];
}
