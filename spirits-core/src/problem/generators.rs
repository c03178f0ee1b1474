//! Problem generators, one per ProblemKind.
//!
//! Each generator is a stateless `fn(difficulty, rng) -> ProblemDraft`.
//! Number ranges scale with difficulty (1..=5). Answers are computed from
//! integers wherever possible so the stated operation holds exactly.

use rand::seq::SliceRandom;
use rand::Rng;

use super::{clamp_difficulty, format_number, MathProblem, ProblemDraft, ProblemKind};

/// Value of π used in geometry problems (students compute by hand)
pub const PI_APPROX: f64 = 3.14;

/// Generate a problem of the given kind
pub fn generate<R: Rng + ?Sized>(kind: ProblemKind, difficulty: u8, rng: &mut R) -> MathProblem {
    let d = clamp_difficulty(difficulty);
    let draft = match kind {
        ProblemKind::Addition => addition(d, rng),
        ProblemKind::Subtraction => subtraction(d, rng),
        ProblemKind::Multiplication => multiplication(d, rng),
        ProblemKind::Division => division(d, rng),
        ProblemKind::LinearEquation => linear_equation(d, rng),
        ProblemKind::TwoStepEquation => two_step_equation(d, rng),
        ProblemKind::Substitution => substitution(d, rng),
        ProblemKind::RectangleArea => rectangle_area(d, rng),
        ProblemKind::RectanglePerimeter => rectangle_perimeter(d, rng),
        ProblemKind::TriangleArea => triangle_area(d, rng),
        ProblemKind::CircleArea => circle_area(d, rng),
        ProblemKind::CircleCircumference => circle_circumference(d, rng),
        ProblemKind::Hypotenuse => hypotenuse(d, rng),
        ProblemKind::FractionAddition => fraction_addition(d, rng),
        ProblemKind::FractionMultiplication => fraction_multiplication(d, rng),
        ProblemKind::FractionOfQuantity => fraction_of_quantity(d, rng),
        ProblemKind::DecimalAddition => decimal_addition(d, rng),
        ProblemKind::DecimalMultiplication => decimal_multiplication(d, rng),
        ProblemKind::DecimalRounding => decimal_rounding(d, rng),
        ProblemKind::Limit => limit(d, rng),
        ProblemKind::IntervalMeasure => interval_measure(d, rng),
        ProblemKind::InductionSum => induction_sum(d, rng),
        ProblemKind::GeometricSeries => geometric_series(d, rng),
        ProblemKind::Derivative => derivative(d, rng),
        ProblemKind::Combinations => combinations(d, rng),
        ProblemKind::Probability => probability(d, rng),
        ProblemKind::Logarithm => logarithm(d, rng),
    };
    draft.finish(d, rng)
}

fn level(d: u8) -> usize {
    (clamp_difficulty(d) - 1) as usize
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.max(1)
}

/// Reduced "n/m" form
fn fraction_text(num: i64, den: i64) -> String {
    let g = gcd(num, den);
    let (n, m) = (num / g, den / g);
    if m == 1 {
        n.to_string()
    } else {
        format!("{n}/{m}")
    }
}

/// "3x", "x", "-x" style coefficient rendering
fn coef(c: i64, var: &str) -> String {
    match c {
        1 => var.to_string(),
        -1 => format!("-{var}"),
        _ => format!("{c}{var}"),
    }
}

// =====================================================
// Arithmetic
// =====================================================

fn addition<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let max = [20, 50, 100, 500, 1000][level(d)];
    let a: i64 = rng.gen_range(1..=max);
    let b: i64 = rng.gen_range(1..=max);
    let sum = a + b;
    ProblemDraft::new(ProblemKind::Addition, format!("{a} + {b} = ?"), sum as f64)
        .explain(format!("{a} + {b} = {sum}"))
        .mistakes([(sum + 10) as f64, (sum - 10) as f64, (a - b).abs() as f64])
}

fn subtraction<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let max = [20, 50, 100, 500, 1000][level(d)];
    let a: i64 = rng.gen_range(2..=max);
    let b: i64 = rng.gen_range(1..=a);
    let diff = a - b;
    ProblemDraft::new(ProblemKind::Subtraction, format!("{a} - {b} = ?"), diff as f64)
        .explain(format!("{a} - {b} = {diff}"))
        .mistakes([(a + b) as f64, (diff + 10) as f64, (diff - 10) as f64])
}

fn multiplication<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let max = [5, 9, 12, 20, 30][level(d)];
    let a: i64 = rng.gen_range(2..=max);
    let b: i64 = rng.gen_range(2..=max);
    let product = a * b;
    ProblemDraft::new(
        ProblemKind::Multiplication,
        format!("{a} × {b} = ?"),
        product as f64,
    )
    .explain(format!("{a} × {b} = {product}"))
    .mistakes([(a * (b + 1)) as f64, ((a - 1) * b) as f64, (a + b) as f64])
}

fn division<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let max = [5, 9, 12, 20, 30][level(d)];
    let divisor: i64 = rng.gen_range(2..=max);
    let quotient: i64 = rng.gen_range(1..=max);
    let dividend = divisor * quotient;
    ProblemDraft::new(
        ProblemKind::Division,
        format!("{dividend} ÷ {divisor} = ?"),
        quotient as f64,
    )
    .explain(format!("{divisor} × {quotient} = {dividend}, so {dividend} ÷ {divisor} = {quotient}"))
    .mistakes([
        (quotient + 1) as f64,
        (quotient - 1) as f64,
        (dividend - divisor) as f64,
    ])
}

// =====================================================
// Algebra
// =====================================================

fn linear_equation<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let a: i64 = rng.gen_range(2..=2 + 2 * d as i64);
    let x: i64 = if d >= 4 {
        let magnitude = rng.gen_range(1..=10);
        if rng.gen_bool(0.5) {
            -magnitude
        } else {
            magnitude
        }
    } else {
        rng.gen_range(1..=5 + 3 * d as i64)
    };
    let b: i64 = rng.gen_range(1..=10 * d as i64);
    let c = a * x + b;
    ProblemDraft::new(
        ProblemKind::LinearEquation,
        format!("Solve for x: {} + {b} = {c}", coef(a, "x")),
        x as f64,
    )
    .explain(format!(
        "Subtract {b}: {} = {}. Divide by {a}: x = {x}",
        coef(a, "x"),
        c - b
    ))
    .mistakes([(c - b) as f64, (c + b) as f64 / a as f64, (x + 1) as f64])
}

fn two_step_equation<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let a: i64 = rng.gen_range(2..=3 + d as i64);
    let x: i64 = rng.gen_range(1..=4 + 2 * d as i64);
    let b: i64 = rng.gen_range(1..=5 + d as i64);
    let c = a * (x + b);
    ProblemDraft::new(
        ProblemKind::TwoStepEquation,
        format!("Solve for x: {a}(x + {b}) = {c}"),
        x as f64,
    )
    .explain(format!(
        "Divide by {a}: x + {b} = {}. Subtract {b}: x = {x}",
        x + b
    ))
    .mistakes([(x + b) as f64, (x + 2 * b) as f64, (c - b) as f64])
}

fn substitution<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let a: i64 = rng.gen_range(1..=1 + d as i64);
    let b: i64 = rng.gen_range(1..=2 + 2 * d as i64);
    let k: i64 = rng.gen_range(1..=2 + d as i64);
    let value = a * k * k + b * k;
    ProblemDraft::new(
        ProblemKind::Substitution,
        format!("If f(x) = {}² + {}, what is f({k})?", coef(a, "x"), coef(b, "x")),
        value as f64,
    )
    .explain(format!("f({k}) = {a}·{k}² + {b}·{k} = {} + {} = {value}", a * k * k, b * k))
    .mistakes([
        (a * 2 * k + b * k) as f64,
        ((a * k) * (a * k) + b * k) as f64,
        (a * k * k) as f64,
    ])
}

// =====================================================
// Geometry
// =====================================================

fn rectangle_sides<R: Rng + ?Sized>(d: u8, rng: &mut R) -> (i64, i64) {
    let max = 5 + 3 * d as i64;
    (rng.gen_range(2..=max), rng.gen_range(2..=max))
}

fn rectangle_area<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let (w, h) = rectangle_sides(d, rng);
    let area = w * h;
    ProblemDraft::new(
        ProblemKind::RectangleArea,
        format!("A rectangle is {w} wide and {h} tall. What is its area?"),
        area as f64,
    )
    .explain(format!("Area = width × height = {w} × {h} = {area}"))
    .mistakes([(2 * (w + h)) as f64, (w + h) as f64, (area + w) as f64])
}

fn rectangle_perimeter<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let (w, h) = rectangle_sides(d, rng);
    let perimeter = 2 * (w + h);
    ProblemDraft::new(
        ProblemKind::RectanglePerimeter,
        format!("A rectangle is {w} wide and {h} tall. What is its perimeter?"),
        perimeter as f64,
    )
    .explain(format!("Perimeter = 2 × ({w} + {h}) = {perimeter}"))
    .mistakes([(w * h) as f64, (w + h) as f64, (2 * w + h) as f64])
}

fn triangle_area<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let max = 4 + 3 * d as i64;
    let base: i64 = rng.gen_range(2..=max);
    let mut height: i64 = rng.gen_range(2..=max);
    if (base * height) % 2 != 0 {
        height += 1;
    }
    let area = base * height / 2;
    ProblemDraft::new(
        ProblemKind::TriangleArea,
        format!("A triangle has base {base} and height {height}. What is its area?"),
        area as f64,
    )
    .explain(format!("Area = ½ × {base} × {height} = {area}"))
    .mistakes([(base * height) as f64, (base + height) as f64, (area + base) as f64])
}

fn circle_area<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let r: i64 = rng.gen_range(1..=2 + 2 * d as i64);
    let rf = r as f64;
    let area = PI_APPROX * rf * rf;
    ProblemDraft::new(
        ProblemKind::CircleArea,
        format!("A circle has radius {r}. Using π = 3.14, what is its area?"),
        area,
    )
    .precision(2)
    .step(1.0)
    .explain(format!(
        "Area = π × r² = 3.14 × {r}² = {}",
        format_number(area, 2)
    ))
    .mistakes([2.0 * PI_APPROX * rf, PI_APPROX * rf, PI_APPROX * 4.0 * rf * rf])
}

fn circle_circumference<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let r: i64 = rng.gen_range(1..=2 + 2 * d as i64);
    let rf = r as f64;
    let circumference = 2.0 * PI_APPROX * rf;
    ProblemDraft::new(
        ProblemKind::CircleCircumference,
        format!("A circle has radius {r}. Using π = 3.14, what is its circumference?"),
        circumference,
    )
    .precision(2)
    .step(1.0)
    .explain(format!(
        "Circumference = 2 × π × r = 2 × 3.14 × {r} = {}",
        format_number(circumference, 2)
    ))
    .mistakes([PI_APPROX * rf, PI_APPROX * rf * rf, 2.0 * rf])
}

const PYTHAGOREAN_TRIPLES: [(i64, i64, i64); 8] = [
    (3, 4, 5),
    (6, 8, 10),
    (5, 12, 13),
    (9, 12, 15),
    (8, 15, 17),
    (12, 16, 20),
    (7, 24, 25),
    (20, 21, 29),
];

fn hypotenuse<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let available = (2 + level(d) + 2).min(PYTHAGOREAN_TRIPLES.len());
    let (a, b, c) = PYTHAGOREAN_TRIPLES[rng.gen_range(0..available)];
    ProblemDraft::new(
        ProblemKind::Hypotenuse,
        format!("A right triangle has legs {a} and {b}. How long is the hypotenuse?"),
        c as f64,
    )
    .explain(format!(
        "c² = {a}² + {b}² = {} + {} = {}, so c = {c}",
        a * a,
        b * b,
        c * c
    ))
    .mistakes([(a + b) as f64, (c + 1) as f64, (c - 1) as f64])
}

// =====================================================
// Fractions
// =====================================================

fn denominators(d: u8) -> &'static [i64] {
    match clamp_difficulty(d) {
        1 => &[2, 4],
        2 => &[2, 3, 4, 5],
        3 => &[2, 3, 4, 5, 6, 8],
        _ => &[2, 3, 4, 5, 6, 8, 10, 12],
    }
}

fn proper_fraction<R: Rng + ?Sized>(d: u8, rng: &mut R) -> (i64, i64) {
    let den = *denominators(d).choose(rng).unwrap_or(&2);
    let num = rng.gen_range(1..den);
    (num, den)
}

fn fraction_addition<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let (a, b) = proper_fraction(d, rng);
    let (c, e) = proper_fraction(d, rng);
    let num = a * e + c * b;
    let den = b * e;
    let value = num as f64 / den as f64;
    ProblemDraft::new(
        ProblemKind::FractionAddition,
        format!("{a}/{b} + {c}/{e} = ? (as a decimal, 2 places)"),
        value,
    )
    .precision(2)
    .step(0.05)
    .explain(format!(
        "{a}/{b} + {c}/{e} = {num}/{den} = {} ≈ {}",
        fraction_text(num, den),
        format_number(value, 2)
    ))
    .mistakes([
        (a + c) as f64 / (b + e) as f64,
        (a + c) as f64 / (b * e) as f64,
        value + 1.0,
    ])
}

fn fraction_multiplication<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let (a, b) = proper_fraction(d, rng);
    let (c, e) = proper_fraction(d, rng);
    let num = a * c;
    let den = b * e;
    let value = num as f64 / den as f64;
    ProblemDraft::new(
        ProblemKind::FractionMultiplication,
        format!("{a}/{b} × {c}/{e} = ? (as a decimal, 2 places)"),
        value,
    )
    .precision(2)
    .step(0.05)
    .explain(format!(
        "Multiply across: {num}/{den} = {} ≈ {}",
        fraction_text(num, den),
        format_number(value, 2)
    ))
    .mistakes([
        (a * e) as f64 / (b * c) as f64,
        (a + c) as f64 / (b + e) as f64,
        (a * c) as f64 / (b + e) as f64,
    ])
}

fn fraction_of_quantity<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let (num, den) = proper_fraction(d, rng);
    let k: i64 = rng.gen_range(1..=3 + 2 * d as i64);
    let quantity = den * k;
    let answer = num * k;
    ProblemDraft::new(
        ProblemKind::FractionOfQuantity,
        format!("What is {num}/{den} of {quantity}?"),
        answer as f64,
    )
    .explain(format!(
        "{quantity} ÷ {den} = {k}, then {k} × {num} = {answer}"
    ))
    .mistakes([k as f64, (quantity - answer) as f64, (quantity * num) as f64])
}

// =====================================================
// Decimals
// =====================================================

fn decimal_addition<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let (scale, precision) = if d <= 2 { (10_i64, 1_u32) } else { (100_i64, 2_u32) };
    let max = [50, 200, 500, 2000, 10000][level(d)];
    let ai: i64 = rng.gen_range(1..=max);
    let bi: i64 = rng.gen_range(1..=max);
    let a = ai as f64 / scale as f64;
    let b = bi as f64 / scale as f64;
    let sum = (ai + bi) as f64 / scale as f64;
    ProblemDraft::new(
        ProblemKind::DecimalAddition,
        format!(
            "{} + {} = ?",
            format_number(a, precision),
            format_number(b, precision)
        ),
        sum,
    )
    .precision(precision)
    .step(0.1)
    .explain(format!(
        "Line up the decimal points: {} + {} = {}",
        format_number(a, precision),
        format_number(b, precision),
        format_number(sum, precision)
    ))
    .mistakes([
        (ai + bi) as f64 / (scale * 10) as f64,
        sum + 1.0,
        (ai + bi) as f64,
    ])
}

fn decimal_multiplication<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let ai: i64 = rng.gen_range(11..=9 + 10 * (d as i64 + 1));
    let (bi, b_scale, precision) = if d >= 3 {
        (rng.gen_range(2..=19_i64), 10_i64, 2_u32)
    } else {
        (rng.gen_range(2..=9_i64), 1_i64, 1_u32)
    };
    let a = ai as f64 / 10.0;
    let b = bi as f64 / b_scale as f64;
    let product = (ai * bi) as f64 / (10 * b_scale) as f64;
    ProblemDraft::new(
        ProblemKind::DecimalMultiplication,
        format!(
            "{} × {} = ?",
            format_number(a, 1),
            format_number(b, precision - 1)
        ),
        product,
    )
    .precision(precision)
    .step(0.1)
    .explain(format!(
        "{ai} × {bi} = {}, then place {precision} decimal digit(s): {}",
        ai * bi,
        format_number(product, precision)
    ))
    .mistakes([product * 10.0, product / 10.0, (ai * bi) as f64])
}

fn decimal_rounding<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let places: u32 = if d <= 2 { 1 } else { rng.gen_range(1..=2) };
    // value in thousandths; the digit block below the rounding place never sits at an exact half
    let div: i64 = 10_i64.pow(3 - places);
    let half = div / 2;
    let max = [10_000, 50_000, 100_000, 500_000, 1_000_000][level(d)];
    let mut vi: i64 = rng.gen_range(1001..=max);
    if vi % div == half {
        vi += 1;
    }
    let value = vi as f64 / 1000.0;
    let rounded_units = (vi + half) / div;
    let truncated_units = vi / div;
    let unit = 10f64.powi(places as i32);
    let answer = rounded_units as f64 / unit;
    ProblemDraft::new(
        ProblemKind::DecimalRounding,
        format!(
            "Round {} to {places} decimal place(s).",
            format_number(value, 3)
        ),
        answer,
    )
    .precision(places)
    .explain(format!(
        "Look at the next digit: {} rounds to {}",
        format_number(value, 3),
        format_number(answer, places)
    ))
    .mistakes([
        truncated_units as f64 / unit,
        (truncated_units + 1) as f64 / unit,
        (vi / 1000) as f64,
    ])
}

// =====================================================
// Higher concepts
// =====================================================

fn limit<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let a: i64 = rng.gen_range(1..=3 + d as i64);
    let c: i64 = *[1_i64, 2, 4, 5].choose(rng).unwrap_or(&1);
    let b: i64 = rng.gen_range(1..=9);
    let e: i64 = rng.gen_range(1..=9);
    let power = if d >= 4 { "n²" } else { "n" };
    let value = a as f64 / c as f64;
    ProblemDraft::new(
        ProblemKind::Limit,
        format!(
            "Evaluate lim(n→∞) ({} + {b}) / ({} + {e}).",
            coef(a, power),
            coef(c, power)
        ),
        value,
    )
    .precision(2)
    .step(0.25)
    .explain(format!(
        "Divide numerator and denominator by {power}; the constants vanish, leaving {a}/{c} = {}",
        format_number(value, 2)
    ))
    .mistakes([b as f64 / e as f64, (a + b) as f64 / (c + e) as f64, 0.0])
}

fn interval_measure<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let span = 3 + d as i64;
    let a: i64 = rng.gen_range(0..=5 * d as i64);
    let b = a + rng.gen_range(1..=span);
    let c: i64 = rng.gen_range(a..=b + 3);
    let e = c + rng.gen_range(1..=span);
    let overlap = (b.min(e) - a.max(c)).max(0);
    let measure = (b - a) + (e - c) - overlap;
    let with_rationals = d >= 3 && rng.gen_bool(0.5);
    let mut question = format!("What is the Lebesgue measure of [{a}, {b}] ∪ [{c}, {e}]");
    if with_rationals {
        question.push_str(&format!(" ∪ (ℚ ∩ [{}, {}])", e, e + span));
    }
    question.push('?');
    let mut explanation = format!(
        "Lengths {} and {} overlap by {overlap}, so the union has measure {measure}",
        b - a,
        e - c
    );
    if with_rationals {
        explanation.push_str("; the rationals are countable and add measure 0");
    }
    ProblemDraft::new(ProblemKind::IntervalMeasure, question, measure as f64)
        .explain(explanation)
        .mistakes([
            ((b - a) + (e - c)) as f64,
            (measure + span) as f64,
            (e.max(b) - a.min(c) + 1) as f64,
        ])
}

fn induction_sum<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let n: i64 = rng.gen_range(5..=10 + 20 * d as i64);
    if rng.gen_bool(0.5) {
        let sum = n * (n + 1) / 2;
        ProblemDraft::new(
            ProblemKind::InductionSum,
            format!("By induction, 1 + 2 + … + n = n(n+1)/2. What is 1 + 2 + … + {n}?"),
            sum as f64,
        )
        .explain(format!("{n} × {} / 2 = {sum}", n + 1))
        .mistakes([(n * (n - 1) / 2) as f64, (n * (n + 1)) as f64, (n * n / 2) as f64])
    } else {
        let last = 2 * n - 1;
        let sum = n * n;
        ProblemDraft::new(
            ProblemKind::InductionSum,
            format!("By induction, the first n odd numbers sum to n². What is 1 + 3 + … + {last}?"),
            sum as f64,
        )
        .explain(format!("{last} is the {n}th odd number, so the sum is {n}² = {sum}"))
        .mistakes([(last * last) as f64, ((n - 1) * (n - 1)) as f64, (n * (n + 1)) as f64])
    }
}

fn geometric_series<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let a: i64 = rng.gen_range(1..=2 + 2 * d as i64);
    let ratios: &[(i64, i64)] = if d >= 3 {
        &[(1, 2), (1, 4), (1, 5), (1, 10), (3, 4), (2, 3)]
    } else {
        &[(1, 2), (1, 4), (1, 10)]
    };
    let (p, q) = *ratios.choose(rng).unwrap_or(&(1, 2));
    // a / (1 - p/q) = a·q / (q - p)
    let num = a * q;
    let den = q - p;
    let value = num as f64 / den as f64;
    let r = p as f64 / q as f64;
    ProblemDraft::new(
        ProblemKind::GeometricSeries,
        format!(
            "Find the sum of the infinite series Σ {a}·({p}/{q})ᵏ for k = 0, 1, 2, … (2 decimal places)"
        ),
        value,
    )
    .precision(2)
    .step(0.5)
    .explain(format!(
        "|r| = {p}/{q} < 1, so the sum is a / (1 - r) = {a} / (1 - {p}/{q}) = {} ≈ {}",
        fraction_text(num, den),
        format_number(value, 2)
    ))
    .mistakes([a as f64 / r, a as f64 * (1.0 + r), a as f64 / (1.0 + r)])
}

fn derivative<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let max_power = if d >= 4 { 4 } else { 3 };
    let n: u32 = rng.gen_range(2..=max_power);
    let a: i64 = rng.gen_range(1..=1 + d as i64);
    let b: i64 = rng.gen_range(1..=5 + d as i64);
    let k: i64 = rng.gen_range(1..=3);
    let slope = a * n as i64 * k.pow(n - 1) + b;
    ProblemDraft::new(
        ProblemKind::Derivative,
        format!(
            "If f(x) = {}^{n} + {}, what is f'({k})?",
            coef(a, "x"),
            coef(b, "x")
        ),
        slope as f64,
    )
    .explain(format!(
        "f'(x) = {}·x^{} + {b}, so f'({k}) = {slope}",
        a * n as i64,
        n - 1
    ))
    .mistakes([
        (a * k.pow(n) + b * k) as f64,
        (a * n as i64 * k.pow(n) + b) as f64,
        (a * n as i64 * k.pow(n - 1)) as f64,
    ])
}

fn choose_count(n: u64, k: u64) -> u64 {
    let k = k.min(n - k);
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

fn combinations<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let n: u64 = rng.gen_range(4..=6 + 2 * d as u64);
    let k: u64 = rng.gen_range(1..=(2 + d as u64 / 2).min(n - 1));
    let count = choose_count(n, k);
    let permutations: u64 = (0..k).map(|i| n - i).product();
    ProblemDraft::new(
        ProblemKind::Combinations,
        format!("How many ways can you choose {k} items from {n} (order does not matter)?"),
        count as f64,
    )
    .explain(format!(
        "C({n}, {k}) = {n}! / ({k}! · {}!) = {count}",
        n - k
    ))
    .mistakes([permutations as f64, (n * k) as f64, choose_count(n, k.saturating_sub(1).max(1)) as f64])
}

fn probability<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let variant = rng.gen_range(0..if d >= 3 { 3 } else { 2 });
    match variant {
        0 => {
            let t: i64 = rng.gen_range(1..=4);
            let favourable = 6 - t;
            let value = favourable as f64 / 6.0;
            ProblemDraft::new(
                ProblemKind::Probability,
                format!("You roll one fair die. What is the probability of rolling more than {t}? (2 decimal places)"),
                value,
            )
            .precision(2)
            .step(0.05)
            .explain(format!(
                "{favourable} of 6 faces are greater than {t}: {} ≈ {}",
                fraction_text(favourable, 6),
                format_number(value, 2)
            ))
            .mistakes([1.0 - value, (favourable + 1) as f64 / 6.0, t as f64 / 6.0])
        }
        1 => {
            let coins: i32 = rng.gen_range(1..=4);
            let value = 0.5_f64.powi(coins);
            ProblemDraft::new(
                ProblemKind::Probability,
                format!("You flip {coins} fair coin(s). What is the probability that all land heads?"),
                value,
            )
            .precision(4)
            .step(0.05)
            .explain(format!(
                "Independent events multiply: (1/2)^{coins} = 1/{} = {}",
                2_i64.pow(coins as u32),
                format_number(value, 4)
            ))
            .mistakes([
                1.0 - value,
                0.5 / coins as f64,
                0.5_f64.powi(coins + 1),
            ])
        }
        _ => {
            let sum: i64 = rng.gen_range(2..=12);
            let favourable = 6 - (sum - 7).abs();
            let value = favourable as f64 / 36.0;
            ProblemDraft::new(
                ProblemKind::Probability,
                format!("You roll two fair dice. What is the probability that they sum to {sum}? (2 decimal places)"),
                value,
            )
            .precision(2)
            .step(0.02)
            .explain(format!(
                "{favourable} of 36 outcomes sum to {sum}: {} ≈ {}",
                fraction_text(favourable, 36),
                format_number(value, 2)
            ))
            .mistakes([1.0 / 11.0, favourable as f64 / 12.0, 1.0 - value])
        }
    }
}

fn logarithm<R: Rng + ?Sized>(d: u8, rng: &mut R) -> ProblemDraft {
    let base: i64 = *[2_i64, 3, 5, 10].choose(rng).unwrap_or(&2);
    let max_exp = match base {
        2 => 3 + 2 * d as u32,
        3 => 2 + d as u32,
        _ => 1 + d as u32,
    };
    let k: u32 = rng.gen_range(1..=max_exp);
    let power = base.pow(k);
    ProblemDraft::new(
        ProblemKind::Logarithm,
        format!("log_{base}({power}) = ?"),
        k as f64,
    )
    .explain(format!("{base}^{k} = {power}, so log_{base}({power}) = {k}"))
    .mistakes([(power / base) as f64, (k + 1) as f64, (k as i64 * base) as f64])
}
