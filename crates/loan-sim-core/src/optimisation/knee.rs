use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::optimisation::sweep::SweepSummary;
use crate::types::{Money, Percent};

/// Minimum normalised height above the chord for a point to count as a knee.
pub const DEFAULT_KNEE_TOLERANCE: Decimal = dec!(0.001);

/// The point of diminishing returns on the overpayment curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KneePoint {
    /// Position of the knee in `SweepSummary::points`.
    pub index: usize,
    pub candidate: Money,
    pub periods_to_payoff: u32,
    pub total_interest_paid: Money,
    pub percent_term_reduction: Percent,
    /// Normalised height of the knee above the first-to-last chord.
    pub distance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KneeResult {
    Found(KneePoint),
    NoKnee,
}

impl KneeResult {
    pub fn candidate(&self) -> Option<Money> {
        match self {
            KneeResult::Found(k) => Some(k.candidate),
            KneeResult::NoKnee => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, KneeResult::Found(_))
    }
}

fn normalise(value: Decimal, min: Decimal, range: Decimal) -> Decimal {
    (value - min) / range
}

/// Knee of a concave, increasing curve: the point farthest above the chord
/// joining the first and last points once both axes are scaled to [0, 1].
///
/// Points need not be sorted; they are ordered by x before the chord is
/// drawn. Returns the index into `points` and the normalised distance, or
/// `None` when there are fewer than 3 points, either axis is flat, or no point
/// clears the chord by more than `tolerance`.
pub fn knee_point(points: &[(Decimal, Decimal)], tolerance: Decimal) -> Option<(usize, Decimal)> {
    if points.len() < 3 {
        return None;
    }

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|a, b| points[*a].0.cmp(&points[*b].0));

    let (x_min, x_max) = (points[order[0]].0, points[order[order.len() - 1]].0);
    let y_min = points.iter().map(|p| p.1).min()?;
    let y_max = points.iter().map(|p| p.1).max()?;
    let x_range = x_max - x_min;
    let y_range = y_max - y_min;
    if x_range.is_zero() || y_range.is_zero() {
        return None;
    }

    let first_y = normalise(points[order[0]].1, y_min, y_range);
    let last_y = normalise(points[order[order.len() - 1]].1, y_min, y_range);
    let slope = last_y - first_y;

    let mut best: Option<(usize, Decimal)> = None;
    for &i in &order {
        let x = normalise(points[i].0, x_min, x_range);
        let y = normalise(points[i].1, y_min, y_range);
        let distance = y - (first_y + slope * x);
        if best.map_or(true, |(_, d)| distance > d) {
            best = Some((i, distance));
        }
    }

    best.filter(|(_, d)| *d > tolerance)
}

/// Locate the knee of the `(candidate, percent_term_reduction)` curve.
/// Failed sweep entries are left out of the curve.
pub fn find_knee(summary: &SweepSummary) -> KneeResult {
    find_knee_with_tolerance(summary, DEFAULT_KNEE_TOLERANCE)
}

pub fn find_knee_with_tolerance(summary: &SweepSummary, tolerance: Decimal) -> KneeResult {
    let curve = summary.reduction_curve();
    let xy: Vec<(Decimal, Decimal)> = curve.iter().map(|(_, x, y)| (*x, *y)).collect();

    let Some((pos, distance)) = knee_point(&xy, tolerance) else {
        return KneeResult::NoKnee;
    };

    let index = curve[pos].0;
    let point = &summary.points[index];
    match (point.periods_to_payoff, point.total_interest_paid, point.percent_term_reduction) {
        (Some(periods), Some(interest), Some(reduction)) => KneeResult::Found(KneePoint {
            index,
            candidate: point.candidate,
            periods_to_payoff: periods,
            total_interest_paid: interest,
            percent_term_reduction: reduction,
            distance,
        }),
        _ => KneeResult::NoKnee,
    }
}
