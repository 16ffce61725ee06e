use loan_sim_core::optimisation::{
    default_candidates, find_knee, find_knee_with_tolerance, knee_point, optimise,
    sweep_overpayments, KneeResult, OptimiseInput, SweepPoint, SweepSummary,
    DEFAULT_KNEE_TOLERANCE,
};
use loan_sim_core::LoanTerms;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn thirty_year() -> LoanTerms {
    LoanTerms::new(dec!(300000), dec!(0.06), 360)
}

fn point(candidate: Decimal, periods: u32, reduction: Decimal) -> SweepPoint {
    SweepPoint {
        candidate,
        periods_to_payoff: Some(periods),
        total_interest_paid: Some(Decimal::ZERO),
        percent_term_reduction: Some(reduction),
        interest_saved: None,
        paid_off: Some(true),
        error: None,
    }
}

fn synthetic(curve: &[(i64, i64)]) -> SweepSummary {
    SweepSummary {
        term_periods: 100,
        baseline_interest: None,
        points: curve
            .iter()
            .map(|(x, y)| point(Decimal::from(*x), (100 - *y) as u32, Decimal::from(*y)))
            .collect(),
    }
}

// ===========================================================================
// Sweep
// ===========================================================================

#[test]
fn test_sweep_preserves_candidate_order() {
    let candidates = vec![dec!(900), dec!(0), dec!(450), dec!(100), dec!(700), dec!(50)];
    let summary = sweep_overpayments(&thirty_year(), &candidates);
    let returned: Vec<Decimal> = summary.points.iter().map(|p| p.candidate).collect();
    assert_eq!(returned, candidates);
}

#[test]
fn test_sweep_reduction_is_monotonic_in_candidate() {
    let candidates: Vec<Decimal> = (0..=10).map(|i| Decimal::from(i * 100)).collect();
    let summary = sweep_overpayments(&thirty_year(), &candidates);
    for pair in summary.points.windows(2) {
        assert!(pair[1].periods_to_payoff <= pair[0].periods_to_payoff);
        assert!(pair[1].total_interest_paid <= pair[0].total_interest_paid);
        assert!(pair[1].percent_term_reduction >= pair[0].percent_term_reduction);
    }
}

#[test]
fn test_sweep_interest_saved_against_baseline() {
    let summary = sweep_overpayments(&thirty_year(), &[dec!(500)]);
    let p = &summary.points[0];
    let baseline = summary.baseline_interest.unwrap();
    assert_eq!(p.interest_saved.unwrap(), baseline - p.total_interest_paid.unwrap());
    assert!(p.interest_saved.unwrap() > Decimal::ZERO);
}

#[test]
fn test_sweep_failure_is_isolated() {
    let summary = sweep_overpayments(&thirty_year(), &[dec!(-10), dec!(100)]);
    assert!(summary.points[0].error.as_deref().unwrap().contains("negative"));
    assert_eq!(summary.points[0].periods_to_payoff, None);
    assert!(summary.points[1].is_ok());
}

#[test]
fn test_default_grid_drives_sweep() {
    let terms = thirty_year();
    let candidates = default_candidates(&terms).unwrap();
    let summary = sweep_overpayments(&terms, &candidates);
    assert_eq!(summary.len(), candidates.len());
    assert_eq!(summary.failures().count(), 0);
}

// ===========================================================================
// Knee detection
// ===========================================================================

#[test]
fn test_linear_reduction_curve_has_no_knee() {
    let summary = synthetic(&[(0, 0), (10, 5), (20, 10), (30, 15), (40, 20)]);
    assert_eq!(find_knee(&summary), KneeResult::NoKnee);
}

#[test]
fn test_sharp_elbow_is_found() {
    let summary = synthetic(&[(0, 0), (100, 40), (200, 45), (300, 48), (400, 50), (500, 51)]);
    let knee = find_knee(&summary);
    assert_eq!(knee.candidate(), Some(dec!(100)));
    match knee {
        KneeResult::Found(k) => {
            assert_eq!(k.index, 1);
            assert_eq!(k.periods_to_payoff, 60);
            assert_eq!(k.percent_term_reduction, dec!(40));
        }
        KneeResult::NoKnee => panic!("expected a knee"),
    }
}

#[test]
fn test_fewer_than_three_points_has_no_knee() {
    let summary = synthetic(&[(0, 0), (100, 30)]);
    assert_eq!(find_knee(&summary), KneeResult::NoKnee);
}

#[test]
fn test_equal_reductions_have_no_knee() {
    let summary = synthetic(&[(0, 12), (100, 12), (200, 12), (300, 12)]);
    assert_eq!(find_knee(&summary), KneeResult::NoKnee);
}

#[test]
fn test_failed_points_are_skipped_by_knee_detection() {
    let mut summary = synthetic(&[(0, 0), (100, 40), (200, 45), (300, 48)]);
    summary.points.insert(
        1,
        SweepPoint {
            candidate: dec!(50),
            periods_to_payoff: None,
            total_interest_paid: None,
            percent_term_reduction: None,
            interest_saved: None,
            paid_off: None,
            error: Some("boom".into()),
        },
    );
    let knee = find_knee(&summary);
    assert_eq!(knee.candidate(), Some(dec!(100)));
    if let KneeResult::Found(k) = knee {
        assert_eq!(k.index, 2);
    }
}

#[test]
fn test_mortgage_sweep_knee_is_interior() {
    let candidates: Vec<Decimal> = (0..=10).map(|i| Decimal::from(i * 100)).collect();
    let summary = sweep_overpayments(&thirty_year(), &candidates);
    let knee = find_knee(&summary).candidate().expect("diminishing returns curve has a knee");
    assert!(knee > Decimal::ZERO && knee < dec!(1000), "knee at {knee}");
}

#[test]
fn test_knee_within_one_step_of_true_elbow() {
    // Piecewise-linear curve that bends at x = 250, sampled every 100
    let samples: Vec<(Decimal, Decimal)> = (0..=10)
        .map(|i| {
            let x = Decimal::from(i * 100);
            let y = if x <= dec!(250) {
                x * dec!(0.2)
            } else {
                dec!(50) + (x - dec!(250)) * dec!(0.01)
            };
            (x, y)
        })
        .collect();
    let (idx, _) = knee_point(&samples, DEFAULT_KNEE_TOLERANCE).unwrap();
    assert!((samples[idx].0 - dec!(250)).abs() <= dec!(100));
}

#[test]
fn test_strict_tolerance_suppresses_knee() {
    let summary = synthetic(&[(0, 0), (10, 6), (20, 11), (30, 15)]);
    assert!(find_knee(&summary).is_found());
    assert_eq!(find_knee_with_tolerance(&summary, dec!(0.5)), KneeResult::NoKnee);
}

// ===========================================================================
// Optimise envelope
// ===========================================================================

#[test]
fn test_optimise_supplied_candidates() {
    let input = OptimiseInput {
        terms: thirty_year(),
        candidates: Some(vec![dec!(0), dec!(250), dec!(500), dec!(750), dec!(1000)]),
        knee_tolerance: None,
    };
    let out = optimise(&input).unwrap();
    assert_eq!(out.result.summary.len(), 5);
    assert_eq!(out.assumptions["candidates"], "supplied");
    assert!(out.result.knee.is_found());
}

#[test]
fn test_optimise_output_serialises_knee_sentinel() {
    let input = OptimiseInput {
        terms: thirty_year(),
        candidates: Some(vec![dec!(0), dec!(100)]),
        knee_tolerance: None,
    };
    let out = optimise(&input).unwrap();
    let json = serde_json::to_value(&out.result).unwrap();
    assert_eq!(json["knee"]["status"], "no_knee");
    assert!(out.warnings.iter().any(|w| w.contains("No distinguishable knee")));
}

#[test]
fn test_optimise_input_from_json() {
    let input: OptimiseInput = serde_json::from_str(
        r#"{
            "principal": "300000",
            "annual_rate": "0.06",
            "term_periods": 360,
            "candidates": ["0", "500"]
        }"#,
    )
    .unwrap();
    assert_eq!(input.candidates.unwrap().len(), 2);
    assert_eq!(input.knee_tolerance, None);
}
