use super::common::*;
use crate::verification::domain::{InvalidInput, ProductionMethod};
use crate::verification::evaluation::ratings::{
    AnomalySeverity, CorrelationRating, EfficiencyRating, RiskLevel,
};
use crate::verification::evaluation::{
    ConfigurationError, CreditDirective, EvaluationConfig, EvaluationError, FraudIndicator,
    PolicyGate, RiskFactor, VerificationEngine,
};

#[test]
fn approved_wind_report_clears_every_gate() {
    let verdict = engine()
        .evaluate(&approved_report())
        .expect("valid report evaluates");

    assert!(verdict.is_valid);
    assert_close(verdict.calculated_efficiency, 50.0);
    assert_close(verdict.seasonal_factor, 0.92);
    assert_close(verdict.expected_hydrogen_kg, 1035.0);
    assert_close(verdict.min_expected_hydrogen_kg, 1035.0 * 0.88);
    assert_close(verdict.max_expected_hydrogen_kg, 1035.0 * 1.12);
    assert_close(verdict.hydrogen_deviation, 35.0 / 1035.0);
    assert_close(verdict.efficiency_deviation, 0.0);
    assert_close(verdict.fraud_probability, 0.0);
    assert!((verdict.confidence - 0.969_785_035_778).abs() < 1e-9);
    assert!(verdict.confidence >= 0.96);

    assert_eq!(verdict.efficiency_rating, EfficiencyRating::Optimal);
    assert_eq!(verdict.correlation_rating, CorrelationRating::Perfect);
    assert_close(verdict.efficiency_score, 0.98);
    assert!(verdict.gates.iter().all(|outcome| outcome.passed));
    assert_eq!(verdict.risk.factors, vec![RiskFactor::NoSignificantRisks]);
    assert_eq!(verdict.risk.level, RiskLevel::Negligible);
    assert_close(verdict.anomaly.score, 0.0);
    assert_eq!(verdict.anomaly.severity, AnomalySeverity::None);
    assert_eq!(
        verdict.credit,
        CreditDirective::Issue { amount_kg: 1000.0 }
    );
    assert!(verdict.should_issue_credit());
    assert_eq!(
        verdict.recommendations,
        vec![
            "Production data validated successfully",
            "Monitor for consistency",
            "Verification complete",
        ]
    );
    assert!(verdict.summary().starts_with("approved with confidence 0.970"));
}

#[test]
fn validation_breakdown_averages_four_sub_scores() {
    let verdict = engine()
        .evaluate(&approved_report())
        .expect("valid report evaluates");
    let breakdown = verdict.validation_breakdown;

    assert_close(breakdown.energy_h2_correlation, 1.0 - 2.0 * 35.0 / 1035.0);
    assert_close(breakdown.efficiency_standard, 1.0);
    assert_close(breakdown.production_method_consistency, 1.0);
    assert_close(breakdown.seasonal_validation, 1.0);
    assert_close(verdict.base_confidence, breakdown.mean());
    assert_close(
        verdict.confidence,
        verdict.base_confidence * (1.0 - verdict.uncertainty.total),
    );
}

#[test]
fn uncertainty_shrinks_with_quantity_and_uses_method_table() {
    let verdict = engine()
        .evaluate(&approved_report())
        .expect("valid report evaluates");

    assert_close(verdict.uncertainty.energy, 1.0 / 51.0);
    assert_close(verdict.uncertainty.hydrogen, 1.0 / 1001.0);
    assert_close(verdict.uncertainty.method, 0.02);
    assert_close(
        verdict.uncertainty.total,
        (1.0 / 51.0 + 1.0 / 1001.0 + 0.02) / 3.0,
    );

    let tiny = report(0.5, 10.0, ProductionMethod::Wind, date(2025, 2, 10));
    let verdict = engine().evaluate(&tiny).expect("valid report evaluates");
    assert_close(verdict.uncertainty.energy, 0.05);
    assert_close(verdict.uncertainty.hydrogen, 0.05);
}

#[test]
fn july_wind_report_fails_on_hydrogen_deviation() {
    let july = report(10.0, 200.0, ProductionMethod::Wind, date(2025, 7, 4));
    let verdict = engine().evaluate(&july).expect("valid report evaluates");

    assert_close(verdict.calculated_efficiency, 50.0);
    assert_close(verdict.seasonal_factor, 1.10);
    assert!(verdict.hydrogen_deviation > 0.19 && verdict.hydrogen_deviation < 0.20);
    assert!(!verdict.is_valid);

    let failed: Vec<PolicyGate> = verdict
        .gates
        .iter()
        .filter(|outcome| !outcome.passed)
        .map(|outcome| outcome.gate)
        .collect();
    assert_eq!(
        failed,
        vec![PolicyGate::Confidence, PolicyGate::HydrogenDeviation]
    );
    assert_eq!(
        verdict.risk.factors,
        vec![RiskFactor::EnergyH2CorrelationMismatch]
    );
    assert_eq!(verdict.credit, CreditDirective::Withhold);
    assert_eq!(
        verdict.summary(),
        "rejected: failed confidence, hydrogen_deviation"
    );
}

#[test]
fn implausible_ratio_is_rejected_with_every_risk_factor() {
    let verdict = engine()
        .evaluate(&implausible_report())
        .expect("valid report evaluates");

    assert_close(verdict.calculated_efficiency, 200.0);
    assert!(!verdict.is_valid);
    assert_eq!(verdict.efficiency_rating, EfficiencyRating::Poor);
    assert_eq!(verdict.correlation_rating, CorrelationRating::Poor);
    assert_close(verdict.efficiency_score, 0.1);
    assert_eq!(
        verdict.risk.factors,
        vec![
            RiskFactor::EnergyH2CorrelationMismatch,
            RiskFactor::EfficiencyDeviation,
            RiskFactor::FraudIndicatorsDetected,
        ]
    );
    assert_eq!(verdict.risk.level, RiskLevel::Critical);
    assert_eq!(verdict.anomaly.severity, AnomalySeverity::Critical);
    assert_close(
        verdict.anomaly.score,
        verdict.hydrogen_deviation + verdict.efficiency_deviation,
    );

    let fraud = &verdict.fraud_analysis;
    assert_eq!(fraud.contribution(FraudIndicator::UnrealisticEfficiency), Some(0.8));
    assert_eq!(fraud.contribution(FraudIndicator::CorrelationMismatch), Some(0.7));
    assert_eq!(fraud.contribution(FraudIndicator::MethodInconsistency), Some(0.6));
    assert_eq!(fraud.contribution(FraudIndicator::RoundNumberSuspicion), Some(0.0));
    assert_eq!(fraud.contribution(FraudIndicator::EnergyInputSuspicion), Some(0.0));
    assert_close(fraud.score, 2.1 / 5.0);
    assert_close(verdict.fraud_probability, fraud.score);

    assert_eq!(
        verdict.recommendations.last().map(String::as_str),
        Some("Review production processes")
    );
    assert!(verdict
        .recommendations
        .contains(&"Optimize production efficiency parameters".to_string()));
}

#[test]
fn round_number_indicator_requires_more_than_a_thousand_kilograms() {
    let at_floor = engine()
        .evaluate(&approved_report())
        .expect("valid report evaluates");
    assert_eq!(
        at_floor
            .fraud_analysis
            .contribution(FraudIndicator::RoundNumberSuspicion),
        Some(0.0)
    );

    let above = report(49.5, 1100.0, ProductionMethod::Wind, date(2025, 2, 10));
    let verdict = engine().evaluate(&above).expect("valid report evaluates");
    assert_eq!(
        verdict
            .fraud_analysis
            .contribution(FraudIndicator::RoundNumberSuspicion),
        Some(0.3)
    );
    assert_close(verdict.fraud_analysis.score, 0.3 / 5.0);
    assert_eq!(
        verdict.fraud_analysis.triggered().collect::<Vec<_>>(),
        vec![FraudIndicator::RoundNumberSuspicion]
    );
}

#[test]
fn energy_outside_plausible_range_is_flagged() {
    let huge = report(12_000.0, 240_000.0, ProductionMethod::Wind, date(2025, 2, 10));
    let verdict = engine().evaluate(&huge).expect("valid report evaluates");

    assert_eq!(
        verdict
            .fraud_analysis
            .contribution(FraudIndicator::EnergyInputSuspicion),
        Some(0.5)
    );
}

#[test]
fn unknown_method_falls_back_to_wind_yield_with_neutral_consistency() {
    let other = report(50.0, 1000.0, ProductionMethod::Other, date(2025, 2, 10));
    let verdict = engine().evaluate(&other).expect("valid report evaluates");

    assert!(!verdict.method_recognized);
    assert_eq!(verdict.production_method, ProductionMethod::Other);
    assert_close(verdict.expected_hydrogen_kg, 1035.0);
    assert_close(verdict.validation_breakdown.production_method_consistency, 0.5);
    assert_close(verdict.uncertainty.method, 0.025);
    assert_eq!(verdict.fraud_analysis.indicators.len(), 4);
    assert_eq!(
        verdict
            .fraud_analysis
            .contribution(FraudIndicator::MethodInconsistency),
        None
    );
    assert!(!verdict.is_valid);
    assert!(verdict.confidence < 0.96);
}

#[test]
fn method_standard_drives_expected_yield() {
    let solar = report(50.0, 1000.0, ProductionMethod::Solar, date(2025, 2, 10));
    let verdict = engine().evaluate(&solar).expect("valid report evaluates");

    assert!(verdict.method_recognized);
    assert_close(verdict.expected_hydrogen_kg, 50.0 * 24.0 * 0.92);
    assert_close(
        verdict.validation_breakdown.production_method_consistency,
        1.0 - 2.0 / 7.0,
    );
}

#[test]
fn repeated_evaluation_is_byte_identical() {
    let engine = engine();
    for report in [approved_report(), implausible_report()] {
        let first = serde_json::to_vec(&engine.evaluate(&report).expect("evaluates"))
            .expect("serializes");
        let second = serde_json::to_vec(&engine.evaluate(&report).expect("evaluates"))
            .expect("serializes");
        assert_eq!(first, second);
    }
}

#[test]
fn non_positive_quantities_are_invalid_input() {
    let engine = engine();

    let no_hydrogen = report(10.0, 0.0, ProductionMethod::Wind, date(2025, 2, 10));
    assert_eq!(
        engine.evaluate(&no_hydrogen),
        Err(EvaluationError::InvalidInput(
            InvalidInput::NonPositiveHydrogen(0.0)
        ))
    );

    let negative_energy = report(-1.0, 100.0, ProductionMethod::Wind, date(2025, 2, 10));
    assert_eq!(
        engine.evaluate(&negative_energy),
        Err(EvaluationError::InvalidInput(
            InvalidInput::NonPositiveEnergy(-1.0)
        ))
    );

    let not_a_number = report(f64::NAN, 100.0, ProductionMethod::Wind, date(2025, 2, 10));
    assert!(matches!(
        engine.evaluate(&not_a_number),
        Err(EvaluationError::InvalidInput(
            InvalidInput::NonPositiveEnergy(_)
        ))
    ));
}

#[test]
fn overflowing_derived_quantities_are_invalid_input() {
    let engine = engine();

    // 1e307 MWh is finite, but the expected yield and kWh conversion overflow f64.
    let huge_energy = report(1e307, 1000.0, ProductionMethod::Wind, date(2025, 2, 10));
    assert!(matches!(
        engine.evaluate(&huge_energy),
        Err(EvaluationError::InvalidInput(InvalidInput::OutOfRange(_)))
    ));

    let huge_hydrogen = report(50.0, 1e308, ProductionMethod::Wind, date(2025, 2, 10));
    let verdict = engine
        .evaluate(&huge_hydrogen)
        .expect("finite derived values still evaluate");
    assert!(!verdict.is_valid);
    assert!(verdict.hydrogen_deviation.is_finite());
}

#[test]
fn engine_accepts_alternate_tables() {
    let mut config = EvaluationConfig::standard();
    config.seasonal.factors = [1.0; 12];
    let engine = VerificationEngine::new(config).expect("flat table is valid");

    let verdict = engine
        .evaluate(&approved_report())
        .expect("valid report evaluates");
    assert_close(verdict.seasonal_factor, 1.0);
    assert_close(verdict.expected_hydrogen_kg, 1125.0);
}

#[test]
fn engine_configuration_loads_from_json() {
    let raw = serde_json::to_string(&EvaluationConfig::standard()).expect("serializes");
    let config = EvaluationConfig::from_json(&raw).expect("standard tables parse");
    assert_eq!(config.standards.fallback_method, ProductionMethod::Wind);
    assert_close(config.seasonal.factor(7), 1.10);

    let engine = VerificationEngine::new(config).expect("valid configuration");
    assert!(engine
        .evaluate(&approved_report())
        .expect("valid report evaluates")
        .is_valid);
}

#[test]
fn engine_configuration_without_fallback_standard_is_fatal() {
    let mut value = serde_json::to_value(EvaluationConfig::standard()).expect("serializes");
    value["standards"]["standards"]
        .as_object_mut()
        .expect("standards map")
        .remove("wind");

    match EvaluationConfig::from_json(&value.to_string()) {
        Err(ConfigurationError::MissingFallbackStandard(ProductionMethod::Wind)) => {}
        other => panic!("expected missing fallback, got {other:?}"),
    }
}

#[test]
fn engine_configuration_rejects_out_of_range_seasonal_factor() {
    let mut value = serde_json::to_value(EvaluationConfig::standard()).expect("serializes");
    value["seasonal"]["factors"][6] = serde_json::json!(1.25);

    match EvaluationConfig::from_json(&value.to_string()) {
        Err(ConfigurationError::SeasonalFactorOutOfRange { month: 7, factor }) => {
            assert_close(factor, 1.25);
        }
        other => panic!("expected seasonal range error, got {other:?}"),
    }
}

#[test]
fn engine_configuration_rejects_malformed_json() {
    assert!(matches!(
        EvaluationConfig::from_json("{\"standards\":"),
        Err(ConfigurationError::Parse(_))
    ));
}
