use crate::infra::parse_date;
use chrono::{Local, NaiveDate};
use clap::Args;
use h2_verify::error::AppError;
use h2_verify::verification::{
    EvaluationConfig, ProductionMethod, ProductionReport, VerificationEngine, VerificationVerdict,
};
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct VerifyArgs {
    /// Electrical energy fed to the electrolyser, in MWh
    #[arg(long)]
    pub(crate) energy_mwh: f64,
    /// Hydrogen produced, in kg
    #[arg(long)]
    pub(crate) hydrogen_kg: f64,
    /// Production method (wind, solar, hydro); anything else is scored as unrecognized
    #[arg(long)]
    pub(crate) method: String,
    /// Production date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Engine configuration JSON to use instead of the built-in tables
    #[arg(long)]
    pub(crate) engine_config: Option<PathBuf>,
    /// Print the full verdict as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_verify(args: VerifyArgs) -> Result<(), AppError> {
    let VerifyArgs {
        energy_mwh,
        hydrogen_kg,
        method,
        date,
        engine_config,
        json,
    } = args;

    let engine = match engine_config {
        Some(path) => VerificationEngine::new(EvaluationConfig::from_path(path)?)?,
        None => VerificationEngine::standard(),
    };

    let report = ProductionReport {
        energy_input_mwh: energy_mwh,
        hydrogen_output_kg: hydrogen_kg,
        production_method: ProductionMethod::parse(&method),
        production_date: date.unwrap_or_else(|| Local::now().date_naive()),
    };
    let verdict = engine.evaluate(&report)?;

    if json {
        let rendered = serde_json::to_string_pretty(&verdict).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        print!("{}", render_summary(&report, &verdict));
    }
    Ok(())
}

pub(crate) fn render_summary(report: &ProductionReport, verdict: &VerificationVerdict) -> String {
    let mut out = String::new();
    let method = if verdict.method_recognized {
        format!("{} (recognized)", report.production_method.display_name())
    } else {
        format!(
            "{} (unrecognized, scored against fallback standard)",
            report.production_method.display_name()
        )
    };
    let triggered: Vec<&str> = verdict
        .fraud_analysis
        .triggered()
        .map(|indicator| indicator.label())
        .collect();
    let risk_factors: Vec<&str> = verdict.risk.factors.iter().map(|f| f.label()).collect();

    let _ = writeln!(out, "Production verification");
    let _ = writeln!(out, "- Method: {method}");
    let _ = writeln!(
        out,
        "- Input: {} MWh -> {} kg on {}",
        report.energy_input_mwh, report.hydrogen_output_kg, report.production_date
    );
    let _ = writeln!(
        out,
        "- Efficiency: {:.2} kWh/kg ({}, score {:.2})",
        verdict.calculated_efficiency,
        verdict.efficiency_rating.label(),
        verdict.efficiency_score
    );
    let _ = writeln!(
        out,
        "- Expected output: {:.1} kg ({:.1} - {:.1}), seasonal factor {:.2}",
        verdict.expected_hydrogen_kg,
        verdict.min_expected_hydrogen_kg,
        verdict.max_expected_hydrogen_kg,
        verdict.seasonal_factor
    );
    let _ = writeln!(
        out,
        "- Hydrogen deviation: {:.2}% ({})",
        verdict.hydrogen_deviation * 100.0,
        verdict.correlation_rating.label()
    );
    if triggered.is_empty() {
        let _ = writeln!(
            out,
            "- Fraud score: {:.3} (no indicators triggered)",
            verdict.fraud_probability
        );
    } else {
        let _ = writeln!(
            out,
            "- Fraud score: {:.3} ({})",
            verdict.fraud_probability,
            triggered.join(", ")
        );
    }
    let _ = writeln!(
        out,
        "- Confidence: {:.3} (base {:.3}, uncertainty {:.3})",
        verdict.confidence, verdict.base_confidence, verdict.uncertainty.total
    );

    let _ = writeln!(out, "Gates:");
    for outcome in &verdict.gates {
        let mark = if outcome.passed { "pass" } else { "FAIL" };
        let _ = writeln!(
            out,
            "  [{mark}] {} {:.3}",
            outcome.gate.label(),
            outcome.observed
        );
    }

    let decision = if verdict.is_valid {
        "APPROVED"
    } else {
        "REJECTED"
    };
    let _ = writeln!(out, "Decision: {decision} ({})", verdict.summary());
    let _ = writeln!(
        out,
        "Risk: {} ({})",
        verdict.risk.level.label(),
        risk_factors.join(", ")
    );
    let _ = writeln!(out, "Recommendations:");
    for line in &verdict.recommendations {
        let _ = writeln!(out, "  - {line}");
    }
    out
}
