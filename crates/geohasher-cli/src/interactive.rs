use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use geohasher_core::models::CoveragePolicy;
use std::path::PathBuf;

/// Settings gathered by `geohasher cover --interactive`
#[derive(Debug)]
pub struct InteractiveCoverResult {
    pub precision: usize,
    pub policy: CoveragePolicy,
    pub output: PathBuf,
}

/// Prompt for precision, policy and output path
pub fn interactive_cover(
    default_precision: usize,
    default_policy: CoveragePolicy,
    default_output: &str,
) -> Result<Option<InteractiveCoverResult>> {
    println!("\n🧭 Geohash Coverage Setup\n");

    let precision: usize = Input::new()
        .with_prompt("Geohash precision (1-12)")
        .default(default_precision)
        .validate_with(|p: &usize| -> std::result::Result<(), &str> {
            if (1..=12).contains(p) {
                Ok(())
            } else {
                Err("Precision must be between 1 and 12")
            }
        })
        .interact_text()?;

    let policies = [
        CoveragePolicy::Intersects,
        CoveragePolicy::ContainsCenter,
        CoveragePolicy::FullyContained,
    ];
    let policy_options = vec![
        "Intersects - every cell that overlaps the polygon",
        "Contains center - cells whose center lies in the polygon",
        "Fully contained - cells entirely inside the polygon",
    ];
    let default_idx = policies.iter().position(|p| *p == default_policy).unwrap_or(0);
    let policy_idx = Select::new()
        .with_prompt("Coverage policy")
        .items(&policy_options)
        .default(default_idx)
        .interact()?;
    let policy = policies.get(policy_idx).copied().unwrap_or_default();

    let output: String = Input::new()
        .with_prompt("Output CSV path")
        .default(default_output.to_string())
        .interact_text()?;

    // Confirmation
    println!("\n📋 Coverage Summary\n");
    println!("  Precision:  {}", precision);
    println!("  Policy:     {}", policy);
    println!("  Output:     {}", output);
    println!();

    let confirmed = Confirm::new().with_prompt("Proceed?").default(true).interact()?;
    if !confirmed {
        return Ok(None);
    }

    Ok(Some(InteractiveCoverResult { precision, policy, output: PathBuf::from(output) }))
}
