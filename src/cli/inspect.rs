//! Inspect command implementation.

use super::CliError;
use super::output::format_colonies;
use colonysim::Snapshot;
use colonysim::invariants::check_invariants;
use std::path::Path;

/// Execute the inspect command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded or still breaks an
/// invariant after repair.
pub(crate) fn execute(path: &Path) -> Result<(), CliError> {
    let snapshot = Snapshot::load(path)?;
    let galaxy = &snapshot.galaxy;

    println!("Snapshot: {}", path.display());
    println!("  Turn: {}", galaxy.turn);
    println!("  Seed: {}", galaxy.seed);
    println!("  Transports in flight: {}", galaxy.transports.iter().filter(|t| t.in_flight()).count());
    println!();
    print!("{}", format_colonies(galaxy));

    let violations = check_invariants(galaxy);
    if violations.is_empty() {
        println!();
        println!("All invariants hold.");
        return Ok(());
    }
    for violation in &violations {
        eprintln!("  {violation}");
    }
    Err(CliError::new(format!(
        "{} invariant violation(s) after repair",
        violations.len()
    )))
}
