//! Cooling Mars, fed surface layer.
//!
//! Runs the reference configuration for thirty days with a slab-cooling
//! surface temperature and a constant external supply, printing the state
//! of the surface layer once a day.
//!
//! Run with: cargo run --example roche_disk

use rochedisk::drivers::{SlabCooling, TemperatureModel};
use rochedisk::supply::SupplyRate;
use rochedisk::{run_simulation, RunConfig, RunMetadata, SimulationState};
use units::Time;

const SECONDS_PER_DAY: f64 = 86_400.0;

fn main() {
    println!("╔═══════════════════════════════════════════════════════╗");
    println!("║   Roche-limit dust disk around a cooling Mars         ║");
    println!("╚═══════════════════════════════════════════════════════╝\n");

    let mut config = RunConfig::default();
    config.grid.n_bins = 30;
    config.temperature = TemperatureModel::SlabCooling(SlabCooling::default());
    config.supply.rate = SupplyRate::Const { rate_kg_m2_s: 1.0e-12 };

    println!(
        "🪐 Orbit: {:.2} R_Mars, e = {:.2}, i = {:.2}",
        config.dynamics.orbital_radius_mars_radii, config.dynamics.eccentricity, config.dynamics.inclination
    );
    println!(
        "💿 Grid: {} bins over [{:.1e}, {:.1e}] m, Σ₀ = {:.1e} kg/m²\n",
        config.grid.n_bins, config.grid.s_min_m, config.grid.s_max_m, config.initial.column_density_kg_m2
    );

    let mut state = match SimulationState::new(config, RunMetadata::from_seed_name("roche-demo")) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("setup failed: {e}");
            return;
        }
    };

    let mut next_report = 0.0;
    let result = run_simulation(&mut state, Time::from_days(30.0), |diag| {
        if diag.time_s < next_report {
            return;
        }
        next_report += SECONDS_PER_DAY;
        println!(
            "day {:>5.1}: T = {:>6.0} K, a_blow = {:>9}, Σ = {:.3e} kg/m², τ = {:.3e}, blow-out {:.3e} kg/m²/s",
            diag.time_s / SECONDS_PER_DAY,
            diag.temperature_k,
            diag.blowout_size_m
                .map(|a| format!("{:.2} µm", a * 1.0e6))
                .unwrap_or_else(|| "none".to_string()),
            diag.column_density,
            diag.tau.unwrap_or(f64::NAN),
            diag.blowout_rate
        );
    });

    match result {
        Ok(summary) => {
            println!("\n=== Summary ===");
            println!("Steps: {}", summary.steps);
            println!("Final time: {:.2} days", summary.final_time_s / SECONDS_PER_DAY);
            if let Some(reason) = summary.stop_reason {
                println!("Stopped early: {reason}");
            }
            println!("Σ: {:.4e} kg/m²", summary.column_density);
            println!("Lost to blow-out: {:.4e} kg/m²", summary.cumulative_mass_lost_blowout);
            println!("Lost to sinks: {:.4e} kg/m²", summary.cumulative_mass_lost_sink);
            println!("Supplied: {:.4e} kg/m²", summary.cumulative_mass_supplied);
            println!(
                "Collision operators built: kernel {}, fragments {}",
                summary.kernel_builds, summary.fragment_builds
            );
        }
        Err(e) => eprintln!("run failed at t = {:.3e} s: {e}", state.time.to_seconds()),
    }
    state.teardown();
}
