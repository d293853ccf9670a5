//! WASM bindings for the Roche-limit disk engine.
//!
//! # Architecture
//!
//! Runs are stored in thread-local storage (WASM is single-threaded).
//! Functions return opaque IDs for referencing mutable runs, and serializable
//! diagnostics for reading them.
//!
//! # Example Usage (JavaScript)
//!
//! ```javascript
//! const config = run_default_config();
//! config.supply.rate = { mode: "const", rate_kg_m2_s: 1e-12 };
//!
//! const runId = create_run(config, 42n);
//! const diag = run_step(runId, 600.0);
//! const summary = run_until(runId, 86400.0);
//! const finished = run_to_end(runId);
//! drop_run(runId);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wasm_bindgen::prelude::*;

use rochedisk::{run_simulation, step, DiskError, RunConfig, RunMetadata, SimulationState};
use units::Time;

// =============================================================================
// Serialization helpers
// =============================================================================

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsError::new(&e.to_string()))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsError> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsError::new(&e.to_string()))
}

fn disk_error(error: DiskError) -> JsError {
    JsError::new(&error.to_string())
}

fn not_found(run_id: u32) -> JsError {
    JsError::new(&format!("Run {} not found", run_id))
}

// =============================================================================
// Thread-local storage for runs
// =============================================================================

thread_local! {
    static RUNS: RefCell<HashMap<u32, SimulationState>> = RefCell::new(HashMap::new());
    static NEXT_RUN_ID: RefCell<u32> = const { RefCell::new(0) };
}

fn register(state: SimulationState) -> u32 {
    let id = NEXT_RUN_ID.with(|next_id| {
        let mut id = next_id.borrow_mut();
        let current = *id;
        *id += 1;
        current
    });

    RUNS.with(|runs| {
        runs.borrow_mut().insert(id, state);
    });

    id
}

fn create(config: JsValue, metadata: RunMetadata) -> Result<u32, JsError> {
    let config: RunConfig = from_js(config)?;
    let state = SimulationState::new(config, metadata).map_err(disk_error)?;
    Ok(register(state))
}

/// Run identity for JavaScript
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunInfo {
    pub id: String,
    pub seed_name: Option<String>,
    pub time_s: f64,
    pub step_index: u64,
    pub stopped: bool,
}

// =============================================================================
// Run management
// =============================================================================

/// The reference configuration, as a starting point for edits.
#[wasm_bindgen]
pub fn run_default_config() -> Result<JsValue, JsError> {
    to_js(&RunConfig::default())
}

/// Create a run from a configuration and a numeric seed.
///
/// # Arguments
/// * `config` - A RunConfig object; omitted fields take their defaults
/// * `seed` - Seed for the run identity and the excitation sampling
#[wasm_bindgen]
pub fn create_run(config: JsValue, seed: u64) -> Result<u32, JsError> {
    create(config, RunMetadata::from_seed(seed))
}

/// Create a run whose identity is derived from a name.
///
/// The same name and configuration always reproduce the same run.
#[wasm_bindgen]
pub fn create_run_from_seed_name(config: JsValue, seed_name: &str) -> Result<u32, JsError> {
    create(config, RunMetadata::from_seed_name(seed_name))
}

/// Create a run with an explicit UUID.
///
/// # Arguments
/// * `uuid_str` - A valid UUID string (e.g., "f47ac10b-58cc-4372-a567-0e02b2c3d479")
#[wasm_bindgen]
pub fn create_run_from_uuid(config: JsValue, uuid_str: &str) -> Result<u32, JsError> {
    let id =
        Uuid::parse_str(uuid_str).map_err(|e| JsError::new(&format!("Invalid UUID: {}", e)))?;
    create(config, RunMetadata { id, seed_name: None })
}

/// Release a run and its cached collision operators.
#[wasm_bindgen]
pub fn drop_run(run_id: u32) {
    RUNS.with(|runs| {
        if let Some(mut state) = runs.borrow_mut().remove(&run_id) {
            state.teardown();
        }
    });
}

// =============================================================================
// Stepping
// =============================================================================

/// Advance a run by one step.
///
/// # Arguments
/// * `run_id` - Run ID
/// * `dt_s` - Step length in seconds
///
/// # Returns
/// The step's diagnostics record
#[wasm_bindgen]
pub fn run_step(run_id: u32, dt_s: f64) -> Result<JsValue, JsError> {
    RUNS.with(|runs| {
        let mut runs = runs.borrow_mut();
        let state = runs.get_mut(&run_id).ok_or_else(|| not_found(run_id))?;
        let diag = step(state, Time::from_seconds(dt_s)).map_err(disk_error)?;
        to_js(&diag)
    })
}

/// Advance a run with its configured step until `t_end_s` or a stop.
///
/// # Returns
/// The run summary
#[wasm_bindgen]
pub fn run_until(run_id: u32, t_end_s: f64) -> Result<JsValue, JsError> {
    RUNS.with(|runs| {
        let mut runs = runs.borrow_mut();
        let state = runs.get_mut(&run_id).ok_or_else(|| not_found(run_id))?;
        let summary =
            run_simulation(state, Time::from_seconds(t_end_s), |_| {}).map_err(disk_error)?;
        to_js(&summary)
    })
}

/// Run to the configured end time and return the run summary.
#[wasm_bindgen]
pub fn run_to_end(run_id: u32) -> Result<JsValue, JsError> {
    RUNS.with(|runs| {
        let mut runs = runs.borrow_mut();
        let state = runs.get_mut(&run_id).ok_or_else(|| not_found(run_id))?;
        let summary = rochedisk::run_to_end(state, |_| {}).map_err(disk_error)?;
        to_js(&summary)
    })
}

// =============================================================================
// State queries
// =============================================================================

/// Diagnostics of the most recent step, or `null` before the first one.
#[wasm_bindgen]
pub fn run_diagnostics(run_id: u32) -> Result<JsValue, JsError> {
    RUNS.with(|runs| {
        let runs = runs.borrow();
        let state = runs.get(&run_id).ok_or_else(|| not_found(run_id))?;
        match &state.last {
            Some(diag) => to_js(diag),
            None => Ok(JsValue::NULL),
        }
    })
}

/// Identity and progress of a run.
#[wasm_bindgen]
pub fn run_info(run_id: u32) -> Result<JsValue, JsError> {
    RUNS.with(|runs| {
        let runs = runs.borrow();
        let state = runs.get(&run_id).ok_or_else(|| not_found(run_id))?;
        let metadata = &state.context.metadata;
        to_js(&RunInfo {
            id: metadata.id.to_string(),
            seed_name: metadata.seed_name.clone(),
            time_s: state.time.to_seconds(),
            step_index: state.step_index,
            stopped: state.is_stopped(),
        })
    })
}

/// Number of live runs.
#[wasm_bindgen]
pub fn run_count() -> usize {
    RUNS.with(|runs| runs.borrow().len())
}
