//! Depth models: predicted cut depth from process parameters and nozzle geometry.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use awj_types::{AwjResult, ParameterSpace, ValidationError};

/// Describes one model input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelParameter {
    /// Canonical name used in results (e.g. "pressure").
    pub name: &'static str,
    /// Column-style alias accepted on input (e.g. "P (MPa)").
    pub label: &'static str,
    pub unit: &'static str,
}

impl ModelParameter {
    pub const fn new(name: &'static str, label: &'static str, unit: &'static str) -> Self {
        Self { name, label, unit }
    }

    /// True if `key` names this parameter, by canonical name or label.
    pub fn matches(&self, key: &str) -> bool {
        key == self.name || key == self.label
    }
}

/// Model output for one parameter vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted depth of cut, in the same unit as the desired depth.
    pub depth: f64,
    /// Non-negative cost of undesirable traits (energy, abrasive use).
    pub secondary_cost: f64,
}

/// A deterministic depth predictor.
///
/// `predict` receives the optimizable vector in the order of `parameters()`
/// and the fixed inputs in the order of `fixed_inputs()`. Bounds are enforced
/// by the caller.
pub trait DepthModel: Send + Sync {
    /// Optimizable parameters in vector layout.
    fn parameters(&self) -> &[ModelParameter];

    /// Fixed (non-searched) inputs in vector layout.
    fn fixed_inputs(&self) -> &[ModelParameter];

    fn predict(&self, params: &[f64], fixed: &[f64]) -> Prediction;

    /// Domain check for fixed inputs. Lengths are checked by the caller.
    fn validate_fixed(&self, fixed: &[f64]) -> AwjResult<()> {
        for (spec, &value) in self.fixed_inputs().iter().zip(fixed) {
            if !value.is_finite() {
                return Err(ValidationError::InvalidFixedInput {
                    name: spec.name.to_string(),
                    message: format!("value {value} is not finite"),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Domain check for resolved ranges, laid out as `parameters()`.
    ///
    /// `predict` must stay finite everywhere inside the ranges that pass.
    fn validate_ranges(&self, _space: &ParameterSpace) -> AwjResult<()> {
        Ok(())
    }
}

/// Empirical coefficients of the abrasive jet energy balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbrasiveJetCoefficients {
    /// Orifice discharge coefficient.
    pub discharge_coefficient: f64,
    /// Fraction of jet momentum transferred to the abrasive.
    pub momentum_efficiency: f64,
    /// kg/m^3
    pub water_density: f64,
    /// Energy needed to remove a unit volume of workpiece (J/m^3).
    pub specific_erosion_energy: f64,
}

impl Default for AbrasiveJetCoefficients {
    fn default() -> Self {
        Self {
            discharge_coefficient: 0.7,
            momentum_efficiency: 0.8,
            water_density: 1000.0,
            specific_erosion_energy: 1.2e10,
        }
    }
}

const AWJ_PARAMETERS: [ModelParameter; 3] = [
    ModelParameter::new("pressure", "P (MPa)", "MPa"),
    ModelParameter::new("flow_rate", "mf (kg/min)", "kg/min"),
    ModelParameter::new("traverse_rate", "v (mm/min)", "mm/min"),
];

const AWJ_FIXED: [ModelParameter; 2] = [
    ModelParameter::new("nozzle_diameter", "df (mm)", "mm"),
    ModelParameter::new("orifice_diameter", "do (mm)", "mm"),
];

/// Energy-balance depth model for abrasive water-jet cutting.
///
/// The water jet leaves the orifice at `vj = sqrt(2P / rho)`. Abrasive fed at
/// `ma` is accelerated by momentum exchange to `va = eta * vj / (1 + ma / mw)`.
/// The kinetic energy it delivers per unit length of cut, spread over the
/// focusing tube bore `df`, erodes depth `h = ma * va^2 / (2 v eps df)`.
/// A worn (wider) focusing tube therefore cuts shallower.
///
/// Secondary cost is hydraulic energy per metre of cut (MJ/m) plus abrasive
/// mass per metre of cut (kg/m).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbrasiveJetModel {
    pub coefficients: AbrasiveJetCoefficients,
}

impl AbrasiveJetModel {
    pub fn new(coefficients: AbrasiveJetCoefficients) -> Self {
        Self { coefficients }
    }

    /// Safe operating ranges of the machine.
    pub fn default_space() -> ParameterSpace {
        ParameterSpace::new()
            .add("pressure", 100.0, 400.0, "MPa")
            .add("flow_rate", 0.1, 1.0, "kg/min")
            .add("traverse_rate", 100.0, 5000.0, "mm/min")
    }

    /// Water jet velocity (m/s) at a pump pressure in MPa.
    pub fn jet_velocity(&self, pressure_mpa: f64) -> f64 {
        (2.0 * pressure_mpa * 1e6 / self.coefficients.water_density).sqrt()
    }

    /// Water mass flow (kg/s) through an orifice of diameter `orifice_mm`.
    pub fn water_mass_flow(&self, pressure_mpa: f64, orifice_mm: f64) -> f64 {
        let c = &self.coefficients;
        let d = orifice_mm * 1e-3;
        let area = PI / 4.0 * d * d;
        c.discharge_coefficient * c.water_density * area * self.jet_velocity(pressure_mpa)
    }
}

impl DepthModel for AbrasiveJetModel {
    fn parameters(&self) -> &[ModelParameter] {
        &AWJ_PARAMETERS
    }

    fn fixed_inputs(&self) -> &[ModelParameter] {
        &AWJ_FIXED
    }

    fn predict(&self, params: &[f64], fixed: &[f64]) -> Prediction {
        let c = &self.coefficients;
        let (pressure, flow_rate, traverse_rate) = (params[0], params[1], params[2]);
        let (nozzle_mm, orifice_mm) = (fixed[0], fixed[1]);

        let abrasive = flow_rate / 60.0; // kg/s
        let traverse = traverse_rate / 60_000.0; // m/s

        let vj = self.jet_velocity(pressure);
        let water = self.water_mass_flow(pressure, orifice_mm);
        let abrasive_velocity = c.momentum_efficiency * vj / (1.0 + abrasive / water);

        let energy_per_length = 0.5 * abrasive * abrasive_velocity * abrasive_velocity / traverse;
        let depth_m = energy_per_length / (c.specific_erosion_energy * nozzle_mm * 1e-3);

        let hydraulic_power = pressure * 1e6 * water / c.water_density;
        let secondary_cost = hydraulic_power / traverse * 1e-6 + abrasive / traverse;

        Prediction {
            depth: depth_m * 1e3,
            secondary_cost,
        }
    }

    fn validate_fixed(&self, fixed: &[f64]) -> AwjResult<()> {
        for (spec, &value) in AWJ_FIXED.iter().zip(fixed) {
            if !value.is_finite() || value <= 0.0 {
                return Err(ValidationError::InvalidFixedInput {
                    name: spec.name.to_string(),
                    message: format!("diameter must be finite and positive, got {value}"),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Pressure and traverse rate must stay strictly positive, abrasive flow
    /// non-negative.
    fn validate_ranges(&self, space: &ParameterSpace) -> AwjResult<()> {
        for (spec, strict) in space.iter().zip([true, false, true]) {
            let ok = if strict { spec.low > 0.0 } else { spec.low >= 0.0 };
            if !ok {
                let bound = if strict { "positive" } else { "non-negative" };
                return Err(ValidationError::InvalidBounds {
                    parameter: spec.name.clone(),
                    low: spec.low,
                    high: spec.high,
                    reason: format!("{} requires a {bound} lower bound", spec.name),
                }
                .into());
            }
        }
        Ok(())
    }
}
