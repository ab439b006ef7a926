//! # Bolt Group Calculation
//!
//! In-plane shear per bolt by the elastic or ICR method, plus out-of-plane
//! tension from the plate neutral-axis distributor when the connection has
//! a bearing plate.
//!
//! Unlike welds, the bolt ICR analysis accepts loads with out-of-plane
//! components: shear is distributed from (Fy, Fz, Mx) and the tension from
//! (Fx, My, Mz) separately.
//!
//! ## Example
//!
//! ```rust
//! use joint_core::calculations::bolt::{analyze, BoltConnection};
//! use joint_core::calculations::AnalysisMethod;
//! use joint_core::geometry::{BoltGroup, Plate, Vec2};
//! use joint_core::loads::AppliedLoad;
//! use joint_core::settings::AnalysisSettings;
//!
//! let bolts = BoltGroup::from_pattern(3, 2, 75.0, 100.0, Vec2::default(), 20.0).unwrap();
//! let plate = Plate::from_dimensions(300.0, 200.0, Vec2::default());
//! let connection = BoltConnection::new(bolts, Some(plate)).unwrap();
//!
//! let load = AppliedLoad::shear_at(-60_000.0, 0.0, 0.0, 150.0);
//! let result = analyze(&connection, &load, AnalysisMethod::Icr, &AnalysisSettings::default()).unwrap();
//! assert!(result.icr.is_some());
//! assert!(result.max_shear() < 60_000.0);
//! ```

use serde::{Deserialize, Serialize};

use super::{attempt_icr, elastic_governs, AnalysisMethod, FallbackReason, IcrDiagnostics, MethodUsed};
use crate::errors::{JointError, JointResult};
use crate::geometry::{BoltGroup, Plate, Vec2};
use crate::loads::{AppliedLoad, EquilibriumTarget};
use crate::settings::AnalysisSettings;
use crate::solvers::tension::{self, TensionDistribution, TensionMethod};
use crate::solvers::{bolt_icr, elastic};

fn one_plane() -> u32 {
    1
}

/// Nominal bolt shear capacity and its resistance factor.
///
/// The ICR bolt law uses R_ult = nominal_capacity / resistance_factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltCapacity {
    pub nominal_capacity: f64,
    pub resistance_factor: f64,
}

impl BoltCapacity {
    pub fn ultimate(&self) -> f64 {
        self.nominal_capacity / self.resistance_factor
    }

    pub fn validate(&self) -> JointResult<()> {
        if !(self.nominal_capacity > 0.0) || !self.nominal_capacity.is_finite() {
            return Err(JointError::invalid_input(
                "capacity.nominal_capacity",
                self.nominal_capacity.to_string(),
                "Bolt capacity must be positive",
            ));
        }
        if !(self.resistance_factor > 0.0 && self.resistance_factor <= 1.0) {
            return Err(JointError::invalid_input(
                "capacity.resistance_factor",
                self.resistance_factor.to_string(),
                "Resistance factor must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

/// Bolt group plus the optional bearing plate and capacity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoltConnection {
    group: BoltGroup,
    plate: Option<Plate>,
    capacity: Option<BoltCapacity>,
    n_shear_planes: u32,
}

impl BoltConnection {
    /// Every bolt must sit at least d/2 inside each plate edge.
    pub fn new(group: BoltGroup, plate: Option<Plate>) -> JointResult<Self> {
        if let Some(plate) = &plate {
            plate.validate()?;
            let radius = group.diameter() / 2.0;
            for (i, p) in group.positions().iter().enumerate() {
                let clearance = (p.y - plate.y_min)
                    .min(plate.y_max - p.y)
                    .min(p.z - plate.z_min)
                    .min(plate.z_max - p.z);
                if clearance < radius {
                    return Err(JointError::invalid_input(
                        format!("positions[{}]", i),
                        format!("({}, {})", p.y, p.z),
                        format!("Bolt is within d/2 = {} of the plate edge", radius),
                    ));
                }
            }
        }
        Ok(BoltConnection {
            group,
            plate,
            capacity: None,
            n_shear_planes: 1,
        })
    }

    pub fn with_capacity(mut self, capacity: BoltCapacity) -> JointResult<Self> {
        capacity.validate()?;
        self.capacity = Some(capacity);
        Ok(self)
    }

    pub fn with_shear_planes(mut self, n_shear_planes: u32) -> JointResult<Self> {
        if n_shear_planes < 1 {
            return Err(JointError::invalid_input(
                "n_shear_planes",
                n_shear_planes.to_string(),
                "At least one shear plane is required",
            ));
        }
        self.n_shear_planes = n_shear_planes;
        Ok(self)
    }

    pub fn group(&self) -> &BoltGroup {
        &self.group
    }

    pub fn plate(&self) -> Option<&Plate> {
        self.plate.as_ref()
    }

    pub fn capacity(&self) -> Option<&BoltCapacity> {
        self.capacity.as_ref()
    }

    pub fn n_shear_planes(&self) -> u32 {
        self.n_shear_planes
    }
}

/// Input parameters for a bolt group.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "B-1",
///   "positions": [{"y": -75.0, "z": 0.0}, {"y": 0.0, "z": 0.0}, {"y": 75.0, "z": 0.0}],
///   "diameter": 20.0,
///   "plate": {"y_min": -120.0, "y_max": 120.0, "z_min": -60.0, "z_max": 60.0},
///   "load": {"fy": -50000.0, "location": {"x": 0.0, "y": 0.0, "z": 100.0}},
///   "method": "icr"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoltInput {
    /// User label for this bolt group (e.g., "B-1", "Splice")
    pub label: String,

    pub positions: Vec<Vec2>,

    pub diameter: f64,

    #[serde(default)]
    pub plate: Option<Plate>,

    #[serde(default)]
    pub capacity: Option<BoltCapacity>,

    #[serde(default = "one_plane")]
    pub n_shear_planes: u32,

    pub load: AppliedLoad,

    #[serde(default)]
    pub method: AnalysisMethod,
}

impl BoltInput {
    pub fn build_connection(&self) -> JointResult<BoltConnection> {
        let group = BoltGroup::new(self.positions.clone(), self.diameter)?;
        let mut connection =
            BoltConnection::new(group, self.plate)?.with_shear_planes(self.n_shear_planes)?;
        if let Some(capacity) = self.capacity {
            connection = connection.with_capacity(capacity)?;
        }
        Ok(connection)
    }
}

/// Forces and derived stresses at one bolt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltForce {
    pub position: Vec2,
    pub fy: f64,
    pub fz: f64,
    /// Axial tension (never negative)
    pub fx: f64,
    pub diameter: f64,
    pub n_shear_planes: u32,
}

impl BoltForce {
    pub fn shear(&self) -> f64 {
        self.fy.hypot(self.fz)
    }

    pub fn axial(&self) -> f64 {
        self.fx
    }

    pub fn resultant(&self) -> f64 {
        (self.fx * self.fx + self.fy * self.fy + self.fz * self.fz).sqrt()
    }

    /// Direction of the shear force in degrees, atan2(Fy, Fz)
    pub fn angle(&self) -> f64 {
        self.fy.atan2(self.fz).to_degrees()
    }

    /// Nominal shank area π(d/2)²
    pub fn area(&self) -> f64 {
        std::f64::consts::PI * (self.diameter / 2.0).powi(2)
    }

    pub fn shear_stress(&self) -> f64 {
        self.shear() / (self.area() * self.n_shear_planes.max(1) as f64)
    }

    pub fn axial_stress(&self) -> f64 {
        (self.fx / self.area()).max(0.0)
    }

    pub fn combined_stress(&self) -> f64 {
        self.shear_stress().hypot(self.axial_stress())
    }
}

/// Bolt group force results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoltResult {
    pub method_requested: AnalysisMethod,
    pub method_used: MethodUsed,
    pub forces: Vec<BoltForce>,
    /// Present when the connection has a plate
    pub tension: Option<TensionDistribution>,
    pub tension_method: TensionMethod,
    /// Present only when the ICR search produced the shear field
    pub icr: Option<IcrDiagnostics>,
}

fn max_of(forces: &[BoltForce], f: impl Fn(&BoltForce) -> f64) -> f64 {
    forces.iter().map(f).fold(0.0, f64::max)
}

impl BoltResult {
    pub fn max_shear(&self) -> f64 {
        max_of(&self.forces, BoltForce::shear)
    }

    pub fn max_axial(&self) -> f64 {
        max_of(&self.forces, BoltForce::axial)
    }

    pub fn max_resultant(&self) -> f64 {
        max_of(&self.forces, BoltForce::resultant)
    }

    pub fn max_shear_stress(&self) -> f64 {
        max_of(&self.forces, BoltForce::shear_stress)
    }

    pub fn max_axial_stress(&self) -> f64 {
        max_of(&self.forces, BoltForce::axial_stress)
    }

    pub fn max_combined_stress(&self) -> f64 {
        max_of(&self.forces, BoltForce::combined_stress)
    }

    /// Sum of bolt shear forces
    pub fn net_shear(&self) -> Vec2 {
        self.forces
            .iter()
            .fold(Vec2::default(), |acc, b| Vec2::new(acc.y + b.fy, acc.z + b.fz))
    }

    /// Counter-clockwise moment of the bolt shears about `point`
    pub fn net_moment_about(&self, point: Vec2) -> f64 {
        self.forces
            .iter()
            .map(|b| {
                let d = b.position.minus(point);
                d.y * b.fz - d.z * b.fy
            })
            .sum()
    }

    pub fn icr_point(&self) -> Option<Vec2> {
        self.icr.map(|d| d.icr_point)
    }
}

fn peak_shear(shears: &[Vec2]) -> f64 {
    shears.iter().map(Vec2::norm).fold(0.0, f64::max)
}

/// Build the connection from `input` and analyze it.
pub fn calculate(input: &BoltInput, settings: &AnalysisSettings) -> JointResult<BoltResult> {
    let connection = input.build_connection()?;
    analyze(&connection, &input.load, input.method, settings)
}

/// Analyze a bolt connection.
///
/// # Errors
///
/// - `MissingPlate` when the load has Fx, My or Mz at the centroid and the
///   connection has no plate
/// - `InvalidPlate` from the tension distributor
/// - `InvalidInput` for non-finite loads or invalid settings
pub fn analyze(
    connection: &BoltConnection,
    load: &AppliedLoad,
    method: AnalysisMethod,
    settings: &AnalysisSettings,
) -> JointResult<BoltResult> {
    load.validate()?;
    settings.validate()?;

    let group = connection.group();
    let target = EquilibriumTarget::new(load, group.properties().centroid, group.span());

    let tension = match connection.plate() {
        Some(plate) => Some(tension::distribute(group, plate, load, settings.tension_method)?),
        None => {
            let out_of_plane = target.out_of_plane_components();
            if !out_of_plane.is_empty() {
                return Err(JointError::missing_plate(out_of_plane.join(", ")));
            }
            None
        }
    };

    let (shears, method_used, icr) = match method {
        AnalysisMethod::Elastic => (elastic::bolt_forces(group, load)?, MethodUsed::Elastic, None),
        AnalysisMethod::Icr => {
            let r_ult = connection
                .capacity()
                .map_or(settings.reference_bolt_capacity, BoltCapacity::ultimate);
            let outcome = attempt_icr("bolt", &target, || {
                bolt_icr::solve(group, &target, settings.crawford_kulak, r_ult, &settings.search)
            });
            match outcome {
                Ok(solution) => {
                    let baseline = elastic::bolt_forces(group, load)?;
                    let tolerance = settings.search.tolerance;
                    if elastic_governs("bolt", peak_shear(&solution.forces), peak_shear(&baseline), tolerance) {
                        (baseline, MethodUsed::ElasticFallback(FallbackReason::ElasticGoverns), None)
                    } else {
                        let diagnostics = IcrDiagnostics::new(&solution, &target);
                        (solution.forces, MethodUsed::Icr, Some(diagnostics))
                    }
                }
                Err(reason) => (
                    elastic::bolt_forces(group, load)?,
                    MethodUsed::ElasticFallback(reason),
                    None,
                ),
            }
        }
    };

    let forces = group
        .positions()
        .iter()
        .zip(&shears)
        .enumerate()
        .map(|(i, (position, shear))| BoltForce {
            position: *position,
            fy: shear.y,
            fz: shear.z,
            fx: tension.as_ref().map_or(0.0, |t| t.tensions[i]),
            diameter: group.diameter(),
            n_shear_planes: connection.n_shear_planes(),
        })
        .collect();

    Ok(BoltResult {
        method_requested: method,
        method_used,
        forces,
        tension,
        tension_method: settings.tension_method,
        icr,
    })
}
