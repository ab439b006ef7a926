//! # Weld Groups
//!
//! A weld group is a set of discretized weld elements (midpoint, arc length,
//! unit tangent) plus the weld kind. Group properties are computed once when
//! the group is built; a different geometry means a new `WeldGroup`.
//!
//! ## Example
//!
//! ```rust
//! use joint_core::geometry::{FilletWeld, Vec2, WeldGroup, WeldKind, WeldPath};
//!
//! // All-around fillet weld on a 100 (z) x 200 (y) rectangular tube
//! let path = WeldPath::rectangle(100.0, 200.0, Vec2::new(0.0, 0.0));
//! let kind = WeldKind::Fillet(FilletWeld::from_leg(6.0).unwrap());
//! let group = WeldGroup::from_paths(&[path], kind, 200).unwrap();
//!
//! assert!((group.properties().total_length - 600.0).abs() < 1e-9);
//! assert!(group.properties().centroid.norm() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use super::{extent, GroupProperties, Vec2, POSITION_TOLERANCE};
use crate::errors::{JointError, JointResult};

/// Throat-to-leg ratio of an equal-leg 45° fillet
pub const FILLET_THROAT_RATIO: f64 = 0.707;

/// Tolerance on the length of element tangents
const TANGENT_TOLERANCE: f64 = 1e-6;

/// Fillet weld size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilletWeld {
    /// Leg size w
    pub leg: f64,
    /// Effective throat a
    pub throat: f64,
}

impl FilletWeld {
    /// Equal-leg fillet from its leg size: a = 0.707·w
    pub fn from_leg(leg: f64) -> JointResult<Self> {
        let weld = FilletWeld {
            leg,
            throat: leg * FILLET_THROAT_RATIO,
        };
        weld.validate()?;
        Ok(weld)
    }

    /// Equal-leg fillet from its throat: w = a / 0.707
    pub fn from_throat(throat: f64) -> JointResult<Self> {
        let weld = FilletWeld {
            leg: throat / FILLET_THROAT_RATIO,
            throat,
        };
        weld.validate()?;
        Ok(weld)
    }

    pub fn validate(&self) -> JointResult<()> {
        positive("leg", self.leg, "Weld leg must be positive")?;
        positive("throat", self.throat, "Weld throat must be positive")
    }
}

/// Weld kind. Only [`WeldKind::Fillet`] may be analysed with the ICR method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WeldKind {
    /// Fillet weld (elastic or ICR)
    Fillet(FilletWeld),
    /// Partial joint penetration groove weld (elastic only)
    Pjp { throat: f64 },
    /// Complete joint penetration groove weld (elastic only)
    Cjp { throat: f64 },
    /// Plug weld with total faying-surface area (elastic only)
    Plug { area: f64 },
    /// Slot weld with total faying-surface area (elastic only)
    Slot { area: f64 },
}

impl WeldKind {
    /// Lower-case label ("fillet", "pjp", ...)
    pub fn name(&self) -> &'static str {
        match self {
            WeldKind::Fillet(_) => "fillet",
            WeldKind::Pjp { .. } => "pjp",
            WeldKind::Cjp { .. } => "cjp",
            WeldKind::Plug { .. } => "plug",
            WeldKind::Slot { .. } => "slot",
        }
    }

    pub fn as_fillet(&self) -> Option<&FilletWeld> {
        match self {
            WeldKind::Fillet(fillet) => Some(fillet),
            _ => None,
        }
    }

    pub fn validate(&self) -> JointResult<()> {
        match self {
            WeldKind::Fillet(fillet) => fillet.validate(),
            WeldKind::Pjp { throat } | WeldKind::Cjp { throat } => {
                positive("throat", *throat, "Weld throat must be positive")
            }
            WeldKind::Plug { area } | WeldKind::Slot { area } => {
                positive("area", *area, "Plug/slot weld area must be positive")
            }
        }
    }

    /// Effective throat for a path of the given total length.
    ///
    /// Plug and slot welds spread their area evenly over the path so the
    /// centroid and second moments use the same weighting as the area.
    fn effective_throat(&self, total_length: f64) -> f64 {
        match self {
            WeldKind::Fillet(fillet) => fillet.throat,
            WeldKind::Pjp { throat } | WeldKind::Cjp { throat } => *throat,
            WeldKind::Plug { area } | WeldKind::Slot { area } => *area / total_length,
        }
    }
}

/// One discretized piece of weld.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeldElement {
    /// Midpoint of the piece
    pub position: Vec2,
    /// Arc length of the piece
    pub length: f64,
    /// Unit tangent along the weld
    pub tangent: Vec2,
}

impl WeldElement {
    fn validate(&self, index: usize) -> JointResult<()> {
        if !self.position.is_finite() {
            return Err(JointError::invalid_input(
                format!("elements[{}].position", index),
                format!("({}, {})", self.position.y, self.position.z),
                "Element coordinates must be finite",
            ));
        }
        if !(self.length > 0.0) || !self.length.is_finite() {
            return Err(JointError::invalid_input(
                format!("elements[{}].length", index),
                self.length.to_string(),
                "Element arc length must be positive and finite",
            ));
        }
        if (self.tangent.norm() - 1.0).abs() > TANGENT_TOLERANCE {
            return Err(JointError::invalid_input(
                format!("elements[{}].tangent", index),
                format!("({}, {})", self.tangent.y, self.tangent.z),
                "Element tangent must be a unit vector",
            ));
        }
        Ok(())
    }
}

/// Straight-segment weld path (open or closed polyline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeldPath {
    pub vertices: Vec<Vec2>,
    pub closed: bool,
}

impl WeldPath {
    pub fn open(vertices: Vec<Vec2>) -> Self {
        WeldPath {
            vertices,
            closed: false,
        }
    }

    pub fn closed(vertices: Vec<Vec2>) -> Self {
        WeldPath {
            vertices,
            closed: true,
        }
    }

    /// Single straight weld line
    pub fn line(start: Vec2, end: Vec2) -> Self {
        WeldPath::open(vec![start, end])
    }

    /// Closed rectangle, `width` along z and `height` along y.
    pub fn rectangle(width: f64, height: f64, center: Vec2) -> Self {
        let hw = width / 2.0;
        let hh = height / 2.0;
        WeldPath::closed(vec![
            Vec2::new(center.y - hh, center.z - hw),
            Vec2::new(center.y - hh, center.z + hw),
            Vec2::new(center.y + hh, center.z + hw),
            Vec2::new(center.y + hh, center.z - hw),
        ])
    }

    fn segments(&self) -> Vec<(Vec2, Vec2)> {
        let mut segs: Vec<(Vec2, Vec2)> =
            self.vertices.windows(2).map(|w| (w[0], w[1])).collect();
        if self.closed && self.vertices.len() > 2 {
            if let (Some(last), Some(first)) = (self.vertices.last(), self.vertices.first()) {
                segs.push((*last, *first));
            }
        }
        segs
    }

    /// Total path length
    pub fn length(&self) -> f64 {
        self.segments().iter().map(|(a, b)| b.distance_to(*a)).sum()
    }

    /// Split the path into roughly `count` equal-length elements.
    ///
    /// Each straight segment gets a share proportional to its length (at
    /// least one element), so tangents are exact and corners are not cut.
    pub fn discretize(&self, count: usize) -> JointResult<Vec<WeldElement>> {
        if self.vertices.len() < 2 {
            return Err(JointError::degenerate_geometry(
                "weld path",
                format!("needs at least two vertices, got {}", self.vertices.len()),
            ));
        }
        if let Some(bad) = self.vertices.iter().find(|v| !v.is_finite()) {
            return Err(JointError::invalid_input(
                "vertices",
                format!("({}, {})", bad.y, bad.z),
                "Path coordinates must be finite",
            ));
        }
        let total = self.length();
        if total <= POSITION_TOLERANCE {
            return Err(JointError::degenerate_geometry("weld path", "path has zero length"));
        }
        let count = count.max(1);

        let mut elements = Vec::with_capacity(count);
        for (a, b) in self.segments() {
            let seg_len = b.distance_to(a);
            if seg_len <= POSITION_TOLERANCE {
                continue;
            }
            let tangent = b.minus(a).scaled(1.0 / seg_len);
            let n = ((count as f64) * seg_len / total).round().max(1.0) as usize;
            let ds = seg_len / n as f64;
            for i in 0..n {
                let s = (i as f64 + 0.5) * ds;
                elements.push(WeldElement {
                    position: Vec2::new(a.y + tangent.y * s, a.z + tangent.z * s),
                    length: ds,
                    tangent,
                });
            }
        }
        Ok(elements)
    }
}

/// Discretized weld group with its cached properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeldGroup {
    elements: Vec<WeldElement>,
    kind: WeldKind,
    throat: f64,
    properties: GroupProperties,
    span: f64,
}

impl WeldGroup {
    /// Build a group from pre-discretized elements.
    pub fn new(elements: Vec<WeldElement>, kind: WeldKind) -> JointResult<Self> {
        kind.validate()?;
        if elements.is_empty() {
            return Err(JointError::degenerate_geometry(
                "weld group",
                "at least one weld element is required",
            ));
        }
        for (i, el) in elements.iter().enumerate() {
            el.validate(i)?;
        }

        let total_length: f64 = elements.iter().map(|e| e.length).sum();
        let throat = kind.effective_throat(total_length);
        let properties = GroupProperties::from_weighted(
            "weld group",
            elements.iter().map(|e| (e.position, throat * e.length, e.length)),
        )?;
        let (span_y, span_z) = extent(elements.iter().map(|e| &e.position));

        Ok(WeldGroup {
            elements,
            kind,
            throat,
            properties,
            span: span_y.max(span_z),
        })
    }

    /// Discretize one or more paths into a single group.
    pub fn from_paths(paths: &[WeldPath], kind: WeldKind, discretization: usize) -> JointResult<Self> {
        if paths.is_empty() {
            return Err(JointError::degenerate_geometry(
                "weld group",
                "at least one weld path is required",
            ));
        }
        let total: f64 = paths.iter().map(WeldPath::length).sum();
        let mut elements = Vec::new();
        for path in paths {
            let share = if total > 0.0 {
                ((discretization as f64) * path.length() / total).round() as usize
            } else {
                discretization
            };
            elements.extend(path.discretize(share)?);
        }
        WeldGroup::new(elements, kind)
    }

    pub fn elements(&self) -> &[WeldElement] {
        &self.elements
    }

    pub fn kind(&self) -> &WeldKind {
        &self.kind
    }

    /// Effective throat used to weight every element
    pub fn throat(&self) -> f64 {
        self.throat
    }

    pub fn properties(&self) -> &GroupProperties {
        &self.properties
    }

    /// Largest extent of the element midpoints along y or z
    pub fn span(&self) -> f64 {
        self.span
    }

    /// Element area throat × arc length
    pub fn element_area(&self, index: usize) -> f64 {
        self.throat * self.elements[index].length
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

fn positive(field: &str, value: f64, reason: &str) -> JointResult<()> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(JointError::invalid_input(field, value.to_string(), reason));
    }
    Ok(())
}
