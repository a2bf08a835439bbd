//! # Session Boundary
//!
//! A [`Session`] is the connection to a running solver. The object tree only
//! touches it lazily: when an attribute such as `allowed_values` or `range` is
//! read, when a lazy default needs a field range, or when local surfaces are
//! created on the server for display.
//!
//! ## Implementations
//!
//! - [`snapshot::SnapshotSession`]: loads field metadata from a JSON snapshot and
//!   keeps server-side surfaces in memory. Used by the CLI and by tests.
//!
//! Everything here takes `&self`; implementations use interior mutability for
//! the few calls that change server state (surface creation and deletion).

pub mod snapshot;

use crate::error::Result;
use serde::{Deserialize, Serialize};

pub use snapshot::SnapshotSession;

/// A surface known to the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub surface_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<String>,
}

impl SurfaceInfo {
    pub fn new(name: impl Into<String>, surface_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            surface_type: surface_type.into(),
            zone_type: None,
        }
    }

    pub fn with_zone_type(mut self, zone_type: impl Into<String>) -> Self {
        self.zone_type = Some(zone_type.into());
        self
    }

    /// Zone surfaces that bound the domain, i.e. everything an outline shows.
    pub fn is_boundary_zone(&self) -> bool {
        self.surface_type == "zone-surf" && self.zone_type.as_deref() != Some("interior")
    }
}

/// Time series of one monitor set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonitorData {
    pub iterations: Vec<f64>,
    /// Named series, each aligned with `iterations`.
    pub series: Vec<MonitorSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Coordinate axis a plane surface is normal to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// How the solver should build a plane surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum PlaneRequest {
    /// Plane at a fixed coordinate: `xy-plane` is z = value, and so on.
    Axis { axis: Axis, value: f64 },
    PointAndNormal { point: [f64; 3], normal: [f64; 3] },
}

/// The solver as seen by the object tree.
pub trait Session {
    /// Identifies the session in the registry.
    fn id(&self) -> &str;

    fn scalar_fields(&self) -> Result<Vec<String>>;

    fn vector_fields(&self) -> Result<Vec<String>>;

    fn surfaces(&self) -> Result<Vec<SurfaceInfo>>;

    /// `(min, max)` of a scalar field, on nodes or on cells.
    fn scalar_field_range(&self, field: &str, node_values: bool) -> Result<(f64, f64)>;

    fn monitor_set_names(&self) -> Result<Vec<String>>;

    fn monitor_data(&self, monitor_set: &str) -> Result<MonitorData>;

    /// Unit label of a field, empty when the field is dimensionless.
    fn field_unit(&self, field: &str) -> Result<String>;

    fn create_iso_surface(&self, name: &str, field: &str, iso_value: f64) -> Result<()>;

    fn create_plane_surface(&self, name: &str, request: &PlaneRequest) -> Result<()>;

    fn delete_surface(&self, name: &str) -> Result<()>;

    /// Names of all surfaces, in solver order.
    fn surface_names(&self) -> Result<Vec<String>> {
        Ok(self.surfaces()?.into_iter().map(|s| s.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_zones_exclude_interior_and_created_surfaces() {
        assert!(SurfaceInfo::new("wall", "zone-surf")
            .with_zone_type("wall")
            .is_boundary_zone());
        assert!(!SurfaceInfo::new("int", "zone-surf")
            .with_zone_type("interior")
            .is_boundary_zone());
        assert!(!SurfaceInfo::new("iso", "iso-surf").is_boundary_zone());
    }

    #[test]
    fn plane_request_serializes_with_method_tag() {
        let request = PlaneRequest::Axis {
            axis: Axis::Z,
            value: 0.5,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["method"], "axis");
        assert_eq!(json["axis"], "z");
    }
}
