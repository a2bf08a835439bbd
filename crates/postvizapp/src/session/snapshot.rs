use super::{MonitorData, MonitorSeries, PlaneRequest, Session, SurfaceInfo};
use crate::error::{PostvizError, Result};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::Path;

/// A scalar field and its value ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarField {
    pub name: String,
    #[serde(default)]
    pub unit: String,
    pub node_range: (f64, f64),
    pub cell_range: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorSet {
    pub name: String,
    #[serde(default)]
    pub iterations: Vec<f64>,
    #[serde(default)]
    pub series: Vec<MonitorSeries>,
}

/// Serialized solver state: what a session exposes to the object tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    #[serde(default)]
    pub scalar_fields: Vec<ScalarField>,
    #[serde(default)]
    pub vector_fields: Vec<String>,
    #[serde(default)]
    pub surfaces: Vec<SurfaceInfo>,
    #[serde(default)]
    pub monitors: Vec<MonitorSet>,
}

/// Session backed by a JSON snapshot.
///
/// Uses `RefCell` for interior mutability since the object tree is
/// single-threaded. Surfaces created on the "server" are appended to the
/// snapshot's surface list and removed again on delete.
pub struct SnapshotSession {
    id: String,
    data: RefCell<Snapshot>,
    server_log: RefCell<Vec<String>>,
    simulate_surface_failure: RefCell<bool>,
}

impl SnapshotSession {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            id: snapshot.id.clone(),
            data: RefCell::new(snapshot),
            server_log: RefCell::new(Vec::new()),
            simulate_surface_failure: RefCell::new(false),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Ok(Self::new(snapshot))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Current solver state, including surfaces created since loading.
    pub fn snapshot(&self) -> Snapshot {
        self.data.borrow().clone()
    }

    /// Every surface request the session received, oldest first.
    pub fn server_log(&self) -> Vec<String> {
        self.server_log.borrow().clone()
    }

    /// Make the solver silently drop surface creation requests.
    pub fn set_simulate_surface_failure(&self, simulate: bool) {
        *self.simulate_surface_failure.borrow_mut() = simulate;
    }

    fn field(&self, name: &str) -> Result<ScalarField> {
        self.data
            .borrow()
            .scalar_fields
            .iter()
            .find(|f| f.name == name)
            .cloned()
            .ok_or_else(|| PostvizError::Session(format!("Unknown field '{}'", name)))
    }

    fn add_surface(&self, name: &str, surface_type: &str, entry: String) {
        self.server_log.borrow_mut().push(entry);
        if *self.simulate_surface_failure.borrow() {
            return;
        }
        let mut data = self.data.borrow_mut();
        data.surfaces.retain(|s| s.name != name);
        data.surfaces.push(SurfaceInfo::new(name, surface_type));
    }
}

impl Session for SnapshotSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn scalar_fields(&self) -> Result<Vec<String>> {
        Ok(self
            .data
            .borrow()
            .scalar_fields
            .iter()
            .map(|f| f.name.clone())
            .collect())
    }

    fn vector_fields(&self) -> Result<Vec<String>> {
        Ok(self.data.borrow().vector_fields.clone())
    }

    fn surfaces(&self) -> Result<Vec<SurfaceInfo>> {
        Ok(self.data.borrow().surfaces.clone())
    }

    fn scalar_field_range(&self, field: &str, node_values: bool) -> Result<(f64, f64)> {
        let field = self.field(field)?;
        Ok(if node_values {
            field.node_range
        } else {
            field.cell_range
        })
    }

    fn monitor_set_names(&self) -> Result<Vec<String>> {
        Ok(self
            .data
            .borrow()
            .monitors
            .iter()
            .map(|m| m.name.clone())
            .collect())
    }

    fn monitor_data(&self, monitor_set: &str) -> Result<MonitorData> {
        self.data
            .borrow()
            .monitors
            .iter()
            .find(|m| m.name == monitor_set)
            .map(|m| MonitorData {
                iterations: m.iterations.clone(),
                series: m.series.clone(),
            })
            .ok_or_else(|| PostvizError::Session(format!("Unknown monitor set '{}'", monitor_set)))
    }

    fn field_unit(&self, field: &str) -> Result<String> {
        Ok(self.field(field)?.unit)
    }

    fn create_iso_surface(&self, name: &str, field: &str, iso_value: f64) -> Result<()> {
        self.add_surface(
            name,
            "iso-surf",
            format!("create iso-surface {name} field={field} iso_value={iso_value}"),
        );
        Ok(())
    }

    fn create_plane_surface(&self, name: &str, request: &PlaneRequest) -> Result<()> {
        let entry = match request {
            PlaneRequest::Axis { axis, value } => {
                format!("create plane-surface {name} {}={value}", axis.as_str())
            }
            PlaneRequest::PointAndNormal { point, normal } => {
                format!("create plane-surface {name} point={point:?} normal={normal:?}")
            }
        };
        self.add_surface(name, "plane-surf", entry);
        Ok(())
    }

    fn delete_surface(&self, name: &str) -> Result<()> {
        let mut data = self.data.borrow_mut();
        let before = data.surfaces.len();
        data.surfaces.retain(|s| s.name != name);
        if data.surfaces.len() == before {
            return Err(PostvizError::Session(format!(
                "Surface '{}' does not exist",
                name
            )));
        }
        self.server_log
            .borrow_mut()
            .push(format!("delete surface {name}"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_session;

    #[test]
    fn loads_fields_in_snapshot_order() {
        let session = sample_session();
        let fields = session.scalar_fields().unwrap();
        assert_eq!(fields[0], "pressure");
        assert!(fields.contains(&"x-coordinate".to_string()));
        assert_eq!(session.vector_fields().unwrap(), vec!["velocity"]);
    }

    #[test]
    fn range_depends_on_node_values() {
        let session = sample_session();
        let node = session.scalar_field_range("pressure", true).unwrap();
        let cell = session.scalar_field_range("pressure", false).unwrap();
        assert_ne!(node, cell);
    }

    #[test]
    fn unknown_field_is_a_session_error() {
        let session = sample_session();
        let err = session.scalar_field_range("vorticity", true).unwrap_err();
        assert!(matches!(err, PostvizError::Session(_)));
    }

    #[test]
    fn created_surfaces_show_up_until_deleted() {
        let session = sample_session();
        session.create_iso_surface("iso-1", "pressure", 0.5).unwrap();
        assert!(session.surface_names().unwrap().contains(&"iso-1".to_string()));

        session.delete_surface("iso-1").unwrap();
        assert!(!session.surface_names().unwrap().contains(&"iso-1".to_string()));
        assert_eq!(session.server_log().len(), 2);
    }

    #[test]
    fn simulated_failure_drops_creation() {
        let session = sample_session();
        session.set_simulate_surface_failure(true);
        session
            .create_plane_surface(
                "plane-1",
                &PlaneRequest::Axis {
                    axis: super::super::Axis::Z,
                    value: 0.0,
                },
            )
            .unwrap();
        assert!(!session.surface_names().unwrap().contains(&"plane-1".to_string()));
    }

    #[test]
    fn deleting_missing_surface_fails() {
        let session = sample_session();
        assert!(session.delete_surface("nope").is_err());
    }
}
