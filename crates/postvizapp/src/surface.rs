//! Server-side surfaces.
//!
//! Items of a Graphics `Surfaces` container exist only locally until they are
//! needed for display. These helpers create them on the solver from their
//! definition (iso-value or plane) and delete them again. On the solver a
//! local surface is known under its lower-cased name.

use crate::attributes::AttrValue;
use crate::definitions::SURFACE;
use crate::error::{PostvizError, Result};
use crate::session::{Axis, PlaneRequest};
use crate::tree::{LocalSurfaces, NodeId, Tree, LOCAL_SURFACES_CONTAINER};
use std::rc::Rc;
use tracing::debug;

/// Name a local surface has on the solver.
pub fn name_on_server(local_name: &str) -> String {
    local_name.to_lowercase()
}

/// Solver name for a surface referenced by a graphics object: local surfaces
/// are mapped, solver surfaces are returned as-is.
pub fn remote_surface_name(tree: &Tree, name: &str) -> Result<String> {
    if tree.local_surface_names()?.iter().any(|local| local == name) {
        Ok(name_on_server(name))
    } else {
        Ok(name.to_string())
    }
}

/// Unit label of a field, from the session bound to the tree.
pub fn field_unit(tree: &Tree, field: &str) -> Result<String> {
    tree.session().field_unit(field)
}

/// Create the surface item at `surface` on the solver, replacing any solver
/// surface of the same name. Returns the solver name.
pub fn create_on_server(tree: &mut Tree, surface: NodeId) -> Result<String> {
    ensure_surface(tree, surface)?;
    let name = name_on_server(tree.name(surface)?);
    let session = tree.session();

    match read_str(tree, surface, "definition/type")?.as_deref() {
        Some("iso-surface") => {
            let field = read_str(tree, surface, "definition/iso_surface/field")?;
            let iso_value = read_at(tree, surface, "definition/iso_surface/iso_value")?.as_f64();
            let (Some(field), Some(iso_value)) = (field, iso_value) else {
                return Err(PostvizError::IncompleteIsoSurface);
            };
            delete_if_exists(tree, &name)?;
            session.create_iso_surface(&name, &field, iso_value)?;
        }
        Some("plane-surface") => {
            let request = plane_request(tree, surface)?;
            delete_if_exists(tree, &name)?;
            session.create_plane_surface(&name, &request)?;
        }
        other => {
            return Err(PostvizError::State(format!(
                "Unknown surface type '{}'",
                other.unwrap_or_default()
            )))
        }
    }

    if !session.surface_names()?.contains(&name) {
        return Err(PostvizError::SurfaceCreation);
    }
    debug!(surface = %name, "created surface on server");
    Ok(name)
}

/// Delete the surface item at `surface` from the solver.
pub fn delete_on_server(tree: &mut Tree, surface: NodeId) -> Result<()> {
    ensure_surface(tree, surface)?;
    let name = name_on_server(tree.name(surface)?);
    tree.session().delete_surface(&name)?;
    debug!(surface = %name, "deleted surface on server");
    Ok(())
}

/// Run `f` on the local surface item `name`, wherever the tree's local
/// surfaces live.
pub(crate) fn with_local_surface<T>(
    tree: &mut Tree,
    name: &str,
    f: impl FnOnce(&mut Tree, NodeId) -> Result<T>,
) -> Result<T> {
    let provider = match tree.local_surfaces() {
        LocalSurfaces::Shared(provider) => Some(Rc::clone(provider)),
        LocalSurfaces::Own => None,
    };
    match provider {
        Some(provider) => {
            let mut other = provider
                .try_borrow_mut()
                .map_err(|_| PostvizError::State("Local surface provider is busy".to_string()))?;
            let id = local_surface(&other, name)?;
            f(&mut other, id)
        }
        None => {
            let id = local_surface(tree, name)?;
            f(tree, id)
        }
    }
}

fn local_surface(tree: &Tree, name: &str) -> Result<NodeId> {
    let container = tree.child(tree.root(), LOCAL_SURFACES_CONTAINER)?;
    tree.find_item(container, name)?
        .ok_or_else(|| PostvizError::NotFound(format!("{}/{}", tree.path(container), name)))
}

fn ensure_surface(tree: &Tree, id: NodeId) -> Result<()> {
    if tree.object_spec(id)?.inherits(&SURFACE) {
        Ok(())
    } else {
        Err(PostvizError::State(format!("{} is not a surface", tree.path(id))))
    }
}

fn delete_if_exists(tree: &Tree, name: &str) -> Result<()> {
    let session = tree.session();
    if session.surface_names()?.iter().any(|s| s == name) {
        session.delete_surface(name)?;
    }
    Ok(())
}

fn plane_request(tree: &mut Tree, surface: NodeId) -> Result<PlaneRequest> {
    let base = "definition/plane_surface";
    let method = read_str(tree, surface, &format!("{base}/creation_method"))?;
    let request = match method.as_deref() {
        Some("point-and-normal") => PlaneRequest::PointAndNormal {
            point: read_xyz(tree, surface, &format!("{base}/point"))?,
            normal: read_xyz(tree, surface, &format!("{base}/normal"))?,
        },
        Some("yz-plane") => PlaneRequest::Axis {
            axis: Axis::X,
            value: read_f64(tree, surface, &format!("{base}/yz_plane/x"))?,
        },
        Some("zx-plane") => PlaneRequest::Axis {
            axis: Axis::Y,
            value: read_f64(tree, surface, &format!("{base}/zx_plane/y"))?,
        },
        _ => PlaneRequest::Axis {
            axis: Axis::Z,
            value: read_f64(tree, surface, &format!("{base}/xy_plane/z"))?,
        },
    };
    Ok(request)
}

fn read_at(tree: &mut Tree, from: NodeId, path: &str) -> Result<AttrValue> {
    let mut current = from;
    for segment in path.split('/') {
        current = tree.child(current, segment)?;
    }
    tree.read(current)
}

fn read_str(tree: &mut Tree, from: NodeId, path: &str) -> Result<Option<String>> {
    Ok(read_at(tree, from, path)?.as_str().map(str::to_string))
}

fn read_f64(tree: &mut Tree, from: NodeId, path: &str) -> Result<f64> {
    Ok(read_at(tree, from, path)?.as_f64().unwrap_or_default())
}

fn read_xyz(tree: &mut Tree, from: NodeId, path: &str) -> Result<[f64; 3]> {
    Ok([
        read_f64(tree, from, &format!("{path}/x"))?,
        read_f64(tree, from, &format!("{path}/y"))?,
        read_f64(tree, from, &format!("{path}/z"))?,
    ])
}
