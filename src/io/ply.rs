//! PLY (Stanford polygon) format support.
//!
//! Faces are loaded as facets without triangulation. Scalar vertex and face
//! properties other than the coordinates and the index list are loaded as
//! attributes: floating-point properties become scalar float attributes
//! (a size field `h`, a level-set function), integer properties become
//! integer attributes. Saving writes those attributes back.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{BridgeError, ElementKind, Result};
use crate::mesh::HostMesh;

const COORDINATES: [&str; 3] = ["x", "y", "z"];
const INDEX_LISTS: [&str; 2] = ["vertex_indices", "vertex_index"];

/// Load a mesh from a PLY file.
///
/// # Example
///
/// ```no_run
/// use meshbridge::io::ply;
///
/// let mesh = ply::load("bunny.ply").unwrap();
/// let h = mesh.vertices.attributes().float("h");
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<HostMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    read(&mut BufReader::new(file)).map_err(|message| BridgeError::LoadError {
        path: path.to_path_buf(),
        message,
    })
}

/// Parse a mesh from PLY data (ASCII or binary).
pub fn read<R: BufRead>(reader: &mut R) -> std::result::Result<HostMesh, String> {
    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(reader).map_err(|e| e.to_string())?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| "PLY file has no vertex element".to_string())?;

    let mut mesh = HostMesh::new();
    for vertex in vertex_element {
        let mut c = [0.0; 3];
        for (k, name) in COORDINATES.iter().enumerate() {
            c[k] = get_float_property(vertex, name)
                .ok_or_else(|| format!("vertex missing {name} coordinate"))?;
        }
        mesh.vertices.add_vertex(Point3::new(c[0], c[1], c[2]));
    }
    load_attributes(&mut mesh, ElementKind::Vertex, vertex_element, &COORDINATES)?;

    if let Some(face_element) = ply.payload.get("face") {
        let nv = mesh.vertices.nb();
        for (f, face) in face_element.iter().enumerate() {
            let indices = INDEX_LISTS
                .iter()
                .find_map(|name| get_list_property(face, name))
                .ok_or_else(|| "face missing vertex_indices property".to_string())?;
            if let Some(&v) = indices.iter().find(|&&v| v >= nv) {
                return Err(format!("face {f} references invalid vertex index {v}"));
            }
            mesh.facets.add(&indices);
        }
        load_attributes(&mut mesh, ElementKind::Facet, face_element, &INDEX_LISTS)?;
    }

    mesh.connect();
    Ok(mesh)
}

/// Copy every scalar property not in `skip` into an attribute of `kind`.
fn load_attributes(
    mesh: &mut HostMesh,
    kind: ElementKind,
    elements: &[DefaultElement],
    skip: &[&str],
) -> std::result::Result<(), String> {
    let Some(first) = elements.first() else {
        return Ok(());
    };
    for (name, property) in first.iter() {
        if skip.contains(&name.as_str()) {
            continue;
        }
        let store = mesh.attributes_mut(kind);
        let written = if is_integer(property) {
            let values = elements
                .iter()
                .map(|e| get_int_property(e, name))
                .collect::<Option<Vec<i32>>>()
                .ok_or_else(|| format!("property {name} is not set on every element"))?;
            store.set_int(kind, name, values)
        } else if get_float_property(first, name).is_some() {
            let values = elements
                .iter()
                .map(|e| get_float_property(e, name))
                .collect::<Option<Vec<f64>>>()
                .ok_or_else(|| format!("property {name} is not set on every element"))?;
            store.set_float(kind, name, 1, values)
        } else {
            continue;
        };
        written.map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn is_integer(property: &Property) -> bool {
    matches!(
        property,
        Property::Int(_)
            | Property::UInt(_)
            | Property::Short(_)
            | Property::UShort(_)
            | Property::Char(_)
            | Property::UChar(_)
    )
}

fn get_int_property(element: &DefaultElement, name: &str) -> Option<i32> {
    match element.get(name)? {
        Property::Int(v) => Some(*v),
        Property::UInt(v) => i32::try_from(*v).ok(),
        Property::Short(v) => Some(i32::from(*v)),
        Property::UShort(v) => Some(i32::from(*v)),
        Property::Char(v) => Some(i32::from(*v)),
        Property::UChar(v) => Some(i32::from(*v)),
        _ => None,
    }
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

fn get_list_property(element: &DefaultElement, name: &str) -> Option<Vec<usize>> {
    match element.get(name)? {
        Property::ListInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUInt(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUShort(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        Property::ListUChar(v) => Some(v.iter().map(|&x| x as usize).collect()),
        _ => None,
    }
}

/// Save a mesh to a PLY file (ASCII format).
///
/// Cells are not representable in PLY and are dropped with a warning.
pub fn save<P: AsRef<Path>>(mesh: &HostMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a mesh as ASCII PLY.
pub fn write<W: Write>(mesh: &HostMesh, writer: &mut W) -> Result<()> {
    if mesh.cells.nb() > 0 {
        log::warn!("PLY cannot store cells; {} cells dropped", mesh.cells.nb());
    }

    let vattrs = mesh.vertices.attributes();
    let vfloats: Vec<(&str, &[f64])> = vattrs
        .names()
        .filter_map(|n| vattrs.float(n).filter(|a| a.is_scalar()).map(|a| (n, a.values())))
        .collect();
    let vints: Vec<(&str, &[i32])> = vattrs
        .names()
        .filter_map(|n| vattrs.int(n).map(|a| (n, a)))
        .collect();
    let fattrs = mesh.facets.attributes();
    let fints: Vec<(&str, &[i32])> = fattrs
        .names()
        .filter_map(|n| fattrs.int(n).map(|a| (n, a)))
        .collect();

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by meshbridge")?;
    writeln!(writer, "element vertex {}", mesh.vertices.nb())?;
    for axis in COORDINATES {
        writeln!(writer, "property double {axis}")?;
    }
    for (name, _) in &vfloats {
        writeln!(writer, "property double {name}")?;
    }
    for (name, _) in &vints {
        writeln!(writer, "property int {name}")?;
    }
    writeln!(writer, "element face {}", mesh.facets.nb())?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    for (name, _) in &fints {
        writeln!(writer, "property int {name}")?;
    }
    writeln!(writer, "end_header")?;

    for (v, p) in mesh.vertices.points().iter().enumerate() {
        write!(writer, "{} {} {}", p.x, p.y, p.z)?;
        for (_, values) in &vfloats {
            write!(writer, " {}", values[v])?;
        }
        for (_, values) in &vints {
            write!(writer, " {}", values[v])?;
        }
        writeln!(writer)?;
    }

    for (f, verts) in mesh.facets.iter().enumerate() {
        write!(writer, "{}", verts.len())?;
        for v in verts {
            write!(writer, " {v}")?;
        }
        for (_, values) in &fints {
            write!(writer, " {}", values[f])?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::AttributeSource;

    const SQUARE: &str = "\
ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
property float h
property int region
element face 2
property list uchar int vertex_indices
property uchar patch
end_header
0 0 0 0.1 1
1 0 0 0.2 1
1 1 0 0.3 2
0 1 0 0.4 2
3 0 1 2 7
3 0 2 3 8
";

    #[test]
    fn test_read_with_attributes() {
        let mesh = read(&mut SQUARE.as_bytes()).unwrap();
        assert_eq!(mesh.vertices.nb(), 4);
        assert_eq!(mesh.facets.nb(), 2);

        let h = mesh.read_vertex_field("h").unwrap();
        assert!(h.is_scalar());
        assert!((h.get(2)[0] - 0.3).abs() < 1e-6);
        assert_eq!(mesh.read_int_attribute(ElementKind::Vertex, "region"), Some(&[1, 1, 2, 2][..]));
        assert_eq!(mesh.read_int_attribute(ElementKind::Facet, "patch"), Some(&[7, 8][..]));
        assert!(mesh.facets.is_connected());
        assert_eq!(mesh.facets.adjacent(0, 2), Some(1));
    }

    #[test]
    fn test_polygons_kept() {
        let text = "ply\nformat ascii 1.0\nelement vertex 4\nproperty float x\nproperty float y\nproperty float z\nelement face 1\nproperty list uchar int vertex_indices\nend_header\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n4 0 1 2 3\n";
        let mesh = read(&mut text.as_bytes()).unwrap();
        assert_eq!(mesh.facets.nb(), 1);
        assert_eq!(mesh.facets.nb_vertices(0), 4);
    }

    #[test]
    fn test_invalid_index() {
        let text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\nelement face 1\nproperty list uchar int vertex_indices\nend_header\n0 0 0\n3 0 1 2\n";
        let err = read(&mut text.as_bytes()).unwrap_err();
        assert!(err.contains("invalid vertex index"));
    }

    #[test]
    fn test_write_then_read() {
        let mesh = read(&mut SQUARE.as_bytes()).unwrap();
        let mut buffer = Vec::new();
        write(&mesh, &mut buffer).unwrap();
        let again = read(&mut buffer.as_slice()).unwrap();

        assert_eq!(again.vertices.points(), mesh.vertices.points());
        assert!(again.facets.iter().eq(mesh.facets.iter()));
        assert_eq!(
            again.read_int_attribute(ElementKind::Facet, "patch"),
            Some(&[7, 8][..])
        );
        let h = again.read_vertex_field("h").unwrap();
        assert!((h.get(0)[0] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_load_save_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("square.ply");
        let mesh = read(&mut SQUARE.as_bytes()).unwrap();
        save(&mesh, &path).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded.vertices.nb(), 4);
    }
}
