//! Medit `.mesh` format support (ASCII).
//!
//! The native format of the kernel family: keyword-introduced sections of
//! one-based element lists, each element followed by an integer reference.
//! References are mapped to the integer attribute [`REF_ATTRIBUTE`] of the
//! matching collection. Triangles and quadrilaterals both become facets,
//! tetrahedra become cells. Sections that carry no elements of interest
//! (corners, ridges, required entities, normals, tangents) are skipped.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{BridgeError, ElementKind, Result};
use crate::kernel::{from_kernel_index, to_kernel_index};
use crate::mesh::{AttributeSink, AttributeSource, HostMesh};

/// Name of the integer attribute holding element references.
pub const REF_ATTRIBUTE: &str = "ref";

/// Number of tokens per entry in sections that are read and discarded.
fn skipped_entry_size(keyword: &str) -> Option<usize> {
    match keyword {
        "Corners" | "RequiredVertices" | "Ridges" | "RequiredEdges" | "RequiredTriangles"
        | "RequiredQuadrilaterals" | "RequiredTetrahedra" => Some(1),
        "NormalAtVertices" | "TangentAtVertices" => Some(2),
        "Normals" | "Tangents" => Some(3),
        "Prisms" => Some(7),
        "Hexahedra" => Some(9),
        _ => None,
    }
}

struct Tokens<'a> {
    iter: Box<dyn Iterator<Item = &'a str> + 'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            iter: Box::new(
                text.lines()
                    .map(|line| line.split('#').next().unwrap_or(""))
                    .flat_map(str::split_whitespace),
            ),
        }
    }

    fn next(&mut self) -> Option<&'a str> {
        self.iter.next()
    }

    fn number<T: std::str::FromStr>(&mut self, what: &str) -> std::result::Result<T, String> {
        let token = self
            .iter
            .next()
            .ok_or_else(|| format!("unexpected end of file, expected {what}"))?;
        token
            .parse()
            .map_err(|_| format!("expected {what}, found '{token}'"))
    }

    fn vertex(&mut self, np: usize) -> std::result::Result<usize, String> {
        let j: usize = self.number("vertex index")?;
        if j == 0 || j > np {
            return Err(format!("vertex index {j} out of range 1..={np}"));
        }
        Ok(from_kernel_index(j))
    }
}

/// Parse a mesh from Medit text.
pub fn read<R: Read>(mut reader: R) -> std::result::Result<HostMesh, String> {
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(|e| e.to_string())?;
    let mut tokens = Tokens::new(&text);

    let mut mesh = HostMesh::new();
    let mut vertex_refs: Vec<i32> = Vec::new();
    let mut edge_refs: Vec<i32> = Vec::new();
    let mut facet_refs: Vec<i32> = Vec::new();
    let mut cell_refs: Vec<i32> = Vec::new();

    while let Some(keyword) = tokens.next() {
        match keyword {
            "MeshVersionFormatted" => {
                let version: u32 = tokens.number("format version")?;
                if version == 0 || version > 3 {
                    return Err(format!("unsupported format version {version}"));
                }
            }
            "Dimension" => {
                let dim: usize = tokens.number("dimension")?;
                if dim != 3 {
                    return Err(format!("only 3D meshes are supported, found dimension {dim}"));
                }
            }
            "Vertices" => {
                let n: usize = tokens.number("vertex count")?;
                for _ in 0..n {
                    let x: f64 = tokens.number("coordinate")?;
                    let y: f64 = tokens.number("coordinate")?;
                    let z: f64 = tokens.number("coordinate")?;
                    vertex_refs.push(tokens.number("reference")?);
                    mesh.vertices.add_vertex(Point3::new(x, y, z));
                }
            }
            "Edges" => {
                let n: usize = tokens.number("edge count")?;
                let np = mesh.vertices.nb();
                for _ in 0..n {
                    let a = tokens.vertex(np)?;
                    let b = tokens.vertex(np)?;
                    edge_refs.push(tokens.number("reference")?);
                    mesh.edges.add_edge(a, b);
                }
            }
            "Triangles" | "Quadrilaterals" | "Tetrahedra" => {
                let size = match keyword {
                    "Triangles" => 3,
                    _ => 4,
                };
                let n: usize = tokens.number("element count")?;
                let np = mesh.vertices.nb();
                let mut verts = [0usize; 4];
                for _ in 0..n {
                    for v in verts.iter_mut().take(size) {
                        *v = tokens.vertex(np)?;
                    }
                    let r: i32 = tokens.number("reference")?;
                    if keyword == "Tetrahedra" {
                        mesh.cells.add(&verts);
                        cell_refs.push(r);
                    } else {
                        mesh.facets.add(&verts[..size]);
                        facet_refs.push(r);
                    }
                }
            }
            "End" => break,
            other => {
                let size = skipped_entry_size(other)
                    .ok_or_else(|| format!("unknown keyword '{other}'"))?;
                let n: usize = tokens.number("entry count")?;
                log::debug!("skipping {n} entries of section {other}");
                for _ in 0..n * size {
                    tokens
                        .next()
                        .ok_or_else(|| format!("unexpected end of file in section {other}"))?;
                }
            }
        }
    }

    let write = |mesh: &mut HostMesh, kind: ElementKind, refs: Vec<i32>| {
        mesh.write_int_attribute(kind, REF_ATTRIBUTE, refs)
            .map_err(|e| e.to_string())
    };
    write(&mut mesh, ElementKind::Vertex, vertex_refs)?;
    write(&mut mesh, ElementKind::Edge, edge_refs)?;
    write(&mut mesh, ElementKind::Facet, facet_refs)?;
    write(&mut mesh, ElementKind::Cell, cell_refs)?;
    mesh.connect();
    Ok(mesh)
}

/// Write a mesh as Medit text.
///
/// Facets are written as triangles then quadrilaterals; other polygons and
/// non-tetrahedral cells cannot be represented.
pub fn write<W: Write>(mesh: &HostMesh, mut writer: W) -> std::result::Result<(), String> {
    let io = |e: std::io::Error| e.to_string();
    let refs = |kind| mesh.read_int_attribute(kind, REF_ATTRIBUTE);
    let r = |refs: Option<&[i32]>, i: usize| refs.map_or(0, |r| r[i]);

    if let Some(f) = (0..mesh.facets.nb()).find(|&f| !(3..=4).contains(&mesh.facets.nb_vertices(f))) {
        return Err(format!(
            "facet {f} has {} vertices; only triangles and quadrilaterals are supported",
            mesh.facets.nb_vertices(f)
        ));
    }
    if !mesh.cells.are_simplices() {
        return Err("only tetrahedral cells are supported".to_string());
    }

    writeln!(writer, "MeshVersionFormatted 2").map_err(io)?;
    writeln!(writer, "\nDimension 3").map_err(io)?;

    let vertex_refs = refs(ElementKind::Vertex);
    writeln!(writer, "\nVertices\n{}", mesh.vertices.nb()).map_err(io)?;
    for (v, p) in mesh.vertices.points().iter().enumerate() {
        writeln!(writer, "{} {} {} {}", p.x, p.y, p.z, r(vertex_refs, v)).map_err(io)?;
    }

    if mesh.edges.nb() > 0 {
        let edge_refs = refs(ElementKind::Edge);
        writeln!(writer, "\nEdges\n{}", mesh.edges.nb()).map_err(io)?;
        for (e, [a, b]) in mesh.edges.iter().enumerate() {
            writeln!(
                writer,
                "{} {} {}",
                to_kernel_index(a),
                to_kernel_index(b),
                r(edge_refs, e)
            )
            .map_err(io)?;
        }
    }

    let facet_refs = refs(ElementKind::Facet);
    for (keyword, size) in [("Triangles", 3), ("Quadrilaterals", 4)] {
        let selected: Vec<usize> = (0..mesh.facets.nb())
            .filter(|&f| mesh.facets.nb_vertices(f) == size)
            .collect();
        if selected.is_empty() {
            continue;
        }
        writeln!(writer, "\n{}\n{}", keyword, selected.len()).map_err(io)?;
        for f in selected {
            write_element(&mut writer, mesh.facets.get(f), r(facet_refs, f)).map_err(io)?;
        }
    }

    if mesh.cells.nb() > 0 {
        let cell_refs = refs(ElementKind::Cell);
        writeln!(writer, "\nTetrahedra\n{}", mesh.cells.nb()).map_err(io)?;
        for (c, verts) in mesh.cells.iter().enumerate() {
            write_element(&mut writer, verts, r(cell_refs, c)).map_err(io)?;
        }
    }

    writeln!(writer, "\nEnd").map_err(io)?;
    Ok(())
}

fn write_element<W: Write>(writer: &mut W, verts: &[usize], reference: i32) -> std::io::Result<()> {
    for &v in verts {
        write!(writer, "{} ", to_kernel_index(v))?;
    }
    writeln!(writer, "{reference}")
}

/// Load a mesh from a `.mesh` file.
///
/// # Example
///
/// ```no_run
/// use meshbridge::io::medit;
///
/// let mesh = medit::load("cube.mesh").unwrap();
/// println!("{} tetrahedra", mesh.cells.nb());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<HostMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    read(BufReader::new(file)).map_err(|message| BridgeError::LoadError {
        path: path.to_path_buf(),
        message,
    })
}

/// Save a mesh to a `.mesh` file.
pub fn save<P: AsRef<Path>>(mesh: &HostMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let to_error = |message| BridgeError::SaveError {
        path: path.to_path_buf(),
        message,
    };
    write(mesh, &mut writer).map_err(to_error)?;
    writer.flush()?;
    Ok(())
}
