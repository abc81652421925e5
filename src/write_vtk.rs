//! Snapshot export of a [`Mesh`] to the VTK XML formats
//! (`.vti`, `.vtr`, `.vts`, `.vtp`), with every array written inline.

use crate::mesh::{Attributes, ImageData, Mesh, PointCloud, RectilinearGrid, StructuredGrid};
use crate::prelude::*;
use crate::Renderer;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// How inline data arrays are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// human readable numbers, separated by spaces
    #[default]
    Ascii,
    /// little endian `f64` bytes prefixed by their byte count as a `u64`, base64 encoded
    Base64,
}

impl Encoding {
    fn to_str(self) -> &'static str {
        match self {
            Encoding::Ascii => "ascii",
            Encoding::Base64 => "binary",
        }
    }
}

/// Write `mesh` and all of its point and cell arrays to `writer`
pub fn write_vtk<W: Write>(writer: W, mesh: &Mesh, encoding: Encoding) -> Result<(), Error> {
    let mut writer = Writer::new(writer);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;

    let file = BytesStart::new("VTKFile").with_attributes([
        ("type", mesh.vtk_type()),
        ("version", "1.0"),
        ("byte_order", "LittleEndian"),
        ("header_type", "UInt64"),
    ]);
    writer.write_event(Event::Start(file))?;

    match mesh {
        Mesh::Image(image) => write_image(&mut writer, image, encoding)?,
        Mesh::Rectilinear(grid) => write_rectilinear(&mut writer, grid, encoding)?,
        Mesh::Structured(grid) => write_structured(&mut writer, grid, encoding)?,
        Mesh::Points(cloud) => write_points(&mut writer, cloud, encoding)?,
    }

    writer.write_event(Event::End(BytesEnd::new("VTKFile")))?;

    Ok(())
}

fn extent(dimensions: [usize; 3]) -> String {
    dimensions
        .iter()
        .map(|n| format!("0 {}", *n as i64 - 1))
        .collect::<Vec<_>>()
        .join(" ")
}

fn join(values: &[f64]) -> String {
    let mut buffer = ryu::Buffer::new();
    values
        .iter()
        .map(|x| buffer.format(*x).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_image<W: Write>(writer: &mut Writer<W>, image: &ImageData, encoding: Encoding) -> Result<(), Error> {
    let extent = extent(image.dimensions);
    let origin = join(&image.origin);
    let spacing = join(&image.spacing);

    let start = BytesStart::new("ImageData").with_attributes([
        ("WholeExtent", extent.as_str()),
        ("Origin", origin.as_str()),
        ("Spacing", spacing.as_str()),
    ]);
    writer.write_event(Event::Start(start))?;

    start_piece(writer, &extent)?;
    write_attributes(writer, "PointData", &image.point_data, encoding)?;
    write_attributes(writer, "CellData", &image.cell_data, encoding)?;
    end(writer, "Piece")?;

    end(writer, "ImageData")
}

fn write_rectilinear<W: Write>(
    writer: &mut Writer<W>,
    grid: &RectilinearGrid,
    encoding: Encoding,
) -> Result<(), Error> {
    let extent = extent(grid.dimensions());

    let start = BytesStart::new("RectilinearGrid").with_attributes([("WholeExtent", extent.as_str())]);
    writer.write_event(Event::Start(start))?;

    start_piece(writer, &extent)?;
    write_attributes(writer, "PointData", &grid.point_data, encoding)?;
    write_attributes(writer, "CellData", &grid.cell_data, encoding)?;

    writer.write_event(Event::Start(BytesStart::new("Coordinates")))?;
    write_inline_array(writer, "X", 1, &grid.x, encoding)?;
    write_inline_array(writer, "Y", 1, &grid.y, encoding)?;
    write_inline_array(writer, "Z", 1, &grid.z, encoding)?;
    end(writer, "Coordinates")?;

    end(writer, "Piece")?;
    end(writer, "RectilinearGrid")
}

fn write_structured<W: Write>(
    writer: &mut Writer<W>,
    grid: &StructuredGrid,
    encoding: Encoding,
) -> Result<(), Error> {
    let extent = extent(grid.dimensions());

    let start = BytesStart::new("StructuredGrid").with_attributes([("WholeExtent", extent.as_str())]);
    writer.write_event(Event::Start(start))?;

    start_piece(writer, &extent)?;
    write_attributes(writer, "PointData", &grid.point_data, encoding)?;
    write_attributes(writer, "CellData", &grid.cell_data, encoding)?;

    writer.write_event(Event::Start(BytesStart::new("Points")))?;
    write_inline_array(writer, "Points", 3, grid.raw_points(), encoding)?;
    end(writer, "Points")?;

    end(writer, "Piece")?;
    end(writer, "StructuredGrid")
}

fn write_points<W: Write>(writer: &mut Writer<W>, cloud: &PointCloud, encoding: Encoding) -> Result<(), Error> {
    let n = cloud.n_points();
    let count = n.to_string();

    writer.write_event(Event::Start(BytesStart::new("PolyData")))?;

    let piece = BytesStart::new("Piece").with_attributes([
        ("NumberOfPoints", count.as_str()),
        ("NumberOfVerts", count.as_str()),
        ("NumberOfLines", "0"),
        ("NumberOfStrips", "0"),
        ("NumberOfPolys", "0"),
    ]);
    writer.write_event(Event::Start(piece))?;

    write_attributes(writer, "PointData", &cloud.point_data, encoding)?;
    write_attributes(writer, "CellData", &cloud.cell_data, encoding)?;

    writer.write_event(Event::Start(BytesStart::new("Points")))?;
    write_inline_array(writer, "Points", 3, cloud.raw_points(), encoding)?;
    end(writer, "Points")?;

    // one vertex cell per point
    writer.write_event(Event::Start(BytesStart::new("Verts")))?;
    write_index_array(writer, "connectivity", 0..n)?;
    write_index_array(writer, "offsets", 1..n + 1)?;
    end(writer, "Verts")?;

    end(writer, "Piece")?;
    end(writer, "PolyData")
}

fn start_piece<W: Write>(writer: &mut Writer<W>, extent: &str) -> Result<(), Error> {
    let piece = BytesStart::new("Piece").with_attributes([("Extent", extent)]);
    writer.write_event(Event::Start(piece))?;
    Ok(())
}

fn end<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<(), Error> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_attributes<W: Write>(
    writer: &mut Writer<W>,
    section: &str,
    arrays: &Attributes,
    encoding: Encoding,
) -> Result<(), Error> {
    writer.write_event(Event::Start(BytesStart::new(section)))?;
    for array in arrays.iter() {
        write_inline_array(writer, &array.name, array.components, &array.values, encoding)?;
    }
    end(writer, section)
}

/// write a single inline `Float64` array
pub(crate) fn write_inline_array<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    components: usize,
    values: &[f64],
    encoding: Encoding,
) -> Result<(), Error> {
    let components = components.to_string();
    let header = BytesStart::new("DataArray").with_attributes([
        ("type", "Float64"),
        ("Name", name),
        ("NumberOfComponents", components.as_str()),
        ("format", encoding.to_str()),
    ]);
    writer.write_event(Event::Start(header))?;

    let data = match encoding {
        Encoding::Ascii => join(values),
        Encoding::Base64 => {
            let mut bytes: Vec<u8> = Vec::with_capacity(8 * (values.len() + 1));
            bytes.extend_from_slice(&((8 * values.len()) as u64).to_le_bytes());
            for value in values {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
            base64::encode(bytes.as_slice())
        }
    };
    writer.write_event(Event::Text(BytesText::new(&data)))?;

    end(writer, "DataArray")
}

/// write an ascii `Int64` array, as used for cell connectivity
fn write_index_array<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    values: impl Iterator<Item = usize>,
) -> Result<(), Error> {
    let header = BytesStart::new("DataArray").with_attributes([
        ("type", "Int64"),
        ("Name", name),
        ("format", "ascii"),
    ]);
    writer.write_event(Event::Start(header))?;

    let data = values.map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
    writer.write_event(Event::Text(BytesText::new(&data)))?;

    end(writer, "DataArray")
}

/// [`Renderer`] that writes every mesh it receives to a VTK XML file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VtkFileSink {
    path: PathBuf,
}

impl VtkFileSink {
    /// Without an extension the conventional one for the mesh type is appended to `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// the file `mesh` is written to
    pub fn path_for(&self, mesh: &Mesh) -> PathBuf {
        match self.path.extension() {
            Some(_) => self.path.clone(),
            None => self.path.with_extension(mesh.extension()),
        }
    }
}

impl Renderer for VtkFileSink {
    type Options = Encoding;
    type Error = Error;

    fn render(&mut self, mesh: &Mesh, encoding: &Encoding) -> Result<(), Error> {
        let path = self.path_for(mesh);
        debug!(path = %path.display(), vtk_type = mesh.vtk_type(), "writing mesh");

        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        write_vtk(&mut writer, mesh, *encoding)?;
        writer.flush()?;

        Ok(())
    }
}

#[test]
fn base64_header_counts_bytes() {
    let mut output = Vec::new();
    let mut writer = Writer::new(&mut output);
    write_inline_array(&mut writer, "a", 1, &[1.0, 2.0], Encoding::Base64).unwrap();

    let text = String::from_utf8(output).unwrap();
    let start = text.find('>').unwrap() + 1;
    let stop = text.rfind("</DataArray>").unwrap();

    let bytes = base64::decode(&text[start..stop]).unwrap();
    assert_eq!(bytes.len(), 24);
    assert_eq!(u64::from_le_bytes(bytes[..8].try_into().unwrap()), 16);
    assert_eq!(f64::from_le_bytes(bytes[16..].try_into().unwrap()), 2.0);
}
