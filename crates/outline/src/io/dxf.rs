//! DXF output for traced outlines.
//!
//! Two document profiles are supported. [`DocumentProfile::R12`] writes each
//! polygon as a `POLYLINE` / `VERTEX` / `SEQEND` run, which every CAD and
//! cutting package can read. [`DocumentProfile::R2000`] writes a complete
//! AC1015 document (tables, blocks, objects) with one `LWPOLYLINE` per
//! polygon owned by model space.
//!
//! Coordinates are written as given; the document unit only changes the
//! header (`$INSUNITS`). Stroke weight is always stored in hundredths, see
//! [`stroke_weight`].

mod r2000;

use std::{
    fmt::Display,
    fs::{self, File},
    io::{BufRead, BufWriter, Write},
    path::Path,
    str::FromStr,
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::{
    error::{OutlineError, Result},
    types::{ComputedOutline, DrawingPolygon},
};

/// Media type used when serving DXF files
pub const DXF_MEDIA_TYPE: &str = "application/dxf";

const LAYER: &str = "0";

#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq
)]
pub enum DocumentProfile {
    /// AutoCAD R12, the most widely readable profile
    #[default]
    R12,
    /// AutoCAD 2000, lightweight polylines with handles
    R2000,
}

impl DocumentProfile {
    /// Parse a profile name, rejecting anything but the supported versions
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| OutlineError::UnsupportedProfile(name.to_string()))
    }

    /// Value of the `$ACADVER` header variable
    pub fn acad_version(&self) -> &'static str {
        match self {
            Self::R12 => "AC1009",
            Self::R2000 => "AC1015",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DrawingUnit {
    #[default]
    Mm,
    Cm,
}

impl DrawingUnit {
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| OutlineError::UnsupportedUnit(name.to_string()))
    }

    /// `$INSUNITS` code
    pub fn insunits(&self) -> i16 {
        match self {
            Self::Mm => 4,
            Self::Cm => 5,
        }
    }
}

/// Lineweight attribute for a stroke width: `round(max(width, 0) * 100)`.
///
/// The value is in hundredths whatever the document unit is.
pub fn stroke_weight(line_width: f64) -> u32 {
    // f64::max discards NaN
    (line_width.max(0.0) * 100.0).round() as u32
}

/// One closed polyline entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolylineEntity {
    pub vertices: Vec<[f64; 2]>,
    pub closed: bool,
    pub stroke_weight: u32,
}

/// In-memory DXF document holding polyline entities.
#[derive(Debug, Clone)]
pub struct DxfDocument {
    pub profile: DocumentProfile,
    pub unit: DrawingUnit,
    entities: Vec<PolylineEntity>,
}

impl DxfDocument {
    pub fn new(profile: DocumentProfile, unit: DrawingUnit) -> Self {
        Self {
            profile,
            unit,
            entities: Vec::new(),
        }
    }

    pub fn entities(&self) -> &[PolylineEntity] {
        &self.entities
    }

    /// Add a closed polyline. Polygons with fewer than two vertices are skipped
    /// and `false` is returned.
    pub fn add_closed_polyline(&mut self, polygon: &DrawingPolygon, stroke_weight: u32) -> bool {
        if polygon.len() < 2 {
            return false;
        }
        self.entities.push(PolylineEntity {
            vertices: polygon.vertices.clone(),
            closed: true,
            stroke_weight,
        });
        true
    }

    /// Serialize the whole document
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut out = GroupWriter::new(writer);
        match self.profile {
            DocumentProfile::R12 => {
                write_header(&mut out, self.profile, self.unit, None)?;
                out.pair(0, "SECTION")?;
                out.pair(2, "ENTITIES")?;
                for entity in &self.entities {
                    write_polyline(&mut out, entity)?;
                }
                out.pair(0, "ENDSEC")?;
            }
            DocumentProfile::R2000 => r2000::write_document(&mut out, self.unit, &self.entities)?,
        }
        out.pair(0, "EOF")?;
        out.finish()
    }

    /// Write the document to a file, creating or truncating it.
    ///
    /// A failed write removes the partial file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persist(path.as_ref(), |writer| self.write_to(writer))
    }

    pub fn to_dxf_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| OutlineError::MalformedDxf(e.to_string()))
    }
}

fn write_header<W: Write>(
    out: &mut GroupWriter<W>,
    profile: DocumentProfile,
    unit: DrawingUnit,
    handle_seed: Option<u32>,
) -> Result<()> {
    out.pair(0, "SECTION")?;
    out.pair(2, "HEADER")?;
    out.pair(9, "$ACADVER")?;
    out.pair(1, profile.acad_version())?;
    if let Some(seed) = handle_seed {
        out.pair(9, "$HANDSEED")?;
        out.handle(5, seed)?;
    }
    out.pair(9, "$INSUNITS")?;
    out.pair(70, unit.insunits())?;
    out.pair(9, "$MEASUREMENT")?;
    out.pair(70, 1)?;
    out.pair(0, "ENDSEC")
}

/// Write `path` through `write`; on failure the file is removed again
fn persist<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    let written = write(&mut writer).and_then(|()| Ok(writer.flush()?));
    if written.is_err() {
        drop(writer);
        if let Err(err) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %err, "could not remove partial DXF");
        }
    }
    written
}

fn write_polyline<W: Write>(out: &mut GroupWriter<W>, entity: &PolylineEntity) -> Result<()> {
    out.pair(0, "POLYLINE")?;
    out.pair(8, LAYER)?;
    out.pair(370, entity.stroke_weight)?;
    out.pair(66, 1)?;
    out.pair(10, 0.0)?;
    out.pair(20, 0.0)?;
    out.pair(30, 0.0)?;
    out.pair(70, u8::from(entity.closed))?;
    for &[x, y] in &entity.vertices {
        out.pair(0, "VERTEX")?;
        out.pair(8, LAYER)?;
        out.pair(10, x)?;
        out.pair(20, y)?;
        out.pair(30, 0.0)?;
    }
    out.pair(0, "SEQEND")?;
    out.pair(8, LAYER)
}

/// Writes DXF group code / value line pairs
struct GroupWriter<W: Write> {
    inner: W,
}

impl<W: Write> GroupWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner }
    }

    fn pair(&mut self, code: u16, value: impl Display) -> Result<()> {
        writeln!(self.inner, "{code:>3}")?;
        writeln!(self.inner, "{value}")?;
        Ok(())
    }

    /// Handles are upper-case hex
    fn handle(&mut self, code: u16, handle: u32) -> Result<()> {
        self.pair(code, format!("{handle:X}"))
    }

    fn finish(mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Encodes traced polygons as closed polylines with a uniform stroke weight.
#[derive(Debug, Clone)]
pub struct DxfEncoder {
    pub profile: DocumentProfile,
    pub unit: DrawingUnit,
    /// Stroke width in millimetres
    pub line_width: f64,
}

impl DxfEncoder {
    pub fn new(profile: DocumentProfile, unit: DrawingUnit, line_width: f64) -> Self {
        Self { profile, unit, line_width }
    }

    /// Build an encoder from wire names, failing before any encoding work
    pub fn from_names(profile: &str, unit: &str, line_width: f64) -> Result<Self> {
        Ok(Self::new(DocumentProfile::parse(profile)?, DrawingUnit::parse(unit)?, line_width))
    }

    pub fn stroke_weight(&self) -> u32 {
        stroke_weight(self.line_width)
    }

    pub fn encode(&self, polygons: &[DrawingPolygon]) -> DxfDocument {
        let weight = self.stroke_weight();
        let mut document = DxfDocument::new(self.profile, self.unit);
        for polygon in polygons {
            document.add_closed_polyline(polygon, weight);
        }
        document
    }

    /// Encode and persist; returns the number of entities written
    pub fn encode_to_file<P: AsRef<Path>>(&self, polygons: &[DrawingPolygon], path: P) -> Result<usize> {
        let document = self.encode(polygons);
        document.save(path)?;
        Ok(document.entities().len())
    }
}

impl ComputedOutline {
    /// Export the outline as a DXF file
    pub fn save_dxf<P: AsRef<Path>>(&self, encoder: &DxfEncoder, path: P) -> Result<usize> {
        encoder.encode_to_file(&self.polygons, path)
    }
}

/// What [`read_dxf`] recovers from a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DxfContents {
    pub acad_version: Option<String>,
    pub insunits: Option<i16>,
    pub polylines: Vec<PolylineEntity>,
}

/// Read back the header version, unit and polyline entities of a DXF file.
///
/// Understands both profiles written by this module; other entities are
/// skipped.
pub fn read_dxf<R: BufRead>(reader: R) -> Result<DxfContents> {
    #[derive(Clone, Copy, PartialEq)]
    enum Kind {
        Polyline,
        Vertex,
        LwPolyline,
        Other,
    }

    let mut contents = DxfContents::default();
    let mut current: Option<PolylineEntity> = None;
    let mut kind = Kind::Other;
    let mut header_var: Option<String> = None;
    let mut pending_x: Option<f64> = None;

    for (code, value) in read_pairs(reader)? {
        match code {
            0 => {
                header_var = None;
                pending_x = None;
                kind = match value.as_str() {
                    "POLYLINE" => Kind::Polyline,
                    "LWPOLYLINE" => Kind::LwPolyline,
                    "VERTEX" if current.is_some() => Kind::Vertex,
                    _ => Kind::Other,
                };
                match kind {
                    Kind::Polyline | Kind::LwPolyline => {
                        contents.polylines.extend(current.take());
                        current = Some(PolylineEntity {
                            vertices: Vec::new(),
                            closed: false,
                            stroke_weight: 0,
                        });
                    }
                    Kind::Vertex => {}
                    Kind::Other if value == "SEQEND" => {}
                    Kind::Other => contents.polylines.extend(current.take()),
                }
            }
            9 => header_var = Some(value),
            1 if header_var.as_deref() == Some("$ACADVER") => contents.acad_version = Some(value),
            70 if header_var.as_deref() == Some("$INSUNITS") => {
                contents.insunits = Some(parse_value(&value)?);
            }
            70 if matches!(kind, Kind::Polyline | Kind::LwPolyline) => {
                if let Some(entity) = current.as_mut() {
                    entity.closed = parse_value::<u16>(&value)? & 1 == 1;
                }
            }
            370 => {
                if let Some(entity) = current.as_mut() {
                    entity.stroke_weight = parse_value(&value)?;
                }
            }
            10 => pending_x = Some(parse_value(&value)?),
            // POLYLINE carries its own dummy point; real vertices follow as VERTEX
            20 if matches!(kind, Kind::Vertex | Kind::LwPolyline) => {
                let y = parse_value(&value)?;
                if let (Some(entity), Some(x)) = (current.as_mut(), pending_x.take()) {
                    entity.vertices.push([x, y]);
                }
            }
            _ => {}
        }
    }
    contents.polylines.extend(current.take());
    Ok(contents)
}

fn read_pairs<R: BufRead>(reader: R) -> Result<Vec<(u16, String)>> {
    let mut lines = reader.lines();
    let mut pairs = Vec::new();
    while let Some(code) = lines.next() {
        let code = code?;
        let code = code.trim();
        if code.is_empty() {
            continue;
        }
        let code: u16 = parse_value(code)?;
        let value = lines
            .next()
            .ok_or_else(|| OutlineError::MalformedDxf(format!("group {code} has no value")))??;
        pairs.push((code, value.trim().to_string()));
    }
    Ok(pairs)
}

fn parse_value<T: FromStr>(value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| OutlineError::MalformedDxf(format!("unexpected value {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> DrawingPolygon {
        DrawingPolygon::new(vec![[20.0, -20.0], [20.0, -79.0], [79.0, -79.0], [79.0, -20.0]])
    }

    fn round_trip(document: &DxfDocument) -> DxfContents {
        let text = document.to_dxf_string().expect("Should serialize");
        assert!(text.trim_end().ends_with("EOF"));
        read_dxf(text.as_bytes()).expect("Should read back")
    }

    #[test]
    fn test_stroke_weight_formula() {
        assert_eq!(stroke_weight(0.3), 30);
        assert_eq!(stroke_weight(0.0), 0);
        assert_eq!(stroke_weight(-1.0), 0);
        assert_eq!(stroke_weight(0.254), 25);
        assert_eq!(stroke_weight(f64::NAN), 0);
    }

    #[test]
    fn test_profile_names() {
        assert_eq!(DocumentProfile::parse("R12").expect("R12"), DocumentProfile::R12);
        assert_eq!(DocumentProfile::parse("R2000").expect("R2000"), DocumentProfile::R2000);
        assert!(matches!(
            DocumentProfile::parse("R2018"),
            Err(OutlineError::UnsupportedProfile(name)) if name == "R2018"
        ));
        assert!(DrawingUnit::parse("in").is_err());
        assert_eq!(DrawingUnit::parse("cm").expect("cm"), DrawingUnit::Cm);
    }

    #[test]
    fn test_r12_polyline_round_trip() {
        let encoder = DxfEncoder::new(DocumentProfile::R12, DrawingUnit::Mm, 0.3);
        let contents = round_trip(&encoder.encode(&[square()]));

        assert_eq!(contents.acad_version.as_deref(), Some("AC1009"));
        assert_eq!(contents.insunits, Some(4));
        assert_eq!(contents.polylines.len(), 1);
        let entity = &contents.polylines[0];
        assert!(entity.closed);
        assert_eq!(entity.stroke_weight, 30);
        assert_eq!(entity.vertices, square().vertices);
    }

    #[test]
    fn test_r2000_lwpolyline_round_trip() {
        let encoder = DxfEncoder::new(DocumentProfile::R2000, DrawingUnit::Cm, 0.3);
        let document = encoder.encode(&[square(), square()]);
        let text = document.to_dxf_string().expect("Should serialize");
        assert!(text.contains("LWPOLYLINE"));
        assert!(!text.contains("VERTEX"));

        let contents = round_trip(&document);
        assert_eq!(contents.acad_version.as_deref(), Some("AC1015"));
        assert_eq!(contents.insunits, Some(5));
        assert_eq!(contents.polylines.len(), 2);
        for entity in &contents.polylines {
            assert!(entity.closed);
            assert_eq!(entity.stroke_weight, 30);
            assert_eq!(entity.vertices.len(), 4);
        }
    }

    #[test]
    fn test_stroke_weight_ignores_unit() {
        let mm = DxfEncoder::new(DocumentProfile::R12, DrawingUnit::Mm, 0.5).encode(&[square()]);
        let cm = DxfEncoder::new(DocumentProfile::R12, DrawingUnit::Cm, 0.5).encode(&[square()]);
        assert_eq!(mm.entities()[0].stroke_weight, 50);
        assert_eq!(cm.entities()[0].stroke_weight, 50);
    }

    #[test]
    fn test_polygons_below_two_vertices_are_skipped() {
        let encoder = DxfEncoder::new(DocumentProfile::R12, DrawingUnit::Mm, 0.3);
        let document = encoder.encode(&[
            DrawingPolygon::new(vec![[1.0, -1.0]]),
            DrawingPolygon::new(vec![[0.0, 0.0], [5.0, 0.0]]),
        ]);
        assert_eq!(document.entities().len(), 1);
        assert_eq!(document.entities()[0].vertices.len(), 2);
    }

    #[test]
    fn test_empty_document_is_valid() {
        for profile in [DocumentProfile::R12, DocumentProfile::R2000] {
            let document = DxfEncoder::new(profile, DrawingUnit::Mm, 0.3).encode(&[]);
            let contents = round_trip(&document);
            assert!(contents.polylines.is_empty());
            assert_eq!(contents.acad_version.as_deref(), Some(profile.acad_version()));
        }
    }

    #[test]
    fn test_unknown_profile_fails_before_encoding() {
        let result = DxfEncoder::from_names("R14", "mm", 0.3);
        assert!(matches!(result, Err(OutlineError::UnsupportedProfile(_))));
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("partial.dxf");

        let result = persist(&path, |writer| {
            writer.write_all(b"  0\nSECTION\n")?;
            Err(OutlineError::MalformedDxf("interrupted".to_string()))
        });
        assert!(matches!(result, Err(OutlineError::MalformedDxf(_))));
        assert!(!path.exists());

        persist(&path, |writer| Ok(writer.write_all(b"  0\nEOF\n")?)).expect("write");
        assert_eq!(fs::read_to_string(&path).expect("read"), "  0\nEOF\n");
    }

    #[test]
    fn test_unwritable_destination_is_an_io_error() {
        let encoder = DxfEncoder::new(DocumentProfile::R12, DrawingUnit::Mm, 0.3);
        let result = encoder.encode_to_file(&[square()], "/nonexistent-dir/out.dxf");
        assert!(matches!(result, Err(OutlineError::Io(_))));
    }
}
