//! AC1015 document layout.
//!
//! R2000 readers expect more than entities: the symbol tables, the model and
//! paper space blocks with their block records, and the root dictionary with
//! the layouts those records point at. Every object carries a handle and,
//! through group 330, the handle of its owner.

use std::io::Write;

use super::{write_header, DocumentProfile, DrawingUnit, GroupWriter, PolylineEntity, LAYER};
use crate::error::Result;

/// Handles of the objects every document carries, in allocation order
struct Skeleton {
    vport_table: u32,
    ltype_table: u32,
    layer_table: u32,
    style_table: u32,
    view_table: u32,
    ucs_table: u32,
    appid_table: u32,
    dimstyle_table: u32,
    block_record_table: u32,
    ltype_by_block: u32,
    ltype_by_layer: u32,
    ltype_continuous: u32,
    layer_zero: u32,
    style_standard: u32,
    appid_acad: u32,
    dimstyle_standard: u32,
    model_record: u32,
    paper_record: u32,
    model_block: u32,
    model_block_end: u32,
    paper_block: u32,
    paper_block_end: u32,
    root_dictionary: u32,
    group_dictionary: u32,
    layout_dictionary: u32,
    plot_style_dictionary: u32,
    plot_style_normal: u32,
    model_layout: u32,
    paper_layout: u32,
    /// Entities take consecutive handles from here
    first_entity: u32,
}

impl Skeleton {
    fn new() -> Self {
        let mut last = 0u32;
        let mut next = || {
            last += 1;
            last
        };
        Self {
            vport_table: next(),
            ltype_table: next(),
            layer_table: next(),
            style_table: next(),
            view_table: next(),
            ucs_table: next(),
            appid_table: next(),
            dimstyle_table: next(),
            block_record_table: next(),
            ltype_by_block: next(),
            ltype_by_layer: next(),
            ltype_continuous: next(),
            layer_zero: next(),
            style_standard: next(),
            appid_acad: next(),
            dimstyle_standard: next(),
            model_record: next(),
            paper_record: next(),
            model_block: next(),
            model_block_end: next(),
            paper_block: next(),
            paper_block_end: next(),
            root_dictionary: next(),
            group_dictionary: next(),
            layout_dictionary: next(),
            plot_style_dictionary: next(),
            plot_style_normal: next(),
            model_layout: next(),
            paper_layout: next(),
            first_entity: next(),
        }
    }
}

pub(super) fn write_document<W: Write>(
    out: &mut GroupWriter<W>,
    unit: DrawingUnit,
    entities: &[PolylineEntity],
) -> Result<()> {
    let ids = Skeleton::new();
    let handle_seed = ids.first_entity + entities.len() as u32;

    write_header(out, DocumentProfile::R2000, unit, Some(handle_seed))?;

    out.pair(0, "SECTION")?;
    out.pair(2, "CLASSES")?;
    out.pair(0, "ENDSEC")?;

    write_tables(out, &ids)?;
    write_blocks(out, &ids)?;

    out.pair(0, "SECTION")?;
    out.pair(2, "ENTITIES")?;
    for (index, entity) in entities.iter().enumerate() {
        write_lwpolyline(out, entity, ids.first_entity + index as u32, ids.model_record)?;
    }
    out.pair(0, "ENDSEC")?;

    write_objects(out, &ids)
}

fn write_lwpolyline<W: Write>(
    out: &mut GroupWriter<W>,
    entity: &PolylineEntity,
    handle: u32,
    owner: u32,
) -> Result<()> {
    out.pair(0, "LWPOLYLINE")?;
    out.handle(5, handle)?;
    out.handle(330, owner)?;
    out.pair(100, "AcDbEntity")?;
    out.pair(8, LAYER)?;
    out.pair(370, entity.stroke_weight)?;
    out.pair(100, "AcDbPolyline")?;
    out.pair(90, entity.vertices.len())?;
    out.pair(70, u8::from(entity.closed))?;
    for &[x, y] in &entity.vertices {
        out.pair(10, x)?;
        out.pair(20, y)?;
    }
    Ok(())
}

fn write_tables<W: Write>(out: &mut GroupWriter<W>, ids: &Skeleton) -> Result<()> {
    out.pair(0, "SECTION")?;
    out.pair(2, "TABLES")?;

    table(out, "VPORT", ids.vport_table, 0)?;
    out.pair(0, "ENDTAB")?;

    table(out, "LTYPE", ids.ltype_table, 3)?;
    for (handle, name, description) in [
        (ids.ltype_by_block, "ByBlock", ""),
        (ids.ltype_by_layer, "ByLayer", ""),
        (ids.ltype_continuous, "Continuous", "Solid line"),
    ] {
        record(out, "LTYPE", handle, ids.ltype_table, "AcDbLinetypeTableRecord", name)?;
        out.pair(3, description)?;
        out.pair(72, 65)?;
        out.pair(73, 0)?;
        out.pair(40, 0.0)?;
    }
    out.pair(0, "ENDTAB")?;

    table(out, "LAYER", ids.layer_table, 1)?;
    record(out, "LAYER", ids.layer_zero, ids.layer_table, "AcDbLayerTableRecord", LAYER)?;
    out.pair(62, 7)?;
    out.pair(6, "Continuous")?;
    // lineweight "default"; entities override it
    out.pair(370, -3)?;
    out.handle(390, ids.plot_style_normal)?;
    out.pair(0, "ENDTAB")?;

    table(out, "STYLE", ids.style_table, 1)?;
    let style = "AcDbTextStyleTableRecord";
    record(out, "STYLE", ids.style_standard, ids.style_table, style, "Standard")?;
    out.pair(40, 0.0)?;
    out.pair(41, 1.0)?;
    out.pair(50, 0.0)?;
    out.pair(71, 0)?;
    out.pair(42, 2.5)?;
    out.pair(3, "txt")?;
    out.pair(4, "")?;
    out.pair(0, "ENDTAB")?;

    table(out, "VIEW", ids.view_table, 0)?;
    out.pair(0, "ENDTAB")?;

    table(out, "UCS", ids.ucs_table, 0)?;
    out.pair(0, "ENDTAB")?;

    table(out, "APPID", ids.appid_table, 1)?;
    record(out, "APPID", ids.appid_acad, ids.appid_table, "AcDbRegAppTableRecord", "ACAD")?;
    out.pair(0, "ENDTAB")?;

    table(out, "DIMSTYLE", ids.dimstyle_table, 1)?;
    out.pair(100, "AcDbDimStyleTable")?;
    let dimstyle = "AcDbDimStyleTableRecord";
    record(out, "DIMSTYLE", ids.dimstyle_standard, ids.dimstyle_table, dimstyle, "Standard")?;
    out.pair(0, "ENDTAB")?;

    table(out, "BLOCK_RECORD", ids.block_record_table, 2)?;
    for (handle, name, layout) in [
        (ids.model_record, "*Model_Space", ids.model_layout),
        (ids.paper_record, "*Paper_Space", ids.paper_layout),
    ] {
        record(out, "BLOCK_RECORD", handle, ids.block_record_table, "AcDbBlockTableRecord", name)?;
        out.handle(340, layout)?;
    }
    out.pair(0, "ENDTAB")?;

    out.pair(0, "ENDSEC")
}

/// Table head; entries and `ENDTAB` follow
fn table<W: Write>(
    out: &mut GroupWriter<W>,
    name: &str,
    handle: u32,
    entries: usize,
) -> Result<()> {
    out.pair(0, "TABLE")?;
    out.pair(2, name)?;
    out.handle(5, handle)?;
    out.pair(330, 0)?;
    out.pair(100, "AcDbSymbolTable")?;
    out.pair(70, entries)
}

/// Common head of a symbol table entry
fn record<W: Write>(
    out: &mut GroupWriter<W>,
    kind: &str,
    handle: u32,
    owner: u32,
    subclass: &str,
    name: &str,
) -> Result<()> {
    out.pair(0, kind)?;
    // DIMSTYLE keeps group 5 for DIMBLK, its handle moves to 105
    out.handle(if kind == "DIMSTYLE" { 105 } else { 5 }, handle)?;
    out.handle(330, owner)?;
    out.pair(100, "AcDbSymbolTableRecord")?;
    out.pair(100, subclass)?;
    out.pair(2, name)?;
    out.pair(70, 0)
}

fn write_blocks<W: Write>(out: &mut GroupWriter<W>, ids: &Skeleton) -> Result<()> {
    out.pair(0, "SECTION")?;
    out.pair(2, "BLOCKS")?;
    block(out, ids.model_block, ids.model_block_end, ids.model_record, "*Model_Space", false)?;
    block(out, ids.paper_block, ids.paper_block_end, ids.paper_record, "*Paper_Space", true)?;
    out.pair(0, "ENDSEC")
}

fn block<W: Write>(
    out: &mut GroupWriter<W>,
    handle: u32,
    end_handle: u32,
    record: u32,
    name: &str,
    paper_space: bool,
) -> Result<()> {
    out.pair(0, "BLOCK")?;
    out.handle(5, handle)?;
    out.handle(330, record)?;
    out.pair(100, "AcDbEntity")?;
    if paper_space {
        out.pair(67, 1)?;
    }
    out.pair(8, LAYER)?;
    out.pair(100, "AcDbBlockBegin")?;
    out.pair(2, name)?;
    out.pair(70, 0)?;
    out.pair(10, 0.0)?;
    out.pair(20, 0.0)?;
    out.pair(30, 0.0)?;
    out.pair(3, name)?;
    out.pair(1, "")?;

    out.pair(0, "ENDBLK")?;
    out.handle(5, end_handle)?;
    out.handle(330, record)?;
    out.pair(100, "AcDbEntity")?;
    if paper_space {
        out.pair(67, 1)?;
    }
    out.pair(8, LAYER)?;
    out.pair(100, "AcDbBlockEnd")
}

fn write_objects<W: Write>(out: &mut GroupWriter<W>, ids: &Skeleton) -> Result<()> {
    out.pair(0, "SECTION")?;
    out.pair(2, "OBJECTS")?;

    dictionary(out, "DICTIONARY", ids.root_dictionary, 0, &[
        ("ACAD_GROUP", ids.group_dictionary),
        ("ACAD_LAYOUT", ids.layout_dictionary),
        ("ACAD_PLOTSTYLENAME", ids.plot_style_dictionary),
    ])?;
    dictionary(out, "DICTIONARY", ids.group_dictionary, ids.root_dictionary, &[])?;
    dictionary(out, "DICTIONARY", ids.layout_dictionary, ids.root_dictionary, &[
        ("Layout1", ids.paper_layout),
        ("Model", ids.model_layout),
    ])?;
    dictionary(out, "ACDBDICTIONARYWDFLT", ids.plot_style_dictionary, ids.root_dictionary, &[
        ("Normal", ids.plot_style_normal),
    ])?;
    out.pair(100, "AcDbDictionaryWithDefault")?;
    out.handle(340, ids.plot_style_normal)?;

    out.pair(0, "ACDBPLACEHOLDER")?;
    out.handle(5, ids.plot_style_normal)?;
    out.handle(330, ids.plot_style_dictionary)?;

    layout(out, ids.model_layout, ids.layout_dictionary, ids.model_record, "Model", 0)?;
    layout(out, ids.paper_layout, ids.layout_dictionary, ids.paper_record, "Layout1", 1)?;

    out.pair(0, "ENDSEC")
}

fn dictionary<W: Write>(
    out: &mut GroupWriter<W>,
    kind: &str,
    handle: u32,
    owner: u32,
    entries: &[(&str, u32)],
) -> Result<()> {
    out.pair(0, kind)?;
    out.handle(5, handle)?;
    out.handle(330, owner)?;
    out.pair(100, "AcDbDictionary")?;
    out.pair(281, 1)?;
    for &(name, entry) in entries {
        out.pair(3, name)?;
        out.handle(350, entry)?;
    }
    Ok(())
}

fn layout<W: Write>(
    out: &mut GroupWriter<W>,
    handle: u32,
    owner: u32,
    record: u32,
    name: &str,
    tab_order: u8,
) -> Result<()> {
    let model = tab_order == 0;

    out.pair(0, "LAYOUT")?;
    out.handle(5, handle)?;
    out.handle(330, owner)?;
    out.pair(100, "AcDbPlotSettings")?;
    out.pair(1, "")?;
    out.pair(2, "none_device")?;
    out.pair(4, "")?;
    out.pair(6, "")?;
    for code in 40..=49 {
        out.pair(code, 0.0)?;
    }
    out.pair(140, 0.0)?;
    out.pair(141, 0.0)?;
    out.pair(142, 1.0)?;
    out.pair(143, 1.0)?;
    out.pair(70, if model { 1712 } else { 688 })?;
    out.pair(72, 0)?;
    out.pair(73, 0)?;
    out.pair(74, 5)?;
    out.pair(7, "")?;
    out.pair(75, 16)?;
    out.pair(147, 1.0)?;
    out.pair(148, 0.0)?;
    out.pair(149, 0.0)?;

    out.pair(100, "AcDbLayout")?;
    out.pair(1, name)?;
    out.pair(70, u8::from(model))?;
    out.pair(71, tab_order)?;
    // limits, insertion base and extents
    for (code, value) in [
        (10, 0.0), (20, 0.0), (11, 420.0), (21, 297.0),
        (12, 0.0), (22, 0.0), (32, 0.0),
        (14, 0.0), (24, 0.0), (34, 0.0),
        (15, 0.0), (25, 0.0), (35, 0.0),
        (146, 0.0),
        (13, 0.0), (23, 0.0), (33, 0.0),
        (16, 1.0), (26, 0.0), (36, 0.0),
        (17, 0.0), (27, 1.0), (37, 0.0),
    ] {
        out.pair(code, value)?;
    }
    out.pair(76, 0)?;
    out.handle(330, record)
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::super::{read_pairs, DxfEncoder};
    use super::*;
    use crate::types::DrawingPolygon;

    type Object = Vec<(u16, String)>;

    /// Objects after the header, split at group 0
    fn objects(text: &str) -> Vec<Object> {
        let pairs = read_pairs(text.as_bytes()).expect("pairs");
        let body = pairs
            .iter()
            .position(|(code, value)| *code == 0 && value == "ENDSEC")
            .expect("header end");

        let mut objects: Vec<Object> = Vec::new();
        for pair in pairs.into_iter().skip(body + 1) {
            if pair.0 == 0 {
                objects.push(vec![pair]);
            } else if let Some(object) = objects.last_mut() {
                object.push(pair);
            }
        }
        objects
    }

    fn value<'a>(object: &'a Object, code: u16) -> Option<&'a str> {
        object.iter().find(|(c, _)| *c == code).map(|(_, v)| v.as_str())
    }

    fn document(polygons: usize) -> String {
        let square = DrawingPolygon::new(vec![[0.0, 0.0], [0.0, -9.0], [9.0, -9.0], [9.0, 0.0]]);
        DxfEncoder::new(DocumentProfile::R2000, DrawingUnit::Mm, 0.3)
            .encode(&vec![square; polygons])
            .to_dxf_string()
            .expect("serialize")
    }

    #[test]
    fn test_sections_in_order() {
        let text = document(1);
        let pairs = read_pairs(text.as_bytes()).expect("pairs");
        let sections: Vec<&str> = pairs
            .windows(2)
            .filter(|w| w[0].0 == 0 && w[0].1 == "SECTION")
            .map(|w| w[1].1.as_str())
            .collect();
        assert_eq!(sections, ["HEADER", "CLASSES", "TABLES", "BLOCKS", "ENTITIES", "OBJECTS"]);
    }

    #[test]
    fn test_handles_are_unique_and_references_resolve() {
        let text = document(3);
        let objects = objects(&text);

        let mut handles = HashSet::new();
        for object in &objects {
            if let Some(handle) = value(object, 5).or_else(|| value(object, 105)) {
                assert!(handles.insert(handle.to_string()), "duplicate handle {handle}");
            }
        }

        for object in &objects {
            for (code, reference) in object {
                if matches!(code, 330 | 340 | 350 | 390) && reference != "0" {
                    let kind = &object[0].1;
                    assert!(handles.contains(reference), "{kind} points at missing {reference}");
                }
            }
        }

        let pairs = read_pairs(text.as_bytes()).expect("pairs");
        let seed = pairs
            .windows(2)
            .find(|w| w[0].1 == "$HANDSEED")
            .map(|w| u32::from_str_radix(&w[1].1, 16).expect("hex seed"))
            .expect("handle seed");
        for handle in &handles {
            assert!(u32::from_str_radix(handle, 16).expect("hex handle") < seed);
        }
    }

    #[test]
    fn test_polylines_belong_to_model_space() {
        let text = document(2);
        let objects = objects(&text);

        let records: HashMap<&str, &str> = objects
            .iter()
            .filter(|o| o[0].1 == "BLOCK_RECORD")
            .filter_map(|o| Some((value(o, 2)?, value(o, 5)?)))
            .collect();
        let model = records.get("*Model_Space").expect("model space record");
        assert!(records.contains_key("*Paper_Space"));

        let polylines: Vec<&Object> = objects.iter().filter(|o| o[0].1 == "LWPOLYLINE").collect();
        assert_eq!(polylines.len(), 2);
        for polyline in polylines {
            assert_eq!(value(polyline, 330), Some(*model));
        }

        let model_block = objects
            .iter()
            .find(|o| o[0].1 == "BLOCK" && value(o, 2) == Some("*Model_Space"))
            .expect("model space block");
        assert_eq!(value(model_block, 330), Some(*model));
    }
}
