use std::collections::HashSet;
use std::path::PathBuf;

use serde_json::{Value, json};
use svg2dxf_config::{ConversionConfig, DegeneratePolicy, HatchOriginMode};
use svg2dxf_core::document::{ColorMode, Entity};
use svg2dxf_core::geometry::Point2;
use svg2dxf_engine::errors::{ClassificationError, ConversionError};
use svg2dxf_engine::{Converter, Diagnostic, GroupOutcome};
use svg2dxf_io::{SourceDrawing, SourceGroup, SourceLine, SourceLoader, SvgLoader};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("svg2dxf-io")
        .join("tests")
        .join("data")
        .join("section.svg")
}

fn group(id: Option<&str>, classes: &[&str], paths: &[&str]) -> SourceGroup {
    SourceGroup {
        element_id: id.map(str::to_string),
        class_tokens: classes.iter().map(|c| c.to_string()).collect(),
        child_paths: paths.iter().map(|p| p.to_string()).collect(),
    }
}

fn drawing(groups: Vec<SourceGroup>) -> SourceDrawing {
    SourceDrawing {
        groups,
        ..SourceDrawing::default()
    }
}

fn kinds(converter: &Converter) -> Vec<&'static str> {
    converter
        .document()
        .entities()
        .map(|(_, entity)| entity.kind_name())
        .collect()
}

#[test]
fn converts_section_fixture() {
    let source = SvgLoader::new().load(&fixture_path()).expect("load fixture");
    let mut converter = Converter::new(ConversionConfig::default());
    let report = converter.convert(&source).expect("convert").clone();

    assert_eq!(report.groups_seen, 4);
    assert_eq!(report.groups_skipped, 2);
    assert_eq!(report.hatch_blocks, 1);
    assert_eq!(report.line_blocks, 1);
    assert_eq!(report.lines, 1);
    assert_eq!(report.texts, 2);
    assert!(report.diagnostics.is_empty());

    let document = converter.document();
    let layers: Vec<&str> = document.layers().map(|layer| layer.name.as_str()).collect();
    assert_eq!(layers, vec!["0", "IfcWall_cut", "IfcDoor_cut"]);

    let blocks: Vec<&str> = document.blocks().map(|block| block.name.as_str()).collect();
    assert_eq!(
        blocks,
        vec!["2O2Fr$t4X7Zf8NOew3FLOH_cut", "1hOSvn6df7F8_7GcBWlR72_B000001"]
    );

    assert_eq!(
        kinds(&converter),
        vec!["hatch", "block_reference", "block_reference", "polyline", "text", "text"]
    );
}

#[test]
fn fixture_document_snapshot() {
    let source = SvgLoader::new().load(&fixture_path()).expect("load fixture");
    let mut converter = Converter::new(ConversionConfig::default());
    converter.convert(&source).expect("convert");
    let document = converter.into_document();

    let outline = document
        .block("2O2Fr$t4X7Zf8NOew3FLOH_cut")
        .expect("outline block");
    let outline: Value = serde_json::to_value(outline).expect("serialize block");
    assert_eq!(
        outline["entities"][0]["Polyline"],
        json!({
            "vertices": [[0.0, 0.0], [10.0, 0.0], [10.0, -10.0], [0.0, -10.0]],
            "is_closed": true,
            "layer": "0"
        })
    );

    let texts: Vec<Value> = document
        .entities()
        .filter_map(|(_, entity)| match entity {
            Entity::Text(text) => Some(json!({
                "insert": [text.insert.x(), text.insert.y()],
                "content": text.content,
                "height": text.height,
            })),
            _ => None,
        })
        .collect();
    assert_eq!(
        texts,
        vec![
            json!({"insert": [12.0, -34.0], "content": "Level 1", "height": 2.5}),
            json!({"insert": [12.0, -34.0], "content": "+0.00", "height": 2.5}),
        ]
    );
}

#[test]
fn line_pair_reference_reproduces_world_lines() {
    let mut converter = Converter::new(ConversionConfig::default());
    let outcome = converter
        .convert_group(0, &group(Some("door"), &["IfcDoor", "cut"], &["M2,3 L6,3", "M2,3 L2,8"]))
        .expect("convert");
    let GroupOutcome::LinePair { block } = outcome else {
        panic!("expected a line pair");
    };

    let document = converter.document();
    let reference = document
        .entities()
        .find_map(|(_, entity)| match entity {
            Entity::BlockReference(reference) => Some(reference),
            _ => None,
        })
        .expect("reference");
    assert_eq!(reference.name, block);
    assert_eq!(reference.layer, "IfcDoor_cut");
    assert_eq!(reference.color, ColorMode::ByLayer);
    assert_eq!(reference.insert, Point2::new(2.0, -3.0));

    let ends: Vec<Point2> = document
        .block(&block)
        .expect("block")
        .polylines()
        .map(|polyline| {
            Point2::from_vec(polyline.vertices[1].as_vec2() + reference.insert.as_vec2())
        })
        .collect();
    assert_eq!(ends, vec![Point2::new(6.0, -3.0), Point2::new(2.0, -8.0)]);
}

#[test]
fn hatch_modes_share_world_placement() {
    let wall = group(Some("w"), &["IfcWall", "cut"], &["M3,4 L13,4 L13,14 L3,14 Z"]);
    let mut inserts = Vec::new();
    for mode in [HatchOriginMode::Legacy, HatchOriginMode::FirstVertex] {
        let config = ConversionConfig {
            hatch_origin: mode,
            ..ConversionConfig::default()
        };
        let mut converter = Converter::new(config);
        converter.convert_group(0, &wall).expect("convert");
        let document = converter.into_document();

        let hatch_boundary = document
            .entities()
            .find_map(|(_, entity)| match entity {
                Entity::Hatch(hatch) => Some(hatch.loops[0].vertices.clone()),
                _ => None,
            })
            .expect("hatch");
        let reference = document
            .entities()
            .find_map(|(_, entity)| match entity {
                Entity::BlockReference(reference) => Some(reference.clone()),
                _ => None,
            })
            .expect("reference");
        assert_eq!(reference.color, ColorMode::ByBlock);

        let outline = document.block("w_cut").expect("outline");
        let world: Vec<Point2> = outline
            .polylines()
            .flat_map(|polyline| polyline.vertices.iter())
            .map(|vertex| Point2::from_vec(vertex.as_vec2() + reference.insert.as_vec2()))
            .collect();
        assert_eq!(world, hatch_boundary);
        assert_eq!(world.first(), world.last());
        inserts.push(reference.insert);
    }
    assert_eq!(inserts, vec![Point2::new(3.0, 4.0), Point2::new(3.0, -4.0)]);
}

#[test]
fn hundred_groups_get_distinct_block_names() {
    let groups: Vec<SourceGroup> = (0..100)
        .map(|i| match i % 4 {
            0 => group(Some("same"), &["IfcWall", "cut"], &["M0,0 L1,0 L1,1"]),
            1 => group(Some("same"), &["IfcDoor"], &["M0,0 L1,0"]),
            2 => group(None, &["cut"], &["M0,0 L1,0 L1,1"]),
            _ => group(Some(""), &["cut"], &["M0,0 L1,0"]),
        })
        .collect();
    let mut converter = Converter::new(ConversionConfig::default());
    let report = converter.convert(&drawing(groups)).expect("convert").clone();

    assert_eq!(report.blocks(), 100);
    let names: HashSet<&str> = converter
        .document()
        .blocks()
        .map(|block| block.name.as_str())
        .collect();
    assert_eq!(names.len(), 100);
}

#[test]
fn shared_layer_is_created_once() {
    let groups = vec![
        group(Some("a"), &["IfcWall", "cut"], &["M0,0 L1,0"]),
        group(Some("b"), &["IfcWall", "cut"], &["M0,0 L1,0 L1,1"]),
        group(Some("c"), &["cut", "IfcWall"], &["M5,5 L6,5"]),
    ];
    let mut converter = Converter::new(ConversionConfig::default());
    converter.convert(&drawing(groups)).expect("convert");
    let count = converter
        .document()
        .layers()
        .filter(|layer| layer.name == "IfcWall_cut")
        .count();
    assert_eq!(count, 1);
}

#[test]
fn empty_layer_name_falls_back_to_default_layer() {
    let mut converter = Converter::new(ConversionConfig::default());
    converter
        .convert_group(0, &group(Some("x"), &[], &["M0,0 L1,0"]))
        .expect("convert");
    let layers: Vec<&str> = converter
        .document()
        .layers()
        .map(|layer| layer.name.as_str())
        .collect();
    assert_eq!(layers, vec!["0"]);
}

#[test]
fn zero_path_group_is_skipped_with_diagnostic() {
    let groups = vec![
        group(Some("empty"), &["IfcSlab", "cut"], &[]),
        group(Some("ok"), &["IfcSlab", "cut"], &["M0,0 L1,0"]),
    ];
    let mut converter = Converter::new(ConversionConfig::default());
    let report = converter.convert(&drawing(groups)).expect("convert").clone();

    assert_eq!(
        report.diagnostics,
        vec![Diagnostic {
            group_index: 0,
            element_id: Some("empty".to_string()),
            error: ClassificationError::NoPaths,
        }]
    );
    assert_eq!(report.line_blocks, 1);
    assert_eq!(converter.document().blocks().count(), 1);
}

#[test]
fn zero_path_group_fails_under_error_policy() {
    let config = ConversionConfig {
        degenerate_groups: DegeneratePolicy::Error,
        ..ConversionConfig::default()
    };
    let mut converter = Converter::new(config);
    let err = converter
        .convert(&drawing(vec![group(Some("empty"), &["cut"], &[])]))
        .unwrap_err();
    match err {
        ConversionError::Classification { group, source } => {
            assert_eq!(group, "empty");
            assert_eq!(source, ClassificationError::NoPaths);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn move_only_first_path_is_degenerate() {
    let mut converter = Converter::new(ConversionConfig::default());
    let outcome = converter
        .convert_group(3, &group(None, &["cut"], &["M1,1", "M0,0 L1,0 L1,1"]))
        .expect("convert");
    assert_eq!(outcome, GroupOutcome::Skipped);
    assert_eq!(
        converter.report().diagnostics[0].error,
        ClassificationError::NoDrawableSegments { segments: 1 }
    );
    assert_eq!(converter.document().entities().count(), 0);
}

#[test]
fn malformed_path_data_is_fatal() {
    let mut converter = Converter::new(ConversionConfig::default());
    let err = converter
        .convert(&drawing(vec![group(Some("bad"), &["cut"], &["M0,0 L10"])]))
        .unwrap_err();
    assert!(matches!(err, ConversionError::Parse { ref group, .. } if group == "bad"));
}

#[test]
fn line_and_text_passes_can_be_disabled() {
    let source = SvgLoader::new().load(&fixture_path()).expect("load fixture");
    let config = ConversionConfig {
        convert_lines: false,
        convert_texts: false,
        ..ConversionConfig::default()
    };
    let mut converter = Converter::new(config);
    let report = converter.convert(&source).expect("convert").clone();
    assert_eq!(report.lines, 0);
    assert_eq!(report.texts, 0);
    assert!(!kinds(&converter).contains(&"text"));
    assert!(!kinds(&converter).contains(&"polyline"));
}

#[test]
fn lines_are_mirrored_like_group_geometry() {
    let source = SourceDrawing {
        lines: vec![SourceLine {
            start: Point2::new(1.0, 2.0),
            end: Point2::new(7.0, 9.0),
        }],
        ..SourceDrawing::default()
    };
    let mut converter = Converter::new(ConversionConfig::default());
    converter.convert(&source).expect("convert");

    let polyline = converter
        .document()
        .entities()
        .find_map(|(_, entity)| match entity {
            Entity::Polyline(polyline) => Some(polyline),
            _ => None,
        })
        .expect("polyline");
    assert_eq!(
        polyline.vertices,
        vec![Point2::new(1.0, -2.0), Point2::new(7.0, -9.0)]
    );
    assert!(!polyline.is_closed);
    assert_eq!(polyline.layer, "0");
}
