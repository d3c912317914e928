//! DXF 文本写出（AC1024 / R2010）。
//!
//! 每个数据项由两行组成：组码与值。段落顺序：
//! HEADER → CLASSES → TABLES → BLOCKS → ENTITIES → OBJECTS → EOF。
//! 句柄按写出顺序递增分配，`$HANDSEED` 写入下一个可用句柄。

use std::fmt::Display;

use svg2dxf_core::document::{
    BlockReference, ColorMode, DEFAULT_LAYER, Document, Entity, Hatch, Polyline, Text,
};
use svg2dxf_core::geometry::Point2;

const MODEL_SPACE: &str = "*Model_Space";
const PAPER_SPACE: &str = "*Paper_Space";
const FIRST_HANDLE: u64 = 0x20;

/// DXF 组码-值写入器
pub struct DxfWriter {
    output: Vec<String>,
    handle_counter: u64,
}

impl DxfWriter {
    pub fn new() -> Self {
        Self::with_first_handle(FIRST_HANDLE)
    }

    pub fn with_first_handle(first: u64) -> Self {
        Self {
            output: Vec::new(),
            handle_counter: first,
        }
    }

    /// 生成新句柄
    pub fn new_handle(&mut self) -> String {
        let handle = format!("{:X}", self.handle_counter);
        self.handle_counter += 1;
        handle
    }

    /// 下一个将被分配的句柄值
    #[inline]
    pub fn next_handle_value(&self) -> u64 {
        self.handle_counter
    }

    /// 写入组码-值对
    pub fn write_pair(&mut self, code: i32, value: impl Display) {
        self.output.push(format!("{:>3}", code));
        self.output.push(value.to_string());
    }

    pub fn write_real(&mut self, code: i32, value: f64) {
        self.write_pair(code, format_real(value));
    }

    /// 写入三维点（Z = 0）
    pub fn write_point(&mut self, base_code: i32, point: Point2) {
        self.write_point_2d(base_code, point);
        self.write_real(base_code + 20, 0.0);
    }

    pub fn write_point_2d(&mut self, base_code: i32, point: Point2) {
        self.write_real(base_code, point.x());
        self.write_real(base_code + 10, point.y());
    }

    pub fn begin_section(&mut self, name: &str) {
        self.write_pair(0, "SECTION");
        self.write_pair(2, name);
    }

    pub fn end_section(&mut self) {
        self.write_pair(0, "ENDSEC");
    }

    /// 追加另一个写入器的内容
    pub fn append(&mut self, other: DxfWriter) {
        self.output.extend(other.output);
    }

    pub fn finish(mut self) -> String {
        self.write_pair(0, "EOF");
        let mut content = self.output.join("\n");
        content.push('\n');
        content
    }
}

impl Default for DxfWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// 把文档序列化为 DXF 文本。
pub fn write_document(document: &Document) -> String {
    let mut body = DxfWriter::new();
    body.begin_section("CLASSES");
    body.end_section();
    let records = write_tables(&mut body, document);
    write_blocks(&mut body, document, &records);
    write_entities(&mut body, document, &records.model_space);
    write_objects(&mut body);

    let mut head = DxfWriter::new();
    write_header(&mut head, document, body.next_handle_value());
    head.append(body);
    head.finish()
}

/// 块记录句柄，写 BLOCKS 与实体属主时引用。
struct BlockRecords {
    model_space: String,
    paper_space: String,
    user: Vec<(String, String)>,
}

fn write_header(writer: &mut DxfWriter, document: &Document, handle_seed: u64) {
    writer.begin_section("HEADER");
    writer.write_pair(9, "$ACADVER");
    writer.write_pair(1, "AC1024");
    writer.write_pair(9, "$HANDSEED");
    writer.write_pair(5, format!("{:X}", handle_seed));
    writer.write_pair(9, "$CLAYER");
    writer.write_pair(8, DEFAULT_LAYER);
    if let Some(bounds) = document.bounds() {
        writer.write_pair(9, "$EXTMIN");
        writer.write_point(10, bounds.min());
        writer.write_pair(9, "$EXTMAX");
        writer.write_point(10, bounds.max());
    }
    writer.end_section();
}

fn begin_table(writer: &mut DxfWriter, name: &str, count: usize) -> String {
    let handle = writer.new_handle();
    writer.write_pair(0, "TABLE");
    writer.write_pair(2, name);
    writer.write_pair(5, &handle);
    writer.write_pair(330, 0);
    writer.write_pair(100, "AcDbSymbolTable");
    writer.write_pair(70, count);
    handle
}

fn begin_record(writer: &mut DxfWriter, kind: &str, owner: &str, subclass: &str) -> String {
    let handle = writer.new_handle();
    writer.write_pair(0, kind);
    writer.write_pair(5, &handle);
    writer.write_pair(330, owner);
    writer.write_pair(100, "AcDbSymbolTableRecord");
    writer.write_pair(100, subclass);
    handle
}

fn write_tables(writer: &mut DxfWriter, document: &Document) -> BlockRecords {
    writer.begin_section("TABLES");

    begin_table(writer, "VPORT", 0);
    writer.write_pair(0, "ENDTAB");

    let ltypes = [
        ("ByBlock", ""),
        ("ByLayer", ""),
        ("Continuous", "Solid line"),
    ];
    let table = begin_table(writer, "LTYPE", ltypes.len());
    for (name, description) in ltypes {
        begin_record(writer, "LTYPE", &table, "AcDbLinetypeTableRecord");
        writer.write_pair(2, name);
        writer.write_pair(70, 0);
        writer.write_pair(3, description);
        writer.write_pair(72, 65);
        writer.write_pair(73, 0);
        writer.write_real(40, 0.0);
    }
    writer.write_pair(0, "ENDTAB");

    let layers: Vec<_> = document.layers().collect();
    let table = begin_table(writer, "LAYER", layers.len());
    for layer in layers {
        begin_record(writer, "LAYER", &table, "AcDbLayerTableRecord");
        writer.write_pair(2, &layer.name);
        writer.write_pair(70, 0);
        writer.write_pair(62, 7);
        writer.write_pair(6, "Continuous");
    }
    writer.write_pair(0, "ENDTAB");

    let table = begin_table(writer, "STYLE", 1);
    begin_record(writer, "STYLE", &table, "AcDbTextStyleTableRecord");
    writer.write_pair(2, "Standard");
    writer.write_pair(70, 0);
    writer.write_real(40, 0.0);
    writer.write_real(41, 1.0);
    writer.write_real(50, 0.0);
    writer.write_pair(71, 0);
    writer.write_real(42, 2.5);
    writer.write_pair(3, "txt");
    writer.write_pair(4, "");
    writer.write_pair(0, "ENDTAB");

    let table = begin_table(writer, "APPID", 1);
    begin_record(writer, "APPID", &table, "AcDbRegAppTableRecord");
    writer.write_pair(2, "ACAD");
    writer.write_pair(70, 0);
    writer.write_pair(0, "ENDTAB");

    let user_names: Vec<&str> = document.blocks().map(|b| b.name.as_str()).collect();
    let table = begin_table(writer, "BLOCK_RECORD", user_names.len() + 2);
    let record = |writer: &mut DxfWriter, name: &str| {
        let handle = begin_record(writer, "BLOCK_RECORD", &table, "AcDbBlockTableRecord");
        writer.write_pair(2, name);
        handle
    };
    let model_space = record(writer, MODEL_SPACE);
    let paper_space = record(writer, PAPER_SPACE);
    let user = user_names
        .iter()
        .map(|name| (name.to_string(), record(writer, name)))
        .collect();
    writer.write_pair(0, "ENDTAB");

    writer.end_section();
    BlockRecords {
        model_space,
        paper_space,
        user,
    }
}

fn write_block_begin(writer: &mut DxfWriter, name: &str, owner: &str, base_point: Point2) {
    let handle = writer.new_handle();
    writer.write_pair(0, "BLOCK");
    writer.write_pair(5, handle);
    writer.write_pair(330, owner);
    writer.write_pair(100, "AcDbEntity");
    writer.write_pair(8, DEFAULT_LAYER);
    writer.write_pair(100, "AcDbBlockBegin");
    writer.write_pair(2, name);
    writer.write_pair(70, 0);
    writer.write_point(10, base_point);
    writer.write_pair(3, name);
    writer.write_pair(1, "");
}

fn write_block_end(writer: &mut DxfWriter, owner: &str) {
    let handle = writer.new_handle();
    writer.write_pair(0, "ENDBLK");
    writer.write_pair(5, handle);
    writer.write_pair(330, owner);
    writer.write_pair(100, "AcDbEntity");
    writer.write_pair(8, DEFAULT_LAYER);
    writer.write_pair(100, "AcDbBlockEnd");
}

fn write_blocks(writer: &mut DxfWriter, document: &Document, records: &BlockRecords) {
    writer.begin_section("BLOCKS");
    for (name, owner) in [
        (MODEL_SPACE, &records.model_space),
        (PAPER_SPACE, &records.paper_space),
    ] {
        write_block_begin(writer, name, owner, Point2::origin());
        write_block_end(writer, owner);
    }
    for (definition, (_, owner)) in document.blocks().zip(&records.user) {
        write_block_begin(writer, &definition.name, owner, definition.base_point);
        for entity in &definition.entities {
            write_entity(writer, entity, owner);
        }
        write_block_end(writer, owner);
    }
    writer.end_section();
}

fn write_entities(writer: &mut DxfWriter, document: &Document, owner: &str) {
    writer.begin_section("ENTITIES");
    for (_, entity) in document.entities() {
        write_entity(writer, entity, owner);
    }
    writer.end_section();
}

fn write_objects(writer: &mut DxfWriter) {
    writer.begin_section("OBJECTS");
    let handle = writer.new_handle();
    writer.write_pair(0, "DICTIONARY");
    writer.write_pair(5, handle);
    writer.write_pair(330, 0);
    writer.write_pair(100, "AcDbDictionary");
    writer.write_pair(281, 1);
    writer.end_section();
}

fn write_entity_common(
    writer: &mut DxfWriter,
    kind: &str,
    owner: &str,
    layer: &str,
    color: ColorMode,
) {
    let handle = writer.new_handle();
    writer.write_pair(0, kind);
    writer.write_pair(5, handle);
    writer.write_pair(330, owner);
    writer.write_pair(100, "AcDbEntity");
    writer.write_pair(8, layer);
    if color != ColorMode::ByLayer {
        writer.write_pair(62, color.aci());
    }
}

fn write_entity(writer: &mut DxfWriter, entity: &Entity, owner: &str) {
    match entity {
        Entity::Polyline(polyline) => write_lwpolyline(writer, polyline, owner),
        Entity::Text(text) => write_text(writer, text, owner),
        Entity::BlockReference(reference) => write_insert(writer, reference, owner),
        Entity::Hatch(hatch) => write_hatch(writer, hatch, owner),
    }
}

fn write_lwpolyline(writer: &mut DxfWriter, polyline: &Polyline, owner: &str) {
    write_entity_common(writer, "LWPOLYLINE", owner, &polyline.layer, ColorMode::ByLayer);
    writer.write_pair(100, "AcDbPolyline");
    writer.write_pair(90, polyline.vertices.len());
    writer.write_pair(70, if polyline.is_closed { 1 } else { 0 });
    writer.write_real(43, 0.0);
    for vertex in &polyline.vertices {
        writer.write_point_2d(10, *vertex);
    }
}

fn write_text(writer: &mut DxfWriter, text: &Text, owner: &str) {
    write_entity_common(writer, "TEXT", owner, &text.layer, ColorMode::ByLayer);
    writer.write_pair(100, "AcDbText");
    writer.write_point(10, text.insert);
    writer.write_real(40, text.height);
    // 组码 1 不允许换行
    writer.write_pair(1, text.content.replace(['\r', '\n'], " "));
    if text.rotation != 0.0 {
        writer.write_real(50, text.rotation);
    }
    writer.write_pair(100, "AcDbText");
}

fn write_insert(writer: &mut DxfWriter, reference: &BlockReference, owner: &str) {
    write_entity_common(writer, "INSERT", owner, &reference.layer, reference.color);
    writer.write_pair(100, "AcDbBlockReference");
    writer.write_pair(2, &reference.name);
    writer.write_point(10, reference.insert);
    if reference.scale.x() != 1.0 || reference.scale.y() != 1.0 {
        writer.write_real(41, reference.scale.x());
        writer.write_real(42, reference.scale.y());
        writer.write_real(43, 1.0);
    }
    if reference.rotation != 0.0 {
        writer.write_real(50, reference.rotation);
    }
}

fn write_hatch(writer: &mut DxfWriter, hatch: &Hatch, owner: &str) {
    write_entity_common(writer, "HATCH", owner, &hatch.layer, hatch.color);
    writer.write_pair(100, "AcDbHatch");
    writer.write_point(10, Point2::origin());
    writer.write_real(210, 0.0);
    writer.write_real(220, 0.0);
    writer.write_real(230, 1.0);
    writer.write_pair(2, &hatch.pattern_name);
    writer.write_pair(70, if hatch.is_solid { 1 } else { 0 });
    writer.write_pair(71, 0);
    writer.write_pair(91, hatch.loops.len());
    for boundary in &hatch.loops {
        // 外部边界 + 多段线边界
        writer.write_pair(92, 3);
        writer.write_pair(72, 0);
        writer.write_pair(73, if boundary.is_closed { 1 } else { 0 });
        writer.write_pair(93, boundary.vertices.len());
        for vertex in &boundary.vertices {
            writer.write_point_2d(10, *vertex);
        }
        writer.write_pair(97, 0);
    }
    writer.write_pair(75, 1);
    writer.write_pair(76, 1);
    if !hatch.is_solid {
        writer.write_real(52, 0.0);
        writer.write_real(41, 1.0);
        writer.write_pair(77, 0);
        writer.write_pair(78, 0);
    }
    writer.write_pair(98, 0);
}

/// 浮点数格式化：始终带小数点，`-0` 归一为 `0.0`。
fn format_real(value: f64) -> String {
    if value == 0.0 {
        return "0.0".to_string();
    }
    let text = value.to_string();
    if text.contains('.') || text.contains('e') || !value.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}
