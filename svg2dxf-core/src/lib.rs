pub mod geometry {
    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    /// 二维点，内部以 `glam::DVec2` 表示。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn origin() -> Self {
            Self(DVec2::ZERO)
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn translate(self, offset: Vector2) -> Self {
            Self(self.0 + offset.0)
        }

        /// 镜像 Y 轴：SVG 坐标系 Y 轴向下，CAD 坐标系 Y 轴向上。
        #[inline]
        pub fn flip_y(self) -> Self {
            Self(DVec2::new(self.0.x, -self.0.y))
        }

        /// 以 `origin` 为零点的局部坐标。
        #[inline]
        pub fn relative_to(self, origin: Point2) -> Self {
            Self(self.0 - origin.0)
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self::from_vec(value)
        }
    }

    /// 二维向量，用于平移与缩放参数。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector2(pub DVec2);

    impl Vector2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }
    }

    impl From<DVec2> for Vector2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    /// 路径命令解析后的线段类别。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum SegmentKind {
        /// `M` 命令产生的零长度伪线段，不携带可绘制几何。
        Move,
        Line,
        /// `Z` 命令，从当前点回到子路径起点。
        Close,
        /// 曲线/圆弧命令，仅保留起止点构成的弦。
        Curve,
    }

    /// SVG 坐标空间（Y 轴向下）中的有向直线段。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Segment {
        pub kind: SegmentKind,
        pub start: Point2,
        pub end: Point2,
    }

    impl Segment {
        #[inline]
        pub fn new(kind: SegmentKind, start: Point2, end: Point2) -> Self {
            Self { kind, start, end }
        }

        #[inline]
        pub fn line(start: Point2, end: Point2) -> Self {
            Self::new(SegmentKind::Line, start, end)
        }

        #[inline]
        pub fn move_to(target: Point2) -> Self {
            Self::new(SegmentKind::Move, target, target)
        }

        #[inline]
        pub fn is_drawable(&self) -> bool {
            self.kind != SegmentKind::Move
        }
    }

    /// 轴对齐边界框，用于估算文档/实体范围。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Bounds2D {
        min: Point2,
        max: Point2,
    }

    impl Bounds2D {
        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point2::new(f64::INFINITY, f64::INFINITY),
                max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            }
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y()
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        pub fn include_point(&mut self, point: Point2) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            let min_vec = self.min.as_vec2().min(point.as_vec2());
            let max_vec = self.max.as_vec2().max(point.as_vec2());
            self.min = Point2::from_vec(min_vec);
            self.max = Point2::from_vec(max_vec);
        }

        pub fn include_bounds(&mut self, other: &Bounds2D) {
            if other.is_empty() {
                return;
            }
            self.include_point(other.min);
            self.include_point(other.max);
        }
    }

}

pub mod document {
    use std::collections::HashMap;

    use serde::{Deserialize, Serialize};
    use thiserror::Error;

    use crate::geometry::{Bounds2D, Point2, Vector2};

    /// 默认图层。块内几何统一放在该图层，使颜色/图层由块参照决定。
    pub const DEFAULT_LAYER: &str = "0";

    #[derive(Debug, Error, PartialEq, Eq)]
    pub enum DocumentError {
        #[error("block `{0}` is already defined")]
        DuplicateBlock(String),
        #[error("block `{0}` is not defined")]
        UnknownBlock(String),
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EntityId(u64);

    impl EntityId {
        /// 提供原始数值，便于序列化或日志输出。
        #[inline]
        pub fn get(self) -> u64 {
            self.0
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Layer {
        pub name: String,
    }

    impl Layer {
        #[inline]
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
            }
        }
    }

    /// 实体颜色来源。对应 ACI 256（随层）与 0（随块）。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub enum ColorMode {
        #[default]
        ByLayer,
        ByBlock,
    }

    impl ColorMode {
        #[inline]
        pub fn aci(self) -> i16 {
            match self {
                ColorMode::ByLayer => 256,
                ColorMode::ByBlock => 0,
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub enum Entity {
        Polyline(Polyline),
        Text(Text),
        BlockReference(BlockReference),
        Hatch(Hatch),
    }

    impl Entity {
        #[inline]
        pub fn layer_name(&self) -> &str {
            match self {
                Entity::Polyline(polyline) => &polyline.layer,
                Entity::Text(text) => &text.layer,
                Entity::BlockReference(reference) => &reference.layer,
                Entity::Hatch(hatch) => &hatch.layer,
            }
        }

        #[inline]
        pub fn kind_name(&self) -> &'static str {
            match self {
                Entity::Polyline(_) => "polyline",
                Entity::Text(_) => "text",
                Entity::BlockReference(_) => "block_reference",
                Entity::Hatch(_) => "hatch",
            }
        }

        /// 计算实体的 2D 轴对齐范围，文本与块参照退化为插入点。
        pub fn bounds(&self) -> Option<Bounds2D> {
            let mut bounds = Bounds2D::empty();
            match self {
                Entity::Polyline(polyline) => {
                    for vertex in &polyline.vertices {
                        bounds.include_point(*vertex);
                    }
                }
                Entity::Text(text) => bounds.include_point(text.insert),
                Entity::BlockReference(reference) => bounds.include_point(reference.insert),
                Entity::Hatch(hatch) => {
                    for boundary in &hatch.loops {
                        for vertex in &boundary.vertices {
                            bounds.include_point(*vertex);
                        }
                    }
                }
            }
            if bounds.is_empty() {
                None
            } else {
                Some(bounds)
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Polyline {
        pub vertices: Vec<Point2>,
        pub is_closed: bool,
        pub layer: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Text {
        pub insert: Point2,
        pub content: String,
        pub height: f64,
        pub rotation: f64,
        pub layer: String,
    }

    /// 多段线形式的填充边界环。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct HatchLoop {
        pub vertices: Vec<Point2>,
        pub is_closed: bool,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Hatch {
        pub pattern_name: String,
        pub is_solid: bool,
        pub loops: Vec<HatchLoop>,
        pub color: ColorMode,
        pub layer: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct BlockReference {
        pub name: String,
        pub insert: Point2,
        pub scale: Vector2,
        pub rotation: f64,
        pub color: ColorMode,
        pub layer: String,
    }

    /// 块定义：几何以块局部坐标存储，`base_point` 为局部零点。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct BlockDefinition {
        pub name: String,
        pub base_point: Point2,
        pub entities: Vec<Entity>,
    }

    impl BlockDefinition {
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                base_point: Point2::origin(),
                entities: Vec::new(),
            }
        }

        pub fn add_polyline<I>(&mut self, vertices: I, is_closed: bool, layer: impl Into<String>)
        where
            I: IntoIterator<Item = Point2>,
        {
            self.entities.push(Entity::Polyline(Polyline {
                vertices: vertices.into_iter().collect(),
                is_closed,
                layer: canonical_layer_name(layer.into()),
            }));
        }

        /// 原地平移块内全部几何。
        pub fn translate(&mut self, offset: Vector2) {
            for entity in &mut self.entities {
                if let Entity::Polyline(polyline) = entity {
                    for vertex in &mut polyline.vertices {
                        *vertex = vertex.translate(offset);
                    }
                }
            }
        }

        pub fn polylines(&self) -> impl Iterator<Item = &Polyline> {
            self.entities.iter().filter_map(|entity| match entity {
                Entity::Polyline(polyline) => Some(polyline),
                _ => None,
            })
        }
    }

    #[derive(Debug, Default, Clone, Serialize, Deserialize)]
    pub struct Document {
        layers: Vec<Layer>,
        layer_index: HashMap<String, usize>,
        entities: Vec<(EntityId, Entity)>,
        next_entity_id: u64,
        blocks: Vec<BlockDefinition>,
        block_index: HashMap<String, usize>,
    }

    impl Document {
        pub fn new() -> Self {
            let mut doc = Self::default();
            doc.ensure_layer(DEFAULT_LAYER);
            doc
        }

        /// 获取或创建图层；重复调用返回首次创建的图层。
        pub fn ensure_layer(&mut self, name: impl AsRef<str>) -> &Layer {
            let key = canonical_layer_name(name.as_ref().to_string());
            let index = match self.layer_index.get(&key) {
                Some(index) => *index,
                None => {
                    let index = self.layers.len();
                    self.layers.push(Layer::new(key.clone()));
                    self.layer_index.insert(key, index);
                    index
                }
            };
            &self.layers[index]
        }

        pub fn layer(&self, name: &str) -> Option<&Layer> {
            self.layer_index
                .get(name)
                .map(|index| &self.layers[*index])
        }

        pub fn add_polyline<I>(
            &mut self,
            vertices: I,
            is_closed: bool,
            layer: impl Into<String>,
        ) -> EntityId
        where
            I: IntoIterator<Item = Point2>,
        {
            let layer = canonical_layer_name(layer.into());
            self.ensure_layer(&layer);
            let id = self.next_id();
            self.entities.push((
                id,
                Entity::Polyline(Polyline {
                    vertices: vertices.into_iter().collect(),
                    is_closed,
                    layer,
                }),
            ));
            id
        }

        pub fn add_text(
            &mut self,
            insert: Point2,
            content: impl Into<String>,
            height: f64,
            rotation: f64,
            layer: impl Into<String>,
        ) -> EntityId {
            let layer = canonical_layer_name(layer.into());
            self.ensure_layer(&layer);
            let id = self.next_id();
            self.entities.push((
                id,
                Entity::Text(Text {
                    insert,
                    content: content.into(),
                    height,
                    rotation,
                    layer,
                }),
            ));
            id
        }

        /// 添加实心填充，边界使用世界坐标。
        pub fn add_hatch<I>(
            &mut self,
            boundary: I,
            color: ColorMode,
            layer: impl Into<String>,
        ) -> EntityId
        where
            I: IntoIterator<Item = Point2>,
        {
            let layer = canonical_layer_name(layer.into());
            self.ensure_layer(&layer);
            let id = self.next_id();
            self.entities.push((
                id,
                Entity::Hatch(Hatch {
                    pattern_name: "SOLID".to_string(),
                    is_solid: true,
                    loops: vec![HatchLoop {
                        vertices: boundary.into_iter().collect(),
                        is_closed: true,
                    }],
                    color,
                    layer,
                }),
            ));
            id
        }

        pub fn add_block_reference(
            &mut self,
            name: impl Into<String>,
            insert: Point2,
            color: ColorMode,
            layer: impl Into<String>,
        ) -> Result<EntityId, DocumentError> {
            let name = name.into();
            if !self.block_index.contains_key(&name) {
                return Err(DocumentError::UnknownBlock(name));
            }
            let layer = canonical_layer_name(layer.into());
            self.ensure_layer(&layer);
            let id = self.next_id();
            self.entities.push((
                id,
                Entity::BlockReference(BlockReference {
                    name,
                    insert,
                    scale: Vector2::new(1.0, 1.0),
                    rotation: 0.0,
                    color,
                    layer,
                }),
            ));
            Ok(id)
        }

        pub fn add_block_definition(
            &mut self,
            definition: BlockDefinition,
        ) -> Result<(), DocumentError> {
            if self.block_index.contains_key(&definition.name) {
                return Err(DocumentError::DuplicateBlock(definition.name));
            }
            for entity in &definition.entities {
                self.ensure_layer(entity.layer_name());
            }
            self.block_index
                .insert(definition.name.clone(), self.blocks.len());
            self.blocks.push(definition);
            Ok(())
        }

        #[inline]
        pub fn block(&self, name: &str) -> Option<&BlockDefinition> {
            self.block_index.get(name).map(|index| &self.blocks[*index])
        }

        #[inline]
        pub fn contains_block(&self, name: &str) -> bool {
            self.block_index.contains_key(name)
        }

        /// 按插入顺序遍历图层。
        #[inline]
        pub fn layers(&self) -> impl Iterator<Item = &Layer> {
            self.layers.iter()
        }

        #[inline]
        pub fn entities(&self) -> impl Iterator<Item = &(EntityId, Entity)> {
            self.entities.iter()
        }

        /// 按定义顺序遍历块。
        #[inline]
        pub fn blocks(&self) -> impl Iterator<Item = &BlockDefinition> {
            self.blocks.iter()
        }

        #[inline]
        pub fn entity(&self, id: EntityId) -> Option<&Entity> {
            self.entities.iter().find_map(|(entity_id, entity)| {
                if *entity_id == id { Some(entity) } else { None }
            })
        }

        pub fn bounds(&self) -> Option<Bounds2D> {
            let mut bounds = Bounds2D::empty();
            let mut has = false;
            for (_, entity) in &self.entities {
                if let Some(entity_bounds) = entity.bounds() {
                    bounds.include_bounds(&entity_bounds);
                    has = true;
                }
            }
            if has { Some(bounds) } else { None }
        }

        #[inline]
        fn next_id(&mut self) -> EntityId {
            let id = self.next_entity_id;
            self.next_entity_id += 1;
            EntityId(id)
        }
    }

    /// 空图层名落到默认图层。
    fn canonical_layer_name(name: String) -> String {
        if name.is_empty() {
            DEFAULT_LAYER.to_string()
        } else {
            name
        }
    }

}
