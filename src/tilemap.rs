use std::collections::BTreeMap;

/// Typed TMX-style property value. Colors stay in their raw packed form;
/// the projector decides how each kind crosses the VM boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Color(u32),
    Str(String),
    File(String),
}

pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A placed object inside an object layer. `tile_gid` is set for tile-backed
/// objects, whose class and default properties come from the tile record.
#[derive(Debug, Clone, PartialEq)]
pub struct MapObject {
    pub name: String,
    pub class: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub visible: bool,
    pub rotation: f64,
    pub tile_gid: Option<u32>,
    pub properties: PropertyMap,
}

impl MapObject {
    pub fn new(name: &str, class: &str) -> Self {
        Self {
            name: name.to_string(),
            class: class.to_string(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            visible: true,
            rotation: 0.0,
            tile_gid: None,
            properties: PropertyMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    pub opacity: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub properties: PropertyMap,
    /// Row-major cell gids, `width * height` entries. Empty for pure object
    /// layers.
    pub cells: Vec<u32>,
    pub objects: Vec<MapObject>,
}

impl Layer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            visible: true,
            opacity: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            properties: PropertyMap::new(),
            cells: Vec::new(),
            objects: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub class: String,
    pub properties: PropertyMap,
}

/// Parsed tilemap, the native source of truth the projector reads on every
/// call. Never cached on the script side.
#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub background_color: u32,
    pub properties: PropertyMap,
    pub layers: Vec<Layer>,
    pub tiles: BTreeMap<u32, Tile>,
}

impl TileMap {
    pub fn new(width: u32, height: u32, tile_width: u32, tile_height: u32) -> Self {
        Self {
            width,
            height,
            tile_width,
            tile_height,
            background_color: 0,
            properties: PropertyMap::new(),
            layers: Vec::new(),
            tiles: BTreeMap::new(),
        }
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Index of the first layer with the given name, or -1 — scripts treat
    /// the result as a plain number.
    pub fn layer_index_by_name(&self, name: &str) -> i32 {
        self.layers
            .iter()
            .position(|layer| layer.name == name)
            .map_or(-1, |i| i as i32)
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|layer| layer.name.as_str())
    }

    /// Cell gid at `(x, y)` in the given layer; 0 (no tile) when the layer
    /// or cell is out of range.
    pub fn tile_at(&self, layer: usize, x: u32, y: u32) -> u32 {
        let Some(layer) = self.layers.get(layer) else {
            return 0;
        };
        if x >= self.width || y >= self.height {
            return 0;
        }
        let index = (y * self.width + x) as usize;
        layer.cells.get(index).copied().unwrap_or(0)
    }

    pub fn tile(&self, gid: u32) -> Option<&Tile> {
        self.tiles.get(&gid)
    }

    /// An object's effective class: its own when set, otherwise the class of
    /// the tile backing it.
    pub fn object_class<'a>(&'a self, object: &'a MapObject) -> &'a str {
        if !object.class.is_empty() {
            return &object.class;
        }
        object
            .tile_gid
            .and_then(|gid| self.tiles.get(&gid))
            .map_or("", |tile| tile.class.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_layer_map() -> TileMap {
        let mut map = TileMap::new(2, 2, 16, 16);
        let mut ground = Layer::new("ground");
        ground.cells = vec![1, 2, 3, 4];
        map.layers.push(ground);
        map.layers.push(Layer::new("objects"));
        map
    }

    #[test]
    fn layer_lookup_by_name() {
        let map = two_layer_map();
        assert_eq!(map.layer_index_by_name("objects"), 1);
        assert_eq!(map.layer_index_by_name("missing"), -1);
    }

    #[test]
    fn tile_lookup_bounds() {
        let map = two_layer_map();
        assert_eq!(map.tile_at(0, 1, 1), 4);
        assert_eq!(map.tile_at(0, 2, 0), 0, "x out of range");
        assert_eq!(map.tile_at(5, 0, 0), 0, "layer out of range");
    }

    #[test]
    fn object_class_falls_back_to_tile_class() {
        let mut map = two_layer_map();
        map.tiles.insert(7, Tile { class: "coin".to_string(), properties: PropertyMap::new() });
        let mut object = MapObject::new("c1", "");
        object.tile_gid = Some(7);
        assert_eq!(map.object_class(&object), "coin");
        object.class = "door".to_string();
        assert_eq!(map.object_class(&object), "door");
    }
}
