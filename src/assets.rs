use std::collections::HashMap;

use bitflags::bitflags;

use crate::tilemap::TileMap;

/// Opaque value-type asset identifier handed to scripts. Never a pointer.
pub type AssetHandle = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Sprite,
    Sound,
    Font,
    BitmapFont,
    Canvas,
    Shader,
    Tilemap,
}

impl AssetKind {
    /// Scripts pass the kind as a number; out-of-range codes are rejected by
    /// the trampoline rather than mapped to a default.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(AssetKind::Image),
            1 => Some(AssetKind::Sprite),
            2 => Some(AssetKind::Sound),
            3 => Some(AssetKind::Font),
            4 => Some(AssetKind::BitmapFont),
            5 => Some(AssetKind::Canvas),
            6 => Some(AssetKind::Shader),
            7 => Some(AssetKind::Tilemap),
            _ => None,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AssetFlags: u32 {
        const PRELOAD = 1 << 0;
        const LINEAR_FILTER = 1 << 1;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BitmapFontConfig {
    pub glyphs: String,
    pub glyph_width: u32,
    pub char_spacing: u32,
    pub space_width: u32,
    pub line_height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteConfig {
    pub width: u32,
    pub height: u32,
    pub margin_x: u32,
    pub margin_y: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShaderConfig {
    pub from_file: bool,
    pub vertex: String,
    pub fragment: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssetPayload {
    None,
    Image { width: u32, height: u32 },
    BitmapFont(BitmapFontConfig),
    Sprite(SpriteConfig),
    Canvas(CanvasConfig),
    Shader(ShaderConfig),
    Tilemap(TileMap),
}

#[derive(Debug, Clone)]
pub struct Asset {
    pub handle: AssetHandle,
    pub kind: AssetKind,
    pub name: String,
    pub path: String,
    pub flags: AssetFlags,
    pub loaded: bool,
    pub payload: AssetPayload,
}

/// Asset registry facade. Handles are indices into an append-only table;
/// `clear_all` resets the table between scenes.
pub struct AssetStore {
    assets: Vec<Asset>,
    by_name: HashMap<String, AssetHandle>,
    ini_batches: Vec<String>,
    fallback_glyph_width: u32,
}

impl AssetStore {
    pub fn new() -> Self {
        Self {
            assets: Vec::new(),
            by_name: HashMap::new(),
            ini_batches: Vec::new(),
            fallback_glyph_width: 8,
        }
    }

    /// Registers an asset, or returns the existing handle when the name is
    /// already taken. Loading is deferred until `load`/`load_all`.
    pub fn create(&mut self, kind: AssetKind, name: &str, path: &str, flags: AssetFlags) -> AssetHandle {
        if let Some(&handle) = self.by_name.get(name) {
            return handle;
        }
        let handle = self.assets.len() as AssetHandle;
        self.assets.push(Asset {
            handle,
            kind,
            name: name.to_string(),
            path: path.to_string(),
            flags,
            loaded: false,
            payload: AssetPayload::None,
        });
        self.by_name.insert(name.to_string(), handle);
        handle
    }

    pub fn find(&self, name: &str) -> Option<AssetHandle> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, handle: AssetHandle) -> Option<&Asset> {
        self.assets.get(handle as usize)
    }

    fn get_mut(&mut self, handle: AssetHandle) -> Option<&mut Asset> {
        self.assets.get_mut(handle as usize)
    }

    pub fn load(&mut self, handle: AssetHandle) {
        if let Some(asset) = self.get_mut(handle) {
            asset.loaded = true;
        }
    }

    pub fn load_all(&mut self) {
        for asset in &mut self.assets {
            asset.loaded = true;
        }
    }

    pub fn clear_all(&mut self) {
        self.assets.clear();
        self.by_name.clear();
    }

    /// Records a batch-definition file for the loader to expand. Parsing the
    /// INI itself belongs to the asset loader, not the bridge.
    pub fn load_ini(&mut self, name: &str) {
        self.ini_batches.push(name.to_string());
    }

    pub fn ini_batches(&self) -> &[String] {
        &self.ini_batches
    }

    pub fn count(&self) -> usize {
        self.assets.len()
    }

    pub fn set_bitmap_font(&mut self, handle: AssetHandle, config: BitmapFontConfig) {
        if let Some(asset) = self.get_mut(handle) {
            asset.payload = AssetPayload::BitmapFont(config);
        }
    }

    pub fn set_sprite(&mut self, handle: AssetHandle, config: SpriteConfig) {
        if let Some(asset) = self.get_mut(handle) {
            asset.payload = AssetPayload::Sprite(config);
        }
    }

    pub fn set_canvas(&mut self, handle: AssetHandle, config: CanvasConfig) {
        if let Some(asset) = self.get_mut(handle) {
            asset.payload = AssetPayload::Canvas(config);
        }
    }

    pub fn set_shader(&mut self, handle: AssetHandle, config: ShaderConfig) {
        if let Some(asset) = self.get_mut(handle) {
            asset.payload = AssetPayload::Shader(config);
        }
    }

    pub fn set_image_size(&mut self, handle: AssetHandle, width: u32, height: u32) {
        if let Some(asset) = self.get_mut(handle) {
            asset.payload = AssetPayload::Image { width, height };
        }
    }

    pub fn image_size(&self, handle: AssetHandle) -> (u32, u32) {
        match self.get(handle).map(|a| &a.payload) {
            Some(AssetPayload::Image { width, height }) => (*width, *height),
            Some(AssetPayload::Canvas(config)) => (config.width, config.height),
            _ => (0, 0),
        }
    }

    pub fn insert_tilemap(&mut self, name: &str, path: &str, map: TileMap) -> AssetHandle {
        let handle = self.create(AssetKind::Tilemap, name, path, AssetFlags::empty());
        if let Some(asset) = self.get_mut(handle) {
            asset.loaded = true;
            asset.payload = AssetPayload::Tilemap(map);
        }
        handle
    }

    pub fn tilemap(&self, handle: AssetHandle) -> Option<&TileMap> {
        match self.get(handle).map(|a| &a.payload) {
            Some(AssetPayload::Tilemap(map)) => Some(map),
            _ => None,
        }
    }

    fn glyph_advance(&self, font: AssetHandle) -> u32 {
        match self.get(font).map(|a| &a.payload) {
            Some(AssetPayload::BitmapFont(config)) => config.glyph_width + config.char_spacing,
            _ => self.fallback_glyph_width,
        }
    }

    pub fn text_width(&self, font: AssetHandle, text: &str, scale: f32) -> f64 {
        let advance = self.glyph_advance(font) as f64;
        text.chars().count() as f64 * advance * f64::from(scale)
    }

    /// Greedy word wrap against the fallback glyph advance. The rasterizer
    /// owns proportional measurement; this mirrors its monospace path.
    pub fn break_string(&self, width: i32, text: &str) -> String {
        let columns = (width.max(self.fallback_glyph_width as i32) as usize
            / self.fallback_glyph_width as usize)
            .max(1);
        let mut out = String::new();
        let mut line_len = 0usize;
        for word in text.split_whitespace() {
            let word_len = word.chars().count();
            if line_len == 0 {
                out.push_str(word);
                line_len = word_len;
            } else if line_len + 1 + word_len > columns {
                out.push('\n');
                out.push_str(word);
                line_len = word_len;
            } else {
                out.push(' ');
                out.push_str(word);
                line_len += 1 + word_len;
            }
        }
        out
    }
}

impl Default for AssetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_dedupes_by_name() {
        let mut store = AssetStore::new();
        let a = store.create(AssetKind::Image, "logo", "gfx/logo.png", AssetFlags::empty());
        let b = store.create(AssetKind::Image, "logo", "gfx/logo.png", AssetFlags::PRELOAD);
        assert_eq!(a, b);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn find_after_clear_misses() {
        let mut store = AssetStore::new();
        store.create(AssetKind::Sound, "jump", "sfx/jump.wav", AssetFlags::empty());
        assert!(store.find("jump").is_some());
        store.clear_all();
        assert!(store.find("jump").is_none());
    }

    #[test]
    fn text_width_uses_font_metrics() {
        let mut store = AssetStore::new();
        let font = store.create(AssetKind::BitmapFont, "hud", "gfx/hud.png", AssetFlags::empty());
        store.set_bitmap_font(
            font,
            BitmapFontConfig {
                glyphs: "abc".to_string(),
                glyph_width: 6,
                char_spacing: 2,
                space_width: 4,
                line_height: 10,
            },
        );
        assert_eq!(store.text_width(font, "abcd", 2.0), 4.0 * 8.0 * 2.0);
    }

    #[test]
    fn break_string_wraps_on_word_boundaries() {
        let store = AssetStore::new();
        // 10 columns at the fallback 8px advance.
        let wrapped = store.break_string(80, "one two three four");
        assert_eq!(wrapped, "one two\nthree four");
    }
}
