use crate::assets::{AssetHandle, AssetStore};
use crate::audio::AudioMixer;
use crate::console::Console;
use crate::draw::DrawList;
use crate::input::Input;
use crate::tilemap::TileMap;

fn platform_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_family = "wasm") {
        "emscripten"
    } else {
        "unknown"
    }
}

/// Everything native a trampoline may touch, passed by reference into each
/// call. Per-session state like the selected tilemap lives here rather than
/// in process globals.
pub struct Host {
    pub console: Console,
    pub audio: AudioMixer,
    pub input: Input,
    pub draw: DrawList,
    pub assets: AssetStore,
    pub window_title: String,
    pub resolution: (u32, u32),
    pub platform: &'static str,
    /// Tilemap selected by the last `TileMap.setCurrent` call. Queries
    /// against an unselected or cleared map are lookup misses, not errors.
    pub current_map: AssetHandle,
}

impl Host {
    pub fn new() -> Self {
        Self {
            console: Console::default(),
            audio: AudioMixer::new(),
            input: Input::new(),
            draw: DrawList::new(),
            assets: AssetStore::new(),
            window_title: String::new(),
            resolution: (1280, 720),
            platform: platform_name(),
            current_map: 0,
        }
    }

    pub fn current_tilemap(&self) -> Option<&TileMap> {
        self.assets.tilemap(self.current_map)
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}
