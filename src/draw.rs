use glam::Vec2;

use crate::assets::AssetHandle;

/// One recorded draw operation. The rasterizer replays a submitted frame;
/// the bridge only validates and records.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    SetColor { r: u8, g: u8, b: u8, a: u8 },
    ResetTransform,
    Scale(Vec2),
    Rotate(f32),
    Translate(Vec2),
    SetScissor { x: i32, y: i32, w: i32, h: i32 },
    ResetScissor,
    UseCanvas(AssetHandle),
    ResetCanvas,
    UseShader(AssetHandle),
    ResetShader,
    SetTextStyle { font: AssetHandle, size: f32, line_height: f32, align: i32 },
    Rect { pos: Vec2, size: Vec2, outline: bool },
    Text { pos: Vec2, width: f32, text: String, len: usize },
    Image { image: AssetHandle, pos: Vec2, size: Vec2, scale: f32, flip_bits: u8, origin: Vec2 },
    Line { from: Vec2, to: Vec2 },
    Circle { center: Vec2, radius: f32, outline: bool },
    Tri { a: Vec2, b: Vec2, c: Vec2, outline: bool },
    MapLayer { map: AssetHandle, layer: i32, pos: Vec2, cell_x: u32, cell_y: u32, cell_w: u32, cell_h: u32 },
    Sprite { sheet: AssetHandle, id: i32, pos: Vec2, scale: f32, flip_bits: u8, w: i32, h: i32 },
    Clear { r: u8, g: u8, b: u8, a: u8 },
}

/// Draw-command recorder. Commands accumulate until `submit` closes the
/// frame; bind state is tracked so unbinds can be asserted.
pub struct DrawList {
    commands: Vec<DrawCmd>,
    last_frame: Vec<DrawCmd>,
    frames_submitted: u64,
    color: [u8; 4],
    canvas: Option<AssetHandle>,
    shader: Option<AssetHandle>,
}

impl DrawList {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            last_frame: Vec::new(),
            frames_submitted: 0,
            color: [255, 255, 255, 255],
            canvas: None,
            shader: None,
        }
    }

    pub fn push(&mut self, cmd: DrawCmd) {
        match &cmd {
            DrawCmd::SetColor { r, g, b, a } => self.color = [*r, *g, *b, *a],
            DrawCmd::UseCanvas(handle) => self.canvas = Some(*handle),
            DrawCmd::ResetCanvas => self.canvas = None,
            DrawCmd::UseShader(handle) => self.shader = Some(*handle),
            DrawCmd::ResetShader => self.shader = None,
            _ => {}
        }
        self.commands.push(cmd);
    }

    pub fn submit(&mut self) {
        self.last_frame = std::mem::take(&mut self.commands);
        self.frames_submitted += 1;
    }

    pub fn pending(&self) -> &[DrawCmd] {
        &self.commands
    }

    pub fn last_frame(&self) -> &[DrawCmd] {
        &self.last_frame
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    pub fn color(&self) -> [u8; 4] {
        self.color
    }

    pub fn bound_canvas(&self) -> Option<AssetHandle> {
        self.canvas
    }

    pub fn bound_shader(&self) -> Option<AssetHandle> {
        self.shader
    }
}

impl Default for DrawList {
    fn default() -> Self {
        Self::new()
    }
}
