use glam::Vec2;
use smallvec::SmallVec;

use crate::assets::{
    AssetFlags, AssetHandle, AssetKind, BitmapFontConfig, CanvasConfig, ShaderConfig, SpriteConfig,
};
use crate::console::{Console, ErrorLevel};
use crate::draw::DrawCmd;
use crate::host::Host;
use crate::slots::{SlotStack, ValueKind};

/// Declared expectation for one argument slot. `Any` skips the check.
#[derive(Debug, Clone, Copy)]
pub enum Expect {
    Kind(ValueKind),
    Any,
}

pub const BOOL: Expect = Expect::Kind(ValueKind::Bool);
pub const NUM: Expect = Expect::Kind(ValueKind::Num);
pub const STR: Expect = Expect::Kind(ValueKind::Str);
pub const LIST: Expect = Expect::Kind(ValueKind::List);
pub const ANY: Expect = Expect::Any;

/// Validates argument slots 1..=N against the declared expectations. On the
/// first mismatch, prints one diagnostic line naming the expected kind, the
/// 1-based position, and the actual kind, and returns false — the caller
/// must then return without performing its native side effect.
pub fn check_args(slots: &SlotStack, console: &mut Console, expected: &[Expect]) -> bool {
    for (i, expect) in expected.iter().enumerate() {
        let slot = i + 1;
        let Expect::Kind(kind) = expect else {
            continue;
        };
        let actual = slots.kind(slot);
        if actual != *kind {
            console.print(format!(
                "Expected {} in parameter {}, got {}.",
                kind.name(),
                slot,
                actual.name()
            ));
            return false;
        }
    }
    true
}

// --- Trap module -----------------------------------------------------------

pub fn trap_print(slots: &mut SlotStack, host: &mut Host) {
    let message = slots.str(1).to_string();
    host.console.print(message);
}

pub fn trap_dbg_window(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[STR, STR, STR]) {
        return;
    }
    let title = slots.str(1).to_string();
    let key = slots.str(2).to_string();
    let value = slots.str(3).to_string();
    host.console.overlay_text(&title, &key, &value);
}

pub fn trap_console(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[STR]) {
        return;
    }
    let command = slots.str(1).to_string();
    host.console.send_command(command);
}

pub fn trap_error(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, STR]) {
        return;
    }
    let level = ErrorLevel::from_code(slots.num(1) as i32);
    let message = format!("script: {}", slots.str(2));
    host.console.error(level, message);
}

pub fn trap_snd_play(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM, NUM, BOOL]) {
        return;
    }
    let asset = slots.num(1) as AssetHandle;
    let volume = slots.num(2) as f32;
    let pan = slots.num(3) as f32;
    let looping = slots.bool(4);
    let handle = host.audio.play(asset, volume, pan, looping);
    slots.set_num(0, f64::from(handle));
}

pub fn trap_snd_stop(slots: &mut SlotStack, host: &mut Host) {
    // Null means "stop nothing"; scripts pass it when a sound never started.
    if slots.kind(1) == ValueKind::Null {
        return;
    }
    if !check_args(slots, &mut host.console, &[NUM]) {
        return;
    }
    host.audio.stop(slots.num(1) as u32);
}

pub fn trap_snd_pause_resume(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, BOOL]) {
        return;
    }
    host.audio.pause_resume(slots.num(1) as u32, slots.bool(2));
}

pub fn trap_register_buttons(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[LIST]) {
        return;
    }
    let count = slots.list_count(1);
    slots.ensure(count + 2);
    let mut names: SmallVec<[String; 8]> = SmallVec::with_capacity(count);
    for i in 0..count {
        slots.get_list_element(1, i, i + 2);
        names.push(slots.str(i + 2).to_string());
    }
    host.input.register_buttons(&names);
}

pub fn trap_button_pressed(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM, NUM]) {
        return;
    }
    let button = slots.num(1) as usize;
    let delay = slots.num(2) as u32;
    let repeat = slots.num(3) as u32;
    let pressed = host.input.button_pressed(button, delay, repeat);
    slots.set_bool(0, pressed);
}

pub fn trap_mouse_position(slots: &mut SlotStack, host: &mut Host) {
    let (x, y) = host.input.mouse_position();
    slots.ensure(3);
    slots.new_list(0);
    slots.set_num(1, f64::from(x));
    slots.set_num(2, f64::from(y));
    slots.insert_in_list(0, -1, 1);
    slots.insert_in_list(0, -1, 2);
}

pub fn trap_get_resolution(slots: &mut SlotStack, host: &mut Host) {
    let (width, height) = host.resolution;
    slots.ensure(3);
    slots.new_list(0);
    slots.set_num(1, f64::from(width));
    slots.set_num(2, f64::from(height));
    slots.insert_in_list(0, -1, 1);
    slots.insert_in_list(0, -1, 2);
}

pub fn trap_set_window_title(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[STR]) {
        return;
    }
    let title = slots.str(1);
    if title.is_empty() {
        return;
    }
    host.window_title = title.to_string();
}

pub fn trap_get_platform(slots: &mut SlotStack, host: &mut Host) {
    slots.ensure(1);
    slots.set_str(0, host.platform);
}

// --- Asset module ----------------------------------------------------------

pub fn asset_create(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, STR, STR, NUM]) {
        return;
    }
    let Some(kind) = AssetKind::from_code(slots.num(1) as i32) else {
        let code = slots.num(1);
        host.console.error(ErrorLevel::Game, format!("unknown asset type {code}"));
        return;
    };
    let name = slots.str(2).to_string();
    let path = slots.str(3).to_string();
    let flags = AssetFlags::from_bits_truncate(slots.num(4) as u32);
    let handle = host.assets.create(kind, &name, &path, flags);
    slots.set_num(0, f64::from(handle));
}

pub fn asset_find(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[STR]) {
        return;
    }
    let name = slots.str(1).to_string();
    match host.assets.find(&name) {
        Some(handle) => slots.set_num(0, f64::from(handle)),
        None => host.console.error(ErrorLevel::Fatal, format!("can't find asset {name}")),
    }
}

pub fn asset_load(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM]) {
        return;
    }
    host.assets.load(slots.num(1) as AssetHandle);
}

pub fn asset_load_all(_slots: &mut SlotStack, host: &mut Host) {
    host.assets.load_all();
}

pub fn asset_clear_all(_slots: &mut SlotStack, host: &mut Host) {
    host.assets.clear_all();
}

pub fn asset_load_ini(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[STR]) {
        return;
    }
    let name = slots.str(1).to_string();
    host.assets.load_ini(&name);
}

pub fn asset_bmpfnt_set(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, STR, NUM, NUM, NUM, NUM]) {
        return;
    }
    let handle = slots.num(1) as AssetHandle;
    let config = BitmapFontConfig {
        glyphs: slots.str(2).to_string(),
        glyph_width: slots.num(3) as u32,
        char_spacing: slots.num(4) as u32,
        space_width: slots.num(5) as u32,
        line_height: slots.num(6) as u32,
    };
    host.assets.set_bitmap_font(handle, config);
}

pub fn asset_text_width(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, STR, NUM]) {
        return;
    }
    let font = slots.num(1) as AssetHandle;
    let width = host.assets.text_width(font, slots.str(2), slots.num(3) as f32);
    slots.set_num(0, width);
}

pub fn asset_break_string(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, STR]) {
        return;
    }
    let width = slots.num(1) as i32;
    let wrapped = host.assets.break_string(width, slots.str(2));
    slots.set_str(0, wrapped);
}

pub fn asset_sprite_set(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM, NUM, NUM, NUM]) {
        return;
    }
    let handle = slots.num(1) as AssetHandle;
    let config = SpriteConfig {
        width: slots.num(2) as u32,
        height: slots.num(3) as u32,
        margin_x: slots.num(4) as u32,
        margin_y: slots.num(5) as u32,
    };
    host.assets.set_sprite(handle, config);
}

pub fn asset_canvas_set(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM, NUM]) {
        return;
    }
    let handle = slots.num(1) as AssetHandle;
    let config = CanvasConfig { width: slots.num(2) as u32, height: slots.num(3) as u32 };
    host.assets.set_canvas(handle, config);
}

pub fn asset_shader_set(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, BOOL, STR, STR]) {
        return;
    }
    let handle = slots.num(1) as AssetHandle;
    let config = ShaderConfig {
        from_file: slots.bool(2),
        vertex: slots.str(3).to_string(),
        fragment: slots.str(4).to_string(),
    };
    host.assets.set_shader(handle, config);
}

pub fn asset_image_size(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM]) {
        return;
    }
    let (width, height) = host.assets.image_size(slots.num(1) as AssetHandle);
    slots.ensure(3);
    slots.new_list(0);
    slots.set_num(1, f64::from(width));
    slots.set_num(2, f64::from(height));
    slots.insert_in_list(0, -1, 1);
    slots.insert_in_list(0, -1, 2);
}

// --- Draw module -----------------------------------------------------------

pub fn dc_set_color(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM, NUM, NUM]) {
        return;
    }
    host.draw.push(DrawCmd::SetColor {
        r: slots.num(1) as u8,
        g: slots.num(2) as u8,
        b: slots.num(3) as u8,
        a: slots.num(4) as u8,
    });
}

pub fn dc_reset_transform(_slots: &mut SlotStack, host: &mut Host) {
    host.draw.push(DrawCmd::ResetTransform);
}

pub fn dc_scale(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM]) {
        return;
    }
    host.draw.push(DrawCmd::Scale(Vec2::new(slots.num(1) as f32, slots.num(2) as f32)));
}

pub fn dc_rotate(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM]) {
        return;
    }
    host.draw.push(DrawCmd::Rotate(slots.num(1) as f32));
}

pub fn dc_translate(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM]) {
        return;
    }
    host.draw.push(DrawCmd::Translate(Vec2::new(slots.num(1) as f32, slots.num(2) as f32)));
}

pub fn dc_set_scissor(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM, NUM, NUM]) {
        return;
    }
    host.draw.push(DrawCmd::SetScissor {
        x: slots.num(1) as i32,
        y: slots.num(2) as i32,
        w: slots.num(3) as i32,
        h: slots.num(4) as i32,
    });
}

pub fn dc_reset_scissor(_slots: &mut SlotStack, host: &mut Host) {
    host.draw.push(DrawCmd::ResetScissor);
}

pub fn dc_use_canvas(slots: &mut SlotStack, host: &mut Host) {
    if slots.kind(1) == ValueKind::Null {
        host.draw.push(DrawCmd::ResetCanvas);
        return;
    }
    if !check_args(slots, &mut host.console, &[NUM]) {
        return;
    }
    host.draw.push(DrawCmd::UseCanvas(slots.num(1) as AssetHandle));
}

pub fn dc_use_shader(slots: &mut SlotStack, host: &mut Host) {
    if slots.kind(1) == ValueKind::Null {
        host.draw.push(DrawCmd::ResetShader);
        return;
    }
    if !check_args(slots, &mut host.console, &[NUM]) {
        return;
    }
    host.draw.push(DrawCmd::UseShader(slots.num(1) as AssetHandle));
}

pub fn dc_set_text_style(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM, NUM, NUM]) {
        return;
    }
    host.draw.push(DrawCmd::SetTextStyle {
        font: slots.num(1) as AssetHandle,
        size: slots.num(2) as f32,
        line_height: slots.num(3) as f32,
        align: slots.num(4) as i32,
    });
}

pub fn dc_draw_rect(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM, NUM, NUM, BOOL]) {
        return;
    }
    host.draw.push(DrawCmd::Rect {
        pos: Vec2::new(slots.num(1) as f32, slots.num(2) as f32),
        size: Vec2::new(slots.num(3) as f32, slots.num(4) as f32),
        outline: slots.bool(5),
    });
}

pub fn dc_draw_text(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM, NUM, STR, NUM]) {
        return;
    }
    host.draw.push(DrawCmd::Text {
        pos: Vec2::new(slots.num(1) as f32, slots.num(2) as f32),
        width: slots.num(3) as f32,
        text: slots.str(4).to_string(),
        len: slots.num(5) as usize,
    });
}

pub fn dc_draw_image(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM, NUM, NUM, NUM, NUM, NUM, NUM, NUM]) {
        return;
    }
    host.draw.push(DrawCmd::Image {
        image: slots.num(1) as AssetHandle,
        pos: Vec2::new(slots.num(2) as f32, slots.num(3) as f32),
        size: Vec2::new(slots.num(4) as f32, slots.num(5) as f32),
        scale: slots.num(6) as f32,
        flip_bits: slots.num(7) as u8,
        origin: Vec2::new(slots.num(8) as f32, slots.num(9) as f32),
    });
}

pub fn dc_draw_line(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM, NUM, NUM]) {
        return;
    }
    host.draw.push(DrawCmd::Line {
        from: Vec2::new(slots.num(1) as f32, slots.num(2) as f32),
        to: Vec2::new(slots.num(3) as f32, slots.num(4) as f32),
    });
}

pub fn dc_draw_circle(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM, NUM, BOOL]) {
        return;
    }
    host.draw.push(DrawCmd::Circle {
        center: Vec2::new(slots.num(1) as f32, slots.num(2) as f32),
        radius: slots.num(3) as f32,
        outline: slots.bool(4),
    });
}

pub fn dc_draw_tri(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM, NUM, NUM, NUM, NUM, BOOL]) {
        return;
    }
    host.draw.push(DrawCmd::Tri {
        a: Vec2::new(slots.num(1) as f32, slots.num(2) as f32),
        b: Vec2::new(slots.num(3) as f32, slots.num(4) as f32),
        c: Vec2::new(slots.num(5) as f32, slots.num(6) as f32),
        outline: slots.bool(7),
    });
}

pub fn dc_draw_map_layer(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM, NUM, NUM, NUM, NUM, NUM]) {
        return;
    }
    host.draw.push(DrawCmd::MapLayer {
        map: host.current_map,
        layer: slots.num(1) as i32,
        pos: Vec2::new(slots.num(2) as f32, slots.num(3) as f32),
        cell_x: slots.num(4) as u32,
        cell_y: slots.num(5) as u32,
        cell_w: slots.num(6) as u32,
        cell_h: slots.num(7) as u32,
    });
}

pub fn dc_draw_sprite(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM, NUM, NUM, NUM, NUM, NUM, NUM]) {
        return;
    }
    host.draw.push(DrawCmd::Sprite {
        sheet: slots.num(1) as AssetHandle,
        id: slots.num(2) as i32,
        pos: Vec2::new(slots.num(3) as f32, slots.num(4) as f32),
        scale: slots.num(5) as f32,
        flip_bits: slots.num(6) as u8,
        w: slots.num(7) as i32,
        h: slots.num(8) as i32,
    });
}

pub fn dc_submit(_slots: &mut SlotStack, host: &mut Host) {
    host.draw.submit();
}

pub fn dc_clear(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM, NUM, NUM]) {
        return;
    }
    host.draw.push(DrawCmd::Clear {
        r: slots.num(1) as u8,
        g: slots.num(2) as u8,
        b: slots.num(3) as u8,
        a: slots.num(4) as u8,
    });
}
