use crate::api;
use crate::foreign::{self, ForeignCell};
use crate::host::Host;
use crate::projector;
use crate::slots::SlotStack;

/// A native trampoline: extracts arguments from the slot stack, performs the
/// native call against the host, and writes the return slot.
pub type ForeignFn = fn(&mut SlotStack, &mut Host);

/// One row of the foreign-method table. The table is built at compile time
/// and never mutated; adding a capability means adding one row.
pub struct MethodDef {
    pub module: &'static str,
    pub class: &'static str,
    pub is_static: bool,
    pub signature: &'static str,
    pub func: ForeignFn,
}

/// Allocation/finalization hooks for a foreign class. Invoked by the VM's
/// object lifecycle, never by trampolines.
pub struct ForeignClassDef {
    pub module: &'static str,
    pub class: &'static str,
    pub allocate: ForeignFn,
    pub finalize: fn(&mut ForeignCell),
}

/// Exact 4-tuple lookup. Linear scan: the table is small and the VM resolves
/// each call site once, not per call.
pub fn resolve(
    table: &[MethodDef],
    module: &str,
    class: &str,
    is_static: bool,
    signature: &str,
) -> Option<ForeignFn> {
    table
        .iter()
        .find(|m| {
            m.module == module
                && m.class == class
                && m.is_static == is_static
                && m.signature == signature
        })
        .map(|m| m.func)
}

pub fn resolve_class<'a>(
    table: &'a [ForeignClassDef],
    module: &str,
    class: &str,
) -> Option<&'a ForeignClassDef> {
    table.iter().find(|c| c.module == module && c.class == class)
}

/// The engine's entire scripting surface.
pub fn builtin_methods() -> &'static [MethodDef] {
    &METHODS
}

pub fn builtin_classes() -> &'static [ForeignClassDef] {
    &CLASSES
}

macro_rules! method {
    ($class:literal, $is_static:expr, $sig:literal, $func:path) => {
        MethodDef {
            module: "engine",
            class: $class,
            is_static: $is_static,
            signature: $sig,
            func: $func,
        }
    };
}

static METHODS: [MethodDef; 58] = [
    method!("Trap", true, "print(_)", api::trap_print),
    method!("Trap", true, "printWin_(_,_,_)", api::trap_dbg_window),
    method!("Trap", true, "error(_,_)", api::trap_error),
    method!("Trap", true, "console(_)", api::trap_console),
    method!("Trap", true, "sndPlay(_,_,_,_)", api::trap_snd_play),
    method!("Trap", true, "sndStop(_)", api::trap_snd_stop),
    method!("Trap", true, "sndPauseResume(_,_)", api::trap_snd_pause_resume),
    method!("Trap", true, "registerButtons(_)", api::trap_register_buttons),
    method!("Trap", true, "buttonPressed(_,_,_)", api::trap_button_pressed),
    method!("Trap", true, "mousePosition()", api::trap_mouse_position),
    method!("Trap", true, "getResolution()", api::trap_get_resolution),
    method!("Trap", true, "setWindowTitle(_)", api::trap_set_window_title),
    method!("Trap", true, "getPlatform()", api::trap_get_platform),
    method!("CVar", false, "bool()", foreign::cvar_bool),
    method!("CVar", false, "number()", foreign::cvar_number),
    method!("CVar", false, "string()", foreign::cvar_string),
    method!("CVar", false, "set(_)", foreign::cvar_set),
    method!("Asset", true, "create(_,_,_,_)", api::asset_create),
    method!("Asset", true, "find(_)", api::asset_find),
    method!("Asset", true, "load(_)", api::asset_load),
    method!("Asset", true, "loadAll()", api::asset_load_all),
    method!("Asset", true, "clearAll()", api::asset_clear_all),
    method!("Asset", true, "loadINI(_)", api::asset_load_ini),
    method!("Asset", true, "bmpfntSet(_,_,_,_,_,_)", api::asset_bmpfnt_set),
    method!("Asset", true, "textWidth(_,_,_)", api::asset_text_width),
    method!("Asset", true, "breakString(_,_)", api::asset_break_string),
    method!("Asset", true, "spriteSet(_,_,_,_,_)", api::asset_sprite_set),
    method!("Asset", true, "imageSize(_)", api::asset_image_size),
    method!("Asset", true, "canvasSet(_,_,_)", api::asset_canvas_set),
    method!("Asset", true, "shaderSet(_,_,_,_)", api::asset_shader_set),
    method!("Draw", true, "setColor(_,_,_,_)", api::dc_set_color),
    method!("Draw", true, "resetTransform()", api::dc_reset_transform),
    method!("Draw", true, "scale(_,_)", api::dc_scale),
    method!("Draw", true, "rotate(_)", api::dc_rotate),
    method!("Draw", true, "translate(_,_)", api::dc_translate),
    method!("Draw", true, "setScissor(_,_,_,_)", api::dc_set_scissor),
    method!("Draw", true, "resetScissor()", api::dc_reset_scissor),
    method!("Draw", true, "useCanvas(_)", api::dc_use_canvas),
    method!("Draw", true, "useShader(_)", api::dc_use_shader),
    method!("Draw", true, "rect(_,_,_,_,_)", api::dc_draw_rect),
    method!("Draw", true, "setTextStyle(_,_,_,_)", api::dc_set_text_style),
    method!("Draw", true, "text(_,_,_,_,_)", api::dc_draw_text),
    method!("Draw", true, "image(_,_,_,_,_,_,_,_,_)", api::dc_draw_image),
    method!("Draw", true, "line(_,_,_,_)", api::dc_draw_line),
    method!("Draw", true, "circle(_,_,_,_)", api::dc_draw_circle),
    method!("Draw", true, "tri(_,_,_,_,_,_,_)", api::dc_draw_tri),
    method!("Draw", true, "mapLayer(_,_,_,_,_,_,_)", api::dc_draw_map_layer),
    method!("Draw", true, "sprite(_,_,_,_,_,_,_,_)", api::dc_draw_sprite),
    method!("Draw", true, "submit()", api::dc_submit),
    method!("Draw", true, "clear(_,_,_,_)", api::dc_clear),
    method!("TileMap", true, "setCurrent(_)", projector::map_set_current),
    method!("TileMap", true, "layerByName(_)", projector::map_layer_by_name),
    method!("TileMap", true, "layerNames()", projector::map_layer_names),
    method!("TileMap", true, "objectsInLayer(_)", projector::map_objects_in_layer),
    method!("TileMap", true, "getMapProperties()", projector::map_properties),
    method!("TileMap", true, "getLayerProperties(_)", projector::map_layer_properties),
    method!("TileMap", true, "getTileProperties()", projector::map_tile_properties),
    method!("TileMap", true, "getTile(_,_,_)", projector::map_get_tile),
];

static CLASSES: [ForeignClassDef; 1] = [ForeignClassDef {
    module: "engine",
    class: "CVar",
    allocate: foreign::cvar_allocate,
    finalize: foreign::cvar_finalize,
}];
