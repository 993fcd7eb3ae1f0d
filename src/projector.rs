use crate::api::{check_args, NUM, STR};
use crate::assets::AssetHandle;
use crate::host::Host;
use crate::slots::SlotStack;
use crate::tilemap::{PropertyMap, PropertyValue};

/// Appends each native property as a key/value pair into the map held at
/// `prop_slot`, advancing `cursor` past the scratch slots it consumes.
/// Conversion rules: int/float -> number, bool -> bool, color -> number (raw
/// packed value), everything else -> string.
///
/// Re-entrant: projecting a second source into the same destination merges,
/// with later keys overwriting earlier ones (the map is last-write-wins).
pub fn project_properties(
    slots: &mut SlotStack,
    prop_slot: usize,
    cursor: &mut usize,
    properties: Option<&PropertyMap>,
) {
    let Some(properties) = properties else {
        return;
    };
    for (name, value) in properties {
        // Two slots per pair: key, value.
        slots.ensure(*cursor + 2);
        slots.set_str(*cursor, name.clone());
        *cursor += 1;
        match value {
            PropertyValue::Int(v) => slots.set_num(*cursor, *v as f64),
            PropertyValue::Float(v) => slots.set_num(*cursor, *v),
            PropertyValue::Bool(v) => slots.set_bool(*cursor, *v),
            PropertyValue::Color(v) => slots.set_num(*cursor, f64::from(*v)),
            PropertyValue::Str(v) | PropertyValue::File(v) => slots.set_str(*cursor, v.clone()),
        }
        *cursor += 1;
        slots.insert_in_map(prop_slot, *cursor - 2, *cursor - 1);
    }
}

pub fn map_set_current(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM]) {
        return;
    }
    host.current_map = slots.num(1) as AssetHandle;
}

pub fn map_layer_by_name(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[STR]) {
        return;
    }
    let name = slots.str(1).to_string();
    let index = host.current_tilemap().map_or(-1, |map| map.layer_index_by_name(&name));
    slots.set_num(0, f64::from(index));
}

pub fn map_layer_names(slots: &mut SlotStack, host: &mut Host) {
    slots.new_list(0);
    let Some(map) = host.current_tilemap() else {
        return;
    };
    let mut slot = 1;
    for name in map.layer_names() {
        slots.ensure(slot + 1);
        slots.set_str(slot, name.to_string());
        slots.insert_in_list(0, -1, slot);
        slot += 1;
    }
}

const OBJECT_KEYS: [&str; 9] =
    ["name", "type", "x", "y", "width", "height", "visible", "rotation", "properties"];

/// Projects every object in a layer as a list of dictionaries. Tile-backed
/// objects merge the tile's default properties first so instance properties
/// override them.
pub fn map_objects_in_layer(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM]) {
        return;
    }
    let layer_index = slots.num(1) as i32;

    let mut s = 1;
    slots.ensure(s + OBJECT_KEYS.len());
    slots.new_list(0);

    // Keys sit in low slots and are reused for every object.
    for key in OBJECT_KEYS {
        slots.set_str(s, key);
        s += 1;
    }

    let Some(map) = host.current_tilemap() else {
        return;
    };
    if layer_index < 0 {
        return;
    }
    let Some(layer) = map.layer(layer_index as usize) else {
        return;
    };

    for object in &layer.objects {
        slots.ensure(s + OBJECT_KEYS.len() + 1);

        let map_slot = s;
        s += 1;
        slots.new_map(map_slot);
        slots.insert_in_list(0, -1, map_slot);

        // Values in the same order as OBJECT_KEYS.
        slots.set_str(s, object.name.clone());
        s += 1;
        slots.set_str(s, map.object_class(object).to_string());
        s += 1;
        slots.set_num(s, object.x);
        s += 1;
        slots.set_num(s, object.y);
        s += 1;
        slots.set_num(s, object.width);
        s += 1;
        slots.set_num(s, object.height);
        s += 1;
        slots.set_bool(s, object.visible);
        s += 1;
        slots.set_num(s, object.rotation);
        s += 1;

        let prop_slot = s;
        s += 1;
        slots.new_map(prop_slot);

        // Defaults from the backing tile first; the object's own properties
        // land second and win on duplicate keys.
        if let Some(tile) = object.tile_gid.and_then(|gid| map.tile(gid)) {
            project_properties(slots, prop_slot, &mut s, Some(&tile.properties));
        }
        project_properties(slots, prop_slot, &mut s, Some(&object.properties));

        for i in 0..OBJECT_KEYS.len() {
            // Keys start at slot 1; values follow the object's map slot.
            slots.insert_in_map(map_slot, i + 1, map_slot + 1 + i);
        }
    }
}

const MAP_KEYS: [&str; 6] =
    ["width", "height", "tileWidth", "tileHeight", "backgroundColor", "properties"];

pub fn map_properties(slots: &mut SlotStack, host: &mut Host) {
    let Some(map) = host.current_tilemap() else {
        return;
    };

    let mut s = 1;
    slots.ensure(s + MAP_KEYS.len() * 2);
    slots.new_map(0);

    for key in MAP_KEYS {
        slots.set_str(s, key);
        s += 1;
    }

    slots.set_num(s, f64::from(map.width));
    s += 1;
    slots.set_num(s, f64::from(map.height));
    s += 1;
    slots.set_num(s, f64::from(map.tile_width));
    s += 1;
    slots.set_num(s, f64::from(map.tile_height));
    s += 1;
    slots.set_num(s, f64::from(map.background_color));
    s += 1;

    let prop_slot = s;
    s += 1;
    slots.new_map(prop_slot);
    project_properties(slots, prop_slot, &mut s, Some(&map.properties));

    for i in 0..MAP_KEYS.len() {
        slots.insert_in_map(0, 1 + i, 1 + MAP_KEYS.len() + i);
    }
}

const LAYER_KEYS: [&str; 6] = ["name", "visible", "opacity", "offsetX", "offsetY", "properties"];

pub fn map_layer_properties(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM]) {
        return;
    }
    let layer_index = slots.num(1) as i32;
    if layer_index < 0 {
        return;
    }
    let Some(layer) = host.current_tilemap().and_then(|map| map.layer(layer_index as usize))
    else {
        return;
    };

    let mut s = 1;
    slots.ensure(s + LAYER_KEYS.len() * 2);
    slots.new_map(0);

    for key in LAYER_KEYS {
        slots.set_str(s, key);
        s += 1;
    }

    slots.set_str(s, layer.name.clone());
    s += 1;
    slots.set_bool(s, layer.visible);
    s += 1;
    slots.set_num(s, layer.opacity);
    s += 1;
    slots.set_num(s, layer.offset_x);
    s += 1;
    slots.set_num(s, layer.offset_y);
    s += 1;

    let prop_slot = s;
    s += 1;
    slots.new_map(prop_slot);
    project_properties(slots, prop_slot, &mut s, Some(&layer.properties));

    for i in 0..LAYER_KEYS.len() {
        slots.insert_in_map(0, 1 + i, 1 + LAYER_KEYS.len() + i);
    }
}

/// Projects every tile record as a dictionary of its class plus custom
/// properties, in gid order. The "type" key is written once and reused.
pub fn map_tile_properties(slots: &mut SlotStack, host: &mut Host) {
    let Some(map) = host.current_tilemap() else {
        return;
    };

    let mut s = 1;
    slots.ensure(2);
    slots.new_list(0);
    slots.set_str(s, "type");
    s += 1;

    for tile in map.tiles.values() {
        slots.ensure(s + 3);

        let prop_slot = s;
        s += 1;
        slots.new_map(prop_slot);
        slots.insert_in_list(0, -1, prop_slot);

        slots.set_str(s, tile.class.clone());
        s += 1;
        slots.insert_in_map(prop_slot, 1, s - 1);

        project_properties(slots, prop_slot, &mut s, Some(&tile.properties));
    }
}

pub fn map_get_tile(slots: &mut SlotStack, host: &mut Host) {
    if !check_args(slots, &mut host.console, &[NUM, NUM, NUM]) {
        return;
    }
    let layer = slots.num(1) as i32;
    let x = slots.num(2) as u32;
    let y = slots.num(3) as u32;
    let gid = if layer < 0 {
        0
    } else {
        host.current_tilemap().map_or(0, |map| map.tile_at(layer as usize, x, y))
    };
    slots.set_num(0, f64::from(gid));
}
