use lantern_script::dispatch;
use lantern_script::draw::DrawCmd;
use lantern_script::slots::{SlotStack, Value};
use lantern_script::tilemap::{Layer, TileMap};
use lantern_script::Host;

fn call_static(host: &mut Host, slots: &mut SlotStack, class: &str, signature: &str) {
    let func = dispatch::resolve(dispatch::builtin_methods(), "engine", class, true, signature)
        .unwrap_or_else(|| panic!("{class}.{signature} is registered"));
    func(slots, host);
}

fn call_instance(host: &mut Host, slots: &mut SlotStack, class: &str, signature: &str) {
    let func = dispatch::resolve(dispatch::builtin_methods(), "engine", class, false, signature)
        .unwrap_or_else(|| panic!("{class}.{signature} is registered"));
    func(slots, host);
}

#[test]
fn print_reaches_the_console_ring() {
    let mut host = Host::new();
    let mut slots = SlotStack::new();
    slots.set_str(1, "hello from script");
    call_static(&mut host, &mut slots, "Trap", "print(_)");
    assert_eq!(host.console.last_line(), Some("hello from script"));
}

#[test]
fn cvar_wrapper_round_trips_through_the_store() {
    let mut host = Host::new();
    let mut slots = SlotStack::new();

    let cvar_class = dispatch::resolve_class(dispatch::builtin_classes(), "engine", "CVar")
        .expect("CVar class is registered");
    slots.ensure(3);
    slots.set_str(1, "vid.width");
    slots.set(2, Value::Num(640.0));
    (cvar_class.allocate)(&mut slots, &mut host);

    slots.set_num(1, 800.0);
    call_instance(&mut host, &mut slots, "CVar", "set(_)");

    call_instance(&mut host, &mut slots, "CVar", "number()");
    assert!(matches!(slots.get(0), Value::Num(n) if *n == 800.0));
    assert_eq!(host.console.cvars.find("vid.width").expect("cvar exists").string, "800");
}

#[test]
fn draw_calls_record_a_frame_until_submit() {
    let mut host = Host::new();

    let mut slots = SlotStack::new();
    slots.set_num(1, 10.0);
    slots.set_num(2, 20.0);
    slots.set_num(3, 30.0);
    slots.set_num(4, 255.0);
    call_static(&mut host, &mut slots, "Draw", "setColor(_,_,_,_)");

    let mut slots = SlotStack::new();
    slots.set_num(1, 4.0);
    slots.set_num(2, 8.0);
    slots.set_num(3, 16.0);
    slots.set_num(4, 16.0);
    slots.set_bool(5, false);
    call_static(&mut host, &mut slots, "Draw", "rect(_,_,_,_,_)");

    assert_eq!(host.draw.pending().len(), 2);
    let mut slots = SlotStack::new();
    call_static(&mut host, &mut slots, "Draw", "submit()");

    assert!(host.draw.pending().is_empty());
    assert_eq!(host.draw.frames_submitted(), 1);
    assert_eq!(host.draw.last_frame()[0], DrawCmd::SetColor { r: 10, g: 20, b: 30, a: 255 });
}

#[test]
fn argument_mismatch_reports_once_and_records_nothing() {
    let mut host = Host::new();
    let mut slots = SlotStack::new();
    slots.set_bool(1, true); // x must be a number
    slots.set_num(2, 8.0);
    slots.set_num(3, 16.0);
    slots.set_num(4, 16.0);
    slots.set_bool(5, false);
    call_static(&mut host, &mut slots, "Draw", "rect(_,_,_,_,_)");

    assert!(host.draw.pending().is_empty(), "mismatched call records nothing");
    let lines: Vec<_> = host.console.lines().cloned().collect();
    assert_eq!(lines, vec!["Expected Num in parameter 1, got Bool.".to_string()]);
}

#[test]
fn asset_create_find_load_flow() {
    let mut host = Host::new();

    let mut slots = SlotStack::new();
    slots.set_num(1, 0.0); // image
    slots.set_str(2, "player");
    slots.set_str(3, "gfx/player.png");
    slots.set_num(4, 0.0);
    call_static(&mut host, &mut slots, "Asset", "create(_,_,_,_)");
    let handle = match slots.get(0) {
        Value::Num(n) => *n,
        other => panic!("create returns a handle, got {other:?}"),
    };

    let mut slots = SlotStack::new();
    slots.set_str(1, "player");
    call_static(&mut host, &mut slots, "Asset", "find(_)");
    assert!(matches!(slots.get(0), Value::Num(n) if *n == handle));

    let mut slots = SlotStack::new();
    slots.set_num(1, handle);
    call_static(&mut host, &mut slots, "Asset", "load(_)");
    let asset = host.assets.get(handle as u32).expect("asset exists");
    assert!(asset.loaded);
}

#[test]
fn tilemap_queries_follow_the_selected_map() {
    let mut host = Host::new();
    let mut map = TileMap::new(2, 2, 8, 8);
    let mut bg = Layer::new("bg");
    bg.cells = vec![5, 0, 0, 6];
    map.layers.push(bg);
    let handle = host.assets.insert_tilemap("level1", "maps/level1.tmx", map);

    let mut slots = SlotStack::new();
    slots.set_num(1, f64::from(handle));
    call_static(&mut host, &mut slots, "TileMap", "setCurrent(_)");

    let mut slots = SlotStack::new();
    slots.set_str(1, "bg");
    call_static(&mut host, &mut slots, "TileMap", "layerByName(_)");
    assert!(matches!(slots.get(0), Value::Num(n) if *n == 0.0));

    let mut slots = SlotStack::new();
    slots.set_num(1, 0.0);
    slots.set_num(2, 1.0);
    slots.set_num(3, 1.0);
    call_static(&mut host, &mut slots, "TileMap", "getTile(_,_,_)");
    assert!(matches!(slots.get(0), Value::Num(n) if *n == 6.0));
}

#[test]
fn map_layer_draw_uses_the_selected_map() {
    let mut host = Host::new();
    let map = TileMap::new(2, 2, 8, 8);
    let handle = host.assets.insert_tilemap("level1", "maps/level1.tmx", map);

    let mut slots = SlotStack::new();
    slots.set_num(1, f64::from(handle));
    call_static(&mut host, &mut slots, "TileMap", "setCurrent(_)");

    let mut slots = SlotStack::new();
    for slot in 1..=7 {
        slots.set_num(slot, 0.0);
    }
    call_static(&mut host, &mut slots, "Draw", "mapLayer(_,_,_,_,_,_,_)");

    match &host.draw.pending()[0] {
        DrawCmd::MapLayer { map, .. } => assert_eq!(*map, handle),
        other => panic!("expected a map layer command, got {other:?}"),
    }
}
