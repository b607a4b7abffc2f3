use panelgrid::layout::harness::MemoryViewport;
use panelgrid::layout::ids;
use panelgrid::prelude::*;
use panelgrid::{Error, StoreError, open_file_controller};
use pretty_assertions::assert_eq;

fn viewport() -> MemoryViewport {
    MemoryViewport::grid(["A", "B", "C", "D"], 2, 100.0, 100.0, 20.0)
}

#[test]
fn committed_order_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");

    let mut first = open_file_controller(viewport(), &path, LayoutConfig::default()).unwrap();
    first.init();
    assert!(first.set_layout_mode(true));
    first.dispatch(
        ListenerTarget::Container,
        HostEvent::PointerDown {
            target: PointerTarget::item(ItemId::new("D").unwrap()),
            input: PointerInput::mouse(1, Point::new(130.0, 130.0)),
        },
    );
    first.dispatch(
        ListenerTarget::Window,
        HostEvent::PointerMove(PointerInput::mouse(1, Point::new(10.0, 10.0))),
    );
    first.dispatch(
        ListenerTarget::Window,
        HostEvent::PointerUp(PointerInput::mouse(1, Point::new(10.0, 10.0))),
    );
    drop(first);

    let mut second = open_file_controller(viewport(), &path, LayoutConfig::default()).unwrap();
    second.init();
    assert!(second.layout_mode());
    assert_eq!(second.viewport().item_ids(), ids(["D", "A", "B", "C"]));
}

#[test]
fn corrupt_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");
    std::fs::write(&path, "{ nope").unwrap();
    let result = open_file_controller(viewport(), &path, LayoutConfig::default());
    assert!(matches!(result, Err(Error::Store(StoreError::Corrupt { .. }))));
}
