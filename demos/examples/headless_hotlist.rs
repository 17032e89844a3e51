// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A bookmark hotlist driven by scripted input, with no window.
//!
//! This example shows how to:
//! - build a tree with two entry fields (title and address) and folders,
//! - wrap it in an `OutlineView` with a host that just prints its requests,
//! - feed clicks, a move drag, and an in-place rename through the view,
//! - paint the damaged area and print the resulting draw items.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_outline_demos --example headless_hotlist`

use env_logger::Env;
use kurbo::{Point, Rect, Size, Vec2};
use understory_outline::{
    ElementId, FieldDesc, FieldFlags, NodeId, OwnerEvent, Tree, TreeConfig, TreeFlags,
};
use understory_outline_view::{Host, Key, MouseState, OutlineView, RenderItem, ViewConfig};

/// Prints what a real window would be asked to do and remembers dirty areas.
#[derive(Debug, Default)]
struct PrintingHost {
    dirty: Vec<Rect>,
}

impl Host for PrintingHost {
    fn request_redraw(&mut self, rect: Rect) {
        self.dirty.push(rect);
    }

    fn scroll_offset(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn viewport_size(&self) -> Size {
        Size::new(480.0, 320.0)
    }

    fn set_caret(&mut self, top: Point, height: f64) {
        println!("  caret at {top:?}, {height} high");
    }

    fn remove_caret(&mut self) {
        println!("  caret removed");
    }

    fn begin_autoscroll(&mut self) {
        println!("  autoscroll on");
    }

    fn end_autoscroll(&mut self) {
        println!("  autoscroll off");
    }

    fn drag_start(&mut self, bounds: Rect) {
        println!("  dragging {bounds:?}");
    }

    fn extent_changed(&mut self, extent: Size) {
        println!("  extent now {extent:?}");
    }
}

fn hotlist() -> (Tree, NodeId, NodeId) {
    let config = TreeConfig::default()
        .with_entry_fields([
            FieldDesc::new("Title", FieldFlags::DEFAULT | FieldFlags::ALLOW_EDIT),
            FieldDesc::new("URL", FieldFlags::SHOW_NAME),
        ])
        .with_flags(TreeFlags::DELETE_EMPTY_FOLDERS);
    let mut tree = Tree::new(config);
    let root = tree.root();
    let mut dev = root;
    let mut netsurf = root;
    tree.batch(|tree| {
        let Ok(folder) = tree.create_folder(Some(root), "Development") else {
            return;
        };
        dev = folder;
        let bookmarks = [
            ("Rust", "https://www.rust-lang.org/"),
            ("crates.io", "https://crates.io/"),
            ("docs.rs", "https://docs.rs/"),
        ];
        for (title, url) in bookmarks {
            if let Err(err) = tree.create_entry(Some(folder), &[title, url]) {
                log::warn!("skipping {title}: {err}");
            }
        }
        if let Ok(entry) = tree.create_entry(Some(root), &["NetSurf", "https://www.netsurf-browser.org/"]) {
            netsurf = entry;
        }
    });
    (tree, dev, netsurf)
}

fn paint(view: &mut OutlineView<PrintingHost>) {
    let dirty = std::mem::take(&mut view.host_mut().dirty);
    let Some(area) = dirty.into_iter().reduce(|a, b| a.union(b)) else {
        println!("  nothing to repaint");
        return;
    };
    println!("  repaint {area:?}");
    view.on_redraw(area, &mut |item: RenderItem<'_>| match item {
        RenderItem::Text { text, selected, .. } => {
            println!("    text {text:?}{}", if selected { " (selected)" } else { "" });
        }
        RenderItem::EditField { text, caret, .. } => {
            println!("    field {text:?}, caret at {caret:?}");
        }
        RenderItem::Furniture { expanded, .. } => {
            println!("    {}", if expanded { "[-]" } else { "[+]" });
        }
        _ => {}
    });
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let (mut tree, dev, netsurf) = hotlist();
    tree.set_owner(Box::new(|event: OwnerEvent<'_>| match event {
        OwnerEvent::Launched { node, .. } => println!("  open {node:?}"),
        OwnerEvent::Edited { text, .. } => println!("  renamed to {text:?}"),
        OwnerEvent::Deleted { node, .. } => println!("  forget {node:?}"),
    }));
    let mut view = OutlineView::new(tree, PrintingHost::default(), ViewConfig::default());

    println!("initial");
    paint(&mut view);

    println!("expand Development");
    view.on_mouse_event(Point::new(8.0, 10.0), MouseState::CLICK_1);
    paint(&mut view);

    println!("select the second bookmark");
    view.on_key(Key::Home);
    view.on_key(Key::Down);
    view.on_key(Key::Down);
    paint(&mut view);

    println!("drag it above the first bookmark");
    view.on_mouse_event(Point::new(60.0, 50.0), MouseState::PRESS_1);
    view.on_mouse_event(Point::new(60.0, 50.0), MouseState::DRAG_1);
    view.on_mouse_event(Point::new(60.0, 24.0), MouseState::HOLDING_1);
    view.on_mouse_event(Point::new(60.0, 24.0), MouseState::empty());
    paint(&mut view);

    println!("rename NetSurf");
    if let Err(err) = view.start_edit(ElementId::primary(netsurf)) {
        log::warn!("cannot rename: {err}");
    }
    for ch in " home".chars() {
        view.on_key(Key::Char(ch));
    }
    paint(&mut view);
    view.on_key(Key::Enter);
    paint(&mut view);

    println!("open it");
    view.on_mouse_event(
        Point::new(20.0, 90.0),
        MouseState::CLICK_1 | MouseState::DOUBLE_CLICK,
    );

    println!("delete the whole folder");
    view.on_key(Key::Home);
    view.on_key(Key::Delete);
    paint(&mut view);

    let (tree, _) = view.into_parts();
    println!(
        "done: {} rows, Development alive: {}",
        tree.visible_rows().len(),
        tree.is_alive(dev)
    );
}
