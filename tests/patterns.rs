use glam::DVec2;
use std::rc::Rc;
use tui_multigrid::grid::{Bounds, MultiGrid, MultiGridOptions, PatternAttributes};
use tui_multigrid::scene::{Element, NodeRef, SceneGraph, SvgDocument};
use tui_multigrid::units::Units;
use tui_multigrid::GridError;

fn grid(num_grids: usize, scale: f64) -> MultiGrid {
    let options = MultiGridOptions {
        scale,
        num_grids,
        ..MultiGridOptions::default()
    };
    MultiGrid::new(options, Units::default()).unwrap()
}

fn path_opacity(pattern: &NodeRef) -> f64 {
    let pattern = pattern.borrow();
    let svg = pattern.children.last().unwrap().borrow();
    let path = svg.children[0].borrow();
    path.get_attr("stroke-opacity").unwrap().parse().unwrap()
}

#[test]
fn patterns_are_attached_with_suffixed_ids() {
    let mut doc = SvgDocument::new();
    let mut g = grid(3, 1.0);
    g.set_patterns(&mut doc, PatternAttributes::new("minor-").with("class", "grid"))
        .unwrap();

    assert_eq!(doc.def_ids().collect::<Vec<_>>(), vec!["minor-0", "minor-1", "minor-2"]);
    for (i, node) in g.patterns().iter().enumerate() {
        assert!(Rc::ptr_eq(node, &doc.get(&format!("minor-{}", i)).unwrap()));
        assert_eq!(node.borrow().get_attr("class"), Some("grid"));
        assert_eq!(node.borrow().get_attr("patternUnits"), Some("userSpaceOnUse"));
    }
}

#[test]
fn pattern_tiles_compose_recursively() {
    let mut doc = SvgDocument::new();
    let mut g = grid(2, 1.0);
    g.set_patterns(&mut doc, PatternAttributes::new("p")).unwrap();

    let finest = doc.get("p0").unwrap();
    let finest = finest.borrow();
    assert_eq!(finest.get_attr("width"), Some("1mm"));
    assert_eq!(finest.children.len(), 1);

    let coarse = doc.get("p1").unwrap();
    let coarse = coarse.borrow();
    assert_eq!(coarse.get_attr("width"), Some("10mm"));
    let background = coarse.children[0].borrow();
    assert_eq!(background.name, "rect");
    assert_eq!(background.get_attr("fill"), Some("url(#p0)"));

    let svg = coarse.children[1].borrow();
    assert_eq!(svg.get_attr("viewBox"), Some("0 0 10 10"));
    let path = svg.children[0].borrow();
    assert_eq!(path.get_attr("d"), Some("M 10 0 L 0 0 0 10"));
    assert_eq!(path.get_attr("fill"), Some("none"));
}

#[test]
fn scale_within_bucket_reuses_patterns() {
    let mut doc = SvgDocument::new();
    let mut g = grid(2, 6.0);
    g.set_patterns(&mut doc, PatternAttributes::new("p")).unwrap();
    let before: Vec<NodeRef> = g.patterns().to_vec();

    // floor(zoom_level) stays at 1 for 5 <= scale < 50
    for scale in [7.5, 20.0, 49.0] {
        g.set_scale(&mut doc, scale).unwrap();
    }

    assert_eq!(g.pattern_builds(), 1);
    for (old, new) in before.iter().zip(g.patterns()) {
        assert!(Rc::ptr_eq(old, new));
    }
}

#[test]
fn scale_across_bucket_rebuilds_patterns() {
    let mut doc = SvgDocument::new();
    let mut g = grid(2, 6.0);
    g.set_patterns(&mut doc, PatternAttributes::new("p")).unwrap();
    let before = Rc::clone(&g.patterns()[0]);

    g.set_scale(&mut doc, 60.0).unwrap();

    assert_eq!(g.pattern_builds(), 2);
    let after = doc.get("p0").unwrap();
    assert!(!Rc::ptr_eq(&before, &after));
    assert_eq!(after.borrow().get_attr("width"), Some("0.01mm"));
    assert_eq!(doc.def_ids().count(), 2);
}

#[test]
fn pattern_rebuilds_are_rarer_than_level_rebuilds() {
    let mut doc = SvgDocument::new();
    let mut g = grid(2, 1.0);
    g.set_patterns(&mut doc, PatternAttributes::new("p")).unwrap();
    let mut scale = 1.0;
    for _ in 0..40 {
        scale *= 1.2;
        g.set_scale(&mut doc, scale).unwrap();
        g.levels();
    }
    assert_eq!(g.level_builds(), 40);
    assert!(g.pattern_builds() < g.level_builds());
}

#[test]
fn stroke_opacity_follows_fade_policy() {
    let mut doc = SvgDocument::new();
    let mut g = grid(3, 7.5);
    g.set_patterns(&mut doc, PatternAttributes::new("p")).unwrap();

    let patterns = g.patterns().to_vec();
    assert!((path_opacity(&patterns[0]) - g.level_alpha(0)).abs() < 1e-12);
    assert_eq!(path_opacity(&patterns[1]), 0.5);
    assert_eq!(path_opacity(&patterns[2]), 1.0);

    // refreshed without a rebuild
    g.set_scale(&mut doc, 5.0).unwrap();
    assert_eq!(path_opacity(&patterns[0]), 0.0);
}

#[test]
fn foreign_id_is_a_collision() {
    let mut doc = SvgDocument::new();
    let foreign = Element::new("pattern").into_node();
    doc.attach("p1", Rc::clone(&foreign));

    let mut g = grid(2, 1.0);
    let result = g.set_patterns(&mut doc, PatternAttributes::new("p"));
    assert_eq!(result, Err(GridError::IdCollision("p1".to_string())));
    assert!(!doc.contains("p0"));
    assert!(Rc::ptr_eq(&doc.get("p1").unwrap(), &foreign));
}

#[test]
fn rebuild_leaves_foreign_node_in_place() {
    let mut doc = SvgDocument::new();
    let mut g = grid(2, 6.0);
    g.set_patterns(&mut doc, PatternAttributes::new("p")).unwrap();

    // a host takes over one of the ids after the patterns were attached
    let foreign = Element::new("pattern").into_node();
    doc.attach("p0", Rc::clone(&foreign));

    let result = g.set_scale(&mut doc, 60.0);
    assert_eq!(result, Err(GridError::IdCollision("p0".to_string())));
    assert!(Rc::ptr_eq(&doc.get("p0").unwrap(), &foreign));
    assert!(Rc::ptr_eq(&doc.get("p1").unwrap(), &g.patterns()[1]));
    assert_eq!(g.scale(), 6.0);
    assert_eq!(g.pattern_builds(), 1);

    // same bucket needs no rebuild, so nothing is touched
    g.set_scale(&mut doc, 7.5).unwrap();
    assert!(Rc::ptr_eq(&doc.get("p0").unwrap(), &foreign));
}

#[test]
fn resetting_patterns_replaces_own_ids() {
    let mut doc = SvgDocument::new();
    let mut g = grid(2, 1.0);
    g.set_patterns(&mut doc, PatternAttributes::new("p")).unwrap();
    g.set_patterns(&mut doc, PatternAttributes::new("p")).unwrap();
    assert_eq!(doc.def_ids().count(), 2);
    assert_eq!(g.pattern_builds(), 2);
}

#[test]
fn render_fills_with_coarsest_pattern_and_tracks_bounds() {
    let mut doc = SvgDocument::new();
    let mut g = grid(3, 1.0);
    g.set_bounds(Bounds::new(DVec2::new(-5.0, -2.0), DVec2::new(5.0, 2.0)));
    g.set_patterns(&mut doc, PatternAttributes::new("p")).unwrap();

    let rect = g.render().unwrap();
    {
        let rect = rect.borrow();
        assert_eq!(rect.get_attr("fill"), Some("url(#p2)"));
        assert_eq!(rect.get_attr("x"), Some("-5mm"));
        assert_eq!(rect.get_attr("width"), Some("100%"));
    }

    g.set_bounds(Bounds::new(DVec2::new(1.0, 2.0), DVec2::new(4.0, 8.0)));
    let rect = rect.borrow();
    assert_eq!(rect.get_attr("x"), Some("1mm"));
    assert_eq!(rect.get_attr("y"), Some("2mm"));
    assert_eq!(rect.get_attr("width"), Some("3mm"));
    assert_eq!(rect.get_attr("height"), Some("6mm"));
    assert_eq!(g.pattern_builds(), 1);
}

#[test]
fn exported_document_contains_defs_and_fill() {
    let mut doc = SvgDocument::with_size("100mm", "50mm");
    let mut g = grid(2, 1.0);
    g.set_patterns(&mut doc, PatternAttributes::new("grid-")).unwrap();
    doc.add_to_body(g.render().unwrap());

    let svg = doc.to_svg_string();
    assert!(svg.contains("<pattern id=\"grid-0\""));
    assert!(svg.contains("<pattern id=\"grid-1\""));
    assert!(svg.contains("fill=\"url(#grid-1)\""));
    assert!(svg.find("</defs>").unwrap() < svg.find("<rect x=").unwrap());
}
