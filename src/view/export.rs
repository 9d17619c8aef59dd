use crate::grid::Bounds;
use crate::scene::SvgDocument;
use crate::units::Units;

/// Size the document to `bounds` and open its viewBox on the same region.
/// User units are CSS pixels, so millimetre lengths on tiles and the
/// backing rect resolve against the world origin.
pub fn frame_document(document: &mut SvgDocument, bounds: &Bounds, units: &Units) {
    let ppm = units.pixels_per_millimeter;
    document.set_size(format!("{}mm", bounds.width()), format!("{}mm", bounds.height()));
    document.set_view_box(
        bounds.x.min * ppm,
        bounds.y.min * ppm,
        bounds.width() * ppm,
        bounds.height() * ppm,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    #[test]
    fn test_view_box_in_css_pixels() {
        let mut doc = SvgDocument::new();
        let bounds = Bounds::new(DVec2::new(-10.0, -5.0), DVec2::new(10.0, 5.0));
        frame_document(&mut doc, &bounds, &Units::new(2.0));
        let svg = doc.to_svg_string();
        assert!(svg.contains("width=\"20mm\" height=\"10mm\" viewBox=\"-20 -10 40 20\""));
    }
}
