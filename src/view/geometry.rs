use crate::braille::BrailleCanvas;

/// Clip a segment to `[0, w) x [0, h)` (Liang-Barsky). `None` if fully outside.
pub fn clip_line(
    (x0, y0): (i32, i32),
    (x1, y1): (i32, i32),
    width: usize,
    height: usize,
) -> Option<((i32, i32), (i32, i32))> {
    let (fx0, fy0) = (x0 as f64, y0 as f64);
    let (dx, dy) = ((x1 - x0) as f64, (y1 - y0) as f64);
    let (max_x, max_y) = (width as f64 - 1.0, height as f64 - 1.0);
    if max_x < 0.0 || max_y < 0.0 {
        return None;
    }

    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    for (p, q) in [(-dx, fx0), (dx, max_x - fx0), (-dy, fy0), (dy, max_y - fy0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    let at = |t: f64| ((fx0 + t * dx).round() as i32, (fy0 + t * dy).round() as i32);
    Some((at(t0), at(t1)))
}

/// Draw a line using Bresenham's algorithm, clipped to the canvas
pub fn draw_line(canvas: &mut BrailleCanvas, from: (i32, i32), to: (i32, i32)) {
    let Some(((x0, y0), (x1, y1))) = clip_line(from, to, canvas.dot_width(), canvas.dot_height())
    else {
        return;
    };

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}
