/// Braille Unicode canvas for high-resolution terminal graphics.
/// Each character cell represents a 2x4 dot grid (8 dots).
/// Unicode Braille patterns: U+2800 to U+28FF
#[derive(Clone)]
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    cells: Vec<u8>, // Bit pattern per char, row-major
}

impl BrailleCanvas {
    /// Create a new canvas with the given character dimensions.
    /// Effective dot resolution: width*2 x height*4
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0u8; width * height],
        }
    }

    /// Width in dots
    pub fn dot_width(&self) -> usize {
        self.width * 2
    }

    /// Height in dots
    pub fn dot_height(&self) -> usize {
        self.height * 4
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&b| b == 0)
    }

    /// Set a dot at the given coordinates.
    /// Braille dot layout per character:
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let cx = x / 2;
        let cy = y / 4;

        if cx >= self.width || cy >= self.height {
            return;
        }

        let bit = match (x % 2, y % 4) {
            (0, 0) => 0x01,
            (1, 0) => 0x08,
            (0, 1) => 0x02,
            (1, 1) => 0x10,
            (0, 2) => 0x04,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => 0,
        };

        self.cells[cy * self.width + cx] |= bit;
    }

    /// Set a dot using signed coordinates (ignores negative values)
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// Braille character for a cell, `None` when no dot is set
    pub fn glyph(&self, col: usize, row: usize) -> Option<char> {
        if col >= self.width || row >= self.height {
            return None;
        }
        match self.cells[row * self.width + col] {
            0 => None,
            b => char::from_u32(0x2800 + b as u32),
        }
    }

    /// Convert the canvas to a string of Braille characters, one line per row
    #[cfg(test)]
    pub fn to_string(&self) -> String {
        self.cells
            .chunks(self.width.max(1))
            .take(self.height)
            .map(|row| {
                row.iter()
                    .map(|&b| char::from_u32(0x2800 + b as u32).unwrap_or(' '))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pixel() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_pixel(0, 0);
        assert_eq!(canvas.to_string(), "⠁"); // U+2801
    }

    #[test]
    fn test_all_dots() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for x in 0..2 {
            for y in 0..4 {
                canvas.set_pixel(x, y);
            }
        }
        assert_eq!(canvas.to_string(), "⣿"); // U+28FF (all dots)
    }

    #[test]
    fn test_out_of_range_ignored() {
        let mut canvas = BrailleCanvas::new(1, 1);
        canvas.set_pixel(2, 0);
        canvas.set_pixel_signed(-1, 0);
        assert!(canvas.is_blank());
    }

    #[test]
    fn test_glyph_and_clear() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.set_pixel(3, 3);
        assert_eq!(canvas.glyph(0, 0), None);
        assert_eq!(canvas.glyph(1, 0), Some('⢀')); // U+2880
        canvas.clear();
        assert!(canvas.is_blank());
    }
}
