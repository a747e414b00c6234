//! Bit-exact raster comparison used by filter regression tests.

/// Read access to a grid of packed 32-bit pixels.
pub trait Raster {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Packed pixel at `(x, y)`. Callers stay inside `width` x `height`.
    fn pixel(&self, x: u32, y: u32) -> u32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    /// First differing pixel in raster order.
    Differs { x: u32, y: u32 },
    SizeMismatch,
}

impl Comparison {
    pub fn is_equal(self) -> bool {
        matches!(self, Comparison::Equal)
    }

    /// Position of the first difference, `(-1, -1)` when the sizes differ
    /// and `None` when the rasters are equal.
    pub fn point(self) -> Option<(i64, i64)> {
        match self {
            Comparison::Equal => None,
            Comparison::Differs { x, y } => Some((i64::from(x), i64::from(y))),
            Comparison::SizeMismatch => Some((-1, -1)),
        }
    }
}

/// Compares two rasters pixel by pixel, row by row from the top left.
pub fn compare<A, B>(a: &A, b: &B) -> Comparison
where
    A: Raster + ?Sized,
    B: Raster + ?Sized,
{
    if a.width() != b.width() || a.height() != b.height() {
        return Comparison::SizeMismatch;
    }
    for y in 0..a.height() {
        for x in 0..a.width() {
            if a.pixel(x, y) != b.pixel(x, y) {
                return Comparison::Differs { x, y };
            }
        }
    }
    Comparison::Equal
}

/// Owned RGBA raster, one `0xRRGGBBAA` word per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl RgbaBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0)
    }

    pub fn filled(width: u32, height: u32, pixel: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![pixel; width as usize * height as usize],
        }
    }

    /// Builds a buffer from row-major pixels. Returns `None` when the pixel
    /// count does not match the dimensions.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Option<Self> {
        (pixels.len() == width as usize * height as usize).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: u32) {
        let index = self.index(x, y);
        self.pixels[index] = pixel;
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }
}

impl Raster for RgbaBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel(&self, x: u32, y: u32) -> u32 {
        self.pixels[self.index(x, y)]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn equal_rasters_have_no_point() {
        let a = RgbaBuffer::filled(4, 3, 0xff00_00ff);
        let b = a.clone();
        assert_eq!(compare(&a, &b), Comparison::Equal);
        assert_eq!(compare(&a, &b).point(), None);
    }

    #[test]
    fn first_difference_is_in_raster_order() {
        let a = RgbaBuffer::new(4, 4);
        let mut b = a.clone();
        b.set_pixel(3, 1, 1);
        b.set_pixel(0, 2, 1);
        b.set_pixel(1, 3, 1);
        assert_eq!(compare(&a, &b), Comparison::Differs { x: 3, y: 1 });
        assert_eq!(compare(&a, &b).point(), Some((3, 1)));
    }

    #[test]
    fn size_mismatch_uses_sentinel() {
        let a = RgbaBuffer::new(2, 2);
        let b = RgbaBuffer::new(2, 3);
        let result = compare(&a, &b);
        assert_eq!(result, Comparison::SizeMismatch);
        assert_eq!(result.point(), Some((-1, -1)));
        assert!(!result.is_equal());
    }

    #[test]
    fn from_pixels_checks_length() {
        assert!(RgbaBuffer::from_pixels(2, 2, vec![0; 3]).is_none());
        let buffer = RgbaBuffer::from_pixels(2, 1, vec![7, 9]).unwrap();
        assert_eq!(buffer.pixel(1, 0), 9);
    }
}
