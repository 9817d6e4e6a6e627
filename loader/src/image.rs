//! Raw image geometry and the buffers images are loaded into.

use alloc::{boxed::Box, vec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Geometry of a raw, uncompressed pixel buffer.
pub struct ImageSpec {
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
}

impl ImageSpec {
    /// 640x480, 16 bits per pixel.
    pub const VGA_RGB565: Self = Self::new(640, 480, 2);

    #[must_use]
    #[inline]
    pub const fn new(width: usize, height: usize, bytes_per_pixel: usize) -> Self {
        Self {
            width,
            height,
            bytes_per_pixel,
        }
    }

    #[must_use]
    #[inline]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    #[inline]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    #[inline]
    pub const fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }

    #[must_use]
    #[inline]
    /// Returns the size of one image, in bytes.
    pub const fn size(&self) -> usize {
        self.width * self.height * self.bytes_per_pixel
    }
}

impl Default for ImageSpec {
    fn default() -> Self {
        Self::VGA_RGB565
    }
}

/// A caller-owned byte region of fixed capacity.
///
/// The capacity is set once from an [`ImageSpec`] and the storage can never grow,
/// so nothing loaded into it can spill past one image.
pub struct ImageBuffer {
    spec: ImageSpec,
    data: Box<[u8]>,
}

impl ImageBuffer {
    #[must_use]
    #[inline]
    /// Allocates a zeroed buffer for one image.
    pub fn new(spec: ImageSpec) -> Self {
        Self::filled(spec, 0)
    }

    #[must_use]
    /// Allocates a buffer for one image with every byte set to `byte`.
    pub fn filled(spec: ImageSpec, byte: u8) -> Self {
        Self {
            spec,
            data: vec![byte; spec.size()].into_boxed_slice(),
        }
    }

    #[must_use]
    #[inline]
    pub const fn spec(&self) -> ImageSpec {
        self.spec
    }

    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn fill(&mut self, byte: u8) {
        self.data.fill(byte);
    }
}

impl core::ops::Deref for ImageBuffer {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl core::ops::DerefMut for ImageBuffer {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl core::fmt::Debug for ImageBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ImageBuffer")
            .field("spec", &self.spec)
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vga_size() {
        assert_eq!(ImageSpec::VGA_RGB565.size(), 614_400);
        assert_eq!(ImageSpec::default(), ImageSpec::VGA_RGB565);
    }

    #[test]
    fn test_buffer_capacity() {
        let spec = ImageSpec::new(4, 3, 2);
        let mut buffer = ImageBuffer::filled(spec, 0xAA);
        assert_eq!(buffer.capacity(), 24);
        assert_eq!(buffer.len(), 24);
        assert!(buffer.iter().all(|&b| b == 0xAA));

        buffer[0] = 1;
        buffer.fill(0);
        assert!(buffer.iter().all(|&b| b == 0));
        assert_eq!(buffer.spec(), spec);
    }

    #[test]
    fn test_empty_spec() {
        let buffer = ImageBuffer::new(ImageSpec::new(0, 480, 2));
        assert_eq!(buffer.capacity(), 0);
    }
}
