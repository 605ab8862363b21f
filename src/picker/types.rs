use std::fmt;

/// Pixel dimensions of one asset representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const ZERO: PixelSize = PixelSize {
        width: 0,
        height: 0,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Whether this size is at least as large as `target` in both dimensions.
    pub fn covers(&self, target: PixelSize) -> bool {
        self.width >= target.width && self.height >= target.height
    }
}

impl fmt::Display for PixelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Where the bytes of a representation live.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Remote image, fetched over HTTP by the host.
    Url(String),
    /// Opaque handle understood by the device photo library.
    Library(String),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Url(url) => write!(f, "{url}"),
            Locator::Library(id) => write!(f, "library://{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Representation {
    pub locator: Locator,
    pub size: PixelSize,
}

impl Representation {
    pub fn url(url: impl Into<String>, size: PixelSize) -> Self {
        Self {
            locator: Locator::Url(url.into()),
            size,
        }
    }

    pub fn library(local_identifier: impl Into<String>, size: PixelSize) -> Self {
        Self {
            locator: Locator::Library(local_identifier.into()),
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers() {
        let size = PixelSize::new(640, 480);
        assert!(size.covers(PixelSize::new(640, 480)));
        assert!(size.covers(PixelSize::new(100, 100)));
        assert!(!size.covers(PixelSize::new(641, 10)));
        assert!(!size.covers(PixelSize::new(10, 481)));
    }

    #[test]
    fn test_display() {
        assert_eq!(PixelSize::new(100, 50).to_string(), "100x50");
        assert_eq!(
            Locator::Library("ABC/L0/001".into()).to_string(),
            "library://ABC/L0/001"
        );
    }
}
