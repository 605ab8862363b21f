use super::types::{PixelSize, Representation};

/// One selectable photo.
///
/// Remote and library assets share this shape; only the [`Locator`] of
/// each representation tells them apart. Representations are kept sorted
/// from lowest to highest resolution.
///
/// [`Locator`]: super::types::Locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    identifier: String,
    album_identifier: String,
    representations: Vec<Representation>,
}

impl Asset {
    /// Build an asset, returning `None` when there is nothing to display.
    pub fn new(
        identifier: impl Into<String>,
        album_identifier: impl Into<String>,
        mut representations: Vec<Representation>,
    ) -> Option<Self> {
        if representations.is_empty() {
            return None;
        }
        representations.sort_by_key(|r| r.size.area());
        Some(Self {
            identifier: identifier.into(),
            album_identifier: album_identifier.into(),
            representations,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn album_identifier(&self) -> &str {
        &self.album_identifier
    }

    pub fn representations(&self) -> &[Representation] {
        &self.representations
    }

    /// Smallest representation covering `target`, or the largest one if
    /// none is big enough.
    pub fn best_representation_for_size(&self, target: PixelSize) -> &Representation {
        self.representations
            .iter()
            .find(|r| r.size.covers(target))
            .or_else(|| self.representations.last())
            .unwrap_or_else(|| unreachable!("assets always carry a representation"))
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<Asset: id={} album={}>", self.identifier, self.album_identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reps() -> Vec<Representation> {
        vec![
            Representation::url("https://x/large.jpg", PixelSize::new(1080, 1080)),
            Representation::url("https://x/thumb.jpg", PixelSize::new(150, 150)),
            Representation::url("https://x/low.jpg", PixelSize::new(320, 320)),
        ]
    }

    #[test]
    fn test_empty_representations_rejected() {
        assert!(Asset::new("1", "album", Vec::new()).is_none());
    }

    #[test]
    fn test_representations_sorted_ascending() {
        let asset = Asset::new("1", "album", reps()).unwrap();
        let widths: Vec<u32> = asset.representations().iter().map(|r| r.size.width).collect();
        assert_eq!(widths, vec![150, 320, 1080]);
    }

    #[test]
    fn test_best_representation_smallest_covering() {
        let asset = Asset::new("1", "album", reps()).unwrap();
        let best = asset.best_representation_for_size(PixelSize::new(200, 200));
        assert_eq!(best.size, PixelSize::new(320, 320));
    }

    #[test]
    fn test_best_representation_falls_back_to_largest() {
        let asset = Asset::new("1", "album", reps()).unwrap();
        let best = asset.best_representation_for_size(PixelSize::new(4000, 3000));
        assert_eq!(best.size, PixelSize::new(1080, 1080));
    }

    #[test]
    fn test_display() {
        let asset = Asset::new("XYZ", "A1", reps()).unwrap();
        assert_eq!(asset.to_string(), "<Asset: id=XYZ album=A1>");
    }
}
