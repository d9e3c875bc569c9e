//! Static image URL construction for Flickr's farm servers.
//!
//! No network access: a URL is a pure function of the photo's server
//! coordinates and the requested size.

/// Size variants served by Flickr, keyed by their URL suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSize {
    Square75,
    Square150,
    Thumbnail100,
    Small240,
    Small320,
    Medium500,
    Medium640,
    Medium800,
    Large1024,
}

impl ImageSize {
    /// The suffix appended after `{id}_{secret}` in the file name.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Square75 => "_s",
            Self::Square150 => "_q",
            Self::Thumbnail100 => "_t",
            Self::Small240 => "_m",
            Self::Small320 => "_n",
            Self::Medium500 => "",
            Self::Medium640 => "_z",
            Self::Medium800 => "_c",
            Self::Large1024 => "_b",
        }
    }
}

/// Resolution used for both album covers and photos.
pub const TARGET_SIZE: ImageSize = ImageSize::Large1024;

/// Where a photo lives on Flickr's static servers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub farm: u32,
    pub server: String,
    pub id: String,
    pub secret: String,
}

/// Builds the static URL of a photo at the given size.
///
/// ```
/// use flickr_gallery::provider::urls::{resolve_image_url, ImageSize, ServerInfo};
///
/// let info = ServerInfo {
///     farm: 5,
///     server: "4567".into(),
///     id: "123".into(),
///     secret: "abc".into(),
/// };
/// assert_eq!(
///     resolve_image_url(&info, ImageSize::Large1024),
///     "https://farm5.staticflickr.com/4567/123_abc_b.jpg"
/// );
/// ```
pub fn resolve_image_url(info: &ServerInfo, size: ImageSize) -> String {
    format!(
        "https://farm{}.staticflickr.com/{}/{}_{}{}.jpg",
        info.farm,
        info.server,
        info.id,
        info.secret,
        size.suffix()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> ServerInfo {
        ServerInfo {
            farm: 1,
            server: "65535".into(),
            id: "999".into(),
            secret: "f00d".into(),
        }
    }

    #[test]
    fn medium_has_no_suffix() {
        assert_eq!(
            resolve_image_url(&info(), ImageSize::Medium500),
            "https://farm1.staticflickr.com/65535/999_f00d.jpg"
        );
    }

    #[test]
    fn square_suffix() {
        assert!(resolve_image_url(&info(), ImageSize::Square75).ends_with("/999_f00d_s.jpg"));
    }

    #[test]
    fn deterministic() {
        assert_eq!(
            resolve_image_url(&info(), TARGET_SIZE),
            resolve_image_url(&info(), TARGET_SIZE)
        );
    }
}
