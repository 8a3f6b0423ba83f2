//! # Poster URLs
//!
//! TMDB serves images from a CDN as `{base}/{size}{path}`.

/// Shown when a movie has no poster
pub const PLACEHOLDER_IMAGE: &str = "/api/placeholder/200/300";

/// Default poster width for cards
pub const DEFAULT_POSTER_SIZE: &str = "w500";

/// Thumbnail width used in the cart
pub const THUMBNAIL_SIZE: &str = "w92";

/// Build the CDN URL for a poster path, or the placeholder when there is none
pub fn image_url(image_base_url: &str, path: Option<&str>, size: &str) -> String {
    match path {
        Some(path) if !path.is_empty() => format!("{image_base_url}/{size}{path}"),
        _ => PLACEHOLDER_IMAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url() {
        assert_eq!(
            image_url("https://image.tmdb.org/t/p", Some("/abc.jpg"), THUMBNAIL_SIZE),
            "https://image.tmdb.org/t/p/w92/abc.jpg"
        );
    }

    #[test]
    fn test_missing_poster_uses_placeholder() {
        assert_eq!(image_url("https://x", None, DEFAULT_POSTER_SIZE), PLACEHOLDER_IMAGE);
        assert_eq!(image_url("https://x", Some(""), DEFAULT_POSTER_SIZE), PLACEHOLDER_IMAGE);
    }
}
