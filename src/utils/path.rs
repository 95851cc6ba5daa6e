//! Output path naming helpers
//!
//! Every rendition and track writes to a distinct, pre-determined filename
//! derived from the video id, so concurrent encodes into a shared output
//! directory never collide.

/// Filename for one bitrate rendition
pub fn rendition_filename(video_id: &str, level_name: &str, container: &str) -> String {
    format!("{}_{}.{}", sanitize(video_id), level_name, container)
}

/// Filename for the scrubbing thumbnail sprite track
pub fn thumbnail_filename(video_id: &str) -> String {
    format!("{}_thumbnails.jpg", sanitize(video_id))
}

/// Replace path-hostile characters in an identifier
fn sanitize(id: &str) -> String {
    id.chars()
        .map(|character| {
            if character.is_alphanumeric() || character == '-' || character == '_' {
                character
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendition_filename() {
        assert_eq!(rendition_filename("dive", "720p", "mp4"), "dive_720p.mp4");
    }

    #[test]
    fn test_sanitize_replaces_separators() {
        assert_eq!(rendition_filename("a/b c", "480p", "mp4"), "a_b_c_480p.mp4");
    }

    #[test]
    fn test_thumbnail_filename() {
        assert_eq!(thumbnail_filename("dive"), "dive_thumbnails.jpg");
    }

    #[test]
    fn test_distinct_levels_never_collide() {
        let names: Vec<String> = ["240p", "480p", "720p"]
            .iter()
            .map(|level| rendition_filename("clip", level, "mp4"))
            .collect();
        assert_eq!(names.len(), 3);
        assert!(names.iter().all(|name| names.iter().filter(|n| *n == name).count() == 1));
    }
}
