//! Looping playlist of video identifiers

use crate::PipelineError;

/// Ordered, non-empty list of videos played round after round
#[derive(Debug, Clone)]
pub struct Playlist {
    videos: Vec<String>,
    cursor: usize,
    traversals: u64,
}

impl Playlist {
    pub fn new(videos: Vec<String>) -> Result<Self, PipelineError> {
        if videos.is_empty() {
            return Err(PipelineError::EmptyPlaylist);
        }
        Ok(Self {
            videos,
            cursor: 0,
            traversals: 0,
        })
    }

    /// Identifiers in play order
    pub fn videos(&self) -> &[String] {
        &self.videos
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    /// Always false; construction rejects empty lists
    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    /// Completed traversals
    pub fn traversals(&self) -> u64 {
        self.traversals
    }

    /// Next identifier in the current traversal, `None` once it is complete.
    ///
    /// After returning `None` the cursor is back at the first video.
    pub fn advance(&mut self) -> Option<&str> {
        if self.cursor == self.videos.len() {
            self.cursor = 0;
            self.traversals += 1;
            return None;
        }
        let id = &self.videos[self.cursor];
        self.cursor += 1;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn playlist(ids: &[&str]) -> Playlist {
        Playlist::new(ids.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            Playlist::new(Vec::new()),
            Err(PipelineError::EmptyPlaylist)
        ));
    }

    #[test]
    fn test_traversal_order_and_restart() {
        let mut list = playlist(&["A", "B", "C"]);

        let mut seen = Vec::new();
        for _ in 0..2 {
            while let Some(id) = list.advance() {
                seen.push(id.to_string());
            }
        }
        assert_eq!(seen, vec!["A", "B", "C", "A", "B", "C"]);
        assert_eq!(list.traversals(), 2);
    }

    #[test]
    fn test_single_video() {
        let mut list = playlist(&["only"]);
        assert_eq!(list.advance(), Some("only"));
        assert_eq!(list.advance(), None);
        assert_eq!(list.advance(), Some("only"));
        assert_eq!(list.len(), 1);
        assert!(!list.is_empty());
    }

    proptest! {
        #[test]
        fn prop_every_video_once_per_traversal(
            ids in prop::collection::vec("[a-z]{1,8}", 1..12),
            rounds in 1usize..4,
        ) {
            let mut list = Playlist::new(ids.clone()).unwrap();
            for _ in 0..rounds {
                let mut pass = Vec::new();
                while let Some(id) = list.advance() {
                    pass.push(id.to_string());
                }
                prop_assert_eq!(&pass, &ids);
            }
            prop_assert_eq!(list.traversals(), rounds as u64);
        }
    }
}
