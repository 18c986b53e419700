use std::cmp::Ordering;

use log::{info, warn};
use serde::Serialize;

use crate::config::Config;
use crate::provider::HttpLabelProvider;

/// Upper bound on labels requested from the remote endpoint.
pub const MAX_LABELS: usize = 10;

/// Minimum confidence requested from the remote endpoint.
pub const MIN_CONFIDENCE: f32 = 70.0;

/// Labels reported when detection runs in mock mode, confidence-sorted.
const MOCK_LABELS: [(&str, f32); 4] = [
    ("Headphones", 98.5),
    ("Electronics", 96.2),
    ("Wireless", 85.7),
    ("Audio", 82.3),
];

/// Descriptive tag with a confidence score in [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub name: String,
    pub confidence: f32,
}

/// Label detection with a remote endpoint when one is configured and a
/// deterministic mock otherwise. Remote failures never propagate; they
/// downgrade to the mock path.
pub struct LabelDetector {
    provider: Option<HttpLabelProvider>,
}

impl LabelDetector {
    pub fn new(provider: Option<HttpLabelProvider>) -> Self {
        LabelDetector { provider }
    }

    /// Build a detector from process configuration. A provider that fails
    /// to construct leaves the detector in the mock-only state.
    pub fn from_config(config: &Config) -> Self {
        let provider = config.provider.as_ref().and_then(|provider_config| {
            match HttpLabelProvider::new(provider_config) {
                Ok(provider) => Some(provider),
                Err(err) => {
                    warn!("failed to initialize label provider: {}", err);
                    None
                }
            }
        });

        LabelDetector::new(provider)
    }

    /// Detect labels in raw image bytes.
    ///
    /// Returns an empty list when the bytes are not a parsable image and
    /// no remote provider answered; the caller decides how to surface
    /// "nothing detected".
    pub async fn detect_labels(&self, image: &[u8]) -> Vec<Label> {
        if let Some(provider) = &self.provider {
            match provider.detect(image, MAX_LABELS, MIN_CONFIDENCE).await {
                Ok(mut labels) => {
                    labels.sort_by(|a, b| {
                        b.confidence
                            .partial_cmp(&a.confidence)
                            .unwrap_or(Ordering::Equal)
                    });

                    info!("detected {} labels", labels.len());
                    return labels;
                }
                Err(err) => {
                    warn!("label provider failed: {}, using mock detection", err);
                }
            }
        }

        self.mock_detect(image)
    }

    fn mock_detect(&self, image: &[u8]) -> Vec<Label> {
        if let Err(err) = image::load_from_memory(image) {
            warn!("invalid image in mock detection: {}", err);
            return Vec::new();
        }

        info!("using mock label detection");

        MOCK_LABELS
            .iter()
            .map(|(name, confidence)| Label {
                name: (*name).to_owned(),
                confidence: *confidence,
            })
            .collect()
    }
}

/// Search query driving product selection: names of the top three
/// labels, space-joined.
pub fn build_query(labels: &[Label]) -> String {
    labels
        .iter()
        .take(3)
        .map(|label| label.name.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::DynamicImage::new_rgb8(2, 2);
        let mut buf = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut buf),
            image::ImageOutputFormat::Png,
        )
        .unwrap();
        buf
    }

    #[tokio::test]
    async fn mock_detection_on_valid_image() {
        let detector = LabelDetector::new(None);
        let labels = detector.detect_labels(&png_bytes()).await;

        assert_eq!(labels.len(), 4);
        assert_eq!(labels[0].name, "Headphones");
        assert_eq!(labels[0].confidence, 98.5);
    }

    #[tokio::test]
    async fn mock_detection_is_confidence_sorted() {
        let detector = LabelDetector::new(None);
        let labels = detector.detect_labels(&png_bytes()).await;

        for pair in labels.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[tokio::test]
    async fn invalid_bytes_yield_no_labels() {
        let detector = LabelDetector::new(None);
        let labels = detector.detect_labels(b"not an image").await;

        assert!(labels.is_empty());
    }

    #[tokio::test]
    async fn empty_input_yields_no_labels() {
        let detector = LabelDetector::new(None);
        let labels = detector.detect_labels(&[]).await;

        assert!(labels.is_empty());
    }

    #[test]
    fn query_joins_top_three_names() {
        let labels: Vec<Label> = MOCK_LABELS
            .iter()
            .map(|(name, confidence)| Label {
                name: (*name).to_owned(),
                confidence: *confidence,
            })
            .collect();

        assert_eq!(build_query(&labels), "Headphones Electronics Wireless");
    }

    #[test]
    fn query_handles_fewer_than_three_labels() {
        let labels = vec![Label {
            name: "Audio".to_owned(),
            confidence: 82.3,
        }];

        assert_eq!(build_query(&labels), "Audio");
        assert_eq!(build_query(&[]), "");
    }
}
