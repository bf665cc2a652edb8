use std::sync::Arc;

use crate::decode::{Decodable, DescriptorBuilder};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    url: String,
    width: i64,
    height: i64,
}

impl ImageCandidate {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn width(&self) -> i64 {
        self.width
    }

    pub fn height(&self) -> i64 {
        self.height
    }
}

impl Decodable for ImageCandidate {
    const TAG: &'static str = "image_candidate";

    fn describe() -> DescriptorBuilder<Self> {
        DescriptorBuilder::<Self>::new()
            .string("url", |c, v| c.url = v)
            .int("width", |c, v| c.width = v)
            .int("height", |c, v| c.height = v)
    }
}

/// Renditions of one image, largest first as the API sends them.
#[derive(Debug, Default)]
pub struct ImageVersions {
    candidates: Vec<Arc<ImageCandidate>>,
}

impl ImageVersions {
    pub fn candidates(&self) -> &[Arc<ImageCandidate>] {
        &self.candidates
    }

    /// Widest candidate, regardless of the order the server used.
    pub fn best(&self) -> Option<&ImageCandidate> {
        self.candidates
            .iter()
            .max_by_key(|c| c.width)
            .map(Arc::as_ref)
    }
}

impl Decodable for ImageVersions {
    const TAG: &'static str = "image_versions";

    fn describe() -> DescriptorBuilder<Self> {
        DescriptorBuilder::<Self>::new().list::<ImageCandidate>("candidates", |v, c| v.candidates = c)
    }
}
