//! Image dimensions read from file headers

use anyhow::{anyhow, Result};

use super::traits::ImageInspector;
use crate::submission::UploadedFile;

/// Reads dimensions from the image header without decoding pixel data
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderImageInspector;

impl ImageInspector for HeaderImageInspector {
    fn dimensions(&self, file: &UploadedFile) -> Result<(u32, u32)> {
        let size = imagesize::blob_size(&file.content)
            .map_err(|e| anyhow!("{} is not a supported image: {e}", file.name))?;
        let width = u32::try_from(size.width)?;
        let height = u32::try_from(size.height)?;
        Ok((width, height))
    }
}
