//! Resource region registry error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum RegionError {
    #[error("no region with start {start} and size {size}")]
    NotFoundBySize { start: u64, size: u64 },

    #[error("no region with start {start} and mask {mask}")]
    NotFoundByMask { start: u64, mask: u64 },
}

impl UserFacingError for RegionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        Some("List the registered regions and match start/size or start/mask exactly.")
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::NotFoundBySize { .. } => "region.not_found_by_size",
            Self::NotFoundByMask { .. } => "region.not_found_by_mask",
        })
    }
}
