use lostfound_db::{Database, StoreError};
use lostfound_types::api::MessagePage;
use lostfound_types::models::Viewer;

use crate::error::ApiError;
use crate::view;

pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// A validated page request. `page` is 1-indexed; `size` is already clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32, max_page_size: u32) -> Result<Self, ApiError> {
        if page == 0 {
            return Err(ApiError::Validation("page must be at least 1".into()));
        }
        Ok(Self {
            page,
            size: size.clamp(1, max_page_size.max(1)),
        })
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.size))
    }
}

/// One page of roots annotated for `viewer`. Pages past the end are empty.
pub fn fetch_page(
    db: &Database,
    req: PageRequest,
    viewer: &Viewer,
) -> Result<MessagePage, StoreError> {
    let (snapshot, total) = db.roots_page(req.page, req.size, viewer.user_id)?;

    Ok(MessagePage {
        messages: view::assemble(snapshot, viewer),
        current_page: req.page,
        page_size: req.size,
        total_pages: req.total_pages(total),
        total_roots: total,
    })
}
