//! Paginated output.
//!
//! Rasterizing a laid-out document into fixed-size pages needs a layout
//! engine, which this crate does not ship. Callers plug one in through
//! [`Rasterizer`].

use async_trait::async_trait;

use crate::config::{Orientation, PageSetup};
use crate::error::Result;

/// Millimetres per inch.
const MM_PER_INCH: f64 = 25.4;

/// Everything a rasterizer needs to produce pages.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterJob {
    /// Complete standalone document.
    pub document: String,
    pub filename: String,
    /// Width of the offscreen layout container in CSS pixels.
    pub container_width_px: u32,
    /// Solid color painted behind the content.
    pub background: String,
    pub page: PageSetup,
    /// Elements that should not be split across pages.
    pub avoid_break_selectors: Vec<String>,
}

impl RasterJob {
    /// Page width and height in inches, after orientation.
    pub fn page_size_in(&self) -> (f64, f64) {
        let (w, h) = self.page.format.size_mm();
        let (w, h) = (w / MM_PER_INCH, h / MM_PER_INCH);
        match self.page.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Printable area in inches, inside the margins.
    pub fn content_size_in(&self) -> (f64, f64) {
        let (w, h) = self.page_size_in();
        let m = self.page.margin_in * 2.0;
        ((w - m).max(0.0), (h - m).max(0.0))
    }
}

/// Turns a laid-out document into paginated bytes.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Produce the paginated document.
    ///
    /// Layout or encoding failures are reported as
    /// [`FolioError::RasterizationFailed`](crate::error::FolioError::RasterizationFailed).
    async fn rasterize(&self, job: &RasterJob) -> Result<Vec<u8>>;

    /// MIME type of the produced bytes.
    fn mime(&self) -> &'static str {
        "application/pdf"
    }

    /// File extension without the dot.
    fn extension(&self) -> &'static str {
        "pdf"
    }
}
