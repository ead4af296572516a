//! Export Module
//!
//! Flat and paginated export of stored portfolios, with image inlining
//! and web font loading.

pub mod assets;
pub mod fonts;
pub mod paginated;
pub mod service;
pub mod shell;

#[cfg(feature = "http")]
pub use assets::HttpAssetFetcher;
pub use assets::{
    inline_images, AssetError, AssetFetcher, AssetWarning, CompositeFetcher, FetchedAsset,
    InlinedMarkup, LocalAssetFetcher,
};
pub use fonts::{FontProvider, SystemFonts, WebFontProvider};
pub use paginated::{RasterJob, Rasterizer};
pub use service::{
    export_filename, shareable_link, validate_export_readiness, ExportReadiness, ExportService,
    ExportedDocument, FLAT_MIME,
};
pub use shell::{document_shell, ShellOptions};
