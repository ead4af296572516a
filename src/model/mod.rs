//! Data Model
//!
//! EditorState, Portfolio records, lenient decoding and legacy migration.

pub mod editor_state;
pub mod lenient;
pub mod migration;
pub mod portfolio;

pub use editor_state::{
    block_ids, AvatarShape, CardStyle, Certificate, ColorScheme, Contacts, ContentData,
    ContentType, CustomBlock, EditorState, Education, Experience, Language, LanguageLevel,
    LayoutSettings, PortfolioItem, RadiusPreset, SocialLink, SpacingPreset, TextAlign,
    TextSettings,
};
pub use migration::{migrate_editor_state, migrate_portfolio};
pub use portfolio::{
    generate_id, increment_version, BlockEntry, GlobalTheme, Page, Portfolio, PortfolioDraft,
    ThemeColors, Version, BASE_VERSION,
};
