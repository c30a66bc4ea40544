//! PDF viewer session and its embedded-renderer protocol

mod message;
mod page;
mod session;
mod surface;

pub use message::{InboundMessage, OutboundMessage};
pub use page::{PageAssets, generate_nonce, render_page};
pub use session::{
    SessionEvent, SessionState, Subscription, SubscriptionId, ViewerConfig, ViewerError,
    ViewerSession, is_covered,
};
pub use surface::{
    SURFACE_TITLE, Surface, SurfaceEvent, SurfaceEventKind, SurfaceHost, SurfaceId,
    SurfaceOptions, VIEW_TYPE, ViewColumn,
};
