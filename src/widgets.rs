mod avatar;
mod link_preview;

pub use avatar::AvatarWidget;
pub use link_preview::LinkPreviewWidget;
