//! Peer-side event translation.
//!
//! A peer owns a local drawing surface. Outbound, pointer input becomes
//! protocol events while each action is mirrored on the peer's own surface
//! ([`StrokeInput`]). Inbound, relayed events from other peers are applied
//! to the same surface ([`StrokeApplier`]). The surface itself — whatever
//! actually paints pixels — stays behind the [`DrawingSurface`] trait.

use crate::protocol::{ClientEvent, ServerEvent, StyleSettings};

/// The opaque rendering sink a peer draws on.
///
/// `begin_path` starts a new path at a point; `line_to` extends the current
/// path and renders the segment; `close_path` ends it. `apply_settings`
/// must take effect before any subsequent segment is rendered.
/// `replace_image` swaps the entire canvas contents for a decoded snapshot.
pub trait DrawingSurface {
    fn apply_settings(&mut self, settings: &StyleSettings);
    fn begin_path(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);
    fn replace_image(&mut self, image: &str);
}

/// Translates local pointer input into outbound events.
///
/// Every action is applied to the local surface first, then returned as the
/// event to emit. A stroke is never opened while another is in progress, so
/// the emitted stream always alternates begin, points, end.
#[derive(Debug)]
pub struct StrokeInput {
    settings: StyleSettings,
    drawing: bool,
}

impl StrokeInput {
    pub fn new(settings: StyleSettings) -> Self {
        Self {
            settings,
            drawing: false,
        }
    }

    /// Change the style used for the next stroke. Takes effect at the next
    /// pointer down; the current stroke keeps the style it started with.
    pub fn set_settings(&mut self, settings: StyleSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> &StyleSettings {
        &self.settings
    }

    pub fn pointer_down<S: DrawingSurface>(
        &mut self,
        x: f64,
        y: f64,
        surface: &mut S,
    ) -> Option<ClientEvent> {
        if self.drawing {
            return None;
        }
        self.drawing = true;
        surface.apply_settings(&self.settings);
        surface.begin_path(x, y);
        Some(ClientEvent::Start {
            x,
            y,
            settings: self.settings.clone(),
        })
    }

    pub fn pointer_move<S: DrawingSurface>(
        &mut self,
        x: f64,
        y: f64,
        surface: &mut S,
    ) -> Option<ClientEvent> {
        if !self.drawing {
            return None;
        }
        surface.line_to(x, y);
        Some(ClientEvent::Draw { x, y })
    }

    pub fn pointer_up<S: DrawingSurface>(
        &mut self,
        x: f64,
        y: f64,
        surface: &mut S,
    ) -> Option<ClientEvent> {
        if !self.drawing {
            return None;
        }
        self.drawing = false;
        surface.close_path();
        Some(ClientEvent::Finish { x, y })
    }
}

/// Applies relayed events from other peers to the local surface.
///
/// Tracks the Idle/Drawing state of the merged inbound stream. An `on-draw`
/// or `on-finish` arriving with no open path is applied defensively as a
/// no-op begin at its coordinates instead of being rejected; strokes from
/// different senders may interleave here, and the merged stream carries no
/// sender identity to untangle them.
#[derive(Debug, Default)]
pub struct StrokeApplier {
    drawing: bool,
}

impl StrokeApplier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply<S: DrawingSurface>(&mut self, event: &ServerEvent, surface: &mut S) {
        match event {
            ServerEvent::OnStart { x, y, settings } => {
                surface.apply_settings(settings);
                surface.begin_path(*x, *y);
                self.drawing = true;
            }
            ServerEvent::OnDraw { x, y } => {
                if self.drawing {
                    surface.line_to(*x, *y);
                } else {
                    surface.begin_path(*x, *y);
                    self.drawing = true;
                }
            }
            ServerEvent::OnFinish { x, y } => {
                if !self.drawing {
                    surface.begin_path(*x, *y);
                }
                surface.close_path();
                self.drawing = false;
            }
            ServerEvent::OnSend { image } => {
                surface.replace_image(image);
            }
        }
    }
}
