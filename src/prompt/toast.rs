use std::sync::Arc;
use std::time::Duration;

use super::PromptEvent;
use super::notice::Tone;
use super::registry::{Callback, Overlay, OverlayKind, OverlayProps, Registry};

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

/// Stacking lane a toast is placed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToastDirection {
    #[default]
    Top,
    Bottom,
    Middle,
}

/// Lightweight feedback message
#[derive(Clone, Default)]
pub struct ToastProps {
    pub id: Option<String>,
    pub content: String,
    pub tone: Option<Tone>,
    pub duration: Option<Duration>,
    pub direction: Option<ToastDirection>,
    pub z_index: Option<i64>,
    pub on_close: Option<Callback>,
    pub closing: bool,
}

impl ToastProps {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn tone(mut self, tone: Tone) -> Self {
        self.tone = Some(tone);
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn direction(mut self, direction: ToastDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn on_close(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_close = Some(Arc::new(handler));
        self
    }

    pub fn lane(&self) -> ToastDirection {
        self.direction.unwrap_or_default()
    }
}

impl OverlayProps for ToastProps {
    const KIND: OverlayKind = OverlayKind::Toast;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn is_closing(&self) -> bool {
        self.closing
    }

    fn mark_closing(&mut self) {
        self.closing = true;
    }

    fn fill_defaults(&mut self) {
        self.duration.get_or_insert(DEFAULT_TOAST_DURATION);
        self.direction.get_or_insert(ToastDirection::Top);
        self.tone.get_or_insert(Tone::Info);
    }

    fn z_index(&self) -> Option<i64> {
        self.z_index
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    // top and middle lanes read newest-first; the bottom lane grows downwards
    fn prepend(&self) -> bool {
        self.lane() != ToastDirection::Bottom
    }

    fn on_close(&self) -> Option<Callback> {
        self.on_close.clone()
    }

    fn into_event(self) -> PromptEvent {
        PromptEvent::Toast(self)
    }

    fn from_event(event: &PromptEvent) -> Option<&Self> {
        match event {
            PromptEvent::Toast(props) => Some(props),
            _ => None,
        }
    }
}

impl Registry<ToastProps> {
    /// Toasts of one lane, in display order
    pub fn lane(&self, direction: ToastDirection) -> Vec<Overlay<ToastProps>> {
        self.items()
            .into_iter()
            .filter(|overlay| overlay.props.lane() == direction)
            .collect()
    }
}
