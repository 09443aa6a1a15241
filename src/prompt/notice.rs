use std::sync::Arc;
use std::time::Duration;

use super::PromptEvent;
use super::registry::{Callback, OverlayKind, OverlayProps};

pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_millis(6000);

/// Visual tone shared by notices and toasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    Success,
    Warning,
    Error,
    #[default]
    Info,
    Text,
}

/// Non-modal notification stacked in creation order
#[derive(Clone, Default)]
pub struct NoticeProps {
    pub id: Option<String>,
    pub tone: Tone,
    pub title: String,
    pub description: Option<String>,
    pub duration: Option<Duration>,
    pub delay_show: Option<Duration>,
    pub show_close: Option<bool>,
    pub z_index: Option<i64>,
    pub on_close: Option<Callback>,
    pub closing: bool,
}

impl NoticeProps {
    pub fn new(tone: Tone, title: impl Into<String>) -> Self {
        Self {
            tone,
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Stay open until closed explicitly
    pub fn persistent(self) -> Self {
        self.duration(Duration::ZERO)
    }

    pub fn delay_show(mut self, delay: Duration) -> Self {
        self.delay_show = Some(delay);
        self
    }

    pub fn show_close(mut self, show: bool) -> Self {
        self.show_close = Some(show);
        self
    }

    pub fn on_close(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_close = Some(Arc::new(handler));
        self
    }
}

impl OverlayProps for NoticeProps {
    const KIND: OverlayKind = OverlayKind::Notice;

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
        self.duration.get_or_insert(DEFAULT_NOTICE_DURATION);
        self.delay_show.get_or_insert(Duration::ZERO);
        self.show_close.get_or_insert(true);
    }

    fn z_index(&self) -> Option<i64> {
        self.z_index
    }

    fn delay_show(&self) -> Duration {
        self.delay_show.unwrap_or_default()
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn on_close(&self) -> Option<Callback> {
        self.on_close.clone()
    }

    fn into_event(self) -> PromptEvent {
        PromptEvent::Notice(self)
    }

    fn from_event(event: &PromptEvent) -> Option<&Self> {
        match event {
            PromptEvent::Notice(props) => Some(props),
            _ => None,
        }
    }
}
