//! Transient overlays: alerts, notices and toasts.
//!
//! Producers raise overlays through [`Prompts`], which publishes on the
//! shared [`EventBus`]. Each class has a [`Registry`] subscribed to its topic
//! that owns the live instances and their timers. [`OverlayHost`] bundles
//! the three registries with the back-navigation [`ClosableRegistry`].

pub mod alert;
pub mod bus;
pub mod closable;
pub mod drawer;
pub mod notice;
pub mod registry;
pub mod toast;
pub mod zorder;

pub use alert::{AlertKind, AlertProps, ConfirmFn};
pub use bus::{EventBus, Subscription};
pub use closable::{ClosableRegistry, DismissFn};
pub use drawer::Drawer;
pub use notice::{NoticeProps, Tone};
pub use registry::{Callback, Overlay, OverlayKind, OverlayProps, Registry};
pub use toast::{ToastDirection, ToastProps};
pub use zorder::{Band, ZOrder};

use log::debug;
use std::sync::Arc;
use uuid::Uuid;

/// Payload carried on the overlay topics
#[derive(Clone)]
pub enum PromptEvent {
    Alert(AlertProps),
    Notice(NoticeProps),
    Toast(ToastProps),
}

impl PromptEvent {
    pub fn kind(&self) -> OverlayKind {
        match self {
            PromptEvent::Alert(_) => OverlayKind::Alert,
            PromptEvent::Notice(_) => OverlayKind::Notice,
            PromptEvent::Toast(_) => OverlayKind::Toast,
        }
    }

    pub fn is_closing(&self) -> bool {
        match self {
            PromptEvent::Alert(props) => props.closing,
            PromptEvent::Notice(props) => props.closing,
            PromptEvent::Toast(props) => props.closing,
        }
    }
}

/// Closes the overlay it was returned for by publishing a closing marker
#[derive(Clone)]
pub struct CloseHandle {
    bus: EventBus<PromptEvent>,
    id: String,
    marker: PromptEvent,
}

impl CloseHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn close(&self) {
        self.bus.publish(self.marker.kind().topic(), &self.marker);
    }
}

/// Trigger functions for raising overlays from anywhere
#[derive(Clone)]
pub struct Prompts {
    bus: EventBus<PromptEvent>,
}

impl Prompts {
    pub fn new(bus: EventBus<PromptEvent>) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &EventBus<PromptEvent> {
        &self.bus
    }

    pub fn alert(&self, props: AlertProps) -> CloseHandle {
        self.raise(props)
    }

    pub fn notice(&self, props: NoticeProps) -> CloseHandle {
        self.raise(props)
    }

    pub fn toast(&self, props: ToastProps) -> CloseHandle {
        self.raise(props)
    }

    fn raise<P: OverlayProps>(&self, mut props: P) -> CloseHandle {
        let id = match props.id() {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                props.set_id(id.clone());
                id
            }
        };
        let mut marker = props.clone();
        marker.mark_closing();

        self.bus.publish(P::KIND.topic(), &props.into_event());
        CloseHandle {
            bus: self.bus.clone(),
            id,
            marker: marker.into_event(),
        }
    }
}

/// The three overlay registries plus back-navigation, created once at startup
pub struct OverlayHost {
    pub alerts: Registry<AlertProps>,
    pub notices: Registry<NoticeProps>,
    pub toasts: Registry<ToastProps>,
    closables: ClosableRegistry,
    zorder: Arc<ZOrder>,
}

impl OverlayHost {
    pub fn new(bus: &EventBus<PromptEvent>, zorder: Arc<ZOrder>) -> Self {
        let closables = ClosableRegistry::new();
        Self {
            alerts: Registry::new(bus, zorder.clone(), closables.clone()),
            notices: Registry::new(bus, zorder.clone(), closables.clone()),
            toasts: Registry::new(bus, zorder.clone(), closables.clone()),
            closables,
            zorder,
        }
    }

    pub fn closables(&self) -> &ClosableRegistry {
        &self.closables
    }

    pub fn open_drawer(&self, on_dismiss: impl Fn() + Send + Sync + 'static) -> Drawer {
        Drawer::open(&self.closables, &self.zorder, on_dismiss)
    }

    /// Handle the platform back action; false means "not consumed"
    pub fn back(&self) -> bool {
        let consumed = self.closables.resolve_and_dismiss();
        debug!("back navigation consumed: {}", consumed);
        consumed
    }

    pub fn dispose(&self) {
        self.alerts.dispose();
        self.notices.dispose();
        self.toasts.dispose();
    }
}
