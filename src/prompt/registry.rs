//! Generic overlay registry.
//!
//! One registry exists per overlay class (alert, notice, toast). It listens on
//! the class's bus topic, owns the ordered collection of live overlays and
//! drives each overlay through its lifecycle:
//!
//! 1. optional delayed reveal after `delay_show`
//! 2. optional auto-close `duration` after creation
//! 3. removal once the class's settle delay has elapsed after closing began
//!
//! Every timer is a spawned tokio task whose handle is stored with the
//! overlay; removal and [`Registry::dispose`] abort whatever is still pending.
//! Registries must therefore be created and fed from inside a tokio runtime.

use log::{debug, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, sleep_until};
use uuid::Uuid;

use super::PromptEvent;
use super::bus::{EventBus, Subscription};
use super::closable::ClosableRegistry;
use super::zorder::{Band, ZOrder};

pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// The three overlay classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Alert,
    Notice,
    Toast,
}

impl OverlayKind {
    pub fn topic(self) -> &'static str {
        match self {
            OverlayKind::Alert => "alert",
            OverlayKind::Notice => "notice",
            OverlayKind::Toast => "toast",
        }
    }

    pub fn band(self) -> Band {
        match self {
            OverlayKind::Alert => Band::Alert,
            OverlayKind::Notice => Band::Notice,
            OverlayKind::Toast => Band::Toast,
        }
    }

    /// Time between closing and removal, covering the exit animation
    pub fn settle(self) -> Duration {
        match self {
            OverlayKind::Toast => Duration::from_millis(300),
            OverlayKind::Alert | OverlayKind::Notice => Duration::from_millis(3000),
        }
    }

    /// Whether back-navigation may dismiss overlays of this class
    pub fn closable(self) -> bool {
        !matches!(self, OverlayKind::Toast)
    }

    /// Notices and toasts never hand out a z-index below the live ceiling
    pub fn clamps_to_ceiling(self) -> bool {
        !matches!(self, OverlayKind::Alert)
    }
}

/// Per-class payload carried on the bus and stored with each overlay
pub trait OverlayProps: Clone + Send + Sync + 'static {
    const KIND: OverlayKind;

    fn id(&self) -> Option<&str>;
    fn set_id(&mut self, id: String);

    /// Closing markers ask the registry to close the overlay with the same id
    fn is_closing(&self) -> bool;
    fn mark_closing(&mut self);

    /// Fill class defaults for every unset option
    fn fill_defaults(&mut self);

    fn z_index(&self) -> Option<i64>;

    fn delay_show(&self) -> Duration {
        Duration::ZERO
    }

    /// Auto-close delay; `None` or zero keeps the overlay until closed
    fn duration(&self) -> Option<Duration>;

    /// Insert at the front of the collection instead of appending
    fn prepend(&self) -> bool {
        false
    }

    /// Called once when closing begins
    fn on_close(&self) -> Option<Callback> {
        None
    }

    /// Called when back-navigation dismisses the overlay, before it closes
    fn on_dismiss(&self) -> Option<Callback> {
        None
    }

    fn into_event(self) -> PromptEvent;
    fn from_event(event: &PromptEvent) -> Option<&Self>;
}

/// Snapshot of one live overlay
#[derive(Clone)]
pub struct Overlay<P> {
    pub id: String,
    pub z_index: i64,
    pub visible: bool,
    pub closing: bool,
    /// An asynchronous action (alert confirm) is pending
    pub busy: bool,
    pub props: P,
}

struct Entry<P> {
    overlay: Overlay<P>,
    timer: Option<JoinHandle<()>>,
    removal: Option<JoinHandle<()>>,
}

impl<P> Entry<P> {
    fn abort_timers(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        if let Some(removal) = self.removal.take() {
            removal.abort();
        }
    }
}

struct State<P> {
    entries: Vec<Entry<P>>,
    subscription: Option<Subscription>,
    disposed: bool,
}

impl<P> State<P> {
    fn ceiling(&self) -> i64 {
        self.entries
            .iter()
            .map(|entry| entry.overlay.z_index)
            .max()
            .unwrap_or(0)
    }

    fn entry_mut(&mut self, id: &str) -> Option<&mut Entry<P>> {
        self.entries.iter_mut().find(|entry| entry.overlay.id == id)
    }
}

pub(super) struct Inner<P> {
    zorder: Arc<ZOrder>,
    closables: ClosableRegistry,
    state: Mutex<State<P>>,
}

/// Registry for one overlay class; clones share the same collection
pub struct Registry<P: OverlayProps> {
    pub(super) inner: Arc<Inner<P>>,
}

impl<P: OverlayProps> Clone for Registry<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<P: OverlayProps> Registry<P> {
    /// Create the registry and subscribe it to its class topic on `bus`
    pub fn new(bus: &EventBus<PromptEvent>, zorder: Arc<ZOrder>, closables: ClosableRegistry) -> Self {
        let inner = Arc::new(Inner {
            zorder,
            closables,
            state: Mutex::new(State {
                entries: Vec::new(),
                subscription: None,
                disposed: false,
            }),
        });

        let weak = Arc::downgrade(&inner);
        let subscription = bus.subscribe(P::KIND.topic(), move |event: &PromptEvent| {
            if let (Some(inner), Some(props)) = (weak.upgrade(), P::from_event(event)) {
                inner.receive(props.clone());
            }
        });
        inner.lock().subscription = Some(subscription);

        Self { inner }
    }

    /// Live overlays in stacking order
    pub fn items(&self) -> Vec<Overlay<P>> {
        self.inner
            .lock()
            .entries
            .iter()
            .map(|entry| entry.overlay.clone())
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Overlay<P>> {
        self.inner
            .lock()
            .entries
            .iter()
            .find(|entry| entry.overlay.id == id)
            .map(|entry| entry.overlay.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Highest z-index among live overlays (0 when empty); the layer hosting
    /// this class is drawn at this depth
    pub fn z_ceiling(&self) -> i64 {
        self.inner.lock().ceiling()
    }

    /// Add an overlay directly, bypassing the bus
    pub fn push(&self, props: P) {
        self.inner.receive(props);
    }

    /// Start closing the overlay; removal follows after the settle delay
    pub fn close(&self, id: &str) {
        self.inner.begin_close(id, false);
    }

    /// Dismiss as back-navigation would: run the dismiss hook, then close
    pub fn dismiss(&self, id: &str) {
        self.inner.dismiss(id);
    }

    /// Unsubscribe from the bus, cancel every timer and drop all overlays
    pub fn dispose(&self) {
        let (subscription, entries) = {
            let mut state = self.inner.lock();
            state.disposed = true;
            (state.subscription.take(), std::mem::take(&mut state.entries))
        };
        drop(subscription);
        for mut entry in entries {
            entry.abort_timers();
            self.inner.closables.deregister(&entry.overlay.id);
        }
        debug!("{} registry disposed", P::KIND.topic());
    }
}

impl<P: OverlayProps> Inner<P> {
    fn lock(&self) -> MutexGuard<'_, State<P>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` to the live overlay with `id`
    pub(super) fn update<R>(&self, id: &str, f: impl FnOnce(&mut Overlay<P>) -> R) -> Option<R> {
        self.lock().entry_mut(id).map(|entry| f(&mut entry.overlay))
    }

    fn receive(self: &Arc<Self>, mut props: P) {
        if props.is_closing() {
            match props.id() {
                Some(id) => self.begin_close(id, false),
                None => debug!("{} closing marker without id ignored", P::KIND.topic()),
            }
            return;
        }

        props.fill_defaults();
        let id = match props.id() {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                props.set_id(id.clone());
                id
            }
        };

        let delay = props.delay_show();
        let duration = props.duration().filter(|duration| !duration.is_zero());
        let reveal_now = delay.is_zero();
        let prepend = props.prepend();

        let z_index = {
            let mut state = self.lock();
            if state.disposed {
                return;
            }
            if state.entries.iter().any(|entry| entry.overlay.id == id) {
                debug!("{} '{}' already live, ignoring duplicate", P::KIND.topic(), id);
                return;
            }

            let requested = props
                .z_index()
                .unwrap_or_else(|| self.zorder.next_in(P::KIND.band()));
            let z_index = if P::KIND.clamps_to_ceiling() {
                requested.max(state.ceiling())
            } else {
                requested
            };

            let timer = (!reveal_now || duration.is_some())
                .then(|| self.spawn_timer(id.clone(), delay, duration));
            let entry = Entry {
                overlay: Overlay {
                    id: id.clone(),
                    z_index,
                    visible: reveal_now,
                    closing: false,
                    busy: false,
                    props,
                },
                timer,
                removal: None,
            };
            if prepend {
                state.entries.insert(0, entry);
            } else {
                state.entries.push(entry);
            }
            z_index
        };

        debug!("{} '{}' created (z={})", P::KIND.topic(), id, z_index);
        if reveal_now {
            self.register_closable(&id, z_index);
        }
    }

    fn spawn_timer(self: &Arc<Self>, id: String, delay: Duration, duration: Option<Duration>) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        let start = Instant::now();
        tokio::spawn(async move {
            let reveals = !delay.is_zero() && duration.is_none_or(|duration| delay < duration);
            if reveals {
                sleep_until(start + delay).await;
                match weak.upgrade() {
                    Some(inner) => inner.reveal(&id),
                    None => return,
                }
            }
            if let Some(duration) = duration {
                sleep_until(start + duration).await;
                if let Some(inner) = weak.upgrade() {
                    inner.begin_close(&id, true);
                }
            }
        })
    }

    fn reveal(self: &Arc<Self>, id: &str) {
        let z_index = {
            let mut state = self.lock();
            match state.entry_mut(id) {
                Some(entry) if !entry.overlay.closing => {
                    entry.overlay.visible = true;
                    entry.overlay.z_index
                }
                _ => return,
            }
        };
        debug!("{} '{}' revealed", P::KIND.topic(), id);
        self.register_closable(id, z_index);
    }

    fn register_closable(self: &Arc<Self>, id: &str, z_index: i64) {
        if !P::KIND.closable() {
            return;
        }
        let weak: Weak<Self> = Arc::downgrade(self);
        let key = id.to_string();
        self.closables.register(
            id,
            Some(z_index),
            Arc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.dismiss(&key);
                }
            }),
        );
    }

    fn dismiss(self: &Arc<Self>, id: &str) {
        let hook = self.update(id, |overlay| {
            if overlay.closing {
                None
            } else {
                overlay.props.on_dismiss()
            }
        });
        if let Some(Some(hook)) = hook {
            hook();
        }
        self.begin_close(id, false);
    }

    /// Flip the overlay to closing and schedule its removal.
    ///
    /// The removal timer is armed before `on_close` runs, so a panicking
    /// close handler cannot keep the overlay alive.
    pub(super) fn begin_close(self: &Arc<Self>, id: &str, from_timer: bool) {
        let on_close = {
            let mut state = self.lock();
            let Some(entry) = state.entry_mut(id) else {
                debug!("{} '{}' not found, close ignored", P::KIND.topic(), id);
                return;
            };
            if entry.overlay.closing {
                return;
            }
            entry.overlay.closing = true;
            entry.overlay.visible = false;
            if !from_timer {
                if let Some(timer) = entry.timer.take() {
                    timer.abort();
                }
            }
            entry.removal = Some(self.spawn_removal(id.to_string()));
            entry.overlay.props.on_close()
        };

        debug!("{} '{}' closing", P::KIND.topic(), id);
        self.closables.deregister(id);
        if let Some(on_close) = on_close {
            on_close();
        }
    }

    fn spawn_removal(self: &Arc<Self>, id: String) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            sleep(P::KIND.settle()).await;
            if let Some(inner) = weak.upgrade() {
                inner.remove(&id);
            }
        })
    }

    fn remove(&self, id: &str) {
        let removed = {
            let mut state = self.lock();
            let index = state.entries.iter().position(|entry| entry.overlay.id == id);
            index.map(|index| state.entries.remove(index))
        };
        match removed {
            Some(mut entry) => {
                if let Some(timer) = entry.timer.take() {
                    timer.abort();
                }
                // the removal handle belongs to the task running this call
                entry.removal.take();
                self.closables.deregister(id);
                debug!("{} '{}' removed", P::KIND.topic(), id);
            }
            None => warn!("{} '{}' vanished before removal", P::KIND.topic(), id),
        }
    }
}
