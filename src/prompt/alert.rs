use anyhow::{Result, bail};
use futures::future::BoxFuture;
use log::{debug, warn};
use std::future::Future;
use std::sync::Arc;

use super::PromptEvent;
use super::registry::{Callback, OverlayKind, OverlayProps, Registry};

/// Async confirm handler; receives the prompt input for `AlertKind::Prompt`
pub type ConfirmFn = Arc<dyn Fn(Option<String>) -> BoxFuture<'static, Result<()>> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertKind {
    #[default]
    Success,
    Warning,
    Error,
    /// Single-line text input with a confirm button
    Prompt,
    Close,
}

/// Modal dialog raised through the `alert` topic.
///
/// # Example
/// ```rust,ignore
/// let close = prompts.alert(
///     AlertProps::new(AlertKind::Warning, "Uninstall")
///         .description("This removes the app and its data")
///         .on_confirm(|_| async { Ok(()) }),
/// );
/// ```
#[derive(Clone, Default)]
pub struct AlertProps {
    pub id: Option<String>,
    pub kind: AlertKind,
    pub title: String,
    pub description: Option<String>,
    pub placeholder: Option<String>,
    pub default_value: Option<String>,
    pub button_text: Option<String>,
    pub show_cancel: Option<bool>,
    pub show_confirm: Option<bool>,
    pub close_on_click_mask: Option<bool>,
    pub z_index: Option<i64>,
    pub on_confirm: Option<ConfirmFn>,
    pub on_cancel: Option<Callback>,
    pub closing: bool,
}

impl AlertProps {
    pub fn new(kind: AlertKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn button_text(mut self, text: impl Into<String>) -> Self {
        self.button_text = Some(text.into());
        self
    }

    pub fn show_cancel(mut self, show: bool) -> Self {
        self.show_cancel = Some(show);
        self
    }

    pub fn show_confirm(mut self, show: bool) -> Self {
        self.show_confirm = Some(show);
        self
    }

    pub fn close_on_click_mask(mut self, close: bool) -> Self {
        self.close_on_click_mask = Some(close);
        self
    }

    pub fn z_index(mut self, z_index: i64) -> Self {
        self.z_index = Some(z_index);
        self
    }

    pub fn on_confirm<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(Option<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.on_confirm = Some(Arc::new(move |value| -> BoxFuture<'static, Result<()>> {
            Box::pin(handler(value))
        }));
        self
    }

    pub fn on_cancel(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_cancel = Some(Arc::new(handler));
        self
    }

    pub fn shows_cancel(&self) -> bool {
        self.show_cancel.unwrap_or(true)
    }

    pub fn shows_confirm(&self) -> bool {
        self.show_confirm.unwrap_or(true)
    }

    pub fn closes_on_mask(&self) -> bool {
        self.close_on_click_mask.unwrap_or(true)
    }
}

impl OverlayProps for AlertProps {
    const KIND: OverlayKind = OverlayKind::Alert;

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
        self.show_cancel.get_or_insert(true);
        self.show_confirm.get_or_insert(true);
        self.close_on_click_mask.get_or_insert(true);
    }

    fn z_index(&self) -> Option<i64> {
        self.z_index
    }

    fn duration(&self) -> Option<std::time::Duration> {
        None
    }

    fn on_dismiss(&self) -> Option<Callback> {
        self.on_cancel.clone()
    }

    fn into_event(self) -> PromptEvent {
        PromptEvent::Alert(self)
    }

    fn from_event(event: &PromptEvent) -> Option<&Self> {
        match event {
            PromptEvent::Alert(props) => Some(props),
            _ => None,
        }
    }
}

impl Registry<AlertProps> {
    /// Run the alert's confirm handler and close it once the handler succeeds.
    ///
    /// The alert is marked busy while the handler runs. A failing handler
    /// leaves the alert open and its error is returned.
    pub async fn confirm(&self, id: &str, value: Option<String>) -> Result<()> {
        let handler = self.inner.update(id, |overlay| {
            if overlay.closing || overlay.busy {
                return Err(());
            }
            overlay.busy = true;
            Ok(overlay.props.on_confirm.clone())
        });
        let handler = match handler {
            Some(Ok(handler)) => handler,
            Some(Err(())) => bail!("alert '{}' is not accepting input", id),
            None => bail!("alert '{}' not found", id),
        };

        let result = match handler {
            Some(handler) => handler(value).await,
            None => Ok(()),
        };
        self.inner.update(id, |overlay| overlay.busy = false);

        match result {
            Ok(()) => {
                self.inner.begin_close(id, false);
                Ok(())
            }
            Err(error) => {
                warn!("alert '{}' confirm failed: {}", id, error);
                Err(error)
            }
        }
    }

    /// Run `on_cancel` and close
    pub fn cancel(&self, id: &str) {
        let hook = self
            .inner
            .update(id, |overlay| overlay.props.on_cancel.clone())
            .flatten();
        if let Some(hook) = hook {
            hook();
        }
        self.inner.begin_close(id, false);
    }

    /// Click outside the dialog; ignored unless `close_on_click_mask` is set
    pub fn mask_click(&self, id: &str) {
        let closes = self
            .inner
            .update(id, |overlay| overlay.props.closes_on_mask())
            .unwrap_or(false);
        if closes {
            self.inner.begin_close(id, false);
        } else {
            debug!("alert '{}' ignores mask click", id);
        }
    }
}
