//! Overlay registries driven through the bus with paused tokio time

use appstore_cli::prompt::{
    AlertKind, AlertProps, EventBus, NoticeProps, OverlayHost, PromptEvent, Prompts, ToastDirection, ToastProps,
    Tone, ZOrder,
};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn setup() -> (OverlayHost, Prompts) {
    let bus: EventBus<PromptEvent> = EventBus::new();
    let host = OverlayHost::new(&bus, Arc::new(ZOrder::new()));
    (host, Prompts::new(bus))
}

/// Advance paused time and let woken timer tasks run
async fn elapse(ms: u64) {
    tokio::time::advance(Duration::from_millis(ms)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let hook = count.clone();
    (count, move || {
        hook.fetch_add(1, Ordering::SeqCst);
    })
}

/// A notice with a 3000ms duration closes at 3000ms and is removed one settle delay later
#[tokio::test(start_paused = true)]
async fn test_notice_closes_after_duration_then_settles() {
    let (host, prompts) = setup();
    let (closed, on_close) = counter();
    let handle = prompts.notice(
        NoticeProps::new(Tone::Info, "Saved")
            .duration(Duration::from_millis(3000))
            .on_close(on_close),
    );

    let notice = host.notices.get(handle.id()).unwrap();
    assert!(notice.visible);
    assert!(!notice.closing);

    elapse(2999).await;
    assert!(!host.notices.get(handle.id()).unwrap().closing);

    elapse(2).await;
    let notice = host.notices.get(handle.id()).unwrap();
    assert!(notice.closing);
    assert!(!notice.visible);
    assert_eq!(closed.load(Ordering::SeqCst), 1);

    elapse(2990).await;
    assert!(host.notices.get(handle.id()).is_some());

    elapse(12).await;
    assert!(host.notices.get(handle.id()).is_none());
    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

/// Auto-close still removes the notice when its close handler panics
#[tokio::test(start_paused = true)]
async fn test_panicking_close_handler_on_auto_close() {
    let (host, prompts) = setup();
    let handle = prompts.notice(
        NoticeProps::new(Tone::Info, "Boom")
            .duration(Duration::from_millis(3000))
            .on_close(|| panic!("close handler failed")),
    );

    elapse(3001).await;
    assert!(host.notices.get(handle.id()).unwrap().closing);
    assert!(!host.closables().contains(handle.id()));

    elapse(3001).await;
    assert!(host.notices.get(handle.id()).is_none());
}

/// An explicit close surfaces the panic to the caller but removal still happens
#[tokio::test(start_paused = true)]
async fn test_panicking_close_handler_on_explicit_close() {
    let (host, prompts) = setup();
    let handle = prompts.notice(
        NoticeProps::new(Tone::Info, "Boom")
            .persistent()
            .on_close(|| panic!("close handler failed")),
    );

    assert!(catch_unwind(AssertUnwindSafe(|| handle.close())).is_err());
    assert!(host.notices.get(handle.id()).unwrap().closing);

    elapse(2990).await;
    assert!(host.notices.get(handle.id()).is_some());
    elapse(12).await;
    assert!(host.notices.get(handle.id()).is_none());

    // the registry keeps working afterwards
    let next = prompts.notice(NoticeProps::new(Tone::Info, "next"));
    assert!(host.notices.get(next.id()).is_some());
}

/// Notices default to 6000ms
#[tokio::test(start_paused = true)]
async fn test_notice_default_duration() {
    let (host, prompts) = setup();
    let handle = prompts.notice(NoticeProps::new(Tone::Success, "Done"));

    elapse(5990).await;
    assert!(!host.notices.get(handle.id()).unwrap().closing);
    elapse(12).await;
    assert!(host.notices.get(handle.id()).unwrap().closing);
}

/// Toasts settle after 300ms instead of 3000ms
#[tokio::test(start_paused = true)]
async fn test_toast_settles_quickly_after_close() {
    let (host, prompts) = setup();
    let handle = prompts.toast(ToastProps::new("Copied"));
    assert_eq!(host.toasts.get(handle.id()).unwrap().props.tone, Some(Tone::Info));

    handle.close();
    assert!(host.toasts.get(handle.id()).unwrap().closing);

    elapse(290).await;
    assert!(host.toasts.get(handle.id()).is_some());
    elapse(12).await;
    assert!(host.toasts.get(handle.id()).is_none());
}

/// A zero duration keeps the overlay until it is closed
#[tokio::test(start_paused = true)]
async fn test_persistent_notice_stays_open() {
    let (host, prompts) = setup();
    let handle = prompts.notice(NoticeProps::new(Tone::Text, "Working").persistent());

    elapse(60_000).await;
    assert!(!host.notices.get(handle.id()).unwrap().closing);

    handle.close();
    elapse(3001).await;
    assert!(host.notices.is_empty());
}

/// Delayed notices are hidden and not back-dismissable until revealed
#[tokio::test(start_paused = true)]
async fn test_delay_show_reveals_later() {
    let (host, prompts) = setup();
    let handle = prompts.notice(
        NoticeProps::new(Tone::Info, "Later")
            .delay_show(Duration::from_millis(1000))
            .duration(Duration::from_millis(3000)),
    );

    assert!(!host.notices.get(handle.id()).unwrap().visible);
    assert!(!host.closables().contains(handle.id()));

    elapse(1001).await;
    assert!(host.notices.get(handle.id()).unwrap().visible);
    assert!(host.closables().contains(handle.id()));

    elapse(2001).await;
    assert!(host.notices.get(handle.id()).unwrap().closing);
    assert!(!host.closables().contains(handle.id()));
}

/// A duration shorter than the reveal delay closes the notice before it is ever shown
#[tokio::test(start_paused = true)]
async fn test_duration_shorter_than_delay_never_reveals() {
    let (host, prompts) = setup();
    let handle = prompts.notice(
        NoticeProps::new(Tone::Info, "Never")
            .delay_show(Duration::from_millis(2000))
            .duration(Duration::from_millis(1000)),
    );

    elapse(1001).await;
    let notice = host.notices.get(handle.id()).unwrap();
    assert!(notice.closing);
    assert!(!notice.visible);

    elapse(1500).await;
    assert!(!host.notices.get(handle.id()).unwrap().visible);
}

/// Top and middle lanes prepend, the bottom lane appends
#[tokio::test(start_paused = true)]
async fn test_toast_lanes_order() {
    let (host, prompts) = setup();
    let a = prompts.toast(ToastProps::new("a"));
    let b = prompts.toast(ToastProps::new("b"));
    let c = prompts.toast(ToastProps::new("c").direction(ToastDirection::Bottom));
    let d = prompts.toast(ToastProps::new("d").direction(ToastDirection::Bottom));
    let m = prompts.toast(ToastProps::new("m").direction(ToastDirection::Middle));

    let ids = |direction| {
        host.toasts
            .lane(direction)
            .into_iter()
            .map(|toast| toast.id)
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(ToastDirection::Top), vec![b.id().to_string(), a.id().to_string()]);
    assert_eq!(ids(ToastDirection::Bottom), vec![c.id().to_string(), d.id().to_string()]);
    assert_eq!(ids(ToastDirection::Middle), vec![m.id().to_string()]);
}

/// Later overlays never get a lower z-index than live ones of the same class
#[tokio::test(start_paused = true)]
async fn test_z_indices_increase_and_clamp_to_ceiling() {
    let (host, prompts) = setup();
    let first = prompts.notice(NoticeProps::new(Tone::Info, "one"));
    let second = prompts.notice(NoticeProps::new(Tone::Info, "two"));
    let z1 = host.notices.get(first.id()).unwrap().z_index;
    let z2 = host.notices.get(second.id()).unwrap().z_index;
    assert!(z2 > z1);
    assert_eq!(host.notices.z_ceiling(), z2);

    let mut high = NoticeProps::new(Tone::Info, "high");
    high.z_index = Some(50_000);
    prompts.notice(high);
    let after = prompts.notice(NoticeProps::new(Tone::Info, "after"));
    assert!(host.notices.get(after.id()).unwrap().z_index >= 50_000);

    let low = prompts.alert(AlertProps::new(AlertKind::Success, "low").z_index(1));
    assert_eq!(host.alerts.get(low.id()).unwrap().z_index, 1);

    let toast = prompts.toast(ToastProps::new("top"));
    assert!(host.toasts.get(toast.id()).unwrap().z_index > z2);
}

/// Back navigation dismisses the topmost surface first and falls through when nothing is open
#[tokio::test(start_paused = true)]
async fn test_back_navigation_order() {
    let (host, prompts) = setup();
    let (drawer_dismissed, on_drawer) = counter();
    let (cancelled, on_cancel) = counter();

    let drawer = host.open_drawer(on_drawer);
    let alert = prompts.alert(AlertProps::new(AlertKind::Warning, "Sure?").on_cancel(on_cancel));
    let notice = prompts.notice(NoticeProps::new(Tone::Info, "Hi").persistent());
    // toasts are never back-dismissable
    prompts.toast(ToastProps::new("ignored"));

    assert!(host.back());
    assert!(host.notices.get(notice.id()).unwrap().closing);
    assert!(!host.alerts.get(alert.id()).unwrap().closing);

    assert!(host.back());
    assert!(host.alerts.get(alert.id()).unwrap().closing);
    assert_eq!(cancelled.load(Ordering::SeqCst), 1);

    assert!(host.back());
    assert_eq!(drawer_dismissed.load(Ordering::SeqCst), 1);
    assert!(!drawer.is_open());

    assert!(!host.back());
    assert!(!host.back());
}

/// Confirm keeps a failing alert open and closes it once the handler succeeds
#[tokio::test(start_paused = true)]
async fn test_alert_confirm_closes_only_on_success() {
    let (host, prompts) = setup();
    let attempts = Arc::new(AtomicUsize::new(0));
    let seen = attempts.clone();
    let handle = prompts.alert(
        AlertProps::new(AlertKind::Prompt, "Install from URL").on_confirm(move |value: Option<String>| {
            let attempt = seen.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    anyhow::bail!("bad url {:?}", value);
                }
                Ok(())
            }
        }),
    );

    assert!(host.alerts.confirm(handle.id(), Some("x".into())).await.is_err());
    let alert = host.alerts.get(handle.id()).unwrap();
    assert!(!alert.closing);
    assert!(!alert.busy);

    host.alerts
        .confirm(handle.id(), Some("https://example.com/app.zip".into()))
        .await
        .unwrap();
    assert!(host.alerts.get(handle.id()).unwrap().closing);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);

    // closing alerts reject further input
    assert!(host.alerts.confirm(handle.id(), None).await.is_err());
}

/// Mask clicks respect close_on_click_mask
#[tokio::test(start_paused = true)]
async fn test_alert_mask_click() {
    let (host, prompts) = setup();
    let sticky = prompts.alert(AlertProps::new(AlertKind::Error, "Sticky").close_on_click_mask(false));
    let loose = prompts.alert(AlertProps::new(AlertKind::Error, "Loose"));

    host.alerts.mask_click(sticky.id());
    host.alerts.mask_click(loose.id());
    assert!(!host.alerts.get(sticky.id()).unwrap().closing);
    assert!(host.alerts.get(loose.id()).unwrap().closing);

    let alert = host.alerts.get(sticky.id()).unwrap();
    assert!(alert.props.shows_cancel());
    assert!(alert.props.shows_confirm());
}

/// Closing markers for unknown ids change nothing
#[tokio::test(start_paused = true)]
async fn test_close_marker_for_unknown_id_is_ignored() {
    let (host, prompts) = setup();
    let live = prompts.notice(NoticeProps::new(Tone::Info, "live").persistent());

    let mut stray = NoticeProps::new(Tone::Info, "stray");
    stray.id = Some("missing".into());
    stray.closing = true;
    prompts.bus().publish("notice", &PromptEvent::Notice(stray));

    assert_eq!(host.notices.len(), 1);
    assert!(!host.notices.get(live.id()).unwrap().closing);
}

/// Disposal cancels pending timers and stops listening
#[tokio::test(start_paused = true)]
async fn test_dispose_cancels_timers() {
    let (host, prompts) = setup();
    let (closed, on_close) = counter();
    prompts.notice(
        NoticeProps::new(Tone::Info, "bye")
            .duration(Duration::from_millis(1000))
            .on_close(on_close),
    );

    host.dispose();
    assert!(host.notices.is_empty());
    assert!(host.closables().is_empty());

    elapse(5000).await;
    assert_eq!(closed.load(Ordering::SeqCst), 0);

    prompts.notice(NoticeProps::new(Tone::Info, "after dispose"));
    assert!(host.notices.is_empty());
    assert_eq!(prompts.bus().subscriber_count("notice"), 0);
}
