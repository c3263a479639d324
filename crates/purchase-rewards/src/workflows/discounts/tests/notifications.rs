use std::sync::Arc;

use super::common::*;
use crate::workflows::discounts::domain::{DiscountKind, DiscountOutcome};
use crate::workflows::discounts::notifications::{
    render_no_match, render_notice, DiscountNotifier, Notice, NotificationDispatcher,
    NotifyError, RecordingNotifier, TracingNotifier,
};

fn outcome(kind: DiscountKind, percentage: u8, immediate: bool) -> DiscountOutcome {
    DiscountOutcome {
        customer_id: customer_id(),
        discount_type: kind,
        discount_percentage: percentage,
        purchase_amount: usd(250),
        applied_immediately: immediate,
    }
}

#[test]
fn notices_describe_when_the_discount_applies() {
    let immediate = render_notice(&outcome(DiscountKind::DailyBigPurchase, 10, true), "Enjoy!");
    assert_eq!(immediate, "10% off applied to your $250.00 purchase. Enjoy!");

    let deferred = render_notice(&outcome(DiscountKind::BigSpender, 20, false), "Thanks!");
    assert_eq!(
        deferred,
        "20% off your next purchase (earned on $250.00). Thanks!"
    );

    let informational = render_notice(&outcome(DiscountKind::NoDiscount, 0, false), "Keep going.");
    assert!(informational.starts_with("No discount on your $250.00 purchase"));
}

#[test]
fn no_match_notice_lists_totals() {
    let notice = render_no_match(&facts(usd(200), usd(50), usd(150)));

    assert!(notice.contains("$150.00"));
    assert!(notice.contains("lifetime $200.00"));
    assert!(notice.contains("this week $50.00"));
}

#[test]
fn dispatcher_delivers_to_every_listener() {
    let first = Arc::new(RecordingNotifier::default());
    let second = Arc::new(RecordingNotifier::default());
    let dispatcher = NotificationDispatcher::new()
        .with_listener(first.clone())
        .with_listener(second.clone());

    let discount = outcome(DiscountKind::WeeklySpender, 5, false);
    dispatcher
        .notify_discount(&discount, "weekly")
        .expect("all listeners succeed");
    dispatcher
        .notify_no_match(&facts(usd(1), usd(1), usd(1)))
        .expect("all listeners succeed");

    assert_eq!(dispatcher.len(), 2);
    for listener in [first, second] {
        let notices = listener.notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(
            notices[0],
            Notice::Discount {
                outcome: discount.clone(),
                message: "weekly".to_string(),
            }
        );
        assert!(matches!(notices[1], Notice::NoMatch { .. }));
        assert_eq!(listener.discounts(), vec![discount.clone()]);
    }
}

#[test]
fn failing_listener_does_not_block_the_rest() {
    let recorder = Arc::new(RecordingNotifier::default());
    let mut dispatcher = NotificationDispatcher::new();
    dispatcher.register(Arc::new(FailingNotifier));
    dispatcher.register(Arc::new(TracingNotifier));
    dispatcher.register(recorder.clone());

    let (result, logs) = with_captured_warnings(|| {
        dispatcher.notify_discount(&outcome(DiscountKind::BigSpender, 20, false), "vip")
    });

    match result {
        Err(NotifyError::Partial { failed, attempted }) => {
            assert_eq!(failed, 1);
            assert_eq!(attempted, 3);
        }
        other => panic!("expected partial failure, got {other:?}"),
    }
    assert_eq!(recorder.notices().len(), 1);
    let lines = logs.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("notification delivery failed"));
    assert!(lines[0].contains("failing"));
}

#[test]
fn empty_dispatcher_accepts_notices() {
    let dispatcher = NotificationDispatcher::new();

    assert!(dispatcher.is_empty());
    assert!(dispatcher
        .notify_no_match(&facts(usd(1), usd(1), usd(1)))
        .is_ok());
}
