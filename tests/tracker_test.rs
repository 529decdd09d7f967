use rai_lens::{
    Document, EngineConfig, HostEvent, MutationRecord, ObserverState, Preferences, PriceTracker,
};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

fn preferences(enabled: bool) -> Preferences {
    Preferences {
        decimals: 2,
        enabled,
        conversion: Some(Decimal::TWO),
        ..Preferences::default()
    }
}

#[cfg(test)]
mod rescan_tests {
    use super::*;

    #[test]
    fn test_inserted_price_rescans_only_its_parent() {
        let mut doc = Document::new();
        let root = doc.root();
        let cart = doc.append_element(root, "div").unwrap();
        let first = doc.append_text(cart, "$2").unwrap();
        let sidebar = doc.append_element(root, "div").unwrap();
        doc.append_text(sidebar, "$4").unwrap();
        doc.append_text(sidebar, "Free returns").unwrap();

        let mut tracker = PriceTracker::new(EngineConfig::default());
        let initial = tracker.apply_preferences(&mut doc, preferences(true));
        assert_eq!(initial.text_nodes, 3);
        assert_eq!(initial.rewritten, 2);

        let added = doc.append_text(cart, "$9.99").unwrap();
        let records = doc.take_records();
        assert_eq!(
            records,
            vec![MutationRecord::ChildList {
                target: cart,
                added: vec![added]
            }]
        );

        let stats = tracker.on_mutations(&mut doc, records);
        assert_eq!(stats.text_nodes, 2);
        assert_eq!(stats.rewritten, 1);
        assert_eq!(doc.text(added), Some("5.00 RAI"));
        assert_eq!(doc.text(first), Some("1.00 RAI"));
    }

    #[test]
    fn test_edited_text_is_converted_without_feedback() {
        let mut doc = Document::new();
        let span = doc.append_element(doc.root(), "span").unwrap();
        let text = doc.append_text(span, "sold out").unwrap();

        let mut tracker = PriceTracker::new(EngineConfig::default());
        tracker.apply_preferences(&mut doc, preferences(true));

        doc.set_text(text, "now $6");
        let records = doc.take_records();
        tracker.on_mutations(&mut doc, records);

        assert_eq!(doc.text(text), Some("now 3.00 RAI"));
        // The rewrite itself must not produce another batch
        assert!(doc.take_records().is_empty());
    }

    #[test]
    fn test_restored_marker_does_not_convert_twice() {
        // <div><span>20</span><span>USD</span></div>
        let mut doc = Document::new();
        let div = doc.append_element(doc.root(), "div").unwrap();
        let left = doc.append_element(div, "span").unwrap();
        let amount = doc.append_text(left, "20").unwrap();
        let right = doc.append_element(div, "span").unwrap();
        let marker = doc.append_text(right, "USD").unwrap();

        let mut tracker = PriceTracker::new(EngineConfig::default());
        tracker.apply_preferences(&mut doc, preferences(true));
        assert_eq!(doc.text(amount), Some("10.00"));
        assert_eq!(doc.text(marker), Some(" RAI"));

        // The host puts its own label back; the amount is already converted
        doc.set_text(marker, "USD");
        let records = doc.take_records();
        let stats = tracker.on_mutations(&mut doc, records);

        assert_eq!(stats.rewritten, 0);
        assert_eq!(doc.text(amount), Some("10.00"));
        assert_eq!(doc.text(marker), Some("USD"));
    }

    #[test]
    fn test_one_batch_rescans_a_parent_once() {
        let mut doc = Document::new();
        let list = doc.append_element(doc.root(), "ul").unwrap();

        let mut tracker = PriceTracker::new(EngineConfig::default());
        tracker.apply_preferences(&mut doc, preferences(true));

        doc.append_text(list, "$1").unwrap();
        doc.append_text(list, "$3").unwrap();
        let records = doc.take_records();
        let stats = tracker.on_mutations(&mut doc, records);

        assert_eq!(stats.text_nodes, 2);
        assert_eq!(stats.rewritten, 2);
    }

    #[test]
    fn test_disabled_tracker_stops_journaling() {
        let mut doc = Document::new();
        let span = doc.append_element(doc.root(), "span").unwrap();

        let mut tracker = PriceTracker::new(EngineConfig::default());
        tracker.apply_preferences(&mut doc, preferences(true));
        tracker.apply_preferences(&mut doc, preferences(false));
        assert_eq!(tracker.state(), ObserverState::Disconnected);

        let text = doc.append_text(span, "$8").unwrap();
        assert!(doc.take_records().is_empty());
        assert_eq!(doc.text(text), Some("$8"));

        // Re-enabling converts what was missed while disconnected
        tracker.apply_preferences(&mut doc, preferences(true));
        assert_eq!(doc.text(text), Some("4.00 RAI"));
    }
}

#[cfg(test)]
mod event_loop_tests {
    use super::*;

    #[tokio::test]
    async fn test_events_are_processed_in_order() {
        let document = Arc::new(Mutex::new(Document::new()));
        let (span, text) = {
            let mut doc = document.lock().unwrap();
            let root = doc.root();
            let span = doc.append_element(root, "span").unwrap();
            let text = doc.append_text(span, "$10").unwrap();
            (span, text)
        };

        let mut tracker = PriceTracker::new(EngineConfig::default());
        tracker.apply_preferences(&mut document.lock().unwrap(), preferences(true));

        let (tx, rx) = PriceTracker::channel();
        let records = {
            let mut doc = document.lock().unwrap();
            doc.append_text(span, "USD 12").unwrap();
            doc.take_records()
        };
        tx.send(HostEvent::Mutations(records)).await.unwrap();
        tx.send(HostEvent::Preferences(preferences(false))).await.unwrap();
        drop(tx);

        let tracker = tracker.run(Arc::clone(&document), rx).await.unwrap();

        let doc = document.lock().unwrap();
        assert_eq!(doc.text(text), Some("5.00 RAI"));
        assert_eq!(
            rai_lens::document::text_content(&doc, span),
            "5.00 RAI6.00 RAI"
        );
        assert_eq!(tracker.state(), ObserverState::Disconnected);
        assert!(!doc.is_observed());
    }

    #[tokio::test]
    async fn test_preferences_message_from_json() {
        let document = Arc::new(Mutex::new(Document::new()));
        let text = {
            let mut doc = document.lock().unwrap();
            let root = doc.root();
            let p = doc.append_element(root, "p").unwrap();
            doc.append_text(p, "Total: 1,500 dollars").unwrap()
        };

        let message = r#"{
            "decimals": "1",
            "refreshConversionTime": "300",
            "enabled": true,
            "marketPrice": false,
            "conversion": "3"
        }"#;
        let (tx, rx) = PriceTracker::channel();
        tx.send(HostEvent::Preferences(Preferences::from_json(message).unwrap()))
            .await
            .unwrap();
        drop(tx);

        let tracker = PriceTracker::new(EngineConfig::default())
            .run(Arc::clone(&document), rx)
            .await
            .unwrap();

        assert_eq!(tracker.state(), ObserverState::Observing);
        assert_eq!(
            document.lock().unwrap().text(text),
            Some("Total: 500.0 RAI")
        );
    }
}
