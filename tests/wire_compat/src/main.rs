fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;
    use std::path::PathBuf;
    use std::rc::Rc;

    use consolerelay_capture::{
        CaptureConfig, CustomEvent, ErrorEvent, ErrorValue, Installer, MessagePort, Page,
        TransportError, Value,
    };
    use consolerelay_protocol::{DiagnosticRecord, RelayMessage};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values.
    fn roundtrip_test<T>(name: &str)
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));
        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  fixture: {fixture}\n  Rust:    {reserialized}"
        );
    }

    #[derive(Default)]
    struct CapturePort {
        sent: RefCell<Vec<serde_json::Value>>,
    }

    impl MessagePort for CapturePort {
        fn post(&self, message: &RelayMessage) -> Result<(), TransportError> {
            self.sent.borrow_mut().push(serde_json::to_value(message)?);
            Ok(())
        }
    }

    fn quiet_page(timestamp: i64) -> (Page, Rc<CapturePort>) {
        let page = Page::new(|_, _| {});
        let port = Rc::new(CapturePort::default());
        page.runtime().attach_addressed(port.clone());
        let config = CaptureConfig {
            announce: false,
            ..CaptureConfig::default()
        };
        Installer::new(config)
            .with_clock(move || timestamp)
            .install(&page);
        (page, port)
    }

    // --- Protocol type tests ---

    #[test]
    fn fixture_relay_message_log() {
        roundtrip_test::<RelayMessage>("relay_message_log.json");
    }

    #[test]
    fn fixture_relay_message_error() {
        roundtrip_test::<RelayMessage>("relay_message_error.json");
    }

    #[test]
    fn fixture_relay_message_with_tab() {
        roundtrip_test::<RelayMessage>("relay_message_tab.json");
    }

    #[test]
    fn fixture_console_event_detail() {
        roundtrip_test::<DiagnosticRecord>("console_event_detail.json");
    }

    // --- End-to-end payload shape ---

    #[test]
    fn console_call_matches_fixture() {
        let (page, port) = quiet_page(1700000000000);
        page.console().log(&[Value::from("count:"), Value::from(3)]);
        assert_eq!(*port.sent.borrow(), vec![load_fixture("relay_message_log.json")]);
    }

    #[test]
    fn uncaught_exception_matches_fixture() {
        let (page, port) = quiet_page(1700000000123);
        page.report_error(&ErrorEvent {
            error: Some(
                ErrorValue::new("TypeError", "x is undefined")
                    .with_stack("at foo (a.js:1:1)")
                    .into(),
            ),
            ..ErrorEvent::default()
        });
        assert_eq!(*port.sent.borrow(), vec![load_fixture("relay_message_error.json")]);
    }

    #[test]
    fn document_event_detail_matches_fixture() {
        let page = Page::new(|_, _| {});
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let config = CaptureConfig::default();
        page.document()
            .add_event_listener(config.event_name.clone(), move |e: &CustomEvent| {
                sink.borrow_mut().push(e.detail.clone());
            });
        Installer::new(config)
            .with_clock(|| 1700000000456)
            .install(&page);

        page.console().warn(&[Value::from("careful")]);
        assert_eq!(*seen.borrow(), vec![load_fixture("console_event_detail.json")]);
    }
}
