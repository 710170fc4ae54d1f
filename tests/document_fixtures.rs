use indoc::indoc;

use mediation_flow_debugger::debugger::{Breakpoint, DebuggerError, DebuggerHelper};
use mediation_flow_debugger::ir::{Artifact, MediatorKind};
use mediation_flow_debugger::logging;
use mediation_flow_debugger::parsers::{BuildError, Element, build_artifact};

fn init() {
    let _ = logging::init_logger(false, Some("warn"), false);
}

fn parse(json: &str) -> Element {
    serde_json::from_str(json).unwrap()
}

/// A proxy whose in-sequence holds a throttle with both branches.
const PROXY_FIXTURE: &str = indoc! {r#"
    {
      "tag": "proxy",
      "attributes": { "name": "ThrottledQuote", "transports": "http https" },
      "start": { "line": 0, "character": 0 },
      "end": { "line": 16, "character": 8 },
      "children": [
        {
          "tag": "target",
          "start": { "line": 1, "character": 2 },
          "end": { "line": 15, "character": 11 },
          "children": [
            {
              "tag": "inSequence",
              "start": { "line": 2, "character": 4 },
              "end": { "line": 14, "character": 17 },
              "children": [
                {
                  "tag": "throttle",
                  "attributes": { "id": "A" },
                  "start": { "line": 3, "character": 6 },
                  "end": { "line": 12, "character": 17 },
                  "children": [
                    {
                      "tag": "onReject",
                      "start": { "line": 4, "character": 8 },
                      "end": { "line": 7, "character": 19 },
                      "children": [
                        { "tag": "log", "start": { "line": 5, "character": 10 }, "end": { "line": 5, "character": 25 }, "self_closing": true },
                        { "tag": "drop", "start": { "line": 6, "character": 10 }, "end": { "line": 6, "character": 17 }, "self_closing": true }
                      ]
                    },
                    {
                      "tag": "onAccept",
                      "start": { "line": 8, "character": 8 },
                      "end": { "line": 11, "character": 19 },
                      "children": [
                        { "tag": "call", "start": { "line": 9, "character": 10 }, "end": { "line": 10, "character": 17 } }
                      ]
                    }
                  ]
                },
                { "tag": "respond", "start": { "line": 13, "character": 6 }, "end": { "line": 13, "character": 16 }, "self_closing": true }
              ]
            }
          ]
        }
      ]
    }
"#};

#[test]
fn test_proxy_fixture_positions() {
    init();
    let helper = DebuggerHelper::from_document(&parse(PROXY_FIXTURE)).unwrap();
    let position = |line| {
        helper.debug_info(&Breakpoint::new(line)).mediator_position().map(ToString::to_string)
    };
    // onAccept = 0, onReject = 1, regardless of document order.
    assert_eq!(position(5).as_deref(), Some("0 1 0"));
    assert_eq!(position(6).as_deref(), Some("0 1 1"));
    assert_eq!(position(9).as_deref(), Some("0 0 0"));
    assert_eq!(position(13).as_deref(), Some("1"));
    assert_eq!(position(3).as_deref(), Some("0"));
}

#[test]
fn test_proxy_fixture_multiline_leaf() {
    init();
    let helper = DebuggerHelper::from_document(&parse(PROXY_FIXTURE)).unwrap();
    // Without an explicit open_end the call start tag ends on its start line.
    let info = helper.debug_info(&Breakpoint::new(10));
    assert_eq!(info.error().as_deref(), Some("invalid breakpoint in Throttle Mediator"));
}

#[test]
fn test_unsupported_roots() {
    init();
    let endpoint = parse(indoc! {r#"
        {
          "tag": "endpoint",
          "attributes": { "name": "QuoteEP" },
          "start": { "line": 0, "character": 0 },
          "end": { "line": 3, "character": 11 }
        }
    "#});
    assert_eq!(
        DebuggerHelper::from_document(&endpoint).unwrap_err(),
        DebuggerError::Unsupported("endpoint".to_string())
    );
    assert_eq!(
        DebuggerHelper::from_document(&endpoint).unwrap_err().to_string(),
        "breakpoints are not supported in endpoint artifacts"
    );
}

#[test]
fn test_inverted_range_is_a_build_error() {
    init();
    let broken = parse(indoc! {r#"
        {
          "tag": "sequence",
          "attributes": { "name": "broken" },
          "start": { "line": 0, "character": 0 },
          "end": { "line": 4, "character": 11 },
          "children": [
            { "tag": "log", "start": { "line": 3, "character": 2 }, "end": { "line": 1, "character": 8 } }
          ]
        }
    "#});
    assert!(matches!(build_artifact(&broken), Err(BuildError::Range { ref tag, line: 3, .. }) if tag == "log"));
    assert!(matches!(DebuggerHelper::from_document(&broken), Err(DebuggerError::Build(_))));
}

#[test]
fn test_tag_spellings_collapse() {
    init();
    let sequence = parse(indoc! {r#"
        {
          "tag": "sequence",
          "attributes": { "name": "spellings" },
          "start": { "line": 0, "character": 0 },
          "end": { "line": 4, "character": 11 },
          "children": [
            { "tag": "payload-factory", "start": { "line": 1, "character": 2 }, "end": { "line": 1, "character": 22 }, "self_closing": true },
            { "tag": "callTemplate", "start": { "line": 2, "character": 2 }, "end": { "line": 2, "character": 20 }, "self_closing": true },
            { "tag": "sf:query", "start": { "line": 3, "character": 2 }, "end": { "line": 3, "character": 14 }, "self_closing": true }
          ]
        }
    "#});
    let Artifact::Sequence(named) = build_artifact(&sequence).unwrap() else {
        panic!("Expected a named sequence");
    };
    let kinds: Vec<_> = named.sequence.mediators.iter().map(|m| m.kind()).collect();
    assert_eq!(kinds, vec![MediatorKind::PayloadFactory, MediatorKind::CallTemplate, MediatorKind::Connector]);
}
