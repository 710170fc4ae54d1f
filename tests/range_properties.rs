use quickcheck::{QuickCheck, TestResult};

use mediation_flow_debugger::ir::{Artifact, Sequence, SourceRange};
use mediation_flow_debugger::parsers::{Element, build_artifact};
use test_utils::flow::generator::GeneratedFlow;

fn collect_sequences<'a>(sequence: &'a Sequence, out: &mut Vec<&'a Sequence>) {
    out.push(sequence);
    for mediator in &sequence.mediators {
        if let Some(branching) = mediator.as_branching() {
            for branch in branching.branches() {
                if let Some(inner) = branch.sequence {
                    collect_sequences(inner, out);
                }
            }
        }
    }
}

#[test]
fn test_sibling_opening_tags_never_share_a_line() {
    fn prop(flow: GeneratedFlow) -> TestResult {
        let element: Element = serde_json::from_value(flow.layout().document).unwrap();
        let Ok(Artifact::Sequence(named)) = build_artifact(&element) else {
            return TestResult::failed();
        };

        let mut sequences = Vec::new();
        collect_sequences(&named.sequence, &mut sequences);
        for sequence in sequences {
            let ranges: Vec<&SourceRange> = sequence.mediators.iter().map(|m| m.range()).collect();
            for line in sequence.range.start_line()..=sequence.range.end_line() {
                let on_open = ranges.iter().filter(|r| r.is_on_opening_tag(line)).count();
                if on_open > 1 {
                    return TestResult::failed();
                }
            }
            // Opening tags advance strictly in document order.
            if ranges.windows(2).any(|w| w[0].open_line() >= w[1].open_line()) {
                return TestResult::failed();
            }
        }
        TestResult::passed()
    }

    QuickCheck::new()
        .tests(300)
        .quickcheck(prop as fn(GeneratedFlow) -> TestResult);
}

#[test]
fn test_self_closed_range_collapses_to_opening_tag() {
    let range = SourceRange::from_lines(4, 4, 4).unwrap();
    let element = Element::empty("log", 4);
    assert!(range.contains_line(4));
    assert!(range.is_on_opening_tag(4));
    assert!(!range.contains_line(5));
    assert_eq!(
        mediation_flow_debugger::parsers::position_utils::source_range_of(&element).unwrap().end_line(),
        4
    );
}
