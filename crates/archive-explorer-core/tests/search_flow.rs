use std::sync::Arc;

use archive_explorer_core::events::{Event, EventBus, Topic};
use archive_explorer_core::models::{SearchOutcome, SearchQuery, SearchState, SearchTrigger};
use archive_explorer_core::observe::{RecordingSink, SharedSink};
use archive_explorer_core::store::{parse_records, RecordStore, StaticSource};
use archive_explorer_core::{FormState, RecordId, SearchController, SearchPolicy};
use parking_lot::Mutex;

const ARCHIVE: &str = r#"[
    {"id": 1, "title": "Budget 2020", "date": "2020-03-01", "author": "Ana"},
    {"id": 2, "title": "Budget 2021", "date": "2021-03-01", "author": "Ben"}
]"#;

struct Setup {
    bus: EventBus,
    form: Arc<FormState>,
    controller: SearchController,
    events: Arc<Mutex<Vec<Event>>>,
}

fn setup(policy: SearchPolicy) -> Setup {
    let bus = EventBus::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    for topic in Topic::ALL {
        let events = events.clone();
        bus.subscribe(topic, move |e| {
            events.lock().push(e.clone());
            Ok(())
        });
    }

    let store = Arc::new(RecordStore::new());
    store.load(parse_records(ARCHIVE).unwrap());

    let form = Arc::new(FormState::new());
    let controller = SearchController::new(policy, bus.clone(), form.clone(), store);
    Setup {
        bus,
        form,
        controller,
        events,
    }
}

fn result_ids(outcome: &SearchOutcome) -> Vec<RecordId> {
    match outcome {
        SearchOutcome::ResultsReady { records, .. } => records.iter().map(|r| r.id.clone()).collect(),
        other => panic!("expected results, got {:?}", other),
    }
}

#[test]
fn test_budget_query_returns_both_in_order() {
    let s = setup(SearchPolicy::default());
    s.form.set_input("budget");
    let outcome = s.controller.evaluate(SearchTrigger::Auto);
    assert_eq!(result_ids(&outcome), vec![RecordId::Int(1), RecordId::Int(2)]);
    if let SearchOutcome::ResultsReady { total_count, .. } = outcome {
        assert_eq!(total_count, 2);
    }
}

#[test]
fn test_ab_auto_vs_manual() {
    let s = setup(SearchPolicy::new(5, 2).unwrap());
    s.form.set_input("ab");

    match s.controller.evaluate(SearchTrigger::Auto) {
        SearchOutcome::Suppressed { guidance } => {
            assert!(guidance.contains("3 more characters"), "{}", guidance);
            assert!(guidance.contains("automatic"));
            assert!(guidance.contains("Search!"));
        }
        other => panic!("expected suppressed, got {:?}", other),
    }

    let outcome = s.controller.evaluate(SearchTrigger::Manual);
    assert!(matches!(outcome, SearchOutcome::ResultsReady { .. }));
}

#[test]
fn test_zero_matches_differs_from_idle() {
    let s = setup(SearchPolicy::new(3, 2).unwrap());
    s.form.set_input("zzz");
    let outcome = s.controller.evaluate(SearchTrigger::Auto);
    assert_eq!(
        outcome,
        SearchOutcome::ResultsReady {
            records: vec![],
            total_count: 2
        }
    );
    assert_ne!(outcome, SearchOutcome::Idle);

    let events = s.events.lock();
    assert!(events.contains(&Event::ResultsReady { records: vec![] }));
    assert!(!events.contains(&Event::ResultsCleared));
}

#[test]
fn test_zzz_is_suppressed_with_default_auto_threshold() {
    let s = setup(SearchPolicy::default());
    s.form.set_input("zzz");
    assert!(matches!(
        s.controller.evaluate(SearchTrigger::Auto),
        SearchOutcome::Suppressed { .. }
    ));
}

#[test]
fn test_evaluation_is_idempotent() {
    let s = setup(SearchPolicy::default());
    for (input, trigger) in [
        ("budget", SearchTrigger::Auto),
        ("bu", SearchTrigger::Auto),
        ("", SearchTrigger::Manual),
        ("2021", SearchTrigger::Manual),
    ] {
        s.form.set_input(input);
        let first = s.controller.evaluate(trigger);
        let second = s.controller.evaluate(trigger);
        assert_eq!(first, second, "input={:?}", input);
    }
}

#[test]
fn test_keystroke_sequence_walks_states() {
    let s = setup(SearchPolicy::default());
    let mut states = Vec::new();
    for input in ["b", "bu", "bud", "budg", "budge", "budget", ""] {
        s.form.set_input(input);
        s.controller.evaluate(SearchTrigger::Auto);
        states.push(s.controller.state());
    }
    use SearchState::*;
    assert_eq!(
        states,
        vec![Suppressed, Suppressed, Suppressed, Suppressed, ResultsReady, ResultsReady, Idle]
    );
}

#[test]
fn test_faulty_display_does_not_break_search() {
    let s = setup(SearchPolicy::default());
    s.bus.subscribe(Topic::ResultsReady, |_| panic!("card template missing"));

    let seen = Arc::new(Mutex::new(0usize));
    let counter = seen.clone();
    s.bus.subscribe(Topic::ResultsReady, move |_| {
        *counter.lock() += 1;
        Ok(())
    });

    s.form.set_input("budget");
    let outcome = s.controller.evaluate(SearchTrigger::Auto);
    assert_eq!(result_ids(&outcome).len(), 2);
    assert_eq!(*seen.lock(), 1);
}

#[test]
fn test_explicit_query_bypasses_form() {
    let s = setup(SearchPolicy::default());
    s.form.set_input("ignored");
    let outcome = s
        .controller
        .evaluate_query(&SearchQuery::new("ben", true, SearchTrigger::Manual));
    assert_eq!(result_ids(&outcome), vec![RecordId::Int(2)]);
}

#[test]
fn test_sink_receives_debug_lines() {
    let sink = Arc::new(RecordingSink::new());
    let store = Arc::new(RecordStore::new());
    store.load(parse_records(ARCHIVE).unwrap());
    let form = Arc::new(FormState::new());
    form.set_input("budget");
    let shared: SharedSink = sink.clone();
    let controller = SearchController::new(SearchPolicy::default(), EventBus::new(), form, store)
        .with_sink(Some(shared));
    controller.evaluate(SearchTrigger::Auto);
    let lines = sink.lines();
    assert_eq!(lines[0], "[evaluate (auto)]");
    assert_eq!(lines[1], "  term | length | include_author | guidance");
    assert_eq!(lines[2], "  \"budget\" | 6 | false | Showing automatic search results");
    assert!(lines.iter().any(|l| l.contains("search completed: 2 of 2")));
}

#[tokio::test]
async fn test_static_source_round() {
    let store = Arc::new(RecordStore::new());
    let source = StaticSource::from_json(ARCHIVE).unwrap();
    store.load_from(&source).await.unwrap();

    let form = Arc::new(FormState::new());
    form.set_input("2020-03");
    let controller = SearchController::new(SearchPolicy::default(), EventBus::new(), form, store);
    assert_eq!(
        result_ids(&controller.evaluate(SearchTrigger::Auto)),
        vec![RecordId::Int(1)]
    );
}
