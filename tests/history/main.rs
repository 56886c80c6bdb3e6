mod editor;

use editor::{Canvas, Marker, Selection, Sketch};
use saveable_graph::{deserialize, serialize, ClassRegistry, Graph, History, TokenStream};

fn registry() -> ClassRegistry {
    let registry = ClassRegistry::new();
    History::<Canvas>::register(&registry);
    History::<Selection>::register(&registry);
    registry.register_type::<Marker>("Marker");
    registry
}

fn sketch(points: &[f64]) -> Sketch {
    Sketch(points.to_vec())
}

#[test]
fn history_round_trips_with_its_cursor() {
    let history = History::new(Canvas::default());
    history.put(sketch(&[0.0]));
    history.put(sketch(&[0.0, 1.0]));
    history.put(sketch(&[0.0, 1.0, 2.0]));
    assert!(history.undo());

    let mut graph = Graph::new();
    let id = graph.insert(history);
    let stream = serialize(&graph, &[id]).unwrap();
    assert_eq!(
        stream.as_str(),
        r#"[{"class":"SketchHistory","states":[{"vec":[0.0]},{"vec":[0.0,1.0]},{"vec":[0.0,1.0,2.0]}],"nextInsertIndex":2}]"#
    );

    let mut loaded = Graph::new();
    let roots = deserialize(&registry(), &mut loaded, &stream).unwrap();
    let history = loaded.get_as::<History<Canvas>>(roots[0]).unwrap();

    assert_eq!(history.len(), 3);
    assert_eq!(history.next_insert_index(), 2);
    assert_eq!(history.current_state(), Some(sketch(&[0.0, 1.0])));
    assert!(history.can_undo());
    assert!(history.can_redo());

    assert!(history.redo());
    assert_eq!(
        history.with_transition(|canvas| canvas.shown.clone()),
        Some(sketch(&[0.0, 1.0, 2.0]))
    );
    assert!(!history.redo());
}

#[test]
fn branching_after_undo_appends() {
    let history = History::new(Canvas::default());
    for n in 0..3 {
        history.put(sketch(&[n as f64]));
    }
    assert!(history.undo());
    assert!(history.undo());
    assert_eq!(history.current_state(), Some(sketch(&[0.0])));
    assert!(history.redo());
    assert_eq!(history.current_state(), Some(sketch(&[1.0])));

    history.put(sketch(&[3.0]));
    assert_eq!(
        history.states(),
        vec![sketch(&[0.0]), sketch(&[1.0]), sketch(&[2.0]), sketch(&[3.0])]
    );
    assert!(!history.redo());
    assert_eq!(history.with_transition(|canvas| canvas.applied), 3);
}

#[test]
fn loaded_history_at_cursor_zero_can_redo() {
    let text = r#"[{"class":"SketchHistory","states":[{"vec":[1.0]},{"vec":[2.0]}],"nextInsertIndex":0}]"#;
    let mut graph = Graph::new();
    let roots = deserialize(&registry(), &mut graph, &TokenStream::from(text)).unwrap();
    let history = graph.get_as::<History<Canvas>>(roots[0]).unwrap();

    assert_eq!(history.current_state(), None);
    assert!(!history.undo());
    assert!(history.redo());
    assert_eq!(
        history.with_transition(|canvas| canvas.shown.clone()),
        Some(sketch(&[1.0]))
    );
}

#[test]
fn object_states_share_pointers_with_the_graph() {
    let mut graph = Graph::new();
    let one = graph.insert(Marker::new("one"));
    let two = graph.insert(Marker::new("two"));

    let history = History::new(Selection::default());
    history.put(one);
    history.put(two);
    history.put(one);
    let id = graph.insert(history);

    let stream = serialize(&graph, &[id]).unwrap();
    assert_eq!(
        stream.as_str(),
        r#"[{"class":"SelectionHistory","states":[{"class":"Marker","ptr":1,"label":"one"},{"class":"Marker","label":"two"},{"ref":1}],"nextInsertIndex":3}]"#
    );

    let mut loaded = Graph::new();
    let roots = deserialize(&registry(), &mut loaded, &stream).unwrap();
    let history = loaded.get_as::<History<Selection>>(roots[0]).unwrap();
    let states = history.states();

    assert_eq!(states.len(), 3);
    assert_eq!(states[0], states[2]);
    assert_ne!(states[0], states[1]);
    assert_eq!(loaded.get_as::<Marker>(states[1]), Some(&Marker::new("two")));
    assert_eq!(history.current_state(), Some(states[2]));

    assert!(history.undo());
    assert_eq!(
        history.with_transition(|selection| selection.selected),
        Some(states[1])
    );
}

#[test]
fn limited_history_evicts_on_put() {
    let history = History::new(Canvas::default()).with_limit(2);
    for n in 0..5 {
        history.put(sketch(&[n as f64]));
    }

    assert_eq!(history.states(), vec![sketch(&[3.0]), sketch(&[4.0])]);
    assert_eq!(history.next_insert_index(), 2);

    history.clear_to_size(1);
    assert_eq!(history.states(), vec![sketch(&[4.0])]);
    assert_eq!(history.next_insert_index(), 1);
    assert_eq!(history.current_state(), Some(sketch(&[4.0])));
}
