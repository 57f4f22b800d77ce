use cad_schema::*;
use command_graph::types::*;
use command_graph::Editor;
use serde_json::json;

/// A graph of `n` default boxes.
fn boxes(n: usize) -> CommandGraph {
    (0..n).fold(CommandGraph::new(), |g, _| g.append(CommandKind::Box))
}

/// Append a boolean union referencing `refs`.
fn with_union(graph: &CommandGraph, refs: Vec<usize>) -> CommandGraph {
    let g = graph.append(CommandKind::Union);
    g.set_param(g.len() - 1, "objects", ParamValue::References(refs))
        .unwrap()
}

// ── Append ─────────────────────────────────────────────────────────────────

#[test]
fn append_box_uses_schema_defaults() {
    let graph = CommandGraph::new().append(CommandKind::Box);

    assert_eq!(graph.len(), 1);
    let cmd = graph.get(0).unwrap();
    assert_eq!(cmd.kind, CommandKind::Box);
    assert!(!cmd.hidden);
    assert_eq!(cmd.object_references, None);
    assert_eq!(cmd.params, default_params(CommandKind::Box));
}

#[test]
fn append_reference_kind_starts_with_empty_list() {
    let graph = CommandGraph::new().append(CommandKind::Translate);
    let cmd = graph.get(0).unwrap();
    assert_eq!(cmd.object_references, Some(Vec::new()));
    assert_eq!(cmd.param("target"), Some(&ParamValue::References(Vec::new())));
}

#[test]
fn operations_do_not_mutate_the_source_graph() {
    let original = boxes(2);
    let _ = original.append(CommandKind::Sphere);
    let _ = original.remove(0).unwrap();
    let _ = original.toggle_hidden(1).unwrap();
    assert_eq!(original, boxes(2));
}

// ── Remove ─────────────────────────────────────────────────────────────────

#[test]
fn remove_drops_and_shifts_references() {
    // 0 box, 1 box, 2 box, 3 union[0, 1, 2]
    let graph = with_union(&boxes(3), vec![0, 1, 2]);

    let after = graph.remove(1).unwrap();
    assert_eq!(after.len(), 3);
    let union = after.get(2).unwrap();
    assert_eq!(union.references(), &[0, 1]);
    assert_eq!(union.param("objects"), Some(&ParamValue::References(vec![0, 1])));
}

#[test]
fn remove_out_of_range_fails() {
    let err = boxes(2).remove(2).unwrap_err();
    assert_eq!(err, GraphError::IndexOutOfRange { index: 2, len: 2 });
}

// ── Reorder ────────────────────────────────────────────────────────────────

#[test]
fn reorder_moves_one_command() {
    let graph = boxes(2).append(CommandKind::Sphere);
    let moved = graph.reorder(2, 0, ReorderPolicy::KeepIndices).unwrap();
    let kinds: Vec<CommandKind> = moved.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![CommandKind::Sphere, CommandKind::Box, CommandKind::Box]
    );
}

#[test]
fn reorder_keep_indices_leaves_references_untouched() {
    // 0 box, 1 sphere, 2 union[1]
    let graph = with_union(&boxes(1).append(CommandKind::Sphere), vec![1]);
    let moved = graph.reorder(0, 1, ReorderPolicy::KeepIndices).unwrap();

    // The union now points at the box, which moved into slot 1.
    assert_eq!(moved.get(1).unwrap().kind, CommandKind::Box);
    assert_eq!(moved.get(2).unwrap().references(), &[1]);
}

#[test]
fn reorder_renumber_follows_the_referenced_command() {
    // 0 box, 1 sphere, 2 union[1]
    let graph = with_union(&boxes(1).append(CommandKind::Sphere), vec![1]);
    let moved = graph.reorder(0, 1, ReorderPolicy::Renumber).unwrap();

    assert_eq!(moved.get(0).unwrap().kind, CommandKind::Sphere);
    assert_eq!(moved.get(2).unwrap().references(), &[0]);
}

#[test]
fn reorder_renumber_drops_references_that_become_forward() {
    // 0 box, 1 union[0]; move union to the front
    let graph = with_union(&boxes(1), vec![0]);
    let moved = graph.reorder(1, 0, ReorderPolicy::Renumber).unwrap();
    assert_eq!(moved.get(0).unwrap().kind, CommandKind::Union);
    assert!(moved.get(0).unwrap().references().is_empty());
}

#[test]
fn reorder_checks_both_indices() {
    let graph = boxes(2);
    assert!(matches!(
        graph.reorder(0, 5, ReorderPolicy::KeepIndices),
        Err(GraphError::IndexOutOfRange { index: 5, len: 2 })
    ));
    assert!(matches!(
        graph.reorder(9, 0, ReorderPolicy::KeepIndices),
        Err(GraphError::IndexOutOfRange { index: 9, len: 2 })
    ));
}

// ── Set kind ───────────────────────────────────────────────────────────────

#[test]
fn set_kind_round_trip_restores_box_defaults() {
    let graph = boxes(1)
        .set_param(0, "length", ParamValue::Number(4.0))
        .unwrap();
    let graph = graph.set_kind(0, CommandKind::Box).unwrap();
    let graph = graph.set_kind(0, CommandKind::Cylinder).unwrap();
    let graph = graph.set_kind(0, CommandKind::Box).unwrap();

    assert_eq!(
        graph.get(0).unwrap().params,
        CommandInstance::with_defaults(CommandKind::Box).params
    );
}

#[test]
fn set_kind_keeps_hidden_flag() {
    let graph = boxes(1).toggle_hidden(0).unwrap();
    let graph = graph.set_kind(0, CommandKind::Sphere).unwrap();
    assert!(graph.get(0).unwrap().hidden);
}

#[test]
fn set_kind_to_reference_kind_adds_empty_list() {
    let graph = boxes(2).set_kind(1, CommandKind::Scale).unwrap();
    assert_eq!(graph.get(1).unwrap().object_references, Some(Vec::new()));
}

// ── Set param ──────────────────────────────────────────────────────────────

#[test]
fn set_param_unknown_name_fails() {
    let err = boxes(1)
        .set_param(0, "radius", ParamValue::Number(1.0))
        .unwrap_err();
    assert_eq!(
        err,
        GraphError::UnknownParam {
            kind: CommandKind::Box,
            param: "radius".to_string()
        }
    );
}

#[test]
fn set_param_wrong_type_fails() {
    let err = boxes(1)
        .set_param(0, "centered", ParamValue::Number(1.0))
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::ParamTypeMismatch {
            expected: ParamKind::Boolean,
            ..
        }
    ));
}

#[test]
fn set_param_out_of_range_index_fails() {
    let err = boxes(1)
        .set_param(3, "length", ParamValue::Number(1.0))
        .unwrap_err();
    assert_eq!(err, GraphError::IndexOutOfRange { index: 3, len: 1 });
}

#[test]
fn set_param_stores_value_as_given() {
    // Bounds are enforced when a preview request is built, not on edit.
    let graph = boxes(1)
        .set_param(0, "length", ParamValue::Number(-2.0))
        .unwrap();
    assert_eq!(graph.get(0).unwrap().param("length"), Some(&ParamValue::Number(-2.0)));
}

#[test]
fn set_reference_param_mirrors_and_validates() {
    let graph = boxes(2).append(CommandKind::Translate);
    let graph = graph
        .set_param(2, "target", ParamValue::References(vec![1, 2, 5, 0]))
        .unwrap();
    let cmd = graph.get(2).unwrap();
    assert_eq!(cmd.object_references, Some(vec![1, 0]));
    assert_eq!(cmd.param("target"), Some(&ParamValue::References(vec![1, 0])));
}

// ── Toggle hidden ──────────────────────────────────────────────────────────

#[test]
fn toggle_hidden_flips_flag() {
    let graph = boxes(1).toggle_hidden(0).unwrap();
    assert!(graph.get(0).unwrap().hidden);
    let graph = graph.toggle_hidden(0).unwrap();
    assert!(!graph.get(0).unwrap().hidden);
}

// ── Serialization ──────────────────────────────────────────────────────────

#[test]
fn serializes_in_wire_shape() {
    let graph = with_union(&boxes(1), vec![0]);
    let value = serde_json::to_value(&graph).unwrap();
    assert_eq!(
        value,
        json!([
            {
                "command": "box",
                "params": { "centered": true, "height": 1.0, "length": 1.0, "width": 1.0 },
                "hidden": false
            },
            {
                "command": "union",
                "params": { "objects": [0] },
                "hidden": false,
                "objectReferences": [0]
            }
        ])
    );
}

#[test]
fn hydrates_legacy_commands() {
    // No `hidden`, no `objectReferences`, a missing param and an unknown one.
    let raw = json!([
        { "command": "box", "params": { "length": 2.0, "width": "3", "color": "red" } },
        { "kind": "cut", "params": { "objects": [0, 4] } }
    ]);
    let graph: CommandGraph = serde_json::from_value(raw).unwrap();

    let b = graph.get(0).unwrap();
    assert!(!b.hidden);
    assert_eq!(b.param("length"), Some(&ParamValue::Number(2.0)));
    assert_eq!(b.param("width"), Some(&ParamValue::Number(3.0)));
    assert_eq!(b.param("height"), Some(&ParamValue::Number(1.0)));
    assert_eq!(b.param("color"), None);

    let cut = graph.get(1).unwrap();
    assert_eq!(cut.object_references, Some(vec![0]));
    assert_eq!(cut.param("objects"), Some(&ParamValue::References(vec![0])));
}

#[test]
fn hydration_prefers_top_level_reference_list() {
    let raw = json!([
        { "command": "box", "params": {} },
        { "command": "sphere", "params": {} },
        { "command": "scale", "params": { "target": [0] }, "objectReferences": [1] }
    ]);
    let graph: CommandGraph = serde_json::from_value(raw).unwrap();
    let scale = graph.get(2).unwrap();
    assert_eq!(scale.object_references, Some(vec![1]));
    assert_eq!(scale.param("target"), Some(&ParamValue::References(vec![1])));
}

#[test]
fn hydration_rejects_unknown_kind() {
    let raw = json!([{ "command": "gear", "params": {} }]);
    let err = serde_json::from_value::<CommandGraph>(raw).unwrap_err();
    assert!(err.to_string().contains("unknown command kind: gear"));
}

// ── Editor ─────────────────────────────────────────────────────────────────

#[test]
fn editor_scenario_box_translate_remove() {
    let mut editor = Editor::new();

    editor.append_named("box").unwrap();
    let b = editor.graph().get(0).unwrap();
    assert_eq!(b.kind, CommandKind::Box);
    assert_eq!(b.param("length"), Some(&ParamValue::Number(1.0)));
    assert_eq!(b.param("width"), Some(&ParamValue::Number(1.0)));
    assert_eq!(b.param("height"), Some(&ParamValue::Number(1.0)));
    assert_eq!(b.param("centered"), Some(&ParamValue::Boolean(true)));

    editor.append_named("translate").unwrap();
    assert!(editor.graph().get(1).unwrap().kind.takes_references());

    editor
        .set_param(1, "target", ParamValue::References(vec![0]))
        .unwrap();
    let t = editor.graph().get(1).unwrap();
    assert_eq!(t.param("target"), Some(&ParamValue::References(vec![0])));
    assert_eq!(t.object_references, Some(vec![0]));

    editor.remove(0).unwrap();
    let t = editor.graph().get(0).unwrap();
    assert_eq!(t.kind, CommandKind::Translate);
    assert_eq!(t.object_references, Some(Vec::new()));
}

#[test]
fn editor_one_snapshot_per_successful_edit() {
    let mut editor = Editor::new();
    editor.append(CommandKind::Box);
    editor.append(CommandKind::Sphere);
    editor.set_param(1, "radius", ParamValue::Number(2.0)).unwrap();
    editor.toggle_hidden(0).unwrap();
    editor.reorder(0, 1).unwrap();
    editor.remove(0).unwrap();

    // Initial snapshot plus six edits.
    assert_eq!(editor.history().len(), 7);

    // Failed edits push nothing.
    assert!(editor.remove(10).is_err());
    assert!(editor.append_named("gear").is_err());
    assert!(editor.set_param(0, "nope", ParamValue::Number(1.0)).is_err());
    assert_eq!(editor.history().len(), 7);
}

#[test]
fn editor_unknown_kind_is_rejected_without_mutation() {
    let mut editor = Editor::new();
    editor.append(CommandKind::Box);
    let before = editor.graph().clone();

    let err = editor.set_kind_named(0, "gear").unwrap_err();
    assert_eq!(
        err,
        GraphError::UnknownKind {
            kind: "gear".to_string()
        }
    );
    assert_eq!(editor.graph(), &before);
}

#[test]
fn editor_undo_redo() {
    let mut editor = Editor::new();
    editor.append(CommandKind::Box);
    editor.append(CommandKind::Cone);

    assert!(editor.undo());
    assert_eq!(editor.graph().len(), 1);
    assert!(editor.can_redo());

    assert!(editor.redo());
    assert_eq!(editor.graph().len(), 2);
    assert!(!editor.redo());

    assert!(editor.undo());
    assert!(editor.undo());
    assert!(editor.graph().is_empty());
    assert!(!editor.undo());
}

#[test]
fn editor_new_edit_after_undo_discards_future() {
    let mut editor = Editor::new();
    editor.append(CommandKind::Box);
    editor.append(CommandKind::Cone);
    editor.undo();
    editor.append(CommandKind::Torus);

    assert!(!editor.can_redo());
    assert_eq!(editor.graph().get(1).unwrap().kind, CommandKind::Torus);
}

#[test]
fn editor_drag_coalesces_into_one_snapshot() {
    let mut editor = Editor::new();
    editor.append(CommandKind::Box);
    editor.append(CommandKind::Sphere);
    editor.append(CommandKind::Cone);
    let before = editor.history().len();

    editor.drag_to(0, 1).unwrap();
    editor.drag_to(1, 2).unwrap();
    assert_eq!(editor.history().len(), before);

    assert!(editor.end_drag());
    assert_eq!(editor.history().len(), before + 1);
    assert_eq!(editor.graph().get(2).unwrap().kind, CommandKind::Box);

    // Undo reverts the whole drag.
    editor.undo();
    assert_eq!(editor.graph().get(0).unwrap().kind, CommandKind::Box);
}

#[test]
fn editor_drag_back_to_start_pushes_nothing() {
    let mut editor = Editor::new();
    editor.append(CommandKind::Box);
    editor.append(CommandKind::Sphere);
    let before = editor.history().len();

    editor.drag_to(0, 1).unwrap();
    editor.drag_to(1, 0).unwrap();
    assert!(!editor.end_drag());
    assert_eq!(editor.history().len(), before);
    assert!(!editor.end_drag());
}

#[test]
fn editor_undo_mid_drag_reverts_only_the_drag() {
    let mut editor = Editor::new();
    editor.append(CommandKind::Box);
    editor.append(CommandKind::Sphere);
    let before_drag = editor.graph().clone();

    editor.drag_to(0, 1).unwrap();
    let dragged = editor.graph().clone();

    // No end_drag: undo lands on the state the drag started from.
    assert!(editor.undo());
    assert_eq!(editor.graph(), &before_drag);
    assert_eq!(editor.graph().len(), 2);

    assert!(editor.redo());
    assert_eq!(editor.graph(), &dragged);
    assert!(!editor.end_drag());
}

#[test]
fn editor_undo_mid_drag_back_to_start_undoes_previous_edit() {
    let mut editor = Editor::new();
    editor.append(CommandKind::Box);
    editor.append(CommandKind::Sphere);

    editor.drag_to(0, 1).unwrap();
    editor.drag_to(1, 0).unwrap();

    assert!(editor.undo());
    assert_eq!(editor.graph().len(), 1);
    assert_eq!(editor.graph().get(0).unwrap().kind, CommandKind::Box);
}

#[test]
fn editor_reset_starts_fresh_history() {
    let mut editor = Editor::new();
    editor.append(CommandKind::Box);
    editor.reset(boxes(3));
    assert_eq!(editor.graph().len(), 3);
    assert!(!editor.can_undo());
    assert_eq!(editor.history().len(), 1);
}
