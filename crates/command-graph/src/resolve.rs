use tracing::{debug, instrument};

use crate::types::{CommandGraph, CommandInstance};

/// Why `validate` drops a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Points at the command itself, a later one, or past the end.
    NotEarlier,
    /// Repeats an index already listed by the same command.
    Duplicate,
}

/// A reference that `validate` would drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DanglingReference {
    /// Position of the referring command.
    pub command: usize,
    /// The referenced index.
    pub reference: usize,
    pub reason: DropReason,
}

/// Normalize every command's object references.
///
/// Drops self, forward and out-of-range references as well as duplicates
/// (the first occurrence is kept), then rewrites both the `objectReferences`
/// list and its `params` mirror. Kinds without a reference parameter lose
/// any stray reference list. Running it twice changes nothing.
#[instrument(skip_all, fields(commands = graph.len()))]
pub fn validate(graph: &CommandGraph) -> CommandGraph {
    let commands = graph
        .iter()
        .enumerate()
        .map(|(position, instance)| normalize(position, instance))
        .collect();
    CommandGraph::from_vec_unchecked(commands)
}

/// List every reference `validate` would drop: self, forward and
/// out-of-range indices, plus repeats of an index already kept.
pub fn dangling_references(graph: &CommandGraph) -> Vec<DanglingReference> {
    graph
        .iter()
        .enumerate()
        .flat_map(|(position, instance)| partition(position, instance).1)
        .collect()
}

fn normalize(position: usize, instance: &CommandInstance) -> CommandInstance {
    let mut out = instance.clone();

    if !instance.kind.takes_references() {
        out.object_references = None;
        return out;
    }

    let (kept, dropped) = partition(position, instance);
    for d in &dropped {
        debug!(
            command = position,
            reference = d.reference,
            reason = ?d.reason,
            "dropping invalid reference"
        );
    }
    out.set_references(kept);
    out
}

/// Split a command's references into those kept and those dropped.
fn partition(position: usize, instance: &CommandInstance) -> (Vec<usize>, Vec<DanglingReference>) {
    let mut kept: Vec<usize> = Vec::new();
    let mut dropped = Vec::new();
    for reference in canonical_references(instance) {
        let reason = if reference >= position {
            DropReason::NotEarlier
        } else if kept.contains(&reference) {
            DropReason::Duplicate
        } else {
            kept.push(reference);
            continue;
        };
        dropped.push(DanglingReference {
            command: position,
            reference,
            reason,
        });
    }
    (kept, dropped)
}

/// The top-level list when present, otherwise the `params` mirror.
fn canonical_references(instance: &CommandInstance) -> Vec<usize> {
    if let Some(refs) = &instance.object_references {
        return refs.clone();
    }
    instance
        .kind
        .reference_param()
        .and_then(|name| instance.params.get(name))
        .and_then(|v| v.as_references())
        .map(<[usize]>::to_vec)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cad_schema::{CommandKind, ParamValue};

    fn with_refs(kind: CommandKind, refs: Vec<usize>) -> CommandInstance {
        let mut c = CommandInstance::with_defaults(kind);
        c.set_references(refs);
        c
    }

    #[test]
    fn drops_self_forward_and_duplicate_references() {
        let graph = CommandGraph::from_vec_unchecked(vec![
            CommandInstance::with_defaults(CommandKind::Box),
            CommandInstance::with_defaults(CommandKind::Sphere),
            with_refs(CommandKind::Union, vec![1, 2, 0, 1, 7]),
        ]);

        let fixed = validate(&graph);
        let union = fixed.get(2).unwrap();
        assert_eq!(union.references(), &[1, 0]);
        assert_eq!(
            union.param("objects"),
            Some(&ParamValue::References(vec![1, 0]))
        );
    }

    #[test]
    fn params_mirror_used_when_top_level_missing() {
        let mut cut = CommandInstance::with_defaults(CommandKind::Cut);
        cut.object_references = None;
        cut.params
            .insert("objects".to_string(), ParamValue::References(vec![0]));
        let graph = CommandGraph::from_vec_unchecked(vec![
            CommandInstance::with_defaults(CommandKind::Box),
            cut,
        ]);

        let fixed = validate(&graph);
        assert_eq!(fixed.get(1).unwrap().object_references, Some(vec![0]));
    }

    #[test]
    fn stray_reference_list_removed_from_plain_kinds() {
        let mut sphere = CommandInstance::with_defaults(CommandKind::Sphere);
        sphere.object_references = Some(vec![0]);
        let graph = CommandGraph::from_vec_unchecked(vec![
            CommandInstance::with_defaults(CommandKind::Box),
            sphere,
        ]);

        assert_eq!(validate(&graph).get(1).unwrap().object_references, None);
    }

    #[test]
    fn reports_dangling_references() {
        let graph = CommandGraph::from_vec_unchecked(vec![
            with_refs(CommandKind::Translate, vec![0, 3]),
            CommandInstance::with_defaults(CommandKind::Box),
        ]);
        assert_eq!(
            dangling_references(&graph),
            vec![
                DanglingReference {
                    command: 0,
                    reference: 0,
                    reason: DropReason::NotEarlier,
                },
                DanglingReference {
                    command: 0,
                    reference: 3,
                    reason: DropReason::NotEarlier,
                },
            ]
        );
    }

    #[test]
    fn reports_duplicates_that_validate_drops() {
        let graph = CommandGraph::from_vec_unchecked(vec![
            CommandInstance::with_defaults(CommandKind::Box),
            CommandInstance::with_defaults(CommandKind::Sphere),
            with_refs(CommandKind::Union, vec![1, 0, 1, 0]),
        ]);

        let reported = dangling_references(&graph);
        assert_eq!(
            reported,
            vec![
                DanglingReference {
                    command: 2,
                    reference: 1,
                    reason: DropReason::Duplicate,
                },
                DanglingReference {
                    command: 2,
                    reference: 0,
                    reason: DropReason::Duplicate,
                },
            ]
        );

        let fixed = validate(&graph);
        assert_eq!(fixed.get(2).unwrap().references(), &[1, 0]);
        assert!(dangling_references(&fixed).is_empty());
    }
}
