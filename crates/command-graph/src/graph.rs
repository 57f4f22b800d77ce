use cad_schema::{CommandKind, ParamValue};
use tracing::instrument;

use crate::resolve::validate;
use crate::types::{CommandGraph, CommandInstance, GraphError, ReorderPolicy};

impl CommandGraph {
    /// Add a default instance of `kind` at the end.
    pub fn append(&self, kind: CommandKind) -> CommandGraph {
        let mut commands = self.commands().to_vec();
        commands.push(CommandInstance::with_defaults(kind));
        CommandGraph::from_vec_unchecked(commands)
    }

    /// Delete the command at `index`.
    ///
    /// References to the removed command are dropped and references past it
    /// shift down by one, so every survivor keeps pointing at the same
    /// logical command.
    #[instrument(skip(self), fields(len = self.len()))]
    pub fn remove(&self, index: usize) -> Result<CommandGraph, GraphError> {
        self.check_index(index)?;

        let commands = self
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, instance)| {
                let mut instance = instance.clone();
                if instance.kind.takes_references() {
                    let shifted = instance
                        .references()
                        .iter()
                        .filter(|&&r| r != index)
                        .map(|&r| if r > index { r - 1 } else { r })
                        .collect();
                    instance.set_references(shifted);
                }
                instance
            })
            .collect();

        Ok(validate(&CommandGraph::from_vec_unchecked(commands)))
    }

    /// Move the command at `from` so it ends up at `to`.
    #[instrument(skip(self), fields(len = self.len()))]
    pub fn reorder(
        &self,
        from: usize,
        to: usize,
        policy: ReorderPolicy,
    ) -> Result<CommandGraph, GraphError> {
        self.check_index(from)?;
        self.check_index(to)?;

        // `order[new_position] = old_position`
        let mut order: Vec<usize> = (0..self.len()).collect();
        let moved = order.remove(from);
        order.insert(to, moved);

        let commands: Vec<CommandInstance> =
            order.iter().map(|&old| self.commands()[old].clone()).collect();

        match policy {
            ReorderPolicy::KeepIndices => Ok(CommandGraph::from_vec_unchecked(commands)),
            ReorderPolicy::Renumber => {
                let mut new_position = vec![0; self.len()];
                for (new, &old) in order.iter().enumerate() {
                    new_position[old] = new;
                }
                let commands = commands
                    .into_iter()
                    .map(|mut instance| {
                        if instance.kind.takes_references() {
                            let remapped = instance
                                .references()
                                .iter()
                                .map(|&r| new_position.get(r).copied().unwrap_or(r))
                                .collect();
                            instance.set_references(remapped);
                        }
                        instance
                    })
                    .collect();
                Ok(validate(&CommandGraph::from_vec_unchecked(commands)))
            }
        }
    }

    /// Replace the kind at `index`, resetting its parameters to the new
    /// kind's defaults. The hidden flag is kept.
    #[instrument(skip(self), fields(len = self.len()))]
    pub fn set_kind(&self, index: usize, kind: CommandKind) -> Result<CommandGraph, GraphError> {
        self.check_index(index)?;

        let mut commands = self.commands().to_vec();
        let hidden = commands[index].hidden;
        commands[index] = CommandInstance {
            hidden,
            ..CommandInstance::with_defaults(kind)
        };
        Ok(validate(&CommandGraph::from_vec_unchecked(commands)))
    }

    /// Set one parameter of the command at `index`.
    ///
    /// Reference parameters are written to both `params` and the
    /// `objectReferences` mirror and then normalized.
    #[instrument(skip(self, value), fields(len = self.len()))]
    pub fn set_param(
        &self,
        index: usize,
        name: &str,
        value: ParamValue,
    ) -> Result<CommandGraph, GraphError> {
        self.check_index(index)?;

        let kind = self.commands()[index].kind;
        let spec = kind.spec().param(name).ok_or_else(|| GraphError::UnknownParam {
            kind,
            param: name.to_string(),
        })?;
        if !value.matches(spec.kind) {
            return Err(GraphError::ParamTypeMismatch {
                kind,
                param: name.to_string(),
                expected: spec.kind,
            });
        }

        let mut commands = self.commands().to_vec();
        let instance = &mut commands[index];
        match value {
            ParamValue::References(refs) => {
                instance.set_references(refs);
                Ok(validate(&CommandGraph::from_vec_unchecked(commands)))
            }
            value => {
                instance.params.insert(name.to_string(), value);
                Ok(CommandGraph::from_vec_unchecked(commands))
            }
        }
    }

    /// Flip the hidden flag of the command at `index`.
    pub fn toggle_hidden(&self, index: usize) -> Result<CommandGraph, GraphError> {
        self.check_index(index)?;

        let mut commands = self.commands().to_vec();
        commands[index].hidden = !commands[index].hidden;
        Ok(CommandGraph::from_vec_unchecked(commands))
    }
}
