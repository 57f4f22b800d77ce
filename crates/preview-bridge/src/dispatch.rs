use cad_schema::list_by_category;
use tokio::time::Instant;

use crate::messages::{CatalogEntry, CatalogGroup, EditorToUi, UiToEditor};
use crate::session::{BridgeError, EditSession};

/// Apply a UI message to the session and build the reply.
///
/// Every error becomes an `EditorToUi::Error`; a failed edit leaves the
/// session unchanged.
pub fn dispatch(session: &mut EditSession, msg: UiToEditor, now: Instant) -> EditorToUi {
    match handle_message(session, msg, now) {
        Ok(response) => response,
        Err(e) => EditorToUi::Error {
            message: e.to_string(),
        },
    }
}

fn handle_message(
    session: &mut EditSession,
    msg: UiToEditor,
    now: Instant,
) -> Result<EditorToUi, BridgeError> {
    if session.is_closed() {
        return Err(BridgeError::SessionClosed);
    }

    match msg {
        // -- Command list --
        UiToEditor::AppendCommand { kind } => {
            session.append(&kind, now)?;
            Ok(graph_updated(session))
        }

        UiToEditor::RemoveCommand { index } => {
            session.remove(index, now)?;
            Ok(graph_updated(session))
        }

        UiToEditor::ReorderCommand { from, to } => {
            session.reorder(from, to, now)?;
            Ok(graph_updated(session))
        }

        UiToEditor::DragCommand { from, to } => {
            session.drag_to(from, to, now)?;
            Ok(graph_updated(session))
        }

        UiToEditor::EndDrag => {
            session.end_drag();
            Ok(graph_updated(session))
        }

        UiToEditor::SetKind { index, kind } => {
            session.set_kind(index, &kind, now)?;
            Ok(graph_updated(session))
        }

        UiToEditor::SetParam { index, name, value } => {
            session.set_param_json(index, &name, &value, now)?;
            Ok(graph_updated(session))
        }

        UiToEditor::ToggleHidden { index } => {
            session.toggle_hidden(index, now)?;
            Ok(graph_updated(session))
        }

        // -- History --
        UiToEditor::Undo => {
            session.undo(now);
            Ok(graph_updated(session))
        }

        UiToEditor::Redo => {
            session.redo(now);
            Ok(graph_updated(session))
        }

        // -- Viewer --
        UiToEditor::SelectCommand { index } => {
            session.select(index, now)?;
            Ok(EditorToUi::SelectionChanged {
                selected_index: session.selected_index(),
            })
        }

        UiToEditor::SetColor { color } => {
            session.set_color(color, now);
            Ok(settings_changed(session))
        }

        UiToEditor::SetLivePreview { enabled } => {
            session.set_live_preview(enabled, now);
            Ok(settings_changed(session))
        }

        UiToEditor::RequestPreview => {
            session.request_preview(now);
            Ok(EditorToUi::PreviewScheduled)
        }

        // -- Catalog --
        UiToEditor::ListCommandKinds => Ok(command_catalog()),

        // -- Documents --
        UiToEditor::LoadDocument { data } => {
            session.load_document(&data, now)?;
            let doc = session.to_document();
            Ok(EditorToUi::DocumentLoaded {
                name: doc.name,
                cad_commands: doc.cad_commands,
                color: session.color(),
            })
        }

        UiToEditor::SaveDocument => Ok(EditorToUi::SaveReady {
            json_data: session.save_document()?,
        }),

        UiToEditor::Close => {
            session.close();
            Ok(EditorToUi::Closed)
        }
    }
}

/// Build a GraphUpdated response from the current session state.
fn graph_updated(session: &EditSession) -> EditorToUi {
    EditorToUi::GraphUpdated {
        cad_commands: session.graph().clone(),
        can_undo: session.can_undo(),
        can_redo: session.can_redo(),
        selected_index: session.selected_index(),
    }
}

fn settings_changed(session: &EditSession) -> EditorToUi {
    EditorToUi::SettingsChanged {
        color: session.color(),
        live_preview: session.live_preview(),
    }
}

fn command_catalog() -> EditorToUi {
    let categories = list_by_category()
        .into_iter()
        .map(|(category, kinds)| CatalogGroup {
            category,
            label: category.label().to_string(),
            kinds: kinds
                .into_iter()
                .map(|k| CatalogEntry {
                    id: k.id().to_string(),
                    label: k.label().to_string(),
                    is_2d: k.is_2d(),
                })
                .collect(),
        })
        .collect();
    EditorToUi::CommandCatalog { categories }
}
