/// Cross-container drag contract
///
/// Any two containers that declare the same group can exchange an item
/// mid-drag. The coordinator tracks one drag gesture at a time: the source
/// container and index, and the candidate destination, which is updated
/// continuously while the pointer moves. On drop the move is applied
/// through the board in a single step, so no observer ever sees the item
/// in both containers or in neither.

use crate::board::container::ContainerKey;
use crate::board::Board;

/// Board wiring and gesture errors. These indicate a bug in the caller,
/// not a user condition, and never crash the drag or render paths.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("unknown container: {0}")]
    UnknownContainer(String),

    #[error("containers do not share a drag group")]
    GroupMismatch,

    #[error("no drag gesture in progress")]
    NoActiveDrag,

    #[error("no item at index {0}")]
    InvalidIndex(usize),
}

/// One rendered slot in a container. Presentation-only chrome (the
/// empty-state placeholder) renders as a slot but is marked so it never
/// becomes drag payload or a counted drop position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Item(usize),
    Placeholder,
}

/// Resolve a grab on a rendered slot to an item index. Placeholder slots
/// are not draggable.
pub fn drag_source(slots: &[Slot], grabbed: usize) -> Option<usize> {
    match slots.get(grabbed) {
        Some(Slot::Item(index)) => Some(*index),
        _ => None,
    }
}

/// Resolve the hovered rendered slot to an insertion index: the number of
/// real item slots before it. Hovering past the end (or over trailing
/// placeholders) targets the append position.
pub fn drop_index(slots: &[Slot], hovered: usize) -> usize {
    slots
        .iter()
        .take(hovered)
        .filter(|slot| matches!(slot, Slot::Item(_)))
        .count()
}

#[derive(Debug, Clone)]
struct ActiveDrag {
    source: ContainerKey,
    source_index: usize,
    /// Candidate destination, re-resolved on every pointer movement
    dest: Option<(ContainerKey, usize)>,
}

/// The drag gesture state machine
#[derive(Debug)]
pub struct DragCoordinator {
    group: String,
    active: Option<ActiveDrag>,
}

impl DragCoordinator {
    pub fn new(group: &str) -> Self {
        DragCoordinator {
            group: group.to_string(),
            active: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Start a drag from `source` at `item_index`. The container must exist
    /// on the board, belong to this coordinator's group, and actually have
    /// an item at that index.
    pub fn begin_drag(
        &mut self,
        board: &Board,
        source: &ContainerKey,
        item_index: usize,
    ) -> Result<(), BoardError> {
        let container = board
            .container(source)
            .ok_or_else(|| BoardError::UnknownContainer(source.storage_key()))?;
        if container.group() != self.group {
            return Err(BoardError::GroupMismatch);
        }
        if item_index >= container.list().len() {
            return Err(BoardError::InvalidIndex(item_index));
        }

        self.active = Some(ActiveDrag {
            source: source.clone(),
            source_index: item_index,
            dest: None,
        });
        Ok(())
    }

    /// Update the candidate destination while the pointer moves over a drop
    /// target. The last hover before the drop decides the insertion index.
    pub fn hover(&mut self, dest: &ContainerKey, index: usize) -> Result<(), BoardError> {
        let drag = self.active.as_mut().ok_or(BoardError::NoActiveDrag)?;
        drag.dest = Some((dest.clone(), index));
        Ok(())
    }

    /// Complete the gesture: remove from the source, insert at the hovered
    /// destination index, persist both containers. A drop that never left
    /// the grabbed position is a no-op reorder. The gesture ends whether or
    /// not the move succeeds.
    pub fn drop_on(&mut self, board: &mut Board) -> Result<(), BoardError> {
        let drag = self.active.take().ok_or(BoardError::NoActiveDrag)?;
        let (dest, dest_index) = drag
            .dest
            .unwrap_or_else(|| (drag.source.clone(), drag.source_index));
        board.move_item(&drag.source, drag.source_index, &dest, dest_index)
    }

    /// Abandon the gesture without moving anything
    pub fn cancel(&mut self) {
        self.active = None;
    }
}
