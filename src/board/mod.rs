/// Board core: the container registry, the shared context handle, and the
/// cross-container move that the drag coordinator delegates to.

pub mod container;
pub mod coordinator;
pub mod item;

use std::rc::Rc;

use crate::store::{ItemStore, StoreError};
use self::container::{ContainerKey, ContainerModel};
use self::coordinator::BoardError;
use self::item::Item;

/// The drag group every board container declares. Containers in the same
/// group can exchange items mid-drag.
pub const SHARED_GROUP: &str = "shared";

/// Board-wide shared state, passed explicitly to whoever needs it instead
/// of living in an ambient global: the base font size (the image codec's
/// target height is derived from it) and the sink for user-visible storage
/// warnings.
pub struct BoardContext {
    base_font_px: f32,
    warn: Box<dyn Fn(&str)>,
}

impl BoardContext {
    pub fn new(base_font_px: f32, warn: impl Fn(&str) + 'static) -> Self {
        BoardContext {
            base_font_px,
            warn: Box::new(warn),
        }
    }

    /// Target height for encoded images: five times the base font size,
    /// so thumbnails track the UI scale rather than a fixed pixel count.
    pub fn thumb_height(&self) -> u32 {
        (self.base_font_px * 5.0).round() as u32
    }

    /// Surface a user-visible warning (storage full and the like)
    pub fn warn(&self, message: &str) {
        (self.warn)(message);
    }
}

impl std::fmt::Debug for BoardContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardContext")
            .field("base_font_px", &self.base_font_px)
            .finish()
    }
}

/// Which field of the board a key resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Place {
    Holding,
    Tier(usize),
}

/// The container registry: the singleton holding area plus the tiers, each
/// owning its ordered item list. All cross-container movement goes through
/// `move_item`, which applies both halves of a transfer in memory before
/// persisting either side.
pub struct Board {
    store: Rc<ItemStore>,
    ctx: Rc<BoardContext>,
    holding: ContainerModel,
    tiers: Vec<ContainerModel>,
}

impl Board {
    /// Create a board over the given store, loading the holding area's
    /// persisted list. Tiers are added by the shell afterwards.
    pub fn new(store: Rc<ItemStore>, ctx: Rc<BoardContext>) -> Result<Self, StoreError> {
        let holding = ContainerModel::load(
            ContainerKey::HoldingArea,
            SHARED_GROUP,
            Rc::clone(&store),
            Rc::clone(&ctx),
        )?;
        Ok(Board {
            store,
            ctx,
            holding,
            tiers: Vec::new(),
        })
    }

    pub fn context(&self) -> &BoardContext {
        &self.ctx
    }

    pub fn holding(&self) -> &ContainerModel {
        &self.holding
    }

    pub fn holding_mut(&mut self) -> &mut ContainerModel {
        &mut self.holding
    }

    pub fn tiers(&self) -> &[ContainerModel] {
        &self.tiers
    }

    /// Add a tier container. A tier that was saved under the same identity
    /// before (say, across a restart) comes back with its persisted list.
    pub fn add_tier(&mut self, color: String, name: String) -> Result<&ContainerModel, StoreError> {
        let key = ContainerKey::Tier { color, name };
        let model = ContainerModel::load(
            key,
            SHARED_GROUP,
            Rc::clone(&self.store),
            Rc::clone(&self.ctx),
        )?;
        self.tiers.push(model);
        Ok(self.tiers.last().expect("tier just pushed"))
    }

    /// Remove a tier and its stored record. The holding area cannot be
    /// removed; unknown keys are a no-op.
    pub fn remove_tier(&mut self, key: &ContainerKey) -> Result<(), StoreError> {
        let Some(position) = self.tiers.iter().position(|t| t.key() == key) else {
            return Ok(());
        };
        self.tiers.remove(position);
        self.store.remove(&key.storage_key())
    }

    /// React to a tier's color/name edit by rekeying its storage
    pub fn rename_tier(
        &mut self,
        key: &ContainerKey,
        color: String,
        name: String,
    ) -> Result<(), BoardError> {
        let tier = self
            .tiers
            .iter_mut()
            .find(|t| t.key() == key)
            .ok_or_else(|| BoardError::UnknownContainer(key.storage_key()))?;
        tier.set_tier_identity(color, name);
        Ok(())
    }

    pub fn container(&self, key: &ContainerKey) -> Option<&ContainerModel> {
        match self.place(key)? {
            Place::Holding => Some(&self.holding),
            Place::Tier(i) => Some(&self.tiers[i]),
        }
    }

    pub fn container_mut(&mut self, key: &ContainerKey) -> Option<&mut ContainerModel> {
        match self.place(key)? {
            Place::Holding => Some(&mut self.holding),
            Place::Tier(i) => Some(&mut self.tiers[i]),
        }
    }

    /// Append freshly ingested items to the holding area
    pub fn commit_ingested(&mut self, items: Vec<Item>) {
        for item in items {
            self.holding.append(item);
        }
    }

    /// Move the item at `source_index` in `source` to `dest_index` in
    /// `dest`. Both lists are updated in memory first and persisted after,
    /// so no reader or reload ever observes the item in both containers or
    /// in neither. Source == dest degenerates to a reorder: the item is
    /// removed, then reinserted at the hovered index.
    pub fn move_item(
        &mut self,
        source: &ContainerKey,
        source_index: usize,
        dest: &ContainerKey,
        dest_index: usize,
    ) -> Result<(), BoardError> {
        let src_place = self
            .place(source)
            .ok_or_else(|| BoardError::UnknownContainer(source.storage_key()))?;
        let dst_place = self
            .place(dest)
            .ok_or_else(|| BoardError::UnknownContainer(dest.storage_key()))?;

        if src_place == dst_place {
            let container = match src_place {
                Place::Holding => &mut self.holding,
                Place::Tier(i) => &mut self.tiers[i],
            };
            let item = container
                .take_at(source_index)
                .ok_or(BoardError::InvalidIndex(source_index))?;
            container.insert_at(dest_index, item);
            container.persist();
            return Ok(());
        }

        let (src, dst) = self.pair_mut(src_place, dst_place);
        if src.group() != dst.group() {
            return Err(BoardError::GroupMismatch);
        }
        let item = src
            .take_at(source_index)
            .ok_or(BoardError::InvalidIndex(source_index))?;
        dst.insert_at(dest_index, item);
        src.persist();
        dst.persist();
        Ok(())
    }

    fn place(&self, key: &ContainerKey) -> Option<Place> {
        if *key == ContainerKey::HoldingArea {
            return Some(Place::Holding);
        }
        self.tiers
            .iter()
            .position(|t| t.key() == key)
            .map(Place::Tier)
    }

    /// Disjoint mutable borrows of two different containers
    fn pair_mut(&mut self, a: Place, b: Place) -> (&mut ContainerModel, &mut ContainerModel) {
        match (a, b) {
            (Place::Holding, Place::Tier(j)) => (&mut self.holding, &mut self.tiers[j]),
            (Place::Tier(i), Place::Holding) => (&mut self.tiers[i], &mut self.holding),
            (Place::Tier(i), Place::Tier(j)) => {
                if i < j {
                    let (left, right) = self.tiers.split_at_mut(j);
                    (&mut left[i], &mut right[0])
                } else {
                    let (left, right) = self.tiers.split_at_mut(i);
                    (&mut right[0], &mut left[j])
                }
            }
            // Same-place moves are handled as a reorder before this point
            (Place::Holding, Place::Holding) => unreachable!("same-container move"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{board_with_items, capturing_context, temp_store};
    use super::*;

    fn tier_key(name: &str) -> ContainerKey {
        ContainerKey::Tier {
            color: "#FF7F7F".to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_move_is_atomic_across_containers() {
        let (_dir, mut board) = board_with_items(&[5, 7, 9]);
        board.add_tier("#FF7F7F".to_string(), "S".to_string()).unwrap();
        let key = tier_key("S");

        board.move_item(&ContainerKey::HoldingArea, 1, &key, 0).unwrap();

        // Source lost exactly the moved item, destination gained it at the
        // drop index, and it exists in exactly one place
        let holding_ids: Vec<i64> = board.holding().list().iter().map(|i| i.id).collect();
        assert_eq!(holding_ids, vec![5, 9]);

        let tier = board.container(&key).unwrap();
        assert_eq!(tier.list().len(), 1);
        assert_eq!(tier.list()[0].id, 7);
    }

    #[test]
    fn test_move_persists_both_sides() {
        let (dir, mut board) = board_with_items(&[5, 7, 9]);
        board.add_tier("#FF7F7F".to_string(), "S".to_string()).unwrap();
        let key = tier_key("S");
        board.move_item(&ContainerKey::HoldingArea, 1, &key, 0).unwrap();

        // A fresh board over the same database sees the completed move
        let store = Rc::new(ItemStore::open(&dir.path().join("board.db")).unwrap());
        let (ctx, _warnings) = capturing_context();
        let mut reloaded = Board::new(store, ctx).unwrap();
        reloaded
            .add_tier("#FF7F7F".to_string(), "S".to_string())
            .unwrap();

        assert_eq!(reloaded.holding().list().len(), 2);
        assert_eq!(reloaded.container(&key).unwrap().list()[0].id, 7);
    }

    #[test]
    fn test_same_container_move_is_reorder() {
        let (_dir, mut board) = board_with_items(&[1, 2, 3]);

        board
            .move_item(&ContainerKey::HoldingArea, 0, &ContainerKey::HoldingArea, 2)
            .unwrap();

        let ids: Vec<i64> = board.holding().list().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_move_into_middle_of_populated_tier() {
        let (_dir, mut board) = board_with_items(&[1, 2]);
        board.add_tier("#FF7F7F".to_string(), "A".to_string()).unwrap();
        let key = tier_key("A");
        board.move_item(&ContainerKey::HoldingArea, 0, &key, 0).unwrap();
        board.move_item(&ContainerKey::HoldingArea, 0, &key, 1).unwrap();

        let ids: Vec<i64> = board.container(&key).unwrap().list().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(board.holding().list().is_empty());
    }

    #[test]
    fn test_move_between_two_tiers() {
        let (_dir, mut board) = board_with_items(&[42]);
        board.add_tier("#FF7F7F".to_string(), "S".to_string()).unwrap();
        board.add_tier("#FFBF7F".to_string(), "A".to_string()).unwrap();
        let s = tier_key("S");
        let a = ContainerKey::Tier {
            color: "#FFBF7F".to_string(),
            name: "A".to_string(),
        };

        board.move_item(&ContainerKey::HoldingArea, 0, &s, 0).unwrap();
        board.move_item(&s, 0, &a, 0).unwrap();

        assert!(board.container(&s).unwrap().list().is_empty());
        assert_eq!(board.container(&a).unwrap().list()[0].id, 42);
    }

    #[test]
    fn test_move_from_unknown_container_fails() {
        let (_dir, mut board) = board_with_items(&[1]);
        let ghost = tier_key("ghost");

        let err = board
            .move_item(&ghost, 0, &ContainerKey::HoldingArea, 0)
            .unwrap_err();
        assert!(matches!(err, BoardError::UnknownContainer(_)));
        // Nothing happened
        assert_eq!(board.holding().list().len(), 1);
    }

    #[test]
    fn test_move_bad_index_leaves_both_untouched() {
        let (_dir, mut board) = board_with_items(&[1]);
        board.add_tier("#FF7F7F".to_string(), "S".to_string()).unwrap();
        let key = tier_key("S");

        let err = board
            .move_item(&ContainerKey::HoldingArea, 5, &key, 0)
            .unwrap_err();
        assert_eq!(err, BoardError::InvalidIndex(5));
        assert_eq!(board.holding().list().len(), 1);
        assert!(board.container(&key).unwrap().list().is_empty());
    }

    #[test]
    fn test_remove_tier_drops_stored_record() {
        let (_dir, store) = temp_store();
        let (ctx, _warnings) = capturing_context();
        let mut board = Board::new(Rc::clone(&store), ctx).unwrap();
        board.add_tier("#FF7F7F".to_string(), "S".to_string()).unwrap();
        let key = tier_key("S");

        board
            .container_mut(&key)
            .unwrap()
            .append(Item::new(1, "data:image/jpeg;base64,AA==".to_string()));
        board.remove_tier(&key).unwrap();

        assert!(board.container(&key).is_none());
        assert!(store.load("tier_#FF7F7F_S").unwrap().is_empty());
    }

    #[test]
    fn test_tier_list_survives_restart_under_same_identity() {
        let (dir, store) = temp_store();
        let (ctx, _warnings) = capturing_context();
        {
            let mut board = Board::new(Rc::clone(&store), Rc::clone(&ctx)).unwrap();
            board.add_tier("#FF7F7F".to_string(), "S".to_string()).unwrap();
            board
                .container_mut(&tier_key("S"))
                .unwrap()
                .append(Item::new(7, "data:image/jpeg;base64,AA==".to_string()));
        }

        let store = Rc::new(ItemStore::open(&dir.path().join("board.db")).unwrap());
        let (ctx, _warnings) = capturing_context();
        let mut board = Board::new(store, ctx).unwrap();
        let tier = board.add_tier("#FF7F7F".to_string(), "S".to_string()).unwrap();
        assert_eq!(tier.list()[0].id, 7);
    }

    #[test]
    fn test_rename_tier_rekeys_storage() {
        let (_dir, store) = temp_store();
        let (ctx, _warnings) = capturing_context();
        let mut board = Board::new(Rc::clone(&store), ctx).unwrap();
        board.add_tier("#FF7F7F".to_string(), "B".to_string()).unwrap();
        let key = ContainerKey::Tier {
            color: "#FF7F7F".to_string(),
            name: "B".to_string(),
        };
        board
            .container_mut(&key)
            .unwrap()
            .append(Item::new(3, "data:image/jpeg;base64,AA==".to_string()));

        board
            .rename_tier(&key, "#BFFF7F".to_string(), "B".to_string())
            .unwrap();

        assert_eq!(store.load("tier_#BFFF7F_B").unwrap().len(), 1);
        assert!(store.load("tier_#FF7F7F_B").unwrap().is_empty());
    }
}
