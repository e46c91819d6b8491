use std::collections::BTreeMap;

use delve_core::{DoorKey, Dungeon, Rect};

/// Open/closed flags for every carved door, kept outside the tile grid.
#[derive(Debug)]
pub(crate) struct DoorStates {
    open: BTreeMap<DoorKey, bool>,
    blockers: Vec<Rect>,
}

impl DoorStates {
    /// Starts with every door open.
    pub(crate) fn new(dungeon: &Dungeon) -> Self {
        Self {
            open: dungeon.doors.keys().map(|key| (*key, true)).collect(),
            blockers: Vec::new(),
        }
    }

    pub(crate) fn is_open(&self, key: &DoorKey) -> Option<bool> {
        self.open.get(key).copied()
    }

    /// Changes a door's flag, reporting whether it actually flipped.
    pub(crate) fn set(&mut self, dungeon: &Dungeon, key: DoorKey, open: bool) -> bool {
        let Some(flag) = self.open.get_mut(&key) else {
            return false;
        };
        if *flag == open {
            return false;
        }
        *flag = open;
        self.blockers = self
            .open
            .iter()
            .filter(|(_, open)| !**open)
            .filter_map(|(key, _)| dungeon.doors.get(key))
            .map(|door| door.rect)
            .collect();
        true
    }

    /// Collision rectangles of every closed door.
    pub(crate) fn blockers(&self) -> &[Rect] {
        &self.blockers
    }
}
