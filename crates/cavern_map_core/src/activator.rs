//! Activator metadata: typed per-kind records and the sidecar store
//!
//! The store document is `{ file_id: { "levers"|"buttons"|"teleporters": { id: record } } }`.
//! Each record carries `type` plus the fields of that kind.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::{FileId, GridPos, TRANSITION_TYPE};

/// Category an activator tile falls in, derived from its tile type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActivatorCategory {
    Levers,
    Buttons,
    Teleporters,
    Transitions,
}

impl ActivatorCategory {
    /// All categories, in display order
    pub fn all() -> [ActivatorCategory; 4] {
        [
            ActivatorCategory::Levers,
            ActivatorCategory::Buttons,
            ActivatorCategory::Teleporters,
            ActivatorCategory::Transitions,
        ]
    }

    /// Category of a tile type, `None` if the type is not an activator
    pub fn of_tile_type(kind: &str) -> Option<Self> {
        if kind == TRANSITION_TYPE {
            Some(ActivatorCategory::Transitions)
        } else if kind.contains("lever") {
            Some(ActivatorCategory::Levers)
        } else if kind.contains("button") {
            Some(ActivatorCategory::Buttons)
        } else if kind.contains("teleporter") {
            Some(ActivatorCategory::Teleporters)
        } else {
            None
        }
    }

    /// Key used in the metadata document. Transitions are not stored there.
    pub fn plural(&self) -> Option<&'static str> {
        match self {
            ActivatorCategory::Levers => Some("levers"),
            ActivatorCategory::Buttons => Some("buttons"),
            ActivatorCategory::Teleporters => Some("teleporters"),
            ActivatorCategory::Transitions => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ActivatorCategory::Levers => "Levers",
            ActivatorCategory::Buttons => "Buttons",
            ActivatorCategory::Teleporters => "Teleporters",
            ActivatorCategory::Transitions => "Transitions",
        }
    }

    /// Type strings selectable for this category
    pub fn kinds(&self) -> &'static [&'static str] {
        match self {
            ActivatorCategory::Levers => &["visual_and_door", "test"],
            ActivatorCategory::Buttons => &["improve_tp_progress"],
            ActivatorCategory::Teleporters => &["normal_tp", "progressive_tp"],
            ActivatorCategory::Transitions => &[],
        }
    }

    /// Fresh record kind for a newly placed activator
    pub fn default_kind(&self) -> Option<ActivatorKind> {
        self.kinds().first().and_then(|name| ActivatorKind::empty(name))
    }
}

impl std::fmt::Display for ActivatorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Expected value kind of an editable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Up to three decimal digits
    Int,
    Text,
}

/// Id domain an `_id` field must reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdTarget {
    Doors,
    Teleporters,
}

/// Description of one editable field of an activator kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Set for fields that must name an existing id in the current map
    pub references: Option<IdTarget>,
}

impl FieldSpec {
    const fn int(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Int,
            references: None,
        }
    }

    const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            references: None,
        }
    }

    const fn id_of(name: &'static str, target: IdTarget) -> Self {
        Self {
            name,
            kind: FieldKind::Int,
            references: Some(target),
        }
    }
}

const VISUAL_AND_DOOR_FIELDS: &[FieldSpec] = &[
    FieldSpec::int("visual_duration"),
    FieldSpec::id_of("door_id", IdTarget::Doors),
];
const TEST_FIELDS: &[FieldSpec] = &[FieldSpec::int("info 1"), FieldSpec::text("info 2")];
const TELEPORTER_FIELDS: &[FieldSpec] = &[FieldSpec::text("dest"), FieldSpec::int("time")];
const IMPROVE_TP_FIELDS: &[FieldSpec] = &[
    FieldSpec::int("amount"),
    FieldSpec::id_of("tp_id", IdTarget::Teleporters),
];

/// Value of an editable field; `Empty` until the user fills it in
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    #[default]
    Empty,
    Int(u32),
    Text(String),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Int(value) => write!(f, "{}", value),
            FieldValue::Text(value) => f.write_str(value),
        }
    }
}

/// Typed activator payload, tagged by its `type` string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivatorKind {
    VisualAndDoor {
        #[serde(default)]
        visual_duration: Option<u32>,
        #[serde(default)]
        door_id: Option<u32>,
    },
    Test {
        #[serde(default, rename = "info 1")]
        info_1: Option<u32>,
        #[serde(default, rename = "info 2")]
        info_2: Option<String>,
    },
    NormalTp {
        #[serde(default)]
        dest: Option<String>,
        #[serde(default)]
        time: Option<u32>,
    },
    ProgressiveTp {
        #[serde(default)]
        dest: Option<String>,
        #[serde(default)]
        time: Option<u32>,
    },
    ImproveTpProgress {
        #[serde(default)]
        amount: Option<u32>,
        #[serde(default)]
        tp_id: Option<u32>,
    },
}

impl ActivatorKind {
    /// Kind with every field empty, `None` for an unknown type string
    pub fn empty(type_name: &str) -> Option<Self> {
        match type_name {
            "visual_and_door" => Some(ActivatorKind::VisualAndDoor {
                visual_duration: None,
                door_id: None,
            }),
            "test" => Some(ActivatorKind::Test {
                info_1: None,
                info_2: None,
            }),
            "normal_tp" => Some(ActivatorKind::NormalTp {
                dest: None,
                time: None,
            }),
            "progressive_tp" => Some(ActivatorKind::ProgressiveTp {
                dest: None,
                time: None,
            }),
            "improve_tp_progress" => Some(ActivatorKind::ImproveTpProgress {
                amount: None,
                tp_id: None,
            }),
            _ => None,
        }
    }

    /// The `type` string
    pub fn type_name(&self) -> &'static str {
        match self {
            ActivatorKind::VisualAndDoor { .. } => "visual_and_door",
            ActivatorKind::Test { .. } => "test",
            ActivatorKind::NormalTp { .. } => "normal_tp",
            ActivatorKind::ProgressiveTp { .. } => "progressive_tp",
            ActivatorKind::ImproveTpProgress { .. } => "improve_tp_progress",
        }
    }

    pub fn category(&self) -> ActivatorCategory {
        match self {
            ActivatorKind::VisualAndDoor { .. } | ActivatorKind::Test { .. } => {
                ActivatorCategory::Levers
            }
            ActivatorKind::NormalTp { .. } | ActivatorKind::ProgressiveTp { .. } => {
                ActivatorCategory::Teleporters
            }
            ActivatorKind::ImproveTpProgress { .. } => ActivatorCategory::Buttons,
        }
    }

    /// Editable fields beyond `id`, `type` and `pos`
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            ActivatorKind::VisualAndDoor { .. } => VISUAL_AND_DOOR_FIELDS,
            ActivatorKind::Test { .. } => TEST_FIELDS,
            ActivatorKind::NormalTp { .. } | ActivatorKind::ProgressiveTp { .. } => {
                TELEPORTER_FIELDS
            }
            ActivatorKind::ImproveTpProgress { .. } => IMPROVE_TP_FIELDS,
        }
    }

    /// Look up a field spec by name
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|spec| spec.name == name)
    }

    /// Read a field by name
    pub fn get(&self, name: &str) -> Option<FieldValue> {
        let int = |value: &Option<u32>| value.map_or(FieldValue::Empty, FieldValue::Int);
        let text = |value: &Option<String>| {
            value
                .clone()
                .map_or(FieldValue::Empty, FieldValue::Text)
        };
        match (self, name) {
            (ActivatorKind::VisualAndDoor { visual_duration, .. }, "visual_duration") => {
                Some(int(visual_duration))
            }
            (ActivatorKind::VisualAndDoor { door_id, .. }, "door_id") => Some(int(door_id)),
            (ActivatorKind::Test { info_1, .. }, "info 1") => Some(int(info_1)),
            (ActivatorKind::Test { info_2, .. }, "info 2") => Some(text(info_2)),
            (
                ActivatorKind::NormalTp { dest, .. } | ActivatorKind::ProgressiveTp { dest, .. },
                "dest",
            ) => Some(text(dest)),
            (
                ActivatorKind::NormalTp { time, .. } | ActivatorKind::ProgressiveTp { time, .. },
                "time",
            ) => Some(int(time)),
            (ActivatorKind::ImproveTpProgress { amount, .. }, "amount") => Some(int(amount)),
            (ActivatorKind::ImproveTpProgress { tp_id, .. }, "tp_id") => Some(int(tp_id)),
            _ => None,
        }
    }

    /// Write a field by name. Returns false if the field does not exist
    /// or the value has the wrong kind.
    pub fn set(&mut self, name: &str, value: FieldValue) -> bool {
        fn put_int(slot: &mut Option<u32>, value: FieldValue) -> bool {
            match value {
                FieldValue::Empty => *slot = None,
                FieldValue::Int(v) => *slot = Some(v),
                FieldValue::Text(_) => return false,
            }
            true
        }
        fn put_text(slot: &mut Option<String>, value: FieldValue) -> bool {
            match value {
                FieldValue::Empty => *slot = None,
                FieldValue::Text(v) => *slot = Some(v),
                FieldValue::Int(_) => return false,
            }
            true
        }

        match (self, name) {
            (ActivatorKind::VisualAndDoor { visual_duration, .. }, "visual_duration") => {
                put_int(visual_duration, value)
            }
            (ActivatorKind::VisualAndDoor { door_id, .. }, "door_id") => put_int(door_id, value),
            (ActivatorKind::Test { info_1, .. }, "info 1") => put_int(info_1, value),
            (ActivatorKind::Test { info_2, .. }, "info 2") => put_text(info_2, value),
            (
                ActivatorKind::NormalTp { dest, .. } | ActivatorKind::ProgressiveTp { dest, .. },
                "dest",
            ) => put_text(dest, value),
            (
                ActivatorKind::NormalTp { time, .. } | ActivatorKind::ProgressiveTp { time, .. },
                "time",
            ) => put_int(time, value),
            (ActivatorKind::ImproveTpProgress { amount, .. }, "amount") => put_int(amount, value),
            (ActivatorKind::ImproveTpProgress { tp_id, .. }, "tp_id") => put_int(tp_id, value),
            _ => false,
        }
    }
}

/// Metadata record of one placed activator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatorRecord {
    pub id: u32,
    pub pos: GridPos,
    #[serde(flatten)]
    pub kind: ActivatorKind,
}

impl ActivatorRecord {
    pub fn new(id: u32, pos: GridPos, kind: ActivatorKind) -> Self {
        Self { id, pos, kind }
    }
}

/// Metadata of one map, split by category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelActivators {
    #[serde(default)]
    pub levers: BTreeMap<u32, ActivatorRecord>,
    #[serde(default)]
    pub buttons: BTreeMap<u32, ActivatorRecord>,
    #[serde(default)]
    pub teleporters: BTreeMap<u32, ActivatorRecord>,
}

impl LevelActivators {
    pub fn is_empty(&self) -> bool {
        self.levers.is_empty() && self.buttons.is_empty() && self.teleporters.is_empty()
    }

    /// Records of a category; `None` for transitions
    pub fn category(&self, category: ActivatorCategory) -> Option<&BTreeMap<u32, ActivatorRecord>> {
        match category {
            ActivatorCategory::Levers => Some(&self.levers),
            ActivatorCategory::Buttons => Some(&self.buttons),
            ActivatorCategory::Teleporters => Some(&self.teleporters),
            ActivatorCategory::Transitions => None,
        }
    }

    pub fn category_mut(
        &mut self,
        category: ActivatorCategory,
    ) -> Option<&mut BTreeMap<u32, ActivatorRecord>> {
        match category {
            ActivatorCategory::Levers => Some(&mut self.levers),
            ActivatorCategory::Buttons => Some(&mut self.buttons),
            ActivatorCategory::Teleporters => Some(&mut self.teleporters),
            ActivatorCategory::Transitions => None,
        }
    }
}

/// The activator metadata document for the whole world, keyed by map file id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivatorStore {
    levels: BTreeMap<FileId, LevelActivators>,
}

impl ActivatorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata of one map, if any was recorded
    pub fn level(&self, file_id: FileId) -> Option<&LevelActivators> {
        self.levels.get(&file_id)
    }

    /// Replace the whole metadata of one map
    pub fn set_level(&mut self, file_id: FileId, level: LevelActivators) {
        if level.is_empty() {
            self.levels.remove(&file_id);
        } else {
            self.levels.insert(file_id, level);
        }
    }

    /// Look up a single record
    pub fn get(
        &self,
        file_id: FileId,
        category: ActivatorCategory,
        id: u32,
    ) -> Option<&ActivatorRecord> {
        self.levels.get(&file_id)?.category(category)?.get(&id)
    }

    /// Insert or replace a record under its own id.
    /// Returns false for categories that are not stored here.
    pub fn insert(
        &mut self,
        file_id: FileId,
        category: ActivatorCategory,
        record: ActivatorRecord,
    ) -> bool {
        if category.plural().is_none() {
            return false;
        }
        let level = self.levels.entry(file_id).or_default();
        match level.category_mut(category) {
            Some(records) => {
                records.insert(record.id, record);
                true
            }
            None => false,
        }
    }

    /// Remove a record; empty levels are dropped from the document
    pub fn remove(
        &mut self,
        file_id: FileId,
        category: ActivatorCategory,
        id: u32,
    ) -> Option<ActivatorRecord> {
        let level = self.levels.get_mut(&file_id)?;
        let removed = level.category_mut(category)?.remove(&id);
        if level.is_empty() {
            self.levels.remove(&file_id);
        }
        removed
    }

    /// Move a record to a new id. Fails if the new id is taken.
    pub fn rekey(
        &mut self,
        file_id: FileId,
        category: ActivatorCategory,
        old_id: u32,
        new_id: u32,
    ) -> bool {
        let Some(records) = self
            .levels
            .get_mut(&file_id)
            .and_then(|level| level.category_mut(category))
        else {
            return false;
        };
        if old_id == new_id {
            return records.contains_key(&old_id);
        }
        if records.contains_key(&new_id) {
            return false;
        }
        match records.remove(&old_id) {
            Some(mut record) => {
                record.id = new_id;
                records.insert(new_id, record);
                true
            }
            None => false,
        }
    }

    /// Rewrite top-level file ids through a renumbering.
    /// Levels whose id is not in the mapping are dropped.
    pub fn renumber(&mut self, mapping: &HashMap<FileId, FileId>) {
        self.levels = std::mem::take(&mut self.levels)
            .into_iter()
            .filter_map(|(old, level)| mapping.get(&old).map(|new| (*new, level)))
            .collect();
    }

    /// File ids that have metadata
    pub fn file_ids(&self) -> impl Iterator<Item = FileId> + '_ {
        self.levels.keys().copied()
    }
}
