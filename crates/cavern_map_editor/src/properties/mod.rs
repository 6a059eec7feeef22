//! Property editor: typed form over the selected activator or transition
//!
//! Fields come from the activator kind's field table. Numeric input is limited
//! to three digits with leading zeros stripped. A commit is validated against
//! the activator index and the world registry before anything is written back;
//! a rejected commit leaves the field in edit mode.

mod validation;

pub use validation::{ValidationContext, ValidationError};

use cavern_map_core::{
    ActivatorCategory, ActivatorKind, ActivatorRecord, FieldKind, FieldValue, FileId, GridPos,
};

/// Maximum digits accepted in a numeric field
pub const MAX_DIGITS: usize = 3;
/// Maximum characters accepted in a text field
pub const MAX_TEXT: usize = 32;

/// What the editor is showing
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyTarget {
    Activator {
        category: ActivatorCategory,
        record: ActivatorRecord,
    },
    Transition {
        pos: GridPos,
        destination: FileId,
        dest_pos: GridPos,
    },
}

impl PropertyTarget {
    pub fn pos(&self) -> GridPos {
        match self {
            PropertyTarget::Activator { record, .. } => record.pos,
            PropertyTarget::Transition { pos, .. } => *pos,
        }
    }

    pub fn category(&self) -> ActivatorCategory {
        match self {
            PropertyTarget::Activator { category, .. } => *category,
            PropertyTarget::Transition { .. } => ActivatorCategory::Transitions,
        }
    }
}

/// One row of the rendered form
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow {
    pub name: &'static str,
    pub value: String,
    pub editable: bool,
}

/// Result of starting to edit a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldEdit {
    /// Keystrokes now go to the field
    Typing,
    /// `dest_pos` is picked by clicking in the destination map
    PickDestination {
        destination: FileId,
        transition_pos: GridPos,
    },
}

/// A validated change to write back
#[derive(Debug, Clone, PartialEq)]
pub enum Commit {
    Activator {
        category: ActivatorCategory,
        /// Id the record was stored under before this commit
        previous_id: u32,
        record: ActivatorRecord,
    },
    Transition {
        pos: GridPos,
        destination: FileId,
        dest_pos: GridPos,
    },
}

#[derive(Debug, Clone, Default)]
pub struct PropertyEditor {
    target: Option<PropertyTarget>,
    /// Field currently being typed into
    edited_field: Option<&'static str>,
    /// In-progress input
    edited_value: String,
}

impl PropertyEditor {
    pub fn open(&mut self, target: PropertyTarget) {
        self.target = Some(target);
        self.edited_field = None;
        self.edited_value.clear();
    }

    pub fn close(&mut self) {
        self.target = None;
        self.edited_field = None;
        self.edited_value.clear();
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&PropertyTarget> {
        self.target.as_ref()
    }

    pub fn edited_field(&self) -> Option<&'static str> {
        self.edited_field
    }

    pub fn edited_value(&self) -> &str {
        &self.edited_value
    }

    pub fn is_editing(&self) -> bool {
        self.edited_field.is_some()
    }

    /// Stop typing without committing
    pub fn cancel_edit(&mut self) {
        self.edited_field = None;
        self.edited_value.clear();
    }

    /// Form rows in display order: core fields first, then the kind's fields
    pub fn rows(&self) -> Vec<FieldRow> {
        let Some(target) = &self.target else {
            return Vec::new();
        };
        let pos = target.pos();
        let pos_text = format!("[{}, {}]", pos.x, pos.y);

        match target {
            PropertyTarget::Activator { record, .. } => {
                let mut rows = vec![
                    FieldRow {
                        name: "id",
                        value: record.id.to_string(),
                        editable: true,
                    },
                    FieldRow {
                        name: "type",
                        value: record.kind.type_name().to_string(),
                        editable: true,
                    },
                    FieldRow {
                        name: "pos",
                        value: pos_text,
                        editable: false,
                    },
                ];
                rows.extend(record.kind.fields().iter().map(|spec| FieldRow {
                    name: spec.name,
                    value: record.kind.get(spec.name).unwrap_or_default().to_string(),
                    editable: true,
                }));
                rows
            }
            PropertyTarget::Transition {
                destination,
                dest_pos,
                ..
            } => vec![
                FieldRow {
                    name: "pos",
                    value: pos_text,
                    editable: false,
                },
                FieldRow {
                    name: "destination",
                    value: destination.to_string(),
                    editable: true,
                },
                FieldRow {
                    name: "dest_pos",
                    value: format!("[{}, {}]", dest_pos.x, dest_pos.y),
                    editable: true,
                },
            ],
        }
    }

    /// Kind of a typed field of the current target
    fn field_kind(&self, name: &str) -> Option<FieldKind> {
        match (self.target.as_ref()?, name) {
            (PropertyTarget::Activator { .. }, "id") => Some(FieldKind::Int),
            (PropertyTarget::Activator { record, .. }, _) => {
                record.kind.field(name).map(|spec| spec.kind)
            }
            (PropertyTarget::Transition { .. }, "destination") => Some(FieldKind::Int),
            _ => None,
        }
    }

    /// Start editing a field
    pub fn begin_edit(&mut self, name: &str) -> Result<FieldEdit, ValidationError> {
        let target = self.target.as_ref().ok_or(ValidationError::NothingSelected)?;

        if name == "pos" {
            return Err(ValidationError::ReadOnly("pos"));
        }
        if let PropertyTarget::Transition {
            pos, destination, ..
        } = *target
        {
            if name == "dest_pos" {
                self.cancel_edit();
                return Ok(FieldEdit::PickDestination {
                    destination,
                    transition_pos: pos,
                });
            }
        }

        let Some(row) = self.rows().into_iter().find(|row| row.name == name) else {
            return Err(ValidationError::UnknownField(name.to_string()));
        };
        if self.field_kind(name).is_none() {
            // `type` is switched from a list, not typed
            return Err(ValidationError::ReadOnly(row.name));
        }
        self.edited_field = Some(row.name);
        self.edited_value = row.value;
        Ok(FieldEdit::Typing)
    }

    /// Append a typed character to the field being edited
    pub fn input_char(&mut self, c: char) {
        let Some(name) = self.edited_field else {
            return;
        };
        match self.field_kind(name) {
            Some(FieldKind::Int) => {
                push_digit(&mut self.edited_value, c);
            }
            Some(FieldKind::Text) => {
                if !c.is_control() && self.edited_value.chars().count() < MAX_TEXT {
                    self.edited_value.push(c);
                }
            }
            None => {}
        }
    }

    pub fn backspace(&mut self) {
        if self.edited_field.is_some() {
            self.edited_value.pop();
        }
    }

    /// Validate and apply the field being edited.
    ///
    /// On success the target is updated and editing stops; on failure nothing
    /// changes and the field stays in edit mode.
    pub fn commit(&mut self, ctx: &ValidationContext) -> Result<Commit, ValidationError> {
        let name = self.edited_field.ok_or(ValidationError::NothingSelected)?;
        let kind = self
            .field_kind(name)
            .ok_or_else(|| ValidationError::UnknownField(name.to_string()))?;
        let value = match kind {
            FieldKind::Int if self.edited_value.is_empty() => FieldValue::Empty,
            FieldKind::Int => FieldValue::Int(
                self.edited_value
                    .parse()
                    .map_err(|_| ValidationError::NotANumber(self.edited_value.clone()))?,
            ),
            FieldKind::Text if self.edited_value.is_empty() => FieldValue::Empty,
            FieldKind::Text => FieldValue::Text(self.edited_value.clone()),
        };

        let target = self.target.as_mut().ok_or(ValidationError::NothingSelected)?;
        let commit = match target {
            PropertyTarget::Activator { category, record } => {
                let previous_id = record.id;
                let mut updated = record.clone();
                if name == "id" {
                    let FieldValue::Int(id) = value else {
                        return Err(ValidationError::MissingValue("id"));
                    };
                    ctx.check_id(*category, previous_id, id)?;
                    updated.id = id;
                } else {
                    if let (Some(target_ids), FieldValue::Int(id)) = (
                        updated.kind.field(name).and_then(|spec| spec.references),
                        &value,
                    ) {
                        ctx.check_reference(name, target_ids, *id)?;
                    }
                    if !updated.kind.set(name, value) {
                        return Err(ValidationError::UnknownField(name.to_string()));
                    }
                }
                *record = updated.clone();
                Commit::Activator {
                    category: *category,
                    previous_id,
                    record: updated,
                }
            }
            PropertyTarget::Transition {
                pos,
                destination,
                dest_pos,
            } => {
                let FieldValue::Int(file_id) = value else {
                    return Err(ValidationError::MissingValue("destination"));
                };
                ctx.check_destination(file_id)?;
                *destination = file_id;
                Commit::Transition {
                    pos: *pos,
                    destination: file_id,
                    dest_pos: *dest_pos,
                }
            }
        };

        self.cancel_edit();
        Ok(commit)
    }

    /// Switch the activator's kind, clearing every kind-specific field
    pub fn set_type(&mut self, type_name: &str) -> Result<Option<Commit>, ValidationError> {
        let Some(PropertyTarget::Activator { category, record }) = self.target.as_mut() else {
            return Err(ValidationError::ReadOnly("type"));
        };
        if record.kind.type_name() == type_name {
            return Ok(None);
        }
        let kind = ActivatorKind::empty(type_name)
            .filter(|kind| kind.category() == *category)
            .ok_or_else(|| ValidationError::UnknownType(type_name.to_string()))?;

        record.kind = kind;
        let commit = Commit::Activator {
            category: *category,
            previous_id: record.id,
            record: record.clone(),
        };
        self.cancel_edit();
        Ok(Some(commit))
    }
}

/// Append a digit to a numeric buffer, keeping at most `MAX_DIGITS` and no
/// leading zeros. Returns false if the character was rejected.
pub(crate) fn push_digit(buffer: &mut String, c: char) -> bool {
    if !c.is_ascii_digit() || buffer.len() >= MAX_DIGITS {
        return false;
    }
    buffer.push(c);
    *buffer = strip_leading_zeros(buffer);
    true
}

/// `"007"` -> `"7"`, `"000"` -> `"0"`
fn strip_leading_zeros(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() && !digits.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
