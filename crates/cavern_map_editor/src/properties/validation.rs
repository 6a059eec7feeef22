//! Commit validation for the property editor

use cavern_map_core::{ActivatorCategory, FileId, IdTarget};

use crate::activators::ActivatorIndex;

/// Why a field value was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NothingSelected,
    ReadOnly(&'static str),
    UnknownField(String),
    UnknownType(String),
    NotANumber(String),
    MissingValue(&'static str),
    DuplicateId {
        category: ActivatorCategory,
        id: u32,
    },
    UnknownReference {
        field: String,
        id: u32,
    },
    UnknownMap(FileId),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NothingSelected => write!(f, "Nothing selected"),
            ValidationError::ReadOnly(field) => write!(f, "{} cannot be edited", field),
            ValidationError::UnknownField(field) => write!(f, "Unknown field: {}", field),
            ValidationError::UnknownType(kind) => write!(f, "Unknown activator type: {}", kind),
            ValidationError::NotANumber(value) => write!(f, "Not a number: {}", value),
            ValidationError::MissingValue(field) => write!(f, "{} needs a value", field),
            ValidationError::DuplicateId { category, id } => {
                write!(f, "{} id {} is already used", category, id)
            }
            ValidationError::UnknownReference { field, id } => {
                write!(f, "{} {} does not exist in this map", field, id)
            }
            ValidationError::UnknownMap(id) => write!(f, "Map {} does not exist", id),
        }
    }
}

impl std::error::Error for ValidationError {}

/// What a commit is checked against
pub struct ValidationContext<'a> {
    index: &'a ActivatorIndex,
    active_maps: &'a [FileId],
}

impl<'a> ValidationContext<'a> {
    pub fn new(index: &'a ActivatorIndex, active_maps: &'a [FileId]) -> Self {
        Self { index, active_maps }
    }

    /// A new id must be unused in its category unless it is unchanged
    pub fn check_id(
        &self,
        category: ActivatorCategory,
        previous: u32,
        id: u32,
    ) -> Result<(), ValidationError> {
        if id != previous && self.index.has_id(category, id) {
            return Err(ValidationError::DuplicateId { category, id });
        }
        Ok(())
    }

    pub fn check_reference(
        &self,
        field: &str,
        target: IdTarget,
        id: u32,
    ) -> Result<(), ValidationError> {
        if !self.index.has_target(target, id) {
            return Err(ValidationError::UnknownReference {
                field: field.to_string(),
                id,
            });
        }
        Ok(())
    }

    pub fn check_destination(&self, file_id: FileId) -> Result<(), ValidationError> {
        if !self.active_maps.contains(&file_id) {
            return Err(ValidationError::UnknownMap(file_id));
        }
        Ok(())
    }
}
