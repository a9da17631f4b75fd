//! UnitCatalog - lookup of unit types by id

use super::{UnitInstance, UnitType};
use crate::config::ConfigError;
use crate::error::ValidationError;
use std::collections::HashMap;

/// Registry of every known unit type
#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    types: HashMap<String, UnitType>,
}

impl UnitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, validating every entry and rejecting duplicate ids
    pub fn from_types(types: Vec<UnitType>) -> Result<Self, ConfigError> {
        let mut catalog = Self::new();
        for unit_type in types {
            if catalog.types.contains_key(&unit_type.id) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate unit type id '{}'",
                    unit_type.id
                )));
            }
            catalog.register(unit_type)?;
        }
        Ok(catalog)
    }

    /// Validate and register a unit type, replacing any previous entry with the same id
    pub fn register(&mut self, unit_type: UnitType) -> Result<(), ConfigError> {
        unit_type.validate()?;
        self.types.insert(unit_type.id.clone(), unit_type);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&UnitType, ValidationError> {
        self.types
            .get(id)
            .ok_or_else(|| ValidationError::UnknownUnitType(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(id)
    }

    /// Create a unit of the given type
    pub fn spawn(&self, id: &str, level: u32, slot: usize) -> Result<UnitInstance, ValidationError> {
        Ok(UnitInstance::new(self.get(id)?, level, slot))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
