//! # Part Library
//!
//! Arena of validated prototypes. Everything else refers to a prototype
//! by its [`PrototypeId`], never by pointer.

use std::collections::HashMap;

use crate::error::{GenerationError, GenerationResult};
use crate::prototype::{PartDefinition, PartPrototype};

/// Index of a prototype in a [`PartLibrary`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrototypeId(pub usize);

impl PrototypeId {
    /// Raw index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// The fixed set of parts a level is assembled from.
#[derive(Clone, Debug, Default)]
pub struct PartLibrary {
    prototypes: Vec<PartPrototype>,
    by_name: HashMap<String, PrototypeId>,
}

impl PartLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds, validates and stores a part.
    ///
    /// # Errors
    ///
    /// Returns error if the definition is invalid or the name is taken.
    pub fn register(&mut self, definition: PartDefinition) -> GenerationResult<PrototypeId> {
        if self.by_name.contains_key(&definition.name) {
            return Err(GenerationError::DuplicatePart(definition.name));
        }

        let prototype = PartPrototype::build(definition)?;
        let id = PrototypeId(self.prototypes.len());

        tracing::debug!(
            "Registered part '{}' as {} ({} connectors)",
            prototype.name(),
            id.0,
            prototype.connectors().len()
        );

        self.by_name.insert(prototype.name().to_string(), id);
        self.prototypes.push(prototype);
        Ok(id)
    }

    /// Gets a prototype by id.
    #[must_use]
    pub fn get(&self, id: PrototypeId) -> Option<&PartPrototype> {
        self.prototypes.get(id.0)
    }

    /// Prototype behind an id this library issued.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this library.
    #[must_use]
    pub fn prototype(&self, id: PrototypeId) -> &PartPrototype {
        &self.prototypes[id.0]
    }

    /// Looks up a prototype id by name.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<PrototypeId> {
        self.by_name.get(name).copied()
    }

    /// Ids of every prototype flagged as a start candidate, in registration order.
    #[must_use]
    pub fn start_candidates(&self) -> Vec<PrototypeId> {
        self.iter()
            .filter(|(_, p)| p.can_be_start())
            .map(|(id, _)| id)
            .collect()
    }

    /// Iterates `(id, prototype)` in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (PrototypeId, &PartPrototype)> {
        self.prototypes
            .iter()
            .enumerate()
            .map(|(i, p)| (PrototypeId(i), p))
    }

    /// Returns the number of prototypes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    /// Returns true if the library holds no prototypes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    /// Checks that every id refers to a stored prototype.
    ///
    /// # Errors
    ///
    /// Returns the first unknown id.
    pub fn check_ids<'a>(&self, ids: impl IntoIterator<Item = &'a PrototypeId>) -> GenerationResult<()> {
        match ids.into_iter().find(|id| id.0 >= self.prototypes.len()) {
            Some(id) => Err(GenerationError::UnknownPrototype(id.0)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::Connector;
    use crate::prototype::Surface;
    use glam::Vec3;
    use labyrinth_shared::Pose;

    fn block(name: &str) -> PartDefinition {
        PartDefinition::new(name)
            .with_surface(Surface::cuboid(Vec3::ZERO, Vec3::ONE))
            .with_connector(Connector::new("door", Pose::IDENTITY))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut library = PartLibrary::new();
        let a = library.register(block("a").start()).unwrap();
        let b = library.register(block("b")).unwrap();

        assert_eq!(library.len(), 2);
        assert_eq!(library.id_of("b"), Some(b));
        assert_eq!(library.get(a).unwrap().name(), "a");
        assert_eq!(library.start_candidates(), vec![a]);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut library = PartLibrary::new();
        library.register(block("a")).unwrap();
        assert!(matches!(
            library.register(block("a")),
            Err(GenerationError::DuplicatePart(name)) if name == "a"
        ));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_check_ids() {
        let mut library = PartLibrary::new();
        let a = library.register(block("a")).unwrap();
        assert!(library.check_ids(&[a]).is_ok());
        assert!(matches!(
            library.check_ids(&[a, PrototypeId(7)]),
            Err(GenerationError::UnknownPrototype(7))
        ));
    }
}
