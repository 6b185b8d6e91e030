use std::collections::BTreeMap;
use std::fmt;

use foundation::NumericId;

use crate::entity::{EntityId, MapEntity};

/// Ordered collection of map entities.
///
/// Order is significant: topology order first, decomposed territories
/// appended after. Entities are never removed once spawned.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EntitySet {
    entities: Vec<MapEntity>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum KeyKind {
    NumericId,
    Alpha3,
    Alpha2,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::NumericId => write!(f, "numericId"),
            KeyKind::Alpha3 => write!(f, "alpha3Code"),
            KeyKind::Alpha2 => write!(f, "alpha2Code"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey {
    pub kind: KeyKind,
    pub value: String,
}

impl fmt::Display for DuplicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "duplicate {} {:?}", self.kind, self.value)
    }
}

impl std::error::Error for DuplicateKey {}

impl EntitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, entity: MapEntity) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        self.entities.push(entity);
        id
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: EntityId) -> Option<&MapEntity> {
        self.entities.get(id.index() as usize)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut MapEntity> {
        self.entities.get_mut(id.index() as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &MapEntity)> + '_ {
        self.entities
            .iter()
            .enumerate()
            .map(|(idx, e)| (EntityId(idx as u32), e))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut MapEntity)> + '_ {
        self.entities
            .iter_mut()
            .enumerate()
            .map(|(idx, e)| (EntityId(idx as u32), e))
    }

    pub fn entities(&self) -> &[MapEntity] {
        &self.entities
    }

    /// Every entity carrying `alpha3`, in set order.
    pub fn ids_with_alpha3(&self, alpha3: &str) -> Vec<EntityId> {
        self.iter()
            .filter(|(_, e)| e.alpha3() == Some(alpha3))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn contains_numeric_id(&self, numeric_id: NumericId) -> bool {
        self.entities.iter().any(|e| e.numeric_id == numeric_id)
    }

    /// Builds unique-key lookups over attributed entities.
    ///
    /// Entities without attributes (disputed geometries) are not indexed and
    /// may share their numeric id.
    pub fn key_index(&self) -> Result<KeyIndex, DuplicateKey> {
        let mut index = KeyIndex::default();
        for (id, entity) in self.iter() {
            let Some(attrs) = &entity.attributes else {
                continue;
            };
            if index.numeric.insert(entity.numeric_id, id).is_some() {
                return Err(DuplicateKey {
                    kind: KeyKind::NumericId,
                    value: entity.numeric_id.to_string(),
                });
            }
            if index.alpha3.insert(attrs.alpha3_code.clone(), id).is_some() {
                return Err(DuplicateKey {
                    kind: KeyKind::Alpha3,
                    value: attrs.alpha3_code.clone(),
                });
            }
            if index.alpha2.insert(attrs.alpha2_code.clone(), id).is_some() {
                return Err(DuplicateKey {
                    kind: KeyKind::Alpha2,
                    value: attrs.alpha2_code.clone(),
                });
            }
        }
        Ok(index)
    }
}

/// Unique-key lookups produced by [`EntitySet::key_index`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct KeyIndex {
    numeric: BTreeMap<NumericId, EntityId>,
    alpha3: BTreeMap<String, EntityId>,
    alpha2: BTreeMap<String, EntityId>,
}

impl KeyIndex {
    pub fn by_numeric_id(&self, id: NumericId) -> Option<EntityId> {
        self.numeric.get(&id).copied()
    }

    pub fn by_alpha3(&self, alpha3: &str) -> Option<EntityId> {
        self.alpha3.get(alpha3).copied()
    }

    pub fn by_alpha2(&self, alpha2: &str) -> Option<EntityId> {
        self.alpha2.get(alpha2).copied()
    }

    pub fn len(&self) -> usize {
        self.alpha3.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alpha3.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{DuplicateKey, EntitySet, KeyKind};
    use crate::entity::{EntityAttributes, MapEntity};
    use crate::geometry::AreaGeometry;
    use foundation::NumericId;

    fn attributed(numeric: i32, alpha3: &str, alpha2: &str) -> MapEntity {
        MapEntity::new(NumericId::new(numeric), None, AreaGeometry::default()).with_attributes(
            EntityAttributes {
                name: alpha3.to_string(),
                capital: None,
                alpha3_code: alpha3.to_string(),
                alpha2_code: alpha2.to_string(),
                area: None,
                alt_spellings: Vec::new(),
                region_of: None,
            },
        )
    }

    #[test]
    fn spawn_preserves_order() {
        let mut set = EntitySet::new();
        let a = set.spawn(attributed(250, "FRA", "FR"));
        let b = set.spawn(attributed(528, "NLD", "NL"));
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(set.get(b).and_then(|e| e.alpha3()), Some("NLD"));
        assert_eq!(set.ids_with_alpha3("FRA"), vec![a]);
    }

    #[test]
    fn key_index_skips_unattributed_sentinels() {
        let mut set = EntitySet::new();
        set.spawn(MapEntity::new(NumericId::DISPUTED, Some(0), AreaGeometry::default()));
        set.spawn(MapEntity::new(NumericId::DISPUTED, Some(1), AreaGeometry::default()));
        let fra = set.spawn(attributed(250, "FRA", "FR"));

        let index = set.key_index().expect("index");
        assert_eq!(index.len(), 1);
        assert_eq!(index.by_alpha3("FRA"), Some(fra));
        assert_eq!(index.by_alpha2("FR"), Some(fra));
        assert_eq!(index.by_numeric_id(NumericId::new(250)), Some(fra));
        assert_eq!(index.by_numeric_id(NumericId::DISPUTED), None);
    }

    #[test]
    fn key_index_reports_duplicate_keys() {
        let mut set = EntitySet::new();
        set.spawn(attributed(250, "FRA", "FR"));
        set.spawn(attributed(251, "FRX", "FR"));
        assert_eq!(
            set.key_index().expect_err("duplicate"),
            DuplicateKey {
                kind: KeyKind::Alpha2,
                value: "FR".to_string()
            }
        );

        let mut set = EntitySet::new();
        set.spawn(attributed(250, "FRA", "FR"));
        set.spawn(attributed(250, "GUF", "GF"));
        let err = set.key_index().expect_err("duplicate");
        assert_eq!(err.kind, KeyKind::NumericId);
        assert_eq!(err.value, "250");
    }
}
