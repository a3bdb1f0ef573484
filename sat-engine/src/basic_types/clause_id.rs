#![allow(clippy::double_parens, reason = "originates inside the bitfield macro")]

use std::fmt::Display;

use bitfield_struct::bitfield;

use crate::containers::StorageKey;

/// The identifier of a clause, handed out by a [`ClauseStore`](crate::clause_stores::ClauseStore).
///
/// The identifier packs two parts into 32 bits:
/// - the low 28 bits hold the slot of the clause inside the component store which owns it,
/// - the high 4 bits hold the index of that component inside a
///   [`CompositeClauseStore`](crate::clause_stores::CompositeClauseStore).
///
/// A stand-alone store always uses component 0.
#[bitfield(u32)]
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClauseId {
    #[bits(28)]
    pub slot: u32,
    #[bits(4)]
    pub component: u8,
}

impl ClauseId {
    /// The largest number of clauses a single component can hold.
    pub const MAX_SLOT: u32 = (1 << 28) - 1;
    /// The largest number of components a composite store can route between.
    pub const MAX_COMPONENTS: usize = 16;

    pub fn for_component(component: usize, slot: u32) -> ClauseId {
        ClauseId::new().with_component(component as u8).with_slot(slot)
    }
}

impl StorageKey for ClauseId {
    fn index(&self) -> usize {
        self.slot() as usize
    }

    fn create_from_index(index: usize) -> Self {
        ClauseId::for_component(0, index as u32)
    }
}

impl Display for ClauseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}.{}", self.component(), self.slot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_and_index_are_packed_independently() {
        let id = ClauseId::for_component(3, 12345);

        assert_eq!(3, id.component());
        assert_eq!(12345, id.slot());
        assert_eq!((3 << 28) | 12345, id.into_bits());
    }

    #[test]
    fn storage_key_is_the_slot() {
        let id = ClauseId::for_component(5, 42);

        assert_eq!(42, id.index());
        assert_eq!(0, ClauseId::create_from_index(42).component());
    }
}
