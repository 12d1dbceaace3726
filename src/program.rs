//! Program model
//!
//! Tracks the live set of placed blocks. The set is unordered from the
//! user's perspective; execution order is derived by the engine at run
//! time, keeping this model side-effect-free and presentation-agnostic.

use uuid::Uuid;

use crate::types::{Block, BlockKind, Position};

/// The full set of currently placed blocks.
///
/// Invariant: block ids are unique within a program (fresh UUID per add).
#[derive(Debug, Clone, Default)]
pub struct Program {
    blocks: Vec<Block>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a new block. Always succeeds; overlapping positions are
    /// permitted. Returns a copy of the created block.
    pub fn add_block(&mut self, kind: BlockKind, position: Position) -> Block {
        let block = Block::new(kind, position);
        self.blocks.push(block.clone());
        block
    }

    /// Remove the block with the given id. No-op if absent.
    pub fn remove_block(&mut self, id: Uuid) {
        self.blocks.retain(|block| block.id != id);
    }

    /// Empty the block set. Used by reset.
    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Blocks in insertion order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_block_assigns_unique_ids() {
        let mut program = Program::new();
        let a = program.add_block(BlockKind::Move, Position { x: 0.0, y: 0.0 });
        let b = program.add_block(BlockKind::Move, Position { x: 0.0, y: 0.0 });

        assert_ne!(a.id, b.id);
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn add_block_uses_kind_defaults() {
        let mut program = Program::new();
        let block = program.add_block(BlockKind::Wait, Position { x: 3.0, y: 7.0 });

        assert_eq!(block.label, "Wait 1 second");
        assert_eq!(block.params, BlockKind::Wait.default_params());
        assert_eq!(block.position, Position { x: 3.0, y: 7.0 });
    }

    #[test]
    fn remove_block_is_idempotent() {
        let mut program = Program::new();
        let block = program.add_block(BlockKind::Turn, Position { x: 0.0, y: 0.0 });

        program.remove_block(block.id);
        assert!(program.is_empty());

        // Removing again is a no-op, not an error.
        program.remove_block(block.id);
        assert!(program.is_empty());
    }

    #[test]
    fn clear_empties_the_set() {
        let mut program = Program::new();
        program.add_block(BlockKind::Move, Position { x: 0.0, y: 1.0 });
        program.add_block(BlockKind::Turn, Position { x: 0.0, y: 2.0 });

        program.clear();

        assert!(program.is_empty());
        assert_eq!(program.len(), 0);
    }

    #[test]
    fn overlapping_positions_are_permitted() {
        let mut program = Program::new();
        program.add_block(BlockKind::Move, Position { x: 5.0, y: 5.0 });
        program.add_block(BlockKind::Turn, Position { x: 5.0, y: 5.0 });

        assert_eq!(program.len(), 2);
    }
}
