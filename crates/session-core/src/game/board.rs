use crate::api::types::{Position, Slot};

/// S×S grid of cell marks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Slot>>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    /// Rebuild a board from snapshot cells
    pub fn from_cells(size: usize, cells: Vec<Option<Slot>>) -> Self {
        debug_assert_eq!(cells.len(), size * size);
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major cell marks
    pub fn cells(&self) -> &[Option<Slot>] {
        &self.cells
    }

    fn index(&self, position: Position) -> Option<usize> {
        if position.row < self.size && position.col < self.size {
            Some(position.row * self.size + position.col)
        } else {
            None
        }
    }

    /// Cell mark at `position`; `None` if out of bounds
    pub fn cell(&self, position: Position) -> Option<Option<Slot>> {
        self.index(position).map(|i| self.cells[i])
    }

    /// Whether `position` is in bounds and unoccupied
    pub fn is_vacant(&self, position: Position) -> bool {
        matches!(self.cell(position), Some(None))
    }

    /// Place a mark; returns false for out-of-bounds or occupied positions,
    /// leaving the board untouched
    pub fn place(&mut self, position: Position, slot: Slot) -> bool {
        match self.index(position) {
            Some(i) if self.cells[i].is_none() => {
                self.cells[i] = Some(slot);
                true
            }
            _ => false,
        }
    }

    /// Win detector: a full row, column or diagonal held by one slot
    pub fn winner(&self) -> Option<Slot> {
        let s = self.size;
        let at = |r: usize, c: usize| self.cells[r * s + c];

        let line_winner = |cells: &mut dyn Iterator<Item = Option<Slot>>| -> Option<Slot> {
            let mut cells = cells.peekable();
            let first = (*cells.peek()?)?;
            cells.all(|c| c == Some(first)).then_some(first)
        };

        for r in 0..s {
            if let Some(w) = line_winner(&mut (0..s).map(|c| at(r, c))) {
                return Some(w);
            }
        }
        for c in 0..s {
            if let Some(w) = line_winner(&mut (0..s).map(|r| at(r, c))) {
                return Some(w);
            }
        }
        if let Some(w) = line_winner(&mut (0..s).map(|i| at(i, i))) {
            return Some(w);
        }
        line_winner(&mut (0..s).map(|i| at(i, s - 1 - i)))
    }

    /// Deterministic fallback move: the first vacant cell in row-major order
    pub fn fallback_move(&self) -> Option<Position> {
        self.cells.iter().position(|c| c.is_none()).map(|i| Position {
            row: i / self.size,
            col: i % self.size,
        })
    }
}
