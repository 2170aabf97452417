// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Mermaido and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use thiserror::Error;

pub(crate) const HORIZONTAL: char = '─';
pub(crate) const VERTICAL: char = '│';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CanvasError {
    #[error("canvas area overflow: {width}*{height}")]
    AreaOverflow { width: usize, height: usize },
    #[error("out of bounds: ({x},{y}) for {width}x{height} canvas")]
    OutOfBounds { x: usize, y: usize, width: usize, height: usize },
}

/// Which sides of a cell a box-drawing glyph connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Edges(u8);

impl Edges {
    pub(crate) const NONE: Self = Self(0);
    pub(crate) const LEFT: Self = Self(1);
    pub(crate) const RIGHT: Self = Self(1 << 1);
    pub(crate) const UP: Self = Self(1 << 2);
    pub(crate) const DOWN: Self = Self(1 << 3);

    fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn of(ch: char) -> Option<Self> {
        let edges = match ch {
            '─' => Self::LEFT.union(Self::RIGHT),
            '│' => Self::UP.union(Self::DOWN),
            '┌' => Self::RIGHT.union(Self::DOWN),
            '┐' => Self::LEFT.union(Self::DOWN),
            '└' => Self::RIGHT.union(Self::UP),
            '┘' => Self::LEFT.union(Self::UP),
            '├' => Self::UP.union(Self::DOWN).union(Self::RIGHT),
            '┤' => Self::UP.union(Self::DOWN).union(Self::LEFT),
            '┬' => Self::LEFT.union(Self::RIGHT).union(Self::DOWN),
            '┴' => Self::LEFT.union(Self::RIGHT).union(Self::UP),
            '┼' => Self::LEFT.union(Self::RIGHT).union(Self::UP).union(Self::DOWN),
            _ => return None,
        };
        Some(edges)
    }

    fn glyph(self) -> char {
        match self.0 {
            0 => ' ',
            1..=3 => '─',
            4 | 8 | 12 => '│',
            10 => '┌',
            9 => '┐',
            6 => '└',
            5 => '┘',
            14 => '├',
            13 => '┤',
            11 => '┬',
            7 => '┴',
            _ => '┼',
        }
    }
}

/// Fixed-size character grid.
///
/// Plain characters overwrite. Box-drawing characters merge with whatever box edges the cell
/// already has, so a message line crossing a lifeline becomes `┼`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<char>,
    edges: Vec<Edges>,
}

impl Canvas {
    pub(crate) fn new(width: usize, height: usize) -> Result<Self, CanvasError> {
        let len = width.checked_mul(height).ok_or(CanvasError::AreaOverflow { width, height })?;
        Ok(Self { width, height, cells: vec![' '; len], edges: vec![Edges::NONE; len] })
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn height(&self) -> usize {
        self.height
    }

    fn index_of(&self, x: usize, y: usize) -> Result<usize, CanvasError> {
        if x >= self.width || y >= self.height {
            return Err(CanvasError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y * self.width + x)
    }

    pub(crate) fn get(&self, x: usize, y: usize) -> Result<char, CanvasError> {
        let idx = self.index_of(x, y)?;
        let edges = self.edges[idx];
        Ok(if edges.is_empty() { self.cells[idx] } else { edges.glyph() })
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, ch: char) -> Result<(), CanvasError> {
        let idx = self.index_of(x, y)?;
        match Edges::of(ch) {
            Some(edges) => self.edges[idx] = self.edges[idx].union(edges),
            None => {
                self.cells[idx] = ch;
                self.edges[idx] = Edges::NONE;
            }
        }
        Ok(())
    }

    pub(crate) fn add_edges(&mut self, x: usize, y: usize, edges: Edges) -> Result<(), CanvasError> {
        let idx = self.index_of(x, y)?;
        self.edges[idx] = self.edges[idx].union(edges);
        Ok(())
    }

    /// Writes `ch` only where the cell is still blank.
    pub(crate) fn fill_blank(&mut self, x: usize, y: usize, ch: char) -> Result<(), CanvasError> {
        let idx = self.index_of(x, y)?;
        if self.edges[idx].is_empty() && self.cells[idx] == ' ' {
            self.cells[idx] = ch;
        }
        Ok(())
    }

    /// Writes `text` from `(x, y)`, clipped at the right edge.
    pub(crate) fn write_str(&mut self, x: usize, y: usize, text: &str) -> Result<(), CanvasError> {
        if y >= self.height {
            return Err(CanvasError::OutOfBounds { x, y, width: self.width, height: self.height });
        }
        for (offset, ch) in text.chars().enumerate() {
            let cx = x + offset;
            if cx >= self.width {
                break;
            }
            self.set(cx, y, ch)?;
        }
        Ok(())
    }

    pub(crate) fn draw_hline(&mut self, x0: usize, x1: usize, y: usize) -> Result<(), CanvasError> {
        let (min_x, max_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        for x in min_x..=max_x {
            self.set(x, y, HORIZONTAL)?;
        }
        Ok(())
    }

    pub(crate) fn draw_vline(&mut self, x: usize, y0: usize, y1: usize) -> Result<(), CanvasError> {
        let (min_y, max_y) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        for y in min_y..=max_y {
            self.set(x, y, VERTICAL)?;
        }
        Ok(())
    }

    pub(crate) fn draw_box(
        &mut self,
        x0: usize,
        y0: usize,
        x1: usize,
        y1: usize,
    ) -> Result<(), CanvasError> {
        for x in (x0 + 1)..x1 {
            self.set(x, y0, HORIZONTAL)?;
            self.set(x, y1, HORIZONTAL)?;
        }
        for y in (y0 + 1)..y1 {
            self.set(x0, y, VERTICAL)?;
            self.set(x1, y, VERTICAL)?;
        }
        self.set(x0, y0, '┌')?;
        self.set(x1, y0, '┐')?;
        self.set(x0, y1, '└')?;
        self.set(x1, y1, '┘')?;
        Ok(())
    }

    /// Rows with trailing blanks removed; trailing empty rows are dropped.
    pub(crate) fn to_lines(&self) -> Vec<String> {
        let mut lines = (0..self.height)
            .map(|y| {
                let line = (0..self.width)
                    .map(|x| self.get(x, y).unwrap_or(' '))
                    .collect::<String>();
                line.trim_end_matches(' ').to_owned()
            })
            .collect::<Vec<_>>();
        while matches!(lines.last(), Some(line) if line.is_empty()) {
            lines.pop();
        }
        lines
    }
}
