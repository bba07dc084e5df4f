//! Subplot grid sizing.

/// A `rows × cols` grid holding `num_subplots` panels in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    pub num_subplots: usize,
}

impl GridLayout {
    /// Near-square grid: `rows = round(sqrt(n))`, `cols = ceil(n / rows)`.
    pub fn for_subplots(num_subplots: usize) -> Self {
        if num_subplots == 0 {
            return GridLayout {
                rows: 0,
                cols: 0,
                num_subplots,
            };
        }
        let rows = ((num_subplots as f64).sqrt().round() as usize).max(1);
        let cols = num_subplots.div_ceil(rows);
        GridLayout {
            rows,
            cols,
            num_subplots,
        }
    }

    /// Total number of allocated cells, used or not.
    pub fn cells(&self) -> usize {
        self.rows * self.cols
    }

    /// (row, col) of subplot `index`.
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    /// Indices of the cells that keep a panel; trailing cells are discarded.
    pub fn used_cells(&self) -> std::ops::Range<usize> {
        0..self.num_subplots
    }
}
