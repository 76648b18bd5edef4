//! Connectivity and mirroring on the 3x3 grid.

use std::collections::VecDeque;

use cogbat_core::Cells;

const SIDE: usize = 3;

/// Edge-adjacent cells of `idx`, without wraparound.
fn neighbors(idx: usize) -> impl Iterator<Item = usize> {
    let (r, c) = (idx / SIDE, idx % SIDE);
    [
        (r > 0).then(|| idx - SIDE),
        (r + 1 < SIDE).then(|| idx + SIDE),
        (c > 0).then(|| idx - 1),
        (c + 1 < SIDE).then(|| idx + 1),
    ]
    .into_iter()
    .flatten()
}

pub fn filled_count(cells: &Cells) -> usize {
    cells.iter().filter(|&&c| c).count()
}

/// True iff every filled cell reaches every other one through 4-neighbor steps.
/// Zero or one filled cell is connected.
pub fn is_connected(cells: &Cells) -> bool {
    let Some(first) = cells.iter().position(|&c| c) else {
        return true;
    };
    let mut seen = [false; 9];
    seen[first] = true;
    let mut reached = 1;
    let mut queue = VecDeque::from([first]);
    while let Some(cur) = queue.pop_front() {
        for n in neighbors(cur) {
            if cells[n] && !seen[n] {
                seen[n] = true;
                reached += 1;
                queue.push_back(n);
            }
        }
    }
    reached == filled_count(cells)
}

/// Reflects across the vertical center axis (left column swaps with right).
pub fn mirror_vertical(cells: &Cells) -> Cells {
    let mut out = *cells;
    for r in 0..SIDE {
        out[r * SIDE] = cells[r * SIDE + 2];
        out[r * SIDE + 2] = cells[r * SIDE];
    }
    out
}

/// Reflects across the horizontal center axis (top row swaps with bottom).
pub fn mirror_horizontal(cells: &Cells) -> Cells {
    let mut out = *cells;
    for c in 0..SIDE {
        out[c] = cells[2 * SIDE + c];
        out[2 * SIDE + c] = cells[c];
    }
    out
}

pub fn full_column(col: usize) -> Cells {
    let mut cells = [false; 9];
    for r in 0..SIDE {
        cells[r * SIDE + col] = true;
    }
    cells
}

pub fn full_row(row: usize) -> Cells {
    let mut cells = [false; 9];
    for c in 0..SIDE {
        cells[row * SIDE + c] = true;
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(pattern: &str) -> Cells {
        let mut cells = [false; 9];
        for (i, ch) in pattern.chars().filter(|c| !c.is_whitespace()).enumerate() {
            cells[i] = ch == '#';
        }
        cells
    }

    #[test]
    fn empty_and_single_cells_are_connected() {
        assert!(is_connected(&[false; 9]));
        assert!(is_connected(&grid("... .#. ...")));
    }

    #[test]
    fn diagonals_do_not_connect() {
        assert!(!is_connected(&grid("#.. .#. ...")));
        assert!(is_connected(&grid("##. .#. ...")));
    }

    #[test]
    fn no_wraparound_between_rows() {
        // cell 2 (end of row 0) and cell 3 (start of row 1) are not adjacent
        assert!(!is_connected(&grid("..# #.. ...")));
    }

    #[test]
    fn l_and_u_shapes() {
        assert!(is_connected(&grid("#.. #.. ###")));
        assert!(is_connected(&grid("#.# #.# ###")));
        assert!(!is_connected(&grid("#.# ... #.#")));
    }

    #[test]
    fn mirrors_are_involutions() {
        let g = grid("##. #.. ..#");
        assert_eq!(mirror_vertical(&mirror_vertical(&g)), g);
        assert_eq!(mirror_horizontal(&mirror_horizontal(&g)), g);
        assert_eq!(mirror_vertical(&g), grid(".## ..# #.."));
        assert_eq!(mirror_horizontal(&g), grid("..# #.. ##."));
    }

    #[test]
    fn lines_are_full() {
        assert_eq!(full_column(1), grid(".#. .#. .#."));
        assert_eq!(full_row(2), grid("... ... ###"));
    }
}
