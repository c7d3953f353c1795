/// A fixed size matrix of bits, one `u32` per row. Used to keep track of
/// which matrix positions are currently held down.
#[derive(Debug, Clone)]
pub struct BitMatrix<const ROWS: usize, const COLS: usize> {
    buf: [u32; ROWS],
}

impl<const ROWS: usize, const COLS: usize> BitMatrix<ROWS, COLS> {
    const fn assert_config_ok() {
        assert!(COLS <= u32::BITS as usize, "BitMatrix supports up to 32 columns");
    }

    pub const fn new() -> Self {
        const { Self::assert_config_ok() };

        Self { buf: [0; ROWS] }
    }

    pub fn get_value(&self, row: usize, col: usize) -> bool {
        assert!(row < ROWS, "Row out of bounds");
        assert!(col < COLS, "Col out of bounds");

        (self.buf[row] & (1 << col)) != 0
    }

    /// Sets the value of a bit. Returns [`true`] if the value actually
    /// changed.
    pub fn set_value(&mut self, row: usize, col: usize, value: bool) -> bool {
        assert!(row < ROWS, "Row out of bounds");
        assert!(col < COLS, "Col out of bounds");

        let prev = self.buf[row];
        if value {
            self.buf[row] |= 1 << col;
        } else {
            self.buf[row] &= !(1 << col);
        }
        prev != self.buf[row]
    }

    pub fn count_ones(&self) -> u32 {
        self.buf.iter().map(|row| row.count_ones()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.iter().all(|row| *row == 0)
    }
}

impl<const ROWS: usize, const COLS: usize> Default for BitMatrix<ROWS, COLS> {
    fn default() -> Self {
        Self::new()
    }
}
