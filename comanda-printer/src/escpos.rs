//! ESC/POS command builder
//!
//! Provides a fluent API for building ESC/POS print data.

use crate::encoding::{blank_controls, convert_to_ascii, pad, truncate_ellipsis};

/// Print mode bits for `ESC ! n`
pub mod mode {
    /// Font A, normal size
    pub const NORMAL: u8 = 0x00;
    /// Font B (condensed)
    pub const FONT_B: u8 = 0x01;
    /// Double height
    pub const DOUBLE_HEIGHT: u8 = 0x10;
}

/// One cell of a fixed-width row
#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    pub text: &'a str,
    pub width: usize,
    pub align_right: bool,
}

impl<'a> Column<'a> {
    pub fn left(text: &'a str, width: usize) -> Self {
        Self {
            text,
            width,
            align_right: false,
        }
    }

    pub fn right(text: &'a str, width: usize) -> Self {
        Self {
            text,
            width,
            align_right: true,
        }
    }
}

/// ESC/POS command builder
///
/// Builds ESC/POS byte sequences for thermal printers.
/// Text is transliterated to printable ASCII on [`build`](Self::build).
pub struct EscPosBuilder {
    buf: Vec<u8>,
    width: usize,
}

impl EscPosBuilder {
    /// Create a new builder with the specified paper width in characters
    ///
    /// Common widths:
    /// - 58mm paper: 32 characters
    /// - 80mm paper: 48 characters
    pub fn new(width: usize) -> Self {
        let mut buf = Vec::with_capacity(2048);
        // Initialize printer (ESC @)
        buf.extend_from_slice(&[0x1B, 0x40]);
        Self { buf, width }
    }

    // === Text Output ===

    /// Write text (transliterated at build time)
    ///
    /// Control characters are blanked so text never carries commands.
    pub fn text(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(blank_controls(s).as_bytes());
        self
    }

    /// Write text followed by newline
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.buf.push(b'\n');
        self
    }

    /// Write empty line
    pub fn newline(&mut self) -> &mut Self {
        self.buf.push(b'\n');
        self
    }

    // === Alignment ===

    /// Align text to center
    pub fn center(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x01]);
        self
    }

    /// Align text to left (default)
    pub fn left(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0x00]);
        self
    }

    // === Text Style ===

    /// Select print mode (`ESC ! n`), see [`mode`]
    ///
    /// This also clears emphasis on most firmwares, so call
    /// [`bold`](Self::bold) after it.
    pub fn print_mode(&mut self, n: u8) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x21, n]);
        self
    }

    /// Font A, normal size
    pub fn normal(&mut self) -> &mut Self {
        self.print_mode(mode::NORMAL)
    }

    /// Condensed font B
    pub fn font_b(&mut self) -> &mut Self {
        self.print_mode(mode::FONT_B)
    }

    /// Double height
    pub fn double_height(&mut self) -> &mut Self {
        self.print_mode(mode::DOUBLE_HEIGHT)
    }

    /// Enable bold text
    pub fn bold(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0x01]);
        self
    }

    /// Disable bold text
    pub fn bold_off(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0x00]);
        self
    }

    // === Separators ===

    /// Print a line of '=' characters
    pub fn sep_double(&mut self) -> &mut Self {
        self.line(&"=".repeat(self.width))
    }

    /// Print a line of '-' characters
    pub fn sep_single(&mut self) -> &mut Self {
        self.line(&"-".repeat(self.width))
    }

    // === Layout Helpers ===

    /// Print a fixed-width row
    ///
    /// Each cell is padded to its width or truncated with an ellipsis.
    pub fn columns(&mut self, cells: &[Column<'_>]) -> &mut Self {
        let row: String = cells
            .iter()
            .map(|c| pad(c.text, c.width, c.align_right))
            .collect();
        self.line(row.trim_end())
    }

    /// Print two values side by side, each owning half of the paper width
    pub fn two_columns(&mut self, left: &str, right: &str) -> &mut Self {
        let left_width = self.width / 2;
        let right_width = self.width - left_width;
        let row = format!(
            "{}{}",
            pad(left, left_width, false),
            truncate_ellipsis(right, right_width)
        );
        self.line(row.trim_end())
    }

    // === Paper Control ===

    /// Feed and cut (`GS V A 16`)
    pub fn cut(&mut self) -> &mut Self {
        // GS V 65 n - Feed n dots then cut
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x41, 0x10]);
        self
    }

    // === Build ===

    /// Build the final byte buffer in printable ASCII
    pub fn build(self) -> Vec<u8> {
        convert_to_ascii(&self.buf)
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new(48)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basic() {
        let mut b = EscPosBuilder::new(32);
        b.center().double_height().line("COCINA").normal().left().line("Mesa 4");

        let data = b.build();
        assert_eq!(&data[..2], &[0x1B, 0x40]);
        assert!(data.windows(3).any(|w| w == [0x1B, 0x21, 0x10]));
        assert!(data.windows(3).any(|w| w == [0x1B, 0x61, 0x01]));
    }

    #[test]
    fn test_build_transliterates() {
        let mut b = EscPosBuilder::new(32);
        b.line("Jamón 3.50€");

        let data = b.build();
        let s = String::from_utf8(data[2..].to_vec()).unwrap();
        assert_eq!(s, "Jamon 3.50EUR\n");
    }

    #[test]
    fn test_separators() {
        let mut b = EscPosBuilder::new(10);
        b.sep_double().sep_single();

        let s = String::from_utf8(b.build()).unwrap();
        assert!(s.contains("==========\n"));
        assert!(s.contains("----------\n"));
    }

    #[test]
    fn test_columns() {
        let mut b = EscPosBuilder::new(48);
        b.columns(&[
            Column::left("2", 5),
            Column::left("Pizza Margherita", 31),
            Column::right("16.00€", 12),
        ]);

        let data = b.build();
        let s = String::from_utf8(data[2..].to_vec()).unwrap();
        let line = s.trim_end_matches('\n');
        assert_eq!(line.len(), 48);
        assert!(line.starts_with("2    Pizza Margherita"));
        assert!(line.ends_with("16.00EUR"));
    }

    #[test]
    fn test_columns_truncate() {
        let mut b = EscPosBuilder::new(20);
        b.columns(&[Column::left("1", 2), Column::left("Ensalada mediterranea", 10)]);

        let s = String::from_utf8(b.build()[2..].to_vec()).unwrap();
        assert_eq!(s, "1 Ensalad...\n");
    }

    #[test]
    fn test_two_columns() {
        let mut b = EscPosBuilder::new(24);
        b.two_columns("Mesa: 4", "Pedido: abc123");

        let s = String::from_utf8(b.build()[2..].to_vec()).unwrap();
        assert_eq!(s, "Mesa: 4     Pedido: a...\n");
    }

    #[test]
    fn test_text_cannot_inject_commands() {
        let mut b = EscPosBuilder::new(48);
        b.line("sin sal\x1dVA\x10\x1b@\nextra");
        b.columns(&[Column::left("1", 5), Column::left("Agua\r\ncon gas", 20)]);

        let data = b.build();
        let s = String::from_utf8(data[2..].to_vec()).unwrap();
        assert_eq!(s, "sin sal VA  @ extra\n1    Agua  con gas\n");
        assert!(!data[2..].contains(&0x1D));
        assert!(!data[2..].contains(&0x1B));
    }

    #[test]
    fn test_cut_bytes() {
        let mut b = EscPosBuilder::new(48);
        b.cut();
        assert_eq!(b.build(), vec![0x1B, 0x40, 0x1D, 0x56, 0x41, 0x10]);
    }
}
