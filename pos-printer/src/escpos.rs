//! ESC/POS byte stream
//!
//! Only the handful of commands a sale receipt needs. Text is encoded to
//! Windows-1252 on the way in, so what the builder holds is exactly what
//! goes to the printer.

use crate::encoding::encode_cp1252;

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;
const LF: u8 = b'\n';

/// `ESC t` table 16: WPC1252 (Windows Latin-1)
pub const CODE_PAGE_WPC1252: u8 = 0x10;

/// Horizontal justification (`ESC a n`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left = 0,
    Center = 1,
}

/// Accumulates commands and text into one flat buffer
#[derive(Debug, Clone)]
pub struct EscPosBuilder {
    buf: Vec<u8>,
}

impl EscPosBuilder {
    /// Start a stream with `ESC @` (initialize printer)
    pub fn new() -> Self {
        let mut builder = Self {
            buf: Vec::with_capacity(256),
        };
        builder.init();
        builder
    }

    fn cmd(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// `ESC @`
    pub fn init(&mut self) -> &mut Self {
        self.cmd(&[ESC, b'@'])
    }

    /// `ESC t n`
    pub fn code_page(&mut self, table: u8) -> &mut Self {
        self.cmd(&[ESC, b't', table])
    }

    /// `ESC a n`
    pub fn align(&mut self, align: Align) -> &mut Self {
        self.cmd(&[ESC, b'a', align as u8])
    }

    /// `ESC E n`
    pub fn bold(&mut self, on: bool) -> &mut Self {
        self.cmd(&[ESC, b'E', u8::from(on)])
    }

    /// `GS ! n` with the double-height bit, or back to normal size
    pub fn double_height(&mut self, on: bool) -> &mut Self {
        self.cmd(&[GS, b'!', u8::from(on)])
    }

    /// Append text; control and unmappable characters never reach the stream
    pub fn text(&mut self, s: &str) -> &mut Self {
        let encoded = encode_cp1252(s);
        self.cmd(&encoded)
    }

    /// Append text and a line feed
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s).newline()
    }

    pub fn newline(&mut self) -> &mut Self {
        self.cmd(&[LF])
    }

    /// `ESC d n`: print and feed `lines` lines
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        self.cmd(&[ESC, b'd', lines])
    }

    /// `GS V 0`: full cut
    pub fn cut(&mut self) -> &mut Self {
        self.cmd(&[GS, b'V', 0x00])
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new()
    }
}
