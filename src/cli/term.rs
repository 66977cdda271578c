//! VT100 sequences and the control bytes the line editor understands.

/// Cursor to row 1, column 1.
pub const HOME: &str = "\x1b[H";
/// Erase the whole screen.
pub const CLEAR: &str = "\x1b[2J";
/// Erase from the cursor to the end of the line.
pub const CLEAR_EOL: &str = "\x1b[K";
/// Erase from the cursor to the end of the screen.
pub const CLEAR_EOS: &str = "\x1b[J";

/// Printed before every fresh input line.
pub const PROMPT: &str = "\r\n> ";
/// Start of the prompt line when repainting in place.
pub const PROMPT_REPAINT: &str = "\r> ";

/// Ctrl-C: discard the line.
pub const INTR: u8 = 0x03;
/// Backspace.
pub const BS: u8 = 0x08;
/// Emitted when a byte is rejected.
pub const BELL: u8 = 0x07;
