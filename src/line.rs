//! Line framing for the wire protocol.
//!
//! Input arrives as raw read chunks and is framed into one trimmed line
//! per chunk; output is normalized so every line leaving the server ends
//! in exactly one CRLF. A chunk containing embedded newlines is kept as
//! one undifferentiated line rather than split into several; this matches
//! the no-reassembly read model (each chunk is an independent line).

/// Size of the per-connection read buffer in bytes.
///
/// Input longer than this arrives as separate chunks and is treated as
/// separate lines.
pub const READ_BUFFER_SIZE: usize = 256;

/// Maximum outbound line length in bytes, CRLF terminator included.
pub const MAX_WIRE_LINE: usize = 1024;

/// Frame one raw read chunk into a line.
///
/// Decodes lossily as UTF-8 and strips all trailing CR/LF bytes. Embedded
/// newlines are preserved.
pub fn frame(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    text.trim_end_matches(['\r', '\n']).to_string()
}

/// Encode a line for the wire.
///
/// Strips any trailing CR/LF the caller produced, truncates to fit
/// [`MAX_WIRE_LINE`] with room for the terminator, and appends exactly
/// one CRLF.
pub fn wire(text: &str) -> Vec<u8> {
    let trimmed = text.trim_end_matches(['\r', '\n']);

    let mut cut = trimmed.len().min(MAX_WIRE_LINE - 2);
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }

    let mut out = Vec::with_capacity(cut + 2);
    out.extend_from_slice(trimmed[..cut].as_bytes());
    out.extend_from_slice(b"\r\n");
    out
}
