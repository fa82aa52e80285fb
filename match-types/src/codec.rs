//! Wire codec for board snapshots.
//!
//! A board travels as a compact JSON array of nine elements, each `null`,
//! `"X"` or `"O"`, encoded as UTF-8. Every move carries the whole board, so
//! a receiver never has to merge partial updates.
//!
//! The relay may hand inbound data over either as raw bytes or as an already
//! decoded string; [`Payload`] keeps that distinction explicit.

use serde_json::Value;

use crate::{Board, Mark, MalformedPayload, BOARD_CELLS};

/// Inbound match data as delivered by the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Raw bytes (expected to be UTF-8 JSON).
    Bytes(Vec<u8>),
    /// Text already decoded by the transport.
    Text(String),
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl Payload {
    /// Length of the payload in bytes.
    pub fn len(&self) -> usize {
        match self {
            Payload::Bytes(b) => b.len(),
            Payload::Text(s) => s.len(),
        }
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Encode a board as UTF-8 JSON bytes.
pub fn encode(board: &Board) -> Vec<u8> {
    to_json(board).to_string().into_bytes()
}

/// Decode a payload into a board.
///
/// Bytes are first decoded as UTF-8, then the text is parsed as JSON and
/// validated: it must be an array of exactly nine elements, each `null`,
/// `"X"` or `"O"`.
pub fn decode(payload: &Payload) -> Result<Board, MalformedPayload> {
    match payload {
        Payload::Bytes(bytes) => {
            let text = String::from_utf8(bytes.clone()).map_err(MalformedPayload::InvalidUtf8)?;
            decode_str(&text)
        }
        Payload::Text(text) => decode_str(text),
    }
}

/// Decode a JSON string into a board.
pub fn decode_str(text: &str) -> Result<Board, MalformedPayload> {
    let value: Value = serde_json::from_str(text).map_err(MalformedPayload::InvalidJson)?;
    from_json(&value)
}

fn to_json(board: &Board) -> Value {
    Value::Array(
        board
            .cells()
            .iter()
            .map(|cell| match cell {
                Some(mark) => Value::String(mark.as_str().to_string()),
                None => Value::Null,
            })
            .collect(),
    )
}

fn from_json(value: &Value) -> Result<Board, MalformedPayload> {
    let items = value.as_array().ok_or(MalformedPayload::NotAnArray)?;
    if items.len() != BOARD_CELLS {
        return Err(MalformedPayload::WrongLength(items.len()));
    }

    let mut cells = [None; BOARD_CELLS];
    for (index, item) in items.iter().enumerate() {
        cells[index] = match item {
            Value::Null => None,
            Value::String(s) => Some(Mark::from_wire(s).ok_or_else(|| {
                MalformedPayload::InvalidCell {
                    index,
                    value: item.to_string(),
                }
            })?),
            other => {
                return Err(MalformedPayload::InvalidCell {
                    index,
                    value: other.to_string(),
                })
            }
        };
    }
    Ok(Board::from_cells(cells))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(cells: &str) -> Board {
        let mut out = [None; BOARD_CELLS];
        for (i, c) in cells.chars().enumerate() {
            out[i] = match c {
                'X' => Some(Mark::X),
                'O' => Some(Mark::O),
                _ => None,
            };
        }
        Board::from_cells(out)
    }

    // ===========================================
    // Encoding Tests
    // ===========================================

    #[test]
    fn encodes_empty_board_as_nulls() {
        let bytes = encode(&Board::new());
        assert_eq!(
            bytes,
            b"[null,null,null,null,null,null,null,null,null]".to_vec()
        );
    }

    #[test]
    fn encodes_marks_as_strings() {
        let bytes = encode(&board("____X____"));
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"[null,null,null,null,"X",null,null,null,null]"#
        );
    }

    #[test]
    fn snapshot_survives_encode_decode() {
        let original = board("XOX_O_X_O");
        let decoded = decode(&Payload::Bytes(encode(&original))).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn every_board_survives_encode_decode() {
        let marks = [None, Some(Mark::X), Some(Mark::O)];
        let total = 3usize.pow(BOARD_CELLS as u32);
        for n in 0..total {
            let mut cells = [None; BOARD_CELLS];
            let mut rest = n;
            for cell in cells.iter_mut() {
                *cell = marks[rest % 3];
                rest /= 3;
            }
            let original = Board::from_cells(cells);
            let decoded = decode(&Payload::Bytes(encode(&original)));
            assert_eq!(decoded.ok(), Some(original), "board #{}", n);
        }
    }

    // ===========================================
    // Decoding Tests
    // ===========================================

    #[test]
    fn decodes_bytes() {
        let payload = Payload::from(br#"["X","O","X","X","O","O","X",null,null]"#.as_slice());
        let decoded = decode(&payload).unwrap();
        assert_eq!(decoded, board("XOXXOOX__"));
    }

    #[test]
    fn decodes_pre_decoded_string() {
        let payload = Payload::from(r#"["X","O","X","X","O","O","X",null,null]"#);
        let decoded = decode(&payload).unwrap();
        assert_eq!(decoded, board("XOXXOOX__"));
    }

    #[test]
    fn tolerates_whitespace() {
        let decoded = decode_str("[ null, \"X\", null, null, null, null, null, null, null ]\n")
            .unwrap();
        assert_eq!(decoded.get(1), Some(Mark::X));
    }

    // ===========================================
    // Malformed Input Tests
    // ===========================================

    #[test]
    fn rejects_invalid_utf8() {
        let result = decode(&Payload::Bytes(vec![0xff, 0xfe, 0x5b]));
        assert!(matches!(result, Err(MalformedPayload::InvalidUtf8(_))));
    }

    #[test]
    fn rejects_non_json() {
        let result = decode(&Payload::from("not json"));
        assert!(matches!(result, Err(MalformedPayload::InvalidJson(_))));
    }

    #[test]
    fn rejects_non_array() {
        let result = decode_str(r#"{"board":[]}"#);
        assert!(matches!(result, Err(MalformedPayload::NotAnArray)));
    }

    #[test]
    fn rejects_short_array() {
        let result = decode_str(r#"["X",null]"#);
        assert!(matches!(result, Err(MalformedPayload::WrongLength(2))));
    }

    #[test]
    fn rejects_long_array() {
        let result = decode_str("[null,null,null,null,null,null,null,null,null,null]");
        assert!(matches!(result, Err(MalformedPayload::WrongLength(10))));
    }

    #[test]
    fn rejects_unknown_symbol() {
        let result = decode_str(r#"[null,null,"Z",null,null,null,null,null,null]"#);
        match result {
            Err(MalformedPayload::InvalidCell { index, value }) => {
                assert_eq!(index, 2);
                assert_eq!(value, "\"Z\"");
            }
            other => panic!("Expected InvalidCell, got {:?}", other),
        }
    }

    #[test]
    fn rejects_lowercase_symbol() {
        let result = decode_str(r#"["x",null,null,null,null,null,null,null,null]"#);
        assert!(matches!(
            result,
            Err(MalformedPayload::InvalidCell { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_non_string_element() {
        let result = decode_str("[1,null,null,null,null,null,null,null,null]");
        assert!(matches!(
            result,
            Err(MalformedPayload::InvalidCell { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(decode(&Payload::Bytes(Vec::new())).is_err());
        assert!(Payload::Text(String::new()).is_empty());
    }
}
