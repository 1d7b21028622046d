//! Reserved control payloads of the session protocol

use std::fmt;

/// Sentinel byte that prefixes every control token
pub const COMMAND_CHAR: u8 = b'$';

/// One of the four reserved control payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Connect,
    Disconnect,
    Ack,
    Ping,
}

impl Token {
    pub const ALL: [Token; 4] = [Token::Connect, Token::Disconnect, Token::Ack, Token::Ping];

    /// Wire representation
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Token::Connect => b"$connect",
            Token::Disconnect => b"$unconnect",
            Token::Ack => b"$ok",
            Token::Ping => b"$ping",
        }
    }

    /// Recognise a control token by exact byte equality
    pub fn parse(data: &[u8]) -> Option<Token> {
        if data.first() != Some(&COMMAND_CHAR) {
            return None;
        }
        Token::ALL.into_iter().find(|t| t.as_bytes() == data)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_match_only() {
        for token in Token::ALL {
            assert_eq!(Token::parse(token.as_bytes()), Some(token));
            assert_eq!(token.as_bytes()[0], COMMAND_CHAR);
        }
        assert_eq!(Token::parse(b"$ok "), None);
        assert_eq!(Token::parse(b"$pin"), None);
        assert_eq!(Token::parse(b"ping"), None);
        assert_eq!(Token::parse(b""), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Token::Disconnect.to_string(), "$unconnect");
    }
}
