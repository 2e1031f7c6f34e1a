#![forbid(unsafe_code)]

mod lexer;
mod token;

pub use lexer::{LexError, Lexer};
pub use token::{Token, TokenKind};

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut l = Lexer::new_in_code_mode(src);
        let mut out = Vec::new();
        loop {
            let t = l.next_token().expect("token");
            let kind = t.kind;
            out.push(kind);
            if kind == TokenKind::Eof {
                return out;
            }
        }
    }

    #[test]
    fn lex_string_escapes() {
        let mut l = Lexer::new_in_code_mode(r#""a\n\t\r\\\"\'b""#);
        let t = l.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::Str);
        assert_eq!(t.literal, "a\n\t\r\\\"'b");
    }

    #[test]
    fn lex_keeps_unknown_escape_verbatim() {
        let mut l = Lexer::new_in_code_mode(r#""a\qb""#);
        let t = l.next_token().unwrap();
        assert_eq!(t.literal, "a\\qb");
    }

    #[test]
    fn lex_escaped_backslash_before_closing_quote() {
        let mut l = Lexer::new_in_code_mode(r#""x\\""#);
        let t = l.next_token().unwrap();
        assert_eq!(t.literal, "x\\");
        assert_eq!(l.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn lex_two_char_operators_win_over_one_char() {
        assert_eq!(
            kinds("== != <= >= || && = ! < >"),
            vec![
                TokenKind::Equal,
                TokenKind::NotEqual,
                TokenKind::LessOrEqual,
                TokenKind::GreaterOrEqual,
                TokenKind::Or,
                TokenKind::And,
                TokenKind::Assign,
                TokenKind::Bang,
                TokenKind::LessThan,
                TokenKind::GreaterThan,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_rejects_illegal_rune() {
        let mut l = Lexer::new_in_code_mode("= + @");
        l.next_token().unwrap();
        l.next_token().unwrap();
        let err = l.next_token().unwrap_err();
        assert!(err.message.contains("illegal token found: '@' (ILLEGAL)"));
        assert_eq!(err.line(), 1);
        assert_eq!(err.column(), 5);
    }

    #[test]
    fn lex_rejects_delimiters_when_started_in_code_mode() {
        let err = Lexer::new_in_code_mode("1 %> 2").next_token().err();
        assert!(err.is_none());

        let mut l = Lexer::new_in_code_mode("1 %> 2");
        l.next_token().unwrap();
        let err = l.next_token().unwrap_err();
        assert!(err.message.contains("'%>' (ILLEGAL)"));
    }
}
