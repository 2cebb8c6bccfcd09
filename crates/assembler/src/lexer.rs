// Copyright (c) 2026, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! §4.1 Lexer: source text in, non-empty comment-stripped upper-cased lines
//! out. No tokenization beyond this — splitting operands is the parser's job.

/// One physical source line that survived comment-stripping and
/// blank-line removal, tagged with its original (1-based) line number so
/// later errors can point back at the source the user wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedLine {
    pub line_no: usize,
    pub text: String,
}

pub fn lex(source: &str) -> Vec<LexedLine> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| {
            let without_comment = match raw.find(';') {
                Some(pos) => &raw[..pos],
                None => raw,
            };
            let trimmed = without_comment.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(LexedLine {
                    line_no: index + 1,
                    text: trimmed.to_uppercase(),
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_blank_lines() {
        let lines = lex("mov ax, 5 ; load five\n\n   \nhlt");
        assert_eq!(
            lines,
            vec![
                LexedLine { line_no: 1, text: "MOV AX, 5".to_string() },
                LexedLine { line_no: 4, text: "HLT".to_string() },
            ]
        );
    }

    #[test]
    fn a_line_that_is_only_a_comment_disappears() {
        assert!(lex("; just a comment").is_empty());
    }

    #[test]
    fn preserves_original_line_numbers_across_removed_lines() {
        let lines = lex("NOP\n\nNOP");
        assert_eq!(lines[1].line_no, 3);
    }
}
