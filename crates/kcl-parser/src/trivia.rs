//! Attaches lexer-collected trivia to the statements that surround it (spec
//! invariant 6). A comment/blank-run before the first statement, or after
//! the last, belongs to the `Program` itself; everything else attaches as
//! leading trivia on the following statement, unless it is a comment on the
//! same source line as the previous statement, in which case it trails it.

use kcl_ast::Program;
use kcl_common::{LineIndex, TriviaItem};

pub fn attach_trivia(program: &mut Program, trivia: Vec<TriviaItem>, line_index: &LineIndex) {
    if program.statements.is_empty() {
        program.leading_trivia = trivia;
        return;
    }

    let first_start = program.statements[0].range.start;
    let last_end = program.statements.last().unwrap().range.end;

    for item in trivia {
        let range = item.range();

        if range.end <= first_start {
            program.leading_trivia.push(item);
            continue;
        }
        if range.start >= last_end {
            program.trailing_trivia.push(item);
            continue;
        }

        let next_idx = program.statements.partition_point(|s| s.range.start < range.start);

        if next_idx > 0 {
            let prev_end = program.statements[next_idx - 1].range.end;
            let same_line = line_index.offset_to_position(prev_end).line
                == line_index.offset_to_position(range.start).line;
            if same_line && matches!(item, TriviaItem::Comment { .. }) {
                program.statements[next_idx - 1].trivia.trailing = Some(item);
                continue;
            }
        }

        if next_idx < program.statements.len() {
            program.statements[next_idx].trivia.leading.push(item);
        } else {
            program.trailing_trivia.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kcl_ast::{Stmt, StmtKind};
    use kcl_common::Range;

    fn stmt(start: u32, end: u32) -> Stmt {
        Stmt::new(StmtKind::Return(None), Range::new(start, end))
    }

    #[test]
    fn leading_comment_before_first_statement_goes_to_program() {
        let mut program = Program { statements: vec![stmt(20, 25)], ..Default::default() };
        let line_index = LineIndex::new("// hi\n\nreturn");
        let trivia = vec![TriviaItem::Comment { text: " hi".into(), is_block: false, range: Range::new(0, 5) }];
        attach_trivia(&mut program, trivia, &line_index);
        assert_eq!(program.leading_trivia.len(), 1);
        assert!(program.statements[0].trivia.leading.is_empty());
    }

    #[test]
    fn same_line_comment_trails_previous_statement() {
        let mut program = Program {
            statements: vec![stmt(0, 9), stmt(30, 39)],
            ..Default::default()
        };
        let source = "let x = 1 // note\nlet y = 2";
        let line_index = LineIndex::new(source);
        let comment_start = source.find("//").unwrap() as u32;
        let trivia = vec![TriviaItem::Comment {
            text: " note".into(),
            is_block: false,
            range: Range::new(comment_start, source.len() as u32 - 10),
        }];
        attach_trivia(&mut program, trivia, &line_index);
        assert!(program.statements[0].trivia.trailing.is_some());
        assert!(program.statements[1].trivia.leading.is_empty());
    }

    #[test]
    fn comment_on_its_own_line_leads_next_statement() {
        let mut program = Program {
            statements: vec![stmt(0, 9), stmt(20, 29)],
            ..Default::default()
        };
        let trivia = vec![TriviaItem::Comment { text: " note".into(), is_block: false, range: Range::new(10, 16) }];
        let line_index = LineIndex::new("let x = 1\n// note\nlet y = 2");
        attach_trivia(&mut program, trivia, &line_index);
        assert!(program.statements[0].trivia.trailing.is_none());
        assert_eq!(program.statements[1].trivia.leading.len(), 1);
    }

    #[test]
    fn trailing_trivia_after_last_statement_goes_to_program() {
        let mut program = Program { statements: vec![stmt(0, 9)], ..Default::default() };
        let trivia = vec![TriviaItem::Comment { text: " end".into(), is_block: false, range: Range::new(15, 20) }];
        let line_index = LineIndex::new("let x = 1\n\n// end");
        attach_trivia(&mut program, trivia, &line_index);
        assert_eq!(program.trailing_trivia.len(), 1);
    }
}
