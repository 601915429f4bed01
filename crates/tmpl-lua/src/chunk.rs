//! Chunk normalization.
//!
//! Every block the translator builds goes through [`lua_chunk`], so nested
//! `do ... end` wrappers never pile up and a terminator buried in a nested
//! block surfaces where Lua can accept it.

use crate::ast::{Chunk, Expr, LastStmt, Stmt};

/// Builds a normalized chunk from `stmts` and a terminator.
///
/// - `do ... end` blocks are spliced into the enclosing list.
/// - A spliced block that ends in a terminator leaves `do <last> end`
///   behind and everything after it is dropped up to the next label.
/// - If the list then ends in such a block and `last` is absent, the block's
///   terminator becomes the chunk's own.
///
/// The result is a fixpoint: normalizing it again changes nothing.
pub fn lua_chunk(stmts: Vec<Stmt>, last: Option<LastStmt>) -> Chunk {
    let mut body = Vec::with_capacity(stmts.len());
    let mut live = true;
    push_all(&mut body, &mut live, stmts);

    let mut last = if live { last } else { None };
    if last.is_none()
        && let Some(Stmt::Do(inner)) = body.last()
        && inner.body.is_empty()
        && inner.last.is_some()
    {
        if let Some(Stmt::Do(inner)) = body.pop() {
            last = inner.last;
        }
    }
    Chunk { body, last }
}

fn push_all(body: &mut Vec<Stmt>, live: &mut bool, stmts: Vec<Stmt>) {
    for stmt in stmts {
        if !*live {
            if matches!(stmt, Stmt::Label(_)) {
                *live = true;
            } else {
                continue;
            }
        }
        match stmt {
            Stmt::Do(inner) => {
                push_all(body, live, inner.body);
                if *live && let Some(last) = inner.last {
                    body.push(Stmt::Do(Chunk::new(Vec::new(), Some(last))));
                    *live = false;
                }
            }
            other => body.push(other),
        }
    }
}

/// `if test then ... else ... end`, folding an else branch that is itself a
/// lone `if` into an `elseif` chain.
pub fn if_stmt(test: Expr, then: Chunk, otherwise: Option<Chunk>) -> Stmt {
    let mut elseifs = Vec::new();
    let mut otherwise = otherwise.filter(|c| !c.is_empty());
    while let Some(chunk) = otherwise.take() {
        match collapse_else(chunk) {
            Ok((test, then, nested_elseifs, rest)) => {
                elseifs.push((test, then));
                elseifs.extend(nested_elseifs);
                otherwise = rest;
            }
            Err(chunk) => {
                otherwise = Some(chunk);
                break;
            }
        }
    }
    Stmt::If {
        test,
        then,
        elseifs,
        otherwise,
    }
}

type ElseIf = (Expr, Chunk, Vec<(Expr, Chunk)>, Option<Chunk>);

fn collapse_else(chunk: Chunk) -> Result<ElseIf, Chunk> {
    if chunk.body.len() != 1 || chunk.last.is_some() || !matches!(chunk.body[0], Stmt::If { .. })
    {
        return Err(chunk);
    }
    let mut chunk = chunk;
    match chunk.body.pop() {
        Some(Stmt::If {
            test,
            then,
            elseifs,
            otherwise,
        }) => Ok((test, then, elseifs, otherwise)),
        Some(other) => {
            chunk.body.push(other);
            Err(chunk)
        }
        None => Err(chunk),
    }
}

/// A plain two-armed `if` with no chain folding.
pub fn basic_if_stmt(test: Expr, then: Chunk, otherwise: Option<Chunk>) -> Stmt {
    Stmt::If {
        test,
        then,
        elseifs: Vec::new(),
        otherwise: otherwise.filter(|c| !c.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str) -> Stmt {
        Stmt::Call(Expr::call(Expr::name(name), vec![]))
    }

    fn ret(name: &str) -> LastStmt {
        LastStmt::Return(vec![Expr::name(name)])
    }

    #[test]
    fn test_splices_plain_do_blocks() {
        let chunk = lua_chunk(
            vec![
                call("a"),
                Stmt::Do(Chunk::new(vec![call("b"), Stmt::Do(Chunk::new(vec![call("c")], None))], None)),
            ],
            None,
        );
        assert_eq!(chunk.body, vec![call("a"), call("b"), call("c")]);
        assert!(chunk.last.is_none());
    }

    #[test]
    fn test_trailing_return_is_hoisted() {
        let chunk = lua_chunk(
            vec![call("a"), Stmt::Do(Chunk::new(vec![call("b")], Some(ret("x"))))],
            None,
        );
        assert_eq!(chunk.body, vec![call("a"), call("b")]);
        assert_eq!(chunk.last, Some(ret("x")));
    }

    #[test]
    fn test_code_after_return_is_dropped_until_label() {
        let chunk = lua_chunk(
            vec![
                Stmt::Do(Chunk::new(vec![], Some(LastStmt::Break))),
                call("dead"),
                Stmt::Label("again".into()),
                call("alive"),
            ],
            Some(ret("y")),
        );
        assert_eq!(
            chunk.body,
            vec![
                Stmt::Do(Chunk::new(vec![], Some(LastStmt::Break))),
                Stmt::Label("again".into()),
                call("alive"),
            ]
        );
        assert_eq!(chunk.last, Some(ret("y")));
    }

    #[test]
    fn test_unreachable_own_terminator_is_replaced() {
        let chunk = lua_chunk(
            vec![Stmt::Do(Chunk::new(vec![], Some(ret("inner"))))],
            Some(ret("outer")),
        );
        assert!(chunk.body.is_empty());
        assert_eq!(chunk.last, Some(ret("inner")));
    }

    #[test]
    fn test_idempotent() {
        let inputs = vec![
            (
                vec![
                    Stmt::local("x", Expr::Int(1)),
                    Stmt::Do(Chunk::new(vec![call("a")], Some(LastStmt::Break))),
                    Stmt::Label("l".into()),
                    Stmt::Do(Chunk::new(vec![Stmt::Do(Chunk::new(vec![], Some(ret("r"))))], None)),
                ],
                None,
            ),
            (vec![Stmt::Do(Chunk::new(vec![call("q")], None))], Some(ret("z"))),
            (vec![], None),
        ];
        for (stmts, last) in inputs {
            let once = lua_chunk(stmts, last);
            let twice = lua_chunk(once.body.clone(), once.last.clone());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_if_chain_folds() {
        let inner = if_stmt(
            Expr::name("b"),
            Chunk::new(vec![call("two")], None),
            Some(Chunk::new(vec![call("three")], None)),
        );
        let outer = if_stmt(
            Expr::name("a"),
            Chunk::new(vec![call("one")], None),
            Some(Chunk::new(vec![inner], None)),
        );
        let Stmt::If {
            elseifs, otherwise, ..
        } = outer
        else {
            panic!("expected if");
        };
        assert_eq!(elseifs.len(), 1);
        assert_eq!(otherwise, Some(Chunk::new(vec![call("three")], None)));
    }

    #[test]
    fn test_empty_else_is_dropped() {
        let stmt = basic_if_stmt(Expr::name("a"), Chunk::default(), Some(Chunk::default()));
        assert!(matches!(stmt, Stmt::If { otherwise: None, .. }));
    }
}
