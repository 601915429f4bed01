//! Lua source rendering.
//!
//! Formatting is fixed: two-space indentation, `;` after every simple
//! statement, single-quoted strings, and every binary operation in
//! parentheses so precedence never has to be reconstructed.

use crate::ast::{Chunk, Expr, Function, LastStmt, SetTarget, Stmt, TableField, UnOp};
use std::fmt::Write as _;

pub struct LuaPrinter {
    output: String,
    indent_level: u32,
    indent_str: &'static str,
}

impl Default for LuaPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl LuaPrinter {
    pub fn new() -> Self {
        LuaPrinter {
            output: String::new(),
            indent_level: 0,
            indent_str: "  ",
        }
    }

    /// Renders a whole file. The result ends with a newline.
    pub fn print_file(chunk: &Chunk) -> String {
        let mut printer = LuaPrinter::new();
        printer.emit_chunk(chunk);
        printer.output
    }

    pub fn print_expr(expr: &Expr) -> String {
        let mut printer = LuaPrinter::new();
        printer.emit_expr(expr);
        printer.output
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn emit_chunk(&mut self, chunk: &Chunk) {
        for stmt in &chunk.body {
            self.write_indent();
            self.emit_stmt(stmt);
            self.write_line();
        }
        if let Some(last) = &chunk.last {
            self.write_indent();
            match last {
                LastStmt::Return(exprs) if exprs.is_empty() => self.write("return;"),
                LastStmt::Return(exprs) => {
                    self.write("return ");
                    self.emit_list(exprs);
                    self.write(";");
                }
                LastStmt::Break => self.write("break;"),
            }
            self.write_line();
        }
    }

    fn emit_block(&mut self, chunk: &Chunk) {
        self.increase_indent();
        self.emit_chunk(chunk);
        self.decrease_indent();
        self.write_indent();
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Local { names, exprs } => {
                self.write("local ");
                self.write(&names.join(", "));
                if !exprs.is_empty() {
                    self.write(" = ");
                    self.emit_list(exprs);
                }
                self.write(";");
            }
            Stmt::Set { targets, exprs } => {
                for (i, target) in targets.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.emit_target(target);
                }
                self.write(" = ");
                self.emit_list(exprs);
                self.write(";");
            }
            Stmt::Call(expr) => {
                self.emit_expr(expr);
                self.write(";");
            }
            Stmt::Do(chunk) => {
                self.write("do");
                self.write_line();
                self.emit_block(chunk);
                self.write("end");
            }
            Stmt::While { test, body } => {
                self.write("while ");
                self.emit_condition(test);
                self.write(" do");
                self.write_line();
                self.emit_block(body);
                self.write("end");
            }
            Stmt::If {
                test,
                then,
                elseifs,
                otherwise,
            } => {
                self.write("if ");
                self.emit_condition(test);
                self.write(" then");
                self.write_line();
                self.emit_block(then);
                for (test, body) in elseifs {
                    self.write("elseif ");
                    self.emit_condition(test);
                    self.write(" then");
                    self.write_line();
                    self.emit_block(body);
                }
                if let Some(otherwise) = otherwise {
                    self.write("else");
                    self.write_line();
                    self.emit_block(otherwise);
                }
                self.write("end");
            }
            Stmt::LocalFunction { name, func } => {
                self.write("local function ");
                self.write(name);
                self.emit_function_tail(func);
            }
            Stmt::Goto(label) => {
                self.write("goto ");
                self.write(label);
                self.write(";");
            }
            Stmt::Label(label) => {
                self.write("::");
                self.write(label);
                self.write("::");
            }
            Stmt::Comment(text) => {
                for (i, line) in text.lines().enumerate() {
                    if i > 0 {
                        self.write_line();
                        self.write_indent();
                    }
                    self.write("-- ");
                    self.write(line);
                }
                if text.is_empty() {
                    self.write("--");
                }
            }
        }
    }

    fn emit_target(&mut self, target: &SetTarget) {
        match target {
            SetTarget::Name(name) => self.write(name),
            SetTarget::Dot(obj, name) => {
                self.emit_prefix(obj);
                self.write(".");
                self.write(name);
            }
            SetTarget::Index(obj, key) => {
                self.emit_prefix(obj);
                self.write("[");
                self.emit_expr(key);
                self.write("]");
            }
        }
    }

    /// `if`/`while` tests always sit in parentheses.
    fn emit_condition(&mut self, test: &Expr) {
        if matches!(test, Expr::BinOp(..) | Expr::Paren(_)) {
            self.emit_expr(test);
        } else {
            self.write("(");
            self.emit_expr(test);
            self.write(")");
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn emit_list(&mut self, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_expr(expr);
        }
    }

    /// Lua only allows names, calls, field accesses and parenthesized
    /// expressions before `.`, `:`, `[` and `(`.
    fn emit_prefix(&mut self, expr: &Expr) {
        let is_prefix = matches!(
            expr,
            Expr::Name(_)
                | Expr::Dot(..)
                | Expr::Index(..)
                | Expr::Call(..)
                | Expr::MethodCall(..)
                | Expr::Paren(_)
        );
        if is_prefix {
            self.emit_expr(expr);
        } else {
            self.write("(");
            self.emit_expr(expr);
            self.write(")");
        }
    }

    fn emit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Name(name) => self.write(name),
            Expr::Int(value) => {
                let _ = write!(self.output, "{value}");
            }
            Expr::Float(value) => {
                let _ = write!(self.output, "{value:?}");
            }
            Expr::Str(text) => {
                self.write("'");
                self.write_escaped(text);
                self.write("'");
            }
            Expr::Vararg => self.write("..."),
            Expr::Dot(obj, name) => {
                self.emit_prefix(obj);
                self.write(".");
                self.write(name);
            }
            Expr::Index(obj, key) => {
                self.emit_prefix(obj);
                self.write("[");
                self.emit_expr(key);
                self.write("]");
            }
            Expr::Call(func, args) => {
                self.emit_prefix(func);
                self.write("(");
                self.emit_list(args);
                self.write(")");
            }
            Expr::MethodCall(obj, method, args) => {
                self.emit_prefix(obj);
                self.write(":");
                self.write(method);
                self.write("(");
                self.emit_list(args);
                self.write(")");
            }
            Expr::Function(func) => {
                self.write("function");
                self.emit_function_tail(func);
            }
            Expr::Table(fields) => {
                self.write("{");
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    match field {
                        TableField::Positional(value) => self.emit_expr(value),
                        TableField::Named(key, value) => {
                            self.write(key);
                            self.write(" = ");
                            self.emit_expr(value);
                        }
                    }
                }
                self.write("}");
            }
            Expr::BinOp(op, left, right) => {
                self.write("(");
                self.emit_expr(left);
                self.write(" ");
                self.write(op.as_str());
                self.write(" ");
                self.emit_expr(right);
                self.write(")");
            }
            Expr::UnOp(op, operand) => {
                match op {
                    UnOp::Not => self.write("not "),
                    UnOp::Neg => self.write("-"),
                }
                if matches!(**operand, Expr::UnOp(..)) {
                    self.write("(");
                    self.emit_expr(operand);
                    self.write(")");
                } else {
                    self.emit_expr(operand);
                }
            }
            Expr::Paren(inner) => {
                self.write("(");
                self.emit_expr(inner);
                self.write(")");
            }
        }
    }

    /// `(params)` through `end`.
    fn emit_function_tail(&mut self, func: &Function) {
        self.write("(");
        self.write(&func.params.join(", "));
        if func.vararg {
            if !func.params.is_empty() {
                self.write(", ");
            }
            self.write("...");
        }
        self.write(")");
        self.write_line();
        self.emit_block(&func.body);
        self.write("end");
    }

    // =========================================================================
    // Output helpers
    // =========================================================================

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_escaped(&mut self, s: &str) {
        for c in s.chars() {
            match c {
                '\'' => self.output.push_str("\\'"),
                '\\' => self.output.push_str("\\\\"),
                '\n' => self.output.push_str("\\n"),
                '\r' => self.output.push_str("\\r"),
                '\t' => self.output.push_str("\\t"),
                c if (c as u32) < 0x20 || c == '\x7F' => {
                    let _ = write!(self.output, "\\{:03}", c as u32);
                }
                _ => self.output.push(c),
            }
        }
    }

    fn write_line(&mut self) {
        self.output.push('\n');
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(self.indent_str);
        }
    }

    fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    fn decrease_indent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinOp;

    #[test]
    fn test_simple_statements_end_in_semicolons() {
        let chunk = Chunk::new(
            vec![
                Stmt::local("x", Expr::Int(1)),
                Stmt::Local {
                    names: vec!["a".into(), "b".into()],
                    exprs: vec![],
                },
                Stmt::Goto("continue_0".into()),
                Stmt::Label("continue_0".into()),
                Stmt::Comment("Type Foo connected to Bar".into()),
            ],
            Some(LastStmt::Return(vec![Expr::name("a"), Expr::name("b")])),
        );
        assert_eq!(
            LuaPrinter::print_file(&chunk),
            "local x = 1;\nlocal a, b;\ngoto continue_0;\n::continue_0::\n\
             -- Type Foo connected to Bar\nreturn a, b;\n"
        );
    }

    #[test]
    fn test_conditions_are_parenthesized() {
        let chunk = Chunk::new(
            vec![
                Stmt::While {
                    test: Expr::name("go"),
                    body: Chunk::new(vec![], Some(LastStmt::Break)),
                },
                Stmt::If {
                    test: Expr::binop(BinOp::Eq, Expr::name("msg"), Expr::str("break")),
                    then: Chunk::new(vec![Stmt::Call(Expr::call(Expr::name("f"), vec![]))], None),
                    elseifs: vec![],
                    otherwise: Some(Chunk::new(vec![], Some(LastStmt::Return(vec![])))),
                },
            ],
            None,
        );
        assert_eq!(
            LuaPrinter::print_file(&chunk),
            "while (go) do\n  break;\nend\nif (msg == 'break') then\n  f();\nelse\n  return;\nend\n"
        );
    }

    #[test]
    fn test_function_values() {
        let empty = Stmt::set_name(
            "f",
            Expr::Function(Function {
                params: vec!["p".into()],
                vararg: true,
                body: Chunk::default(),
            }),
        );
        assert_eq!(
            LuaPrinter::print_file(&Chunk::new(vec![empty], None)),
            "f = function(p, ...)\nend;\n"
        );
    }

    #[test]
    fn test_strings_are_single_quoted_and_escaped() {
        assert_eq!(
            LuaPrinter::print_expr(&Expr::str("it's\n\\\u{1}")),
            "'it\\'s\\n\\\\\\001'"
        );
    }

    #[test]
    fn test_prefix_expressions() {
        let on_string = Expr::MethodCall(Box::new(Expr::str("a")), "len".into(), vec![]);
        assert_eq!(LuaPrinter::print_expr(&on_string), "('a'):len()");
        let chained = Expr::MethodCall(
            Box::new(Expr::call(Expr::name("Apple"), vec![])),
            "maybe".into(),
            vec![],
        );
        assert_eq!(LuaPrinter::print_expr(&chained), "Apple():maybe()");
        assert_eq!(LuaPrinter::print_expr(&Expr::Float(2.0)), "2.0");
        assert_eq!(
            LuaPrinter::print_expr(&Expr::not(Expr::name("ok"))),
            "not ok"
        );
    }
}
