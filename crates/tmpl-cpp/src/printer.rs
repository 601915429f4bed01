//! C++ source rendering.
//!
//! Four-space indentation. Nested binary operations are parenthesized so
//! precedence never has to be reconstructed.

use crate::ast::{Decl, Expr, FunctionDecl, Param, Stmt, StructDecl, TranslationUnit, TypeExpr};
use std::fmt::Write as _;

pub struct CppPrinter {
    output: String,
    indent_level: u32,
    indent_str: &'static str,
}

impl Default for CppPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl CppPrinter {
    pub fn new() -> Self {
        CppPrinter {
            output: String::new(),
            indent_level: 0,
            indent_str: "    ",
        }
    }

    /// Declarations only, behind an include guard.
    pub fn print_header(unit: &TranslationUnit, guard: &str) -> String {
        let mut printer = CppPrinter::new();
        printer.write(&format!("#ifndef {guard}\n#define {guard}\n\n"));
        printer.write("#include \"temper-core/core.hpp\"\n\n");
        printer.open_namespace(&unit.namespace);
        let structs: Vec<&StructDecl> = unit
            .decls
            .iter()
            .filter_map(|d| match d {
                Decl::Struct(s) => Some(s),
                _ => None,
            })
            .collect();
        if !structs.is_empty() {
            for s in &structs {
                printer.write(&format!("struct {};\n", s.name));
            }
            printer.write_line();
        }
        for decl in &unit.decls {
            printer.emit_declaration(decl);
        }
        printer.close_namespace(&unit.namespace);
        printer.write(&format!("\n#endif // {guard}\n"));
        printer.output
    }

    /// Definitions, including the module's own header.
    pub fn print_source(unit: &TranslationUnit, header: &str) -> String {
        let mut printer = CppPrinter::new();
        printer.write(&format!("#include \"{header}\"\n\n"));
        printer.open_namespace(&unit.namespace);
        for decl in &unit.decls {
            printer.emit_definition(decl);
        }
        printer.close_namespace(&unit.namespace);
        printer.output
    }

    pub fn print_type(ty: &TypeExpr) -> String {
        let mut printer = CppPrinter::new();
        printer.emit_type(ty);
        printer.output
    }

    pub fn print_expr(expr: &Expr) -> String {
        let mut printer = CppPrinter::new();
        printer.emit_expr(expr);
        printer.output
    }

    pub fn print_stmts(stmts: &[Stmt]) -> String {
        let mut printer = CppPrinter::new();
        printer.emit_stmts(stmts);
        printer.output
    }

    fn open_namespace(&mut self, namespace: &str) {
        self.write(&format!("namespace temper {{\nnamespace {namespace} {{\n\n"));
    }

    fn close_namespace(&mut self, namespace: &str) {
        self.write(&format!(
            "}} // namespace {namespace}\n}} // namespace temper\n"
        ));
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn emit_declaration(&mut self, decl: &Decl) {
        match decl {
            Decl::Function(func) => {
                self.emit_signature(func, None);
                self.write(";\n\n");
            }
            Decl::Variable { ty, name, .. } => {
                self.write("extern ");
                self.emit_type(ty);
                self.write(&format!(" {name};\n\n"));
            }
            Decl::Struct(s) => {
                self.write(&format!("struct {} {{\n", s.name));
                self.increase_indent();
                for field in &s.fields {
                    self.write_indent();
                    self.emit_param(field);
                    self.write(";\n");
                }
                for method in &s.methods {
                    self.write_indent();
                    self.emit_signature(method, None);
                    self.write(";\n");
                }
                for extra in &s.extras {
                    self.write_indent();
                    self.emit_stmt(extra);
                    self.write_line();
                }
                self.decrease_indent();
                self.write("};\n\n");
            }
            Decl::Comment(_) => {}
        }
    }

    fn emit_definition(&mut self, decl: &Decl) {
        match decl {
            Decl::Function(func) => self.emit_function_definition(func, None),
            Decl::Variable { ty, name, init } => {
                self.emit_type(ty);
                self.write(" ");
                self.write(name);
                if let Some(init) = init {
                    self.write(" = ");
                    self.emit_expr(init);
                }
                self.write(";\n\n");
            }
            Decl::Struct(s) => {
                for method in &s.methods {
                    self.emit_function_definition(method, Some(&s.name));
                }
            }
            Decl::Comment(text) => {
                self.emit_comment(text);
                self.write("\n\n");
            }
        }
    }

    fn emit_function_definition(&mut self, func: &FunctionDecl, owner: Option<&str>) {
        let Some(body) = &func.body else {
            return;
        };
        self.emit_signature(func, owner);
        self.write(" {\n");
        self.increase_indent();
        self.emit_stmts(body);
        self.decrease_indent();
        self.write("}\n\n");
    }

    /// `static` only appears inside the struct body, never on a qualified
    /// out-of-line definition.
    fn emit_signature(&mut self, func: &FunctionDecl, owner: Option<&str>) {
        if func.is_static && owner.is_none() {
            self.write("static ");
        }
        self.emit_type(&func.ret);
        self.write(" ");
        if let Some(owner) = owner {
            self.write(owner);
            self.write("::");
        }
        self.write(&func.name);
        self.write("(");
        for (i, param) in func.params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_param(param);
        }
        self.write(")");
    }

    fn emit_param(&mut self, param: &Param) {
        self.emit_type(&param.ty);
        self.write(" ");
        self.write(&param.name);
    }

    fn emit_type(&mut self, ty: &TypeExpr) {
        match ty {
            TypeExpr::Name(name) => self.write(name),
            TypeExpr::Template { name, args } => {
                self.write(name);
                self.write("<");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.emit_type(arg);
                }
                self.write(">");
            }
            TypeExpr::Pointer(inner) => {
                self.emit_type(inner);
                self.write("*");
            }
            TypeExpr::Auto => self.write("auto"),
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn emit_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.write_indent();
            self.emit_stmt(stmt);
            self.write_line();
        }
    }

    fn emit_body(&mut self, stmts: &[Stmt]) {
        self.write(" {");
        self.write_line();
        self.increase_indent();
        self.emit_stmts(stmts);
        self.decrease_indent();
        self.write_indent();
        self.write("}");
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => {
                self.emit_expr(expr);
                self.write(";");
            }
            Stmt::Decl { ty, name, init } => {
                self.emit_type(ty);
                self.write(" ");
                self.write(name);
                if let Some(init) = init {
                    self.write(" = ");
                    self.emit_expr(init);
                }
                self.write(";");
            }
            Stmt::Assign { target, value } => {
                self.emit_expr(target);
                self.write(" = ");
                self.emit_expr(value);
                self.write(";");
            }
            Stmt::Block(stmts) => {
                self.write("{");
                self.write_line();
                self.increase_indent();
                self.emit_stmts(stmts);
                self.decrease_indent();
                self.write_indent();
                self.write("}");
            }
            Stmt::If {
                test,
                then,
                otherwise,
            } => {
                self.write("if (");
                self.emit_expr(test);
                self.write(")");
                self.emit_body(then);
                if let Some(otherwise) = otherwise {
                    self.write(" else");
                    self.emit_body(otherwise);
                }
            }
            Stmt::While { test, body } => {
                self.write("while (");
                self.emit_expr(test);
                self.write(")");
                self.emit_body(body);
            }
            Stmt::Return(None) => self.write("return;"),
            Stmt::Return(Some(expr)) => {
                self.write("return ");
                self.emit_expr(expr);
                self.write(";");
            }
            Stmt::Comment(text) => self.emit_comment(text),
        }
    }

    fn emit_comment(&mut self, text: &str) {
        if text.is_empty() {
            self.write("//");
            return;
        }
        for (i, line) in text.lines().enumerate() {
            if i > 0 {
                self.write_line();
                self.write_indent();
            }
            self.write("// ");
            self.write(line);
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn emit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Name(name) | Expr::Raw(name) => self.write(name),
            Expr::Int(value) => {
                let _ = write!(self.output, "{value}");
            }
            Expr::Float(value) => self.emit_float(*value),
            Expr::Str(text) => self.write_escaped(text),
            Expr::Bool(true) => self.write("true"),
            Expr::Bool(false) => self.write("false"),
            Expr::Null => self.write("nullptr"),
            Expr::Call(callee, args) => {
                self.emit_expr(callee);
                self.emit_args(args);
            }
            Expr::Arrow(obj, name) => {
                self.emit_operand(obj);
                self.write("->");
                self.write(name);
            }
            Expr::Scoped(scope, name) => {
                self.write(scope);
                self.write("::");
                self.write(name);
            }
            Expr::TemplateCall { callee, ty, args } => {
                self.write(callee);
                self.write("<");
                self.emit_type(ty);
                self.write(">");
                self.emit_args(args);
            }
            Expr::Binary(op, left, right) => {
                self.emit_operand(left);
                self.write(" ");
                self.write(op);
                self.write(" ");
                self.emit_operand(right);
            }
            Expr::Unary(op, operand) => {
                self.write(op);
                self.emit_operand(operand);
            }
            Expr::Unsupported(kind) => {
                self.write("exit(0) /* unsupported ");
                self.write(kind);
                self.write(" */");
            }
        }
    }

    fn emit_operand(&mut self, expr: &Expr) {
        if matches!(expr, Expr::Binary(..) | Expr::Unary(..)) {
            self.write("(");
            self.emit_expr(expr);
            self.write(")");
        } else {
            self.emit_expr(expr);
        }
    }

    fn emit_args(&mut self, args: &[Expr]) {
        self.write("(");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_expr(arg);
        }
        self.write(")");
    }

    fn emit_float(&mut self, value: f64) {
        if value.is_nan() {
            self.write("std::numeric_limits<double>::quiet_NaN()");
        } else if value.is_infinite() {
            if value < 0.0 {
                self.write("-");
            }
            self.write("std::numeric_limits<double>::infinity()");
        } else {
            let _ = write!(self.output, "{value:?}");
        }
    }

    // =========================================================================
    // Output helpers
    // =========================================================================

    fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn write_escaped(&mut self, text: &str) {
        self.output.push('"');
        for ch in text.chars() {
            match ch {
                '"' => self.output.push_str("\\\""),
                '\\' => self.output.push_str("\\\\"),
                '\n' => self.output.push_str("\\n"),
                '\r' => self.output.push_str("\\r"),
                '\t' => self.output.push_str("\\t"),
                c if (c as u32) < 0x20 => {
                    let _ = write!(self.output, "\\x{:02x}", c as u32);
                }
                c => self.output.push(c),
            }
        }
        self.output.push('"');
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
        self.indent_level = self.indent_level.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_binary_is_parenthesized() {
        let expr = Expr::binary(
            "&&",
            Expr::binary("<", Expr::name("a"), Expr::Int(1)),
            Expr::Unary("!", Box::new(Expr::name("b"))),
        );
        assert_eq!(CppPrinter::print_expr(&expr), "(a < 1) && (!b)");
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            CppPrinter::print_expr(&Expr::Str("say \"hi\"\n".into())),
            "\"say \\\"hi\\\"\\n\""
        );
    }

    #[test]
    fn test_unsupported_expression() {
        assert_eq!(
            CppPrinter::print_expr(&Expr::Unsupported("Await".into())),
            "exit(0) /* unsupported Await */"
        );
    }

    #[test]
    fn test_if_else() {
        let stmt = Stmt::If {
            test: Expr::name("c"),
            then: vec![Stmt::Return(Some(Expr::Int(1)))],
            otherwise: Some(vec![Stmt::Return(None)]),
        };
        assert_eq!(
            CppPrinter::print_stmts(&[stmt]),
            "if (c) {\n    return 1;\n} else {\n    return;\n}\n"
        );
    }

    #[test]
    fn test_float_spelling() {
        assert_eq!(CppPrinter::print_expr(&Expr::Float(1.0)), "1.0");
        assert_eq!(
            CppPrinter::print_expr(&Expr::Float(f64::NEG_INFINITY)),
            "-std::numeric_limits<double>::infinity()"
        );
    }
}
