//! Plain-text rendering of lowered methods.
//!
//! The output is a compact language-neutral pseudo-code used for previews,
//! golden tests, and debugging. It is deterministic: the same lowered
//! method always renders to the same text.

use mapgen_ir::{Expr, Literal, LoweredMethod, Stmt, SwitchPattern};

/// Rendering options.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Spaces per indentation level.
    pub indent: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { indent: 4 }
    }
}

/// Render one lowered method to text.
pub fn render_method(method: &LoweredMethod, options: &RenderOptions) -> String {
    let mut out = String::new();
    let params = method
        .params
        .iter()
        .map(|(name, ty)| format!("{name}: {ty}"))
        .collect::<Vec<_>>()
        .join(", ");
    match &method.returns {
        Some(returns) => out.push_str(&format!("fn {}({params}) -> {returns} {{\n", method.name)),
        None => out.push_str(&format!("fn {}({params}) {{\n", method.name)),
    }
    for stmt in &method.body {
        render_stmt(stmt, 1, options, &mut out);
    }
    out.push_str("}\n");
    out
}

/// Render several methods separated by blank lines.
pub fn render_methods(methods: &[LoweredMethod], options: &RenderOptions) -> String {
    methods
        .iter()
        .map(|m| render_method(m, options))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_stmt(stmt: &Stmt, level: usize, options: &RenderOptions, out: &mut String) {
    let pad = " ".repeat(level * options.indent);
    match stmt {
        Stmt::Let { name, value } => {
            out.push_str(&format!("{pad}let {name} = {};\n", render_expr(value)));
        }
        Stmt::Assign { target, value } => {
            out.push_str(&format!(
                "{pad}{} = {};\n",
                render_expr(target),
                render_expr(value)
            ));
        }
        Stmt::Expr(expr) => {
            out.push_str(&format!("{pad}{};\n", render_expr(expr)));
        }
        Stmt::If {
            condition,
            then,
            otherwise,
        } => {
            out.push_str(&format!("{pad}if {} {{\n", render_expr(condition)));
            for inner in then {
                render_stmt(inner, level + 1, options, out);
            }
            if otherwise.is_empty() {
                out.push_str(&format!("{pad}}}\n"));
            } else {
                out.push_str(&format!("{pad}}} else {{\n"));
                for inner in otherwise {
                    render_stmt(inner, level + 1, options, out);
                }
                out.push_str(&format!("{pad}}}\n"));
            }
        }
        Stmt::ForEach {
            var,
            iterable,
            body,
        } => {
            out.push_str(&format!("{pad}for {var} in {} {{\n", render_expr(iterable)));
            for inner in body {
                render_stmt(inner, level + 1, options, out);
            }
            out.push_str(&format!("{pad}}}\n"));
        }
        Stmt::Switch {
            scrutinee,
            arms,
            default,
        } => {
            out.push_str(&format!("{pad}switch {} {{\n", render_expr(scrutinee)));
            let inner_pad = " ".repeat((level + 1) * options.indent);
            for arm in arms {
                out.push_str(&format!(
                    "{inner_pad}case {} => {{\n",
                    render_pattern(&arm.pattern)
                ));
                for inner in &arm.body {
                    render_stmt(inner, level + 2, options, out);
                }
                out.push_str(&format!("{inner_pad}}}\n"));
            }
            out.push_str(&format!("{inner_pad}default => {{\n"));
            for inner in default {
                render_stmt(inner, level + 2, options, out);
            }
            out.push_str(&format!("{inner_pad}}}\n"));
            out.push_str(&format!("{pad}}}\n"));
        }
        Stmt::Return(expr) => {
            out.push_str(&format!("{pad}return {};\n", render_expr(expr)));
        }
        Stmt::Throw { message } => {
            out.push_str(&format!("{pad}throw({});\n", quote(message)));
        }
    }
}

fn render_pattern(pattern: &SwitchPattern) -> String {
    match pattern {
        SwitchPattern::EnumMember { ty, member } => format!("{ty}.{member}"),
        SwitchPattern::StringValue(value) => quote(value),
        SwitchPattern::IntValue(value) => value.to_string(),
        SwitchPattern::TypeTest { ty, binding } => format!("{ty} {binding}"),
    }
}

fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Source(path) => path.to_string(),
        Expr::Var(name) => name.clone(),
        Expr::Literal(literal) => render_literal(literal),
        Expr::Member { recv, name } => format!("{}.{name}", render_expr(recv)),
        Expr::Call { recv, method, args } => {
            format!("{}.{method}({})", render_expr(recv), render_args(args))
        }
        Expr::StaticCall { ty, method, args } => {
            format!("{ty}.{method}({})", render_args(args))
        }
        Expr::New {
            ty,
            args,
            initializers,
        } => {
            let mut text = format!("new {ty}(");
            text.push_str(
                &args
                    .iter()
                    .map(|(param, value)| format!("{param}: {}", render_expr(value)))
                    .collect::<Vec<_>>()
                    .join(", "),
            );
            text.push(')');
            if !initializers.is_empty() {
                text.push_str(" { ");
                text.push_str(
                    &initializers
                        .iter()
                        .map(|(member, value)| format!("{member} = {}", render_expr(value)))
                        .collect::<Vec<_>>()
                        .join(", "),
                );
                text.push_str(" }");
            }
            text
        }
        Expr::Cast { ty, expr } => format!("({ty}) {}", render_expr(expr)),
        Expr::Conditional {
            condition,
            then,
            otherwise,
        } => format!(
            "{} ? {} : {}",
            render_expr(condition),
            render_expr(then),
            render_expr(otherwise)
        ),
        Expr::IsNull(inner) => format!("{} == null", render_expr(inner)),
        Expr::Not(inner) => match inner.as_ref() {
            Expr::IsNull(value) => format!("{} != null", render_expr(value)),
            other => format!("!({})", render_expr(other)),
        },
        Expr::IsType { expr, ty } => format!("{} is {ty}", render_expr(expr)),
        Expr::Throw { message } => format!("throw({})", quote(message)),
    }
}

fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::Null => "null".to_string(),
        Literal::Bool(value) => value.to_string(),
        Literal::Int(value) => value.to_string(),
        Literal::Str(value) => quote(value),
        Literal::Default => "default".to_string(),
    }
}

fn render_args(args: &[Expr]) -> String {
    args.iter()
        .map(render_expr)
        .collect::<Vec<_>>()
        .join(", ")
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use mapgen_ir::SourcePath;

    use super::*;

    #[test]
    fn test_render_simple_method() {
        let method = LoweredMethod {
            name: "widen".to_string(),
            params: vec![("source".to_string(), "i32".to_string())],
            returns: Some("i64".to_string()),
            body: vec![Stmt::Return(Expr::Source(SourcePath::primary()))],
        };
        let text = render_method(&method, &RenderOptions::default());
        assert_eq!(text, "fn widen(source: i32) -> i64 {\n    return source;\n}\n");
    }

    #[test]
    fn test_render_new_with_initializers() {
        let expr = Expr::New {
            ty: "PersonDto".to_string(),
            args: vec![(
                "id".to_string(),
                Expr::Source(SourcePath::primary().child("Id")),
            )],
            initializers: vec![(
                "Name".to_string(),
                Expr::Source(SourcePath::primary().child("Name")),
            )],
        };
        assert_eq!(
            render_expr(&expr),
            "new PersonDto(id: source.Id) { Name = source.Name }"
        );
    }

    #[test]
    fn test_render_negated_null_check() {
        let check = Expr::not(Expr::is_null(Expr::Var("value".to_string())));
        assert_eq!(render_expr(&check), "value != null");
        let other = Expr::not(Expr::Var("flag".to_string()));
        assert_eq!(render_expr(&other), "!(flag)");
    }

    #[test]
    fn test_render_escapes_strings() {
        assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_render_void_method() {
        let method = LoweredMethod {
            name: "update".to_string(),
            params: vec![
                ("source".to_string(), "Person".to_string()),
                ("target".to_string(), "PersonDto".to_string()),
            ],
            returns: None,
            body: vec![Stmt::Assign {
                target: Expr::member(Expr::Var("target".to_string()), "Name"),
                value: Expr::Source(SourcePath::primary().child("Name")),
            }],
        };
        let text = render_method(&method, &RenderOptions::default());
        assert_eq!(
            text,
            "fn update(source: Person, target: PersonDto) {\n    target.Name = source.Name;\n}\n"
        );
    }
}
