//! Lowered statement and expression forms.
//!
//! These are the language-agnostic shapes an emission layer renders into
//! actual source text. Type names are plain strings here; all resolution
//! happened earlier against the catalog.

use serde::Serialize;

use crate::plan::SourcePath;

/// A literal value in lowered code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    /// The default value of a value type.
    Default,
}

/// A lowered expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// Read of a source root or source member path.
    Source(SourcePath),
    /// Read of a local variable.
    Var(String),
    Literal(Literal),
    /// Member access on a receiver.
    Member { recv: Box<Expr>, name: String },
    /// Instance method call.
    Call {
        recv: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    /// Static method call on a named type.
    StaticCall {
        ty: String,
        method: String,
        args: Vec<Expr>,
    },
    /// Object construction with named arguments and initializer entries.
    New {
        ty: String,
        args: Vec<(String, Expr)>,
        initializers: Vec<(String, Expr)>,
    },
    /// Explicit cast.
    Cast { ty: String, expr: Box<Expr> },
    /// Ternary conditional.
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// Null test.
    IsNull(Box<Expr>),
    /// Logical negation.
    Not(Box<Expr>),
    /// Runtime type test.
    IsType { expr: Box<Expr>, ty: String },
    /// Throw-expression used inside null guards.
    Throw { message: String },
}

impl Expr {
    /// Member access helper.
    pub fn member(recv: Expr, name: impl Into<String>) -> Self {
        Expr::Member {
            recv: Box::new(recv),
            name: name.into(),
        }
    }

    /// Instance call helper.
    pub fn call(recv: Expr, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            recv: Box::new(recv),
            method: method.into(),
            args,
        }
    }

    /// Static call helper.
    pub fn static_call(ty: impl Into<String>, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::StaticCall {
            ty: ty.into(),
            method: method.into(),
            args,
        }
    }

    /// Cast helper.
    pub fn cast(ty: impl Into<String>, expr: Expr) -> Self {
        Expr::Cast {
            ty: ty.into(),
            expr: Box::new(expr),
        }
    }

    /// Conditional helper.
    pub fn conditional(condition: Expr, then: Expr, otherwise: Expr) -> Self {
        Expr::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    /// Null-test helper.
    pub fn is_null(expr: Expr) -> Self {
        Expr::IsNull(Box::new(expr))
    }

    /// Negation helper.
    pub fn not(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }
}

/// A switch arm pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SwitchPattern {
    /// Match an enum member of a named enum type.
    EnumMember { ty: String, member: String },
    StringValue(String),
    IntValue(i64),
    /// Runtime type test binding the downcast value.
    TypeTest { ty: String, binding: String },
}

/// One arm of a lowered switch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchArm {
    pub pattern: SwitchPattern,
    pub body: Vec<Stmt>,
}

/// A lowered statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stmt {
    Let { name: String, value: Expr },
    Assign { target: Expr, value: Expr },
    /// Expression evaluated for its effect (e.g. an `Add` call).
    Expr(Expr),
    If {
        condition: Expr,
        then: Vec<Stmt>,
        otherwise: Vec<Stmt>,
    },
    ForEach {
        var: String,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    Switch {
        scrutinee: Expr,
        arms: Vec<SwitchArm>,
        default: Vec<Stmt>,
    },
    Return(Expr),
    Throw { message: String },
}

/// A fully lowered mapping method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoweredMethod {
    pub name: String,
    /// Parameters as (name, type name), primary source first.
    pub params: Vec<(String, String)>,
    /// Return type name; `None` for void (existing-target) methods.
    pub returns: Option<String>,
    pub body: Vec<Stmt>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expr_helpers() {
        let read = Expr::Source(SourcePath::primary());
        let access = Expr::member(read.clone(), "Name");
        assert!(matches!(access, Expr::Member { name, .. } if name == "Name"));

        let call = Expr::call(read.clone(), "ToString", vec![]);
        assert!(matches!(call, Expr::Call { method, .. } if method == "ToString"));

        let cond = Expr::conditional(
            Expr::is_null(read.clone()),
            Expr::Literal(Literal::Null),
            read,
        );
        assert!(matches!(cond, Expr::Conditional { .. }));
    }
}
