//! Reference-resolution and left-recursion checks.

use peggen_base::GrammarError;
use peggen_syntax::{Expr, Grammar};

/// Verifies that every rule reference in the grammar names a defined rule.
pub fn check_references(grammar: &Grammar) -> Result<(), GrammarError> {
    let mut pending: Vec<&Expr> = grammar.rules.iter().map(|r| &r.expr).collect();
    while let Some(expr) = pending.pop() {
        if let Expr::RuleRef { name } = expr {
            if !grammar.has_rule(name) {
                return Err(GrammarError::new(format!(
                    "Referenced rule \"{}\" does not exist.",
                    name
                )));
            }
        }
        expr.for_each_child(|child| pending.push(child));
    }
    Ok(())
}

/// Rejects rules that can re-enter themselves without consuming input.
///
/// Traverses the leftmost-first relation: for each construct, only the
/// sub-expressions that may be matched before anything has been consumed.
/// A sequence contributes only its first element, so recursion hidden
/// behind a possibly-empty first element is deliberately not detected.
pub fn check_left_recursion(grammar: &Grammar) -> Result<(), GrammarError> {
    for rule in &grammar.rules {
        let mut applied = vec![rule.name.as_str()];
        visit(grammar, &rule.expr, &mut applied)?;
    }
    Ok(())
}

fn visit<'g>(
    grammar: &'g Grammar,
    expr: &'g Expr,
    applied: &mut Vec<&'g str>,
) -> Result<(), GrammarError> {
    match expr {
        Expr::Choice { alternatives } => {
            for alternative in alternatives {
                visit(grammar, alternative, applied)?;
            }
            Ok(())
        }
        Expr::Sequence { elements } => match elements.first() {
            Some(first) => visit(grammar, first, applied),
            None => Ok(()),
        },
        Expr::Labeled { expr, .. }
        | Expr::SimpleAnd { expr }
        | Expr::SimpleNot { expr }
        | Expr::Optional { expr }
        | Expr::ZeroOrMore { expr }
        | Expr::OneOrMore { expr }
        | Expr::Action { expr, .. } => visit(grammar, expr, applied),
        Expr::SemanticAnd { .. }
        | Expr::SemanticNot { .. }
        | Expr::Literal { .. }
        | Expr::Any
        | Expr::Class(_) => Ok(()),
        Expr::RuleRef { name } => {
            if applied.iter().any(|entered| *entered == name) {
                return Err(GrammarError::new(format!(
                    "Left recursion detected for rule \"{}\".",
                    name
                )));
            }
            // Unresolved references are reported by check_references.
            let Some(rule) = grammar.rule(name) else {
                return Ok(());
            };
            applied.push(name);
            let result = visit(grammar, &rule.expr, applied);
            applied.pop();
            result
        }
    }
}
