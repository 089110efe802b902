//! Proxy-rule elimination.
//!
//! A proxy rule is one whose entire body is a single reference to another
//! rule. Proxies add a call and a cache entry per position without changing
//! the recognized language, so the analyzer removes them: every reference to
//! the proxy is redirected at its target, the start rule is retargeted when
//! it is the proxy itself, and the proxy is deleted.
//!
//! Chains (`a = b; b = c`) collapse because each removal is fully applied
//! before the next proxy is looked up. The pass is idempotent.

use peggen_syntax::{Expr, Grammar};

/// Removes every proxy rule from the grammar, in place.
pub fn eliminate_proxy_rules(grammar: &mut Grammar) {
    loop {
        let proxy = grammar.rules.iter().find_map(|rule| match &rule.expr {
            Expr::RuleRef { name } => Some((rule.name.clone(), name.clone())),
            _ => None,
        });
        let Some((proxy_name, target)) = proxy else {
            break;
        };

        for rule in &mut grammar.rules {
            redirect(&mut rule.expr, &proxy_name, &target);
        }
        if grammar.start_rule == proxy_name {
            grammar.start_rule = target;
        }
        grammar.remove_rule(&proxy_name);
    }
}

fn redirect(expr: &mut Expr, from: &str, to: &str) {
    if let Expr::RuleRef { name } = expr {
        if name == from {
            *name = to.to_string();
        }
        return;
    }
    expr.for_each_child_mut(|child| redirect(child, from, to));
}
