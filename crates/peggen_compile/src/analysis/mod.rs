//! Static analysis and normalization of the abstract grammar tree.
//!
//! Two checks followed by one rewrite, always in this order:
//!
//! 1. **Reference resolution** — every rule reference names a defined rule.
//! 2. **Left-recursion detection** — no rule can re-enter itself without
//!    consuming input, following the leftmost-first relation.
//! 3. **Proxy-rule elimination** — rules whose whole body is a single
//!    reference are removed and their uses redirected.
//!
//! After [`analyze`] succeeds the tree is normalized: every reference
//! resolves and no rule's immediate body is a reference.

mod check;
mod rewrite;

pub use check::{check_left_recursion, check_references};
pub use rewrite::eliminate_proxy_rules;

use peggen_base::GrammarError;
use peggen_syntax::Grammar;

/// Validates the grammar and applies proxy-rule elimination in place.
pub fn analyze(grammar: &mut Grammar) -> Result<(), GrammarError> {
    check_references(grammar)?;
    check_left_recursion(grammar)?;
    eliminate_proxy_rules(grammar);
    Ok(())
}
