use {
    crate::{RelNode, ScalarExpr},
    common::pub_fields_struct,
    std::fmt::Display,
};

pub_fields_struct! {
    #[derive(Debug, Clone, PartialEq)]
    struct FilterNode {
        input: RelNode,
        predicate: ScalarExpr,
    }
}

impl Display for FilterNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Filter")
    }
}
