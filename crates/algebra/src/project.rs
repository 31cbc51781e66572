use {
    crate::{RelNode, ScalarExpr},
    common::pub_fields_struct,
    std::fmt::Display,
};

pub_fields_struct! {
    #[derive(Debug, Clone, PartialEq)]
    struct ProjectNode {
        input: RelNode,
        exprs: Vec<ScalarExpr>,
        field_names: Vec<String>,
    }
}

impl Display for ProjectNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Project [{}]", self.field_names.join(", "))
    }
}
