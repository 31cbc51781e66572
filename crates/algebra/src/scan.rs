use {common::pub_fields_struct, def::RowType, std::fmt::Display};

pub_fields_struct! {
    #[derive(Debug, Clone, PartialEq)]
    struct ScanNode {
        table: Vec<String>,
        row_type: RowType,
    }
}

impl Display for ScanNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scan on {}", self.table.join("."))
    }
}
