use super::transaction::TransactionKind;

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub owner_id: String,
    pub kind: TransactionKind,
    pub name: String,
    pub description: Option<String>,
}
