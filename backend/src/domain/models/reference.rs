//! Owned lookup data that accounts point at.

#[derive(Debug, Clone, PartialEq)]
pub struct Currency {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub code: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bank {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountType {
    pub id: String,
    pub owner_id: String,
    pub name: String,
}
