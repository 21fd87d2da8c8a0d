use crate::domain::models::{Transaction as DomainTransaction, TransactionKind as DomainTransactionKind};
use crate::domain::TransactionPage;
use shared::{
    PaginationInfo, Transaction as SharedTransaction, TransactionKind as SharedTransactionKind,
    TransactionListResponse,
};

pub struct TransactionMapper;

impl TransactionMapper {
    pub fn to_dto(domain: DomainTransaction) -> SharedTransaction {
        SharedTransaction {
            id: domain.id,
            kind: Self::to_dto_kind(domain.kind),
            account_id: domain.account_id,
            category_id: domain.category_id,
            currency_id: domain.currency_id,
            amount: domain.amount.to_decimal(),
            date: domain.date,
            description: domain.description,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }

    pub fn to_list_response(page: TransactionPage) -> TransactionListResponse {
        TransactionListResponse {
            transactions: page.transactions.into_iter().map(Self::to_dto).collect(),
            pagination: PaginationInfo {
                has_more: page.has_more,
                next_cursor: page.next_cursor,
            },
        }
    }

    pub fn to_dto_kind(kind: DomainTransactionKind) -> SharedTransactionKind {
        match kind {
            DomainTransactionKind::Expense => SharedTransactionKind::Expense,
            DomainTransactionKind::Income => SharedTransactionKind::Income,
        }
    }
}
