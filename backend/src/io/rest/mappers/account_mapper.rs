use crate::domain::models::{Account as DomainAccount, BalanceSnapshot};
use crate::domain::{BalanceAudit, HistoryPage};
use shared::{
    Account as SharedAccount, BalanceAuditResponse, BalanceHistoryEntry, BalanceHistoryResponse, PaginationInfo,
};

pub struct AccountMapper;

impl AccountMapper {
    pub fn to_dto(domain: DomainAccount) -> SharedAccount {
        SharedAccount {
            id: domain.id,
            name: domain.name,
            account_type_id: domain.account_type_id,
            bank_id: domain.bank_id,
            currency_id: domain.currency_id,
            balance: domain.balance.to_decimal(),
            opening_balance: domain.opening_balance.to_decimal(),
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }

    pub fn to_history_response(page: HistoryPage) -> BalanceHistoryResponse {
        BalanceHistoryResponse {
            account_id: page.account_id,
            entries: page.entries.into_iter().map(Self::to_history_entry).collect(),
            pagination: PaginationInfo {
                has_more: page.has_more,
                next_cursor: page.next_cursor.map(|date| date.format("%Y-%m-%d").to_string()),
            },
        }
    }

    fn to_history_entry(snapshot: BalanceSnapshot) -> BalanceHistoryEntry {
        BalanceHistoryEntry {
            date: snapshot.date,
            balance: snapshot.balance.to_decimal(),
        }
    }

    pub fn to_audit_response(audit: BalanceAudit) -> BalanceAuditResponse {
        let consistent = audit.is_consistent();
        BalanceAuditResponse {
            account_id: audit.account_id,
            expected_balance: audit.expected.to_decimal(),
            actual_balance: audit.actual.to_decimal(),
            consistent,
            transaction_count: audit.transaction_count,
        }
    }
}
