//! Fixtures shared by the unit tests: a fresh in-memory database with one
//! user who owns a currency, bank, account type, an account and one
//! category of each kind.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::models::{Account, AccountType, Bank, Category, Currency, Transaction, TransactionKind, User};
use crate::domain::money::Money;
use crate::storage::{AccountRepository, CategoryRepository, DbConnection, ReferenceRepository, UserRepository};

pub struct Fixture {
    pub db: DbConnection,
    pub owner_id: String,
    pub currency_id: String,
    pub bank_id: String,
    pub account_type_id: String,
    pub account_id: String,
    pub expense_category_id: String,
    pub income_category_id: String,
}

/// Opening balance of the fixture account
pub const OPENING_CENTS: i64 = 100_000;

pub async fn setup() -> Fixture {
    let db = DbConnection::in_memory().await.expect("Failed to create test database");
    setup_on(db).await
}

/// Same fixture on an already opened database, e.g. a file-backed one
pub async fn setup_on(db: DbConnection) -> Fixture {
    let owner_id = create_user(&db, "testuser").await;

    let references = ReferenceRepository::new(db.clone());
    let currency_id = Uuid::new_v4().to_string();
    references
        .store_currency(&Currency {
            id: currency_id.clone(),
            owner_id: owner_id.clone(),
            name: "Dollar".to_string(),
            code: "USD".to_string(),
            symbol: "$".to_string(),
        })
        .await
        .unwrap();
    let bank_id = Uuid::new_v4().to_string();
    references
        .store_bank(&Bank {
            id: bank_id.clone(),
            owner_id: owner_id.clone(),
            name: "Test Bank".to_string(),
            country: "Test Country".to_string(),
        })
        .await
        .unwrap();
    let account_type_id = Uuid::new_v4().to_string();
    references
        .store_account_type(&AccountType {
            id: account_type_id.clone(),
            owner_id: owner_id.clone(),
            name: "Savings".to_string(),
        })
        .await
        .unwrap();

    let mut fixture = Fixture {
        db,
        owner_id,
        currency_id,
        bank_id,
        account_type_id,
        account_id: String::new(),
        expense_category_id: String::new(),
        income_category_id: String::new(),
    };
    fixture.account_id = fixture.create_account("Main Account", OPENING_CENTS).await;
    fixture.expense_category_id = fixture.create_category(TransactionKind::Expense, "Groceries").await;
    fixture.income_category_id = fixture.create_category(TransactionKind::Income, "Salary").await;
    fixture
}

pub async fn create_user(db: &DbConnection, username: &str) -> String {
    let user = User {
        id: Uuid::new_v4().to_string(),
        username: username.to_string(),
        email: format!("{}@test.com", username),
        created_at: Utc::now(),
    };
    UserRepository::new(db.clone()).store_user(&user).await.unwrap();
    user.id
}

pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn at_noon(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
}

impl Fixture {
    pub async fn create_account(&self, name: &str, opening_cents: i64) -> String {
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4().to_string(),
            owner_id: self.owner_id.clone(),
            name: name.to_string(),
            account_type_id: self.account_type_id.clone(),
            bank_id: self.bank_id.clone(),
            currency_id: self.currency_id.clone(),
            balance: Money::from_cents(opening_cents),
            opening_balance: Money::from_cents(opening_cents),
            created_at: now,
            updated_at: now,
        };
        AccountRepository::new(self.db.clone()).store_account(&account).await.unwrap();
        account.id
    }

    pub async fn create_category(&self, kind: TransactionKind, name: &str) -> String {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            owner_id: self.owner_id.clone(),
            kind,
            name: name.to_string(),
            description: None,
        };
        CategoryRepository::new(self.db.clone()).store_category(&category).await.unwrap();
        category.id
    }

    /// An unsaved transaction on the fixture account
    pub fn transaction(&self, kind: TransactionKind, cents: i64, date: NaiveDate) -> Transaction {
        let category_id = match kind {
            TransactionKind::Expense => self.expense_category_id.clone(),
            TransactionKind::Income => self.income_category_id.clone(),
        };
        let now = Utc::now();
        Transaction {
            id: Uuid::new_v4().to_string(),
            owner_id: self.owner_id.clone(),
            kind,
            account_id: self.account_id.clone(),
            category_id,
            currency_id: self.currency_id.clone(),
            amount: Money::from_cents(cents),
            date: at_noon(date),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub async fn balance_of(&self, account_id: &str) -> Money {
        AccountRepository::new(self.db.clone())
            .find_account(account_id)
            .await
            .unwrap()
            .expect("account exists")
            .balance
    }
}
