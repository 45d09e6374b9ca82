use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rust_decimal::Decimal;
use time::{Date, Duration, macros::date};

use budget_me_not::{
    Config, open_db,
    models::{Account, AccountName, AccountType, Category, CategoryName, Transaction},
    money::Money,
    stores::{
        AccountStore, CategoryStore, TransactionStore,
        sqlite::{SQLiteAccountStore, SQLiteCategoryStore, SQLiteTransactionStore},
    },
};

/// A utility for creating a demo database for the REST API server of budget_me_not.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Arc::new(Mutex::new(open_db(&Config::new(output_path))?));

    let accounts = SQLiteAccountStore::new(connection.clone());
    let categories = SQLiteCategoryStore::new(connection.clone());
    let transactions = SQLiteTransactionStore::new(connection);

    println!("Creating accounts...");
    let checking = accounts.add(
        Account::build(AccountName::new("Everyday")?, AccountType::Checking)
            .balance(money(1_250, 0)?),
    )?;
    let savings = accounts.add(
        Account::build(AccountName::new("Rainy Day")?, AccountType::Savings)
            .balance(money(10_000, 0)?),
    )?;
    accounts.add(
        Account::build(AccountName::new("Visa")?, AccountType::Credit).balance(money(-45_050, 2)?),
    )?;

    println!("Creating categories...");
    let income = categories.add(Category::build(CategoryName::new("Income")?))?;
    let food = categories
        .add(Category::build(CategoryName::new("Food")?).target_amount(money(200, 0)?))?;
    let groceries = categories.add(
        Category::build(CategoryName::new("Groceries")?)
            .parent_id(Some(food.id))
            .target_amount(money(450, 0)?),
    )?;
    let eating_out = categories.add(
        Category::build(CategoryName::new("Eating Out")?)
            .parent_id(Some(food.id))
            .target_amount(money(120, 0)?),
    )?;
    let housing = categories
        .add(Category::build(CategoryName::new("Housing")?).target_amount(money(1_800, 0)?))?;

    println!("Creating transactions...");
    let start: Date = date!(2025 - 01 - 01);
    for week in 0..12 {
        let day = start + Duration::weeks(week);

        if week % 2 == 0 {
            transactions.add(Transaction::build(
                money(2_400, 0)?,
                day,
                "Salary",
                checking.id,
                income.id,
            ))?;
        }

        if week % 4 == 0 {
            transactions.add(Transaction::build(
                money(-1_800, 0)?,
                day,
                "Rent",
                checking.id,
                housing.id,
            ))?;
            transactions.add(Transaction::build(
                money(200, 0)?,
                day,
                "Savings transfer",
                savings.id,
                income.id,
            ))?;
        }

        transactions.add(Transaction::build(
            money(-(9_000 + week * 137), 2)?,
            day + Duration::days(2),
            "Supermarket",
            checking.id,
            groceries.id,
        ))?;
        transactions.add(Transaction::build(
            money(-(2_350 + week * 45), 2)?,
            day + Duration::days(5),
            "Takeaways",
            checking.id,
            eating_out.id,
        ))?;
    }

    println!("Success!");

    Ok(())
}

fn money(units: i64, scale: u32) -> Result<Money, budget_me_not::Error> {
    Money::new(Decimal::new(units, scale))
}
