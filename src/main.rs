//! fairsplit-engine CLI
//!
//! Compute shared-expense settlements from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Settle a ledger from a JSON file
//! fairsplit-engine settle --input trip.json
//!
//! # Output as JSON
//! fairsplit-engine settle --input trip.json --format json
//!
//! # Per-participant filtered spending breakdown
//! fairsplit-engine breakdown --input trip.json
//!
//! # Generate a random scenario for testing
//! fairsplit-engine generate --participants 10 --expenses 30
//! ```

use fairsplit_engine::core::category::{CategoryAssignment, CategoryName};
use fairsplit_engine::core::expense::{ExpenseLog, ExpenseRecord};
use fairsplit_engine::core::ledger::SpendingLedger;
use fairsplit_engine::core::participant::ParticipantId;
use fairsplit_engine::settlement::engine::SettlementEngine;
use fairsplit_engine::simulation::scenario::{generate_random_scenario, ScenarioConfig};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"fairsplit-engine — shared-expense settlement

USAGE:
    fairsplit-engine <COMMAND> [OPTIONS]

COMMANDS:
    settle      Compute the reimbursement plan for a ledger
    breakdown   Show per-participant filtered spending totals
    generate    Generate a random expense scenario (for testing)
    help        Show this message

OPTIONS (settle, breakdown):
    --input <FILE>      Path to JSON ledger file
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (generate):
    --participants <N>  Number of participants (default: 10)
    --expenses <N>      Number of expenses (default: 30)
    --categories <LIST> Comma-separated category labels (default: Food,Travel,Lodging)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    fairsplit-engine settle --input trip.json
    fairsplit-engine settle --input trip.json --format json
    fairsplit-engine breakdown --input trip.json
    fairsplit-engine generate --participants 5 --expenses 20 --output test.json"#
    );
}

/// JSON schema for an input expense entry.
#[derive(serde::Deserialize)]
struct ExpenseInput {
    participant: String,
    category: String,
    amount: String,
}

/// JSON schema for an input ledger.
///
/// When `assignments` is omitted, every participant is charged for every
/// category seen in the expense list (plain even split).
#[derive(serde::Deserialize)]
struct LedgerFile {
    participants: Vec<String>,
    #[serde(default)]
    assignments: Option<HashMap<String, Vec<String>>>,
    expenses: Vec<ExpenseInput>,
}

/// JSON output schema for settlement results.
#[derive(serde::Serialize)]
struct SettlementOutput {
    total_spent: String,
    fair_share: String,
    settled: bool,
    balances: Vec<BalanceOutput>,
    transactions: Vec<TransactionOutput>,
}

#[derive(serde::Serialize)]
struct BalanceOutput {
    participant: String,
    balance: String,
    status: String,
}

#[derive(serde::Serialize)]
struct TransactionOutput {
    debtor: String,
    creditor: String,
    amount: String,
}

#[derive(serde::Serialize)]
struct BreakdownOutput {
    participant: String,
    total: String,
    categories: HashMap<String, String>,
}

struct LoadedLedger {
    roster: Vec<ParticipantId>,
    assignment: CategoryAssignment,
    log: ExpenseLog,
}

fn load_ledger(path: &str) -> LoadedLedger {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: LedgerFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "participants": ["Alice", "Bob", "Carol"],
  "assignments": {{ "Alice": ["Food"] }},
  "expenses": [
    {{ "participant": "Alice", "category": "Food", "amount": "42.50" }}
  ]
}}"#
        );
        process::exit(1);
    });

    let roster: Vec<ParticipantId> = file.participants.iter().map(ParticipantId::new).collect();

    let mut log = ExpenseLog::new();
    for entry in &file.expenses {
        let amount: Decimal = entry.amount.parse().unwrap_or_else(|e| {
            eprintln!("Invalid amount '{}': {}", entry.amount, e);
            process::exit(1);
        });
        if amount <= Decimal::ZERO {
            eprintln!(
                "Invalid amount '{}': expense amounts must be positive",
                entry.amount
            );
            process::exit(1);
        }
        log.push(ExpenseRecord::new(
            ParticipantId::new(&entry.participant),
            CategoryName::new(&entry.category),
            amount,
        ));
    }

    let assignment = match &file.assignments {
        Some(map) => {
            let mut assignment = CategoryAssignment::new();
            for (participant, categories) in map {
                assignment.assign(
                    ParticipantId::new(participant),
                    categories.iter().map(CategoryName::new),
                );
            }
            assignment
        }
        None => CategoryAssignment::full(roster.iter().cloned(), log.categories()),
    };

    LoadedLedger {
        roster,
        assignment,
        log,
    }
}

/// Parse `--input` / `--format` flags shared by settle and breakdown.
fn parse_io_flags(args: &[String]) -> (String, String) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });
    (path, format)
}

fn cmd_settle(args: &[String]) {
    let (path, format) = parse_io_flags(args);
    let loaded = load_ledger(&path);

    let ledger = SpendingLedger::aggregate(&loaded.log, &loaded.assignment);
    let result = SettlementEngine::settle(&loaded.roster, &ledger);

    if format == "json" {
        let balances = result
            .balance_sheet()
            .entries()
            .iter()
            .map(|(participant, balance)| BalanceOutput {
                participant: participant.to_string(),
                balance: balance.to_string(),
                status: if *balance > Decimal::ZERO {
                    "CREDITOR".to_string()
                } else if *balance < Decimal::ZERO {
                    "DEBTOR".to_string()
                } else {
                    "EVEN".to_string()
                },
            })
            .collect();

        let output = SettlementOutput {
            total_spent: result.total_spent().to_string(),
            fair_share: result.fair_share().to_string(),
            settled: result.is_settled(),
            balances,
            transactions: result
                .transactions()
                .iter()
                .map(|t| TransactionOutput {
                    debtor: t.debtor.to_string(),
                    creditor: t.creditor.to_string(),
                    amount: t.amount.to_string(),
                })
                .collect(),
        };

        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        println!("{}", result);
    }
}

fn cmd_breakdown(args: &[String]) {
    let (path, format) = parse_io_flags(args);
    let loaded = load_ledger(&path);

    let ledger = SpendingLedger::aggregate(&loaded.log, &loaded.assignment);

    if format == "json" {
        let mut rows: Vec<BreakdownOutput> = loaded
            .roster
            .iter()
            .map(|participant| BreakdownOutput {
                participant: participant.to_string(),
                total: ledger.total_for(participant).to_string(),
                categories: ledger
                    .breakdown_for(participant)
                    .into_iter()
                    .map(|(c, v)| (c.to_string(), v.to_string()))
                    .collect(),
            })
            .collect();
        rows.sort_by(|a, b| a.participant.cmp(&b.participant));
        println!("{}", serde_json::to_string_pretty(&rows).unwrap());
    } else {
        println!("=== Spending Breakdown (filtered) ===");
        println!("Grand Total: {}", ledger.grand_total());
        for participant in &loaded.roster {
            println!("\n--- {} ---", participant);
            println!("  Total: {}", ledger.total_for(participant));
            let mut categories: Vec<_> = ledger.breakdown_for(participant).into_iter().collect();
            categories.sort_by(|a, b| a.0.cmp(&b.0));
            for (category, amount) in categories {
                println!("  {:<12} {}", category, amount);
            }
        }
    }
}

fn cmd_generate(args: &[String]) {
    let mut participants = 10usize;
    let mut expense_count = 30usize;
    let mut categories_str = "Food,Travel,Lodging".to_string();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--participants" => {
                i += 1;
                participants = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--participants requires a number");
                    process::exit(1);
                });
            }
            "--expenses" => {
                i += 1;
                expense_count = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--expenses requires a number");
                    process::exit(1);
                });
            }
            "--categories" => {
                i += 1;
                categories_str = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--categories requires a comma-separated list");
                    process::exit(1);
                });
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let categories: Vec<CategoryName> = categories_str
        .split(',')
        .map(|s| CategoryName::new(s.trim()))
        .collect();

    let config = ScenarioConfig {
        participant_count: participants,
        categories,
        expenses_per_participant: expense_count / participants.max(1),
        ..Default::default()
    };

    let scenario = generate_random_scenario(&config);

    #[derive(serde::Serialize)]
    struct OutputExpense {
        participant: String,
        category: String,
        amount: String,
    }

    #[derive(serde::Serialize)]
    struct OutputFile {
        participants: Vec<String>,
        expenses: Vec<OutputExpense>,
    }

    let output = OutputFile {
        participants: scenario.roster.iter().map(|p| p.to_string()).collect(),
        expenses: scenario
            .log
            .records()
            .iter()
            .map(|r| OutputExpense {
                participant: r.participant().to_string(),
                category: r.category().to_string(),
                amount: r.amount().to_string(),
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&output).unwrap();

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} expenses across {} participants → {}",
            scenario.log.len(),
            participants,
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "settle" => cmd_settle(rest),
        "breakdown" => cmd_breakdown(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
