use std::sync::Arc;
use std::time::{Duration, Instant};

use colored::*;
use ecotrack::config::Config;
use ecotrack::domain::models::payment::{Payment, PaymentStatus};
use ecotrack::error::AppError;
use ecotrack::infra::factory::{bootstrap_state, connect_durable_store};
use ecotrack::state::AppState;
use hdrhistogram::Histogram;
use uuid::Uuid;

const ITERATIONS: usize = 200;

enum Operation {
    AddMessage,
    InsertPaidPayment,
    ProfileUpdate,
    Login,
}

struct Target {
    name: &'static str,
    op: Operation,
}

#[tokio::main]
async fn main() {
    println!("{}", "🚀 Starting Write-Through Benchmark".bold().green());

    let mut config = Config::from_env();
    let scratch_file = if std::env::var("DATABASE_URL").is_err() {
        let file = format!("ecotrack-bench-{}.db", Uuid::new_v4());
        config.database_url = format!("sqlite://{}?mode=rwc", file);
        Some(file)
    } else {
        None
    };
    println!("Storage: {}", config.database_url);

    // Fail fast before seeding so a bad URL gives a clear message.
    if let Err(e) = connect_durable_store(&config.database_url).await {
        eprintln!("{}", format!("❌ Storage is NOT reachable: {}", e).red().bold());
        return;
    }

    let state = match bootstrap_state(&config).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            eprintln!("{}", format!("❌ Bootstrap failed: {}", e).red().bold());
            return;
        }
    };

    let targets = [
        Target { name: "Direct Message (single collection)", op: Operation::AddMessage },
        Target { name: "Paid Payment Insert", op: Operation::InsertPaidPayment },
        Target { name: "Profile Update (users collection)", op: Operation::ProfileUpdate },
        Target { name: "Login Flow (Argon2 + streak + session)", op: Operation::Login },
    ];

    for target in &targets {
        println!("\n{}", "=".repeat(60));
        println!("Benchmarking: {}", target.name.cyan().bold());
        println!("{}", "=".repeat(60));
        println!("{:<10} | {:<15} | {:<15} | {:<15}", "Ops", "Mean (ms)", "P99 (ms)", "Success Rate");
        println!("{:-<10}-+-{:-<15}-+-{:-<15}-+-{:-<15}", "", "", "", "");

        run_stage(&state, target).await;
    }

    if let Some(file) = scratch_file {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", file, suffix));
        }
    }
}

async fn run_once(state: &AppState, op: &Operation, i: usize) -> Result<(), AppError> {
    match op {
        Operation::AddMessage => {
            state.repo.add_message("HH-ASHA-0001", &format!("Benchmark message {}", i)).await?;
        }
        Operation::InsertPaidPayment => {
            let mut payment = Payment::new("HH-JANE-9876".into(), 75, None, chrono::Utc::now());
            payment.status = PaymentStatus::Paid;
            state.repo.add_payment(payment).await?;
        }
        Operation::ProfileUpdate => {
            if let Some(mut user) = state.repo.find_user("HH-JANE-9876").await {
                user.address = Some(format!("House {}", i));
                state.repo.update_user(user).await?;
            }
        }
        Operation::Login => {
            state.auth_service.login("jane.doe@example.com", "password456", false).await?;
        }
    }
    Ok(())
}

async fn run_stage(state: &AppState, target: &Target) {
    let mut histogram = match Histogram::<u64>::new(3) {
        Ok(h) => h,
        Err(e) => {
            eprintln!("Histogram setup failed: {}", e);
            return;
        }
    };
    let mut successes = 0;

    for i in 0..ITERATIONS {
        let started = Instant::now();
        let ok = run_once(state, &target.op, i).await.is_ok();
        let latency = started.elapsed();

        if ok {
            successes += 1;
        }
        let _ = histogram.record(latency.as_micros() as u64);
    }

    let mean_ms = histogram.mean() / 1000.0;
    let p99_ms = histogram.value_at_quantile(0.99) as f64 / 1000.0;
    let success_rate = (successes as f64 / ITERATIONS as f64) * 100.0;

    println!("{:<10} | {:<15.2} | {:<15.2} | {:<14.1}%", ITERATIONS, mean_ms, p99_ms, success_rate);

    tokio::time::sleep(Duration::from_millis(200)).await;
}
