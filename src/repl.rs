//! Interactive chat loop — the terminal face of the pipeline.

use std::io::{self, Write};

use crate::chart::ChartData;
use crate::pdf::DOWNLOAD_FILENAME;
use crate::pipeline::Pipeline;
use crate::session::Role;

const EXAMPLE_QUESTIONS: &[&str] = &[
    "how many users are there?",
    "show the ten most recent orders",
    "total revenue per month this year",
    "which customers have no orders?",
];

/// Run the chat loop until "exit". Questions flow through the pipeline;
/// `/chart` and `/pdf` post-process the last answer.
pub async fn run(pipeline: &mut Pipeline) {
    banner();

    loop {
        print!("❯ ");
        io::stdout().flush().ok();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            break;
        }
        let line = input.trim();

        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") || line == "q" {
            break;
        }

        match line {
            "/chart" => show_chart(pipeline).await,
            "/pdf" => export_pdf(pipeline),
            "/history" => show_history(pipeline),
            "/help" => help(),
            _ => {
                let reply = pipeline.respond(line).await;
                println!("\n{}\n", reply);
            }
        }
    }
}

fn banner() {
    println!();
    println!("╔════════════════════════════════════════════════════╗");
    println!("║   tablechat — ask your database anything           ║");
    println!("╠════════════════════════════════════════════════════╣");
    println!("║  Type a question, or /chart /pdf /history /help.   ║");
    println!("║  Type 'exit' or Ctrl+C to leave.                   ║");
    println!("╠════════════════════════════════════════════════════╣");
    println!("  Examples:");
    for q in EXAMPLE_QUESTIONS {
        println!("    • {}", q);
    }
    println!("╚════════════════════════════════════════════════════╝");
    println!();
}

fn help() {
    println!("  /chart    extract label/value pairs from the last answer and draw them");
    println!("  /pdf      export the last answer as {}", DOWNLOAD_FILENAME);
    println!("  /history  replay this session's transcript");
    println!("  exit      leave");
}

async fn show_chart(pipeline: &Pipeline) {
    match pipeline.chart().await {
        Ok(None) => println!("Nothing to chart yet — ask a question first."),
        Ok(Some(data)) if data.is_empty() => println!("No chartable data found."),
        Ok(Some(data)) => print_bar_chart(&data),
        Err(e) => println!("Chart failed: {}", e),
    }
}

fn export_pdf(pipeline: &Pipeline) {
    if pipeline.session().last_answer().is_none() {
        println!("Nothing to export yet — ask a question first.");
        return;
    }
    match pipeline.document() {
        Some(bytes) => match std::fs::write(DOWNLOAD_FILENAME, &bytes) {
            Ok(()) => println!("Saved {} bytes → {}", bytes.len(), DOWNLOAD_FILENAME),
            Err(e) => println!("Could not write {}: {}", DOWNLOAD_FILENAME, e),
        },
        None => println!("Error generating PDF. Please try again."),
    }
}

fn show_history(pipeline: &Pipeline) {
    let turns = pipeline.session().turns();
    if turns.is_empty() {
        println!("No messages yet.");
        return;
    }
    for turn in turns {
        let who = match turn.role {
            Role::User => "you",
            Role::Assistant => "bot",
        };
        println!("[{}] {}:", turn.at.format("%H:%M:%S"), who);
        println!("{}", turn.content);
        println!();
    }
}

/// Aligned label/bar/value rows, widest bar capped at 40 cells.
fn print_bar_chart(data: &ChartData) {
    let max_value = data.y_values.iter().cloned().fold(0.0_f64, f64::max);
    let label_width = data.x_labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    println!();
    for (label, value) in data.x_labels.iter().zip(data.y_values.iter()) {
        let cells = if max_value > 0.0 {
            ((value / max_value) * 40.0).round() as usize
        } else {
            0
        };
        println!("  {:<label_width$} │ {:<40} {}", label, "█".repeat(cells), value);
    }
    println!();
}
