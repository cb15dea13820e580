// Batch command and server launcher.

use crate::application::ReviewOptions;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::spreadsheet::{discover_spreadsheets, read_table, SpreadsheetCandidate};
use crate::infrastructure::storage::{write_mail_draft, write_report};
use crate::interfaces::http::start_server;
use crate::interfaces::state::AppState;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

#[derive(Parser)]
#[command(name = "press-review")]
#[command(about = "Build an HTML press review from a press-clipping spreadsheet")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a spreadsheet and write the report plus a mail draft
    #[command(after_help = "\
Examples:
  press-review build
  press-review build --excel data/veille.xlsx --max-rows 20
  press-review build --title \"Revue hebdo\" --to redaction@example.com")]
    Build {
        /// Spreadsheet to read; newest *.xlsx in the data directory otherwise
        #[arg(long)]
        excel: Option<PathBuf>,

        /// Worksheet name
        #[arg(long)]
        sheet: Option<String>,

        /// Report heading and mail subject
        #[arg(long)]
        title: Option<String>,

        /// Only summarize the first N rows
        #[arg(long)]
        max_rows: Option<usize>,

        /// Mail draft recipient
        #[arg(long, default_value = "")]
        to: String,

        /// HTML report path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Directory searched when --excel is absent
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Serve the review endpoint over HTTP
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

pub struct BuildArgs {
    pub excel: Option<PathBuf>,
    pub sheet: Option<String>,
    pub title: Option<String>,
    pub max_rows: Option<usize>,
    pub to: String,
    pub output: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

pub async fn run(cli: Cli) -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let result = match cli.command {
        Commands::Build {
            excel,
            sheet,
            title,
            max_rows,
            to,
            output,
            data_dir,
        } => {
            let args = BuildArgs {
                excel,
                sheet,
                title,
                max_rows,
                to,
                output,
                data_dir,
            };
            build(AppState::new(config), args).await
        }
        Commands::Serve { host, port } => serve(config, host, port).await,
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            error!(error = %e, "Command failed");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

pub async fn build(state: AppState, args: BuildArgs) -> Result<()> {
    let config = &state.config;
    let data_dir = args.data_dir.unwrap_or_else(|| config.data_dir.clone());
    let sheet = args.sheet.unwrap_or_else(|| config.sheet.clone());
    let output = args.output.unwrap_or_else(|| config.output_file.clone());
    let options = ReviewOptions {
        title: args.title.unwrap_or_else(|| config.report_title.clone()),
        max_rows: args.max_rows,
    };

    let excel_path = match args.excel {
        Some(path) => path,
        None => {
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            match find_spreadsheet(&data_dir, &mut stdin.lock(), &mut stdout)? {
                Some(path) => path,
                None => {
                    println!("❌ Aucun fichier Excel trouvé dans {}", data_dir.display());
                    return Err(AppError::NotFound(format!(
                        "No spreadsheet in {}",
                        data_dir.display()
                    )));
                }
            }
        }
    };
    println!("✅ Fichier sélectionné : {}", excel_path.display());

    let path = excel_path.clone();
    let sheet_name = sheet.clone();
    let table = tokio::task::spawn_blocking(move || read_table(&path, &sheet_name))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .inspect_err(|e| println!("Erreur de lecture Excel: {}", e))?;

    let review = match state.press_review_use_case().execute(&table, &options).await {
        Ok(review) => review,
        Err(AppError::SchemaError(issues)) => {
            print_issues(&issues);
            println!("❌ Colonnes requises introuvables.");
            return Err(AppError::SchemaError(issues));
        }
        Err(e) => return Err(e),
    };

    print_issues(&review.issues.iter().map(|i| i.to_string()).collect::<Vec<_>>());
    for record in review.records.iter().filter(|r| r.summary.is_fallback()) {
        println!("[⚠] Résumé échoué : {}", record.record.publication);
    }

    write_report(&output, &review.html)?;
    println!("✅ Fichier HTML généré : {}", output.display());

    let draft = output.with_extension("eml");
    write_mail_draft(
        &draft,
        &config.mail_from,
        &args.to,
        &options.title,
        &review.html,
    )?;
    println!("✉️ Brouillon de mail : {}", draft.display());

    info!(
        input = %excel_path.display(),
        records = review.records.len(),
        fallbacks = review.fallback_count(),
        "Press review written"
    );
    Ok(())
}

async fn serve(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.http_host = host;
    }
    if let Some(port) = port {
        config.http_port = port;
    }
    info!(host = %config.http_host, port = config.http_port, "Starting HTTP server");

    let state = Arc::new(AppState::new(config));
    let server = start_server(state, Arc::new(Mutex::new(Vec::new())))?;
    server.await?;
    Ok(())
}

fn print_issues(issues: &[String]) {
    if issues.is_empty() {
        return;
    }
    println!("=== Problèmes détectés ===");
    for issue in issues {
        println!(" - {}", issue);
    }
}

/// A single spreadsheet is used as is; several are listed and the operator
/// picks one by number.
pub fn find_spreadsheet<R: BufRead, W: Write>(
    data_dir: &Path,
    input: &mut R,
    out: &mut W,
) -> Result<Option<PathBuf>> {
    let mut candidates = discover_spreadsheets(data_dir)?;
    match candidates.len() {
        0 => Ok(None),
        1 => Ok(candidates.pop().map(|c| c.path)),
        _ => prompt_choice(&candidates, input, out).map(Some),
    }
}

fn prompt_choice<R: BufRead, W: Write>(
    candidates: &[SpreadsheetCandidate],
    input: &mut R,
    out: &mut W,
) -> Result<PathBuf> {
    writeln!(out, "📂 Plusieurs fichiers trouvés :")?;
    for (i, candidate) in candidates.iter().enumerate() {
        writeln!(
            out,
            " {}. {} (modifié le {})",
            i + 1,
            candidate.file_name(),
            candidate.modified.format("%d/%m/%Y %H:%M")
        )?;
    }

    loop {
        write!(out, "👉 Entrez le numéro du fichier à utiliser : ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(AppError::ValidationError(
                "No spreadsheet selected".to_string(),
            ));
        }
        if let Some(idx) = parse_choice(&line, candidates.len()) {
            return Ok(candidates[idx].path.clone());
        }
        writeln!(out, "⚠️ Choix invalide, réessayez.")?;
    }
}

/// 1-based answer to a 0-based index.
fn parse_choice(answer: &str, count: usize) -> Option<usize> {
    let n: usize = answer.trim().parse().ok()?;
    (1..=count).contains(&n).then(|| n - 1)
}
