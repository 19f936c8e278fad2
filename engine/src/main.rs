// Engine main entry point
use anyhow::Context;
use clap::Parser;
use engine::cli::CliArgs;
use engine::config::settings::EditorSettings;
use engine::data::session::EditorSession;
use engine::services::CsvEditorService;
use shared::models::SortDirection;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only table output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    info!("Starting CSV engine...");

    let settings = EditorSettings::load(&args.settings)
        .with_context(|| format!("failed to read settings from {}", args.settings.display()))?;
    let session = Arc::new(RwLock::new(EditorSession::new()));
    let mut service = CsvEditorService::new(session.clone(), Arc::new(RwLock::new(settings)));
    if args.save_settings {
        service = service.with_settings_path(args.settings.clone());
    }

    let update = args.preferences_update();
    if args.save_settings || update.currency_format.is_some() || update.source_format.is_some() {
        service.update_preferences(update).await?;
    }

    service
        .load_csv_file(&args.input)
        .await
        .with_context(|| format!("failed to load {}", args.input.display()))?;

    if !args.convert.is_empty() {
        let converted = service.convert_columns(&args.convert).await?;
        info!(converted, "Conversion finished");
    }

    if let Some(column) = &args.sort {
        let mut state = service.toggle_sort(column).await?;
        if args.desc && state.direction == Some(SortDirection::Ascending) {
            state = service.toggle_sort(column).await?;
        }
        info!(column = ?state.column, direction = ?state.direction, "Sorted");
    }

    if !args.filters.is_empty() {
        for (column, text) in &args.filters {
            service.set_filter(column, text).await?;
        }
        let session = session.read().await;
        let table = session.table();
        let visible = session.visible_rows();
        println!("{}", table.headers.join("\t"));
        for row in visible {
            let cells: Vec<&str> = (0..table.column_count()).map(|col| table.cell(row, col)).collect();
            println!("{}", cells.join("\t"));
        }
    }

    if args.sums {
        let sums = service.column_sums().await?;
        let headers = session.read().await.table().headers.clone();
        for (header, sum) in headers.iter().zip(sums) {
            if !sum.is_empty() {
                println!("{}\t{}", header, sum);
            }
        }
    }

    if args.csv {
        let path = service.export_csv(&args.out_dir).await?;
        println!("{}", path.display());
    }
    if args.xlsx {
        let path = service.export_xlsx(&args.out_dir).await?;
        println!("{}", path.display());
    }

    Ok(())
}
