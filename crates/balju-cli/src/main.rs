//! balju CLI - order-entry desk

mod logging;
mod render;
mod session;

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use balju::prelude::*;
use balju::{
    discover_master, inspect, is_binary_workbook, parse_line, ExcelComAppender, ExcelComConfig,
    OrderForm, MASTER_ENV,
};
use clap::{Args, Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "balju")]
#[command(author, version, about = "Order entry against the master order workbook")]
struct Cli {
    /// Master workbook (default: next to the executable, then the working directory)
    #[arg(long, global = true, env = MASTER_ENV)]
    master: Option<PathBuf>,

    /// File that log output is appended to
    #[arg(long, global = true, default_value = "debug.log")]
    log_file: PathBuf,

    #[command(flatten)]
    layout: LayoutArgs,

    #[command(flatten)]
    automation: AutomationArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Where the catalog sits in the master workbook
#[derive(Args)]
struct LayoutArgs {
    /// Sheet holding the product codes
    #[arg(long, global = true)]
    product_sheet: Option<String>,

    /// 0-based row of the product header
    #[arg(long, global = true)]
    product_header_row: Option<u32>,

    /// Sheet holding the store addresses
    #[arg(long, global = true)]
    address_sheet: Option<String>,

    /// 0-based row of the address header
    #[arg(long, global = true)]
    address_header_row: Option<u32>,
}

impl LayoutArgs {
    fn layout(&self) -> CatalogLayout {
        let mut layout = CatalogLayout::default();
        if let Some(sheet) = &self.product_sheet {
            layout.product_sheet = sheet.clone();
        }
        if let Some(row) = self.product_header_row {
            layout.product_header_row = row;
        }
        if let Some(sheet) = &self.address_sheet {
            layout.address_sheet = sheet.clone();
        }
        if let Some(row) = self.address_header_row {
            layout.address_header_row = row;
        }
        layout
    }
}

/// Excel automation used for .xlsb export
#[derive(Args)]
struct AutomationArgs {
    /// Path to balju-com-bridge.exe
    #[arg(long, global = true, env = "BALJU_BRIDGE_EXE")]
    bridge_exe: Option<PathBuf>,

    /// WINE executable used to run the bridge
    #[arg(long, global = true, env = "BALJU_WINE")]
    wine: Option<PathBuf>,

    /// WINEPREFIX for the bridge
    #[arg(long, global = true)]
    wine_prefix: Option<PathBuf>,
}

impl AutomationArgs {
    fn appender(&self) -> ExcelComAppender {
        let mut config = ExcelComConfig::default();
        if self.bridge_exe.is_some() {
            config.bridge_exe_path = self.bridge_exe.clone();
        }
        if self.wine.is_some() {
            config.wine_path = self.wine.clone();
        }
        if self.wine_prefix.is_some() {
            config.wine_prefix = self.wine_prefix.clone();
        }
        ExcelComAppender::new(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the items a product code resolves to
    Lookup {
        /// Product code
        code: String,
    },

    /// Parse pasted rows from stdin and print their fields
    Parse,

    /// Add every row of a paste file and export the list
    Import {
        /// Tab-separated rows copied from the sales sheet
        input: PathBuf,

        /// Destination (.xlsb appends to 발주내역, anything else is a new xlsx)
        #[arg(short, long)]
        output: PathBuf,

        /// Replace the existing 발주내역 rows instead of appending
        #[arg(long)]
        overwrite: bool,
    },

    /// Print the address recorded for a store
    Address {
        /// Store name
        store: String,
    },

    /// Show the sheets and first rows of a workbook
    Inspect {
        /// Workbook file (xlsx, xlsb, xls, ods)
        input: PathBuf,

        /// Rows to show per sheet
        #[arg(short, long, default_value = "5")]
        rows: usize,
    },

    /// Interactive order entry
    #[command(alias = "repl")]
    Session,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_file)?;

    match &cli.command {
        Commands::Lookup { code } => lookup(&cli, code),
        Commands::Parse => parse_stdin(),
        Commands::Import {
            input,
            output,
            overwrite,
        } => import(&cli, input, output, *overwrite),
        Commands::Address { store } => address(&cli, store),
        Commands::Inspect { input, rows } => show_inspect(input, *rows),
        Commands::Session => run_session(&cli),
    }
}

fn master_path(cli: &Cli) -> PathBuf {
    discover_master(cli.master.as_deref())
}

/// Load the master workbook, failing on any load error
fn load_catalog(cli: &Cli) -> Result<Catalog> {
    let path = master_path(cli);
    let catalog = CatalogLoader::load_with(&path, &cli.layout.layout())
        .with_context(|| format!("Failed to load master workbook '{}'", path.display()))?;
    info!(
        path = %path.display(),
        products = catalog.products.len(),
        addresses = catalog.addresses.len(),
        "master workbook loaded"
    );
    Ok(catalog)
}

fn lookup(cli: &Cli, code: &str) -> Result<()> {
    let catalog = load_catalog(cli)?;
    let items = catalog.products.lookup(code);
    if items.is_empty() {
        bail!("Product code '{}' is not in the catalog", code.trim());
    }

    let mut out = io::stdout().lock();
    render::items(&mut out, &items)?;
    Ok(())
}

fn parse_stdin() -> Result<()> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;

    let mut out = io::stdout().lock();
    let mut count = 0;
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        count += 1;
        writeln!(out, "row {count}:")?;
        let row = parse_line(line);
        let form = OrderForm {
            header: row.header,
            barcode: row.barcode,
        };
        render::form(&mut out, &form)?;
    }
    if count == 0 {
        eprintln!("No rows on stdin");
    }
    Ok(())
}

fn import(cli: &Cli, input: &Path, output: &Path, overwrite: bool) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read '{}'", input.display()))?;

    let mut desk = Desk::new(load_catalog(cli)?);
    if is_binary_workbook(output) {
        desk.set_appender(Some(Box::new(cli.automation.appender())));
    }

    let report = desk.import(&text);
    render::batch_report(&mut io::stderr().lock(), &report)?;

    let mode = if overwrite {
        AppendMode::Overwrite
    } else {
        AppendMode::Append
    };
    let exported = desk
        .export(output, mode)
        .with_context(|| format!("Failed to export to '{}'", output.display()))?;
    render::export_report(&mut io::stderr().lock(), &exported)?;
    Ok(())
}

fn address(cli: &Cli, store: &str) -> Result<()> {
    let catalog = load_catalog(cli)?;
    match catalog.addresses.address_of(store) {
        Some(address) => {
            println!("{address}");
            Ok(())
        }
        None => bail!("No address recorded for store '{store}'"),
    }
}

fn show_inspect(input: &Path, rows: usize) -> Result<()> {
    let previews =
        inspect(input, rows).with_context(|| format!("Failed to open '{}'", input.display()))?;

    let mut out = io::stdout().lock();
    writeln!(out, "File: {}", input.display())?;
    writeln!(out, "Sheets: {}", previews.len())?;
    for preview in &previews {
        writeln!(out)?;
        writeln!(
            out,
            "[{}] {} rows x {} columns",
            preview.name, preview.total_rows, preview.width
        )?;
        for (idx, row) in preview.rows.iter().enumerate() {
            writeln!(out, "  {:>3}: {}", idx + 1, row.join(" | "))?;
        }
    }
    Ok(())
}

fn run_session(cli: &Cli) -> Result<()> {
    let master = master_path(cli);
    let desk = Desk::open(&master, &cli.layout.layout())
        .with_appender(Box::new(cli.automation.appender()));

    let mut session = session::Session::new(desk, io::stdin().lock(), io::stdout());
    session.run().context("Session aborted")?;
    Ok(())
}
