use clap::Parser;
use log::{error, info};
use rdsr_ncirf_core::cli::Cli;
use rdsr_ncirf_core::output::write_rows_to_path;
use rdsr_ncirf_core::report::read_report_file;
use rdsr_ncirf_core::{HvlTable, NcirfConverter, Result, TextReport};
use std::process;

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        error!("Conversion failed: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.conversion_config()?;

    let mut converter = NcirfConverter::new(config);
    if let Some(path) = &cli.hvl_table {
        converter = converter.with_hvl_table(HvlTable::from_csv_path(path)?);
    }

    info!("Processing file: {}", cli.file.display());
    let report = read_report_file(&cli.file)?;

    if cli.dump_events {
        let events = converter.extract_events(&report)?;
        println!("{}", serde_json::to_string_pretty(&events)?);
    }

    let conversion = converter.convert(&report)?;

    let output = cli.output_path();
    write_rows_to_path(&output, &conversion.rows)?;

    println!("{}", TextReport::new(&conversion));
    println!("Output:         {}", output.display());
    Ok(())
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}
