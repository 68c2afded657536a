/*!
 * Command-line interface for repomaster
 */

use std::io;
use std::path::Path;
use std::process;
use std::time::Instant;

use clap::{CommandFactory, Parser};
use clap_complete::generate;

use repomaster::config::{Args, Config, FileConfig};
use repomaster::diagnostics::LogSink;
use repomaster::error::Result;
use repomaster::processor::Processor;
use repomaster::report::{print_report, ScanReport};
use repomaster::writer::MarkdownWriter;

fn setup_logging(level: log::LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", level);
}

fn run(args: Args) -> Result<()> {
    let file_config = FileConfig::load(Path::new(&args.config));
    let config = Config::from_args(args, file_config);
    config.validate()?;

    let start_time = Instant::now();

    let sink = LogSink;
    let report = Processor::new(&config, &sink).run()?;

    let writer = MarkdownWriter::new(config.clone());
    writer.write(&report)?;

    if let Some(output) = &config.output_file {
        println!("Output written to: {}", output.display());
        let scan_report =
            ScanReport::from_report(&report, output.display().to_string(), start_time.elapsed());
        print_report(&scan_report);
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Some(shell) = args.generate {
        let mut command = Args::command();
        let bin_name = command.get_name().to_string();
        generate(shell, &mut command, bin_name, &mut io::stdout());
        return;
    }

    setup_logging(args.log_level());

    // Fatal errors are printed even with `-q`
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
