use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use abstractor_netlist::Design;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Rtlil,
    YosysJson,
}

impl Format {
    fn from_path(path: &Path) -> Format {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some("json") => Format::YosysJson,
            _ => Format::Rtlil,
        }
    }
}

fn read_input(path: &Path) -> Result<Design, Box<dyn Error>> {
    match Format::from_path(path) {
        Format::YosysJson => Ok(abstractor_yosys_json::import(&mut File::open(path)?)?),
        Format::Rtlil => Ok(Design::from_str(&std::fs::read_to_string(path)?)?),
    }
}

fn write_output(path: &Path, design: &Design) -> Result<(), Box<dyn Error>> {
    let mut writer = BufWriter::new(File::create(path)?);
    match Format::from_path(path) {
        Format::YosysJson => abstractor_yosys_json::export(&mut writer, design)?,
        Format::Rtlil => write!(writer, "{design}")?,
    }
    writer.flush()?;
    Ok(())
}

fn setup_tracing(verbose: bool) {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, Registry};
    use tracing_tree::HierarchicalLayer;

    let default_level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let filter = EnvFilter::builder().with_default_directive(default_level.into()).from_env_lossy();
    let layer = HierarchicalLayer::default().with_writer(std::io::stderr).with_indent_lines(true).with_targets(true);
    Registry::default().with(filter).with(layer).init();
}

fn run(input: &Path, output: &Path, pass_args: &[String]) -> Result<(), Box<dyn Error>> {
    let mut design = read_input(input)?;
    tracing::debug!("read {} modules from {}", design.modules().count(), input.display());
    abstractor_generic::abstract_pass(&mut design, pass_args)?;
    write_output(output, &design)
}

fn main() {
    let mut verbose = false;
    let mut input = String::new();
    let mut output = String::new();
    let mut pass_args: Vec<String> = Vec::new();
    {
        let mut parser = argparse::ArgumentParser::new();
        parser.set_description("Replaces selected signals of a netlist with unconstrained values.");
        parser.stop_on_first_argument(true);
        parser.refer(&mut verbose).add_option(&["-v", "--verbose"], argparse::StoreTrue, "Log debug messages");
        parser.refer(&mut input).add_argument("INPUT", argparse::Store, "Input netlist (.il or .json)").required();
        parser.refer(&mut output).add_argument("OUTPUT", argparse::Store, "Output netlist (.il or .json)").required();
        parser.refer(&mut pass_args).add_argument(
            "PASS-ARGS",
            argparse::List,
            "Mode (-state, -init or -value), options, and selection patterns",
        );
        parser.parse_args_or_exit();
    }

    setup_tracing(verbose);
    if let Err(error) = run(Path::new(&input), Path::new(&output), &pass_args) {
        eprintln!("ERROR: {error}");
        std::process::exit(1);
    }
}
