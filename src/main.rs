use std::process::ExitCode;

use json_gate::cli;

fn main() -> ExitCode {
    let command_line_interface = cli::CommandLineInterface::load();
    json_gate::logging::init_logging(command_line_interface.verbose());
    match command_line_interface.run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(2)
        }
    }
}
