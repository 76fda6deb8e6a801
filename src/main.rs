use std::process::ExitCode;

fn main() -> ExitCode {
    match simple_http_st::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
