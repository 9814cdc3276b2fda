//! Entry point for the `census21` command-line interface.
#![forbid(unsafe_code)]

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = census21api_cli::run() {
        eprintln!("census21: {err}");
        std::process::exit(1);
    }
}
