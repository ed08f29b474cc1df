use mailorigin::app::App;
use mailorigin::cli::Cli;

fn main() {
    let cli = Cli::from_args();

    let code = match App::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            if cli.error_enabled() {
                eprintln!("Error ({}): {e}", e.category());
            }
            1
        }
    };
    std::process::exit(code);
}
