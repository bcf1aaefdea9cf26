use KiReact::Utils::logger::init_logger;
use KiReact::cli::cli_main::run;
use log::error;

pub fn main() {
    init_logger();
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
