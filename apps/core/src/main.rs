fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match quickbar_core::runtime::parse_cli_args(&args) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("[quickbar-core] {error}");
            std::process::exit(2);
        }
    };

    if let Err(error) = quickbar_core::runtime::run_with_options(options) {
        eprintln!("[quickbar-core] runtime failed: {error}");
        std::process::exit(1);
    }
}
