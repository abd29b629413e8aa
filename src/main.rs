fn main() {
    if let Err(err) = docaudit::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
