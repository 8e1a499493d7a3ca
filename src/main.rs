fn main() {
    if let Err(err) = errand_insights::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
