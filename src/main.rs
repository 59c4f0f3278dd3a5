fn main() {
    if let Err(err) = country_reconcile::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
