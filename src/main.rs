use convite::cli::Cli;

fn main() {
    Cli::run();
}
