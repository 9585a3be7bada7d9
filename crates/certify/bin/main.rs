//! The `certify` command-line interface.

fn main() -> eyre::Result<()> {
    certify::args::run()
}
