fn main() -> anyhow::Result<()> {
    twinserve::cli::run()
}
