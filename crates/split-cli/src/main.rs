fn main() -> anyhow::Result<()> {
    royalty_split_cli::run()?;
    Ok(())
}
