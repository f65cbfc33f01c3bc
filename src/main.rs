use sir_euler::runner::run_with_args;

fn main() -> anyhow::Result<()> {
    run_with_args().map_err(|error| anyhow::anyhow!("simulation run failed: {error}"))?;
    Ok(())
}
